//! Root sentinel administrator.
//!
//! The root is built once per `PersonnelManager` from `RootIdentity`. It is
//! never stored as an employee row and never joins a league, yet it is the
//! administrator of every league that has no promoted member.

use crate::config::RootIdentity;
use crate::model::league::Identity;
use std::fmt::{Display, Formatter};

pub struct Root {
    identity: RootIdentity,
}

impl Root {
    pub(crate) fn new(identity: RootIdentity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> Identity {
        Identity::Root
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn email(&self) -> &str {
        &self.identity.email
    }
}

impl std::fmt::Debug for Root {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Root").field(&self.identity).finish()
    }
}

impl Display for Root {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.identity.name)
    }
}
