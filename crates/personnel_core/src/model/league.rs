//! League domain model.
//!
//! # Responsibility
//! - Own the ordered member set of one league.
//! - Derive the current administrator from member flags.
//!
//! # Invariants
//! - Members are ordered by `(surname, first name, id)`.
//! - At most one member carries the administrator flag; none means root.
//! - Every member has `league_id == self.id`.

use super::employee::{Employee, EmployeeId, EmployeeKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned league identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeagueId(pub i64);

impl Display for LeagueId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Someone who may administer a league: the root sentinel or an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Identity {
    Root,
    Employee(EmployeeId),
}

/// Current administrator of a league.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Administrator<'a> {
    Root,
    Employee(&'a Employee),
}

impl Administrator<'_> {
    pub fn identity(&self) -> Identity {
        match self {
            Self::Root => Identity::Root,
            Self::Employee(employee) => Identity::Employee(employee.id()),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }
}

/// Raised when an administrator candidate is neither root nor a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsufficientRights {
    pub league_id: LeagueId,
    pub employee_id: EmployeeId,
}

impl Display for InsufficientRights {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "employee {} is not a member of league {} and cannot administer it",
            self.employee_id, self.league_id
        )
    }
}

impl Error for InsufficientRights {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeagueValidationError {
    BlankName,
}

impl Display for LeagueValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "league name must not be blank"),
        }
    }
}

impl Error for LeagueValidationError {}

/// Problems found while rebuilding a league from stored rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeagueAssemblyError {
    ForeignMember {
        league_id: LeagueId,
        employee_id: EmployeeId,
    },
    MultipleAdministrators {
        league_id: LeagueId,
        first: EmployeeId,
        second: EmployeeId,
    },
}

impl Display for LeagueAssemblyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ForeignMember {
                league_id,
                employee_id,
            } => write!(
                f,
                "employee {employee_id} does not belong to league {league_id}"
            ),
            Self::MultipleAdministrators {
                league_id,
                first,
                second,
            } => write!(
                f,
                "league {league_id} has two administrators: {first} and {second}"
            ),
        }
    }
}

impl Error for LeagueAssemblyError {}

/// Trims a league name and rejects blank values.
pub fn normalize_league_name(name: &str) -> Result<String, LeagueValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LeagueValidationError::BlankName);
    }
    Ok(trimmed.to_string())
}

/// Organizational unit owning a sorted set of employees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct League {
    id: LeagueId,
    name: String,
    employees: BTreeMap<EmployeeKey, Employee>,
}

impl League {
    pub(crate) fn new(id: LeagueId, name: String) -> Self {
        Self {
            id,
            name,
            employees: BTreeMap::new(),
        }
    }

    /// Rebuilds a league from loaded members, checking membership and the
    /// single-administrator rule.
    pub(crate) fn assemble(
        id: LeagueId,
        name: String,
        members: impl IntoIterator<Item = Employee>,
    ) -> Result<Self, LeagueAssemblyError> {
        let mut league = Self::new(id, name);
        let mut administrator: Option<EmployeeId> = None;
        for member in members {
            if member.league_id() != id {
                return Err(LeagueAssemblyError::ForeignMember {
                    league_id: id,
                    employee_id: member.id(),
                });
            }
            if member.is_administrator() {
                if let Some(first) = administrator {
                    return Err(LeagueAssemblyError::MultipleAdministrators {
                        league_id: id,
                        first,
                        second: member.id(),
                    });
                }
                administrator = Some(member.id());
            }
            league.insert_member(member);
        }
        Ok(league)
    }

    pub fn id(&self) -> LeagueId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Members in `(surname, first name, id)` order.
    pub fn employees(&self) -> impl Iterator<Item = &Employee> + '_ {
        self.employees.values()
    }

    pub fn employee_count(&self) -> usize {
        self.employees.len()
    }

    pub fn employee(&self, id: EmployeeId) -> Option<&Employee> {
        self.employees.values().find(|employee| employee.id() == id)
    }

    pub fn contains(&self, id: EmployeeId) -> bool {
        self.employee(id).is_some()
    }

    pub fn administrator(&self) -> Administrator<'_> {
        self.employees
            .values()
            .find(|employee| employee.is_administrator())
            .map_or(Administrator::Root, Administrator::Employee)
    }

    /// Resolves an administrator candidate to the member id to flag, or
    /// `None` for root.
    pub fn check_administrator(
        &self,
        candidate: Identity,
    ) -> Result<Option<EmployeeId>, InsufficientRights> {
        match candidate {
            Identity::Root => Ok(None),
            Identity::Employee(employee_id) if self.contains(employee_id) => Ok(Some(employee_id)),
            Identity::Employee(employee_id) => Err(InsufficientRights {
                league_id: self.id,
                employee_id,
            }),
        }
    }

    /// Whether `identity` holds administrator rights over this league.
    /// Root administers every league.
    pub fn is_administered_by(&self, identity: Identity) -> bool {
        match identity {
            Identity::Root => true,
            Identity::Employee(_) => self.administrator().identity() == identity,
        }
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn insert_member(&mut self, employee: Employee) {
        self.employees.insert(employee.sort_key(), employee);
    }

    pub(crate) fn take_member(&mut self, id: EmployeeId) -> Option<Employee> {
        let key = self.employee(id)?.sort_key();
        self.employees.remove(&key)
    }

    /// Replaces a member with an edited copy, re-keying it in the set.
    pub(crate) fn replace_member(&mut self, edited: Employee) {
        self.take_member(edited.id());
        self.insert_member(edited);
    }

    /// Flags `target` as administrator and clears every other member.
    pub(crate) fn apply_administrator(&mut self, target: Option<EmployeeId>) {
        for employee in self.employees.values_mut() {
            employee.set_administrator_flag(Some(employee.id()) == target);
        }
    }
}

impl Display for League {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// League ordering inside the manager: name, then id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct LeagueKey {
    pub(crate) name: String,
    pub(crate) id: LeagueId,
}

impl LeagueKey {
    pub(crate) fn of(league: &League) -> Self {
        Self {
            name: league.name.clone(),
            id: league.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        normalize_league_name, Administrator, Identity, InsufficientRights, League,
        LeagueAssemblyError, LeagueId, LeagueValidationError,
    };
    use crate::model::employee::{Employee, EmployeeId, NewEmployee};

    fn member(id: i64, league: i64, name: &str, first_name: &str, admin: bool) -> Employee {
        Employee::from_parts(
            EmployeeId(id),
            LeagueId(league),
            NewEmployee::new(name, first_name, "", ""),
            admin,
        )
    }

    #[test]
    fn members_iterate_in_name_order_with_homonyms_kept() {
        let league = League::assemble(
            LeagueId(1),
            "North".to_string(),
            vec![
                member(3, 1, "Martin", "Paul", false),
                member(1, 1, "Doe", "Jane", false),
                member(2, 1, "Doe", "Jane", false),
                member(4, 1, "Doe", "Adam", false),
            ],
        )
        .unwrap();

        let ids: Vec<i64> = league.employees().map(|employee| employee.id().0).collect();
        assert_eq!(ids, vec![4, 1, 2, 3]);
        assert_eq!(league.employee_count(), 4);
    }

    #[test]
    fn administrator_defaults_to_root_and_follows_flag() {
        let mut league = League::assemble(
            LeagueId(1),
            "North".to_string(),
            vec![member(1, 1, "Doe", "Jane", false)],
        )
        .unwrap();
        assert_eq!(league.administrator(), Administrator::Root);

        league.apply_administrator(Some(EmployeeId(1)));
        match league.administrator() {
            Administrator::Employee(admin) => {
                assert_eq!(admin.id(), EmployeeId(1));
                assert_eq!(admin.league_id(), league.id());
            }
            Administrator::Root => panic!("expected employee administrator"),
        }

        league.take_member(EmployeeId(1));
        assert!(league.administrator().is_root());
    }

    #[test]
    fn check_administrator_rejects_non_members() {
        let league = League::assemble(
            LeagueId(1),
            "North".to_string(),
            vec![member(1, 1, "Doe", "Jane", false)],
        )
        .unwrap();

        assert_eq!(league.check_administrator(Identity::Root), Ok(None));
        assert_eq!(
            league.check_administrator(Identity::Employee(EmployeeId(1))),
            Ok(Some(EmployeeId(1)))
        );
        assert_eq!(
            league.check_administrator(Identity::Employee(EmployeeId(9))),
            Err(InsufficientRights {
                league_id: LeagueId(1),
                employee_id: EmployeeId(9),
            })
        );
    }

    #[test]
    fn assemble_rejects_two_administrators_and_foreign_members() {
        let doubled = League::assemble(
            LeagueId(1),
            "North".to_string(),
            vec![
                member(1, 1, "Doe", "Jane", true),
                member(2, 1, "Roe", "Rick", true),
            ],
        );
        assert!(matches!(
            doubled,
            Err(LeagueAssemblyError::MultipleAdministrators { .. })
        ));

        let foreign = League::assemble(
            LeagueId(1),
            "North".to_string(),
            vec![member(1, 2, "Doe", "Jane", false)],
        );
        assert!(matches!(
            foreign,
            Err(LeagueAssemblyError::ForeignMember { .. })
        ));
    }

    #[test]
    fn replace_member_rekeys_renamed_employee() {
        let mut league = League::assemble(
            LeagueId(1),
            "North".to_string(),
            vec![
                member(1, 1, "Adams", "Ann", false),
                member(2, 1, "Brown", "Bob", false),
            ],
        )
        .unwrap();

        league.replace_member(member(1, 1, "Young", "Ann", false));
        let names: Vec<&str> = league.employees().map(|employee| employee.name()).collect();
        assert_eq!(names, vec!["Brown", "Young"]);
    }

    #[test]
    fn root_administers_every_league() {
        let league = League::assemble(
            LeagueId(1),
            "North".to_string(),
            vec![member(1, 1, "Doe", "Jane", true)],
        )
        .unwrap();
        assert!(league.is_administered_by(Identity::Root));
        assert!(league.is_administered_by(Identity::Employee(EmployeeId(1))));
        assert!(!league.is_administered_by(Identity::Employee(EmployeeId(2))));
    }

    #[test]
    fn league_names_are_trimmed_and_non_blank() {
        assert_eq!(normalize_league_name("  North ").unwrap(), "North");
        assert_eq!(
            normalize_league_name("   "),
            Err(LeagueValidationError::BlankName)
        );
    }
}
