//! Employee domain model.
//!
//! # Responsibility
//! - Define the leaf entity owned by exactly one league.
//! - Validate draft and edited field values before they reach storage.
//!
//! # Invariants
//! - `id` is store-assigned; an `Employee` value never exists without one.
//! - `departure_date` is never earlier than `arrival_date` when both are set.
//! - The administrator flag is only flipped by the owning league.

use super::league::LeagueId;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned employee identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub i64);

impl Display for EmployeeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

/// Validation errors for employee field values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmployeeValidationError {
    /// Surname is blank after trim.
    BlankName,
    /// Date outside years 1..=9999. Stored dates are four-digit ISO text
    /// and must order correctly as text.
    DateOutOfRange(NaiveDate),
    /// Departure date precedes arrival date.
    DepartureBeforeArrival {
        arrival: NaiveDate,
        departure: NaiveDate,
    },
}

impl Display for EmployeeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "employee name must not be blank"),
            Self::DateOutOfRange(date) => write!(
                f,
                "employee date {date} is outside years {MIN_YEAR:04}..={MAX_YEAR}"
            ),
            Self::DepartureBeforeArrival { arrival, departure } => write!(
                f,
                "departure date {departure} precedes arrival date {arrival}"
            ),
        }
    }
}

impl Error for EmployeeValidationError {}

/// Field values for an employee that has not been stored yet.
///
/// Also used as the field payload of loaded employee records.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub name: String,
    pub first_name: String,
    pub email: String,
    /// Opaque credential hash. Never logged nor serialized.
    #[serde(default, skip_serializing)]
    pub credential: String,
    pub arrival_date: Option<NaiveDate>,
    pub departure_date: Option<NaiveDate>,
}

impl NewEmployee {
    pub fn new(
        name: impl Into<String>,
        first_name: impl Into<String>,
        email: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            first_name: first_name.into(),
            email: email.into(),
            credential: credential.into(),
            arrival_date: None,
            departure_date: None,
        }
    }

    pub fn arrived_on(mut self, date: NaiveDate) -> Self {
        self.arrival_date = Some(date);
        self
    }

    pub fn departed_on(mut self, date: NaiveDate) -> Self {
        self.departure_date = Some(date);
        self
    }

    /// Checks field-level invariants.
    pub fn validate(&self) -> Result<(), EmployeeValidationError> {
        if self.name.trim().is_empty() {
            return Err(EmployeeValidationError::BlankName);
        }
        for date in [self.arrival_date, self.departure_date].into_iter().flatten() {
            if !(MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
                return Err(EmployeeValidationError::DateOutOfRange(date));
            }
        }
        if let (Some(arrival), Some(departure)) = (self.arrival_date, self.departure_date) {
            if departure < arrival {
                return Err(EmployeeValidationError::DepartureBeforeArrival {
                    arrival,
                    departure,
                });
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for NewEmployee {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewEmployee")
            .field("name", &self.name)
            .field("first_name", &self.first_name)
            .field("email", &self.email)
            .field("arrival_date", &self.arrival_date)
            .field("departure_date", &self.departure_date)
            .finish_non_exhaustive()
    }
}

/// Partial edit of an existing employee. `None` leaves a field unchanged.
///
/// Dates use a nested option so a date can be cleared with `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeChanges {
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub email: Option<String>,
    pub credential: Option<String>,
    pub arrival_date: Option<Option<NaiveDate>>,
    pub departure_date: Option<Option<NaiveDate>>,
}

impl EmployeeChanges {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Stored member of a league.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Employee {
    id: EmployeeId,
    league_id: LeagueId,
    #[serde(flatten)]
    fields: NewEmployee,
    is_administrator: bool,
}

impl Employee {
    pub(crate) fn from_parts(
        id: EmployeeId,
        league_id: LeagueId,
        fields: NewEmployee,
        is_administrator: bool,
    ) -> Self {
        Self {
            id,
            league_id,
            fields,
            is_administrator,
        }
    }

    pub fn id(&self) -> EmployeeId {
        self.id
    }

    /// League owning this employee.
    pub fn league_id(&self) -> LeagueId {
        self.league_id
    }

    /// Surname.
    pub fn name(&self) -> &str {
        &self.fields.name
    }

    pub fn first_name(&self) -> &str {
        &self.fields.first_name
    }

    pub fn email(&self) -> &str {
        &self.fields.email
    }

    pub fn credential(&self) -> &str {
        &self.fields.credential
    }

    pub fn arrival_date(&self) -> Option<NaiveDate> {
        self.fields.arrival_date
    }

    pub fn departure_date(&self) -> Option<NaiveDate> {
        self.fields.departure_date
    }

    /// Whether this employee currently administers its own league.
    pub fn is_administrator(&self) -> bool {
        self.is_administrator
    }

    pub(crate) fn set_administrator_flag(&mut self, value: bool) {
        self.is_administrator = value;
    }

    /// Returns a copy with `changes` applied, validated.
    pub(crate) fn with_changes(
        &self,
        changes: &EmployeeChanges,
    ) -> Result<Employee, EmployeeValidationError> {
        let mut edited = self.clone();
        let fields = &mut edited.fields;
        if let Some(name) = &changes.name {
            fields.name = name.clone();
        }
        if let Some(first_name) = &changes.first_name {
            fields.first_name = first_name.clone();
        }
        if let Some(email) = &changes.email {
            fields.email = email.clone();
        }
        if let Some(credential) = &changes.credential {
            fields.credential = credential.clone();
        }
        if let Some(arrival_date) = changes.arrival_date {
            fields.arrival_date = arrival_date;
        }
        if let Some(departure_date) = changes.departure_date {
            fields.departure_date = departure_date;
        }
        edited.fields.validate()?;
        Ok(edited)
    }

    pub(crate) fn sort_key(&self) -> EmployeeKey {
        EmployeeKey {
            name: self.fields.name.clone(),
            first_name: self.fields.first_name.clone(),
            id: self.id,
        }
    }
}

impl std::fmt::Debug for Employee {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Employee")
            .field("id", &self.id)
            .field("league_id", &self.league_id)
            .field("fields", &self.fields)
            .field("is_administrator", &self.is_administrator)
            .finish()
    }
}

impl Display for Employee {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.fields.first_name, self.fields.name)
    }
}

/// Member ordering: surname, first name, then id so homonyms stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct EmployeeKey {
    name: String,
    first_name: String,
    id: EmployeeId,
}
