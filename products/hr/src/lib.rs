//! HR vertical slice: employee records and the directory store that owns them.

mod store;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use store::{EmployeeStore, IdStrategy};

/// Server-assigned employee identifier.
pub type EmployeeId = u64;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub email: String,
}

impl Employee {
    /// Shallow field-level merge: present fields overwrite, absent ones stay.
    pub fn apply(&mut self, patch: EmployeePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
    }
}

/// Fields accepted when creating an employee. The id is never caller-supplied.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewEmployee {
    pub name: String,
    pub email: String,
}

impl NewEmployee {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EmployeePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl EmployeePatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

impl From<NewEmployee> for EmployeePatch {
    fn from(value: NewEmployee) -> Self {
        Self {
            name: Some(value.name),
            email: Some(value.email),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HrError {
    #[error("employee {0} not found")]
    NotFound(EmployeeId),
    #[error("no unused employee id left below {0}")]
    IdSpaceExhausted(EmployeeId),
}

pub type HrResult<T> = Result<T, HrError>;

/// Records the directory starts with when demo data is enabled.
pub fn demo_employees() -> Vec<NewEmployee> {
    vec![
        NewEmployee::new("John Doe", "john@example.com"),
        NewEmployee::new("Jane Smith", "jane@example.com"),
        NewEmployee::new("Jane sds", "erejane@example.com"),
    ]
}
