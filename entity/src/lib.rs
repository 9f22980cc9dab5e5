//! Persistence model and wire shape for employee records.

pub mod employees;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An employee record as exchanged over HTTP and held by every store.
///
/// `id` is always supplied by the caller; stores never allocate one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: i32,
    #[serde(default)]
    #[schema(example = "Jame")]
    pub name: Option<String>,
}

impl Employee {
    pub fn new(id: i32, name: Option<impl Into<String>>) -> Self {
        Self {
            id,
            name: name.map(Into::into),
        }
    }
}

impl From<employees::Model> for Employee {
    fn from(model: employees::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

impl From<Employee> for employees::Model {
    fn from(employee: Employee) -> Self {
        Self {
            id: employee.id,
            name: employee.name,
        }
    }
}
