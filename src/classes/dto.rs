use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::Class;

/// Wire shape of a class: `{id, name, instructor}`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassResponse {
    pub id: Uuid,
    pub name: String,
    pub instructor: Option<String>,
}

impl From<Class> for ClassResponse {
    fn from(c: Class) -> Self {
        Self {
            id: c.id,
            name: c.name,
            instructor: c.instructor,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    pub class_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreateClassRequest {
    pub name: Option<String>,
}
