use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::repo::Employee;

/// Wire shape of an employee record. Field names are camelCase, matching
/// what the client consumes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub position: String,
    pub department: String,
    pub salary: f64,
    pub date_of_joining: Date,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Employee> for EmployeeResponse {
    fn from(e: Employee) -> Self {
        Self {
            id: e.id,
            first_name: e.first_name,
            last_name: e.last_name,
            email: e.email,
            position: e.position,
            department: e.department,
            salary: e.salary,
            date_of_joining: e.date_of_joining,
            phone: e.phone,
            photo_url: e.photo_url,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EmployeeEnvelope {
    pub message: String,
    pub employee: EmployeeResponse,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub department: Option<String>,
    pub position: Option<String>,
}
