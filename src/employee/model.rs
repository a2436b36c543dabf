//! Employee records and request payloads.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

const MIN_AGE: u32 = 16;
const MAX_AGE: u32 = 75;

/// An employee as exposed on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub employee_name: String,
    pub employee_salary: u32,
    pub employee_age: u32,
    pub employee_title: String,
    pub employee_email: String,
}

/// Payload of `POST /api/v1/employee`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateEmployeeInput {
    #[serde(default)]
    pub name: String,
    pub salary: Option<i64>,
    pub age: Option<i64>,
    #[serde(default)]
    pub title: String,
}

impl CreateEmployeeInput {
    /// Check field rules, returning a message per offending field.
    pub fn validate(&self) -> Result<(), BTreeMap<String, String>> {
        let mut errors = BTreeMap::new();

        if self.name.trim().is_empty() {
            errors.insert("name".to_string(), "Employee name is required".to_string());
        }
        if self.title.trim().is_empty() {
            errors.insert("title".to_string(), "Employee title is required".to_string());
        }

        match self.salary {
            None => {
                errors.insert("salary".to_string(), "Employee salary is required".to_string());
            }
            Some(salary) if salary <= 0 || salary > i64::from(u32::MAX) => {
                errors.insert("salary".to_string(), "Employee salary must be positive".to_string());
            }
            Some(_) => {}
        }

        match self.age {
            None => {
                errors.insert("age".to_string(), "Employee age is required".to_string());
            }
            Some(age) if age < i64::from(MIN_AGE) => {
                errors.insert(
                    "age".to_string(),
                    format!("Employee age must be at least {}", MIN_AGE),
                );
            }
            Some(age) if age > i64::from(MAX_AGE) => {
                errors.insert(
                    "age".to_string(),
                    format!("Employee age must not exceed {}", MAX_AGE),
                );
            }
            Some(_) => {}
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Payload of `DELETE /api/v1/employee`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteEmployeeInput {
    pub name: String,
}

/// Work email derived from a display name, e.g. `Jane Doe` -> `jane.doe@company.com`.
pub fn email_for(name: &str) -> String {
    let local: Vec<String> = name
        .split_whitespace()
        .map(|part| {
            part.chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_ascii_lowercase()
        })
        .filter(|part| !part.is_empty())
        .collect();
    format!("{}@company.com", local.join("."))
}
