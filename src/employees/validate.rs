use time::{macros::format_description, Date};

use crate::error::FieldError;
use crate::validate::{is_valid_email, normalize_email};

use super::repo::Employee;

/// Raw form fields as they arrive from the multipart body. Everything is
/// a string until the pipeline has typed it.
#[derive(Debug, Default, Clone)]
pub struct EmployeeDraft {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub salary: Option<String>,
    pub date_of_joining: Option<String>,
    pub phone: Option<String>,
}

impl EmployeeDraft {
    /// Accepts a named form field; unknown names are ignored.
    pub fn set(&mut self, field: &str, value: String) {
        match field {
            "firstName" => self.first_name = Some(value),
            "lastName" => self.last_name = Some(value),
            "email" => self.email = Some(value),
            "position" => self.position = Some(value),
            "department" => self.department = Some(value),
            "salary" => self.salary = Some(value),
            "dateOfJoining" => self.date_of_joining = Some(value),
            "phone" => self.phone = Some(value),
            _ => {}
        }
    }

    /// Partial update: provided fields win, everything else is taken from
    /// the stored record. The merged draft goes back through `validate`.
    pub fn merge_over(&self, existing: &Employee) -> EmployeeDraft {
        let fmt = format_description!("[year]-[month]-[day]");
        EmployeeDraft {
            first_name: self
                .first_name
                .clone()
                .or_else(|| Some(existing.first_name.clone())),
            last_name: self
                .last_name
                .clone()
                .or_else(|| Some(existing.last_name.clone())),
            email: self.email.clone().or_else(|| Some(existing.email.clone())),
            position: self
                .position
                .clone()
                .or_else(|| Some(existing.position.clone())),
            department: self
                .department
                .clone()
                .or_else(|| Some(existing.department.clone())),
            salary: self
                .salary
                .clone()
                .or_else(|| Some(existing.salary.to_string())),
            date_of_joining: self
                .date_of_joining
                .clone()
                .or_else(|| existing.date_of_joining.format(fmt).ok()),
            phone: self.phone.clone().or_else(|| existing.phone.clone()),
        }
    }
}

/// Fully typed, validated employee fields ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub position: String,
    pub department: String,
    pub salary: f64,
    pub date_of_joining: Date,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
}

/// Ordered pipeline of per-field checks. Every failing field is reported,
/// not just the first.
pub fn validate(draft: &EmployeeDraft) -> Result<NewEmployee, Vec<FieldError>> {
    let mut errors = Vec::new();

    let first_name = required_text("firstName", draft.first_name.as_deref(), &mut errors);
    let last_name = required_text("lastName", draft.last_name.as_deref(), &mut errors);
    let email = email_field("email", draft.email.as_deref(), &mut errors);
    let position = required_text("position", draft.position.as_deref(), &mut errors);
    let department = required_text("department", draft.department.as_deref(), &mut errors);
    let salary = salary_field("salary", draft.salary.as_deref(), &mut errors);
    let date_of_joining = date_field("dateOfJoining", draft.date_of_joining.as_deref(), &mut errors);
    let phone = draft
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string);

    match (
        first_name,
        last_name,
        email,
        position,
        department,
        salary,
        date_of_joining,
    ) {
        (
            Some(first_name),
            Some(last_name),
            Some(email),
            Some(position),
            Some(department),
            Some(salary),
            Some(date_of_joining),
        ) if errors.is_empty() => Ok(NewEmployee {
            first_name,
            last_name,
            email,
            position,
            department,
            salary,
            date_of_joining,
            phone,
            photo_url: None,
        }),
        _ => Err(errors),
    }
}

fn required_text(
    field: &'static str,
    value: Option<&str>,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => Some(v.to_string()),
        None => {
            errors.push(FieldError {
                field,
                message: format!("{field} is required"),
            });
            None
        }
    }
}

fn email_field(
    field: &'static str,
    value: Option<&str>,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let value = required_text(field, value, errors)?;
    let normalized = normalize_email(&value);
    if is_valid_email(&normalized) {
        Some(normalized)
    } else {
        errors.push(FieldError {
            field,
            message: "Invalid email format".to_string(),
        });
        None
    }
}

fn salary_field(
    field: &'static str,
    value: Option<&str>,
    errors: &mut Vec<FieldError>,
) -> Option<f64> {
    let value = required_text(field, value, errors)?;
    match value.parse::<f64>() {
        Ok(salary) if salary.is_finite() && salary >= 0.0 => Some(salary),
        _ => {
            errors.push(FieldError {
                field,
                message: format!("{field} must be a non-negative number"),
            });
            None
        }
    }
}

fn date_field(
    field: &'static str,
    value: Option<&str>,
    errors: &mut Vec<FieldError>,
) -> Option<Date> {
    let value = required_text(field, value, errors)?;
    let fmt = format_description!("[year]-[month]-[day]");
    match Date::parse(&value, fmt) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push(FieldError {
                field,
                message: format!("{field} must be a date in YYYY-MM-DD form"),
            });
            None
        }
    }
}
