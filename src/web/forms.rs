//! Typed form input, validated into drafts at submission

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::AppError;
use crate::models::{Event, EventDraft, PaymentOption, RegistrationDraft};

/// Validation failures for one form submission
#[derive(Debug, Default)]
pub struct FormErrors(Vec<AppError>);

impl FormErrors {
    fn push(&mut self, field: &str, message: &str) {
        self.0.push(AppError::validation(field, message));
    }

    fn require(&mut self, field: &str, value: &str, label: &str) {
        if value.trim().is_empty() {
            self.push(field, &format!("{} is required", label));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// First message for a field, if any
    pub fn for_field(&self, name: &str) -> Option<&str> {
        self.0.iter().find_map(|e| match e {
            AppError::Validation { field, message } if field == name => Some(message.as_str()),
            _ => None,
        })
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

/// Admin add/edit event form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EventForm {
    pub name: String,
    pub description: String,
    pub location: String,
    pub date: String,
    pub time: String,
    pub fees: String,
}

impl EventForm {
    pub fn from_event(event: &Event) -> Self {
        Self {
            name: event.name.clone(),
            description: event.description.clone(),
            location: event.location.clone(),
            date: event.date.format("%Y-%m-%d").to_string(),
            time: event.time.clone(),
            fees: event.fees.to_string(),
        }
    }

    pub fn validate(&self) -> Result<EventDraft, FormErrors> {
        let mut errors = FormErrors::default();
        errors.require("name", &self.name, "Event name");
        errors.require("description", &self.description, "Description");
        errors.require("location", &self.location, "Location");
        errors.require("time", &self.time, "Time");

        let date = if self.date.trim().is_empty() {
            errors.push("date", "Date is required");
            None
        } else {
            let parsed = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok();
            if parsed.is_none() {
                errors.push("date", "Date must be in YYYY-MM-DD format");
            }
            parsed
        };

        let fees = if self.fees.trim().is_empty() {
            errors.push("fees", "Registration fees are required");
            None
        } else {
            match self.fees.trim().parse::<f64>() {
                Ok(fees) if fees.is_finite() && fees >= 0.0 => Some(fees),
                _ => {
                    errors.push("fees", "Fees must be a non-negative number");
                    None
                }
            }
        };

        match (date, fees) {
            (Some(date), Some(fees)) => errors.into_result(|| EventDraft {
                name: self.name.trim().to_string(),
                description: self.description.trim().to_string(),
                location: self.location.trim().to_string(),
                date,
                time: self.time.trim().to_string(),
                fees,
            }),
            _ => Err(errors),
        }
    }
}

/// Public registration form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistrationForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub college: String,
    pub payment_option: String,
}

impl RegistrationForm {
    pub fn validate(&self, event: &Event) -> Result<RegistrationDraft, FormErrors> {
        let mut errors = FormErrors::default();
        errors.require("fullName", &self.full_name, "Full name");
        errors.require("phone", &self.phone, "Phone number");
        errors.require("college", &self.college, "College/Department");

        let email = self.email.trim();
        if email.is_empty() {
            errors.push("email", "Email is required");
        } else if !looks_like_email(email) {
            errors.push("email", "Enter a valid email address");
        }

        let payment_option = PaymentOption::from_label(self.payment_option.trim());
        if payment_option.is_none() {
            errors.push("paymentOption", "Select a payment method");
        }

        match payment_option {
            Some(payment_option) => errors.into_result(|| RegistrationDraft {
                event_id: event.id.clone(),
                event_name: event.name.clone(),
                full_name: self.full_name.trim().to_string(),
                email: email.to_string(),
                phone: self.phone.trim().to_string(),
                college: self.college.trim().to_string(),
                payment_option,
            }),
            None => Err(errors),
        }
    }
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@') && !value.contains(' ')
        }
        None => false,
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}
