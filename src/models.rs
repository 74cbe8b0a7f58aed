// src/models.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A listed activity open for registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub description: String,
    pub location: String,
    pub date: NaiveDate,
    pub time: String,
    /// Registration fee in rupees
    pub fees: f64,
}

impl Event {
    /// Build an event from a draft and an id assigned by the store
    pub fn from_draft(id: String, draft: EventDraft) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            location: draft.location,
            date: draft.date,
            time: draft.time,
            fees: draft.fees,
        }
    }

    /// All fields except the id, for pre-filling the edit form
    pub fn to_draft(&self) -> EventDraft {
        EventDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            date: self.date,
            time: self.time.clone(),
            fees: self.fees,
        }
    }

    /// Case-insensitive match on name or location
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query) || self.location.to_lowercase().contains(&query)
    }
}

/// Event fields excluding the id
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub name: String,
    pub description: String,
    pub location: String,
    pub date: NaiveDate,
    pub time: String,
    pub fees: f64,
}

/// A user's signup for one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: String,
    pub event_id: String,
    /// Event name at the time of registration
    pub event_name: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub college: String,
    pub payment_option: PaymentOption,
    pub payment_status: PaymentStatus,
    pub registered_at: DateTime<Utc>,
}

/// Registration fields the caller supplies; id, timestamp and status are assigned by the store
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationDraft {
    pub event_id: String,
    pub event_name: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub college: String,
    pub payment_option: PaymentOption,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentOption {
    #[serde(rename = "UPI")]
    Upi,
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "Debit Card")]
    DebitCard,
    #[serde(rename = "Net Banking")]
    NetBanking,
}

impl PaymentOption {
    pub const ALL: [PaymentOption; 4] = [
        PaymentOption::Upi,
        PaymentOption::CreditCard,
        PaymentOption::DebitCard,
        PaymentOption::NetBanking,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PaymentOption::Upi => "UPI",
            PaymentOption::CreditCard => "Credit Card",
            PaymentOption::DebitCard => "Debit Card",
            PaymentOption::NetBanking => "Net Banking",
        }
    }

    /// Parse the label submitted by the registration form
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.label() == label)
    }
}

impl fmt::Display for PaymentOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Payment status for a registration.
///
/// Nothing in the checkout flow moves a registration to `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Completed,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => f.write_str("Pending"),
            PaymentStatus::Completed => f.write_str("Completed"),
        }
    }
}
