//! Customer record types
//!
//! The record is a process-wide singleton held by the record store. All
//! mutation goes through a single merge operation ([`RecordPatch`]) so there
//! is exactly one writer path.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Superannuation balance summary shown on the balance card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    /// Current balance in dollars
    #[serde(rename = "currentBalance")]
    pub amount: f64,
    /// Date the balance was last recalculated
    #[serde(rename = "lastUpdated")]
    pub last_updated: NaiveDate,
    /// Year-on-year growth rate, percent
    #[serde(rename = "growthRate")]
    pub growth_rate: f64,
}

/// The customer profile behind the assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub name: String,
    pub email: String,
    pub address: String,
    #[serde(rename = "memberId")]
    pub member_id: String,
    #[serde(rename = "superannuationBalance")]
    pub balance: Balance,
}

impl CustomerRecord {
    /// The hard-coded demo profile the store is seeded with
    pub fn demo() -> Self {
        Self {
            name: "John Doe".to_string(),
            email: "john.doe@example.com".to_string(),
            address: "123 Main St, Sydney".to_string(),
            member_id: "SUPER123456".to_string(),
            balance: Balance {
                amount: 150_000.0,
                last_updated: NaiveDate::from_ymd_opt(2024, 3, 20)
                    .expect("valid seed date"),
                growth_rate: 5.2,
            },
        }
    }

    /// Merge a patch into the record, field by field
    pub fn apply(&mut self, patch: &RecordPatch) {
        if let Some(ref email) = patch.email {
            self.email = email.clone();
        }
        if let Some(ref address) = patch.address {
            self.address = address.clone();
        }
    }
}

/// Fields a `PUT` (or a verified update flow) may merge into the record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl RecordPatch {
    /// Patch updating the email only
    pub fn email(value: impl Into<String>) -> Self {
        Self {
            email: Some(value.into()),
            address: None,
        }
    }

    /// Patch updating the address only
    pub fn address(value: impl Into<String>) -> Self {
        Self {
            email: None,
            address: Some(value.into()),
        }
    }

    /// True when the patch carries no fields
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.address.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_merges_fields() {
        let mut record = CustomerRecord::demo();
        record.apply(&RecordPatch::address("42 Harbour St, Melbourne"));

        assert_eq!(record.address, "42 Harbour St, Melbourne");
        assert_eq!(record.email, "john.doe@example.com");
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut record = CustomerRecord::demo();
        let patch = RecordPatch::email("jane@fastmail.com");

        record.apply(&patch);
        let after_first = record.clone();
        record.apply(&patch);

        assert_eq!(record, after_first);
    }

    #[test]
    fn test_empty_patch_changes_nothing() {
        let mut record = CustomerRecord::demo();
        let before = record.clone();
        record.apply(&RecordPatch::default());
        assert_eq!(record, before);
    }

    #[test]
    fn test_serde_field_names() {
        let record = CustomerRecord::demo();
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("memberId").is_some());
        assert!(json["superannuationBalance"].get("currentBalance").is_some());
    }
}
