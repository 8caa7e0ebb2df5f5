//! Confirmed adviser appointments
//!
//! Append-only in-memory log. The dialogue flow records a booking when the
//! scheduling sub-flow confirms a slot.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use member_assist_core::AdviserSlot;

/// A confirmed adviser booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub slot: AdviserSlot,
    pub adviser_name: String,
    pub booked_at: DateTime<Utc>,
}

/// In-memory appointment log
#[derive(Default)]
pub struct AppointmentLog {
    entries: RwLock<Vec<Appointment>>,
}

impl AppointmentLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a confirmed booking and return it
    pub fn book(&self, slot: AdviserSlot, adviser_name: impl Into<String>) -> Appointment {
        let appointment = Appointment {
            id: Uuid::new_v4(),
            slot,
            adviser_name: adviser_name.into(),
            booked_at: Utc::now(),
        };
        tracing::info!(slot = %slot, "Adviser appointment booked");
        self.entries.write().push(appointment.clone());
        appointment
    }

    /// All bookings, oldest first
    pub fn list(&self) -> Vec<Appointment> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_appends() {
        let log = AppointmentLog::new();
        assert!(log.is_empty());

        let appointment = log.book(AdviserSlot::Tuesday2pm, "Sarah Mitchell");
        assert_eq!(appointment.slot, AdviserSlot::Tuesday2pm);
        assert_eq!(log.len(), 1);
        assert_eq!(log.list()[0], appointment);
    }

    #[test]
    fn test_bookings_keep_order() {
        let log = AppointmentLog::new();
        log.book(AdviserSlot::Monday10am, "Sarah Mitchell");
        log.book(AdviserSlot::Friday11am, "Sarah Mitchell");

        let slots: Vec<_> = log.list().into_iter().map(|a| a.slot).collect();
        assert_eq!(slots, vec![AdviserSlot::Monday10am, AdviserSlot::Friday11am]);
    }
}
