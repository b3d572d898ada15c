use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a single doctor-patient assignment record.
///
/// Storage keeps this as `assigned_at` + nullable `unassigned_at`; that
/// mapping lives in [`AssignmentState::from_timestamps`] and nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssignmentState {
    Active {
        since: DateTime<Utc>,
    },
    Closed {
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    },
}

impl AssignmentState {
    pub fn from_timestamps(assigned_at: DateTime<Utc>, unassigned_at: Option<DateTime<Utc>>) -> Self {
        match unassigned_at {
            None => Self::Active { since: assigned_at },
            Some(until) => Self::Closed {
                since: assigned_at,
                until,
            },
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    pub fn assigned_at(&self) -> DateTime<Utc> {
        match self {
            Self::Active { since } | Self::Closed { since, .. } => *since,
        }
    }

    pub fn unassigned_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Active { .. } => None,
            Self::Closed { until, .. } => Some(*until),
        }
    }

    /// Active → Closed. Returns `None` when already closed.
    pub fn close(self, at: DateTime<Utc>) -> Option<Self> {
        match self {
            Self::Active { since } => Some(Self::Closed { since, until: at }),
            Self::Closed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    #[serde(flatten)]
    pub state: AssignmentState,
}

impl Assignment {
    /// A fresh active assignment starting at `at`.
    pub fn open(doctor_id: Uuid, patient_id: Uuid, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            doctor_id,
            patient_id,
            state: AssignmentState::Active { since: at },
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn null_unassignment_means_active() {
        let state = AssignmentState::from_timestamps(at(9), None);
        assert!(state.is_active());
        assert_eq!(state.assigned_at(), at(9));
        assert_eq!(state.unassigned_at(), None);
    }

    #[test]
    fn set_unassignment_means_closed() {
        let state = AssignmentState::from_timestamps(at(9), Some(at(17)));
        assert!(!state.is_active());
        assert_eq!(state.unassigned_at(), Some(at(17)));
    }

    #[test]
    fn close_only_applies_once() {
        let closed = AssignmentState::Active { since: at(9) }.close(at(10)).unwrap();
        assert_eq!(
            closed,
            AssignmentState::Closed {
                since: at(9),
                until: at(10)
            }
        );
        assert!(closed.close(at(11)).is_none());
    }

    #[test]
    fn serializes_with_status_tag() {
        let assignment = Assignment::open(Uuid::new_v4(), Uuid::new_v4(), at(9));
        let json = serde_json::to_value(&assignment).unwrap();
        assert_eq!(json["status"], "active");
        assert!(json["since"].is_string());
        assert!(json.get("until").is_none());
    }
}
