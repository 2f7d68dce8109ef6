use tracing::warn;

use super::notify::NotificationQueue;
use crate::api::ApiError;
use crate::models::StudentRecord;

/// Highest iteration number among the listed students, treating a missing
/// `itr_no` as 0. `None` for an empty list.
pub fn latest_iteration(students: &[StudentRecord]) -> Option<i64> {
    students.iter().map(|s| s.itr_no.unwrap_or(0)).max()
}

/// Whether a row shows the withdraw action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawState {
    /// Not in the latest iteration
    Hidden,
    /// Latest iteration, already withdrawn
    Disabled,
    Available,
}

pub fn withdraw_state(student: &StudentRecord, latest: Option<i64>) -> WithdrawState {
    match latest {
        Some(latest) if student.itr_no.unwrap_or(0) == latest => {
            if student.is_withdrawn() {
                WithdrawState::Disabled
            } else {
                WithdrawState::Available
            }
        }
        _ => WithdrawState::Hidden,
    }
}

/// Student awaiting a withdraw confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWithdrawal {
    pub app_no: String,
    pub name: String,
}

impl PendingWithdrawal {
    pub fn prompt(&self) -> String {
        format!(
            "Are you sure you want to withdraw {} (Application No: {})?",
            self.name, self.app_no
        )
    }
}

/// Confirmation and completion of a single-student withdrawal
#[derive(Debug, Default)]
pub struct WithdrawFlow {
    pending: Option<PendingWithdrawal>,
    in_flight: Option<String>,
}

impl WithdrawFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for confirmation. Refused while another withdrawal is running.
    pub fn request(&mut self, app_no: impl Into<String>, name: impl Into<String>) -> bool {
        if self.in_flight.is_some() {
            return false;
        }
        self.pending = Some(PendingWithdrawal {
            app_no: app_no.into(),
            name: name.into(),
        });
        true
    }

    pub fn pending(&self) -> Option<&PendingWithdrawal> {
        self.pending.as_ref()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Confirmed: returns the application number to post.
    pub fn confirm(&mut self) -> Option<String> {
        let pending = self.pending.take()?;
        self.in_flight = Some(pending.app_no.clone());
        Some(pending.app_no)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Record the outcome. Returns true when the student list should be
    /// refreshed with the last query.
    pub fn complete(
        &mut self,
        app_no: &str,
        outcome: Result<(), ApiError>,
        notifications: &mut NotificationQueue,
    ) -> bool {
        self.in_flight = None;
        match outcome {
            Ok(()) => {
                notifications.success(format!("Application No: {} successfully withdrawn.", app_no));
                true
            }
            Err(e) => {
                warn!("Withdrawal of {} failed: {}", app_no, e);
                match e.detail() {
                    Some(detail) => notifications.error(format!("Failed to withdraw: {}", detail)),
                    None => notifications.error("Error processing withdrawal."),
                }
                false
            }
        }
    }

    pub fn reset(&mut self) {
        self.pending = None;
        self.in_flight = None;
    }
}
