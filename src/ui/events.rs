use tokio::sync::mpsc;

use crate::api::ApiError;
use crate::controller::{RoleGate, SearchTicket};
use crate::models::{FeeRecord, IterationRecord, ListPayload, StatsSummary, StudentRecord};

/// Completed backend work delivered back to the UI thread
#[derive(Debug)]
pub enum AppEvent {
    RoleLoaded(RoleGate),
    StatsLoaded(Result<StatsSummary, ApiError>),
    IterationNumbersLoaded(Result<Vec<u32>, ApiError>),
    FeesLoaded {
        ticket: SearchTicket,
        outcome: Result<ListPayload<FeeRecord>, ApiError>,
    },
    StudentsLoaded {
        ticket: SearchTicket,
        outcome: Result<ListPayload<StudentRecord>, ApiError>,
    },
    IterationsLoaded {
        ticket: SearchTicket,
        outcome: Result<ListPayload<IterationRecord>, ApiError>,
    },
    UploadFinished(Result<(), ApiError>),
    WithdrawFinished {
        app_no: String,
        outcome: Result<(), ApiError>,
    },
    LoggedOut(Result<(), ApiError>),
}

/// Channel between spawned backend tasks and the event loop
pub struct EventManager {
    event_sender: mpsc::Sender<AppEvent>,
    event_receiver: mpsc::Receiver<AppEvent>,
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new()
    }
}

impl EventManager {
    /// Create a new event manager
    pub fn new() -> Self {
        let (event_sender, event_receiver) = mpsc::channel::<AppEvent>(100);
        Self {
            event_sender,
            event_receiver,
        }
    }

    /// Get a clone of the event sender for use in async tasks
    pub fn sender(&self) -> mpsc::Sender<AppEvent> {
        self.event_sender.clone()
    }

    /// Try to receive an event (non-blocking)
    pub fn try_receive(&mut self) -> Option<AppEvent> {
        self.event_receiver.try_recv().ok()
    }

    /// Receive an event, waiting for one to arrive
    pub async fn receive(&mut self) -> Option<AppEvent> {
        self.event_receiver.recv().await
    }
}
