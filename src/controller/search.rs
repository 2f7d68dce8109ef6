use tracing::{debug, warn};

use super::notify::NotificationQueue;
use crate::api::ApiError;
use crate::models::ListPayload;

/// Where a record search stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// Nothing searched yet
    Idle,
    /// A request is in flight
    Searching,
    /// Searched, nothing to show
    Empty,
    /// Searched, at least one row
    Loaded,
}

/// Handle for one issued search. Only the newest ticket's response is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    seq: u64,
    query: String,
}

impl SearchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

/// What happened when a response was handed to [`SearchController::apply`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Loaded(usize),
    Empty,
    Failed,
    /// A newer search was issued after this one; the response was dropped.
    Stale,
}

/// Query input, request fencing and result rows for one record view.
#[derive(Debug)]
pub struct SearchController<T> {
    query: String,
    phase: SearchPhase,
    results: Vec<T>,
    server_message: Option<String>,
    last_query: Option<String>,
    next_seq: u64,
    outstanding: Option<u64>,
    failure_label: &'static str,
}

impl<T> SearchController<T> {
    /// `failure_label` names the data in error toasts, e.g. "student details".
    pub fn new(failure_label: &'static str) -> Self {
        Self {
            query: String::new(),
            phase: SearchPhase::Idle,
            results: Vec::new(),
            server_message: None,
            last_query: None,
            next_seq: 1,
            outstanding: None,
            failure_label,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn query_mut(&mut self) -> &mut String {
        &mut self.query
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn has_searched(&self) -> bool {
        self.phase != SearchPhase::Idle
    }

    pub fn is_searching(&self) -> bool {
        self.phase == SearchPhase::Searching
    }

    pub fn results(&self) -> &[T] {
        &self.results
    }

    /// The backend's "no results" message from the last response, if any
    pub fn server_message(&self) -> Option<&str> {
        self.server_message.as_deref()
    }

    /// Query of the most recently issued search
    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    pub fn can_export(&self) -> bool {
        self.phase == SearchPhase::Loaded
    }

    /// Start a search for the current query input.
    pub fn begin_search(&mut self) -> SearchTicket {
        let query = self.query.clone();
        self.begin_search_for(query)
    }

    /// Start a search for an explicit query, superseding any search in flight.
    pub fn begin_search_for(&mut self, query: impl Into<String>) -> SearchTicket {
        let query = query.into();
        let seq = self.next_seq;
        self.next_seq += 1;

        if let Some(previous) = self.outstanding.replace(seq) {
            debug!("Search #{} supersedes #{}", seq, previous);
        }
        self.phase = SearchPhase::Searching;
        self.last_query = Some(query.clone());

        SearchTicket { seq, query }
    }

    /// Re-run the most recent query, e.g. after a withdrawal.
    pub fn refresh(&mut self) -> Option<SearchTicket> {
        let query = self.last_query.clone()?;
        Some(self.begin_search_for(query))
    }

    /// Apply a search response if it answers the newest outstanding ticket.
    pub fn apply(
        &mut self,
        ticket: &SearchTicket,
        outcome: Result<ListPayload<T>, ApiError>,
        notifications: &mut NotificationQueue,
    ) -> Applied {
        if self.outstanding != Some(ticket.seq) {
            debug!("Ignoring stale search #{} ({:?})", ticket.seq, ticket.query);
            return Applied::Stale;
        }
        self.outstanding = None;

        match outcome {
            Ok(payload) => {
                let (records, message) = payload.into_parts();
                self.results = records;
                self.server_message = message;
                if self.results.is_empty() {
                    self.phase = SearchPhase::Empty;
                    Applied::Empty
                } else {
                    self.phase = SearchPhase::Loaded;
                    Applied::Loaded(self.results.len())
                }
            }
            Err(e) => {
                warn!("Failed to fetch {}: {}", self.failure_label, e);
                self.results.clear();
                self.server_message = None;
                self.phase = SearchPhase::Empty;
                notifications.error(format!("Unable to load {}.", self.failure_label));
                Applied::Failed
            }
        }
    }

    /// Forget everything, as on a fresh mount.
    pub fn reset(&mut self) {
        self.query.clear();
        self.phase = SearchPhase::Idle;
        self.results.clear();
        self.server_message = None;
        self.last_query = None;
        // Keep counting so tickets issued before the reset stay stale.
        self.outstanding = None;
    }
}
