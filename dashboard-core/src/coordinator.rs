//! Owner of the local watch-list.
//!
//! The coordinator never edits the list itself: every committed list is a
//! server response, either the summary fetched right after a mutation or,
//! when that fetch fails, the mutation's own reply. Flows are serialized through
//! a fair async mutex, so a flow's response is applied before the next flow
//! starts and a slow earlier response can never overwrite a later one.

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use crate::{
    directory::WeatherDirectory,
    error::FlowError,
    model::{CityKey, WatchList},
    normalize::normalize_city_input,
};

/// Mutation currently in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingOp {
    /// Adding from the user's free text (trimmed).
    Add(String),
    Remove(CityKey),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncPhase {
    /// No summary has loaded yet; mutations are rejected.
    Uninitialized,
    Ready,
    /// The previous list stays visible until the operation resolves.
    Mutating(PendingOp),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Last user-facing message raised by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self { level, message: message.into() }
    }
}

/// What views see. Republished on every state change.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot {
    pub phase: SyncPhase,
    pub cities: WatchList,
    pub notice: Option<Notice>,
    /// When `cities` was last replaced from a server response.
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl ListSnapshot {
    fn uninitialized() -> Self {
        Self {
            phase: SyncPhase::Uninitialized,
            cities: WatchList::empty(),
            notice: None,
            refreshed_at: None,
        }
    }

    /// Whether the UI should offer add/remove right now.
    pub fn mutations_enabled(&self) -> bool {
        self.phase == SyncPhase::Ready
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added(CityKey),
    /// Already watched, either caught locally or reported by an unchanged server list.
    AlreadyExists(CityKey),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed(CityKey),
    /// The server list did not shrink; the city was not watched.
    NotPresent(CityKey),
}

#[derive(Debug)]
pub struct CityListCoordinator<D> {
    directory: D,
    state: watch::Sender<ListSnapshot>,
    turn: Mutex<()>,
}

impl<D: WeatherDirectory> CityListCoordinator<D> {
    /// Coordinator in the `Uninitialized` phase. Call [`refresh`](Self::refresh)
    /// to load, or use [`start`](Self::start).
    pub fn new(directory: D) -> Self {
        let (state, _) = watch::channel(ListSnapshot::uninitialized());
        Self { directory, state, turn: Mutex::new(()) }
    }

    /// Construct and immediately load the summary list.
    ///
    /// A failed load leaves the coordinator `Uninitialized` with an error notice.
    pub async fn start(directory: D) -> Self {
        let coordinator = Self::new(directory);
        // failure is published as a notice
        let _ = coordinator.refresh().await;
        coordinator
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Receiver notified on every republished snapshot.
    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ListSnapshot {
        self.state.borrow().clone()
    }

    pub fn cities(&self) -> WatchList {
        self.state.borrow().cities.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.state.borrow().phase != SyncPhase::Uninitialized
    }

    /// Replace the list with a fresh summary from the server.
    pub async fn refresh(&self) -> Result<(), FlowError> {
        let _turn = self.turn.lock().await;

        match self.directory.fetch_summary().await {
            Ok(list) => {
                info!(count = list.len(), "city list loaded");
                self.commit(list, None);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "failed to load city list");
                let message = match err.status() {
                    Some(status) => format!("Failed to load cities (server answered {status})."),
                    None => "Failed to load cities.".to_string(),
                };
                self.state.send_modify(|s| {
                    let level = if s.phase == SyncPhase::Uninitialized {
                        NoticeLevel::Error
                    } else {
                        NoticeLevel::Warning
                    };
                    s.notice = Some(Notice::new(level, message));
                });
                Err(err.into())
            }
        }
    }

    /// Resolve free text to a city and add it to the watch-list.
    pub async fn add_city_flow(&self, free_text: &str) -> Result<AddOutcome, FlowError> {
        let _turn = self.turn.lock().await;
        let input = free_text.trim();
        let before = self.begin(PendingOp::Add(input.to_string()))?;

        match self.add_against(&before, input).await {
            Ok((outcome, list)) => {
                let notice = match &outcome {
                    AddOutcome::Added(key) => {
                        info!(city = %key, "city added");
                        None
                    }
                    AddOutcome::AlreadyExists(key) => {
                        Some(Notice::new(NoticeLevel::Info, format!("City '{key}' already exists!")))
                    }
                };
                match list {
                    Some(list) => {
                        let (list, stale) = self.with_weather(list).await;
                        self.commit(list, stale.or(notice));
                    }
                    None => self.settle(notice),
                }
                Ok(outcome)
            }
            Err(err) => {
                self.settle(Some(Notice::new(NoticeLevel::Warning, err.user_message())));
                Err(err)
            }
        }
    }

    /// Steps after the flow has begun. Returns the list to commit, if the
    /// server was asked to mutate.
    async fn add_against(
        &self,
        before: &WatchList,
        input: &str,
    ) -> Result<(AddOutcome, Option<WatchList>), FlowError> {
        let candidate = normalize_city_input(input);
        if candidate.is_empty() {
            return Err(FlowError::Validation { input: input.to_string() });
        }

        let resolved = match self.directory.geocode(&candidate).await {
            Ok(resolved) => resolved,
            Err(err) if err.is_rejected_input() => {
                debug!(input, error = %err, "geocoding rejected input");
                return Err(FlowError::Validation { input: input.to_string() });
            }
            Err(err) => return Err(err.into()),
        };

        let key = resolved.key;
        if before.contains(&key) {
            debug!(city = %key, "city already watched, skipping add");
            return Ok((AddOutcome::AlreadyExists(key), None));
        }

        let after = self.directory.add_city(&key).await?;
        let outcome = if after.len() == before.len() {
            AddOutcome::AlreadyExists(key)
        } else {
            AddOutcome::Added(key)
        };
        Ok((outcome, Some(after)))
    }

    /// Remove a city. No local pre-check; the server decides.
    pub async fn remove_city_flow(&self, key: &CityKey) -> Result<RemoveOutcome, FlowError> {
        let _turn = self.turn.lock().await;
        let before = self.begin(PendingOp::Remove(key.clone()))?;

        match self.directory.remove_city(key).await {
            Ok(after) => {
                let (outcome, notice) = if after.len() == before.len() {
                    let message = format!("City '{key}' was not in the list.");
                    (RemoveOutcome::NotPresent(key.clone()), Some(Notice::new(NoticeLevel::Info, message)))
                } else {
                    info!(city = %key, "city removed");
                    (RemoveOutcome::Removed(key.clone()), None)
                };
                let (list, stale) = self.with_weather(after).await;
                self.commit(list, stale.or(notice));
                Ok(outcome)
            }
            Err(err) => {
                warn!(city = %key, error = %err, "failed to remove city");
                let err = FlowError::from(err);
                self.settle(Some(Notice::new(NoticeLevel::Warning, err.user_message())));
                Err(err)
            }
        }
    }

    /// Mutation replies may carry only keys and coordinates, so a successful
    /// mutation is followed by a summary fetch under the same turn. If that
    /// fails, the mutation reply is kept and a warning is returned.
    async fn with_weather(&self, reply: WatchList) -> (WatchList, Option<Notice>) {
        match self.directory.fetch_summary().await {
            Ok(list) => (list, None),
            Err(err) => {
                warn!(error = %err, "city list changed but weather could not be reloaded");
                let message = "City list updated, but current weather could not be loaded.";
                (reply, Some(Notice::new(NoticeLevel::Warning, message)))
            }
        }
    }

    /// Enter `Mutating` and return the list the flow starts from.
    fn begin(&self, op: PendingOp) -> Result<WatchList, FlowError> {
        let mut before = None;
        self.state.send_if_modified(|s| {
            if s.phase == SyncPhase::Uninitialized {
                return false;
            }
            before = Some(s.cities.clone());
            s.phase = SyncPhase::Mutating(op);
            true
        });
        before.ok_or(FlowError::NotReady)
    }

    /// Full replace from a server response.
    fn commit(&self, list: WatchList, notice: Option<Notice>) {
        self.state.send_modify(|s| {
            s.phase = SyncPhase::Ready;
            s.cities = list;
            s.notice = notice;
            s.refreshed_at = Some(Utc::now());
        });
    }

    /// Back to `Ready` with the list untouched.
    fn settle(&self, notice: Option<Notice>) {
        self.state.send_modify(|s| {
            s.phase = SyncPhase::Ready;
            s.notice = notice;
        });
    }
}
