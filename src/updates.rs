//! Live notifications of admin writes.
//!
//! [`Updates`] is a broadcast hub: every admin write publishes one [`Update`],
//! and every connected stream has its own receiver, so all of them see every
//! event published after they subscribed.

use std::time::Duration;

use chrono::Utc;
use rocket::{
    futures::{stream, Stream},
    response::stream::Event,
    serde::json::{json, serde_json, Value},
    tokio::{
        sync::broadcast::{self, error::RecvError},
        time::timeout,
    },
};
use serde::{Deserialize, Serialize};

/// What happened. Serialises to the event name sent to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    ElectionCreated,
    ElectionUpdated,
    ElectionDeleted,
    CandidateCreated,
    CandidateUpdated,
    CandidateDeleted,
    ProfileCreated,
    ProfileUpdated,
    ProfileDeleted,
    /// Sent by a stream that has been idle for a whole heartbeat interval.
    Heartbeat,
}

impl UpdateKind {
    /// The server-sent event name.
    pub fn name(self) -> &'static str {
        match self {
            Self::ElectionCreated => "election_created",
            Self::ElectionUpdated => "election_updated",
            Self::ElectionDeleted => "election_deleted",
            Self::CandidateCreated => "candidate_created",
            Self::CandidateUpdated => "candidate_updated",
            Self::CandidateDeleted => "candidate_deleted",
            Self::ProfileCreated => "profile_created",
            Self::ProfileUpdated => "profile_updated",
            Self::ProfileDeleted => "profile_deleted",
            Self::Heartbeat => "heartbeat",
        }
    }
}

/// One notification: the event name and its JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub kind: UpdateKind,
    pub data: Value,
}

impl Update {
    pub fn new<T: Serialize>(kind: UpdateKind, payload: &T) -> serde_json::Result<Self> {
        Ok(Self {
            kind,
            data: serde_json::to_value(payload)?,
        })
    }

    /// A heartbeat carrying the current time.
    pub fn heartbeat() -> Self {
        Self {
            kind: UpdateKind::Heartbeat,
            data: json!({ "timestamp": Utc::now().to_rfc3339() }),
        }
    }

    /// Render as a named server-sent event with a JSON data block.
    pub fn into_event(self) -> Event {
        Event::json(&self.data).event(self.kind.name())
    }
}

/// The update hub. Lives in Rocket's managed state.
pub struct Updates {
    sender: broadcast::Sender<Update>,
}

impl Updates {
    /// Create a hub where a subscriber may fall at most `capacity` events behind.
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an update to every current subscriber. Never blocks; with no
    /// subscribers the update is simply dropped.
    pub fn publish<T: Serialize>(&self, kind: UpdateKind, payload: &T) {
        let update = match Update::new(kind, payload) {
            Ok(update) => update,
            Err(e) => {
                error!("Could not serialise {} payload: {e}", kind.name());
                return;
            }
        };
        match self.sender.send(update) {
            Ok(receivers) => debug!("Published {} to {receivers} stream(s)", kind.name()),
            Err(_) => debug!("Published {} with nobody listening", kind.name()),
        }
    }

    /// A raw receiver for every update published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Update> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Subscribe and turn the subscription into an endless stream of updates,
    /// with a heartbeat whenever `heartbeat` passes without one.
    ///
    /// The stream ends only when the hub itself is dropped.
    pub fn stream(&self, heartbeat: Duration) -> impl Stream<Item = Update> {
        stream::unfold(self.subscribe(), move |mut receiver| async move {
            loop {
                match timeout(heartbeat, receiver.recv()).await {
                    Ok(Ok(update)) => return Some((update, receiver)),
                    Ok(Err(RecvError::Lagged(skipped))) => {
                        warn!("Update stream fell behind and skipped {skipped} event(s)");
                    }
                    Ok(Err(RecvError::Closed)) => return None,
                    Err(_) => return Some((Update::heartbeat(), receiver)),
                }
            }
        })
    }
}
