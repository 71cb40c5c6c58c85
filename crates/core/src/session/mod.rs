//! Conversion controller, history manager, and the state they drive.
//!
//! All user-visible state lives in one place behind a mutex and is mutated by
//! a closed set of update operations, each applied atomically relative to
//! rendering. Conversions are tagged with a generation token at dispatch; a
//! resolution only applies its result while its token is still the newest
//! one, so overlapping requests cannot race on the final audio source.

use crate::remote::{HistoryId, HistoryItem, SynthesisRequest, TtsService};
use crate::voices::VoiceProfile;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

pub const MSG_EMPTY_INPUT: &str = "Please enter text to convert!";
pub const MSG_CONVERTED: &str = "Audio generated successfully!";
pub const MSG_CONVERT_FAILED: &str = "Failed to generate speech. Try again!";
pub const MSG_HISTORY_LOADED: &str = "History loaded!";
pub const MSG_HISTORY_FAILED: &str = "Failed to load history!";
pub const MSG_DELETED: &str = "History item deleted!";
pub const MSG_DELETE_FAILED: &str = "Failed to delete history item!";

/// A transient user-facing notification, one per remote operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Success(msg) | Notice::Error(msg) => msg,
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Token handed out per conversion dispatch; only the newest one may apply
/// its result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Generation(u64);

#[derive(Debug, Default)]
struct SessionState {
    audio_src: Option<String>,
    history: Vec<HistoryItem>,
    show_history: bool,
    durations: HashMap<HistoryId, Duration>,
    dispatched: u64,
    resolved: u64,
}

impl SessionState {
    // Loading derives from the counters: a stale late resolution can never
    // un-set it for a newer in-flight request.
    fn loading(&self) -> bool {
        self.resolved < self.dispatched
    }

    fn begin_conversion(&mut self) -> Generation {
        self.dispatched += 1;
        self.audio_src = None;
        Generation(self.dispatched)
    }

    /// Returns false when the resolution was discarded as stale.
    fn complete_conversion(&mut self, generation: Generation, audio_url: Option<String>) -> bool {
        self.resolved = self.resolved.max(generation.0);
        if generation.0 != self.dispatched {
            return false;
        }
        if let Some(url) = audio_url {
            self.audio_src = Some(url);
        }
        true
    }

    fn replace_history(&mut self, items: Vec<HistoryItem>) {
        self.history = items;
        self.show_history = true;
    }

    fn remove_history(&mut self, id: &HistoryId) {
        self.history.retain(|item| &item.id != id);
    }
}

/// Read-only copy of the state for rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub audio_src: Option<String>,
    pub loading: bool,
    pub history: Vec<HistoryItem>,
    pub show_history: bool,
    pub durations: HashMap<HistoryId, Duration>,
}

pub struct Session<S> {
    service: S,
    notifier: Arc<dyn Notifier>,
    state: Mutex<SessionState>,
}

impl<S: TtsService> Session<S> {
    pub fn new(service: S, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            service,
            notifier,
            state: Mutex::new(SessionState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let st = self.state();
        SessionSnapshot {
            audio_src: st.audio_src.clone(),
            loading: st.loading(),
            history: st.history.clone(),
            show_history: st.show_history,
            durations: st.durations.clone(),
        }
    }

    pub fn loading(&self) -> bool {
        self.state().loading()
    }

    pub fn history_item(&self, id: &HistoryId) -> Option<HistoryItem> {
        self.state().history.iter().find(|item| &item.id == id).cloned()
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Records a clip's duration once decode metadata reported it.
    /// Idempotent per item id.
    pub fn record_duration(&self, id: &HistoryId, duration: Duration) {
        self.state().durations.insert(id.clone(), duration);
    }

    /// Submits one synthesis request for `text`, carrying the selected
    /// voice's id and style when present.
    ///
    /// Blank input never reaches the network. The audio source is cleared at
    /// dispatch, set again only from a well-formed result whose generation is
    /// still current, and left empty on any failure.
    pub async fn convert(&self, text: &str, voice: Option<&VoiceProfile>) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.notifier.notify(Notice::Error(MSG_EMPTY_INPUT.to_owned()));
            return;
        }

        let generation = self.state().begin_conversion();
        let request = SynthesisRequest {
            text: trimmed.to_owned(),
            voice_id: voice.map(|v| v.voice_id.clone()),
            style: voice.and_then(|v| v.style.clone()),
        };

        match self.service.synthesize(request).await {
            Ok(result) => {
                let applied = self
                    .state()
                    .complete_conversion(generation, Some(result.audio_url));
                if applied {
                    self.notifier.notify(Notice::Success(MSG_CONVERTED.to_owned()));
                } else {
                    tracing::debug!(generation = generation.0, "discarded stale synthesis result");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "synthesis request failed");
                self.state().complete_conversion(generation, None);
                self.notifier.notify(Notice::Error(MSG_CONVERT_FAILED.to_owned()));
            }
        }
    }

    /// Fetches the full history sequence and replaces local state wholesale;
    /// a failed fetch leaves prior state untouched.
    pub async fn load_history(&self) {
        match self.service.history().await {
            Ok(items) => {
                self.state().replace_history(items);
                self.notifier.notify(Notice::Success(MSG_HISTORY_LOADED.to_owned()));
            }
            Err(e) => {
                tracing::warn!(error = %e, "history fetch failed");
                self.notifier.notify(Notice::Error(MSG_HISTORY_FAILED.to_owned()));
            }
        }
    }

    /// Removes an entry remotely, then locally by identity match. Local
    /// removal is never optimistic, so a failed remote call leaves local
    /// state unchanged.
    pub async fn delete_history(&self, id: &HistoryId) {
        match self.service.delete_history(id.clone()).await {
            Ok(()) => {
                self.state().remove_history(id);
                self.notifier.notify(Notice::Success(MSG_DELETED.to_owned()));
            }
            Err(e) => {
                tracing::warn!(error = %e, id = %id, "history delete failed");
                self.notifier.notify(Notice::Error(MSG_DELETE_FAILED.to_owned()));
            }
        }
    }
}
