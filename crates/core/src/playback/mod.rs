#[cfg(feature = "audio")]
mod audio;
mod dummy;

use bytes::Bytes;
use futures::future::BoxFuture;
use std::time::Duration;

#[cfg(feature = "audio")]
pub use audio::AudioPlaybackSink;
pub use dummy::DummyPlaybackSink;

/// An encoded clip as served at a conversion's audio URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes: Bytes,
}

impl AudioClip {
    pub fn new(bytes: Bytes) -> Self {
        Self { bytes }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Invoked at most once per play, when the clip's total duration is known
/// from decode metadata.
pub type MetadataCallback = Box<dyn FnOnce(Duration) + Send>;

#[derive(thiserror::Error, Debug)]
pub enum PlaybackError {
    #[error("audio output unavailable: {details}")]
    AudioOutputUnavailable { details: String },

    #[error("undecodable audio clip: {0}")]
    Undecodable(String),
}

pub trait PlaybackSink: Send + Sync {
    /// Plays a clip to completion. `on_metadata` fires before playback starts
    /// if the decoder can report a total duration.
    fn play(
        &self,
        clip: AudioClip,
        on_metadata: Option<MetadataCallback>,
    ) -> BoxFuture<'_, Result<(), PlaybackError>>;
}
