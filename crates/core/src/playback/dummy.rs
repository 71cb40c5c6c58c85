use crate::playback::{AudioClip, MetadataCallback, PlaybackError, PlaybackSink};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::time::Duration;

/// Sink for headless machines and tests: accepts every clip without touching
/// an audio device. With a fixed duration configured, it reports that value
/// as the clip's metadata.
#[derive(Clone, Debug, Default)]
pub struct DummyPlaybackSink {
    reported_duration: Option<Duration>,
}

impl DummyPlaybackSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(duration: Duration) -> Self {
        Self {
            reported_duration: Some(duration),
        }
    }
}

impl PlaybackSink for DummyPlaybackSink {
    fn play(
        &self,
        clip: AudioClip,
        on_metadata: Option<MetadataCallback>,
    ) -> BoxFuture<'_, Result<(), PlaybackError>> {
        async move {
            tracing::debug!(bytes = clip.bytes.len(), "dummy sink discarding clip");
            if let (Some(duration), Some(callback)) = (self.reported_duration, on_metadata) {
                callback(duration);
            }
            Ok(())
        }
        .boxed()
    }
}
