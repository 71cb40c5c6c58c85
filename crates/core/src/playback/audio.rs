use crate::playback::{AudioClip, MetadataCallback, PlaybackError, PlaybackSink};
use futures::future::BoxFuture;
use futures::FutureExt;
use rodio::source::Source;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

/// A minimal, poison-tolerant, lazy initializer for a single value.
///
/// Rationale: [`rodio::OutputStream`] must be kept alive for the duration of playback.
/// Opening a new stream per clip causes Rodio to drop the stream every call, producing
/// `Dropping OutputStream, audio playing through this stream will stop` spam and
/// can truncate/blank playback.
struct LazyInit<T> {
    value: Mutex<Option<T>>,
}

impl<T> LazyInit<T> {
    fn new() -> Self {
        Self {
            value: Mutex::new(None),
        }
    }

    fn get_or_try_init_with<R, E>(
        &self,
        init: impl FnOnce() -> Result<T, E>,
        f: impl FnOnce(&T) -> R,
        invariant_err: impl FnOnce() -> E,
    ) -> Result<R, E> {
        let mut guard = match self.value.lock() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!(
                    "playback OutputStream cache lock was poisoned; recovering and continuing"
                );
                poisoned.into_inner()
            }
        };

        // NOTE: `init` is used at most once (only when the cache is empty).
        if guard.is_none() {
            *guard = Some(init()?);
        }

        match guard.as_ref() {
            Some(v) => Ok(f(v)),
            None => Err(invariant_err()),
        }
    }
}

#[derive(Clone)]
pub struct AudioPlaybackSink {
    disabled: Arc<AtomicBool>,
    disabled_details: Arc<OnceLock<String>>,

    // Keep the OutputStream alive across play calls. Clones share a single stream.
    output_stream: Arc<LazyInit<OutputStream>>,
    output_stream_open_attempts: Arc<AtomicUsize>,
}

impl AudioPlaybackSink {
    pub fn new() -> Result<Self, PlaybackError> {
        Ok(Self {
            disabled: Arc::new(AtomicBool::new(false)),
            disabled_details: Arc::new(OnceLock::new()),

            output_stream: Arc::new(LazyInit::new()),
            output_stream_open_attempts: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn open_output_stream(&self) -> Result<OutputStream, PlaybackError> {
        let attempt = self
            .output_stream_open_attempts
            .fetch_add(1, Ordering::Relaxed)
            + 1;
        tracing::debug!(attempt, "opening Rodio OutputStream");

        OutputStreamBuilder::open_default_stream().map_err(|e| {
            PlaybackError::AudioOutputUnavailable {
                details: format!("open default output stream: {e}"),
            }
        })
    }

    fn connect_sink(&self) -> Result<Sink, PlaybackError> {
        self.output_stream.get_or_try_init_with(
            || self.open_output_stream(),
            |stream| {
                let mixer = stream.mixer();
                Sink::connect_new(&mixer)
            },
            || PlaybackError::AudioOutputUnavailable {
                details: "internal error: output stream cache invariant violated".to_owned(),
            },
        )
    }
}

impl PlaybackSink for AudioPlaybackSink {
    fn play(
        &self,
        clip: AudioClip,
        on_metadata: Option<MetadataCallback>,
    ) -> BoxFuture<'_, Result<(), PlaybackError>> {
        async move {
            if self.disabled.load(Ordering::Relaxed) {
                return Ok(());
            }

            if clip.is_empty() {
                tracing::warn!("skipping playback of empty audio clip");
                return Ok(());
            }

            let sink = match self.connect_sink() {
                Ok(s) => s,
                Err(e) => {
                    if let PlaybackError::AudioOutputUnavailable { details } = &e {
                        if details.contains("NoDevice") {
                            self.disabled.store(true, Ordering::Relaxed);
                            let _ = self.disabled_details.set(details.clone());
                        }
                    }
                    return Err(e);
                }
            };

            let source = Decoder::new(Cursor::new(clip.bytes))
                .map_err(|e| PlaybackError::Undecodable(e.to_string()))?;

            if let Some(callback) = on_metadata {
                match source.total_duration() {
                    Some(total) => callback(total),
                    None => tracing::debug!("decoder reported no total duration for clip"),
                }
            }

            sink.append(source);
            sink.sleep_until_end();

            Ok(())
        }
        .boxed()
    }
}
