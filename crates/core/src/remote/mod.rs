mod http;

use futures::future::BoxFuture;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub use http::HttpTtsService;

/// Body of `POST {base}/tts`.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct SynthesisRequest {
    pub text: String,
    #[serde(rename = "voiceId", skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

/// The only accepted success shape of a synthesis response.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct SynthesisResult {
    #[serde(rename = "audioUrl")]
    pub audio_url: String,
}

/// Identifier of a persisted conversion record.
///
/// The service is free to hand out numeric or string ids; both map onto the
/// same string form here.
#[derive(Clone, Debug, Serialize, PartialEq, Eq, Hash)]
pub struct HistoryId(String);

impl HistoryId {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HistoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for HistoryId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(u64),
            Str(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Num(n) => Ok(HistoryId(n.to_string())),
            Raw::Str(s) => Ok(HistoryId(s)),
        }
    }
}

/// One element of `GET {base}/history`; render order follows wire order.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryItem {
    pub id: HistoryId,
    pub text: String,
    pub audio_url: String,
}

#[derive(thiserror::Error, Debug)]
pub enum RemoteError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("http error {0}: {1}")]
    Status(u16, String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// The external synthesis/history service this client orchestrates.
pub trait TtsService: Send + Sync {
    fn synthesize(
        &self,
        request: SynthesisRequest,
    ) -> BoxFuture<'_, Result<SynthesisResult, RemoteError>>;

    fn history(&self) -> BoxFuture<'_, Result<Vec<HistoryItem>, RemoteError>>;

    fn delete_history(&self, id: HistoryId) -> BoxFuture<'_, Result<(), RemoteError>>;
}

impl<S: TtsService + ?Sized> TtsService for std::sync::Arc<S> {
    fn synthesize(
        &self,
        request: SynthesisRequest,
    ) -> BoxFuture<'_, Result<SynthesisResult, RemoteError>> {
        (**self).synthesize(request)
    }

    fn history(&self) -> BoxFuture<'_, Result<Vec<HistoryItem>, RemoteError>> {
        (**self).history()
    }

    fn delete_history(&self, id: HistoryId) -> BoxFuture<'_, Result<(), RemoteError>> {
        (**self).delete_history(id)
    }
}
