use crate::config::BaseUrl;
use crate::remote::{
    HistoryId, HistoryItem, RemoteError, SynthesisRequest, SynthesisResult, TtsService,
};
use bytes::Bytes;
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;

#[derive(Clone)]
pub struct HttpTtsService {
    client: Client,
    base_url: BaseUrl,
}

impl HttpTtsService {
    pub fn new(base_url: BaseUrl) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    fn delete_url(&self, id: &HistoryId) -> String {
        self.base_url
            .endpoint(&format!("history/{}", urlencoding::encode(id.as_str())))
    }

    /// Downloads the encoded clip behind a generated audio URL.
    ///
    /// This is the playback widget's fetch, not part of the service contract,
    /// so it lives on the concrete client rather than on [`TtsService`].
    pub async fn fetch_clip(&self, url: &str) -> Result<Bytes, RemoteError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RemoteError::Status(status.as_u16(), body));
        }
        Ok(response.bytes().await?)
    }
}

impl TtsService for HttpTtsService {
    fn synthesize(
        &self,
        request: SynthesisRequest,
    ) -> BoxFuture<'_, Result<SynthesisResult, RemoteError>> {
        let this = self.clone();
        async move {
            let url = this.base_url.endpoint("tts");
            tracing::debug!(url = %url, "submitting synthesis request");

            let response = this.client.post(&url).json(&request).send().await?;
            if !response.status().is_success() {
                let status = response.status();
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(RemoteError::Status(status.as_u16(), body));
            }

            let result: SynthesisResult = response.json().await.map_err(|e| {
                RemoteError::InvalidResponse(format!("failed to parse synthesis response: {e}"))
            })?;

            if result.audio_url.trim().is_empty() {
                return Err(RemoteError::InvalidResponse(
                    "synthesis response carried an empty audioUrl".to_owned(),
                ));
            }

            Ok(result)
        }
        .boxed()
    }

    fn history(&self) -> BoxFuture<'_, Result<Vec<HistoryItem>, RemoteError>> {
        let this = self.clone();
        async move {
            let url = this.base_url.endpoint("history");
            tracing::debug!(url = %url, "fetching history");

            let response = this.client.get(&url).send().await?;
            if !response.status().is_success() {
                let status = response.status();
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(RemoteError::Status(status.as_u16(), body));
            }

            response.json().await.map_err(|e| {
                RemoteError::InvalidResponse(format!("failed to parse history response: {e}"))
            })
        }
        .boxed()
    }

    fn delete_history(&self, id: HistoryId) -> BoxFuture<'_, Result<(), RemoteError>> {
        let this = self.clone();
        async move {
            let url = this.delete_url(&id);
            tracing::debug!(url = %url, "deleting history item");

            let response = this.client.delete(&url).send().await?;
            if !response.status().is_success() {
                let status = response.status();
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(RemoteError::Status(status.as_u16(), body));
            }

            // Ack body, if any, is irrelevant.
            Ok(())
        }
        .boxed()
    }
}
