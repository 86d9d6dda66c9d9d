//! Chat storage adapter for the backend's `*_chat` endpoints.

use super::client::{BackendClient, error_body};
use super::protocol::{ChatSummary, LoadChatResponse, SaveChatRequest, StatusResponse};
use async_trait::async_trait;
use chatline_application::ports::chat_persistence::{
    ChatPersistence, ChatRecord, PersistenceError,
};
use chatline_domain::SessionIdentity;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub struct HttpChatPersistence {
    backend: BackendClient,
}

impl HttpChatPersistence {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    /// Turn a non-success status into an error.
    ///
    /// A 404 means the id is unknown only for per-chat endpoints (`id` is
    /// `Some`); elsewhere it is reported like any other status.
    async fn check(response: Response, id: Option<&str>) -> Result<Response, PersistenceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if let Some(id) = id
            && status == StatusCode::NOT_FOUND
        {
            return Err(PersistenceError::NotFound(id.to_string()));
        }
        Err(PersistenceError::Status {
            status: status.as_u16(),
            body: error_body(response).await,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, PersistenceError> {
        let bytes = response.bytes().await.map_err(transport)?;
        serde_json::from_slice(&bytes).map_err(|e| PersistenceError::InvalidRecord(e.to_string()))
    }
}

fn transport(e: reqwest::Error) -> PersistenceError {
    PersistenceError::Transport(e.to_string())
}

#[async_trait]
impl ChatPersistence for HttpChatPersistence {
    async fn list(&self) -> Result<Vec<SessionIdentity>, PersistenceError> {
        let url = self.backend.endpoint(&["list_chats"]);
        debug!("GET {}", url);
        let response = self.backend.http().get(url).send().await.map_err(transport)?;
        let response = Self::check(response, None).await?;
        let summaries: Vec<ChatSummary> = Self::decode(response).await?;

        Ok(summaries
            .into_iter()
            .map(|s| {
                let title = if s.title.trim().is_empty() {
                    s.filename.clone()
                } else {
                    s.title
                };
                SessionIdentity::new(s.filename, title)
            })
            .collect())
    }

    async fn load(&self, id: &str) -> Result<ChatRecord, PersistenceError> {
        let url = self.backend.endpoint(&["load_chat", id]);
        debug!("GET {}", url);
        let response = self.backend.http().get(url).send().await.map_err(transport)?;
        let response = Self::check(response, Some(id)).await?;
        let body: LoadChatResponse = Self::decode(response).await?;

        Ok(ChatRecord {
            id: id.to_string(),
            title: body.title,
            messages: body.messages,
        })
    }

    async fn save(&self, record: &ChatRecord) -> Result<(), PersistenceError> {
        let url = self.backend.endpoint(&["save_chat"]);
        debug!("POST {} ({})", url, record.id);
        let body = SaveChatRequest {
            title: &record.title,
            messages: &record.messages,
            filename: &record.id,
        };
        let response = self
            .backend
            .http()
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        let response = Self::check(response, Some(&record.id)).await?;
        let code = response.status().as_u16();
        let bytes = response.bytes().await.map_err(transport)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }
        let ack: StatusResponse = serde_json::from_slice(&bytes)
            .map_err(|e| PersistenceError::InvalidRecord(format!("save_chat reply: {}", e)))?;
        debug!("save_chat status: {:?}", ack.status);
        if ack.is_failure() {
            warn!("Backend refused to save {}: {}", record.id, ack.status);
            return Err(PersistenceError::Status {
                status: code,
                body: ack.status,
            });
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), PersistenceError> {
        let url = self.backend.endpoint(&["delete_chat", id]);
        debug!("DELETE {}", url);
        let response = self
            .backend
            .http()
            .delete(url)
            .send()
            .await
            .map_err(transport)?;
        Self::check(response, Some(id)).await?;
        Ok(())
    }
}
