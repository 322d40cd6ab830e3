//! HTTP client for the SmartShop REST API.
//!
//! Requests carry `Authorization: Bearer <access>` whenever an access token is
//! set, and share one cookie jar because the backend keeps the assistant's
//! conversation history in its session cookie.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::chat::{BestEffort, ChatBackend, ChatReply, TransportError};
use crate::constants::DEFAULT_API_BASE;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct Registration<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn localhost() -> Result<Self, TransportError> {
        Self::new(DEFAULT_API_BASE)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Shared by every clone of this client.
    pub fn set_access_token(&self, token: Option<String>) {
        if let Ok(mut slot) = self.token.write() {
            *slot = token.filter(|t| !t.is_empty());
        }
    }

    pub fn access_token(&self) -> Option<String> {
        self.token.read().ok().and_then(|slot| slot.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.access_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, TransportError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(TransportError::Http {
            status: status.as_u16(),
            body,
        })
    }

    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, TransportError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .execute(self.client.post(self.url(path)).json(body))
            .await?;
        Ok(response.json::<T>().await?)
    }

    /// `POST /auth/login/`.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, TransportError> {
        self.post_json("/auth/login/", &Credentials { username, password })
            .await
    }

    /// `POST /auth/register/`. The response body is not used.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), TransportError> {
        self.execute(self.client.post(self.url("/auth/register/")).json(&Registration {
            username,
            email,
            password,
        }))
        .await?;
        Ok(())
    }
}

impl ChatBackend for ApiClient {
    async fn chat(&self, message: &str) -> Result<ChatReply, TransportError> {
        tracing::debug!(len = message.len(), "POST /assistant/chat/");
        let response = self
            .execute(
                self.client
                    .post(self.url("/assistant/chat/"))
                    .json(&ChatRequest { message }),
            )
            .await?;
        let body = response.text().await?;
        // A successful reply without a usable body falls back to the canned
        // apology instead of surfacing as an error.
        match serde_json::from_str::<ChatReply>(&body) {
            Ok(reply) => Ok(reply),
            Err(err) => {
                tracing::debug!(%err, len = body.len(), "chat reply body not usable");
                Ok(ChatReply::default())
            }
        }
    }

    async fn reset(&self) -> BestEffort {
        tracing::debug!("POST /assistant/reset/");
        self.execute(self.client.post(self.url("/assistant/reset/")))
            .await
            .map(|_| ())
            .into()
    }
}
