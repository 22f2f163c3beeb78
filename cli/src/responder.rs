//! Chat endpoint client for the terminal.
//!
//! Every failure maps onto [`ChatError`], so `counsel::answer` can fall back
//! to the local resolver exactly as the browser does.

#[cfg(test)]
#[path = "responder_test.rs"]
mod responder_test;

use std::time::Duration;

use counsel::config::ClientConfig;
use counsel::dispatch::{ChatError, ChatRequest, Responder, parse_chat_body};

pub struct ReqwestResponder {
    client: reqwest::Client,
    chat_url: String,
    timeout_secs: Option<u64>,
}

impl ReqwestResponder {
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.chat_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self { client: builder.build()?, chat_url: config.chat_url.clone(), timeout_secs: config.chat_timeout_secs })
    }

    fn transport_error(&self, error: &reqwest::Error) -> ChatError {
        match self.timeout_secs {
            Some(secs) if error.is_timeout() => ChatError::Timeout(secs),
            _ => ChatError::Transport(error.to_string()),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl Responder for ReqwestResponder {
    async fn respond(&self, message: &str) -> Result<String, ChatError> {
        let body = ChatRequest { message: message.to_owned() };
        let response = self
            .client
            .post(&self.chat_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Status(status.as_u16()));
        }
        let text = response.text().await.map_err(|e| self.transport_error(&e))?;
        parse_chat_body(&text)
    }
}
