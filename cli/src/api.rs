//! REST calls for the law browser, the admin service and the health ping.
//!
//! ERROR HANDLING
//! ==============
//! Admin responses go through [`AdminError::from_status`] so a rejected token
//! surfaces as `Unauthorized`; the caller drops the stored token on it.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use counsel::admin::{
    ActionResponse, AdminEndpoints, AdminError, AdminLoginRequest, AdminLoginResponse, AdminUser, DashboardStats,
    QueriesPage, UpdateUserRequest, UserChatsPage, UsersPage, error_detail,
};
use counsel::config::ClientConfig;
use counsel::laws::{LawPage, browse_laws_path};
use reqwest::Method;
use serde::de::DeserializeOwned;

use crate::error::CliError;

pub struct Api {
    http: reqwest::Client,
    config: ClientConfig,
    endpoints: AdminEndpoints,
}

impl Api {
    pub fn new(config: ClientConfig) -> Self {
        let endpoints = AdminEndpoints::new(&config);
        Self { http: reqwest::Client::new(), config, endpoints }
    }

    /// Wake the backend and wait for its health endpoint.
    ///
    /// # Errors
    ///
    /// Fails on a non-2xx status, a transport error or the health timeout.
    pub async fn ping(&self) -> Result<(), CliError> {
        let response = self
            .http
            .get(self.endpoints.health())
            .timeout(Duration::from_secs(self.config.health_timeout_secs))
            .send()
            .await?;
        let status = response.status();
        if status.is_success() { Ok(()) } else { Err(CliError::Health(format!("HTTP {}", status.as_u16()))) }
    }

    /// # Errors
    ///
    /// Fails on transport errors, non-2xx statuses or an unreadable body.
    pub async fn laws(&self, page: u64, limit: u64) -> Result<LawPage, CliError> {
        let url = self.config.base_url(&browse_laws_path(page, limit));
        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    /// Exchange admin credentials for a token.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::AdminLoginRejected`] with the service's message
    /// when it refuses the credentials.
    pub async fn admin_login(&self, email: &str, password: &str) -> Result<String, CliError> {
        let body = AdminLoginRequest { email: email.to_owned(), password: password.to_owned() };
        let text = self.http.post(self.endpoints.login()).json(&body).send().await?.text().await?;
        let parsed: AdminLoginResponse = serde_json::from_str(&text).unwrap_or_default();
        if let Some(token) = parsed.accepted_token() {
            return Ok(token.to_owned());
        }
        let message = Some(parsed.message)
            .filter(|m| !m.is_empty())
            .or_else(|| error_detail(&text))
            .unwrap_or_else(|| "Invalid admin credentials".to_owned());
        Err(CliError::AdminLoginRejected(message))
    }

    /// # Errors
    ///
    /// See the module docs.
    pub async fn dashboard(&self, token: &str) -> Result<DashboardStats, AdminError> {
        self.admin(Method::GET, &self.endpoints.dashboard(token), None).await
    }

    /// # Errors
    ///
    /// See the module docs.
    pub async fn users(&self, token: &str, limit: u64, offset: u64) -> Result<UsersPage, AdminError> {
        self.admin(Method::GET, &self.endpoints.users(token, limit, offset), None).await
    }

    /// # Errors
    ///
    /// See the module docs.
    pub async fn user(&self, token: &str, user_id: &str) -> Result<AdminUser, AdminError> {
        self.admin(Method::GET, &self.endpoints.user(token, user_id), None).await
    }

    /// # Errors
    ///
    /// See the module docs.
    pub async fn user_chats(&self, token: &str, user_id: &str) -> Result<UserChatsPage, AdminError> {
        self.admin(Method::GET, &self.endpoints.user_chats(token, user_id), None).await
    }

    /// # Errors
    ///
    /// See the module docs.
    pub async fn update_user(
        &self,
        token: &str,
        user_id: &str,
        update: &UpdateUserRequest,
    ) -> Result<ActionResponse, AdminError> {
        let body = serde_json::to_value(update).map_err(|e| AdminError::Decode(e.to_string()))?;
        self.admin(Method::PUT, &self.endpoints.user(token, user_id), Some(body)).await
    }

    /// # Errors
    ///
    /// See the module docs.
    pub async fn delete_user(&self, token: &str, user_id: &str) -> Result<ActionResponse, AdminError> {
        self.admin(Method::DELETE, &self.endpoints.user(token, user_id), None).await
    }

    /// # Errors
    ///
    /// See the module docs.
    pub async fn queries(&self, token: &str, limit: u64, offset: u64) -> Result<QueriesPage, AdminError> {
        self.admin(Method::GET, &self.endpoints.queries(token, limit, offset), None).await
    }

    async fn admin<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, AdminError> {
        let request = self.http.request(method, url);
        let request = if let Some(json) = body { request.json(&json) } else { request };
        let response = request.send().await.map_err(|e| AdminError::Transport(e.to_string()))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| AdminError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(AdminError::from_status(status.as_u16(), &text));
        }
        let text = if text.trim().is_empty() { "{}" } else { text.as_str() };
        serde_json::from_str(text).map_err(|e| AdminError::Decode(e.to_string()))
    }
}
