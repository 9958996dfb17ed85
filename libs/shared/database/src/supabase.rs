use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method, StatusCode,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;

#[derive(Error, Debug)]
pub enum SupabaseError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Constraint conflict ({code}): {message}")]
    Conflict { code: String, message: String },

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl SupabaseError {
    /// Postgres SQLSTATE carried by a PostgREST conflict, if any.
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            SupabaseError::Conflict { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Error payload PostgREST returns for failed statements.
#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    code: Option<String>,
    message: Option<String>,
}

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(value) = HeaderValue::from_str(&self.anon_key) {
            headers.insert("apikey", value);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, value);
            }
        }

        headers
    }

    pub async fn request<T>(&self, method: Method, path: &str,
                            auth_token: Option<&str>, body: Option<Value>)
                            -> Result<T, SupabaseError>
    where T: DeserializeOwned {
        self.request_with_headers(method, path, auth_token, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T, SupabaseError>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers(auth_token);
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);
            return Err(classify_failure(status, error_text));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice::<T>(&bytes)
            .map_err(|e| SupabaseError::Decode(e.to_string()))
    }

    /// Insert or update returning the affected rows.
    pub async fn request_returning<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Value,
    ) -> Result<Vec<T>, SupabaseError>
    where T: DeserializeOwned {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        self.request_with_headers(method, path, auth_token, Some(body), Some(headers)).await
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}

fn classify_failure(status: StatusCode, error_text: String) -> SupabaseError {
    match status.as_u16() {
        401 | 403 => SupabaseError::Auth(error_text),
        404 => SupabaseError::NotFound(error_text),
        409 => {
            let parsed = serde_json::from_str::<PostgrestErrorBody>(&error_text).ok();
            let code = parsed.as_ref()
                .and_then(|b| b.code.clone())
                .unwrap_or_default();
            let message = parsed
                .and_then(|b| b.message)
                .unwrap_or(error_text);
            SupabaseError::Conflict { code, message }
        }
        other => SupabaseError::Api { status: other, body: error_text },
    }
}
