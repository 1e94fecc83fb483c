//! REST client for the hosted store (PostgREST dialect).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use guestlist::store::{GuestStore, SupabaseClient};
//!
//! let client = SupabaseClient::from_env()?;
//! let guests = client.list_guests("wedding-id").await?;
//! ```

use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;

use super::{GuestStore, GUESTS_COLLECTION};
use crate::config::StoreConfig;
use crate::error::{ConfigError, StoreError, StoreResult};
use crate::models::{Guest, GuestInsertPayload};

/// Error body returned by the REST layer.
#[derive(Debug, Deserialize)]
struct RestError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    details: Option<String>,
}

/// Hosted store client.
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    config: StoreConfig,
}

impl SupabaseClient {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Create a client from `SUPABASE_URL` / `SUPABASE_ANON_KEY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(StoreConfig::from_env()?))
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.url.trim_end_matches('/'),
            collection
        )
    }

    /// Attach the api key and the caller's bearer token.
    ///
    /// Row-level security on the store scopes every call to the tenant the
    /// token belongs to; without a user token the anon key is sent.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self
            .config
            .access_token
            .as_deref()
            .unwrap_or(&self.config.api_key);
        request
            .header("apikey", &self.config.api_key)
            .bearer_auth(token)
    }

    async fn check(response: Response) -> StoreResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<RestError>(&body) {
            Ok(err) => match err.details {
                Some(details) if !details.is_empty() => format!("{} ({})", err.message, details),
                _ => err.message,
            },
            Err(_) => body,
        };

        Err(StoreError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

impl GuestStore for SupabaseClient {
    async fn insert_guests(&self, payloads: &[GuestInsertPayload]) -> StoreResult<()> {
        let request = self
            .http
            .post(self.collection_url(GUESTS_COLLECTION))
            .header("Prefer", "return=minimal")
            .json(payloads);

        let response = self.authorize(request).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn list_guests(&self, wedding_id: &str) -> StoreResult<Vec<Guest>> {
        let wedding_filter = format!("eq.{}", wedding_id);
        let request = self
            .http
            .get(self.collection_url(GUESTS_COLLECTION))
            .query(&[
                ("select", "*"),
                ("wedding_id", wedding_filter.as_str()),
                ("order", "full_name"),
            ]);

        let response = self.authorize(request).send().await?;
        let guests = Self::check(response).await?.json::<Vec<Guest>>().await?;
        Ok(guests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> SupabaseClient {
        SupabaseClient::new(StoreConfig {
            url: url.to_string(),
            api_key: "anon".to_string(),
            access_token: None,
        })
    }

    #[test]
    fn test_collection_url() {
        assert_eq!(
            client("https://abc.supabase.co").collection_url("guests"),
            "https://abc.supabase.co/rest/v1/guests"
        );
        assert_eq!(
            client("https://abc.supabase.co/").collection_url("guests"),
            "https://abc.supabase.co/rest/v1/guests"
        );
    }

    #[test]
    fn test_authorize_falls_back_to_anon_key() {
        let c = client("https://abc.supabase.co");
        let request = c
            .authorize(c.http.get("https://abc.supabase.co/rest/v1/guests"))
            .build()
            .unwrap();
        assert_eq!(request.headers()["apikey"], "anon");
        assert_eq!(request.headers()["authorization"], "Bearer anon");
    }

    #[test]
    fn test_authorize_prefers_user_token() {
        let c = SupabaseClient::new(StoreConfig {
            url: "https://abc.supabase.co".to_string(),
            api_key: "anon".to_string(),
            access_token: Some("user-jwt".to_string()),
        });
        let request = c
            .authorize(c.http.get("https://abc.supabase.co/rest/v1/guests"))
            .build()
            .unwrap();
        assert_eq!(request.headers()["authorization"], "Bearer user-jwt");
    }
}
