//! Keycloak admin API HTTP client (reqwest-based).

use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::Response;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::auth::AdminTokenCache;
use crate::error::{extract_error_message, KeycloakError, KeycloakResult};
use crate::models::{RoleRepresentation, UserQuery, UserRepresentation};
use crate::traits::IdentityProvider;

/// Connection settings for the admin client.
#[derive(Debug, Clone)]
pub struct KeycloakConfig {
    /// Provider base URL, e.g. `https://id.example.com`.
    pub base_url: String,
    /// Realm holding the fleet's user accounts.
    pub realm: String,
    /// Service-account client ID with realm-admin rights.
    pub client_id: String,
    /// Service-account client secret.
    pub client_secret: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl KeycloakConfig {
    /// Config with the default 30 second timeout.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        realm: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            realm: realm.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            timeout_secs: 30,
        }
    }
}

/// Admin REST client for the realm holding fleethub's users.
#[derive(Debug)]
pub struct KeycloakAdminClient {
    http: reqwest::Client,
    admin_base: String,
    tokens: AdminTokenCache,
}

impl KeycloakAdminClient {
    /// Create a client from connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`KeycloakError::Config`] if the HTTP client cannot be built.
    pub fn new(config: KeycloakConfig) -> KeycloakResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| KeycloakError::Config(format!("Failed to build HTTP client: {e}")))?;

        let token_url = format!(
            "{}/realms/{}/protocol/openid-connect/token",
            config.base_url, config.realm
        );
        let admin_base = format!("{}/admin/realms/{}", config.base_url, config.realm);
        let tokens = AdminTokenCache::new(
            http.clone(),
            token_url,
            config.client_id,
            config.client_secret,
        );

        Ok(Self {
            http,
            admin_base,
            tokens,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.admin_base, path)
    }

    /// Convert a non-success response into an `Upstream` error carrying the
    /// unwrapped provider message.
    async fn upstream_error(response: Response) -> KeycloakError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        KeycloakError::Upstream {
            status,
            message: extract_error_message(status, &body),
        }
    }

    async fn check(response: Response) -> KeycloakResult<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::upstream_error(response).await)
        }
    }

    #[instrument(skip(self))]
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> KeycloakResult<T> {
        let token = self.tokens.get_token().await?;
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    #[instrument(skip(self, body))]
    async fn send_json<B: serde::Serialize + Sync>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> KeycloakResult<Response> {
        let token = self.tokens.get_token().await?;
        let response = self
            .http
            .request(method, self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        Self::check(response).await
    }

    #[instrument(skip(self))]
    async fn send_empty(&self, method: reqwest::Method, path: &str) -> KeycloakResult<Response> {
        let token = self.tokens.get_token().await?;
        let response = self
            .http
            .request(method, self.url(path))
            .bearer_auth(token)
            .send()
            .await?;
        Self::check(response).await
    }

    /// Extract the created resource ID from a 201 Location header.
    fn id_from_location(response: &Response) -> KeycloakResult<Uuid> {
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                KeycloakError::InvalidResponse("Create response had no Location header".into())
            })?;
        let id = location.rsplit('/').next().unwrap_or_default();
        Uuid::parse_str(id).map_err(|_| {
            KeycloakError::InvalidResponse(format!("Location header had no user ID: {location}"))
        })
    }
}

#[async_trait]
impl IdentityProvider for KeycloakAdminClient {
    async fn get_user(&self, id: Uuid) -> KeycloakResult<UserRepresentation> {
        self.get_json(&format!("/users/{id}")).await
    }

    async fn list_users(&self, query: &UserQuery) -> KeycloakResult<Vec<UserRepresentation>> {
        let token = self.tokens.get_token().await?;
        let response = self
            .http
            .get(self.url("/users"))
            .query(&query.to_pairs())
            .bearer_auth(token)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn create_user(&self, user: &UserRepresentation) -> KeycloakResult<Uuid> {
        let response = self
            .send_json(reqwest::Method::POST, "/users", user)
            .await?;
        let id = Self::id_from_location(&response)?;
        debug!(user_id = %id, "Created provider user");
        Ok(id)
    }

    async fn update_user(&self, id: Uuid, user: &UserRepresentation) -> KeycloakResult<()> {
        self.send_json(reqwest::Method::PUT, &format!("/users/{id}"), user)
            .await?;
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> KeycloakResult<()> {
        let response = self
            .send_empty(reqwest::Method::DELETE, &format!("/users/{id}"))
            .await;
        match response {
            Ok(_) => Ok(()),
            // Deleting an already-absent user is treated as done.
            Err(KeycloakError::Upstream { status: 404, .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn get_user_roles(&self, id: Uuid) -> KeycloakResult<Vec<RoleRepresentation>> {
        self.get_json(&format!("/users/{id}/role-mappings/realm"))
            .await
    }

    async fn list_realm_roles(&self) -> KeycloakResult<Vec<RoleRepresentation>> {
        self.get_json("/roles").await
    }

    async fn add_role_mapping(&self, id: Uuid, role: &RoleRepresentation) -> KeycloakResult<()> {
        self.send_json(
            reqwest::Method::POST,
            &format!("/users/{id}/role-mappings/realm"),
            &[role],
        )
        .await?;
        Ok(())
    }

    async fn remove_role_mapping(&self, id: Uuid, role: &RoleRepresentation) -> KeycloakResult<()> {
        self.send_json(
            reqwest::Method::DELETE,
            &format!("/users/{id}/role-mappings/realm"),
            &[role],
        )
        .await?;
        Ok(())
    }

    async fn send_verification_email(&self, id: Uuid) -> KeycloakResult<()> {
        self.send_empty(
            reqwest::Method::PUT,
            &format!("/users/{id}/send-verify-email"),
        )
        .await?;
        Ok(())
    }
}
