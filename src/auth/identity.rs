use async_trait::async_trait;
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::IdentityConfig;

/// Claims the identity provider embeds in its ID tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Provider-side account id.
    pub sub: String,
    pub email: String,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

/// External identity provider: verifies ID tokens and manages accounts.
///
/// Credentials never touch the database; this service only branches on the
/// verified email and the local user row it maps to.
#[async_trait]
pub trait IdentityProvider: Send + Sync + std::fmt::Debug {
    /// Verify an ID token and return its claims.
    async fn verify_token(&self, token: &str) -> anyhow::Result<IdentityClaims>;

    /// Delete the provider account registered under `email`.
    async fn delete_user_by_email(&self, email: &str) -> anyhow::Result<()>;

    /// Change the login email of account `uid`.
    async fn update_email(&self, uid: &str, new_email: &str) -> anyhow::Result<()>;

    /// Change the password of account `uid`.
    async fn update_password(&self, uid: &str, new_password: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Deserialize)]
struct AdminUser {
    id: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AdminUserList {
    #[serde(default)]
    users: Vec<AdminUser>,
}

/// [`IdentityProvider`] backed by locally verified HS256 tokens and the
/// provider's admin REST API.
#[derive(Debug, Clone)]
pub struct HttpIdentityProvider {
    http: reqwest::Client,
    admin_url: String,
    service_key: String,
    jwt_secret: String,
}

impl HttpIdentityProvider {
    #[must_use]
    pub fn new(http: reqwest::Client, config: &IdentityConfig) -> Self {
        Self {
            http,
            admin_url: config.admin_url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
            jwt_secret: config.jwt_secret.clone(),
        }
    }

    async fn find_uid_by_email(&self, email: &str) -> anyhow::Result<String> {
        let url = format!(
            "{}/admin/users?email={}",
            self.admin_url,
            urlencoding::encode(email)
        );

        let resp = self
            .http
            .get(&url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to look up identity account: {e}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Identity lookup failed ({status}): {body}"
            ));
        }

        let list = resp
            .json::<AdminUserList>()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse identity lookup: {e}"))?;

        list.users
            .into_iter()
            .find(|u| {
                u.email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
            })
            .map(|u| u.id)
            .ok_or_else(|| anyhow::anyhow!("No identity account registered for {email}"))
    }

    async fn update_user(&self, uid: &str, attributes: serde_json::Value) -> anyhow::Result<()> {
        let url = format!("{}/admin/users/{uid}", self.admin_url);

        let resp = self
            .http
            .put(&url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .json(&attributes)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to update identity account: {e}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Identity update failed ({status}): {body}"
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn verify_token(&self, token: &str) -> anyhow::Result<IdentityClaims> {
        let key = DecodingKey::from_secret(self.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        // Provider tokens carry an audience we do not pin.
        validation.validate_aud = false;

        let data = decode::<IdentityClaims>(token, &key, &validation)
            .map_err(|e| anyhow::anyhow!("Invalid identity token: {e}"))?;

        Ok(data.claims)
    }

    async fn delete_user_by_email(&self, email: &str) -> anyhow::Result<()> {
        let uid = self.find_uid_by_email(email).await?;
        let url = format!("{}/admin/users/{uid}", self.admin_url);

        let resp = self
            .http
            .delete(&url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to delete identity account: {e}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Identity delete failed ({status}): {body}"
            ));
        }

        tracing::info!(%email, %uid, "Identity account deleted");
        Ok(())
    }

    async fn update_email(&self, uid: &str, new_email: &str) -> anyhow::Result<()> {
        self.update_user(uid, json!({ "email": new_email })).await
    }

    async fn update_password(&self, uid: &str, new_password: &str) -> anyhow::Result<()> {
        self.update_user(uid, json!({ "password": new_password }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn provider(secret: &str) -> HttpIdentityProvider {
        HttpIdentityProvider::new(
            reqwest::Client::new(),
            &IdentityConfig {
                jwt_secret: secret.to_string(),
                admin_url: "http://localhost:9999/".to_string(),
                service_key: "service".to_string(),
            },
        )
    }

    fn token(secret: &str, exp: i64) -> String {
        let claims = IdentityClaims {
            sub: "uid-1".to_string(),
            email: "ref@example.com".to_string(),
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_verify_valid_token() {
        let exp = chrono::Utc::now().timestamp() + 600;
        let claims = provider("s3cret")
            .verify_token(&token("s3cret", exp))
            .await
            .ok();
        assert_eq!(claims.map(|c| c.email), Some("ref@example.com".to_string()));
    }

    #[tokio::test]
    async fn test_verify_rejects_wrong_secret() {
        let exp = chrono::Utc::now().timestamp() + 600;
        assert!(
            provider("s3cret")
                .verify_token(&token("other", exp))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_verify_rejects_expired() {
        let exp = chrono::Utc::now().timestamp() - 3600;
        assert!(
            provider("s3cret")
                .verify_token(&token("s3cret", exp))
                .await
                .is_err()
        );
    }

    #[test]
    fn test_admin_url_trailing_slash_trimmed() {
        assert_eq!(provider("x").admin_url, "http://localhost:9999");
    }
}
