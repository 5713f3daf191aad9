use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;

/// Tokens are only accepted by Ghost for five minutes after issue.
const TOKEN_LIFETIME_SECONDS: i64 = 5 * 60;
const TOKEN_AUDIENCE: &str = "/admin/";

/// A Ghost Admin API key, `{id}:{secret}`, where the secret is hex encoded.
pub struct AdminApiKey {
    id: String,
    secret: Secret<Vec<u8>>,
}

#[derive(Serialize)]
struct Claims<'a> {
    iat: i64,
    exp: i64,
    aud: &'a str,
}

impl AdminApiKey {
    pub fn parse(s: &str) -> Result<Self, String> {
        let trimmed = s.trim();

        let (id, secret) = trimmed
            .split_once(':')
            .ok_or_else(|| "Invalid Admin API key: expected `{id}:{secret}`.".to_string())?;

        if id.is_empty() {
            return Err("Invalid Admin API key: id cannot be empty.".to_string());
        }

        if secret.is_empty() {
            return Err("Invalid Admin API key: secret cannot be empty.".to_string());
        }

        let secret = hex::decode(secret)
            .map_err(|_| "Invalid Admin API key: secret must be hex encoded.".to_string())?;

        Ok(Self {
            id: id.to_string(),
            secret: Secret::new(secret),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Signs a short-lived HS256 token for the `Authorization: Ghost <token>` header.
    pub fn token(&self, issued_at: DateTime<Utc>) -> Result<Secret<String>, jsonwebtoken::errors::Error> {
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(self.id.clone());

        let iat = issued_at.timestamp();
        let claims = Claims {
            iat,
            exp: iat + TOKEN_LIFETIME_SECONDS,
            aud: TOKEN_AUDIENCE,
        };

        let token = jsonwebtoken::encode(
            &header,
            &claims,
            &EncodingKey::from_secret(self.secret.expose_secret()),
        )?;
        Ok(Secret::new(token))
    }
}

impl std::fmt::Debug for AdminApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminApiKey")
            .field("id", &self.id)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
