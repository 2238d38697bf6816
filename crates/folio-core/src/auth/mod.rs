//! Stateless token authentication for the single privileged subject.
//!
//! [`Authenticator::issue`] trades a username/password for a signed token;
//! [`Authenticator::verify`] checks a token's signature and expiry. No
//! session is stored anywhere: a token is valid while its signature matches
//! and `now < exp`.

pub mod jwt;
pub mod password;

use std::time::Duration;

use subtle::{Choice, ConstantTimeEq};

use crate::error::{CoreError, CoreResult};
use crate::identity::Subject;

use self::jwt::{Claims, TokenCodec};

/// Secrets that ship in sample configs and must never be used for real.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-secret",
    "your-super-secret-jwt-key-here",
    "secret",
    "password",
    "jwt-secret",
];

/// The one subject allowed to log in, with its argon2 PHC hash.
#[derive(Debug, Clone)]
pub struct Credential {
    pub subject: String,
    pub password_hash: String,
}

/// A freshly minted bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub subject: Subject,
    pub issued_at: u64,
    pub expires_at: u64,
}

#[derive(Clone)]
pub struct Authenticator {
    credential: Credential,
    codec: TokenCodec,
    ttl: Duration,
}

impl Authenticator {
    /// # Errors
    ///
    /// [`CoreError::Config`] when the secret is empty or a known placeholder,
    /// the ttl is under one second or not a whole number of seconds, or the
    /// password hash is not a PHC string.
    pub fn new(credential: Credential, secret: &str, ttl: Duration) -> CoreResult<Self> {
        if secret.is_empty() {
            return Err(CoreError::Config("token signing secret is missing".to_string()));
        }
        if PLACEHOLDER_SECRETS.contains(&secret) {
            return Err(CoreError::Config(
                "token signing secret matches a known placeholder value".to_string(),
            ));
        }
        if secret.len() < 32 {
            tracing::warn!("Token signing secret is shorter than 32 characters");
        }
        if ttl.as_secs() == 0 {
            return Err(CoreError::Config(
                "token lifetime must be at least one second".to_string(),
            ));
        }
        if ttl.subsec_nanos() != 0 {
            return Err(CoreError::Config(format!(
                "token lifetime must be whole seconds, got {ttl:?}"
            )));
        }
        if credential.subject.is_empty() {
            return Err(CoreError::Config("admin username is empty".to_string()));
        }
        password::validate_hash(&credential.password_hash)?;

        Ok(Self {
            credential,
            codec: TokenCodec::new(secret),
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Checks the credential and mints a token valid from `now` for `ttl`.
    ///
    /// The password hash is verified even when the username is wrong, so
    /// both failures cost the same and return the same error.
    pub fn issue(&self, username: &str, password: &str, now: u64) -> CoreResult<IssuedToken> {
        let username_ok = username.as_bytes().ct_eq(self.credential.subject.as_bytes());
        let password_ok = Choice::from(u8::from(password::verify_password(
            &self.credential.password_hash,
            password,
        )));

        if !bool::from(username_ok & password_ok) {
            tracing::warn!("Failed login attempt");
            return Err(CoreError::InvalidCredentials);
        }

        let expires_at = now.saturating_add(self.ttl.as_secs());
        let claims = Claims {
            sub: self.credential.subject.clone(),
            iat: now,
            exp: expires_at,
        };
        let token = self.codec.sign(&claims)?;

        tracing::info!("Issued token for {} (expires_at: {expires_at})", claims.sub);
        Ok(IssuedToken {
            token,
            subject: Subject::new(claims.sub),
            issued_at: now,
            expires_at,
        })
    }

    /// Returns the token's subject if the signature holds and `now < exp`.
    pub fn verify(&self, token: &str, now: u64) -> CoreResult<Subject> {
        let claims = self.codec.decode(token)?;
        if now >= claims.exp {
            return Err(CoreError::TokenExpired);
        }
        Ok(Subject::new(claims.sub))
    }
}
