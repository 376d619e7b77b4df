use std::time::Duration;

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use super::claims::Claims;
use crate::{config::JwtConfig, store::Role};

#[derive(Debug, thiserror::Error)]
#[error("invalid token")]
pub struct InvalidToken;

/// Signing and verification keys plus the claims policy.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Option<Duration>,
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: cfg
                .ttl_minutes
                .and_then(|m| u64::try_from(m).ok())
                .filter(|m| *m > 0)
                .map(|m| Duration::from_secs(m.saturating_mul(60))),
        }
    }

    pub fn sign(&self, username: &str, role: Role) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = match self.ttl {
            Some(ttl) => {
                let secs = i64::try_from(ttl.as_secs())?;
                let exp = now
                    .checked_add(TimeDuration::seconds(secs))
                    .ok_or_else(|| anyhow::anyhow!("token expiry out of range"))?;
                Some(exp.unix_timestamp() as usize)
            }
            None => None,
        };
        let claims = Claims {
            username: username.to_string(),
            role,
            iat: now.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            exp,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(%username, %role, "jwt signed");
        Ok(token)
    }

    /// Verifies signature, issuer, audience and (when configured) expiry.
    /// The cause of a failure is logged at debug only.
    pub fn verify(&self, token: &str) -> Result<Claims, InvalidToken> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        if self.ttl.is_some() {
            validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        } else {
            validation.set_required_spec_claims(&["iss", "aud"]);
            validation.validate_exp = false;
        }
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            debug!(error = %e, "jwt rejected");
            InvalidToken
        })?;
        debug!(username = %data.claims.username, role = %data.claims.role, "jwt verified");
        Ok(data.claims)
    }
}
