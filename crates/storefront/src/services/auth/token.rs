//! Bearer token issuing and verification.
//!
//! Tokens are HS256 JWTs. Customer tokens carry the user ID, admin tokens
//! carry the admin ID with `is_admin` set; both expire after a configured
//! number of hours.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use brandshop_core::{AdminId, Email, UserId};

use crate::config::AuthConfig;

/// Errors that can occur when issuing or verifying a token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token's `exp` is in the past.
    #[error("token expired")]
    Expired,

    /// Bad signature, malformed token or unexpected claims.
    #[error("invalid token")]
    Invalid,

    /// Signing failed.
    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

/// Claims carried by every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID, or admin ID when `is_admin` is set.
    pub id: i32,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// The customer this token belongs to, if it is a customer token.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        if self.is_admin {
            None
        } else {
            Some(UserId::new(self.id))
        }
    }

    /// The admin this token belongs to, if it is an admin token.
    #[must_use]
    pub const fn admin_id(&self) -> Option<AdminId> {
        if self.is_admin {
            Some(AdminId::new(self.id))
        } else {
            None
        }
    }
}

/// Signs and verifies bearer tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    user_ttl: Duration,
    admin_ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer from the auth configuration.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            user_ttl: Duration::hours(config.user_token_ttl_hours),
            admin_ttl: Duration::hours(config.admin_token_ttl_hours),
        }
    }

    /// Issue a customer token.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if the token cannot be encoded.
    pub fn issue_user(&self, id: UserId, email: &Email) -> Result<String, TokenError> {
        self.sign(id.as_i32(), email, false, self.user_ttl)
    }

    /// Issue an admin token.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if the token cannot be encoded.
    pub fn issue_admin(&self, id: AdminId, email: &Email) -> Result<String, TokenError> {
        self.sign(id.as_i32(), email, true, self.admin_ttl)
    }

    /// Verify a token's signature and expiry and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` for expired tokens and
    /// `TokenError::Invalid` for anything else that fails validation.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }

    fn sign(
        &self,
        id: i32,
        email: &Email,
        is_admin: bool,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            id,
            email: email.as_str().to_owned(),
            is_admin,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Signing)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(&AuthConfig {
            jwt_secret: SecretString::from(secret.to_owned()),
            user_token_ttl_hours: 24,
            admin_token_ttl_hours: 8,
        })
    }

    fn email() -> Email {
        Email::parse("shopper@brandshop.test").unwrap()
    }

    #[test]
    fn test_user_token_round_trip() {
        let issuer = issuer("Qm9y7#kLp2$vXz8!rTn4&wYc6^hJd1@s");
        let token = issuer.issue_user(UserId::new(12), &email()).unwrap();
        let claims = issuer.verify(&token).unwrap();

        assert_eq!(claims.user_id(), Some(UserId::new(12)));
        assert_eq!(claims.admin_id(), None);
        assert_eq!(claims.email, "shopper@brandshop.test");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_admin_token_carries_admin_claim() {
        let issuer = issuer("Qm9y7#kLp2$vXz8!rTn4&wYc6^hJd1@s");
        let token = issuer.issue_admin(AdminId::new(1), &email()).unwrap();
        let claims = issuer.verify(&token).unwrap();

        assert!(claims.is_admin);
        assert_eq!(claims.admin_id(), Some(AdminId::new(1)));
        assert_eq!(claims.user_id(), None);
        assert_eq!(claims.exp - claims.iat, 8 * 3600);
    }

    #[test]
    fn test_token_from_other_secret_is_invalid() {
        let token = issuer("Qm9y7#kLp2$vXz8!rTn4&wYc6^hJd1@s")
            .issue_user(UserId::new(3), &email())
            .unwrap();
        let result = issuer("Zx1!aQ2@wS3#eD4$rF5%tG6^yH7&uJ8*").verify(&token);

        assert!(matches!(result, Err(TokenError::Invalid)));
        assert!(matches!(
            issuer("Zx1!aQ2@wS3#eD4$rF5%tG6^yH7&uJ8*").verify("not.a.jwt"),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let issuer = issuer("Qm9y7#kLp2$vXz8!rTn4&wYc6^hJd1@s");
        let token = issuer
            .sign(5, &email(), false, Duration::hours(-2))
            .unwrap();

        assert!(matches!(issuer.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_missing_admin_claim_defaults_to_customer() {
        #[derive(Serialize)]
        struct LegacyClaims {
            id: i32,
            email: String,
            iat: i64,
            exp: i64,
        }

        let issuer = issuer("Qm9y7#kLp2$vXz8!rTn4&wYc6^hJd1@s");
        let now = Utc::now().timestamp();
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &LegacyClaims {
                id: 9,
                email: "legacy@brandshop.test".to_string(),
                iat: now,
                exp: now + 60,
            },
            &issuer.encoding,
        )
        .unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.user_id(), Some(UserId::new(9)));
    }
}
