//! HS256 access token minting and verification.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::{debug, warn};
use uuid::Uuid;

use ams_core::config::AuthConfig;
use ams_core::traits::Clock;
use ams_entity::user::UserAccount;

use super::claims::Claims;
use super::secret::generate_refresh_secret;
use crate::error::{AuthError, AuthResult};

/// Minimum recommended HMAC key length in bytes.
const RECOMMENDED_SECRET_BYTES: usize = 32;

/// A freshly signed access token and the instant it expires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintedToken {
    /// Compact JWS string.
    pub token: String,
    /// Matches the `exp` claim.
    pub expires_at: DateTime<Utc>,
}

/// Mints and verifies access tokens and produces refresh secrets.
///
/// Signature, issuer and audience are checked by `jsonwebtoken`; expiry is
/// checked against the injected [`Clock`] with no leeway so the decision
/// follows the same time source that issued the token.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    access_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_ttl", &self.access_ttl)
            .finish()
    }
}

impl TokenCodec {
    /// Builds a codec from configuration.
    ///
    /// Fails when no signing secret is configured.
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> AuthResult<Self> {
        let secret = config
            .jwt_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::Configuration("JWT signing secret is not set".to_string()))?;

        if secret.len() < RECOMMENDED_SECRET_BYTES {
            warn!(
                length = secret.len(),
                recommended = RECOMMENDED_SECRET_BYTES,
                "JWT signing secret is shorter than recommended"
            );
        }

        let access_ttl = access_ttl(config.access_token_ttl_hours, clock.now())?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_issuer(&[config.jwt_issuer.as_str()]);
        validation.set_audience(&[config.jwt_audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
            access_ttl,
            clock,
        })
    }

    /// Access token lifetime.
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Mints an access token for `account`, valid from now for the access TTL.
    pub fn mint(&self, account: &UserAccount) -> AuthResult<MintedToken> {
        let now = self.clock.now();
        let exp = now.checked_add_signed(self.access_ttl).ok_or_else(|| {
            AuthError::Configuration("Access token expiry is out of range".to_string())
        })?;

        let claims = Claims {
            sub: account.id(),
            email: account.email().to_string(),
            name: account.user.display_name(),
            roles: account.roles.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Configuration(format!("Failed to sign access token: {e}")))?;

        Ok(MintedToken {
            token,
            expires_at: claims.expires_at().unwrap_or(exp),
        })
    }

    /// Verifies an access token and returns its claims.
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!(error = %e, "Access token rejected");
            AuthError::InvalidToken
        })?;

        if data.claims.is_expired_at(self.clock.now()) {
            debug!(user_id = %data.claims.sub, "Access token expired");
            return Err(AuthError::InvalidToken);
        }

        Ok(data.claims)
    }

    /// Generates an opaque refresh secret.
    pub fn mint_refresh_secret(&self) -> String {
        generate_refresh_secret()
    }
}

/// Converts the configured hour count, rejecting zero and anything that
/// cannot be added to `now`.
fn access_ttl(hours: u64, now: DateTime<Utc>) -> AuthResult<Duration> {
    i64::try_from(hours)
        .ok()
        .filter(|h| *h > 0)
        .and_then(Duration::try_hours)
        .filter(|ttl| now.checked_add_signed(*ttl).is_some())
        .ok_or_else(|| {
            AuthError::Configuration(format!(
                "Access token lifetime of {hours} hours is out of range"
            ))
        })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::testing::{ManualClock, account};

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: Some(SECRET.to_string()),
            ..AuthConfig::default()
        }
    }

    fn codec_with(config: &AuthConfig) -> (TokenCodec, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let codec = TokenCodec::new(config, clock.clone()).unwrap();
        (codec, clock)
    }

    #[test]
    fn test_missing_secret_is_configuration_error() {
        let clock = Arc::new(ManualClock::default());
        let err = TokenCodec::new(&AuthConfig::default(), clock.clone()).unwrap_err();
        assert!(matches!(err, AuthError::Configuration(_)));

        let empty = AuthConfig {
            jwt_secret: Some(String::new()),
            ..AuthConfig::default()
        };
        assert!(matches!(
            TokenCodec::new(&empty, clock).unwrap_err(),
            AuthError::Configuration(_)
        ));
    }

    #[test]
    fn test_out_of_range_access_ttl_is_configuration_error() {
        for hours in [0, u64::MAX, i64::MAX as u64, 1_000_000_000_000] {
            let bad = AuthConfig {
                access_token_ttl_hours: hours,
                ..config()
            };
            let clock = Arc::new(ManualClock::default());
            assert!(
                matches!(TokenCodec::new(&bad, clock), Err(AuthError::Configuration(_))),
                "{hours} hours should be rejected"
            );
        }
    }

    #[test]
    fn test_large_access_ttl_still_verifies() {
        let long = AuthConfig {
            access_token_ttl_hours: 24 * 365 * 100,
            ..config()
        };
        let (codec, _) = codec_with(&long);
        assert_eq!(codec.access_ttl(), Duration::hours(24 * 365 * 100));

        let minted = codec.mint(&account("dave@example.com", &[])).unwrap();
        assert!(codec.verify(&minted.token).is_ok());
    }

    #[test]
    fn test_mint_sets_claims_and_expiry() {
        let (codec, clock) = codec_with(&config());
        let user = account("alice@example.com", &["Admin", "Technician"]);

        let minted = codec.mint(&user).unwrap();
        let claims = codec.verify(&minted.token).unwrap();

        assert_eq!(claims.sub, user.id());
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.name, user.user.display_name());
        assert_eq!(claims.roles, vec!["Admin", "Technician"]);
        assert_eq!(claims.iss, "ams-api");
        assert_eq!(claims.aud, "ams-clients");
        assert_eq!(claims.iat, clock.now().timestamp());
        assert_eq!(claims.exp - claims.iat, 6 * 3600);
        assert_eq!(minted.expires_at.timestamp(), claims.exp);
    }

    #[test]
    fn test_expiry_follows_injected_clock() {
        let (codec, clock) = codec_with(&config());
        let minted = codec.mint(&account("bob@example.com", &[])).unwrap();

        clock.advance(Duration::hours(6) - Duration::seconds(1));
        assert!(codec.verify(&minted.token).is_ok());

        clock.advance(Duration::seconds(1));
        assert!(matches!(
            codec.verify(&minted.token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_rejects_foreign_signature_issuer_and_audience() {
        let (codec, _) = codec_with(&config());
        let user = account("carol@example.com", &[]);

        let other_key = AuthConfig {
            jwt_secret: Some("another-secret-another-secret-xx".to_string()),
            ..config()
        };
        let (foreign, _) = codec_with(&other_key);
        let token = foreign.mint(&user).unwrap().token;
        assert!(matches!(codec.verify(&token), Err(AuthError::InvalidToken)));

        let other_issuer = AuthConfig {
            jwt_issuer: "someone-else".to_string(),
            ..config()
        };
        let (foreign, _) = codec_with(&other_issuer);
        let token = foreign.mint(&user).unwrap().token;
        assert!(matches!(codec.verify(&token), Err(AuthError::InvalidToken)));

        let other_audience = AuthConfig {
            jwt_audience: "other-clients".to_string(),
            ..config()
        };
        let (foreign, _) = codec_with(&other_audience);
        let token = foreign.mint(&user).unwrap().token;
        assert!(matches!(codec.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_rejects_garbage() {
        let (codec, _) = codec_with(&config());
        assert!(codec.verify("").is_err());
        assert!(codec.verify("not.a.jwt").is_err());
    }

    proptest! {
        #[test]
        fn prop_verify_preserves_identity(
            local in "[a-z]{1,12}",
            roles in proptest::collection::vec("[A-Za-z]{1,10}", 0..4),
        ) {
            let (codec, _) = codec_with(&config());
            let role_refs: Vec<&str> = roles.iter().map(String::as_str).collect();
            let user = account(&format!("{local}@example.com"), &role_refs);

            let claims = codec.verify(&codec.mint(&user).unwrap().token).unwrap();

            prop_assert_eq!(claims.sub, user.id());
            prop_assert_eq!(claims.email, user.email().to_string());
            prop_assert_eq!(claims.roles, roles);
        }
    }
}
