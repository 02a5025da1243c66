//! Verification token issuance and validation

use std::borrow::Cow;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::VerificationError;

/// Lifetime of a verification token
pub const TOKEN_TTL_SECONDS: i64 = 600;

/// Identity that completed OTP verification
///
/// Absent fields deserialize empty so validation reports them per field.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerificationSubject {
    #[serde(default)]
    #[validate(
        email(message = "Invalid email"),
        length(max = 254, message = "Email must be at most 254 characters")
    )]
    pub email: String,

    #[serde(rename = "walletAddress", default)]
    #[validate(custom = "validate_wallet_address")]
    pub wallet_address: String,
}

impl VerificationSubject {
    pub fn new(email: impl Into<String>, wallet_address: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            wallet_address: wallet_address.into(),
        }
    }
}

/// Claims carried by a verification token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationClaims {
    pub email: String,
    pub wallet_address: String,
    pub verified: bool,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Freshly minted token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
    pub claims: VerificationClaims,
}

/// Signing and verification keys derived from the configured secret
#[derive(Clone)]
pub struct VerificationKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for VerificationKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationKeys").finish_non_exhaustive()
    }
}

impl VerificationKeys {
    pub fn from_secret(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // expiry is compared against the caller's clock in verify_at
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Mint a token for a subject that just passed OTP verification
    pub fn issue(&self, subject: &VerificationSubject) -> Result<IssuedToken, VerificationError> {
        self.issue_at(subject, Utc::now())
    }

    pub fn issue_at(
        &self,
        subject: &VerificationSubject,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, VerificationError> {
        subject.validate()?;

        let claims = VerificationClaims {
            email: subject.email.clone(),
            wallet_address: subject.wallet_address.clone(),
            verified: true,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(TOKEN_TTL_SECONDS)).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            tracing::error!(error = %e, "Verification token signing failed");
            VerificationError::SigningFailure
        })?;

        Ok(IssuedToken {
            token,
            expires_in: TOKEN_TTL_SECONDS,
            claims,
        })
    }

    /// Validate a token's signature and expiry
    ///
    /// Every failure collapses into [`VerificationError::InvalidToken`].
    pub fn verify(&self, token: &str) -> Result<VerificationClaims, VerificationError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<VerificationClaims, VerificationError> {
        let claims = decode::<VerificationClaims>(token, &self.decoding, &self.validation)
            .map_err(|_| VerificationError::InvalidToken)?
            .claims;

        if !claims.verified || now.timestamp() >= claims.exp {
            return Err(VerificationError::InvalidToken);
        }

        Ok(claims)
    }
}

fn is_wallet_address(value: &str) -> bool {
    value.len() == 42
        && value.starts_with("0x")
        && value[2..].bytes().all(|b| b.is_ascii_hexdigit())
}

fn validate_wallet_address(value: &str) -> Result<(), ValidationError> {
    if is_wallet_address(value) {
        return Ok(());
    }
    let mut err = ValidationError::new("wallet_address");
    err.message = Some(Cow::from("Invalid wallet address"));
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const WALLET: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

    fn keys() -> VerificationKeys {
        VerificationKeys::from_secret("test-secret-key")
    }

    fn subject() -> VerificationSubject {
        VerificationSubject::new("ada@example.com", WALLET)
    }

    #[test]
    fn test_issue_then_verify_returns_input() {
        let keys = keys();
        let issued = keys.issue(&subject()).unwrap();
        assert_eq!(issued.expires_in, 600);
        assert_eq!(issued.claims.exp - issued.claims.iat, 600);

        let claims = keys.verify(&issued.token).unwrap();
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.wallet_address, WALLET);
        assert!(claims.verified);
        assert_eq!(claims, issued.claims);
    }

    #[test]
    fn test_claim_names_on_the_wire() {
        let issued = keys().issue(&subject()).unwrap();
        let json = serde_json::to_value(&issued.claims).unwrap();
        assert_eq!(json["walletAddress"], WALLET);
        assert_eq!(json["verified"], true);
        assert!(json.get("exp").is_some());
        assert!(json.get("iat").is_some());
    }

    #[test]
    fn test_verify_is_repeatable_within_window() {
        let keys = keys();
        let now = Utc::now();
        let issued = keys.issue_at(&subject(), now).unwrap();

        let first = keys.verify_at(&issued.token, now + Duration::seconds(30));
        let second = keys.verify_at(&issued.token, now + Duration::seconds(599));
        assert_eq!(first.unwrap(), second.unwrap());
    }

    #[test]
    fn test_expired_token_is_invalid() {
        let keys = keys();
        let now = Utc::now();
        let issued = keys.issue_at(&subject(), now).unwrap();

        let at_expiry = keys.verify_at(&issued.token, now + Duration::seconds(600));
        assert!(matches!(at_expiry, Err(VerificationError::InvalidToken)));

        let later = keys.verify_at(&issued.token, now + Duration::minutes(30));
        assert!(matches!(later, Err(VerificationError::InvalidToken)));
    }

    #[test]
    fn test_token_issued_in_the_past_is_rejected_now() {
        let keys = keys();
        let issued = keys
            .issue_at(&subject(), Utc::now() - Duration::minutes(11))
            .unwrap();
        assert!(matches!(
            keys.verify(&issued.token),
            Err(VerificationError::InvalidToken)
        ));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let issued = VerificationKeys::from_secret("secret1")
            .issue(&subject())
            .unwrap();
        let result = VerificationKeys::from_secret("secret2").verify(&issued.token);
        assert!(matches!(result, Err(VerificationError::InvalidToken)));
    }

    #[test]
    fn test_malformed_token_is_invalid() {
        let keys = keys();
        for token in ["", "invalid.token.here", "a.b", "not-a-jwt"] {
            assert!(matches!(
                keys.verify(token),
                Err(VerificationError::InvalidToken)
            ));
        }
    }

    #[test]
    fn test_single_bit_mutation_is_invalid() {
        let keys = keys();
        let issued = keys.issue(&subject()).unwrap();
        let original = issued.token.as_bytes();

        for pos in 0..original.len() {
            for bit in 0..7 {
                let mut mutated = original.to_vec();
                mutated[pos] ^= 1 << bit;
                let Ok(mutated) = String::from_utf8(mutated) else {
                    continue;
                };
                assert!(
                    matches!(keys.verify(&mutated), Err(VerificationError::InvalidToken)),
                    "mutation at byte {} bit {} was accepted",
                    pos,
                    bit
                );
            }
        }
    }

    #[test]
    fn test_unverified_claims_are_rejected() {
        let now = Utc::now();
        let claims = VerificationClaims {
            email: "ada@example.com".to_string(),
            wallet_address: WALLET.to_string(),
            verified: false,
            iat: now.timestamp(),
            exp: now.timestamp() + 600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret-key"),
        )
        .unwrap();

        assert!(matches!(
            keys().verify(&token),
            Err(VerificationError::InvalidToken)
        ));
    }

    #[test]
    fn test_other_algorithms_are_rejected() {
        let now = Utc::now();
        let claims = VerificationClaims {
            email: "ada@example.com".to_string(),
            wallet_address: WALLET.to_string(),
            verified: true,
            iat: now.timestamp(),
            exp: now.timestamp() + 600,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"test-secret-key"),
        )
        .unwrap();

        assert!(matches!(
            keys().verify(&token),
            Err(VerificationError::InvalidToken)
        ));
    }

    #[test]
    fn test_wallet_address_shape() {
        let keys = keys();

        let short = keys.issue(&VerificationSubject::new("ada@example.com", "0x123"));
        match short {
            Err(VerificationError::Validation(violations)) => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].field, "walletAddress");
                assert_eq!(violations[0].message, "Invalid wallet address");
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        let all_f = format!("0x{}", "f".repeat(40));
        assert!(keys
            .issue(&VerificationSubject::new("ada@example.com", all_f))
            .is_ok());

        for bad in [
            format!("0X{}", "f".repeat(40)),
            format!("0x{}", "g".repeat(40)),
            format!("0x{}", "f".repeat(41)),
            "f".repeat(42),
        ] {
            assert!(matches!(
                keys.issue(&VerificationSubject::new("ada@example.com", bad)),
                Err(VerificationError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_email_shape() {
        let keys = keys();

        assert!(matches!(
            keys.issue(&VerificationSubject::new("not-an-email", WALLET)),
            Err(VerificationError::Validation(_))
        ));

        let long = format!("{}@example.com", "a".repeat(250));
        match keys.issue(&VerificationSubject::new(long, WALLET)) {
            Err(VerificationError::Validation(violations)) => {
                assert!(violations.iter().all(|v| v.field == "email"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_concurrent_issue_keeps_claims_separate() {
        let keys = Arc::new(keys());

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let keys = keys.clone();
                tokio::spawn(async move {
                    let subject = VerificationSubject::new(
                        format!("user{}@example.com", i),
                        format!("0x{:040x}", i),
                    );
                    let issued = keys.issue(&subject).unwrap();
                    (subject, issued.token)
                })
            })
            .collect();

        let mut tokens = Vec::new();
        for handle in handles {
            let (subject, token) = handle.await.unwrap();
            let claims = keys.verify(&token).unwrap();
            assert_eq!(claims.email, subject.email);
            assert_eq!(claims.wallet_address, subject.wallet_address);
            tokens.push(token);
        }

        tokens.sort();
        tokens.dedup();
        assert_eq!(tokens.len(), 32);
    }
}
