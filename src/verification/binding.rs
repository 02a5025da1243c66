//! Binding between verified claims and the identity a request asserts

use super::{VerificationClaims, VerificationError};

/// Reject claims that were minted for a different email or wallet.
///
/// Emails compare trimmed and ASCII case-insensitively. Wallet addresses are
/// hex, so case only carries a checksum and is ignored too. Pass `None` for
/// `wallet_address` when the request does not assert one.
pub fn check_binding(
    claims: &VerificationClaims,
    email: &str,
    wallet_address: Option<&str>,
) -> Result<(), VerificationError> {
    if !claims.email.trim().eq_ignore_ascii_case(email.trim()) {
        return Err(VerificationError::BindingMismatch);
    }

    if let Some(wallet) = wallet_address {
        if !claims.wallet_address.eq_ignore_ascii_case(wallet.trim()) {
            return Err(VerificationError::BindingMismatch);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verification::{VerificationKeys, VerificationSubject};

    const WALLET: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

    fn verified_claims() -> VerificationClaims {
        let keys = VerificationKeys::from_secret("binding-secret");
        let issued = keys
            .issue(&VerificationSubject::new("ada@example.com", WALLET))
            .unwrap();
        keys.verify(&issued.token).unwrap()
    }

    #[test]
    fn test_matching_identity_passes() {
        let claims = verified_claims();
        assert!(check_binding(&claims, "ada@example.com", Some(WALLET)).is_ok());
        assert!(check_binding(&claims, "ada@example.com", None).is_ok());
    }

    #[test]
    fn test_case_and_whitespace_are_ignored() {
        let claims = verified_claims();
        assert!(check_binding(
            &claims,
            " Ada@Example.com ",
            Some(&WALLET.to_lowercase())
        )
        .is_ok());
    }

    #[test]
    fn test_different_email_is_rejected() {
        let claims = verified_claims();
        let result = check_binding(&claims, "eve@example.com", None);
        assert!(matches!(result, Err(VerificationError::BindingMismatch)));
    }

    #[test]
    fn test_different_wallet_is_rejected() {
        let claims = verified_claims();
        let other = format!("0x{}", "f".repeat(40));
        let result = check_binding(&claims, "ada@example.com", Some(&other));
        assert!(matches!(result, Err(VerificationError::BindingMismatch)));
    }
}
