//! HMAC signing of the payment callback URLs.
//!
//! The gateway only echoes these URLs back; the signature is what lets a
//! callback mutate order state.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

fn mac_for(secret: &str, token: Uuid, ts: i64) -> Option<Hmac<Sha256>> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(format!("{token}\n{ts}\n").as_bytes());
    Some(mac)
}

pub fn sign_callback(secret: &str, token: Uuid, ts: i64) -> Option<String> {
    Some(hex::encode(mac_for(secret, token, ts)?.finalize().into_bytes()))
}

pub fn verify_callback(secret: &str, token: Uuid, ts: i64, signature: &str) -> bool {
    let Ok(sig) = hex::decode(signature) else {
        return false;
    };
    match mac_for(secret, token, ts) {
        Some(mac) => mac.verify_slice(&sig).is_ok(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let token = Uuid::from_u128(42);
        let sig = sign_callback("secret", token, 1_700_000_000).unwrap();
        assert!(verify_callback("secret", token, 1_700_000_000, &sig));
    }

    #[test]
    fn test_tampered_fields_fail() {
        let token = Uuid::from_u128(42);
        let sig = sign_callback("secret", token, 1_700_000_000).unwrap();
        assert!(!verify_callback("secret", Uuid::from_u128(43), 1_700_000_000, &sig));
        assert!(!verify_callback("secret", token, 1_700_000_001, &sig));
        assert!(!verify_callback("other", token, 1_700_000_000, &sig));
    }

    #[test]
    fn test_garbage_signature_fails() {
        assert!(!verify_callback("secret", Uuid::from_u128(1), 0, "not-hex"));
        assert!(!verify_callback("secret", Uuid::from_u128(1), 0, "deadbeef"));
    }
}
