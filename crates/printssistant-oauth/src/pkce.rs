//! PKCE (RFC 7636) verifier/challenge generation.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of random bytes behind a code verifier or `state` value.
const RANDOM_BYTES: usize = 32;

/// PKCE code verifier and challenge pair.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    pub verifier: String,
    pub challenge: String,
}

impl PkceChallenge {
    /// Generate a new PKCE challenge pair using the `S256` method.
    pub fn generate() -> Self {
        let verifier = random_token();
        let challenge = Self::challenge_for(&verifier);

        Self {
            verifier,
            challenge,
        }
    }

    /// Compute the `S256` challenge for an existing verifier.
    pub fn challenge_for(verifier: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(verifier.as_bytes());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }
}

/// Generate a random `state` string echoed through the provider redirect.
pub fn generate_state() -> String {
    random_token()
}

fn random_token() -> String {
    let mut bytes = [0u8; RANDOM_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pkce_generation() {
        let pkce = PkceChallenge::generate();
        assert!(!pkce.verifier.is_empty());
        assert!(!pkce.challenge.is_empty());
        assert_ne!(pkce.verifier, pkce.challenge);
    }

    #[test]
    fn test_challenge_is_sha256_of_verifier() {
        for _ in 0..16 {
            let pkce = PkceChallenge::generate();
            let decoded = URL_SAFE_NO_PAD.decode(&pkce.challenge).unwrap();
            let expected = Sha256::digest(pkce.verifier.as_bytes());
            assert_eq!(decoded.as_slice(), expected.as_slice());
        }
    }

    #[test]
    fn test_verifier_carries_32_random_bytes() {
        let pkce = PkceChallenge::generate();
        let raw = URL_SAFE_NO_PAD.decode(&pkce.verifier).unwrap();
        assert_eq!(raw.len(), 32);
        // 43 chars is the RFC 7636 minimum verifier length.
        assert_eq!(pkce.verifier.len(), 43);
        assert!(!pkce.verifier.contains('='));
        assert!(!pkce.verifier.contains('+'));
        assert!(!pkce.verifier.contains('/'));
    }

    #[test]
    fn test_known_vector() {
        // RFC 7636 appendix B.
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        assert_eq!(
            PkceChallenge::challenge_for(verifier),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn test_state_generation() {
        let state1 = generate_state();
        let state2 = generate_state();
        assert!(!state1.is_empty());
        assert_ne!(state1, state2);
    }
}
