//! Request signing.
//!
//! Produces a deterministic authentication tag for a request payload:
//! a keyed MAC over the message bytes, rendered as lower-case hex. The
//! algorithm is chosen by name at startup; an unknown name is a fatal
//! configuration error, surfaced before any network activity.

use crate::error::{ExecError, ExecResult};
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use md5::Md5;
use sha2::{Sha224, Sha256, Sha384, Sha512};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Supported MAC algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignAlgo {
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Md5,
}

impl SignAlgo {
    /// Resolve an algorithm by name, case-insensitively.
    pub fn parse(name: &str) -> ExecResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sha224" => Ok(Self::Sha224),
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            "md5" => Ok(Self::Md5),
            _ => Err(ExecError::UnsupportedAlgorithm(name.to_string())),
        }
    }

    /// Native digest size in bytes.
    #[must_use]
    pub fn digest_size(&self) -> usize {
        match self {
            Self::Sha224 => 28,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
            Self::Md5 => 16,
        }
    }
}

/// API secret wrapper. Zeroed on drop; never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ApiSecret(String);

impl ApiSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for ApiSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiSecret(***)")
    }
}

/// Keyed-MAC signer. Pure: same (secret, message) always yields the same
/// digest, and signing has no side effects.
#[derive(Debug, Clone)]
pub struct Signer {
    algo: SignAlgo,
    secret: ApiSecret,
}

impl Signer {
    /// Create a signer for the named algorithm.
    ///
    /// # Errors
    /// `ExecError::UnsupportedAlgorithm` if the name is not in the registry.
    pub fn new(algo_name: &str, secret: ApiSecret) -> ExecResult<Self> {
        let algo = SignAlgo::parse(algo_name)?;
        Ok(Self { algo, secret })
    }

    /// The configured algorithm.
    #[must_use]
    pub fn algo(&self) -> SignAlgo {
        self.algo
    }

    /// Sign a message, returning the lower-case hex digest.
    ///
    /// Output length is twice the algorithm's native digest size.
    pub fn sign(&self, message: &str) -> ExecResult<String> {
        let key = self.secret.as_bytes();
        let msg = message.as_bytes();
        match self.algo {
            SignAlgo::Sha224 => hmac_hex::<Hmac<Sha224>>(key, msg),
            SignAlgo::Sha256 => hmac_hex::<Hmac<Sha256>>(key, msg),
            SignAlgo::Sha384 => hmac_hex::<Hmac<Sha384>>(key, msg),
            SignAlgo::Sha512 => hmac_hex::<Hmac<Sha512>>(key, msg),
            SignAlgo::Md5 => hmac_hex::<Hmac<Md5>>(key, msg),
        }
    }
}

fn hmac_hex<M: Mac + KeyInit>(key: &[u8], message: &[u8]) -> ExecResult<String> {
    let mut mac =
        <M as Mac>::new_from_slice(key).map_err(|e| ExecError::Signing(e.to_string()))?;
    mac.update(message);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer(algo: &str) -> Signer {
        Signer::new(algo, ApiSecret::new("Jefe")).expect("known algorithm")
    }

    #[test]
    fn test_unknown_algorithm_is_config_error() {
        let err = Signer::new("sha3-256", ApiSecret::new("k")).unwrap_err();
        assert!(matches!(err, ExecError::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn test_algorithm_names_case_insensitive() {
        assert_eq!(SignAlgo::parse("SHA256").unwrap(), SignAlgo::Sha256);
        assert_eq!(SignAlgo::parse("Md5").unwrap(), SignAlgo::Md5);
    }

    #[test]
    fn test_hmac_sha256_rfc4231_case_2() {
        let digest = signer("sha256")
            .sign("what do ya want for nothing?")
            .unwrap();
        assert_eq!(
            digest,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_digest_length_is_twice_native_size() {
        for name in ["sha224", "sha256", "sha384", "sha512", "md5"] {
            let s = signer(name);
            let digest = s.sign("payload").unwrap();
            assert_eq!(digest.len(), 2 * s.algo().digest_size(), "algo {name}");
            assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
            assert_eq!(digest, digest.to_ascii_lowercase());
        }
    }

    #[test]
    fn test_signing_is_deterministic() {
        let s = signer("sha512");
        assert_eq!(s.sign("msg").unwrap(), s.sign("msg").unwrap());
        assert_ne!(s.sign("msg").unwrap(), s.sign("msg2").unwrap());
    }
}
