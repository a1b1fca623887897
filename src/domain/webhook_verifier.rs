//! Gateway webhook signature verification.
//!
//! Authenticates inbound webhook requests with HMAC-SHA256 over the raw body,
//! with timestamp validation against replay and clock drift. Verification
//! failures reject the request before any state is touched.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;
use subtle::ConstantTimeEq;

/// Maximum allowed distance between server time and the request timestamp.
pub const MAX_TIMESTAMP_SKEW_SECS: i64 = 300;

/// Webhook authentication failures.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    /// Timestamp or signature header absent.
    #[error("missing signature headers")]
    MissingHeaders,

    /// Timestamp header present but not a unix timestamp.
    #[error("malformed request timestamp")]
    InvalidTimestamp,

    /// Timestamp more than five minutes from server time.
    #[error("stale request timestamp")]
    StaleTimestamp,

    /// Signature did not match the request body.
    #[error("invalid request signature")]
    InvalidSignature,
}

/// Verifier for gateway webhook signatures.
pub struct SignatureVerifier {
    signing_secret: Secret<String>,
}

impl SignatureVerifier {
    /// Creates a verifier keyed with the shared signing secret.
    pub fn new(signing_secret: impl Into<String>) -> Self {
        Self {
            signing_secret: Secret::new(signing_secret.into()),
        }
    }

    /// Verifies a request against its timestamp header, signature header and
    /// raw unparsed body.
    ///
    /// The signature base string is `v0:<timestamp>:<raw body>`; the expected
    /// header value is `v0=<hex(hmac-sha256)>`. Comparison is constant-time.
    ///
    /// # Errors
    ///
    /// - `MissingHeaders` if either header is absent
    /// - `InvalidTimestamp` if the timestamp is not an integer
    /// - `StaleTimestamp` if it is more than 300 seconds from server time
    /// - `InvalidSignature` on any mismatch
    pub fn verify(
        &self,
        timestamp: Option<&str>,
        signature: Option<&str>,
        raw_body: &[u8],
    ) -> Result<(), AuthError> {
        let (timestamp, signature) = match (timestamp, signature) {
            (Some(t), Some(s)) => (t, s),
            _ => return Err(AuthError::MissingHeaders),
        };

        let parsed: i64 = timestamp.trim().parse().map_err(|_| AuthError::InvalidTimestamp)?;
        self.validate_timestamp(parsed)?;

        let expected = self.compute_signature(timestamp, raw_body);
        if !constant_time_compare(expected.as_bytes(), signature.as_bytes()) {
            return Err(AuthError::InvalidSignature);
        }

        Ok(())
    }

    /// Rejects timestamps more than the allowed skew from server time, in
    /// either direction.
    fn validate_timestamp(&self, timestamp: i64) -> Result<(), AuthError> {
        let now = chrono::Utc::now().timestamp();
        if (now - timestamp).abs() > MAX_TIMESTAMP_SKEW_SECS {
            return Err(AuthError::StaleTimestamp);
        }
        Ok(())
    }

    /// Computes the `v0=<hex>` signature for a timestamp and body.
    fn compute_signature(&self, timestamp: &str, raw_body: &[u8]) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.signing_secret.expose_secret().as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(b"v0:");
        mac.update(timestamp.as_bytes());
        mac.update(b":");
        mac.update(raw_body);
        format!("v0={}", hex::encode(mac.finalize().into_bytes()))
    }
}

/// Constant-time comparison; a naive equality check here would leak timing.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Computes a valid signature header value for test fixtures.
#[cfg(test)]
pub fn sign_for_tests(secret: &str, timestamp: i64, body: &[u8]) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(format!("v0:{timestamp}:").as_bytes());
    mac.update(body);
    format!("v0={}", hex::encode(mac.finalize().into_bytes()))
}
