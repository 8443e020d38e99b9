//! Signed token verification.

use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde_json::Value;

use crate::auth::key::VerificationKey;

/// Algorithms accepted for an RSA verification key.
const RSA_ALGORITHMS: [Algorithm; 3] = [Algorithm::RS256, Algorithm::RS384, Algorithm::RS512];

/// Why a token was rejected.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token signed with unsupported algorithm {0:?}")]
    UnsupportedAlgorithm(Algorithm),

    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

/// Claims of a token that passed verification.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    pub subject: Option<String>,
    pub claims: Value,
}

/// Verifies tokens against one immutable public key.
///
/// Holds no mutable state; a single instance is shared by all requests.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    key: VerificationKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(key: VerificationKey) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.algorithms = RSA_ALGORITHMS.to_vec();
        // `exp`/`nbf` are checked when present but not required.
        validation.required_spec_claims.clear();
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self { key, validation }
    }

    /// Verify signature and time claims.
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        let header = decode_header(token)?;
        if !RSA_ALGORITHMS.contains(&header.alg) {
            return Err(TokenError::UnsupportedAlgorithm(header.alg));
        }

        let data = decode::<Value>(token, self.key.decoding_key(), &self.validation)?;
        let subject = data
            .claims
            .get("sub")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(VerifiedToken {
            subject,
            claims: data.claims,
        })
    }

    /// Boolean form of [`verify`](Self::verify).
    pub fn is_valid(&self, token: &str) -> bool {
        self.verify(token).is_ok()
    }
}
