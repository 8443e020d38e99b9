//! Public verification key loading.
//!
//! The key is read once at startup from a PEM file and shared by every
//! request through the [`TokenVerifier`](crate::auth::TokenVerifier).

use std::fs;
use std::path::{Path, PathBuf};

use jsonwebtoken::DecodingKey;

/// Why a verification key could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum KeyLoadError {
    #[error("failed to read public key {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse PEM block containing the public key")]
    MissingPemBlock,

    #[error("expected an RSA public key, found {found}")]
    UnsupportedKeyType { found: String },

    #[error("failed to parse RSA public key: {0}")]
    Malformed(#[source] jsonwebtoken::errors::Error),
}

/// An RSA public key ready to verify signatures.
#[derive(Clone)]
pub struct VerificationKey {
    inner: DecodingKey,
}

impl std::fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationKey").finish_non_exhaustive()
    }
}

impl VerificationKey {
    /// Load a PEM-encoded RSA public key from disk.
    pub fn load(path: &Path) -> Result<Self, KeyLoadError> {
        let pem = fs::read(path).map_err(|source| KeyLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_pem(&pem)
    }

    /// Parse a PEM-encoded RSA public key (`PUBLIC KEY` or `RSA PUBLIC KEY`).
    pub fn from_pem(pem: &[u8]) -> Result<Self, KeyLoadError> {
        let label = pem_label(pem).ok_or(KeyLoadError::MissingPemBlock)?;
        if label != "PUBLIC KEY" && label != "RSA PUBLIC KEY" {
            return Err(KeyLoadError::UnsupportedKeyType {
                found: label.to_string(),
            });
        }

        match DecodingKey::from_rsa_pem(pem) {
            Ok(inner) => Ok(Self { inner }),
            // A well-formed key of another family is reported as such.
            Err(_) if DecodingKey::from_ec_pem(pem).is_ok() => {
                Err(KeyLoadError::UnsupportedKeyType {
                    found: "EC public key".to_string(),
                })
            }
            Err(_) if DecodingKey::from_ed_pem(pem).is_ok() => {
                Err(KeyLoadError::UnsupportedKeyType {
                    found: "EdDSA public key".to_string(),
                })
            }
            Err(e) => Err(KeyLoadError::Malformed(e)),
        }
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.inner
    }
}

/// The label of the first `-----BEGIN <label>-----` line, if any.
fn pem_label(pem: &[u8]) -> Option<&str> {
    let text = std::str::from_utf8(pem).ok()?;
    let start = text.find("-----BEGIN ")? + "-----BEGIN ".len();
    let rest = &text[start..];
    let end = rest.find("-----")?;
    let label = &rest[..end];
    if label.contains('\n') {
        return None;
    }
    text[start + end..].contains("-----END ").then_some(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUBLIC_PEM: &str = include_str!("../../tests/keys/test_public.pem");
    const PRIVATE_PEM: &str = include_str!("../../tests/keys/test_private.pem");
    const EC_PUBLIC_PEM: &str = include_str!("../../tests/keys/ec_public.pem");

    #[test]
    fn test_load_rsa_public_key() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/keys/test_public.pem");
        assert!(VerificationKey::load(&path).is_ok());
        assert!(VerificationKey::from_pem(PUBLIC_PEM.as_bytes()).is_ok());
    }

    #[test]
    fn test_missing_file() {
        let err = VerificationKey::load(Path::new("/nonexistent/key.pem")).unwrap_err();
        assert!(matches!(err, KeyLoadError::Io { .. }));
    }

    #[test]
    fn test_no_pem_block() {
        let err = VerificationKey::from_pem(b"just some text").unwrap_err();
        assert!(matches!(err, KeyLoadError::MissingPemBlock));

        let err = VerificationKey::from_pem(b"-----BEGIN PUBLIC KEY-----\nAAAA").unwrap_err();
        assert!(matches!(err, KeyLoadError::MissingPemBlock));
    }

    #[test]
    fn test_garbage_inside_pem_block() {
        let pem = "-----BEGIN PUBLIC KEY-----\nbm90IGEga2V5\n-----END PUBLIC KEY-----\n";
        let err = VerificationKey::from_pem(pem.as_bytes()).unwrap_err();
        assert!(matches!(err, KeyLoadError::Malformed(_)));
    }

    #[test]
    fn test_rejects_other_key_types() {
        let err = VerificationKey::from_pem(EC_PUBLIC_PEM.as_bytes()).unwrap_err();
        assert!(matches!(err, KeyLoadError::UnsupportedKeyType { ref found } if found.contains("EC")));

        let err = VerificationKey::from_pem(PRIVATE_PEM.as_bytes()).unwrap_err();
        assert!(matches!(err, KeyLoadError::UnsupportedKeyType { ref found } if found == "RSA PRIVATE KEY"));
    }
}
