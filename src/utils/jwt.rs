use std::collections::HashSet;

use jsonwebtoken::{
    decode, encode, errors::Error, Algorithm, DecodingKey, EncodingKey, Header, TokenData,
    Validation,
};
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Minimum acceptable size for the session secret in bytes.
pub const MIN_SESSION_SECRET_LENGTH: usize = 32;
/// Minimum number of unique bytes expected for the secret to avoid trivially guessable values.
const MIN_UNIQUE_SECRET_BYTES: usize = 8;

#[derive(Debug, Error)]
pub enum SessionSecretError {
    #[error("NEXTAUTH_SECRET must be at least {required} bytes, but {actual} bytes were provided")]
    TooShort { actual: usize, required: usize },
    #[error(
        "NEXTAUTH_SECRET must contain sufficient entropy (at least {required} unique bytes); only {actual} unique bytes found"
    )]
    LowEntropy { actual: usize, required: usize },
}

/// Key material derived from the session secret: an HS256 signing pair and
/// a 256-bit sealing key for the cookie envelope.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    sealing: [u8; 32],
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys").finish_non_exhaustive()
    }
}

impl SessionKeys {
    pub fn from_secret(secret: impl AsRef<[u8]>) -> Result<Self, SessionSecretError> {
        let bytes = secret.as_ref();
        validate_secret(bytes)?;

        Ok(Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            sealing: Sha256::digest(bytes).into(),
        })
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }

    pub fn sealing_key(&self) -> &[u8] {
        &self.sealing
    }
}

fn validate_secret(secret: &[u8]) -> Result<(), SessionSecretError> {
    if secret.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(SessionSecretError::TooShort {
            actual: secret.len(),
            required: MIN_SESSION_SECRET_LENGTH,
        });
    }

    let unique = secret.iter().copied().collect::<HashSet<_>>().len();
    if unique < MIN_UNIQUE_SECRET_BYTES {
        return Err(SessionSecretError::LowEntropy {
            actual: unique,
            required: MIN_UNIQUE_SECRET_BYTES,
        });
    }

    Ok(())
}

pub fn create_jwt<T: Serialize>(claims: &T, keys: &SessionKeys) -> Result<String, Error> {
    encode(&Header::new(Algorithm::HS256), claims, keys.encoding_key())
}

/// Verifies signature and `exp` (no leeway).
pub fn decode_jwt<T: DeserializeOwned>(
    token: &str,
    keys: &SessionKeys,
) -> Result<TokenData<T>, Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    validation.required_spec_claims = HashSet::from(["exp".to_string()]);
    decode::<T>(token, keys.decoding_key(), &validation)
}
