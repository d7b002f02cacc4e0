use aes_gcm::{aead::Aead, aead::KeyInit, Aes256Gcm, Nonce};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand_core::OsRng;
use rand_core::RngCore;

const NONCE_LEN: usize = 12;

#[derive(thiserror::Error, Debug)]
pub enum EncryptionError {
    #[error("encryption key must be 32 bytes")]
    InvalidKeyLength,
    #[error("failed to seal payload")]
    Encrypt,
    #[error("failed to open payload")]
    Decrypt,
    #[error("invalid ciphertext encoding")]
    InvalidEncoding,
}

/// Encrypts `plaintext` with AES-256-GCM. Output is `nonce || ciphertext`
/// encoded as unpadded base64url so it can travel in a cookie value.
pub fn seal(key: &[u8], plaintext: &str) -> Result<String, EncryptionError> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EncryptionError::InvalidKeyLength)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|_| EncryptionError::Encrypt)?;

    let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    combined.extend_from_slice(&nonce_bytes);
    combined.extend_from_slice(&ciphertext);

    Ok(URL_SAFE_NO_PAD.encode(combined))
}

pub fn open(key: &[u8], sealed: &str) -> Result<String, EncryptionError> {
    let data = URL_SAFE_NO_PAD
        .decode(sealed)
        .map_err(|_| EncryptionError::InvalidEncoding)?;
    if data.len() <= NONCE_LEN {
        return Err(EncryptionError::InvalidEncoding);
    }
    let (nonce_bytes, ciphertext) = data.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EncryptionError::InvalidKeyLength)?;
    let nonce = Nonce::from_slice(nonce_bytes);
    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| EncryptionError::Decrypt)?;
    String::from_utf8(plaintext).map_err(|_| EncryptionError::Decrypt)
}
