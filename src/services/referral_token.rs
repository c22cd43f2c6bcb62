// Referral token cipher.
//
// Encrypts the sharer's user id into an opaque, URL-safe token so every copy
// of a distributed link carries a re-decryptable sharer reference without a
// server-side token table. Encryption is AES-256-CBC with a key and IV both
// derived from the configured secret, which makes the scheme deterministic:
// the same sharer always produces the same token.
//
// SECURITY NOTICE: the fixed IV is a deliberate weakening. Identical
// plaintext yields identical ciphertext, so tokens are linkable and not
// semantically secure. The protected value is a user id, not credentials or
// payload data; do not reuse this construction for anything higher-stakes.
// Swapping in a random-nonce scheme or a lookup table only requires changing
// this module, since callers never see past encode/decode.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const BLOCK_SIZE: usize = 16;

#[derive(Error, Debug)]
pub enum ReferralTokenError {
    #[error("Token is not valid hex")]
    MalformedHex,

    #[error("Ciphertext length is not a whole number of blocks")]
    BadCiphertext,

    #[error("Token was not produced by this cipher")]
    BadPadding,

    #[error("Decrypted token does not contain a user id")]
    NotAUserId,
}

/// Deterministic, keyed cipher over sharer user ids.
#[derive(Clone)]
pub struct ReferralTokenCipher {
    key: [u8; 32],
    iv: [u8; 16],
}

impl ReferralTokenCipher {
    /// Derive key and IV from the configured secret. The secret itself is
    /// validated at config load (present, long enough, not the known
    /// insecure default).
    pub fn new(secret: &str) -> Self {
        let key: [u8; 32] = Sha256::digest(secret.as_bytes()).into();

        let iv_digest: [u8; 32] = Sha256::digest(format!("iv:{}", secret).as_bytes()).into();
        let mut iv = [0u8; 16];
        iv.copy_from_slice(&iv_digest[..16]);

        Self { key, iv }
    }

    /// Encrypt a user id into a lowercase hex token.
    pub fn encode(&self, user_id: &Uuid) -> String {
        let plaintext = user_id.as_hyphenated().to_string();
        let ciphertext = Aes256CbcEnc::new(&self.key.into(), &self.iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
        hex::encode(ciphertext)
    }

    /// Decrypt a token back into the user id it encodes. Any failure means
    /// the input is untrusted or stale garbage; callers must not retry.
    pub fn decode(&self, token: &str) -> Result<Uuid, ReferralTokenError> {
        let ciphertext = hex::decode(token).map_err(|_| ReferralTokenError::MalformedHex)?;
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(ReferralTokenError::BadCiphertext);
        }

        let plaintext = Aes256CbcDec::new(&self.key.into(), &self.iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|_| ReferralTokenError::BadPadding)?;

        let id_str =
            std::str::from_utf8(&plaintext).map_err(|_| ReferralTokenError::NotAUserId)?;
        Uuid::parse_str(id_str).map_err(|_| ReferralTokenError::NotAUserId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> ReferralTokenCipher {
        ReferralTokenCipher::new("unit-test-secret-with-enough-length")
    }

    #[test]
    fn test_round_trip() {
        let cipher = cipher();
        let id = Uuid::new_v4();
        let token = cipher.encode(&id);
        assert_eq!(cipher.decode(&token).unwrap(), id);
    }

    #[test]
    fn test_deterministic() {
        let cipher = cipher();
        let id = Uuid::new_v4();
        assert_eq!(cipher.encode(&id), cipher.encode(&id));
    }

    #[test]
    fn test_token_is_url_safe_hex() {
        let cipher = cipher();
        let token = cipher.encode(&Uuid::new_v4());
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        // 36-byte uuid string pads to 48 bytes of ciphertext
        assert_eq!(token.len(), 96);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let cipher = cipher();

        assert!(matches!(
            cipher.decode("not hex at all!"),
            Err(ReferralTokenError::MalformedHex)
        ));
        assert!(matches!(
            cipher.decode("abcdef"),
            Err(ReferralTokenError::BadCiphertext)
        ));
        assert!(matches!(
            cipher.decode(""),
            Err(ReferralTokenError::BadCiphertext)
        ));
        // Valid hex, whole blocks, but random bytes: padding check fails
        let bogus = hex::encode([0x5au8; 48]);
        assert!(cipher.decode(&bogus).is_err());
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let ours = cipher();
        let theirs = ReferralTokenCipher::new("a-completely-different-secret!");
        let token = theirs.encode(&Uuid::new_v4());
        assert!(ours.decode(&token).is_err());
    }
}
