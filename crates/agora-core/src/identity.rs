//! Participant identity.
//!
//! Every caller of the marketplace is known by an [`AccountId`]: the base58
//! encoding of a 32-byte Ed25519 public key.
//! The engine treats account ids as opaque; authentication happens outside
//! it. [`Keypair`] covers generation and recovery of an identity.

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// A participant identity (base58-encoded 32-byte public key).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Parse an account id from a base58 string.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidAccountId`] if the string is not valid
    /// base58 or does not decode to 32 bytes.
    pub fn from_base58(s: &str) -> Result<Self, CoreError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| CoreError::InvalidAccountId(format!("invalid base58: {e}")))?;

        if bytes.len() != 32 {
            return Err(CoreError::InvalidAccountId(format!(
                "account id must be 32 bytes, got {}",
                bytes.len()
            )));
        }

        Ok(Self(s.to_string()))
    }

    /// Create an account id from raw public key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidAccountId`] if the slice is not 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        if bytes.len() != 32 {
            return Err(CoreError::InvalidAccountId(format!(
                "account id must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self(bs58::encode(bytes).into_string()))
    }

    /// Get the base58-encoded id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An Ed25519 keypair backing a participant identity.
///
/// Holds the secret key so an identity can be recovered later; the
/// marketplace itself only ever sees the derived [`AccountId`].
pub struct Keypair {
    signing_key: SigningKey,
    account_id: AccountId,
}

impl Keypair {
    /// Generate a new random identity.
    ///
    /// Key material comes from the operating system CSPRNG.
    #[must_use]
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self::from_signing_key(signing_key)
    }

    /// Recover an identity from its 32 secret key bytes.
    #[must_use]
    pub fn from_secret_bytes(secret: &[u8; 32]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(secret))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let public = signing_key.verifying_key();
        let account_id = AccountId(bs58::encode(public.as_bytes()).into_string());
        Self {
            signing_key,
            account_id,
        }
    }

    /// The account id derived from this keypair.
    #[must_use]
    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    /// The secret key bytes. Handle with care.
    #[must_use]
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl Default for Keypair {
    fn default() -> Self {
        Self::generate()
    }
}

#[allow(clippy::missing_fields_in_debug)]
impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("account_id", &self.account_id)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_identities_are_unique() {
        let a = Keypair::generate();
        let b = Keypair::generate();
        assert_ne!(a.account_id(), b.account_id());
    }

    #[test]
    fn account_id_parses_own_encoding() {
        let keypair = Keypair::generate();
        let parsed = AccountId::from_base58(keypair.account_id().as_str()).expect("should parse");
        assert_eq!(keypair.account_id(), &parsed);
    }

    #[test]
    fn secret_bytes_recover_same_identity() {
        let original = Keypair::generate();
        let recovered = Keypair::from_secret_bytes(&original.secret_bytes());
        assert_eq!(original.account_id(), recovered.account_id());
    }

    #[test]
    fn rejects_invalid_base58() {
        assert!(AccountId::from_base58("not-base58-0OIl").is_err());
    }

    #[test]
    fn rejects_wrong_length() {
        // Valid base58, decodes to fewer than 32 bytes.
        assert!(AccountId::from_base58("abc").is_err());
        assert!(AccountId::from_bytes(&[0u8; 16]).is_err());
    }

    #[test]
    fn from_bytes_roundtrips() {
        let keypair = Keypair::generate();
        let bytes = bs58::decode(keypair.account_id().as_str())
            .into_vec()
            .expect("decode");
        let id = AccountId::from_bytes(&bytes).expect("should build");
        assert_eq!(&id, keypair.account_id());
    }

    #[test]
    fn account_id_serialization_roundtrip() {
        let keypair = Keypair::generate();
        let json = serde_json::to_string(keypair.account_id()).expect("serialize");
        let parsed: AccountId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(keypair.account_id(), &parsed);
    }

    #[test]
    fn account_id_usable_as_map_key() {
        use std::collections::HashSet;
        let a = Keypair::generate();
        let b = Keypair::generate();

        let mut set = HashSet::new();
        set.insert(a.account_id().clone());
        set.insert(b.account_id().clone());
        set.insert(a.account_id().clone());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn keypair_debug_redacts_secret() {
        let keypair = Keypair::generate();
        let debug = format!("{keypair:?}");
        assert!(debug.contains("REDACTED"));
    }
}
