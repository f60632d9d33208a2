//! Signer handle carried by queue items
//!
//! The handle pairs an account address with its family seed. It is loaded
//! from storage when an operation is enqueued and lives only as long as the
//! queue item that carries it.

use crate::error::WalletError;
use crate::wallet::keys;

#[derive(Clone)]
pub struct SignerHandle {
    pub address: String,
    seed: String,
}

impl SignerHandle {
    pub fn new(address: String, seed: String) -> Self {
        Self { address, seed }
    }

    /// Rebuild a handle from a stored seed, re-deriving the address
    pub fn from_seed(seed: &str) -> Result<Self, WalletError> {
        let entropy = keys::decode_seed(seed)?;
        let keypair = keys::derive_keypair(&entropy)?;
        Ok(Self {
            address: keys::classic_address(&keypair.public),
            seed: seed.to_string(),
        })
    }

    /// Secret material for the ledger's sign-and-submit call
    pub fn secret(&self) -> &str {
        &self.seed
    }
}

// Keep seeds out of debug output
impl std::fmt::Debug for SignerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignerHandle")
            .field("address", &self.address)
            .field("seed", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_seed_derives_matching_address() {
        let entropy = keys::generate_entropy();
        let seed = keys::encode_seed(&entropy);
        let handle = SignerHandle::from_seed(&seed).expect("handle");

        let keypair = keys::derive_keypair(&entropy).expect("derive");
        assert_eq!(handle.address, keys::classic_address(&keypair.public));
    }

    #[test]
    fn test_debug_redacts_seed() {
        let entropy = keys::generate_entropy();
        let seed = keys::encode_seed(&entropy);
        let handle = SignerHandle::from_seed(&seed).expect("handle");
        let debug = format!("{:?}", handle);
        assert!(!debug.contains(&seed));
    }
}
