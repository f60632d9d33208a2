//! XRPL key and address codec
//!
//! Family seeds (`s...`) carry 16 bytes of entropy in base58check with the
//! ripple alphabet. Account keys follow the XRPL secp256k1 scheme: the seed
//! hashes to a root private generator, and the account keypair at index 0 is
//! the generator tweaked by an intermediate scalar. Classic addresses
//! (`r...`) encode RIPEMD160(SHA256(pubkey)).

use ripemd::Ripemd160;
use secp256k1::{PublicKey, Scalar, Secp256k1, SecretKey};
use sha2::{Digest, Sha256, Sha512};

use crate::error::WalletError;

/// Type prefix for encoded family seeds
const SEED_PREFIX: u8 = 0x21;
/// Type prefix for encoded account IDs (classic addresses)
const ACCOUNT_PREFIX: u8 = 0x00;

/// A derived account keypair
pub struct Keypair {
    pub secret: SecretKey,
    pub public: PublicKey,
}

impl Keypair {
    /// Compressed public key as uppercase hex, the form rippled reports
    pub fn public_key_hex(&self) -> String {
        hex::encode_upper(self.public.serialize())
    }
}

/// Generate 16 bytes of fresh seed entropy
pub fn generate_entropy() -> [u8; 16] {
    use secp256k1::rand::RngCore;

    let mut entropy = [0u8; 16];
    secp256k1::rand::thread_rng().fill_bytes(&mut entropy);
    entropy
}

/// Encode seed entropy as a family seed string (`s...`)
pub fn encode_seed(entropy: &[u8; 16]) -> String {
    base58check_encode(SEED_PREFIX, entropy)
}

/// Decode a family seed string back to its entropy
pub fn decode_seed(seed: &str) -> Result<[u8; 16], WalletError> {
    let payload = base58check_decode(seed, SEED_PREFIX)
        .map_err(|e| WalletError::InvalidSeed(format!("{}: {}", seed_hint(seed), e)))?;

    if payload.len() != 16 {
        return Err(WalletError::InvalidSeed(format!(
            "seed entropy must be 16 bytes, got {}",
            payload.len()
        )));
    }

    let mut entropy = [0u8; 16];
    entropy.copy_from_slice(&payload);
    Ok(entropy)
}

/// Derive the account keypair (account index 0) from seed entropy
pub fn derive_keypair(entropy: &[u8; 16]) -> Result<Keypair, WalletError> {
    let secp = Secp256k1::new();

    // Root private generator: first sha512-half of (entropy || seq) that is
    // a valid scalar.
    let root_bytes = derive_scalar_bytes(entropy, None);
    let root = SecretKey::from_slice(&root_bytes)
        .map_err(|e| WalletError::Keys(format!("root key: {}", e)))?;
    let root_public = PublicKey::from_secret_key(&secp, &root);

    // Intermediate scalar for account index 0, hashed over the compressed
    // public generator.
    let inter_bytes = derive_scalar_bytes(&root_public.serialize(), Some(0));
    let tweak = Scalar::from_be_bytes(inter_bytes)
        .map_err(|e| WalletError::Keys(format!("intermediate scalar: {}", e)))?;

    let secret = root
        .add_tweak(&tweak)
        .map_err(|e| WalletError::Keys(format!("account key tweak: {}", e)))?;
    let public = PublicKey::from_secret_key(&secp, &secret);

    Ok(Keypair { secret, public })
}

/// Classic address (`r...`) for a public key
pub fn classic_address(public: &PublicKey) -> String {
    let account_id = account_id(public);
    base58check_encode(ACCOUNT_PREFIX, &account_id)
}

/// 20-byte account ID: RIPEMD160(SHA256(compressed pubkey))
pub fn account_id(public: &PublicKey) -> [u8; 20] {
    let sha = Sha256::digest(public.serialize());
    let ripe = Ripemd160::digest(sha);
    let mut id = [0u8; 20];
    id.copy_from_slice(&ripe);
    id
}

/// Validate a classic address string
pub fn validate_address(address: &str) -> Result<(), WalletError> {
    let payload = base58check_decode(address, ACCOUNT_PREFIX)
        .map_err(|e| WalletError::InvalidAddress(format!("{}: {}", address, e)))?;

    if payload.len() != 20 {
        return Err(WalletError::InvalidAddress(format!(
            "account ID must be 20 bytes, got {}",
            payload.len()
        )));
    }

    Ok(())
}

/// Search sequence numbers until the sha512-half of (seed || [discriminator] || seq)
/// lands inside the curve order. Almost always succeeds on the first try.
fn derive_scalar_bytes(prefix: &[u8], discriminator: Option<u32>) -> [u8; 32] {
    for seq in 0u32.. {
        let mut hasher = Sha512::new();
        hasher.update(prefix);
        if let Some(d) = discriminator {
            hasher.update(d.to_be_bytes());
        }
        hasher.update(seq.to_be_bytes());

        let digest = hasher.finalize();
        let mut candidate = [0u8; 32];
        candidate.copy_from_slice(&digest[..32]);

        if SecretKey::from_slice(&candidate).is_ok() {
            return candidate;
        }
    }
    unreachable!("scalar search space exhausted")
}

fn base58check_encode(prefix: u8, payload: &[u8]) -> String {
    let mut buf = Vec::with_capacity(1 + payload.len() + 4);
    buf.push(prefix);
    buf.extend_from_slice(payload);
    let check = checksum(&buf);
    buf.extend_from_slice(&check);

    bs58::encode(buf)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .into_string()
}

fn base58check_decode(encoded: &str, expected_prefix: u8) -> Result<Vec<u8>, String> {
    let data = bs58::decode(encoded)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .into_vec()
        .map_err(|e| format!("base58 decode failed: {}", e))?;

    if data.len() < 5 {
        return Err("encoded value too short".to_string());
    }

    let (body, check) = data.split_at(data.len() - 4);
    if checksum(body) != check {
        return Err("checksum mismatch".to_string());
    }

    if body[0] != expected_prefix {
        return Err(format!("unexpected type prefix 0x{:02x}", body[0]));
    }

    Ok(body[1..].to_vec())
}

/// First 4 bytes of double-SHA256
fn checksum(data: &[u8]) -> [u8; 4] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut check = [0u8; 4];
    check.copy_from_slice(&second[..4]);
    check
}

fn seed_hint(seed: &str) -> String {
    // Never echo full secret material into logs or error bodies
    let visible = seed.chars().take(4).collect::<String>();
    format!("{}...", visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_roundtrip() {
        let entropy = generate_entropy();
        let seed = encode_seed(&entropy);
        assert!(seed.starts_with('s'));
        let decoded = decode_seed(&seed).expect("decode generated seed");
        assert_eq!(decoded, entropy);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_seed("not-a-seed").is_err());
        assert!(decode_seed("").is_err());
        // Valid base58 but wrong prefix (an address, not a seed)
        assert!(decode_seed("rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh").is_err());
    }

    #[test]
    fn test_address_shape() {
        let entropy = generate_entropy();
        let keypair = derive_keypair(&entropy).expect("derive");
        let address = classic_address(&keypair.public);
        assert!(address.starts_with('r'));
        validate_address(&address).expect("derived address validates");
    }

    #[test]
    fn test_validate_address_rejects_seed() {
        let entropy = generate_entropy();
        let seed = encode_seed(&entropy);
        assert!(validate_address(&seed).is_err());
    }
}
