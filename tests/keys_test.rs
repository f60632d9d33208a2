//! Key derivation against the well-known ledger genesis vector

use xrpl_wallet::wallet::keys;

/// The rippled genesis account ("masterpassphrase")
const GENESIS_SEED: &str = "snoPBrXtMeMyMHUVTgbuqAfg1SUTb";
const GENESIS_ADDRESS: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";
const GENESIS_PUBLIC_KEY: &str =
    "0330E7FC9D56BB25D6893BA3F317AE5BCF33B3291BD63DB32654A313222F7FD020";

#[test]
fn test_genesis_vector() {
    env_logger::builder().is_test(true).try_init().ok();

    let entropy = keys::decode_seed(GENESIS_SEED).expect("decode genesis seed");
    let keypair = keys::derive_keypair(&entropy).expect("derive genesis keypair");

    assert_eq!(keypair.public_key_hex(), GENESIS_PUBLIC_KEY);
    assert_eq!(keys::classic_address(&keypair.public), GENESIS_ADDRESS);
}

#[test]
fn test_seed_reencodes_to_itself() {
    let entropy = keys::decode_seed(GENESIS_SEED).expect("decode");
    assert_eq!(keys::encode_seed(&entropy), GENESIS_SEED);
}

#[test]
fn test_generated_wallets_are_distinct_and_valid() {
    let a = keys::generate_entropy();
    let b = keys::generate_entropy();
    assert_ne!(a, b);

    let keypair_a = keys::derive_keypair(&a).expect("derive a");
    let keypair_b = keys::derive_keypair(&b).expect("derive b");
    let addr_a = keys::classic_address(&keypair_a.public);
    let addr_b = keys::classic_address(&keypair_b.public);

    assert_ne!(addr_a, addr_b);
    keys::validate_address(&addr_a).expect("a valid");
    keys::validate_address(&addr_b).expect("b valid");
}

#[test]
fn test_derivation_is_deterministic() {
    let entropy = keys::decode_seed(GENESIS_SEED).expect("decode");
    let first = keys::derive_keypair(&entropy).expect("derive");
    let second = keys::derive_keypair(&entropy).expect("derive again");
    assert_eq!(first.public_key_hex(), second.public_key_hex());
}

#[test]
fn test_validate_address_rejects_tampered_checksum() {
    let mut tampered = GENESIS_ADDRESS.to_string();
    // Swap the last character for another alphabet member
    tampered.pop();
    tampered.push('v');
    assert!(keys::validate_address(&tampered).is_err());
}
