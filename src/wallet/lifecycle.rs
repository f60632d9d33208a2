/// Wallet lifecycle operations
///
/// Handles wallet creation, import, listing and deletion.
use crate::api::types::{WalletInfo, WalletMetadata};
use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::storage::{Metadata, Storage};
use crate::wallet::keys;
use chrono::Utc;

/// Create a new wallet with a freshly generated family seed
pub fn create_wallet(
    storage: &Storage,
    config: &WalletConfig,
    name: &str,
) -> Result<WalletInfo, WalletError> {
    if storage.wallet_exists(name) {
        return Err(WalletError::WalletExists(name.to_string()));
    }

    let entropy = keys::generate_entropy();
    let seed = keys::encode_seed(&entropy);

    save_wallet(storage, config, name, &seed, &entropy)
}

/// Import a wallet from an existing family seed
pub fn import_wallet(
    storage: &Storage,
    config: &WalletConfig,
    name: &str,
    seed: &str,
) -> Result<WalletInfo, WalletError> {
    if storage.wallet_exists(name) {
        return Err(WalletError::WalletExists(name.to_string()));
    }

    let entropy = keys::decode_seed(seed)?;

    save_wallet(storage, config, name, seed, &entropy)
}

fn save_wallet(
    storage: &Storage,
    config: &WalletConfig,
    name: &str,
    seed: &str,
    entropy: &[u8; 16],
) -> Result<WalletInfo, WalletError> {
    let keypair = keys::derive_keypair(entropy)?;
    let address = keys::classic_address(&keypair.public);
    let public_key = keypair.public_key_hex();

    storage.create_wallet(name)?;

    let metadata = Metadata {
        name: name.to_string(),
        address: address.clone(),
        public_key: public_key.clone(),
        created_at: Utc::now(),
        network: config.network.as_str().to_string(),
    };
    storage.save_metadata(name, &metadata)?;
    storage.save_seed(name, seed)?;

    log::info!("Wallet '{}' stored with address {}", name, address);

    Ok(WalletInfo {
        name: name.to_string(),
        address,
        public_key,
        seed: seed.to_string(),
    })
}

/// List all wallets
pub fn list_wallets(storage: &Storage) -> Result<Vec<WalletMetadata>, WalletError> {
    let wallet_names = storage.list_wallets()?;
    let mut wallets = Vec::new();

    for name in wallet_names {
        if let Ok(metadata) = storage.load_metadata(&name) {
            wallets.push(WalletMetadata {
                name: metadata.name,
                address: metadata.address,
                network: metadata.network,
                created_at: metadata.created_at.to_rfc3339(),
            });
        }
    }

    Ok(wallets)
}

/// Delete a wallet and all its data
pub fn delete_wallet(storage: &Storage, name: &str) -> Result<(), WalletError> {
    if !storage.wallet_exists(name) {
        return Err(WalletError::WalletNotFound(name.to_string()));
    }

    log::warn!("Deleting wallet: {}", name);
    storage.delete_wallet(name)?;

    Ok(())
}
