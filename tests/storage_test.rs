//! Wallet lifecycle over tempdir-backed storage

use tempfile::TempDir;

use xrpl_wallet::config::WalletConfig;
use xrpl_wallet::error::WalletError;
use xrpl_wallet::storage::Storage;
use xrpl_wallet::wallet::lifecycle;

fn test_storage() -> (TempDir, Storage) {
    let dir = TempDir::new().expect("tempdir");
    let storage = Storage::new_with_base_dir(dir.path().to_path_buf());
    (dir, storage)
}

#[test]
fn test_create_and_reload_wallet() {
    let (_dir, storage) = test_storage();
    let config = WalletConfig::default();

    let info = lifecycle::create_wallet(&storage, &config, "alice").expect("create");
    assert!(info.address.starts_with('r'));
    assert!(info.seed.starts_with('s'));

    assert!(storage.wallet_exists("alice"));
    let metadata = storage.load_metadata("alice").expect("metadata");
    assert_eq!(metadata.address, info.address);
    assert_eq!(metadata.network, "testnet");

    let seed = storage.load_seed("alice").expect("seed");
    assert_eq!(seed, info.seed);
}

#[test]
fn test_create_rejects_duplicate_name() {
    let (_dir, storage) = test_storage();
    let config = WalletConfig::default();

    lifecycle::create_wallet(&storage, &config, "alice").expect("create");
    let err = lifecycle::create_wallet(&storage, &config, "alice").unwrap_err();
    assert!(matches!(err, WalletError::WalletExists(_)));
}

#[test]
fn test_import_recovers_same_address() {
    let (_dir, storage) = test_storage();
    let config = WalletConfig::default();

    let created = lifecycle::create_wallet(&storage, &config, "alice").expect("create");
    let imported =
        lifecycle::import_wallet(&storage, &config, "alice-restored", &created.seed)
            .expect("import");

    assert_eq!(imported.address, created.address);
    assert_eq!(imported.public_key, created.public_key);
}

#[test]
fn test_import_rejects_bad_seed() {
    let (_dir, storage) = test_storage();
    let config = WalletConfig::default();

    let err = lifecycle::import_wallet(&storage, &config, "bad", "not-a-seed").unwrap_err();
    assert!(matches!(err, WalletError::InvalidSeed(_)));
    assert!(!storage.wallet_exists("bad"));
}

#[test]
fn test_list_and_delete() {
    let (_dir, storage) = test_storage();
    let config = WalletConfig::default();

    lifecycle::create_wallet(&storage, &config, "alice").expect("create alice");
    lifecycle::create_wallet(&storage, &config, "bob").expect("create bob");

    let mut names: Vec<String> = lifecycle::list_wallets(&storage)
        .expect("list")
        .into_iter()
        .map(|w| w.name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["alice", "bob"]);

    lifecycle::delete_wallet(&storage, "alice").expect("delete");
    assert!(!storage.wallet_exists("alice"));

    let err = lifecycle::delete_wallet(&storage, "alice").unwrap_err();
    assert!(matches!(err, WalletError::WalletNotFound(_)));
}
