//! Wallet key material and lifecycle
//!
//! - Family seed encoding/decoding and account key derivation
//! - Wallet creation, import, listing, deletion
//! - Transient signer handles for queued operations

pub mod keys;
pub mod lifecycle;
pub mod signer;

pub use signer::SignerHandle;
