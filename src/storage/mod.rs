//! On-disk wallet storage
//!
//! One directory per wallet under the base dir, holding `metadata.json`
//! and `seed.txt`.

pub mod file_system;
pub mod models;

pub use file_system::Storage;
pub use models::Metadata;
