//! XRPL JSON-RPC collaborator
//!
//! - Network context queries (sequence, fee, server state)
//! - Balance queries (account_info, account_lines)
//! - Submit-and-wait transaction submission
//! - tx_json templates for every supported transaction type

pub mod client;
pub mod types;

pub use client::{AccountInfo, LedgerClient, SubmitOutcome, TerminalResult, TrustLine};
pub use types::{Amount, AssetRef, IssuedAmount, SignerEntry};
