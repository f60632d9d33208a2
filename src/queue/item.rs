//! Queue item model

use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

use crate::wallet::SignerHandle;

/// Selects which registered handler processes an item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Payment,
    TrustSet,
    AmmCreate,
    AmmDeposit,
    AmmWithdraw,
    AmmVote,
    AccountSet,
    SignerListSet,
    Multisigned,
    Wait,
}

/// UI region an item belongs to; consumed only by display subscribers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplaySurface {
    Wallet,
    LiquidityPool,
    Minting,
}

/// One pending unit of work.
///
/// The payload is opaque to the queue itself; only the handler registered
/// for `kind` interprets it. Items of a multi-step flow share a `flow` id so
/// that dependents can be skipped once an earlier step fails.
#[derive(Clone)]
pub struct QueueItem {
    pub id: Uuid,
    pub kind: ItemKind,
    pub payload: Value,
    pub signer: Option<SignerHandle>,
    pub description: String,
    pub delay: Duration,
    pub surface: DisplaySurface,
    pub flow: Option<Uuid>,
    /// Set when the item becomes head-of-queue; the head may not be
    /// submitted before this instant.
    pub(crate) ready_at: Option<tokio::time::Instant>,
}

impl QueueItem {
    pub fn new(
        kind: ItemKind,
        payload: Value,
        signer: Option<SignerHandle>,
        description: impl Into<String>,
        surface: DisplaySurface,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            payload,
            signer,
            description: description.into(),
            delay: Duration::ZERO,
            surface,
            flow: None,
            ready_at: None,
        }
    }

    /// Minimum wait before this item may be submitted, counted from when it
    /// becomes head-of-queue
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_flow(mut self, flow: Uuid) -> Self {
        self.flow = Some(flow);
        self
    }
}

/// Display snapshot entry pushed to subscribers after every state change
#[derive(Clone, Debug, Serialize)]
pub struct QueueEntryView {
    pub description: String,
    pub kind: ItemKind,
    pub surface: DisplaySurface,
    pub remaining_delay_ms: u64,
}
