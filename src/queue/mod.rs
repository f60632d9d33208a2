//! Serial transaction queue
//!
//! The one design-carrying component of the service: a strict-FIFO,
//! single-consumer processor of ledger operations with per-item pre-delays,
//! a fixed inter-item cooldown and at-most-once submission attempts.

pub mod handlers;
pub mod item;
pub mod processor;

pub use handlers::{HandlerRegistry, ItemHandler};
pub use item::{DisplaySurface, ItemKind, QueueEntryView, QueueItem};
pub use processor::{NetworkLink, TransactionQueue};
