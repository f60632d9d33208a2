//! Serial transaction queue
//!
//! A strict-FIFO, single-consumer queue for ledger-mutating operations.
//! Items are processed one at a time in insertion order: the head honors its
//! pre-delay, the network link is checked, the item's handler submits and
//! awaits the terminal result, and the item is removed whether it succeeded
//! or failed. A fixed cooldown separates consecutive items. Subscribers
//! receive an ordered display snapshot after every state change.

use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use uuid::Uuid;

use crate::error::WalletError;
use crate::ledger::LedgerClient;
use crate::queue::handlers::HandlerRegistry;
use crate::queue::item::{QueueEntryView, QueueItem};

/// Connectivity check run before each item is dispatched. The real
/// implementation is the ledger client; tests use a stub.
#[async_trait]
pub trait NetworkLink: Send + Sync {
    async fn ensure_connected(&self) -> Result<(), WalletError>;
}

#[async_trait]
impl NetworkLink for LedgerClient {
    async fn ensure_connected(&self) -> Result<(), WalletError> {
        LedgerClient::ensure_connected(self).await
    }
}

#[derive(Clone)]
pub struct TransactionQueue {
    core: Arc<QueueCore>,
}

struct QueueCore {
    items: Mutex<VecDeque<QueueItem>>,
    running: AtomicBool,
    /// Flows with a failed step; their remaining items are skipped
    failed_flows: Mutex<HashSet<Uuid>>,
    handlers: HandlerRegistry,
    link: Arc<dyn NetworkLink>,
    cooldown: Duration,
    display_tx: watch::Sender<Vec<QueueEntryView>>,
    display_rx: watch::Receiver<Vec<QueueEntryView>>,
}

impl TransactionQueue {
    pub fn new(handlers: HandlerRegistry, link: Arc<dyn NetworkLink>, cooldown: Duration) -> Self {
        let (display_tx, display_rx) = watch::channel(Vec::new());
        Self {
            core: Arc::new(QueueCore {
                items: Mutex::new(VecDeque::new()),
                running: AtomicBool::new(false),
                failed_flows: Mutex::new(HashSet::new()),
                handlers,
                link,
                cooldown,
                display_tx,
                display_rx,
            }),
        }
    }

    /// Append an item to the tail and start the processor if it is idle.
    /// Payload validation is the caller's responsibility and happens before
    /// enqueue.
    pub fn enqueue(&self, item: QueueItem) {
        log::info!("Queued '{}'", item.description);
        {
            let mut items = self.core.items.lock().unwrap();
            items.push_back(item);
        }
        self.core.publish();
        self.start();
    }

    /// Idempotent; a no-op while a processing loop is already active
    pub fn start(&self) {
        if self
            .core
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            let core = self.core.clone();
            tokio::spawn(async move {
                core.run().await;
            });
        }
    }

    /// Drop all pending items, returning how many were dropped. An item
    /// already mid-submission is not aborted; it completes or fails on its
    /// own.
    pub fn clear(&self) -> usize {
        let dropped = {
            let mut items = self.core.items.lock().unwrap();
            let n = items.len();
            items.clear();
            n
        };
        log::info!("Cleared {} pending queue item(s)", dropped);
        self.core.publish();
        dropped
    }

    pub fn len(&self) -> usize {
        self.core.items.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_running(&self) -> bool {
        self.core.running.load(Ordering::SeqCst)
    }

    /// Current ordered display snapshot
    pub fn snapshot(&self) -> Vec<QueueEntryView> {
        self.core.snapshot()
    }

    /// Watch-channel of display snapshots; rendering failures on the
    /// receiving side cannot affect the queue.
    pub fn subscribe(&self) -> watch::Receiver<Vec<QueueEntryView>> {
        self.core.display_rx.clone()
    }
}

impl QueueCore {
    /// The single consumer loop. Exactly one instance runs while the queue
    /// is non-empty; `running` guards against a second.
    async fn run(self: Arc<Self>) {
        loop {
            let head = {
                let mut items = self.items.lock().unwrap();
                match items.front_mut() {
                    Some(item) => {
                        if item.ready_at.is_none() {
                            item.ready_at = Some(Instant::now() + item.delay);
                        }
                        Some(item.clone())
                    }
                    None => None,
                }
            };

            let Some(item) = head else {
                self.running.store(false, Ordering::SeqCst);
                // An enqueue may have landed between the empty check and the
                // flag flip; reclaim the loop if so, otherwise exit.
                let refilled = !self.items.lock().unwrap().is_empty();
                if refilled
                    && self
                        .running
                        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                        .is_ok()
                {
                    continue;
                }
                self.failed_flows.lock().unwrap().clear();
                log::debug!("Queue empty, processor idle");
                return;
            };

            self.publish();

            // Pre-delay, counted from when the item became head-of-queue.
            // Zero-delay items proceed immediately.
            if let Some(ready_at) = item.ready_at {
                if ready_at > Instant::now() {
                    log::debug!(
                        "Holding '{}' for {} ms",
                        item.description,
                        ready_at.duration_since(Instant::now()).as_millis()
                    );
                    tokio::time::sleep_until(ready_at).await;
                }
            }

            // The delay may have raced a clear(); only submit items that
            // are still queued.
            let still_queued = self.items.lock().unwrap().front().map(|i| i.id) == Some(item.id);
            if !still_queued {
                continue;
            }

            let skip = item
                .flow
                .map(|flow| self.failed_flows.lock().unwrap().contains(&flow))
                .unwrap_or(false);

            if skip {
                log::warn!(
                    "Skipping '{}': an earlier step of the same flow failed",
                    item.description
                );
            } else {
                match self.process_item(&item).await {
                    Ok(detail) => {
                        log::info!("Completed '{}': {}", item.description, detail);
                    }
                    Err(e) => {
                        log::warn!("Failed '{}': {}", item.description, e);
                        if let Some(flow) = item.flow {
                            self.failed_flows.lock().unwrap().insert(flow);
                        }
                    }
                }
            }

            // Removed regardless of outcome; no retry of the same item.
            self.remove(item.id);
            self.publish();

            if !self.items.lock().unwrap().is_empty() {
                tokio::time::sleep(self.cooldown).await;
            }
        }
    }

    async fn process_item(&self, item: &QueueItem) -> Result<String, WalletError> {
        self.link.ensure_connected().await?;

        let handler = self.handlers.get(item.kind).ok_or_else(|| {
            WalletError::Internal(format!("no handler registered for {:?}", item.kind))
        })?;

        handler.process(&item.payload, item.signer.as_ref()).await
    }

    /// Remove the processed item. Matching by id makes the removal a no-op
    /// when `clear()` already dropped it mid-flight.
    fn remove(&self, id: Uuid) {
        let mut items = self.items.lock().unwrap();
        if items.front().map(|i| i.id) == Some(id) {
            items.pop_front();
        }
    }

    fn publish(&self) {
        let snapshot = self.snapshot();
        self.display_tx.send_replace(snapshot);
    }

    fn snapshot(&self) -> Vec<QueueEntryView> {
        let now = Instant::now();
        self.items
            .lock()
            .unwrap()
            .iter()
            .map(|item| QueueEntryView {
                description: item.description.clone(),
                kind: item.kind,
                surface: item.surface,
                remaining_delay_ms: match item.ready_at {
                    Some(ready_at) => ready_at.saturating_duration_since(now).as_millis() as u64,
                    None => item.delay.as_millis() as u64,
                },
            })
            .collect()
    }
}
