//! Serial queue behavior under a paused clock
//!
//! Handlers are scripted through the item payload ({"label", "fail",
//! "work_ms"}), so every scenario runs without a network or a rendering
//! surface.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

use xrpl_wallet::error::WalletError;
use xrpl_wallet::queue::{
    DisplaySurface, HandlerRegistry, ItemHandler, ItemKind, NetworkLink, QueueItem,
    TransactionQueue,
};
use xrpl_wallet::wallet::SignerHandle;

const COOLDOWN: Duration = Duration::from_millis(1_000);

struct StubLink;

#[async_trait]
impl NetworkLink for StubLink {
    async fn ensure_connected(&self) -> Result<(), WalletError> {
        Ok(())
    }
}

/// Link that fails once, then recovers
struct FlakyLink {
    failures_left: AtomicUsize,
}

#[async_trait]
impl NetworkLink for FlakyLink {
    async fn ensure_connected(&self) -> Result<(), WalletError> {
        if self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(WalletError::Network("endpoint unreachable".to_string()));
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
struct Recorder {
    invocations: Arc<Mutex<Vec<(String, Instant)>>>,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
}

impl Recorder {
    fn labels(&self) -> Vec<String> {
        self.invocations
            .lock()
            .unwrap()
            .iter()
            .map(|(label, _)| label.clone())
            .collect()
    }

    fn times(&self) -> Vec<Instant> {
        self.invocations
            .lock()
            .unwrap()
            .iter()
            .map(|(_, t)| *t)
            .collect()
    }
}

struct ScriptedHandler {
    recorder: Recorder,
}

#[async_trait]
impl ItemHandler for ScriptedHandler {
    async fn process(
        &self,
        payload: &Value,
        _signer: Option<&SignerHandle>,
    ) -> Result<String, WalletError> {
        let label = payload["label"].as_str().unwrap_or("?").to_string();

        let now_active = self.recorder.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.recorder
            .max_active
            .fetch_max(now_active, Ordering::SeqCst);
        self.recorder
            .invocations
            .lock()
            .unwrap()
            .push((label.clone(), Instant::now()));

        if let Some(work_ms) = payload["work_ms"].as_u64() {
            tokio::time::sleep(Duration::from_millis(work_ms)).await;
        }

        self.recorder.active.fetch_sub(1, Ordering::SeqCst);

        if payload["fail"].as_bool().unwrap_or(false) {
            Err(WalletError::Transaction(format!(
                "scripted failure for {}",
                label
            )))
        } else {
            Ok(format!("ok {}", label))
        }
    }
}

fn make_queue(recorder: &Recorder, link: Arc<dyn NetworkLink>) -> TransactionQueue {
    let handlers = HandlerRegistry::new().with_handler(
        ItemKind::Payment,
        Arc::new(ScriptedHandler {
            recorder: recorder.clone(),
        }),
    );
    TransactionQueue::new(handlers, link, COOLDOWN)
}

fn item(label: &str) -> QueueItem {
    QueueItem::new(
        ItemKind::Payment,
        json!({"label": label}),
        None,
        label,
        DisplaySurface::Wallet,
    )
}

async fn drain(queue: &TransactionQueue) {
    for _ in 0..10_000 {
        if queue.is_empty() && !queue.is_running() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("queue did not drain");
}

#[tokio::test(start_paused = true)]
async fn processes_in_insertion_order_with_cooldown() {
    let recorder = Recorder::default();
    let queue = make_queue(&recorder, Arc::new(StubLink));

    queue.enqueue(item("A"));
    queue.enqueue(item("B"));
    queue.enqueue(item("C"));

    drain(&queue).await;

    assert_eq!(recorder.labels(), vec!["A", "B", "C"]);
    let times = recorder.times();
    assert!(times[1] - times[0] >= COOLDOWN);
    assert!(times[2] - times[1] >= COOLDOWN);
    assert!(queue.is_empty());
    assert!(!queue.is_running());
}

#[tokio::test(start_paused = true)]
async fn failed_item_is_removed_and_queue_continues() {
    let recorder = Recorder::default();
    let queue = make_queue(&recorder, Arc::new(StubLink));

    let mut failing = item("A");
    failing.payload = json!({"label": "A", "fail": true});
    queue.enqueue(failing);
    queue.enqueue(item("B"));

    drain(&queue).await;

    // A attempted once, then B despite A's failure
    assert_eq!(recorder.labels(), vec!["A", "B"]);
    assert!(queue.is_empty());
}

#[tokio::test(start_paused = true)]
async fn zero_delay_item_submits_without_artificial_wait() {
    let recorder = Recorder::default();
    let queue = make_queue(&recorder, Arc::new(StubLink));

    let start = Instant::now();
    queue.enqueue(item("A"));
    drain(&queue).await;

    let times = recorder.times();
    assert_eq!(times.len(), 1);
    assert!(times[0] - start < COOLDOWN);
}

#[tokio::test(start_paused = true)]
async fn delay_holds_submission_until_elapsed() {
    let recorder = Recorder::default();
    let queue = make_queue(&recorder, Arc::new(StubLink));

    let start = Instant::now();
    queue.enqueue(item("slow").with_delay(Duration::from_millis(5_000)));
    drain(&queue).await;

    let times = recorder.times();
    assert_eq!(times.len(), 1, "exactly one submission");
    assert!(
        times[0] - start >= Duration::from_millis(5_000),
        "no submission before the configured delay"
    );
}

#[tokio::test(start_paused = true)]
async fn delayed_head_is_not_overtaken_by_ready_item() {
    let recorder = Recorder::default();
    let queue = make_queue(&recorder, Arc::new(StubLink));

    queue.enqueue(item("first").with_delay(Duration::from_millis(3_000)));
    queue.enqueue(item("second"));

    drain(&queue).await;

    assert_eq!(recorder.labels(), vec!["first", "second"]);
}

#[tokio::test(start_paused = true)]
async fn rapid_enqueues_never_double_process() {
    let recorder = Recorder::default();
    let queue = make_queue(&recorder, Arc::new(StubLink));

    for i in 0..5 {
        let mut it = item(&format!("item-{}", i));
        it.payload = json!({"label": format!("item-{}", i), "work_ms": 50});
        queue.enqueue(it);
        // Redundant starts must be no-ops while the loop is live
        queue.start();
    }

    drain(&queue).await;

    let labels = recorder.labels();
    assert_eq!(
        labels,
        (0..5).map(|i| format!("item-{}", i)).collect::<Vec<_>>()
    );
    assert_eq!(
        recorder.max_active.load(Ordering::SeqCst),
        1,
        "at most one item mid-processing at any instant"
    );
}

#[tokio::test(start_paused = true)]
async fn connectivity_failure_abandons_item_and_continues() {
    let recorder = Recorder::default();
    let link = Arc::new(FlakyLink {
        failures_left: AtomicUsize::new(1),
    });
    let queue = make_queue(&recorder, link);

    queue.enqueue(item("A"));
    queue.enqueue(item("B"));

    drain(&queue).await;

    // A never reached its handler (link down), B went through after recovery
    assert_eq!(recorder.labels(), vec!["B"]);
    assert!(queue.is_empty());
}

#[tokio::test(start_paused = true)]
async fn clear_while_idle_leaves_empty_display_and_no_processing() {
    let recorder = Recorder::default();
    let queue = make_queue(&recorder, Arc::new(StubLink));

    let cleared = queue.clear();

    assert_eq!(cleared, 0);
    assert!(queue.snapshot().is_empty());
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(recorder.labels().is_empty());
    assert!(!queue.is_running());
}

#[tokio::test(start_paused = true)]
async fn clear_drops_pending_but_not_in_flight() {
    let recorder = Recorder::default();
    let queue = make_queue(&recorder, Arc::new(StubLink));

    let mut busy = item("A");
    busy.payload = json!({"label": "A", "work_ms": 500});
    queue.enqueue(busy);
    queue.enqueue(item("B"));
    queue.enqueue(item("C"));

    // Let A enter its handler, then clear
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(recorder.labels(), vec!["A"]);
    queue.clear();

    drain(&queue).await;

    // A completed on its own; B and C were never attempted
    assert_eq!(recorder.labels(), vec!["A"]);
    assert!(queue.snapshot().is_empty());
}

#[tokio::test(start_paused = true)]
async fn failed_flow_skips_dependent_steps() {
    let recorder = Recorder::default();
    let queue = make_queue(&recorder, Arc::new(StubLink));
    let flow = uuid::Uuid::new_v4();

    let mut first = item("fund").with_flow(flow);
    first.payload = json!({"label": "fund", "fail": true});
    queue.enqueue(first);
    queue.enqueue(item("trust").with_flow(flow));
    queue.enqueue(item("unrelated"));

    drain(&queue).await;

    // The dependent step is dequeued but never submitted
    assert_eq!(recorder.labels(), vec!["fund", "unrelated"]);
    assert!(queue.is_empty());
}

#[tokio::test(start_paused = true)]
async fn display_snapshot_tracks_queue_contents() {
    let recorder = Recorder::default();
    let queue = make_queue(&recorder, Arc::new(StubLink));
    let rx = queue.subscribe();

    queue.enqueue(item("visible").with_delay(Duration::from_millis(5_000)));

    let snapshot = queue.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].description, "visible");
    assert!(snapshot[0].remaining_delay_ms <= 5_000);

    drain(&queue).await;

    assert!(rx.borrow().is_empty());
}

#[tokio::test(start_paused = true)]
async fn length_decreases_by_one_per_processed_item() {
    let recorder = Recorder::default();
    let queue = make_queue(&recorder, Arc::new(StubLink));

    let mut busy = item("A");
    busy.payload = json!({"label": "A", "work_ms": 200});
    queue.enqueue(busy);
    queue.enqueue(item("B"));
    assert_eq!(queue.len(), 2);

    // After A finishes (and before B is done with its cooldown lead-in),
    // exactly one item remains
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(queue.len(), 1);

    drain(&queue).await;
    assert_eq!(queue.len(), 0);
    assert_eq!(recorder.labels(), vec!["A", "B"]);
}
