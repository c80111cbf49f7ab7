// src/services/change_scheduler.rs
//
// Change Scheduler - debounced rescans driven by document mutations
//
// ARCHITECTURE:
// - Debouncer: transport-independent state machine (idle / pending-rescan)
// - ChangeScheduler: async driver consuming MutationRecords from a channel
//
// CRITICAL RULES:
// - Only records adding a subtree with an unprocessed candidate row count
// - Repeated triggers while pending restart the timer; one rescan per burst
// - No queue of work beyond "a rescan is owed"

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::document::{lock_document, Document, MutationRecord, SharedDocument};
use crate::services::row_enricher::{HostLayout, RowEnricher};

pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    PendingRescan { deadline: Instant },
}

/// Coalesces bursts of triggers into a single deferred rescan
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    state: SchedulerState,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: SchedulerState::Idle,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            SchedulerState::Idle => None,
            SchedulerState::PendingRescan { deadline } => Some(deadline),
        }
    }

    /// Enter (or stay in) pending-rescan with a restarted timer
    pub fn trigger(&mut self, now: Instant) {
        self.state = SchedulerState::PendingRescan {
            deadline: now + self.delay,
        };
    }

    /// Returns true, and goes back to idle, when a rescan is due at `now`
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.state {
            SchedulerState::PendingRescan { deadline } if now >= deadline => {
                self.state = SchedulerState::Idle;
                true
            }
            _ => false,
        }
    }
}

pub struct ChangeScheduler {
    document: SharedDocument,
    layout: HostLayout,
    debouncer: Debouncer,
}

impl ChangeScheduler {
    pub fn new(document: SharedDocument, layout: HostLayout, delay: Duration) -> Self {
        Self {
            document,
            layout,
            debouncer: Debouncer::new(delay),
        }
    }

    /// Whether a record added at least one subtree holding a candidate row
    pub fn is_relevant(&self, document: &Document, record: &MutationRecord) -> bool {
        record
            .added
            .iter()
            .any(|node| self.layout.contains_candidate(document, *node))
    }

    /// Drive the debouncer until the record channel closes.
    ///
    /// Candidates already present when the scheduler starts owe a rescan too.
    /// A rescan still pending when the channel closes runs before returning.
    pub async fn run<F>(mut self, mut records: UnboundedReceiver<MutationRecord>, mut rescan: F)
    where
        F: FnMut() -> usize + Send + 'static,
    {
        let has_candidates = {
            let document = lock_document(&self.document);
            self.layout.contains_candidate(&document, document.root())
        };
        if has_candidates {
            self.debouncer.trigger(Instant::now());
        }

        loop {
            let deadline = self.debouncer.deadline();
            let timer = async move {
                match deadline {
                    Some(deadline) => tokio::time::sleep_until(deadline).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                record = records.recv() => match record {
                    Some(record) => {
                        let relevant = {
                            let document = lock_document(&self.document);
                            self.is_relevant(&document, &record)
                        };
                        if relevant {
                            self.debouncer.trigger(Instant::now());
                        }
                    }
                    None => {
                        if self.debouncer.deadline().is_some() {
                            let enriched = rescan();
                            debug!("Final rescan enriched {} row(s)", enriched);
                        }
                        info!("Document observation ended; scheduler stopping");
                        break;
                    }
                },
                _ = timer => {
                    if self.debouncer.fire(Instant::now()) {
                        let enriched = rescan();
                        debug!("Debounced rescan enriched {} row(s)", enriched);
                    }
                }
            }
        }
    }
}

/// Observe the enricher's document and rescan it after each burst of
/// relevant mutations
pub fn spawn_change_scheduler(enricher: Arc<RowEnricher>, delay: Duration) -> JoinHandle<()> {
    let document = Arc::clone(enricher.document());
    let records = lock_document(&document).observe();
    let scheduler = ChangeScheduler::new(document, enricher.layout().clone(), delay);

    info!("Watching document for release rows ({}ms debounce)", delay.as_millis());
    tokio::spawn(scheduler.run(records, move || enricher.rescan()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{
        append_release_rows, create_releases_table, shared, HostRelease, PREVIEW_ATTRIBUTE,
        RELEASES_TABLE_ID,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn delay() -> Duration {
        Duration::from_millis(DEFAULT_DEBOUNCE_MS)
    }

    #[test]
    fn test_debouncer_starts_idle() {
        let debouncer = Debouncer::new(delay());
        assert_eq!(debouncer.state(), SchedulerState::Idle);
        assert_eq!(debouncer.deadline(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debouncer_restarts_timer_on_trigger() {
        let mut debouncer = Debouncer::new(delay());
        let start = Instant::now();

        debouncer.trigger(start);
        debouncer.trigger(start + Duration::from_millis(200));

        assert!(!debouncer.fire(start + Duration::from_millis(300)));
        assert!(debouncer.fire(start + Duration::from_millis(500)));
        assert_eq!(debouncer.state(), SchedulerState::Idle);
        assert!(!debouncer.fire(start + Duration::from_millis(900)));
    }

    struct Harness {
        document: SharedDocument,
        table: crate::document::NodeId,
        rescans: Arc<AtomicUsize>,
        handle: JoinHandle<()>,
    }

    fn start(preload: &[HostRelease]) -> Harness {
        let mut document = crate::document::Document::new();
        let table = create_releases_table(&mut document, RELEASES_TABLE_ID);
        append_release_rows(&mut document, table, preload, PREVIEW_ATTRIBUTE);
        let records = document.observe();
        let document = shared(document);

        let rescans = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&rescans);
        let scheduler = ChangeScheduler::new(document.clone(), HostLayout::default(), delay());
        let handle = tokio::spawn(scheduler.run(records, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            0
        }));

        Harness {
            document,
            table,
            rescans,
            handle,
        }
    }

    fn insert(harness: &Harness, title: &str) {
        let mut document = lock_document(&harness.document);
        append_release_rows(
            &mut document,
            harness.table,
            &[HostRelease::new(title, "https://img.example/x.jpg")],
            PREVIEW_ATTRIBUTE,
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_inserts_yields_one_rescan() {
        let harness = start(&[]);

        insert(&harness, "Show - 01");
        tokio::time::sleep(Duration::from_millis(100)).await;
        insert(&harness, "Show - 02");
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(harness.rescans.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(harness.rescans.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(harness.rescans.load(Ordering::SeqCst), 1);
        harness.handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_irrelevant_mutations_are_ignored() {
        let harness = start(&[]);

        {
            let mut document = lock_document(&harness.document);
            let note = document.create_element("p");
            document.set_text(note, "Schedule updated");
            let body = document.body();
            document.append_child(body, note);
        }

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(harness.rescans.load(Ordering::SeqCst), 0);
        harness.handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_existing_rows_trigger_initial_rescan() {
        let harness = start(&[HostRelease::new("Show - 01", "https://img.example/x.jpg")]);

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(harness.rescans.load(Ordering::SeqCst), 1);
        harness.handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_rescan_runs_when_observation_ends() {
        let mut document = crate::document::Document::new();
        let table = create_releases_table(&mut document, RELEASES_TABLE_ID);
        append_release_rows(
            &mut document,
            table,
            &[HostRelease::new("Show - 01", "https://img.example/x.jpg")],
            PREVIEW_ATTRIBUTE,
        );

        let (sender, records) = tokio::sync::mpsc::unbounded_channel();
        drop(sender);

        let rescans = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&rescans);
        let scheduler = ChangeScheduler::new(shared(document), HostLayout::default(), delay());

        let started = Instant::now();
        scheduler
            .run(records, move || {
                counter.fetch_add(1, Ordering::SeqCst);
                0
            })
            .await;

        assert_eq!(rescans.load(Ordering::SeqCst), 1);
        assert!(Instant::now() - started < delay());
    }

    #[test]
    fn test_relevance_checks_descendants() {
        let mut document = crate::document::Document::new();
        let table = create_releases_table(&mut document, RELEASES_TABLE_ID);
        let scheduler = ChangeScheduler::new(
            shared(crate::document::Document::new()),
            HostLayout::default(),
            delay(),
        );

        let links = append_release_rows(
            &mut document,
            table,
            &[HostRelease::new("Show - 01", "https://img.example/x.jpg")],
            PREVIEW_ATTRIBUTE,
        );
        let row = document.closest(links[0], "tr").unwrap();
        let record = MutationRecord {
            target: table,
            added: vec![row],
            removed: Vec::new(),
        };
        assert!(scheduler.is_relevant(&document, &record));

        document.add_class(links[0], crate::services::row_enricher::PROCESSED_CLASS);
        assert!(!scheduler.is_relevant(&document, &record));
    }
}
