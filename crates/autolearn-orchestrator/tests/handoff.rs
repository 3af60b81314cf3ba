//! Detail-page monitor and catalog orchestrator talking through one store.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use autolearn_config::{MarkerConfig, MonitorConfig, OrchestratorConfig};
use autolearn_monitor::{DetailMonitor, FinishOutcome, TickOutcome};
use autolearn_orchestrator::{AdvanceOutcome, CatalogOrchestrator, SignalOutcome};
use autolearn_protocols::{
    CatalogItem, CatalogPage, CatalogSnapshot, Clock, CourseId, DetailPage, DetailSnapshot,
    ItemMark, LogNotifier, PageError, UnitSnapshot,
};
use autolearn_store::{KeySpace, MemoryStore, SignalChannel, StateStore};

/// Clock that moves forward one second per reading.
struct SteppingClock(AtomicI64);

impl Clock for SteppingClock {
    fn now_millis(&self) -> i64 {
        self.0.fetch_add(1_000, Ordering::SeqCst)
    }
}

#[derive(Default)]
struct Catalog {
    items: Mutex<Vec<CatalogItem>>,
    opened: Mutex<Vec<CourseId>>,
}

#[async_trait]
impl CatalogPage for Catalog {
    async fn snapshot(&self) -> Result<CatalogSnapshot, PageError> {
        Ok(CatalogSnapshot {
            items: self.items.lock().clone(),
        })
    }

    async fn apply_mark(&self, id: &CourseId, mark: Option<ItemMark>) -> Result<(), PageError> {
        if let Some(item) = self.items.lock().iter_mut().find(|i| &i.resource_id == id) {
            item.applied_mark = mark;
        }
        Ok(())
    }

    async fn scroll_into_view(&self, _id: &CourseId) -> Result<(), PageError> {
        Ok(())
    }

    async fn open(&self, id: &CourseId) -> Result<(), PageError> {
        self.opened.lock().push(id.clone());
        Ok(())
    }

    async fn reload(&self) -> Result<(), PageError> {
        Ok(())
    }
}

struct CoursePage {
    id: String,
    snapshot: DetailSnapshot,
    closes: AtomicUsize,
}

#[async_trait]
impl DetailPage for CoursePage {
    fn location(&self) -> String {
        format!("https://lms.example.com/learning/course?id={}", self.id)
    }

    async fn snapshot(&self) -> Result<DetailSnapshot, PageError> {
        Ok(self.snapshot.clone())
    }

    async fn close(&self) -> Result<(), PageError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn shared_channel() -> SignalChannel {
    let state = StateStore::new(Arc::new(MemoryStore::new()), KeySpace::default());
    SignalChannel::new(state, Arc::new(SteppingClock(AtomicI64::new(10_000))))
}

fn course_page(id: &str, snapshot: DetailSnapshot) -> Arc<CoursePage> {
    Arc::new(CoursePage {
        id: id.to_string(),
        snapshot,
        closes: AtomicUsize::new(0),
    })
}

fn monitor(channel: &SignalChannel, page: Arc<CoursePage>) -> DetailMonitor<CoursePage> {
    let monitor = DetailMonitor::new(
        page,
        channel.clone(),
        Arc::new(LogNotifier),
        MonitorConfig::default(),
        MarkerConfig::default(),
    );
    monitor.start();
    monitor
}

#[tokio::test(start_paused = true)]
async fn test_finished_course_advances_catalog() {
    let channel = shared_channel();
    let catalog = Arc::new(Catalog::default());
    *catalog.items.lock() = vec![
        CatalogItem::new("c1", "Course one"),
        CatalogItem::new("c2", "Course two 参与考试"),
        CatalogItem::new("c3", "Course three"),
    ];

    let orchestrator = CatalogOrchestrator::new(
        catalog.clone(),
        channel.clone(),
        Arc::new(LogNotifier),
        OrchestratorConfig::default(),
        MarkerConfig::default(),
    );
    orchestrator.start();

    let first = orchestrator.set_auto_run(true).await;
    assert_eq!(first, Some(AdvanceOutcome::Opened(CourseId::new("c1"))));

    // The opened course finishes with an exam score.
    let page = course_page(
        "c1",
        DetailSnapshot::multi_unit(vec![
            UnitSnapshot::with_status("已完成"),
            UnitSnapshot::with_status("成绩 90"),
        ]),
    );
    let outcome = monitor(&channel, page.clone()).tick().await;
    assert!(matches!(
        outcome,
        TickOutcome::Finished(FinishOutcome::Published { closed: true, .. })
    ));
    assert_eq!(page.closes.load(Ordering::SeqCst), 1);

    let signal = orchestrator.poll_signal();
    assert!(matches!(signal, SignalOutcome::Scheduled(ref e) if e.requires_review));

    let state = orchestrator.state();
    assert!(state.review().contains(&CourseId::new("c1")));
    assert!(state.handled().contains(&CourseId::new("c1")));

    tokio::time::sleep(Duration::from_secs(4)).await;
    let opened: Vec<String> = catalog.opened.lock().iter().map(|id| id.to_string()).collect();
    assert_eq!(opened, vec!["c1", "c3"]);

    orchestrator.mark_pass().await;
    let marks: Vec<Option<ItemMark>> = catalog.items.lock().iter().map(|i| i.applied_mark).collect();
    assert_eq!(marks, vec![Some(ItemMark::NeedsReview), None, None]);
}

#[tokio::test(start_paused = true)]
async fn test_paused_course_is_recorded_without_signal() {
    let channel = shared_channel();
    let catalog = Arc::new(Catalog::default());
    *catalog.items.lock() = vec![
        CatalogItem::new("c1", "Course one"),
        CatalogItem::new("c2", "Course two"),
    ];
    let orchestrator = CatalogOrchestrator::new(
        catalog.clone(),
        channel.clone(),
        Arc::new(LogNotifier),
        OrchestratorConfig::default(),
        MarkerConfig::default(),
    );
    orchestrator.start();

    let page = course_page("c1", DetailSnapshot::single_unit(["已完成"]));
    let outcome = monitor(&channel, page.clone()).tick().await;
    assert!(matches!(
        outcome,
        TickOutcome::Finished(FinishOutcome::HeldOpen { .. })
    ));
    assert_eq!(page.closes.load(Ordering::SeqCst), 0);
    assert_eq!(orchestrator.poll_signal(), SignalOutcome::Idle);

    orchestrator.mark_pass().await;
    assert_eq!(
        catalog.items.lock()[0].applied_mark,
        Some(ItemMark::Handled)
    );

    let next = orchestrator.set_auto_run(true).await;
    assert_eq!(next, Some(AdvanceOutcome::Opened(CourseId::new("c2"))));
}
