use crate::{ManagerError, PaginationDelegate, PaginationManager, StaticDelegate};
use scriptform_editor::Document;
use scriptform_pagination::{paginate, Pagination, PaginationSettings};
use scriptform_parser::{Parser, Screenplay, ScreenplayOptions};
use scriptform_styles::{builtin_family, NoSettings, PaperSize, Styles};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Default)]
struct Recorder {
    settings: PaginationSettings,
    finished: Vec<usize>,
}

impl PaginationDelegate for Recorder {
    fn pagination_settings(&self) -> PaginationSettings {
        self.settings.clone()
    }

    fn pagination_finished(&mut self, pagination: &Pagination) {
        self.finished.push(pagination.page_count());
    }
}

fn script(scenes: usize) -> String {
    let mut text = String::new();
    for scene in 0..scenes {
        text.push_str(&format!("INT. OFFICE {scene} - DAY\n\n"));
        text.push_str("Phones ring. Nobody answers them, and the papers keep piling up on every desk.\n\n");
        text.push_str("MANAGER\n(to nobody)\nWho is on call today?\n\n");
    }
    text
}

fn snapshot(text: &str) -> Arc<Screenplay> {
    Arc::new(Screenplay::from_parser(&Parser::parse(text), &ScreenplayOptions::default()))
}

fn styles() -> Arc<Styles> {
    builtin_family(&NoSettings).render
}

#[tokio::test]
async fn test_single_request_is_delivered() {
    let mut manager = PaginationManager::new(Recorder::default(), styles()).unwrap();
    let run = manager.request(snapshot(&script(20)), 0);

    let delivery = manager.next_delivery().await.unwrap();
    assert_eq!(delivery.run, run);
    assert!(delivery.pagination.page_count() > 1);
    assert_eq!(manager.delegate().finished, vec![delivery.pagination.page_count()]);
    assert!(!manager.is_busy());
    assert!(manager.next_delivery().await.is_none());
}

#[tokio::test]
async fn test_newest_request_wins() {
    let mut manager = PaginationManager::new(Recorder::default(), styles()).unwrap();
    manager.request(snapshot(&script(200)), 0);
    manager.request(snapshot(&script(100)), 0);
    let last = snapshot(&script(5));
    manager.request(Arc::clone(&last), 0);

    let pagination = manager.settle().await.unwrap();
    let expected = paginate(&last, &styles(), &PaginationSettings::default());
    assert_eq!(pagination.pages, expected.pages);
    assert_eq!(manager.delegate().finished, vec![expected.page_count()]);
}

#[tokio::test]
async fn test_incremental_request_matches_full_pagination() {
    let mut document = Document::from_source(PathBuf::from("office.fountain"), &script(40)).unwrap();
    let mut manager = PaginationManager::new(Recorder::default(), styles()).unwrap();
    manager.request(document.screenplay(), 0);
    manager.settle().await.unwrap();

    let offset = document.text().rfind("Who is on call").unwrap();
    let outcome = document.insert(offset, "Seriously. ").unwrap();
    let screenplay = document.screenplay();
    manager.request(Arc::clone(&screenplay), outcome.change_at);
    let pagination = manager.settle().await.unwrap();

    let full = paginate(&screenplay, &styles(), &PaginationSettings::default());
    assert_eq!(pagination.pages, full.pages);
    assert_eq!(manager.delegate().finished.len(), 2);
}

#[tokio::test]
async fn test_export_only_runs_on_settle() {
    let recorder = Recorder {
        settings: PaginationSettings { live_pagination: false, ..PaginationSettings::default() },
        finished: Vec::new(),
    };
    let mut manager = PaginationManager::new(recorder, styles()).unwrap();
    manager.request(snapshot(&script(3)), 0);

    assert!(manager.is_busy());
    assert!(manager.poll().is_none());
    assert!(manager.next_delivery().await.is_none());
    assert!(manager.delegate().finished.is_empty());

    assert!(manager.settle().await.is_some());
    assert_eq!(manager.delegate().finished.len(), 1);
}

#[tokio::test]
async fn test_changed_styles_repaginate() {
    let mut manager = PaginationManager::new(StaticDelegate::default(), styles()).unwrap();
    let screenplay = snapshot(&script(10));
    manager.request(Arc::clone(&screenplay), 0);
    let first = manager.settle().await.unwrap();

    let short_pages = Arc::new(Styles::parse("page { page-height-a4: 20l }", &NoSettings));
    manager.set_styles(Arc::clone(&short_pages));
    manager.request(Arc::clone(&screenplay), screenplay.lines.len());
    let second = manager.settle().await.unwrap();

    assert!(second.page_count() > first.page_count());
    assert_eq!(second.pages[0].max_height, 240.0);
}

#[tokio::test]
async fn test_paper_size_comes_from_delegate() {
    let delegate = StaticDelegate::new(PaginationSettings::default().with_paper_size(PaperSize::Letter));
    let mut manager = PaginationManager::new(delegate, styles()).unwrap();
    manager.request(snapshot(&script(2)), 0);
    let pagination = manager.settle().await.unwrap();
    assert_eq!(pagination.pages[0].max_height, 54.0 * 12.0);
}

#[test]
fn test_manager_needs_a_runtime() {
    let result = PaginationManager::new(StaticDelegate::default(), styles());
    assert!(matches!(result, Err(ManagerError::NoRuntime(_))));
}
