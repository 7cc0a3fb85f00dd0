use parabible::loader::{InlineDispatcher, LoadError, TextLoader, Verse};
use parabible::navigator::ChapterDirection;
use parabible::reader::{NavigationQueue, NavigationRequest, Reader};
use parabible::render::{RenderTarget, Renderer};
use parabible::state::{PanelId, Position};
use parabible::storage::{self, KeyValueStore, MemoryStore};
use parabible::test_utils::{
    FakeLoader, ManualDispatchHandle, ManualDispatcher, RecordingRenderer, fake_text,
};
use parabible::version::VersionCode;
use std::sync::Arc;

const LEFT: RenderTarget = RenderTarget::Panel(PanelId::Left);
const RIGHT: RenderTarget = RenderTarget::Panel(PanelId::Right);

fn create_reader(
    loader: FakeLoader,
    store: MemoryStore,
) -> (Reader<RecordingRenderer>, ManualDispatchHandle) {
    let loader: Arc<dyn TextLoader> = Arc::new(loader);
    let (dispatcher, handle) = ManualDispatcher::new(loader.clone());
    let reader = Reader::new(
        loader,
        Box::new(dispatcher),
        Box::new(store),
        RecordingRenderer::new(),
    );
    (reader, handle)
}

fn store_at(book: &str, chapter: &str, version: &str) -> MemoryStore {
    MemoryStore::with_values([
        (storage::LAST_BOOK, book),
        (storage::LAST_CHAPTER, chapter),
        (storage::BIBLE_VERSION, version),
    ])
}

fn settle(reader: &mut Reader<RecordingRenderer>, loads: &ManualDispatchHandle) {
    loads.complete_all();
    reader.process_completions();
}

fn left_version(reader: &Reader<RecordingRenderer>) -> String {
    reader
        .panel(PanelId::Left)
        .map(|p| p.version.as_str().to_string())
        .unwrap_or_default()
}

fn assert_isolated(reader: &Reader<RecordingRenderer>) {
    if reader.is_split_open() {
        assert_eq!(
            reader.global().version.as_str(),
            left_version(reader),
            "global version must follow the left panel"
        );
        assert_eq!(reader.ambient_version().as_str(), left_version(reader));
    }
    assert!(reader.versions_isolated());
}

fn assert_synchronized<R: Renderer>(reader: &Reader<R>) {
    let left = reader.panel(PanelId::Left).unwrap();
    let right = reader.panel(PanelId::Right).unwrap();
    assert_eq!(left.position, right.position);
}

#[test]
fn test_global_version_follows_left_panel_after_every_operation() {
    let (mut reader, loads) = create_reader(FakeLoader::new(), store_at("43", "3", "kjv"));
    reader.restore_session();
    assert_isolated(&reader);

    reader.open_split();
    assert_isolated(&reader);

    reader.change_panel_version(PanelId::Right, VersionCode::new("web"));
    assert_isolated(&reader);
    assert_eq!(reader.global().version.as_str(), "kjv");

    reader.navigate_panel(PanelId::Right, ChapterDirection::Next);
    assert_isolated(&reader);

    reader.change_panel_version(PanelId::Right, VersionCode::original());
    assert_isolated(&reader);

    settle(&mut reader, &loads);
    assert_isolated(&reader);

    reader.navigate(ChapterDirection::Previous);
    assert_isolated(&reader);

    reader.change_version(VersionCode::new("niv"));
    assert_isolated(&reader);
    assert_eq!(reader.global().version.as_str(), "niv");
    assert_eq!(
        reader.panel(PanelId::Right).unwrap().version,
        VersionCode::original()
    );

    reader.select_chapter(1, 1);
    assert_isolated(&reader);

    settle(&mut reader, &loads);
    reader.close_split();
    assert_isolated(&reader);
    assert_eq!(reader.global().version.as_str(), "niv");
}

#[test]
fn test_right_panel_load_uses_its_own_version_without_leaking() {
    let (mut reader, loads) = create_reader(FakeLoader::new(), store_at("43", "3", "kjv"));
    reader.open_split();
    settle(&mut reader, &loads);

    reader.change_panel_version(PanelId::Right, VersionCode::new("web"));

    let right_loads = loads.pending_for(RIGHT);
    assert_eq!(right_loads.len(), 1);
    assert_eq!(right_loads[0].version.as_str(), "web");
    assert!(loads.pending_for(LEFT).is_empty());
    assert_eq!(reader.ambient_version().as_str(), "kjv");

    settle(&mut reader, &loads);
    let right = reader.renderer().last_for(RIGHT).unwrap();
    assert_eq!(right.first_text(), Some("43:3:1 web"));
    let left = reader.renderer().last_for(LEFT).unwrap();
    assert_eq!(left.first_text(), Some("43:3:1 kjv"));
}

#[test]
fn test_shared_navigation_keeps_panels_on_same_chapter() {
    let (mut reader, loads) = create_reader(FakeLoader::new(), store_at("43", "3", "esv"));
    reader.open_split();
    reader.change_panel_version(PanelId::Right, VersionCode::new("kjv"));

    reader.navigate(ChapterDirection::Next);
    assert_synchronized(&reader);
    assert_eq!(reader.panel(PanelId::Left).unwrap().position, Position::new(43, 4));

    reader.navigate_panel(PanelId::Right, ChapterDirection::Next);
    assert_synchronized(&reader);

    reader.select_chapter(19, 23);
    assert_synchronized(&reader);
    assert_eq!(reader.panel(PanelId::Right).unwrap().position, Position::new(19, 23));

    settle(&mut reader, &loads);
    let left = reader.renderer().last_for(LEFT).unwrap();
    let right = reader.renderer().last_for(RIGHT).unwrap();
    assert_eq!(left.display_book_name, "Psalm");
    assert_eq!(left.first_text(), Some("19:23:1 esv"));
    assert_eq!(right.first_text(), Some("19:23:1 kjv"));
}

#[test]
fn test_open_split_twice_is_a_noop() {
    let (mut reader, loads) = create_reader(FakeLoader::new(), store_at("43", "3", "kjv"));
    assert!(reader.open_split());
    reader.change_panel_version(PanelId::Right, VersionCode::new("web"));
    let session = reader.panels().session().cloned();
    let pending = loads.pending().len();

    assert!(!reader.open_split());
    assert_eq!(reader.panels().session().cloned(), session);
    assert_eq!(loads.pending().len(), pending);
}

#[test]
fn test_rollover_and_clamping_in_split_view() {
    let loader = FakeLoader::new();
    let deuteronomy = loader.count_for(5);
    let revelation = loader.count_for(66);
    let (mut reader, _loads) = create_reader(loader, store_at("1", "1", "esv"));
    reader.open_split();

    reader.navigate(ChapterDirection::Previous);
    assert_eq!(reader.panel(PanelId::Left).unwrap().position, Position::first());

    reader.select_chapter(66, revelation);
    reader.navigate(ChapterDirection::Next);
    assert_eq!(
        reader.panel(PanelId::Right).unwrap().position,
        Position::new(66, revelation)
    );

    reader.select_chapter(5, deuteronomy);
    reader.navigate(ChapterDirection::Next);
    assert_eq!(reader.panel(PanelId::Left).unwrap().position, Position::new(6, 1));

    reader.navigate(ChapterDirection::Previous);
    assert_eq!(
        reader.panel(PanelId::Left).unwrap().position,
        Position::new(5, deuteronomy)
    );
    assert_synchronized(&reader);
}

#[test]
fn test_five_forward_steps_preserve_each_panel_version() {
    let (mut reader, loads) = create_reader(FakeLoader::new(), store_at("43", "3", "esv"));
    reader.open_split();
    assert!(reader.panel(PanelId::Right).unwrap().version.is_original());

    for _ in 0..5 {
        reader.navigate(ChapterDirection::Next);
        assert_synchronized(&reader);
        assert_eq!(left_version(&reader), "esv");
        assert!(reader.panel(PanelId::Right).unwrap().version.is_original());
        assert_isolated(&reader);
    }

    let expected = Position::new(43, 8);
    assert_eq!(reader.panel(PanelId::Left).unwrap().position, expected);
    assert_eq!(reader.global().position, expected);

    settle(&mut reader, &loads);
    let left = reader.renderer().last_for(LEFT).unwrap();
    let right = reader.renderer().last_for(RIGHT).unwrap();
    assert_eq!(left.first_text(), Some(fake_text(expected, "esv", 1).as_str()));
    assert_eq!(
        right.first_text(),
        Some(fake_text(expected, "original", 1).as_str())
    );
}

#[test]
fn test_closing_right_panel_transfers_left_state_to_global() {
    let (mut reader, loads) = create_reader(FakeLoader::new(), store_at("43", "3", "kjv"));
    reader.open_split();
    assert!(reader.panel(PanelId::Right).unwrap().version.is_original());

    assert!(!reader.close_panel(PanelId::Left));
    assert!(reader.is_split_open());

    assert!(reader.close_panel(PanelId::Right));
    assert!(!reader.is_split_open());
    assert_eq!(reader.global().position, Position::new(43, 3));
    assert_eq!(reader.global().version.as_str(), "kjv");
    assert_eq!(
        reader.storage().get(storage::SPLIT_VIEW_OPEN).as_deref(),
        Some("false")
    );
    assert!(reader.renderer().cleared.contains(&LEFT));
    assert!(reader.renderer().cleared.contains(&RIGHT));

    // Panel loads still in flight must not draw after the session ended.
    settle(&mut reader, &loads);
    assert_eq!(reader.renderer().count_for(LEFT), 0);
    assert_eq!(reader.renderer().count_for(RIGHT), 0);
    let main = reader.renderer().last_for(RenderTarget::Main).unwrap();
    assert_eq!(main.first_text(), Some("43:3:1 kjv"));

    assert!(!reader.close_panel(PanelId::Right));
}

#[test]
fn test_slow_load_never_overwrites_newer_chapter() {
    let (mut reader, loads) = create_reader(FakeLoader::new(), store_at("43", "4", "esv"));
    reader.open_split();
    settle(&mut reader, &loads);

    reader.select_chapter(43, 5);
    reader.select_chapter(43, 6);
    assert_eq!(loads.pending_for(LEFT).len(), 2);

    loads.complete_all_reversed();
    reader.process_completions();

    let left = reader.renderer().last_for(LEFT).unwrap();
    let right = reader.renderer().last_for(RIGHT).unwrap();
    assert_eq!(left.first_text(), Some("43:6:1 esv"));
    assert_eq!(right.first_text(), Some("43:6:1 na28-ubs5"));
    assert!(
        reader
            .renderer()
            .calls
            .iter()
            .all(|c| c.verses.first().is_none_or(|v| v.chapter != 5))
    );
}

#[test]
fn test_stale_load_resolving_first_is_discarded() {
    let (mut reader, loads) = create_reader(FakeLoader::new(), store_at("43", "4", "esv"));
    reader.restore_session();
    settle(&mut reader, &loads);

    reader.select_chapter(43, 5);
    let stale = loads.pending_for(RenderTarget::Main)[0].ticket;
    reader.select_chapter(43, 6);

    loads.complete(stale);
    assert_eq!(reader.process_completions(), 0);
    assert!(reader.is_loading(RenderTarget::Main));

    settle(&mut reader, &loads);
    let main = reader.renderer().last_for(RenderTarget::Main).unwrap();
    assert_eq!(main.first_text(), Some("43:6:1 esv"));
}

#[test]
fn test_failed_panel_load_does_not_affect_other_panel() {
    let mut store = store_at("43", "3", "esv");
    store.set(storage::REMEMBERED_RIGHT_VERSION, "broken");
    let (mut reader, loads) = create_reader(FakeLoader::new().failing_version("broken"), store);

    reader.open_split();
    settle(&mut reader, &loads);

    let right = reader.renderer().last_for(RIGHT).unwrap();
    assert!(right.verses.is_empty());
    assert_eq!(right.display_book_name, "John");
    let left = reader.renderer().last_for(LEFT).unwrap();
    assert_eq!(left.first_text(), Some("43:3:1 esv"));

    reader.navigate(ChapterDirection::Next);
    settle(&mut reader, &loads);
    assert_eq!(
        reader.renderer().last_for(LEFT).unwrap().first_text(),
        Some("43:4:1 esv")
    );
    assert!(reader.renderer().last_for(RIGHT).unwrap().verses.is_empty());
    assert_isolated(&reader);
}

#[test]
fn test_unresolvable_chapter_count_still_moves_forward() {
    let (mut reader, loads) = create_reader(
        FakeLoader::new().failing_book(10),
        store_at("10", "1", "esv"),
    );
    reader.open_split();
    reader.navigate(ChapterDirection::Next);

    assert_eq!(reader.panel(PanelId::Left).unwrap().position, Position::new(11, 1));
    assert_synchronized(&reader);
    settle(&mut reader, &loads);
    assert_eq!(
        reader.renderer().last_for(LEFT).unwrap().first_text(),
        Some("11:1:1 esv")
    );
}

#[test]
fn test_only_left_panel_controls_move_global_position() {
    let (mut reader, _loads) = create_reader(FakeLoader::new(), store_at("43", "3", "esv"));
    reader.open_split();

    reader.navigate_panel(PanelId::Right, ChapterDirection::Next);
    assert_eq!(reader.panel(PanelId::Left).unwrap().position, Position::new(43, 4));
    assert_eq!(reader.global().position, Position::new(43, 3));

    reader.navigate_panel(PanelId::Left, ChapterDirection::Next);
    assert_eq!(reader.global().position, Position::new(43, 5));
    assert_eq!(
        reader.storage().get(storage::LAST_CHAPTER).as_deref(),
        Some("5")
    );
    assert!(reader.storage().get(storage::LAST_READ_AT).is_some());
}

#[test]
fn test_panel_operations_without_session_are_ignored() {
    let (mut reader, loads) = create_reader(FakeLoader::new(), store_at("43", "3", "esv"));
    reader.change_panel_version(PanelId::Right, VersionCode::new("kjv"));
    reader.navigate_panel(PanelId::Left, ChapterDirection::Next);
    assert!(!reader.close_panel(PanelId::Right));

    assert!(loads.pending().is_empty());
    assert_eq!(reader.global().position, Position::new(43, 3));
    assert_eq!(reader.storage().get(storage::REMEMBERED_RIGHT_VERSION), None);
}

#[test]
fn test_right_version_is_remembered_for_next_session() {
    let (mut reader, _loads) = create_reader(FakeLoader::new(), store_at("43", "3", "esv"));
    reader.open_split();
    reader.change_panel_version(PanelId::Right, VersionCode::new("web"));
    reader.change_panel_version(PanelId::Left, VersionCode::new("kjv"));
    reader.close_split();

    assert_eq!(reader.global().version.as_str(), "kjv");
    assert_eq!(
        reader.storage().get(storage::BIBLE_VERSION).as_deref(),
        Some("kjv")
    );

    reader.open_split();
    assert_eq!(left_version(&reader), "kjv");
    assert_eq!(reader.panel(PanelId::Right).unwrap().version.as_str(), "web");
}

#[test]
fn test_session_restore_reopens_split_with_saved_ratio() {
    let mut store = store_at("2", "7", "kjv");
    store.set(storage::SPLIT_VIEW_OPEN, "true");
    store.set(storage::SPLIT_RATIO, "40.0%");
    let (mut reader, loads) = create_reader(FakeLoader::new(), store);

    reader.restore_session();
    assert!(reader.is_split_open());
    assert_eq!(reader.panel(PanelId::Left).unwrap().position, Position::new(2, 7));
    assert!((reader.layout().left_percent() - 40.0).abs() < 0.01);

    settle(&mut reader, &loads);
    assert_eq!(reader.renderer().count_for(RenderTarget::Main), 0);
    assert_eq!(
        reader.renderer().last_for(RIGHT).unwrap().first_text(),
        Some("2:7:1 wlc")
    );
}

#[test]
fn test_original_language_panel_gets_hebrew_book_name() {
    let (mut reader, loads) = create_reader(FakeLoader::new(), store_at("1", "1", "esv"));
    reader.open_split();
    settle(&mut reader, &loads);

    assert_eq!(reader.renderer().last_for(LEFT).unwrap().display_book_name, "Genesis");
    assert_eq!(reader.renderer().last_for(RIGHT).unwrap().display_book_name, "hebrew-1");
}

#[test]
fn test_resize_is_clamped_and_persisted() {
    let (mut reader, _loads) = create_reader(FakeLoader::new(), MemoryStore::new());
    assert_eq!(reader.resize_split(100.0, 1000.0), 50.0);

    reader.open_split();
    let percent = reader.resize_split(-400.0, 1000.0);
    assert!((percent - 35.0).abs() < 0.01);
    assert_eq!(
        reader.storage().get(storage::SPLIT_RATIO).as_deref(),
        Some("35.0%")
    );
    assert_eq!(reader.drag_split(200.0, 600.0), 50.0);
}

#[test]
fn test_single_view_navigation_and_version_change() {
    let (mut reader, loads) = create_reader(FakeLoader::new(), store_at("6", "1", "esv"));
    reader.restore_session();
    reader.navigate(ChapterDirection::Previous);
    assert_eq!(reader.global().position, Position::new(5, 34));

    reader.change_version(VersionCode::new("kjv"));
    assert_eq!(
        reader.storage().get(storage::BIBLE_VERSION).as_deref(),
        Some("kjv")
    );

    reader.select_chapter(43, 99);
    assert_eq!(reader.global().position, Position::new(43, 21));
    reader.select_chapter(70, 1);
    assert_eq!(reader.global().position, Position::new(43, 21));

    settle(&mut reader, &loads);
    let main = reader.renderer().last_for(RenderTarget::Main).unwrap();
    assert_eq!(main.first_text(), Some("43:21:1 kjv"));
    assert_eq!(reader.renderer().count_for(RenderTarget::Main), 1);
}

#[test]
fn test_saved_chapter_past_end_of_book_is_clamped() {
    let (mut reader, loads) = create_reader(FakeLoader::new(), store_at("43", "99", "esv"));
    assert_eq!(reader.global().position, Position::new(43, 21));

    reader.restore_session();
    settle(&mut reader, &loads);
    let main = reader.renderer().last_for(RenderTarget::Main).unwrap();
    assert_eq!(main.first_text(), Some("43:21:1 esv"));

    reader.open_split();
    assert_eq!(reader.panel(PanelId::Left).unwrap().position, Position::new(43, 21));
    assert_synchronized(&reader);
}

#[test]
fn test_one_panel_failing_mid_session_recovers_on_next_chapter() {
    let (mut reader, loads) = create_reader(FakeLoader::new(), store_at("43", "3", "esv"));
    reader.open_split();

    let right = loads.pending_for(RIGHT)[0].ticket;
    assert!(loads.complete_with(right, Err(LoadError::Empty(43))));
    loads.complete_all();
    reader.process_completions();

    let right_call = reader.renderer().last_for(RIGHT).unwrap();
    assert!(right_call.verses.is_empty());
    assert_eq!(right_call.display_book_name, "John");
    assert_eq!(
        reader.renderer().last_for(LEFT).unwrap().first_text(),
        Some("43:3:1 esv")
    );

    reader.navigate(ChapterDirection::Next);
    settle(&mut reader, &loads);
    assert_eq!(
        reader.renderer().last_for(RIGHT).unwrap().first_text(),
        Some("43:4:1 na28-ubs5")
    );
    assert_isolated(&reader);
}

/// Renderer that asks for more navigation from inside a render callback.
struct ChainingRenderer {
    inner: RecordingRenderer,
    queue: Option<NavigationQueue>,
    requests_left: usize,
}

impl Renderer for ChainingRenderer {
    fn render(&mut self, target: RenderTarget, verses: &[Verse], display_book_name: &str) {
        self.inner.render(target, verses, display_book_name);
        if target == LEFT && self.requests_left > 0 {
            self.requests_left -= 1;
            if let Some(queue) = &self.queue {
                queue.push(NavigationRequest::Shared(ChapterDirection::Next));
            }
        }
    }
}

#[test]
fn test_navigation_requested_during_render_runs_afterwards() {
    let loader: Arc<dyn TextLoader> = Arc::new(FakeLoader::new());
    let mut reader = Reader::new(
        loader.clone(),
        Box::new(InlineDispatcher::new(loader)),
        Box::new(store_at("43", "3", "esv")),
        ChainingRenderer {
            inner: RecordingRenderer::new(),
            queue: None,
            requests_left: 2,
        },
    );
    let queue = reader.navigation_queue();
    reader.renderer_mut().queue = Some(queue.clone());

    reader.open_split();
    reader.process_completions();
    assert!(queue.is_empty());
    assert_eq!(reader.panel(PanelId::Left).unwrap().position, Position::new(43, 4));
    assert_synchronized(&reader);

    reader.process_completions();
    assert_eq!(reader.panel(PanelId::Left).unwrap().position, Position::new(43, 5));

    reader.process_completions();
    let renderer = reader.renderer();
    assert_eq!(renderer.requests_left, 0);
    let shown: Vec<u16> = renderer
        .inner
        .calls
        .iter()
        .filter(|c| c.target == LEFT)
        .filter_map(|c| c.verses.first().map(|v| v.chapter))
        .collect();
    assert_eq!(shown, vec![3, 4, 5]);
    assert_isolated_generic(&reader);
}

fn assert_isolated_generic<R: Renderer>(reader: &Reader<R>) {
    assert!(reader.versions_isolated());
    assert_eq!(
        reader.global().version,
        reader.panel(PanelId::Left).unwrap().version
    );
}
