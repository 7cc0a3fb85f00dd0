mod lifecycle;
mod loading;
mod queue;
mod single_view;
mod split_sync;
mod version_guard;

pub use queue::{NavigationQueue, NavigationRequest};

use crate::books;
use crate::layout::{DEFAULT_MIN_PANEL_WIDTH, SplitLayout};
use crate::loader::{LoadDispatcher, LoadRequest, TextLoader};
use crate::navigator::ChapterDirection;
use crate::panel_store::PanelStore;
use crate::render::{RenderTarget, Renderer};
use crate::state::{GlobalNavigationState, PanelId, PanelState, Position};
use crate::storage::{self, KeyValueStore};
use crate::version::VersionCode;
use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ReaderOptions {
    /// Used when nothing was persisted yet.
    pub default_version: VersionCode,
    pub min_panel_width: f32,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            default_version: VersionCode::default(),
            min_panel_width: DEFAULT_MIN_PANEL_WIDTH,
        }
    }
}

/// Owns navigation state for the single-panel view and the split view, and
/// keeps the two panels on the same chapter while each shows its own version.
pub struct Reader<R: Renderer> {
    global: GlobalNavigationState,
    panels: PanelStore,
    layout: SplitLayout,

    loader: Arc<dyn TextLoader>,
    dispatcher: Box<dyn LoadDispatcher>,
    // Version the shared text service would load with if asked right now.
    ambient_version: VersionCode,
    next_ticket: u64,
    latest: HashMap<RenderTarget, LoadRequest>,

    storage: Box<dyn KeyValueStore>,
    renderer: R,

    queue: NavigationQueue,
    navigating: bool,
}

impl<R: Renderer> Reader<R> {
    pub fn new(
        loader: Arc<dyn TextLoader>,
        dispatcher: Box<dyn LoadDispatcher>,
        storage: Box<dyn KeyValueStore>,
        renderer: R,
    ) -> Self {
        Self::with_options(loader, dispatcher, storage, renderer, ReaderOptions::default())
    }

    pub fn with_options(
        loader: Arc<dyn TextLoader>,
        dispatcher: Box<dyn LoadDispatcher>,
        storage: Box<dyn KeyValueStore>,
        renderer: R,
        options: ReaderOptions,
    ) -> Self {
        let global = persisted_global(storage.as_ref(), &options.default_version);
        debug!("Reader starting at {} ({})", global.position, global.version);

        let mut reader = Self {
            ambient_version: global.version.clone(),
            global,
            panels: PanelStore::new(),
            layout: SplitLayout::new(options.min_panel_width),
            loader,
            dispatcher,
            next_ticket: 0,
            latest: HashMap::new(),
            storage,
            renderer,
            queue: NavigationQueue::default(),
            navigating: false,
        };

        // A saved chapter may be past the end of the book in this edition.
        let version = reader.global.version.clone();
        if let Some(position) = reader.resolve_selection(reader.global.position, &version) {
            if position != reader.global.position {
                info!("Restored {} clamped to {}", reader.global.position, position);
                reader.global.position = position;
            }
        }
        reader
    }

    /// Loads the persisted chapter and reopens the split view if it was open
    /// when the previous session ended.
    pub fn restore_session(&mut self) {
        self.show_main();
        let reopen = self.storage.get(storage::SPLIT_VIEW_OPEN).as_deref() == Some("true");
        if reopen {
            info!("Restoring split view");
            self.open_split();
        }
    }

    pub fn global(&self) -> &GlobalNavigationState {
        &self.global
    }

    pub fn panel(&self, id: PanelId) -> Option<&PanelState> {
        self.panels.get(id)
    }

    pub fn panels(&self) -> &PanelStore {
        &self.panels
    }

    pub fn is_split_open(&self) -> bool {
        self.panels.is_active()
    }

    pub fn layout(&self) -> &SplitLayout {
        &self.layout
    }

    pub fn loader(&self) -> &dyn TextLoader {
        self.loader.as_ref()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn storage(&self) -> &dyn KeyValueStore {
        self.storage.as_ref()
    }

    /// Handle for queueing navigation from outside the reader, e.g. from a
    /// renderer reacting to a finished load.
    pub fn navigation_queue(&self) -> NavigationQueue {
        self.queue.clone()
    }

    /// Shared previous/next controls. In split view this moves both panels
    /// and keeps the global position in step.
    pub fn navigate(&mut self, direction: ChapterDirection) {
        self.submit(NavigationRequest::Shared(direction));
    }

    /// Previous/next from one panel's own controls.
    pub fn navigate_panel(&mut self, id: PanelId, direction: ChapterDirection) {
        self.submit(NavigationRequest::Panel(id, direction));
    }

    /// Direct book/chapter selection from the menu.
    pub fn select_chapter(&mut self, book: u8, chapter: u16) {
        self.submit(NavigationRequest::Select(Position::new(book, chapter)));
    }

    fn persist_last_read(&mut self) {
        let position = self.global.position;
        self.storage
            .set(storage::LAST_BOOK, &position.book.to_string());
        self.storage
            .set(storage::LAST_CHAPTER, &position.chapter.to_string());
        self.storage
            .set(storage::LAST_READ_AT, &chrono::Utc::now().to_rfc3339());
    }

    fn persist_global_version(&mut self) {
        self.storage
            .set(storage::BIBLE_VERSION, self.global.version.as_str());
    }
}

fn persisted_global(store: &dyn KeyValueStore, default_version: &VersionCode) -> GlobalNavigationState {
    let book = store
        .get(storage::LAST_BOOK)
        .and_then(|v| v.parse::<u8>().ok())
        .filter(|b| books::is_valid_book(*b));
    let chapter = store
        .get(storage::LAST_CHAPTER)
        .and_then(|v| v.parse::<u16>().ok())
        .filter(|c| *c >= 1);
    let position = match (book, chapter) {
        (Some(book), Some(chapter)) => Position::new(book, chapter),
        (Some(book), None) => Position::new(book, 1),
        _ => Position::first(),
    };

    let version = store
        .get(storage::BIBLE_VERSION)
        .map(VersionCode::new)
        .filter(|v| !v.as_str().is_empty())
        .unwrap_or_else(|| default_version.clone());

    GlobalNavigationState::new(position, version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_persisted_global_defaults() {
        let store = MemoryStore::new();
        let global = persisted_global(&store, &VersionCode::new("kjv"));
        assert_eq!(global.position, Position::first());
        assert_eq!(global.version.as_str(), "kjv");
    }

    #[test]
    fn test_persisted_global_reads_saved_values() {
        let store = MemoryStore::with_values([
            (storage::LAST_BOOK, "43"),
            (storage::LAST_CHAPTER, "3"),
            (storage::BIBLE_VERSION, "niv"),
        ]);
        let global = persisted_global(&store, &VersionCode::default());
        assert_eq!(global.position, Position::new(43, 3));
        assert_eq!(global.version.as_str(), "niv");
    }

    #[test]
    fn test_persisted_global_ignores_invalid_book() {
        let store = MemoryStore::with_values([
            (storage::LAST_BOOK, "90"),
            (storage::LAST_CHAPTER, "3"),
        ]);
        let global = persisted_global(&store, &VersionCode::default());
        assert_eq!(global.position, Position::first());
    }
}
