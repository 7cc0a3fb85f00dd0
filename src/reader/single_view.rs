use super::Reader;
use crate::books;
use crate::navigator::{self, ChapterDirection};
use crate::render::Renderer;
use crate::state::{PanelId, Position};
use crate::version::VersionCode;
use log::{debug, warn};

impl<R: Renderer> Reader<R> {
    pub(super) fn step_single(&mut self, direction: ChapterDirection) {
        let version = self.global.version.clone();
        let target = navigator::step(self.loader.as_ref(), self.global.position, direction, &version);
        if target == self.global.position {
            debug!("Already at {}; nothing to do", target);
            return;
        }
        self.move_global(target);
    }

    pub(super) fn select_single(&mut self, requested: Position) {
        let version = self.global.version.clone();
        if let Some(target) = self.resolve_selection(requested, &version) {
            self.move_global(target);
        }
    }

    fn move_global(&mut self, position: Position) {
        self.global.position = position;
        self.persist_last_read();
        self.show_main();
    }

    /// Changes the version of the reading view. With split view open this is
    /// the left panel's version.
    pub fn change_version(&mut self, version: VersionCode) {
        if self.panels.is_active() {
            self.change_panel_version(PanelId::Left, version);
            return;
        }
        if self.global.version == version {
            return;
        }
        debug!("Version {} -> {}", self.global.version, version);
        self.global.version = version;
        self.persist_global_version();
        self.show_main();
    }

    /// Validates a menu selection. Unknown books are rejected; chapters past
    /// the end clamp to the last chapter when the count can be resolved.
    pub(super) fn resolve_selection(
        &self,
        requested: Position,
        version: &VersionCode,
    ) -> Option<Position> {
        if !books::is_valid_book(requested.book) {
            warn!("Ignoring selection of unknown book {}", requested.book);
            return None;
        }
        let chapter = requested.chapter.max(1);
        match self.loader.chapter_count(requested.book, version) {
            Ok(count) if count > 0 && chapter > count => {
                debug!("Chapter {chapter} clamped to {count} in book {}", requested.book);
                Some(Position::new(requested.book, count))
            }
            Ok(_) => Some(Position::new(requested.book, chapter)),
            Err(e) => {
                warn!("Chapter count unavailable for book {}: {e}", requested.book);
                Some(Position::new(requested.book, chapter))
            }
        }
    }
}
