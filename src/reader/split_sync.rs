use super::Reader;
use crate::navigator::{self, ChapterDirection};
use crate::render::{RenderTarget, Renderer};
use crate::state::{PanelId, Position};
use crate::version::VersionCode;
use log::debug;

impl<R: Renderer> Reader<R> {
    /// Moves both panels one chapter. The step is computed from the primary
    /// panel whichever panel's controls were used.
    pub(super) fn sync_step(&mut self, origin: PanelId, direction: ChapterDirection) {
        let Some(session) = self.panels.session() else {
            debug!("Ignoring {} panel navigation: split view closed", origin.label());
            return;
        };
        let from = session.primary().position;
        let left_version = session.primary().version.clone();
        let right_version = session.secondary().version.clone();

        let target = navigator::step(self.loader.as_ref(), from, direction, &left_version);
        self.apply_synchronized(origin, target, left_version, right_version);
    }

    /// Menu selection while split view is open. The menu belongs to the
    /// reading view, so the result is always mirrored into global state.
    pub(super) fn sync_select(&mut self, requested: Position) {
        let Some(session) = self.panels.session() else {
            return;
        };
        let left_version = session.primary().version.clone();
        let right_version = session.secondary().version.clone();

        match self.resolve_selection(requested, &left_version) {
            Some(target) => {
                self.apply_synchronized(PanelId::Left, target, left_version, right_version)
            }
            None => self.reassert_versions(),
        }
    }

    fn apply_synchronized(
        &mut self,
        origin: PanelId,
        target: Position,
        left_version: VersionCode,
        right_version: VersionCode,
    ) {
        self.panels.set_book_chapter(PanelId::Left, target);
        self.panels.set_book_chapter(PanelId::Right, target);
        self.panels.restore_version(PanelId::Left, left_version.clone());
        self.panels.restore_version(PanelId::Right, right_version.clone());

        // Each load reads the ambient version, so it is set right before the
        // load it applies to.
        self.set_ambient_version(&right_version);
        self.issue_load(RenderTarget::Panel(PanelId::Right), target);
        self.set_ambient_version(&left_version);
        self.issue_load(RenderTarget::Panel(PanelId::Left), target);

        let mirrors_global = self.panels.get(origin).is_some_and(|p| p.is_primary());
        if mirrors_global {
            self.global.position = target;
            self.persist_last_read();
        }
        debug!(
            "Panels synchronized at {} via {} panel ({} | {})",
            target,
            origin.label(),
            left_version,
            right_version
        );

        self.reassert_versions();
    }

    /// Changes one panel's version and reloads only that panel.
    pub fn change_panel_version(&mut self, id: PanelId, version: VersionCode) {
        if !self
            .panels
            .set_version(id, version.clone(), self.storage.as_mut())
        {
            return;
        }
        let Some(panel) = self.panels.get(id) else {
            return;
        };
        let position = panel.position;
        if panel.is_primary() {
            self.storage
                .set(crate::storage::BIBLE_VERSION, version.as_str());
        }
        debug!("{} panel version -> {}", id.label(), version);

        self.set_ambient_version(&version);
        self.issue_load(RenderTarget::Panel(id), position);
        self.reassert_versions();
    }
}
