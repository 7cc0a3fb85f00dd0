use super::Reader;
use crate::layout;
use crate::panel_store::SplitViewSession;
use crate::render::{RenderTarget, Renderer};
use crate::state::{GlobalNavigationState, PanelId};
use crate::storage;
use crate::version::VersionCode;
use log::{debug, info};

impl<R: Renderer> Reader<R> {
    /// Opens the split view on the current chapter. The left panel takes the
    /// global version; the right panel takes the version it had last time,
    /// or the original-language edition. Returns false if already open.
    pub fn open_split(&mut self) -> bool {
        if self.panels.is_active() {
            debug!("Split view already open");
            return false;
        }

        let position = self.global.position;
        let left_version = self.global.version.clone();
        let right_version = self
            .storage
            .get(storage::REMEMBERED_RIGHT_VERSION)
            .map(VersionCode::new)
            .filter(|v| !v.as_str().is_empty())
            .unwrap_or_else(VersionCode::original);

        self.panels.begin(SplitViewSession::new(
            position,
            left_version.clone(),
            right_version.clone(),
        ));
        self.storage.set(storage::SPLIT_VIEW_OPEN, "true");
        if let Some(percent) = self
            .storage
            .get(storage::SPLIT_RATIO)
            .and_then(|v| layout::parse_ratio(&v))
        {
            self.layout.restore(percent);
        }
        info!("Split view opened at {position} ({left_version} | {right_version})");

        self.latest.remove(&RenderTarget::Main);
        self.set_ambient_version(&right_version);
        self.issue_load(RenderTarget::Panel(PanelId::Right), position);
        self.set_ambient_version(&left_version);
        self.issue_load(RenderTarget::Panel(PanelId::Left), position);

        self.reassert_versions();
        true
    }

    /// Closes one panel. Only the secondary panel can be closed; doing so ends
    /// the session and the primary panel's chapter and version become the
    /// global state.
    pub fn close_panel(&mut self, id: PanelId) -> bool {
        let Some(panel) = self.panels.get(id) else {
            debug!("Ignoring close of {} panel: split view closed", id.label());
            return false;
        };
        if panel.is_primary() {
            debug!("The {} panel cannot be closed on its own", id.label());
            return false;
        }
        let Some(session) = self.panels.end() else {
            return false;
        };

        let survivor = session.panel(id.other());
        self.global = GlobalNavigationState::new(survivor.position, survivor.version.clone());
        info!("Split view closed; continuing at {} ({})", self.global.position, self.global.version);

        for panel in session.panels() {
            let target = RenderTarget::Panel(panel.id);
            self.latest.remove(&target);
            self.renderer.clear(target);
        }

        self.storage.set(storage::SPLIT_VIEW_OPEN, "false");
        self.persist_global_version();
        self.persist_last_read();
        self.show_main();
        true
    }

    pub fn close_split(&mut self) -> bool {
        self.close_panel(PanelId::Right)
    }

    pub fn toggle_split(&mut self) {
        if self.panels.is_active() {
            self.close_split();
        } else {
            self.open_split();
        }
    }

    /// Moves the split divider to `left_width` out of `available` units.
    pub fn drag_split(&mut self, left_width: f32, available: f32) -> f32 {
        if !self.panels.is_active() {
            return self.layout.left_percent();
        }
        let percent = self.layout.drag_to(left_width, available);
        self.persist_ratio(percent);
        percent
    }

    /// Moves the split divider by `delta` units.
    pub fn resize_split(&mut self, delta: f32, available: f32) -> f32 {
        if !self.panels.is_active() {
            return self.layout.left_percent();
        }
        let percent = self.layout.resize_by(delta, available);
        self.persist_ratio(percent);
        percent
    }

    fn persist_ratio(&mut self, percent: f32) {
        self.storage
            .set(storage::SPLIT_RATIO, &layout::format_ratio(percent));
    }
}
