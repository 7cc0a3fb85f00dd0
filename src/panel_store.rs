use crate::state::{PanelId, PanelRole, PanelState, Position};
use crate::storage::{KeyValueStore, REMEMBERED_RIGHT_VERSION};
use crate::version::VersionCode;
use log::debug;

/// The two panels of an active split view. The left panel is always primary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitViewSession {
    primary: PanelState,
    secondary: PanelState,
}

impl SplitViewSession {
    pub fn new(position: Position, left_version: VersionCode, right_version: VersionCode) -> Self {
        Self {
            primary: PanelState::new(PanelId::Left, PanelRole::Primary, position, left_version),
            secondary: PanelState::new(
                PanelId::Right,
                PanelRole::Secondary,
                position,
                right_version,
            ),
        }
    }

    pub fn primary(&self) -> &PanelState {
        &self.primary
    }

    pub fn secondary(&self) -> &PanelState {
        &self.secondary
    }

    pub fn panel(&self, id: PanelId) -> &PanelState {
        if self.primary.id == id {
            &self.primary
        } else {
            &self.secondary
        }
    }

    fn panel_mut(&mut self, id: PanelId) -> &mut PanelState {
        if self.primary.id == id {
            &mut self.primary
        } else {
            &mut self.secondary
        }
    }

    pub fn panels(&self) -> [&PanelState; 2] {
        [&self.primary, &self.secondary]
    }

    pub fn is_synchronized(&self) -> bool {
        self.primary.position == self.secondary.position
    }
}

/// Authoritative storage for the panel states of the current split-view
/// session. Every accessor answers `None`/`false` while no session is active.
#[derive(Debug, Default)]
pub struct PanelStore {
    session: Option<SplitViewSession>,
}

impl PanelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&SplitViewSession> {
        self.session.as_ref()
    }

    pub fn get(&self, id: PanelId) -> Option<&PanelState> {
        self.session.as_ref().map(|s| s.panel(id))
    }

    pub fn set_book_chapter(&mut self, id: PanelId, position: Position) -> bool {
        let Some(session) = self.session.as_mut() else {
            debug!("set_book_chapter({}) ignored: no active split view", id.label());
            return false;
        };
        session.panel_mut(id).position = position;
        true
    }

    /// Changes a panel's version. The right panel's choice is remembered for
    /// the next session; the left panel inherits the global version instead.
    pub fn set_version(
        &mut self,
        id: PanelId,
        version: VersionCode,
        storage: &mut dyn KeyValueStore,
    ) -> bool {
        let Some(session) = self.session.as_mut() else {
            debug!("set_version({}) ignored: no active split view", id.label());
            return false;
        };
        let panel = session.panel_mut(id);
        if !panel.is_primary() {
            storage.set(REMEMBERED_RIGHT_VERSION, version.as_str());
        }
        panel.version = version;
        true
    }

    /// Reasserts a captured version without touching persistence.
    pub(crate) fn restore_version(&mut self, id: PanelId, version: VersionCode) {
        if let Some(session) = self.session.as_mut() {
            session.panel_mut(id).version = version;
        }
    }

    pub(crate) fn begin(&mut self, session: SplitViewSession) {
        self.session = Some(session);
    }

    pub(crate) fn end(&mut self) -> Option<SplitViewSession> {
        self.session.take()
    }
}
