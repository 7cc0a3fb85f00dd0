use super::Reader;
use crate::render::Renderer;
use log::debug;

impl<R: Renderer> Reader<R> {
    /// Makes the primary panel's version the global and ambient version.
    /// Runs as the final step of every operation that loads panel text or
    /// changes a panel version.
    pub(super) fn reassert_versions(&mut self) {
        let Some(session) = self.panels.session() else {
            return;
        };
        let version = session.primary().version.clone();

        if self.global.version != version {
            debug!("Global version {} -> {}", self.global.version, version);
            self.global.version = version.clone();
        }
        self.set_ambient_version(&version);
    }

    /// Checks that neither the global indicator nor the text service carry
    /// any version other than the one the reading view shows.
    pub fn versions_isolated(&self) -> bool {
        match self.panels.session() {
            Some(session) => {
                let primary = &session.primary().version;
                self.global.version == *primary && self.ambient_version == *primary
            }
            None => self.global.version == self.ambient_version,
        }
    }
}
