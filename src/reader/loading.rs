use super::Reader;
use crate::books;
use crate::loader::{LoadCompletion, LoadRequest, LoadTicket, Verse};
use crate::render::{RenderTarget, Renderer};
use crate::state::Position;
use crate::version::VersionCode;
use log::{debug, error, warn};

impl<R: Renderer> Reader<R> {
    /// Version the next issued load will use.
    pub fn ambient_version(&self) -> &VersionCode {
        &self.ambient_version
    }

    pub(super) fn set_ambient_version(&mut self, version: &VersionCode) {
        if self.ambient_version != *version {
            debug!("Text service version {} -> {}", self.ambient_version, version);
            self.ambient_version = version.clone();
        }
    }

    /// Issues a chapter load for `target` with the current ambient version.
    /// Any earlier load still outstanding for the same target becomes stale.
    pub(super) fn issue_load(&mut self, target: RenderTarget, position: Position) -> LoadTicket {
        self.next_ticket += 1;
        let request = LoadRequest {
            ticket: LoadTicket(self.next_ticket),
            target,
            position,
            version: self.ambient_version.clone(),
        };
        debug!(
            "Issuing {:?} for {}: {} ({})",
            request.ticket,
            target.label(),
            position,
            request.version
        );
        let ticket = request.ticket;
        self.latest.insert(target, request.clone());
        self.dispatcher.dispatch(request);
        ticket
    }

    /// Loads the global position into the single-panel view.
    pub(super) fn show_main(&mut self) {
        let version = self.global.version.clone();
        self.set_ambient_version(&version);
        self.issue_load(RenderTarget::Main, self.global.position);
    }

    /// Renders every completion that is still current and discards the rest,
    /// then runs any navigation queued while rendering. Returns how many
    /// completions were rendered.
    pub fn process_completions(&mut self) -> usize {
        let completions = self.dispatcher.drain();
        let mut rendered = 0;
        for completion in completions {
            if self.apply_completion(completion) {
                rendered += 1;
            }
        }
        self.run_navigation_queue();
        rendered
    }

    /// True while `target` has a load that has not been rendered yet.
    pub fn is_loading(&self, target: RenderTarget) -> bool {
        self.latest.contains_key(&target)
    }

    fn apply_completion(&mut self, completion: LoadCompletion) -> bool {
        let LoadCompletion { request, result } = completion;
        let target = request.target;

        let is_latest = self
            .latest
            .get(&target)
            .is_some_and(|latest| latest.ticket == request.ticket);
        if !is_latest {
            debug!(
                "Discarding superseded {:?} for {}",
                request.ticket,
                target.label()
            );
            return false;
        }
        self.latest.remove(&target);

        if !self.still_shows(&request) {
            debug!(
                "Discarding {:?} for {}: target moved on",
                request.ticket,
                target.label()
            );
            return false;
        }

        match result {
            Ok(verses) => {
                let name = display_book_name(request.position.book, &request.version, &verses);
                self.renderer.render(target, &verses, &name);
            }
            Err(e) => {
                error!(
                    "Failed to load {} ({}) for {}: {e}",
                    request.position,
                    request.version,
                    target.label()
                );
                let name = display_book_name(request.position.book, &request.version, &[]);
                self.renderer.render(target, &[], &name);
            }
        }
        true
    }

    // A completion is only drawn if the target still expects exactly that
    // chapter in exactly that version.
    fn still_shows(&self, request: &LoadRequest) -> bool {
        match request.target {
            RenderTarget::Main => {
                if self.panels.is_active() {
                    return false;
                }
                self.global.position == request.position && self.global.version == request.version
            }
            RenderTarget::Panel(id) => match self.panels.get(id) {
                Some(panel) => {
                    if panel.version != request.version {
                        warn!(
                            "{} panel load used {} but the panel shows {}",
                            id.label(),
                            request.version,
                            panel.version
                        );
                    }
                    panel.position == request.position && panel.version == request.version
                }
                None => false,
            },
        }
    }
}

/// Hebrew editions label Old Testament books with the name found in the text
/// itself; everything else uses the canonical display name.
pub fn display_book_name(book: u8, version: &VersionCode, verses: &[Verse]) -> String {
    if version.uses_hebrew_names(book) {
        if let Some(name) = verses.iter().find_map(|v| v.book_name.as_deref()) {
            return name.to_string();
        }
    }
    books::by_number(book)
        .map(|b| b.display_name().to_string())
        .unwrap_or_default()
}
