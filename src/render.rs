use crate::loader::Verse;
use crate::state::PanelId;

/// Where chapter content is drawn: the single-panel view or one split panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderTarget {
    Main,
    Panel(PanelId),
}

impl RenderTarget {
    pub fn label(&self) -> &'static str {
        match self {
            RenderTarget::Main => "main",
            RenderTarget::Panel(id) => id.label(),
        }
    }
}

/// Draws a chapter into a content region. An empty `verses` slice is the
/// "no content" state shown after a failed load.
pub trait Renderer {
    fn render(&mut self, target: RenderTarget, verses: &[Verse], display_book_name: &str);

    /// Called when a split panel is torn down so its region can be released.
    fn clear(&mut self, _target: RenderTarget) {}
}
