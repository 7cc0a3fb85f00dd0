use crate::loader::Verse;
use crate::render::{RenderTarget, Renderer};
use crate::theme::Base16Palette;
use log::debug;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
struct ChapterPane {
    heading: String,
    verses: Vec<Verse>,
    scroll: u16,
}

/// Terminal-side content of the main view and the two split panels.
#[derive(Debug, Default)]
pub struct ChapterViews {
    panes: HashMap<RenderTarget, ChapterPane>,
}

impl ChapterViews {
    pub fn new() -> Self {
        Self::default()
    }

    /// `"<book> <chapter>"`, or just the book name when nothing could be loaded.
    pub fn heading(&self, target: RenderTarget) -> Option<&str> {
        self.panes.get(&target).map(|p| p.heading.as_str())
    }

    pub fn verse_count(&self, target: RenderTarget) -> usize {
        self.panes.get(&target).map_or(0, |p| p.verses.len())
    }

    pub fn scroll_offset(&self, target: RenderTarget) -> u16 {
        self.panes.get(&target).map_or(0, |p| p.scroll)
    }

    pub fn scroll(&mut self, target: RenderTarget, delta: i32) {
        if let Some(pane) = self.panes.get_mut(&target) {
            let next = i32::from(pane.scroll) + delta;
            pane.scroll = next.clamp(0, i32::from(u16::MAX)) as u16;
        }
    }

    pub fn scroll_to_top(&mut self, target: RenderTarget) {
        if let Some(pane) = self.panes.get_mut(&target) {
            pane.scroll = 0;
        }
    }

    pub fn render_pane(
        &self,
        f: &mut Frame,
        area: Rect,
        target: RenderTarget,
        version_label: &str,
        is_focused: bool,
        palette: &Base16Palette,
    ) {
        let (text_color, border_color, bg_color) = palette.get_panel_colors(is_focused);

        let pane = self.panes.get(&target);
        let heading = pane.map_or("Loading…", |p| p.heading.as_str());
        let title = format!(" {heading} · {version_label} ");

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(bg_color));

        let lines = match pane {
            Some(pane) if pane.verses.is_empty() => vec![Line::from(Span::styled(
                "No text available for this chapter.",
                Style::default().fg(palette.base_08),
            ))],
            Some(pane) => verse_lines(&pane.verses, text_color, palette),
            None => Vec::new(),
        };

        let paragraph = Paragraph::new(lines)
            .block(block)
            .style(Style::default().fg(text_color).bg(bg_color))
            .wrap(Wrap { trim: false })
            .scroll((pane.map_or(0, |p| p.scroll), 0));

        f.render_widget(paragraph, area);
    }
}

fn verse_lines(
    verses: &[Verse],
    text_color: ratatui::style::Color,
    palette: &Base16Palette,
) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(verses.len() * 2);
    for verse in verses {
        if let Some(title) = &verse.title {
            if !lines.is_empty() {
                lines.push(Line::default());
            }
            lines.push(Line::from(Span::styled(
                title.clone(),
                Style::default()
                    .fg(palette.base_0d)
                    .add_modifier(Modifier::BOLD),
            )));
        }
        lines.push(Line::from(vec![
            Span::styled(
                format!("{} ", verse.number),
                Style::default().fg(palette.base_0a),
            ),
            Span::styled(verse.text.clone(), Style::default().fg(text_color)),
        ]));
    }
    lines
}

impl Renderer for ChapterViews {
    fn render(&mut self, target: RenderTarget, verses: &[Verse], display_book_name: &str) {
        let heading = match verses.first() {
            Some(verse) => format!("{} {}", display_book_name, verse.chapter),
            None => display_book_name.to_string(),
        };
        debug!("{}: {} ({} verses)", target.label(), heading, verses.len());
        self.panes.insert(
            target,
            ChapterPane {
                heading,
                verses: verses.to_vec(),
                scroll: 0,
            },
        );
    }

    fn clear(&mut self, target: RenderTarget) {
        self.panes.remove(&target);
    }
}
