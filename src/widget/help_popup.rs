use crate::theme::current_theme;
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
    },
};

pub enum HelpPopupAction {
    Close,
}

const KEY_BINDINGS: &[(&str, &[(&str, &str)])] = &[
    (
        "Reading",
        &[
            ("h / l", "previous / next chapter (both panels in split view)"),
            ("p / n", "previous / next chapter from the focused panel"),
            ("j / k", "scroll the focused view"),
            ("v / V", "next / previous version of the focused view"),
            ("b", "book and chapter menu"),
        ],
    ),
    (
        "Split view",
        &[
            ("s", "open or close split view"),
            ("Tab", "switch focus between panels"),
            ("x", "close the focused panel (right panel only)"),
            ("< / >", "move the divider"),
        ],
    ),
    (
        "General",
        &[
            ("t", "toggle dark / light palette"),
            ("?", "this help"),
            ("q", "quit"),
        ],
    ),
];

pub struct HelpPopup {
    lines: Vec<Line<'static>>,
    scroll_offset: usize,
}

impl Default for HelpPopup {
    fn default() -> Self {
        Self::new()
    }
}

impl HelpPopup {
    pub fn new() -> Self {
        let palette = current_theme();
        let mut lines = Vec::new();
        for (section, bindings) in KEY_BINDINGS {
            if !lines.is_empty() {
                lines.push(Line::default());
            }
            lines.push(Line::from(Span::styled(
                section.to_string(),
                Style::default()
                    .fg(palette.base_0d)
                    .add_modifier(Modifier::BOLD),
            )));
            for (keys, action) in bindings.iter() {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {keys:<8}"), Style::default().fg(palette.base_0a)),
                    Span::styled(action.to_string(), Style::default().fg(palette.base_05)),
                ]));
            }
        }

        HelpPopup {
            lines,
            scroll_offset: 0,
        }
    }

    pub fn total_lines(&self) -> usize {
        self.lines.len()
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        let palette = current_theme();
        let popup_area = centered_rect(72, 70, area);
        f.render_widget(Clear, popup_area);

        let visible: Vec<Line> = self.lines[self.scroll_offset..].to_vec();
        let block = Block::default()
            .title(" Keys (? or Esc closes) ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.base_0d))
            .style(Style::default().bg(palette.base_00));
        f.render_widget(
            Paragraph::new(visible).block(block).wrap(Wrap { trim: false }),
            popup_area,
        );

        let mut scrollbar_state =
            ScrollbarState::new(self.total_lines()).position(self.scroll_offset);
        f.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .style(Style::default().fg(palette.base_04)),
            popup_area.inner(Margin::new(0, 1)),
            &mut scrollbar_state,
        );
    }

    pub fn scroll_down(&mut self) {
        if self.scroll_offset < self.total_lines().saturating_sub(1) {
            self.scroll_offset += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    pub fn handle_key(&mut self, key: crossterm::event::KeyEvent) -> Option<HelpPopupAction> {
        use crossterm::event::KeyCode;

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll_down();
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll_up();
                None
            }
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => Some(HelpPopupAction::Close),
            _ => None,
        }
    }
}

/// Fixed-width, percentage-height rectangle centered in `area`.
fn centered_rect(width: u16, percent_y: u16, area: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [rect] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    rect
}
