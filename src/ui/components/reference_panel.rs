use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use unicode_width::UnicodeWidthStr;

use crate::api::SentenceId;
use crate::session::{LayoutEvent, SessionPhase, SessionState, SentenceStatus};
use crate::ui::layout::wrap_text;
use crate::ui::theme::Theme;

const MARKER: &str = "● ";
const NO_MARKER: &str = "  ";
const COPIED: &str = " ✓ copied";

/// Scrollable list of the article's reference sentences, each tagged with
/// its status colour. The current sentence is highlighted.
pub struct ReferencePanel<'a> {
    session: &'a SessionState,
    theme: &'a Theme,
    copied: Option<SentenceId>,
}

impl<'a> ReferencePanel<'a> {
    pub fn new(session: &'a SessionState, theme: &'a Theme) -> Self {
        Self {
            session,
            theme,
            copied: None,
        }
    }

    /// Flag `sentence_id` as just copied to the clipboard.
    pub fn copied(mut self, sentence_id: Option<SentenceId>) -> Self {
        self.copied = sentence_id;
        self
    }

    fn block(&self) -> Block<'static> {
        let title = match self.session.article() {
            Some(article) => format!(" {} ", article.title),
            None => " Sentences ".to_string(),
        };
        Block::bordered()
            .title(title)
            .border_style(Style::default().fg(self.theme.colors.border()))
            .style(Style::default().bg(self.theme.colors.bg()))
    }

    fn item_lines(&self, position: usize, text: &str, width: usize) -> Vec<String> {
        let label = format!("{}. ", position + 1);
        let prefix_width = MARKER.width() + label.width();
        let body_width = width.saturating_sub(prefix_width).max(1);
        let indent = " ".repeat(prefix_width);

        wrap_text(text, body_width)
            .into_iter()
            .enumerate()
            .map(|(row, body)| {
                if row == 0 {
                    format!("{label}{body}")
                } else {
                    format!("{indent}{body}")
                }
            })
            .collect()
    }

    /// Row heights for every sentence plus the viewport height at `area`,
    /// filtered down to the values the session does not know yet.
    pub fn measure(&self, area: Rect) -> Vec<LayoutEvent> {
        let inner = self.block().inner(area);
        let width = inner.width as usize;
        let layout = self.session.layout();
        let mut events = Vec::new();

        let viewport = inner.height as u32;
        if layout.viewport_height() != viewport {
            events.push(LayoutEvent::ViewportResized { height: viewport });
        }

        for (position, sentence) in self.session.sentences().iter().enumerate() {
            // One blank spacer row below each sentence.
            let height = self.item_lines(position, &sentence.text, width).len() as u32 + 1;
            if layout.height(position) != Some(height) {
                events.push(LayoutEvent::ItemMeasured { position, height });
            }
        }
        events
    }
}

impl Widget for ReferencePanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = self.block();
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let width = inner.width as usize;
        let current = self.session.current_index();
        let studying = self.session.phase() == SessionPhase::Studying;
        let history = self.session.history();

        let mut lines: Vec<Line> = Vec::new();
        for (position, sentence) in self.session.sentences().iter().enumerate() {
            let status = history.status_of(sentence.id);
            let is_current = studying && position == current;

            let text_style = if is_current {
                Style::default()
                    .fg(colors.fg())
                    .bg(colors.current_bg())
                    .add_modifier(Modifier::BOLD)
            } else if status == SentenceStatus::NotAttempted {
                Style::default().fg(colors.fg())
            } else {
                Style::default().fg(colors.text_dim())
            };

            for (row, text) in self
                .item_lines(position, &sentence.text, width)
                .into_iter()
                .enumerate()
            {
                let marker = match (row, colors.status(status)) {
                    (0, Some(color)) => Span::styled(MARKER, Style::default().fg(color)),
                    _ => Span::raw(NO_MARKER),
                };
                let mut spans = vec![marker, Span::styled(text, text_style)];
                if row == 0 && self.copied == Some(sentence.id) {
                    spans.push(Span::styled(COPIED, Style::default().fg(colors.accent())));
                }
                lines.push(Line::from(spans));
            }
            lines.push(Line::from(""));
        }

        let offset = self.session.scroll_offset().min(u16::MAX as u32) as u16;
        Paragraph::new(lines).scroll((offset, 0)).render(inner, buf);
    }
}
