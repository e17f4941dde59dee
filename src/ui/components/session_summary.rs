use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::{SentenceStatus, SessionSummary};
use crate::ui::theme::Theme;

/// Tally shown once the last sentence has been passed.
pub struct SummaryView<'a> {
    pub title: &'a str,
    pub summary: SessionSummary,
    pub theme: &'a Theme,
}

impl Widget for SummaryView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(" Session Complete ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let s = &self.summary;
        let row = |label: &str, count: usize, status: SentenceStatus| {
            let color = colors.status(status).unwrap_or_else(|| colors.fg());
            Line::from(vec![
                Span::styled(format!("{label:>14}  "), Style::default().fg(colors.fg())),
                Span::styled(
                    count.to_string(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
            ])
        };

        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                self.title.to_string(),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            row("Perfect", s.perfect, SentenceStatus::Perfect),
            row("Good", s.good, SentenceStatus::Good),
            row("Incorrect", s.incorrect, SentenceStatus::Incorrect),
            row("Skipped", s.skipped, SentenceStatus::Skipped),
            row("Not attempted", s.not_attempted, SentenceStatus::NotAttempted),
            Line::from(""),
            Line::from(Span::styled(
                format!("{} attempts in total", s.attempts),
                Style::default().fg(colors.text_dim()),
            )),
        ];

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(inner, buf);
    }
}
