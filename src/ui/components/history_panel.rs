use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::Attempt;
use crate::ui::theme::Theme;

/// Attempt log of the current sentence, newest first.
pub struct HistoryPanel<'a> {
    attempts: &'a [Attempt],
    theme: &'a Theme,
}

impl<'a> HistoryPanel<'a> {
    pub fn new(attempts: &'a [Attempt], theme: &'a Theme) -> Self {
        Self { attempts, theme }
    }
}

impl Widget for HistoryPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" Attempts ({}) ", self.attempts.len()))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.attempts.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "No attempts yet",
                Style::default().fg(colors.text_dim()),
            )))
            .render(inner, buf);
            return;
        }

        let mut lines = Vec::new();
        for (n, attempt) in self.attempts.iter().enumerate().rev() {
            let badge_style = Style::default()
                .fg(colors.classification(attempt.classification))
                .add_modifier(Modifier::BOLD);
            lines.push(Line::from(vec![
                Span::styled(
                    format!("#{} ", n + 1),
                    Style::default().fg(colors.text_dim()),
                ),
                Span::styled(format!("[{}] ", attempt.classification.label()), badge_style),
                Span::styled(attempt.input.clone(), Style::default().fg(colors.fg())),
                Span::styled(
                    format!("  {}", attempt.recorded_at.format("%H:%M:%S")),
                    Style::default().fg(colors.text_dim()),
                ),
            ]));
            if !attempt.feedback.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("    {}", attempt.feedback),
                    Style::default().fg(colors.text_dim()),
                )));
            }
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}
