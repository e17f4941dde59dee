use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::api::ArticleSummary;
use crate::ui::theme::Theme;

/// Selectable list of the articles offered by the service.
#[derive(Clone, Debug, Default)]
pub struct ArticleMenu {
    pub items: Vec<ArticleSummary>,
    pub selected: usize,
}

impl ArticleMenu {
    pub fn set_items(&mut self, items: Vec<ArticleSummary>) {
        self.items = items;
        self.selected = self.selected.min(self.items.len().saturating_sub(1));
    }

    pub fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.items.len();
    }

    pub fn prev(&mut self) {
        if self.items.is_empty() {
            return;
        }
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len() - 1;
        }
    }

    pub fn current(&self) -> Option<&ArticleSummary> {
        self.items.get(self.selected)
    }
}

pub struct ArticleList<'a> {
    pub menu: &'a ArticleMenu,
    /// Loading or error line shown under the title.
    pub status: Option<&'a str>,
    pub theme: &'a Theme,
}

impl Widget for ArticleList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "biteread",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Sentence-by-sentence translation practice",
                Style::default().fg(colors.fg()),
            )),
            Line::from(""),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        if let Some(status) = self.status {
            Paragraph::new(Line::from(Span::styled(
                status,
                Style::default().fg(colors.text_dim()),
            )))
            .alignment(Alignment::Center)
            .render(layout[1], buf);
        }

        let item_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                self.menu
                    .items
                    .iter()
                    .map(|_| Constraint::Length(2))
                    .collect::<Vec<_>>(),
            )
            .split(layout[2]);

        for (i, item) in self.menu.items.iter().enumerate() {
            let Some(row) = item_rows.get(i) else {
                break;
            };
            let is_selected = i == self.menu.selected;
            let indicator = if is_selected { ">" } else { " " };

            let label_style = Style::default()
                .fg(if is_selected {
                    colors.accent()
                } else {
                    colors.fg()
                })
                .add_modifier(if is_selected {
                    Modifier::BOLD
                } else {
                    Modifier::empty()
                });

            let lines = vec![
                Line::from(Span::styled(
                    format!(" {indicator} {}", item.title),
                    label_style,
                )),
                Line::from(Span::styled(
                    format!("     {} sentences", item.sentence_count),
                    Style::default().fg(colors.text_dim()),
                )),
            ];
            Paragraph::new(lines).render(*row, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ArticleId;

    fn summary(id: u64) -> ArticleSummary {
        ArticleSummary {
            id: ArticleId(id),
            title: format!("Article {id}"),
            sentence_count: 3,
        }
    }

    #[test]
    fn test_menu_wraps_around() {
        let mut menu = ArticleMenu::default();
        menu.set_items(vec![summary(1), summary(2)]);
        menu.prev();
        assert_eq!(menu.selected, 1);
        menu.next();
        assert_eq!(menu.selected, 0);
    }

    #[test]
    fn test_refresh_clamps_selection() {
        let mut menu = ArticleMenu::default();
        menu.set_items(vec![summary(1), summary(2), summary(3)]);
        menu.selected = 2;
        menu.set_items(vec![summary(7)]);
        assert_eq!(menu.current().map(|a| a.id), Some(ArticleId(7)));
    }

    #[test]
    fn test_empty_menu_navigation_is_noop() {
        let mut menu = ArticleMenu::default();
        menu.next();
        menu.prev();
        assert!(menu.current().is_none());
    }
}
