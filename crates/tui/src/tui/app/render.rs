use std::cmp::min;

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::constants::{
    APP_VERSION, HINT_CONFIRM, HINT_EDITOR, HINT_LISTS, HINT_SUBTASKS, HINT_TASKS,
};
use crate::tui::helpers::{
    accent_title, centered_rect, checkbox, item_badges, pluralize, BG_ACCENT, BG_BASE, BG_PANEL,
};

use super::{ActiveRecord, App, ConfirmChoice, Mode};

impl App {
    pub(crate) fn draw(&self, f: &mut Frame<'_>) {
        let size = f.size();
        f.render_widget(Clear, size);
        f.render_widget(Block::default().style(Style::default().bg(BG_BASE)), size);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(2),
            ])
            .split(size);

        self.draw_header(f, chunks[0]);
        self.draw_body(f, chunks[1]);
        self.draw_footer(f, chunks[2]);

        match self.mode {
            Mode::CreateDialog | Mode::EditDialog => self.draw_editor_overlay(f, size),
            Mode::ConfirmDelete => self.draw_confirm_overlay(f, size),
            Mode::ListSelection | Mode::TaskBrowsing | Mode::SubtaskBrowsing => {}
        }
    }

    fn breadcrumb(&self) -> String {
        let mut parts = vec![String::from("Lists")];
        if let Some(list) = &self.current_list {
            parts.push(list.title.clone());
        }
        if let Some(ActiveRecord::Task(task)) = &self.active {
            parts.push(task.title.clone());
        }
        parts.join(" › ")
    }

    fn draw_header(&self, f: &mut Frame<'_>, area: Rect) {
        let mut spans = vec![
            Span::styled(
                format!(" wut v{} ", APP_VERSION),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("— {}", self.breadcrumb())),
        ];
        if self.show_completed && self.mode != Mode::ListSelection {
            spans.push(Span::styled(
                "  (completed)",
                Style::default().fg(Color::Yellow),
            ));
        }
        let pending = self.completions.pending();
        if pending > 0 {
            spans.push(Span::styled(
                format!("  ⏳ {}", pluralize(pending, "pending change")),
                Style::default().fg(Color::DarkGray),
            ));
        }
        f.render_widget(
            Paragraph::new(Line::from(spans)).style(Style::default().bg(BG_BASE)),
            area,
        );
    }

    fn draw_body(&self, f: &mut Frame<'_>, area: Rect) {
        let (title, items, selected) = if self.browse_mode() == Mode::ListSelection {
            let items: Vec<ListItem> = self
                .lists
                .iter()
                .map(|(list, row)| {
                    let marker = if list.is_inbox() { "📥 " } else { "   " };
                    ListItem::new(Line::from(vec![
                        Span::raw(marker),
                        Span::raw(row.label.clone()),
                    ]))
                })
                .collect();
            ("Lists".to_string(), items, self.lists.focus_position().ok())
        } else {
            let items: Vec<ListItem> = self
                .items
                .iter()
                .map(|(item, row)| {
                    let mut spans = vec![
                        Span::styled(
                            format!("{} ", checkbox(row.checked)),
                            Style::default().fg(if row.alarm.is_some() {
                                Color::Yellow
                            } else {
                                Color::Gray
                            }),
                        ),
                        Span::raw(row.label.clone()),
                    ];
                    spans.extend(item_badges(item));
                    ListItem::new(Line::from(spans))
                })
                .collect();
            let title = self
                .active
                .as_ref()
                .map(|record| record.title().to_string())
                .unwrap_or_default();
            (title, items, self.items.focus_position().ok())
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title(&title))
            .border_style(Style::default().fg(Color::DarkGray))
            .style(Style::default().bg(BG_PANEL));

        if items.is_empty() {
            let inner = block.inner(area);
            f.render_widget(block, area);
            let message = if self.browse_mode() == Mode::ListSelection {
                "No lists"
            } else {
                "Nothing here yet • press n to add one"
            };
            f.render_widget(
                Paragraph::new(message)
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::DarkGray).bg(BG_PANEL)),
                inner,
            );
            return;
        }

        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .bg(BG_ACCENT)
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        );
        let mut state = ListState::default().with_selected(selected);
        f.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, f: &mut Frame<'_>, area: Rect) {
        let lines = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.style())])
        } else {
            Line::from(vec![Span::raw("Ready")])
        };
        f.render_widget(Paragraph::new(status_line), lines[0]);

        let help = match self.mode {
            Mode::ListSelection => HINT_LISTS,
            Mode::TaskBrowsing => HINT_TASKS,
            Mode::SubtaskBrowsing => HINT_SUBTASKS,
            Mode::CreateDialog | Mode::EditDialog => HINT_EDITOR,
            Mode::ConfirmDelete => HINT_CONFIRM,
        };
        f.render_widget(
            Paragraph::new(Line::from(vec![Span::styled(
                help,
                Style::default().fg(Color::DarkGray),
            )])),
            lines[1],
        );
    }

    fn draw_editor_overlay(&self, f: &mut Frame<'_>, area: Rect) {
        let width = min(area.width.saturating_sub(10), 80);
        let popup_area = centered_rect(width, 3, area);
        f.render_widget(Clear, popup_area);

        let noun = match self.browse_mode() {
            Mode::SubtaskBrowsing => "Subtask",
            _ => "Task",
        };
        let title = if self.mode == Mode::CreateDialog {
            format!("➕ New {}", noun)
        } else {
            format!("✏️ Edit {}", noun)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title(&title))
            .border_style(Style::default().fg(Color::DarkGray))
            .style(Style::default().bg(BG_PANEL));
        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);

        // Keep the cursor visible on long titles.
        let column = self.editor.cursor_column() as u16;
        let scroll = column.saturating_sub(inner.width.saturating_sub(1));
        f.render_widget(
            Paragraph::new(self.editor.as_str())
                .scroll((0, scroll))
                .style(Style::default().bg(BG_PANEL)),
            inner,
        );
        f.set_cursor(inner.x + column - scroll, inner.y);
    }

    fn draw_confirm_overlay(&self, f: &mut Frame<'_>, area: Rect) {
        let width = min(area.width.saturating_sub(20), 60).max(40);
        let popup_area = centered_rect(width, 7, area);
        f.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title("🗑 Confirm Deletion"))
            .border_style(Style::default().fg(Color::Red))
            .style(Style::default().bg(BG_PANEL));
        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);

        let target = self
            .pending_delete
            .and_then(|key| self.items.position_of(key))
            .map(|index| self.items.get(index).title())
            .unwrap_or("selected item");

        let yes_style = if self.confirm_choice == ConfirmChoice::Yes {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Red)
        };
        let no_style = if self.confirm_choice == ConfirmChoice::No {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Gray)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };

        let lines = vec![
            Line::from(vec![Span::styled(
                format!("Delete '{}'?", target),
                Style::default().fg(Color::White),
            )]),
            Line::default(),
            Line::from(vec![
                Span::styled("  Yes  ", yes_style),
                Span::raw("    "),
                Span::styled("  No  ", no_style),
            ]),
        ];
        f.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .alignment(Alignment::Center)
                .style(Style::default().bg(BG_PANEL)),
            inner,
        );
    }
}
