use std::cmp::min;

use chrono::{Local, NaiveDate};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::model::TodoItem;

pub const BG_BASE: Color = Color::Rgb(14, 17, 23);
pub const BG_PANEL: Color = Color::Rgb(22, 26, 34);
pub const BG_ACCENT: Color = Color::Rgb(32, 37, 47);
pub const FG_ACCENT: Color = Color::Rgb(120, 161, 255);

pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = min(width, area.width);
    let h = min(height, area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(w)) / 2,
        y: area.y + (area.height.saturating_sub(h)) / 2,
        width: w,
        height: h,
    }
}

pub fn accent_title(text: &str) -> Line<'static> {
    Line::from(vec![Span::styled(
        text.to_owned(),
        Style::default().fg(FG_ACCENT).add_modifier(Modifier::BOLD),
    )])
}

pub fn checkbox(checked: bool) -> &'static str {
    if checked {
        "[x]"
    } else {
        "[ ]"
    }
}

/// Due date relative to `today`: "today", "tomorrow", "overdue 2024-05-01" or the date.
pub fn describe_due(due: NaiveDate, today: NaiveDate) -> String {
    let days = (due - today).num_days();
    match days {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        d if d < 0 => format!("overdue {}", due.format("%Y-%m-%d")),
        _ => due.format("%Y-%m-%d").to_string(),
    }
}

/// Trailing annotations shown after an item's title.
pub fn item_badges(item: &TodoItem) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    if item.starred() {
        spans.push(Span::styled(" ★", Style::default().fg(Color::Yellow)));
    }
    if let Some(due) = item.due_date() {
        let today = Local::now().date_naive();
        let color = if due < today { Color::Red } else { Color::DarkGray };
        spans.push(Span::styled(
            format!("  due {}", describe_due(due, today)),
            Style::default().fg(color),
        ));
    }
    spans
}

pub fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).expect("valid date")
    }

    #[rstest]
    #[case(10, "today")]
    #[case(11, "tomorrow")]
    #[case(3, "overdue 2024-05-03")]
    #[case(20, "2024-05-20")]
    fn due_dates_are_relative_to_today(#[case] due: u32, #[case] expected: &str) {
        assert_eq!(describe_due(day(due), day(10)), expected);
    }

    #[test]
    fn pluralize_counts() {
        assert_eq!(pluralize(1, "task"), "1 task");
        assert_eq!(pluralize(0, "task"), "0 tasks");
        assert_eq!(pluralize(3, "list"), "3 lists");
    }

    #[test]
    fn centered_rect_clamps_to_area() {
        let area = Rect::new(0, 0, 40, 10);
        assert_eq!(centered_rect(20, 4, area), Rect::new(10, 3, 20, 4));
        assert_eq!(centered_rect(80, 20, area), area);
    }
}
