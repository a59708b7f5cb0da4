use super::aggregate::{Summary, aggregate};
use crate::db::ExpenseStore;
use crate::models::expense::{Category, day_key};
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::{Alignment, Color, Constraint, Direction, Layout, Modifier, Rect, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::io;

pub fn category_color(category: Category) -> Color {
    match category {
        Category::Food => Color::Rgb(0xF5, 0xAD, 0x27),
        Category::Transport => Color::Rgb(0xED, 0x2D, 0x8A),
        Category::Entertainment => Color::Rgb(0xF5, 0x68, 0x27),
        Category::Travel => Color::Rgb(0xF5, 0x3C, 0x27),
        Category::Other => Color::Rgb(0x27, 0xBE, 0xF5),
    }
}

/// Shows the category share bar, category totals and per-day totals until `q` or Esc.
pub fn run_report(store: &ExpenseStore) -> Result<(), String> {
    let buckets = store.list_all().map_err(|e| e.to_string())?;
    let summary = aggregate(&buckets);
    render_report(&summary)
}

fn render_report(summary: &Summary) -> Result<(), String> {
    enable_raw_mode().map_err(|e| format!("Failed to enable raw mode: {}", e))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| format!("Failed to enter alternate screen: {}", e))?;

    let result = (|| {
        let backend = ratatui::backend::CrosstermBackend::new(stdout);
        let mut terminal = ratatui::Terminal::new(backend)
            .map_err(|e| format!("Failed to initialize terminal: {}", e))?;

        loop {
            terminal
                .draw(|frame| {
                    let layout = Layout::default()
                        .direction(Direction::Vertical)
                        .constraints([Constraint::Length(5), Constraint::Min(5)])
                        .split(frame.area());

                    render_share_bar(frame, layout[0], summary);

                    let bottom = Layout::default()
                        .direction(Direction::Horizontal)
                        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                        .split(layout[1]);

                    render_category_table(frame, bottom[0], summary);
                    render_day_table(frame, bottom[1], summary);
                })
                .map_err(|e| format!("Failed to draw terminal UI: {}", e))?;

            if event::poll(std::time::Duration::from_millis(250))
                .map_err(|e| format!("Failed to poll input: {}", e))?
            {
                match event::read().map_err(|e| format!("Failed to read input: {}", e))? {
                    Event::Key(key) if key.code == KeyCode::Char('q') => break,
                    Event::Key(key) if key.code == KeyCode::Esc => break,
                    _ => {}
                }
            }
        }

        Ok(())
    })();

    disable_raw_mode().map_err(|e| format!("Failed to disable raw mode: {}", e))?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen)
        .map_err(|e| format!("Failed to leave alternate screen: {}", e))?;

    result
}

fn render_share_bar(frame: &mut ratatui::Frame, area: Rect, summary: &Summary) {
    let block = Block::default()
        .title(Line::from(vec![Span::styled(
            format!("Total spent: {:.2}  (press q to exit)", summary.total_amount),
            Style::default().fg(Color::White),
        )]))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if summary.total_amount.is_zero() {
        let empty = Paragraph::new("No expenses recorded yet").alignment(Alignment::Center);
        frame.render_widget(empty, inner);
        return;
    }

    let segments = segment_widths(summary, inner.width as usize);
    let mut lines = Vec::new();
    for row in 0..inner.height {
        let mut spans = Vec::new();
        for (category, width) in &segments {
            let percentage = summary.category_percentage(*category);
            // Labels only fit on wide enough segments.
            let label = if row == inner.height / 2 && percentage >= Decimal::from(8) {
                format!("{:.2}%", percentage)
            } else {
                String::new()
            };
            let mut text = format!("{:^width$}", label, width = *width);
            text.truncate(*width);
            spans.push(Span::styled(
                text,
                Style::default().bg(category_color(*category)).fg(Color::White),
            ));
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Splits `width` cells between categories in proportion to their percentage.
/// Leftover cells go to the largest fractional parts so the bar fills the width.
fn segment_widths(summary: &Summary, width: usize) -> Vec<(Category, usize)> {
    if summary.total_amount.is_zero() || width == 0 {
        return Vec::new();
    }

    let cells = Decimal::from(width);
    let mut widths: Vec<(Category, usize, Decimal)> = Category::ALL
        .iter()
        .map(|c| (*c, summary.category_percentage(*c)))
        .filter(|(_, pct)| *pct > Decimal::ZERO)
        .map(|(c, pct)| {
            let exact = pct * cells / Decimal::ONE_HUNDRED;
            let floor = exact.floor();
            (c, floor.to_usize().unwrap_or(0), exact - floor)
        })
        .collect();

    let used: usize = widths.iter().map(|(_, w, _)| *w).sum();
    let mut remaining = width.saturating_sub(used);
    widths.sort_by(|a, b| b.2.cmp(&a.2));

    for entry in widths.iter_mut() {
        if remaining == 0 {
            break;
        }
        entry.1 += 1;
        remaining -= 1;
    }

    widths.sort_by_key(|(c, _, _)| *c);
    widths
        .into_iter()
        .filter(|(_, w, _)| *w > 0)
        .map(|(c, w, _)| (c, w))
        .collect()
}

fn render_category_table(frame: &mut ratatui::Frame, area: Rect, summary: &Summary) {
    let block = Block::default().title("By Category").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let bold = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    let mut lines = vec![Line::from(vec![
        Span::styled(format!("{:15}", "Category"), bold),
        Span::raw("  "),
        Span::styled(format!("{:>12}", "Amount"), bold),
        Span::raw("  "),
        Span::styled(format!("{:>8}", "Share"), bold),
    ])];

    for category in Category::ALL {
        let style = Style::default().fg(category_color(category));
        lines.push(Line::from(vec![
            Span::styled(format!("{:15}", category.label()), style),
            Span::raw("  "),
            Span::styled(format!("{:>12.2}", summary.category_total(category)), style),
            Span::raw("  "),
            Span::styled(format!("{:>7.2}%", summary.category_percentage(category)), style),
        ]));
    }

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Left), inner);
}

fn render_day_table(frame: &mut ratatui::Frame, area: Rect, summary: &Summary) {
    let block = Block::default().title("By Day").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if summary.per_date_total.is_empty() {
        let empty = Paragraph::new("No expenses recorded yet").alignment(Alignment::Center);
        frame.render_widget(empty, inner);
        return;
    }

    let lines: Vec<Line> = summary
        .per_date_total
        .iter()
        .rev()
        .map(|(date, total)| {
            Line::from(vec![
                Span::styled(format!("{:12}", day_key(*date)), Style::default().fg(Color::White)),
                Span::raw("  "),
                Span::raw(format!("{:>12.2}", total)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Left), inner);
}
