use super::App;
use crate::board::{Loadable, VisualItem};
use crate::data::Status;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

mod icons {
    pub const EXPANDED: &str = "▼";
    pub const COLLAPSED: &str = "▶";
    pub const DONE: &str = "✓";
    pub const CLOSED: &str = "●";
    pub const OPEN: &str = "○";
}

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Board
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_board(f, app, chunks[1]);
    draw_status_bar(f, app, chunks[2]);

    if app.show_help {
        draw_help_popup(f);
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let loading = app.board.any_loading();

    let border_style = if loading {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);

    let inner = block.inner(area);
    f.render_widget(block, area);

    let text = if loading {
        Line::from(vec![
            Span::styled(
                "Taigazer ",
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("[{}] ", app.scope_label()), Style::default().fg(Color::Green)),
            Span::styled(
                format!("{} Loading...", app.spinner_char()),
                Style::default().fg(Color::Cyan),
            ),
        ])
    } else {
        let total = app.board.stories.data().map(Vec::len).unwrap_or(0);
        Line::from(vec![
            Span::styled(
                "Taigazer ",
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("[{}] ", app.scope_label()), Style::default().fg(Color::Green)),
            Span::styled(format!("{} stories", total), Style::default().fg(Color::DarkGray)),
        ])
    };

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    f.render_widget(paragraph, inner);
}

fn draw_board(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    // Loading/error/idle states before any status list is available
    let statuses: &[Status] = match &app.board.statuses {
        Loadable::Ready(statuses) => statuses,
        Loadable::Loading => {
            let msg = Paragraph::new(format!("{} Fetching board...", app.spinner_char()))
                .style(Style::default().fg(Color::Cyan))
                .alignment(Alignment::Center);
            f.render_widget(msg, centered_line(inner));
            return;
        }
        Loadable::Failed(message) => {
            let msg = Paragraph::new(format!("✗ {} (press r to retry)", message))
                .style(Style::default().fg(Color::Red))
                .alignment(Alignment::Center);
            f.render_widget(msg, centered_line(inner));
            return;
        }
        Loadable::Idle => return,
    };

    let width = inner.width as usize;
    let selected_style = Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD);

    let mut items: Vec<ListItem> = Vec::new();
    for (idx, item) in app.visual_items.iter().enumerate() {
        let selected = idx == app.visual_selected;
        let line = match item {
            VisualItem::SectionHeader(status_id) => {
                let Some(status) = statuses.iter().find(|s| s.id == *status_id) else {
                    continue;
                };
                section_header_line(app, status)
            }
            VisualItem::Story(story_idx) => {
                let Some(story) = app.board.stories.data().and_then(|s| s.get(*story_idx)) else {
                    continue;
                };
                let marker = if story.is_closed { icons::CLOSED } else { icons::OPEN };
                let text = truncate_to_width(&story.label(), width.saturating_sub(12));
                let mut spans = vec![
                    Span::raw("    "),
                    Span::styled(format!("{} ", marker), Style::default().fg(Color::DarkGray)),
                    Span::raw(text),
                ];
                if let Some(assignee) = &story.assignee {
                    spans.push(Span::styled(
                        format!("  {}", assignee),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                Line::from(spans)
            }
        };

        let item = if selected {
            ListItem::new(line).style(selected_style)
        } else {
            ListItem::new(line)
        };
        items.push(item);
    }

    // Keep the selection on screen for long boards
    let visible = inner.height as usize;
    let skip = app.visual_selected.saturating_sub(visible.saturating_sub(1));
    let list = List::new(items.into_iter().skip(skip));
    f.render_widget(list, inner);
}

fn section_header_line(app: &App, status: &Status) -> Line<'static> {
    let marker = if app.board.is_expanded(status.id) {
        icons::EXPANDED
    } else {
        icons::COLLAPSED
    };

    let count = app.board.story_count_for(status.id);
    let exhausted = app
        .board
        .cursor(status.id)
        .map(|c| c.is_exhausted())
        .unwrap_or(false);

    let mut spans = vec![
        Span::styled(format!(" {} ", marker), Style::default().fg(Color::DarkGray)),
        Span::styled(
            status.name.clone(),
            Style::default()
                .fg(status_color(status))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" ({})", count), Style::default().fg(Color::DarkGray)),
    ];

    if app.board.is_fetching(status.id) {
        spans.push(Span::styled(
            format!(" {}", app.spinner_char()),
            Style::default().fg(Color::Cyan),
        ));
    } else if exhausted {
        spans.push(Span::styled(
            format!(" {} all", icons::DONE),
            Style::default().fg(Color::Green),
        ));
    } else {
        spans.push(Span::styled(" (m: more)", Style::default().fg(Color::DarkGray)));
    }

    Line::from(spans)
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(message) = app.board.statuses.error() {
        Line::from(vec![Span::styled(
            format!(" ✗ {}", message),
            Style::default().fg(Color::Red),
        )])
    } else {
        Line::from(vec![Span::styled(
            " j/k: move  enter: expand  m: more  r: reload  b: scope  ?: help  q: quit",
            Style::default().fg(Color::DarkGray),
        )])
    };

    f.render_widget(Paragraph::new(line), area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = centered_rect(50, 14, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let rows = [
        ("j / k", "move selection"),
        ("gg / G", "jump to top / bottom"),
        ("Ctrl-d / Ctrl-u", "page down / up"),
        ("Enter / Space", "expand or collapse section"),
        ("m", "load next page for section"),
        ("r", "reload board"),
        ("b", "switch sprint / backlog"),
        ("q", "quit"),
    ];

    let lines: Vec<Line> = rows
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled(format!(" {:<16}", key), Style::default().fg(Color::Yellow)),
                Span::raw(*action),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);
}

/// Parse a "#RRGGBB" column color from the server, falling back to white.
fn status_color(status: &Status) -> Color {
    let hex = status.color.trim_start_matches('#');
    if hex.len() != 6 {
        return Color::White;
    }
    match (
        u8::from_str_radix(&hex[0..2], 16),
        u8::from_str_radix(&hex[2..4], 16),
        u8::from_str_radix(&hex[4..6], 16),
    ) {
        (Ok(r), Ok(g), Ok(b)) => Color::Rgb(r, g, b),
        _ => Color::White,
    }
}

/// Truncate to a display width, appending an ellipsis when cut.
fn truncate_to_width(text: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w > max_width.saturating_sub(1) {
            out.push('…');
            return out;
        }
        width += w;
        out.push(ch);
    }
    out
}

fn centered_line(area: Rect) -> Rect {
    let y = area.y + area.height / 2;
    Rect::new(area.x, y.min(area.y + area.height.saturating_sub(1)), area.width, 1)
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
