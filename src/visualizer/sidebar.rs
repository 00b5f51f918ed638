use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Gauge, Paragraph, Wrap};

use crate::color::{item_color, lerp_color};
use crate::session::Session;
use crate::wheel::{truncate_text, SpinSpeed};

const CYAN: (u8, u8, u8) = (0x4e, 0xcd, 0xc4);
const MAGENTA: (u8, u8, u8) = (0xdd, 0xa0, 0xdd);

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(r, g, b)
}

/// Counts, progress and the full question list
pub fn render_sidebar(frame: &mut Frame, area: Rect, session: &Session, speed: SpinSpeed) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" {} ", session.name()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width < 4 || inner.height < 6 {
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(inner);

    let active = session.active_items().len();
    let completed = session.completed_count();
    let stats = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("Remaining ", Style::default().fg(Color::DarkGray)),
            Span::styled(active.to_string(), Style::default().fg(rgb(CYAN)).bold()),
            Span::styled("   Completed ", Style::default().fg(Color::DarkGray)),
            Span::styled(completed.to_string(), Style::default().fg(rgb(MAGENTA)).bold()),
        ]),
        Line::from(vec![
            Span::styled("Speed ", Style::default().fg(Color::DarkGray)),
            Span::styled(speed.name(), Style::default().fg(Color::White)),
        ]),
    ]);
    frame.render_widget(stats, chunks[0]);

    if session.total_count() > 0 {
        let percent = session.progress_percent();
        let fill = lerp_color(CYAN, MAGENTA, percent as f32 / 100.0);
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(rgb(fill)).bg(Color::Rgb(0x22, 0x22, 0x22)))
            .percent(percent.min(100) as u16)
            .label(format!("Session Progress {}%", percent));
        frame.render_widget(gauge, chunks[1]);
    }

    let max_chars = inner.width.saturating_sub(3) as usize;
    let lines: Vec<Line> = session
        .wheel()
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let color = item_color(item, i);
            let text = truncate_text(&item.question, max_chars);
            if session.is_removed(&item.id) {
                Line::from(vec![
                    Span::styled("✓ ", Style::default().fg(Color::DarkGray)),
                    Span::styled(
                        text,
                        Style::default()
                            .fg(Color::DarkGray)
                            .add_modifier(Modifier::CROSSED_OUT),
                    ),
                ])
            } else {
                Line::from(vec![
                    Span::styled("■ ", Style::default().fg(Color::Rgb(color.r, color.g, color.b))),
                    Span::raw(text),
                ])
            }
        })
        .collect();

    let list = Paragraph::new(lines).wrap(Wrap { trim: true });
    frame.render_widget(list, chunks[3]);
}
