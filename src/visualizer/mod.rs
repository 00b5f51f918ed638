mod radial;
mod sidebar;
mod wheel;

use wheel::{render_wheel, WheelScene};

use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};

use crate::color::item_color;
use crate::config::DisplayConfig;
use crate::session::{PendingResult, Session};
use crate::wheel::{Item, SpinSpeed};

const SIDEBAR_WIDTH: u16 = 36;

/// Per-frame inputs that come from the engine rather than the session
pub struct FrameInfo<'a> {
    /// Items on the wheel this frame (locked list while spinning)
    pub items: &'a [Item],
    pub rotation: f64,
    pub spinning: bool,
    pub speed: SpinSpeed,
}

/// Layout and drawing for the whole screen below the status line
pub struct WheelView {
    show_sidebar: bool,
}

impl WheelView {
    pub fn new(config: &DisplayConfig) -> Self {
        Self {
            show_sidebar: config.show_sidebar,
        }
    }

    pub fn toggle_sidebar(&mut self) {
        self.show_sidebar = !self.show_sidebar;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, session: &Session, info: &FrameInfo) {
        let (wheel_area, sidebar_area) = self.calculate_layout(area);

        let scene = WheelScene {
            items: info.items,
            rotation: info.rotation,
            spinning: info.spinning,
            completed_count: session.completed_count(),
            last_completed: session.last_completed(),
        };
        render_wheel(frame.buffer_mut(), wheel_area, &scene);

        if let Some(sidebar_area) = sidebar_area {
            sidebar::render_sidebar(frame, sidebar_area, session, info.speed);
        }

        if let Some(pending) = session.pending() {
            render_result(frame, wheel_area, pending);
        }
    }

    fn calculate_layout(&self, area: Rect) -> (Rect, Option<Rect>) {
        if !self.show_sidebar || area.width < SIDEBAR_WIDTH * 2 {
            return (area, None);
        }
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(SIDEBAR_WIDTH)])
            .split(area);
        (chunks[0], Some(chunks[1]))
    }
}

/// Centered panel announcing the landed item
fn render_result(frame: &mut Frame, area: Rect, pending: &PendingResult) {
    if area.width < 20 || area.height < 5 {
        return;
    }
    let width = area.width.min(52);
    let height = area.height.min(9);
    let popup = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    );

    let color = item_color(&pending.item, 0);
    let accent = Color::Rgb(color.r, color.g, color.b);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Thick)
        .border_style(Style::default().fg(accent))
        .title(" Your Task ");

    let text = vec![
        Line::from(Span::styled(
            "Great, now the task is to",
            Style::default().fg(Color::Gray),
        )),
        Line::default(),
        Line::from(Span::styled(
            pending.item.question.clone(),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(vec![
            Span::styled("[k]", Style::default().fg(Color::White).bold()),
            Span::raw(" Keep on wheel   "),
            Span::styled("[d]", Style::default().fg(Color::Rgb(0xe7, 0x4c, 0x3c)).bold()),
            Span::raw(" Done! Remove"),
        ]),
    ];

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        popup,
    );
}
