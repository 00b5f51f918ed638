use ratatui::buffer::Buffer;
use ratatui::prelude::*;
use std::f64::consts::{FRAC_PI_2, TAU};

use super::radial::{fit_circle, grid_to_polar, polar_to_grid, CELL_ASPECT};
use crate::color::{item_color, RgbColor};
use crate::wheel::selection::{segment_at, segment_mid, segment_start};
use crate::wheel::{truncate_text, Item};

const EMPTY_DISC: Color = Color::Rgb(0x1a, 0x1a, 0x1a);
const DIVIDER: Color = Color::Rgb(0xff, 0xff, 0xff);
const PEG: Color = Color::Rgb(0xc9, 0xa2, 0x27);
const POINTER: Color = Color::Rgb(0xe7, 0x4c, 0x3c);
const HUB_ACTIVE: Color = Color::Rgb(0xe7, 0x4c, 0x3c);
const HUB_IDLE: Color = Color::Rgb(0x33, 0x33, 0x33);
const HUB_RING: Color = Color::Rgb(0x44, 0x44, 0x44);
const DONE_GREEN: Color = Color::Rgb(0x2e, 0xcc, 0x71);

/// Everything the wheel painter needs for one frame
pub struct WheelScene<'a> {
    pub items: &'a [Item],
    pub rotation: f64,
    pub spinning: bool,
    pub completed_count: usize,
    pub last_completed: Option<&'a str>,
}

/// Resolved geometry of the wheel inside its area
#[derive(Debug, Clone, Copy)]
pub struct WheelGeometry {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub hub_radius: f64,
}

impl WheelGeometry {
    pub fn new(area: Rect) -> Self {
        // Leave one row above for the pointer
        let (cx, cy, radius) = fit_circle(area.width as usize, area.height as usize, CELL_ASPECT);
        let radius = (radius - 1.0).max(1.0);
        Self {
            cx: area.x as f64 + cx,
            cy: area.y as f64 + cy + 0.5,
            radius,
            hub_radius: (radius * 0.18).max(1.0),
        }
    }

    /// Cell holding the pointer tip, just above the rim at 12 o'clock
    pub fn pointer_cell(&self) -> (u16, u16) {
        let (x, y) = polar_to_grid(self.cx, self.cy, -FRAC_PI_2, self.radius + 0.5, CELL_ASPECT);
        (x.floor().max(0.0) as u16, y.floor().max(0.0) as u16)
    }

    /// Cell on the rim directly under the pointer
    #[cfg(test)]
    pub fn rim_top_cell(&self) -> (u16, u16) {
        let (x, y) = polar_to_grid(self.cx, self.cy, -FRAC_PI_2, self.radius - 0.5, CELL_ASPECT);
        (x.floor().max(0.0) as u16, y.floor().max(0.0) as u16)
    }
}

/// Max label length by item count, fewer items leave more room
fn label_limit(count: usize) -> usize {
    if count > 10 {
        10
    } else if count > 6 {
        14
    } else {
        18
    }
}

pub fn render_wheel(buf: &mut Buffer, area: Rect, scene: &WheelScene) {
    if area.width < 4 || area.height < 4 {
        return;
    }
    let geo = WheelGeometry::new(area);

    if scene.items.is_empty() {
        render_empty(buf, area, &geo, scene);
    } else {
        render_segments(buf, area, &geo, scene);
        render_labels(buf, area, &geo, scene);
        render_pegs(buf, area, &geo, scene);
    }

    render_hub(buf, area, &geo, !scene.items.is_empty());
    render_pointer(buf, area, &geo);
}

/// Paint each cell inside the rim with the color of the wedge it falls in
fn render_segments(buf: &mut Buffer, area: Rect, geo: &WheelGeometry, scene: &WheelScene) {
    let count = scene.items.len();
    let colors: Vec<RgbColor> = scene
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| item_color(item, i))
        .collect();

    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            let (angle, dist) =
                grid_to_polar(geo.cx, geo.cy, x as f64 + 0.5, y as f64 + 0.5, CELL_ASPECT);
            if dist > geo.radius {
                continue;
            }

            let index = segment_at(angle, scene.rotation, count);
            let offset = (angle - segment_start(index, scene.rotation, count)).rem_euclid(TAU);
            let on_divider = count > 1 && offset * dist < 0.35;

            let bg = if on_divider {
                DIVIDER
            } else {
                let c = colors[index];
                Color::Rgb(c.r, c.g, c.b)
            };

            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_char(' ');
                cell.set_bg(bg);
            }
        }
    }
}

fn render_labels(buf: &mut Buffer, area: Rect, geo: &WheelGeometry, scene: &WheelScene) {
    let count = scene.items.len();
    // Labels sit between hub and rim
    let label_radius = (geo.hub_radius + geo.radius) / 2.0 + geo.radius * 0.1;
    let room = (geo.radius * CELL_ASPECT * 0.8) as usize;
    let max_chars = label_limit(count).min(room.max(3));

    for (i, item) in scene.items.iter().enumerate() {
        let mid = segment_mid(i, scene.rotation, count);
        let (lx, ly) = polar_to_grid(geo.cx, geo.cy, mid, label_radius, CELL_ASPECT);
        let text = truncate_text(&item.question, max_chars);
        let width = text.chars().count() as f64;

        let y = ly.floor();
        let x = (lx - width / 2.0).round();
        if y < area.top() as f64 || y >= area.bottom() as f64 {
            continue;
        }

        let color = item_color(item, i);
        let fg = color.readable_text();
        for (k, ch) in text.chars().enumerate() {
            let cx = x + k as f64;
            if cx < area.left() as f64 || cx >= area.right() as f64 {
                continue;
            }
            if let Some(cell) = buf.cell_mut((cx as u16, y as u16)) {
                cell.set_char(ch);
                cell.set_fg(Color::Rgb(fg.r, fg.g, fg.b));
                cell.set_style(Style::default().add_modifier(Modifier::BOLD));
            }
        }
    }
}

/// One peg on the rim at every wedge boundary
fn render_pegs(buf: &mut Buffer, area: Rect, geo: &WheelGeometry, scene: &WheelScene) {
    let count = scene.items.len();
    for i in 0..count {
        let angle = segment_start(i, scene.rotation, count);
        let (px, py) = polar_to_grid(geo.cx, geo.cy, angle, geo.radius + 0.5, CELL_ASPECT);
        if px < area.left() as f64 || py < area.top() as f64 {
            continue;
        }
        let (px, py) = (px as u16, py as u16);
        if px >= area.right() || py >= area.bottom() {
            continue;
        }
        if let Some(cell) = buf.cell_mut((px, py)) {
            cell.set_char('●');
            cell.set_fg(PEG);
        }
    }
}

fn render_hub(buf: &mut Buffer, area: Rect, geo: &WheelGeometry, active: bool) {
    let ring = geo.hub_radius + 0.6;
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            let (_, dist) = grid_to_polar(geo.cx, geo.cy, x as f64 + 0.5, y as f64 + 0.5, CELL_ASPECT);
            let bg = if dist <= geo.hub_radius {
                if active {
                    HUB_ACTIVE
                } else {
                    HUB_IDLE
                }
            } else if dist <= ring {
                HUB_RING
            } else {
                continue;
            };
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_char(' ');
                cell.set_bg(bg);
            }
        }
    }

    let label = "SPIN";
    let x = (geo.cx - label.len() as f64 / 2.0).round();
    let y = geo.cy.floor();
    if x >= area.left() as f64 && y >= area.top() as f64 && y < area.bottom() as f64 {
        for (k, ch) in label.chars().enumerate() {
            let cx = x as u16 + k as u16;
            if cx < area.right() {
                if let Some(cell) = buf.cell_mut((cx, y as u16)) {
                    cell.set_char(ch);
                    cell.set_fg(Color::White);
                    cell.set_style(Style::default().add_modifier(Modifier::BOLD));
                }
            }
        }
    }
}

fn render_pointer(buf: &mut Buffer, area: Rect, geo: &WheelGeometry) {
    let (x, y) = geo.pointer_cell();
    if area.contains(Position::new(x, y)) {
        if let Some(cell) = buf.cell_mut((x, y)) {
            cell.set_char('▼');
            cell.set_fg(POINTER);
        }
    }
}

fn render_empty(buf: &mut Buffer, area: Rect, geo: &WheelGeometry, scene: &WheelScene) {
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            let (_, dist) = grid_to_polar(geo.cx, geo.cy, x as f64 + 0.5, y as f64 + 0.5, CELL_ASPECT);
            if dist <= geo.radius {
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_char(' ');
                    cell.set_bg(EMPTY_DISC);
                }
            }
        }
    }

    let above_hub = geo.cy - geo.hub_radius - 2.0;
    let lines: Vec<(String, Style)> = match (scene.completed_count, scene.last_completed) {
        (n, Some(task)) if n > 0 => vec![
            ("Nice. NOW".to_string(), Style::default().fg(DONE_GREEN)),
            (
                truncate_text(task, (geo.radius * CELL_ASPECT * 1.4) as usize),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
        ],
        (n, None) if n > 0 => vec![(
            "Nice. All done!".to_string(),
            Style::default().fg(DONE_GREEN).add_modifier(Modifier::BOLD),
        )],
        _ => vec![(
            "Add questions to spin".to_string(),
            Style::default().fg(Color::Rgb(0x66, 0x66, 0x66)),
        )],
    };

    let first_y = above_hub - lines.len() as f64 + 1.0;
    for (i, (text, style)) in lines.iter().enumerate() {
        let y = first_y + i as f64;
        if y < area.top() as f64 || y >= area.bottom() as f64 {
            continue;
        }
        let width = (text.chars().count() as u16).min(area.width);
        let x = (geo.cx - width as f64 / 2.0).max(area.left() as f64) as u16;
        buf.set_stringn(x, y as u16, text, width as usize, *style);
    }

    if scene.completed_count > 0 && !scene.spinning {
        let hint = "[r] restore all";
        let y = geo.cy + geo.hub_radius + 2.0;
        if y < area.bottom() as f64 {
            let x = (geo.cx - hint.len() as f64 / 2.0).max(area.left() as f64) as u16;
            buf.set_stringn(x, y as u16, hint, area.width as usize, Style::default().fg(DONE_GREEN));
        }
    }
}
