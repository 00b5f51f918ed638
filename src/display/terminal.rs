use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io::{self, stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::audio::TickSound;
use crate::config::{self, Config};
use crate::export;
use crate::session::Session;
use crate::visualizer::{FrameInfo, WheelView};
use crate::wheel::{SpinEngine, SpinSpeed, StepOutcome};

const STATUS_TTL: Duration = Duration::from_secs(4);

/// Startup inputs prepared by `main`
pub struct RunOptions {
    /// Config file to write speed changes back to
    pub config_path: Option<PathBuf>,
    pub seed: Option<u64>,
    /// Message to show on the first frame, e.g. a failed import
    pub initial_status: Option<String>,
}

pub async fn run(config: Config, session: Session, options: RunOptions) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, config, session, options).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Mutable state of the interactive loop
struct App {
    session: Session,
    engine: SpinEngine,
    sound: TickSound,
    view: WheelView,
    speed: SpinSpeed,
    config: Config,
    config_path: Option<PathBuf>,
    status: Option<(String, Instant)>,
    quit: bool,
}

impl App {
    fn new(config: Config, session: Session, options: RunOptions) -> Self {
        let mut app = App {
            session,
            engine: SpinEngine::with_seed(options.seed),
            sound: TickSound::new(&config.audio),
            view: WheelView::new(&config.display),
            speed: config.wheel.speed,
            config_path: options.config_path,
            status: None,
            quit: false,
            config,
        };
        debug!(
            "Tick sound {}",
            if app.sound.is_active() { "enabled" } else { "off" }
        );
        if let Some(message) = options.initial_status {
            app.set_status(message);
        }
        app
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), Instant::now()));
    }

    fn status_text(&self) -> Option<&str> {
        self.status
            .as_ref()
            .filter(|(_, at)| at.elapsed() < STATUS_TTL)
            .map(|(msg, _)| msg.as_str())
    }

    /// One animation frame of the spin, if any
    fn advance(&mut self) {
        match self.engine.step() {
            StepOutcome::Idle => {}
            StepOutcome::Advanced { tick } => {
                if tick {
                    self.sound.play_tick();
                }
            }
            StepOutcome::Completed(item) => {
                self.session.set_pending(item);
            }
        }
    }

    fn spin(&mut self) {
        if self.session.pending().is_some() {
            return;
        }
        let items = self.session.active_items();
        if let Err(e) = self.engine.start_spin(&items, self.speed) {
            debug!("Spin ignored: {}", e);
        }
    }

    fn mark_done(&mut self) {
        if let Some(item) = self.session.accept_pending() {
            self.set_status(format!("Done: {}", item.question));
        }
    }

    fn cycle_speed(&mut self) {
        self.speed = self.speed.next();
        self.config.wheel.speed = self.speed;
        self.set_status(format!("Speed: {}", self.speed));

        if let Some(path) = self.config_path.clone() {
            if let Err(e) = config::save_speed(&path, self.speed) {
                warn!("Could not save speed to {}: {:#}", path.display(), e);
            }
        }
    }

    fn export(&mut self) {
        let dir = self.config.display.export_dir();
        match export::export_to_dir(self.session.wheel(), &dir) {
            Ok(path) => {
                info!("Exported wheel to {}", path.display());
                self.set_status(format!("Exported to {}", path.display()));
            }
            Err(e) => {
                warn!("Export failed: {:#}", e);
                self.set_status(format!("Export failed: {}", e));
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key {
            KeyEvent {
                code: KeyCode::Char('q'),
                ..
            }
            | KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => {
                self.engine.stop();
                self.quit = true;
            }
            KeyEvent {
                code: KeyCode::Char(' ') | KeyCode::Enter,
                ..
            } => {
                // With a result showing, the primary action is "done"
                if self.session.pending().is_some() {
                    self.mark_done();
                } else {
                    self.spin();
                }
            }
            KeyEvent {
                code: KeyCode::Char('x'),
                ..
            } => self.engine.stop(),
            KeyEvent {
                code: KeyCode::Esc, ..
            } => {
                if self.engine.is_spinning() {
                    self.engine.stop();
                } else {
                    self.session.keep_pending();
                }
            }
            KeyEvent {
                code: KeyCode::Char('d'),
                ..
            } => self.mark_done(),
            KeyEvent {
                code: KeyCode::Char('k'),
                ..
            } => {
                self.session.keep_pending();
            }
            KeyEvent {
                code: KeyCode::Char('r'),
                ..
            } => {
                self.session.restore_all();
                self.set_status("Restored all questions");
            }
            KeyEvent {
                code: KeyCode::Char('s'),
                ..
            } => self.cycle_speed(),
            KeyEvent {
                code: KeyCode::Char('e'),
                ..
            } => self.export(),
            KeyEvent {
                code: KeyCode::Tab, ..
            } => self.view.toggle_sidebar(),
            _ => {}
        }
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: Config,
    session: Session,
    options: RunOptions,
) -> Result<()> {
    let mut app = App::new(config, session, options);

    let frame_time = Duration::from_secs_f64(1.0 / app.config.display.fps.max(1) as f64);

    while !app.quit {
        let frame_start = Instant::now();

        app.advance();

        let active = app.session.active_items();
        let items = app.engine.spinning_items().unwrap_or(active.as_slice());
        let info = FrameInfo {
            items,
            rotation: app.engine.rotation(),
            spinning: app.engine.is_spinning(),
            speed: app.speed,
        };

        terminal.draw(|frame| {
            let area = frame.area();

            // Clear with transparent/reset background for terminal transparency support
            let block = ratatui::widgets::Block::default()
                .style(Style::default().bg(Color::Reset));
            frame.render_widget(block, area);

            let body = Rect::new(area.x, area.y + 1, area.width, area.height.saturating_sub(1));
            app.view.render(frame, body, &app.session, &info);

            render_status(frame, area, &app, app.status_text());
        })?;

        // Handle input for whatever is left of this frame
        let remaining = frame_time.saturating_sub(frame_start.elapsed());
        if event::poll(remaining)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }
    }

    Ok(())
}

fn render_status(frame: &mut Frame, area: Rect, app: &App, message: Option<&str>) {
    let status = match message {
        Some(msg) => format!(" {} ", msg),
        None => {
            let action = if let Some(spin) = app.engine.state() {
                format!("[x] stop ({:.3} rad/frame)", spin.velocity)
            } else if app.session.pending().is_some() {
                "[d]one/[enter] | [k]eep".to_string()
            } else if !app.session.can_spin() {
                "no questions left".to_string()
            } else {
                "[space] spin".to_string()
            };
            format!(
                " {} | [s]peed: {} | [e]xport | [r]estore | [q]uit ",
                action, app.speed
            )
        }
    };

    for (i, ch) in status.chars().enumerate() {
        if i < area.width as usize {
            let cell = frame.buffer_mut().cell_mut((area.x + i as u16, area.y));
            if let Some(cell) = cell {
                cell.set_char(ch);
                cell.set_fg(if message.is_some() {
                    Color::Yellow
                } else {
                    Color::DarkGray
                });
            }
        }
    }
}
