use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::buffer::Buffer;
use ratatui::prelude::*;
use std::io::{self, stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::info;

use crate::config::Config;
use crate::geometry::GridSize;
use crate::ipc::{self, IpcCommand};
use crate::matrix::{Frame as MatrixFrame, MatrixSurface};
use crate::sensor::{SensorFeed, SimulatedSensor};
use crate::session::Session;

/// Degrees per arrow key press.
const NUDGE_STEP: f64 = 5.0;

/// Terminal cells per LED horizontally; terminal characters are about twice
/// as tall as they are wide.
const CELL_WIDTH: u16 = 2;

/// Holds whatever was last committed; the draw loop paints it.
pub struct TerminalSurface {
    current: MatrixFrame,
}

impl TerminalSurface {
    pub fn new(initial: MatrixFrame) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> &MatrixFrame {
        &self.current
    }
}

impl MatrixSurface for TerminalSurface {
    fn commit(&mut self, frame: &MatrixFrame) -> Result<()> {
        self.current = frame.clone();
        Ok(())
    }

    fn size(&self) -> GridSize {
        self.current.size()
    }
}

pub async fn run(config: Config, config_path: Option<PathBuf>, ipc_rx: mpsc::Receiver<IpcCommand>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, config, config_path, ipc_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: Config,
    config_path: Option<PathBuf>,
    mut ipc_rx: mpsc::Receiver<IpcCommand>,
) -> Result<()> {
    let sensor = SimulatedSensor::new(config.sensor.sweep_speed, config.sensor.sweep_axes.clone());
    let feed = SensorFeed::new(sensor.clone(), config.poll_interval());
    let mut readings = feed.subscribe();

    let mut session = Session::new(&config, config_path, sensor)?;
    let mut surface = TerminalSurface::new(session.current().clone());

    let target_fps = Duration::from_secs_f64(1.0 / 30.0);

    info!("Terminal simulator running");

    loop {
        while let Ok(cmd) = ipc_rx.try_recv() {
            ipc::process_ipc_command(cmd, &mut session);
        }

        let now = Instant::now();
        if readings.has_changed().unwrap_or(false) {
            let orientation = *readings.borrow_and_update();
            session.on_reading(orientation, now)?;
        }
        session.tick(now)?;

        if let Some(frame) = session.take_frame() {
            surface.commit(&frame)?;
        }

        let status = format!(
            " {} | [←/→] tilt [z]ero [s]tyle [c]olor [p]ause [q]uit ",
            session.status()
        );

        terminal.draw(|frame| {
            let area = frame.area();

            let block = ratatui::widgets::Block::default().style(Style::default().bg(Color::Reset));
            frame.render_widget(block, area);

            render_matrix(frame.buffer_mut(), area, surface.current());
            render_status(frame.buffer_mut(), area, &status);
        })?;

        // Handle input
        if event::poll(target_fps)? {
            if let Event::Key(key) = event::read()? {
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
                        break;
                    }
                    KeyEvent {
                        code: KeyCode::Left,
                        ..
                    } => {
                        session.nudge(-NUDGE_STEP)?;
                    }
                    KeyEvent {
                        code: KeyCode::Right,
                        ..
                    } => {
                        session.nudge(NUDGE_STEP)?;
                    }
                    // the Sense HAT joystick pushed down zeroes the display
                    KeyEvent {
                        code: KeyCode::Char('z') | KeyCode::Down,
                        ..
                    } => {
                        session.zero()?;
                    }
                    KeyEvent {
                        code: KeyCode::Char('s'),
                        ..
                    } => {
                        session.next_style()?;
                    }
                    KeyEvent {
                        code: KeyCode::Char('c'),
                        modifiers: KeyModifiers::NONE,
                        ..
                    } => {
                        session.next_color_scheme()?;
                    }
                    KeyEvent {
                        code: KeyCode::Char('p'),
                        ..
                    } => {
                        session.toggle_pause()?;
                    }
                    _ => {}
                }
            }
        }
    }

    Ok(())
}

/// Side length in terminal cells, saturating for grids wider than the screen.
fn cells(leds: usize) -> u16 {
    u16::try_from(leds).unwrap_or(u16::MAX)
}

/// Area the matrix occupies, centered in `area` and clipped to it.
fn matrix_area(area: Rect, grid: GridSize) -> Rect {
    let width = cells(grid.columns).saturating_mul(CELL_WIDTH).min(area.width);
    let height = cells(grid.rows).min(area.height.saturating_sub(1));
    let x = area.x + (area.width - width) / 2;
    let y = area.y + 1 + (area.height.saturating_sub(1) - height) / 2;
    Rect::new(x, y, width, height)
}

/// Paint the LED matrix, two terminal columns per LED.
fn render_matrix(buf: &mut Buffer, area: Rect, matrix: &MatrixFrame) {
    let target = matrix_area(area, matrix.size());
    let visible_columns = target.width.div_ceil(CELL_WIDTH) as usize;
    let right = target.x.saturating_add(target.width);

    for (row, leds) in matrix.rows().take(target.height as usize).enumerate() {
        let y = target.y + row as u16;
        for (column, color) in leds.iter().take(visible_columns).enumerate() {
            let x = target.x.saturating_add(column as u16 * CELL_WIDTH);
            let lit = *color != matrix.background();
            for x in (x..x.saturating_add(CELL_WIDTH)).take_while(|&x| x < right) {
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_char(if lit { '█' } else { '·' });
                    cell.set_fg(if lit {
                        Color::Rgb(color.r, color.g, color.b)
                    } else {
                        Color::DarkGray
                    });
                }
            }
        }
    }
}

fn render_status(buf: &mut Buffer, area: Rect, status: &str) {
    for (i, ch) in status.chars().take(area.width as usize).enumerate() {
        if let Some(cell) = buf.cell_mut((area.x + i as u16, area.y)) {
            cell.set_char(ch);
            cell.set_fg(Color::DarkGray);
        }
    }
}
