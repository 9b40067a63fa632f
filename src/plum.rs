use crate::config::PlumConfig;
use crate::growth::{Animation, Bounds, Segment, FRAME_INTERVAL_MS};
use crate::help::show_help_modal;
use crate::settings::Settings;
use crate::terminal::Terminal;
use crate::theme::{self, ThemeState};
use crossterm::event::KeyCode;
use crossterm::style::Color;
use std::io;
use std::time::{Duration, Instant};

/// Canvas units per terminal cell; a cell is about twice as tall as wide.
const UNITS_PER_COL: f32 = 5.0;
const UNITS_PER_ROW: f32 = 10.0;

const HELP: &str = "\
PLUM
─────────────────
t      Toggle theme
n      New seed
Space  Pause
q/Esc  Quit
?      Close help";

/// Run the plum growth animation.
pub fn run(config: PlumConfig) -> io::Result<()> {
    let seed = config.seed.unwrap_or_else(clock_seed);

    if config.print {
        run_print(&config, seed)?;
    } else {
        run_interactive(&config, seed)?;
    }

    Ok(())
}

fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0) // Fallback seed for misconfigured system clocks
}

fn bounds_for(width: u16, height: u16) -> Bounds {
    Bounds::new(
        width as f32 * UNITS_PER_COL,
        height as f32 * UNITS_PER_ROW,
    )
}

fn run_print(config: &PlumConfig, initial_seed: u64) -> io::Result<()> {
    let mut seed = initial_seed;
    let theme = config
        .theme_override
        .unwrap_or_else(|| Settings::load().theme());
    let color = theme::branch_color(theme);

    loop {
        let mut term = Terminal::new(false)?;
        let (width, height) = term.size();
        let mut animation = Animation::new(seed, bounds_for(width, height));

        // Grow to completion, no frame pacing.
        while animation.tick(&mut |seg| draw_segment(&mut term, seg, color)) {}

        term.print_to_stdout();

        if !config.infinite {
            break;
        }

        std::thread::sleep(Duration::from_secs_f64(config.time_wait));
        seed = clock_seed();
    }

    Ok(())
}

fn run_interactive(config: &PlumConfig, initial_seed: u64) -> io::Result<()> {
    let mut settings = Settings::load();
    let mut theme_state = ThemeState::new(
        config.theme_override.unwrap_or_else(|| settings.theme()),
    );

    let mut seed = initial_seed;
    let mut term = Terminal::new(true)?;
    term.clear_screen()?;

    let (mut width, mut height) = term.size();
    let mut animation = Animation::new(seed, bounds_for(width, height));
    let mut paused = false;
    let frame = Duration::from_millis(FRAME_INTERVAL_MS);
    let mut last_frame = Instant::now();

    loop {
        // A viewport change wipes the canvas and regrows from fresh seeds.
        let (new_width, new_height) =
            crossterm::terminal::size().unwrap_or((width, height));
        if new_width != width || new_height != height {
            width = new_width;
            height = new_height;
            term.resize(width, height);
            term.clear_screen()?;
            seed = config.seed.unwrap_or_else(clock_seed);
            animation.restart(seed, bounds_for(width, height));
        }

        if let Some((code, _)) = term.check_key()? {
            match code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char('?') => {
                    if show_help_modal(&mut term, HELP)? {
                        break;
                    }
                }
                KeyCode::Char('n') => {
                    seed = clock_seed();
                    term.clear();
                    term.clear_screen()?;
                    animation.restart(seed, bounds_for(width, height));
                }
                KeyCode::Char(' ') => paused = !paused,
                code => {
                    if theme_state.handle_key(code) {
                        settings.persist_theme(theme_state.theme);
                        term.clear();
                        term.clear_screen()?;
                        seed = config.seed.unwrap_or_else(clock_seed);
                        animation.restart(seed, bounds_for(width, height));
                    }
                }
            }
        }

        if paused {
            term.sleep(0.05);
            continue;
        }

        // Fixed 30 Hz cadence regardless of how fast the loop spins.
        if last_frame.elapsed() < frame {
            term.sleep(0.005);
            continue;
        }
        last_frame = Instant::now();

        if animation.is_finished() {
            if config.infinite {
                match term.wait_key((config.time_wait * 1000.0) as u64)? {
                    Some(KeyCode::Char('q')) | Some(KeyCode::Esc) => break,
                    Some(KeyCode::Char('?')) => {
                        if show_help_modal(&mut term, HELP)? {
                            break;
                        }
                    }
                    _ => {}
                }
                seed = config.seed.unwrap_or_else(clock_seed);
                term.clear();
                term.clear_screen()?;
                animation.restart(seed, bounds_for(width, height));
            } else {
                term.sleep(0.05);
            }
            continue;
        }

        let color = theme::branch_color(theme_state.theme);
        animation.tick(&mut |seg| draw_segment(&mut term, seg, color));
        term.present()?;
    }

    Ok(())
}

/// Rasterize one segment into the cell buffer.
fn draw_segment(term: &mut Terminal, seg: Segment, color: Color) {
    let x0 = (seg.x1 / UNITS_PER_COL).floor() as i32;
    let y0 = (seg.y1 / UNITS_PER_ROW).floor() as i32;
    let x1 = (seg.x2 / UNITS_PER_COL).floor() as i32;
    let y1 = (seg.y2 / UNITS_PER_ROW).floor() as i32;

    let ch = stroke_char(x1 - x0, y1 - y0);
    for (x, y) in line_cells(x0, y0, x1, y1) {
        term.set(x, y, ch, Some(color), false);
    }
}

/// Pick a glyph matching the segment's overall slope.
fn stroke_char(dx: i32, dy: i32) -> char {
    match (dx.signum(), dy.signum()) {
        (0, 0) => '·',
        (_, 0) => '─',
        (0, _) => '│',
        (1, 1) | (-1, -1) => '\\',
        _ => '/',
    }
}

/// Integer line walk between two cells, endpoints included.
fn line_cells(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<(i32, i32)> {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);
    let mut cells = Vec::new();

    loop {
        cells.push((x, y));
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }

    cells
}
