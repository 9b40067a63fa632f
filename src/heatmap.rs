use crate::config::ContribConfig;
use crate::contrib::{self, ContributionGrid};
use crate::github;
use crate::help::show_help_modal;
use crate::settings::Settings;
use crate::terminal::Terminal;
use crate::theme::{self, Theme, ThemeState};
use crate::visits;
use chrono::Weekday;
use crossterm::event::KeyCode;
use std::io;

const HELP: &str = "\
CONTRIBUTIONS
─────────────────
t      Toggle theme
q/Esc  Quit
?      Close help";

const CELL_CHAR: char = '■';
/// Columns reserved for the weekday gutter.
const GUTTER: i32 = 4;
/// Row where the month labels sit; the grid starts one below.
const LABEL_ROW: i32 = 1;

/// Run the contribution heatmap view.
pub fn run(config: ContribConfig) -> io::Result<()> {
    let mut settings = Settings::load();

    let (feed, source) = if let Some(path) = &config.file {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "local".to_string());
        (github::load_file(path), name)
    } else {
        let user = config.user.clone().or_else(|| settings.github.user.clone());
        match user {
            Some(user) => (github::fetch(&user), user),
            None => {
                eprintln!(
                    "No GitHub user given. Pass one (plumterm contrib <user>) or set \
                     [github] user in {}.",
                    Settings::config_path().display()
                );
                return Ok(());
            }
        }
    };

    let slug = config
        .slug
        .clone()
        .or_else(|| settings.visits.slug.clone())
        .unwrap_or_else(|| visits::DEFAULT_SLUG.to_string());
    let visit_count = visits::bump(&slug);

    // A failed or empty feed renders no grid; the chrome still appears.
    let days = feed
        .as_ref()
        .map(|f| contrib::fill_gaps(&f.days))
        .unwrap_or_default();
    let grid = contrib::build_grid(&days, config.week_start);
    let total = feed.as_ref().map(|f| f.total);

    let mut theme_state = ThemeState::new(
        config.theme_override.unwrap_or_else(|| settings.theme()),
    );

    let mut term = Terminal::new(true)?;
    term.clear_screen()?;
    let (mut width, mut height) = term.size();

    render(
        &mut term,
        grid.as_ref(),
        total,
        visit_count,
        &source,
        theme_state.theme,
        config.week_start,
    );
    term.present()?;

    loop {
        let (new_width, new_height) =
            crossterm::terminal::size().unwrap_or((width, height));
        if new_width != width || new_height != height {
            width = new_width;
            height = new_height;
            term.resize(width, height);
            term.clear_screen()?;
            render(
                &mut term,
                grid.as_ref(),
                total,
                visit_count,
                &source,
                theme_state.theme,
                config.week_start,
            );
            term.present()?;
        }

        if let Some(code) = term.wait_key(100)? {
            match code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char('?') => {
                    if show_help_modal(&mut term, HELP)? {
                        break;
                    }
                }
                code => {
                    if theme_state.handle_key(code) {
                        settings.persist_theme(theme_state.theme);
                        render(
                            &mut term,
                            grid.as_ref(),
                            total,
                            visit_count,
                            &source,
                            theme_state.theme,
                            config.week_start,
                        );
                        present_with_reveal(&term, config.motion)?;
                    }
                }
            }
        }
    }

    Ok(())
}

/// Build the whole frame into the back buffer.
fn render(
    term: &mut Terminal,
    grid: Option<&ContributionGrid>,
    total: Option<u64>,
    visit_count: Option<u64>,
    source: &str,
    theme: Theme,
    week_start: Weekday,
) {
    term.clear();
    let (width, _) = term.size();

    let text = theme::text_color(theme);
    let muted = theme::muted_color(theme);

    term.set_str(1, 0, source, Some(text), true);

    let mut footer_row = LABEL_ROW + 2;

    if let Some(grid) = grid {
        // Most recent weeks win when the terminal is too narrow.
        let capacity = ((width as i32 - GUTTER - 1).max(0) / 2) as usize;
        let visible = capacity.min(grid.weeks.len());
        let start = grid.weeks.len() - visible;
        let weeks = &grid.weeks[start..];
        let labels = contrib::month_labels(weeks);

        for label in &labels {
            let x = GUTTER + label.week as i32 * 2;
            term.set_str(x, LABEL_ROW, label.text, Some(muted), false);
        }

        let grid_top = LABEL_ROW + 1;
        let mut day = week_start;
        for row in 0..7 {
            if matches!(day, Weekday::Mon | Weekday::Wed | Weekday::Fri) {
                term.set_str(0, grid_top + row, day_abbr(day), Some(muted), false);
            }
            day = day.succ();
        }

        for (week_idx, week) in weeks.iter().enumerate() {
            let x = GUTTER + week_idx as i32 * 2;
            for (row, slot) in week.days.iter().enumerate() {
                if let Some(day) = slot {
                    let color = theme::level_color(theme, day.level);
                    term.set(x, grid_top + row as i32, CELL_CHAR, Some(color), false);
                }
            }
        }

        footer_row = grid_top + 8;

        if let Some(total) = total {
            let line = format!("{} contributions in the last year", visits::group_digits(total));
            term.set_str(1, footer_row, &line, Some(text), false);
            footer_row += 1;
        }
    }

    let visits_line = format!("visits {}", visits::display(visit_count));
    term.set_str(1, footer_row, &visits_line, Some(muted), false);
    term.set_str(1, footer_row + 1, "t theme · ? help · q quit", Some(muted), false);
}

/// Circular reveal from the screen center; instant swap when motion is off.
fn present_with_reveal(term: &Terminal, motion: bool) -> io::Result<()> {
    if !motion {
        return term.present();
    }

    let (width, height) = term.size();
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    // A row is about twice as tall as a column is wide.
    let max_r = (cx * cx + (cy * 2.0) * (cy * 2.0)).sqrt();

    let mut radius = 0.0f32;
    while radius < max_r {
        let next = radius + 3.0;
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                let dx = x as f32 - cx;
                let dy = (y as f32 - cy) * 2.0;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist >= radius && dist < next {
                    if let Some(cell) = term.get(x, y) {
                        term.draw_cell(x, y, cell.ch, cell.fg, cell.bold)?;
                    }
                }
            }
        }
        radius = next;
        term.sleep(0.012);
    }

    term.present()
}

fn day_abbr(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}
