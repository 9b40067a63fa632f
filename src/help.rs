use crate::terminal::Terminal;
use crossterm::cursor::MoveTo;
use crossterm::event::KeyCode;
use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use std::io::{self, stdout, Write};

/// Show a centered help overlay without touching the back buffer.
/// Returns true if the user asked to quit (q/Esc) while it was open.
pub fn show_help_modal(term: &mut Terminal, help_text: &str) -> io::Result<bool> {
    if help_text.is_empty() {
        return Ok(false);
    }

    let (width, height) = term.size();
    draw_overlay(width, height, help_text)?;

    loop {
        if let Some(code) = term.wait_key(50)? {
            match code {
                KeyCode::Char('?') => break,
                KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
                _ => {}
            }
        }
    }

    // Restore the frame underneath.
    term.render()?;
    Ok(false)
}

fn draw_overlay(width: u16, height: u16, help_text: &str) -> io::Result<()> {
    let lines: Vec<&str> = help_text.lines().collect();
    let inner = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let box_width = inner + 4;
    let box_height = lines.len() + 2;

    let x0 = (width as usize).saturating_sub(box_width) / 2;
    let y0 = (height as usize).saturating_sub(box_height) / 2;

    let mut out = stdout();

    queue!(out, SetForegroundColor(Color::White))?;
    queue!(out, MoveTo(x0 as u16, y0 as u16), Print('┌'))?;
    queue!(out, Print("─".repeat(box_width - 2)), Print('┐'))?;

    for (i, line) in lines.iter().enumerate() {
        let y = (y0 + 1 + i) as u16;
        let padding = inner.saturating_sub(line.chars().count());
        queue!(out, MoveTo(x0 as u16, y), Print('│'))?;
        queue!(out, SetForegroundColor(Color::Grey))?;
        queue!(out, Print(format!(" {}{} ", line, " ".repeat(padding))))?;
        queue!(out, SetForegroundColor(Color::White), Print('│'))?;
    }

    let y1 = (y0 + box_height - 1) as u16;
    queue!(out, MoveTo(x0 as u16, y1), Print('└'))?;
    queue!(out, Print("─".repeat(box_width - 2)), Print('┘'))?;

    queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;
    out.flush()
}
