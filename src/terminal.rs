use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{poll, read, Event, KeyCode, KeyModifiers},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{
        disable_raw_mode, enable_raw_mode, size, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use std::io::{self, stdout, Write};
use std::time::Duration;

/// One cell of the back buffer.
#[derive(Clone, Copy, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bold: false,
        }
    }
}

/// Buffered terminal surface. Interactive mode owns the alternate screen and
/// raw mode; the Drop impl hands both back even on early return.
pub struct Terminal {
    width: u16,
    height: u16,
    buffer: Vec<Cell>,
    alternate_screen: bool,
}

impl Terminal {
    pub fn new(alternate_screen: bool) -> io::Result<Self> {
        let (width, height) = size()?;

        if alternate_screen {
            enable_raw_mode()?;
            execute!(stdout(), EnterAlternateScreen, Hide)?;
        }

        Ok(Self {
            width,
            height,
            buffer: vec![Cell::default(); width as usize * height as usize],
            alternate_screen,
        })
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Reallocate the buffer after the host terminal changed size.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.buffer = vec![Cell::default(); width as usize * height as usize];
    }

    pub fn clear(&mut self) {
        for cell in &mut self.buffer {
            *cell = Cell::default();
        }
    }

    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(stdout(), Clear(ClearType::All))?;
        Ok(())
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|i| self.buffer[i])
    }

    pub fn set(&mut self, x: i32, y: i32, ch: char, fg: Option<Color>, bold: bool) {
        if let Some(i) = self.index(x, y) {
            self.buffer[i] = Cell { ch, fg, bold };
        }
    }

    pub fn set_str(&mut self, x: i32, y: i32, s: &str, fg: Option<Color>, bold: bool) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, ch, fg, bold);
        }
    }

    /// Flush the whole back buffer to the screen in one queued batch.
    pub fn render(&self) -> io::Result<()> {
        let mut out = stdout();
        let mut current_fg: Option<Color> = None;
        let mut current_bold = false;

        for y in 0..self.height {
            queue!(out, MoveTo(0, y))?;
            for x in 0..self.width {
                let cell = self.buffer[y as usize * self.width as usize + x as usize];

                if cell.bold != current_bold {
                    if cell.bold {
                        queue!(out, SetAttribute(Attribute::Bold))?;
                    } else {
                        queue!(out, SetAttribute(Attribute::Reset))?;
                        current_fg = None;
                    }
                    current_bold = cell.bold;
                }

                if cell.fg != current_fg {
                    match cell.fg {
                        Some(color) => queue!(out, SetForegroundColor(color))?,
                        None => queue!(out, ResetColor)?,
                    }
                    current_fg = cell.fg;
                }

                queue!(out, Print(cell.ch))?;
            }
        }

        queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;
        out.flush()
    }

    /// Alias used by animation loops after each tick.
    pub fn present(&self) -> io::Result<()> {
        self.render()
    }

    /// Write a single cell straight to the screen, bypassing the buffer.
    /// Lets the theme reveal show partially swapped frames.
    pub fn draw_cell(
        &self,
        x: i32,
        y: i32,
        ch: char,
        fg: Option<Color>,
        bold: bool,
    ) -> io::Result<()> {
        if self.index(x, y).is_none() {
            return Ok(());
        }
        let mut out = stdout();
        queue!(out, MoveTo(x as u16, y as u16))?;
        if bold {
            queue!(out, SetAttribute(Attribute::Bold))?;
        }
        match fg {
            Some(color) => queue!(out, SetForegroundColor(color), Print(ch), ResetColor)?,
            None => queue!(out, Print(ch))?,
        }
        if bold {
            queue!(out, SetAttribute(Attribute::Reset))?;
        }
        out.flush()
    }

    /// Non-blocking key poll.
    pub fn check_key(&self) -> io::Result<Option<(KeyCode, KeyModifiers)>> {
        if poll(Duration::from_millis(0))? {
            if let Event::Key(key_event) = read()? {
                return Ok(Some((key_event.code, key_event.modifiers)));
            }
        }
        Ok(None)
    }

    /// Blocking key wait with a timeout.
    pub fn wait_key(&self, timeout_ms: u64) -> io::Result<Option<KeyCode>> {
        if poll(Duration::from_millis(timeout_ms))? {
            if let Event::Key(key_event) = read()? {
                return Ok(Some(key_event.code));
            }
        }
        Ok(None)
    }

    pub fn sleep(&self, seconds: f32) {
        std::thread::sleep(Duration::from_secs_f32(seconds));
    }

    /// Dump the buffer to stdout with ANSI escapes (print mode).
    pub fn print_to_stdout(&self) {
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = self.buffer[y as usize * self.width as usize + x as usize];
                if cell.ch == ' ' {
                    print!(" ");
                    continue;
                }
                if cell.bold {
                    print!("\x1b[1m");
                }
                if let Some(color) = cell.fg {
                    print_color_escape(color);
                }
                print!("{}\x1b[0m", cell.ch);
            }
            println!();
        }
    }
}

fn print_color_escape(color: Color) {
    match color {
        Color::Rgb { r, g, b } => print!("\x1b[38;2;{};{};{}m", r, g, b),
        Color::AnsiValue(v) => print!("\x1b[38;5;{}m", v),
        other => {
            if let Some(code) = basic_color_code(other) {
                print!("\x1b[{}m", code);
            }
        }
    }
}

fn basic_color_code(color: Color) -> Option<u8> {
    let code = match color {
        Color::Black => 30,
        Color::DarkRed => 31,
        Color::DarkGreen => 32,
        Color::DarkYellow => 33,
        Color::DarkBlue => 34,
        Color::DarkMagenta => 35,
        Color::DarkCyan => 36,
        Color::Grey => 37,
        Color::DarkGrey => 90,
        Color::Red => 91,
        Color::Green => 92,
        Color::Yellow => 93,
        Color::Blue => 94,
        Color::Magenta => 95,
        Color::Cyan => 96,
        Color::White => 97,
        _ => return None,
    };
    Some(code)
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.alternate_screen {
            let _ = execute!(stdout(), Show, LeaveAlternateScreen);
            let _ = disable_raw_mode();
        }
    }
}
