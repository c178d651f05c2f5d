use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use std::io::{self, Stdout, Write};
use std::time::Duration;

pub const TICK_MS: u64 = 33;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rgb
{
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb
{
    pub const fn new(r: u8, g: u8, b: u8) -> Self
    {
        Self { r, g, b }
    }
}

/// Raw mode + alternate screen for the lifetime of a game. Dropping it hands
/// the terminal back in the state we found it.
pub struct TerminalGuard
{
    stdout: Stdout,
}

impl TerminalGuard
{
    pub fn enter() -> io::Result<Self>
    {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, Hide)?;
        Ok(Self { stdout })
    }

    pub fn stdout(&mut self) -> &mut Stdout
    {
        &mut self.stdout
    }
}

impl Drop for TerminalGuard
{
    fn drop(&mut self)
    {
        let _ = execute!(self.stdout, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

pub fn paint(text: &str, background: Rgb) -> String
{
    format!(
        "\x1b[48;2;{};{};{}m{}\x1b[0m",
        background.r, background.g, background.b, text
    )
}

pub fn draw_lines(stdout: &mut Stdout, lines: &[String]) -> Result<(), String>
{
    let output = format!("{}\r\n", lines.join("\r\n"));
    queue!(stdout, MoveTo(0, 0), Clear(ClearType::All)).map_err(|err| err.to_string())?;
    stdout.write_all(output.as_bytes()).map_err(|err| err.to_string())?;
    stdout.flush().map_err(|err| err.to_string())?;
    Ok(())
}

pub fn wait_for_space() -> Result<(), String>
{
    while event::poll(Duration::from_millis(0)).map_err(|err| err.to_string())? {
        let _ = event::read().map_err(|err| err.to_string())?;
    }

    loop {
        if event::poll(Duration::from_millis(50)).map_err(|err| err.to_string())? {
            if let Event::Key(KeyEvent { code: KeyCode::Char(' '), .. }) =
                event::read().map_err(|err| err.to_string())?
            {
                break;
            }
        }
    }

    Ok(())
}

/// Moves a cursor on a `columns`-wide board of `len` cells, clamping at the
/// edges instead of wrapping.
pub fn step_cursor(cursor: usize, columns: usize, len: usize, d_row: isize, d_col: isize) -> usize
{
    if columns == 0 || len == 0 {
        return 0;
    }
    let rows = len.div_ceil(columns);
    let row = (cursor / columns) as isize + d_row;
    let col = (cursor % columns) as isize + d_col;
    let row = row.clamp(0, rows as isize - 1) as usize;
    let col = col.clamp(0, columns as isize - 1) as usize;
    (row * columns + col).min(len - 1)
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn cursor_stays_inside_the_board()
    {
        assert_eq!(step_cursor(0, 3, 9, -1, 0), 0);
        assert_eq!(step_cursor(0, 3, 9, 0, -1), 0);
        assert_eq!(step_cursor(2, 3, 9, 0, 1), 2);
        assert_eq!(step_cursor(8, 3, 9, 1, 0), 8);
        assert_eq!(step_cursor(4, 3, 9, 1, 0), 7);
        assert_eq!(step_cursor(4, 3, 9, 0, -1), 3);
    }

    #[test]
    fn cursor_on_ragged_last_row_lands_on_a_real_card()
    {
        // 2 rows of 4, only 6 cards: row 1 has cards 4 and 5.
        assert_eq!(step_cursor(3, 4, 6, 1, 0), 5);
    }

    #[test]
    fn paint_wraps_text_in_truecolor_background()
    {
        let painted = paint(" x ", Rgb::new(1, 2, 3));
        assert_eq!(painted, "\x1b[48;2;1;2;3m x \x1b[0m");
    }
}
