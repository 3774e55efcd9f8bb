use std::{io::{self, Stdout, Write, stdout}, time::Duration};

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyEvent, KeyEventKind, read, poll};

/// Screen position in terminal columns and rows.
pub type Coords = (u16, u16);

/// Owns the terminal while the game runs.
///
/// Everything drawn through [`print_at`](Self::print_at) is mirrored in a
/// character buffer, so redrawing an unchanged cell costs nothing and message
/// boxes can be erased by restoring what was under them.
pub struct TermManager {
    width: u16,
    height: u16,
    stdout: Stdout,
    screen: Vec<char>,
    current_msg: Option<Message>,
    write_error: Option<io::Error>,
}

struct Message {
    top_left: Coords,
    width: u16,
    height: u16,
}

impl TermManager {
    pub fn new() -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let screen = vec![' '; width as usize * height as usize];
        Ok(TermManager { width, height, stdout: stdout(), screen, current_msg: None, write_error: None })
    }

    pub fn setup(&mut self) -> io::Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)
    }

    pub fn restore(&mut self) -> io::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
    }

    /// Drains every key press that arrived since the last call.
    pub fn read_key_events_queue(&self) -> io::Result<Vec<KeyEvent>> {
        let mut events = vec![];

        while poll(Duration::from_millis(1))? {
            if let Event::Key(ev) = read()? {
                if ev.kind == KeyEventKind::Press {
                    events.push(ev);
                }
            }
        }

        Ok(events)
    }

    pub fn size(&self) -> Coords {
        (self.width, self.height)
    }

    /// Draws a box of `width` x `height` characters with its top-left corner at
    /// `origin`.
    pub fn draw_borders(&mut self, origin: Coords, width: u16, height: u16) {
        let (x0, y0) = origin;
        let end_x = x0 + width - 1;
        let end_y = y0 + height - 1;

        for x in x0..=end_x {
            let ch = if x == x0 || x == end_x {'+'} else {'-'};
            self.print_at((x, y0), ch);
            self.print_at((x, end_y), ch);
        }

        for y in y0 + 1..end_y {
            self.print_at((x0, y), '|');
            self.print_at((end_x, y), '|');
        }
    }

    /// Shows `lines` centered in a blank box, replacing any current message.
    pub fn show_message(&mut self, lines: &[&str]) {
        if self.has_message() {
            self.hide_message();
        }

        let msg_height = (lines.len() + 2) as u16;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 2) as u16;
        let center = (self.width / 2, self.height / 2);
        let top_left = (
            center.0.saturating_sub(msg_width / 2),
            center.1.saturating_sub(msg_height / 2),
        );

        // Print the top and bottom empty lines
        for y in [top_left.1, top_left.1 + msg_height - 1] {
            for x_diff in 0..msg_width {
                self.print_at_no_save((top_left.0 + x_diff, y), ' ');
            }
        }

        // Print the message lines
        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as u16 + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                self.print_at_no_save((top_left.0 + x_diff as u16, y), ch);
            }
        }

        self.current_msg = Some(Message { top_left, width: msg_width, height: msg_height });
    }

    pub fn hide_message(&mut self) {
        let Some(msg) = self.current_msg.take() else {
            return;
        };

        // Restore the content from the screen buffer
        for y_diff in 0..msg.height {
            for x_diff in 0..msg.width {
                let pos = (msg.top_left.0 + x_diff, msg.top_left.1 + y_diff);
                if let Some(idx) = self.index(pos) {
                    let ch = self.screen[idx];
                    self.print_at_no_save(pos, ch);
                }
            }
        }
    }

    /// Queues `ch` at `pos` unless the buffer already holds it there.
    pub fn print_at(&mut self, pos: Coords, ch: char) {
        let Some(idx) = self.index(pos) else {
            return;
        };
        if self.screen[idx] == ch {
            return;
        }
        self.screen[idx] = ch;
        self.print_at_no_save(pos, ch);
    }

    pub fn print_str_at(&mut self, pos: Coords, text: &str) {
        for (i, ch) in text.chars().enumerate() {
            self.print_at((pos.0 + i as u16, pos.1), ch);
        }
    }

    pub fn clear(&mut self) -> io::Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All))?;
        self.screen = vec![' '; self.width as usize * self.height as usize];
        Ok(())
    }

    /// Writes out everything queued so far, reporting the first failed write.
    pub fn flush(&mut self) -> io::Result<()> {
        if let Some(e) = self.write_error.take() {
            return Err(e);
        }
        self.stdout.flush()
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn index(&self, pos: Coords) -> Option<usize> {
        if pos.0 < self.width && pos.1 < self.height {
            Some(self.width as usize * pos.1 as usize + pos.0 as usize)
        } else {
            None
        }
    }

    fn print_at_no_save(&mut self, pos: Coords, ch: char) {
        // Messages skip the buffer so hiding them can restore what was beneath.
        if let Err(e) = queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch)) {
            if self.write_error.is_none() {
                self.write_error = Some(e);
            }
        }
    }
}
