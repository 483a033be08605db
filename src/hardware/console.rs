use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, poll, read};
use std::collections::VecDeque;
use std::io;
use std::io::{BufReader, Read, Stdout, Write, stdin, stdout};
use std::sync::mpsc;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

/// Console device the LC-3 talks to, independent of an implementation.
///
/// Keyboard input is consumed through the memory mapped keyboard registers and the
/// `GETC`/`IN` trap routines, output is produced by the `OUT`, `PUTS`, `PUTSP`, `IN` and `HALT`
/// trap routines.
pub trait Console {
    /// Checks if a character is available and returns it, never blocks.
    ///
    /// # Errors
    /// - the input device can not be queried
    fn poll_input(&mut self) -> io::Result<Option<u8>>;
    /// Waits until a character is available.
    ///
    /// # Errors
    /// - the input device can not be read
    /// - [`io::ErrorKind::Interrupted`] if the user interrupted while waiting
    fn read_blocking(&mut self) -> io::Result<u8>;
    /// # Errors
    /// - the output device can not be written
    fn write_byte(&mut self, byte: u8) -> io::Result<()>;
    /// # Errors
    /// - the output device can not be flushed
    fn flush(&mut self) -> io::Result<()>;
    /// True if the user asked to stop execution (CTRL-C).
    fn is_interrupted(&mut self) -> bool {
        false
    }
}

/// Console on the controlling terminal, keyboard events are read via crossterm.
///
/// When stdin is no terminal, e.g. piped input, [`TerminalConsole::read_from_stdin`] switches
/// input to the bytes of stdin instead.
pub struct TerminalConsole {
    pending: VecDeque<u8>,
    is_interrupted: bool,
    translate_newlines: bool,
    /// Bytes read by a background thread, `None` while keyboard events are used
    input_receiver: Option<Receiver<u8>>,
    stdout: Stdout,
}
impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}
impl TerminalConsole {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            is_interrupted: false,
            translate_newlines: false,
            input_receiver: None,
            stdout: stdout(),
        }
    }
    /// Raw terminal mode does not return the carriage on `\n`, so write `\r\n` instead.
    pub const fn set_translate_newlines(&mut self, translate: bool) {
        self.translate_newlines = translate;
    }
    /// Takes input from the bytes of stdin instead of terminal key events.
    pub fn read_from_stdin(&mut self) {
        self.read_from(stdin());
    }
    fn read_from<R: Read + Send + 'static>(&mut self, reader: R) {
        self.input_receiver = Some(spawn_byte_reader(reader));
    }

    /// Queues the byte of a key press, returns `false` if it was CTRL-C.
    fn handle_key_event(&mut self, event: KeyEvent) -> bool {
        if event.code == KeyCode::Char('c') && event.modifiers.contains(KeyModifiers::CONTROL) {
            self.is_interrupted = true;
            return false;
        }
        if let Some(b) = key_to_byte(event) {
            self.pending.push_back(b);
        }
        true
    }
    /// Moves all events available right now into the pending queue.
    fn pump_events(&mut self) -> io::Result<()> {
        while poll(Duration::from_secs(0))? {
            if let Event::Key(event) = read()? {
                self.handle_key_event(event);
            }
        }
        Ok(())
    }
}

/// Forwards every byte of `reader` until its end, so it can be polled without blocking.
fn spawn_byte_reader<R: Read + Send + 'static>(reader: R) -> Receiver<u8> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        for b in BufReader::new(reader).bytes() {
            match b {
                Ok(b) => {
                    if sender.send(b).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    tracing::warn!("Reading input failed: {e}");
                    return;
                }
            }
        }
        tracing::debug!("End of input");
    });
    receiver
}

/// Writes `byte`, a `\n` becomes `\r\n` if `translate_newlines` is set.
fn write_translated(out: &mut impl Write, byte: u8, translate_newlines: bool) -> io::Result<()> {
    if byte == b'\n' && translate_newlines {
        out.write_all(b"\r\n")
    } else {
        out.write_all(&[byte])
    }
}

fn key_to_byte(event: KeyEvent) -> Option<u8> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    match event.code {
        KeyCode::Char(c) if c.is_ascii() => u8::try_from(c).ok(),
        KeyCode::Enter => Some(b'\n'),
        KeyCode::Tab => Some(b'\t'),
        KeyCode::Backspace => Some(0x08),
        KeyCode::Esc => Some(0x1B),
        _ => None,
    }
}

impl Console for TerminalConsole {
    fn poll_input(&mut self) -> io::Result<Option<u8>> {
        if let Some(receiver) = &self.input_receiver {
            // after the end of input no key is ever pressed again
            return match receiver.try_recv() {
                Ok(b) => Ok(Some(b)),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => Ok(None),
            };
        }
        if self.pending.is_empty() {
            self.pump_events()?;
        }
        Ok(self.pending.pop_front())
    }
    fn read_blocking(&mut self) -> io::Result<u8> {
        if let Some(receiver) = &self.input_receiver {
            return receiver
                .recv()
                .map_err(|_| io::Error::new(io::ErrorKind::UnexpectedEof, "end of input"));
        }
        loop {
            if let Some(b) = self.pending.pop_front() {
                return Ok(b);
            }
            if self.is_interrupted {
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            if let Event::Key(event) = read()? {
                self.handle_key_event(event);
            }
        }
    }
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        write_translated(&mut self.stdout, byte, self.translate_newlines)
    }
    fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }
    /// With input from stdin CTRL-C is a signal, not a key event, so there is nothing to check.
    fn is_interrupted(&mut self) -> bool {
        if !self.is_interrupted
            && self.input_receiver.is_none()
            && let Err(e) = self.pump_events()
        {
            tracing::warn!("Could not check terminal for interrupt: {e}");
        }
        self.is_interrupted
    }
}

/// Console working on in-memory buffers: input is scripted up front, output is captured.
///
/// Used to run programs headless, e.g. in tests or when embedding the emulator.
#[derive(Debug, Default, Clone)]
pub struct BufferedConsole {
    input: VecDeque<u8>,
    output: Vec<u8>,
}
impl BufferedConsole {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    #[must_use]
    pub fn with_input(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            output: Vec::with_capacity(120),
        }
    }
    pub fn push_input(&mut self, input: &[u8]) {
        self.input.extend(input);
    }
    #[must_use]
    pub fn output(&self) -> &[u8] {
        &self.output
    }
    /// Output interpreted as UTF-8, invalid sequences are replaced.
    #[must_use]
    pub fn output_string(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}
impl Console for BufferedConsole {
    fn poll_input(&mut self) -> io::Result<Option<u8>> {
        Ok(self.input.pop_front())
    }
    /// Reading past the scripted input is an error, a real device would block forever.
    fn read_blocking(&mut self) -> io::Result<u8> {
        self.input
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more scripted input"))
    }
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.output.push(byte);
        Ok(())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;

    #[gtest]
    fn test_buffered_console() {
        let mut console = BufferedConsole::with_input(b"ab");
        expect_that!(console.poll_input().unwrap(), eq(Some(b'a')));
        expect_that!(console.read_blocking().unwrap(), eq(b'b'));
        expect_that!(console.poll_input().unwrap(), eq(None));
        expect_that!(
            console.read_blocking().unwrap_err().kind(),
            eq(io::ErrorKind::UnexpectedEof)
        );
        console.write_byte(b'o').unwrap();
        console.write_byte(b'k').unwrap();
        expect_that!(console.output_string(), eq("ok"));
        expect_that!(console.is_interrupted(), eq(false));
    }

    #[gtest]
    fn test_key_to_byte() {
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        expect_that!(key_to_byte(key(KeyCode::Char('x'))), eq(Some(b'x')));
        expect_that!(key_to_byte(key(KeyCode::Enter)), eq(Some(b'\n')));
        expect_that!(key_to_byte(key(KeyCode::Char('ä'))), eq(None));
        expect_that!(key_to_byte(key(KeyCode::Left)), eq(None));
    }

    #[gtest]
    fn test_ctrl_c_interrupts() {
        let mut console = TerminalConsole::new();
        let queued = console.handle_key_event(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE));
        let ctrl_c =
            console.handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        expect_that!(queued, eq(true));
        expect_that!(ctrl_c, eq(false));
        expect_that!(console.is_interrupted, eq(true));
        expect_that!(console.read_blocking().unwrap(), eq(b'a'));
        expect_that!(
            console.read_blocking().unwrap_err().kind(),
            eq(io::ErrorKind::Interrupted)
        );
    }

    #[gtest]
    fn test_write_translated_raw_mode() {
        let mut out: Vec<u8> = Vec::new();
        for b in b"a\nb\n" {
            write_translated(&mut out, *b, true).unwrap();
        }
        assert_that!(out, eq(&b"a\r\nb\r\n".to_vec()));
    }

    #[gtest]
    fn test_write_translated_keeps_newline() {
        let mut out: Vec<u8> = Vec::new();
        for b in b"a\nb\r" {
            write_translated(&mut out, *b, false).unwrap();
        }
        assert_that!(out, eq(&b"a\nb\r".to_vec()));
    }

    #[gtest]
    fn test_read_from_reader() {
        let mut console = TerminalConsole::new();
        console.read_from(io::Cursor::new(b"xy".to_vec()));
        expect_that!(console.read_blocking().unwrap(), eq(b'x'));
        expect_that!(console.read_blocking().unwrap(), eq(b'y'));
        expect_that!(
            console.read_blocking().unwrap_err().kind(),
            eq(io::ErrorKind::UnexpectedEof)
        );
        expect_that!(console.poll_input().unwrap(), eq(None));
        expect_that!(console.is_interrupted(), eq(false));
    }

    #[gtest]
    fn test_poll_from_reader() {
        let mut console = TerminalConsole::new();
        console.read_from(io::Cursor::new(b"k".to_vec()));
        // the reader thread delivers in the background
        let polled = (0..1000).find_map(|_| {
            let b = console.poll_input().unwrap();
            if b.is_none() {
                thread::sleep(Duration::from_millis(1));
            }
            b
        });
        expect_that!(polled, eq(Some(b'k')));
        expect_that!(console.poll_input().unwrap(), eq(None));
    }
}
