use crate::emulator::Emulator;
use crate::hardware::console::{BufferedConsole, Console};
use crate::hardware::memory::{Memory, PROGRAM_SECTION_START};
use std::io;

/// Memory with `program` loaded at `0x3000` and `stdin_data` as pending keyboard input.
pub fn create_memory(program: &[u16], stdin_data: &[u8]) -> Memory<BufferedConsole> {
    let mut mem = Memory::new(BufferedConsole::with_input(stdin_data));
    mem.load_program(PROGRAM_SECTION_START, program)
        .expect("Error loading program");
    mem
}

/// Emulator with a headless console running `program_no_header` loaded at `0x3000`.
pub fn create_emulator(program_no_header: &[u16], stdin_data: &[u8]) -> Emulator<BufferedConsole> {
    let mut program = Vec::with_capacity(program_no_header.len() + 1);
    program.push(PROGRAM_SECTION_START);
    program.extend_from_slice(program_no_header);
    let mut emu = Emulator::with_console(BufferedConsole::with_input(stdin_data));
    emu.load_program(&program).expect("Error loading program");
    emu
}

/// Console whose every operation fails with the given error kind.
pub struct FailingConsole {
    kind: io::ErrorKind,
}
impl FailingConsole {
    pub const fn new(kind: io::ErrorKind) -> Self {
        Self { kind }
    }
}
impl Console for FailingConsole {
    fn poll_input(&mut self) -> io::Result<Option<u8>> {
        Err(io::Error::from(self.kind))
    }
    fn read_blocking(&mut self) -> io::Result<u8> {
        Err(io::Error::from(self.kind))
    }
    fn write_byte(&mut self, _byte: u8) -> io::Result<()> {
        Err(io::Error::from(self.kind))
    }
    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::from(self.kind))
    }
}

/// Headless console that reports an interrupt after a number of checks.
pub struct InterruptingConsole {
    inner: BufferedConsole,
    checks_until_interrupt: usize,
}
impl InterruptingConsole {
    pub fn new(checks_until_interrupt: usize) -> Self {
        Self {
            inner: BufferedConsole::new(),
            checks_until_interrupt,
        }
    }
}
impl Console for InterruptingConsole {
    fn poll_input(&mut self) -> io::Result<Option<u8>> {
        self.inner.poll_input()
    }
    fn read_blocking(&mut self) -> io::Result<u8> {
        self.inner.read_blocking()
    }
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.inner.write_byte(byte)
    }
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
    fn is_interrupted(&mut self) -> bool {
        if self.checks_until_interrupt == 0 {
            return true;
        }
        self.checks_until_interrupt -= 1;
        false
    }
}
