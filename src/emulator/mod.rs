//! The fetch-decode-execute cycle and program loading.
pub mod instruction;
pub mod opcodes;
#[cfg(test)]
pub(crate) mod test_helpers;
pub mod trap_routines;

use crate::emulator::instruction::{Instruction, Opcode};
use crate::errors::{ExecutionError, LoadProgramError};
use crate::hardware::console::{Console, TerminalConsole};
use crate::hardware::memory::Memory;
use crate::hardware::registers::Registers;
use byteorder::{BigEndian, ByteOrder};
use std::fs;
use std::ops::ControlFlow;
use std::path::Path;

/// Number of instructions executed between two checks whether the user interrupted.
pub const INTERRUPT_CHECK_INTERVAL: u32 = 1 << 12;

/// Creates an emulator on the terminal and loads the program image at `path`.
///
/// # Errors
/// See [`Emulator::load_image_file`]
pub fn from_program(path: impl AsRef<Path>) -> Result<Emulator, LoadProgramError> {
    let mut emu = Emulator::new();
    emu.load_image_file(path)?;
    Ok(emu)
}

/// The public facing emulator used to run LC-3 programs.
///
/// Owns the whole machine state, execution starts at `0x3000`.
#[derive(Debug)]
pub struct Emulator<C = TerminalConsole> {
    registers: Registers,
    memory: Memory<C>,
    is_halted: bool,
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}
impl Emulator {
    /// Emulator talking to the terminal.
    #[must_use]
    pub fn new() -> Self {
        Self::with_console(TerminalConsole::new())
    }
}

impl<C: Console> Emulator<C> {
    pub fn with_console(console: C) -> Self {
        Self {
            registers: Registers::new(),
            memory: Memory::new(console),
            is_halted: false,
        }
    }

    /// Loads a program image file: a big endian `.ORIG` address followed by big endian words.
    ///
    /// # Errors
    /// - File can not be read
    /// - see [`Emulator::load_image_bytes`]
    pub fn load_image_file(&mut self, path: impl AsRef<Path>) -> Result<(), LoadProgramError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| LoadProgramError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        self.load_image_bytes(&bytes)?;
        tracing::info!("Loaded image {}", path.display());
        Ok(())
    }

    /// Loads program image bytes: a big endian `.ORIG` address followed by big endian words.
    ///
    /// # Errors
    /// - Program is missing valid .ORIG header
    /// - Program has an odd number of bytes
    /// - Program too long
    pub fn load_image_bytes(&mut self, bytes: &[u8]) -> Result<(), LoadProgramError> {
        if bytes.len() < 2 {
            return Err(LoadProgramError::ProgramMissingOrigHeader);
        }
        if bytes.len() % 2 != 0 {
            return Err(LoadProgramError::ProgramOddByteCount {
                byte_count: bytes.len(),
            });
        }
        let mut words = vec![0u16; bytes.len() / 2];
        BigEndian::read_u16_into(bytes, &mut words);
        self.load_program(&words)
    }

    /// Loads a program whose first word is the `.ORIG` header giving the load address.
    ///
    /// Memory is only changed if the whole program fits.
    ///
    /// # Errors
    /// - Program is missing valid .ORIG header (because it is shorter than one `u16` instruction)
    /// - Program too long
    pub fn load_program(&mut self, program: &[u16]) -> Result<(), LoadProgramError> {
        let Some((origin, rest)) = program.split_first() else {
            return Err(LoadProgramError::ProgramMissingOrigHeader);
        };
        self.memory.load_program(*origin, rest)?;
        tracing::info!(
            "Loaded {} words at {origin:#06X}..{:#06X}",
            rest.len(),
            usize::from(*origin) + rest.len()
        );
        Ok(())
    }

    /// Runs from the current PC until HALT.
    ///
    /// # Errors
    /// - unimplemented opcode or trap vector
    /// - console input or output failed
    /// - the user interrupted execution
    pub fn execute(&mut self) -> Result<(), ExecutionError> {
        self.is_halted = false;
        let mut until_interrupt_check = INTERRUPT_CHECK_INTERVAL;
        loop {
            until_interrupt_check -= 1;
            if until_interrupt_check == 0 {
                until_interrupt_check = INTERRUPT_CHECK_INTERVAL;
                if self.memory.console_mut().is_interrupted() {
                    tracing::info!("Interrupted at {:?}", self.registers.pc());
                    return Err(ExecutionError::Interrupted);
                }
            }
            if let ControlFlow::Break(res) = self.step() {
                return res;
            }
        }
    }

    /// Fetches, decodes and executes exactly one instruction.
    ///
    /// Breaks with `Ok(())` when the program halted.
    pub fn step(&mut self) -> ControlFlow<Result<(), ExecutionError>> {
        let address = self.registers.pc().as_binary();
        let i = Instruction::from(self.memory.read(address));
        self.registers.inc_pc();
        tracing::trace!("{address:#06X}: {i:?}");
        let res = self.dispatch(i, address);
        match &res {
            ControlFlow::Break(Ok(())) => {
                self.is_halted = true;
                tracing::debug!("Program halted at {address:#06X}");
            }
            ControlFlow::Break(Err(e)) => tracing::debug!("Execution stopped: {e}"),
            ControlFlow::Continue(()) => {}
        }
        res
    }

    fn dispatch(&mut self, i: Instruction, address: u16) -> ControlFlow<Result<(), ExecutionError>> {
        let r = &mut self.registers;
        let m = &mut self.memory;
        match i.op_code() {
            Opcode::Br => opcodes::br(i, r),
            Opcode::Add => opcodes::add(i, r),
            Opcode::Ld => opcodes::ld(i, r, m),
            Opcode::St => opcodes::st(i, r, m),
            Opcode::Jsr => opcodes::jsr(i, r),
            Opcode::And => opcodes::and(i, r),
            Opcode::Ldr => opcodes::ldr(i, r, m),
            Opcode::Str => opcodes::str(i, r, m),
            Opcode::Not => opcodes::not(i, r),
            Opcode::Ldi => opcodes::ldi(i, r, m),
            Opcode::Sti => opcodes::sti(i, r, m),
            Opcode::Jmp => opcodes::jmp_or_ret(i, r),
            Opcode::Lea => opcodes::lea(i, r),
            Opcode::Trap => return trap_routines::trap(i, r, m),
            op @ (Opcode::Rti | Opcode::Res) => {
                return ControlFlow::Break(Err(ExecutionError::UnimplementedOpcode {
                    opcode: op as u8,
                    address,
                }));
            }
        }
        ControlFlow::Continue(())
    }

    /// Sets the registers to their initial state, memory stays untouched.
    pub fn reset_registers(&mut self) {
        self.registers = Registers::new();
        self.is_halted = false;
    }
    #[must_use]
    pub const fn is_halted(&self) -> bool {
        self.is_halted
    }
    #[must_use]
    pub const fn registers(&self) -> &Registers {
        &self.registers
    }
    pub const fn registers_mut(&mut self) -> &mut Registers {
        &mut self.registers
    }
    #[must_use]
    pub const fn memory(&self) -> &Memory<C> {
        &self.memory
    }
    pub const fn memory_mut(&mut self) -> &mut Memory<C> {
        &mut self.memory
    }
    #[must_use]
    pub const fn console(&self) -> &C {
        self.memory.console()
    }
    pub const fn console_mut(&mut self) -> &mut C {
        self.memory.console_mut()
    }
}
