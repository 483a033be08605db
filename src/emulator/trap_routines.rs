//! Built-in I/O routines selected by the trap vector of the `TRAP` opcode.
use crate::emulator::instruction::Instruction;
use crate::errors::ExecutionError;
use crate::hardware::console::Console;
use crate::hardware::memory::Memory;
use crate::hardware::registers::{Registers, from_binary};
use std::io;
use std::ops::ControlFlow;

/// Trap vectors, the low byte of a `TRAP` instruction.
#[repr(u8)]
#[derive(enumn::N, Debug, Copy, Clone, PartialEq, Eq)]
pub enum TrapVector {
    /// Get character from keyboard, not echoed onto the terminal
    Getc = 0x20,
    /// Output a character
    Out = 0x21,
    /// Output a word string
    Puts = 0x22,
    /// Get character from keyboard, echoed onto the terminal
    In = 0x23,
    /// Output a byte string
    Putsp = 0x24,
    Halt = 0x25,
}

pub const IN_PROMPT: &str = "Enter a character: ";
pub const HALT_MESSAGE: &str = "HALT\n";

/// TRAP: saves PC in R7 and runs the trap routine selected by `trapvect8`.
/// ```text
///  15__12__11__8__7_______0_
/// | 1111 | 0000 | trapvect8 |
///  -------------------------
/// ```
pub fn trap<C: Console>(
    i: Instruction,
    regs: &mut Registers,
    mem: &mut Memory<C>,
) -> ControlFlow<Result<(), ExecutionError>> {
    regs.set(7, regs.pc());
    let Some(vector) = TrapVector::n(i.trap_vector()) else {
        return ControlFlow::Break(Err(ExecutionError::UnimplementedTrapVector {
            vector: i.trap_vector(),
            address: regs.pc().as_binary().wrapping_sub(1),
        }));
    };
    tracing::trace!("trap {vector:?}");
    match vector {
        TrapVector::Getc => get_c(regs, mem.console_mut()),
        TrapVector::Out => out(regs, mem.console_mut()),
        TrapVector::Puts => put_s(regs, mem),
        TrapVector::In => in_trap(regs, mem.console_mut()),
        TrapVector::Putsp => put_sp(regs, mem),
        TrapVector::Halt => halt(mem.console_mut()),
    }
}

fn read_character_from_console(
    regs: &mut Registers,
    console: &mut impl Console,
) -> ControlFlow<Result<(), ExecutionError>, u8> {
    match console.read_blocking() {
        Ok(b) => {
            regs.set(0, from_binary(u16::from(b)));
            ControlFlow::Continue(b)
        }
        Err(e) => wrap_io_error_in_cf(&e),
    }
}

/// GETC: Read a single character from the keyboard. The character is not echoed onto the console.
///
/// Its ASCII code is copied into R0. The high eight bits of R0 are cleared.
pub fn get_c(
    regs: &mut Registers,
    console: &mut impl Console,
) -> ControlFlow<Result<(), ExecutionError>> {
    read_character_from_console(regs, console)?;
    ControlFlow::Continue(())
}

/// IN: Print a prompt on the screen and read a single character echoed back from the keyboard.
///
/// Otherwise, like 0x20 GETC.
pub fn in_trap(
    regs: &mut Registers,
    console: &mut impl Console,
) -> ControlFlow<Result<(), ExecutionError>> {
    write_out(IN_PROMPT.bytes(), console)?;
    let c = read_character_from_console(regs, console)?;
    write_out([c], console)
}

/// OUT: Write a character in R0[7:0] to the console display.
pub fn out(regs: &Registers, console: &mut impl Console) -> ControlFlow<Result<(), ExecutionError>> {
    let [low, _high] = regs.get(0).as_binary().to_le_bytes();
    write_out([low], console)
}

fn one_char_per_u16(input: u16) -> impl Iterator<Item = u8> {
    let [low, _high] = input.to_le_bytes();
    std::iter::once(low)
}

fn two_chars_per_u16(input: u16) -> impl Iterator<Item = u8> {
    let [low, high] = input.to_le_bytes();
    std::iter::once(low).chain((high != 0).then_some(high))
}

fn put<C: Console, I: Iterator<Item = u8>>(
    regs: &Registers,
    mem: &mut Memory<C>,
    handle_char: fn(u16) -> I,
) -> ControlFlow<Result<(), ExecutionError>> {
    let address = regs.get(0).as_binary();
    let bytes: Vec<u8> = mem.null_terminated(address).flat_map(handle_char).collect();
    write_out(bytes, mem.console_mut())
}

/// PUTS: print null-delimited string, one character per word, from register 0's address.
pub fn put_s(
    regs: &Registers,
    mem: &mut Memory<impl Console>,
) -> ControlFlow<Result<(), ExecutionError>> {
    put(regs, mem, one_char_per_u16)
}

/// PUTSP: Packed version of PUTS
///
/// The ASCII code contained in bits [7:0] of a memory location is written to the console first.
/// The second character of the last memory location can be 0x00.
/// Writing terminates with a 0x000 char.
pub fn put_sp(
    regs: &Registers,
    mem: &mut Memory<impl Console>,
) -> ControlFlow<Result<(), ExecutionError>> {
    put(regs, mem, two_chars_per_u16)
}

/// HALT: End program and print a message
pub fn halt(console: &mut impl Console) -> ControlFlow<Result<(), ExecutionError>> {
    write_out(HALT_MESSAGE.bytes(), console)?;
    ControlFlow::Break(Ok(()))
}

fn write_out(
    bytes: impl IntoIterator<Item = u8>,
    console: &mut impl Console,
) -> ControlFlow<Result<(), ExecutionError>> {
    match bytes
        .into_iter()
        .try_for_each(|b| console.write_byte(b))
        .and_then(|()| console.flush())
    {
        Ok(()) => ControlFlow::Continue(()),
        Err(e) => wrap_io_error_in_cf(&e),
    }
}

fn wrap_io_error_in_cf<T>(error: &io::Error) -> ControlFlow<Result<(), ExecutionError>, T> {
    if error.kind() == io::ErrorKind::Interrupted {
        return ControlFlow::Break(Err(ExecutionError::Interrupted));
    }
    ControlFlow::Break(Err(ExecutionError::IOInputOutputError(error.to_string())))
}
