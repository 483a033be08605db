//! # LC-3 Virtual Machine.
//!
//! `lc3-vm` runs assembled programs for the Little Computer 3, a 16-bit teaching architecture.
//! Usage starts with loading a program image via [`emulator::Emulator::load_image_file`] and
//! running it with [`emulator::Emulator::execute`].
//!
//!  # Example
//! ```
//! use lc3_vm::emulator::Emulator;
//! use lc3_vm::hardware::BufferedConsole;
//! let mut emu = Emulator::with_console(BufferedConsole::new());
//! // .ORIG x3000; ADD R0, R0, #5; OUT; HALT
//! emu.load_program(&[0x3000, 0x1025, 0xF021, 0xF025]).unwrap();
//! emu.execute().unwrap();
//! assert_eq!(emu.console().output(), b"\x05HALT\n");
//! ```
//! # Errors
//! - Program is missing valid .ORIG header (because it is shorter than one `u16` instruction
//! - Program too long to fit behind its load address
//! - Unimplemented opcode or trap vector during execution

pub mod emulator;
pub mod errors;
pub mod hardware;
pub(crate) mod numbers;
pub mod terminal;
