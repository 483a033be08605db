//! The LC-3 machine state: register file, memory and the attached console device.
pub mod console;
pub mod memory;
pub mod registers;

pub use console::{BufferedConsole, Console, TerminalConsole};
pub use memory::{MEMORY_SIZE, Memory, MemoryMappedIOLocations, PROGRAM_SECTION_START};
pub use registers::{ConditionFlag, Register, Registers};
