use displaydoc::Display;
use std::error::Error;

/// Errors while loading a program image into memory.
#[derive(Display, Debug, Clone, PartialEq, Eq)]
pub enum LoadProgramError {
    /// Program is missing valid .ORIG header
    ProgramMissingOrigHeader,
    /// Program has an odd byte count of {byte_count}, it must consist of whole u16 words
    ProgramOddByteCount { byte_count: usize },
    /// Program too long, got {actual_instructions} u16 instructions while limit is {maximum_instructions} when loaded at {origin:#06X}
    ProgramTooLong {
        actual_instructions: usize,
        maximum_instructions: usize,
        origin: u16,
    },
    /// Error reading program image {path}: {message}
    Io { path: String, message: String },
}
impl Error for LoadProgramError {}

/// Fatal errors which end program execution.
#[derive(Display, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// Unimplemented opcode {opcode:#06b} at address {address:#06X}
    UnimplementedOpcode { opcode: u8, address: u16 },
    /// Unimplemented trap vector {vector:#04X} at address {address:#06X}
    UnimplementedTrapVector { vector: u8, address: u16 },
    /// Error during console input or output: {0}
    IOInputOutputError(String),
    /// Execution interrupted by user
    Interrupted,
}
impl Error for ExecutionError {}

impl ExecutionError {
    /// Process exit code reported by the command line binary for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Interrupted => 130,
            Self::UnimplementedOpcode { .. }
            | Self::UnimplementedTrapVector { .. }
            | Self::IOInputOutputError(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;

    #[gtest]
    fn test_messages() {
        expect_that!(
            LoadProgramError::ProgramTooLong {
                actual_instructions: 3,
                maximum_instructions: 2,
                origin: 0xFFFE
            }
            .to_string(),
            eq("Program too long, got 3 u16 instructions while limit is 2 when loaded at 0xFFFE")
        );
        expect_that!(
            ExecutionError::UnimplementedOpcode {
                opcode: 0b1101,
                address: 0x3000
            }
            .to_string(),
            eq("Unimplemented opcode 0b1101 at address 0x3000")
        );
        expect_that!(
            ExecutionError::UnimplementedTrapVector {
                vector: 0x26,
                address: 0x3001
            }
            .to_string(),
            eq("Unimplemented trap vector 0x26 at address 0x3001")
        );
    }

    #[gtest]
    fn test_exit_codes() {
        expect_that!(ExecutionError::Interrupted.exit_code(), eq(130));
        expect_that!(
            ExecutionError::IOInputOutputError(String::from("broken pipe")).exit_code(),
            eq(1)
        );
    }
}
