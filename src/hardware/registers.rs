use crate::hardware::memory::PROGRAM_SECTION_START;
use std::fmt::{Debug, Formatter};

/// A single 16-bit register value, viewable as unsigned binary or as 2's complement decimal.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub struct Register(u16);

impl Register {
    #[must_use]
    pub const fn from_binary(value: u16) -> Self {
        Self(value)
    }
    #[must_use]
    pub const fn from_decimal(value: i16) -> Self {
        Self(value.cast_unsigned())
    }
    #[must_use]
    pub const fn as_binary(self) -> u16 {
        self.0
    }
    #[must_use]
    pub const fn as_decimal(self) -> i16 {
        self.0.cast_signed()
    }
}
impl Debug for Register {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#06X} ({})", self.as_binary(), self.as_decimal())
    }
}

#[must_use]
pub const fn from_binary(value: u16) -> Register {
    Register::from_binary(value)
}
#[must_use]
pub const fn from_decimal(value: i16) -> Register {
    Register::from_decimal(value)
}

/// Condition flags, exactly one of them is set at any time.
#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConditionFlag {
    /// Positive
    Pos = 1 << 0,
    Zero = 1 << 1,
    /// Negative
    Neg = 1 << 2,
}

impl From<Register> for ConditionFlag {
    fn from(value: Register) -> Self {
        if value.as_binary() == 0 {
            Self::Zero
        } else if value.as_binary() >> 15 == 1 {
            // leftmost bit is 1 for negative numbers
            Self::Neg
        } else {
            Self::Pos
        }
    }
}
impl ConditionFlag {
    /// Bit pattern as stored in the `COND` register, matching the `nzp` bits of `BR`.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self as u16
    }
}

/// The LC-3 register file: `R0` to `R7`, program counter and condition register.
#[derive(Clone, PartialEq, Eq)]
pub struct Registers {
    general_purpose: [Register; 8],
    pc: Register,
    cond: ConditionFlag,
}
impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}
impl Debug for Registers {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (idx, r) in self.general_purpose.iter().enumerate() {
            write!(f, "R{idx}: {r:?}, ")?;
        }
        write!(f, "PC: {:?}, COND: {:?}", self.pc, self.cond)
    }
}

impl Registers {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            general_purpose: [Register(0); 8],
            pc: Register(PROGRAM_SECTION_START),
            cond: ConditionFlag::Zero,
        }
    }

    /// # Panics
    /// - `r` is not a valid general purpose register index `0..=7`
    #[must_use]
    pub fn get(&self, r: u8) -> Register {
        assert!(r <= 7, "Invalid general purpose register get: {r}");
        self.general_purpose[usize::from(r)]
    }
    /// # Panics
    /// - `r` is not a valid general purpose register index `0..=7`
    pub fn set(&mut self, r: u8, value: Register) {
        assert!(r <= 7, "Invalid general purpose register set: {r}");
        self.general_purpose[usize::from(r)] = value;
    }

    #[must_use]
    pub const fn pc(&self) -> Register {
        self.pc
    }
    pub const fn set_pc(&mut self, value: u16) {
        self.pc = Register(value);
    }
    /// Moves PC past the instruction just fetched, wrapping at the end of memory.
    pub const fn inc_pc(&mut self) {
        self.pc = Register(self.pc.0.wrapping_add(1));
    }

    #[must_use]
    pub const fn get_conditional_register(&self) -> ConditionFlag {
        self.cond
    }
    /// Derives the condition flag from `value`.
    pub fn set_flags(&mut self, value: Register) {
        self.cond = ConditionFlag::from(value);
    }
    /// Derives the condition flag from the current content of register `r`.
    pub fn update_conditional_register(&mut self, r: u8) {
        self.set_flags(self.get(r));
    }
}
