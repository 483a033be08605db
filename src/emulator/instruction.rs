use crate::numbers::sign_extend;
use std::fmt::{Debug, Formatter};

/// The 16 LC-3 opcodes, encoded in bits `[15:12]` of an instruction.
#[repr(u8)]
#[derive(enumn::N, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Opcode {
    /// Conditional branch
    Br = 0b0000,
    Add = 0b0001,
    /// Load
    Ld = 0b0010,
    /// Store
    St = 0b0011,
    /// Jump to subroutine, `JSR` and `JSRR`
    Jsr = 0b0100,
    And = 0b0101,
    /// Load base + offset
    Ldr = 0b0110,
    /// Store base + offset
    Str = 0b0111,
    /// Return from interrupt, unsupported
    Rti = 0b1000,
    Not = 0b1001,
    /// Load indirect
    Ldi = 0b1010,
    /// Store indirect
    Sti = 0b1011,
    /// Jump, `RET` is `JMP R7`
    Jmp = 0b1100,
    /// Reserved, unsupported
    Res = 0b1101,
    /// Load effective address
    Lea = 0b1110,
    Trap = 0b1111,
}

/// Wrapper for LC-3 u16 instruction.
/// format is: `OOOO_DDD_P_PPPP_PPPP`
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Instruction(u16);

impl Instruction {
    /// Gives the value of only the specified bit range.
    ///
    /// # Parameters
    /// - `from`: starting index
    /// - `to`: end index (inclusive), mut be greater or equal to `from`
    ///
    /// # Panics
    /// - asserts that to is greater or equal from and both are valid indexes
    #[must_use]
    pub fn get_bit_range(self, from: u8, to: u8) -> u16 {
        debug_assert!(
            to >= from,
            "wrong direction of from: {from:?} and to: {to:?}"
        );
        debug_assert!(
            (0..u16::BITS).contains(&u32::from(to)),
            "index: {to:?} to u16 is greater than maximum value {:?}",
            u16::BITS - 1
        );
        let width = u32::from(to - from + 1);
        (self.0 >> from) & (((1u32 << width) - 1) as u16)
    }
    /// Gives the value of a bit range of at most 8 bits as u8.
    /// See [`Instruction::get_bit_range()`]
    #[must_use]
    pub fn get_bit_range_u8(self, from: u8, to: u8) -> u8 {
        debug_assert!(to - from < 8, "bit range {from}..={to} does not fit into u8");
        #[expect(
            clippy::cast_possible_truncation,
            reason = "range is at most 8 bits wide"
        )]
        {
            self.get_bit_range(from, to) as u8
        }
    }
    #[must_use]
    pub fn get_bit(self, index: u8) -> bool {
        self.get_bit_range(index, index) & 1 != 0
    }
    #[must_use]
    pub fn op_code(self) -> Opcode {
        Opcode::n(self.get_bit_range_u8(12, 15))
            .unwrap_or_else(|| unreachable!("every 4 bit value is an opcode"))
    }
    /// Destination register, for `ST`, `STI` and `STR` this is the source register.
    #[must_use]
    pub fn dr_number(self) -> u8 {
        self.get_bit_range_u8(9, 11)
    }
    #[must_use]
    pub fn sr1_number(self) -> u8 {
        self.get_bit_range_u8(6, 8)
    }
    #[must_use]
    pub fn sr2_number(self) -> u8 {
        self.get_bit_range_u8(0, 2)
    }
    /// Base register of `JMP`, `JSRR`, `LDR` and `STR`, same bits as SR1.
    #[must_use]
    pub fn base_r_number(self) -> u8 {
        self.sr1_number()
    }
    #[must_use]
    pub fn is_immediate(self) -> bool {
        self.get_bit(5)
    }
    /// Sign extended `imm5`.
    #[must_use]
    pub fn get_immediate(self) -> u16 {
        sign_extend(self.get_bit_range(0, 4), 5)
    }
    /// Offset of the lowest `len` bits, sign extended to be added with wrap around to PC or a
    /// base register.
    #[must_use]
    pub fn pc_offset(self, len: u8) -> u16 {
        sign_extend(self.get_bit_range(0, len - 1), len)
    }
    /// The `nzp` condition bits of `BR`.
    #[must_use]
    pub fn nzp(self) -> u16 {
        self.get_bit_range(9, 11)
    }
    #[must_use]
    pub fn trap_vector(self) -> u8 {
        self.get_bit_range_u8(0, 7)
    }
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }
}

impl Debug for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} {:#06X}: DR: {:03b}, PC_Off: {:09b}",
            self.op_code(),
            self.0,
            self.dr_number(),
            self.get_bit_range(0, 8)
        )
    }
}

impl From<u16> for Instruction {
    fn from(bits: u16) -> Self {
        Self(bits)
    }
}
