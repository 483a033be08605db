use crate::errors::LoadProgramError;
use crate::hardware::console::Console;
use std::fmt::{Debug, Formatter};

/// Address the PC starts at and where user programs are conventionally loaded.
pub const PROGRAM_SECTION_START: u16 = 0x3000;
pub const MEMORY_SIZE: usize = 1 << 16;

/// Memory regions mapped to IO functionality.
#[repr(u16)]
#[derive(enumn::N, Debug, Copy, Clone, PartialEq, Eq)]
pub enum MemoryMappedIOLocations {
    /// Keyboard Status Register
    Kbsr = 0xFE00,
    /// Keyboard Data Register
    Kbdr = 0xFE02,
}

/// The LC-3 memory: 65536 words, addresses wrap around.
///
/// Reading the keyboard status register polls the attached [`Console`] for input without blocking.
pub struct Memory<C> {
    /// Index equals memory address
    data: Box<[u16]>,
    console: C,
    /// Set after a failed keyboard poll was logged, until polling works again
    poll_failed: bool,
}

impl<C> Debug for Memory<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let used = self.data.iter().filter(|w| **w != 0).count();
        write!(f, "Memory {{ non-zero words: {used} }}")
    }
}

impl<C: Console> Memory<C> {
    const KEYBOARD_STATUS_REGISTER_SET: u16 = 1 << 15;
    const KEYBOARD_STATUS_REGISTER_UNSET: u16 = 0;

    pub fn new(console: C) -> Self {
        Self {
            data: vec![0x0u16; MEMORY_SIZE].into_boxed_slice(),
            console,
            poll_failed: false,
        }
    }

    /// Reads a word, reading [`MemoryMappedIOLocations::Kbsr`] polls the keyboard first and
    /// updates both keyboard registers.
    pub fn read(&mut self, address: u16) -> u16 {
        if let Some(MemoryMappedIOLocations::Kbsr) = MemoryMappedIOLocations::n(address) {
            self.poll_keyboard();
        }
        self.data[usize::from(address)]
    }

    /// A failing keyboard reads as "no key", programs poll KBSR in tight loops so only the first
    /// failure in a row is logged.
    fn poll_keyboard(&mut self) {
        let polled = self.console.poll_input();
        let status = match polled {
            Ok(Some(c)) => {
                self.data[usize::from(MemoryMappedIOLocations::Kbdr as u16)] = u16::from(c);
                Self::KEYBOARD_STATUS_REGISTER_SET
            }
            Ok(None) => Self::KEYBOARD_STATUS_REGISTER_UNSET,
            Err(ref e) => {
                if !self.poll_failed {
                    tracing::warn!("Polling keyboard failed, treating it as no key pressed: {e}");
                }
                Self::KEYBOARD_STATUS_REGISTER_UNSET
            }
        };
        self.poll_failed = polled.is_err();
        self.data[usize::from(MemoryMappedIOLocations::Kbsr as u16)] = status;
    }
}

impl<C> Memory<C> {
    pub fn write(&mut self, address: u16, value: u16) {
        self.data[usize::from(address)] = value;
    }

    /// Reads a word without triggering any device side effects.
    #[must_use]
    pub fn peek(&self, address: u16) -> u16 {
        self.data[usize::from(address)]
    }

    /// Words starting at `address` up to but excluding the first zero word.
    ///
    /// The sequence ends at the end of memory, it never wraps around to address 0.
    pub fn null_terminated(&self, address: u16) -> impl Iterator<Item = u16> + '_ {
        self.data[usize::from(address)..]
            .iter()
            .copied()
            .take_while(|w| *w != 0)
    }

    /// Copies `words` into memory starting at `origin`.
    ///
    /// Nothing is written if the words do not fit in front of the end of memory.
    ///
    /// # Errors
    /// - Program too long
    pub fn load_program(&mut self, origin: u16, words: &[u16]) -> Result<(), LoadProgramError> {
        let maximum_instructions = MEMORY_SIZE - usize::from(origin);
        if words.len() > maximum_instructions {
            return Err(LoadProgramError::ProgramTooLong {
                actual_instructions: words.len(),
                maximum_instructions,
                origin,
            });
        }
        let start = usize::from(origin);
        self.data[start..start + words.len()].copy_from_slice(words);
        Ok(())
    }

    pub const fn console(&self) -> &C {
        &self.console
    }
    pub const fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }
}
