/// Implements sign extension as described at [Sign extension](https://en.wikipedia.org/wiki/Sign_extension).
///
/// Only the lowest `valid_bits` bits of `bits` are considered, their most significant bit is
/// replicated into all higher bits of the result.
///
/// # Panics
/// - asserts in debug builds that `valid_bits` is in `1..=16`
#[must_use]
pub const fn sign_extend(bits: u16, valid_bits: u8) -> u16 {
    debug_assert!(valid_bits >= 1 && valid_bits <= 16, "invalid bit width");
    if valid_bits == 16 {
        return bits;
    }
    let bits = bits & ((1 << valid_bits) - 1);
    if (bits >> (valid_bits - 1)) & 1 == 1 {
        // negative: 1-extend
        bits | (0xFFFF << valid_bits)
    } else {
        // positive, already 0-extended
        bits
    }
}
