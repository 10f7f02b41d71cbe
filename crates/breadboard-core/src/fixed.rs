//! Fixed-point time and frequency values for the clock.

use fixed::types::I32F32;

/// Q32.32 fixed point. Used for frequencies in Hz and durations in seconds.
pub type Fixed64 = I32F32;

/// Convert an f64 to Fixed64. Use only for configuration and UI input.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64 for display.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// A host timer interval in milliseconds, as seconds.
#[inline]
pub fn millis(ms: u32) -> Fixed64 {
    Fixed64::from_num(ms) / 1000
}

/// Division that returns `None` on a zero divisor or overflow.
#[inline]
pub fn checked_div_64(a: Fixed64, b: Fixed64) -> Option<Fixed64> {
    a.checked_div(b)
}
