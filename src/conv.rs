// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Index conversion utilities
//!
//! Glyph and codepoint indices are stored as `u32`: text this crate lays out
//! never approaches `u32::MAX` codepoints and the smaller type halves the
//! size of the per-glyph tables.

use easy_cast::Cast;

/// Convert `usize` → `u32`, checked
#[inline]
pub(crate) fn to_u32(x: usize) -> u32 {
    x.cast()
}

/// Convert `u32` → `usize` (zero-extension)
#[inline]
pub(crate) fn to_usize(x: u32) -> usize {
    x.cast()
}
