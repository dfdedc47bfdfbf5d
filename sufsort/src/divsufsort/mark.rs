// Copyright 2024 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

//! Status flags carried in the sign bit of suffix array entries.
//!
//! Every stage stores suffix indices as `i32`. Storing the bitwise complement of an index (which is
//! always negative) marks the entry without a separate status array. What a mark means is local to
//! the stage: "ties with its neighbor" while sorting substrings, "rank already final" while
//! resolving tandem repeats and "already induced" while building the final array.

/// Returns `true` if `value` holds a marked index.
#[inline]
pub(super) const fn is_marked(value: i32) -> bool {
    value < 0
}

/// Toggles the mark on `value`.
///
/// Applying this twice yields the original value.
#[inline]
pub(super) const fn flip(value: i32) -> i32 {
    !value
}

/// Returns the index stored in `value`, whether marked or not.
#[inline]
pub(super) const fn raw_index(value: i32) -> i32 {
    if is_marked(value) { flip(value) } else { value }
}
