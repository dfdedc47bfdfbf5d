// Copyright 2023-2024 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

//! Suffix array construction for byte strings.
//!
//! The suffix array of a text of length *n* lists the starting positions `0..n` of its suffixes in
//! lexicographic order, where a proper prefix sorts before any longer string it begins. Any byte
//! string can be sorted, including one with interior or trailing zeros; no terminator is needed.
//!
//! # Examples
//!
//! ```
//! let suffixes = sufsort::sort(b"banana")?;
//! assert_eq!(suffixes, [5, 3, 1, 0, 4, 2]);
//! # Ok::<(), sufsort::SortError>(())
//! ```
//!
//! Sorting into an existing buffer avoids allocating:
//!
//! ```
//! let mut suffixes = [0; 6];
//! sufsort::sort_into(b"banana", &mut suffixes)?;
//! assert_eq!(suffixes, [5, 3, 1, 0, 4, 2]);
//! # Ok::<(), sufsort::SortError>(())
//! ```

mod check;
mod config;
mod divsufsort;
mod error;
mod sais;
mod strategy;
mod suffix_array;
mod trace;

pub use check::verify;
pub use config::{Algorithm, SortConfig};
pub use error::{SortError, VerifyError};
pub use suffix_array::{Match, SuffixArray};

/// The longest text that can be sorted
const MAX_LEN: usize = i32::MAX as usize;

/// Returns the suffix array of `text`.
///
/// This operation is *O*(*n* log *n*) in the worst case and close to linear on typical data.
///
/// # Errors
///
/// Returns [`SortError::TooLong`] if `text` is longer than [`i32::MAX`] bytes.
pub fn sort(text: &[u8]) -> Result<Vec<u32>, SortError> {
    sort_with_config(text, &SortConfig::new())
}

/// Returns the suffix array of `text`, sorted as `config` directs.
///
/// # Errors
///
/// Returns [`SortError::TooLong`] if `text` is longer than [`i32::MAX`] bytes, or
/// [`SortError::Verification`] if verification is enabled and fails.
///
/// # Examples
///
/// ```
/// use sufsort::{Algorithm, SortConfig};
///
/// let mut config = SortConfig::new();
/// config.algorithm(Algorithm::Sais).verify(true);
///
/// let suffixes = sufsort::sort_with_config(b"mississippi", &config)?;
/// assert_eq!(suffixes, [10, 7, 4, 1, 0, 9, 8, 6, 3, 5, 2]);
/// # Ok::<(), sufsort::SortError>(())
/// ```
pub fn sort_with_config(text: &[u8], config: &SortConfig) -> Result<Vec<u32>, SortError> {
    if text.len() > MAX_LEN {
        return Err(SortError::TooLong(text.len()));
    }

    let mut suffixes = vec![0; text.len()];
    sort_into_with_config(text, &mut suffixes, config)?;

    Ok(suffixes)
}

/// Writes the suffix array of `text` into `suffixes`.
///
/// With the default algorithm, no memory beyond a fixed amount of bucket space is allocated.
///
/// # Errors
///
/// Returns [`SortError::LengthMismatch`] if `suffixes` is not the same length as `text` and
/// [`SortError::TooLong`] if `text` is longer than [`i32::MAX`] bytes. `suffixes` is left untouched
/// in both cases.
pub fn sort_into(text: &[u8], suffixes: &mut [u32]) -> Result<(), SortError> {
    sort_into_with_config(text, suffixes, &SortConfig::new())
}

/// Writes the suffix array of `text` into `suffixes`, sorted as `config` directs.
///
/// # Errors
///
/// Returns the errors of [`sort_into()`], and [`SortError::Verification`] if verification is
/// enabled and fails.
pub fn sort_into_with_config(
    text: &[u8],
    suffixes: &mut [u32],
    config: &SortConfig,
) -> Result<(), SortError> {
    if text.len() != suffixes.len() {
        return Err(SortError::LengthMismatch {
            text: text.len(),
            suffixes: suffixes.len(),
        });
    }
    if text.len() > MAX_LEN {
        return Err(SortError::TooLong(text.len()));
    }

    config.algorithm.sorter().sort(text, suffixes);

    if config.verify {
        verify(text, suffixes)?;
    }

    Ok(())
}
