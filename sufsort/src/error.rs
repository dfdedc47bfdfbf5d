// Copyright 2024 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// An error indicating that sorting the suffixes of a text failed.
///
/// # Examples
///
/// ```
/// use sufsort::SortError;
///
/// let mut suffixes = [0; 3];
/// let result = sufsort::sort_into(b"banana", &mut suffixes);
///
/// assert!(matches!(
///     result,
///     Err(SortError::LengthMismatch { text: 6, suffixes: 3 }),
/// ));
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SortError {
    /// The output buffer is not the same length as the text
    LengthMismatch {
        /// The length of the text
        text: usize,
        /// The length of the output buffer
        suffixes: usize,
    },
    /// The text is longer than [`i32::MAX`] bytes
    TooLong(usize),
    /// The finished suffix array failed verification
    Verification(VerifyError),
}

impl Display for SortError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            SortError::LengthMismatch { text, suffixes } => write!(
                f,
                "length mismatch: text has {text} bytes but buffer holds {suffixes} suffixes",
            ),
            SortError::TooLong(len) => {
                write!(f, "text too long: {len} bytes exceeds the limit of {}", i32::MAX)
            }
            SortError::Verification(e) => write!(f, "verification failed: {e}"),
        }
    }
}

impl Error for SortError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SortError::Verification(e) => Some(e),
            _ => None,
        }
    }
}

impl From<VerifyError> for SortError {
    fn from(value: VerifyError) -> Self {
        SortError::Verification(value)
    }
}

/// An error describing the first defect [`verify()`](crate::verify) found in a suffix array.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum VerifyError {
    /// The suffix array is not the same length as the text
    LengthMismatch {
        /// The length of the text
        text: usize,
        /// The length of the suffix array
        suffixes: usize,
    },
    /// An entry does not name a position in the text
    OutOfRange {
        /// The index of the entry
        index: usize,
        /// The value of the entry
        value: u32,
    },
    /// Two neighboring suffixes are out of order by their first byte
    NotSorted {
        /// The index of the later of the two entries
        index: usize,
    },
    /// A suffix is missing from the position its successor's entry says it must occupy
    BucketMismatch {
        /// The index of the successor's entry
        index: usize,
        /// The misplaced suffix
        suffix: u32,
    },
}

impl Display for VerifyError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            VerifyError::LengthMismatch { text, suffixes } => write!(
                f,
                "length mismatch: text has {text} bytes but array holds {suffixes} suffixes",
            ),
            VerifyError::OutOfRange { index, value } => {
                write!(f, "entry {index} is out of range: {value}")
            }
            VerifyError::NotSorted { index } => {
                write!(f, "suffixes at {} and {index} are out of order", index - 1)
            }
            VerifyError::BucketMismatch { index, suffix } => {
                write!(f, "suffix {suffix}, preceding entry {index}, is out of place")
            }
        }
    }
}

impl Error for VerifyError {}
