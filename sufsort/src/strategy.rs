// Copyright 2024 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

use crate::{Algorithm, divsufsort, sais};

/// A suffix sorting algorithm.
///
/// Implementations write the suffix array of `text` into `suffixes`, which the caller guarantees
/// is exactly `text.len()` entries long and that `text.len() <= i32::MAX`.
pub(crate) trait SuffixSorter {
    fn sort(&self, text: &[u8], suffixes: &mut [u32]);
}

pub(crate) struct DivSufSort;

impl SuffixSorter for DivSufSort {
    fn sort(&self, text: &[u8], suffixes: &mut [u32]) {
        // Every finished entry is below `i32::MAX`, so the two views agree on the result
        divsufsort::sort(text, bytemuck::cast_slice_mut(suffixes));
    }
}

pub(crate) struct Sais;

impl SuffixSorter for Sais {
    fn sort(&self, text: &[u8], suffixes: &mut [u32]) {
        sais::sais(text, suffixes);
    }
}

impl Algorithm {
    pub(crate) fn sorter(self) -> &'static dyn SuffixSorter {
        match self {
            Algorithm::DivSufSort => &DivSufSort,
            Algorithm::Sais => &Sais,
        }
    }
}
