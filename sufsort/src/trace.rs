// Copyright 2024 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

//! Stage boundary events, emitted through `tracing` when the `tracing` feature is enabled.

#[cfg(feature = "tracing")]
use tracing::debug;

/// Trace the end of suffix classification.
#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn classified(n: usize, m: usize) {
    debug!(
        target: "sufsort",
        stage = "classify",
        n = n,
        bstar = m,
        "classified {n} suffixes, {m} of type B*"
    );
}

#[cfg(not(feature = "tracing"))]
#[inline]
pub(crate) fn classified(_n: usize, _m: usize) {}

/// Trace the end of B* substring naming.
#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn named(m: usize, names: usize) {
    debug!(
        target: "sufsort",
        stage = "name",
        bstar = m,
        names = names,
        "gave {m} B* substrings {names} distinct names"
    );
}

#[cfg(not(feature = "tracing"))]
#[inline]
pub(crate) fn named(_m: usize, _names: usize) {}

/// Trace the end of tandem repeat resolution.
#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn resolved(m: usize, passes: usize) {
    debug!(
        target: "sufsort",
        stage = "resolve",
        bstar = m,
        passes = passes,
        "ranked {m} B* suffixes in {passes} doubling passes"
    );
}

#[cfg(not(feature = "tracing"))]
#[inline]
pub(crate) fn resolved(_m: usize, _passes: usize) {}

/// Trace the completion of the suffix array.
#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn induced(n: usize) {
    debug!(
        target: "sufsort",
        stage = "induce",
        n = n,
        "induced suffix array of length {n}"
    );
}

#[cfg(not(feature = "tracing"))]
#[inline]
pub(crate) fn induced(_n: usize) {}

/// Trace one level of SA-IS reduction.
#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn reduced(level: usize, n: usize, lms: usize, names: usize) {
    debug!(
        target: "sufsort",
        stage = "reduce",
        level = level,
        n = n,
        lms = lms,
        names = names,
        "level {level}: {lms} LMS substrings of {n} with {names} names"
    );
}

#[cfg(not(feature = "tracing"))]
#[inline]
pub(crate) fn reduced(_level: usize, _n: usize, _lms: usize, _names: usize) {}
