// Copyright 2024 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

/// The suffix sorting algorithm to run.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum Algorithm {
    /// Two-stage induced sorting of B* suffixes with tandem repeat resolution.
    ///
    /// This runs in the output buffer plus a fixed amount of bucket space and is the fastest
    /// choice for typical data.
    #[default]
    DivSufSort,
    /// Recursive induced sorting of LMS substrings.
    ///
    /// This is linear time in the worst case but allocates working space proportional to the text.
    Sais,
}

/// Configuration for a sort operation.
///
/// The defaults are right for nearly every use. Verification is meant for testing and doubles the
/// number of passes over the output.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct SortConfig {
    pub(crate) algorithm: Algorithm,
    pub(crate) verify: bool,
}

impl SortConfig {
    /// Creates a new configuration for sort operations
    ///
    /// This configuration can be reused across sort operations.
    pub const fn new() -> Self {
        Self {
            algorithm: Self::DEFAULT_ALGORITHM,
            verify: Self::DEFAULT_VERIFY,
        }
    }

    /// Sets the algorithm used to sort suffixes.
    ///
    /// Every algorithm produces the same suffix array.
    pub fn algorithm(&mut self, algorithm: Algorithm) -> &mut Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets whether to check the finished suffix array before returning it.
    ///
    /// A failed check is reported as [`SortError::Verification`](crate::SortError::Verification).
    pub fn verify(&mut self, verify: bool) -> &mut Self {
        self.verify = verify;
        self
    }

    /// The default sorting algorithm
    pub const DEFAULT_ALGORITHM: Algorithm = Algorithm::DivSufSort;

    /// Whether to verify results by default
    ///
    /// Verification is off because a correct sort never fails it.
    pub const DEFAULT_VERIFY: bool = false;
}

impl Default for SortConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_chain() {
        let mut config = SortConfig::new();
        config.algorithm(Algorithm::Sais).verify(true);

        assert_eq!(config.algorithm, Algorithm::Sais);
        assert!(config.verify);
    }

    #[test]
    fn default_matches_new() {
        assert_eq!(SortConfig::default(), SortConfig::new());
        assert_eq!(SortConfig::new().algorithm, Algorithm::default());
    }
}
