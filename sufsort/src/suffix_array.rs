// Copyright 2023-2024 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

use crate::{SortConfig, SortError};

/// A suffix array for a byte string.
#[derive(Clone, Debug)]
pub struct SuffixArray<'a> {
    data: &'a [u8],
    inner: Vec<u32>,
}

/// The longest prefix of a pattern found in the data of a [`SuffixArray`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Match {
    position: usize,
    len: usize,
}

#[allow(clippy::len_without_is_empty)]
impl Match {
    /// Returns the position in the data where the match starts.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the number of bytes matched. This is never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }
}

impl<'a> SuffixArray<'a> {
    /// Creates a new `SuffixArray` for `data`.
    ///
    /// # Errors
    ///
    /// Returns [`SortError::TooLong`] if `data.len() > i32::MAX`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sufsort::SuffixArray;
    ///
    /// let data = b"Hello, world!";
    /// let sa = SuffixArray::new(data)?;
    /// assert_eq!(sa.len(), data.len());
    /// # Ok::<(), sufsort::SortError>(())
    /// ```
    pub fn new(data: &'a [u8]) -> Result<Self, SortError> {
        Self::with_config(data, &SortConfig::new())
    }

    /// Creates a new `SuffixArray` for `data`, sorted as `config` directs.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`sort_with_config()`](crate::sort_with_config).
    pub fn with_config(data: &'a [u8], config: &SortConfig) -> Result<Self, SortError> {
        let inner = crate::sort_with_config(data, config)?;

        Ok(Self { data, inner })
    }

    /// Returns the sorted suffix positions.
    #[must_use]
    pub fn as_slice(&self) -> &[u32] {
        &self.inner
    }

    /// Consumes the `SuffixArray`, returning the sorted suffix positions.
    #[must_use]
    pub fn into_inner(self) -> Vec<u32> {
        self.inner
    }

    /// Returns the number of suffixes, which is the length of the data.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the data is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns `true` if and only if `pattern` is contained in the associated data.
    ///
    /// This operation is *O*(*m* \* log(*n*)), where `m` is `pattern.len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sufsort::SuffixArray;
    ///
    /// let sa = SuffixArray::new(b"Hello, world!")?;
    /// assert!(sa.contains(b"world"));
    /// # Ok::<(), sufsort::SortError>(())
    /// ```
    #[must_use]
    pub fn contains(&self, pattern: &[u8]) -> bool {
        self.inner
            .binary_search_by(|&suffix| {
                self.data[suffix as usize..]
                    .iter()
                    .take(pattern.len())
                    .cmp(pattern.iter())
            })
            .is_ok()
    }

    /// Finds the longest prefix of `pattern` that occurs in the associated data.
    ///
    /// Returns `None` if not even the first byte of `pattern` occurs. When several positions share
    /// the longest match, any one of them may be returned.
    ///
    /// This operation is *O*(*m* \* log(*n*)), where `m` is `pattern.len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sufsort::SuffixArray;
    ///
    /// let sa = SuffixArray::new(b"banana")?;
    /// let found = sa.longest_match(b"nab").unwrap();
    ///
    /// assert_eq!(found.len(), 2);
    /// assert_eq!(&b"banana"[found.position()..][..2], b"na");
    /// # Ok::<(), sufsort::SortError>(())
    /// ```
    #[must_use]
    pub fn longest_match(&self, pattern: &[u8]) -> Option<Match> {
        // The longest common prefix is shared with a neighbor of where `pattern` would sort
        let index = self.inner.partition_point(|&suffix| &self.data[suffix as usize..] < pattern);
        let before = index
            .checked_sub(1)
            .map(|i| (i, common_prefix_len(self.suffix(i), pattern)));
        let after = (index < self.inner.len())
            .then(|| (index, common_prefix_len(self.suffix(index), pattern)));

        let (index, len) = match (before, after) {
            (Some(before), Some(after)) if after.1 > before.1 => after,
            (Some(before), _) => before,
            (None, after) => after?,
        };

        (len > 0).then(|| Match {
            position: self.inner[index] as usize,
            len,
        })
    }

    fn suffix(&self, index: usize) -> &[u8] {
        &self.data[self.inner[index] as usize..]
    }
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_one_match() {
        let data = b"Hello, world!";
        let sa = SuffixArray::new(data).unwrap();

        assert!(sa.contains(b"world"));
    }

    #[test]
    fn contains_two_matches() {
        let data = b"The quick brown fox jumped over the lazy dog because the fox was quick";
        let sa = SuffixArray::new(data).unwrap();

        assert!(sa.contains(b"fox"));
        assert!(sa.contains(b"quick"));
    }

    #[test]
    fn contains_no_matches() {
        let data = b"Now is the time for all good men to come to the aid of the party";
        let sa = SuffixArray::new(data).unwrap();

        assert!(!sa.contains(b"times"));
    }

    #[test]
    fn contains_across_zero_bytes() {
        let data = b"Hello, \0world!\0";
        let sa = SuffixArray::new(data).unwrap();

        assert!(sa.contains(b", \0w"));
        assert!(sa.contains(b"!\0"));
        assert!(!sa.contains(b"!\0\0"));
    }

    #[test]
    fn empty_data() {
        let sa = SuffixArray::new(b"").unwrap();

        assert!(sa.is_empty());
        assert!(!sa.contains(b"a"));
        assert_eq!(sa.longest_match(b"a"), None);
    }

    #[test]
    fn longest_match_prefers_longer_neighbor() {
        let sa = SuffixArray::new(b"banana").unwrap();

        assert_eq!(
            sa.longest_match(b"nab"),
            Some(Match {
                position: 4,
                len: 2
            }),
        );
    }

    #[test]
    fn longest_match_finds_whole_pattern() {
        let data = b"The quick brown fox jumped over the lazy dog";
        let sa = SuffixArray::new(data).unwrap();

        let found = sa.longest_match(b"lazy dog").unwrap();
        assert_eq!(found.position(), 36);
        assert_eq!(found.len(), 8);
    }

    #[test]
    fn longest_match_misses() {
        let sa = SuffixArray::new(b"banana").unwrap();

        assert_eq!(sa.longest_match(b"xyz"), None);
        assert_eq!(sa.longest_match(b""), None);
    }

    #[test]
    fn longest_match_past_a_shorter_suffix() {
        // The suffix "1" is a prefix of the pattern but sorts before "11"
        let data: [u8; 10] = [1, 2, 0, 1, 1, 2, 1, 2, 2, 1];
        let sa = SuffixArray::new(&data).unwrap();

        assert_eq!(
            sa.longest_match(&[1, 1]),
            Some(Match {
                position: 3,
                len: 2
            }),
        );
    }

    #[test]
    fn longest_match_agrees_with_exhaustive_search() {
        fn best_len(data: &[u8], pattern: &[u8]) -> usize {
            (0..data.len())
                .map(|i| common_prefix_len(&data[i..], pattern))
                .max()
                .unwrap_or(0)
        }

        let patterns: [&[u8]; 5] = [&[1, 1], &[0, 2, 1], &[2], &[1, 0, 1, 0], &[2, 2, 2]];

        // Every text of up to 6 bytes over a three-letter alphabet
        for len in 0..=6u32 {
            for code in 0..3usize.pow(len) {
                let data: Vec<u8> = (0..len)
                    .map(|i| (code / 3usize.pow(i) % 3) as u8)
                    .collect();
                let sa = SuffixArray::new(&data).unwrap();

                for pattern in patterns {
                    let found = sa.longest_match(pattern);
                    let expected = best_len(&data, pattern);

                    assert_eq!(found.map_or(0, |m| m.len()), expected, "{data:?} {pattern:?}");
                    if let Some(m) = found {
                        assert_eq!(
                            data[m.position()..][..m.len()],
                            pattern[..m.len()],
                            "{data:?} {pattern:?}",
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn single_suffix() {
        let sa = SuffixArray::new(b"q").unwrap();

        assert_eq!(sa.as_slice(), [0]);
        assert_eq!(
            sa.longest_match(b"qq"),
            Some(Match {
                position: 0,
                len: 1
            }),
        );
        assert_eq!(sa.into_inner(), vec![0]);
    }
}
