// Copyright 2024 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

use crate::error::VerifyError;

/// Checks that `suffixes` is the suffix array of `text`.
///
/// The check takes *O*(*n*) time and a fixed amount of extra space. Beyond checking that every
/// entry is in range and that first bytes never decrease, it walks the array in order and confirms
/// that each entry's predecessor suffix sits at the next free slot of its byte bucket. Together
/// these hold only for the one correct suffix array.
///
/// # Errors
///
/// Returns the first defect found.
///
/// # Examples
///
/// ```
/// use sufsort::VerifyError;
///
/// assert_eq!(sufsort::verify(b"banana", &[5, 3, 1, 0, 4, 2]), Ok(()));
/// assert_eq!(
///     sufsort::verify(b"banana", &[5, 3, 1, 0, 2, 4]),
///     Err(VerifyError::BucketMismatch { index: 0, suffix: 4 }),
/// );
/// ```
pub fn verify(text: &[u8], suffixes: &[u32]) -> Result<(), VerifyError> {
    let n = text.len();
    if suffixes.len() != n {
        return Err(VerifyError::LengthMismatch {
            text: n,
            suffixes: suffixes.len(),
        });
    }
    if n == 0 {
        return Ok(());
    }

    for (index, &value) in suffixes.iter().enumerate() {
        if n <= value as usize {
            return Err(VerifyError::OutOfRange { index, value });
        }
    }

    let first_byte = |index: usize| text[suffixes[index] as usize];
    for index in 1..n {
        if first_byte(index - 1) > first_byte(index) {
            return Err(VerifyError::NotSorted { index });
        }
    }

    // Bucket starts, with the final suffix taking the first slot of its bucket
    let mut starts = [0; 256];
    for &c in text {
        starts[usize::from(c)] += 1;
    }
    let mut sum = 0;
    for start in &mut starts {
        let count = *start;
        *start = sum;
        sum += count;
    }
    let tail = usize::from(text[n - 1]);
    let q = starts[tail];
    starts[tail] += 1;

    // A cursor is cleared once it runs past the end of its bucket
    let mut cursors = starts.map(Some);
    for (index, &s) in suffixes.iter().enumerate() {
        let (p, slot) = if s > 0 {
            let p = s as usize - 1;
            (p, cursors[usize::from(text[p])])
        } else {
            (n - 1, Some(q))
        };

        let Some(slot) = slot.filter(|&slot| suffixes.get(slot) == Some(&(p as u32))) else {
            return Err(VerifyError::BucketMismatch {
                index,
                suffix: p as u32,
            });
        };

        if slot != q {
            let c = text[p];
            let next = slot + 1;
            cursors[usize::from(c)] = (next < n && first_byte(next) == c).then_some(next);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_correct_arrays() {
        assert_eq!(verify(b"", &[]), Ok(()));
        assert_eq!(verify(b"a", &[0]), Ok(()));
        assert_eq!(verify(b"aaaa", &[3, 2, 1, 0]), Ok(()));
        assert_eq!(verify(b"banana", &[5, 3, 1, 0, 4, 2]), Ok(()));
        assert_eq!(
            verify(b"Hello, world!", &[6, 12, 5, 0, 11, 1, 10, 2, 3, 4, 8, 9, 7]),
            Ok(()),
        );
    }

    #[test]
    fn rejects_wrong_length() {
        assert_eq!(
            verify(b"abc", &[0, 1]),
            Err(VerifyError::LengthMismatch {
                text: 3,
                suffixes: 2
            }),
        );
    }

    #[test]
    fn rejects_out_of_range_entries() {
        assert_eq!(
            verify(b"abc", &[0, 3, 2]),
            Err(VerifyError::OutOfRange { index: 1, value: 3 }),
        );
    }

    #[test]
    fn rejects_unsorted_first_bytes() {
        assert_eq!(
            verify(b"banana", &[5, 3, 0, 1, 4, 2]),
            Err(VerifyError::NotSorted { index: 3 }),
        );
    }

    #[test]
    fn rejects_misordered_suffixes_within_a_bucket() {
        assert_eq!(
            verify(b"banana", &[5, 1, 3, 0, 4, 2]),
            Err(VerifyError::BucketMismatch { index: 4, suffix: 3 }),
        );
    }

    #[test]
    fn rejects_duplicates() {
        assert!(verify(b"aaaa", &[3, 2, 2, 0]).is_err());
    }
}
