// Copyright 2023-2024 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

use crate::trace;

/// The representation of an empty value
const EMPTY: u32 = u32::MAX;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum CharType {
    L,
    S,
}

/// Computes the suffix array of `text` into `suffix_array` using the SA-IS algorithm.
///
/// The algorithm is implemented as described in the article Two Efficient Algorithms for Linear
/// Time Suffix Array Construction by Ge Nong, Sen Zhang and Wai Hong Chan. The text is treated as
/// if it were followed by a sentinel smaller than every byte, but that sentinel is never stored, so
/// arbitrary byte strings can be sorted as they are.
///
/// Unlike the divsufsort strategy, this allocates working space proportional to the text.
pub(crate) fn sais(text: &[u8], suffix_array: &mut [u32]) {
    sais_level(text, suffix_array, 256, 0);
}

fn sais_level<T>(text: &[T], suffix_array: &mut [u32], alphabet_size: usize, level: usize)
where
    T: Copy + Into<u32>,
{
    match text.len() {
        0 => return,
        1 => {
            suffix_array[0] = 0;
            return;
        }
        _ => (),
    }

    let types = classify(text);
    let bucket_sizes = get_bucket_sizes(text, alphabet_size);

    // Stage 1: Sort the LMS substrings
    put_substrings(suffix_array, text, &types, &bucket_sizes);
    induce_l(suffix_array, text, &types, &bucket_sizes);
    induce_s(suffix_array, text, &types, &bucket_sizes);

    // Stage 2: Name the sorted substrings and sort the reduced string of names
    let lms: Vec<u32> = (1..text.len())
        .filter(|&i| is_lms(&types, i))
        .map(|i| i as u32)
        .collect();
    let (reduced, name_count) = name_substrings(suffix_array, text, &types, &lms);
    trace::reduced(level, text.len(), lms.len(), name_count);

    let mut order = vec![0; lms.len()];
    if name_count < lms.len() {
        sais_level(&reduced, &mut order, name_count, level + 1);
    } else {
        // Every name is unique, so the names are the ranks
        for (i, &name) in reduced.iter().enumerate() {
            order[name as usize] = i as u32;
        }
    }
    for rank in &mut order {
        *rank = lms[*rank as usize];
    }

    // Stage 3: Induce the suffix array from the sorted LMS suffixes
    put_suffixes(suffix_array, text, &order, &bucket_sizes);
    induce_l(suffix_array, text, &types, &bucket_sizes);
    induce_s(suffix_array, text, &types, &bucket_sizes);
}

#[inline]
fn char_at<T>(text: &[T], i: usize) -> usize
where
    T: Copy + Into<u32>,
{
    text[i].into() as usize
}

fn classify<T>(text: &[T]) -> Vec<CharType>
where
    T: Copy + Into<u32>,
{
    // The last character is L-type because the implicit sentinel sorts below it
    let mut types = vec![CharType::L; text.len()];
    for i in (0..text.len() - 1).rev() {
        let (c, c1) = (char_at(text, i), char_at(text, i + 1));
        if c < c1 || (c == c1 && types[i + 1] == CharType::S) {
            types[i] = CharType::S;
        }
    }

    types
}

#[inline]
fn is_lms(types: &[CharType], i: usize) -> bool {
    0 < i && types[i] == CharType::S && types[i - 1] == CharType::L
}

fn get_bucket_sizes<T>(text: &[T], alphabet_size: usize) -> Vec<u32>
where
    T: Copy + Into<u32>,
{
    let mut sizes = vec![0; alphabet_size];
    for i in 0..text.len() {
        sizes[char_at(text, i)] += 1;
    }

    sizes
}

fn get_bucket_heads(bucket_sizes: &[u32]) -> Vec<u32> {
    bucket_sizes
        .iter()
        .scan(0, |sum, &size| {
            let head = *sum;
            *sum += size;
            Some(head)
        })
        .collect()
}

fn get_bucket_tails(bucket_sizes: &[u32]) -> Vec<u32> {
    bucket_sizes
        .iter()
        .scan(0, |sum, &size| {
            *sum += size;
            Some(*sum)
        })
        .collect()
}

/// Places the LMS suffixes at the ends of their buckets, in text order.
fn put_substrings<T>(suffix_array: &mut [u32], text: &[T], types: &[CharType], bucket_sizes: &[u32])
where
    T: Copy + Into<u32>,
{
    suffix_array.fill(EMPTY);

    let mut tails = get_bucket_tails(bucket_sizes);
    for i in (1..text.len()).rev() {
        if is_lms(types, i) {
            let c = char_at(text, i);
            tails[c] -= 1;
            suffix_array[tails[c] as usize] = i as u32;
        }
    }
}

/// Places the LMS suffixes, already sorted, at the ends of their buckets.
fn put_suffixes<T>(suffix_array: &mut [u32], text: &[T], sorted_lms: &[u32], bucket_sizes: &[u32])
where
    T: Copy + Into<u32>,
{
    suffix_array.fill(EMPTY);

    let mut tails = get_bucket_tails(bucket_sizes);
    for &i in sorted_lms.iter().rev() {
        let c = char_at(text, i as usize);
        tails[c] -= 1;
        suffix_array[tails[c] as usize] = i;
    }
}

fn induce_l<T>(suffix_array: &mut [u32], text: &[T], types: &[CharType], bucket_sizes: &[u32])
where
    T: Copy + Into<u32>,
{
    let n = text.len();
    let mut heads = get_bucket_heads(bucket_sizes);

    // The sentinel's predecessor is the last suffix, which sorts first in its bucket
    let c = char_at(text, n - 1);
    suffix_array[heads[c] as usize] = (n - 1) as u32;
    heads[c] += 1;

    for i in 0..n {
        let j = suffix_array[i];
        if j == EMPTY || j == 0 {
            continue;
        }

        let j = j as usize - 1;
        if types[j] == CharType::L {
            let c = char_at(text, j);
            suffix_array[heads[c] as usize] = j as u32;
            heads[c] += 1;
        }
    }
}

fn induce_s<T>(suffix_array: &mut [u32], text: &[T], types: &[CharType], bucket_sizes: &[u32])
where
    T: Copy + Into<u32>,
{
    let mut tails = get_bucket_tails(bucket_sizes);

    for i in (0..text.len()).rev() {
        let j = suffix_array[i];
        if j == EMPTY || j == 0 {
            continue;
        }

        let j = j as usize - 1;
        if types[j] == CharType::S {
            let c = char_at(text, j);
            tails[c] -= 1;
            suffix_array[tails[c] as usize] = j as u32;
        }
    }
}

/// Returns `true` if the LMS substrings starting at `a` and `b` are identical.
///
/// A substring that reaches the sentinel is unique, since nothing else contains the sentinel.
fn lms_substrings_equal<T>(text: &[T], types: &[CharType], a: usize, b: usize) -> bool
where
    T: Copy + Into<u32>,
{
    let n = text.len();
    let mut d = 0;
    loop {
        let (x, y) = (a + d, b + d);
        if x == n || y == n {
            return false;
        }
        if char_at(text, x) != char_at(text, y) || types[x] != types[y] {
            return false;
        }
        if 0 < d && is_lms(types, x) {
            return true;
        }

        d += 1;
    }
}

/// Names the LMS substrings by their rank among the distinct substrings and returns the names in
/// text order along with the number of distinct names.
fn name_substrings<T>(
    suffix_array: &[u32],
    text: &[T],
    types: &[CharType],
    lms: &[u32],
) -> (Vec<u32>, usize)
where
    T: Copy + Into<u32>,
{
    // No two LMS positions are adjacent, so halving them gives distinct slots
    let mut names = vec![EMPTY; text.len() / 2 + 1];
    let mut name_count = 0;
    let mut previous: Option<usize> = None;

    for &pos in suffix_array {
        let pos = pos as usize;
        if pos == EMPTY as usize || !is_lms(types, pos) {
            continue;
        }

        if previous.is_none_or(|prev| !lms_substrings_equal(text, types, prev, pos)) {
            name_count += 1;
        }
        names[pos / 2] = name_count - 1;
        previous = Some(pos);
    }

    let reduced = lms.iter().map(|&pos| names[pos as usize / 2]).collect();

    (reduced, name_count as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive(text: &[u8]) -> Vec<u32> {
        let mut sa: Vec<u32> = (0..text.len() as u32).collect();
        sa.sort_by(|&a, &b| text[a as usize..].cmp(&text[b as usize..]));
        sa
    }

    fn sorted(text: &[u8]) -> Vec<u32> {
        let mut sa = vec![0; text.len()];
        sais(text, &mut sa);
        sa
    }

    #[test]
    fn hello_world() {
        assert_eq!(
            sorted(b"Hello, world!"),
            vec![6, 12, 5, 0, 11, 1, 10, 2, 3, 4, 8, 9, 7],
        );
    }

    #[test]
    fn inner_zeros_need_no_special_handling() {
        assert_eq!(
            sorted(b"Hello, \0world!"),
            vec![7, 6, 13, 5, 0, 12, 1, 11, 2, 3, 4, 9, 10, 8],
        );
        assert_eq!(sorted(b"\0\0\0"), vec![2, 1, 0]);
    }

    #[test]
    fn tiny_inputs() {
        assert_eq!(sorted(b""), Vec::<u32>::new());
        assert_eq!(sorted(b"q"), vec![0]);
        assert_eq!(sorted(b"ab"), vec![0, 1]);
        assert_eq!(sorted(b"ba"), vec![1, 0]);
        assert_eq!(sorted(b"aa"), vec![1, 0]);
    }

    #[test]
    fn recursion_on_repeated_substrings() {
        for text in [
            b"mississippi".to_vec(),
            b"ab".repeat(64),
            b"abcab".repeat(40),
            b"aab".repeat(33),
        ] {
            assert_eq!(sorted(&text), naive(&text), "{}", text.escape_ascii());
        }
    }

    #[test]
    fn classify_marks_last_character_l() {
        let types = classify(b"abba");
        assert_eq!(types, vec![CharType::S, CharType::L, CharType::L, CharType::L]);

        let types = classify(b"baab");
        assert_eq!(types, vec![CharType::L, CharType::S, CharType::S, CharType::L]);
        assert!(is_lms(&types, 1), "position 1 follows an L-type");
        assert!(!is_lms(&types, 2), "position 2 follows an S-type");
    }

    #[test]
    fn substrings_reaching_the_end_are_unique() {
        // "cab|cab": LMS positions 1 and 4
        let text = b"cabcab";
        let types = classify(text);
        assert!(is_lms(&types, 1) && is_lms(&types, 4), "{types:?}");

        assert!(!lms_substrings_equal(text, &types, 1, 4));

        let text = b"cabcabcab";
        let types = classify(text);
        assert!(lms_substrings_equal(text, &types, 1, 4));
    }
}
