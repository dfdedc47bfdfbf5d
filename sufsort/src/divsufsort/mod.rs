// Copyright 2024 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

//! Two-stage induced suffix sorting.
//!
//! Suffixes are classified by scanning the text from right to left. A suffix is type A if it is
//! lexicographically greater than its successor and type B otherwise; a type B suffix followed by
//! a type A suffix is type B*. Only the B* suffixes are sorted directly, first by their substrings
//! up to the next B* suffix ([`sssort`]) and then, where substrings tie, by rank doubling over the
//! resulting names ([`trsort`]). The order of every other suffix is then induced from the B*
//! suffixes in two linear scans.
//!
//! Some descriptions of this algorithm use the opposite naming. Here the letters follow bucket
//! order: within the bucket of a first byte, every type A suffix sorts before every type B suffix.
//!
//! The whole sort runs inside the output buffer plus two fixed-size bucket tables. While sorting,
//! the sign bit of a buffer entry is used as a mark (see [`mark`]).

mod mark;
mod select;
mod sssort;
mod stack;
mod tables;
mod trsort;

use crate::trace;
use mark::{flip, is_marked};

const ALPHABET_SIZE: usize = 256;

/// Hooks into the stages of a sort.
///
/// Every method has a no-op default. Sorting through [`sort`] uses `()`.
pub(crate) trait Observer {
    /// Called once the text of length `n` has been classified, with `m` type B* suffixes.
    fn classified(&mut self, _n: usize, _m: usize) {}

    /// Called once the `m` type B* substrings have been given `names` distinct names.
    fn named(&mut self, _m: usize, _names: usize) {}

    /// Called at the start of every rank doubling pass, comparing ranks `depth` positions ahead.
    fn resolver_pass(&mut self, _depth: usize) {}

    /// Called when a tandem run of `len` suffixes is only partly ordered because the budget left
    /// some of the suffixes it is copied from unsorted.
    fn partial_copy(&mut self, _len: usize) {}

    /// Called once the suffix array of a text of length `n` is complete.
    fn induced(&mut self, _n: usize) {}
}

impl Observer for () {}

/// Bucket boundaries keyed by the first one or two bytes of a suffix.
///
/// The pair table is shared between type B and type B* suffixes: a type B pair `(c0, c1)` always
/// has `c0 <= c1` and a B* pair always has `c0 < c1`, so storing them transposed keeps the two
/// apart.
struct Buckets {
    a: [i32; ALPHABET_SIZE],
    pairs: Vec<i32>,
}

impl Buckets {
    fn new() -> Self {
        Self {
            a: [0; ALPHABET_SIZE],
            pairs: vec![0; ALPHABET_SIZE * ALPHABET_SIZE],
        }
    }

    #[inline]
    fn b(&mut self, c0: usize, c1: usize) -> &mut i32 {
        &mut self.pairs[(c1 << 8) | c0]
    }

    #[inline]
    fn bstar(&mut self, c0: usize, c1: usize) -> &mut i32 {
        &mut self.pairs[(c0 << 8) | c1]
    }
}

/// Writes the suffix array of `text` into `sa`.
///
/// `sa` must be exactly as long as `text`, and `text` no longer than [`i32::MAX`].
pub(crate) fn sort(text: &[u8], sa: &mut [i32]) {
    sort_with(text, sa, &mut ());
}

pub(crate) fn sort_with<O: Observer>(text: &[u8], sa: &mut [i32], observer: &mut O) {
    let n = text.len();
    debug_assert_eq!(sa.len(), n, "suffix buffer must match the text length");

    match n {
        0 => return,
        1 => {
            sa[0] = 0;
            return;
        }
        2 => {
            let m = usize::from(text[0] < text[1]);
            sa[m ^ 1] = 0;
            sa[m] = 1;
            return;
        }
        _ => (),
    }

    let mut buckets = Buckets::new();
    let m = sort_type_bstar(text, sa, &mut buckets, observer);
    construct(text, sa, &mut buckets, m);

    observer.induced(n);
    trace::induced(n);
}

/// Sorts the type B* suffixes of `text` and moves them to their final bucket positions, returning
/// how many there are.
///
/// On return `buckets` holds the end of every type B bucket and the start of every byte's B*
/// region, ready for [`construct`].
fn sort_type_bstar<O: Observer>(
    text: &[u8],
    sa: &mut [i32],
    bkt: &mut Buckets,
    observer: &mut O,
) -> usize {
    let n = text.len();

    // Count the first one or two bytes of every suffix by type, collecting B* positions at the end
    // of the buffer
    let mut m = n;
    let mut i = n as isize - 1;
    let mut c0 = usize::from(text[n - 1]);
    while 0 <= i {
        let mut c1;
        loop {
            c1 = c0;
            bkt.a[c1] += 1;
            i -= 1;
            if i < 0 {
                break;
            }
            c0 = usize::from(text[i as usize]);
            if c0 < c1 {
                break;
            }
        }

        if 0 <= i {
            *bkt.bstar(c0, c1) += 1;
            m -= 1;
            sa[m] = i as i32;

            i -= 1;
            c1 = c0;
            while 0 <= i {
                c0 = usize::from(text[i as usize]);
                if c0 > c1 {
                    break;
                }
                *bkt.b(c0, c1) += 1;
                i -= 1;
                c1 = c0;
            }
        }
    }
    let m = n - m;

    observer.classified(n, m);
    trace::classified(n, m);

    // Turn the counts into the start of each byte bucket and the end of each B* pair bucket. B*
    // suffixes sort before the type B suffixes sharing their first two bytes.
    let (mut i, mut j) = (0, 0);
    for c0 in 0..ALPHABET_SIZE {
        let t = i + bkt.a[c0];
        bkt.a[c0] = i + j;
        i = t + *bkt.b(c0, c0);
        for c1 in c0 + 1..ALPHABET_SIZE {
            j += *bkt.bstar(c0, c1);
            *bkt.bstar(c0, c1) = j;
            i += *bkt.b(c0, c1);
        }
    }

    if m == 0 {
        return 0;
    }

    {
        // B* positions in text order occupy the tail of the buffer. The rest of the buffer past the
        // first m entries is free for the substring sorter.
        let (work, pa) = sa.split_at_mut(n - m);

        for i in (0..m - 1).rev() {
            let t = pa[i] as usize;
            let k = bkt.bstar(text[t].into(), text[t + 1].into());
            *k -= 1;
            work[*k as usize] = i as i32;
        }
        let t = pa[m - 1] as usize;
        let k = bkt.bstar(text[t].into(), text[t + 1].into());
        *k -= 1;
        work[*k as usize] = (m - 1) as i32;

        let substrings = sssort::Substrings::new(text, pa);
        let buf = sssort::Buffer {
            start: m,
            len: n - 2 * m,
        };
        let mut j = m;
        for c0 in (0..ALPHABET_SIZE - 1).rev() {
            if j == 0 {
                break;
            }
            for c1 in (c0 + 1..ALPHABET_SIZE).rev() {
                let i = *bkt.bstar(c0, c1) as usize;
                if 1 < j - i {
                    let last_suffix = work[i] == (m - 1) as i32;
                    substrings.sort(work, i..j, buf, 2, last_suffix);
                }
                j = i;
            }
        }
    }

    let (order, rest) = sa.split_at_mut(m);
    let isa = &mut rest[..m];

    // Name the sorted substrings. A unique substring's rank is its position and runs of them are
    // collapsed to their negated length; a tied group takes the position of its last member.
    let mut names = 0;
    let mut i = m as isize - 1;
    while 0 <= i {
        if !is_marked(order[i as usize]) {
            let j = i;
            loop {
                isa[order[i as usize] as usize] = i as i32;
                names += 1;
                i -= 1;
                if !(0 <= i && !is_marked(order[i as usize])) {
                    break;
                }
            }
            order[(i + 1) as usize] = (i - j) as i32;
            if i <= 0 {
                break;
            }
        }

        let j = i as i32;
        loop {
            let s = flip(order[i as usize]);
            order[i as usize] = s;
            isa[s as usize] = j;
            i -= 1;
            if !is_marked(order[i as usize]) {
                break;
            }
        }
        isa[order[i as usize] as usize] = j;
        names += 1;
        i -= 1;
    }

    observer.named(m, names);
    trace::named(m, names);

    if names < m {
        trsort::sort(isa, order, 1, observer);
    }

    // Place each B* suffix at its rank. A B* suffix whose predecessor is also type B is marked so
    // the induction leaves that predecessor to its own bucket scan.
    let mut i = n as isize - 1;
    let mut j = m;
    let mut c0 = text[n - 1];
    while 0 <= i {
        i -= 1;
        let mut c1 = c0;
        while 0 <= i {
            c0 = text[i as usize];
            if c0 < c1 {
                break;
            }
            i -= 1;
            c1 = c0;
        }

        if 0 <= i {
            let t = i;
            i -= 1;
            c1 = c0;
            while 0 <= i {
                c0 = text[i as usize];
                if c0 > c1 {
                    break;
                }
                i -= 1;
                c1 = c0;
            }

            j -= 1;
            order[isa[j] as usize] = if t == 0 || 1 < t - i {
                t as i32
            } else {
                flip(t as i32)
            };
        }
    }

    // Turn the type B counts into bucket ends and move the B* suffixes to the tail of their pair
    // buckets
    *bkt.b(ALPHABET_SIZE - 1, ALPHABET_SIZE - 1) = n as i32;
    let mut k = m as isize - 1;
    for c0 in (0..ALPHABET_SIZE - 1).rev() {
        let mut i = bkt.a[c0 + 1] as isize - 1;
        for c1 in (c0 + 1..ALPHABET_SIZE).rev() {
            let t = i - *bkt.b(c0, c1) as isize;
            *bkt.b(c0, c1) = i as i32;

            i = t;
            let j = *bkt.bstar(c0, c1) as isize;
            while j <= k {
                sa[i as usize] = sa[k as usize];
                i -= 1;
                k -= 1;
            }
        }
        *bkt.bstar(c0, c0 + 1) = (i - *bkt.b(c0, c0) as isize + 1) as i32;
        *bkt.b(c0, c0) = i as i32;
    }

    m
}

/// Induces the full suffix array from the placed type B* suffixes.
///
/// A right-to-left scan over each byte's type B region places every type B suffix, then a
/// left-to-right scan over the whole array places every type A suffix. Marks left by either scan
/// are cleared as the scan passes them.
fn construct(text: &[u8], sa: &mut [i32], bkt: &mut Buckets, m: usize) {
    let n = text.len();

    if 0 < m {
        for c1 in (0..ALPHABET_SIZE - 1).rev() {
            let i = *bkt.bstar(c1, c1 + 1) as isize;
            let mut j = bkt.a[c1 + 1] as isize - 1;
            let mut k = 0;
            let mut c2 = None;

            while i <= j {
                let s = sa[j as usize];
                sa[j as usize] = flip(s);

                if 0 < s {
                    let s = s - 1;
                    let c0 = usize::from(text[s as usize]);
                    let v = if 0 < s && usize::from(text[s as usize - 1]) > c0 {
                        flip(s)
                    } else {
                        s
                    };

                    if c2 != Some(c0) {
                        if let Some(c2) = c2 {
                            *bkt.b(c2, c1) = k as i32;
                        }
                        k = *bkt.b(c0, c1) as isize;
                        c2 = Some(c0);
                    }
                    sa[k as usize] = v;
                    k -= 1;
                }

                j -= 1;
            }
        }
    }

    let mut c2 = usize::from(text[n - 1]);
    let mut k = bkt.a[c2] as usize;
    sa[k] = if text[n - 2] < text[n - 1] {
        flip((n - 1) as i32)
    } else {
        (n - 1) as i32
    };
    k += 1;

    for i in 0..n {
        let s = sa[i];
        if s <= 0 {
            sa[i] = flip(s);
            continue;
        }

        let s = s - 1;
        let c0 = usize::from(text[s as usize]);
        let v = if s == 0 || usize::from(text[s as usize - 1]) < c0 {
            flip(s)
        } else {
            s
        };

        if c0 != c2 {
            bkt.a[c2] = k as i32;
            c2 = c0;
            k = bkt.a[c2] as usize;
        }
        sa[k] = v;
        k += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Recorder {
        classified: Option<(usize, usize)>,
        named: Option<(usize, usize)>,
        passes: Vec<usize>,
        induced: Option<usize>,
    }

    impl Observer for Recorder {
        fn classified(&mut self, n: usize, m: usize) {
            self.classified = Some((n, m));
        }

        fn named(&mut self, m: usize, names: usize) {
            self.named = Some((m, names));
        }

        fn resolver_pass(&mut self, depth: usize) {
            self.passes.push(depth);
        }

        fn induced(&mut self, n: usize) {
            self.induced = Some(n);
        }
    }

    fn naive(text: &[u8]) -> Vec<i32> {
        let mut sa: Vec<i32> = (0..text.len() as i32).collect();
        sa.sort_by(|&a, &b| text[a as usize..].cmp(&text[b as usize..]));
        sa
    }

    fn sorted(text: &[u8]) -> Vec<i32> {
        let mut sa = vec![0; text.len()];
        sort(text, &mut sa);
        sa
    }

    #[test]
    fn banana() {
        assert_eq!(sorted(b"banana"), vec![5, 3, 1, 0, 4, 2]);
    }

    #[test]
    fn tiny_inputs() {
        assert_eq!(sorted(b""), Vec::<i32>::new());
        assert_eq!(sorted(b"x"), vec![0]);
        assert_eq!(sorted(b"ab"), vec![0, 1]);
        assert_eq!(sorted(b"ba"), vec![1, 0]);
        assert_eq!(sorted(b"aa"), vec![1, 0]);
    }

    #[test]
    fn hello_world() {
        assert_eq!(
            sorted(b"Hello, world!"),
            vec![6, 12, 5, 0, 11, 1, 10, 2, 3, 4, 8, 9, 7],
        );
        assert_eq!(
            sorted(b"Hello, \0world!"),
            vec![7, 6, 13, 5, 0, 12, 1, 11, 2, 3, 4, 9, 10, 8],
        );
    }

    #[test]
    fn single_byte_runs() {
        for n in 3..50 {
            let text = vec![b'z'; n];
            let expected: Vec<i32> = (0..n as i32).rev().collect();
            assert_eq!(sorted(&text), expected, "length {n}");
        }
    }

    #[test]
    fn matches_naive_sort() {
        let texts: [&[u8]; 6] = [
            b"mississippi",
            b"abracadabra abracadabra",
            b"the quick brown fox jumps over the lazy dog",
            b"\xff\x00\xff\x00\x01\xfe\x00",
            b"aaaaaaaaaabaaaaaaaaaabaaaaaaaaaab",
            b"cabbage cabbage cabbage",
        ];

        for text in texts {
            assert_eq!(sorted(text), naive(text), "{}", text.escape_ascii());
        }
    }

    #[test]
    fn periodic_text_enters_the_resolver() {
        let text = b"ab".repeat(50);
        let mut sa = vec![0; text.len()];
        let mut recorder = Recorder::default();

        sort_with(&text, &mut sa, &mut recorder);

        assert_eq!(sa, naive(&text));
        assert_eq!(recorder.classified, Some((100, 50)));
        assert_eq!(recorder.named, Some((50, 2)));
        assert!(!recorder.passes.is_empty(), "resolver never ran");
        assert_eq!(recorder.passes[0], 1);
        assert_eq!(recorder.induced, Some(100));
    }

    #[test]
    fn unique_substrings_skip_the_resolver() {
        let mut sa = vec![0; 6];
        let mut recorder = Recorder::default();

        sort_with(b"banana", &mut sa, &mut recorder);

        assert_eq!(recorder.classified, Some((6, 2)));
        assert_eq!(recorder.named, Some((2, 2)));
        assert!(recorder.passes.is_empty(), "{:?}", recorder.passes);
    }

    #[test]
    fn constant_text_has_no_bstar_suffixes() {
        let mut sa = vec![0; 10];
        let mut recorder = Recorder::default();

        sort_with(&[7; 10], &mut sa, &mut recorder);

        assert_eq!(recorder.classified, Some((10, 0)));
        assert_eq!(recorder.named, None);
        assert_eq!(recorder.induced, Some(10));
    }

    #[test]
    fn large_buckets_are_merged() {
        // Pair buckets larger than a block, with and without room for a merge buffer
        let spacious: Vec<u8> = b"abcab".iter().copied().cycle().take(6000).collect();
        let cramped = b"ab".repeat(3000);

        assert_eq!(sorted(&spacious), naive(&spacious));
        assert_eq!(sorted(&cramped), naive(&cramped));
    }

    #[test]
    fn large_mixed_text() {
        let mut state = 0x2545_f491_u32;
        let text: Vec<u8> = (0..5000)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                b"acgt"[(state % 4) as usize]
            })
            .collect();

        assert_eq!(sorted(&text), naive(&text));
    }
}
