// Copyright 2024 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

//! Substring sorting of type B* suffixes.
//!
//! Every type B* suffix is compared only up to the start of the following B* suffix (plus two
//! bytes). Runs of up to [`SS_BLOCKSIZE`] items are sorted by a multikey introsort and then merged
//! pairwise, using a spare region of the suffix array as the merge buffer when there is one and an
//! in-place rotation merge when there isn't. Items which compare equal to their predecessor are
//! left marked so that naming can group them.

use core::{cmp::Ordering, ops::Range};

use super::{
    mark::{flip, is_marked, raw_index},
    select::{heapsort, partition, pivot, swap_blocks},
    stack::Stack,
    tables::{SS_BLOCKSIZE, ilg, isqrt},
};

const SS_INSERTIONSORT_THRESHOLD: usize = 8;
const SS_MISORT_STACKSIZE: usize = 16;
const SS_SMERGE_STACKSIZE: usize = 32;

/// The extent of one B* substring: it starts at `start` and runs through `next + 1`.
#[derive(Clone, Copy)]
struct Span {
    start: i32,
    next: i32,
}

/// A range still waiting for the multikey introsort.
struct SortRange {
    first: usize,
    last: usize,
    depth: i32,
    limit: i32,
}

/// A merge still waiting for [`Substrings::swap_merge`].
///
/// `check` has bit 0 set if `first` must be marked unconditionally afterwards, bit 1 if `first`
/// must be marked when it ties with its predecessor and bit 2 if `last` must be marked when it
/// ties with its predecessor.
struct MergeTask {
    first: usize,
    middle: usize,
    last: usize,
    check: u8,
}

/// A spare region of the suffix array, `sa[start..start + len]`, usable as a merge buffer.
#[derive(Clone, Copy, Debug)]
pub(super) struct Buffer {
    pub(super) start: usize,
    pub(super) len: usize,
}

/// The text together with the starting positions of every B* suffix in text order.
pub(super) struct Substrings<'a> {
    text: &'a [u8],
    pa: &'a [i32],
}

impl<'a> Substrings<'a> {
    pub(super) fn new(text: &'a [u8], pa: &'a [i32]) -> Self {
        Self { text, pa }
    }
}

impl Substrings<'_> {
    /// Sorts the B* indices in `sa[range]` by their substrings.
    ///
    /// If `last_suffix` is set, the first item of the range is the final B* suffix, whose
    /// substring runs to the end of the text.
    pub(super) fn sort(
        &self,
        sa: &mut [i32],
        range: Range<usize>,
        mut buf: Buffer,
        depth: i32,
        last_suffix: bool,
    ) {
        let Range { start: mut first, end: last } = range;

        if last_suffix {
            first += 1;
        }

        // Carve a buffer out of the end of the range if the shared one is too small
        let middle;
        let mut limit = 0;
        if buf.len < SS_BLOCKSIZE && buf.len < last - first && buf.len < isqrt(last - first) {
            limit = isqrt(last - first).min(SS_BLOCKSIZE);
            middle = last - limit;
            buf = Buffer {
                start: middle,
                len: limit,
            };
        } else {
            middle = last;
        }

        let mut a = first;
        let mut i = 0usize;
        while SS_BLOCKSIZE < middle - a {
            self.mintrosort(sa, a, a + SS_BLOCKSIZE, depth);

            let mut curbuf = Buffer {
                start: a + SS_BLOCKSIZE,
                len: last - (a + SS_BLOCKSIZE),
            };
            if curbuf.len <= buf.len {
                curbuf = buf;
            }

            let (mut b, mut k, mut j) = (a, SS_BLOCKSIZE, i);
            while j & 1 != 0 {
                self.swap_merge(sa, b - k, b, b + k, curbuf, depth);
                b -= k;
                k <<= 1;
                j >>= 1;
            }

            a += SS_BLOCKSIZE;
            i += 1;
        }

        self.mintrosort(sa, a, middle, depth);

        let mut k = SS_BLOCKSIZE;
        while i != 0 {
            if i & 1 != 0 {
                self.swap_merge(sa, a - k, a, middle, buf, depth);
                a -= k;
            }
            k <<= 1;
            i >>= 1;
        }

        if limit != 0 {
            self.mintrosort(sa, middle, last, depth);
            self.inplace_merge(sa, first, middle, last, depth);
        }

        if last_suffix {
            // Insert the final B* suffix, whose substring is terminated by the end of the text
            let index = sa[first - 1];
            let span = Span {
                start: self.pa[index as usize],
                next: self.text.len() as i32 - 2,
            };

            let mut a = first;
            while a < last
                && (is_marked(sa[a])
                    || self.compare(span, self.span(sa[a]), depth) == Ordering::Greater)
            {
                sa[a - 1] = sa[a];
                a += 1;
            }
            sa[a - 1] = index;
        }
    }

    #[inline]
    fn span(&self, index: i32) -> Span {
        Span {
            start: self.pa[index as usize],
            next: self.pa[index as usize + 1],
        }
    }

    /// Returns the byte `depth` positions into the substring of B* suffix `index`.
    #[inline]
    fn key(&self, index: i32, depth: i32) -> i32 {
        i32::from(self.text[(depth + self.pa[index as usize]) as usize])
    }

    /// Returns the byte just before [`Self::key`].
    #[inline]
    fn key_before(&self, index: i32, depth: i32) -> i32 {
        i32::from(self.text[(depth + self.pa[index as usize] - 1) as usize])
    }

    /// Compares two substrings starting `depth` bytes in.
    fn compare(&self, s1: Span, s2: Span, depth: i32) -> Ordering {
        let mut u1 = (s1.start + depth) as usize;
        let mut u2 = (s2.start + depth) as usize;
        let u1n = (s1.next + 2) as usize;
        let u2n = (s2.next + 2) as usize;

        while u1 < u1n && u2 < u2n && self.text[u1] == self.text[u2] {
            u1 += 1;
            u2 += 1;
        }

        match (u1 < u1n, u2 < u2n) {
            (true, true) => self.text[u1].cmp(&self.text[u2]),
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => Ordering::Equal,
        }
    }

    fn insertion_sort(&self, sa: &mut [i32], first: usize, last: usize, depth: i32) {
        for i in (first..last - 1).rev() {
            let t = sa[i];
            let mut j = i + 1;

            let mut r;
            loop {
                r = self.compare(self.span(t), self.span(sa[j]), depth);
                if r != Ordering::Greater {
                    break;
                }

                // Shift the next group of ties left by one
                loop {
                    sa[j - 1] = sa[j];
                    j += 1;
                    if !(j < last && is_marked(sa[j])) {
                        break;
                    }
                }
                if last <= j {
                    break;
                }
            }

            if r == Ordering::Equal {
                sa[j] = flip(sa[j]);
            }
            sa[j - 1] = t;
        }
    }

    /// Moves the items whose substrings are exhausted at `depth` to the front of the range and
    /// returns the position just past them.
    ///
    /// The moved items all tie, so every one but the first is marked.
    fn split_exhausted(&self, sa: &mut [i32], first: usize, last: usize, depth: i32) -> usize {
        let exhausted = |index: i32| {
            let index = index as usize;
            self.pa[index] + depth >= self.pa[index + 1] + 1
        };

        let mut a = first as isize - 1;
        let mut b = last as isize;
        loop {
            loop {
                a += 1;
                if !(a < b && exhausted(sa[a as usize])) {
                    break;
                }
                sa[a as usize] = flip(sa[a as usize]);
            }
            loop {
                b -= 1;
                if !(a < b && !exhausted(sa[b as usize])) {
                    break;
                }
            }
            if b <= a {
                break;
            }

            let t = flip(sa[b as usize]);
            sa[b as usize] = sa[a as usize];
            sa[a as usize] = t;
        }

        if (first as isize) < a {
            sa[first] = flip(sa[first]);
        }

        a as usize
    }

    /// Multikey introsort over `sa[first..last]`, comparing one byte per level.
    fn mintrosort(&self, sa: &mut [i32], mut first: usize, mut last: usize, mut depth: i32) {
        let mut stack: Stack<SortRange, SS_MISORT_STACKSIZE> = Stack::new();
        let mut limit = ilg(last - first);

        loop {
            if last - first <= SS_INSERTIONSORT_THRESHOLD {
                if 1 < last - first {
                    self.insertion_sort(sa, first, last, depth);
                }

                let Some(range) = stack.pop() else { return };
                (first, last, depth, limit) = (range.first, range.last, range.depth, range.limit);
                continue;
            }

            let key = move |index: i32| self.key(index, depth);

            if limit == 0 {
                heapsort(sa, &key, first, last - first);
            }
            limit -= 1;

            if limit < 0 {
                // Split off the leading run of items sharing a byte at this depth
                let mut a = first + 1;
                let mut v = key(sa[first]);
                while a < last {
                    let x = key(sa[a]);
                    if x != v {
                        if 1 < a - first {
                            break;
                        }
                        v = x;
                        first = a;
                    }
                    a += 1;
                }

                if self.key_before(sa[first], depth) < v {
                    first = self.split_exhausted(sa, first, a, depth);
                }

                if a - first <= last - a {
                    if 1 < a - first {
                        stack.push(SortRange {
                            first: a,
                            last,
                            depth,
                            limit: -1,
                        });
                        last = a;
                        depth += 1;
                        limit = ilg(a - first);
                    } else {
                        first = a;
                        limit = -1;
                    }
                } else if 1 < last - a {
                    stack.push(SortRange {
                        first,
                        last: a,
                        depth: depth + 1,
                        limit: ilg(a - first),
                    });
                    first = a;
                    limit = -1;
                } else {
                    last = a;
                    depth += 1;
                    limit = ilg(a - first);
                }

                continue;
            }

            // Choose a pivot
            let a = pivot(sa, &key, first, last);
            let v = key(sa[a]);
            sa.swap(first, a);

            let (a, c) = partition(sa, &key, first, first + 1, last, v);
            if last - first != c - a {
                let b = if v <= self.key_before(sa[a], depth) {
                    a
                } else {
                    self.split_exhausted(sa, a, c, depth)
                };

                // Continue with the smallest side, pushing the others
                if a - first <= last - c {
                    if last - c <= c - b {
                        stack.push(SortRange {
                            first: b,
                            last: c,
                            depth: depth + 1,
                            limit: ilg(c - b),
                        });
                        stack.push(SortRange {
                            first: c,
                            last,
                            depth,
                            limit,
                        });
                        last = a;
                    } else if a - first <= c - b {
                        stack.push(SortRange {
                            first: c,
                            last,
                            depth,
                            limit,
                        });
                        stack.push(SortRange {
                            first: b,
                            last: c,
                            depth: depth + 1,
                            limit: ilg(c - b),
                        });
                        last = a;
                    } else {
                        stack.push(SortRange {
                            first: c,
                            last,
                            depth,
                            limit,
                        });
                        stack.push(SortRange {
                            first,
                            last: a,
                            depth,
                            limit,
                        });
                        first = b;
                        last = c;
                        depth += 1;
                        limit = ilg(c - b);
                    }
                } else if a - first <= c - b {
                    stack.push(SortRange {
                        first: b,
                        last: c,
                        depth: depth + 1,
                        limit: ilg(c - b),
                    });
                    stack.push(SortRange {
                        first,
                        last: a,
                        depth,
                        limit,
                    });
                    first = c;
                } else if last - c <= c - b {
                    stack.push(SortRange {
                        first,
                        last: a,
                        depth,
                        limit,
                    });
                    stack.push(SortRange {
                        first: b,
                        last: c,
                        depth: depth + 1,
                        limit: ilg(c - b),
                    });
                    first = c;
                } else {
                    stack.push(SortRange {
                        first,
                        last: a,
                        depth,
                        limit,
                    });
                    stack.push(SortRange {
                        first: c,
                        last,
                        depth,
                        limit,
                    });
                    first = b;
                    last = c;
                    depth += 1;
                    limit = ilg(c - b);
                }
            } else {
                // Every item shares the pivot byte
                limit += 1;
                if self.key_before(sa[first], depth) < v {
                    first = self.split_exhausted(sa, first, last, depth);
                    limit = ilg(last - first);
                }
                depth += 1;
            }
        }
    }

    /// Merges `sa[first..middle]` and `sa[middle..last]` in place by binary search and rotation.
    fn inplace_merge(
        &self,
        sa: &mut [i32],
        first: usize,
        mut middle: usize,
        mut last: usize,
        depth: i32,
    ) {
        loop {
            let tail_marked = is_marked(sa[last - 1]);
            let p = self.span(raw_index(sa[last - 1]));

            let mut a = first;
            let mut len = middle - first;
            let mut half = len >> 1;
            let mut r = Ordering::Less;
            while 0 < len {
                let b = a + half;
                let q = self.compare(self.span(raw_index(sa[b])), p, depth);
                if q == Ordering::Less {
                    a = b + 1;
                    half -= (len & 1) ^ 1;
                } else {
                    r = q;
                }
                len = half;
                half >>= 1;
            }

            if a < middle {
                if r == Ordering::Equal {
                    sa[a] = flip(sa[a]);
                }
                sa[a..last].rotate_left(middle - a);
                last -= middle - a;
                middle = a;
                if first == middle {
                    break;
                }
            }

            last -= 1;
            if tail_marked {
                loop {
                    last -= 1;
                    if !is_marked(sa[last]) {
                        break;
                    }
                }
            }
            if middle == last {
                break;
            }
        }
    }

    /// Merges front to back after moving `sa[first..middle]` into the buffer at `buf`.
    ///
    /// Items are exchanged rather than copied, so the buffer's own contents survive the merge.
    fn merge_forward(
        &self,
        sa: &mut [i32],
        first: usize,
        middle: usize,
        last: usize,
        buf: usize,
        depth: i32,
    ) {
        let bufend = buf + (middle - first) - 1;
        swap_blocks(sa, buf, first, middle - first);

        let t = sa[first];
        let (mut a, mut b, mut c) = (first, buf, middle);

        // Each helper returns `true` once the merge is complete
        let take_left = |sa: &mut [i32], a: &mut usize, b: &mut usize| -> bool {
            loop {
                sa[*a] = sa[*b];
                *a += 1;
                if bufend <= *b {
                    sa[bufend] = t;
                    return true;
                }
                sa[*b] = sa[*a];
                *b += 1;
                if !is_marked(sa[*b]) {
                    return false;
                }
            }
        };
        let take_right = |sa: &mut [i32], a: &mut usize, b: &mut usize, c: &mut usize| -> bool {
            loop {
                sa[*a] = sa[*c];
                *a += 1;
                sa[*c] = sa[*a];
                *c += 1;
                if last <= *c {
                    while *b < bufend {
                        sa[*a] = sa[*b];
                        *a += 1;
                        sa[*b] = sa[*a];
                        *b += 1;
                    }
                    sa[*a] = sa[*b];
                    sa[*b] = t;
                    return true;
                }
                if !is_marked(sa[*c]) {
                    return false;
                }
            }
        };

        loop {
            match self.compare(self.span(sa[b]), self.span(sa[c]), depth) {
                Ordering::Less => {
                    if take_left(sa, &mut a, &mut b) {
                        return;
                    }
                }
                Ordering::Greater => {
                    if take_right(sa, &mut a, &mut b, &mut c) {
                        return;
                    }
                }
                Ordering::Equal => {
                    sa[c] = flip(sa[c]);
                    if take_left(sa, &mut a, &mut b) || take_right(sa, &mut a, &mut b, &mut c) {
                        return;
                    }
                }
            }
        }
    }

    /// Merges back to front after moving `sa[middle..last]` into the buffer at `buf`.
    fn merge_backward(
        &self,
        sa: &mut [i32],
        first: usize,
        middle: usize,
        last: usize,
        buf: usize,
        depth: i32,
    ) {
        let bufend = buf + (last - middle) - 1;
        swap_blocks(sa, buf, middle, last - middle);

        // Bit 0 tracks a marked item under `b`, bit 1 one under `c`
        let mut x = 0u8;
        let mut p1 = self.span(raw_index(sa[bufend]));
        if is_marked(sa[bufend]) {
            x |= 1;
        }
        let mut p2 = self.span(raw_index(sa[middle - 1]));
        if is_marked(sa[middle - 1]) {
            x |= 2;
        }

        let t = sa[last - 1];
        let first = first as isize;
        let buf = buf as isize;
        let (mut a, mut b, mut c) = (last as isize - 1, bufend as isize, middle as isize - 1);

        // Moves the item under `b` (or `c`) to `a` and refills the vacated slot
        fn exchange(sa: &mut [i32], a: &mut isize, from: &mut isize) {
            sa[*a as usize] = sa[*from as usize];
            *a -= 1;
            sa[*from as usize] = sa[*a as usize];
            *from -= 1;
        }
        fn drain_ties(sa: &mut [i32], a: &mut isize, from: &mut isize) {
            loop {
                exchange(sa, a, from);
                if !is_marked(sa[*from as usize]) {
                    break;
                }
            }
        }
        // Flushes the rest of the buffer once the left run is used up
        fn finish(sa: &mut [i32], mut a: isize, mut b: isize, buf: isize, t: i32) {
            while buf < b {
                exchange(sa, &mut a, &mut b);
            }
            sa[a as usize] = sa[b as usize];
            sa[b as usize] = t;
        }

        loop {
            let r = self.compare(p1, p2, depth);

            if r != Ordering::Less {
                if x & 1 != 0 {
                    drain_ties(sa, &mut a, &mut b);
                    x ^= 1;
                }
                sa[a as usize] = if r == Ordering::Equal {
                    flip(sa[b as usize])
                } else {
                    sa[b as usize]
                };
                a -= 1;
                if b <= buf {
                    sa[buf as usize] = t;
                    break;
                }
                sa[b as usize] = sa[a as usize];
                b -= 1;

                p1 = self.span(raw_index(sa[b as usize]));
                if is_marked(sa[b as usize]) {
                    x |= 1;
                }
                if r == Ordering::Greater {
                    continue;
                }
            }

            if x & 2 != 0 {
                drain_ties(sa, &mut a, &mut c);
                x ^= 2;
            }
            exchange(sa, &mut a, &mut c);
            if c < first {
                finish(sa, a, b, buf, t);
                break;
            }
            p2 = self.span(raw_index(sa[c as usize]));
            if is_marked(sa[c as usize]) {
                x |= 2;
            }
        }
    }

    /// Marks the boundary items of a finished merge as requested by `check`.
    fn merge_check(&self, sa: &mut [i32], a: usize, b: usize, check: u8, depth: i32) {
        if check & 1 != 0
            || (check & 2 != 0
                && self.compare(self.span(raw_index(sa[a - 1])), self.span(sa[a]), depth)
                    == Ordering::Equal)
        {
            sa[a] = flip(sa[a]);
        }
        if check & 4 != 0
            && self.compare(self.span(raw_index(sa[b - 1])), self.span(sa[b]), depth)
                == Ordering::Equal
        {
            sa[b] = flip(sa[b]);
        }
    }

    /// Merges two adjacent sorted runs using at most `buf.len` items of buffer.
    ///
    /// Runs too long for the buffer are split by binary search and block swaps until the pieces
    /// fit.
    fn swap_merge(
        &self,
        sa: &mut [i32],
        mut first: usize,
        mut middle: usize,
        mut last: usize,
        buf: Buffer,
        depth: i32,
    ) {
        let mut stack: Stack<MergeTask, SS_SMERGE_STACKSIZE> = Stack::new();
        let mut check = 0u8;

        loop {
            let fits_right = last - middle <= buf.len;
            if fits_right || middle - first <= buf.len {
                if fits_right {
                    if first < middle && middle < last {
                        self.merge_backward(sa, first, middle, last, buf.start, depth);
                    }
                } else if first < middle {
                    self.merge_forward(sa, first, middle, last, buf.start, depth);
                }
                self.merge_check(sa, first, last, check, depth);

                let Some(task) = stack.pop() else { return };
                (first, middle, last, check) = (task.first, task.middle, task.last, task.check);
                continue;
            }

            // Find how many items must cross the midpoint
            let mut m = 0;
            let mut len = (middle - first).min(last - middle);
            let mut half = len >> 1;
            while 0 < len {
                if self.compare(
                    self.span(raw_index(sa[middle + m + half])),
                    self.span(raw_index(sa[middle - m - half - 1])),
                    depth,
                ) == Ordering::Less
                {
                    m += half + 1;
                    half -= (len & 1) ^ 1;
                }
                len = half;
                half >>= 1;
            }

            if 0 < m {
                let lm = middle - m;
                let rm = middle + m;
                swap_blocks(sa, lm, middle, m);

                let mut l = middle;
                let mut r = middle;
                let mut next = 0u8;
                if rm < last {
                    if is_marked(sa[rm]) {
                        sa[rm] = flip(sa[rm]);
                        if first < lm {
                            loop {
                                l -= 1;
                                if !is_marked(sa[l]) {
                                    break;
                                }
                            }
                            next |= 4;
                        }
                        next |= 1;
                    } else if first < lm {
                        while is_marked(sa[r]) {
                            r += 1;
                        }
                        next |= 2;
                    }
                }

                if l - first <= last - r {
                    stack.push(MergeTask {
                        first: r,
                        middle: rm,
                        last,
                        check: (next & 3) | (check & 4),
                    });
                    middle = lm;
                    last = l;
                    check = (check & 3) | (next & 4);
                } else {
                    if next & 2 != 0 && r == middle {
                        next ^= 6;
                    }
                    stack.push(MergeTask {
                        first,
                        middle: lm,
                        last: l,
                        check: (check & 3) | (next & 4),
                    });
                    first = r;
                    middle = rm;
                    check = (next & 3) | (check & 4);
                }
            } else {
                if self.compare(
                    self.span(raw_index(sa[middle - 1])),
                    self.span(sa[middle]),
                    depth,
                ) == Ordering::Equal
                {
                    sa[middle] = flip(sa[middle]);
                }
                self.merge_check(sa, first, last, check, depth);

                let Some(task) = stack.pop() else { return };
                (first, middle, last, check) = (task.first, task.middle, task.last, task.check);
            }
        }
    }
}
