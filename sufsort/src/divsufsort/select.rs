// Copyright 2024 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

//! Pivot selection, partitioning and heapsort shared by both sorting stages.
//!
//! Each stage orders suffix indices by a different key (a text byte at some depth, or a rank at
//! some doubling depth), so these helpers take the key as a closure over the stored index.

use core::mem;

/// Returns the position among `v1`, `v2` and `v3` holding the median key.
#[inline]
fn median3<K>(sa: &[i32], key: &K, mut v1: usize, mut v2: usize, v3: usize) -> usize
where
    K: Fn(i32) -> i32,
{
    if key(sa[v1]) > key(sa[v2]) {
        mem::swap(&mut v1, &mut v2);
    }
    if key(sa[v2]) > key(sa[v3]) {
        if key(sa[v1]) > key(sa[v3]) { v1 } else { v3 }
    } else {
        v2
    }
}

/// Returns the position among the five given positions holding the median key.
#[inline]
fn median5<K>(
    sa: &[i32],
    key: &K,
    mut v1: usize,
    mut v2: usize,
    mut v3: usize,
    mut v4: usize,
    mut v5: usize,
) -> usize
where
    K: Fn(i32) -> i32,
{
    if key(sa[v2]) > key(sa[v3]) {
        mem::swap(&mut v2, &mut v3);
    }
    if key(sa[v4]) > key(sa[v5]) {
        mem::swap(&mut v4, &mut v5);
    }
    if key(sa[v2]) > key(sa[v4]) {
        mem::swap(&mut v2, &mut v4);
        mem::swap(&mut v3, &mut v5);
    }
    if key(sa[v1]) > key(sa[v3]) {
        mem::swap(&mut v1, &mut v3);
    }
    if key(sa[v1]) > key(sa[v4]) {
        mem::swap(&mut v1, &mut v4);
        mem::swap(&mut v3, &mut v5);
    }
    if key(sa[v3]) > key(sa[v4]) { v4 } else { v3 }
}

/// Chooses a pivot position in `sa[first..last]`.
///
/// Small ranges use a median of three, medium ranges a median of five and large ranges a median
/// of three medians of three.
pub(super) fn pivot<K>(sa: &[i32], key: &K, first: usize, last: usize) -> usize
where
    K: Fn(i32) -> i32,
{
    let mut t = last - first;
    let middle = first + t / 2;

    if t <= 512 {
        if t <= 32 {
            return median3(sa, key, first, middle, last - 1);
        }

        t >>= 2;
        return median5(sa, key, first, first + t, middle, last - 1 - t, last - 1);
    }

    t >>= 3;
    let first = median3(sa, key, first, first + t, first + (t << 1));
    let middle = median3(sa, key, middle - t, middle, middle + t);
    let last = median3(sa, key, last - 1 - (t << 1), last - 1 - t, last - 1);
    median3(sa, key, first, middle, last)
}

fn fixdown<K>(heap: &mut [i32], key: &K, mut i: usize, size: usize)
where
    K: Fn(i32) -> i32,
{
    let v = heap[i];
    let c = key(v);

    loop {
        let j = 2 * i + 1;
        if j >= size {
            break;
        }

        let mut k = j;
        let mut d = key(heap[k]);
        let e = key(heap[j + 1]);
        if d < e {
            k = j + 1;
            d = e;
        }
        if d <= c {
            break;
        }

        heap[i] = heap[k];
        i = k;
    }

    heap[i] = v;
}

/// Sorts `sa[first..first + size]` by `key` in *O*(*n* log *n*) worst-case time.
///
/// This is the fallback when an introsort exhausts its depth limit.
pub(super) fn heapsort<K>(sa: &mut [i32], key: &K, first: usize, size: usize)
where
    K: Fn(i32) -> i32,
{
    let heap = &mut sa[first..first + size];

    // Sift down an odd-sized heap so that every interior node has two children
    let mut m = size;
    if size % 2 == 0 {
        m -= 1;
        if key(heap[m / 2]) < key(heap[m]) {
            heap.swap(m, m / 2);
        }
    }

    for i in (0..m / 2).rev() {
        fixdown(heap, key, i, m);
    }
    if size % 2 == 0 {
        heap.swap(0, m);
        fixdown(heap, key, 0, m);
    }
    for i in (1..m).rev() {
        let t = heap[0];
        heap[0] = heap[i];
        fixdown(heap, key, 0, i);
        heap[i] = t;
    }
}

/// Swaps the `len` items starting at `a` with the `len` items starting at `b`.
#[inline]
pub(super) fn swap_blocks(sa: &mut [i32], a: usize, b: usize, len: usize) {
    for i in 0..len {
        sa.swap(a + i, b + i);
    }
}

/// Partitions `sa[first..last]` into items whose key is less than, equal to and greater than `v`.
///
/// Items in `sa[first..middle]` must already have key `v`. Returns the bounds of the equal run,
/// which is the whole range when every key equals `v`.
pub(super) fn partition<K>(
    sa: &mut [i32],
    key: &K,
    first: usize,
    middle: usize,
    last: usize,
    v: i32,
) -> (usize, usize)
where
    K: Fn(i32) -> i32,
{
    // Equal items collect at both ends while the rest is partitioned in the middle
    let mut x = 0;
    let mut b = middle;
    while b < last {
        x = key(sa[b]);
        if x != v {
            break;
        }
        b += 1;
    }
    let mut a = b;
    if a < last && x < v {
        b += 1;
        while b < last {
            x = key(sa[b]);
            if x > v {
                break;
            }
            if x == v {
                sa.swap(b, a);
                a += 1;
            }
            b += 1;
        }
    }

    let mut c = last - 1;
    while b < c {
        x = key(sa[c]);
        if x != v {
            break;
        }
        c -= 1;
    }
    let mut d = c;
    if b < d && x > v {
        c -= 1;
        while b < c {
            x = key(sa[c]);
            if x < v {
                break;
            }
            if x == v {
                sa.swap(c, d);
                d -= 1;
            }
            c -= 1;
        }
    }

    while b < c {
        sa.swap(b, c);
        b += 1;
        while b < c {
            x = key(sa[b]);
            if x > v {
                break;
            }
            if x == v {
                sa.swap(b, a);
                a += 1;
            }
            b += 1;
        }
        c -= 1;
        while b < c {
            x = key(sa[c]);
            if x < v {
                break;
            }
            if x == v {
                sa.swap(c, d);
                d -= 1;
            }
            c -= 1;
        }
    }

    if a > d {
        return (first, last);
    }

    // Move the equal items from both ends into the middle
    let greater = d + 1 - b;
    let s = (a - first).min(b - a);
    swap_blocks(sa, first, b - s, s);
    let s = greater.min(last - d - 1);
    swap_blocks(sa, b, last - s, s);

    (first + (b - a), last - greater)
}
