// Copyright 2024 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

//! Constant-time integer logarithm and square root.

/// Largest block handled by a single substring introsort pass.
pub(super) const SS_BLOCKSIZE: usize = 1024;

/// `LG_TABLE[i]` is `floor(log2(i))`, with `-1` for zero.
static LG_TABLE: [i32; 256] = lg_table();

/// `SQQ_TABLE[i]` is `floor(16 * sqrt(i))`.
static SQQ_TABLE: [i32; 256] = sqq_table();

const fn lg_table() -> [i32; 256] {
    let mut table = [-1; 256];
    let mut i = 1;
    while i < 256 {
        table[i] = (i as u32).ilog2() as i32;
        i += 1;
    }
    table
}

const fn sqq_table() -> [i32; 256] {
    let mut table = [0; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = (256 * i as u32).isqrt() as i32;
        i += 1;
    }
    table
}

#[inline]
fn lg(x: u32) -> i32 {
    LG_TABLE[(x & 0xff) as usize]
}

/// Returns `floor(log2(n))` for positive `n` and `-1` for zero.
#[inline]
pub(super) fn ilg(n: usize) -> i32 {
    let n = n as u32;
    if n & 0xffff_0000 != 0 {
        if n & 0xff00_0000 != 0 {
            24 + lg(n >> 24)
        } else {
            16 + lg(n >> 16)
        }
    } else if n & 0x0000_ff00 != 0 {
        8 + lg(n >> 8)
    } else {
        lg(n)
    }
}

/// Returns an approximation of `floor(sqrt(x))`, saturating at [`SS_BLOCKSIZE`].
///
/// Used to size the merge buffer carved out of a bucket when the shared buffer is too small.
pub(super) fn isqrt(x: usize) -> usize {
    if x >= SS_BLOCKSIZE * SS_BLOCKSIZE {
        return SS_BLOCKSIZE;
    }

    let x = x as i32;
    let e = ilg(x as usize);
    let y = if e >= 16 {
        let mut y = SQQ_TABLE[(x >> ((e - 6) - (e & 1))) as usize] << ((e >> 1) - 7);
        if e >= 24 {
            y = (y + 1 + x / y) >> 1;
        }
        (y + 1 + x / y) >> 1
    } else if e >= 8 {
        (SQQ_TABLE[(x >> ((e - 6) - (e & 1))) as usize] >> (7 - (e >> 1))) + 1
    } else {
        return (SQQ_TABLE[x as usize] >> 4) as usize;
    };

    if x < y * y { (y - 1) as usize } else { y as usize }
}
