// Copyright 2024 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

#![allow(missing_docs)]

use std::error::Error;

use rand::{RngCore, SeedableRng, rngs::StdRng};
use sufsort::{Algorithm, SortConfig, SortError, SuffixArray};

const ALGORITHMS: [Algorithm; 2] = [Algorithm::DivSufSort, Algorithm::Sais];

fn naive(text: &[u8]) -> Vec<u32> {
    let mut suffixes: Vec<u32> = (0..text.len() as u32).collect();
    suffixes.sort_by(|&a, &b| text[a as usize..].cmp(&text[b as usize..]));
    suffixes
}

fn assert_sorted(text: &[u8], suffixes: &[u32]) {
    sufsort::verify(text, suffixes).unwrap();
    for pair in suffixes.windows(2) {
        assert!(
            text[pair[0] as usize..] < text[pair[1] as usize..],
            "suffix {} sorts after suffix {}",
            pair[0],
            pair[1],
        );
    }
}

fn sort_with(text: &[u8], algorithm: Algorithm) -> Result<Vec<u32>, SortError> {
    let mut config = SortConfig::new();
    config.algorithm(algorithm).verify(true);
    sufsort::sort_with_config(text, &config)
}

fn random_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut data = vec![0; len];
    StdRng::seed_from_u64(seed).fill_bytes(&mut data);
    data
}

#[test]
fn banana() -> Result<(), Box<dyn Error>> {
    for algorithm in ALGORITHMS {
        assert_eq!(sort_with(b"banana", algorithm)?, [5, 3, 1, 0, 4, 2]);
    }

    Ok(())
}

#[test]
fn degenerate_inputs() -> Result<(), Box<dyn Error>> {
    for algorithm in ALGORITHMS {
        assert_eq!(sort_with(b"", algorithm)?, Vec::<u32>::new());
        assert_eq!(sort_with(b"z", algorithm)?, [0]);
        assert_eq!(sort_with(b"\0", algorithm)?, [0]);
    }

    Ok(())
}

#[test]
fn random_bytes_10k() -> Result<(), Box<dyn Error>> {
    let text = random_bytes(0x5EED, 10_000);

    for algorithm in ALGORITHMS {
        let suffixes = sort_with(&text, algorithm)?;
        assert_sorted(&text, &suffixes);
    }

    Ok(())
}

#[test]
fn single_byte_10k() -> Result<(), Box<dyn Error>> {
    let text = vec![b'a'; 10_000];
    let expected: Vec<u32> = (0..10_000).rev().collect();

    for algorithm in ALGORITHMS {
        assert_eq!(sort_with(&text, algorithm)?, expected);
    }

    Ok(())
}

#[test]
fn utf8_with_repeats() -> Result<(), Box<dyn Error>> {
    let text = "🦀 sorts 🦀, 🦀🦀 sorts 🦀🦀; ünïcödé 🦀 sorts ünïcödé 🦀".repeat(7);
    let text = text.as_bytes();

    for algorithm in ALGORITHMS {
        assert_eq!(sort_with(text, algorithm)?, naive(text));
    }

    Ok(())
}

#[test]
fn fibonacci_words() -> Result<(), Box<dyn Error>> {
    // Fibonacci words are rich in tandem repeats
    let (mut a, mut b) = (b"a".to_vec(), b"ab".to_vec());
    while b.len() < 5_000 {
        let next = [b.as_slice(), a.as_slice()].concat();
        a = b;
        b = next;
    }

    for algorithm in ALGORITHMS {
        assert_eq!(sort_with(&b, algorithm)?, naive(&b));
    }

    Ok(())
}

#[test]
fn periodic_inputs() -> Result<(), Box<dyn Error>> {
    for period in [b"ab".as_slice(), b"abc", b"aab", b"abcabd", b"\xff\0"] {
        let text = period.repeat(3_000 / period.len());
        let text = [text.as_slice(), b"a"].concat();

        for algorithm in ALGORITHMS {
            assert_eq!(sort_with(&text, algorithm)?, naive(&text));
        }
    }

    Ok(())
}

#[test]
fn resorting_is_independent_of_history() -> Result<(), Box<dyn Error>> {
    let text = random_bytes(7, 2_000);
    let other = vec![b'x'; 2_000];

    let first = sufsort::sort(&text)?;
    sufsort::sort(&other)?;
    let second = sufsort::sort(&text)?;
    assert_eq!(first, second);

    // Sorting into a dirty buffer gives the same answer
    let mut buffer = vec![u32::MAX; text.len()];
    sufsort::sort_into(&text, &mut buffer)?;
    assert_eq!(buffer, first);
    assert_sorted(&text, &buffer);

    Ok(())
}

#[test]
fn length_mismatch_leaves_buffer_untouched() {
    let mut suffixes = [9; 4];

    assert_eq!(
        sufsort::sort_into(b"abc", &mut suffixes),
        Err(SortError::LengthMismatch {
            text: 3,
            suffixes: 4
        }),
    );
    assert_eq!(suffixes, [9; 4]);
}

#[test]
fn suffix_array_search() -> Result<(), Box<dyn Error>> {
    let text = random_bytes(42, 4_096);
    let sa = SuffixArray::new(&text)?;

    assert_eq!(sa.as_slice(), naive(&text));
    assert!(sa.contains(&text[1_000..1_016]));

    let found = sa.longest_match(&text[3_000..3_064]).ok_or("no match")?;
    assert_eq!(found.len(), 64);
    assert_eq!(&text[found.position()..][..64], &text[3_000..3_064]);

    Ok(())
}
