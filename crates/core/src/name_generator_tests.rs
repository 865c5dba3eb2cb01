// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn capacity_is_product_of_word_lists() {
    let gen = NameGenerator::new();
    assert_eq!(gen.capacity(), ADJECTIVES.len() * NOUNS.len());
    assert!(gen.capacity() >= 10_000);
}

#[test]
fn generate_yields_unique_names() {
    let gen = NameGenerator::new();
    let mut seen = std::collections::HashSet::new();
    for _ in 0..500 {
        let name = gen.generate().unwrap();
        assert!(seen.insert(name), "generate() returned a name already in use");
    }
    assert_eq!(gen.in_use_count(), 500);
}

#[test]
fn release_allows_reuse() {
    let gen = NameGenerator::with_words(vec!["brave"], vec!["otter"]);
    let name = gen.generate().unwrap();
    assert_eq!(name, "brave_otter");
    assert!(gen.generate().is_err());

    gen.release(&name);
    assert_eq!(gen.generate().unwrap(), "brave_otter");
}

#[test]
fn release_of_unknown_name_is_a_no_op() {
    let gen = NameGenerator::new();
    gen.release("not_issued");
    assert_eq!(gen.in_use_count(), 0);
}

#[test]
fn exhaustion_falls_back_to_deterministic_scan_then_fails() {
    let gen = NameGenerator::with_words(vec!["a", "b"], vec!["x", "y"]);
    let mut names = Vec::new();
    for _ in 0..4 {
        names.push(gen.generate().unwrap());
    }
    names.sort();
    assert_eq!(names, vec!["a_x", "a_y", "b_x", "b_y"]);

    match gen.generate() {
        Err(NameGeneratorError::NameExhausted(a, n)) => {
            assert_eq!(a, 2);
            assert_eq!(n, 2);
        }
        other => panic!("expected NameExhausted, got {other:?}"),
    }
}

#[test]
fn error_code_maps_to_name_exhausted() {
    let err = NameGeneratorError::NameExhausted(2, 2);
    assert_eq!(err.code(), crate::ErrorCode::NameExhausted);
}
