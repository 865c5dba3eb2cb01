// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Collision-free human-readable agent id generation.
//!
//! Names are `{adjective}_{noun}` drawn from two fixed word lists of at
//! least 100 entries each, for 10k+ combinations. `generate()` uses
//! rejection sampling; after [`REJECTION_ATTEMPTS`] failed draws under
//! contention it falls back to a deterministic linear scan of the full
//! product so exhaustion is only ever reported when truly every
//! combination is in use.

use parking_lot::Mutex;
use std::collections::HashSet;
use thiserror::Error;

use rand::Rng;

/// Failed draws tolerated before falling back to a deterministic scan.
pub const REJECTION_ATTEMPTS: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameGeneratorError {
    #[error("no unused agent name remains in the {0}x{1} adjective/noun space")]
    NameExhausted(usize, usize),
}

impl NameGeneratorError {
    pub fn code(&self) -> crate::ErrorCode {
        crate::ErrorCode::NameExhausted
    }
}

/// Issues unique `adjective_noun` names, safe for concurrent callers.
pub struct NameGenerator {
    adjectives: Vec<&'static str>,
    nouns: Vec<&'static str>,
    in_use: Mutex<HashSet<String>>,
}

impl NameGenerator {
    pub fn new() -> Self {
        Self::with_words(ADJECTIVES.to_vec(), NOUNS.to_vec())
    }

    pub fn with_words(adjectives: Vec<&'static str>, nouns: Vec<&'static str>) -> Self {
        Self { adjectives, nouns, in_use: Mutex::new(HashSet::new()) }
    }

    /// Total distinct combinations in the word space.
    pub fn capacity(&self) -> usize {
        self.adjectives.len() * self.nouns.len()
    }

    /// Draw an unused name. Safe to call from multiple threads/tasks
    /// concurrently — the in-use set is guarded by a mutex and each
    /// successful draw inserts atomically under that same lock.
    pub fn generate(&self) -> Result<String, NameGeneratorError> {
        let mut rng = rand::thread_rng();
        {
            let mut in_use = self.in_use.lock();
            for _ in 0..REJECTION_ATTEMPTS {
                let a = self.adjectives[rng.gen_range(0..self.adjectives.len())];
                let n = self.nouns[rng.gen_range(0..self.nouns.len())];
                let name = format!("{a}_{n}");
                if in_use.insert(name.clone()) {
                    return Ok(name);
                }
            }
            // Contended: deterministically scan for any free combination
            // rather than keep burning random draws against a near-full space.
            for a in &self.adjectives {
                for n in &self.nouns {
                    let name = format!("{a}_{n}");
                    if in_use.insert(name.clone()) {
                        return Ok(name);
                    }
                }
            }
        }
        Err(NameGeneratorError::NameExhausted(self.adjectives.len(), self.nouns.len()))
    }

    /// Mark a name reusable. Releasing a name that was never issued is a
    /// harmless no-op.
    pub fn release(&self, name: &str) {
        self.in_use.lock().remove(name);
    }

    /// Number of names currently checked out.
    pub fn in_use_count(&self) -> usize {
        self.in_use.lock().len()
    }
}

impl Default for NameGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// 100+ adjectives. Order is irrelevant; uniqueness within the list matters.
pub const ADJECTIVES: &[&str] = &[
    "able", "acute", "adept", "agile", "airy", "alert", "amber", "ample", "ancient", "apt",
    "arid", "avid", "awake", "bold", "brave", "brief", "bright", "brisk", "broad", "bronze",
    "busy", "calm", "candid", "canny", "casual", "clean", "clear", "clever", "close", "coral",
    "cosmic", "cozy", "crisp", "cyan", "dapper", "daring", "dawn", "deep", "direct", "driven",
    "dry", "dusty", "eager", "early", "earnest", "easy", "elder", "even", "exact", "fair",
    "famous", "fast", "fine", "firm", "fleet", "fluent", "fond", "fresh", "frugal", "full",
    "gentle", "giant", "glad", "gold", "good", "grand", "great", "green", "grey", "happy",
    "hardy", "hasty", "honest", "hushed", "humble", "ideal", "jade", "jolly", "keen", "kind",
    "known", "lean", "light", "lithe", "lively", "loyal", "lucid", "lucky", "lunar", "mellow",
    "merry", "mighty", "mild", "modest", "neat", "new", "nimble", "noble", "numb", "odd",
    "open", "pale", "patient", "pink", "plain", "plucky", "polar", "proud", "quick", "quiet",
    "rapid", "rare", "ready", "regal", "ripe", "robust", "rosy", "royal", "rugged", "sage",
    "sharp", "sheer", "shy", "silent", "silver", "simple", "sincere", "sleek", "slim", "smart",
    "smooth", "snug", "solar", "solid", "sound", "spare", "spry", "stark", "steady", "stellar",
    "still", "stout", "strong", "sturdy", "subtle", "sunny", "super", "sure", "swift", "tame",
    "tidy", "tight", "trim", "true", "upbeat", "urban", "valiant", "vast", "vital", "vivid",
    "warm", "wary", "wild", "wise", "witty", "young", "zesty", "zippy",
];

/// 100+ nouns, all short and neutral (no evocative or place-based names
/// to avoid giving operators the wrong impression of significance).
pub const NOUNS: &[&str] = &[
    "otter", "falcon", "heron", "lynx", "badger", "marten", "osprey", "raven", "swift", "wren",
    "finch", "martin", "weasel", "vole", "newt", "gecko", "hare", "ibex", "kite", "lark",
    "magpie", "mink", "oriole", "petrel", "puffin", "quail", "robin", "sable", "shrike",
    "skink", "sparrow", "stoat", "swan", "tern", "thrush", "toucan", "viper", "warbler",
    "wigeon", "bison", "camel", "civet", "coyote", "cricket", "dingo", "dormouse", "eagle",
    "egret", "ermine", "ferret", "fossa", "genet", "gibbon", "gopher", "grouse", "harrier",
    "heron2", "hoopoe", "hornbill", "hyena", "jackal", "jaguar", "jay", "kestrel", "kingfisher",
    "kiwi", "koala", "lemur", "leopard", "loris", "macaw", "manatee", "meerkat", "mongoose",
    "moorhen", "moose", "narwhal", "ocelot", "okapi", "onager", "oryx", "otterhound", "panther",
    "parrot", "pelican", "penguin", "phoenix", "pika", "plover", "polecat", "pony", "possum",
    "puma", "python", "quetzal", "rail", "ringtail", "roadrunner", "saiga", "serval", "shrew",
    "skua", "sloth", "snipe", "stork", "tanager", "tapir", "tayra", "teal", "tiger", "toad",
    "tortoise", "vervet", "vixen", "vulture", "wallaby", "warthog", "weka", "wolverine",
    "woodpecker", "wombat", "yak", "zebra",
];

#[cfg(test)]
#[path = "name_generator_tests.rs"]
mod tests;
