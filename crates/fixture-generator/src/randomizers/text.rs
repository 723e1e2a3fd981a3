//! Text value generators.

use crate::config::{Charset, SizeRange};
use fixture_core::Value;
use rand::Rng;

/// Build a string of exactly `len` characters drawn from `charset`.
pub fn random_text<R: Rng>(rng: &mut R, charset: Charset, len: usize) -> String {
    (0..len).map(|_| charset.sample_char(rng)).collect()
}

/// Generate a string whose length is drawn from `length`.
pub fn generate_string<R: Rng>(rng: &mut R, charset: Charset, length: SizeRange) -> Value {
    let len = length.sample(rng);
    Value::String(random_text(rng, charset, len))
}

/// Generate a single character.
pub fn generate_char<R: Rng>(rng: &mut R, charset: Charset) -> Value {
    Value::Char(charset.sample_char(rng))
}
