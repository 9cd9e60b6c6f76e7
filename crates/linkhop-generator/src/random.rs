use crate::Generator;
use linkhop_core::token::{ALPHABET, MAX_LENGTH, MIN_LENGTH};
use linkhop_core::ShortToken;
use typed_builder::TypedBuilder;

pub const DEFAULT_LENGTH: usize = 8;

/// Random fixed-length tokens over the URL-safe alphabet.
///
/// Characters are drawn with `nanoid`, which reads from the operating
/// system's cryptographically secure random source.
#[derive(Debug, Clone, TypedBuilder)]
pub struct RandomGenerator {
    #[builder(default = DEFAULT_LENGTH, setter(transform = |len: usize| len.clamp(MIN_LENGTH, MAX_LENGTH)))]
    length: usize,
}

impl RandomGenerator {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for RandomGenerator {
    fn generate(&self) -> ShortToken {
        let length = self.length;
        ShortToken::new_unchecked(nanoid::nanoid!(length, &ALPHABET))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generates_fixed_length_valid_tokens() {
        let generator = RandomGenerator::new();

        for _ in 0..200 {
            let token = generator.generate();
            assert_eq!(token.as_str().len(), DEFAULT_LENGTH);
            assert!(ShortToken::new(token.as_str()).is_ok(), "{token}");
        }
    }

    #[test]
    fn length_is_clamped() {
        assert_eq!(RandomGenerator::builder().length(1).build().length(), MIN_LENGTH);
        assert_eq!(RandomGenerator::builder().length(99).build().length(), MAX_LENGTH);
        assert_eq!(RandomGenerator::builder().length(12).build().generate().as_str().len(), 12);
    }

    #[test]
    fn configured_lengths_produce_valid_tokens() {
        for length in [MIN_LENGTH, DEFAULT_LENGTH, 16, MAX_LENGTH] {
            let generator = RandomGenerator::builder().length(length).build();
            let token = generator.generate();
            assert_eq!(token.as_str().len(), length);
            assert!(token.as_str().chars().all(|c| ALPHABET.contains(&c)), "{token}");
        }
    }

    #[test]
    fn tokens_are_not_repeated() {
        let generator = RandomGenerator::new();
        let tokens: HashSet<_> = (0..1000).map(|_| generator.generate()).collect();
        assert_eq!(tokens.len(), 1000);
    }
}
