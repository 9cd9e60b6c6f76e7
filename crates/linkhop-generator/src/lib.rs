//! Short token generators.

pub mod random;
pub mod seq;

pub use random::RandomGenerator;
pub use seq::SeqGenerator;

use linkhop_core::ShortToken;

/// Trait for generating candidate short tokens.
///
/// Implementations are pure generators that don't interact with storage;
/// uniqueness against existing records is checked by the allocator.
pub trait Generator: Send + Sync + 'static {
    /// Produces the next candidate token.
    fn generate(&self) -> ShortToken;
}
