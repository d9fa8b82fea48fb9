use rand::Rng;
use rand::seq::SliceRandom;

/// Uniformly random permutation of `items`, using the thread-local generator.
#[must_use]
pub fn shuffle<T: Clone>(items: &[T]) -> Vec<T> {
    shuffle_with(items, &mut rand::rng())
}

/// Uniformly random permutation of `items` drawn from `rng`.
///
/// Each call is independent; an empty slice yields an empty vector.
#[must_use]
pub fn shuffle_with<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    out.as_mut_slice().shuffle(rng);
    out
}
