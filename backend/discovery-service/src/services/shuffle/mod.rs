// ============================================
// Fisher-Yates Shuffle
// ============================================
//
// Backward Fisher-Yates:
//   for i in (1..len).rev():
//     j = uniform(0..=i)
//     swap(i, j)
//
// Every permutation is equally likely given a uniform source. Comparator based
// "random sort" is biased and is not used anywhere in the pipeline.

use rand::Rng;

/// Returns a uniformly random permutation of `items`, leaving `items` untouched.
pub fn shuffle<T: Clone>(items: &[T]) -> Vec<T> {
    shuffle_with(items, &mut rand::thread_rng())
}

/// Same as [`shuffle`] with an explicit random source.
pub fn shuffle_with<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut shuffled = items.to_vec();
    shuffle_in_place(&mut shuffled, rng);
    shuffled
}

/// Permutes an owned buffer in place.
pub fn shuffle_in_place<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}
