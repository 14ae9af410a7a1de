//! Winner selection: everyone when seats suffice, otherwise a uniformly random
//! subset drawn by shuffling a copy of the candidates.

use lt_core::DrawRng;

/// Winners among `candidates` for `seats` seats.
///
/// - `len <= seats`: all candidates, input order, no draws.
/// - otherwise: Fisher–Yates on a copy, first `seats` elements.
///
/// The input slice is never reordered.
pub fn select_winners<T: Clone>(candidates: &[T], seats: usize, rng: &mut DrawRng) -> Vec<T> {
    if candidates.len() <= seats {
        return candidates.to_vec();
    }
    if seats == 0 {
        return Vec::new();
    }
    let mut pool = candidates.to_vec();
    rng.shuffle_in_place(&mut pool);
    pool.truncate(seats);
    pool
}
