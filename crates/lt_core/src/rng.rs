// crates/lt_core/src/rng.rs
//
// Deterministic RNG for lottery draws.
//
// • Seeded only from the run seed; identical seed ⇒ identical stream.
// • xorshift128 over four 32-bit words. The seed fills `x` (low 32 bits);
//   `y`, `z`, `w` start from fixed non-zero constants.
// • Floats are `u32 / 2^32`, so every draw lies in [0, 1).
// • One `DrawRng` is shared by both allocation passes of a run; we count the
//   words consumed so the run record can echo them.

use rand_core::{impls, Error, RngCore, SeedableRng};

const Y0: u32 = 362_436_069;
const Z0: u32 = 521_288_629;
const W0: u32 = 88_675_123;
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Seedable xorshift128 stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawRng {
    x: u32,
    y: u32,
    z: u32,
    w: u32,
    draws: u64,
}

impl DrawRng {
    /// Construct from a run seed. Only the low 32 bits reach the state.
    #[inline]
    pub fn from_seed_u64(seed: u64) -> Self {
        Self::from_word(seed as u32)
    }

    #[inline]
    fn from_word(x: u32) -> Self {
        Self { x, y: Y0, z: Z0, w: W0, draws: 0 }
    }

    /// Number of 32-bit words drawn so far (saturating).
    #[inline]
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Advance the state; the only place the counter moves.
    #[inline]
    fn step(&mut self) -> u32 {
        let t = self.x ^ (self.x << 11);
        self.x = self.y;
        self.y = self.z;
        self.z = self.w;
        self.w = self.w ^ (self.w >> 19) ^ (t ^ (t >> 8));
        self.draws = self.draws.saturating_add(1);
        self.w
    }

    /// Next float in [0, 1).
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.step()) / TWO_POW_32
    }

    /// `floor(next_f64() * n)`; `n` must be > 0.
    #[inline]
    pub fn index_below(&mut self, n: usize) -> usize {
        debug_assert!(n > 0, "index_below(0)");
        let j = (self.next_f64() * n as f64) as usize;
        j.min(n.saturating_sub(1))
    }

    /// Deterministic in-place Fisher–Yates shuffle.
    ///
    /// for i in (1..len).rev() { j = floor(f * (i+1)); swap(i, j) }
    pub fn shuffle_in_place<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.index_below(i + 1);
            slice.swap(i, j);
        }
    }
}

impl RngCore for DrawRng {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for DrawRng {
    /// Little-endian bytes of the `x` word.
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::from_word(u32::from_le_bytes(seed))
    }

    /// Same truncation as [`DrawRng::from_seed_u64`], not the default PCG expansion.
    fn seed_from_u64(state: u64) -> Self {
        Self::from_seed_u64(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_vector_matches_xorshift128() {
        // Marsaglia's published state (x = 123456789) and first outputs.
        let mut rng = DrawRng::from_seed_u64(123_456_789);
        let got: Vec<u32> = (0..5).map(|_| rng.next_u32()).collect();
        assert_eq!(got, vec![3_701_687_786, 458_299_110, 2_500_872_618, 3_633_119_408, 516_391_518]);
        assert_eq!(rng.draws(), 5);
    }

    #[test]
    fn seed_one_stream() {
        let mut rng = DrawRng::from_seed_u64(1);
        assert_eq!(rng.next_u32(), 88_677_267);
        assert_eq!(rng.next_u32(), 3_267_056_546);
        assert_eq!(rng.next_u32(), 1_291_458_515);
    }

    #[test]
    fn floats_are_unit_interval_and_reproducible() {
        let mut a = DrawRng::from_seed_u64(42);
        let mut b = DrawRng::from_seed_u64(42);
        for _ in 0..1000 {
            let fa = a.next_f64();
            assert!((0.0..1.0).contains(&fa));
            assert_eq!(fa.to_bits(), b.next_f64().to_bits());
        }
    }

    #[test]
    fn only_low_32_bits_of_seed_matter() {
        let mut a = DrawRng::from_seed_u64(1);
        let mut b = DrawRng::from_seed_u64(1 + (1u64 << 32));
        assert_eq!(a.next_u32(), b.next_u32());
        assert_eq!(DrawRng::seed_from_u64(7), DrawRng::from_seed_u64(7));
        assert_eq!(DrawRng::from_seed(7u32.to_le_bytes()), DrawRng::from_seed_u64(7));
    }

    #[test]
    fn shuffle_is_deterministic_permutation() {
        let mut a = DrawRng::from_seed_u64(9);
        let mut b = DrawRng::from_seed_u64(9);
        let mut xs: Vec<u32> = (0..16).collect();
        let mut ys: Vec<u32> = (0..16).collect();
        a.shuffle_in_place(&mut xs);
        b.shuffle_in_place(&mut ys);
        assert_eq!(xs, ys);
        let mut sorted = xs.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..16).collect::<Vec<_>>());
        // len - 1 draws per shuffle
        assert_eq!(a.draws(), 15);
    }

    #[test]
    fn shuffle_of_two_with_seed_one_swaps() {
        // First float is 88677267 / 2^32 ≈ 0.0206 → j = 0 → swap.
        let mut rng = DrawRng::from_seed_u64(1);
        let mut xs = ["P1", "P2"];
        rng.shuffle_in_place(&mut xs);
        assert_eq!(xs, ["P2", "P1"]);
    }

    #[test]
    fn short_slices_draw_nothing() {
        let mut rng = DrawRng::from_seed_u64(3);
        let mut one = [1];
        rng.shuffle_in_place(&mut one);
        let mut none: [u8; 0] = [];
        rng.shuffle_in_place(&mut none);
        assert_eq!(rng.draws(), 0);
    }
}
