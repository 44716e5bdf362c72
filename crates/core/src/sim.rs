//! Per-tick simulation subsystems driven by [`crate::session::Session`].
//! Each submodule owns one concern; the session owns the order they run in.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::Rng;

pub mod clock;
pub mod lights;
pub mod path_service;
pub mod pathfinding;
pub mod player;
pub mod pool;
pub mod pursuit;
pub mod visibility;

#[cfg(test)]
pub(crate) mod test_support;

/// Uniform sample in `[0, 1)` with 24 bits of precision.
pub(crate) fn unit_f32(rng: &mut ChaCha8Rng) -> f32 {
    (rng.next_u32() >> 8) as f32 / (1_u32 << 24) as f32
}

pub(crate) fn pick<T: Copy>(rng: &mut ChaCha8Rng, items: &[T]) -> Option<T> {
    if items.is_empty() {
        return None;
    }
    Some(items[rng.next_u64() as usize % items.len()])
}
