//! Stable snapshot hashing for determinism checks.

use std::hash::Hasher;

use xxhash_rust::xxh3::Xxh3;

use super::*;
use crate::types::Mode;

impl Session {
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.config.seed);
        hasher.write_u64(self.tick);
        hasher.write_u32(self.player.position.x.to_bits());
        hasher.write_u32(self.player.position.y.to_bits());
        hasher.write_u32(self.player.stamina.to_bits());
        hasher.write_u64(self.remaining_objectives.len() as u64);
        hasher.write_u8(u8::from(self.rage));
        for pursuer in self.pool.iter_active() {
            hasher.write_u16(pursuer.id.0);
            hasher.write_u32(pursuer.position.x.to_bits());
            hasher.write_u32(pursuer.position.y.to_bits());
            hasher.write_u8(match pursuer.mode {
                Mode::Patrol => 0,
                Mode::Chase => 1,
                Mode::Ambush => 2,
                Mode::ForcedTarget => 3,
            });
            hasher.write_u64(pursuer.path.waypoints().len() as u64);
        }
        for (_, light) in self.lights.iter() {
            hasher.write_u8(u8::from(light.active) | u8::from(light.casts_shadow) << 1);
        }
        hasher.finish()
    }
}
