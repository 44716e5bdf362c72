//! Read-only views for the render layer. Interpolation never feeds back into
//! simulation state.

use glam::Vec2;
use serde::Serialize;

use super::*;
use crate::types::Mode;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PursuerFrame {
    pub agent: AgentId,
    pub position: Vec2,
    pub mode: Mode,
    pub muffled: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LightFrame {
    pub cell: Cell,
    pub intensity: f32,
    pub active: bool,
    pub casts_shadow: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderFrame {
    pub alpha: f32,
    pub player_position: Vec2,
    pub player_yaw: f32,
    pub pursuers: Vec<PursuerFrame>,
    pub lights: Vec<LightFrame>,
}

impl Session {
    /// Blend each entity between its pre-tick and post-tick positions.
    pub fn render_frame(&self, alpha: f32) -> RenderFrame {
        let alpha = alpha.clamp(0.0, 1.0);
        RenderFrame {
            alpha,
            player_position: self.player.previous_position.lerp(self.player.position, alpha),
            player_yaw: self.player.yaw,
            pursuers: self
                .pool
                .iter_active()
                .map(|pursuer| PursuerFrame {
                    agent: pursuer.id,
                    position: pursuer.previous_position.lerp(pursuer.position, alpha),
                    mode: pursuer.mode,
                    muffled: pursuer.muffled,
                })
                .collect(),
            lights: self
                .lights
                .iter()
                .map(|(_, light)| LightFrame {
                    cell: light.cell,
                    intensity: light.intensity,
                    active: light.active,
                    casts_shadow: light.casts_shadow,
                })
                .collect(),
        }
    }
}
