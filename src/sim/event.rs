/// Events emitted during a simulation step.
/// The presentation layer consumes these for bursts, sound and notices.

use glam::Vec3;

use crate::domain::entity::ItemKind;
use crate::error::CheckpointError;

/// Colour tag for the cosmetic particle burst attached to an event.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Burst {
    Cyan,
    Orange,
    Green,
    Yellow,
    Red,
    Blue,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LightMode {
    Dark,
    Light,
}

impl LightMode {
    pub fn toggled(self) -> Self {
        match self {
            LightMode::Dark => LightMode::Light,
            LightMode::Light => LightMode::Dark,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LightMode::Dark => "DARK",
            LightMode::Light => "LIGHT",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    JumpLaunched { pos: Vec3, power: f32 },
    DamageTaken { pos: Vec3, amount: i32, health: i32 },
    GameOver { pos: Vec3 },
    ItemCollected { pos: Vec3, kind: ItemKind },
    ZoneExited { pos: Vec3 },
    ZoneEntered { pos: Vec3 },
    CheckpointCreated { id: u32, pos: Vec3 },
    Respawned { id: u32, pos: Vec3 },
    CheckpointsCleared { count: usize, pos: Vec3 },
    CheckpointFailed { error: CheckpointError },
    GravityToggled { pos: Vec3, enabled: bool },
    LightToggled { pos: Vec3, mode: LightMode },
    Interacted { pos: Vec3 },
}

impl GameEvent {
    /// Where to put a particle burst for this event, and in what colour.
    pub fn burst(&self) -> Option<(Vec3, Burst)> {
        match *self {
            GameEvent::JumpLaunched { pos, .. } => Some((pos, Burst::Cyan)),
            GameEvent::DamageTaken { pos, .. } => Some((pos, Burst::Red)),
            GameEvent::ItemCollected { pos, kind } => Some((pos, match kind {
                ItemKind::Health => Burst::Green,
                ItemKind::GravitySwitch => Burst::Yellow,
                ItemKind::Weapon => Burst::Red,
            })),
            GameEvent::ZoneExited { pos } => Some((pos, Burst::Cyan)),
            GameEvent::ZoneEntered { pos } => Some((pos, Burst::Orange)),
            GameEvent::CheckpointCreated { pos, .. } => Some((pos, Burst::Green)),
            GameEvent::Respawned { pos, .. } => Some((pos, Burst::Cyan)),
            GameEvent::CheckpointsCleared { pos, .. } => Some((pos, Burst::Orange)),
            GameEvent::GravityToggled { pos, .. } => Some((pos, Burst::Yellow)),
            GameEvent::LightToggled { pos, mode } => Some((pos, match mode {
                LightMode::Light => Burst::Yellow,
                LightMode::Dark => Burst::Blue,
            })),
            GameEvent::GameOver { .. }
            | GameEvent::CheckpointFailed { .. }
            | GameEvent::Interacted { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_bursts_differ_by_direction() {
        let pos = Vec3::new(10.5, 1.0, 0.0);
        assert_eq!(GameEvent::ZoneExited { pos }.burst(), Some((pos, Burst::Cyan)));
        assert_eq!(GameEvent::ZoneEntered { pos }.burst(), Some((pos, Burst::Orange)));
    }

    #[test]
    fn item_burst_follows_kind() {
        let pos = Vec3::ZERO;
        let ev = GameEvent::ItemCollected { pos, kind: ItemKind::Health };
        assert_eq!(ev.burst(), Some((pos, Burst::Green)));
    }

    #[test]
    fn clearing_checkpoints_bursts_at_player() {
        let pos = Vec3::new(1.0, 1.0, 5.0);
        let ev = GameEvent::CheckpointsCleared { count: 3, pos };
        assert_eq!(ev.burst(), Some((pos, Burst::Orange)));
    }

    #[test]
    fn light_mode_toggles_back() {
        assert_eq!(LightMode::Dark.toggled().toggled(), LightMode::Dark);
    }
}
