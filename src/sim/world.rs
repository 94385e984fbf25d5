/// Session: the complete state of a running game.
///
/// ## Ownership
///
///   - `world`   : static platforms and walls. Built once, never mutated.
///   - everything else (player, enemies, items, checkpoints, zone, toggles)
///     is mutated only by `step()` and the operations below, which `step()`
///     calls while applying queued actions.
///
/// ## Notices
///
/// `message` / `message_timer` hold a transient user-visible line. The timer
/// counts ticks and is advanced by `step()`.

use glam::Vec3;
use tracing::{debug, info, warn};

use crate::config::Tuning;
use crate::domain::checkpoint::{Checkpoint, Checkpoints};
use crate::domain::entity::{Enemy, Item, ItemKind, Platform, Player, Variant, ZoneModel};
use crate::domain::jump::JumpCharge;
use crate::domain::zone::{CellBounds, Zone, ZoneMonitor};
use crate::error::CheckpointError;
use super::event::{GameEvent, LightMode};
use super::level::Layout;

/// Ticks a notice stays on screen.
pub const NOTICE_TICKS: u32 = 120;

/// Immutable level geometry.
#[derive(Clone, Debug, Default)]
pub struct StaticWorld {
    pub platforms: Vec<Platform>,
    /// Boundary walls; drawn, never collided with (the boundary clamp does that job).
    pub walls: Vec<Platform>,
}

#[derive(Clone, Debug)]
pub struct Session {
    pub variant: Variant,
    pub tuning: Tuning,
    pub world: StaticWorld,
    pub spawn: Vec3,

    // ── Actors ──
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub items: Vec<Item>,

    // ── Progress ──
    pub checkpoints: Checkpoints,
    pub zone: ZoneMonitor,
    pub gravity_enabled: bool,
    /// Gravity switches picked up; toggling gravity needs at least one.
    pub gravity_switches: u32,
    pub light: LightMode,

    // ── Timing / notices ──
    pub tick: u64,
    pub message: String,
    pub message_timer: u32,
}

// ── Construction ──

impl Session {
    pub fn new(layout: Layout, tuning: Tuning) -> Self {
        let player = Player::new(layout.spawn, layout.variant, tuning.player_max_health);
        let mut session = Session {
            variant: layout.variant,
            world: StaticWorld {
                platforms: layout.platforms,
                walls: layout.walls,
            },
            spawn: layout.spawn,
            player,
            enemies: layout.enemies,
            items: layout.items,
            checkpoints: Checkpoints::new(),
            zone: ZoneMonitor::new(true),
            gravity_enabled: true,
            gravity_switches: 0,
            light: LightMode::Dark,
            tick: 0,
            message: String::new(),
            message_timer: 0,
            tuning,
        };
        // no transition on the first tick
        session.zone = ZoneMonitor::new(session.inside_cell());
        session
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// Swap in new knobs. Takes effect on the next tick.
    pub fn apply_tuning(&mut self, tuning: Tuning) {
        self.player.max_health = tuning.player_max_health;
        self.player.health = self.player.health.min(self.player.max_health);
        self.tuning = tuning;
    }
}

// ── Zone queries ──

impl Session {
    pub fn cell_bounds(&self) -> CellBounds {
        CellBounds::square(self.tuning.cell_boundary)
    }

    /// Where the player stands right now, independent of the monitor.
    pub fn inside_cell(&self) -> bool {
        match self.variant.zone_model() {
            ZoneModel::Flat => true,
            ZoneModel::CellAndSpace => self.cell_bounds().contains(self.player.pos),
        }
    }

    /// The zone whose force model the next tick uses.
    pub fn zone(&self) -> Zone {
        self.zone.zone()
    }

    /// Enemies within detection range of the player.
    pub fn enemies_in_range(&self) -> usize {
        let range = self.tuning.enemy_detection_range;
        self.enemies.iter()
            .filter(|e| e.pos.distance(self.player.pos) <= range)
            .count()
    }
}

// ── Jumping ──

impl Session {
    /// Jump control released (charging variant).
    pub fn release_jump(&mut self, events: &mut Vec<GameEvent>) -> bool {
        let t = &self.tuning;
        let p = &mut self.player;
        match p.jump.release(p.grounded, t.jump_power, t.max_jump_power, t.max_jump_charge) {
            Some(power) => {
                self.launch(power, events);
                true
            }
            None => false,
        }
    }

    /// Jump control pressed (instant-jump variant).
    pub fn press_jump(&mut self, events: &mut Vec<GameEvent>) -> bool {
        if !self.player.grounded {
            return false;
        }
        self.launch(self.tuning.jump_power, events);
        true
    }

    fn launch(&mut self, power: f32, events: &mut Vec<GameEvent>) {
        self.player.vel.y = power;
        self.player.grounded = false;
        debug!(power, "jump");
        events.push(GameEvent::JumpLaunched { pos: self.player.pos, power });
    }
}

// ── Damage & items ──

impl Session {
    /// No floor clamp: health may dip below zero until the GameOver check
    /// right after, which restores it to full.
    pub fn take_damage(&mut self, amount: i32, events: &mut Vec<GameEvent>) {
        self.player.health -= amount;
        events.push(GameEvent::DamageTaken {
            pos: self.player.pos,
            amount,
            health: self.player.health,
        });
        if self.player.health <= 0 {
            self.game_over(events);
        }
    }

    fn game_over(&mut self, events: &mut Vec<GameEvent>) {
        info!(tick = self.tick, "game over");
        self.player.health = self.player.max_health;
        self.set_message("GAME OVER - systems restored", NOTICE_TICKS);
        events.push(GameEvent::GameOver { pos: self.player.pos });
    }

    /// One-shot pickup. Already-collected items are ignored.
    pub fn collect_item(&mut self, index: usize, events: &mut Vec<GameEvent>) -> bool {
        let (pos, kind) = match self.items.get_mut(index) {
            Some(item) if !item.collected => {
                item.collected = true;
                (item.pos, item.kind)
            }
            _ => return false,
        };

        match kind {
            ItemKind::Health => {
                let p = &mut self.player;
                p.health = (p.health + self.tuning.health_pickup).min(p.max_health);
            }
            ItemKind::GravitySwitch => {
                self.gravity_switches += 1;
            }
            ItemKind::Weapon => {}
        }

        info!(?kind, "item collected");
        self.set_message(&format!("Collected: {}", kind.label()), NOTICE_TICKS);
        events.push(GameEvent::ItemCollected { pos, kind });
        true
    }
}

// ── Toggles ──

impl Session {
    pub fn toggle_gravity(&mut self, events: &mut Vec<GameEvent>) -> bool {
        if self.gravity_switches == 0 {
            self.set_message("Gravity switch required", NOTICE_TICKS);
            return false;
        }
        self.gravity_enabled = !self.gravity_enabled;
        let label = if self.gravity_enabled { "ON" } else { "OFF" };
        info!(enabled = self.gravity_enabled, "gravity toggled");
        self.set_message(&format!("Gravity {label}"), NOTICE_TICKS);
        events.push(GameEvent::GravityToggled {
            pos: self.player.pos,
            enabled: self.gravity_enabled,
        });
        true
    }

    pub fn toggle_light(&mut self, events: &mut Vec<GameEvent>) {
        self.light = self.light.toggled();
        self.set_message(&format!("{} mode", self.light.label()), NOTICE_TICKS);
        events.push(GameEvent::LightToggled { pos: self.player.pos, mode: self.light });
    }

    /// Placeholder hook; nothing in the world reacts yet.
    pub fn interact(&mut self, events: &mut Vec<GameEvent>) {
        self.set_message("Nothing to interact with", NOTICE_TICKS);
        events.push(GameEvent::Interacted { pos: self.player.pos });
    }
}

// ── Checkpoints ──

impl Session {
    pub fn create_checkpoint(&mut self, events: &mut Vec<GameEvent>) -> Result<Checkpoint, CheckpointError> {
        match self.checkpoints.create(self.player.pos, self.tick, self.tuning.max_checkpoints) {
            Ok(cp) => {
                info!(id = cp.id, tick = cp.created_tick, "checkpoint created");
                self.set_message(&format!("Checkpoint {} created", cp.id), NOTICE_TICKS);
                events.push(GameEvent::CheckpointCreated { id: cp.id, pos: cp.pos });
                Ok(cp)
            }
            Err(e) => Err(self.reject(e, events)),
        }
    }

    /// Back to the current checkpoint: exact position, zero velocity, full health.
    /// Contact is dropped until the next contact pass finds ground again.
    pub fn respawn_at_checkpoint(&mut self, events: &mut Vec<GameEvent>) -> Result<Checkpoint, CheckpointError> {
        let cp = match self.checkpoints.current() {
            Ok(cp) => *cp,
            Err(e) => return Err(self.reject(e, events)),
        };
        let p = &mut self.player;
        p.pos = cp.pos;
        p.vel = Vec3::ZERO;
        p.grounded = false;
        p.jump = JumpCharge::default();
        p.health = p.max_health;
        info!(id = cp.id, "respawned");
        self.set_message(&format!("Respawned at checkpoint {}", cp.id), NOTICE_TICKS);
        events.push(GameEvent::Respawned { id: cp.id, pos: cp.pos });
        Ok(cp)
    }

    pub fn clear_all_checkpoints(&mut self, events: &mut Vec<GameEvent>) -> usize {
        let count = self.checkpoints.clear();
        info!(count, "checkpoints cleared");
        self.set_message("All checkpoints cleared", NOTICE_TICKS);
        events.push(GameEvent::CheckpointsCleared { count, pos: self.player.pos });
        count
    }

    fn reject(&mut self, error: CheckpointError, events: &mut Vec<GameEvent>) -> CheckpointError {
        warn!(%error, "checkpoint operation rejected");
        self.set_message(&capitalize(&error.to_string()), NOTICE_TICKS);
        events.push(GameEvent::CheckpointFailed { error });
        error
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
