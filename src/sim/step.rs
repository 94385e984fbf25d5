/// The step function: advances the session by one tick.
///
/// Processing order:
///   1. Tick counter and notice timer
///   2. Jump edge (release when charging, press when instant)
///   3. Jump-charge machine
///   4. Player forces + integration under last tick's zone
///   5. Boundary clamp
///   6. Floor / platform contacts (grounded recomputed)
///   7. Enemy patrols
///   8. Item pickups, then enemy contact damage
///   9. Queued actions (toggles, checkpoints, interact)
///  10. Zone monitor; its answer drives the next tick's force model

use tracing::info;

use crate::domain::collision;
use crate::domain::entity::{Variant, ZoneModel};
use crate::domain::input::{Action, FrameInput};
use crate::domain::physics;
use crate::domain::zone::{Zone, ZoneTransition};
use super::event::GameEvent;
use super::world::Session;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(session: &mut Session, input: FrameInput) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();
    session.tick += 1;

    if session.message_timer > 0 {
        session.message_timer -= 1;
        if session.message_timer == 0 { session.message.clear(); }
    }

    resolve_jump_edge(session, &input, &mut events);
    resolve_jump_charge(session, &input);
    resolve_player_motion(session, &input);
    resolve_contacts(session);
    resolve_enemies(session);
    resolve_item_pickup(session, &mut events);
    resolve_enemy_contact(session, &mut events);
    resolve_actions(session, &input.actions, &mut events);
    resolve_zone(session, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// Jumping
// ══════════════════════════════════════════════════════════════

fn resolve_jump_edge(session: &mut Session, input: &FrameInput, events: &mut Vec<GameEvent>) {
    if session.variant.charges_jump() {
        if input.jump_released {
            session.release_jump(events);
        }
    } else if input.jump_pressed {
        session.press_jump(events);
    }
}

fn resolve_jump_charge(session: &mut Session, input: &FrameInput) {
    if !session.variant.charges_jump() { return; }
    let permitted = session.zone() == Zone::Cell;
    let p = &mut session.player;
    p.jump.tick(input.jump_held, p.grounded, permitted, session.tuning.max_jump_charge);
}

// ══════════════════════════════════════════════════════════════
// Kinematics
// ══════════════════════════════════════════════════════════════

fn resolve_player_motion(session: &mut Session, input: &FrameInput) {
    let t = &session.tuning;
    let p = &mut session.player;

    match (session.variant, session.zone.zone()) {
        (Variant::Box2d, _) => {
            physics::side_forces(&mut p.vel, input.intent.x, session.gravity_enabled, t);
        }
        (Variant::Sphere3d, Zone::Cell) => {
            physics::cell_forces(&mut p.vel, input.intent, session.gravity_enabled, t);
        }
        (Variant::Sphere3d, Zone::Space) => {
            physics::space_forces(&mut p.vel, input.intent, input.jump_held, input.descend_held, t);
        }
    }

    physics::integrate(&mut p.pos, p.vel);
    physics::clamp_horizontal(&mut p.pos, t.world_boundary);
}

fn resolve_contacts(session: &mut Session) {
    let ground = session.tuning.ground_level;
    let platforms = &session.world.platforms;
    let p = &mut session.player;

    match session.variant {
        Variant::Box2d => {
            collision::resolve_boxes(p, platforms, ground);
        }
        Variant::Sphere3d => {
            if session.zone.zone() == Zone::Cell {
                collision::resolve_ground(p, platforms, ground);
            } else {
                p.grounded = false;
            }
        }
    }
}

fn resolve_enemies(session: &mut Session) {
    let gravity = session.gravity_enabled;
    let scale = session.tuning.enemy_speed_scale;
    for enemy in &mut session.enemies {
        physics::step_enemy(enemy, gravity, scale);
    }
}

// ══════════════════════════════════════════════════════════════
// Contact events
// ══════════════════════════════════════════════════════════════

fn resolve_item_pickup(session: &mut Session, events: &mut Vec<GameEvent>) {
    let touched: Vec<usize> = session.items.iter()
        .enumerate()
        .filter(|(_, item)| !item.collected)
        .filter(|(_, item)| collision::touches(&session.player, &item.shape, item.pos))
        .map(|(i, _)| i)
        .collect();
    for i in touched {
        session.collect_item(i, events);
    }
}

/// Every touching enemy hits once per tick.
fn resolve_enemy_contact(session: &mut Session, events: &mut Vec<GameEvent>) {
    let hits = session.enemies.iter()
        .filter(|e| collision::touches(&session.player, &e.shape, e.pos))
        .count();
    let damage = session.tuning.enemy_damage;
    for _ in 0..hits {
        session.take_damage(damage, events);
    }
}

// ══════════════════════════════════════════════════════════════
// Queued actions
// ══════════════════════════════════════════════════════════════

/// Failed checkpoint operations surface as a notice and an event; the
/// tick carries on.
fn resolve_actions(session: &mut Session, actions: &[Action], events: &mut Vec<GameEvent>) {
    for action in actions {
        match action {
            Action::ToggleGravity => { session.toggle_gravity(events); }
            Action::ToggleLight => session.toggle_light(events),
            Action::CreateCheckpoint => { let _ = session.create_checkpoint(events); }
            Action::Respawn => { let _ = session.respawn_at_checkpoint(events); }
            Action::ClearCheckpoints => { session.clear_all_checkpoints(events); }
            Action::Interact => session.interact(events),
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Zone
// ══════════════════════════════════════════════════════════════

fn resolve_zone(session: &mut Session, events: &mut Vec<GameEvent>) {
    if session.variant.zone_model() == ZoneModel::Flat { return; }
    let inside = session.inside_cell();
    let pos = session.player.pos;
    match session.zone.update(inside) {
        Some(ZoneTransition::Exited) => {
            info!(x = pos.x, z = pos.z, "left the cell");
            events.push(GameEvent::ZoneExited { pos });
        }
        Some(ZoneTransition::Entered) => {
            info!(x = pos.x, z = pos.z, "entered the cell");
            events.push(GameEvent::ZoneEntered { pos });
        }
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3};

    use super::*;
    use crate::config::Tuning;
    use crate::domain::entity::ItemKind;
    use crate::sim::level;

    fn session() -> Session {
        Session::new(level::builtin(Variant::Sphere3d), Tuning::default())
    }

    fn side_session() -> Session {
        Session::new(level::builtin(Variant::Box2d), Tuning::default())
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    fn holding_jump() -> FrameInput {
        FrameInput { jump_held: true, ..FrameInput::default() }
    }

    fn releasing_jump() -> FrameInput {
        FrameInput { jump_released: true, ..FrameInput::default() }
    }

    fn with_action(action: Action) -> FrameInput {
        FrameInput { actions: vec![action], ..FrameInput::default() }
    }

    /// Drop the player onto open floor, clear of platforms and actors.
    fn settle(s: &mut Session, x: f32, z: f32) {
        s.player.pos = Vec3::new(x, 1.0, z);
        s.player.vel = Vec3::ZERO;
        step(s, idle());
        assert!(s.player.grounded);
    }

    // ── zone ──

    #[test]
    fn walking_out_of_the_cell_fires_exit_once() {
        let mut s = session();
        assert!(s.zone.in_cell());
        s.player.pos.x = 15.0;
        let ev = step(&mut s, idle());
        let exits = ev.iter().filter(|e| matches!(e, GameEvent::ZoneExited { .. })).count();
        assert_eq!(exits, 1);
        assert_eq!(s.zone(), Zone::Space);

        let ev = step(&mut s, idle());
        assert!(!ev.iter().any(|e| matches!(e, GameEvent::ZoneExited { .. })));
    }

    #[test]
    fn returning_fires_enter() {
        let mut s = session();
        s.player.pos = Vec3::new(15.0, 3.0, 0.0);
        step(&mut s, idle());
        s.player.pos.x = 2.0;
        let ev = step(&mut s, idle());
        assert!(ev.iter().any(|e| matches!(e, GameEvent::ZoneEntered { .. })));
        assert_eq!(s.zone(), Zone::Cell);
    }

    #[test]
    fn space_has_no_ground_and_no_gravity() {
        let mut s = session();
        s.player.pos = Vec3::new(15.0, 0.5, 15.0);
        step(&mut s, idle());
        assert_eq!(s.zone(), Zone::Space);
        s.player.vel = Vec3::ZERO;
        step(&mut s, idle());
        assert!(!s.player.grounded);
        assert_eq!(s.player.vel.y, 0.0);
    }

    #[test]
    fn space_ascend_thrusts_upward() {
        let mut s = session();
        s.player.pos = Vec3::new(15.0, 5.0, 15.0);
        step(&mut s, idle());
        s.player.vel = Vec3::ZERO;
        step(&mut s, holding_jump());
        assert!((s.player.vel.y - 0.02).abs() < 1e-6);
        assert_eq!(s.player.jump.charge, 0);
    }

    #[test]
    fn boundary_clamp_holds_in_space() {
        let mut s = session();
        s.player.pos = Vec3::new(18.9, 5.0, 0.0);
        let input = FrameInput { intent: Vec2::new(1.0, 0.0), ..FrameInput::default() };
        for _ in 0..10 {
            step(&mut s, input.clone());
        }
        assert_eq!(s.player.pos.x, 19.0);
    }

    // ── jump charge ──

    #[test]
    fn held_jump_charges_and_caps() {
        let mut s = session();
        settle(&mut s, 0.0, 5.0);
        for _ in 0..30 {
            step(&mut s, holding_jump());
            assert!(s.player.jump.charge <= 15);
        }
        assert_eq!(s.player.jump.charge, 15);
    }

    #[test]
    fn fifteen_ticks_then_release_launches_at_max() {
        let mut s = session();
        settle(&mut s, 0.0, 5.0);
        for _ in 0..15 {
            step(&mut s, holding_jump());
        }
        let ev = step(&mut s, releasing_jump());
        let power = ev.iter().find_map(|e| match e {
            GameEvent::JumpLaunched { power, .. } => Some(*power),
            _ => None,
        });
        assert_eq!(power, Some(2.0));
        // gravity applied after the launch within the same tick
        assert!((s.player.vel.y - 1.7).abs() < 1e-6);
        assert!(!s.player.grounded);
    }

    #[test]
    fn tap_release_launches_at_base() {
        let mut s = session();
        settle(&mut s, 0.0, 5.0);
        let ev = step(&mut s, releasing_jump());
        assert!(ev.iter().any(|e| matches!(e, GameEvent::JumpLaunched { power, .. } if *power == 1.0)));
    }

    #[test]
    fn airborne_release_does_nothing() {
        let mut s = session();
        s.player.pos = Vec3::new(0.0, 8.0, 5.0);
        step(&mut s, idle());
        let before = s.player.vel.y;
        let ev = step(&mut s, releasing_jump());
        assert!(ev.is_empty());
        assert!((s.player.vel.y - (before - 0.3)).abs() < 1e-6);
    }

    #[test]
    fn charge_resets_in_the_air() {
        let mut s = session();
        settle(&mut s, 0.0, 5.0);
        for _ in 0..5 {
            step(&mut s, holding_jump());
        }
        s.player.pos.y = 8.0;
        step(&mut s, holding_jump());
        step(&mut s, holding_jump());
        assert_eq!(s.player.jump.charge, 0);
    }

    // ── platforms ──

    #[test]
    fn falls_onto_platform_and_stays() {
        let mut s = session();
        s.player.pos = Vec3::new(0.0, 3.5, -8.0);
        let mut landed = false;
        for _ in 0..10 {
            step(&mut s, idle());
            if s.player.grounded { landed = true; break; }
        }
        assert!(landed);
        assert_eq!(s.player.pos.y, 2.25);
        step(&mut s, idle());
        assert_eq!(s.player.pos.y, 2.25);
        assert!(s.player.grounded);
    }

    // ── pickups and damage ──

    #[test]
    fn health_item_heals_to_cap_once() {
        let mut s = session();
        let idx = s.items.iter().position(|i| i.kind == ItemKind::Health).unwrap();
        s.enemies.clear();
        s.player.health = 80;
        s.player.pos = s.items[idx].pos;
        step(&mut s, idle());
        assert_eq!(s.player.health, 100);
        assert!(s.items[idx].collected);

        s.player.health = 70;
        s.player.pos = s.items[idx].pos;
        let ev = step(&mut s, idle());
        assert_eq!(s.player.health, 70);
        assert!(!ev.iter().any(|e| matches!(e, GameEvent::ItemCollected { .. })));
    }

    #[test]
    fn enemy_contact_damages_every_tick() {
        let mut s = session();
        s.items.clear();
        s.enemies.truncate(1);
        s.enemies[0].vx = 0.0;
        let target = s.enemies[0].pos;
        for n in 1..=3 {
            s.player.pos = target;
            s.player.vel = Vec3::ZERO;
            step(&mut s, idle());
            assert_eq!(s.player.health, 100 - 10 * n);
        }
    }

    #[test]
    fn sustained_contact_game_over_restores_health() {
        let mut s = session();
        s.items.clear();
        s.enemies.truncate(1);
        s.enemies[0].vx = 0.0;
        let target = s.enemies[0].pos;
        let mut game_overs = 0;
        for _ in 0..25 {
            s.player.pos = target;
            s.player.vel = Vec3::ZERO;
            let ev = step(&mut s, idle());
            game_overs += ev.iter().filter(|e| matches!(e, GameEvent::GameOver { .. })).count();
            assert!(s.player.health > 0 && s.player.health <= 100);
        }
        assert_eq!(game_overs, 2);
    }

    // ── actions ──

    #[test]
    fn checkpoint_actions_round_trip() {
        let mut s = session();
        settle(&mut s, 0.0, 5.0);
        let saved = s.player.pos;
        let ev = step(&mut s, with_action(Action::CreateCheckpoint));
        assert!(ev.iter().any(|e| matches!(e, GameEvent::CheckpointCreated { id: 1, .. })));

        s.player.pos = Vec3::new(-5.0, 9.0, 5.0);
        s.player.vel = Vec3::new(0.0, -1.0, 0.0);
        step(&mut s, with_action(Action::Respawn));
        assert_eq!(s.player.pos, saved);
        assert_eq!(s.player.vel, Vec3::ZERO);
    }

    #[test]
    fn sixth_checkpoint_action_reports_failure() {
        let mut s = session();
        for _ in 0..5 {
            step(&mut s, with_action(Action::CreateCheckpoint));
        }
        let ev = step(&mut s, with_action(Action::CreateCheckpoint));
        assert!(ev.iter().any(|e| matches!(e, GameEvent::CheckpointFailed { .. })));
        assert_eq!(s.checkpoints.len(), 5);
        assert!(!s.message.is_empty());
    }

    #[test]
    fn respawn_without_checkpoint_leaves_player() {
        let mut s = session();
        settle(&mut s, 0.0, 5.0);
        let pos = s.player.pos;
        step(&mut s, with_action(Action::Respawn));
        assert_eq!(s.player.pos, pos);
        assert_eq!(s.message, "No checkpoint available");
    }

    #[test]
    fn respawn_in_the_air_cannot_jump() {
        let mut s = session();
        s.player.pos = Vec3::new(0.0, 6.0, 5.0);
        s.create_checkpoint(&mut Vec::new()).unwrap();
        settle(&mut s, 0.0, 5.0);
        for _ in 0..3 {
            step(&mut s, holding_jump());
        }

        step(&mut s, with_action(Action::Respawn));
        assert_eq!(s.player.pos, Vec3::new(0.0, 6.0, 5.0));
        assert!(!s.player.grounded);
        assert_eq!(s.player.jump.charge, 0);

        let ev = step(&mut s, releasing_jump());
        assert!(!ev.iter().any(|e| matches!(e, GameEvent::JumpLaunched { .. })));
        assert!(s.player.vel.y < 0.0);
    }

    #[test]
    fn light_toggle_emits_event() {
        let mut s = session();
        let ev = step(&mut s, with_action(Action::ToggleLight));
        assert!(ev.iter().any(|e| matches!(e, GameEvent::LightToggled { .. })));
    }

    #[test]
    fn notice_expires() {
        let mut s = session();
        s.set_message("hello", 2);
        step(&mut s, idle());
        assert_eq!(s.message, "hello");
        step(&mut s, idle());
        assert!(s.message.is_empty());
    }

    #[test]
    fn tuning_change_applies_next_tick() {
        let mut s = session();
        s.player.pos = Vec3::new(0.0, 8.0, 5.0);
        s.player.vel = Vec3::ZERO;
        s.tuning.gravity = 0.1;
        step(&mut s, idle());
        assert!((s.player.vel.y + 0.1).abs() < 1e-6);
    }

    // ── side view ──

    #[test]
    fn side_jump_is_instant_on_press() {
        let mut s = side_session();
        step(&mut s, idle());
        assert!(s.player.grounded);
        let ev = step(&mut s, FrameInput { jump_pressed: true, ..FrameInput::default() });
        assert!(ev.iter().any(|e| matches!(e, GameEvent::JumpLaunched { power, .. } if *power == 1.0)));
        assert_eq!(s.player.jump.charge, 0);
        assert!(s.player.vel.y > 0.0);
    }

    #[test]
    fn side_release_does_not_jump() {
        let mut s = side_session();
        step(&mut s, idle());
        let ev = step(&mut s, releasing_jump());
        assert!(ev.is_empty());
    }

    #[test]
    fn side_friction_after_letting_go() {
        let mut s = side_session();
        step(&mut s, idle());
        let run = FrameInput { intent: Vec2::new(1.0, 0.0), ..FrameInput::default() };
        step(&mut s, run);
        assert!((s.player.vel.x - 0.15).abs() < 1e-6);
        step(&mut s, idle());
        assert!((s.player.vel.x - 0.12).abs() < 1e-6);
    }

    #[test]
    fn side_pillar_blocks_walking() {
        let mut s = side_session();
        s.enemies.clear();
        s.player.pos = Vec3::new(13.0, 0.8, 0.0);
        step(&mut s, idle());
        let run = FrameInput { intent: Vec2::new(1.0, 0.0), ..FrameInput::default() };
        for _ in 0..20 {
            step(&mut s, run.clone());
        }
        assert!((s.player.pos.x - 13.1).abs() < 1e-4);
    }

    #[test]
    fn side_has_no_zone_events() {
        let mut s = side_session();
        s.player.pos.x = 18.0;
        let ev = step(&mut s, idle());
        assert!(!ev.iter().any(|e| matches!(e, GameEvent::ZoneExited { .. })));
        assert_eq!(s.zone(), Zone::Cell);
    }
}
