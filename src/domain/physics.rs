/// Actor kinematics.
///
/// One fixed step per tick; measured frame time never enters the math.
///
///   Cell   : horizontal velocity = intent × speed, gravity pulls vy down
///            (30% of it with gravity switched off).
///   Space  : horizontal velocity = intent × speed × 1.5, vy loses 2% per
///            tick and the ascend/descend controls nudge it by a fixed thrust.
///   Side   : the 2D variant. Like the cell, but horizontal velocity decays
///            by friction instead of snapping to zero when no key is held.
///
/// Enemies patrol along x and turn around once they reach either bound.

use glam::{Vec2, Vec3};

use crate::config::Tuning;
use super::entity::Enemy;

pub const SPACE_SPEED_FACTOR: f32 = 1.5;
pub const LOW_GRAVITY_FACTOR: f32 = 0.3;
pub const SPACE_DRAG: f32 = 0.98;
pub const SPACE_THRUST: f32 = 0.02;
pub const SIDE_FRICTION: f32 = 0.8;
/// Enemy patrol speed factor while gravity is off.
pub const FLOATY_PATROL_FACTOR: f32 = 0.5;

#[inline]
fn gravity_step(gravity_enabled: bool, t: &Tuning) -> f32 {
    if gravity_enabled { t.gravity } else { t.gravity * LOW_GRAVITY_FACTOR }
}

/// Force model inside the cell.
pub fn cell_forces(vel: &mut Vec3, intent: Vec2, gravity_enabled: bool, t: &Tuning) {
    vel.x = intent.x * t.player_speed;
    vel.z = intent.y * t.player_speed;
    vel.y -= gravity_step(gravity_enabled, t);
}

/// Force model outside the cell. No gravity term at all.
pub fn space_forces(vel: &mut Vec3, intent: Vec2, ascend: bool, descend: bool, t: &Tuning) {
    let speed = t.player_speed * SPACE_SPEED_FACTOR;
    vel.x = intent.x * speed;
    vel.z = intent.y * speed;
    vel.y *= SPACE_DRAG;
    if ascend { vel.y += SPACE_THRUST; }
    if descend { vel.y -= SPACE_THRUST; }
}

/// Force model for the side-view variant.
pub fn side_forces(vel: &mut Vec3, intent_x: f32, gravity_enabled: bool, t: &Tuning) {
    if intent_x != 0.0 {
        vel.x = intent_x * t.player_speed;
    } else {
        vel.x *= SIDE_FRICTION;
    }
    vel.z = 0.0;
    vel.y -= gravity_step(gravity_enabled, t);
}

#[inline]
pub fn integrate(pos: &mut Vec3, vel: Vec3) {
    *pos += vel;
}

/// Keep x and z inside the square boundary.
pub fn clamp_horizontal(pos: &mut Vec3, boundary: f32) {
    pos.x = pos.x.clamp(-boundary, boundary);
    pos.z = pos.z.clamp(-boundary, boundary);
}

/// Advance one patrol step. The flip happens after the move, so an enemy
/// briefly overshoots its bound before turning.
pub fn step_enemy(enemy: &mut Enemy, gravity_enabled: bool, speed_scale: f32) {
    let factor = if gravity_enabled { 1.0 } else { FLOATY_PATROL_FACTOR };
    enemy.pos.x += enemy.vx * speed_scale * factor;
    if enemy.pos.x <= enemy.patrol_min || enemy.pos.x >= enemy.patrol_max {
        enemy.vx = -enemy.vx;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Variant;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    // ── cell ──

    #[test]
    fn cell_velocity_is_intent_times_speed() {
        let t = Tuning::default();
        let mut v = Vec3::new(5.0, 0.0, 5.0);
        cell_forces(&mut v, Vec2::new(0.0, 1.0), true, &t);
        assert!(approx(v.x, 0.0));
        assert!(approx(v.z, 0.15));
        assert!(approx(v.y, -0.3));
    }

    #[test]
    fn cell_low_gravity_is_thirty_percent() {
        let t = Tuning::default();
        let mut v = Vec3::ZERO;
        cell_forces(&mut v, Vec2::ZERO, false, &t);
        assert!(approx(v.y, -0.09));
    }

    // ── space ──

    #[test]
    fn space_is_faster_and_has_no_gravity() {
        let t = Tuning::default();
        let mut v = Vec3::new(0.0, 1.0, 0.0);
        space_forces(&mut v, Vec2::new(1.0, 0.0), false, false, &t);
        assert!(approx(v.x, 0.225));
        assert!(approx(v.y, 0.98));
    }

    #[test]
    fn space_thrust_after_drag() {
        let t = Tuning::default();
        let mut up = Vec3::new(0.0, 0.5, 0.0);
        space_forces(&mut up, Vec2::ZERO, true, false, &t);
        assert!(approx(up.y, 0.5 * 0.98 + 0.02));

        let mut down = Vec3::ZERO;
        space_forces(&mut down, Vec2::ZERO, false, true, &t);
        assert!(approx(down.y, -0.02));
    }

    // ── side view ──

    #[test]
    fn side_friction_decays_without_input() {
        let t = Tuning::default();
        let mut v = Vec3::new(1.0, 0.0, 0.0);
        side_forces(&mut v, 0.0, true, &t);
        assert!(approx(v.x, 0.8));
        side_forces(&mut v, 0.0, true, &t);
        assert!(approx(v.x, 0.64));
        side_forces(&mut v, -1.0, true, &t);
        assert!(approx(v.x, -0.15));
    }

    // ── clamp ──

    #[test]
    fn clamp_ignores_height() {
        let mut p = Vec3::new(25.0, 40.0, -30.0);
        clamp_horizontal(&mut p, 19.0);
        assert_eq!(p, Vec3::new(19.0, 40.0, -19.0));
    }

    // ── enemies ──

    fn patroller(x: f32, vx: f32) -> Enemy {
        Enemy::new(Vec3::new(x, 1.5, -6.0), -8.0, -4.0, vx, Variant::Sphere3d)
    }

    #[test]
    fn enemy_overshoots_then_flips() {
        let mut e = patroller(-4.01, 0.02);
        step_enemy(&mut e, true, 1.0);
        assert!(e.pos.x > -4.0);
        assert!(e.vx < 0.0);
        step_enemy(&mut e, true, 1.0);
        assert!(approx(e.pos.x, -4.01));
    }

    #[test]
    fn enemy_flips_past_min_bound() {
        let mut e = patroller(-7.99, -0.02);
        step_enemy(&mut e, true, 1.0);
        assert!(approx(e.pos.x, -8.01));
        assert!(e.vx > 0.0);
    }

    #[test]
    fn gravity_off_halves_patrol_without_compounding() {
        let mut e = patroller(-6.0, 0.02);
        for _ in 0..10 {
            step_enemy(&mut e, false, 1.0);
        }
        assert!(approx(e.vx, 0.02));
        assert!(approx(e.pos.x, -6.0 + 10.0 * 0.01));
    }
}
