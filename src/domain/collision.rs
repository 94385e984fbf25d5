/// Collision resolution: floor, platforms, and overlap reports.
///
/// Sphere model (3D): platforms only ever land the player; there is no side
/// or ceiling response. A landing needs the broad sphere test, the player
/// centre above the platform top, a foot gap under `LANDING_TOLERANCE` and
/// a vertical velocity that is not rising. The broad sphere is wider than
/// the box, so the player centre must also sit over the platform's x/z
/// footprint grown by the player radius.
///
/// Box model (2D): each overlapping platform is classified from velocity
/// sign and centre position, one axis at a time, in the order landing,
/// ceiling, right wall, left wall. Corners can come out on the wrong axis;
/// that behaviour is kept as-is.

use glam::Vec3;

use super::entity::{Platform, Player, Shape};
use super::geometry::spheres_overlap;

pub const LANDING_TOLERANCE: f32 = 0.2;
pub const FLOOR_TOLERANCE: f32 = 0.1;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Contact {
    Landed,
    Ceiling,
    /// Moving right into the platform's left face.
    BlockedRight,
    /// Moving left into the platform's right face.
    BlockedLeft,
}

/// Snap onto the ground plane when the feet are within tolerance of it.
pub fn resolve_floor(player: &mut Player, ground_level: f32) -> bool {
    let rest = ground_level + player.half_height();
    if player.pos.y <= rest + FLOOR_TOLERANCE {
        player.pos.y = rest;
        player.vel.y = 0.0;
        player.grounded = true;
        true
    } else {
        false
    }
}

/// Sphere-model landing on one platform. Idempotent.
pub fn land_on_platform(player: &mut Player, platform: &Platform) -> bool {
    let radius = player.shape.radius();
    if !spheres_overlap(player.pos, radius, platform.center, platform.broad_radius()) {
        return false;
    }
    if !over_footprint(player.pos, radius, platform) {
        return false;
    }
    let top = platform.top();
    if player.pos.y <= top {
        return false;
    }
    let rest = top + player.half_height();
    let gap = player.pos.y - rest;
    if gap < LANDING_TOLERANCE && player.vel.y <= 0.0 {
        player.pos.y = rest;
        player.vel.y = 0.0;
        player.grounded = true;
        true
    } else {
        false
    }
}

fn over_footprint(pos: Vec3, radius: f32, platform: &Platform) -> bool {
    let half = platform.half();
    (pos.x - platform.center.x).abs() < half.x + radius
        && (pos.z - platform.center.z).abs() < half.z + radius
}

/// Recompute `grounded` from scratch against the floor and every platform.
pub fn resolve_ground(player: &mut Player, platforms: &[Platform], ground_level: f32) -> bool {
    player.grounded = false;
    resolve_floor(player, ground_level);
    for platform in platforms {
        land_on_platform(player, platform);
    }
    player.grounded
}

/// Box-model response against one platform.
pub fn resolve_box(player: &mut Player, platform: &Platform) -> Option<Contact> {
    if !player.shape.aabb(player.pos).overlaps(&platform.aabb()) {
        return None;
    }
    let half = player.shape.half_extents();
    let p_half = platform.half();
    let c = platform.center;

    if player.vel.y <= 0.0 && player.pos.y > c.y {
        player.pos.y = platform.top() + half.y;
        player.vel.y = 0.0;
        player.grounded = true;
        Some(Contact::Landed)
    } else if player.vel.y > 0.0 && player.pos.y < c.y {
        player.pos.y = platform.bottom() - half.y;
        player.vel.y = 0.0;
        Some(Contact::Ceiling)
    } else if player.vel.x > 0.0 && player.pos.x < c.x {
        player.pos.x = c.x - p_half.x - half.x;
        player.vel.x = 0.0;
        Some(Contact::BlockedRight)
    } else if player.vel.x < 0.0 && player.pos.x > c.x {
        player.pos.x = c.x + p_half.x + half.x;
        player.vel.x = 0.0;
        Some(Contact::BlockedLeft)
    } else {
        None
    }
}

/// Side-view counterpart of `resolve_ground`; also reports every contact.
pub fn resolve_boxes(player: &mut Player, platforms: &[Platform], ground_level: f32) -> Vec<Contact> {
    player.grounded = false;
    resolve_floor(player, ground_level);
    platforms.iter()
        .filter_map(|p| resolve_box(player, p))
        .collect()
}

/// Overlap between the player and another actor or item.
pub fn touches(player: &Player, shape: &Shape, pos: Vec3) -> bool {
    match (player.shape, *shape) {
        (Shape::Sphere { radius: ra }, Shape::Sphere { radius: rb }) => {
            spheres_overlap(player.pos, ra, pos, rb)
        }
        _ => player.shape.aabb(player.pos).overlaps(&shape.aabb(pos)),
    }
}
