/// Entities: Player, Enemy, Item, Platform.
///
/// Positions are world units with y up. The side-view variant keeps every
/// actor on the z = 0 plane and uses boxes where the 3D variant uses spheres.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::geometry::Aabb;
use super::jump::JumpCharge;

/// Which of the two game variants a session runs.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Sphere actors in a cell surrounded by open space.
    #[default]
    Sphere3d,
    /// Box actors on a single flat-gravity plane.
    Box2d,
}

/// Whether the world is split into cell and space.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ZoneModel {
    Flat,
    CellAndSpace,
}

impl Variant {
    pub fn zone_model(self) -> ZoneModel {
        match self {
            Variant::Sphere3d => ZoneModel::CellAndSpace,
            Variant::Box2d => ZoneModel::Flat,
        }
    }

    /// Jump power builds up while held (otherwise jumps fire on press).
    pub fn charges_jump(self) -> bool {
        self == Variant::Sphere3d
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::Sphere3d => "sphere3d",
            Variant::Box2d => "box2d",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Shape {
    Sphere { radius: f32 },
    Box { half: Vec3 },
}

impl Shape {
    /// Half-extents of the tightest enclosing box.
    pub fn half_extents(&self) -> Vec3 {
        match *self {
            Shape::Sphere { radius } => Vec3::splat(radius),
            Shape::Box { half } => half,
        }
    }

    pub fn aabb(&self, pos: Vec3) -> Aabb {
        Aabb::from_center(pos, self.half_extents())
    }

    /// Radius used by sphere tests.
    pub fn radius(&self) -> f32 {
        match *self {
            Shape::Sphere { radius } => radius,
            Shape::Box { half } => half.x.max(half.z),
        }
    }
}

// ── Player ──

#[derive(Clone, Debug)]
pub struct Player {
    pub pos: Vec3,
    pub vel: Vec3,
    pub shape: Shape,
    /// Capsule height; feet sit `half_height()` below `pos.y`.
    pub height: f32,
    pub grounded: bool,
    pub health: i32,
    pub max_health: i32,
    pub jump: JumpCharge,
}

impl Player {
    pub fn new(pos: Vec3, variant: Variant, max_health: i32) -> Self {
        let (shape, height) = match variant {
            Variant::Sphere3d => (Shape::Sphere { radius: 0.5 }, 2.0),
            Variant::Box2d => (Shape::Box { half: Vec3::new(0.4, 0.8, 0.5) }, 1.6),
        };
        Player {
            pos,
            vel: Vec3::ZERO,
            shape,
            height,
            grounded: false,
            health: max_health,
            max_health,
            jump: JumpCharge::default(),
        }
    }

    pub fn half_height(&self) -> f32 {
        match self.shape {
            Shape::Sphere { .. } => self.height / 2.0,
            Shape::Box { half } => half.y,
        }
    }
}

// ── Enemy ──

/// Patrols back and forth along x between two bounds.
#[derive(Clone, Debug)]
pub struct Enemy {
    pub pos: Vec3,
    pub shape: Shape,
    pub patrol_min: f32,
    pub patrol_max: f32,
    /// Signed patrol velocity along x.
    pub vx: f32,
}

impl Enemy {
    pub fn new(pos: Vec3, patrol_min: f32, patrol_max: f32, vx: f32, variant: Variant) -> Self {
        let shape = match variant {
            Variant::Sphere3d => Shape::Sphere { radius: 0.4 },
            Variant::Box2d => Shape::Box { half: Vec3::new(0.4, 0.5, 0.5) },
        };
        Enemy { pos, shape, patrol_min, patrol_max, vx }
    }
}

// ── Items ──

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Health,
    GravitySwitch,
    Weapon,
}

impl ItemKind {
    pub fn label(self) -> &'static str {
        match self {
            ItemKind::Health => "Health Pack",
            ItemKind::GravitySwitch => "Gravity Switch",
            ItemKind::Weapon => "Weapon",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Item {
    pub pos: Vec3,
    pub shape: Shape,
    pub kind: ItemKind,
    /// Flips once; the entry stays in the session afterwards.
    pub collected: bool,
}

impl Item {
    pub fn new(pos: Vec3, kind: ItemKind, variant: Variant) -> Self {
        let shape = match variant {
            Variant::Sphere3d => Shape::Sphere { radius: 0.3 },
            Variant::Box2d => Shape::Box { half: Vec3::new(0.3, 0.3, 0.5) },
        };
        Item { pos, shape, kind, collected: false }
    }
}

// ── Platform ──

/// Static box: centre and full size (width, height, depth).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Platform {
    pub center: Vec3,
    pub size: Vec3,
}

impl Platform {
    pub fn new(center: Vec3, size: Vec3) -> Self {
        Platform { center, size }
    }

    pub fn half(&self) -> Vec3 {
        self.size * 0.5
    }

    pub fn top(&self) -> f32 {
        self.center.y + self.size.y * 0.5
    }

    pub fn bottom(&self) -> f32 {
        self.center.y - self.size.y * 0.5
    }

    /// Radius of the sphere enclosing the box.
    pub fn broad_radius(&self) -> f32 {
        self.half().length()
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.center, self.half())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_surfaces() {
        let p = Platform::new(Vec3::new(0.0, 1.0, -8.0), Vec3::new(4.0, 0.5, 4.0));
        assert_eq!(p.top(), 1.25);
        assert_eq!(p.bottom(), 0.75);
        // sqrt(2^2 + 0.25^2 + 2^2)
        assert!((p.broad_radius() - 2.8394).abs() < 1e-3);
    }

    #[test]
    fn player_shape_follows_variant() {
        let p = Player::new(Vec3::new(0.0, 2.0, 0.0), Variant::Sphere3d, 100);
        assert_eq!(p.half_height(), 1.0);
        assert_eq!(p.shape.radius(), 0.5);
        assert_eq!(p.health, 100);

        let q = Player::new(Vec3::ZERO, Variant::Box2d, 50);
        assert_eq!(q.half_height(), 0.8);
        assert_eq!(q.shape.half_extents(), Vec3::new(0.4, 0.8, 0.5));
        assert_eq!(q.max_health, 50);
    }

    #[test]
    fn only_sphere_variant_has_zones_and_charge() {
        assert_eq!(Variant::Sphere3d.zone_model(), ZoneModel::CellAndSpace);
        assert_eq!(Variant::Box2d.zone_model(), ZoneModel::Flat);
        assert!(Variant::Sphere3d.charges_jump());
        assert!(!Variant::Box2d.charges_jump());
    }
}
