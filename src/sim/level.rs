/// Layouts: the static world plus the initial actors for a session.
///
/// ## Sources (priority order):
///   1. A TOML layout file named in `config.toml` (`[game] layout = ...`)
///   2. The built-in layout for the configured variant
///
/// ## Layout file format:
///   ```toml
///   variant = "sphere3d"          # or "box2d"
///   spawn = [0.0, 2.0, 0.0]
///
///   [[platforms]]
///   center = [-8.0, 1.0, -8.0]
///   size   = [4.0, 0.5, 4.0]      # full width, height, depth
///
///   [[walls]]                      # drawn only
///   center = [-20.0, 5.0, 0.0]
///   size   = [1.0, 10.0, 40.0]
///
///   [[enemies]]
///   pos    = [-6.0, 1.5, -6.0]
///   patrol = [-8.0, -4.0]          # min and max x
///   vx     = 0.02                  # signed patrol speed
///
///   [[items]]
///   pos  = [-6.0, 1.5, -6.0]
///   kind = "health"                # health | gravity_switch | weapon
///   ```

use std::path::Path;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::entity::{Enemy, Item, ItemKind, Platform, Variant};
use crate::error::LayoutError;

/// Runtime layout, ready to seed a `Session`.
#[derive(Clone, Debug)]
pub struct Layout {
    pub variant: Variant,
    pub spawn: Vec3,
    pub platforms: Vec<Platform>,
    pub walls: Vec<Platform>,
    pub enemies: Vec<Enemy>,
    pub items: Vec<Item>,
}

// ══════════════════════════════════════════════════════════════
// File schema
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LayoutDef {
    #[serde(default)]
    pub variant: Variant,
    pub spawn: Vec3,
    #[serde(default)]
    pub platforms: Vec<BoxDef>,
    #[serde(default)]
    pub walls: Vec<BoxDef>,
    #[serde(default)]
    pub enemies: Vec<EnemyDef>,
    #[serde(default)]
    pub items: Vec<ItemDef>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BoxDef {
    pub center: Vec3,
    pub size: Vec3,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct EnemyDef {
    pub pos: Vec3,
    pub patrol: Vec2,
    pub vx: f32,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ItemDef {
    pub pos: Vec3,
    pub kind: ItemKind,
}

impl From<LayoutDef> for Layout {
    fn from(def: LayoutDef) -> Self {
        let v = def.variant;
        let boxes = |list: Vec<BoxDef>| -> Vec<Platform> {
            list.into_iter().map(|b| Platform::new(b.center, b.size)).collect()
        };
        Layout {
            variant: v,
            spawn: def.spawn,
            platforms: boxes(def.platforms),
            walls: boxes(def.walls),
            enemies: def.enemies.into_iter()
                .map(|e| Enemy::new(e.pos, e.patrol.x, e.patrol.y, e.vx, v))
                .collect(),
            items: def.items.into_iter()
                .map(|i| Item::new(i.pos, i.kind, v))
                .collect(),
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Parse a layout document and check it matches the configured variant.
pub fn parse_layout(text: &str, expected: Variant) -> Result<Layout, LayoutError> {
    let def: LayoutDef = toml::from_str(text)?;
    if def.variant != expected {
        return Err(LayoutError::VariantMismatch {
            expected: expected.name(),
            found: def.variant.name(),
        });
    }
    Ok(def.into())
}

pub fn load_layout_file(path: &Path, expected: Variant) -> Result<Layout, LayoutError> {
    let text = std::fs::read_to_string(path).map_err(|source| LayoutError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_layout(&text, expected)
}

/// The configured layout file if it loads, otherwise the built-in one.
/// Returns the fallback reason so the caller can surface it.
pub fn resolve_layout(path: Option<&Path>, variant: Variant) -> (Layout, Option<LayoutError>) {
    match path {
        Some(p) => match load_layout_file(p, variant) {
            Ok(layout) => (layout, None),
            Err(e) => {
                warn!(path = %p.display(), error = %e, "layout rejected, using built-in");
                (builtin(variant), Some(e))
            }
        },
        None => (builtin(variant), None),
    }
}

pub fn builtin(variant: Variant) -> Layout {
    match variant {
        Variant::Sphere3d => builtin_prison().into(),
        Variant::Box2d => builtin_side().into(),
    }
}

// ══════════════════════════════════════════════════════════════
// Built-in layouts
// ══════════════════════════════════════════════════════════════

fn b(cx: f32, cy: f32, cz: f32, w: f32, h: f32, d: f32) -> BoxDef {
    BoxDef { center: Vec3::new(cx, cy, cz), size: Vec3::new(w, h, d) }
}

fn e(x: f32, y: f32, z: f32, min: f32, max: f32, vx: f32) -> EnemyDef {
    EnemyDef { pos: Vec3::new(x, y, z), patrol: Vec2::new(min, max), vx }
}

fn i(x: f32, y: f32, z: f32, kind: ItemKind) -> ItemDef {
    ItemDef { pos: Vec3::new(x, y, z), kind }
}

/// The prison: a 20×20 cell of platform tiers inside a 40×40 walled yard.
fn builtin_prison() -> LayoutDef {
    LayoutDef {
        variant: Variant::Sphere3d,
        spawn: Vec3::new(0.0, 2.0, 0.0),
        platforms: vec![
            b(-8.0, 1.0, -8.0, 4.0, 0.5, 4.0),
            b( 0.0, 1.0, -8.0, 4.0, 0.5, 4.0),
            b( 8.0, 1.0, -8.0, 4.0, 0.5, 4.0),
            b(-8.0, 3.0,  0.0, 4.0, 0.5, 4.0),
            b( 0.0, 3.0,  0.0, 4.0, 0.5, 4.0),
            b( 8.0, 3.0,  0.0, 4.0, 0.5, 4.0),
            b(-4.0, 5.0,  8.0, 3.0, 0.5, 3.0),
            b( 4.0, 5.0,  8.0, 3.0, 0.5, 3.0),
        ],
        walls: vec![
            b(-20.0, 5.0,   0.0,  1.0, 10.0, 40.0),
            b( 20.0, 5.0,   0.0,  1.0, 10.0, 40.0),
            b(  0.0, 5.0, -20.0, 40.0, 10.0,  1.0),
            b(  0.0, 5.0,  20.0, 40.0, 10.0,  1.0),
        ],
        enemies: vec![
            e(-6.0, 1.5, -6.0, -8.0, -4.0, 0.02),
            e( 6.0, 1.5, -6.0,  4.0,  8.0, -0.02),
            e(-6.0, 3.5,  2.0, -8.0, -4.0, 0.015),
        ],
        items: vec![
            i(-6.0, 1.5, -6.0, ItemKind::Health),
            i( 6.0, 1.5, -6.0, ItemKind::GravitySwitch),
            i( 0.0, 3.5,  2.0, ItemKind::Weapon),
        ],
    }
}

/// Side view: a staircase, a ledge with the gravity switch, and a pillar
/// that only a low-gravity jump clears.
fn builtin_side() -> LayoutDef {
    LayoutDef {
        variant: Variant::Box2d,
        spawn: Vec3::new(-16.0, 0.8, 0.0),
        platforms: vec![
            b(-11.0, 0.5,  0.0, 4.0, 1.0, 1.0),
            b( -7.0, 1.0,  0.0, 4.0, 2.0, 1.0),
            b( -3.0, 1.5,  0.0, 4.0, 3.0, 1.0),
            b(  1.0, 3.75, 0.0, 3.0, 0.5, 1.0),
            b(  8.0, 0.5,  0.0, 6.0, 1.0, 1.0),
            b( 14.0, 2.0,  0.0, 1.0, 4.0, 1.0),
        ],
        walls: vec![
            b(-19.5, 6.0, 0.0, 1.0, 12.0, 1.0),
            b( 19.5, 6.0, 0.0, 1.0, 12.0, 1.0),
        ],
        enemies: vec![
            e(2.0, 0.5, 0.0, 0.0,  4.0, 0.03),
            e(8.0, 1.5, 0.0, 6.0, 10.0, -0.02),
        ],
        items: vec![
            i(-7.0, 2.5, 0.0, ItemKind::Health),
            i( 1.0, 4.5, 0.0, ItemKind::GravitySwitch),
            i(16.5, 0.5, 0.0, ItemKind::Weapon),
        ],
    }
}
