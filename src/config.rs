/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
///
/// The `[tuning]` table is the knob set the simulation reads every tick.
/// Named tuning profiles (see `settings.rs`) overlay it at startup or on demand.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::entity::Variant;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub variant: Variant,
    pub tick_rate_ms: u64,
    pub tuning: Tuning,
    pub layout_file: Option<PathBuf>,
    pub profile: Option<String>,
    pub gamepad: GamepadConfig,
    pub log: LogConfig,
}

/// Numeric knobs consumed by the simulation.
///
/// Nothing here is validated; a session applies whatever it is given on the
/// next tick. Also the record stored per named profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Subtracted from vertical velocity each tick inside the cell.
    pub gravity: f32,
    pub ground_level: f32,
    /// Half-extent of the square cell footprint, centred on the origin.
    pub cell_boundary: f32,
    /// Horizontal clamp applied in every zone.
    pub world_boundary: f32,
    pub player_speed: f32,
    pub jump_power: f32,
    pub max_jump_power: f32,
    /// Ticks of held jump needed for a full-power launch.
    pub max_jump_charge: u32,
    pub enemy_speed_scale: f32,
    pub enemy_detection_range: f32,
    pub enemy_damage: i32,
    pub health_pickup: i32,
    pub max_checkpoints: usize,
    pub player_max_health: i32,
}

impl Default for Tuning {
    fn default() -> Self {
        Tuning {
            gravity: 0.3,
            ground_level: 0.0,
            cell_boundary: 10.0,
            world_boundary: 19.0,
            player_speed: 0.15,
            jump_power: 1.0,
            max_jump_power: 2.0,
            max_jump_charge: 15,
            enemy_speed_scale: 1.0,
            enemy_detection_range: 8.0,
            enemy_damage: 10,
            health_pickup: 25,
            max_checkpoints: 5,
            player_max_health: 100,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub descend: Vec<String>,
    pub checkpoint: Vec<String>,
    pub respawn: Vec<String>,
    pub gravity: Vec<String>,
    pub light: Vec<String>,
    pub pause: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub level: String,
    pub file: PathBuf,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    game: TomlGame,
    #[serde(default)]
    tuning: Tuning,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    log: TomlLog,
}

#[derive(Deserialize, Debug)]
struct TomlGame {
    #[serde(default)]
    variant: Variant,
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    /// Empty string selects the built-in layout.
    #[serde(default)]
    layout: String,
    #[serde(default)]
    profile: String,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_jump")]
    jump: Vec<String>,
    #[serde(default = "default_descend")]
    descend: Vec<String>,
    #[serde(default = "default_checkpoint")]
    checkpoint: Vec<String>,
    #[serde(default = "default_respawn")]
    respawn: Vec<String>,
    #[serde(default = "default_gravity")]
    gravity: Vec<String>,
    #[serde(default = "default_light")]
    light: Vec<String>,
    #[serde(default = "default_pause")]
    pause: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_log_level")]
    level: String,
    #[serde(default = "default_log_file")]
    file: String,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }   // ~60 ticks/s, the nominal physics step

fn default_jump() -> Vec<String> { vec!["A".into()] }
fn default_descend() -> Vec<String> { vec!["B".into()] }
fn default_checkpoint() -> Vec<String> { vec!["Y".into()] }
fn default_respawn() -> Vec<String> { vec!["X".into()] }
fn default_gravity() -> Vec<String> { vec!["L1".into()] }
fn default_light() -> Vec<String> { vec!["R1".into()] }
fn default_pause() -> Vec<String> { vec!["Start".into()] }
fn default_log_level() -> String { "info".into() }
fn default_log_file() -> String { "cellbreak.log".into() }

impl Default for TomlGame {
    fn default() -> Self {
        TomlGame {
            variant: Variant::default(),
            tick_rate_ms: default_tick_rate(),
            layout: String::new(),
            profile: String::new(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_jump(),
            descend: default_descend(),
            checkpoint: default_checkpoint(),
            respawn: default_respawn(),
            gravity: default_gravity(),
            light: default_light(),
            pause: default_pause(),
        }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) ~/.local/share/cellbreak.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::from_toml(toml_cfg, &search_dirs)
    }

    /// Parse a config document directly. Unknown or malformed input is an error
    /// here; `load()` is the forgiving entry point.
    #[cfg(test)]
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(Self::from_toml(toml_cfg, &[]))
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let layout_file = resolve_layout(&toml_cfg.game.layout, search_dirs);
        let profile = Some(toml_cfg.game.profile.trim().to_string())
            .filter(|p| !p.is_empty());

        GameConfig {
            variant: toml_cfg.game.variant,
            tick_rate_ms: toml_cfg.game.tick_rate_ms.max(1),
            tuning: toml_cfg.tuning,
            layout_file,
            profile,
            gamepad: GamepadConfig {
                jump: toml_cfg.gamepad.jump,
                descend: toml_cfg.gamepad.descend,
                checkpoint: toml_cfg.gamepad.checkpoint,
                respawn: toml_cfg.gamepad.respawn,
                gravity: toml_cfg.gamepad.gravity,
                light: toml_cfg.gamepad.light,
                pause: toml_cfg.gamepad.pause,
            },
            log: LogConfig {
                level: toml_cfg.log.level,
                file: PathBuf::from(toml_cfg.log.file),
            },
        }
    }
}

/// Absolute paths are taken as-is; relative ones are looked up in the
/// candidate directories, falling back to CWD-relative.
fn resolve_layout(name: &str, search_dirs: &[PathBuf]) -> Option<PathBuf> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let path = PathBuf::from(name);
    if path.is_absolute() {
        return Some(path);
    }
    Some(
        search_dirs.iter()
            .map(|d| d.join(name))
            .find(|p| p.is_file())
            .unwrap_or(path),
    )
}

/// Candidate directories to search: exe dir + CWD + XDG data dir (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/cellbreak)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/cellbreak");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
/// Runs before the terminal is taken over, so problems go to stderr.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    eprintln!("Warning: {} parse error: {e}", path.display());
                    eprintln!("Using default settings.");
                    return TomlConfig::default();
                }
            },
            Err(e) => {
                eprintln!("Warning: could not read {}: {e}", path.display());
            }
        }
    }
    TomlConfig::default()
}
