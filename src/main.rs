/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod settings;
mod sim;
mod ui;

use std::fs::OpenOptions;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use glam::Vec2;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use config::{GameConfig, LogConfig};
use domain::entity::Variant;
use domain::input::{self, Action, InputBuffer};
use sim::event::GameEvent;
use sim::level::resolve_layout;
use sim::step;
use sim::world::{Session, NOTICE_TICKS};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::{HostView, Renderer};
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// Radians of view yaw per tick at full turn input.
const TURN_SPEED: f32 = 0.05;

/// Gravity change per `[` / `]` press.
const GRAVITY_NUDGE: f32 = 0.05;

/// Profile name used when saving without one selected.
const DEFAULT_PROFILE: &str = "custom";

fn main() {
    let config = GameConfig::load();
    init_logging(&config.log);

    let mut tuning = config.tuning.clone();
    let mut profile = config.profile.clone();
    if let Some(name) = &profile {
        match settings::load_profile(name) {
            Ok(t) => tuning = t,
            Err(e) => {
                eprintln!("Warning: profile '{}' not applied: {}", name, e);
                profile = None;
            }
        }
    }

    let (layout, fallback) = resolve_layout(config.layout_file.as_deref(), config.variant);
    let mut session = Session::new(layout, tuning);
    if let Some(e) = fallback {
        session.set_message(&format!("Built-in layout in use: {}", e), NOTICE_TICKS);
    }
    info!(variant = session.variant.name(), profile = ?profile, "session started");

    let mut renderer = Renderer::new();
    let honor_release = match renderer.init() {
        Ok(enhanced) => enhanced,
        Err(e) => {
            eprintln!("Terminal init failed: {e}");
            return;
        }
    };

    let sound = SoundEngine::new();
    let mut host = Host {
        input: InputBuffer::new(),
        paused: false,
        yaw: 0.0,
        profile,
        frame: 0,
    };

    let result = game_loop(&mut session, &mut host, &mut renderer, sound.as_ref(), &config, honor_release);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    info!(ticks = session.tick, "session ended");
    println!();
    println!("Thanks for playing Cellbreak: Space Prison Escape!");
    println!(
        "Ticks survived: {}   Health: {}/{}",
        session.tick, session.player.health, session.player.max_health
    );
}

/// The terminal is in raw mode while playing, so logs go to a file.
fn init_logging(cfg: &LogConfig) {
    let path = if cfg.file.is_absolute() {
        cfg.file.clone()
    } else {
        settings::data_dir().join(&cfg.file)
    };
    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: cannot open log file {}: {}", path.display(), e);
            return;
        }
    };
    let level = cfg.level.parse::<Level>().unwrap_or_else(|_| {
        eprintln!("Warning: unknown log level '{}', using info", cfg.level);
        Level::INFO
    });

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: logging disabled: {}", e);
    }
}

/// Host-side state that never enters the simulation.
struct Host {
    input: InputBuffer,
    paused: bool,
    yaw: f32,
    profile: Option<String>,
    frame: u32,
}

impl Host {
    fn view(&self) -> HostView<'_> {
        HostView {
            paused: self.paused,
            yaw: self.yaw,
            profile: self.profile.as_deref(),
            frame: self.frame,
        }
    }
}

fn game_loop(
    session: &mut Session,
    host: &mut Host,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
    honor_release: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = honor_release;
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.tick_rate_ms);

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }
        if handle_meta(session, host, &kb, &gp) {
            break;
        }

        // Edges are only fresh for one drain, so queue them every frame.
        if !host.paused {
            queue_edges(&mut host.input, &kb, &gp);
        }

        if last_tick.elapsed() >= tick_rate {
            if !host.paused {
                sample_held(host, &kb, &gp, session.variant);
                let frame_input = host.input.take();
                let events = step::step(session, frame_input);
                renderer.push_events(&events);
                process_sound_events(sound, &events);
                renderer.tick_effects();
            }
            last_tick = Instant::now();
        }

        host.frame = host.frame.wrapping_add(1);
        renderer.render(session, &host.view())?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::JumpLaunched { .. } => sfx.play_jump(),
            GameEvent::DamageTaken { .. } => sfx.play_damage(),
            GameEvent::GameOver { .. } => sfx.play_game_over(),
            GameEvent::ItemCollected { .. } => sfx.play_item(),
            GameEvent::ZoneExited { .. } | GameEvent::ZoneEntered { .. } => sfx.play_zone(),
            GameEvent::CheckpointCreated { .. } | GameEvent::Respawned { .. } => sfx.play_checkpoint(),
            GameEvent::GravityToggled { .. } | GameEvent::LightToggled { .. } => sfx.play_toggle(),
            _ => {}
        }
    }
}

// ── Key Constants ──

const KEYS_FORWARD: &[KeyCode] = &[KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_BACK: &[KeyCode] = &[KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_LEFT: &[KeyCode] = &[KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_TURN_LEFT: &[KeyCode] = &[KeyCode::Left];
const KEYS_TURN_RIGHT: &[KeyCode] = &[KeyCode::Right];
const KEYS_JUMP: &[KeyCode] = &[KeyCode::Char(' ')];
const KEYS_DESCEND: &[KeyCode] = &[KeyCode::Char('c'), KeyCode::Char('C')];
const KEYS_GRAVITY: &[KeyCode] = &[KeyCode::Char('g'), KeyCode::Char('G')];
const KEYS_LIGHT: &[KeyCode] = &[KeyCode::Char('l'), KeyCode::Char('L')];
const KEYS_INTERACT: &[KeyCode] = &[KeyCode::Char('e'), KeyCode::Char('E')];
const KEYS_CHECKPOINT: &[KeyCode] = &[KeyCode::Char('k'), KeyCode::Char('K')];
const KEYS_RESPAWN: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_CLEAR: &[KeyCode] = &[KeyCode::Char('x'), KeyCode::Char('X')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

/// One-shot controls: jump edges and queued actions.
fn queue_edges(buf: &mut InputBuffer, kb: &InputState, gp: &GamepadState) {
    if kb.any_pressed(KEYS_JUMP) || gp.jump_pressed() {
        buf.press_jump();
    }
    if kb.any_released(KEYS_JUMP) || gp.jump_released() {
        buf.release_jump();
    }

    let bindings = [
        (kb.any_pressed(KEYS_GRAVITY) || gp.gravity_pressed(), Action::ToggleGravity),
        (kb.any_pressed(KEYS_LIGHT) || gp.light_pressed(), Action::ToggleLight),
        (kb.any_pressed(KEYS_INTERACT), Action::Interact),
        (kb.any_pressed(KEYS_CHECKPOINT) || gp.checkpoint_pressed(), Action::CreateCheckpoint),
        (kb.any_pressed(KEYS_RESPAWN) || gp.respawn_pressed(), Action::Respawn),
        (kb.any_pressed(KEYS_CLEAR), Action::ClearCheckpoints),
    ];
    for (pressed, action) in bindings {
        if pressed {
            buf.queue(action);
        }
    }
}

/// Held controls, sampled once per tick. Also advances the view yaw.
fn sample_held(host: &mut Host, kb: &InputState, gp: &GamepadState, variant: Variant) {
    let (pad_forward, pad_right) = gp.movement();

    let intent = match variant {
        Variant::Sphere3d => {
            let key_turn = kb.any_held(KEYS_TURN_RIGHT) as i8 as f32 - kb.any_held(KEYS_TURN_LEFT) as i8 as f32;
            let turn = (key_turn + gp.turn()).clamp(-1.0, 1.0);
            host.yaw = (host.yaw + turn * TURN_SPEED).rem_euclid(std::f32::consts::TAU);

            if pad_forward != 0.0 || pad_right != 0.0 {
                input::analog_intent(pad_forward, pad_right, host.yaw)
            } else {
                input::movement_intent(
                    kb.any_held(KEYS_FORWARD),
                    kb.any_held(KEYS_BACK),
                    kb.any_held(KEYS_LEFT),
                    kb.any_held(KEYS_RIGHT),
                    host.yaw,
                )
            }
        }
        Variant::Box2d => {
            if pad_right != 0.0 {
                Vec2::new(pad_right.clamp(-1.0, 1.0), 0.0)
            } else {
                input::side_intent(
                    kb.any_held(KEYS_LEFT) || kb.any_held(KEYS_TURN_LEFT),
                    kb.any_held(KEYS_RIGHT) || kb.any_held(KEYS_TURN_RIGHT),
                )
            }
        }
    };

    let jump_held = kb.any_held(KEYS_JUMP) || gp.jump_held();
    let descend_held = kb.any_held(KEYS_DESCEND) || gp.descend_held();
    host.input.set_held(intent, jump_held, descend_held);
}

// ── Meta keys: pause, profiles, live tuning, quit ──

fn handle_meta(session: &mut Session, host: &mut Host, kb: &InputState, gp: &GamepadState) -> bool {
    // F1 / Start: Pause / Resume
    if kb.any_pressed(&[KeyCode::F(1)]) || gp.pause_pressed() {
        host.paused = !host.paused;
        if host.paused {
            session.set_message("PAUSED  [F1] Resume", 0);
        } else {
            session.message.clear();
            session.message_timer = 0;
        }
        return false;
    }

    if kb.any_pressed(KEYS_QUIT) {
        return true;
    }

    // Profiles work paused or not
    if kb.any_pressed(&[KeyCode::F(5)]) {
        save_current_profile(session, host);
        return false;
    }
    if kb.any_pressed(&[KeyCode::F(6)]) {
        cycle_profile(session, host);
        return false;
    }
    if kb.any_pressed(&[KeyCode::F(8)]) {
        delete_selected_profile(session, host);
        return false;
    }
    if kb.any_pressed(&[KeyCode::F(9)]) {
        load_selected_profile(session, host);
        return false;
    }

    if host.paused {
        return false;
    }

    // [ / ]: live gravity adjustment
    let nudge = if kb.any_pressed(&[KeyCode::Char('[')]) {
        -GRAVITY_NUDGE
    } else if kb.any_pressed(&[KeyCode::Char(']')]) {
        GRAVITY_NUDGE
    } else {
        0.0
    };
    if nudge != 0.0 {
        let mut tuning = session.tuning.clone();
        tuning.gravity = (tuning.gravity + nudge).max(0.0);
        let gravity = tuning.gravity;
        session.apply_tuning(tuning);
        session.set_message(&format!("Gravity {:.2}", gravity), NOTICE_TICKS / 2);
    }

    false
}

fn save_current_profile(session: &mut Session, host: &mut Host) {
    let name = host.profile.clone().unwrap_or_else(|| DEFAULT_PROFILE.to_string());
    match settings::save_profile(&name, &session.tuning) {
        Ok(()) => {
            info!(profile = %name, "profile saved");
            session.set_message(&format!("Saved profile '{}'", name), NOTICE_TICKS);
            host.profile = Some(name);
        }
        Err(e) => {
            warn!(profile = %name, error = %e, "profile save failed");
            session.set_message(&format!("Save failed: {}", e), NOTICE_TICKS);
        }
    }
}

/// Select the next stored profile by name; F9 applies it.
fn cycle_profile(session: &mut Session, host: &mut Host) {
    let names = match settings::list_profiles() {
        Ok(n) => n,
        Err(e) => {
            warn!(error = %e, "profile list failed");
            session.set_message(&format!("Profiles unavailable: {}", e), NOTICE_TICKS);
            return;
        }
    };
    if names.is_empty() {
        session.set_message("No saved profiles  [F5] Save", NOTICE_TICKS);
        return;
    }
    let next = match host.profile.as_deref().and_then(|cur| names.iter().position(|n| n == cur)) {
        Some(i) => (i + 1) % names.len(),
        None => 0,
    };
    session.set_message(&format!("Profile: {}  [F9] Load", names[next]), NOTICE_TICKS);
    host.profile = Some(names[next].clone());
}

fn load_selected_profile(session: &mut Session, host: &mut Host) {
    let Some(name) = host.profile.clone() else {
        session.set_message("No profile selected  [F6] Next", NOTICE_TICKS);
        return;
    };
    match settings::load_profile(&name) {
        Ok(tuning) => {
            info!(profile = %name, "profile loaded");
            session.apply_tuning(tuning);
            session.set_message(&format!("Loaded profile '{}'", name), NOTICE_TICKS);
        }
        Err(e) => {
            warn!(profile = %name, error = %e, "profile load failed");
            session.set_message(&format!("Load failed: {}", e), NOTICE_TICKS);
        }
    }
}

fn delete_selected_profile(session: &mut Session, host: &mut Host) {
    let Some(name) = host.profile.clone() else {
        session.set_message("No profile selected  [F6] Next", NOTICE_TICKS);
        return;
    };
    match settings::delete_profile(&name) {
        Ok(true) => {
            info!(profile = %name, "profile deleted");
            session.set_message(&format!("Deleted profile '{}'", name), NOTICE_TICKS);
            host.profile = None;
        }
        Ok(false) => session.set_message(&format!("Profile '{}' is not saved", name), NOTICE_TICKS),
        Err(e) => {
            warn!(profile = %name, error = %e, "profile delete failed");
            session.set_message(&format!("Delete failed: {}", e), NOTICE_TICKS);
        }
    }
}
