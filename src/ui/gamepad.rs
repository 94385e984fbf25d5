/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   Left Stick / D-pad  →  Movement (view-relative)
///   Right Stick X       →  Turn
///   A                   →  Jump (hold to charge) / ascend in space
///   B                   →  Descend in space
///   Y                   →  Create checkpoint
///   X                   →  Respawn at checkpoint
///   L1 / R1             →  Gravity / light toggle
///   Start               →  Pause

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    L2,
    R2,
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "L2" | "LT" => Some(Btn::L2),
            "R2" | "RT" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2 => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Per-button state: held plus both edges.
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
    just_released: bool,
}

/// Action-to-button mapping (loaded from config).
struct ActionMap {
    jump: Vec<Btn>,
    descend: Vec<Btn>,
    checkpoint: Vec<Btn>,
    respawn: Vec<Btn>,
    gravity: Vec<Btn>,
    light: Vec<Btn>,
    pause: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            jump: vec![Btn::A],
            descend: vec![Btn::B],
            checkpoint: vec![Btn::Y],
            respawn: vec![Btn::X],
            gravity: vec![Btn::L1],
            light: vec![Btn::R1],
            pause: vec![Btn::Start],
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; 10],

    dpad_up: bool,
    dpad_down: bool,
    dpad_left: bool,
    dpad_right: bool,

    stick_x: f32,
    stick_y: f32,
    look_x: f32,

    action_map: ActionMap,

    pub connected: bool,
}

fn btn_index(btn: Btn) -> usize {
    btn as usize
}

fn deadzone(v: f32) -> f32 {
    if v.abs() < STICK_DEADZONE { 0.0 } else { v }
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(_) => (None, false),
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            buttons: [BtnState::default(); 10],
            dpad_up: false,
            dpad_down: false,
            dpad_left: false,
            dpad_right: false,
            stick_x: 0.0,
            stick_y: 0.0,
            look_x: 0.0,
            action_map: ActionMap::default(),
            connected,
        }
    }

    /// Load button mapping from config. Empty or unrecognised lists keep the default.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn apply(slot: &mut Vec<Btn>, names: &[String]) {
            let parsed: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if !parsed.is_empty() {
                *slot = parsed;
            }
        }
        let map = &mut self.action_map;
        apply(&mut map.jump, &cfg.jump);
        apply(&mut map.descend, &cfg.descend);
        apply(&mut map.checkpoint, &cfg.checkpoint);
        apply(&mut map.respawn, &cfg.respawn);
        apply(&mut map.gravity, &cfg.gravity);
        apply(&mut map.light, &cfg.light);
        apply(&mut map.pause, &cfg.pause);
    }

    pub fn update(&mut self) {
        for b in &mut self.buttons {
            b.just_pressed = false;
            b.just_released = false;
        }

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        Axis::RightStickX => self.look_x = value,
                        _ => {}
                    }
                }
                EventType::Connected => { self.connected = true; }
                EventType::Disconnected => {
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        match gilrs_btn {
            Button::DPadUp => { self.dpad_up = held; return; }
            Button::DPadDown => { self.dpad_down = held; return; }
            Button::DPadLeft => { self.dpad_left = held; return; }
            Button::DPadRight => { self.dpad_right = held; return; }
            _ => {}
        }

        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            let state = &mut self.buttons[btn_index(btn)];
            if held && !state.held { state.just_pressed = true; }
            if !held && state.held { state.just_released = true; }
            state.held = held;
        }
    }

    // ── Action queries (config-driven) ──

    fn any_held(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[btn_index(b)].held)
    }

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[btn_index(b)].just_pressed)
    }

    fn any_just_released(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[btn_index(b)].just_released)
    }

    pub fn jump_held(&self) -> bool { self.any_held(&self.action_map.jump) }
    pub fn jump_pressed(&self) -> bool { self.any_just_pressed(&self.action_map.jump) }
    pub fn jump_released(&self) -> bool { self.any_just_released(&self.action_map.jump) }
    pub fn descend_held(&self) -> bool { self.any_held(&self.action_map.descend) }
    pub fn checkpoint_pressed(&self) -> bool { self.any_just_pressed(&self.action_map.checkpoint) }
    pub fn respawn_pressed(&self) -> bool { self.any_just_pressed(&self.action_map.respawn) }
    pub fn gravity_pressed(&self) -> bool { self.any_just_pressed(&self.action_map.gravity) }
    pub fn light_pressed(&self) -> bool { self.any_just_pressed(&self.action_map.light) }
    pub fn pause_pressed(&self) -> bool { self.any_just_pressed(&self.action_map.pause) }

    /// Movement as (forward, right). D-pad wins over the stick.
    pub fn movement(&self) -> (f32, f32) {
        let digital = |pos: bool, neg: bool| pos as i8 as f32 - neg as i8 as f32;
        let forward = digital(self.dpad_up, self.dpad_down);
        let right = digital(self.dpad_right, self.dpad_left);
        if forward != 0.0 || right != 0.0 {
            (forward, right)
        } else {
            (deadzone(self.stick_y), deadzone(self.stick_x))
        }
    }

    /// Turn rate in [-1, 1]; positive turns right.
    pub fn turn(&self) -> f32 {
        deadzone(self.look_x)
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        for b in &mut self.buttons {
            if b.held { b.just_released = true; }
            b.held = false;
            b.just_pressed = false;
        }
        self.dpad_up = false;
        self.dpad_down = false;
        self.dpad_left = false;
        self.dpad_right = false;
        self.stick_x = 0.0;
        self.stick_y = 0.0;
        self.look_x = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_names_are_case_insensitive() {
        assert_eq!(Btn::from_name("south"), Some(Btn::A));
        assert_eq!(Btn::from_name("Rb"), Some(Btn::R1));
        assert_eq!(Btn::from_name("turbo"), None);
    }

    #[test]
    fn unknown_names_keep_default_mapping() {
        let mut gp = GamepadState::new();
        let cfg = GamepadConfig {
            jump: vec!["nonsense".into()],
            descend: vec!["L2".into()],
            checkpoint: vec![],
            respawn: vec![],
            gravity: vec![],
            light: vec![],
            pause: vec![],
        };
        gp.load_button_config(&cfg);
        assert_eq!(gp.action_map.jump, vec![Btn::A]);
        assert_eq!(gp.action_map.descend, vec![Btn::L2]);
    }

    #[test]
    fn small_stick_noise_is_ignored() {
        let mut gp = GamepadState::new();
        gp.stick_x = 0.1;
        gp.stick_y = -0.6;
        assert_eq!(gp.movement(), (-0.6, 0.0));
    }
}
