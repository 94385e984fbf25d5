/// Per-tick input snapshot.
///
/// Held controls are plain booleans sampled between ticks. One-shot controls
/// (jump press/release, toggles, checkpoint commands) are queued and
/// consumed exactly once by the next tick.

use glam::Vec2;

/// Discrete commands applied near the end of a tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    ToggleGravity,
    ToggleLight,
    CreateCheckpoint,
    Respawn,
    ClearCheckpoints,
    Interact,
}

/// Frame input: what the simulation sees for one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Unit-or-zero movement on the ground plane: x is world x, y is world z.
    pub intent: Vec2,
    /// Jump / ascend control is down.
    pub jump_held: bool,
    pub descend_held: bool,
    pub jump_pressed: bool,
    pub jump_released: bool,
    pub actions: Vec<Action>,
}

/// Double buffer between the host's event handlers and the tick.
#[derive(Debug, Default)]
pub struct InputBuffer {
    pending: FrameInput,
}

impl InputBuffer {
    pub fn new() -> Self {
        InputBuffer::default()
    }

    /// Overwrite the held state; the latest sample wins.
    pub fn set_held(&mut self, intent: Vec2, jump_held: bool, descend_held: bool) {
        self.pending.intent = intent;
        self.pending.jump_held = jump_held;
        self.pending.descend_held = descend_held;
    }

    pub fn press_jump(&mut self) {
        self.pending.jump_pressed = true;
    }

    pub fn release_jump(&mut self) {
        self.pending.jump_released = true;
    }

    pub fn queue(&mut self, action: Action) {
        self.pending.actions.push(action);
    }

    /// Hand the tick a frozen snapshot. Edge events are cleared, held state
    /// carries over until the host samples again.
    pub fn take(&mut self) -> FrameInput {
        let snapshot = self.pending.clone();
        self.pending.jump_pressed = false;
        self.pending.jump_released = false;
        self.pending.actions.clear();
        snapshot
    }
}

/// Camera-relative WASD intent, normalized. `yaw` is the view heading in
/// radians; forward at yaw 0 is +z.
pub fn movement_intent(forward: bool, back: bool, left: bool, right: bool, yaw: f32) -> Vec2 {
    let axis = |pos: bool, neg: bool| pos as i8 as f32 - neg as i8 as f32;
    view_relative(axis(forward, back), axis(right, left), yaw).normalize_or_zero()
}

/// Stick input: same mapping as `movement_intent`, clamped to unit length
/// instead of normalized so partial tilt walks slower.
pub fn analog_intent(forward: f32, right: f32, yaw: f32) -> Vec2 {
    view_relative(forward, right, yaw).clamp_length_max(1.0)
}

fn view_relative(forward: f32, right: f32, yaw: f32) -> Vec2 {
    let (sin, cos) = yaw.sin_cos();
    Vec2::new(sin, cos) * forward + Vec2::new(-cos, sin) * right
}

/// Side-view intent: only the x axis.
pub fn side_intent(left: bool, right: bool) -> Vec2 {
    match (left, right) {
        (true, false) => Vec2::new(-1.0, 0.0),
        (false, true) => Vec2::new(1.0, 0.0),
        _ => Vec2::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn forward_at_zero_yaw_is_plus_z() {
        assert!(close(movement_intent(true, false, false, false, 0.0), Vec2::new(0.0, 1.0)));
    }

    #[test]
    fn strafe_left_at_zero_yaw_is_plus_x() {
        assert!(close(movement_intent(false, false, true, false, 0.0), Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn diagonal_is_normalized() {
        let v = movement_intent(true, false, true, false, 0.7);
        assert!((v.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn half_tilt_walks_at_half_speed() {
        let v = analog_intent(0.5, 0.0, 0.0);
        assert!(close(v, Vec2::new(0.0, 0.5)));
        let full = analog_intent(1.0, 1.0, 0.3);
        assert!((full.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn opposing_keys_cancel() {
        assert_eq!(movement_intent(true, true, false, false, 1.2), Vec2::ZERO);
        assert_eq!(side_intent(true, true), Vec2::ZERO);
    }

    #[test]
    fn take_clears_edges_but_keeps_held() {
        let mut buf = InputBuffer::new();
        buf.set_held(Vec2::new(1.0, 0.0), true, false);
        buf.release_jump();
        buf.queue(Action::CreateCheckpoint);

        let first = buf.take();
        assert!(first.jump_released);
        assert_eq!(first.actions, vec![Action::CreateCheckpoint]);
        assert!(first.jump_held);

        let second = buf.take();
        assert!(!second.jump_released);
        assert!(second.actions.is_empty());
        assert!(second.jump_held);
        assert_eq!(second.intent, Vec2::new(1.0, 0.0));
    }
}
