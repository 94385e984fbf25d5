/// Jump-charge state machine.
///
/// Idle until the jump control is held on the ground in a zone that allows
/// charging; then one unit per tick up to the cap. Losing any of the three
/// conditions drops the charge silently. A release on the ground converts
/// the charge into launch velocity.

use tracing::debug;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum JumpPhase {
    Idle,
    Charging,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct JumpCharge {
    pub charge: u32,
}

impl JumpCharge {
    pub fn phase(&self) -> JumpPhase {
        if self.charge > 0 { JumpPhase::Charging } else { JumpPhase::Idle }
    }

    /// Advance one tick.
    pub fn tick(&mut self, held: bool, grounded: bool, permitted: bool, max_charge: u32) {
        if held && grounded && permitted {
            if self.charge < max_charge {
                self.charge += 1;
            } else {
                // cap may have been lowered mid-charge
                self.charge = max_charge;
            }
        } else if self.charge > 0 {
            debug!(charge = self.charge, "jump charge reset");
            self.charge = 0;
        }
    }

    /// Fraction of a full charge, 0 when the cap is 0.
    pub fn ratio(&self, max_charge: u32) -> f32 {
        if max_charge == 0 {
            0.0
        } else {
            self.charge.min(max_charge) as f32 / max_charge as f32
        }
    }

    /// Control released. Returns the launch velocity when grounded;
    /// airborne releases change nothing.
    pub fn release(&mut self, grounded: bool, base: f32, max_power: f32, max_charge: u32) -> Option<f32> {
        if !grounded {
            return None;
        }
        let power = base + (max_power - base) * self.ratio(max_charge);
        self.charge = 0;
        Some(power)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charges_one_per_tick_and_caps() {
        let mut j = JumpCharge::default();
        for _ in 0..40 {
            j.tick(true, true, true, 15);
            assert!(j.charge <= 15);
        }
        assert_eq!(j.charge, 15);
        assert_eq!(j.phase(), JumpPhase::Charging);
    }

    #[test]
    fn any_missing_condition_resets() {
        for (held, grounded, permitted) in [(false, true, true), (true, false, true), (true, true, false)] {
            let mut j = JumpCharge { charge: 7 };
            j.tick(held, grounded, permitted, 15);
            assert_eq!(j.charge, 0);
            assert_eq!(j.phase(), JumpPhase::Idle);
        }
    }

    #[test]
    fn lowered_cap_clamps_held_charge() {
        let mut j = JumpCharge { charge: 12 };
        j.tick(true, true, true, 5);
        assert_eq!(j.charge, 5);
    }

    #[test]
    fn full_charge_launches_at_max_power() {
        let mut j = JumpCharge { charge: 15 };
        assert_eq!(j.release(true, 1.0, 2.0, 15), Some(2.0));
        assert_eq!(j.charge, 0);
    }

    #[test]
    fn uncharged_release_launches_at_base_power() {
        let mut j = JumpCharge::default();
        assert_eq!(j.release(true, 1.0, 2.0, 15), Some(1.0));
    }

    #[test]
    fn partial_charge_interpolates() {
        let mut j = JumpCharge { charge: 5 };
        let p = j.release(true, 1.0, 2.0, 10).unwrap();
        assert!((p - 1.5).abs() < 1e-6);
    }

    #[test]
    fn zero_cap_uses_base_power() {
        let mut j = JumpCharge { charge: 3 };
        assert_eq!(j.release(true, 1.0, 2.0, 0), Some(1.0));
    }

    #[test]
    fn airborne_release_is_ignored() {
        let mut j = JumpCharge { charge: 4 };
        assert_eq!(j.release(false, 1.0, 2.0, 15), None);
        assert_eq!(j.charge, 4);
    }
}
