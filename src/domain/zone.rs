/// Cell/space boundary monitor.
///
/// "In cell" is a pure function of the horizontal position against the cell
/// rectangle; height never matters. The monitor keeps last tick's answer
/// only to report edges.

use glam::Vec3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Zone {
    Cell,
    Space,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ZoneTransition {
    Entered,
    Exited,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct CellBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl CellBounds {
    /// Square footprint centred on the origin.
    pub fn square(half: f32) -> Self {
        CellBounds { min_x: -half, max_x: half, min_z: -half, max_z: half }
    }

    /// Inclusive on all four edges.
    #[inline]
    pub fn contains(&self, pos: Vec3) -> bool {
        pos.x >= self.min_x && pos.x <= self.max_x
            && pos.z >= self.min_z && pos.z <= self.max_z
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ZoneMonitor {
    in_cell: bool,
}

impl ZoneMonitor {
    pub fn new(in_cell: bool) -> Self {
        ZoneMonitor { in_cell }
    }

    pub fn in_cell(&self) -> bool {
        self.in_cell
    }

    pub fn zone(&self) -> Zone {
        if self.in_cell { Zone::Cell } else { Zone::Space }
    }

    /// Record this tick's value and report a flip.
    pub fn update(&mut self, in_cell: bool) -> Option<ZoneTransition> {
        let prev = std::mem::replace(&mut self.in_cell, in_cell);
        match (prev, in_cell) {
            (true, false) => Some(ZoneTransition::Exited),
            (false, true) => Some(ZoneTransition::Entered),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive_and_ignore_height() {
        let b = CellBounds::square(10.0);
        assert!(b.contains(Vec3::new(10.0, -50.0, -10.0)));
        assert!(b.contains(Vec3::new(0.0, 999.0, 0.0)));
        assert!(!b.contains(Vec3::new(10.01, 0.0, 0.0)));
        assert!(!b.contains(Vec3::new(0.0, 0.0, -10.5)));
    }

    #[test]
    fn same_position_same_answer() {
        let b = CellBounds::square(10.0);
        let p = Vec3::new(3.0, 1.0, -9.0);
        assert_eq!(b.contains(p), b.contains(Vec3::new(3.0, 42.0, -9.0)));
    }

    #[test]
    fn edges_fire_once() {
        let mut m = ZoneMonitor::new(true);
        assert_eq!(m.update(true), None);
        assert_eq!(m.update(false), Some(ZoneTransition::Exited));
        assert_eq!(m.update(false), None);
        assert_eq!(m.zone(), Zone::Space);
        assert_eq!(m.update(true), Some(ZoneTransition::Entered));
        assert_eq!(m.zone(), Zone::Cell);
    }
}
