/// Checkpoint list: bounded, ordered, with a current pointer.
///
/// The current checkpoint is an index into the list and is dropped on
/// clear. Ids are list positions plus one, so numbering restarts at 1
/// after a clear.

use glam::Vec3;

use crate::error::CheckpointError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Checkpoint {
    pub id: u32,
    pub pos: Vec3,
    /// Simulation tick at creation.
    pub created_tick: u64,
}

#[derive(Clone, Debug, Default)]
pub struct Checkpoints {
    list: Vec<Checkpoint>,
    current: Option<usize>,
}

impl Checkpoints {
    pub fn new() -> Self {
        Checkpoints::default()
    }

    /// Append a snapshot of `pos`. `max` is read per call so a lowered
    /// capacity blocks creation without dropping existing entries.
    pub fn create(&mut self, pos: Vec3, tick: u64, max: usize) -> Result<Checkpoint, CheckpointError> {
        if self.list.len() >= max {
            return Err(CheckpointError::CapacityExceeded { max });
        }
        let cp = Checkpoint {
            id: self.list.len() as u32 + 1,
            pos,
            created_tick: tick,
        };
        self.list.push(cp);
        self.current = Some(self.list.len() - 1);
        Ok(cp)
    }

    pub fn current(&self) -> Result<&Checkpoint, CheckpointError> {
        self.current
            .and_then(|i| self.list.get(i))
            .ok_or(CheckpointError::NoCheckpoint)
    }

    /// Drop everything. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let n = self.list.len();
        self.list.clear();
        self.current = None;
        n
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Checkpoint> {
        self.list.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32) -> Vec3 {
        Vec3::new(x, 1.0, 0.0)
    }

    #[test]
    fn create_advances_current() {
        let mut cps = Checkpoints::new();
        cps.create(at(1.0), 10, 5).unwrap();
        let second = cps.create(at(2.0), 20, 5).unwrap();
        assert_eq!(second.id, 2);
        assert_eq!(cps.current().unwrap().pos, at(2.0));
        assert_eq!(cps.current().unwrap().created_tick, 20);
    }

    #[test]
    fn sixth_checkpoint_is_rejected() {
        let mut cps = Checkpoints::new();
        for i in 0..5 {
            cps.create(at(i as f32), i, 5).unwrap();
        }
        let before = *cps.current().unwrap();
        let err = cps.create(at(99.0), 6, 5).unwrap_err();
        assert_eq!(err, CheckpointError::CapacityExceeded { max: 5 });
        assert_eq!(cps.len(), 5);
        assert_eq!(*cps.current().unwrap(), before);
    }

    #[test]
    fn empty_list_has_no_current() {
        let cps = Checkpoints::new();
        assert_eq!(cps.current().unwrap_err(), CheckpointError::NoCheckpoint);
    }

    #[test]
    fn clear_resets_ids_and_current() {
        let mut cps = Checkpoints::new();
        cps.create(at(1.0), 1, 5).unwrap();
        cps.create(at(2.0), 2, 5).unwrap();
        assert_eq!(cps.clear(), 2);
        assert!(cps.is_empty());
        assert!(cps.current().is_err());
        assert_eq!(cps.create(at(3.0), 3, 5).unwrap().id, 1);
    }

    #[test]
    fn lowered_capacity_keeps_existing_entries() {
        let mut cps = Checkpoints::new();
        for i in 0..4 {
            cps.create(at(i as f32), i, 5).unwrap();
        }
        assert!(cps.create(at(9.0), 9, 2).is_err());
        assert_eq!(cps.len(), 4);
    }
}
