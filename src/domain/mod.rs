pub mod checkpoint;
pub mod collision;
pub mod entity;
pub mod geometry;
pub mod input;
pub mod jump;
pub mod physics;
pub mod zone;
