/// Collision primitives: sphere distance test and axis-aligned boxes.
///
/// Both tests are strict: touching surfaces do not overlap.

use glam::Vec3;

/// Sphere overlap: centre distance strictly less than the radius sum.
#[inline]
pub fn spheres_overlap(a: Vec3, ra: f32, b: Vec3, rb: f32) -> bool {
    a.distance(b) < ra + rb
}

/// Axis-aligned box given by its min and max corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center(center: Vec3, half: Vec3) -> Self {
        Aabb { min: center - half, max: center + half }
    }

    /// Half-open overlap on every axis.
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x && self.max.x > other.min.x
            && self.min.y < other.max.y && self.max.y > other.min.y
            && self.min.z < other.max.z && self.max.z > other.min.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spheres_touching_do_not_overlap() {
        let a = Vec3::ZERO;
        let b = Vec3::new(1.0, 0.0, 0.0);
        assert!(!spheres_overlap(a, 0.5, b, 0.5));
        assert!(spheres_overlap(a, 0.5, b, 0.51));
    }

    #[test]
    fn sphere_test_is_euclidean() {
        // 3-4-5 triangle: distance 5
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 4.0, 0.0);
        assert!(!spheres_overlap(a, 2.0, b, 3.0));
        assert!(spheres_overlap(a, 2.0, b, 3.01));
    }

    #[test]
    fn boxes_sharing_a_face_do_not_overlap() {
        let a = Aabb::from_center(Vec3::ZERO, Vec3::splat(1.0));
        let b = Aabb::from_center(Vec3::new(2.0, 0.0, 0.0), Vec3::splat(1.0));
        assert!(!a.overlaps(&b));
        let c = Aabb::from_center(Vec3::new(1.9, 0.5, -0.5), Vec3::splat(1.0));
        assert!(a.overlaps(&c));
    }

    #[test]
    fn box_overlap_needs_every_axis() {
        let a = Aabb::from_center(Vec3::ZERO, Vec3::splat(1.0));
        let b = Aabb::from_center(Vec3::new(0.5, 0.5, 3.0), Vec3::splat(1.0));
        assert!(!a.overlaps(&b));
    }
}
