use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(point1: Vec3, point2: Vec3) -> Aabb {
        let min = point1.min(point2);
        let max = point1.max(point2);
        Aabb { min, max }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Aabb> {
        let mut points = points.into_iter();
        let first = points.next()?;

        Some(points.fold(Aabb::new(first, first), |aabb, point| Aabb {
            min: aabb.min.min(point),
            max: aabb.max.max(point),
        }))
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Transform that scales the box uniformly to `height` and stands it on
    /// `base`, centred on the base's x and z.
    pub fn fit_to_height(&self, base: Vec3, height: f32) -> Mat4 {
        let current_height = self.size().y;
        let scale = if current_height > f32::EPSILON {
            height / current_height
        } else {
            1.0
        };

        let anchor = Vec3::new(self.center().x, self.min.y, self.center().z);

        Mat4::from_translation(base) * Mat4::from_scale(Vec3::splat(scale)) * Mat4::from_translation(-anchor)
    }
}
