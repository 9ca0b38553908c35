use glam::{Mat4, Vec3};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point, or `None` for an empty set
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;

        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    pub fn union(&self, other: &AABB) -> AABB {
        AABB {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Box around the eight transformed corners
    pub fn transform(&self, matrix: &Mat4) -> AABB {
        let corners = (0..8).map(|i| {
            Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            )
        });

        let mut transformed = corners.map(|c| matrix.transform_point3(c));
        let first = transformed.next().unwrap_or(Vec3::ZERO);
        let (min, max) = transformed.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));

        AABB { min, max }
    }
}
