//! Axis-aligned boxes and the per-level instantiation transform.

use nalgebra::{Matrix2, Point3, Rotation2, Vector2, Vector3};

/// An axis-aligned box, stored as normalized corners (`min <= max` per axis).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl XBox {
    /// Build from the `XB=x1,x2,y1,y2,z1,z2` ordering, re-ordering each pair.
    pub fn from_xb(xb: [f64; 6]) -> Self {
        XBox {
            min: Point3::new(xb[0].min(xb[1]), xb[2].min(xb[3]), xb[4].min(xb[5])),
            max: Point3::new(xb[0].max(xb[1]), xb[2].max(xb[3]), xb[4].max(xb[5])),
        }
    }

    pub fn to_xb(&self) -> [f64; 6] {
        [
            self.min.x, self.max.x, self.min.y, self.max.y, self.min.z, self.max.z,
        ]
    }

    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    pub fn translate(&self, by: &Vector3<f64>) -> Self {
        XBox {
            min: self.min + by,
            max: self.max + by,
        }
    }

    /// Smallest box holding both `self` and `other`.
    pub fn union(&self, other: &XBox) -> Self {
        XBox {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Rotate about the vertical axis through `origin` by `degrees`
    /// (counter-clockwise seen from +z), then shift so the rotated pivot
    /// rectangle `[0, pivot.x] x [0, pivot.y]` keeps its minimum corner at
    /// `origin`. Heights are untouched.
    pub fn rotate_about(&self, origin: &Point3<f64>, degrees: f64, pivot: &Vector3<f64>) -> Self {
        let Some(rot) = planar_rotation(degrees) else {
            return *self;
        };
        let (lo, hi) = rotated_extent(
            &rot,
            &[
                Vector2::new(self.min.x - origin.x, self.min.y - origin.y),
                Vector2::new(self.max.x - origin.x, self.min.y - origin.y),
                Vector2::new(self.min.x - origin.x, self.max.y - origin.y),
                Vector2::new(self.max.x - origin.x, self.max.y - origin.y),
            ],
        );
        let (anchor, _) = rotated_extent(
            &rot,
            &[
                Vector2::zeros(),
                Vector2::new(pivot.x, 0.0),
                Vector2::new(0.0, pivot.y),
                Vector2::new(pivot.x, pivot.y),
            ],
        );
        XBox {
            min: Point3::new(origin.x + lo.x - anchor.x, origin.y + lo.y - anchor.y, self.min.z),
            max: Point3::new(origin.x + hi.x - anchor.x, origin.y + hi.y - anchor.y, self.max.z),
        }
    }
}

/// Rotation for `degrees`, or `None` for a whole number of turns.
/// Quarter turns use exact sines so axis-aligned input stays exact.
fn planar_rotation(degrees: f64) -> Option<Rotation2<f64>> {
    let turn = degrees.rem_euclid(360.0);
    let (s, c) = match turn {
        t if t == 0.0 => return None,
        t if t == 90.0 => (1.0, 0.0),
        t if t == 180.0 => (0.0, -1.0),
        t if t == 270.0 => (-1.0, 0.0),
        t => t.to_radians().sin_cos(),
    };
    Some(Rotation2::from_matrix_unchecked(Matrix2::new(c, -s, s, c)))
}

fn rotated_extent(rot: &Rotation2<f64>, corners: &[Vector2<f64>; 4]) -> (Vector2<f64>, Vector2<f64>) {
    let first = rot * corners[0];
    corners[1..].iter().fold((first, first), |(lo, hi), c| {
        let r = rot * c;
        (lo.inf(&r), hi.sup(&r))
    })
}

/// The transform supplied when an assembly is instantiated at one nesting
/// level: rotate about the assembly's origin (pivoting on its size), then
/// move the origin to `offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub offset: Vector3<f64>,
    pub rotate: f64,
    pub origin: Point3<f64>,
    pub pivot: Vector3<f64>,
}

impl Frame {
    pub fn apply(&self, b: &XBox) -> XBox {
        b.rotate_about(&self.origin, self.rotate, &self.pivot)
            .translate(&(self.offset - self.origin.coords))
    }
}

/// Apply a stack of frames innermost first, so `frames[0]` (the outermost
/// instantiation) is applied last.
pub fn compose(frames: &[Frame], b: &XBox) -> XBox {
    frames.iter().rev().fold(*b, |acc, f| f.apply(&acc))
}
