//! Rigid 3D poses and their projection onto the 2D drawing plane.

use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// Unit quaternion (w, x, y, z).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    #[inline]
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    #[inline]
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Rotation of `angle` radians about +Z (counter-clockwise seen from above).
    pub fn from_yaw(angle: f64) -> Self {
        let (s, c) = (angle * 0.5).sin_cos();
        Self::new(c, 0.0, 0.0, s)
    }

    /// Scaled to unit length. A zero quaternion becomes the identity.
    pub fn normalized(&self) -> Self {
        let norm = (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt();
        if norm <= f64::EPSILON {
            return Self::identity();
        }
        Self::new(self.w / norm, self.x / norm, self.y / norm, self.z / norm)
    }

    /// Rotate a vector.
    pub fn rotate(&self, v: [f64; 3]) -> [f64; 3] {
        let m = self.to_rotation_matrix();
        [
            m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
            m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
            m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
        ]
    }

    /// Row-major 3x3 rotation matrix.
    pub fn to_rotation_matrix(&self) -> [[f64; 3]; 3] {
        let q = self.normalized();
        let (w, x, y, z) = (q.w, q.x, q.y, q.z);
        [
            [
                1.0 - 2.0 * (y * y + z * z),
                2.0 * (x * y - w * z),
                2.0 * (x * z + w * y),
            ],
            [
                2.0 * (x * y + w * z),
                1.0 - 2.0 * (x * x + z * z),
                2.0 * (y * z - w * x),
            ],
            [
                2.0 * (x * z - w * y),
                2.0 * (y * z + w * x),
                1.0 - 2.0 * (x * x + y * y),
            ],
        ]
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Quaternion {
    type Output = Quaternion;

    /// Hamilton product: `(self * rhs)` applies `rhs` first.
    fn mul(self, rhs: Quaternion) -> Quaternion {
        Quaternion::new(
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        )
    }
}

/// Rigid 3D transform: rotation followed by translation.
///
/// ```text
/// p' = R(rotation) * p + translation
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rigid3 {
    /// Translation in meters
    #[serde(default)]
    pub translation: [f64; 3],
    /// Orientation
    #[serde(default)]
    pub rotation: Quaternion,
}

impl Rigid3 {
    #[inline]
    pub fn new(translation: [f64; 3], rotation: Quaternion) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    #[inline]
    pub fn identity() -> Self {
        Self::new([0.0; 3], Quaternion::identity())
    }

    /// Pure translation.
    #[inline]
    pub fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self::new([x, y, z], Quaternion::identity())
    }

    /// Planar pose: (x, y) translation with a yaw about +Z.
    pub fn from_xy_yaw(x: f64, y: f64, yaw: f64) -> Self {
        Self::new([x, y, 0.0], Quaternion::from_yaw(yaw))
    }

    /// Apply the transform to a point.
    pub fn transform_point(&self, p: [f64; 3]) -> [f64; 3] {
        let r = self.rotation.rotate(p);
        [
            r[0] + self.translation[0],
            r[1] + self.translation[1],
            r[2] + self.translation[2],
        ]
    }

    /// Row-major 4x4 homogeneous matrix.
    pub fn to_matrix(&self) -> [[f64; 4]; 4] {
        let r = self.rotation.to_rotation_matrix();
        let t = self.translation;
        [
            [r[0][0], r[0][1], r[0][2], t[0]],
            [r[1][0], r[1][1], r[1][2], t[1]],
            [r[2][0], r[2][1], r[2][2], t[2]],
            [0.0, 0.0, 0.0, 1.0],
        ]
    }
}

impl Default for Rigid3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Rigid3 {
    type Output = Rigid3;

    /// Composition: `(a * b)(p) == a(b(p))`.
    fn mul(self, rhs: Rigid3) -> Rigid3 {
        Rigid3::new(
            self.transform_point(rhs.translation),
            (self.rotation * rhs.rotation).normalized(),
        )
    }
}

/// 2D affine matrix in cairo's convention.
///
/// ```text
/// x' = xx * x + xy * y + x0
/// y' = yx * x + yy * y + y0
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine2 {
    pub xx: f64,
    pub yx: f64,
    pub xy: f64,
    pub yy: f64,
    pub x0: f64,
    pub y0: f64,
}

impl Affine2 {
    /// Same argument order as `cairo_matrix_init`.
    #[inline]
    pub fn new(xx: f64, yx: f64, xy: f64, yy: f64, x0: f64, y0: f64) -> Self {
        Self {
            xx,
            yx,
            xy,
            yy,
            x0,
            y0,
        }
    }

    #[inline]
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    #[inline]
    pub fn scaling(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    #[inline]
    pub fn translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// `self` with `inner` applied first: `(self.then_inner(inner))(p) == self(inner(p))`.
    pub fn then_inner(&self, inner: &Affine2) -> Affine2 {
        Affine2::new(
            self.xx * inner.xx + self.xy * inner.yx,
            self.yx * inner.xx + self.yy * inner.yx,
            self.xx * inner.xy + self.xy * inner.yy,
            self.yx * inner.xy + self.yy * inner.yy,
            self.xx * inner.x0 + self.xy * inner.y0 + self.x0,
            self.yx * inner.x0 + self.yy * inner.y0 + self.y0,
        )
    }

    /// Scale user space, like `cairo_scale`.
    #[inline]
    pub fn scale(&self, sx: f64, sy: f64) -> Affine2 {
        self.then_inner(&Affine2::scaling(sx, sy))
    }

    /// Translate user space, like `cairo_translate`.
    #[inline]
    pub fn translate(&self, tx: f64, ty: f64) -> Affine2 {
        self.then_inner(&Affine2::translation(tx, ty))
    }

    #[inline]
    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.xx * x + self.xy * y + self.x0,
            self.yx * x + self.yy * y + self.y0,
        )
    }

    #[inline]
    pub fn determinant(&self) -> f64 {
        self.xx * self.yy - self.xy * self.yx
    }

    /// Inverse matrix, or `None` when the matrix is singular or not finite.
    pub fn invert(&self) -> Option<Affine2> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv_det = 1.0 / det;
        let xx = self.yy * inv_det;
        let yx = -self.yx * inv_det;
        let xy = -self.xy * inv_det;
        let yy = self.xx * inv_det;
        Some(Affine2::new(
            xx,
            yx,
            xy,
            yy,
            -(xx * self.x0 + xy * self.y0),
            -(yx * self.x0 + yy * self.y0),
        ))
    }
}

impl Default for Affine2 {
    fn default() -> Self {
        Self::identity()
    }
}

/// Affine mapping a submap's raster pixels into world meters on the drawing plane.
///
/// The composed pose is projected by picking `(m10, m00, -m11, -m01, m03, -m13)`
/// out of its homogeneous matrix; the sign flips account for the canvas y axis
/// pointing down. The result is then scaled by the submap resolution so callers
/// draw in raster pixels.
pub fn submap_affine(pose: &Rigid3, slice_pose: &Rigid3, resolution: f64) -> Affine2 {
    let m = (*pose * *slice_pose).to_matrix();
    Affine2::new(
        m[1][0],
        m[0][0],
        -m[1][1],
        -m[0][1],
        m[0][3],
        -m[1][3],
    )
    .scale(resolution, resolution)
}
