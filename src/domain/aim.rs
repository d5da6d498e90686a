// Orientation-to-aim transform.
//
// Phones report absolute orientation as quaternions. Aim is the rotation relative to a
// reference reading, reduced to two planar angles (radians).

use std::ops::Mul;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Per-axis product.
    pub fn scale(self, factor: Vector2) -> Self {
        Self {
            x: self.x * factor.x,
            y: self.y * factor.y,
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

/// Why an orientation reading was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReading {
    WrongArity { len: usize },
    NonFinite,
    ZeroNorm,
}

impl Quaternion {
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Builds a unit quaternion from a raw `[x, y, z, w]` sensor reading.
    pub fn from_reading(values: &[f32]) -> Result<Self, MalformedReading> {
        let &[x, y, z, w] = values else {
            return Err(MalformedReading::WrongArity { len: values.len() });
        };
        if !values.iter().all(|v| v.is_finite()) {
            return Err(MalformedReading::NonFinite);
        }
        // Divide by the largest component first so the norm can neither overflow nor underflow.
        let largest = values.iter().fold(0.0f32, |max, v| max.max(v.abs()));
        if largest == 0.0 {
            return Err(MalformedReading::ZeroNorm);
        }
        let scaled = Self::new(x / largest, y / largest, z / largest, w / largest);
        let norm = scaled.norm_squared().sqrt();
        Ok(Self::new(
            scaled.x / norm,
            scaled.y / norm,
            scaled.z / norm,
            scaled.w / norm,
        ))
    }

    pub fn norm_squared(self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w
    }

    pub fn conjugate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Multiplicative inverse. `None` for the zero quaternion.
    pub fn inverse(self) -> Option<Self> {
        let n = self.norm_squared();
        if n == 0.0 || !n.is_finite() {
            return None;
        }
        let c = self.conjugate();
        Some(Self::new(c.x / n, c.y / n, c.z / n, c.w / n))
    }
}

/// Hamilton product.
impl Mul for Quaternion {
    type Output = Quaternion;

    fn mul(self, rhs: Quaternion) -> Quaternion {
        let (a, b) = (self, rhs);
        Quaternion {
            x: a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
            y: a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
            z: a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
            w: a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
        }
    }
}

/// Raw aim vector for `current` relative to `reference`.
///
/// The rotation `inverse(reference) * current` is reduced to a yaw-like angle (x) and a
/// pitch-like angle (y), both negated so that turning the phone right/up moves the aim
/// right/up on the host screen. An axis whose numerator or denominator is exactly zero
/// reports 0 instead of an `atan2` result.
pub fn aim_angle(reference: Quaternion, current: Quaternion) -> Vector2 {
    let Some(inverse) = reference.inverse() else {
        return Vector2::ZERO;
    };
    let d = inverse * current;

    let x0 = 2.0 * (d.x * d.y + d.w * d.z);
    let x1 = d.w * d.w + d.x * d.x - d.y * d.y - d.z * d.z;

    let y0 = 2.0 * (d.y * d.z + d.w * d.x);
    let y1 = d.w * d.w - d.x * d.x - d.y * d.y + d.z * d.z;

    Vector2::new(-guarded_atan2(x0, x1), -guarded_atan2(y0, y1))
}

fn guarded_atan2(num: f32, den: f32) -> f32 {
    if num != 0.0 && den != 0.0 {
        num.atan2(den)
    } else {
        0.0
    }
}

/// Per-connection aim state: the reference orientation and the last accepted reading.
#[derive(Debug, Clone, Default)]
pub struct AimTracker {
    reference: Option<Quaternion>,
    last: Option<Quaternion>,
}

impl AimTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts a reading; the first one after creation (or after a reset with no reading yet)
    /// becomes the reference.
    pub fn update(&mut self, current: Quaternion) -> Vector2 {
        let reference = *self.reference.get_or_insert(current);
        self.last = Some(current);
        aim_angle(reference, current)
    }

    /// Parses and accepts a raw reading. Malformed readings leave the tracker untouched.
    pub fn observe(&mut self, values: &[f32]) -> Result<Vector2, MalformedReading> {
        let current = Quaternion::from_reading(values)?;
        let angle = aim_angle(self.reference.unwrap_or(current), current);
        if !angle.is_finite() {
            return Err(MalformedReading::NonFinite);
        }
        self.reference.get_or_insert(current);
        self.last = Some(current);
        Ok(angle)
    }

    /// Re-centres on the latest reading so the aim is zero right after.
    pub fn reset(&mut self) -> Vector2 {
        self.reference = self.last;
        Vector2::ZERO
    }

    pub fn reference(&self) -> Option<Quaternion> {
        self.reference
    }
}
