use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Sub};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Linear RGB radiance. Components are nonnegative for physical quantities;
/// arithmetic is elementwise.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Zeroable, Pod)]
pub struct Color(pub [f32; 3]);

impl Color {
    pub const BLACK: Color = Color([0.0, 0.0, 0.0]);
    pub const WHITE: Color = Color([1.0, 1.0, 1.0]);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self([r, g, b])
    }

    pub const fn splat(v: f32) -> Self {
        Self([v, v, v])
    }

    pub fn r(self) -> f32 {
        self.0[0]
    }
    pub fn g(self) -> f32 {
        self.0[1]
    }
    pub fn b(self) -> f32 {
        self.0[2]
    }

    pub fn vec(self) -> Vec3 {
        Vec3::from_array(self.0)
    }

    pub fn from_vec(v: Vec3) -> Self {
        Self(v.to_array())
    }

    pub fn mean(self) -> f32 {
        (self.0[0] + self.0[1] + self.0[2]) / 3.0
    }

    /// Rec. 709 luma of linear RGB.
    pub fn luminance(self) -> f32 {
        0.2126 * self.0[0] + 0.7152 * self.0[1] + 0.0722 * self.0[2]
    }

    pub fn max_component(self) -> f32 {
        self.0[0].max(self.0[1]).max(self.0[2])
    }

    pub fn is_black(self) -> bool {
        self == Self::BLACK
    }

    pub fn is_finite(self) -> bool {
        self.vec().is_finite()
    }
}

impl Add for Color {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::from_vec(self.vec() + rhs.vec())
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Color {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::from_vec(self.vec() - rhs.vec())
    }
}

impl Mul for Color {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::from_vec(self.vec() * rhs.vec())
    }
}

impl MulAssign for Color {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Mul<f32> for Color {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::from_vec(self.vec() * rhs)
    }
}

impl Mul<Color> for f32 {
    type Output = Color;
    fn mul(self, rhs: Color) -> Color {
        rhs * self
    }
}

impl Div for Color {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        Self::from_vec(self.vec() / rhs.vec())
    }
}

impl Div<f32> for Color {
    type Output = Self;
    fn div(self, rhs: f32) -> Self {
        Self::from_vec(self.vec() / rhs)
    }
}
