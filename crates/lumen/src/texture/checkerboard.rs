use glam::Vec2;

use crate::color::Color;

use super::Texture;

/// Alternating squares of two colors over scaled uv coordinates.
pub struct Checkerboard {
    color0: Color,
    color1: Color,
    scale: Vec2,
}

impl Checkerboard {
    pub fn new(color0: Color, color1: Color, scale: Vec2) -> Self {
        Self {
            color0,
            color1,
            scale,
        }
    }
}

impl Texture for Checkerboard {
    fn evaluate(&self, uv: Vec2) -> Color {
        let grid_x = (uv.x * self.scale.x).floor() as i64;
        let grid_y = (uv.y * self.scale.y).floor() as i64;

        if (grid_x + grid_y).rem_euclid(2) == 0 {
            self.color0
        } else {
            self.color1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parity_of_cell_sum_picks_the_color() {
        let t = Checkerboard::new(Color::BLACK, Color::WHITE, Vec2::new(2.0, 2.0));
        assert_eq!(t.evaluate(Vec2::new(0.1, 0.1)), Color::BLACK);
        assert_eq!(t.evaluate(Vec2::new(0.6, 0.1)), Color::WHITE);
        assert_eq!(t.evaluate(Vec2::new(0.6, 0.6)), Color::BLACK);
        // negative coordinates keep alternating instead of mirroring
        assert_eq!(t.evaluate(Vec2::new(-0.1, 0.1)), Color::WHITE);
    }
}
