//! Visual identity of confetti pieces: shapes and color palettes.
//!
//! Both are picked once at spawn and never change. The renderer is the only
//! other consumer: [`ShapeKind::index`] selects the coverage test in the
//! fragment shader.

use glam::Vec3;

/// Shape of a confetti piece.
///
/// Each shape fills the particle's bounding box in its own way: the circle is
/// inscribed in the shorter side, the ellipse stretches to the full box, the
/// triangle points up before rotation kicks in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapeKind {
    /// Round disc inscribed in the bounding box.
    #[default]
    Circle,

    /// Ellipse filling the full bounding box.
    Ellipse,

    /// The whole bounding box.
    Rectangle,

    /// Apex-up isosceles triangle spanning the bounding box.
    Triangle,
}

impl ShapeKind {
    /// All shapes, for uniform random selection at spawn.
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Circle,
        ShapeKind::Ellipse,
        ShapeKind::Rectangle,
        ShapeKind::Triangle,
    ];

    /// Stable index used as the per-instance shape id in the render shader.
    #[inline]
    pub fn index(&self) -> u32 {
        match self {
            ShapeKind::Circle => 0,
            ShapeKind::Ellipse => 1,
            ShapeKind::Rectangle => 2,
            ShapeKind::Triangle => 3,
        }
    }
}

/// Pre-defined 8-color confetti palettes.
///
/// A spawning particle draws one entry uniformly at random.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Palette {
    /// The classic party mix: yellow, green, blue, mint, teal, cyan, pink, red.
    #[default]
    Classic,

    /// Washed-out versions of the classic mix.
    Pastel,

    /// Vibrant high-saturation colors for dark backgrounds.
    Neon,
}

impl Palette {
    /// Get the colors for this palette (8 entries, RGB 0.0-1.0).
    pub fn colors(&self) -> [Vec3; 8] {
        match self {
            Palette::Classic => [
                Vec3::new(1.0, 0.8, 0.0),    // Yellow
                Vec3::new(0.2, 0.78, 0.35),  // Green
                Vec3::new(0.0, 0.48, 1.0),   // Blue
                Vec3::new(0.0, 0.78, 0.75),  // Mint
                Vec3::new(0.19, 0.69, 0.78), // Teal
                Vec3::new(0.2, 0.68, 0.9),   // Cyan
                Vec3::new(1.0, 0.18, 0.33),  // Pink
                Vec3::new(1.0, 0.23, 0.19),  // Red
            ],
            Palette::Pastel => [
                Vec3::new(1.0, 0.92, 0.6),  // Pale yellow
                Vec3::new(0.68, 0.9, 0.72), // Pale green
                Vec3::new(0.62, 0.77, 1.0), // Pale blue
                Vec3::new(0.67, 0.93, 0.9), // Pale mint
                Vec3::new(0.7, 0.88, 0.92), // Pale teal
                Vec3::new(0.72, 0.87, 1.0), // Pale cyan
                Vec3::new(1.0, 0.72, 0.78), // Pale pink
                Vec3::new(1.0, 0.7, 0.66),  // Pale red
            ],
            Palette::Neon => [
                Vec3::new(1.0, 1.0, 0.0), // Electric yellow
                Vec3::new(0.2, 1.0, 0.2), // Electric green
                Vec3::new(0.1, 0.4, 1.0), // Electric blue
                Vec3::new(0.0, 1.0, 0.7), // Spring green
                Vec3::new(0.0, 1.0, 1.0), // Cyan
                Vec3::new(0.6, 0.2, 1.0), // Purple
                Vec3::new(1.0, 0.0, 0.5), // Hot pink
                Vec3::new(1.0, 0.2, 0.0), // Orange-red
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_indices_are_distinct() {
        let mut seen = [false; 4];
        for shape in ShapeKind::ALL {
            let idx = shape.index() as usize;
            assert!(idx < 4);
            assert!(!seen[idx]);
            seen[idx] = true;
        }
    }

    #[test]
    fn test_palettes_hold_eight_colors_in_range() {
        for palette in [Palette::Classic, Palette::Pastel, Palette::Neon] {
            let colors = palette.colors();
            assert_eq!(colors.len(), 8);
            for color in colors {
                assert!(color.min_element() >= 0.0);
                assert!(color.max_element() <= 1.0);
            }
        }
    }
}
