//! Face colors and the deterministic tint applied to faces created by edits.

use nalgebra::{Vector2, Vector3};

use super::index::FaceId;

/// RGB face color, components nominally in `[0, 1]`.
pub type Color = Vector3<f64>;

/// Color given to faces built by [`build_from_polygons`](super::build_from_polygons).
pub const DEFAULT_FACE_COLOR: Color = Vector3::new(0.7, 0.7, 0.7);

/// Hash-like scalar noise in `[0, 1)`.
fn noise(p: Vector2<f64>) -> f64 {
    let x = p.dot(&Vector2::new(127.1, 311.7)).sin() * 43758.5453;
    x - x.floor()
}

/// Derives a child face color from its parent's.
///
/// The result depends only on the parent color, the child's handle and the
/// element counts passed in, so replaying the same edit sequence on the same
/// input reproduces the same colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorJitter {
    /// Noise above this value darkens the parent color, below it brightens.
    pub threshold: f64,
}

impl ColorJitter {
    /// Tint used for faces cut off by fan triangulation.
    pub const TRIANGULATE: Self = Self { threshold: 0.25 };

    /// Tint used for quads produced by subdivision.
    pub const QUADRANGULATE: Self = Self { threshold: 0.4 };

    /// Compute the color of `face`, derived from `parent`.
    pub fn derive(
        &self,
        parent: Color,
        face: FaceId,
        num_vertices: usize,
        num_halfedges: usize,
    ) -> Color {
        let id = face.index() as f64;
        let selector = noise(Vector2::new(id, (num_vertices as f64 * 7.64).sin()));
        let scale = noise(Vector2::new(id, num_halfedges as f64));

        let tinted = if selector > self.threshold || scale < 1e-6 {
            parent * scale
        } else {
            parent / scale
        };
        tinted.map(|c| c.clamp(0.0, 1.0))
    }
}

impl Default for ColorJitter {
    fn default() -> Self {
        Self::TRIANGULATE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_range() {
        for i in 0..200 {
            let n = noise(Vector2::new(i as f64, (i * 3) as f64));
            assert!((0.0..1.0).contains(&n));
        }
    }

    #[test]
    fn test_derive_is_pure() {
        let parent = Color::new(0.2, 0.5, 0.9);
        let jitter = ColorJitter::TRIANGULATE;
        let a = jitter.derive(parent, FaceId::new(3), 8, 24);
        let b = jitter.derive(parent, FaceId::new(3), 8, 24);
        assert_eq!(a, b);
    }

    #[test]
    fn test_derive_stays_in_unit_range() {
        let parent = Color::new(1.0, 0.9, 0.8);
        for id in 0..50 {
            let c = ColorJitter::QUADRANGULATE.derive(parent, FaceId::new(id), id * 2, id * 5);
            for i in 0..3 {
                assert!((0.0..=1.0).contains(&c[i]));
            }
        }
    }

    #[test]
    fn test_derive_depends_on_face() {
        let parent = Color::new(0.5, 0.5, 0.5);
        let colors: Vec<Color> = (0..10)
            .map(|id| ColorJitter::TRIANGULATE.derive(parent, FaceId::new(id), 10, 40))
            .collect();
        assert!(colors.windows(2).any(|w| w[0] != w[1]));
    }
}
