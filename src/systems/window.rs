use bevy_ecs::system::Resource;
use cgmath::Vector2;

/// Size of the drawing surface in physical pixels.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
        }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Pixel position (origin top left, y down) to normalized device
    /// coordinates (origin centre, y up, both axes in [-1, 1]).
    pub fn normalize(&self, position_x: f32, position_y: f32) -> Vector2<f32> {
        Vector2::new(
            (position_x / self.width) * 2.0 - 1.0,
            -(position_y / self.height) * 2.0 + 1.0,
        )
    }
}

/// Last known cursor position over the window.
#[derive(Debug, Default, Clone, Copy)]
pub struct PointerState {
    position: Option<(f32, f32)>,
}

impl PointerState {
    pub fn moved(&mut self, x: f32, y: f32) {
        self.position = Some((x, y));
    }

    pub fn left(&mut self) {
        self.position = None;
    }

    pub fn position(&self) -> Option<(f32, f32)> {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_and_centre_normalize() {
        let viewport = Viewport::new(800, 600);
        assert_eq!(viewport.normalize(0.0, 0.0), Vector2::new(-1.0, 1.0));
        assert_eq!(viewport.normalize(800.0, 600.0), Vector2::new(1.0, -1.0));
        assert_eq!(viewport.normalize(400.0, 300.0), Vector2::new(0.0, 0.0));
    }

    #[test]
    fn aspect_survives_a_minimized_window() {
        assert_eq!(Viewport::new(800, 400).aspect(), 2.0);
        assert_eq!(Viewport::new(800, 0).aspect(), 1.0);
    }
}
