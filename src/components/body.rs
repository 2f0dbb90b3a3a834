use bevy_ecs::component::Component;
use cgmath::{Matrix4, Rad, Vector3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Earth,
    Clouds,
    Moon,
}

impl BodyKind {
    pub fn name(&self) -> &'static str {
        match self {
            BodyKind::Earth => "earth",
            BodyKind::Clouds => "clouds",
            BodyKind::Moon => "moon",
        }
    }
}

/// A textured sphere in the scene.
#[derive(Component, Debug, Clone, Copy)]
pub struct CelestialBody {
    pub kind: BodyKind,
    pub radius: f64,
    pub segments: u32,
    pub opacity: f32,
}

impl CelestialBody {
    pub fn is_translucent(&self) -> bool {
        self.opacity < 1.0
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct BodyTransform {
    pub translation: Vector3<f32>,
    pub rotation_y: f32,
}

impl BodyTransform {
    pub fn at(translation: Vector3<f32>) -> Self {
        Self {
            translation,
            rotation_y: 0.0,
        }
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.translation) * Matrix4::from_angle_y(Rad(self.rotation_y))
    }
}

/// Constant rotation about the body's own Y axis.
#[derive(Component, Debug, Clone, Copy)]
pub struct Spin {
    pub radians_per_second: f32,
}

/// Circular orbit about the world Y axis. At `angle == 0` the body sits on -x.
#[derive(Component, Debug, Clone, Copy)]
pub struct Orbit {
    pub radius: f32,
    pub angle: f32,
    pub radians_per_second: f32,
}

impl Orbit {
    pub fn translation(&self) -> Vector3<f32> {
        Vector3::new(
            -self.radius * self.angle.cos(),
            0.0,
            self.radius * self.angle.sin(),
        )
    }
}
