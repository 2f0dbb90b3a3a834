use std::f32::consts::{PI, TAU};

use bevy_ecs::system::{Res, ResMut, Resource};
use cgmath::{InnerSpace, Vector3};

use crate::components::camera::Camera;

use super::frame::FrameTime;

const EPS: f32 = 1e-6;

/// Damped orbit of the camera around its target, driven by pointer drag,
/// the wheel and an optional constant auto-rotation.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct OrbitController {
    pub damping_factor: f32,
    pub auto_rotate: bool,
    /// 2.0 is one revolution every 30 seconds
    pub auto_rotate_speed: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,

    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
    drag_from: Option<(f32, f32)>,
}

impl Default for OrbitController {
    fn default() -> Self {
        Self {
            damping_factor: 0.25,
            auto_rotate: true,
            auto_rotate_speed: 2.0,
            rotate_speed: 1.0,
            zoom_speed: 0.5,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            drag_from: None,
        }
    }
}

impl OrbitController {
    pub fn new(auto_rotate: bool, auto_rotate_speed: f32) -> Self {
        Self {
            auto_rotate,
            auto_rotate_speed,
            ..Default::default()
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_from.is_some()
    }

    pub fn begin_drag(&mut self, x: f32, y: f32) {
        self.drag_from = Some((x, y));
    }

    pub fn end_drag(&mut self) {
        self.drag_from = None;
    }

    /// Feeds a pointer move. Only rotates while a drag is in progress.
    pub fn drag_to(&mut self, x: f32, y: f32, viewport_height: f32) {
        let Some((from_x, from_y)) = self.drag_from else {
            return;
        };
        if viewport_height > 0.0 {
            let dx = x - from_x;
            let dy = y - from_y;
            self.rotate_left(TAU * dx / viewport_height * self.rotate_speed);
            self.rotate_up(TAU * dy / viewport_height * self.rotate_speed);
        }
        self.drag_from = Some((x, y));
    }

    /// Positive `lines` scrolls away from the user and moves the camera in.
    pub fn scroll(&mut self, lines: f32) {
        let zoom_scale = 0.95_f32.powf(self.zoom_speed);
        if lines > 0.0 {
            self.scale *= zoom_scale;
        } else if lines < 0.0 {
            self.scale /= zoom_scale;
        }
    }

    fn rotate_left(&mut self, angle: f32) {
        self.theta_delta -= angle;
    }

    fn rotate_up(&mut self, angle: f32) {
        self.phi_delta -= angle;
    }

    fn auto_rotation_angle(&self, delta_seconds: f32) -> f32 {
        TAU / 60.0 * self.auto_rotate_speed * delta_seconds
    }

    pub fn update_camera(&mut self, camera: &mut Camera, delta_seconds: f32) {
        let offset = camera.eye - camera.target;
        let mut radius = offset.magnitude();
        if radius < EPS {
            return;
        }
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        if self.auto_rotate && !self.is_dragging() {
            self.rotate_left(self.auto_rotation_angle(delta_seconds));
        }

        theta += self.theta_delta * self.damping_factor;
        phi += self.phi_delta * self.damping_factor;
        phi = phi.clamp(EPS, PI - EPS);

        radius = (radius * self.scale).clamp(self.min_distance.max(EPS), self.max_distance);

        let offset = Vector3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        camera.eye = camera.target + offset;

        self.theta_delta *= 1.0 - self.damping_factor;
        self.phi_delta *= 1.0 - self.damping_factor;
        self.scale = 1.0;
    }
}

pub fn update_orbit_controls(
    time: Res<FrameTime>,
    mut controller: ResMut<OrbitController>,
    mut camera: ResMut<Camera>,
) {
    controller.update_camera(&mut camera, time.delta_seconds());
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{MetricSpace, Point3};

    const FRAME: f32 = 1.0 / 60.0;

    fn still_controller() -> OrbitController {
        OrbitController::new(false, 2.0)
    }

    #[test]
    fn auto_rotation_keeps_distance_to_target() {
        let mut camera = Camera::perspective(1.0);
        let mut controller = OrbitController::default();
        for _ in 0..120 {
            controller.update_camera(&mut camera, FRAME);
        }
        let distance = camera.eye.distance(camera.target);
        assert!((distance - 5.0).abs() < 1e-4, "distance drifted to {distance}");
        assert!(camera.eye.x.abs() > 0.1, "camera did not rotate: {:?}", camera.eye);
        assert!(camera.eye.y.abs() < 1e-4);
    }

    #[test]
    fn auto_rotation_pauses_while_dragging() {
        let mut camera = Camera::perspective(1.0);
        let mut controller = OrbitController::default();
        controller.begin_drag(100.0, 100.0);
        for _ in 0..10 {
            controller.update_camera(&mut camera, FRAME);
        }
        assert!(camera.eye.distance(Point3::new(0.0, 0.0, 5.0)) < 1e-4);
    }

    #[test]
    fn drag_rotates_and_damping_settles() {
        let mut camera = Camera::perspective(1.0);
        let mut controller = still_controller();
        controller.begin_drag(400.0, 300.0);
        controller.drag_to(460.0, 300.0, 600.0);
        controller.end_drag();

        controller.update_camera(&mut camera, FRAME);
        let after_one = camera.eye;
        assert!(after_one.x < 0.0, "dragging right swings the eye left: {after_one:?}");

        for _ in 0..200 {
            controller.update_camera(&mut camera, FRAME);
        }
        let settled = camera.eye;
        controller.update_camera(&mut camera, FRAME);
        assert!(camera.eye.distance(settled) < 1e-5);
        // total swing is the whole drag angle: 2*pi*60/600
        let theta = settled.x.atan2(settled.z);
        assert!((theta + TAU * 0.1).abs() < 1e-3, "theta = {theta}");
    }

    #[test]
    fn moves_without_drag_are_ignored() {
        let mut controller = still_controller();
        controller.drag_to(10.0, 10.0, 600.0);
        assert_eq!(controller, still_controller());
    }

    #[test]
    fn scrolling_dollies_in_and_out() {
        let mut camera = Camera::perspective(1.0);
        let mut controller = still_controller();
        controller.scroll(1.0);
        controller.update_camera(&mut camera, FRAME);
        let closer = camera.eye.distance(camera.target);
        assert!((closer - 5.0 * 0.95_f32.powf(0.5)).abs() < 1e-4);

        controller.scroll(-1.0);
        controller.update_camera(&mut camera, FRAME);
        assert!((camera.eye.distance(camera.target) - 5.0).abs() < 1e-4);
    }

    #[test]
    fn polar_angle_never_flips_over_the_pole() {
        let mut camera = Camera::perspective(1.0);
        let mut controller = still_controller();
        controller.begin_drag(0.0, 0.0);
        controller.drag_to(0.0, 5000.0, 600.0);
        for _ in 0..100 {
            controller.update_camera(&mut camera, FRAME);
        }
        assert!(camera.eye.y < 5.0 + 1e-4);
        assert!(camera.eye.y.is_finite());
    }
}
