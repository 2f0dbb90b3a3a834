use std::time::Duration;

use bevy_ecs::system::{Res, ResMut, Resource};
use cgmath::{EuclideanSpace, Point3};

use crate::components::camera::Camera;

use super::frame::FrameTime;

/// Quadratic ease-out: maps progress in [0, 1] to eased progress in [0, 1],
/// fast at the start and settling at the end.
pub fn ease_out_quad(k: f32) -> f32 {
    let k = k.clamp(0.0, 1.0);
    k * (2.0 - k)
}

/// Moves a point from `from` to `to` over `duration` with quadratic ease-out.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    from: Point3<f32>,
    to: Point3<f32>,
    duration: Duration,
    elapsed: Duration,
}

impl Tween {
    pub fn new(from: Point3<f32>, to: Point3<f32>, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
        }
    }

    pub fn target(&self) -> Point3<f32> {
        self.to
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn value(&self) -> Point3<f32> {
        if self.duration.is_zero() {
            return self.to;
        }
        let k = self.elapsed.as_secs_f32() / self.duration.as_secs_f32();
        let t = ease_out_quad(k);
        self.from + (self.to - self.from) * t
    }

    /// Moves the tween forward by `delta` and returns the new value.
    pub fn advance(&mut self, delta: Duration) -> Point3<f32> {
        self.elapsed = (self.elapsed + delta).min(self.duration);
        self.value()
    }
}

/// What happens when a camera transition starts while another is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ZoomOverlap {
    /// The new transition cancels the running one.
    #[default]
    Replace,
    /// Every transition keeps running; the most recently started one is
    /// applied last and so wins each frame.
    Concurrent,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct CameraTransitions {
    pub overlap: ZoomOverlap,
    active: Vec<Tween>,
}

impl CameraTransitions {
    pub fn new(overlap: ZoomOverlap) -> Self {
        Self {
            overlap,
            active: Vec::new(),
        }
    }

    pub fn start(&mut self, tween: Tween) {
        if self.overlap == ZoomOverlap::Replace {
            self.active.clear();
        }
        self.active.push(tween);
    }

    pub fn active(&self) -> &[Tween] {
        &self.active
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    /// Advances every running transition and returns the eye position the
    /// camera should take this frame, if any transition is running.
    pub fn advance(&mut self, delta: Duration) -> Option<Point3<f32>> {
        let mut eye = None;
        for tween in self.active.iter_mut() {
            eye = Some(tween.advance(delta));
        }
        self.active.retain(|tween| !tween.is_finished());
        eye
    }
}

pub fn advance_camera_transitions(
    time: Res<FrameTime>,
    mut transitions: ResMut<CameraTransitions>,
    mut camera: ResMut<Camera>,
) {
    if transitions.is_idle() {
        return;
    }
    if let Some(eye) = transitions.advance(time.delta) {
        camera.eye = eye;
        if transitions.is_idle() {
            tracing::debug!(eye = ?eye.to_vec(), "camera transition finished");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::MetricSpace;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn quadratic_out_decelerates() {
        assert_eq!(ease_out_quad(0.0), 0.0);
        assert_eq!(ease_out_quad(0.5), 0.75);
        assert_eq!(ease_out_quad(1.0), 1.0);
        assert_eq!(ease_out_quad(2.0), 1.0);
        let early = ease_out_quad(0.25) - ease_out_quad(0.0);
        let late = ease_out_quad(1.0) - ease_out_quad(0.75);
        assert!(early > late);
    }

    #[test]
    fn tween_reaches_target_exactly_at_duration() {
        let mut tween = Tween::new(
            Point3::new(0.0, 0.0, 5.0),
            Point3::new(1.0, 1.0, 3.0),
            ms(1000),
        );
        let halfway = tween.advance(ms(500));
        assert!(halfway.distance(Point3::new(0.75, 0.75, 3.5)) < 1e-6);
        assert!(!tween.is_finished());

        let end = tween.advance(ms(700));
        assert_eq!(end, Point3::new(1.0, 1.0, 3.0));
        assert!(tween.is_finished());
    }

    #[test]
    fn replace_keeps_only_the_latest_transition() {
        let mut transitions = CameraTransitions::new(ZoomOverlap::Replace);
        let origin = Point3::new(0.0, 0.0, 5.0);
        transitions.start(Tween::new(origin, Point3::new(1.0, 0.0, 2.0), ms(1000)));
        transitions.start(Tween::new(origin, Point3::new(-1.0, 0.0, 2.0), ms(1000)));
        assert_eq!(transitions.active().len(), 1);
        assert_eq!(transitions.active()[0].target(), Point3::new(-1.0, 0.0, 2.0));
    }

    #[test]
    fn concurrent_transitions_race_and_the_latest_wins() {
        let mut transitions = CameraTransitions::new(ZoomOverlap::Concurrent);
        let origin = Point3::new(0.0, 0.0, 5.0);
        transitions.start(Tween::new(origin, Point3::new(1.0, 0.0, 2.0), ms(1000)));
        transitions.start(Tween::new(origin, Point3::new(-1.0, 0.0, 2.0), ms(500)));
        assert_eq!(transitions.active().len(), 2);

        let eye = transitions.advance(ms(500)).unwrap();
        assert_eq!(eye, Point3::new(-1.0, 0.0, 2.0));
        // the shorter one is done, the first keeps driving the camera
        assert_eq!(transitions.active().len(), 1);
        let eye = transitions.advance(ms(500)).unwrap();
        assert_eq!(eye, Point3::new(1.0, 0.0, 2.0));
        assert!(transitions.is_idle());
        assert_eq!(transitions.advance(ms(16)), None);
    }
}
