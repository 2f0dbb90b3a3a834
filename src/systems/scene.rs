use bevy_ecs::{schedule::IntoSystemConfigs, world::World};
use cgmath::{Vector2, Vector3};

use crate::{
    components::{
        camera::Camera,
        location::{Label, Location, Marker, Sprite},
    },
    config::Config,
};

use super::{
    bodies::{orbit_bodies, spin_bodies, BodySystem},
    frame::FrameLoop,
    geospatial::coordinates::CoordinatesSystem,
    orbit_controls::{update_orbit_controls, OrbitController},
    picking::{PickController, PickPolicy},
    tween::{advance_camera_transitions, CameraTransitions, ZoomOverlap},
    window::Viewport,
};

/// Markers float just above the globe surface.
pub const MARKER_RADIUS: f64 = 1.05;
pub const MARKER_SCALE: f32 = 0.1;
pub const LABEL_LIFT: f32 = 0.1;
pub const LABEL_SCALE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneSettings {
    pub viewport: Viewport,
    pub pick_policy: PickPolicy,
    pub zoom_overlap: ZoomOverlap,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
    pub moon_orbit_speed: f32,
}

impl SceneSettings {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            pick_policy: PickPolicy::default(),
            zoom_overlap: ZoomOverlap::default(),
            auto_rotate: true,
            auto_rotate_speed: 2.0,
            moon_orbit_speed: 0.0,
        }
    }

    pub fn from_config(config: &Config, viewport: Viewport) -> Self {
        Self {
            viewport,
            pick_policy: config.pick_policy,
            zoom_overlap: config.zoom_overlap,
            auto_rotate: config.auto_rotate,
            auto_rotate_speed: config.auto_rotate_speed,
            moon_orbit_speed: config.moon_orbit_speed,
        }
    }
}

/// Builds the whole scene: camera, controllers, bodies and one marker plus
/// one label per location.
pub fn build_world(locations: &[Location], settings: &SceneSettings) -> World {
    let mut world = World::new();
    world.insert_resource(settings.viewport);
    world.insert_resource(Camera::perspective(settings.viewport.aspect()));
    world.insert_resource(OrbitController::new(
        settings.auto_rotate,
        settings.auto_rotate_speed,
    ));
    world.insert_resource(CameraTransitions::new(settings.zoom_overlap));
    world.insert_resource(PickController::new(settings.pick_policy));

    BodySystem::spawn(&mut world, settings.moon_orbit_speed);
    spawn_location_sprites(&mut world, locations);
    world
}

pub fn spawn_location_sprites(world: &mut World, locations: &[Location]) {
    for location in locations {
        let marker_position =
            CoordinatesSystem::lat_lon_to_cartesian_f32(location.lat, location.lon, MARKER_RADIUS);

        world.spawn((
            location.clone(),
            Marker,
            Sprite {
                position: marker_position,
                scale: Vector2::new(MARKER_SCALE, MARKER_SCALE),
            },
        ));
        world.spawn((
            location.clone(),
            Label,
            Sprite {
                position: marker_position + Vector3::new(0.0, LABEL_LIFT, 0.0),
                scale: Vector2::new(LABEL_SCALE, LABEL_SCALE),
            },
        ));
    }
}

/// Wraps the world in a frame loop. Per frame: bodies move, the orbit
/// controller damps, then camera transitions, which win over the orbit
/// controller for the camera position.
pub fn frame_loop(world: World) -> FrameLoop {
    let mut frames = FrameLoop::new(world);
    frames.on_frame(
        (
            spin_bodies,
            orbit_bodies,
            update_orbit_controls,
            advance_camera_transitions,
        )
            .chain(),
    );
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::location::default_locations;
    use bevy_ecs::query::With;
    use cgmath::{EuclideanSpace, InnerSpace};
    use std::collections::HashMap;

    fn sprites_by_name<T: bevy_ecs::component::Component>(
        world: &mut World,
    ) -> HashMap<String, Vec<Sprite>> {
        let mut by_name: HashMap<String, Vec<Sprite>> = HashMap::new();
        let mut query = world.query_filtered::<(&Location, &Sprite), With<T>>();
        for (location, sprite) in query.iter(world) {
            by_name.entry(location.name.clone()).or_default().push(*sprite);
        }
        by_name
    }

    #[test]
    fn every_location_gets_one_marker_and_one_label() {
        let locations = default_locations();
        let mut world = build_world(&locations, &SceneSettings::new(Viewport::new(800, 600)));
        let markers = sprites_by_name::<Marker>(&mut world);
        let labels = sprites_by_name::<Label>(&mut world);

        assert_eq!(markers.len(), locations.len());
        assert_eq!(labels.len(), locations.len());
        for location in &locations {
            assert_eq!(markers[&location.name].len(), 1);
            assert_eq!(labels[&location.name].len(), 1);
        }
    }

    #[test]
    fn labels_float_a_tenth_above_their_markers() {
        let locations = default_locations();
        let mut world = build_world(&locations, &SceneSettings::new(Viewport::new(800, 600)));
        let markers = sprites_by_name::<Marker>(&mut world);
        let labels = sprites_by_name::<Label>(&mut world);

        for location in &locations {
            let marker = markers[&location.name][0];
            let label = labels[&location.name][0];
            assert_eq!(label.position, marker.position + Vector3::new(0.0, 0.1, 0.0));

            let radius = marker.position.to_vec().magnitude();
            assert!((radius - 1.05).abs() < 1e-5);
            let expected = CoordinatesSystem::lat_lon_to_cartesian_f32(
                location.lat,
                location.lon,
                MARKER_RADIUS,
            );
            assert_eq!(marker.position, expected);
            assert_eq!(marker.scale, Vector2::new(0.1, 0.1));
            assert_eq!(label.scale, Vector2::new(0.5, 0.5));
        }
    }

    #[test]
    fn camera_starts_five_units_out_with_the_viewport_aspect() {
        let world = build_world(&[], &SceneSettings::new(Viewport::new(1200, 600)));
        let camera = world.resource::<Camera>();
        assert_eq!(camera.eye, cgmath::Point3::new(0.0, 0.0, 5.0));
        assert_eq!(camera.aspect, 2.0);
        assert_eq!(camera.fovy, 75.0);
    }

    #[test]
    fn orbit_settings_reach_the_controller() {
        let settings = SceneSettings {
            auto_rotate: false,
            auto_rotate_speed: 0.5,
            ..SceneSettings::new(Viewport::new(800, 600))
        };
        let world = build_world(&default_locations(), &settings);
        let controller = world.resource::<OrbitController>();
        assert!(!controller.auto_rotate);
        assert_eq!(controller.auto_rotate_speed, 0.5);
        assert_eq!(controller.damping_factor, 0.25);
        assert!(!controller.is_dragging());
    }

    #[test]
    fn idle_frames_only_auto_rotate() {
        let world = build_world(&default_locations(), &SceneSettings::new(Viewport::new(800, 600)));
        let mut frames = frame_loop(world);
        for _ in 0..60 {
            frames.advance(std::time::Duration::from_millis(16));
        }
        let world = frames.world();
        let camera = world.resource::<Camera>();
        assert!((camera.eye.to_vec().magnitude() - 5.0).abs() < 1e-3);
        assert!(camera.eye.x.abs() > 0.0);
        assert!(world.resource::<CameraTransitions>().is_idle());
    }
}
