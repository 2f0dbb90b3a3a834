use std::time::Duration;

use bevy_ecs::{
    component::Component,
    entity::Entity,
    query::With,
    system::Resource,
    world::World,
};
use cgmath::{InnerSpace, Point3, SquareMatrix, Transform, Vector2, Vector3};

use crate::components::{
    camera::Camera,
    location::{Label, Location, Marker, Sprite},
};

use super::{
    tween::{CameraTransitions, Tween},
    window::Viewport,
};

pub const ZOOM_DURATION: Duration = Duration::from_millis(1000);
/// The camera stops this far in front (+z) of the picked point.
pub const ZOOM_STANDOFF: f32 = 2.0;

/// How a click that hits both a marker and a label is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PickPolicy {
    /// Zoom to the nearest marker; fall back to the nearest label.
    #[default]
    MarkerPriority,
    /// Zoom to the nearest marker and then to the nearest label.
    Independent,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct PickController {
    pub policy: PickPolicy,
    selected: Option<Entity>,
}

impl PickController {
    pub fn new(policy: PickPolicy) -> Self {
        Self {
            policy,
            selected: None,
        }
    }

    /// The sprite picked by the most recent click that hit something.
    pub fn selected(&self) -> Option<Entity> {
        self.selected
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Ray from the camera eye through a point in normalized device
    /// coordinates. `None` if the camera matrices are degenerate.
    pub fn from_camera(camera: &Camera, ndc: Vector2<f32>) -> Option<Self> {
        let (view_proj, _, _) = camera.build_view_projection_matrix();
        let inverse = view_proj.invert()?;
        let through = inverse.transform_point(Point3::new(ndc.x, ndc.y, 0.5));
        let direction = through - camera.eye;
        if direction.magnitude2() == 0.0 {
            return None;
        }
        Some(Self {
            origin: camera.eye,
            direction: direction.normalize(),
        })
    }

    /// Distance along the ray to a billboard lying in the plane spanned by
    /// `right` and `up`.
    pub fn intersect_sprite(
        &self,
        sprite: &Sprite,
        right: Vector3<f32>,
        up: Vector3<f32>,
    ) -> Option<f32> {
        let normal = right.cross(up);
        let denominator = self.direction.dot(normal);
        if denominator.abs() < f32::EPSILON {
            return None;
        }
        let distance = (sprite.position - self.origin).dot(normal) / denominator;
        if distance < 0.0 {
            return None;
        }
        let local = self.origin + self.direction * distance - sprite.position;
        let inside = local.dot(right).abs() <= sprite.scale.x * 0.5
            && local.dot(up).abs() <= sprite.scale.y * 0.5;
        inside.then_some(distance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub entity: Entity,
    pub distance: f32,
}

/// Every sprite tagged `T` the ray passes through, nearest first.
pub fn intersect_sprites<T: Component>(
    world: &mut World,
    ray: &Ray,
    camera: &Camera,
) -> Vec<Intersection> {
    let (right, up) = camera.billboard_axes();
    let mut query = world.query_filtered::<(Entity, &Sprite), With<T>>();
    let mut hits: Vec<Intersection> = query
        .iter(world)
        .filter_map(|(entity, sprite)| {
            ray.intersect_sprite(sprite, right, up)
                .map(|distance| Intersection { entity, distance })
        })
        .collect();
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

/// Resolves a click at a pixel position into zero or more zooms. Returns
/// the sprites that were zoomed to, in the order the zooms were started.
pub fn handle_click(world: &mut World, position_x: f32, position_y: f32) -> Vec<Entity> {
    let viewport = *world.resource::<Viewport>();
    let camera = *world.resource::<Camera>();
    let ndc = viewport.normalize(position_x, position_y);
    let Some(ray) = Ray::from_camera(&camera, ndc) else {
        tracing::warn!(?camera, "cannot cast a pick ray from a degenerate camera");
        return Vec::new();
    };

    let markers = intersect_sprites::<Marker>(world, &ray, &camera);
    let labels = intersect_sprites::<Label>(world, &ray, &camera);

    let policy = world.resource::<PickController>().policy;
    let picked: Vec<Entity> = match policy {
        PickPolicy::MarkerPriority => markers
            .first()
            .or(labels.first())
            .map(|hit| hit.entity)
            .into_iter()
            .collect(),
        PickPolicy::Independent => markers
            .first()
            .into_iter()
            .chain(labels.first())
            .map(|hit| hit.entity)
            .collect(),
    };

    for &entity in &picked {
        select(world, entity);
    }
    picked
}

fn select(world: &mut World, entity: Entity) {
    let Some(position) = world.get::<Sprite>(entity).map(|sprite| sprite.position) else {
        return;
    };
    let policy = {
        let mut controller = world.resource_mut::<PickController>();
        controller.selected = Some(entity);
        controller.policy
    };
    if let Some(location) = world.get::<Location>(entity) {
        tracing::info!(location = %location.name, ?policy, "selected location");
    }
    zoom_to(world, position);
}

/// Starts moving the camera eye towards `target`, offset by the standoff
/// along +z.
pub fn zoom_to(world: &mut World, target: Point3<f32>) {
    let eye = world.resource::<Camera>().eye;
    let end = target + Vector3::new(0.0, 0.0, ZOOM_STANDOFF);
    world
        .resource_mut::<CameraTransitions>()
        .start(Tween::new(eye, end, ZOOM_DURATION));
}
