use bevy_ecs::{
    entity::Entity,
    system::{Query, Res},
    world::World,
};
use cgmath::Vector3;

use crate::components::{
    body::{BodyKind, BodyTransform, CelestialBody, Orbit, Spin},
    material::MaterialComponent,
    mesh::{BodyDraw, MeshComponent, ModelUniform},
};

use super::{assets::SceneTextures, frame::FrameTime, material::MaterialSystem, mesh::MeshSystem};

pub const GLOBE_RADIUS: f64 = 1.0;
pub const CLOUD_RADIUS: f64 = 1.01;
pub const CLOUD_OPACITY: f32 = 0.3;
/// 0.001 radians per frame at 60 frames per second
pub const CLOUD_SPIN: f32 = 0.06;
pub const MOON_RADIUS: f64 = 0.2;
pub const MOON_DISTANCE: f32 = 2.0;

pub struct BodySystem {}

impl BodySystem {
    /// Adds the earth, its cloud layer and the moon to the world.
    pub fn spawn(world: &mut World, moon_orbit_speed: f32) {
        world.spawn((
            CelestialBody {
                kind: BodyKind::Earth,
                radius: GLOBE_RADIUS,
                segments: 32,
                opacity: 1.0,
            },
            BodyTransform::at(Vector3::new(0.0, 0.0, 0.0)),
        ));

        world.spawn((
            CelestialBody {
                kind: BodyKind::Clouds,
                radius: CLOUD_RADIUS,
                segments: 64,
                opacity: CLOUD_OPACITY,
            },
            BodyTransform::at(Vector3::new(0.0, 0.0, 0.0)),
            Spin {
                radians_per_second: CLOUD_SPIN,
            },
        ));

        let orbit = Orbit {
            radius: MOON_DISTANCE,
            angle: 0.0,
            radians_per_second: moon_orbit_speed,
        };
        world.spawn((
            CelestialBody {
                kind: BodyKind::Moon,
                radius: MOON_RADIUS,
                segments: 32,
                opacity: 1.0,
            },
            BodyTransform::at(orbit.translation()),
            orbit,
        ));
    }

    /// Uploads a mesh and texture per body. Opaque bodies come first so the
    /// translucent ones blend over them.
    pub fn create_draws(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        world: &mut World,
        textures: &SceneTextures,
        texture_layout: &wgpu::BindGroupLayout,
        model_layout: &wgpu::BindGroupLayout,
    ) -> (Vec<BodyDraw>, Vec<MaterialComponent>) {
        let mut query = world.query::<(Entity, &CelestialBody, &BodyTransform)>();
        let mut bodies: Vec<(Entity, CelestialBody, BodyTransform)> = query
            .iter(world)
            .map(|(entity, body, transform)| (entity, *body, *transform))
            .collect();
        bodies.sort_by_key(|(_, body, _)| body.is_translucent());

        let mut draws = Vec::with_capacity(bodies.len());
        let mut materials = Vec::with_capacity(bodies.len());
        for (entity, body, transform) in bodies {
            let material = MaterialSystem::create_2d_texture(
                device,
                queue,
                texture_layout,
                textures.body(body.kind),
                wgpu::AddressMode::Repeat,
            );
            tracing::debug!(
                body = body.kind.name(),
                width = material.dimensions.0,
                height = material.dimensions.1,
                "uploaded body texture"
            );
            materials.push(material);

            let mesh = BodySystem::generate_mesh(device, model_layout, &body, &transform);
            draws.push(BodyDraw {
                entity,
                translucent: body.is_translucent(),
                opacity: body.opacity,
                mesh,
                material_index: materials.len() - 1,
            });
        }
        (draws, materials)
    }

    fn generate_mesh(
        device: &wgpu::Device,
        model_layout: &wgpu::BindGroupLayout,
        body: &CelestialBody,
        transform: &BodyTransform,
    ) -> MeshComponent {
        let uniform = ModelUniform::new(transform.model_matrix(), body.opacity);
        let model_matrix_buffer = MeshSystem::create_model_matrix_buffer(device, &uniform);
        let model_matrix_bind_group =
            MeshSystem::create_model_matrix_bind_group(device, model_layout, &model_matrix_buffer);

        let (vertices, indices) = MeshSystem::generate_sphere_mesh(body.radius, body.segments);
        MeshComponent {
            vertex_buffer: MeshSystem::create_vertex_buffer(device, vertices.as_slice()),
            index_buffer: MeshSystem::create_index_buffer(device, indices.as_slice()),
            num_indices: indices.len() as u32,
            model_matrix_bind_group,
            model_matrix_buffer,
        }
    }

    /// Writes the body's current transform into its model matrix buffer.
    pub fn upload_transform(queue: &wgpu::Queue, world: &World, draw: &BodyDraw) {
        let Some(transform) = world.get::<BodyTransform>(draw.entity) else {
            return;
        };
        let uniform = ModelUniform::new(transform.model_matrix(), draw.opacity);
        queue.write_buffer(
            &draw.mesh.model_matrix_buffer,
            0,
            bytemuck::cast_slice(&[uniform]),
        );
    }
}

pub fn spin_bodies(time: Res<FrameTime>, mut bodies: Query<(&Spin, &mut BodyTransform)>) {
    let dt = time.delta_seconds();
    for (spin, mut transform) in bodies.iter_mut() {
        transform.rotation_y = (transform.rotation_y + spin.radians_per_second * dt)
            % std::f32::consts::TAU;
    }
}

// orbit moon around earth
pub fn orbit_bodies(time: Res<FrameTime>, mut bodies: Query<(&mut Orbit, &mut BodyTransform)>) {
    let dt = time.delta_seconds();
    for (mut orbit, mut transform) in bodies.iter_mut() {
        if orbit.radians_per_second == 0.0 {
            continue;
        }
        orbit.angle = (orbit.angle + orbit.radians_per_second * dt) % std::f32::consts::TAU;
        transform.translation = orbit.translation();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::frame::FrameLoop;
    use bevy_ecs::schedule::IntoSystemConfigs;
    use cgmath::InnerSpace;
    use std::time::Duration;

    fn body_transform(world: &mut World, kind: BodyKind) -> BodyTransform {
        let mut query = world.query::<(&CelestialBody, &BodyTransform)>();
        query
            .iter(world)
            .find(|(body, _)| body.kind == kind)
            .map(|(_, transform)| *transform)
            .unwrap()
    }

    #[test]
    fn scene_has_earth_clouds_and_moon() {
        let mut world = World::new();
        BodySystem::spawn(&mut world, 0.0);
        let mut query = world.query::<&CelestialBody>();
        let kinds: Vec<_> = query.iter(&world).map(|body| body.kind).collect();
        assert_eq!(kinds.len(), 3);
        for kind in [BodyKind::Earth, BodyKind::Clouds, BodyKind::Moon] {
            assert!(kinds.contains(&kind), "missing {}", kind.name());
        }

        let moon = body_transform(&mut world, BodyKind::Moon);
        assert_eq!(moon.translation, Vector3::new(-2.0, 0.0, 0.0));
    }

    #[test]
    fn clouds_spin_and_the_moon_stays_put_by_default() {
        let mut world = World::new();
        BodySystem::spawn(&mut world, 0.0);
        let mut frames = FrameLoop::new(world);
        frames.on_frame((spin_bodies, orbit_bodies).chain());
        for _ in 0..60 {
            frames.advance(Duration::from_secs_f32(1.0 / 60.0));
        }

        let clouds = body_transform(frames.world_mut(), BodyKind::Clouds);
        assert!((clouds.rotation_y - CLOUD_SPIN).abs() < 1e-4);
        let earth = body_transform(frames.world_mut(), BodyKind::Earth);
        assert_eq!(earth.rotation_y, 0.0);
        let moon = body_transform(frames.world_mut(), BodyKind::Moon);
        assert_eq!(moon.translation, Vector3::new(-2.0, 0.0, 0.0));
    }

    #[test]
    fn moon_orbit_keeps_its_distance() {
        let mut world = World::new();
        BodySystem::spawn(&mut world, 0.5);
        let mut frames = FrameLoop::new(world);
        frames.on_frame(orbit_bodies);
        frames.advance(Duration::from_secs(1));

        let moon = body_transform(frames.world_mut(), BodyKind::Moon);
        assert!((moon.translation.magnitude() - MOON_DISTANCE).abs() < 1e-5);
        assert!(moon.translation.z > 0.0);
    }
}
