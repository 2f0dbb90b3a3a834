use std::f64::consts::{PI, TAU};

use wgpu::util::DeviceExt;

use crate::{
    components::mesh::{BillboardVertex, ModelUniform, Vertex},
    Uniform,
};

pub struct MeshSystem {}

impl MeshSystem {
    // keeping these decoupled and not iterative until
    // we have more geometry
    pub fn create_vertex_buffer<T: bytemuck::Pod>(device: &wgpu::Device, data: &[T]) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(data),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        })
    }

    pub fn create_index_buffer(device: &wgpu::Device, data: &[u32]) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(data),
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        })
    }

    pub fn create_model_matrix_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("Model Matrix Bind Group Layout"),
        })
    }

    pub fn create_model_matrix_buffer(device: &wgpu::Device, data: &ModelUniform) -> wgpu::Buffer {
        MeshSystem::create_uniform_buffer(device, data)
    }

    pub fn create_model_matrix_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        MeshSystem::create_uniform_bind_group(device, buffer, layout)
    }

    /// UV sphere laid out like an equirectangular image wrapped around the
    /// Y axis: `u` runs west to east around the equator and `v` from the
    /// north pole (top row of the image) to the south pole. Seen from +z the
    /// texture reads the right way round, with `u = 0.25` facing the viewer.
    /// Rows repeat their first column at `u = 1` to close the seam. Indexed
    /// as a triangle list.
    pub fn generate_sphere_mesh(radius: f64, segments: u32) -> (Vec<Vertex>, Vec<u32>) {
        let rows = segments;
        let columns = segments;
        let mut vertices = Vec::with_capacity(((rows + 1) * (columns + 1)) as usize);
        let mut indices = Vec::with_capacity((rows * columns * 6) as usize);

        for i in 0..=rows {
            let v = i as f64 / rows as f64;
            let polar = v * PI;
            for j in 0..=columns {
                let u = j as f64 / columns as f64;
                let azimuth = u * TAU;
                let position = [
                    -radius * azimuth.cos() * polar.sin(),
                    radius * polar.cos(),
                    radius * azimuth.sin() * polar.sin(),
                ];
                vertices.push(Vertex {
                    position: position.map(|c| c as f32),
                    tex_coords: [u as f32, v as f32],
                });
            }
        }

        for i in 0..rows {
            for j in 0..columns {
                let a = i * (columns + 1) + j; // current row
                let b = (i + 1) * (columns + 1) + j; // next row
                indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }

        (vertices, indices)
    }

    /// Unit quad centred on the origin, textured the right way up.
    pub fn generate_square_mesh() -> (Vec<BillboardVertex>, Vec<u32>) {
        let vertices = vec![
            BillboardVertex {
                corner: [-0.5, -0.5],
                tex_coords: [0.0, 1.0],
            },
            BillboardVertex {
                corner: [0.5, -0.5],
                tex_coords: [1.0, 1.0],
            },
            BillboardVertex {
                corner: [0.5, 0.5],
                tex_coords: [1.0, 0.0],
            },
            BillboardVertex {
                corner: [-0.5, 0.5],
                tex_coords: [0.0, 0.0],
            },
        ];
        let indices = vec![0, 1, 2, 0, 2, 3];
        (vertices, indices)
    }
}

impl Uniform for MeshSystem {
    fn create_uniform_buffer<T: bytemuck::Pod>(device: &wgpu::Device, data: &T) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Model Matrix Buffer"),
            contents: bytemuck::bytes_of(data),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        })
    }

    fn create_uniform_bind_group(
        device: &wgpu::Device,
        buffer: &wgpu::Buffer,
        layout: &wgpu::BindGroupLayout,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("Model Matrix Bind Group"),
        })
    }
}
