use bevy_ecs::entity::Entity;

pub struct MeshComponent {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
    pub model_matrix_bind_group: wgpu::BindGroup,
    pub model_matrix_buffer: wgpu::Buffer,
}

/// Everything needed to draw one sphere of the scene, keyed by the world
/// entity whose transform drives it.
pub struct BodyDraw {
    pub entity: Entity,
    pub translucent: bool,
    pub opacity: f32,
    pub mesh: MeshComponent,
    pub material_index: usize,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex {
    pub const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;

        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Corner of the unit billboard quad; the vertex shader spreads it along the
/// camera's right/up axes.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BillboardVertex {
    pub corner: [f32; 2],
    pub tex_coords: [f32; 2],
}

impl BillboardVertex {
    pub const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;

        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

// only multiples of 16 bytes, to stay WebGL2 compliant
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniform {
    pub model_matrix: [[f32; 4]; 4],
    // x holds the opacity, the rest is padding
    pub opacity: [f32; 4],
}

impl ModelUniform {
    pub fn new(model_matrix: cgmath::Matrix4<f32>, opacity: f32) -> Self {
        Self {
            model_matrix: model_matrix.into(),
            opacity: [opacity, 0.0, 0.0, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteUniform {
    pub center: [f32; 4],
    pub scale: [f32; 4],
}
