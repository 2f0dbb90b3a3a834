use bevy_ecs::system::Resource;
use cgmath::{InnerSpace, Matrix4, Point3, Vector3};

// cgmath builds OpenGL style clip space (z in [-1, 1]);
// wgpu wants z in [0, 1].
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);
pub const IDENTITY_MATRIX_4: [[f32; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// GPU side of the camera. The camera itself lives in the scene world.
pub struct CameraComponent {
    pub camera_uniform: CameraUniform,
    pub camera_buffer: wgpu::Buffer,
    pub camera_bind_group: wgpu::BindGroup,
    pub camera_bind_group_layout: wgpu::BindGroupLayout,
}

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub aspect: f32,
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn perspective(aspect: f32) -> Self {
        Self {
            // five units back, +z is out of the screen
            eye: (0.0, 0.0, 5.0).into(),
            target: (0.0, 0.0, 0.0).into(),
            up: Vector3::unit_y(),
            aspect,
            fovy: 75.0,
            znear: 0.1,
            zfar: 1000.0,
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        cgmath::perspective(cgmath::Deg(self.fovy), self.aspect, self.znear, self.zfar)
    }

    /// (view_proj, view, proj) in OpenGL clip conventions.
    pub fn build_view_projection_matrix(
        &self,
    ) -> (
        cgmath::Matrix4<f32>,
        cgmath::Matrix4<f32>,
        cgmath::Matrix4<f32>,
    ) {
        let view = self.view_matrix();
        let proj = self.projection_matrix();
        (proj * view, view, proj)
    }

    /// World space right and up vectors of the view plane, which is what
    /// billboards are laid out on.
    pub fn billboard_axes(&self) -> (Vector3<f32>, Vector3<f32>) {
        let view = self.view_matrix();
        // rows of the view rotation
        let right = Vector3::new(view.x.x, view.y.x, view.z.x);
        let up = Vector3::new(view.x.y, view.y.y, view.z.y);
        (right.normalize(), up.normalize())
    }
}

// We need this for Rust to store our data correctly for the shaders
#[repr(C)]
// This is so we can store this in a buffer
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    // We can't use cgmath with bytemuck directly so we'll have
    // to convert the Matrix4 into a 4x4 f32 array
    pub view_proj_matrix: [[f32; 4]; 4],
    pub view_matrix: [[f32; 4]; 4],
    pub proj_matrix: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_proj_matrix: IDENTITY_MATRIX_4,
            view_matrix: IDENTITY_MATRIX_4,
            proj_matrix: IDENTITY_MATRIX_4,
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera) {
        let (view_proj_matrix, view_matrix, proj_matrix) = camera.build_view_projection_matrix();
        self.view_proj_matrix = (OPENGL_TO_WGPU_MATRIX * view_proj_matrix).into();
        self.view_matrix = view_matrix.into();
        self.proj_matrix = (OPENGL_TO_WGPU_MATRIX * proj_matrix).into();
    }
}
