pub struct MaterialComponent {
    pub bind_group: wgpu::BindGroup,
    pub dimensions: (u32, u32),
}
