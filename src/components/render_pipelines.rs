pub struct RenderPipelineComponent {
    pub render_pipeline: wgpu::RenderPipeline,
}
