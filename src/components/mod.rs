pub mod body;
pub mod camera;
pub mod location;
pub mod material;
pub mod mesh;
pub mod render_pipelines;
