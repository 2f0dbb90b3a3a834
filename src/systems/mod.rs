pub mod assets;
pub mod billboard;
pub mod bodies;
pub mod camera;
pub mod frame;
pub mod geospatial;
pub mod material;
pub mod mesh;
pub mod orbit_controls;
pub mod picking;
pub mod pipelines;
pub mod scene;
pub mod tween;
pub mod window;
