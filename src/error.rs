use thiserror::Error;

/// Failures while loading a texture image at startup.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read asset {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch asset {path}: {reason}")]
    Fetch { path: String, reason: String },

    #[error("failed to decode asset {path}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// Failures while building the list of locations to mark on the globe.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("latitude {lat} of {name:?} is outside [-90, 90]")]
    Latitude { name: String, lat: f64 },

    #[error("longitude {lon} of {name:?} is outside [-180, 180]")]
    Longitude { name: String, lon: f64 },

    #[error("failed to read locations file {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse locations file {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("locations file {path} contains no locations")]
    Empty { path: String },
}

#[derive(Debug, Error)]
pub enum GraphicsError {
    #[error("failed to create drawing surface")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no graphics adapter is compatible with the drawing surface")]
    NoAdapter,

    #[error("failed to acquire graphics device")]
    Device(#[from] wgpu::RequestDeviceError),
}
