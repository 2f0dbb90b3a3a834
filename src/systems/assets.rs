use image::{Rgba, RgbaImage};

use crate::{components::body::BodyKind, error::AssetError};

pub const EARTH_TEXTURE: &str = "earth.png";
pub const MOON_TEXTURE: &str = "moon1.png";
pub const CLOUD_TEXTURE: &str = "clouds4.jpg";
pub const MARKER_ICON: &str = "marker-icon.png";

/// Every image the scene needs, decoded to RGBA.
pub struct SceneTextures {
    pub earth: RgbaImage,
    pub clouds: RgbaImage,
    pub moon: RgbaImage,
    pub marker: RgbaImage,
}

impl SceneTextures {
    /// Loads the scene images from `asset_dir`. A missing or broken image is
    /// reported and replaced by a single pixel of a stand-in colour, so the
    /// scene still comes up.
    pub async fn load(asset_dir: &str) -> Self {
        Self {
            earth: load_or_fallback(asset_dir, EARTH_TEXTURE, [40, 90, 170, 255]).await,
            clouds: load_or_fallback(asset_dir, CLOUD_TEXTURE, [255, 255, 255, 0]).await,
            moon: load_or_fallback(asset_dir, MOON_TEXTURE, [150, 150, 150, 255]).await,
            marker: load_or_fallback(asset_dir, MARKER_ICON, [230, 50, 50, 255]).await,
        }
    }

    pub fn body(&self, kind: BodyKind) -> &RgbaImage {
        match kind {
            BodyKind::Earth => &self.earth,
            BodyKind::Clouds => &self.clouds,
            BodyKind::Moon => &self.moon,
        }
    }
}

pub fn asset_path(asset_dir: &str, name: &str) -> String {
    let dir = asset_dir.trim_end_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

pub async fn load_or_fallback(asset_dir: &str, name: &str, fallback: [u8; 4]) -> RgbaImage {
    match load_image(asset_dir, name).await {
        Ok(image) => {
            tracing::info!(
                asset = name,
                width = image.width(),
                height = image.height(),
                "loaded texture"
            );
            image
        }
        Err(err) => {
            tracing::warn!(
                asset = name,
                error = %err,
                cause = ?std::error::Error::source(&err).map(ToString::to_string),
                "texture unavailable, drawing a flat colour instead"
            );
            RgbaImage::from_pixel(1, 1, Rgba(fallback))
        }
    }
}

pub async fn load_image(asset_dir: &str, name: &str) -> Result<RgbaImage, AssetError> {
    let path = asset_path(asset_dir, name);
    let bytes = read_bytes(&path).await?;
    decode_image(&path, &bytes)
}

pub fn decode_image(path: &str, bytes: &[u8]) -> Result<RgbaImage, AssetError> {
    image::load_from_memory(bytes)
        .map(|image| image.to_rgba8())
        .map_err(|source| AssetError::Decode {
            path: path.to_string(),
            source,
        })
}

#[cfg(not(target_arch = "wasm32"))]
async fn read_bytes(path: &str) -> Result<Vec<u8>, AssetError> {
    std::fs::read(path).map_err(|source| AssetError::Read {
        path: path.to_string(),
        source,
    })
}

#[cfg(target_arch = "wasm32")]
async fn read_bytes(path: &str) -> Result<Vec<u8>, AssetError> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let fetch_error = |reason: String| AssetError::Fetch {
        path: path.to_string(),
        reason,
    };

    let mut opts = web_sys::RequestInit::new();
    opts.method("GET");
    opts.mode(web_sys::RequestMode::SameOrigin);
    let request = web_sys::Request::new_with_str_and_init(path, &opts)
        .map_err(|err| fetch_error(format!("{err:?}")))?;

    let window = web_sys::window().ok_or_else(|| fetch_error("no window".to_string()))?;
    let response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|err| fetch_error(format!("{err:?}")))?;
    let response: web_sys::Response = response
        .dyn_into()
        .map_err(|err| fetch_error(format!("{err:?}")))?;
    if !response.ok() {
        return Err(fetch_error(format!("HTTP {}", response.status())));
    }

    let buffer = response
        .array_buffer()
        .map_err(|err| fetch_error(format!("{err:?}")))?;
    let buffer = JsFuture::from(buffer)
        .await
        .map_err(|err| fetch_error(format!("{err:?}")))?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}
