use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};

use crate::{
    components::location::{default_locations, Location},
    error::LocationError,
    systems::{picking::PickPolicy, tween::ZoomOverlap},
};

/// `geoglobe` - an interactive globe with clickable location markers.
///
/// Click a marker or its label to fly the camera to it; drag to orbit and
/// scroll to zoom.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Directory (or URL prefix on the web) holding `earth.png`,
    /// `moon1.png`, `clouds4.jpg` and `marker-icon.png`.
    #[arg(long, env = "GEOGLOBE_ASSET_DIR", default_value = "assets")]
    pub asset_dir: String,

    /// JSON file with an array of `{ "name", "lat", "lon" }` objects to mark
    /// instead of the built-in locations.
    #[arg(long, env = "GEOGLOBE_LOCATIONS")]
    pub locations: Option<PathBuf>,

    /// What a click that hits both a marker and a label zooms to.
    #[arg(long, env = "GEOGLOBE_PICK_POLICY", value_enum, default_value_t = PickPolicy::MarkerPriority)]
    pub pick_policy: PickPolicy,

    /// What a new zoom does to a zoom that is still running.
    #[arg(long, env = "GEOGLOBE_ZOOM_OVERLAP", value_enum, default_value_t = ZoomOverlap::Replace)]
    pub zoom_overlap: ZoomOverlap,

    /// Stop the camera from slowly circling the globe.
    #[arg(long = "no-auto-rotate", action = ArgAction::SetFalse)]
    pub auto_rotate: bool,

    /// Auto-rotation speed; 2.0 is one revolution every 30 seconds.
    #[arg(long, default_value_t = 2.0)]
    pub auto_rotate_speed: f32,

    /// Angular speed of the moon around the earth, radians per second.
    #[arg(long, default_value_t = 0.0)]
    pub moon_orbit_speed: f32,
}

impl Config {
    /// Command line and environment on native targets, defaults on the web.
    pub fn load() -> Self {
        cfg_if::cfg_if! {
            if #[cfg(target_arch = "wasm32")] {
                Self::parse_from([env!("CARGO_PKG_NAME")])
            } else {
                Self::parse()
            }
        }
    }

    pub fn locations(&self) -> Result<Vec<Location>, LocationError> {
        match &self.locations {
            Some(path) => load_locations(path),
            None => Ok(default_locations()),
        }
    }
}

pub fn load_locations(path: &Path) -> Result<Vec<Location>, LocationError> {
    let display = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| LocationError::Read {
        path: display.clone(),
        source,
    })?;
    parse_locations(&display, &text)
}

pub fn parse_locations(path: &str, text: &str) -> Result<Vec<Location>, LocationError> {
    let locations: Vec<Location> =
        serde_json::from_str(text).map_err(|source| LocationError::Parse {
            path: path.to_string(),
            source,
        })?;
    if locations.is_empty() {
        return Err(LocationError::Empty {
            path: path.to_string(),
        });
    }
    for location in &locations {
        location.validate()?;
    }
    Ok(locations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_built_in_scene() {
        let config = Config::parse_from(["geoglobe"]);
        assert_eq!(config.asset_dir, "assets");
        assert_eq!(config.locations, None);
        assert_eq!(config.pick_policy, PickPolicy::MarkerPriority);
        assert_eq!(config.zoom_overlap, ZoomOverlap::Replace);
        assert!(config.auto_rotate);
        assert_eq!(config.auto_rotate_speed, 2.0);
        assert_eq!(config.moon_orbit_speed, 0.0);
        assert_eq!(config.locations().unwrap(), default_locations());
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::parse_from([
            "geoglobe",
            "--asset-dir",
            "public",
            "--pick-policy",
            "independent",
            "--zoom-overlap",
            "concurrent",
            "--no-auto-rotate",
            "--moon-orbit-speed",
            "0.25",
        ]);
        assert_eq!(config.asset_dir, "public");
        assert_eq!(config.pick_policy, PickPolicy::Independent);
        assert_eq!(config.zoom_overlap, ZoomOverlap::Concurrent);
        assert!(!config.auto_rotate);
        assert_eq!(config.moon_orbit_speed, 0.25);
    }

    #[test]
    fn locations_file_replaces_the_built_in_list() {
        let locations = parse_locations(
            "cities.json",
            r#"[{ "name": "Reykjavik", "lat": 64.1466, "lon": -21.9426 }]"#,
        )
        .unwrap();
        assert_eq!(locations, vec![Location::new("Reykjavik", 64.1466, -21.9426).unwrap()]);
    }

    #[test]
    fn locations_file_is_validated() {
        assert!(matches!(
            parse_locations("bad.json", r#"[{ "name": "Nowhere", "lat": 123.0, "lon": 0.0 }]"#),
            Err(LocationError::Latitude { .. })
        ));
        assert!(matches!(
            parse_locations("empty.json", "[]"),
            Err(LocationError::Empty { .. })
        ));
        assert!(matches!(
            parse_locations("broken.json", "[{ \"name\": "),
            Err(LocationError::Parse { .. })
        ));
    }

    #[test]
    fn missing_locations_file_is_a_read_error() {
        let err = load_locations(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, LocationError::Read { .. }));
    }
}
