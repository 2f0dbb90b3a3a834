use bevy_ecs::component::Component;
use cgmath::{Point3, Vector2};
use serde::Deserialize;

use crate::error::LocationError;

/// A named place on the globe, in degrees.
#[derive(Component, Debug, Clone, PartialEq, Deserialize)]
pub struct Location {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Result<Self, LocationError> {
        let location = Self {
            name: name.into(),
            lat,
            lon,
        };
        location.validate()?;
        Ok(location)
    }

    pub fn validate(&self) -> Result<(), LocationError> {
        // written so NaN fails too
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(LocationError::Latitude {
                name: self.name.clone(),
                lat: self.lat,
            });
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(LocationError::Longitude {
                name: self.name.clone(),
                lon: self.lon,
            });
        }
        Ok(())
    }
}

const BUILT_IN_LOCATIONS: [(&str, f64, f64); 4] = [
    ("Bahawalpur", 29.3544, 71.6911),
    ("New York City", 40.7128, -74.006),
    ("Paris", 48.8566, 2.3522),
    ("Tokyo", 35.6762, 139.6503),
];

pub fn default_locations() -> Vec<Location> {
    BUILT_IN_LOCATIONS
        .iter()
        .map(|&(name, lat, lon)| Location {
            name: name.to_string(),
            lat,
            lon,
        })
        .collect()
}

/// Tags the icon billboard of a location.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Marker;

/// Tags the text billboard of a location.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Label;

/// A camera-facing quad centred on `position`, `scale` world units across.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub position: Point3<f32>,
    pub scale: Vector2<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_locations_are_in_range() {
        let locations = default_locations();
        assert_eq!(locations.len(), 4);
        for location in &locations {
            location.validate().unwrap();
        }
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        assert!(matches!(
            Location::new("north of north", 90.5, 0.0),
            Err(LocationError::Latitude { .. })
        ));
        assert!(matches!(
            Location::new("past the dateline", 0.0, -181.0),
            Err(LocationError::Longitude { .. })
        ));
        assert!(matches!(
            Location::new("nowhere", f64::NAN, 0.0),
            Err(LocationError::Latitude { .. })
        ));
        assert!(Location::new("south pole", -90.0, 180.0).is_ok());
    }
}
