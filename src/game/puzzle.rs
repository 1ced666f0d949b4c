use crate::error::{GameError, Result};
use crate::game::region::DifferenceRegion;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Which of the two pictures a click or image reference belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageSide {
    Original,
    Modified,
}

impl ImageSide {
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Original),
            2 => Some(Self::Modified),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImagePair {
    pub image1: String,
    pub image2: String,
}

impl ImagePair {
    pub fn get(&self, side: ImageSide) -> &str {
        match side {
            ImageSide::Original => &self.image1,
            ImageSide::Modified => &self.image2,
        }
    }

    pub fn set(&mut self, side: ImageSide, value: String) {
        match side {
            ImageSide::Original => self.image1 = value,
            ImageSide::Modified => self.image2 = value,
        }
    }

    pub fn both_present(&self) -> bool {
        !self.image1.trim().is_empty() && !self.image2.trim().is_empty()
    }
}

/// The on-disk game definition. Region order is the region identity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    pub game_title: String,
    pub images: ImagePair,
    pub differences: Vec<DifferenceRegion>,
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| GameError::io(path.display().to_string(), e))?;
        let config = Self::from_json(&text)?;
        info!(
            "Loaded '{}' from '{}' ({} differences).",
            config.game_title,
            path.display(),
            config.differences.len()
        );
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json_pretty()?;
        fs::write(path, json).map_err(|e| GameError::io(path.display().to_string(), e))?;
        info!("Saved '{}' to '{}'.", self.game_title, path.display());
        Ok(())
    }

    /// Checks what play needs: two images and at least one region.
    pub fn validate_for_play(&self) -> Result<()> {
        if !self.images.both_present() {
            return Err(GameError::MissingImages);
        }
        if self.differences.is_empty() {
            return Err(GameError::NoDifferences);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GameConfig {
        GameConfig {
            game_title: "Forest".to_string(),
            images: ImagePair {
                image1: "/images/forest-original.jpg".to_string(),
                image2: "data:image/png;base64,iVBORw0KGgo=".to_string(),
            },
            differences: vec![
                DifferenceRegion::new(10.5, 12.25, 5.0, 7.5).with_description("Bird"),
                DifferenceRegion::new(80.0, 80.0, 5.0, 5.0),
            ],
        }
    }

    #[test]
    fn json_round_trip_keeps_every_field() {
        let config = sample();
        let json = config.to_json_pretty().unwrap();
        assert!(json.contains("\"gameTitle\""));
        assert!(json.contains("\n  \"images\""));
        assert_eq!(GameConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn missing_description_defaults_to_empty() {
        let json = r#"{
            "gameTitle": "T",
            "images": { "image1": "a.png", "image2": "b.png" },
            "differences": [ { "x": 1, "y": 2, "width": 3, "height": 4 } ]
        }"#;
        let config = GameConfig::from_json(json).unwrap();
        assert_eq!(config.differences[0], DifferenceRegion::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn reserialized_numbers_keep_full_precision() {
        let json = r#"{
            "gameTitle": "T",
            "images": { "image1": "a.png", "image2": "b.png" },
            "differences": [ { "x": 33.333333333333336, "y": 12.345678901234, "width": 10, "height": 10 } ]
        }"#;
        let config = GameConfig::from_json(json).unwrap();
        let saved = config.to_json_pretty().unwrap();
        assert!(saved.contains("\"x\": 33.333333333333336"));
        assert!(saved.contains("\"y\": 12.345678901234"));
        assert_eq!(GameConfig::from_json(&saved).unwrap(), config);
    }

    #[test]
    fn missing_required_fields_rejected() {
        assert!(GameConfig::from_json(r#"{ "gameTitle": "T" }"#).is_err());
        assert!(GameConfig::from_json("not json").is_err());
        assert!(GameConfig::from_json(
            r#"{ "gameTitle": "T", "images": { "image1": "a" }, "differences": [] }"#
        )
        .is_err());
    }

    #[test]
    fn play_needs_images_and_regions() {
        let mut config = sample();
        assert!(config.validate_for_play().is_ok());

        config.images.image2.clear();
        assert!(matches!(config.validate_for_play(), Err(GameError::MissingImages)));

        let mut config = sample();
        config.differences.clear();
        assert!(matches!(config.validate_for_play(), Err(GameError::NoDifferences)));
    }

    #[test]
    fn image_side_numbers() {
        assert_eq!(ImageSide::from_number(1), Some(ImageSide::Original));
        assert_eq!(ImageSide::from_number(2), Some(ImageSide::Modified));
        assert_eq!(ImageSide::from_number(3), None);
    }
}
