use crate::config::{DEFAULT_REGION_SIZE, MARKING_MESSAGE_DURATION};
use crate::core::schedule::ScheduledTask;
use crate::error::{GameError, Result};
use crate::game::matching::find_match;
use crate::game::puzzle::{GameConfig, ImagePair, ImageSide};
use crate::game::region::{DifferenceRegion, ImagePoint};
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::time::Instant;

/// Marking a difference takes one click per image, first then second.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarkingStep {
    Idle,
    FirstImage,
    SecondImage { first: ImagePoint },
}

pub struct State {
    title: String,
    images: ImagePair,
    differences: Vec<DifferenceRegion>,
    step: MarkingStep,
    pending_description: String,
    message: Option<String>,
    message_expiry: ScheduledTask,
    tolerance: f64,
}

impl State {
    /// `tolerance` is the click leniency the game will use, so previews agree
    /// with play.
    pub fn new(initial: &GameConfig, tolerance: f64) -> Self {
        Self {
            title: initial.game_title.clone(),
            images: initial.images.clone(),
            differences: initial.differences.clone(),
            step: MarkingStep::Idle,
            pending_description: String::new(),
            message: None,
            message_expiry: ScheduledTask::idle(),
            tolerance,
        }
    }

    pub fn is_marking(&self) -> bool {
        self.step != MarkingStep::Idle
    }

    pub fn step(&self) -> MarkingStep {
        self.step
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn differences(&self) -> &[DifferenceRegion] {
        &self.differences
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_image(&mut self, side: ImageSide, image_ref: impl Into<String>) {
        self.images.set(side, image_ref.into());
    }

    fn set_message(&mut self, text: &str) {
        self.message = Some(text.to_string());
        self.message_expiry.cancel();
    }

    pub fn start_marking(&mut self) -> Result<()> {
        if !self.images.both_present() {
            return Err(GameError::MissingImages);
        }
        self.step = MarkingStep::FirstImage;
        self.pending_description = format!("Difference {}", self.differences.len() + 1);
        self.set_message("Click on the first image where you see a difference");
        Ok(())
    }

    pub fn cancel_marking(&mut self) {
        self.step = MarkingStep::Idle;
        self.pending_description.clear();
        self.message = None;
        self.message_expiry.cancel();
    }

    /// Feeds a click (in percent) into the marking wizard. Returns the index of
    /// the region created by the second click. Clicks on the wrong image, or
    /// while not marking, do nothing. So do points that are not finite.
    pub fn click(&mut self, side: ImageSide, point: ImagePoint, now: Instant) -> Option<usize> {
        if !(point.x.is_finite() && point.y.is_finite()) {
            warn!("Ignoring click at non-finite point {:?}.", point);
            return None;
        }
        match (self.step, side) {
            (MarkingStep::FirstImage, ImageSide::Original) => {
                self.step = MarkingStep::SecondImage { first: point };
                self.set_message("Now click on the second image at the corresponding location");
                None
            }
            (MarkingStep::SecondImage { first }, ImageSide::Modified) => {
                let description = std::mem::take(&mut self.pending_description);
                self.differences
                    .push(DifferenceRegion::centered_on(first, DEFAULT_REGION_SIZE).with_description(description));
                self.step = MarkingStep::Idle;
                self.message = Some(
                    "Difference added successfully! You can adjust its size and position in the list below."
                        .to_string(),
                );
                self.message_expiry.reschedule_once(now, MARKING_MESSAGE_DURATION);
                let index = self.differences.len() - 1;
                info!("Marked difference {} at {:.1}%, {:.1}%.", index + 1, first.x, first.y);
                Some(index)
            }
            _ => {
                debug!("Ignoring {:?} click in {:?}.", side, self.step);
                None
            }
        }
    }

    pub fn tick(&mut self, now: Instant) {
        if self.message_expiry.poll(now) {
            self.message = None;
        }
    }

    /// Edits one field of a region. Numeric fields must parse as finite floats.
    pub fn update_region(&mut self, index: usize, field: &str, value: &str) -> Result<()> {
        let len = self.differences.len();
        let region = self.differences.get_mut(index).ok_or(GameError::InvalidIndex { index, len })?;
        let number = || {
            value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| GameError::InvalidValue { field: field.to_string(), value: value.to_string() })
        };
        match field {
            "x" => region.x = number()?,
            "y" => region.y = number()?,
            "width" => region.width = number()?,
            "height" => region.height = number()?,
            "description" => region.description = value.to_string(),
            other => return Err(GameError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    pub fn remove_region(&mut self, index: usize) -> Result<DifferenceRegion> {
        let len = self.differences.len();
        if index >= len {
            return Err(GameError::InvalidIndex { index, len });
        }
        Ok(self.differences.remove(index))
    }

    /// Which region a player click at `point` would find first on a fresh game.
    pub fn preview_match(&self, point: ImagePoint) -> Option<usize> {
        find_match(point, &self.differences, &BTreeSet::new(), self.tolerance)
    }

    pub fn to_config(&self) -> GameConfig {
        GameConfig {
            game_title: self.title.clone(),
            images: self.images.clone(),
            differences: self.differences.clone(),
        }
    }

    /// Replaces the configuration with `json`. On any error the current one
    /// is kept as it was.
    pub fn load_json(&mut self, json: &str) -> Result<()> {
        let config = GameConfig::from_json(json).inspect_err(|e| warn!("Invalid configuration file: {}", e))?;
        self.title = config.game_title;
        self.images = config.images;
        self.differences = config.differences;
        self.cancel_marking();
        Ok(())
    }

    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let text = fs::read_to_string(path).map_err(|e| GameError::io(path.display().to_string(), e))?;
        self.load_json(&text)?;
        info!("Loaded configuration from '{}'.", path.display());
        Ok(())
    }

    pub fn save_json(&self) -> Result<String> {
        self.to_config().to_json_pretty()
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.to_config().save(path)
    }

    pub fn can_start(&self) -> bool {
        !self.is_marking() && self.images.both_present() && !self.differences.is_empty()
    }

    pub fn start_game(&self) -> Result<GameConfig> {
        if self.is_marking() {
            return Err(GameError::MarkingInProgress);
        }
        let config = self.to_config();
        config.validate_for_play()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CLICK_TOLERANCE_PERCENT;
    use std::time::Duration;

    fn with_images() -> State {
        let mut s = State::new(&GameConfig::default(), CLICK_TOLERANCE_PERCENT);
        s.set_title("Kitchen");
        s.set_image(ImageSide::Original, "a.png");
        s.set_image(ImageSide::Modified, "b.png");
        s
    }

    #[test]
    fn marking_requires_both_images() {
        let mut s = State::new(&GameConfig::default(), CLICK_TOLERANCE_PERCENT);
        s.set_image(ImageSide::Original, "a.png");
        assert!(matches!(s.start_marking(), Err(GameError::MissingImages)));
        assert!(!s.is_marking());
    }

    #[test]
    fn two_clicks_make_a_centered_box() {
        let now = Instant::now();
        let mut s = with_images();
        s.start_marking().unwrap();

        // Second image first is ignored.
        assert_eq!(s.click(ImageSide::Modified, ImagePoint::new(1.0, 1.0), now), None);
        assert_eq!(s.step(), MarkingStep::FirstImage);

        assert_eq!(s.click(ImageSide::Original, ImagePoint::new(30.0, 40.0), now), None);
        assert_eq!(s.click(ImageSide::Modified, ImagePoint::new(31.0, 41.0), now), Some(0));
        assert_eq!(s.step(), MarkingStep::Idle);
        assert_eq!(
            s.differences()[0],
            DifferenceRegion::new(25.0, 35.0, 10.0, 10.0).with_description("Difference 1")
        );
    }

    #[test]
    fn success_message_clears_after_delay() {
        let now = Instant::now();
        let mut s = with_images();
        s.start_marking().unwrap();
        s.click(ImageSide::Original, ImagePoint::new(50.0, 50.0), now);
        s.click(ImageSide::Modified, ImagePoint::new(50.0, 50.0), now);
        assert!(s.message().is_some());
        s.tick(now + Duration::from_secs(1));
        assert!(s.message().is_some());
        s.tick(now + MARKING_MESSAGE_DURATION);
        assert!(s.message().is_none());
    }

    #[test]
    fn cancel_discards_first_point() {
        let now = Instant::now();
        let mut s = with_images();
        s.start_marking().unwrap();
        s.click(ImageSide::Original, ImagePoint::new(50.0, 50.0), now);
        s.cancel_marking();
        assert_eq!(s.click(ImageSide::Modified, ImagePoint::new(50.0, 50.0), now), None);
        assert!(s.differences().is_empty());
    }

    #[test]
    fn edit_and_remove_regions() {
        let mut s = with_images();
        s.load_json(
            r#"{"gameTitle":"K","images":{"image1":"a","image2":"b"},
                "differences":[{"x":1,"y":1,"width":2,"height":2,"description":"one"},
                               {"x":5,"y":5,"width":2,"height":2,"description":"two"}]}"#,
        )
        .unwrap();
        s.update_region(0, "width", "12.5").unwrap();
        s.update_region(0, "description", "Lamp").unwrap();
        assert_eq!(s.differences()[0].width, 12.5);
        assert_eq!(s.differences()[0].description, "Lamp");

        assert!(matches!(s.update_region(0, "x", "abc"), Err(GameError::InvalidValue { .. })));
        assert!(matches!(s.update_region(0, "colour", "red"), Err(GameError::UnknownField(_))));
        assert!(matches!(s.update_region(9, "x", "1"), Err(GameError::InvalidIndex { index: 9, len: 2 })));

        assert_eq!(s.remove_region(0).unwrap().description, "Lamp");
        assert_eq!(s.differences()[0].description, "two");
        assert!(s.remove_region(5).is_err());
    }

    #[test]
    fn failed_load_keeps_previous_config() {
        let mut s = with_images();
        s.differences.push(DifferenceRegion::new(1.0, 1.0, 1.0, 1.0));
        let before = s.to_config();
        assert!(s.load_json("{ not json").is_err());
        assert!(s.load_json(r#"{"gameTitle":"x"}"#).is_err());
        assert_eq!(s.to_config(), before);
    }

    #[test]
    fn start_gated_on_images_regions_and_marking() {
        let now = Instant::now();
        let mut s = with_images();
        assert!(!s.can_start());
        assert!(matches!(s.start_game(), Err(GameError::NoDifferences)));

        s.start_marking().unwrap();
        s.click(ImageSide::Original, ImagePoint::new(20.0, 20.0), now);
        s.click(ImageSide::Modified, ImagePoint::new(20.0, 20.0), now);
        assert!(s.can_start());

        s.start_marking().unwrap();
        assert!(!s.can_start());
        assert!(matches!(s.start_game(), Err(GameError::MarkingInProgress)));
        s.cancel_marking();

        let config = s.start_game().unwrap();
        assert_eq!(config.game_title, "Kitchen");
        assert_eq!(config.differences.len(), 1);
    }

    #[test]
    fn save_output_round_trips() {
        let now = Instant::now();
        let mut s = with_images();
        s.start_marking().unwrap();
        s.click(ImageSide::Original, ImagePoint::new(62.5, 12.5), now);
        s.click(ImageSide::Modified, ImagePoint::new(62.5, 12.5), now);
        let json = s.save_json().unwrap();

        let mut other = State::new(&GameConfig::default(), CLICK_TOLERANCE_PERCENT);
        other.load_json(&json).unwrap();
        assert_eq!(other.to_config(), s.to_config());
    }

    #[test]
    fn preview_uses_game_matching() {
        let mut s = with_images();
        s.differences.push(DifferenceRegion::new(40.0, 40.0, 10.0, 10.0));
        assert_eq!(s.preview_match(ImagePoint::new(53.0, 45.0)), Some(0));
        assert_eq!(s.preview_match(ImagePoint::new(56.0, 45.0)), None);
    }

    #[test]
    fn preview_follows_configured_tolerance() {
        let mut s = State::new(&GameConfig::default(), 1.0);
        s.differences.push(DifferenceRegion::new(40.0, 40.0, 10.0, 10.0));
        assert_eq!(s.preview_match(ImagePoint::new(46.0, 45.0)), Some(0));
        assert_eq!(s.preview_match(ImagePoint::new(53.0, 45.0)), None);
    }

    #[test]
    fn non_finite_values_are_refused() {
        let mut s = with_images();
        s.differences.push(DifferenceRegion::new(40.0, 40.0, 10.0, 10.0));
        for bad in ["NaN", "inf", "-inf"] {
            assert!(matches!(s.update_region(0, "x", bad), Err(GameError::InvalidValue { .. })));
        }
        assert_eq!(s.differences()[0].x, 40.0);

        let json = s.save_json().unwrap();
        let mut reloaded = State::new(&GameConfig::default(), CLICK_TOLERANCE_PERCENT);
        reloaded.load_json(&json).unwrap();
        assert_eq!(reloaded.to_config(), s.to_config());
    }

    #[test]
    fn non_finite_click_does_not_advance_marking() {
        let now = Instant::now();
        let mut s = with_images();
        s.start_marking().unwrap();
        assert_eq!(s.click(ImageSide::Original, ImagePoint::new(f64::NAN, 10.0), now), None);
        assert_eq!(s.step(), MarkingStep::FirstImage);
        s.click(ImageSide::Original, ImagePoint::new(30.0, 40.0), now);
        assert_eq!(s.click(ImageSide::Modified, ImagePoint::new(f64::INFINITY, 40.0), now), None);
        assert!(s.differences().is_empty());
        assert_eq!(s.click(ImageSide::Modified, ImagePoint::new(31.0, 41.0), now), Some(0));
    }
}
