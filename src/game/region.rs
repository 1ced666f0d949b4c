use serde::{Deserialize, Serialize};

/// A point on an image, in percent of the displayed width/height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImagePoint {
    pub x: f64,
    pub y: f64,
}

impl ImagePoint {
    #[inline(always)]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A rectangular area where the two images differ. All fields are
/// percentages of the image size; nothing here keeps the box inside 0..100.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifferenceRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub description: String,
}

impl DifferenceRegion {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height, description: String::new() }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Box of `size` x `size` centered on `point`.
    pub fn centered_on(point: ImagePoint, size: f64) -> Self {
        let half = size / 2.0;
        Self::new(point.x - half, point.y - half, size, size)
    }

    #[inline(always)]
    pub fn center(&self) -> ImagePoint {
        ImagePoint::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Hit test against the box grown by `tolerance` on every side, measured
    /// per axis from the center. A negative half-extent shrinks the box and
    /// can make it unreachable; it never panics.
    #[inline(always)]
    pub fn contains_with_tolerance(&self, point: ImagePoint, tolerance: f64) -> bool {
        let center = self.center();
        let dx = (point.x - center.x).abs();
        let dy = (point.y - center.y).abs();
        dx <= self.width / 2.0 + tolerance && dy <= self.height / 2.0 + tolerance
    }

    /// Label shown in lists; falls back to the 1-based position.
    pub fn label(&self, index: usize) -> String {
        if self.description.trim().is_empty() {
            format!("Difference {}", index + 1)
        } else {
            self.description.clone()
        }
    }
}
