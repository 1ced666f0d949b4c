use crate::config::{PERCENT_MAX, PERCENT_MIN};
use crate::game::region::{DifferenceRegion, ImagePoint};
use std::collections::BTreeSet;

/// A pointer press in device pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerClick {
    pub x: f64,
    pub y: f64,
}

/// On-screen rectangle of a rendered image, in device pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl DisplayRect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// Rect of an image with `natural` size drawn centered inside `container`,
    /// scaled down (never up) to fit while keeping its aspect ratio.
    pub fn fit_centered(container: DisplayRect, natural: (u32, u32)) -> Self {
        let (nw, nh) = (natural.0 as f64, natural.1 as f64);
        if nw <= 0.0 || nh <= 0.0 {
            return container;
        }
        let scale = (container.width / nw).min(container.height / nh).min(1.0);
        let width = nw * scale;
        let height = nh * scale;
        Self {
            left: container.left + (container.width - width) / 2.0,
            top: container.top + (container.height - height) / 2.0,
            width,
            height,
        }
    }

    /// False until the image has been laid out with a real size.
    #[inline(always)]
    pub fn is_measured(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Converts a pixel click into percent of the displayed image, pinned to 0..100.
pub fn normalize_click(click: PointerClick, rect: DisplayRect) -> ImagePoint {
    let rel_x = (click.x - rect.left) / rect.width * 100.0;
    let rel_y = (click.y - rect.top) / rect.height * 100.0;
    ImagePoint::new(clamp_percent(rel_x), clamp_percent(rel_y))
}

#[inline(always)]
fn clamp_percent(v: f64) -> f64 {
    // NaN comes from a zero-sized rect; pin it to the origin instead of propagating.
    if v.is_nan() { PERCENT_MIN } else { v.clamp(PERCENT_MIN, PERCENT_MAX) }
}

/// First unfound region (in list order) whose tolerance-grown box contains `point`.
pub fn find_match(
    point: ImagePoint,
    regions: &[DifferenceRegion],
    found: &BTreeSet<usize>,
    tolerance: f64,
) -> Option<usize> {
    regions
        .iter()
        .enumerate()
        .filter(|(i, _)| !found.contains(i))
        .find(|(_, region)| region.contains_with_tolerance(point, tolerance))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CLICK_TOLERANCE_PERCENT;

    fn regions() -> Vec<DifferenceRegion> {
        vec![
            DifferenceRegion::new(10.0, 10.0, 10.0, 10.0),
            DifferenceRegion::new(14.0, 14.0, 10.0, 10.0),
            DifferenceRegion::new(70.0, 70.0, 5.0, 5.0),
        ]
    }

    #[test]
    fn normalize_offsets_and_scales() {
        let rect = DisplayRect::new(100.0, 50.0, 400.0, 200.0);
        let p = normalize_click(PointerClick { x: 200.0, y: 150.0 }, rect);
        assert_eq!(p, ImagePoint::new(25.0, 50.0));
    }

    #[test]
    fn normalize_pins_to_edges() {
        let rect = DisplayRect::new(0.0, 0.0, 200.0, 100.0);
        let p = normalize_click(PointerClick { x: -3.0, y: 101.0 }, rect);
        assert_eq!(p, ImagePoint::new(0.0, 100.0));
    }

    #[test]
    fn fit_centered_letterboxes() {
        let container = DisplayRect::new(0.0, 0.0, 400.0, 400.0);
        let r = DisplayRect::fit_centered(container, (800, 400));
        assert_eq!(r, DisplayRect::new(0.0, 100.0, 400.0, 200.0));
        let small = DisplayRect::fit_centered(container, (100, 50));
        assert_eq!(small, DisplayRect::new(150.0, 175.0, 100.0, 50.0));
    }

    #[test]
    fn overlapping_regions_pick_lower_index() {
        let found = BTreeSet::new();
        let hit = find_match(ImagePoint::new(19.0, 19.0), &regions(), &found, CLICK_TOLERANCE_PERCENT);
        assert_eq!(hit, Some(0));
    }

    #[test]
    fn found_regions_are_skipped() {
        let found: BTreeSet<usize> = [0].into_iter().collect();
        let hit = find_match(ImagePoint::new(19.0, 19.0), &regions(), &found, CLICK_TOLERANCE_PERCENT);
        assert_eq!(hit, Some(1));

        let found: BTreeSet<usize> = [0, 1].into_iter().collect();
        for x in 0..=100 {
            for y in 0..=100 {
                let hit = find_match(ImagePoint::new(x as f64, y as f64), &regions(), &found, CLICK_TOLERANCE_PERCENT);
                assert!(hit != Some(0) && hit != Some(1));
            }
        }
    }

    #[test]
    fn miss_returns_none() {
        let found = BTreeSet::new();
        assert_eq!(find_match(ImagePoint::new(50.0, 50.0), &regions(), &found, CLICK_TOLERANCE_PERCENT), None);
        assert_eq!(find_match(ImagePoint::new(50.0, 50.0), &[], &found, CLICK_TOLERANCE_PERCENT), None);
    }
}
