use serde::{Deserialize, Serialize};

use crate::video::MediaElement;

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterParam {
    Brightness,
    Contrast,
    Saturation,
    HueRotate,
    Blur,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// The five visual filter parameters of one player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterState {
    pub brightness: f64,
    pub contrast: f64,
    pub saturation: f64,
    /// Raw accumulated degrees, never normalized.
    pub hue_rotate: f64,
    pub blur: f64,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            contrast: 1.0,
            saturation: 1.0,
            hue_rotate: 0.0,
            blur: 0.0,
        }
    }
}

impl FilterState {
    pub fn get(&self, param: FilterParam) -> f64 {
        match param {
            FilterParam::Brightness => self.brightness,
            FilterParam::Contrast => self.contrast,
            FilterParam::Saturation => self.saturation,
            FilterParam::HueRotate => self.hue_rotate,
            FilterParam::Blur => self.blur,
        }
    }

    fn slot(&mut self, param: FilterParam) -> &mut f64 {
        match param {
            FilterParam::Brightness => &mut self.brightness,
            FilterParam::Contrast => &mut self.contrast,
            FilterParam::Saturation => &mut self.saturation,
            FilterParam::HueRotate => &mut self.hue_rotate,
            FilterParam::Blur => &mut self.blur,
        }
    }

    pub fn descriptor(&self) -> String {
        format!(
            "brightness({}) contrast({}) saturate({}) hue-rotate({}deg) blur({}px)",
            self.brightness, self.contrast, self.saturation, self.hue_rotate, self.blur
        )
    }

    pub fn apply(&self, element: &dyn MediaElement) {
        element.set_filter_style(&self.descriptor());
    }

    pub fn reset(&mut self, element: &dyn MediaElement) {
        *self = Self::default();
        self.apply(element);
    }

    /// Steps one parameter and returns its new value. Brightness, contrast
    /// and saturation move by 1.0 above neutral and by 0.1 at or below it.
    pub fn adjust(&mut self, param: FilterParam, direction: Direction) -> f64 {
        let value = self.slot(param);
        let next = match param {
            FilterParam::Brightness | FilterParam::Contrast | FilterParam::Saturation => {
                let step = if *value > 1.0 { 1.0 } else { 0.1 };
                match direction {
                    Direction::Up => *value + step,
                    Direction::Down => (*value - step).max(0.0),
                }
            }
            FilterParam::HueRotate => match direction {
                Direction::Up => *value + 1.0,
                Direction::Down => *value - 1.0,
            },
            FilterParam::Blur => match direction {
                Direction::Up => *value + 1.0,
                Direction::Down => (*value - 1.0).max(0.0),
            },
        };
        *value = round_to(next, 2);
        *value
    }
}

/// Scale and rotation, composed into a single transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformState {
    pub scale: f64,
    pub rotation: u32,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation: 0,
        }
    }
}

impl TransformState {
    const MIN_SCALE: f64 = 0.1;

    /// Adds `delta` to the scale, rounded to one decimal. The result never
    /// drops below 0.1, so repeated zoom-out keeps the video visible and never
    /// mirrors it through a zero or negative scale.
    pub fn scale_by(&mut self, delta: f64) -> f64 {
        self.scale = round_to(self.scale + delta, 1).max(Self::MIN_SCALE);
        self.scale
    }

    pub fn reset_scale(&mut self) -> f64 {
        self.scale = 1.0;
        self.scale
    }

    pub fn rotate(&mut self) -> u32 {
        self.rotation = (self.rotation + 90) % 360;
        self.rotation
    }

    pub fn css(&self) -> String {
        format!("scale({}) rotate({}deg)", self.scale, self.rotation)
    }

    pub fn apply(&self, element: &dyn MediaElement) {
        element.set_transform_style(&self.css());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NON_LINEAR: [FilterParam; 3] = [
        FilterParam::Brightness,
        FilterParam::Contrast,
        FilterParam::Saturation,
    ];

    #[test]
    fn test_default_descriptor_is_neutral() {
        assert_eq!(
            FilterState::default().descriptor(),
            "brightness(1) contrast(1) saturate(1) hue-rotate(0deg) blur(0px)"
        );
    }

    #[test]
    fn test_fine_step_at_or_below_neutral() {
        for param in NON_LINEAR {
            let mut filter = FilterState::default();
            assert_eq!(filter.adjust(param, Direction::Up), 1.1);
            let mut filter = FilterState::default();
            assert_eq!(filter.adjust(param, Direction::Down), 0.9);
        }
    }

    #[test]
    fn test_coarse_step_above_neutral() {
        for param in NON_LINEAR {
            let mut filter = FilterState::default();
            filter.adjust(param, Direction::Up);
            assert_eq!(filter.adjust(param, Direction::Up), 2.1);
            assert_eq!(filter.adjust(param, Direction::Up), 3.1);
            assert_eq!(filter.adjust(param, Direction::Down), 2.1);
            assert_eq!(filter.adjust(param, Direction::Down), 1.1);
            // 1.1 is still above neutral, so the coarse step applies once more
            assert_eq!(filter.adjust(param, Direction::Down), 0.1);
        }
    }

    #[test]
    fn test_never_below_zero() {
        for param in NON_LINEAR.iter().copied().chain([FilterParam::Blur]) {
            let mut filter = FilterState::default();
            for _ in 0..30 {
                let value = filter.adjust(param, Direction::Down);
                assert!(value >= 0.0, "{:?} went negative: {}", param, value);
            }
            assert_eq!(filter.get(param), 0.0);
        }
    }

    #[test]
    fn test_repeated_steps_do_not_drift() {
        let mut filter = FilterState::default();
        for _ in 0..9 {
            filter.adjust(FilterParam::Brightness, Direction::Down);
        }
        assert_eq!(filter.brightness, 0.1);
        for _ in 0..9 {
            filter.adjust(FilterParam::Brightness, Direction::Up);
        }
        assert_eq!(filter.brightness, 1.0);
    }

    #[test]
    fn test_hue_is_unbounded() {
        let mut filter = FilterState::default();
        for _ in 0..365 {
            filter.adjust(FilterParam::HueRotate, Direction::Up);
        }
        assert_eq!(filter.hue_rotate, 365.0);

        let mut filter = FilterState::default();
        filter.adjust(FilterParam::HueRotate, Direction::Down);
        assert_eq!(filter.hue_rotate, -1.0);
        assert!(filter.descriptor().contains("hue-rotate(-1deg)"));
    }

    #[test]
    fn test_rotation_wraps_after_four_turns() {
        let mut transform = TransformState::default();
        assert_eq!(transform.rotate(), 90);
        assert_eq!(transform.rotate(), 180);
        assert_eq!(transform.rotate(), 270);
        assert_eq!(transform.rotate(), 0);
    }

    #[test]
    fn test_scale_steps_and_floor() {
        let mut transform = TransformState::default();
        assert_eq!(transform.scale_by(0.1), 1.1);
        assert_eq!(transform.scale_by(0.1), 1.2);
        assert_eq!(transform.reset_scale(), 1.0);
        for _ in 0..20 {
            transform.scale_by(-0.1);
        }
        assert_eq!(transform.scale, 0.1);
        assert_eq!(transform.css(), "scale(0.1) rotate(0deg)");
    }
}
