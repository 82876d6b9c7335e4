use glam::Vec3;

use crate::config::ProximitySettings;

/// Uniform scale of each static prop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropScales {
    pub optimus: f32,
    pub godzilla: f32,
    pub dragon: f32,
    pub ironman: f32,
    pub tank: f32,
}

impl Default for PropScales {
    fn default() -> Self {
        Self {
            optimus: 5.0,
            godzilla: 35.0,
            dragon: 140.0,
            ironman: 75.0,
            tank: 150.0,
        }
    }
}

impl PropScales {
    /// Scale the props that react to the camera. Ironman and the tank stay as they are.
    fn rescale(&mut self, factor: f32) {
        self.optimus *= factor;
        self.godzilla *= factor;
        self.dragon *= factor;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Size {
    Big,
    Shrunk,
}

/// Shrinks the giant props once the camera walks up to the shrink point and restores them once
/// it reaches the grow point. Each switch fires once until the other one has fired.
#[derive(Clone, Debug)]
pub struct ProximityTrigger {
    settings: ProximitySettings,
    size: Size,
}

impl ProximityTrigger {
    pub fn new(settings: ProximitySettings) -> Self {
        Self {
            settings,
            size: Size::Big,
        }
    }

    #[cfg(test)]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns the new size when this call switched it.
    pub fn update(&mut self, camera: Vec3, scales: &mut PropScales) -> Option<Size> {
        let s = &self.settings;
        let next = if camera.distance(s.shrink_point) < s.shrink_radius {
            Size::Shrunk
        } else if camera.distance(s.grow_point) < s.grow_radius {
            Size::Big
        } else {
            return None;
        };
        if next == self.size {
            return None;
        }

        scales.rescale(match next {
            Size::Shrunk => s.factor.recip(),
            Size::Big => s.factor,
        });
        self.size = next;
        Some(next)
    }
}
