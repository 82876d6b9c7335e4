use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use glam::Vec3;

pub const ASSET_ROOT_VAR: &str = "BISTRO_ASSET_ROOT";
pub const TICK_MS_VAR: &str = "BISTRO_TICK_MS";

/// Runtime settings. Everything here has a sensible default, the environment can only
/// override where the assets live and how fast the scene timer ticks.
#[derive(Clone, Debug)]
pub struct Config {
    pub asset_root: PathBuf,
    pub title: String,
    pub window_size: (u32, u32),
    pub tick: Duration,
    pub camera: CameraSettings,
    pub proximity: ProximitySettings,
}

#[derive(Clone, Copy, Debug)]
pub struct CameraSettings {
    pub move_speed: f32,
    /// degrees per pixel of mouse drag
    pub rotate_speed: f32,
    /// degrees per roll key press
    pub roll_step: f32,
    pub near: f32,
    pub far: f32,
    pub max_fovy: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct ProximitySettings {
    pub shrink_point: Vec3,
    pub shrink_radius: f32,
    pub grow_point: Vec3,
    pub grow_radius: f32,
    pub factor: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("."),
            title: String::from("Bistro Exterior Scene"),
            window_size: (900, 600),
            tick: Duration::from_millis(100),
            camera: CameraSettings::default(),
            proximity: ProximitySettings::default(),
        }
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            move_speed: 100.0,
            rotate_speed: 0.1,
            roll_step: 3.0,
            near: 0.1,
            far: 50000.0,
            max_fovy: 2.0,
        }
    }
}

impl Default for ProximitySettings {
    fn default() -> Self {
        Self {
            shrink_point: Vec3::new(4500.0, -2588.0, 0.0),
            shrink_radius: 300.0,
            grow_point: Vec3::new(1350.0, 3500.0, 0.0),
            grow_radius: 300.0,
            factor: 20.0,
        }
    }
}

impl Config {
    /// Defaults, with `BISTRO_ASSET_ROOT` and `BISTRO_TICK_MS` applied when present.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Defaults with overrides taken from `lookup`. A tick that is not a positive number of
    /// milliseconds is ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(root) = lookup(ASSET_ROOT_VAR) {
            config.asset_root = PathBuf::from(root);
        }
        if let Some(raw) = lookup(TICK_MS_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.tick = Duration::from_millis(ms),
                _ => log::warn!(
                    "ignoring {TICK_MS_VAR}={raw:?}, keeping {}ms",
                    config.tick.as_millis()
                ),
            }
        }
        config
    }

    pub fn asset(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.asset_root.join(relative)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.asset("Scene/bistro_exterior.scene")
    }

    /// Cubemap faces in +X, -X, +Y, -Y, +Z, -Z order
    pub fn cubemap_faces(&self) -> [PathBuf; 6] {
        ["px", "nx", "py", "ny", "pz", "nz"].map(|face| self.asset(format!("Scene/Cubemap/{face}.png")))
    }
}
