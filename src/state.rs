use glam::Mat4;

use crate::{
    animation::Animation,
    camera::{Axis, Camera, CameraBank, Preset},
    config::Config,
    geometry,
    input::Command,
    proximity::{PropScales, ProximityTrigger, Size},
};

/// Frame error above which the free camera is reported as drifting
const DRIFT_WARNING: f32 = 1e-2;

/// Where the view comes from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Free,
    /// looking out of the tiger's eye
    TigerEye,
    /// trailing behind the tiger
    TigerFollow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Everything the viewer changes at runtime. Input and the timer mutate it, drawing only reads it.
pub struct SceneState {
    presets: CameraBank,
    pub camera: Camera,
    move_speed: f32,
    rotate_speed: f32,
    roll_step: f32,
    max_fovy: f32,
    pub animation: Animation,
    pub view_mode: ViewMode,
    pub show_grid: bool,
    pub scales: PropScales,
    proximity: ProximityTrigger,
    drift_reported: bool,
}

impl SceneState {
    pub fn new(presets: CameraBank, config: &Config) -> Self {
        let settings = &config.camera;
        Self {
            camera: presets.get(Preset::Original),
            presets,
            move_speed: settings.move_speed,
            rotate_speed: settings.rotate_speed,
            roll_step: settings.roll_step,
            max_fovy: settings.max_fovy,
            animation: Animation::default(),
            view_mode: ViewMode::Free,
            show_grid: false,
            scales: PropScales::default(),
            proximity: ProximityTrigger::new(config.proximity),
            drift_reported: false,
        }
    }

    pub fn apply(&mut self, command: Command) -> Flow {
        match command {
            Command::SelectPreset(preset) => {
                let aspect = self.camera.aspect;
                self.camera = self.presets.get(preset);
                self.camera.aspect = aspect;
                self.view_mode = ViewMode::Free;
                self.drift_reported = false;
                log::debug!("camera preset {preset:?}");
            }
            Command::Move(direction) => self.camera.translate(direction, self.move_speed),
            Command::Rotate(axis, pixels) => {
                self.camera.rotate(axis, pixels * self.rotate_speed);
                self.check_drift();
            }
            Command::Roll(counter_clockwise) => {
                let step = if counter_clockwise {
                    self.roll_step
                } else {
                    -self.roll_step
                };
                self.camera.rotate(Axis::N, step);
                self.check_drift();
            }
            Command::LevelHorizon => self.camera.level_horizon(),
            Command::ToggleGrid => self.show_grid = !self.show_grid,
            Command::ToggleAnimation => {
                self.animation.toggle();
                log::info!(
                    "tiger animation {}",
                    if self.animation.enabled { "resumed" } else { "paused" }
                );
            }
            Command::ToggleTigerEye => self.toggle_view(ViewMode::TigerEye),
            Command::ToggleTigerFollow => self.toggle_view(ViewMode::TigerFollow),
            Command::ZoomIn => self.camera.zoom_in(),
            Command::ZoomOut => self.camera.zoom_out(self.max_fovy),
            Command::Exit => return Flow::Exit,
        }
        Flow::Continue
    }

    /// Turning one tiger view on turns the other off; turning it off returns to the free camera.
    fn toggle_view(&mut self, mode: ViewMode) {
        self.view_mode = if self.view_mode == mode {
            ViewMode::Free
        } else {
            mode
        };
        log::debug!("view mode {:?}", self.view_mode);
    }

    fn check_drift(&mut self) {
        let error = self.camera.orthonormality_error();
        if error > DRIFT_WARNING && !self.drift_reported {
            log::warn!("camera frame drifted from orthonormal by {error:.4}, select a preset to reset it");
            self.drift_reported = true;
        }
    }

    /// One timer tick: advance the animation, then let the props react to the camera.
    pub fn tick(&mut self) {
        self.animation.tick();
        if let Some(size) = self.proximity.update(self.camera.position, &mut self.scales) {
            match size {
                Size::Shrunk => log::info!("camera reached the tree, shrinking the giants"),
                Size::Big => log::info!("camera reached the bistro, restoring the giants"),
            }
        }
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
    }

    pub fn view_matrix(&self) -> Mat4 {
        match self.view_mode {
            ViewMode::Free => self.camera.view_matrix(),
            ViewMode::TigerEye => geometry::tiger_eye_camera(&self.animation).inverse(),
            ViewMode::TigerFollow => geometry::tiger_follow_camera(&self.animation).inverse(),
        }
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.camera.projection_matrix()
    }
}
