use glam::{Mat3, Mat4, Vec3, Vec4};

use crate::{config::CameraSettings, load::ManifestCamera};

/// Orthonormal right (`u`), up (`v`), back (`n`) frame at `position`, plus projection
/// parameters. `fovy` is in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub u: Vec3,
    pub v: Vec3,
    pub n: Vec3,
    pub fovy: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Camera axis to rotate about
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    U,
    V,
    N,
}

impl Camera {
    /// View matrix with rows `u`, `v`, `n`, then a translation by `-position`.
    pub fn view_matrix(&self) -> Mat4 {
        let rotation = Mat4::from_cols(
            Vec4::new(self.u.x, self.v.x, self.n.x, 0.0),
            Vec4::new(self.u.y, self.v.y, self.n.y, 0.0),
            Vec4::new(self.u.z, self.v.z, self.n.z, 0.0),
            Vec4::W,
        );
        rotation * Mat4::from_translation(-self.position)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fovy, self.aspect, self.near, self.far)
    }

    pub fn translate(&mut self, direction: Direction, distance: f32) {
        let offset = match direction {
            Direction::Forward => -self.n,
            Direction::Backward => self.n,
            Direction::Left => -self.u,
            Direction::Right => self.u,
            Direction::Up => self.v,
            Direction::Down => -self.v,
        };
        self.position += offset * distance;
    }

    /// Rotate the two other axes about `axis` by `degrees`.
    ///
    /// The frame is not re-orthonormalized afterwards, so rounding error accumulates over long
    /// sessions; see [`Camera::orthonormality_error`].
    pub fn rotate(&mut self, axis: Axis, degrees: f32) {
        let pivot = match axis {
            Axis::U => self.u,
            Axis::V => self.v,
            Axis::N => self.n,
        };
        let rotation = Mat3::from_axis_angle(pivot.normalize(), degrees.to_radians());
        match axis {
            Axis::U => {
                self.v = rotation * self.v;
                self.n = rotation * self.n;
            }
            Axis::V => {
                self.u = rotation * self.u;
                self.n = rotation * self.n;
            }
            Axis::N => {
                self.u = rotation * self.u;
                self.v = rotation * self.v;
            }
        }
    }

    /// Roll about `n` until `u` lies in the world horizontal plane (world up is +Z) with `v`
    /// pointing upwards. Works for mirrored frames too.
    pub fn level_horizon(&mut self) {
        // rotating by θ about n gives u' = u cosθ + s·v sinθ, s the frame's handedness;
        // solve u'.z = 0 with v'.z > 0
        let handedness = self.u.cross(self.v).dot(self.n).signum();
        let roll = f32::atan2(-handedness * self.u.z, self.v.z);
        if roll.abs() > f32::EPSILON {
            self.rotate(Axis::N, roll.to_degrees());
        }
    }

    pub fn zoom_in(&mut self) {
        self.fovy *= 0.9;
    }

    pub fn zoom_out(&mut self, max_fovy: f32) {
        self.fovy = (self.fovy * 1.1).min(max_fovy);
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Largest deviation of the frame from orthonormal: unit lengths and pairwise dot products.
    pub fn orthonormality_error(&self) -> f32 {
        [
            (self.u.length() - 1.0).abs(),
            (self.v.length() - 1.0).abs(),
            (self.n.length() - 1.0).abs(),
            self.u.dot(self.v).abs(),
            self.v.dot(self.n).abs(),
            self.n.dot(self.u).abs(),
        ]
        .into_iter()
        .fold(0.0, f32::max)
    }
}

/// Named viewpoints, selected with a single key each.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    Original,
    Bistro,
    Tree,
    Top,
    Front,
    Side,
    GateToTree,
    Gallery,
    StoreSide,
    ReversedTreeGate,
    User,
}

impl Preset {
    pub const ALL: [Preset; 11] = [
        Preset::Original,
        Preset::Bistro,
        Preset::Tree,
        Preset::Top,
        Preset::Front,
        Preset::Side,
        Preset::GateToTree,
        Preset::Gallery,
        Preset::StoreSide,
        Preset::ReversedTreeGate,
        Preset::User,
    ];

    /// position, u, v, n; `None` for the view read from the scene manifest
    fn frame(self) -> Option<[[f32; 3]; 4]> {
        Some(match self {
            Preset::Original => return None,
            Preset::Bistro => [
                [-241.351_807, 1444.346_3, 283.968_23],
                [-0.998_411, 0.049_119, -0.027_553],
                [-0.028_485, -0.018_375, 0.999_417],
                [0.048_585, 0.998_617, 0.019_746],
            ],
            Preset::Tree => [
                [1974.856_6, -1588.545_8, 98.843_97],
                [-0.357_811, -0.933_725, 0.010_082],
                [-0.180_88, 0.079_899, 0.980_231],
                [-0.916_095, 0.348_92, -0.197_483],
            ],
            Preset::Top => [
                [0.0, 0.0, 18300.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
            ],
            Preset::Front => [
                [0.0, 11700.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0],
                [0.0, 1.0, 0.0],
            ],
            Preset::Side => [
                [14600.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
                [1.0, 0.0, 0.0],
            ],
            Preset::GateToTree => [
                [-950.0, -600.0, 275.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
                [-1.0, 0.0, 0.0],
            ],
            Preset::Gallery => [
                [-1500.0, 100.0, 230.0],
                [0.900_968_9, 0.433_883_74, 0.0],
                [0.0, 0.0, 1.0],
                [0.433_883_74, -0.900_968_9, 0.0],
            ],
            Preset::StoreSide => [
                [550.0, 2125.0, 200.0],
                [1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0],
                [0.0, -1.0, 0.0],
            ],
            Preset::ReversedTreeGate => [
                [2250.85, -1650.545_8, 400.843_97],
                [-0.357_811, -0.933_725, 0.010_082],
                [-0.180_88, 0.079_899, 0.980_231],
                [0.916_095, -0.348_92, 0.197_483],
            ],
            Preset::User => [
                [-500.0, 500.0, 220.0],
                [0.997_452, 0.071_339, 0.0],
                [0.0, 0.0, 1.0],
                [-0.071_339, 0.997_452, 0.0],
            ],
        })
    }
}

/// The fixed set of presets, built once at startup.
pub struct CameraBank {
    cameras: [Camera; Preset::ALL.len()],
}

impl CameraBank {
    pub fn new(scene: &ManifestCamera, aspect: f32, settings: &CameraSettings) -> Self {
        let fovy = scene.fovy_degrees.to_radians();
        let cameras = Preset::ALL.map(|preset| {
            // frames are kept as recorded, including the mirrored ones
            let [position, u, v, n] = preset
                .frame()
                .map(|frame| frame.map(Vec3::from))
                .unwrap_or([scene.eye, scene.u, scene.v, scene.n]);
            Camera {
                position,
                u,
                v,
                n,
                fovy,
                aspect,
                near: settings.near,
                far: settings.far,
            }
        });
        Self { cameras }
    }

    pub fn get(&self, preset: Preset) -> Camera {
        self.cameras[preset as usize]
    }
}
