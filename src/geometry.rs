use glam::{Mat4, Vec3};

use crate::{
    animation::{spider_sweep, wolf_leg, Animation, Patrol},
    proximity::PropScales,
};

pub const WOLF_ORBIT_RADIUS: f32 = 3500.0;
const TIGER_TURN_CENTRE: Vec3 = Vec3::new(4500.0, -2588.0, 0.0);
const TIGER_TURN_RADIUS: f32 = 1000.0;

/// One step of a model transform. Steps are applied in order, each one in the frame left by
/// the previous, so the order matters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Op {
    Translate(Vec3),
    /// degrees about an axis
    Rotate(f32, Vec3),
    Scale(f32),
}

pub fn compose(ops: &[Op]) -> Mat4 {
    ops.iter().fold(Mat4::IDENTITY, |acc, op| {
        acc * match *op {
            Op::Translate(offset) => Mat4::from_translation(offset),
            Op::Rotate(degrees, axis) => Mat4::from_axis_angle(axis.normalize(), degrees.to_radians()),
            Op::Scale(factor) => Mat4::from_scale(Vec3::splat(factor)),
        }
    })
}

fn rz(degrees: f32) -> Op {
    Op::Rotate(degrees, Vec3::Z)
}

fn rx(degrees: f32) -> Op {
    Op::Rotate(degrees, Vec3::X)
}

fn ry(degrees: f32) -> Op {
    Op::Rotate(degrees, Vec3::Y)
}

fn t(x: f32, y: f32, z: f32) -> Op {
    Op::Translate(Vec3::new(x, y, z))
}

pub fn tiger_body(patrol: &Patrol) -> Mat4 {
    match *patrol {
        Patrol::Turning { angle } => compose(&[
            Op::Translate(TIGER_TURN_CENTRE),
            rz(-(angle as f32)),
            t(TIGER_TURN_RADIUS, 0.0, 0.0),
            Op::Scale(2.0),
        ]),
        Patrol::Straight {
            position, heading, ..
        } => compose(&[
            t(position.x as f32, position.y as f32, 0.0),
            rz(heading as f32),
            Op::Scale(2.0),
        ]),
    }
}

/// Eye of the tiger relative to its body; `nod` tilts the head when looking through it.
pub fn tiger_eye(nod: Option<i32>) -> Mat4 {
    let mut ops = Vec::with_capacity(4);
    if let Some(angle) = nod {
        ops.push(rx(angle as f32));
    }
    ops.extend([t(0.0, -88.0, 62.0), rz(180.0), rx(90.0)]);
    compose(&ops)
}

/// World transform of the camera riding on the tiger's head.
pub fn tiger_eye_camera(animation: &Animation) -> Mat4 {
    tiger_body(&animation.patrol) * tiger_eye(Some(animation.nod.angle))
}

/// World transform of the camera trailing behind the tiger.
pub fn tiger_follow_camera(animation: &Animation) -> Mat4 {
    tiger_body(&animation.patrol) * tiger_eye(None) * compose(&[t(0.0, 80.0, 550.0)])
}

pub fn wolf(scene_clock: u32) -> Mat4 {
    let leg = wolf_leg(scene_clock);
    let pivot = leg.pivot.as_vec2().extend(0.0) * WOLF_ORBIT_RADIUS;
    compose(&[
        Op::Translate(pivot),
        rz(leg.angle),
        Op::Translate(-pivot),
        rz(leg.facing),
        Op::Scale(900.0),
        rx(90.0),
    ])
}

pub fn spider(scene_clock: u32) -> Mat4 {
    let sweep = spider_sweep(scene_clock) as f32;
    compose(&[
        rz(65.0),
        t(-250.0, -1700.0, 1950.0),
        t(sweep * 3.0, 300.0 * sweep.to_radians().sin(), 0.0),
        Op::Scale(200.0),
        rx(-90.0),
        ry(90.0),
    ])
}

pub fn optimus(scales: &PropScales) -> Mat4 {
    compose(&[t(-5000.0, -1500.0, 0.0), rz(20.0), Op::Scale(scales.optimus)])
}

pub fn godzilla(scales: &PropScales) -> Mat4 {
    compose(&[
        t(5000.0, 3000.0, 0.0),
        rz(-75.0),
        t(1000.0, 0.0, 0.0),
        Op::Scale(scales.godzilla),
        rx(90.0),
    ])
}

pub fn dragon(scales: &PropScales) -> Mat4 {
    compose(&[t(-500.0, -3000.0, 0.0), rz(90.0), Op::Scale(scales.dragon)])
}

pub fn ironman(scales: &PropScales) -> Mat4 {
    compose(&[
        t(-290.0, -50.0, 110.0),
        Op::Scale(scales.ironman),
        rz(190.0),
        rx(90.0),
    ])
}

pub fn tank(scales: &PropScales) -> Mat4 {
    compose(&[rz(-45.0), t(-1500.0, 1500.0, 0.0), Op::Scale(scales.tank)])
}

/// The cubemap is authored Y-up; the scene is Z-up.
pub fn skybox() -> Mat4 {
    let swap_yz = Mat4::from_cols_array(&[
        1.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]);
    swap_yz * Mat4::from_scale(Vec3::splat(20000.0))
}

pub const GRID_HALF_EXTENT: i32 = 100;
pub const GRID_SCALE: f32 = 100.0;
pub const AXES_SCALE: f32 = 8000.0;

/// Line list over the XY plane: `2 * GRID_HALF_EXTENT + 1` lines in each direction.
pub fn grid_lines() -> Vec<[f32; 3]> {
    let extent = GRID_HALF_EXTENT as f32;
    (-GRID_HALF_EXTENT..=GRID_HALF_EXTENT)
        .flat_map(|i| [[i as f32, -extent, 0.0], [i as f32, extent, 0.0]])
        .chain(
            (-GRID_HALF_EXTENT..=GRID_HALF_EXTENT)
                .flat_map(|i| [[-extent, i as f32, 0.0], [extent, i as f32, 0.0]]),
        )
        .collect()
}

/// Unit X, Y and Z segments, in that order, as a line list.
pub const AXES: [[f32; 3]; 6] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0],
    [0.0, 0.0, 1.0],
];

pub const AXES_COLORS: [[f32; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// 12 triangles of the unit cube, wound clockwise when seen from inside.
pub fn skybox_cube() -> Vec<[f32; 3]> {
    #[rustfmt::skip]
    const CORNERS: [[f32; 3]; 36] = [
        [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0],
        [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0],
        [-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [1.0, -1.0, -1.0],
        [1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [1.0, -1.0, 1.0],
        [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0],
        [1.0, 1.0, 1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0],
        [-1.0, 1.0, -1.0], [-1.0, -1.0, -1.0], [1.0, -1.0, -1.0],
        [1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0],
        [-1.0, -1.0, 1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0],
        [-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0], [-1.0, -1.0, 1.0],
        [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0],
        [1.0, 1.0, 1.0], [1.0, 1.0, -1.0], [1.0, -1.0, -1.0],
    ];
    CORNERS.to_vec()
}

#[cfg(test)]
mod tests {
    use glam::IVec2;

    use super::*;

    fn origin(m: Mat4) -> Vec3 {
        m.transform_point3(Vec3::ZERO)
    }

    #[test]
    fn compose_applies_in_order() {
        let translate_then_rotate = compose(&[t(10.0, 0.0, 0.0), rz(90.0)]);
        let rotate_then_translate = compose(&[rz(90.0), t(10.0, 0.0, 0.0)]);

        assert!(origin(translate_then_rotate).abs_diff_eq(Vec3::new(10.0, 0.0, 0.0), 1e-4));
        assert!(origin(rotate_then_translate).abs_diff_eq(Vec3::new(0.0, 10.0, 0.0), 1e-4));
    }

    #[test]
    fn compose_of_nothing_is_identity() {
        assert_eq!(compose(&[]), Mat4::IDENTITY);
    }

    #[test]
    fn turning_tiger_circles_its_centre() {
        for angle in [0, 90, 180, 270] {
            let position = origin(tiger_body(&Patrol::Turning { angle }));
            assert!(
                (position.distance(TIGER_TURN_CENTRE) - TIGER_TURN_RADIUS).abs() < 0.1,
                "angle {angle}: {position}"
            );
        }
        // clockwise: a quarter turn moves from +X to -Y of the centre
        let quarter = origin(tiger_body(&Patrol::Turning { angle: 90 }));
        assert!(quarter.abs_diff_eq(TIGER_TURN_CENTRE - Vec3::Y * TIGER_TURN_RADIUS, 0.1));
    }

    #[test]
    fn walking_tiger_sits_on_its_path() {
        let patrol = Patrol::Straight {
            position: IVec2::new(3000, -2000),
            delta: IVec2::new(-10, 4),
            heading: 255,
        };
        assert!(origin(tiger_body(&patrol)).abs_diff_eq(Vec3::new(3000.0, -2000.0, 0.0), 1e-3));
    }

    #[test]
    fn wolf_orbit_passes_through_leg_changes() {
        for clock in [0, 360, 720, 1080] {
            assert!(
                origin(wolf(clock)).abs_diff_eq(Vec3::ZERO, 0.5),
                "clock {clock}: {}",
                origin(wolf(clock))
            );
        }
        let far_side = origin(wolf(180));
        assert!(far_side.abs_diff_eq(Vec3::new(2.0 * WOLF_ORBIT_RADIUS, 0.0, 0.0), 0.5));
    }

    #[test]
    fn spider_oscillates_symmetrically() {
        let start = origin(spider(0));
        let middle = origin(spider(720));
        let end = origin(spider(1441));
        // the sweep is mirrored about its midpoint
        assert!((start.distance(middle) - end.distance(middle)).abs() < 1.0);
        assert!(start.distance(end) > 1000.0);
    }

    #[test]
    fn follow_camera_trails_the_eye() {
        let animation = Animation::default();
        let eye = origin(tiger_eye_camera(&animation));
        let follow = origin(tiger_follow_camera(&animation));
        // offset is scaled by the tiger body's factor of two
        assert!((eye.distance(follow) - 2.0 * Vec3::new(0.0, 80.0, 550.0).length()).abs() < 0.5);
    }

    #[test]
    fn scales_feed_prop_transforms() {
        let mut scales = PropScales::default();
        let before = godzilla(&scales);
        scales.godzilla /= 20.0;
        let after = godzilla(&scales);
        assert_eq!(origin(before), origin(after));
        assert!(
            (before.x_axis.length() / after.x_axis.length() - 20.0).abs() < 1e-3,
            "scale ratio"
        );
    }

    #[test]
    fn grid_has_both_directions() {
        let lines = grid_lines();
        assert_eq!(lines.len(), (2 * GRID_HALF_EXTENT as usize + 1) * 4);
        assert!(lines.iter().all(|v| v[2] == 0.0));
    }

    #[test]
    fn skybox_swaps_up_axis() {
        let up = skybox().transform_vector3(Vec3::Y);
        assert!(up.abs_diff_eq(Vec3::Z * 20000.0, 1e-2));
        assert_eq!(skybox_cube().len(), 36);
    }
}
