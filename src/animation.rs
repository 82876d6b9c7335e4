//! Tick driven animation: every pose here is a pure function of the tick counters, so motion
//! speed follows the timer rate rather than wall time.

use glam::IVec2;

use crate::load::MeshId;

/// Amount the scene clock advances per tick
pub const SCENE_CLOCK_STEP: u32 = 5;

pub const PATROL_PERIOD: u32 = 1000;
/// phase at which the tiger stops circling and starts walking
pub const PATROL_TURN_END: u32 = 200;
/// phase at which the walk turns around
pub const PATROL_REVERSAL: u32 = 600;

const PATROL_START: IVec2 = IVec2::new(3200, -2150);
const PATROL_DELTA: IVec2 = IVec2::new(-10, 4);
const PATROL_OUTBOUND_HEADING: i32 = 255;
const PATROL_RETURN_HEADING: i32 = 75;

pub const WOLF_PERIOD: u32 = 1440;
pub const SPIDER_PERIOD: u32 = 1442;

/// The tiger's there-and-back patrol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Patrol {
    /// Circling a fixed point; `angle` is in degrees.
    Turning { angle: u32 },
    /// Walking `delta` per tick, facing `heading` degrees about +Z.
    Straight {
        position: IVec2,
        delta: IVec2,
        heading: i32,
    },
}

impl Default for Patrol {
    fn default() -> Self {
        Patrol::Turning { angle: 0 }
    }
}

impl Patrol {
    pub fn phase(tick: u32) -> u32 {
        tick % PATROL_PERIOD
    }

    pub fn is_turning_phase(phase: u32) -> bool {
        phase < PATROL_TURN_END
    }

    pub fn is_reversal_phase(phase: u32) -> bool {
        phase == PATROL_REVERSAL
    }

    #[cfg(test)]
    pub fn is_turning(&self) -> bool {
        matches!(self, Patrol::Turning { .. })
    }

    /// State after the tiger clock reached `tick`.
    ///
    /// The circling angle is taken from the clock before it advanced, so it trails the phase by
    /// one tick.
    #[must_use]
    pub fn step(self, tick: u32) -> Self {
        let phase = Self::phase(tick);
        if Self::is_turning_phase(phase) {
            return Patrol::Turning {
                angle: tick.saturating_sub(1) % 360,
            };
        }

        let (position, mut delta, mut heading) = match self {
            Patrol::Straight {
                position,
                delta,
                heading,
            } => (position, delta, heading),
            // every walk starts from the same spot
            Patrol::Turning { .. } => (PATROL_START, PATROL_DELTA, PATROL_OUTBOUND_HEADING),
        };
        let position = position + delta;
        if Self::is_reversal_phase(phase) {
            delta = -delta;
            heading = PATROL_RETURN_HEADING;
        }
        Patrol::Straight {
            position,
            delta,
            heading,
        }
    }
}

/// Head bob of the tiger, in whole degrees between -6 and 6.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nod {
    pub angle: i32,
    step: i32,
}

impl Default for Nod {
    fn default() -> Self {
        Self { angle: 0, step: 1 }
    }
}

impl Nod {
    pub fn advance(&mut self) {
        if self.angle.abs() > 5 {
            self.step = -self.step;
        }
        self.angle += self.step;
    }
}

pub fn frame_cursor(clock: u32, frames: usize) -> usize {
    clock as usize % frames
}

/// Selected frame for each animated mesh
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameCursors {
    pub tiger: usize,
    pub wolf: usize,
    pub spider: usize,
}

impl FrameCursors {
    pub fn get(&self, mesh: MeshId) -> usize {
        match mesh {
            MeshId::Tiger => self.tiger,
            MeshId::Wolf => self.wolf,
            MeshId::Spider => self.spider,
            _ => 0,
        }
    }
}

/// One leg of the wolf's figure-of-four loop around the map centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WolfLeg {
    /// orbit centre, in units of the orbit radius
    pub pivot: IVec2,
    /// signed orbit angle in degrees
    pub angle: f32,
    /// extra heading applied after the orbit, in degrees
    pub facing: f32,
}

pub fn wolf_leg(scene_clock: u32) -> WolfLeg {
    let clock = scene_clock % WOLF_PERIOD;
    let degrees = clock as f32;
    match clock {
        0..=360 => WolfLeg {
            pivot: IVec2::X,
            angle: degrees,
            facing: 0.0,
        },
        361..=720 => WolfLeg {
            pivot: IVec2::NEG_X,
            angle: -degrees,
            facing: 0.0,
        },
        721..=1080 => WolfLeg {
            pivot: IVec2::NEG_Y,
            angle: -degrees,
            facing: 90.0,
        },
        _ => WolfLeg {
            pivot: IVec2::Y,
            angle: degrees,
            facing: 90.0,
        },
    }
}

/// Spider sweep parameter, from -360 to 360 and back every [`SPIDER_PERIOD`] clock units
pub fn spider_sweep(scene_clock: u32) -> i32 {
    (scene_clock % SPIDER_PERIOD) as i32 / 2 - 360
}

/// Counters advanced once per timer tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    pub scene_clock: u32,
    pub tiger_clock: u32,
    pub enabled: bool,
    pub patrol: Patrol,
    pub nod: Nod,
    pub cursors: FrameCursors,
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            scene_clock: 0,
            tiger_clock: 0,
            enabled: true,
            patrol: Patrol::default(),
            nod: Nod::default(),
            cursors: FrameCursors::default(),
        }
    }
}

impl Animation {
    pub fn tick(&mut self) {
        self.cursors = FrameCursors {
            tiger: frame_cursor(self.tiger_clock, MeshId::Tiger.frame_count()),
            wolf: frame_cursor(self.scene_clock, MeshId::Wolf.frame_count()),
            spider: frame_cursor(self.scene_clock, MeshId::Spider.frame_count()),
        };
        self.scene_clock = self.scene_clock.wrapping_add(SCENE_CLOCK_STEP) % u32::MAX;
        self.nod.advance();

        // pausing freezes the tiger in place, the rest of the scene keeps moving
        if self.enabled {
            self.tiger_clock = self.tiger_clock.wrapping_add(1);
            self.patrol = self.patrol.step(self.tiger_clock);
        }
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patrol_state_follows_phase() {
        let mut patrol = Patrol::default();
        for tick in 1..=3500 {
            patrol = patrol.step(tick);
            assert_eq!(
                patrol.is_turning(),
                tick % PATROL_PERIOD < PATROL_TURN_END,
                "tick {tick}"
            );
        }
    }

    #[test]
    fn patrol_walks_out_and_back() {
        let mut patrol = Patrol::default();
        let mut tick = 0;
        while tick < PATROL_TURN_END {
            tick += 1;
            patrol = patrol.step(tick);
        }
        assert_eq!(
            patrol,
            Patrol::Straight {
                position: PATROL_START + PATROL_DELTA,
                delta: PATROL_DELTA,
                heading: PATROL_OUTBOUND_HEADING,
            }
        );

        while tick < PATROL_REVERSAL {
            tick += 1;
            patrol = patrol.step(tick);
        }
        let outbound_steps = (PATROL_REVERSAL - PATROL_TURN_END + 1) as i32;
        assert_eq!(
            patrol,
            Patrol::Straight {
                position: PATROL_START + PATROL_DELTA * outbound_steps,
                delta: -PATROL_DELTA,
                heading: PATROL_RETURN_HEADING,
            }
        );

        // the return leg is one step shorter than the walk out
        while tick < PATROL_PERIOD - 1 {
            tick += 1;
            patrol = patrol.step(tick);
        }
        let Patrol::Straight { position, .. } = patrol else {
            panic!("expected to be walking at tick {tick}");
        };
        assert_eq!(position, PATROL_START + PATROL_DELTA * 2);

        patrol = patrol.step(tick + 1);
        assert_eq!(patrol, Patrol::Turning { angle: 999 % 360 });
    }

    #[test]
    fn circling_angle_uses_clock_before_advance() {
        let mut animation = Animation::default();
        animation.tick();
        assert_eq!(animation.tiger_clock, 1);
        assert_eq!(animation.patrol, Patrol::Turning { angle: 0 });

        for _ in 0..99 {
            animation.tick();
        }
        assert_eq!(animation.patrol, Patrol::Turning { angle: 99 });
    }

    #[test]
    fn nod_bounces_between_limits() {
        let mut nod = Nod::default();
        let angles: Vec<i32> = (0..40)
            .map(|_| {
                nod.advance();
                nod.angle
            })
            .collect();
        assert_eq!(angles.iter().max(), Some(&6));
        assert_eq!(angles.iter().min(), Some(&-6));
        assert_eq!(&angles[..8], &[1, 2, 3, 4, 5, 6, 5, 4]);
    }

    #[test]
    fn frame_cursor_cycles() {
        let frames = MeshId::Wolf.frame_count();
        let cursors: Vec<_> = (0..=frames as u32).map(|t| frame_cursor(t, frames)).collect();
        assert_eq!(cursors[0], 0);
        assert_eq!(cursors[frames - 1], frames - 1);
        assert_eq!(cursors[frames], 0);
    }

    #[test]
    fn tick_updates_cursors_from_clocks() {
        let mut animation = Animation::default();
        for _ in 0..7 {
            animation.tick();
        }
        // cursors reflect the clocks before the seventh advance
        assert_eq!(animation.cursors.tiger, 6);
        assert_eq!(animation.cursors.wolf, (6 * 5) % 17);
        assert_eq!(animation.cursors.spider, (6 * 5) % 16);
        assert_eq!(animation.scene_clock, 35);
        assert_eq!(animation.tiger_clock, 7);
    }

    #[test]
    fn paused_tiger_holds_still() {
        let mut animation = Animation::default();
        for _ in 0..250 {
            animation.tick();
        }
        animation.toggle();
        let patrol = animation.patrol;
        let clock = animation.scene_clock;
        for _ in 0..50 {
            animation.tick();
        }
        assert_eq!(animation.patrol, patrol);
        assert_eq!(animation.tiger_clock, 250);
        assert_eq!(animation.scene_clock, clock + 250);

        animation.toggle();
        animation.tick();
        assert_ne!(animation.patrol, patrol);
    }

    #[test]
    fn scene_clock_wraps() {
        let mut animation = Animation {
            scene_clock: u32::MAX - 3,
            ..Animation::default()
        };
        animation.tick();
        assert!(animation.scene_clock < 5);
    }

    #[test]
    fn wolf_legs_cover_the_period() {
        assert_eq!(wolf_leg(0).pivot, IVec2::X);
        assert_eq!(wolf_leg(360).pivot, IVec2::X);
        assert_eq!(wolf_leg(361).pivot, IVec2::NEG_X);
        assert_eq!(wolf_leg(900).pivot, IVec2::NEG_Y);
        assert_eq!(wolf_leg(900).facing, 90.0);
        assert_eq!(wolf_leg(1439).pivot, IVec2::Y);
        assert_eq!(wolf_leg(1440), wolf_leg(0));
    }

    #[test]
    fn spider_sweeps_back_and_forth() {
        assert_eq!(spider_sweep(0), -360);
        assert_eq!(spider_sweep(1441), 360);
        assert_eq!(spider_sweep(SPIDER_PERIOD), -360);
    }
}
