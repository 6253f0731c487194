use tracing::debug;

use super::collision::{CollisionWorld, Occupant, PointQuery, TileData};
use super::geometry::{Direction, GridSize, Vec2};

/// Distance under which a walking actor counts as arrived.
pub const ARRIVAL_EPSILON: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionConfig {
    pub grid: GridSize,
    pub walk_speed_tiles_per_second: f32,
    pub jump_height: f32,
    pub jump_lerp_speed: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            grid: GridSize::default(),
            walk_speed_tiles_per_second: 4.0,
            jump_height: 10.0,
            jump_lerp_speed: 2.0,
        }
    }
}

impl MotionConfig {
    pub fn walk_speed(&self) -> f32 {
        self.grid.as_f32() * self.walk_speed_tiles_per_second
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MotionMode {
    #[default]
    Idle,
    Walking,
    Jumping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    AlreadyMoving,
    TransitionActive,
    TargetOccupied,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    Walking { target: Vec2 },
    Jumping { target: Vec2 },
    Rejected(RejectReason),
}

impl StepOutcome {
    pub fn is_accepted(&self) -> bool {
        !matches!(self, StepOutcome::Rejected(_))
    }
}

/// How the cell one tile ahead answers a step in a given direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetProbe {
    Free,
    Blocked,
    /// One-way ledge facing the step direction; the step becomes a two-tile jump.
    Ledge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionTick {
    Idle,
    Moving,
    Arrived,
}

/// Discrete-step movement for one actor: `Idle -> Walking|Jumping -> Idle`.
#[derive(Debug, Clone)]
pub struct GridMotion {
    config: MotionConfig,
    position: Vec2,
    mode: MotionMode,
    origin: Vec2,
    target: Vec2,
    progress: f32,
}

impl GridMotion {
    pub fn new(config: MotionConfig, position: Vec2) -> Self {
        let position = config.grid.snap(position);
        Self {
            config,
            position,
            mode: MotionMode::Idle,
            origin: position,
            target: position,
            progress: 0.0,
        }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Position on the ground plane, without the jump arc's upward offset.
    pub fn ground_position(&self) -> Vec2 {
        match self.mode {
            MotionMode::Jumping => self.origin.lerp(self.target, self.progress.min(1.0)),
            _ => self.position,
        }
    }

    pub fn mode(&self) -> MotionMode {
        self.mode
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_moving(&self) -> bool {
        self.mode != MotionMode::Idle
    }

    /// Turning in place is only possible between steps.
    pub fn can_turn(&self) -> bool {
        !self.is_moving()
    }

    pub fn request_step(
        &mut self,
        direction: Direction,
        collision: &dyn CollisionWorld,
        transition_active: bool,
    ) -> StepOutcome {
        if transition_active {
            return StepOutcome::Rejected(RejectReason::TransitionActive);
        }
        if self.is_moving() {
            return StepOutcome::Rejected(RejectReason::AlreadyMoving);
        }

        let grid = self.config.grid.as_f32();
        let one_tile = self.position + direction.unit() * grid;
        match self.probe_target(one_tile, direction, collision) {
            TargetProbe::Blocked => StepOutcome::Rejected(RejectReason::TargetOccupied),
            TargetProbe::Free => {
                self.origin = self.position;
                self.target = one_tile;
                self.mode = MotionMode::Walking;
                debug!(from = %self.origin, to = %self.target, "step_walk");
                StepOutcome::Walking {
                    target: self.target,
                }
            }
            TargetProbe::Ledge => {
                self.origin = self.position;
                self.target = self.position + direction.unit() * (grid * 2.0);
                self.progress = 0.0;
                self.mode = MotionMode::Jumping;
                debug!(from = %self.origin, to = %self.target, "step_jump");
                StepOutcome::Jumping {
                    target: self.target,
                }
            }
        }
    }

    /// Samples the backend at the centre of the tile whose corner is `target`.
    pub fn probe_target(
        &self,
        target: Vec2,
        direction: Direction,
        collision: &dyn CollisionWorld,
    ) -> TargetProbe {
        let half = self.config.grid.half();
        let sample = Vec2::new(target.x + half, target.y + half);
        let hits = collision.intersect_point(sample, PointQuery::default());
        match hits.first() {
            None => TargetProbe::Free,
            Some(occupant) => classify_occupant(occupant, direction),
        }
    }

    pub fn is_target_occupied(
        &self,
        target: Vec2,
        direction: Direction,
        collision: &dyn CollisionWorld,
    ) -> bool {
        self.probe_target(target, direction, collision) == TargetProbe::Blocked
    }

    pub fn tick(&mut self, dt_seconds: f32) -> MotionTick {
        match self.mode {
            MotionMode::Idle => MotionTick::Idle,
            MotionMode::Walking => {
                let max_delta = dt_seconds * self.config.walk_speed();
                self.position = self.position.move_toward(self.target, max_delta);
                if self.position.distance_to(self.target) < ARRIVAL_EPSILON {
                    self.stop_moving();
                    MotionTick::Arrived
                } else {
                    MotionTick::Moving
                }
            }
            MotionMode::Jumping => {
                self.progress += self.config.jump_lerp_speed * dt_seconds;
                let mut position = self.origin.lerp(self.target, self.progress);
                position.y -= jump_offset(self.config.jump_height, self.progress);
                self.position = position;
                if self.progress >= 1.0 {
                    self.stop_moving();
                    MotionTick::Arrived
                } else {
                    MotionTick::Moving
                }
            }
        }
    }

    /// Drops any step in flight and stands the actor on the cell at `position`.
    pub fn place_at(&mut self, position: Vec2) {
        let position = self.config.grid.snap(position);
        self.position = position;
        self.origin = position;
        self.target = position;
        self.progress = 0.0;
        self.mode = MotionMode::Idle;
    }

    fn stop_moving(&mut self) {
        self.mode = MotionMode::Idle;
        self.progress = 0.0;
        self.position = self.config.grid.snap(self.target);
        self.origin = self.position;
    }
}

/// Upward arc height at `progress`: zero at both ends, `jump_height` at the midpoint.
pub fn jump_offset(jump_height: f32, progress: f32) -> f32 {
    let centred = progress - 0.5;
    jump_height * (1.0 - 4.0 * centred * centred)
}

fn classify_occupant(occupant: &Occupant, direction: Direction) -> TargetProbe {
    match occupant {
        Occupant::SceneTrigger { .. } => TargetProbe::Free,
        Occupant::Tile(Some(TileData {
            ledge: Some(ledge),
        })) if *ledge == direction => TargetProbe::Ledge,
        Occupant::Tile(_) | Occupant::Body => TargetProbe::Blocked,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[derive(Default)]
    struct CellMap {
        cells: HashMap<(i32, i32), Occupant>,
    }

    impl CellMap {
        fn with(mut self, cell: (i32, i32), occupant: Occupant) -> Self {
            self.cells.insert(cell, occupant);
            self
        }
    }

    impl CollisionWorld for CellMap {
        fn intersect_point(&self, point: Vec2, _query: PointQuery) -> Vec<Occupant> {
            let cell = ((point.x / 16.0).floor() as i32, (point.y / 16.0).floor() as i32);
            self.cells.get(&cell).copied().into_iter().collect()
        }
    }

    fn ledge(direction: Direction) -> Occupant {
        Occupant::Tile(Some(TileData {
            ledge: Some(direction),
        }))
    }

    fn run_until_idle(motion: &mut GridMotion, dt: f32) -> usize {
        let mut ticks = 0;
        while motion.tick(dt) != MotionTick::Arrived {
            ticks += 1;
            assert!(ticks < 1_000, "motion never arrived");
        }
        ticks + 1
    }

    #[test]
    fn walk_step_snaps_to_target_and_returns_to_idle() {
        let mut motion = GridMotion::new(MotionConfig::default(), Vec2::ZERO);
        let outcome = motion.request_step(Direction::Right, &CellMap::default(), false);

        assert_eq!(
            outcome,
            StepOutcome::Walking {
                target: Vec2::new(16.0, 0.0)
            }
        );
        assert_eq!(motion.mode(), MotionMode::Walking);
        assert_eq!(motion.target(), Vec2::new(16.0, 0.0));

        motion.tick(0.1);
        assert!((motion.position().x - 6.4).abs() < 1e-4);

        run_until_idle(&mut motion, 1.0 / 60.0);
        assert_eq!(motion.position(), Vec2::new(16.0, 0.0));
        assert_eq!(motion.mode(), MotionMode::Idle);
    }

    #[test]
    fn walk_speed_is_four_tiles_per_second() {
        let motion = GridMotion::new(MotionConfig::default(), Vec2::ZERO);
        assert_eq!(motion.config().walk_speed(), 64.0);
    }

    #[test]
    fn ledge_facing_step_direction_becomes_two_tile_jump() {
        let collision = CellMap::default().with((1, 0), ledge(Direction::Right));
        let mut motion = GridMotion::new(MotionConfig::default(), Vec2::ZERO);

        let outcome = motion.request_step(Direction::Right, &collision, false);
        assert_eq!(
            outcome,
            StepOutcome::Jumping {
                target: Vec2::new(32.0, 0.0)
            }
        );
        assert_eq!(motion.mode(), MotionMode::Jumping);
        assert_eq!(motion.progress(), 0.0);
        assert_eq!(motion.origin(), Vec2::ZERO);

        // lerp speed 2.0 -> progress 0.5 after a quarter second: the arc peak.
        assert_eq!(motion.tick(0.25), MotionTick::Moving);
        assert_eq!(motion.progress(), 0.5);
        assert_eq!(motion.position(), Vec2::new(16.0, -10.0));
        assert_eq!(motion.ground_position(), Vec2::new(16.0, 0.0));

        assert_eq!(motion.tick(0.25), MotionTick::Arrived);
        assert_eq!(motion.position(), Vec2::new(32.0, 0.0));
        assert_eq!(motion.mode(), MotionMode::Idle);
    }

    #[test]
    fn jump_escalation_is_one_shot() {
        let collision = CellMap::default().with((2, 0), ledge(Direction::Right));
        let mut motion = GridMotion::new(MotionConfig::default(), Vec2::new(16.0, 0.0));

        assert!(matches!(
            motion.request_step(Direction::Right, &collision, false),
            StepOutcome::Jumping { .. }
        ));
        run_until_idle(&mut motion, 1.0 / 60.0);
        assert_eq!(motion.position(), Vec2::new(48.0, 0.0));

        let outcome = motion.request_step(Direction::Right, &collision, false);
        assert_eq!(
            outcome,
            StepOutcome::Walking {
                target: Vec2::new(64.0, 0.0)
            }
        );
    }

    #[test]
    fn ledge_approached_from_other_direction_blocks() {
        let collision = CellMap::default().with((1, 0), ledge(Direction::Down));
        let mut motion = GridMotion::new(MotionConfig::default(), Vec2::ZERO);

        let outcome = motion.request_step(Direction::Right, &collision, false);
        assert_eq!(
            outcome,
            StepOutcome::Rejected(RejectReason::TargetOccupied)
        );
        assert_eq!(motion.mode(), MotionMode::Idle);
        assert_eq!(motion.position(), Vec2::ZERO);
    }

    #[test]
    fn blocking_occupants_reject_without_side_effects() {
        let collision = CellMap::default()
            .with((1, 0), Occupant::Tile(None))
            .with((0, 1), Occupant::Tile(Some(TileData::default())))
            .with((-1, 0), Occupant::Body);
        let mut motion = GridMotion::new(MotionConfig::default(), Vec2::ZERO);

        for direction in [Direction::Right, Direction::Down, Direction::Left] {
            let outcome = motion.request_step(direction, &collision, false);
            assert_eq!(
                outcome,
                StepOutcome::Rejected(RejectReason::TargetOccupied)
            );
            assert_eq!(motion.mode(), MotionMode::Idle);
            assert_eq!(motion.position(), Vec2::ZERO);
        }
    }

    #[test]
    fn scene_trigger_never_blocks() {
        let collision = CellMap::default().with((0, -1), Occupant::SceneTrigger { trigger: 0 });
        let mut motion = GridMotion::new(MotionConfig::default(), Vec2::ZERO);

        assert!(!motion.is_target_occupied(Vec2::new(0.0, -16.0), Direction::Up, &collision));
        assert!(motion.request_step(Direction::Up, &collision, false).is_accepted());
    }

    #[test]
    fn steps_are_rejected_while_moving_or_transitioning() {
        let collision = CellMap::default();
        let mut motion = GridMotion::new(MotionConfig::default(), Vec2::ZERO);

        assert_eq!(
            motion.request_step(Direction::Down, &collision, true),
            StepOutcome::Rejected(RejectReason::TransitionActive)
        );
        assert_eq!(motion.mode(), MotionMode::Idle);

        assert!(motion.request_step(Direction::Down, &collision, false).is_accepted());
        assert_eq!(
            motion.request_step(Direction::Left, &collision, false),
            StepOutcome::Rejected(RejectReason::AlreadyMoving)
        );
        assert_eq!(motion.target(), Vec2::new(0.0, 16.0));
        assert!(!motion.can_turn());
    }

    #[test]
    fn idle_positions_stay_grid_aligned() {
        let collision = CellMap::default().with((2, 1), ledge(Direction::Down));
        let mut motion = GridMotion::new(MotionConfig::default(), Vec2::new(32.0, 0.0));
        let grid = motion.config().grid;
        let script = [
            Direction::Down,
            Direction::Left,
            Direction::Up,
            Direction::Right,
            Direction::Right,
            Direction::Down,
        ];

        for direction in script {
            if motion.request_step(direction, &collision, false).is_accepted() {
                run_until_idle(&mut motion, 0.013);
            }
            assert!(grid.is_aligned(motion.position()), "{}", motion.position());
        }
    }

    #[test]
    fn jump_offset_peaks_at_midpoint() {
        assert_eq!(jump_offset(10.0, 0.0), 0.0);
        assert_eq!(jump_offset(10.0, 1.0), 0.0);
        assert_eq!(jump_offset(10.0, 0.5), 10.0);
        assert!(jump_offset(10.0, 0.25) < 10.0);
    }

    #[test]
    fn place_at_resets_motion() {
        let mut motion = GridMotion::new(MotionConfig::default(), Vec2::ZERO);
        motion.request_step(Direction::Right, &CellMap::default(), false);
        motion.tick(0.05);

        motion.place_at(Vec2::new(32.0, 48.0));
        assert_eq!(motion.mode(), MotionMode::Idle);
        assert_eq!(motion.position(), Vec2::new(32.0, 48.0));
        assert_eq!(motion.tick(0.5), MotionTick::Idle);
    }
}
