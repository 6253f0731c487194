use tracing::{debug, info};

use crate::app::{Camera2D, Viewport};
use crate::grid::{
    AnimationIntentRouter, AnimationKind, AnimationSink, CharacterAnimation, Direction,
    DirectionalInput, EmptyCollisionWorld, GridMotion, GridSize, InputIntent, MotionConfig,
    MoveIntent, Vec2, DEFAULT_GRID_SIZE, DEFAULT_HOLD_THRESHOLD_SECONDS,
};
use crate::level::{Level, LevelId, LevelLoader, LevelRegistry};
use crate::transition::{
    ChangeLevelAck, FadeSink, ScreenFade, TransitionCompleted, TransitionError,
    TransitionOrchestrator, TransitionRequest, DEFAULT_FADE_SECONDS,
};

#[derive(Debug, Clone, PartialEq)]
pub struct OverworldConfig {
    pub grid_size: u32,
    pub hold_threshold_seconds: f32,
    pub walk_speed_tiles_per_second: f32,
    pub jump_height: f32,
    pub jump_lerp_speed: f32,
    pub fade_seconds: f32,
    pub start_level: LevelId,
    /// Visible area in world units; the camera clamps against it.
    pub view_width: u32,
    pub view_height: u32,
}

impl Default for OverworldConfig {
    fn default() -> Self {
        let motion = MotionConfig::default();
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            hold_threshold_seconds: DEFAULT_HOLD_THRESHOLD_SECONDS,
            walk_speed_tiles_per_second: motion.walk_speed_tiles_per_second,
            jump_height: motion.jump_height,
            jump_lerp_speed: motion.jump_lerp_speed,
            fade_seconds: DEFAULT_FADE_SECONDS,
            start_level: LevelId::default(),
            view_width: 240,
            view_height: 160,
        }
    }
}

impl OverworldConfig {
    pub fn grid(&self) -> GridSize {
        GridSize::new(self.grid_size)
    }

    pub fn motion(&self) -> MotionConfig {
        MotionConfig {
            grid: self.grid(),
            walk_speed_tiles_per_second: self.walk_speed_tiles_per_second,
            jump_height: self.jump_height,
            jump_lerp_speed: self.jump_lerp_speed,
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.view_width.max(1),
            height: self.view_height.max(1),
        }
    }
}

/// The player-facing world: one actor walking around whichever level is active.
///
/// Owns every piece of per-session state and advances it one fixed tick at a time.
/// Each tick runs, in order: fade, input intent, motion, idle animation, scene
/// trigger entry, level transition, camera.
pub struct Overworld<L, F = ScreenFade> {
    config: OverworldConfig,
    actor: GridMotion,
    intent: InputIntent,
    animations: AnimationIntentRouter,
    registry: LevelRegistry<L>,
    orchestrator: TransitionOrchestrator,
    fade: F,
    camera: Camera2D,
    camera_level: Option<LevelId>,
    last_cell: Option<(i32, i32)>,
}

impl<L: LevelLoader> Overworld<L, ScreenFade> {
    pub fn new(config: OverworldConfig, loader: L) -> Self {
        Self::with_fade(config, loader, ScreenFade::default())
    }
}

impl<L: LevelLoader, F: FadeSink> Overworld<L, F> {
    pub fn with_fade(config: OverworldConfig, loader: L, fade: F) -> Self {
        let actor = GridMotion::new(config.motion(), Vec2::ZERO);
        Self {
            intent: InputIntent::new(config.hold_threshold_seconds),
            animations: AnimationIntentRouter::default(),
            registry: LevelRegistry::new(loader),
            orchestrator: TransitionOrchestrator::new(config.fade_seconds),
            fade,
            camera: Camera2D::default(),
            camera_level: None,
            last_cell: None,
            actor,
            config,
        }
    }

    pub fn config(&self) -> &OverworldConfig {
        &self.config
    }

    pub fn actor(&self) -> &GridMotion {
        &self.actor
    }

    pub fn registry(&self) -> &LevelRegistry<L> {
        &self.registry
    }

    pub fn active_level(&self) -> Option<&Level> {
        self.registry.active_level()
    }

    pub fn orchestrator(&self) -> &TransitionOrchestrator {
        &self.orchestrator
    }

    pub fn is_changing(&self) -> bool {
        self.orchestrator.is_changing()
    }

    pub fn fade(&self) -> &F {
        &self.fade
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn current_animation(&self) -> CharacterAnimation {
        self.animations.current()
    }

    /// Spawns the actor into the configured start level.
    pub fn start(&mut self) -> ChangeLevelAck {
        info!(level = %self.config.start_level, "overworld_start");
        self.change_level(TransitionRequest::spawn(self.config.start_level))
    }

    pub fn change_level(&mut self, request: TransitionRequest) -> ChangeLevelAck {
        self.orchestrator.change_level(request)
    }

    pub fn tick(
        &mut self,
        dt_seconds: f32,
        input: DirectionalInput,
        animations: &mut dyn AnimationSink,
    ) -> Result<Option<TransitionCompleted>, TransitionError> {
        self.fade.advance(dt_seconds);

        for intent in self.intent.update(input, dt_seconds, self.actor.is_moving()) {
            self.apply_intent(intent, animations);
        }

        self.actor.tick(dt_seconds);

        if !self.actor.is_moving() && !input.any_held {
            let direction = self.intent.direction();
            self.play(AnimationKind::Idle, direction, animations);
        }

        self.detect_trigger_entry();

        let before = self.actor.position();
        let outcome = self
            .orchestrator
            .tick(&mut self.registry, &mut self.actor, &mut self.fade);
        if self.actor.position() != before {
            // Placed by a transition: the landing cell is not an entry.
            self.last_cell = Some(self.config.grid().cell_of(self.actor.position()));
        }

        self.update_camera();
        outcome
    }

    fn apply_intent(&mut self, intent: MoveIntent, animations: &mut dyn AnimationSink) {
        match intent {
            MoveIntent::Walk(direction) => {
                let transition_active = self.orchestrator.is_changing();
                let outcome = match self.registry.active_level() {
                    Some(level) => self.actor.request_step(direction, level, transition_active),
                    None => {
                        self.actor
                            .request_step(direction, &EmptyCollisionWorld, transition_active)
                    }
                };
                if outcome.is_accepted() {
                    self.play(AnimationKind::Walk, Some(direction), animations);
                } else {
                    debug!(direction = %direction, outcome = ?outcome, "step_rejected");
                }
            }
            MoveIntent::Turn(direction) => {
                if self.actor.can_turn() {
                    self.play(AnimationKind::Turn, Some(direction), animations);
                }
            }
        }
    }

    fn play(
        &mut self,
        kind: AnimationKind,
        direction: Option<Direction>,
        animations: &mut dyn AnimationSink,
    ) {
        if let Some(animation) = self.animations.route(kind, direction) {
            animations.play(animation);
        }
    }

    /// Entries during a running transition queue behind it.
    fn detect_trigger_entry(&mut self) {
        let cell = self.config.grid().cell_of(self.actor.ground_position());
        if self.last_cell.replace(cell) == Some(cell) {
            return;
        }

        let Some(trigger) = self
            .registry
            .active_level()
            .and_then(|level| level.trigger_at_cell(cell))
        else {
            return;
        };
        info!(
            trigger = trigger.trigger,
            target = %trigger.target_level,
            target_trigger = trigger.target_trigger,
            "scene_trigger_entered"
        );
        let request = trigger.activate();
        let ack = self.orchestrator.change_level(request);
        debug!(ack = ?ack, "scene_trigger_request");
    }

    fn update_camera(&mut self) {
        if let Some(level) = self.registry.active_level() {
            if self.camera_level != Some(level.id()) {
                self.camera.set_limits(level.camera_bounds());
                self.camera_level = Some(level.id());
                debug!(level = %level.id(), "camera_limits_updated");
            }
        }
        let half = self.config.grid().half();
        let focus = self.actor.position() + Vec2::new(half, half);
        self.camera.follow(focus, self.config.viewport());
    }
}
