use std::collections::VecDeque;

use thiserror::Error;
use tracing::{error, info};

use crate::grid::{GridMotion, Vec2};
use crate::level::{Level, LevelId, LevelLoadError, LevelLoader, LevelRegistry};

use super::fade::{FadeSink, CLEAR, DEFAULT_FADE_SECONDS, OPAQUE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// First spawn point of the target level.
    Spawn,
    /// One tile past the scene trigger with this index, along its entry direction.
    Trigger(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRequest {
    pub level: LevelId,
    pub placement: Placement,
}

impl TransitionRequest {
    pub fn new(level: LevelId, trigger: u32, spawn: bool) -> Self {
        let placement = if spawn {
            Placement::Spawn
        } else {
            Placement::Trigger(trigger)
        };
        Self { level, placement }
    }

    pub fn spawn(level: LevelId) -> Self {
        Self::new(level, 0, true)
    }

    pub fn resume_at(level: LevelId, trigger: u32) -> Self {
        Self::new(level, trigger, false)
    }
}

#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("level {level} has no spawn points")]
    MissingSpawnPoints { level: LevelId },
    #[error("level {level} has no scene triggers")]
    MissingSceneTriggers { level: LevelId },
    #[error("level {level} has no scene trigger with index {trigger}")]
    MissingSceneTrigger { level: LevelId, trigger: u32 },
    #[error("failed to load level {level}: {source}")]
    Load {
        level: LevelId,
        #[source]
        source: LevelLoadError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeLevelAck {
    Started,
    /// Waiting behind the running transition; `position` is 1-based.
    Queued { position: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionCompleted {
    pub request: TransitionRequest,
    pub position: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    Idle,
    Starting,
    FadingOut,
    Loading,
    FadingIn,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Starting(TransitionRequest),
    FadingOut(TransitionRequest),
    Loading(TransitionRequest),
    FadingIn {
        request: TransitionRequest,
        position: Vec2,
    },
}

/// Serialises level changes: fade out, swap levels, place the actor, fade in.
///
/// The guard is taken synchronously inside [`TransitionOrchestrator::change_level`], so two
/// requests issued in the same tick can never both see it free. Later requests wait in
/// FIFO order and inherit the guard when the running transition ends.
#[derive(Debug)]
pub struct TransitionOrchestrator {
    is_changing: bool,
    phase: Phase,
    pending: VecDeque<TransitionRequest>,
    fade_seconds: f32,
}

impl Default for TransitionOrchestrator {
    fn default() -> Self {
        Self::new(DEFAULT_FADE_SECONDS)
    }
}

impl TransitionOrchestrator {
    pub fn new(fade_seconds: f32) -> Self {
        Self {
            is_changing: false,
            phase: Phase::Idle,
            pending: VecDeque::new(),
            fade_seconds,
        }
    }

    pub fn is_changing(&self) -> bool {
        self.is_changing
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn phase(&self) -> TransitionPhase {
        match self.phase {
            Phase::Idle => TransitionPhase::Idle,
            Phase::Starting(_) => TransitionPhase::Starting,
            Phase::FadingOut(_) => TransitionPhase::FadingOut,
            Phase::Loading(_) => TransitionPhase::Loading,
            Phase::FadingIn { .. } => TransitionPhase::FadingIn,
        }
    }

    pub fn change_level(&mut self, request: TransitionRequest) -> ChangeLevelAck {
        if self.is_changing {
            self.pending.push_back(request);
            info!(
                level = %request.level,
                placement = ?request.placement,
                queue_len = self.pending.len(),
                "transition_queued"
            );
            return ChangeLevelAck::Queued {
                position: self.pending.len(),
            };
        }

        self.is_changing = true;
        self.phase = Phase::Starting(request);
        info!(level = %request.level, placement = ?request.placement, "transition_started");
        ChangeLevelAck::Started
    }

    /// Advances the running transition until it has to wait on the fade or finishes.
    ///
    /// A failed transition is abandoned: the actor keeps its position and the guard
    /// passes to the next queued request, if any.
    pub fn tick<L: LevelLoader>(
        &mut self,
        registry: &mut LevelRegistry<L>,
        actor: &mut GridMotion,
        fade: &mut dyn FadeSink,
    ) -> Result<Option<TransitionCompleted>, TransitionError> {
        loop {
            match std::mem::replace(&mut self.phase, Phase::Idle) {
                Phase::Idle => return Ok(None),
                Phase::Starting(request) => {
                    if registry.active_id().is_some() {
                        fade.start_fade(OPAQUE, self.fade_seconds);
                        self.phase = Phase::FadingOut(request);
                    } else {
                        self.phase = Phase::Loading(request);
                    }
                }
                Phase::FadingOut(request) => {
                    if !fade.is_complete() {
                        self.phase = Phase::FadingOut(request);
                        return Ok(None);
                    }
                    registry.deactivate();
                    self.phase = Phase::Loading(request);
                }
                Phase::Loading(request) => match enter_level(request, registry) {
                    Ok(position) => {
                        actor.place_at(position);
                        fade.start_fade(CLEAR, self.fade_seconds);
                        self.phase = Phase::FadingIn { request, position };
                    }
                    Err(err) => {
                        error!(level = %request.level, error = %err, "transition_aborted");
                        self.release_guard();
                        return Err(err);
                    }
                },
                Phase::FadingIn { request, position } => {
                    if !fade.is_complete() {
                        self.phase = Phase::FadingIn { request, position };
                        return Ok(None);
                    }
                    info!(level = %request.level, position = %position, "transition_completed");
                    self.release_guard();
                    return Ok(Some(TransitionCompleted { request, position }));
                }
            }
        }
    }

    fn release_guard(&mut self) {
        match self.pending.pop_front() {
            Some(next) => {
                self.phase = Phase::Starting(next);
                info!(level = %next.level, placement = ?next.placement, "transition_started");
            }
            None => {
                self.phase = Phase::Idle;
                self.is_changing = false;
            }
        }
    }
}

fn enter_level<L: LevelLoader>(
    request: TransitionRequest,
    registry: &mut LevelRegistry<L>,
) -> Result<Vec2, TransitionError> {
    let placement = {
        let level = registry
            .get_or_load(request.level)
            .map_err(|source| TransitionError::Load {
                level: request.level,
                source,
            })?;
        placement_position(level, request.placement)
    };
    registry
        .activate(request.level)
        .map_err(|source| TransitionError::Load {
            level: request.level,
            source,
        })?;
    placement
}

pub fn placement_position(level: &Level, placement: Placement) -> Result<Vec2, TransitionError> {
    match placement {
        Placement::Spawn => level
            .spawn_points()
            .first()
            .map(|spawn| spawn.position)
            .ok_or(TransitionError::MissingSpawnPoints { level: level.id() }),
        Placement::Trigger(trigger) => {
            if level.scene_triggers().is_empty() {
                return Err(TransitionError::MissingSceneTriggers { level: level.id() });
            }
            level
                .find_trigger(trigger)
                .map(|anchor| anchor.entry_position(level.grid()))
                .ok_or(TransitionError::MissingSceneTrigger {
                    level: level.id(),
                    trigger,
                })
        }
    }
}
