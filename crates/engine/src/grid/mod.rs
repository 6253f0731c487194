mod animation;
mod collision;
mod geometry;
mod input_intent;
mod motion;

pub use animation::{
    animation_for, AnimationIntentRouter, AnimationKind, AnimationSink, CharacterAnimation,
};
pub use collision::{
    CollisionWorld, EmptyCollisionWorld, Occupant, PointQuery, TileData, WORLD_COLLISION_LAYER,
};
pub use geometry::{Direction, GridSize, Vec2, DEFAULT_GRID_SIZE};
pub use input_intent::{DirectionalInput, InputIntent, MoveIntent, DEFAULT_HOLD_THRESHOLD_SECONDS};
pub use motion::{
    jump_offset, GridMotion, MotionConfig, MotionMode, MotionTick, RejectReason, StepOutcome,
    TargetProbe, ARRIVAL_EPSILON,
};
