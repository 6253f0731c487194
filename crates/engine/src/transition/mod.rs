mod fade;
mod orchestrator;

pub use fade::{FadeSink, ScreenFade, CLEAR, DEFAULT_FADE_SECONDS, OPAQUE};
pub use orchestrator::{
    placement_position, ChangeLevelAck, Placement, TransitionCompleted, TransitionError,
    TransitionOrchestrator, TransitionPhase, TransitionRequest,
};
