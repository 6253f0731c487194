mod input;
mod loop_runner;
mod rendering;

pub use input::{InputAction, InputSnapshot};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use rendering::{world_to_screen, Camera2D, FrameView, Renderer, Viewport};
