mod renderer;
mod transform;

pub use renderer::{FrameView, Renderer};
pub use transform::{world_to_screen, Camera2D, Viewport};
