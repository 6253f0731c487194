use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use tracing::debug;
use winit::window::Window;

use crate::grid::{AnimationKind, AnimationSink, CharacterAnimation, Direction, TileData, Vec2};
use crate::level::Level;

use super::transform::{world_to_screen, Camera2D, Viewport};

const CLEAR_COLOR: [u8; 4] = [20, 22, 28, 255];
const GROUND_COLOR: [u8; 4] = [96, 148, 80, 255];
const SOLID_TILE_COLOR: [u8; 4] = [58, 72, 58, 255];
const LEDGE_TILE_COLOR: [u8; 4] = [150, 122, 82, 255];
const LEDGE_LIP_COLOR: [u8; 4] = [98, 76, 50, 255];
const OBSTACLE_COLOR: [u8; 4] = [92, 82, 112, 255];
const TRIGGER_COLOR: [u8; 4] = [232, 200, 72, 255];
const LOCKED_TRIGGER_COLOR: [u8; 4] = [200, 84, 80, 255];
const ACTOR_IDLE_COLOR: [u8; 4] = [220, 220, 240, 255];
const ACTOR_WALK_COLOR: [u8; 4] = [250, 250, 255, 255];
const ACTOR_TURN_COLOR: [u8; 4] = [190, 214, 255, 255];
const ACTOR_FACING_COLOR: [u8; 4] = [36, 40, 64, 255];
const ACTOR_INSET_PX: i32 = 2;
const FACING_MARK_PX: i32 = 3;

/// Everything the renderer needs from the overworld for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub level: Option<&'a Level>,
    pub camera: &'a Camera2D,
    pub actor_position: Vec2,
    pub fade_opacity: f32,
}

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
    animation: CharacterAnimation,
}

impl Renderer {
    /// `viewport` is the size of the world-space frame buffer; it is scaled to fill the window.
    pub fn new(window: Arc<Window>, viewport: Viewport) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), viewport, size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport,
            animation: CharacterAnimation::default(),
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn animation(&self) -> CharacterAnimation {
        self.animation
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), self.viewport, width, height)?;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        viewport: Viewport,
        surface_width: u32,
        surface_height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(surface_width, surface_height, window);
        Pixels::new(viewport.width, viewport.height, surface)
    }

    pub fn render_frame(&mut self, view: FrameView<'_>) -> Result<(), Error> {
        draw_frame(self.pixels.frame_mut(), self.viewport, &view, self.animation);
        self.pixels.render()
    }
}

impl AnimationSink for Renderer {
    fn play(&mut self, animation: CharacterAnimation) {
        debug!(animation = animation.name(), "animation_played");
        self.animation = animation;
    }
}

fn draw_frame(
    frame: &mut [u8],
    viewport: Viewport,
    view: &FrameView<'_>,
    animation: CharacterAnimation,
) {
    fill(frame, CLEAR_COLOR);
    if let Some(level) = view.level {
        draw_level(frame, viewport, view.camera, level);
        draw_actor(
            frame,
            viewport,
            view.camera,
            view.actor_position,
            level.grid().get() as i32,
            animation,
        );
    }
    apply_fade(frame, view.fade_opacity);
}

fn draw_level(frame: &mut [u8], viewport: Viewport, camera: &Camera2D, level: &Level) {
    let grid = level.grid();
    let size = grid.get() as i32;
    let tiles = level.tiles();

    let (left, top) = world_to_screen(Vec2::ZERO, camera, viewport);
    fill_rect(
        frame,
        viewport,
        left,
        top,
        tiles.width() as i32 * size,
        tiles.height() as i32 * size,
        GROUND_COLOR,
    );

    for y in 0..tiles.height() as i32 {
        for x in 0..tiles.width() as i32 {
            let Some(tile) = tiles.tile_at(x, y) else {
                continue;
            };
            let (sx, sy) = world_to_screen(grid.cell_origin((x, y)), camera, viewport);
            draw_tile(frame, viewport, sx, sy, size, tile);
        }
    }

    for cell in level.obstacles() {
        let (sx, sy) = world_to_screen(grid.cell_origin(*cell), camera, viewport);
        fill_rect(frame, viewport, sx, sy, size, size, OBSTACLE_COLOR);
    }

    for trigger in level.scene_triggers() {
        let (sx, sy) = world_to_screen(trigger.position, camera, viewport);
        let color = if trigger.locked {
            LOCKED_TRIGGER_COLOR
        } else {
            TRIGGER_COLOR
        };
        fill_rect(frame, viewport, sx, sy, size, size, color);
    }
}

fn draw_tile(frame: &mut [u8], viewport: Viewport, x: i32, y: i32, size: i32, tile: TileData) {
    let Some(ledge) = tile.ledge else {
        fill_rect(frame, viewport, x, y, size, size, SOLID_TILE_COLOR);
        return;
    };
    fill_rect(frame, viewport, x, y, size, size, LEDGE_TILE_COLOR);
    let lip = (size / 4).max(1);
    let (lx, ly, lw, lh) = edge_strip(x, y, size, lip, ledge);
    fill_rect(frame, viewport, lx, ly, lw, lh, LEDGE_LIP_COLOR);
}

fn draw_actor(
    frame: &mut [u8],
    viewport: Viewport,
    camera: &Camera2D,
    position: Vec2,
    size: i32,
    animation: CharacterAnimation,
) {
    let (sx, sy) = world_to_screen(position, camera, viewport);
    let body = (size - ACTOR_INSET_PX * 2).max(1);
    let color = match animation.kind() {
        AnimationKind::Walk => ACTOR_WALK_COLOR,
        AnimationKind::Turn => ACTOR_TURN_COLOR,
        AnimationKind::Idle => ACTOR_IDLE_COLOR,
    };
    let (bx, by) = (sx + ACTOR_INSET_PX, sy + ACTOR_INSET_PX);
    fill_rect(frame, viewport, bx, by, body, body, color);

    let mark = FACING_MARK_PX.min(body);
    let (fx, fy, fw, fh) = edge_strip(bx, by, body, mark, animation.facing());
    fill_rect(frame, viewport, fx, fy, fw, fh, ACTOR_FACING_COLOR);
}

/// Strip of `thickness` along the side of a square facing `direction`.
fn edge_strip(x: i32, y: i32, size: i32, thickness: i32, direction: Direction) -> (i32, i32, i32, i32) {
    match direction {
        Direction::Up => (x, y, size, thickness),
        Direction::Down => (x, y + size - thickness, size, thickness),
        Direction::Left => (x, y, thickness, size),
        Direction::Right => (x + size - thickness, y, thickness, size),
    }
}

fn apply_fade(frame: &mut [u8], opacity: f32) {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return;
    }
    let keep = 1.0 - opacity;
    for pixel in frame.chunks_exact_mut(4) {
        for channel in &mut pixel[..3] {
            *channel = (*channel as f32 * keep).round() as u8;
        }
    }
}

fn fill(frame: &mut [u8], color: [u8; 4]) {
    for pixel in frame.chunks_exact_mut(4) {
        pixel.copy_from_slice(&color);
    }
}

fn fill_rect(
    frame: &mut [u8],
    viewport: Viewport,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    color: [u8; 4],
) {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = x.saturating_add(width).min(viewport.width as i32);
    let y1 = y.saturating_add(height).min(viewport.height as i32);
    for py in y0..y1 {
        for px in x0..x1 {
            write_pixel_rgba_clipped(frame, viewport.width as usize, px, py, color);
        }
    }
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridSize;
    use crate::level::{CameraBounds, LevelId, TileLayer};

    const VIEWPORT: Viewport = Viewport {
        width: 64,
        height: 48,
    };

    fn frame() -> Vec<u8> {
        vec![0; (VIEWPORT.width * VIEWPORT.height * 4) as usize]
    }

    fn pixel(frame: &[u8], x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * VIEWPORT.width + x) * 4) as usize;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    fn level() -> Level {
        let tiles = TileLayer::new(
            4,
            3,
            vec![
                None,
                None,
                None,
                Some(TileData { ledge: None }),
                None,
                None,
                None,
                None,
                None,
                None,
                Some(TileData {
                    ledge: Some(Direction::Down),
                }),
                None,
            ],
        )
        .expect("tiles");
        Level::new(
            LevelId::SmallTown,
            GridSize::default(),
            CameraBounds::default(),
            tiles,
            vec![(1, 2)],
            Vec::new(),
            Vec::new(),
        )
        .expect("level")
    }

    fn camera_on_level_centre() -> Camera2D {
        let mut camera = Camera2D::default();
        camera.position = Vec2::new(32.0, 24.0);
        camera
    }

    #[test]
    fn empty_view_clears_frame() {
        let mut frame = frame();
        let camera = Camera2D::default();
        let view = FrameView {
            level: None,
            camera: &camera,
            actor_position: Vec2::ZERO,
            fade_opacity: 0.0,
        };
        draw_frame(&mut frame, VIEWPORT, &view, CharacterAnimation::default());
        assert!(frame.chunks_exact(4).all(|pixel| pixel == CLEAR_COLOR));
    }

    #[test]
    fn level_cells_use_their_kind_colour() {
        let level = level();
        let camera = camera_on_level_centre();
        let mut frame = frame();
        let view = FrameView {
            level: Some(&level),
            camera: &camera,
            actor_position: Vec2::new(16.0, 0.0),
            fade_opacity: 0.0,
        };
        draw_frame(&mut frame, VIEWPORT, &view, CharacterAnimation::IdleDown);

        assert_eq!(pixel(&frame, 40, 24), GROUND_COLOR);
        assert_eq!(pixel(&frame, 56, 8), SOLID_TILE_COLOR);
        assert_eq!(pixel(&frame, 40, 34), LEDGE_TILE_COLOR);
        assert_eq!(pixel(&frame, 40, 46), LEDGE_LIP_COLOR);
        assert_eq!(pixel(&frame, 24, 40), OBSTACLE_COLOR);
        assert_eq!(pixel(&frame, 24, 6), ACTOR_IDLE_COLOR);
        assert_eq!(pixel(&frame, 24, 13), ACTOR_FACING_COLOR);
    }

    #[test]
    fn opaque_fade_blacks_out_frame() {
        let level = level();
        let camera = camera_on_level_centre();
        let mut frame = frame();
        let view = FrameView {
            level: Some(&level),
            camera: &camera,
            actor_position: Vec2::ZERO,
            fade_opacity: 1.0,
        };
        draw_frame(&mut frame, VIEWPORT, &view, CharacterAnimation::WalkLeft);
        assert!(frame
            .chunks_exact(4)
            .all(|pixel| pixel[..3] == [0, 0, 0] && pixel[3] == 255));
    }

    #[test]
    fn half_fade_darkens_channels() {
        let mut frame = vec![200, 100, 50, 255];
        apply_fade(&mut frame, 0.5);
        assert_eq!(frame, vec![100, 50, 25, 255]);
    }

    #[test]
    fn fill_rect_clips_to_viewport() {
        let mut frame = frame();
        fill_rect(&mut frame, VIEWPORT, -8, -8, 16, 16, TRIGGER_COLOR);
        assert_eq!(pixel(&frame, 7, 7), TRIGGER_COLOR);
        assert_eq!(pixel(&frame, 8, 8), [0, 0, 0, 0]);
    }
}
