use crate::grid::Vec2;
use crate::level::CameraBounds;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    fn half_extent(self) -> Vec2 {
        Vec2::new(self.width as f32 * 0.5, self.height as f32 * 0.5)
    }
}

/// Follow camera. `position` is the world point drawn at the centre of the viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Camera2D {
    pub position: Vec2,
    limits: Option<CameraBounds>,
}

impl Camera2D {
    pub fn limits(&self) -> Option<CameraBounds> {
        self.limits
    }

    pub fn set_limits(&mut self, limits: CameraBounds) {
        self.limits = Some(limits);
    }

    /// Centres on `target`, then pulls back so the view stays inside the limits.
    /// An axis whose limits are empty is left unclamped.
    pub fn follow(&mut self, target: Vec2, viewport: Viewport) {
        let half = viewport.half_extent();
        let mut position = target;
        if let Some(limits) = self.limits {
            position.x = clamp_axis(position.x, half.x, limits.left, limits.right);
            position.y = clamp_axis(position.y, half.y, limits.top, limits.bottom);
        }
        self.position = position;
    }
}

fn clamp_axis(center: f32, half_extent: f32, min: i32, max: i32) -> f32 {
    if max <= min {
        return center;
    }
    let (min, max) = (min as f32, max as f32);
    if max - min <= half_extent * 2.0 {
        // Level narrower than the view: pin to the leading edge.
        return min + half_extent;
    }
    center.clamp(min + half_extent, max - half_extent)
}

pub fn world_to_screen(world: Vec2, camera: &Camera2D, viewport: Viewport) -> (i32, i32) {
    let half = viewport.half_extent();
    let x = world.x - camera.position.x + half.x;
    let y = world.y - camera.position.y + half.y;
    (x.round() as i32, y.round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport {
        width: 240,
        height: 160,
    };

    fn bounds(left: i32, top: i32, right: i32, bottom: i32) -> CameraBounds {
        CameraBounds {
            top,
            bottom,
            left,
            right,
        }
    }

    #[test]
    fn camera_position_maps_to_viewport_center() {
        let camera = Camera2D {
            position: Vec2::new(40.0, 24.0),
            ..Camera2D::default()
        };
        assert_eq!(
            world_to_screen(Vec2::new(40.0, 24.0), &camera, VIEWPORT),
            (120, 80)
        );
        assert_eq!(
            world_to_screen(Vec2::new(50.0, 20.0), &camera, VIEWPORT),
            (130, 76)
        );
    }

    #[test]
    fn follow_without_limits_tracks_target() {
        let mut camera = Camera2D::default();
        camera.follow(Vec2::new(-300.0, 900.0), VIEWPORT);
        assert_eq!(camera.position, Vec2::new(-300.0, 900.0));
    }

    #[test]
    fn follow_keeps_view_inside_limits() {
        let mut camera = Camera2D::default();
        camera.set_limits(bounds(0, 0, 640, 480));

        camera.follow(Vec2::new(8.0, 8.0), VIEWPORT);
        assert_eq!(camera.position, Vec2::new(120.0, 80.0));

        camera.follow(Vec2::new(632.0, 472.0), VIEWPORT);
        assert_eq!(camera.position, Vec2::new(520.0, 400.0));

        camera.follow(Vec2::new(300.0, 200.0), VIEWPORT);
        assert_eq!(camera.position, Vec2::new(300.0, 200.0));
    }

    #[test]
    fn narrow_level_pins_to_top_left() {
        let mut camera = Camera2D::default();
        camera.set_limits(bounds(-16, -32, 144, 96));
        camera.follow(Vec2::new(100.0, 50.0), VIEWPORT);
        assert_eq!(camera.position, Vec2::new(104.0, 48.0));
    }

    #[test]
    fn empty_limits_leave_axis_free() {
        let mut camera = Camera2D::default();
        camera.set_limits(CameraBounds::default());
        camera.follow(Vec2::new(-50.0, 75.0), VIEWPORT);
        assert_eq!(camera.position, Vec2::new(-50.0, 75.0));
    }
}
