use super::geometry::{Direction, Vec2};

/// Collision layer every static level occupant lives on.
pub const WORLD_COLLISION_LAYER: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointQuery {
    pub collision_mask: u32,
    pub collide_with_areas: bool,
}

impl Default for PointQuery {
    fn default() -> Self {
        Self {
            collision_mask: WORLD_COLLISION_LAYER,
            collide_with_areas: true,
        }
    }
}

/// Custom data attached to a colliding tile cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileData {
    pub ledge: Option<Direction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupant {
    /// A colliding tile. `None` data means the cell has a shape but no custom data.
    Tile(Option<TileData>),
    SceneTrigger { trigger: u32 },
    Body,
}

pub trait CollisionWorld {
    /// Occupants at `point`, in the order the backend reports them.
    fn intersect_point(&self, point: Vec2, query: PointQuery) -> Vec<Occupant>;
}

/// Always reports free space; used before any level is active.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyCollisionWorld;

impl CollisionWorld for EmptyCollisionWorld {
    fn intersect_point(&self, _point: Vec2, _query: PointQuery) -> Vec<Occupant> {
        Vec::new()
    }
}
