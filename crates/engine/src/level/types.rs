use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::grid::{
    CollisionWorld, Direction, GridSize, Occupant, PointQuery, TileData, Vec2,
    WORLD_COLLISION_LAYER,
};
use crate::transition::TransitionRequest;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LevelId {
    #[default]
    SmallTown,
    SmallTownGreensHouse,
    SmallTownPurplesHouse,
    SmallTownPokemonCenter,
    SmallTownCave,
}

impl LevelId {
    pub const ALL: [LevelId; 5] = [
        LevelId::SmallTown,
        LevelId::SmallTownGreensHouse,
        LevelId::SmallTownPurplesHouse,
        LevelId::SmallTownPokemonCenter,
        LevelId::SmallTownCave,
    ];

    pub const fn asset_name(self) -> &'static str {
        match self {
            LevelId::SmallTown => "small_town",
            LevelId::SmallTownGreensHouse => "small_town_greens_house",
            LevelId::SmallTownPurplesHouse => "small_town_purples_house",
            LevelId::SmallTownPokemonCenter => "small_town_pokemon_center",
            LevelId::SmallTownCave => "small_town_cave",
        }
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.asset_name())
    }
}

impl FromStr for LevelId {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        LevelId::ALL
            .into_iter()
            .find(|id| id.asset_name() == trimmed)
            .ok_or_else(|| format!("unknown level id '{trimmed}'"))
    }
}

/// Camera limits in world pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CameraBounds {
    pub top: i32,
    pub bottom: i32,
    pub left: i32,
    pub right: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPoint {
    pub position: Vec2,
}

/// Portal between two levels. `trigger` identifies it inside its own level so the
/// reciprocal trigger in the target level can resume the actor next to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneTrigger {
    pub position: Vec2,
    pub target_level: LevelId,
    pub target_trigger: u32,
    pub trigger: u32,
    pub entry_direction: Direction,
    pub locked: bool,
}

impl SceneTrigger {
    /// Called when the actor walks into the trigger area.
    pub fn activate(&self) -> TransitionRequest {
        if self.locked {
            // Locks are not enforced yet; the notice is all that happens.
            info!(trigger = self.trigger, target = %self.target_level, "scene_trigger_locked");
        }
        TransitionRequest::resume_at(self.target_level, self.target_trigger)
    }

    /// Where an actor resuming at this trigger is placed: one tile past it.
    pub fn entry_position(&self, grid: GridSize) -> Vec2 {
        self.position + self.entry_direction.unit() * grid.as_f32()
    }
}

/// Tile layer origin convention: cell (0,0) has its top-left corner at world (0,0);
/// cell (x,y) covers `[x*grid, (x+1)*grid)` on each axis.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    width: u32,
    height: u32,
    cells: Vec<Option<TileData>>,
}

impl TileLayer {
    pub fn new(width: u32, height: u32, cells: Vec<Option<TileData>>) -> Result<Self, LevelError> {
        let expected = width as usize * height as usize;
        let actual = cells.len();
        if expected != actual {
            return Err(LevelError::TileCountMismatch { expected, actual });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            cells: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn tile_at(&self, x: i32, y: i32) -> Option<TileData> {
        self.index_of(x, y)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelError {
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
    #[error("{anchor} at {x},{y} is not aligned to the {grid}px grid")]
    MisalignedAnchor {
        anchor: &'static str,
        x: i32,
        y: i32,
        grid: u32,
    },
    #[error("scene trigger index {trigger} is used more than once")]
    DuplicateTriggerIndex { trigger: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    id: LevelId,
    grid: GridSize,
    camera_bounds: CameraBounds,
    tiles: TileLayer,
    obstacles: Vec<(i32, i32)>,
    spawn_points: Vec<SpawnPoint>,
    scene_triggers: Vec<SceneTrigger>,
}

impl Level {
    pub fn new(
        id: LevelId,
        grid: GridSize,
        camera_bounds: CameraBounds,
        tiles: TileLayer,
        obstacles: Vec<(i32, i32)>,
        spawn_points: Vec<SpawnPoint>,
        scene_triggers: Vec<SceneTrigger>,
    ) -> Result<Self, LevelError> {
        for spawn in &spawn_points {
            ensure_aligned("spawn point", spawn.position, grid)?;
        }
        let mut seen = HashSet::with_capacity(scene_triggers.len());
        for trigger in &scene_triggers {
            ensure_aligned("scene trigger", trigger.position, grid)?;
            if !seen.insert(trigger.trigger) {
                return Err(LevelError::DuplicateTriggerIndex {
                    trigger: trigger.trigger,
                });
            }
        }

        Ok(Self {
            id,
            grid,
            camera_bounds,
            tiles,
            obstacles,
            spawn_points,
            scene_triggers,
        })
    }

    pub fn id(&self) -> LevelId {
        self.id
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    pub fn camera_bounds(&self) -> CameraBounds {
        self.camera_bounds
    }

    pub fn tiles(&self) -> &TileLayer {
        &self.tiles
    }

    pub fn obstacles(&self) -> &[(i32, i32)] {
        &self.obstacles
    }

    pub fn spawn_points(&self) -> &[SpawnPoint] {
        &self.spawn_points
    }

    pub fn scene_triggers(&self) -> &[SceneTrigger] {
        &self.scene_triggers
    }

    pub fn find_trigger(&self, trigger: u32) -> Option<&SceneTrigger> {
        self.scene_triggers
            .iter()
            .find(|candidate| candidate.trigger == trigger)
    }

    pub fn trigger_at_cell(&self, cell: (i32, i32)) -> Option<&SceneTrigger> {
        self.scene_triggers
            .iter()
            .find(|trigger| self.grid.cell_of(trigger.position) == cell)
    }
}

impl CollisionWorld for Level {
    fn intersect_point(&self, point: Vec2, query: PointQuery) -> Vec<Occupant> {
        let mut hits = Vec::new();
        if query.collision_mask & WORLD_COLLISION_LAYER == 0 {
            return hits;
        }

        let size = self.grid.as_f32();
        let cell = (
            (point.x / size).floor() as i32,
            (point.y / size).floor() as i32,
        );

        if query.collide_with_areas {
            if let Some(trigger) = self.trigger_at_cell(cell) {
                hits.push(Occupant::SceneTrigger {
                    trigger: trigger.trigger,
                });
            }
        }
        if self.obstacles.contains(&cell) {
            hits.push(Occupant::Body);
        }
        if let Some(tile) = self.tiles.tile_at(cell.0, cell.1) {
            hits.push(Occupant::Tile(Some(tile)));
        }
        hits
    }
}

fn ensure_aligned(anchor: &'static str, position: Vec2, grid: GridSize) -> Result<(), LevelError> {
    if grid.is_aligned(position) {
        Ok(())
    } else {
        Err(LevelError::MisalignedAnchor {
            anchor,
            x: position.x as i32,
            y: position.y as i32,
            grid: grid.get(),
        })
    }
}
