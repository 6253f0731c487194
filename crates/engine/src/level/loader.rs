use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::grid::{Direction, GridSize, TileData, Vec2};

use super::types::{
    CameraBounds, Level, LevelError, LevelId, SceneTrigger, SpawnPoint, TileLayer,
};

pub const LEVELS_DIR_NAME: &str = "levels";
pub const LEVEL_FILE_EXTENSION: &str = "json";
const EMPTY_TILE_SYMBOLS: [char; 2] = ['.', ' '];

#[derive(Debug, Error)]
pub enum LevelLoadError {
    #[error("failed to read level {level} from {path}: {source}")]
    Read {
        level: LevelId,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse level {level} at {location}: {source}")]
    Parse {
        level: LevelId,
        location: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("level {level} legend symbol '{symbol}' must be exactly one character")]
    InvalidLegendSymbol { level: LevelId, symbol: String },
    #[error("level {level} legend symbol '{symbol}' has unknown ledge direction '{token}'")]
    UnknownLedge {
        level: LevelId,
        symbol: char,
        token: String,
    },
    #[error("level {level} tile row {row} has {actual} cells, expected {expected}")]
    RaggedTiles {
        level: LevelId,
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("level {level} uses unknown tile symbol '{symbol}' at row {row}, column {column}")]
    UnknownTileSymbol {
        level: LevelId,
        symbol: char,
        row: usize,
        column: usize,
    },
    #[error("level {level} is invalid: {source}")]
    Invalid {
        level: LevelId,
        #[source]
        source: LevelError,
    },
    #[error("level {level} is not registered with the loader")]
    NotRegistered { level: LevelId },
}

/// Instantiates levels on demand. Implementations must be deterministic per id.
pub trait LevelLoader {
    fn load(&mut self, id: LevelId) -> Result<Level, LevelLoadError>;
}

/// On-disk schema. Every position is in cells and is scaled by the grid size on load.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LevelFile {
    camera: CameraCellsDef,
    #[serde(default)]
    legend: BTreeMap<String, TileDef>,
    #[serde(default)]
    tiles: Vec<String>,
    #[serde(default)]
    obstacles: Vec<CellDef>,
    #[serde(default)]
    spawn_points: Vec<CellDef>,
    #[serde(default)]
    scene_triggers: Vec<SceneTriggerDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TileDef {
    #[serde(default)]
    ledge: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
struct CellDef {
    x: i32,
    y: i32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
struct CameraCellsDef {
    top: i32,
    bottom: i32,
    left: i32,
    right: i32,
}

impl CameraCellsDef {
    fn to_bounds(self, grid: GridSize) -> CameraBounds {
        let size = grid.get() as i32;
        CameraBounds {
            top: self.top * size,
            bottom: self.bottom * size,
            left: self.left * size,
            right: self.right * size,
        }
    }
}

impl CellDef {
    fn to_world(self, grid: GridSize) -> Vec2 {
        grid.cell_origin((self.x, self.y))
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
struct SceneTriggerDef {
    x: i32,
    y: i32,
    target_level: LevelId,
    #[serde(default)]
    target_trigger: u32,
    #[serde(default)]
    trigger: u32,
    entry_direction: Direction,
    #[serde(default)]
    locked: bool,
}

/// Reads `<root>/levels/<id>.json`.
#[derive(Debug, Clone)]
pub struct JsonLevelLoader {
    root: PathBuf,
    grid: GridSize,
}

impl JsonLevelLoader {
    pub fn new(root: impl Into<PathBuf>, grid: GridSize) -> Self {
        Self {
            root: root.into(),
            grid,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn asset_path(&self, id: LevelId) -> PathBuf {
        self.root
            .join(LEVELS_DIR_NAME)
            .join(format!("{}.{LEVEL_FILE_EXTENSION}", id.asset_name()))
    }
}

impl LevelLoader for JsonLevelLoader {
    fn load(&mut self, id: LevelId) -> Result<Level, LevelLoadError> {
        let path = self.asset_path(id);
        let raw = fs::read_to_string(&path).map_err(|source| LevelLoadError::Read {
            level: id,
            path: path.clone(),
            source,
        })?;
        let level = parse_level(id, self.grid, &raw)?;
        info!(
            level = %id,
            path = %path.display(),
            spawn_points = level.spawn_points().len(),
            scene_triggers = level.scene_triggers().len(),
            "level_loaded"
        );
        Ok(level)
    }
}

/// Serves prebuilt levels; every successful load hands out a fresh clone.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLevelLoader {
    levels: HashMap<LevelId, Level>,
    load_count: usize,
}

impl InMemoryLevelLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.insert(level);
        self
    }

    pub fn insert(&mut self, level: Level) {
        self.levels.insert(level.id(), level);
    }

    pub fn load_count(&self) -> usize {
        self.load_count
    }
}

impl LevelLoader for InMemoryLevelLoader {
    fn load(&mut self, id: LevelId) -> Result<Level, LevelLoadError> {
        let level = self
            .levels
            .get(&id)
            .cloned()
            .ok_or(LevelLoadError::NotRegistered { level: id })?;
        self.load_count += 1;
        Ok(level)
    }
}

pub fn parse_level(id: LevelId, grid: GridSize, raw: &str) -> Result<Level, LevelLoadError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let file = serde_path_to_error::deserialize::<_, LevelFile>(&mut deserializer).map_err(
        |error| {
            let location = error.path().to_string();
            LevelLoadError::Parse {
                level: id,
                location,
                source: error.into_inner(),
            }
        },
    )?;
    compile_level(id, grid, file)
}

fn compile_level(id: LevelId, grid: GridSize, file: LevelFile) -> Result<Level, LevelLoadError> {
    let legend = compile_legend(id, &file.legend)?;
    let tiles = compile_tiles(id, &legend, &file.tiles)?;
    let obstacles = file.obstacles.iter().map(|cell| (cell.x, cell.y)).collect();
    let spawn_points = file
        .spawn_points
        .iter()
        .map(|cell| SpawnPoint {
            position: cell.to_world(grid),
        })
        .collect();
    let scene_triggers = file
        .scene_triggers
        .iter()
        .map(|def| SceneTrigger {
            position: grid.cell_origin((def.x, def.y)),
            target_level: def.target_level,
            target_trigger: def.target_trigger,
            trigger: def.trigger,
            entry_direction: def.entry_direction,
            locked: def.locked,
        })
        .collect();

    Level::new(
        id,
        grid,
        file.camera.to_bounds(grid),
        tiles,
        obstacles,
        spawn_points,
        scene_triggers,
    )
    .map_err(|source| LevelLoadError::Invalid { level: id, source })
}

fn compile_legend(
    id: LevelId,
    legend: &BTreeMap<String, TileDef>,
) -> Result<HashMap<char, TileData>, LevelLoadError> {
    let mut compiled = HashMap::with_capacity(legend.len());
    for (symbol, def) in legend {
        let mut chars = symbol.chars();
        let symbol_char = match (chars.next(), chars.next()) {
            (Some(only), None) if !EMPTY_TILE_SYMBOLS.contains(&only) => only,
            _ => {
                return Err(LevelLoadError::InvalidLegendSymbol {
                    level: id,
                    symbol: symbol.clone(),
                })
            }
        };
        let ledge = match def.ledge.as_deref() {
            None => None,
            Some(token) => Some(Direction::from_ledge_token(token).ok_or_else(|| {
                LevelLoadError::UnknownLedge {
                    level: id,
                    symbol: symbol_char,
                    token: token.to_string(),
                }
            })?),
        };
        compiled.insert(symbol_char, TileData { ledge });
    }
    Ok(compiled)
}

fn compile_tiles(
    id: LevelId,
    legend: &HashMap<char, TileData>,
    rows: &[String],
) -> Result<TileLayer, LevelLoadError> {
    let width = rows.first().map(|row| row.chars().count()).unwrap_or(0);
    let mut cells = Vec::with_capacity(width * rows.len());
    for (row_index, row) in rows.iter().enumerate() {
        let actual = row.chars().count();
        if actual != width {
            return Err(LevelLoadError::RaggedTiles {
                level: id,
                row: row_index,
                expected: width,
                actual,
            });
        }
        for (column, symbol) in row.chars().enumerate() {
            if EMPTY_TILE_SYMBOLS.contains(&symbol) {
                cells.push(None);
                continue;
            }
            let tile = legend
                .get(&symbol)
                .copied()
                .ok_or(LevelLoadError::UnknownTileSymbol {
                    level: id,
                    symbol,
                    row: row_index,
                    column,
                })?;
            cells.push(Some(tile));
        }
    }
    TileLayer::new(width as u32, rows.len() as u32, cells)
        .map_err(|source| LevelLoadError::Invalid { level: id, source })
}
