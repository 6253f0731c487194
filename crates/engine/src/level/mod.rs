mod loader;
mod registry;
mod types;

pub use loader::{
    parse_level, InMemoryLevelLoader, JsonLevelLoader, LevelLoadError, LevelLoader,
    LEVELS_DIR_NAME, LEVEL_FILE_EXTENSION,
};
pub use registry::LevelRegistry;
pub use types::{
    CameraBounds, Level, LevelError, LevelId, SceneTrigger, SpawnPoint, TileLayer,
};
