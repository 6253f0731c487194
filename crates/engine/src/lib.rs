use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod grid;
pub mod level;
pub mod overworld;
pub mod transition;

pub use app::{
    run_app, world_to_screen, AppError, Camera2D, FrameView, InputAction, InputSnapshot,
    LoopConfig, Renderer, Viewport,
};
pub use grid::{
    AnimationIntentRouter, AnimationKind, AnimationSink, CharacterAnimation, CollisionWorld,
    Direction, DirectionalInput, GridMotion, GridSize, InputIntent, MotionConfig, MotionMode,
    MoveIntent, Occupant, PointQuery, RejectReason, StepOutcome, TileData, Vec2,
    DEFAULT_GRID_SIZE,
};
pub use level::{
    CameraBounds, InMemoryLevelLoader, JsonLevelLoader, Level, LevelError, LevelId,
    LevelLoadError, LevelLoader, LevelRegistry, SceneTrigger, SpawnPoint, TileLayer,
};
pub use overworld::{Overworld, OverworldConfig};
pub use transition::{
    ChangeLevelAck, FadeSink, Placement, ScreenFade, TransitionCompleted, TransitionError,
    TransitionOrchestrator, TransitionPhase, TransitionRequest,
};

pub const ROOT_ENV_VAR: &str = "GRIDWALK_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    /// Directory handed to [`JsonLevelLoader`]; level files live in its `levels/` child.
    pub assets_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error(
        "GRIDWALK_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain assets/levels/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing assets/levels/.\n\
Set {env_var} explicitly, for example:\n\
Bash/zsh: export {env_var}=\"/path/to/gridwalk\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    Ok(AppPaths {
        assets_dir: root.join("assets"),
        root,
    })
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => root_from_env_value(&value),
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            find_root_upward(&exe_dir).ok_or_else(|| StartupError::RootNotFound {
                start_dir: normalize_path(&exe_dir),
                env_var: ROOT_ENV_VAR,
            })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn root_from_env_value(value: &str) -> Result<PathBuf, StartupError> {
    let normalized = normalize_path(Path::new(value));
    if is_repo_marker(&normalized) {
        Ok(normalized)
    } else {
        Err(StartupError::InvalidEnvRoot { path: normalized })
    }
}

fn find_root_upward(start_dir: &Path) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .find(|candidate| is_repo_marker(candidate))
        .map(normalize_path)
}

fn is_repo_marker(path: &Path) -> bool {
    path.join("assets").join(level::LEVELS_DIR_NAME).is_dir()
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
