use std::env;
use std::str::FromStr;

use engine::{
    resolve_app_paths, JsonLevelLoader, LevelId, LoopConfig, Overworld, OverworldConfig,
    StartupError,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const GRID_SIZE_ENV_VAR: &str = "GRIDWALK_GRID_SIZE";
const START_LEVEL_ENV_VAR: &str = "GRIDWALK_START_LEVEL";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) overworld: Overworld<JsonLevelLoader>,
}

pub(crate) fn build_app() -> Result<AppWiring, StartupError> {
    init_tracing();
    info!("=== Gridwalk Startup ===");

    let app_paths = resolve_app_paths()?;
    info!(
        root = %app_paths.root.display(),
        assets_dir = %app_paths.assets_dir.display(),
        "startup"
    );

    let overworld_config = overworld_config_from_env();
    info!(
        grid_size = overworld_config.grid_size,
        start_level = %overworld_config.start_level,
        hold_threshold_seconds = overworld_config.hold_threshold_seconds,
        fade_seconds = overworld_config.fade_seconds,
        "overworld_config"
    );

    let loader = JsonLevelLoader::new(app_paths.assets_dir, overworld_config.grid());
    let mut overworld = Overworld::new(overworld_config, loader);
    overworld.start();

    Ok(AppWiring {
        config: LoopConfig::default(),
        overworld,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn overworld_config_from_env() -> OverworldConfig {
    let defaults = OverworldConfig::default();
    OverworldConfig {
        grid_size: read_env_override(GRID_SIZE_ENV_VAR, parse_grid_size)
            .unwrap_or(defaults.grid_size),
        start_level: read_env_override(START_LEVEL_ENV_VAR, LevelId::from_str)
            .unwrap_or(defaults.start_level),
        ..defaults
    }
}

/// Reads and parses `var`. Unset yields `None` silently; unreadable or invalid values
/// are logged and also yield `None` so the caller falls back to its default.
fn read_env_override<T>(
    var: &'static str,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Option<T> {
    match env::var(var) {
        Ok(value) => match parse(&value) {
            Ok(parsed) => Some(parsed),
            Err(reason) => {
                warn!(
                    env_var = var,
                    value = value.as_str(),
                    reason = reason.as_str(),
                    "invalid env var value; falling back to default"
                );
                None
            }
        },
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!(
                env_var = var,
                error = %err,
                "unable to read env var; falling back to default"
            );
            None
        }
    }
}

fn parse_grid_size(raw: &str) -> Result<u32, String> {
    let size = raw
        .trim()
        .parse::<u32>()
        .map_err(|err| format!("not a positive integer: {err}"))?;
    if size == 0 {
        return Err("grid size must be at least 1".to_string());
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_size_accepts_positive_integers() {
        assert_eq!(parse_grid_size("16"), Ok(16));
        assert_eq!(parse_grid_size(" 32 "), Ok(32));
    }

    #[test]
    fn grid_size_rejects_zero_and_garbage() {
        assert!(parse_grid_size("0").is_err());
        assert!(parse_grid_size("-4").is_err());
        assert!(parse_grid_size("big").is_err());
    }

    #[test]
    fn unset_override_falls_back() {
        let parsed = read_env_override("GRIDWALK_TEST_UNSET_OVERRIDE", parse_grid_size);
        assert_eq!(parsed, None);
    }

    #[test]
    fn start_level_parses_asset_names() {
        assert_eq!(
            LevelId::from_str("small_town_cave"),
            Ok(LevelId::SmallTownCave)
        );
        assert!(LevelId::from_str("kanto").is_err());
    }
}
