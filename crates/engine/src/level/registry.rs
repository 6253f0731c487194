use std::collections::HashMap;

use tracing::{debug, info};

use super::loader::{LevelLoadError, LevelLoader};
use super::types::{Level, LevelId};

/// Loaded levels keyed by id, plus which one is attached to the viewport.
///
/// Levels are loaded on first reference and kept for the life of the registry.
#[derive(Debug)]
pub struct LevelRegistry<L> {
    loader: L,
    levels: HashMap<LevelId, Level>,
    active: Option<LevelId>,
}

impl<L: LevelLoader> LevelRegistry<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            levels: HashMap::new(),
            active: None,
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn get_or_load(&mut self, id: LevelId) -> Result<&Level, LevelLoadError> {
        if !self.levels.contains_key(&id) {
            let level = self.loader.load(id)?;
            info!(level = %id, cached = self.levels.len() + 1, "level_registered");
            self.levels.insert(id, level);
        } else {
            debug!(level = %id, "level_cache_hit");
        }
        self.levels
            .get(&id)
            .ok_or(LevelLoadError::NotRegistered { level: id })
    }

    pub fn get(&self, id: LevelId) -> Option<&Level> {
        self.levels.get(&id)
    }

    pub fn is_loaded(&self, id: LevelId) -> bool {
        self.levels.contains_key(&id)
    }

    pub fn loaded_count(&self) -> usize {
        self.levels.len()
    }

    /// Attaches a loaded level, replacing whatever was active.
    pub fn activate(&mut self, id: LevelId) -> Result<(), LevelLoadError> {
        if !self.levels.contains_key(&id) {
            return Err(LevelLoadError::NotRegistered { level: id });
        }
        if let Some(previous) = self.active.replace(id) {
            if previous != id {
                debug!(level = %previous, "level_detached");
            }
        }
        info!(level = %id, "level_activated");
        Ok(())
    }

    pub fn deactivate(&mut self) -> Option<LevelId> {
        let previous = self.active.take();
        if let Some(id) = previous {
            info!(level = %id, "level_deactivated");
        }
        previous
    }

    pub fn active_id(&self) -> Option<LevelId> {
        self.active
    }

    pub fn active_level(&self) -> Option<&Level> {
        self.active.and_then(|id| self.levels.get(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridSize;
    use crate::level::{CameraBounds, InMemoryLevelLoader, TileLayer};

    fn empty_level(id: LevelId) -> Level {
        Level::new(
            id,
            GridSize::default(),
            CameraBounds::default(),
            TileLayer::empty(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
        )
        .expect("level")
    }

    fn registry() -> LevelRegistry<InMemoryLevelLoader> {
        LevelRegistry::new(
            InMemoryLevelLoader::new()
                .with_level(empty_level(LevelId::SmallTown))
                .with_level(empty_level(LevelId::SmallTownCave)),
        )
    }

    #[test]
    fn loads_once_then_serves_from_cache() {
        let mut registry = registry();
        assert!(!registry.is_loaded(LevelId::SmallTown));

        registry.get_or_load(LevelId::SmallTown).expect("first");
        registry.get_or_load(LevelId::SmallTown).expect("second");

        assert_eq!(registry.loader().load_count(), 1);
        assert_eq!(registry.loaded_count(), 1);
        assert!(registry.is_loaded(LevelId::SmallTown));
    }

    #[test]
    fn load_failure_is_not_cached() {
        let mut registry = registry();
        assert!(registry.get_or_load(LevelId::SmallTownGreensHouse).is_err());
        assert_eq!(registry.loaded_count(), 0);
    }

    #[test]
    fn exactly_one_level_is_active() {
        let mut registry = registry();
        registry.get_or_load(LevelId::SmallTown).expect("town");
        registry.get_or_load(LevelId::SmallTownCave).expect("cave");

        registry.activate(LevelId::SmallTown).expect("activate town");
        assert_eq!(registry.active_id(), Some(LevelId::SmallTown));

        registry.activate(LevelId::SmallTownCave).expect("activate cave");
        assert_eq!(registry.active_id(), Some(LevelId::SmallTownCave));
        assert_eq!(
            registry.active_level().map(Level::id),
            Some(LevelId::SmallTownCave)
        );

        assert_eq!(registry.deactivate(), Some(LevelId::SmallTownCave));
        assert!(registry.active_level().is_none());
        assert_eq!(registry.deactivate(), None);
        // Deactivation detaches only; the level stays cached.
        assert!(registry.is_loaded(LevelId::SmallTownCave));
    }

    #[test]
    fn activating_unloaded_level_fails() {
        let mut registry = registry();
        assert!(matches!(
            registry.activate(LevelId::SmallTown),
            Err(LevelLoadError::NotRegistered { .. })
        ));
        assert_eq!(registry.active_id(), None);
    }
}
