//! Rotation configuration loader.

use std::path::Path;

use anyhow::Context;
use rotation_core::{CatalogueBuilder, CostTable, RotationConfig, Talents};

use crate::loaders::{LoadResult, read_file};

/// Loader for [`RotationConfig`] from TOML files.
///
/// Missing sections and fields fall back to their defaults, so an empty file
/// yields `RotationConfig::default()`.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    pub fn load(path: &Path) -> LoadResult<RotationConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse config data from a TOML string.
    pub fn parse(content: &str) -> LoadResult<RotationConfig> {
        let config: RotationConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse rotation config TOML: {}", e))?;
        Ok(config)
    }

    /// Load a config and reject it early if it cannot produce a catalogue.
    pub fn load_validated(path: &Path) -> LoadResult<RotationConfig> {
        let config = Self::load(path)?;
        Self::validate(&config)
            .with_context(|| format!("Invalid rotation config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded rotation config");
        Ok(config)
    }

    /// Builds the catalogue for single- and multi-target fights, with and
    /// without the talents that add or swap objectives.
    pub fn validate(config: &RotationConfig) -> LoadResult<()> {
        let costs = CostTable::default();
        let multi_target = config.catalogue.multi_target_above.saturating_add(1);
        let talent_sets = [
            Talents::empty(),
            Talents::MUTILATE | Talents::HUNGER_FOR_BLOOD | Talents::MASTER_POISONER,
        ];
        for talents in talent_sets {
            for targets in [1, multi_target] {
                CatalogueBuilder::new(config, &costs)
                    .talents(talents)
                    .targets(targets)
                    .build()
                    .with_context(|| {
                        format!("no catalogue for {targets} target(s) with talents {talents:?}")
                    })?;
            }
        }
        Ok(())
    }
}
