//! Energy cost table loader.

use std::path::Path;

use rotation_core::CostTable;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`CostTable`] from TOML files.
pub struct CostTableLoader;

impl CostTableLoader {
    pub fn load(path: &Path) -> LoadResult<CostTable> {
        let content = read_file(path)?;
        let costs: CostTable = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse cost table TOML: {}", e))?;

        if let Some(negative) = [
            costs.sinister_strike,
            costs.mutilate,
            costs.slice_and_dice,
            costs.expose_armor,
            costs.hunger_for_blood,
            costs.rupture,
            costs.eviscerate,
            costs.envenom,
            costs.fan_of_knives,
        ]
        .into_iter()
        .find(|cost| *cost < 0.0)
        {
            anyhow::bail!("Cost table {} has a negative cost {}", path.display(), negative);
        }
        Ok(costs)
    }
}
