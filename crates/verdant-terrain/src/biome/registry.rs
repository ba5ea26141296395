//! Biome registry: maps [`BiomeId`] to [`BiomeRecord`] with name-based lookup.

use hashbrown::HashMap;
use verdant_config::{BiomeEntry, biome_names};

use super::BiomeRecord;

/// Unique identifier for a biome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BiomeId(pub u16);

/// Errors that can occur when building the registry.
#[derive(Debug, thiserror::Error)]
pub enum BiomeRegistryError {
    /// A biome with this name is already registered.
    #[error("duplicate biome name: {0}")]
    DuplicateName(String),
    /// The configuration supplied no biomes at all.
    #[error("biome registry is empty")]
    Empty,
    /// A biome the classifier needs is not registered.
    #[error("biome {0} is not registered")]
    Missing(String),
}

/// Stores all registered biome records with O(1) lookup by ID.
#[derive(Debug, Clone)]
pub struct BiomeRegistry {
    biomes: Vec<BiomeRecord>,
    name_to_id: HashMap<String, BiomeId>,
}

impl BiomeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            biomes: Vec::new(),
            name_to_id: HashMap::new(),
        }
    }

    /// Build the registry from configuration records.
    ///
    /// Every biome the classifier can produce that the configuration leaves out
    /// is registered with [`BiomeEntry::fallback`], so classification always
    /// resolves to a registered biome.
    ///
    /// # Errors
    ///
    /// [`BiomeRegistryError::Empty`] if `entries` is empty, or
    /// [`BiomeRegistryError::DuplicateName`] if two entries share an id.
    pub fn from_entries(entries: &[BiomeEntry]) -> Result<Self, BiomeRegistryError> {
        if entries.is_empty() {
            return Err(BiomeRegistryError::Empty);
        }
        let mut registry = Self::new();
        for entry in entries {
            registry.register(BiomeRecord::from(entry))?;
        }
        for name in biome_names::ALL {
            if registry.lookup_by_name(name).is_none() {
                tracing::debug!(biome = name, "biome missing from config, using default record");
                registry.register(BiomeRecord::from(&BiomeEntry::fallback(name)))?;
            }
        }
        Ok(registry)
    }

    /// Registers a new biome record, returning its assigned [`BiomeId`].
    ///
    /// # Errors
    ///
    /// Returns [`BiomeRegistryError::DuplicateName`] if a biome with the same name exists.
    pub fn register(&mut self, record: BiomeRecord) -> Result<BiomeId, BiomeRegistryError> {
        if self.name_to_id.contains_key(&record.name) {
            return Err(BiomeRegistryError::DuplicateName(record.name.clone()));
        }
        let id = BiomeId(self.biomes.len() as u16);
        self.name_to_id.insert(record.name.clone(), id);
        self.biomes.push(record);
        Ok(id)
    }

    /// Returns the record for the given biome ID.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this registry.
    pub fn get(&self, id: BiomeId) -> &BiomeRecord {
        &self.biomes[id.0 as usize]
    }

    /// Returns the record for the given biome ID, if registered.
    pub fn try_get(&self, id: BiomeId) -> Option<&BiomeRecord> {
        self.biomes.get(id.0 as usize)
    }

    /// Looks up a biome ID by name.
    pub fn lookup_by_name(&self, name: &str) -> Option<BiomeId> {
        self.name_to_id.get(name).copied()
    }

    /// Returns `true` if the ID belongs to this registry.
    pub fn contains(&self, id: BiomeId) -> bool {
        (id.0 as usize) < self.biomes.len()
    }

    /// Iterate over `(id, record)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (BiomeId, &BiomeRecord)> {
        self.biomes
            .iter()
            .enumerate()
            .map(|(i, record)| (BiomeId(i as u16), record))
    }

    /// Returns the number of registered biomes.
    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    /// Returns `true` if no biomes are registered.
    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }
}

impl Default for BiomeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_set_registers_all_biomes() {
        let registry = BiomeRegistry::from_entries(&BiomeEntry::standard_set()).unwrap();
        assert_eq!(registry.len(), biome_names::ALL.len());
        for name in biome_names::ALL {
            assert!(registry.lookup_by_name(name).is_some(), "{name} missing");
        }
    }

    #[test]
    fn test_missing_biomes_fall_back_to_default_record() {
        let registry =
            BiomeRegistry::from_entries(&[BiomeEntry::fallback(biome_names::FOREST)]).unwrap();
        assert_eq!(registry.len(), biome_names::ALL.len());

        let desert = registry.lookup_by_name(biome_names::DESERT).unwrap();
        let record = registry.get(desert);
        assert_eq!(record.height_modifier, 1.0);
        assert_eq!(record.ground_cover_density, 0.2);
    }

    #[test]
    fn test_custom_biomes_are_kept() {
        let mut entries = BiomeEntry::standard_set();
        entries.push(BiomeEntry::fallback("volcanic"));
        let registry = BiomeRegistry::from_entries(&entries).unwrap();
        assert_eq!(registry.len(), biome_names::ALL.len() + 1);
        assert!(registry.lookup_by_name("volcanic").is_some());
    }

    #[test]
    fn test_empty_entries_rejected() {
        assert!(matches!(
            BiomeRegistry::from_entries(&[]),
            Err(BiomeRegistryError::Empty)
        ));
    }

    #[test]
    fn test_biome_registry_duplicate_rejected() {
        let entries = vec![BiomeEntry::fallback("desert"), BiomeEntry::fallback("desert")];
        assert!(matches!(
            BiomeRegistry::from_entries(&entries),
            Err(BiomeRegistryError::DuplicateName(name)) if name == "desert"
        ));
    }

    #[test]
    fn test_ids_are_dense_and_ordered() {
        let registry = BiomeRegistry::from_entries(&BiomeEntry::standard_set()).unwrap();
        let ids: Vec<_> = registry.iter().map(|(id, _)| id.0).collect();
        assert_eq!(ids, (0..registry.len() as u16).collect::<Vec<_>>());
        assert!(!registry.contains(BiomeId(registry.len() as u16)));
        assert!(registry.try_get(BiomeId(999)).is_none());
    }
}
