//! Tag id → zone classification

use crate::config::ZoneMap;
use crate::types::{Result, Zone};
use std::path::Path;

/// Read-only classifier over a loaded [`ZoneMap`]
///
/// Built once at start-up and shared (typically behind an `Arc`) with every consumer.
#[derive(Debug, Clone)]
pub struct ZoneClassifier {
    zones: ZoneMap,
}

impl ZoneClassifier {
    /// Create a classifier from an already loaded zone map
    ///
    /// Ids listed in several zones resolve as Left, then Right, then Center.
    pub fn new(zones: ZoneMap) -> Self {
        for (id, in_zones) in zones.overlaps() {
            log::warn!(
                "Tag {} is configured in several zones {:?}; classifying as {}",
                id,
                in_zones,
                in_zones[0]
            );
        }
        Self { zones }
    }

    /// Load `tags.json` and build a classifier from it
    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(Self::new(ZoneMap::load(path)?))
    }

    /// Zone for a tag id; ids absent from the configuration are [`Zone::Unknown`]
    pub fn classify(&self, id: &str) -> Zone {
        if self.zones.left.contains(id) {
            Zone::Left
        } else if self.zones.right.contains(id) {
            Zone::Right
        } else if self.zones.center.contains(id) {
            Zone::Center
        } else {
            Zone::Unknown
        }
    }

    pub fn zone_map(&self) -> &ZoneMap {
        &self.zones
    }
}
