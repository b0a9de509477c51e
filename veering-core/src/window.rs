//! Per-cycle tag aggregation
//!
//! A [`TagWindow`] collects every reading taken during one decision cycle, keeping a single
//! [`TagRecord`] per tag id. Each record's zone is fixed the first time the id is seen. The
//! window lives for the whole process and is emptied by [`TagWindow::reset`] after every
//! decision.

use crate::classifier::ZoneClassifier;
use crate::types::{TagReading, Zone, ZonePresenceSummary};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// One tag seen during the current cycle
#[derive(Debug, Clone, PartialEq)]
pub struct TagRecord {
    pub id: String,
    pub zone: Zone,
    /// Number of sightings this cycle (always ≥ 1)
    pub occurrence_count: u32,
    /// Strongest signal score seen for this id this cycle
    pub best_signal_score: f64,
}

impl fmt::Display for TagRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tag ID: {}, RSSI = {:.3}, counter = {}, location = {}",
            self.id, self.best_signal_score, self.occurrence_count, self.zone
        )
    }
}

/// Distinct tags per zone in the current cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneCounts {
    pub left: usize,
    pub right: usize,
    pub center: usize,
    pub unknown: usize,
}

/// Deduplicating aggregation store for one polling cycle
pub struct TagWindow {
    classifier: Arc<ZoneClassifier>,
    /// Records in first-seen order
    records: Vec<TagRecord>,
    /// Key: tag id, Value: index into `records`
    index: HashMap<String, usize>,
}

impl TagWindow {
    pub fn new(classifier: Arc<ZoneClassifier>) -> Self {
        Self {
            classifier,
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Add one reading to the window
    ///
    /// The first sighting of an id creates its record and classifies it; later sightings
    /// only bump the count.
    pub fn record(&mut self, reading: TagReading) {
        if let Some(&idx) = self.index.get(&reading.id) {
            let record = &mut self.records[idx];
            record.occurrence_count += 1;
            if reading.signal_score > record.best_signal_score {
                record.best_signal_score = reading.signal_score;
            }
            return;
        }

        let zone = self.classifier.classify(&reading.id);
        log::trace!("New tag {} in zone {}", reading.id, zone);

        self.index.insert(reading.id.clone(), self.records.len());
        self.records.push(TagRecord {
            id: reading.id,
            zone,
            occurrence_count: 1,
            best_signal_score: reading.signal_score,
        });
    }

    /// Zone presence across all records, regardless of occurrence counts
    pub fn summary(&self) -> ZonePresenceSummary {
        let mut summary = ZonePresenceSummary::default();
        for record in &self.records {
            match record.zone {
                Zone::Left => summary.left = true,
                Zone::Right => summary.right = true,
                Zone::Center => summary.center = true,
                Zone::Unknown => {}
            }
        }
        summary
    }

    /// Distinct tag count for each zone
    pub fn zone_counts(&self) -> ZoneCounts {
        self.records
            .iter()
            .fold(ZoneCounts::default(), |mut counts, record| {
                match record.zone {
                    Zone::Left => counts.left += 1,
                    Zone::Right => counts.right += 1,
                    Zone::Center => counts.center += 1,
                    Zone::Unknown => counts.unknown += 1,
                }
                counts
            })
    }

    /// Drop every record; call once per cycle after the summary has been used
    pub fn reset(&mut self) {
        self.records.clear();
        self.index.clear();
    }

    pub fn get(&self, id: &str) -> Option<&TagRecord> {
        self.index.get(id).map(|&idx| &self.records[idx])
    }

    /// Records in the order their ids were first seen
    pub fn records(&self) -> &[TagRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
