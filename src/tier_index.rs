/*!
 * Time-based lookups across the tiers of an annotation document.
 *
 * Subtier annotations are matched to a segment by probing a single instant,
 * one millisecond after the segment starts. Probing just past the start
 * means an annotation that ends exactly where the segment begins is not
 * picked up, while one that shares the segment's start is.
 */

use log::debug;

use crate::eaf_document::{Annotation, AnnotationDocument, Tier};

/// Offset from a segment's start at which subtiers are probed
pub const PROBE_OFFSET_MS: u64 = 1;

/// Closed time interval in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    pub start_ms: u64,
    pub end_ms: u64,
}

impl TimeInterval {
    pub fn new(start_ms: u64, end_ms: u64) -> Self {
        TimeInterval { start_ms, end_ms }
    }

    /// Instant used to match subtier annotations, clamped into the interval
    pub fn probe_ms(&self) -> u64 {
        self.start_ms
            .saturating_add(PROBE_OFFSET_MS)
            .min(self.end_ms.max(self.start_ms))
    }
}

impl From<&Annotation> for TimeInterval {
    fn from(annotation: &Annotation) -> Self {
        TimeInterval::new(annotation.start_ms, annotation.end_ms)
    }
}

/// Read-only lookup view over one document
#[derive(Debug, Clone, Copy)]
pub struct TierIndex<'a> {
    document: &'a AnnotationDocument,
}

impl<'a> TierIndex<'a> {
    pub fn new(document: &'a AnnotationDocument) -> Self {
        TierIndex { document }
    }

    pub fn document(&self) -> &'a AnnotationDocument {
        self.document
    }

    pub fn tier(&self, name: &str) -> Option<&'a Tier> {
        self.document.tier(name)
    }

    /// All annotations of `tier` covering `time_ms`, in time order
    pub fn annotations_at(&self, tier: &str, time_ms: u64) -> Vec<&'a Annotation> {
        let Some(tier) = self.tier(tier) else {
            return Vec::new();
        };
        tier.annotations
            .iter()
            // sorted by start, nothing later can cover the instant
            .take_while(|a| a.start_ms <= time_ms)
            .filter(|a| a.covers(time_ms))
            .collect()
    }

    /// The annotation of `tier` matching `interval`, if any.
    ///
    /// Matching annotations cover the probe instant; the earliest-starting
    /// one wins, then the earliest-ending, then the first in tier order.
    pub fn lookup(&self, tier: &str, interval: TimeInterval) -> Option<&'a Annotation> {
        let found = self.annotations_at(tier, interval.probe_ms()).into_iter().next();
        if found.is_none() {
            debug!(
                "No '{}' annotation at {} ms (segment {}-{})",
                tier,
                interval.probe_ms(),
                interval.start_ms,
                interval.end_ms
            );
        }
        found
    }

    /// Text of the matching annotation in `tier`, if any
    pub fn lookup_text(&self, tier: &str, interval: TimeInterval) -> Option<&'a str> {
        self.lookup(tier, interval).map(|a| a.text.as_str())
    }

    /// Annotations of `tier` starting strictly inside `interval`
    pub fn annotations_starting_within(
        &self,
        tier: &str,
        interval: TimeInterval,
    ) -> Vec<&'a Annotation> {
        let Some(tier) = self.tier(tier) else {
            return Vec::new();
        };
        tier.annotations
            .iter()
            .skip_while(|a| a.start_ms <= interval.start_ms)
            .take_while(|a| a.start_ms < interval.end_ms)
            .collect()
    }
}
