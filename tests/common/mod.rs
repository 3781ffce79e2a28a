/*!
 * Common test utilities for the gornikeaf test suite
 */

#![allow(dead_code)]

use anyhow::Result;
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates the sample EAF document in the specified directory
pub fn create_test_eaf(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, &sample_eaf())
}

enum TierSpec {
    Aligned(Vec<(u64, u64, String)>),
    /// Values keyed by the index of the parent annotation they refer to
    Reference(Vec<(usize, String)>),
}

/// Builds EAF documents tier by tier
pub struct EafBuilder {
    tiers: Vec<(String, Option<String>, TierSpec)>,
}

impl EafBuilder {
    pub fn new() -> Self {
        EafBuilder { tiers: Vec::new() }
    }

    /// Adds a time-aligned tier
    pub fn tier(mut self, name: &str, annotations: &[(u64, u64, &str)]) -> Self {
        let annotations = annotations
            .iter()
            .map(|&(start, end, text)| (start, end, text.to_string()))
            .collect();
        self.tiers.push((name.to_string(), None, TierSpec::Aligned(annotations)));
        self
    }

    /// Adds a time-aligned tier depending on `parent`
    pub fn subtier(mut self, name: &str, parent: &str, annotations: &[(u64, u64, &str)]) -> Self {
        self = self.tier(name, annotations);
        if let Some(last) = self.tiers.last_mut() {
            last.1 = Some(parent.to_string());
        }
        self
    }

    /// Adds a tier of reference annotations pointing into `parent`
    pub fn ref_tier(mut self, name: &str, parent: &str, values: &[(usize, &str)]) -> Self {
        let values = values
            .iter()
            .map(|&(index, text)| (index, text.to_string()))
            .collect();
        self.tiers.push((
            name.to_string(),
            Some(parent.to_string()),
            TierSpec::Reference(values),
        ));
        self
    }

    pub fn build(&self) -> String {
        let mut slots = String::new();
        let mut tiers = String::new();
        let mut ids: Vec<(String, Vec<String>)> = Vec::new();
        let mut slot_count = 0;
        let mut annotation_count = 0;

        for (name, parent, spec) in &self.tiers {
            let parent_attr = parent
                .as_ref()
                .map(|p| format!(" PARENT_REF=\"{}\"", p))
                .unwrap_or_default();
            writeln!(tiers, "    <TIER LINGUISTIC_TYPE_REF=\"default-lt\" TIER_ID=\"{}\"{}>", name, parent_attr).unwrap();

            let mut tier_ids = Vec::new();
            match spec {
                TierSpec::Aligned(annotations) => {
                    for (start, end, text) in annotations {
                        slot_count += 2;
                        annotation_count += 1;
                        let (ts1, ts2) = (slot_count - 1, slot_count);
                        writeln!(slots, "        <TIME_SLOT TIME_SLOT_ID=\"ts{}\" TIME_VALUE=\"{}\"/>", ts1, start).unwrap();
                        writeln!(slots, "        <TIME_SLOT TIME_SLOT_ID=\"ts{}\" TIME_VALUE=\"{}\"/>", ts2, end).unwrap();
                        let id = format!("a{}", annotation_count);
                        writeln!(
                            tiers,
                            "        <ANNOTATION>\n            <ALIGNABLE_ANNOTATION ANNOTATION_ID=\"{}\" TIME_SLOT_REF1=\"ts{}\" TIME_SLOT_REF2=\"ts{}\">\n                <ANNOTATION_VALUE>{}</ANNOTATION_VALUE>\n            </ALIGNABLE_ANNOTATION>\n        </ANNOTATION>",
                            id, ts1, ts2, escape(text)
                        )
                        .unwrap();
                        tier_ids.push(id);
                    }
                }
                TierSpec::Reference(values) => {
                    let parent_ids = parent
                        .as_ref()
                        .and_then(|p| ids.iter().find(|(n, _)| n == p))
                        .map(|(_, v)| v.clone())
                        .unwrap_or_default();
                    for (index, text) in values {
                        annotation_count += 1;
                        let id = format!("a{}", annotation_count);
                        writeln!(
                            tiers,
                            "        <ANNOTATION>\n            <REF_ANNOTATION ANNOTATION_ID=\"{}\" ANNOTATION_REF=\"{}\">\n                <ANNOTATION_VALUE>{}</ANNOTATION_VALUE>\n            </REF_ANNOTATION>\n        </ANNOTATION>",
                            id, parent_ids[*index], escape(text)
                        )
                        .unwrap();
                        tier_ids.push(id);
                    }
                }
            }
            ids.push((name.clone(), tier_ids));
            writeln!(tiers, "    </TIER>").unwrap();
        }

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<ANNOTATION_DOCUMENT AUTHOR="" DATE="2020-01-01T00:00:00-06:00" FORMAT="3.0" VERSION="3.0">
    <HEADER MEDIA_FILE="" TIME_UNITS="milliseconds"/>
    <TIME_ORDER>
{}    </TIME_ORDER>
{}    <LINGUISTIC_TYPE GRAPHIC_REFERENCES="false" LINGUISTIC_TYPE_ID="default-lt" TIME_ALIGNABLE="true"/>
</ANNOTATION_DOCUMENT>
"#,
            slots, tiers
        )
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Builder pre-filled with the required tiers covering 0-10000 ms
pub fn base_builder(time_period: &str, trash: &str) -> EafBuilder {
    EafBuilder::new()
        .tier("Time Period", &[(0, 10_000, time_period)])
        .subtier("Time Period sub", "Time Period", &[(0, 10_000, time_period)])
        .tier("Trash", &[(0, 10_000, trash)])
        .subtier("Trash sub", "Trash", &[(0, 10_000, trash)])
}

/// Two segments: a passive, recited Mother utterance during story reading
/// and a Toddler reply, neither trashed
pub fn sample_eaf() -> String {
    base_builder("Story Reading", "No")
        .tier("Mother", &[(1000, 3000, "Look, the bear is sad")])
        .ref_tier("Responsivity", "Mother", &[(0, "Passive")])
        .ref_tier("Emotion Words", "Mother", &[(0, "1")])
        .ref_tier("Directed Speech", "Mother", &[(0, "Toddler")])
        .ref_tier("Type of Speech", "Mother", &[(0, "Recited")])
        .tier("Toddler", &[(3500, 4200, "bear")])
        .ref_tier("Emotion Words - Toddler", "Toddler", &[(0, "0")])
        .build()
}
