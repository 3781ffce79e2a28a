/*!
 * Loading of ELAN annotation (EAF) documents.
 *
 * An EAF file is an XML document with a global `TIME_ORDER` of time slots and
 * a list of `TIER`s. Each tier holds either time-aligned annotations, which
 * point at two time slots, or reference annotations, which inherit the
 * interval of the annotation they point at. The loader flattens both kinds
 * into plain `(start, end, text)` records sorted by time.
 */

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, warn};
use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::errors::EafError;

/// Single time-aligned annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// ANNOTATION_ID from the document
    pub id: String,

    /// Start time in ms
    pub start_ms: u64,

    /// End time in ms
    pub end_ms: u64,

    /// Annotation value, trimmed
    pub text: String,
}

impl Annotation {
    pub fn new(id: &str, start_ms: u64, end_ms: u64, text: &str) -> Self {
        Annotation {
            id: id.to_string(),
            start_ms,
            end_ms,
            text: text.to_string(),
        }
    }

    /// Whether the instant lies within the annotation, bounds included
    pub fn covers(&self, time_ms: u64) -> bool {
        self.start_ms <= time_ms && time_ms <= self.end_ms
    }

    /// Whether both bounds equal the given interval
    pub fn has_bounds(&self, start_ms: u64, end_ms: u64) -> bool {
        self.start_ms == start_ms && self.end_ms == end_ms
    }
}

/// Named track of annotations, sorted by start then end
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tier {
    pub name: String,

    /// PARENT_REF for dependent tiers
    pub parent: Option<String>,

    pub annotations: Vec<Annotation>,
}

impl Tier {
    pub fn new(name: &str, parent: Option<&str>, mut annotations: Vec<Annotation>) -> Self {
        // stable: document order breaks ties
        annotations.sort_by_key(|a| (a.start_ms, a.end_ms));
        Tier {
            name: name.to_string(),
            parent: parent.map(str::to_string),
            annotations,
        }
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}

/// In-memory EAF document: tiers in document order, addressable by name
#[derive(Debug, Clone)]
pub struct AnnotationDocument {
    /// Source filename
    pub source_file: PathBuf,

    tiers: Vec<Tier>,
    by_name: HashMap<String, usize>,
}

impl AnnotationDocument {
    /// Build a document from already-parsed tiers
    pub fn from_tiers(source_file: PathBuf, tiers: Vec<Tier>) -> Result<Self, EafError> {
        let mut by_name = HashMap::with_capacity(tiers.len());
        for (i, tier) in tiers.iter().enumerate() {
            if by_name.insert(tier.name.clone(), i).is_some() {
                return Err(EafError::DuplicateTier(tier.name.clone()));
            }
        }

        Ok(AnnotationDocument {
            source_file,
            tiers,
            by_name,
        })
    }

    /// Load a document and check that every required tier is present
    pub fn load<P: AsRef<Path>>(path: P, required_tiers: &[&str]) -> Result<Self, EafError> {
        let document = Self::from_file(path)?;
        document.require_tiers(required_tiers)?;
        Ok(document)
    }

    /// Parse an EAF file. Only UTF-8 content is accepted.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, EafError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let content = String::from_utf8(bytes).map_err(|e| {
            let declared = declared_encoding(e.as_bytes()).unwrap_or_else(|| "none".to_string());
            error!(
                "{} is not UTF-8 (declared encoding: {}); re-save it as UTF-8 in ELAN",
                path.display(),
                declared
            );
            EafError::NotUtf8 {
                declared,
                valid_up_to: e.utf8_error().valid_up_to(),
            }
        })?;
        let mut document = Self::parse_str(&content)?;
        document.source_file = path.to_path_buf();
        Ok(document)
    }

    /// Parse EAF content held in memory
    pub fn parse_str(content: &str) -> Result<Self, EafError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let raw = RawDocument::parse(content)?;
        let tiers = raw.resolve()?;
        Self::from_tiers(PathBuf::new(), tiers)
    }

    pub fn tier(&self, name: &str) -> Option<&Tier> {
        self.by_name.get(name).map(|&i| &self.tiers[i])
    }

    pub fn has_tier(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn require_tier(&self, name: &str) -> Result<&Tier, EafError> {
        self.tier(name)
            .ok_or_else(|| EafError::MissingTier(name.to_string()))
    }

    /// Fails with the first tier in `names` that is absent
    pub fn require_tiers(&self, names: &[&str]) -> Result<(), EafError> {
        for name in names {
            self.require_tier(name)?;
        }
        Ok(())
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn tier_names(&self) -> impl Iterator<Item = &str> {
        self.tiers.iter().map(|t| t.name.as_str())
    }
}

#[derive(Debug)]
enum Anchor {
    Aligned { slot1: String, slot2: String },
    Reference(String),
}

#[derive(Debug)]
struct RawAnnotation {
    id: String,
    anchor: Anchor,
    value: String,
}

#[derive(Debug)]
struct RawTier {
    id: String,
    parent: Option<String>,
    annotations: Vec<RawAnnotation>,
}

/// Document as written: time slots and annotations still unresolved
#[derive(Debug, Default)]
struct RawDocument {
    time_slots: HashMap<String, Option<u64>>,
    tiers: Vec<RawTier>,
}

impl RawDocument {
    fn parse(content: &str) -> Result<Self, EafError> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut raw = RawDocument::default();
        let mut seen_root = false;
        let mut current: Option<RawAnnotation> = None;
        let mut in_value = false;

        loop {
            let decoder = reader.decoder();
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    Self::check_root(&mut seen_root, &e)?;
                    match e.local_name().as_ref() {
                        b"ANNOTATION_VALUE" => in_value = true,
                        _ => raw.open_element(&e, decoder, &mut current)?,
                    }
                }
                Ok(Event::Empty(e)) => {
                    Self::check_root(&mut seen_root, &e)?;
                    match e.local_name().as_ref() {
                        b"ANNOTATION_VALUE" => {}
                        b"ALIGNABLE_ANNOTATION" | b"REF_ANNOTATION" => {
                            raw.open_element(&e, decoder, &mut current)?;
                            raw.close_annotation(&mut current);
                        }
                        _ => raw.open_element(&e, decoder, &mut current)?,
                    }
                }
                Ok(Event::Text(t)) => {
                    if in_value {
                        if let Some(annotation) = current.as_mut() {
                            annotation.value.push_str(&t.unescape()?);
                        }
                    }
                }
                Ok(Event::CData(c)) => {
                    if in_value {
                        if let Some(annotation) = current.as_mut() {
                            annotation.value.push_str(&String::from_utf8_lossy(&c));
                        }
                    }
                }
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"ANNOTATION_VALUE" => in_value = false,
                    b"ALIGNABLE_ANNOTATION" | b"REF_ANNOTATION" => raw.close_annotation(&mut current),
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    error!("EAF parse failed at byte {}: {}", reader.buffer_position(), e);
                    return Err(EafError::Xml(e));
                }
                _ => {}
            }
        }

        if !seen_root {
            return Err(EafError::NotAnnotationDocument(String::new()));
        }

        debug!(
            "Parsed {} time slots and {} tiers",
            raw.time_slots.len(),
            raw.tiers.len()
        );
        Ok(raw)
    }

    fn check_root(seen_root: &mut bool, e: &BytesStart) -> Result<(), EafError> {
        if *seen_root {
            return Ok(());
        }
        let name = e.local_name();
        if name.as_ref() != b"ANNOTATION_DOCUMENT" {
            return Err(EafError::NotAnnotationDocument(
                String::from_utf8_lossy(name.as_ref()).into_owned(),
            ));
        }
        *seen_root = true;
        Ok(())
    }

    fn open_element(
        &mut self,
        e: &BytesStart,
        decoder: Decoder,
        current: &mut Option<RawAnnotation>,
    ) -> Result<(), EafError> {
        match e.local_name().as_ref() {
            b"TIME_SLOT" => {
                let id = required_attribute(e, decoder, "TIME_SLOT", "TIME_SLOT_ID")?;
                let value = match attribute(e, decoder, b"TIME_VALUE")? {
                    Some(v) => Some(v.trim().parse::<u64>().map_err(|_| {
                        EafError::InvalidTimeValue {
                            slot: id.clone(),
                            value: v.clone(),
                        }
                    })?),
                    None => None,
                };
                self.time_slots.insert(id, value);
            }
            b"TIER" => {
                let id = required_attribute(e, decoder, "TIER", "TIER_ID")?;
                let parent = attribute(e, decoder, b"PARENT_REF")?;
                self.tiers.push(RawTier {
                    id,
                    parent,
                    annotations: Vec::new(),
                });
            }
            b"ALIGNABLE_ANNOTATION" => {
                const ELEMENT: &str = "ALIGNABLE_ANNOTATION";
                *current = Some(RawAnnotation {
                    id: required_attribute(e, decoder, ELEMENT, "ANNOTATION_ID")?,
                    anchor: Anchor::Aligned {
                        slot1: required_attribute(e, decoder, ELEMENT, "TIME_SLOT_REF1")?,
                        slot2: required_attribute(e, decoder, ELEMENT, "TIME_SLOT_REF2")?,
                    },
                    value: String::new(),
                });
            }
            b"REF_ANNOTATION" => {
                const ELEMENT: &str = "REF_ANNOTATION";
                *current = Some(RawAnnotation {
                    id: required_attribute(e, decoder, ELEMENT, "ANNOTATION_ID")?,
                    anchor: Anchor::Reference(required_attribute(
                        e,
                        decoder,
                        ELEMENT,
                        "ANNOTATION_REF",
                    )?),
                    value: String::new(),
                });
            }
            _ => {}
        }
        Ok(())
    }

    fn close_annotation(&mut self, current: &mut Option<RawAnnotation>) {
        let Some(annotation) = current.take() else {
            return;
        };
        match self.tiers.last_mut() {
            Some(tier) => tier.annotations.push(annotation),
            None => warn!("Annotation {} appears outside of any tier, ignoring", annotation.id),
        }
    }

    /// Turn slot and reference anchors into millisecond intervals
    fn resolve(self) -> Result<Vec<Tier>, EafError> {
        let mut aligned: HashMap<&str, (&str, &str)> = HashMap::new();
        let mut references: HashMap<&str, &str> = HashMap::new();
        for annotation in self.tiers.iter().flat_map(|t| t.annotations.iter()) {
            match &annotation.anchor {
                Anchor::Aligned { slot1, slot2 } => {
                    aligned.insert(annotation.id.as_str(), (slot1.as_str(), slot2.as_str()));
                }
                Anchor::Reference(target) => {
                    references.insert(annotation.id.as_str(), target.as_str());
                }
            }
        }

        let mut tiers = Vec::with_capacity(self.tiers.len());
        for raw_tier in &self.tiers {
            let mut annotations = Vec::with_capacity(raw_tier.annotations.len());
            for raw in &raw_tier.annotations {
                let (slot1, slot2) = match &raw.anchor {
                    Anchor::Aligned { slot1, slot2 } => (slot1.as_str(), slot2.as_str()),
                    Anchor::Reference(target) => {
                        resolve_reference(&raw.id, target, &aligned, &references)?
                    }
                };

                let start = self.slot_time(&raw.id, slot1)?;
                let end = self.slot_time(&raw.id, slot2)?;
                let (Some(start_ms), Some(end_ms)) = (start, end) else {
                    warn!(
                        "Tier '{}': annotation {} is not time-aligned, ignoring",
                        raw_tier.id, raw.id
                    );
                    continue;
                };
                if end_ms < start_ms {
                    return Err(EafError::InvalidInterval {
                        annotation: raw.id.clone(),
                        start_ms,
                        end_ms,
                    });
                }

                annotations.push(Annotation::new(&raw.id, start_ms, end_ms, raw.value.trim()));
            }
            tiers.push(Tier::new(&raw_tier.id, raw_tier.parent.as_deref(), annotations));
        }

        Ok(tiers)
    }

    fn slot_time(&self, annotation: &str, slot: &str) -> Result<Option<u64>, EafError> {
        self.time_slots
            .get(slot)
            .copied()
            .ok_or_else(|| EafError::UnknownTimeSlot {
                annotation: annotation.to_string(),
                slot: slot.to_string(),
            })
    }
}

/// Follow a chain of reference annotations to the aligned one it hangs off
fn resolve_reference<'a>(
    id: &str,
    target: &'a str,
    aligned: &HashMap<&'a str, (&'a str, &'a str)>,
    references: &HashMap<&'a str, &'a str>,
) -> Result<(&'a str, &'a str), EafError> {
    let mut current = target;
    // a chain longer than the number of references must contain a cycle
    for _ in 0..=references.len() {
        if let Some(&slots) = aligned.get(current) {
            return Ok(slots);
        }
        match references.get(current) {
            Some(&next) => current = next,
            None => break,
        }
    }
    Err(EafError::UnresolvedReference {
        annotation: id.to_string(),
        reference: current.to_string(),
    })
}

/// `encoding` pseudo-attribute of the XML declaration, if any
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(200)];
    let mut reader = Reader::from_reader(head);
    match reader.read_event_into(&mut Vec::new()) {
        Ok(Event::Decl(decl)) => decl
            .encoding()
            .and_then(Result::ok)
            .map(|enc| String::from_utf8_lossy(&enc).into_owned()),
        _ => None,
    }
}

fn attribute(e: &BytesStart, decoder: Decoder, key: &[u8]) -> Result<Option<String>, EafError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.decode_and_unescape_value(decoder)?.into_owned()));
        }
    }
    Ok(None)
}

fn required_attribute(
    e: &BytesStart,
    decoder: Decoder,
    element: &'static str,
    key: &'static str,
) -> Result<String, EafError> {
    attribute(e, decoder, key.as_bytes())?.ok_or(EafError::MissingAttribute {
        element,
        attribute: key,
    })
}
