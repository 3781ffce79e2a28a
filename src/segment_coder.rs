/*!
 * Coding of Mother and Toddler segments.
 *
 * Every utterance in the Mother and Toddler tiers becomes a `Segment` whose
 * dimensions are read from the time-aligned subtiers and mapped onto small
 * integer codes. Text matching is case-insensitive and substring based, in
 * table order, so "Elaborative" and "Collaborative" both hit "aborative".
 *
 * Text that matches nothing leaves the dimension uncoded and is reported as
 * a warning; the segment itself is always kept.
 */

use std::collections::HashSet;
use std::fmt;

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::app_config::TierNames;
use crate::eaf_document::{Annotation, AnnotationDocument};
use crate::file_utils::FileManager;
use crate::tier_index::{TierIndex, TimeInterval};

// @const: First run of digits in an emotion-word label
static DIGITS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

// @const: Word tokens in utterance text
static WORD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]+(?:'[A-Za-z]+)*").unwrap());

// prefix match: "No", "None" and "Noisy" all keep the segment
static TRASH_KEEP_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^no").unwrap());
static TRASH_NOISY_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)noisy|overlap").unwrap());

/// Words counted in utterance text for the Emotion Words column
pub const EMOTION_WORDS: &[&str] = &[
    "afraid", "angry", "annoyed", "anxious", "ashamed", "bored", "brave", "calm", "cheerful",
    "cranky", "cried", "cry", "crying", "curious", "disappointed", "disgusted", "embarrassed",
    "excited", "fear", "feel", "feeling", "feelings", "feels", "frightened", "frustrated",
    "fun", "funny", "glad", "grumpy", "happy", "hate", "hurt", "jealous", "laugh", "laughing",
    "lonely", "love", "loves", "mad", "nervous", "proud", "sad", "scared", "scary", "shy",
    "silly", "sorry", "surprised", "tired", "upset", "worried", "yucky",
];

static EMOTION_WORD_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| EMOTION_WORDS.iter().copied().collect());

/// A dimension whose annotation text maps to a small integer code
pub trait CodedValue: Copy + Sized + 'static {
    /// Column name, also used in log messages
    const DIMENSION: &'static str;

    /// Keywords checked in order against the lowercased annotation text
    const TABLE: &'static [(&'static str, Self)];

    fn code(self) -> u8;

    /// Map annotation text to a value, `None` if no keyword matches
    fn classify(text: &str) -> Option<Self> {
        let lowered = text.to_lowercase();
        Self::TABLE
            .iter()
            .find(|(keyword, _)| lowered.contains(keyword))
            .map(|&(_, value)| value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Speaker {
    Mother,
    Toddler,
}

impl Speaker {
    pub fn code(self) -> u8 {
        match self {
            Self::Mother => 0,
            Self::Toddler => 1,
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mother => write!(f, "mother"),
            Self::Toddler => write!(f, "toddler"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Responsivity {
    Passive,
    /// Elaborative or Collaborative
    Elaborative,
    Disconnected,
}

impl CodedValue for Responsivity {
    const DIMENSION: &'static str = "Responsivity";
    const TABLE: &'static [(&'static str, Self)] = &[
        ("passive", Self::Passive),
        ("aborative", Self::Elaborative),
        ("disconnected", Self::Disconnected),
    ];

    fn code(self) -> u8 {
        match self {
            Self::Passive => 0,
            Self::Elaborative => 1,
            Self::Disconnected => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeOfSpeech {
    Recited,
    Spontaneous,
}

impl CodedValue for TypeOfSpeech {
    const DIMENSION: &'static str = "Type of Speech";
    const TABLE: &'static [(&'static str, Self)] =
        &[("recited", Self::Recited), ("spontan", Self::Spontaneous)];

    fn code(self) -> u8 {
        match self {
            Self::Recited => 0,
            Self::Spontaneous => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectedSpeech {
    Assistant,
    Toddler,
}

impl CodedValue for DirectedSpeech {
    const DIMENSION: &'static str = "Directed Speech";
    const TABLE: &'static [(&'static str, Self)] =
        &[("assistant", Self::Assistant), ("toddler", Self::Toddler)];

    fn code(self) -> u8 {
        match self {
            Self::Assistant => 0,
            Self::Toddler => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePeriod {
    StoryReading,
    Conversation,
}

impl CodedValue for TimePeriod {
    const DIMENSION: &'static str = "Time Period";
    const TABLE: &'static [(&'static str, Self)] =
        &[("story", Self::StoryReading), ("conversation", Self::Conversation)];

    fn code(self) -> u8 {
        match self {
            Self::StoryReading => 0,
            Self::Conversation => 1,
        }
    }
}

/// Noise coding for a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trash {
    /// Some overlapping label starts with "no"
    Keep,
    /// Labelled noisy or overlapping speech
    Noisy,
    /// Anything else, including no label at all
    Discard,
}

impl Trash {
    pub fn code(self) -> u8 {
        match self {
            Self::Keep => 0,
            Self::Noisy => 1,
            Self::Discard => 2,
        }
    }

    /// Combine every Trash label overlapping a segment
    pub fn from_labels<'t, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'t str>,
    {
        let mut noisy = false;
        for label in labels {
            if TRASH_KEEP_REGEX.is_match(label) {
                return Self::Keep;
            }
            if TRASH_NOISY_REGEX.is_match(label) {
                noisy = true;
            }
        }
        if noisy { Self::Noisy } else { Self::Discard }
    }
}

/// One coded Mother or Toddler utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub participant_id: String,
    pub speaker: Speaker,
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
    pub responsivity: Option<Responsivity>,
    pub emotion_words: u32,
    pub type_of_speech: Option<TypeOfSpeech>,
    pub directed_speech: Option<DirectedSpeech>,
    pub time_period: Option<TimePeriod>,
    pub trash: Trash,
}

/// Emotion word count written by a human coder in a subtier label, e.g. "2 words"
pub fn emotion_count_from_label(label: &str) -> u32 {
    match DIGITS_REGEX.find(label) {
        Some(m) => m.as_str().parse().unwrap_or_else(|_| {
            warn!("Emotion word count '{}' is out of range, using 0", m.as_str());
            0
        }),
        None => 0,
    }
}

/// Number of tokens in `text` that are emotion words
pub fn count_emotion_words(text: &str) -> u32 {
    let count = WORD_REGEX
        .find_iter(text)
        .filter(|m| EMOTION_WORD_SET.contains(m.as_str().to_lowercase().as_str()))
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Codes the Mother and Toddler segments of one document
pub struct SegmentCoder<'a> {
    index: TierIndex<'a>,
    tiers: &'a TierNames,
    participant_id: String,
}

impl<'a> SegmentCoder<'a> {
    pub fn new(document: &'a AnnotationDocument, tiers: &'a TierNames) -> Self {
        let coder = SegmentCoder {
            index: TierIndex::new(document),
            tiers,
            participant_id: FileManager::participant_id(&document.source_file),
        };

        for name in [
            &tiers.responsivity,
            &tiers.emotion_words,
            &tiers.type_of_speech,
            &tiers.directed_speech,
            &tiers.toddler_emotion_words,
        ] {
            if !document.has_tier(name) {
                warn!(
                    "{}: no '{}' tier, its column will not be coded",
                    coder.participant_id, name
                );
            }
        }

        coder
    }

    pub fn participant_id(&self) -> &str {
        &self.participant_id
    }

    /// Mother segments followed by Toddler segments, each in time order
    pub fn code_document(&self) -> Vec<Segment> {
        let mut segments = Vec::new();
        for (speaker, tier_name) in [
            (Speaker::Mother, &self.tiers.mother),
            (Speaker::Toddler, &self.tiers.toddler),
        ] {
            let Some(tier) = self.index.tier(tier_name) else {
                continue;
            };
            debug!("{}: coding {} '{}' segments", self.participant_id, tier.len(), tier_name);
            segments.extend(
                tier.annotations
                    .iter()
                    .map(|annotation| self.code_segment(speaker, annotation)),
            );
        }
        segments
    }

    pub fn code_segment(&self, speaker: Speaker, annotation: &Annotation) -> Segment {
        let interval = TimeInterval::from(annotation);
        debug!(
            "{} segment: ({}, {}, {:?})",
            speaker, annotation.start_ms, annotation.end_ms, annotation.text
        );

        let (responsivity, type_of_speech, directed_speech, emotion_tier) = match speaker {
            Speaker::Mother => (
                self.resolve::<Responsivity>(speaker, &self.tiers.responsivity, interval),
                self.resolve::<TypeOfSpeech>(speaker, &self.tiers.type_of_speech, interval),
                self.resolve::<DirectedSpeech>(speaker, &self.tiers.directed_speech, interval),
                &self.tiers.emotion_words,
            ),
            Speaker::Toddler => (None, None, None, &self.tiers.toddler_emotion_words),
        };

        let segment = Segment {
            participant_id: self.participant_id.clone(),
            speaker,
            start_ms: annotation.start_ms,
            end_ms: annotation.end_ms,
            text: annotation.text.clone(),
            responsivity,
            emotion_words: self.emotion_words(speaker, emotion_tier, annotation),
            type_of_speech,
            directed_speech,
            time_period: self.resolve::<TimePeriod>(speaker, &self.tiers.time_period, interval),
            trash: self.trash(interval),
        };
        debug!("{:?}", segment);
        segment
    }

    /// Look up and classify one dimension for a segment
    pub fn resolve<T: CodedValue>(
        &self,
        speaker: Speaker,
        tier: &str,
        interval: TimeInterval,
    ) -> Option<T> {
        let annotation = self.subtier_annotation(speaker, tier, interval)?;
        let value = T::classify(&annotation.text);
        if value.is_none() {
            warn!(
                "{}: unexpected '{}' value {:?} for {} segment at {} ms",
                self.participant_id, T::DIMENSION, annotation.text, speaker, interval.start_ms
            );
        }
        value
    }

    /// Lexicon count of the segment text; the subtier count is only compared
    fn emotion_words(&self, speaker: Speaker, tier: &str, annotation: &Annotation) -> u32 {
        let count = count_emotion_words(&annotation.text);
        let interval = TimeInterval::from(annotation);
        if let Some(label) = self.subtier_annotation(speaker, tier, interval) {
            let coded = emotion_count_from_label(&label.text);
            if coded != count {
                debug!(
                    "{}: '{}' says {} for {} segment at {} ms, text has {}",
                    self.participant_id, tier, coded, speaker, interval.start_ms, count
                );
            }
        }
        count
    }

    fn trash(&self, interval: TimeInterval) -> Trash {
        let tier = &self.tiers.trash;
        let covering = self.index.annotations_at(tier, interval.probe_ms());
        let starting = self.index.annotations_starting_within(tier, interval);
        Trash::from_labels(
            covering
                .into_iter()
                .chain(starting)
                .map(|a| a.text.as_str()),
        )
    }

    fn subtier_annotation(
        &self,
        speaker: Speaker,
        tier: &str,
        interval: TimeInterval,
    ) -> Option<&'a Annotation> {
        if self.index.tier(tier).is_none() {
            return None;
        }
        let Some(annotation) = self.index.lookup(tier, interval) else {
            warn!(
                "{}: no '{}' annotation for {} segment at {} ms",
                self.participant_id, tier, speaker, interval.start_ms
            );
            return None;
        };
        if !annotation.has_bounds(interval.start_ms, interval.end_ms) {
            warn!(
                "{}: tier '{}' segment at {} ms doesn't match {} segment at {} ms",
                self.participant_id, tier, annotation.start_ms, speaker, interval.start_ms
            );
        }
        Some(annotation)
    }
}
