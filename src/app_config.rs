use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and overriding configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// CSV file the coded rows are written to
    #[serde(default = "default_output_path")]
    pub output_path: String,

    /// CSV field separator
    #[serde(default)]
    pub delimiter: OutputDelimiter,

    /// Names of the tiers read from each document
    #[serde(default)]
    pub tiers: TierNames,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// CSV field separator
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputDelimiter {
    // @delimiter: ','
    #[default]
    Comma,
    // @delimiter: '\t'
    Tab,
    // @delimiter: ASCII unit separator (0x1F)
    Ascii,
}

impl OutputDelimiter {
    // @returns: Separator byte written between fields
    pub fn as_byte(&self) -> u8 {
        match self {
            Self::Comma => b',',
            Self::Tab => b'\t',
            Self::Ascii => 0x1f,
        }
    }

    // @returns: Lowercase identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Comma => "comma".to_string(),
            Self::Tab => "tab".to_string(),
            Self::Ascii => "ascii".to_string(),
        }
    }
}

impl std::fmt::Display for OutputDelimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for OutputDelimiter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "comma" => Ok(Self::Comma),
            "tab" => Ok(Self::Tab),
            "ascii" => Ok(Self::Ascii),
            _ => Err(anyhow!("Invalid delimiter: {}", s)),
        }
    }
}

/// Tier names looked up in every annotation document
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TierNames {
    /// Mother utterance segments
    #[serde(default = "default_mother_tier")]
    pub mother: String,

    /// Toddler utterance segments
    #[serde(default = "default_toddler_tier")]
    pub toddler: String,

    /// Activity coding (story reading / conversation)
    #[serde(default = "default_time_period_tier")]
    pub time_period: String,

    /// Noise coding
    #[serde(default = "default_trash_tier")]
    pub trash: String,

    #[serde(default = "default_responsivity_tier")]
    pub responsivity: String,

    #[serde(default = "default_emotion_words_tier")]
    pub emotion_words: String,

    #[serde(default = "default_type_of_speech_tier")]
    pub type_of_speech: String,

    #[serde(default = "default_directed_speech_tier")]
    pub directed_speech: String,

    /// Emotion word counts for toddler segments
    #[serde(default = "default_toddler_emotion_words_tier")]
    pub toddler_emotion_words: String,
}

impl TierNames {
    /// Tiers that must be present for a document to be coded
    pub fn required(&self) -> [&str; 4] {
        [
            self.time_period.as_str(),
            self.trash.as_str(),
            self.mother.as_str(),
            self.toddler.as_str(),
        ]
    }

    fn all(&self) -> [(&'static str, &str); 9] {
        [
            ("mother", self.mother.as_str()),
            ("toddler", self.toddler.as_str()),
            ("time_period", self.time_period.as_str()),
            ("trash", self.trash.as_str()),
            ("responsivity", self.responsivity.as_str()),
            ("emotion_words", self.emotion_words.as_str()),
            ("type_of_speech", self.type_of_speech.as_str()),
            ("directed_speech", self.directed_speech.as_str()),
            ("toddler_emotion_words", self.toddler_emotion_words.as_str()),
        ]
    }
}

impl Default for TierNames {
    fn default() -> Self {
        Self {
            mother: default_mother_tier(),
            toddler: default_toddler_tier(),
            time_period: default_time_period_tier(),
            trash: default_trash_tier(),
            responsivity: default_responsivity_tier(),
            emotion_words: default_emotion_words_tier(),
            type_of_speech: default_type_of_speech_tier(),
            directed_speech: default_directed_speech_tier(),
            toddler_emotion_words: default_toddler_emotion_words_tier(),
        }
    }
}

/// Log level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Level selected by repeated `-v` flags, if any
    pub fn from_verbosity(count: u8) -> Option<Self> {
        match count {
            0 => None,
            1 => Some(Self::Info),
            _ => Some(Self::Debug),
        }
    }

    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

pub const DEFAULT_OUTPUT_PATH: &str = "gornikeaf-output.csv";

fn default_output_path() -> String {
    DEFAULT_OUTPUT_PATH.to_string()
}

fn default_mother_tier() -> String {
    "Mother".to_string()
}

fn default_toddler_tier() -> String {
    "Toddler".to_string()
}

fn default_time_period_tier() -> String {
    "Time Period sub".to_string()
}

fn default_trash_tier() -> String {
    "Trash sub".to_string()
}

fn default_responsivity_tier() -> String {
    "Responsivity".to_string()
}

fn default_emotion_words_tier() -> String {
    "Emotion Words".to_string()
}

fn default_type_of_speech_tier() -> String {
    "Type of Speech".to_string()
}

fn default_directed_speech_tier() -> String {
    "Directed Speech".to_string()
}

fn default_toddler_emotion_words_tier() -> String {
    "Emotion Words - Toddler".to_string()
}

impl Config {
    /// Load a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.output_path.trim().is_empty() {
            return Err(anyhow!("Output path must not be empty"));
        }

        for (key, name) in self.tiers.all() {
            if name.trim().is_empty() {
                return Err(anyhow!("Tier name '{}' must not be empty", key));
            }
        }

        let required = self.tiers.required();
        for (i, name) in required.iter().enumerate() {
            if required[i + 1..].contains(name) {
                return Err(anyhow!("Tier '{}' is configured for more than one role", name));
            }
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            output_path: default_output_path(),
            delimiter: OutputDelimiter::default(),
            tiers: TierNames::default(),
            log_level: LogLevel::default(),
        }
    }
}
