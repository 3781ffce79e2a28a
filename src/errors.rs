/*!
 * Error types for the gornikeaf application.
 *
 * This module contains custom error types for the different stages of the
 * pipeline, using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;

use quick_xml::events::attributes::AttrError;
use thiserror::Error;

/// Errors that can occur while loading an EAF annotation document
#[derive(Error, Debug)]
pub enum EafError {
    /// The file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not UTF-8 encoded
    #[error("Document is not valid UTF-8 after byte {valid_up_to} (declared encoding: {declared})")]
    NotUtf8 {
        /// Encoding named in the XML declaration, or "none"
        declared: String,
        /// Length of the valid UTF-8 prefix
        valid_up_to: usize,
    },

    /// The XML itself is malformed
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// An attribute could not be parsed
    #[error("XML attribute error: {0}")]
    Attribute(#[from] AttrError),

    /// The root element is not an ELAN annotation document
    #[error("Not an EAF document: root element is <{0}>")]
    NotAnnotationDocument(String),

    /// A required attribute is absent from an element
    #[error("<{element}> is missing required attribute {attribute}")]
    MissingAttribute {
        /// Element name
        element: &'static str,
        /// Attribute name
        attribute: &'static str,
    },

    /// A time slot value is not a non-negative integer
    #[error("Time slot {slot} has invalid TIME_VALUE '{value}'")]
    InvalidTimeValue {
        /// Time slot ID
        slot: String,
        /// Raw attribute text
        value: String,
    },

    /// An annotation references a time slot that does not exist
    #[error("Annotation {annotation} references unknown time slot {slot}")]
    UnknownTimeSlot {
        /// Annotation ID
        annotation: String,
        /// Time slot ID
        slot: String,
    },

    /// A reference annotation cannot be resolved to an aligned annotation
    #[error("Annotation {annotation} references unresolvable annotation {reference}")]
    UnresolvedReference {
        /// Annotation ID
        annotation: String,
        /// Referenced annotation ID
        reference: String,
    },

    /// An annotation ends before it starts
    #[error("Annotation {annotation} ends before it starts ({start_ms} > {end_ms})")]
    InvalidInterval {
        /// Annotation ID
        annotation: String,
        /// Start in milliseconds
        start_ms: u64,
        /// End in milliseconds
        end_ms: u64,
    },

    /// Two tiers share the same ID
    #[error("Duplicate tier '{0}'")]
    DuplicateTier(String),

    /// An expected tier is absent
    #[error("Missing {0} tier")]
    MissingTier(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// An input document could not be loaded
    #[error("Failed to load {}: {source}", path.display())]
    Document {
        /// Input file
        path: PathBuf,
        /// Underlying load error
        #[source]
        source: EafError,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error writing the CSV output
    #[error("Output error: {0}")]
    Output(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    /// Wraps a load error with the path of the file that caused it
    pub fn document<P: Into<PathBuf>>(path: P, source: EafError) -> Self {
        Self::Document {
            path: path.into(),
            source,
        }
    }
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(error: csv::Error) -> Self {
        Self::Output(error.to_string())
    }
}
