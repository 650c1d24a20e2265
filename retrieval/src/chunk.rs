//! Chunk records and modality tags

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;

/// Origin of a chunk's text
///
/// Image chunks carry caption text produced by a vision model, not pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Image,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modality {
    type Err = RetrievalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            other => Err(RetrievalError::InvalidModality(other.to_string())),
        }
    }
}

/// Restricts search results to one modality, or neither
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModalityFilter {
    #[default]
    Both,
    Text,
    Image,
}

impl ModalityFilter {
    /// Whether a chunk of `modality` passes this filter
    pub fn matches(&self, modality: Modality) -> bool {
        match self {
            Self::Both => true,
            Self::Text => modality == Modality::Text,
            Self::Image => modality == Modality::Image,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Both => "both",
            Self::Text => "text",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for ModalityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModalityFilter {
    type Err = RetrievalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "both" => Ok(Self::Both),
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            other => Err(RetrievalError::InvalidModality(other.to_string())),
        }
    }
}

/// A retrievable unit of text tagged with its source and modality
///
/// Inside a `RetrievalStore` a chunk's identity is its position in the
/// chunk sequence, which is also its row in the embedding matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub source: String,
    pub modality: Modality,
    /// Similarity score; 0.0 until the chunk is returned by a search
    #[serde(default)]
    pub score: f32,
}

impl Chunk {
    pub fn new(text: impl Into<String>, source: impl Into<String>, modality: Modality) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
            modality,
            score: 0.0,
        }
    }

    /// Copy of this chunk carrying `score`
    pub fn with_score(&self, score: f32) -> Self {
        Self {
            text: self.text.clone(),
            source: self.source.clone(),
            modality: self.modality,
            score,
        }
    }
}
