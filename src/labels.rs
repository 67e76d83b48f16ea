//! Ordered label set shared by every branch of the engine.
//!
//! The position of a label in the [`LabelSet`] is the index used by every
//! probability vector the engine produces.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::read_config_file;
use crate::error::{ConfigError, Result};

pub const CALM: &str = "calm";
pub const ENERGETIC: &str = "energetic";
pub const SUSPENSE: &str = "suspense";
pub const JOYFUL: &str = "joyful";
pub const SAD: &str = "sad";

/// A single label with the text prompt handed to the vision backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// Display name, unique within a set
    pub name: String,

    /// Text description used for zero-shot image scoring
    pub prompt: String,
}

impl Label {
    pub fn new<N: Into<String>, P: Into<String>>(name: N, prompt: P) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
        }
    }
}

/// Validated, immutable, ordered list of labels
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LabelSet {
    labels: Vec<Label>,
}

/// On-disk shape of `labels.json`
#[derive(Debug, Deserialize)]
struct LabelsFile {
    labels: Vec<Label>,
}

impl LabelSet {
    /// Build a label set, rejecting fewer than two labels or duplicate names
    pub fn new(labels: Vec<Label>) -> Result<Self> {
        if labels.len() < 2 {
            return Err(ConfigError::TooFewLabels { count: labels.len() }.into());
        }

        let mut seen = HashSet::with_capacity(labels.len());
        for label in &labels {
            if !seen.insert(label.name.as_str()) {
                return Err(ConfigError::DuplicateLabel { name: label.name.clone() }.into());
            }
        }

        Ok(Self { labels })
    }

    /// The five built-in mood labels in canonical order
    pub fn moods() -> Self {
        Self {
            labels: vec![
                Label::new(CALM, "a calm, peaceful and relaxing scene"),
                Label::new(ENERGETIC, "an energetic, exciting and intense scene"),
                Label::new(SUSPENSE, "a suspenseful, tense and mysterious scene"),
                Label::new(JOYFUL, "a joyful, happy and cheerful scene"),
                Label::new(SAD, "a sad, gloomy and melancholic scene"),
            ],
        }
    }

    /// Load labels from a JSON file shaped `{"labels": [{"name", "prompt"}, ...]}`
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = read_config_file(path)?;

        let file: LabelsFile = serde_json::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;

        Self::new(file.labels)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Label> {
        self.labels.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|label| label.name.as_str())
    }

    pub fn prompts(&self) -> Vec<&str> {
        self.labels.iter().map(|label| label.prompt.as_str()).collect()
    }

    /// Index of the label with the given name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.labels.iter().position(|label| label.name == name)
    }
}

impl<'de> Deserialize<'de> for LabelSet {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let labels = Vec::<Label>::deserialize(deserializer)?;
        LabelSet::new(labels).map_err(serde::de::Error::custom)
    }
}
