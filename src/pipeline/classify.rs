//! Imprint classification.
//!
//! Decides whether a series name belongs to one of the tracked shinsho
//! imprints. Matching is case-sensitive exact substring containment with no
//! width or whitespace normalization.

use serde::{Deserialize, Serialize};

/// Containment direction between a series name and a known label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// The series name contains the label. Used by the main filter.
    #[default]
    Contains,
    /// Either string contains the other. Used when reporting which
    /// normalized series labels are already covered.
    Bidirectional,
}

impl MatchMode {
    fn matches(self, series: &str, label: &str) -> bool {
        if series.is_empty() || label.is_empty() {
            return false;
        }
        match self {
            MatchMode::Contains => series.contains(label),
            MatchMode::Bidirectional => series.contains(label) || label.contains(series),
        }
    }
}

/// Classifier over a configured list of known imprint labels.
#[derive(Debug, Clone)]
pub struct ImprintClassifier {
    labels: Vec<String>,
    mode: MatchMode,
}

impl ImprintClassifier {
    pub fn new(labels: Vec<String>, mode: MatchMode) -> Self {
        Self { labels, mode }
    }

    /// Build from the classifier section of the config.
    pub fn from_config(config: &crate::models::ClassifierConfig) -> Self {
        Self::new(config.labels.clone(), config.match_mode)
    }

    /// Same labels, different containment direction.
    pub fn with_mode(&self, mode: MatchMode) -> Self {
        Self {
            labels: self.labels.clone(),
            mode,
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Longest known label matching the series name.
    pub fn matched_label(&self, series: &str) -> Option<&str> {
        self.labels
            .iter()
            .map(String::as_str)
            .filter(|label| self.mode.matches(series, label))
            .max_by_key(|label| label.chars().count())
    }

    pub fn is_tracked(&self, series: &str) -> bool {
        self.matched_label(series).is_some()
    }
}

/// Check a series name against known labels with one-directional containment.
pub fn is_tracked_imprint(series: &str, known_labels: &[String]) -> bool {
    known_labels
        .iter()
        .any(|label| MatchMode::Contains.matches(series, label))
}
