//! Emotion labels and their dense integer codes.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::classifier::ClassifierError;

/// The three emotions the classifier distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Enamoramiento,
    Ruptura,
    Confusion,
}

impl Emotion {
    /// All labels in their canonical order.
    pub const ALL: [Emotion; 3] = [Emotion::Enamoramiento, Emotion::Ruptura, Emotion::Confusion];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enamoramiento => "enamoramiento",
            Self::Ruptura => "ruptura",
            Self::Confusion => "confusion",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enamoramiento" => Ok(Self::Enamoramiento),
            "ruptura" => Ok(Self::Ruptura),
            "confusion" => Ok(Self::Confusion),
            other => Err(ClassifierError::MalformedData(format!("unknown emotion label '{}'", other))),
        }
    }
}

/// Bidirectional label ↔ code map.
///
/// The forward map (label → code) is authoritative and is the only part
/// that gets serialized; the reverse map is rebuilt from it every time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "BTreeMap<Emotion, usize>", try_from = "BTreeMap<Emotion, usize>")]
pub struct LabelMap {
    forward: BTreeMap<Emotion, usize>,
    reverse: Vec<Emotion>,
}

impl LabelMap {
    /// Builds the map from a forward mapping. Codes must be exactly `0..n`.
    pub fn from_forward(forward: BTreeMap<Emotion, usize>) -> Result<Self, ClassifierError> {
        let n = forward.len();
        let mut reverse: Vec<Option<Emotion>> = vec![None; n];
        for (&label, &code) in &forward {
            let slot = reverse.get_mut(code).ok_or_else(|| {
                ClassifierError::MalformedData(format!(
                    "code {} for '{}' is outside 0..{}",
                    code, label, n
                ))
            })?;
            if let Some(previous) = slot.replace(label) {
                return Err(ClassifierError::MalformedData(format!(
                    "labels '{}' and '{}' share code {}",
                    previous, label, code
                )));
            }
        }
        let reverse = reverse.into_iter().flatten().collect();
        Ok(Self { forward, reverse })
    }

    pub fn len(&self) -> usize {
        self.reverse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reverse.is_empty()
    }

    pub fn encode(&self, label: Emotion) -> Result<usize, ClassifierError> {
        self.forward.get(&label).copied().ok_or_else(|| {
            ClassifierError::MalformedData(format!("label '{}' is not in the label map", label))
        })
    }

    pub fn decode(&self, code: usize) -> Option<Emotion> {
        self.reverse.get(code).copied()
    }

    /// Labels ordered by code.
    pub fn labels(&self) -> &[Emotion] {
        &self.reverse
    }

    pub fn forward(&self) -> &BTreeMap<Emotion, usize> {
        &self.forward
    }
}

impl Default for LabelMap {
    fn default() -> Self {
        let forward = Emotion::ALL
            .iter()
            .enumerate()
            .map(|(code, &label)| (label, code))
            .collect();
        Self {
            forward,
            reverse: Emotion::ALL.to_vec(),
        }
    }
}

impl From<LabelMap> for BTreeMap<Emotion, usize> {
    fn from(map: LabelMap) -> Self {
        map.forward
    }
}

impl TryFrom<BTreeMap<Emotion, usize>> for LabelMap {
    type Error = ClassifierError;

    fn try_from(forward: BTreeMap<Emotion, usize>) -> Result<Self, Self::Error> {
        Self::from_forward(forward)
    }
}
