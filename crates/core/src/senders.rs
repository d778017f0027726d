use std::cmp::Ordering;
use std::collections::HashMap;

use crate::domain::{Channel, ExportDocument, SenderOverrides};
use crate::error::ReplayError;
use crate::ports::Result;

/// Occurrence count per non-empty sender label
#[derive(Debug, Clone, Default)]
pub struct SenderFrequencyTable {
    counts: HashMap<String, usize>,
}

impl SenderFrequencyTable {
    /// Tallies the sender-label index of every document
    pub fn from_documents(documents: &[ExportDocument]) -> Self {
        let mut table = Self::default();
        for document in documents {
            for label in &document.sender_labels {
                table.record(label);
            }
        }
        table
    }

    /// Counts one occurrence; empty labels are ignored
    pub fn record(&mut self, label: &str) {
        if label.is_empty() {
            return;
        }
        *self.counts.entry(label.to_string()).or_insert(0) += 1;
    }

    pub fn count(&self, label: &str) -> usize {
        self.counts.get(label).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Distinct labels, most frequent first
    pub fn ranking(&self) -> Vec<String> {
        let mut entries: Vec<(&str, usize)> = self
            .counts
            .iter()
            .map(|(label, count)| (label.as_str(), *count))
            .collect();
        entries.sort_by(|a, b| rank_order(*a, *b));
        entries.into_iter().map(|(label, _)| label.to_string()).collect()
    }
}

/// Total order for ranking: descending count, then label so equal counts stay deterministic
pub fn rank_order(a: (&str, usize), b: (&str, usize)) -> Ordering {
    b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0))
}

/// Which sender label is routed to which outbound channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelAssignment {
    /// Informational; the primary channel also receives every unmatched label
    pub primary: String,
    pub secondary: Option<String>,
}

impl ChannelAssignment {
    /// Overrides win outright; otherwise rank 0 and rank 1 fill the two slots
    pub fn resolve(ranking: &[String], overrides: &SenderOverrides) -> Result<Self> {
        if ranking.is_empty() {
            return Err(ReplayError::NoSenders);
        }

        let primary = non_empty(&overrides.primary)
            .unwrap_or_else(|| ranking[0].clone());
        let secondary = non_empty(&overrides.secondary).or_else(|| ranking.get(1).cloned());

        Ok(Self { primary, secondary })
    }

    pub fn channel_for(&self, sender: &str) -> Channel {
        match &self.secondary {
            Some(secondary) if secondary == sender => Channel::Secondary,
            _ => Channel::Primary,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}
