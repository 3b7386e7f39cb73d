use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::IntakeError;
use crate::workflows::assignment::domain::{Reviewer, ReviewerCapability, ReviewerId};
use crate::workflows::assignment::settings::CapacityPolicy;

/// Raw reviewer directory record, before capacity resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewerEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Explicit method label; wins over one embedded in `expertise`.
    #[serde(default)]
    pub method: Option<String>,
    /// Either `"Method: X | Keywords: a, b"` or a bare comma list.
    #[serde(default)]
    pub expertise: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, alias = "max_papers", alias = "capacity")]
    pub max_papers: Option<u32>,
}

impl ReviewerEntry {
    pub fn into_reviewer(self, fallback_id: Option<&str>, policy: &CapacityPolicy) -> Reviewer {
        let (expertise_method, expertise_keywords) =
            parse_expertise(self.expertise.as_deref().unwrap_or_default());

        let capability = self
            .method
            .as_deref()
            .or(expertise_method.as_deref())
            .map(ReviewerCapability::from_label)
            .unwrap_or_default();

        let expertise = if self.keywords.is_empty() {
            expertise_keywords
        } else {
            self.keywords
        };

        let id = self
            .id
            .as_deref()
            .or(fallback_id)
            .unwrap_or_default()
            .trim()
            .to_string();

        Reviewer {
            id: ReviewerId(id),
            name: self.name.trim().to_string(),
            capability,
            capacity: policy.resolve(self.max_papers),
            expertise,
        }
    }
}

/// Splits an expertise string into an optional method label and keywords.
pub fn parse_expertise(raw: &str) -> (Option<String>, Vec<String>) {
    let raw = raw.trim();
    if raw.is_empty() {
        return (None, Vec::new());
    }

    if !raw.contains('|') {
        return (None, split_list(raw));
    }

    let mut method = None;
    let mut keywords = Vec::new();
    for part in raw.split('|').map(str::trim) {
        let lowered = part.to_ascii_lowercase();
        if lowered.starts_with("method:") {
            let value = part["method:".len()..].trim();
            if !value.is_empty() {
                method = Some(value.to_string());
            }
        } else if lowered.starts_with("keywords:") {
            keywords = split_list(&part["keywords:".len()..]);
        }
    }
    (method, keywords)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DirectoryDocument {
    Keyed(BTreeMap<String, ReviewerEntry>),
    Listed(Vec<ReviewerEntry>),
}

/// Reader for the reviewer directory export.
///
/// Accepts either an object keyed by reviewer id (the store's native shape,
/// read in id order) or an array of entries carrying their own `id`.
pub struct ReviewerDirectory;

impl ReviewerDirectory {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        policy: &CapacityPolicy,
    ) -> Result<Vec<Reviewer>, IntakeError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, policy)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        policy: &CapacityPolicy,
    ) -> Result<Vec<Reviewer>, IntakeError> {
        let document: DirectoryDocument = serde_json::from_reader(reader)?;
        Ok(Self::resolve(document, policy))
    }

    fn resolve(document: DirectoryDocument, policy: &CapacityPolicy) -> Vec<Reviewer> {
        match document {
            DirectoryDocument::Keyed(entries) => entries
                .into_iter()
                .map(|(key, entry)| entry.into_reviewer(Some(&key), policy))
                .collect(),
            DirectoryDocument::Listed(entries) => entries
                .into_iter()
                .map(|entry| entry.into_reviewer(None, policy))
                .collect(),
        }
    }
}
