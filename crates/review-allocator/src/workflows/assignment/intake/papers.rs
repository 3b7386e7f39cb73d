use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::IntakeError;
use crate::workflows::assignment::domain::{MethodClass, Paper, PaperId};

#[derive(Debug, Deserialize)]
struct PaperRow {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default, rename = "abstract")]
    abstract_text: String,
    #[serde(default, deserialize_with = "split_keywords")]
    keywords: Vec<String>,
    #[serde(default)]
    method: Option<String>,
}

fn split_keywords<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .split(',')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(str::to_string)
        .collect())
}

/// Reader for the paper export (`id,title,abstract,keywords[,method]`).
pub struct PaperSource;

impl PaperSource {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Paper>, IntakeError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Rows keep file order. Ids are not validated here; blank or duplicate
    /// ids are rejected when the roster is built.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Paper>, IntakeError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut papers = Vec::new();

        for row in csv_reader.deserialize::<PaperRow>() {
            let row = row?;
            papers.push(Paper {
                id: PaperId(row.id),
                title: row.title,
                abstract_text: row.abstract_text,
                keywords: row.keywords,
                method: row
                    .method
                    .as_deref()
                    .map(MethodClass::from_label)
                    .unwrap_or_default(),
            });
        }

        Ok(papers)
    }
}
