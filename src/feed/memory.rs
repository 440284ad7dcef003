//! In-memory schedule source
//!
//! Serves documents loaded up front, either from a JSON file of documents
//! (offline use) or built directly in tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

use super::ScheduleSource;
use crate::error::FeedError;
use crate::models::ScheduleDocument;

/// Schedule source over a fixed set of documents
#[derive(Debug, Clone, Default)]
pub struct StaticScheduleSource {
    name: String,
    documents: HashMap<(i32, u32), ScheduleDocument>,
}

impl StaticScheduleSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: HashMap::new(),
        }
    }

    pub fn from_documents(
        name: impl Into<String>,
        documents: impl IntoIterator<Item = ScheduleDocument>,
    ) -> Self {
        let mut source = Self::new(name);
        for doc in documents {
            source.insert(doc);
        }
        source
    }

    /// Load a JSON array of month documents
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, FeedError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let documents: Vec<ScheduleDocument> =
            serde_json::from_str(&content).map_err(|e| FeedError::Decode(e.to_string()))?;

        tracing::info!("Loaded {} schedule documents from {:?}", documents.len(), path);
        Ok(Self::from_documents(path.display().to_string(), documents))
    }

    pub fn insert(&mut self, doc: ScheduleDocument) {
        self.documents.insert((doc.year, doc.month), doc);
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl ScheduleSource for StaticScheduleSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_month(&self, year: i32, month: u32) -> Result<ScheduleDocument, FeedError> {
        self.documents
            .get(&(year, month))
            .cloned()
            .ok_or_else(|| FeedError::not_found(year, month))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_known_and_unknown_month() {
        let source =
            StaticScheduleSource::from_documents("test", [ScheduleDocument::new(2025, 4)]);

        assert_eq!(source.len(), 1);
        assert!(source.fetch_month(2025, 4).await.is_ok());
        assert!(matches!(
            source.fetch_month(2025, 5).await,
            Err(FeedError::NotFound { .. })
        ));
    }

    #[test]
    fn test_from_missing_file() {
        assert!(matches!(
            StaticScheduleSource::from_json_file("/nonexistent/keiba-roulette.json"),
            Err(FeedError::Io(_))
        ));
    }
}
