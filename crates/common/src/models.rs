//! Provider-facing data model

use serde::{Deserialize, Serialize};

/// Profile details for one author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorProfile {
    /// Display name (falls back to the id when the provider has none)
    pub label: String,

    /// Last known institution
    pub institution: Option<String>,

    /// Number of works attributed to the author
    pub works_count: Option<u64>,

    /// Provider reference URL
    pub url: Option<String>,
}

/// One authorship occurrence on a work of the expanded author.
///
/// An author who co-wrote several works in the page shows up once per work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoauthorLink {
    /// Raw author id as the provider reports it (not normalized)
    pub author_id: String,

    /// Work the authorship was found on
    pub work_id: Option<String>,
}

impl CoauthorLink {
    pub fn new(author_id: impl Into<String>) -> Self {
        Self {
            author_id: author_id.into(),
            work_id: None,
        }
    }

    pub fn on_work(mut self, work_id: impl Into<String>) -> Self {
        self.work_id = Some(work_id.into());
        self
    }
}

/// Lightweight search result row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorSummary {
    /// Provider id (usually a URL)
    pub id: Option<String>,

    /// Normalized id
    pub short_id: Option<String>,

    pub display_name: Option<String>,
    pub institution: Option<String>,
    pub works_count: Option<u64>,
}
