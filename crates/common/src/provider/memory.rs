//! In-memory provider for tests and offline demos

use super::BibliographicProvider;
use crate::errors::{AppError, Result};
use crate::identity::{normalize, AuthorId};
use crate::models::{AuthorProfile, AuthorSummary, CoauthorLink};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// A recorded provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Details(String),
    Links(String),
    Search(String),
}

/// Provider backed by a fixed list of works.
///
/// Works are kept in insertion order and treated as most recent first, so
/// the link order handed to the traversal is fully deterministic. Author ids
/// on works are reported exactly as registered, which lets tests mix URL and
/// bare forms.
#[derive(Default)]
pub struct InMemoryProvider {
    profiles: HashMap<String, AuthorProfile>,
    works: Vec<(String, Vec<String>)>,
    failing_details: HashSet<String>,
    failing_links: HashSet<String>,
    calls: Mutex<Vec<ProviderCall>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Small co-authorship network used by the `memory` provider kind
    pub fn sample() -> Self {
        Self::new()
            .with_author("A1", "Ada Lovelace", Some("University of London"))
            .with_author("A2", "Charles Babbage", Some("University of Cambridge"))
            .with_author("A3", "Mary Somerville", None)
            .with_author("A4", "Augustus De Morgan", Some("University College London"))
            .with_author("A5", "John Herschel", None)
            .with_author("A6", "Michael Faraday", Some("Royal Institution"))
            .with_work("W1", ["A1", "A2"])
            .with_work("W2", ["A1", "A3", "A4"])
            .with_work("W3", ["A2", "A5"])
            .with_work("W4", ["A2", "A1"])
            .with_work("W5", ["A5", "A6"])
    }

    /// Register profile details for an author
    pub fn with_author(mut self, id: &str, label: &str, institution: Option<&str>) -> Self {
        self.profiles.insert(
            id.to_string(),
            AuthorProfile {
                label: label.to_string(),
                institution: institution.map(str::to_string),
                works_count: None,
                url: Some(format!("https://openalex.org/{}", id)),
            },
        );
        self
    }

    /// Register a work and its authors, in authorship order
    pub fn with_work<I, S>(mut self, work_id: &str, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.works
            .push((work_id.to_string(), authors.into_iter().map(Into::into).collect()));
        self
    }

    /// Make every details fetch for this author fail
    pub fn fail_details(mut self, id: &str) -> Self {
        self.failing_details.insert(id.to_string());
        self
    }

    /// Make every link fetch for this author fail
    pub fn fail_links(mut self, id: &str) -> Self {
        self.failing_links.insert(id.to_string());
        self
    }

    /// Calls made so far, in order
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Ids whose co-authorship links were requested, in order
    pub fn expanded(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ProviderCall::Links(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: ProviderCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn works_of<'a>(&'a self, id: &'a AuthorId) -> impl Iterator<Item = &'a (String, Vec<String>)> + 'a {
        self.works.iter().filter(move |(_, authors)| {
            authors
                .iter()
                .any(|raw| normalize(Some(raw.as_str())).as_ref() == Some(id))
        })
    }

    fn injected_failure(id: &AuthorId) -> AppError {
        AppError::UpstreamStatus {
            status: 503,
            body: format!("injected failure for {}", id),
        }
    }
}

#[async_trait]
impl BibliographicProvider for InMemoryProvider {
    async fn author_details(&self, id: &AuthorId) -> Result<AuthorProfile> {
        self.record(ProviderCall::Details(id.to_string()));

        if self.failing_details.contains(id.as_str()) {
            return Err(Self::injected_failure(id));
        }

        if let Some(profile) = self.profiles.get(id.as_str()) {
            return Ok(profile.clone());
        }

        // Known only through a work: no display details
        if self.works_of(id).next().is_some() {
            return Ok(AuthorProfile {
                label: id.to_string(),
                institution: None,
                works_count: None,
                url: None,
            });
        }

        Err(AppError::AuthorNotFound { id: id.to_string() })
    }

    async fn coauthor_links(&self, id: &AuthorId, page_size: usize) -> Result<Vec<CoauthorLink>> {
        self.record(ProviderCall::Links(id.to_string()));

        if self.failing_links.contains(id.as_str()) {
            return Err(Self::injected_failure(id));
        }

        Ok(self
            .works_of(id)
            .take(page_size)
            .flat_map(|(work_id, authors)| {
                authors
                    .iter()
                    .map(move |raw| CoauthorLink::new(raw.clone()).on_work(work_id.clone()))
            })
            .collect())
    }

    async fn search_authors(&self, query: &str, limit: usize) -> Result<Vec<AuthorSummary>> {
        self.record(ProviderCall::Search(query.to_string()));

        let needle = query.to_lowercase();
        let mut rows: Vec<AuthorSummary> = self
            .profiles
            .iter()
            .filter(|(_, profile)| profile.label.to_lowercase().contains(&needle))
            .map(|(id, profile)| AuthorSummary {
                id: profile.url.clone(),
                short_id: Some(id.clone()),
                display_name: Some(profile.label.clone()),
                institution: profile.institution.clone(),
                works_count: normalize(Some(id.as_str()))
                    .map(|aid| self.works_of(&aid).count() as u64),
            })
            .collect();

        rows.sort_by(|a, b| a.short_id.cmp(&b.short_id));
        rows.truncate(limit);
        Ok(rows)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
