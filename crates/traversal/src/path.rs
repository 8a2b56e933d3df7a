//! Shortest co-authorship chain

use scholarnet_common::{errors::Result, normalize, AuthorId, BibliographicProvider};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Chain of authors from source to target, empty when none was found
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoauthorPath {
    pub path: Vec<AuthorId>,
}

impl CoauthorPath {
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Number of co-authorship hops, `None` for an empty path
    pub fn hops(&self) -> Option<usize> {
        self.path.len().checked_sub(1)
    }
}

/// Unbounded unweighted BFS over co-authorship links
pub struct PathFinder {
    provider: Arc<dyn BibliographicProvider>,
    works_page_size: usize,
}

impl PathFinder {
    pub fn new(provider: Arc<dyn BibliographicProvider>, works_page_size: usize) -> Self {
        Self {
            provider,
            works_page_size,
        }
    }

    /// Shortest chain from `start` to `target`.
    ///
    /// Neighbors are queued in the order the provider reports them, so ties
    /// between equally short chains always break the same way. Any provider
    /// failure aborts the search.
    pub async fn shortest_path(&self, start: &AuthorId, target: &AuthorId) -> Result<CoauthorPath> {
        let mut parent: HashMap<AuthorId, Option<AuthorId>> = HashMap::new();
        let mut frontier = VecDeque::new();

        parent.insert(start.clone(), None);
        frontier.push_back(start.clone());

        while let Some(current) = frontier.pop_front() {
            if &current == target {
                return Ok(CoauthorPath {
                    path: reconstruct(&parent, current),
                });
            }

            let links = self
                .provider
                .coauthor_links(&current, self.works_page_size)
                .await?;

            for link in links {
                let Some(coauthor) = normalize(Some(link.author_id.as_str())) else {
                    continue;
                };
                if parent.contains_key(&coauthor) {
                    continue;
                }
                parent.insert(coauthor.clone(), Some(current.clone()));
                frontier.push_back(coauthor);
            }

            tracing::debug!(
                author = %current,
                seen = parent.len(),
                frontier = frontier.len(),
                "Expanded author"
            );
        }

        Ok(CoauthorPath::default())
    }
}

fn reconstruct(parent: &HashMap<AuthorId, Option<AuthorId>>, end: AuthorId) -> Vec<AuthorId> {
    let mut path = vec![end];
    while let Some(Some(prev)) = path.last().and_then(|id| parent.get(id)) {
        path.push(prev.clone());
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholarnet_common::provider::InMemoryProvider;
    use tokio_test::{assert_err, assert_ok};

    fn id(raw: &str) -> AuthorId {
        normalize(Some(raw)).unwrap()
    }

    fn ids(path: &CoauthorPath) -> Vec<&str> {
        path.path.iter().map(AuthorId::as_str).collect()
    }

    fn chain() -> InMemoryProvider {
        InMemoryProvider::new()
            .with_work("W1", ["A", "B"])
            .with_work("W2", ["B", "C"])
            .with_work("W3", ["C", "D"])
            .with_work("W4", ["Z", "Y"])
    }

    async fn find(provider: Arc<InMemoryProvider>, a: &str, b: &str) -> Result<CoauthorPath> {
        PathFinder::new(provider, 30).shortest_path(&id(a), &id(b)).await
    }

    #[tokio::test]
    async fn test_chain() {
        let path = find(Arc::new(chain()), "A", "D").await.unwrap();
        assert_eq!(ids(&path), vec!["A", "B", "C", "D"]);
        assert_eq!(path.hops(), Some(3));
    }

    #[tokio::test]
    async fn test_unreachable_is_empty() {
        let path = find(Arc::new(chain()), "A", "Z").await.unwrap();
        assert!(path.is_empty());
        assert_eq!(path.hops(), None);

        let path = find(Arc::new(chain()), "A", "nobody").await.unwrap();
        assert!(path.is_empty());
    }

    #[tokio::test]
    async fn test_same_author() {
        let provider = Arc::new(chain());
        let path = find(provider.clone(), "B", "B").await.unwrap();
        assert_eq!(ids(&path), vec!["B"]);
        assert!(provider.expanded().is_empty());
    }

    #[tokio::test]
    async fn test_shortcut_wins() {
        // A-B-C-D plus a direct A-D work
        let provider = chain().with_work("W5", ["A", "D"]);
        let path = find(Arc::new(provider), "A", "D").await.unwrap();
        assert_eq!(ids(&path), vec!["A", "D"]);
    }

    #[tokio::test]
    async fn test_url_ids_are_normalized() {
        let provider = InMemoryProvider::new()
            .with_work("W1", ["https://openalex.org/A", "https://openalex.org/B"])
            .with_work("W2", ["https://openalex.org/B", "C"]);
        let path = find(Arc::new(provider), "https://openalex.org/A", "C")
            .await
            .unwrap();
        assert_eq!(ids(&path), vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_tie_break_is_deterministic() {
        // Two equally short chains A-B-D and A-C-D; B is reported first
        let build = || {
            Arc::new(
                InMemoryProvider::new()
                    .with_work("W1", ["A", "B"])
                    .with_work("W2", ["A", "C"])
                    .with_work("W3", ["C", "D"])
                    .with_work("W4", ["B", "D"]),
            )
        };

        let first = find(build(), "A", "D").await.unwrap();
        let second = find(build(), "A", "D").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(ids(&first), vec!["A", "B", "D"]);
    }

    #[tokio::test]
    async fn test_expansion_follows_bfs_order() {
        let provider = Arc::new(chain());
        find(provider.clone(), "A", "D").await.unwrap();
        assert_eq!(provider.expanded(), vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_provider_failure_is_fatal() {
        let provider = Arc::new(chain().fail_links("C"));
        let err = assert_err!(find(provider, "A", "D").await);
        assert!(err.is_upstream_unavailable());
    }

    #[tokio::test]
    async fn test_blank_coauthor_ids_are_skipped() {
        let provider = Arc::new(
            InMemoryProvider::new()
                .with_work("W1", ["A", "", "B"])
                .with_work("W2", ["", "B", "C"]),
        );
        let path = assert_ok!(find(provider.clone(), "A", "C").await);
        assert_eq!(ids(&path), vec!["A", "B", "C"]);

        // Blank ids are never queued, so only real authors get expanded
        assert_eq!(provider.expanded(), vec!["A", "B"]);
    }
}
