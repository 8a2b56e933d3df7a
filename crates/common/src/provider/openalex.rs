//! OpenAlex client

use super::BibliographicProvider;
use crate::config::ProviderConfig;
use crate::errors::{AppError, Result};
use crate::identity::{normalize, AuthorId};
use crate::metrics;
use crate::models::{AuthorProfile, AuthorSummary, CoauthorLink};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::{Duration, Instant};

const PROVIDER_NAME: &str = "openalex";

/// OpenAlex REST client
pub struct OpenAlexProvider {
    client: reqwest::Client,
    base_url: String,
    mailto: Option<String>,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct OpenAlexAuthor {
    id: Option<String>,
    display_name: Option<String>,
    works_count: Option<u64>,
    last_known_institution: Option<OpenAlexInstitution>,
    #[serde(default)]
    last_known_institutions: Option<Vec<OpenAlexInstitution>>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexInstitution {
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexWork {
    id: Option<String>,
    #[serde(default)]
    authorships: Vec<OpenAlexAuthorship>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexAuthorship {
    author: Option<OpenAlexAuthorRef>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexAuthorRef {
    id: Option<String>,
}

impl OpenAlexAuthor {
    fn institution(&self) -> Option<String> {
        self.last_known_institution
            .as_ref()
            .and_then(|inst| inst.display_name.clone())
            .or_else(|| {
                self.last_known_institutions
                    .as_ref()
                    .and_then(|list| list.first())
                    .and_then(|inst| inst.display_name.clone())
            })
    }
}

impl OpenAlexProvider {
    /// Create a new OpenAlex client
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let timeout = config.timeout();

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            mailto: config.mailto.clone(),
            timeout,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        params: &[(&str, String)],
        subject: Option<&AuthorId>,
    ) -> Result<T> {
        let start = Instant::now();
        let result = self.fetch(path, params, subject).await;

        metrics::record_provider_call(
            PROVIDER_NAME,
            operation,
            start.elapsed().as_secs_f64(),
            result.is_ok(),
        );

        if let Err(e) = &result {
            tracing::debug!(operation, path, error = %e, "OpenAlex request failed");
        }

        result
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        subject: Option<&AuthorId>,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self.client.get(&url).query(params);
        if let Some(mailto) = &self.mailto {
            request = request.query(&[("mailto", mailto)]);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, body, subject));
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(e)
            } else {
                AppError::Upstream {
                    message: format!("Failed to parse response: {}", e),
                }
            }
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> AppError {
        if err.is_timeout() {
            AppError::UpstreamTimeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            AppError::Upstream {
                message: format!("Request failed: {}", err),
            }
        }
    }
}

/// OpenAlex ids are alphanumeric. Anything else would alter the request path
/// or filter expression, so it never reaches the wire.
fn catalog_key(id: &AuthorId) -> Result<&str> {
    if id.is_catalog_key() {
        Ok(id.as_str())
    } else {
        Err(AppError::Validation {
            message: format!("Not an OpenAlex author id: {}", id),
            field: Some("author_id".to_string()),
        })
    }
}

/// Map a non-success status to an error. 404 on a single-author lookup means
/// the author does not exist; everything else is the upstream's fault.
fn classify_status(status: StatusCode, body: String, subject: Option<&AuthorId>) -> AppError {
    match subject {
        Some(id) if status == StatusCode::NOT_FOUND => AppError::AuthorNotFound { id: id.to_string() },
        _ => AppError::UpstreamStatus {
            status: status.as_u16(),
            body,
        },
    }
}

fn profile_from_author(id: &AuthorId, author: OpenAlexAuthor) -> AuthorProfile {
    let institution = author.institution();
    AuthorProfile {
        label: author.display_name.unwrap_or_else(|| id.to_string()),
        institution,
        works_count: author.works_count,
        url: author.id,
    }
}

fn links_from_works(works: Vec<OpenAlexWork>) -> Vec<CoauthorLink> {
    works
        .into_iter()
        .flat_map(|work| {
            let work_id = work.id;
            work.authorships.into_iter().filter_map(move |authorship| {
                let author_id = authorship.author?.id?;
                Some(CoauthorLink {
                    author_id,
                    work_id: work_id.clone(),
                })
            })
        })
        .collect()
}

fn summary_from_author(author: OpenAlexAuthor) -> AuthorSummary {
    let institution = author.institution();
    let short_id = normalize(author.id.as_deref()).map(AuthorId::into_inner);
    AuthorSummary {
        id: author.id,
        short_id,
        display_name: author.display_name,
        institution,
        works_count: author.works_count,
    }
}

#[async_trait]
impl BibliographicProvider for OpenAlexProvider {
    async fn author_details(&self, id: &AuthorId) -> Result<AuthorProfile> {
        let path = format!("/authors/{}", catalog_key(id)?);
        let author: OpenAlexAuthor = self.get_json("author_details", &path, &[], Some(id)).await?;
        Ok(profile_from_author(id, author))
    }

    async fn coauthor_links(&self, id: &AuthorId, page_size: usize) -> Result<Vec<CoauthorLink>> {
        let params = [
            ("filter", format!("authorships.author.id:{}", catalog_key(id)?)),
            ("per-page", page_size.to_string()),
            ("select", "id,authorships".to_string()),
            ("sort", "publication_date:desc".to_string()),
        ];
        let page: ListResponse<OpenAlexWork> =
            self.get_json("coauthor_links", "/works", &params, None).await?;
        Ok(links_from_works(page.results))
    }

    async fn search_authors(&self, query: &str, limit: usize) -> Result<Vec<AuthorSummary>> {
        let params = [
            ("search", query.to_string()),
            ("per-page", limit.to_string()),
        ];
        let page: ListResponse<OpenAlexAuthor> =
            self.get_json("search_authors", "/authors", &params, None).await?;
        Ok(page.results.into_iter().map(summary_from_author).collect())
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id(raw: &str) -> AuthorId {
        normalize(Some(raw)).unwrap()
    }

    fn unreachable_provider() -> OpenAlexProvider {
        OpenAlexProvider::new(&ProviderConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            ..ProviderConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_ids_outside_catalog_alphabet_never_hit_the_wire() {
        let provider = unreachable_provider();

        for raw in ["A1/works", "A1?select=x", "A1|A2", "A1,A2"] {
            let err = provider.author_details(&id(raw)).await.unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }), "{raw}: {err:?}");

            let err = provider.coauthor_links(&id(raw), 30).await.unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }), "{raw}: {err:?}");
        }
    }

    #[test]
    fn test_profile_mapping() {
        let author: OpenAlexAuthor = serde_json::from_value(json!({
            "id": "https://openalex.org/A1",
            "display_name": "Ada Lovelace",
            "works_count": 12,
            "last_known_institution": { "display_name": "University of London" }
        }))
        .unwrap();

        let profile = profile_from_author(&id("A1"), author);
        assert_eq!(profile.label, "Ada Lovelace");
        assert_eq!(profile.institution.as_deref(), Some("University of London"));
        assert_eq!(profile.works_count, Some(12));
        assert_eq!(profile.url.as_deref(), Some("https://openalex.org/A1"));
    }

    #[test]
    fn test_profile_fallbacks() {
        let author: OpenAlexAuthor = serde_json::from_value(json!({
            "id": "https://openalex.org/A2",
            "display_name": null,
            "last_known_institution": null,
            "last_known_institutions": [
                { "display_name": "ETH Zurich" },
                { "display_name": "EPFL" }
            ]
        }))
        .unwrap();

        let profile = profile_from_author(&id("A2"), author);
        assert_eq!(profile.label, "A2");
        assert_eq!(profile.institution.as_deref(), Some("ETH Zurich"));
        assert_eq!(profile.works_count, None);
    }

    #[test]
    fn test_links_keep_order_and_skip_missing_authors() {
        let page: ListResponse<OpenAlexWork> = serde_json::from_value(json!({
            "meta": { "count": 2 },
            "results": [
                {
                    "id": "https://openalex.org/W1",
                    "authorships": [
                        { "author": { "id": "https://openalex.org/A1" } },
                        { "author": { "id": "https://openalex.org/A2" } },
                        { "author": null }
                    ]
                },
                {
                    "authorships": [
                        { "author": { "id": null } },
                        { "author": { "id": "https://openalex.org/A2" } }
                    ]
                }
            ]
        }))
        .unwrap();

        let links = links_from_works(page.results);
        let ids: Vec<&str> = links.iter().map(|l| l.author_id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "https://openalex.org/A1",
                "https://openalex.org/A2",
                "https://openalex.org/A2"
            ]
        );
        assert_eq!(links[0].work_id.as_deref(), Some("https://openalex.org/W1"));
        assert_eq!(links[2].work_id, None);
    }

    #[test]
    fn test_search_summary_mapping() {
        let page: ListResponse<OpenAlexAuthor> = serde_json::from_value(json!({
            "results": [{
                "id": "https://openalex.org/A9",
                "display_name": "Grace Hopper",
                "works_count": 40
            }]
        }))
        .unwrap();

        let rows: Vec<AuthorSummary> = page.results.into_iter().map(summary_from_author).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].short_id.as_deref(), Some("A9"));
        assert_eq!(rows[0].display_name.as_deref(), Some("Grace Hopper"));
        assert_eq!(rows[0].institution, None);
    }

    #[test]
    fn test_status_classification() {
        let subject = id("A1");
        let err = classify_status(StatusCode::NOT_FOUND, String::new(), Some(&subject));
        assert!(matches!(err, AppError::AuthorNotFound { ref id } if id == "A1"));

        let err = classify_status(StatusCode::NOT_FOUND, "nope".into(), None);
        assert!(err.is_upstream_unavailable());

        let err = classify_status(StatusCode::INTERNAL_SERVER_ERROR, "boom".into(), Some(&subject));
        assert!(matches!(err, AppError::UpstreamStatus { status: 500, .. }));
    }

    #[test]
    fn test_client_construction() {
        let config = ProviderConfig {
            base_url: "https://api.openalex.org/".to_string(),
            mailto: Some("team@example.org".to_string()),
            ..ProviderConfig::default()
        };
        let provider = OpenAlexProvider::new(&config).unwrap();
        assert_eq!(provider.base_url, "https://api.openalex.org");
        assert_eq!(provider.name(), "openalex");
    }
}
