use std::future::Future;
use std::time::Duration;

use derive_builder::Builder;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::records::Category;

/// Upstream API root.
pub const DEFAULT_BASE_URL: &str = "https://igov.un.org/igov/api";

const DEFAULT_PAGE_SIZE: u32 = 100;
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Paginated client for the iGov JSON API. Each category is fetched page
/// by page until the upstream hands back an empty page; transient
/// failures are retried with a growing delay before the unit is given up.
#[derive(Debug, Clone, Builder)]
pub struct IgovClient {
    #[builder(default = "reqwest::Client::new()")]
    http: reqwest::Client,
    #[builder(setter(into), default = "DEFAULT_BASE_URL.to_string()")]
    base_url: String,
    #[builder(default = "DEFAULT_PAGE_SIZE")]
    page_size: u32,
    #[builder(default = "DEFAULT_MAX_RETRIES")]
    max_retries: u32,
    #[builder(default = "Duration::from_millis(500)")]
    retry_delay: Duration,
    #[builder(default = "Duration::from_secs(30)")]
    timeout: Duration,
}

/// One (category, session, body) fetch.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRequest<'a> {
    pub category: Category,
    pub session: &'a SessionConfig,
    /// Upstream body code for the meeting and document endpoints.
    pub body: &'a str,
    /// Proposal filter: a committee display name, or the body code for
    /// the plenary feed.
    pub committee: &'a str,
}

impl IgovClient {
    /// Fetch the complete item sequence for one request, in upstream page
    /// order.
    pub async fn fetch(&self, request: &CategoryRequest<'_>) -> Result<Vec<Value>> {
        let endpoint = format!("{}/{}", self.base_url, request_path(request));
        collect_pages(|page| {
            let url = with_page(&endpoint, page, self.page_size);
            async move {
                let payload = self.get_json(&url).await?;
                Ok(page_items(payload))
            }
        })
        .await
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let err = match self.try_get(url).await {
                Ok(payload) => return Ok(payload),
                Err(err) => err,
            };
            if is_transient(&err) && attempt <= self.max_retries {
                warn!(url, attempt, error = %err, "transient fetch failure, retrying");
                tokio::time::sleep(self.retry_delay * attempt).await;
                continue;
            }
            return Err(Error::FetchFailed {
                url: url.to_string(),
                attempts: attempt,
                source: err,
            });
        }
    }

    async fn try_get(&self, url: &str) -> std::result::Result<Value, reqwest::Error> {
        let response = self.http.get(url).timeout(self.timeout).send().await?;
        response.error_for_status()?.json::<Value>().await
    }
}

fn is_transient(err: &reqwest::Error) -> bool {
    if let Some(status) = err.status() {
        return status.is_server_error();
    }
    err.is_timeout() || err.is_connect()
}

/// Endpoint path for one category, mirroring the upstream route layout.
fn request_path(request: &CategoryRequest<'_>) -> String {
    let session = request.session;
    match request.category {
        Category::Meetings => format!(
            "meetings/getbysession/{}?body={}",
            urlencoding::encode(&session.label),
            urlencoding::encode(request.body),
        ),
        Category::Agenda => format!(
            "getlookups/getAgendas/{}",
            urlencoding::encode(&session.number)
        ),
        Category::Documents => format!(
            "meetings/getdocumentsbysession/{}?body={}",
            urlencoding::encode(&session.label),
            urlencoding::encode(request.body),
        ),
        Category::Decisions => format!(
            "decision/getbysession/{}",
            urlencoding::encode(&session.decision_label)
        ),
        Category::Proposals => format!(
            "proposals/{}/{}?env=prod",
            urlencoding::encode(&session.label),
            urlencoding::encode(request.committee),
        ),
    }
}

fn with_page(endpoint: &str, page: u32, page_size: u32) -> String {
    let sep = if endpoint.contains('?') { '&' } else { '?' };
    format!("{endpoint}{sep}page={page}&pageSize={page_size}")
}

/// Unwrap one page's response envelope: either a bare array, or an object
/// carrying a `result` array (the proposals endpoints use the latter).
fn page_items(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("result") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Follow pages from 1 until the upstream returns an empty one,
/// concatenating items in page order.
async fn collect_pages<F, Fut>(mut fetch_page: F) -> Result<Vec<Value>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<Value>>>,
{
    let mut items = Vec::new();
    let mut page = 1;
    loop {
        let batch = fetch_page(page).await?;
        if batch.is_empty() {
            break;
        }
        debug!(page, count = batch.len(), "fetched page");
        items.extend(batch);
        page += 1;
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn session() -> SessionConfig {
        SessionConfig {
            number: "80".into(),
            label: "80".into(),
            decision_label: "80th session".into(),
        }
    }

    #[tokio::test]
    async fn pagination_stops_on_first_empty_page() {
        let pages = vec![
            vec![json!({"id": 1}), json!({"id": 2}), json!({"id": 3})],
            vec![json!({"id": 4}), json!({"id": 5}), json!({"id": 6})],
        ];
        let items = collect_pages(|page| {
            let batch = pages.get((page - 1) as usize).cloned().unwrap_or_default();
            async move { Ok(batch) }
        })
        .await
        .unwrap();

        let ids: Vec<i64> = items.iter().map(|v| v["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    }

    #[tokio::test]
    async fn pagination_surfaces_fetch_errors() {
        let result = collect_pages(|page| async move {
            if page == 1 {
                Ok(vec![json!({"id": 1})])
            } else {
                Err(Error::Config("upstream unavailable".into()))
            }
        })
        .await;
        assert!(result.is_err());
    }

    #[test]
    fn request_paths_mirror_upstream_routes() {
        let session = session();
        let request = |category, committee| CategoryRequest {
            category,
            session: &session,
            body: "GA",
            committee,
        };

        assert_eq!(
            request_path(&request(Category::Meetings, "GA")),
            "meetings/getbysession/80?body=GA"
        );
        assert_eq!(
            request_path(&request(Category::Agenda, "GA")),
            "getlookups/getAgendas/80"
        );
        assert_eq!(
            request_path(&request(Category::Decisions, "GA")),
            "decision/getbysession/80th%20session"
        );
        assert_eq!(
            request_path(&request(Category::Proposals, "First Committee")),
            "proposals/80/First%20Committee?env=prod"
        );
    }

    #[test]
    fn with_page_appends_to_an_existing_query() {
        assert_eq!(with_page("a/b", 1, 50), "a/b?page=1&pageSize=50");
        assert_eq!(with_page("a/b?x=1", 2, 50), "a/b?x=1&page=2&pageSize=50");
    }

    #[test]
    fn page_envelopes_unwrap_arrays_and_result_objects() {
        assert_eq!(page_items(json!([1, 2, 3])).len(), 3);
        assert_eq!(page_items(json!({"result": [1]})).len(), 1);
        assert!(page_items(json!({"total": 3})).is_empty());
        assert!(page_items(json!("nonsense")).is_empty());
    }

    #[test]
    fn builder_fills_in_defaults() {
        let client = IgovClientBuilder::default().build().unwrap();
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
        assert_eq!(client.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(client.page_size, DEFAULT_PAGE_SIZE);
    }
}
