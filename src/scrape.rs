//! Scrape phase: fetches each configured unit and persists the normalized
//! records.

use std::collections::BTreeSet;

use tracing::{error, info};

use crate::client::{CategoryRequest, IgovClient};
use crate::config::Config;
use crate::error::Result;
use crate::normalize::normalize_batch;
use crate::paths::PLENARY;
use crate::records::Category;
use crate::report::RunSummary;
use crate::store::DataStore;

/// Scrape one session's categories into the data store. The plenary gets
/// every category; committees carry proposals only. Units fail in
/// isolation and the summary carries the per-category tallies.
pub async fn run(
    config: &Config,
    client: &IgovClient,
    store: &DataStore,
    session_number: &str,
    categories: &BTreeSet<Category>,
) -> Result<RunSummary> {
    let session = config.session(session_number)?;
    let mut summary = RunSummary::default();

    for &category in categories {
        let request = CategoryRequest {
            category,
            session,
            body: &config.ga.body_code,
            committee: &config.ga.body_code,
        };
        scrape_unit(client, store, &request, PLENARY, &mut summary).await;

        if category == Category::Proposals {
            for (code, name) in &config.ga.committees {
                let request = CategoryRequest {
                    category,
                    session,
                    body: &config.ga.body_code,
                    committee: name,
                };
                scrape_unit(client, store, &request, code, &mut summary).await;
            }
        }
    }
    Ok(summary)
}

async fn scrape_unit(
    client: &IgovClient,
    store: &DataStore,
    request: &CategoryRequest<'_>,
    body: &str,
    summary: &mut RunSummary,
) {
    let session = request.session.number.as_str();
    let category = request.category;
    let outcome: Result<usize> = async {
        let raw = client.fetch(request).await?;
        let records = normalize_batch(category, &raw);
        store.save(body, session, category, &records)?;
        Ok(records.len())
    }
    .await;

    match outcome {
        Ok(count) => {
            info!(body, session, %category, count, "scraped");
            summary.record_ok(category);
        }
        Err(err) => {
            error!(body, session, %category, error = %err, "scrape unit failed");
            summary.record_failure(category);
        }
    }
}
