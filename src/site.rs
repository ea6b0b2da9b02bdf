//! Build phase: renders the persisted JSON into the static HTML tree.
//!
//! Rendering is a pure function of the templates, the loaded records and
//! the site configuration, so rebuilding from unchanged data produces
//! byte-identical output.

use std::collections::BTreeSet;
use std::fs;

use askama::Template;
use strum::IntoEnumIterator;
use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::config::{Config, SessionConfig, SiteConfig};
use crate::error::{Error, Result};
use crate::paths::{self, PLENARY};
use crate::records::{AgendaItem, Category, CategoryRecord, Decision, Document, Meeting, Proposal};
use crate::report::RunSummary;
use crate::store::{write_atomic, DataStore};

pub struct SiteBuilder<'a> {
    config: &'a Config,
    store: &'a DataStore,
}

impl<'a> SiteBuilder<'a> {
    pub fn new(config: &'a Config, store: &'a DataStore) -> Self {
        Self { config, store }
    }

    /// Build the requested categories for one session, then the overview
    /// and index pages and the static assets. Units with no data on disk
    /// are skipped silently; corrupt units and failing pages are recorded
    /// in the summary and do not stop the run.
    pub fn build(&self, session_number: &str, categories: &BTreeSet<Category>) -> Result<RunSummary> {
        let session = self.config.session(session_number)?;
        let mut summary = RunSummary::default();

        for &category in categories {
            self.build_unit(session, PLENARY, None, category, &mut summary);
            if category == Category::Proposals {
                for (code, name) in &self.config.ga.committees {
                    self.build_unit(session, code, Some(name), category, &mut summary);
                }
            }
        }

        self.build_overviews(session, &mut summary);
        self.build_index(session, &mut summary);
        self.copy_static(&mut summary);
        Ok(summary)
    }

    fn build_unit(
        &self,
        session: &SessionConfig,
        body: &str,
        committee_name: Option<&str>,
        category: Category,
        summary: &mut RunSummary,
    ) {
        let records = match self.store.load(body, &session.number, category) {
            Ok(records) => records,
            Err(Error::NotFound { .. }) => {
                summary.record_skip(category);
                return;
            }
            Err(err) => {
                error!(body, session = session.number.as_str(), %category, error = %err, "cannot load unit data");
                summary.record_failure(category);
                return;
            }
        };

        match self.render_unit(session, body, committee_name, category, &records, summary) {
            Ok(()) => {
                info!(body, session = session.number.as_str(), %category, count = records.len(), "built");
                summary.record_ok(category);
            }
            Err(err) => {
                error!(body, session = session.number.as_str(), %category, error = %err, "build unit failed");
                summary.record_failure(category);
            }
        }
    }

    fn render_unit(
        &self,
        session: &SessionConfig,
        body: &str,
        committee_name: Option<&str>,
        category: Category,
        records: &[CategoryRecord],
        summary: &mut RunSummary,
    ) -> Result<()> {
        let site = &self.config.site;
        let listing_rel = paths::listing_page(body, &session.number, category);

        match category {
            Category::Meetings => {
                let agenda_href = paths::href(
                    &site.base_url,
                    &paths::listing_page(body, &session.number, Category::Agenda),
                );
                let listing_href = paths::href(&site.base_url, &listing_rel);
                let meetings: Vec<&Meeting> =
                    records.iter().filter_map(CategoryRecord::as_meeting).collect();

                let mut rows = Vec::with_capacity(meetings.len());
                for &meeting in &meetings {
                    let rel = paths::detail_page(body, &session.number, category, &meeting.id);
                    let page = MeetingPage {
                        site,
                        session,
                        meeting,
                        listing_href: listing_href.clone(),
                        agenda_href: agenda_href.clone(),
                    };
                    if let Err(err) = self.write_page(&rel, &page) {
                        warn!(page = rel.as_str(), error = %err, "skipping page that failed to render");
                        summary.record_failed_page(rel.clone());
                    }
                    rows.push(MeetingRow {
                        meeting,
                        href: paths::href(&site.base_url, &rel),
                    });
                }

                let page = MeetingsPage {
                    site,
                    session,
                    agenda_href,
                    meetings: rows,
                };
                self.write_page(&listing_rel, &page)?;
            }
            Category::Agenda => {
                let items: Vec<&AgendaItem> = records
                    .iter()
                    .filter_map(CategoryRecord::as_agenda_item)
                    .collect();
                self.write_page(&listing_rel, &AgendaPage { site, session, items })?;
            }
            Category::Documents => {
                let documents: Vec<&Document> = records
                    .iter()
                    .filter_map(CategoryRecord::as_document)
                    .collect();
                self.write_page(&listing_rel, &DocumentsPage { site, session, documents })?;
            }
            Category::Decisions => {
                let decisions: Vec<&Decision> = records
                    .iter()
                    .filter_map(CategoryRecord::as_decision)
                    .collect();
                self.write_page(&listing_rel, &DecisionsPage { site, session, decisions })?;
            }
            Category::Proposals => {
                let proposals: Vec<&Proposal> = records
                    .iter()
                    .filter_map(CategoryRecord::as_proposal)
                    .collect();
                let page = ProposalsPage {
                    site,
                    session,
                    body_name: committee_name.unwrap_or("Plenary"),
                    proposals,
                };
                self.write_page(&listing_rel, &page)?;
            }
        }
        Ok(())
    }

    /// One overview page per body that has any data on disk, linking the
    /// categories present.
    fn build_overviews(&self, session: &SessionConfig, summary: &mut RunSummary) {
        let site = &self.config.site;
        let mut bodies: Vec<(&str, &str)> = vec![(PLENARY, "Plenary")];
        for (code, name) in &self.config.ga.committees {
            bodies.push((code.as_str(), name.as_str()));
        }

        for (body, name) in bodies {
            let mut entries = Vec::new();
            for category in Category::iter() {
                let records = match self.store.load(body, &session.number, category) {
                    Ok(records) => records,
                    Err(_) => continue,
                };
                entries.push(OverviewEntry {
                    label: category.title(),
                    href: paths::href(
                        &site.base_url,
                        &paths::listing_page(body, &session.number, category),
                    ),
                    count: records.len(),
                });
            }
            if entries.is_empty() {
                continue;
            }

            let rel = paths::overview_page(body, &session.number);
            let page = OverviewPage {
                site,
                session,
                body_name: name,
                entries,
            };
            if let Err(err) = self.write_page(&rel, &page) {
                warn!(page = rel.as_str(), error = %err, "skipping page that failed to render");
                summary.record_failed_page(rel);
            }
        }
    }

    /// Site index with per-category counts for the plenary, mirroring the
    /// stats block most visitors land on.
    fn build_index(&self, session: &SessionConfig, summary: &mut RunSummary) {
        let site = &self.config.site;
        let count = |category: Category| -> usize {
            self.store
                .load(PLENARY, &session.number, category)
                .map(|records| records.len())
                .unwrap_or(0)
        };
        let stats = Stats {
            meetings: count(Category::Meetings),
            agenda: count(Category::Agenda),
            documents: count(Category::Documents),
            decisions: count(Category::Decisions),
            proposals: count(Category::Proposals),
        };
        let listing =
            |category: Category| paths::href(&site.base_url, &paths::listing_page(PLENARY, &session.number, category));
        let links = CategoryLinks {
            meetings: listing(Category::Meetings),
            agenda: listing(Category::Agenda),
            documents: listing(Category::Documents),
            decisions: listing(Category::Decisions),
            proposals: listing(Category::Proposals),
            overview: paths::href(&site.base_url, &paths::overview_page(PLENARY, &session.number)),
        };

        let page = IndexPage {
            site,
            session,
            stats,
            links,
        };
        if let Err(err) = self.write_page("index.html", &page) {
            warn!(error = %err, "skipping page that failed to render");
            summary.record_failed_page("index.html");
        }
    }

    /// Mirror the `static/` directory next to the output tree into
    /// `<output>/static/`, through the same atomic writes as pages.
    fn copy_static(&self, summary: &mut RunSummary) {
        let Some(parent) = self.config.site.output_dir.parent() else {
            return;
        };
        let source = parent.join("static");
        if !source.is_dir() {
            return;
        }

        for entry in WalkDir::new(&source) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "cannot walk static assets");
                    summary.record_failed_page("static");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(&source) else {
                continue;
            };
            let target = self.config.site.output_dir.join("static").join(rel);
            let outcome = fs::read(entry.path())
                .map_err(Error::from)
                .and_then(|bytes| write_atomic(&target, &bytes));
            if let Err(err) = outcome {
                warn!(error = %err, "cannot copy static asset");
                summary.record_failed_page(target.display().to_string());
            }
        }
    }

    fn write_page<T: Template>(&self, rel: &str, page: &T) -> Result<()> {
        let html = page.render().map_err(|source| Error::Render {
            page: rel.to_string(),
            source,
        })?;
        write_atomic(&self.config.site.output_dir.join(rel), html.as_bytes())
    }
}

#[derive(Template)]
#[template(path = "index.html.j2")]
struct IndexPage<'a> {
    site: &'a SiteConfig,
    session: &'a SessionConfig,
    stats: Stats,
    links: CategoryLinks,
}

struct Stats {
    meetings: usize,
    agenda: usize,
    documents: usize,
    decisions: usize,
    proposals: usize,
}

struct CategoryLinks {
    meetings: String,
    agenda: String,
    documents: String,
    decisions: String,
    proposals: String,
    overview: String,
}

#[derive(Template)]
#[template(path = "overview.html.j2")]
struct OverviewPage<'a> {
    site: &'a SiteConfig,
    session: &'a SessionConfig,
    body_name: &'a str,
    entries: Vec<OverviewEntry>,
}

struct OverviewEntry {
    label: &'static str,
    href: String,
    count: usize,
}

#[derive(Template)]
#[template(path = "meetings.html.j2")]
struct MeetingsPage<'a> {
    site: &'a SiteConfig,
    session: &'a SessionConfig,
    agenda_href: String,
    meetings: Vec<MeetingRow<'a>>,
}

struct MeetingRow<'a> {
    meeting: &'a Meeting,
    href: String,
}

#[derive(Template)]
#[template(path = "meeting.html.j2")]
struct MeetingPage<'a> {
    site: &'a SiteConfig,
    session: &'a SessionConfig,
    meeting: &'a Meeting,
    listing_href: String,
    agenda_href: String,
}

#[derive(Template)]
#[template(path = "agenda.html.j2")]
struct AgendaPage<'a> {
    site: &'a SiteConfig,
    session: &'a SessionConfig,
    items: Vec<&'a AgendaItem>,
}

#[derive(Template)]
#[template(path = "documents.html.j2")]
struct DocumentsPage<'a> {
    site: &'a SiteConfig,
    session: &'a SessionConfig,
    documents: Vec<&'a Document>,
}

#[derive(Template)]
#[template(path = "decisions.html.j2")]
struct DecisionsPage<'a> {
    site: &'a SiteConfig,
    session: &'a SessionConfig,
    decisions: Vec<&'a Decision>,
}

#[derive(Template)]
#[template(path = "proposals.html.j2")]
struct ProposalsPage<'a> {
    site: &'a SiteConfig,
    session: &'a SessionConfig,
    body_name: &'a str,
    proposals: Vec<&'a Proposal>,
}

mod filters {
    use chrono::{DateTime, NaiveDate};

    /// Render ISO-8601 dates like `2025-09-09T10:00:00Z` as
    /// `September 09, 2025`; anything unparseable passes through as-is.
    pub fn format_date(value: &str) -> askama::Result<String> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Ok(dt.format("%B %d, %Y").to_string());
        }
        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            return Ok(date.format("%B %d, %Y").to_string());
        }
        Ok(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};
    use std::path::{Path, PathBuf};

    use tempfile::tempdir;

    use super::*;
    use crate::config::GaConfig;

    fn test_config(root: &Path) -> Config {
        Config {
            site: SiteConfig {
                title: "GA Proceedings".to_string(),
                base_url: String::new(),
                output_dir: root.join("output"),
                data_dir: root.join("data"),
            },
            ga: GaConfig {
                body_code: "GA".to_string(),
                sessions: BTreeMap::from([(
                    "80".to_string(),
                    SessionConfig {
                        number: "80".to_string(),
                        label: "80".to_string(),
                        decision_label: "80th session".to_string(),
                    },
                )]),
                committees: BTreeMap::from([
                    ("c1".to_string(), "First Committee".to_string()),
                    ("c2".to_string(), "Second Committee".to_string()),
                ]),
            },
        }
    }

    fn meeting(id: &str, title: &str) -> CategoryRecord {
        CategoryRecord::Meeting(Meeting {
            id: id.into(),
            title: title.into(),
            date: "2025-09-09T10:00:00Z".into(),
            ..Default::default()
        })
    }

    fn all_categories() -> BTreeSet<Category> {
        Category::iter().collect()
    }

    fn output_files(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
        WalkDir::new(root)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| {
                let rel = entry.path().strip_prefix(root).unwrap().to_path_buf();
                (rel, fs::read(entry.path()).unwrap())
            })
            .collect()
    }

    #[test]
    fn meetings_get_one_listing_and_one_detail_page_each() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        let store = DataStore::new(&config.site.data_dir);
        let records: Vec<CategoryRecord> = (1..=6)
            .map(|n| meeting(&format!("m{n}"), &format!("Plenary meeting {n}")))
            .collect();
        store
            .save(PLENARY, "80", Category::Meetings, &records)
            .unwrap();

        let summary = SiteBuilder::new(&config, &store)
            .build("80", &BTreeSet::from([Category::Meetings]))
            .unwrap();
        assert_eq!(summary.counts(Category::Meetings).ok, 1);
        assert!(!summary.has_failures());

        let out = &config.site.output_dir;
        assert!(out.join("ga/plenary/80/meetings/index.html").is_file());
        for n in 1..=6 {
            assert!(out.join(format!("ga/plenary/80/meetings/m{n}.html")).is_file());
        }
        assert!(out.join("ga/plenary/80/index.html").is_file());
        assert!(out.join("index.html").is_file());

        let listing = fs::read_to_string(out.join("ga/plenary/80/meetings/index.html")).unwrap();
        assert!(listing.contains("Plenary meeting 6"));
        assert!(listing.contains("September 09, 2025"));
        assert!(listing.contains("/ga/plenary/80/meetings/m6.html"));
    }

    #[test]
    fn missing_categories_are_skipped_silently() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        let store = DataStore::new(&config.site.data_dir);
        store
            .save(PLENARY, "80", Category::Meetings, &[meeting("m1", "Opening")])
            .unwrap();

        let summary = SiteBuilder::new(&config, &store)
            .build("80", &all_categories())
            .unwrap();

        assert!(!summary.has_failures());
        assert_eq!(summary.counts(Category::Meetings).ok, 1);
        assert_eq!(summary.counts(Category::Agenda).skipped, 1);
        // Plenary plus both committees have no proposal data.
        assert_eq!(summary.counts(Category::Proposals).skipped, 3);
        assert!(!config.site.output_dir.join("ga/plenary/80/agenda").exists());
    }

    #[test]
    fn a_corrupt_unit_fails_without_stopping_the_run() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        let store = DataStore::new(&config.site.data_dir);
        store
            .save(PLENARY, "80", Category::Meetings, &[meeting("m1", "Opening")])
            .unwrap();
        let agenda_path = store.file_path(PLENARY, "80", Category::Agenda);
        fs::create_dir_all(agenda_path.parent().unwrap()).unwrap();
        fs::write(&agenda_path, "{ not json").unwrap();

        let summary = SiteBuilder::new(&config, &store)
            .build("80", &all_categories())
            .unwrap();

        assert_eq!(summary.counts(Category::Meetings).ok, 1);
        assert_eq!(summary.counts(Category::Agenda).failed, 1);
        assert!(summary.has_failures());
    }

    #[test]
    fn rebuilding_unchanged_data_is_byte_identical() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        let store = DataStore::new(&config.site.data_dir);
        store
            .save(
                PLENARY,
                "80",
                Category::Meetings,
                &[meeting("m1", "Opening"), meeting("m2", "General debate")],
            )
            .unwrap();
        store
            .save(
                "c1",
                "80",
                Category::Proposals,
                &[CategoryRecord::Proposal(Proposal {
                    id: "A/C.1/80/L.5".into(),
                    title: "Nuclear disarmament".into(),
                    symbol: "A/C.1/80/L.5".into(),
                    status: "Adopted".into(),
                })],
            )
            .unwrap();

        let builder = SiteBuilder::new(&config, &store);
        builder.build("80", &all_categories()).unwrap();
        let first = output_files(&config.site.output_dir);
        builder.build("80", &all_categories()).unwrap();
        let second = output_files(&config.site.output_dir);

        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn committee_proposals_render_under_the_committee_code() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        let store = DataStore::new(&config.site.data_dir);
        store
            .save(
                "c1",
                "80",
                Category::Proposals,
                &[CategoryRecord::Proposal(Proposal {
                    id: "A/C.1/80/L.5".into(),
                    title: "Nuclear disarmament".into(),
                    ..Default::default()
                })],
            )
            .unwrap();

        let summary = SiteBuilder::new(&config, &store)
            .build("80", &BTreeSet::from([Category::Proposals]))
            .unwrap();
        assert_eq!(summary.counts(Category::Proposals).ok, 1);
        assert_eq!(summary.counts(Category::Proposals).skipped, 2);

        let listing = fs::read_to_string(
            config
                .site
                .output_dir
                .join("ga/c1/80/proposals/index.html"),
        )
        .unwrap();
        assert!(listing.contains("First Committee"));
        assert!(listing.contains("Nuclear disarmament"));
    }

    #[test]
    fn format_date_filter_handles_iso_dates_and_passthrough() {
        assert_eq!(
            filters::format_date("2025-09-09T10:00:00Z").unwrap(),
            "September 09, 2025"
        );
        assert_eq!(filters::format_date("2025-09-09").unwrap(), "September 09, 2025");
        assert_eq!(filters::format_date("to be announced").unwrap(), "to be announced");
    }
}
