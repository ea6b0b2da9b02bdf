//! Naming-convention mapping from (body, session, category) to data files
//! and page paths. Cross-links between pages are derived from these
//! conventions alone; a link to a page that was never built is simply
//! dangling.

use crate::records::Category;

/// Directory code for the GA plenary. Committees use their configured
/// codes (`c1`..`c6`).
pub const PLENARY: &str = "plenary";

pub fn data_file(body: &str, session: &str, category: Category) -> String {
    format!("ga/{body}/{session}/{category}.json")
}

pub fn category_dir(body: &str, session: &str, category: Category) -> String {
    format!("ga/{body}/{session}/{category}")
}

pub fn listing_page(body: &str, session: &str, category: Category) -> String {
    format!("{}/index.html", category_dir(body, session, category))
}

pub fn detail_page(body: &str, session: &str, category: Category, id: &str) -> String {
    format!("{}/{}.html", category_dir(body, session, category), slug(id))
}

pub fn overview_page(body: &str, session: &str) -> String {
    format!("ga/{body}/{session}/index.html")
}

/// Join a site-relative page path onto the configured base URL.
pub fn href(base_url: &str, rel: &str) -> String {
    format!("{}/{rel}", base_url.trim_end_matches('/'))
}

/// File-system-safe page name for a record id.
pub fn slug(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect()
}
