use std::collections::BTreeMap;
use std::fmt;

use crate::records::Category;

/// Per-category outcome counters for one scrape or build run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitCounts {
    pub ok: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// End-of-run report. Each (body, session, category) unit contributes one
/// count; page-level render failures are listed individually.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    rows: BTreeMap<Category, UnitCounts>,
    failed_pages: Vec<String>,
}

impl RunSummary {
    pub fn record_ok(&mut self, category: Category) {
        self.rows.entry(category).or_default().ok += 1;
    }

    pub fn record_skip(&mut self, category: Category) {
        self.rows.entry(category).or_default().skipped += 1;
    }

    pub fn record_failure(&mut self, category: Category) {
        self.rows.entry(category).or_default().failed += 1;
    }

    pub fn record_failed_page(&mut self, page: impl Into<String>) {
        self.failed_pages.push(page.into());
    }

    pub fn counts(&self, category: Category) -> UnitCounts {
        self.rows.get(&category).copied().unwrap_or_default()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed_pages.is_empty() || self.rows.values().any(|c| c.failed > 0)
    }

    pub fn failure_count(&self) -> usize {
        self.rows.values().map(|c| c.failed).sum::<usize>() + self.failed_pages.len()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<10} {:>4} {:>8} {:>7}", "category", "ok", "skipped", "failed")?;
        for (category, counts) in &self.rows {
            writeln!(
                f,
                "{:<10} {:>4} {:>8} {:>7}",
                category.to_string(),
                counts.ok,
                counts.skipped,
                counts.failed
            )?;
        }
        for page in &self.failed_pages {
            writeln!(f, "failed page: {page}")?;
        }
        Ok(())
    }
}
