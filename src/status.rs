//! Pipeline progress summary.
use crate::error::Result;
use crate::paths::DataPaths;
use crate::staging::staged_ids;
use crate::store::{Collection, RecordStore};
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub drafts: usize,
    pub approved: usize,
    pub sent: usize,
    pub skipped: usize,
    /// Awards waiting in staging; not part of `total`.
    pub staged: usize,
    pub total: usize,
    pub progress_percent: u32,
}

impl StatusSummary {
    pub fn from_counts(drafts: usize, approved: usize, sent: usize, skipped: usize) -> Self {
        let total = drafts + approved + sent + skipped;
        Self {
            drafts,
            approved,
            sent,
            skipped,
            staged: 0,
            total,
            progress_percent: progress_percent(sent, total),
        }
    }

    pub fn count(&self, collection: Collection) -> usize {
        match collection {
            Collection::Drafts => self.drafts,
            Collection::Approved => self.approved,
            Collection::Sent => self.sent,
            Collection::Skipped => self.skipped,
        }
    }
}

/// `round(sent * 100 / total)`, or 0 for an empty pipeline.
pub fn progress_percent(sent: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let percent = ((sent * 100) as f64 / total as f64).round();
    percent as u32
}

pub fn get_status<S: RecordStore + ?Sized>(store: &S) -> Result<StatusSummary> {
    Ok(StatusSummary::from_counts(
        store.count(Collection::Drafts)?,
        store.count(Collection::Approved)?,
        store.count(Collection::Sent)?,
        store.count(Collection::Skipped)?,
    ))
}

/// Status including the staging count from the data root.
pub fn get_full_status<S: RecordStore + ?Sized>(
    store: &S,
    paths: &DataPaths,
) -> Result<StatusSummary> {
    let mut summary = get_status(store)?;
    summary.staged = staged_ids(paths)?.len();
    Ok(summary)
}

pub fn render_text(summary: &StatusSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "outreach status");
    for collection in Collection::ALL {
        let _ = writeln!(
            out,
            "  {:<9} {:>6}",
            collection.as_str(),
            summary.count(collection)
        );
    }
    let _ = writeln!(out, "  {:<9} {:>6}", "total", summary.total);
    if summary.staged > 0 {
        let _ = writeln!(out, "  {:<9} {:>6}", "staged", summary.staged);
    }
    let _ = writeln!(
        out,
        "progress: {}% sent ({} of {})",
        summary.progress_percent, summary.sent, summary.total
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::sample_record;
    use crate::store::MemoryStore;

    #[test]
    fn counts_each_collection() {
        let store = MemoryStore::new();
        for (collection, id) in [
            (Collection::Drafts, "1"),
            (Collection::Drafts, "2"),
            (Collection::Approved, "3"),
            (Collection::Sent, "4"),
            (Collection::Skipped, "5"),
        ] {
            store.write(collection, &sample_record(id)).expect("seed");
        }
        let summary = get_status(&store).expect("status");
        assert_eq!(summary, StatusSummary::from_counts(2, 1, 1, 1));
        assert_eq!(summary.total, 5);
        assert_eq!(summary.progress_percent, 20);
    }

    #[test]
    fn progress_rounds_and_handles_empty() {
        assert_eq!(progress_percent(0, 0), 0);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(1, 8), 13);
        assert_eq!(progress_percent(4, 4), 100);
    }

    #[test]
    fn text_report_lists_collections_and_progress() {
        let mut summary = StatusSummary::from_counts(2, 1, 1, 1);
        let text = render_text(&summary);
        assert!(text.contains("drafts"));
        assert!(text.contains("progress: 20% sent (1 of 5)"));
        assert!(!text.contains("staged"));
        summary.staged = 4;
        assert!(render_text(&summary).contains("staged"));
    }

    #[test]
    fn json_uses_snake_case_fields() {
        let value = serde_json::to_value(StatusSummary::from_counts(0, 0, 0, 0)).expect("json");
        assert_eq!(value["progress_percent"], 0);
        assert_eq!(value["staged"], 0);
    }
}
