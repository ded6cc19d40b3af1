//! Award pool statistics for choosing a year and keyword set.
use crate::awards::{has_valid_contact, matches_keywords, AwardLoader};
use crate::error::Result;
use crate::store::RecordStore;
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearScan {
    pub year: String,
    pub total: usize,
    pub keyword_matches: usize,
    pub with_contact: usize,
    /// Keyword matches with a contact that are not in any status collection.
    pub unprocessed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub keywords: Vec<String>,
    pub years: Vec<YearScan>,
}

pub fn scan_awards<S: RecordStore + ?Sized>(
    loader: &AwardLoader<'_>,
    store: &S,
    years: &[String],
    keywords: &[String],
) -> Result<ScanReport> {
    let processed = store.processed_ids()?;
    let mut report = ScanReport {
        keywords: keywords.to_vec(),
        years: Vec::with_capacity(years.len()),
    };
    for year in years {
        let all = loader.load_awards(year, &[])?;
        let matched: Vec<_> = all
            .iter()
            .filter(|award| matches_keywords(award, keywords))
            .collect();
        let reachable: Vec<_> = matched
            .iter()
            .filter(|award| has_valid_contact(award))
            .collect();
        report.years.push(YearScan {
            year: year.clone(),
            total: all.len(),
            keyword_matches: matched.len(),
            with_contact: reachable.len(),
            unprocessed: reachable
                .iter()
                .filter(|award| !processed.contains(&award.id))
                .count(),
        });
    }
    Ok(report)
}

pub fn render_text(report: &ScanReport) -> String {
    let mut out = String::new();
    if report.keywords.is_empty() {
        let _ = writeln!(out, "keywords: (none)");
    } else {
        let _ = writeln!(out, "keywords: {}", report.keywords.join(", "));
    }
    if report.years.is_empty() {
        let _ = writeln!(out, "no award years found");
        return out;
    }
    let _ = writeln!(
        out,
        "{:<6} {:>8} {:>8} {:>8} {:>11}",
        "year", "awards", "matches", "contact", "unprocessed"
    );
    for year in &report.years {
        let _ = writeln!(
            out,
            "{:<6} {:>8} {:>8} {:>8} {:>11}",
            year.year, year.total, year.keyword_matches, year.with_contact, year.unprocessed
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::DataPaths;
    use crate::record::sample_record;
    use crate::store::{Collection, FsStore};
    use serde_json::json;
    use std::fs;

    #[test]
    fn counts_narrow_at_each_stage() {
        let dir = tempfile::tempdir().expect("temp dir");
        let paths = DataPaths::new(dir.path().to_path_buf());
        let year_dir = paths.year_dir("2024");
        fs::create_dir_all(&year_dir).expect("mkdir");
        let awards = [
            json!({"id": "1", "title": "Solar materials", "piEmail": "a@u.edu"}),
            json!({"id": "2", "title": "Battery materials", "piEmail": ""}),
            json!({"id": "3", "title": "Materials for hydrogen", "piEmail": "c@u.edu"}),
            json!({"id": "4", "title": "Medieval poetry", "piEmail": "d@u.edu"}),
        ];
        for award in awards {
            let id = award["id"].as_str().expect("id").to_string();
            fs::write(year_dir.join(format!("{id}.json")), award.to_string()).expect("write");
        }
        let store = FsStore::new(paths.clone());
        store
            .write(Collection::Sent, &sample_record("3"))
            .expect("seed sent");

        let report = scan_awards(
            &AwardLoader::new(&paths),
            &store,
            &["2024".to_string()],
            &["materials".to_string()],
        )
        .expect("scan");
        assert_eq!(
            report.years,
            vec![YearScan {
                year: "2024".to_string(),
                total: 4,
                keyword_matches: 3,
                with_contact: 2,
                unprocessed: 1,
            }]
        );
        assert!(render_text(&report).contains("2024"));
    }
}
