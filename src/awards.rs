//! Award loading, normalization, and eligibility filtering.
//!
//! Raw award files come from more than one export shape, so every normalized
//! field is resolved through [`FIELD_PRECEDENCE`]: the first present, non-empty
//! source key wins. Normalization never fails; absent fields become empty.
use crate::error::{OutreachError, Result};
use crate::paths::DataPaths;
use crate::store::RecordStore;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::OnceLock;

/// A normalized award. Read-only to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardRecord {
    pub id: String,
    pub title: String,
    pub abstract_text: String,
    pub pi_name: String,
    pub pi_email: String,
    pub institution: String,
    pub amount: String,
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
}

/// Normalized fields, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwardField {
    Id,
    Title,
    Abstract,
    PiName,
    PiEmail,
    Institution,
    Amount,
    Program,
    StartDate,
}

/// Priority-ordered source keys per normalized field. Raw NSF export names come
/// first, then the names this pipeline writes when it re-saves an award.
pub const FIELD_PRECEDENCE: &[(AwardField, &[&str])] = &[
    (AwardField::Id, &["id", "award_id"]),
    (AwardField::Title, &["title", "award_title"]),
    (
        AwardField::Abstract,
        &["abstractText", "abstract", "abstract_text"],
    ),
    (AwardField::PiName, &["pdPIName", "pi_name"]),
    (AwardField::PiEmail, &["piEmail", "pi_email"]),
    (AwardField::Institution, &["awardeeName", "institution"]),
    (
        AwardField::Amount,
        &[
            "estimatedTotalAmt",
            "fundsObligatedAmt",
            "award_amount",
            "amount",
        ],
    ),
    (AwardField::Program, &["fundProgramName", "program"]),
    (AwardField::StartDate, &["startDate", "start_date"]),
];

fn source_keys(field: AwardField) -> &'static [&'static str] {
    FIELD_PRECEDENCE
        .iter()
        .find(|(candidate, _)| *candidate == field)
        .map(|(_, keys)| *keys)
        .unwrap_or(&[])
}

fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn resolve(raw: &Map<String, Value>, field: AwardField) -> Option<String> {
    source_keys(field)
        .iter()
        .find_map(|key| raw.get(*key).and_then(scalar_text))
}

/// Normalize one raw award object. `fallback_id` (the file stem) is used only
/// when no id key is present.
pub fn normalize_award(raw: &Map<String, Value>, fallback_id: &str) -> AwardRecord {
    let pi_name = resolve(raw, AwardField::PiName).unwrap_or_else(|| {
        ["piFirstName", "piLastName"]
            .iter()
            .filter_map(|key| raw.get(*key).and_then(scalar_text))
            .collect::<Vec<_>>()
            .join(" ")
    });
    AwardRecord {
        id: resolve(raw, AwardField::Id).unwrap_or_else(|| fallback_id.to_string()),
        title: resolve(raw, AwardField::Title).unwrap_or_default(),
        abstract_text: resolve(raw, AwardField::Abstract).unwrap_or_default(),
        pi_name,
        pi_email: resolve(raw, AwardField::PiEmail).unwrap_or_default(),
        institution: resolve(raw, AwardField::Institution).unwrap_or_default(),
        amount: resolve(raw, AwardField::Amount).unwrap_or_default(),
        program: resolve(raw, AwardField::Program),
        start_date: resolve(raw, AwardField::StartDate),
    }
}

/// True iff a PI email is present and looks like an address.
pub fn has_valid_contact(award: &AwardRecord) -> bool {
    let email = award.pi_email.trim();
    !email.is_empty() && email.contains('@')
}

/// Case-insensitive keyword match over title and abstract. No keywords keeps
/// everything.
pub fn matches_keywords(award: &AwardRecord, keywords: &[String]) -> bool {
    if keywords.is_empty() {
        return true;
    }
    let haystack = format!("{} {}", award.title, award.abstract_text).to_lowercase();
    keywords
        .iter()
        .any(|keyword| haystack.contains(&keyword.to_lowercase()))
}

/// Split a comma-separated keyword list, dropping empty entries.
pub fn parse_keywords(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(str::to_string)
        .collect()
}

fn year_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}$").expect("static year regex"))
}

/// Reads year-partitioned award files under `awards/`.
pub struct AwardLoader<'a> {
    paths: &'a DataPaths,
}

impl<'a> AwardLoader<'a> {
    pub fn new(paths: &'a DataPaths) -> Self {
        Self { paths }
    }

    /// Year tags with a partition directory, ascending.
    pub fn list_years(&self) -> Result<Vec<String>> {
        let dir = self.paths.awards_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(OutreachError::io(&dir, err)),
        };
        let mut years = Vec::new();
        for entry in entries {
            let path = entry.map_err(|err| OutreachError::io(&dir, err))?.path();
            if !path.is_dir() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                if year_pattern().is_match(name) {
                    years.push(name.to_string());
                }
            }
        }
        years.sort();
        Ok(years)
    }

    /// Every award in a year partition that matches `keywords`, in file name
    /// order. Files that fail to parse are skipped with a warning.
    pub fn load_awards(&self, year: &str, keywords: &[String]) -> Result<Vec<AwardRecord>> {
        if !year_pattern().is_match(year) {
            return Err(OutreachError::Configuration(format!(
                "year must be four digits (got {year:?})"
            )));
        }
        let awards = read_award_dir(&self.paths.year_dir(year))?;
        Ok(awards
            .into_iter()
            .filter(|award| matches_keywords(award, keywords))
            .collect())
    }

    /// `load_awards` minus awards without a valid contact and any award
    /// already present in a status collection.
    pub fn get_unprocessed_awards<S: RecordStore + ?Sized>(
        &self,
        store: &S,
        year: &str,
        keywords: &[String],
    ) -> Result<Vec<AwardRecord>> {
        let processed = store.processed_ids()?;
        Ok(self
            .load_awards(year, keywords)?
            .into_iter()
            .filter(|award| has_valid_contact(award) && !processed.contains(&award.id))
            .collect())
    }
}

/// Load and normalize every `*.json` file in `dir`, sorted by file name.
pub(crate) fn read_award_dir(dir: &Path) -> Result<Vec<AwardRecord>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(OutreachError::io(dir, err)),
    };
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|err| OutreachError::io(dir, err))?.path();
        if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            files.push(path);
        }
    }
    files.sort();

    let mut awards = Vec::with_capacity(files.len());
    for path in files {
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string();
        let bytes = fs::read(&path).map_err(|err| OutreachError::io(&path, err))?;
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(raw)) => awards.push(normalize_award(&raw, &stem)),
            Ok(_) => tracing::warn!(path = %path.display(), "award file is not a JSON object"),
            Err(err) => tracing::warn!(path = %path.display(), %err, "skipping unparseable award"),
        }
    }
    Ok(awards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::sample_record;
    use crate::store::{Collection, FsStore};
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn write_award(root: &Path, year: &str, name: &str, value: Value) {
        let dir = root.join("awards").join(year);
        fs::create_dir_all(&dir).expect("create year dir");
        fs::write(dir.join(name), value.to_string()).expect("write award");
    }

    #[test]
    fn raw_field_names_win_over_aliases() {
        let raw = object(json!({
            "id": "2301234",
            "award_id": "ignored",
            "title": "Raw title",
            "award_title": "Alias title",
            "abstractText": "Raw abstract",
            "abstract": "Alias abstract",
            "piEmail": "raw@uni.edu",
            "pi_email": "alias@uni.edu",
            "estimatedTotalAmt": "1000",
            "award_amount": "2000"
        }));
        let award = normalize_award(&raw, "file-stem");
        assert_eq!(award.id, "2301234");
        assert_eq!(award.title, "Raw title");
        assert_eq!(award.abstract_text, "Raw abstract");
        assert_eq!(award.pi_email, "raw@uni.edu");
        assert_eq!(award.amount, "1000");
    }

    #[test]
    fn falls_back_to_aliases_then_file_stem() {
        let raw = object(json!({
            "award_title": "Alias title",
            "pi_email": "alias@uni.edu",
            "amount": 42,
            "piFirstName": "Grace",
            "piLastName": "Hopper"
        }));
        let award = normalize_award(&raw, "2405555");
        assert_eq!(award.id, "2405555");
        assert_eq!(award.title, "Alias title");
        assert_eq!(award.amount, "42");
        assert_eq!(award.pi_name, "Grace Hopper");
        assert_eq!(award.institution, "");
        assert_eq!(award.program, None);
    }

    #[test]
    fn empty_source_values_do_not_shadow_later_keys() {
        let raw = object(json!({ "piEmail": "  ", "pi_email": "late@uni.edu" }));
        assert_eq!(normalize_award(&raw, "x").pi_email, "late@uni.edu");
    }

    #[test]
    fn contact_validity() {
        let raw = object(json!({ "piEmail": "a@b.edu" }));
        assert!(has_valid_contact(&normalize_award(&raw, "1")));
        let raw = object(json!({ "piEmail": "nobody" }));
        assert!(!has_valid_contact(&normalize_award(&raw, "1")));
        assert!(!has_valid_contact(&normalize_award(&Map::new(), "1")));
    }

    #[test]
    fn keyword_filter_excludes_non_matching_and_keeps_all_when_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        write_award(
            dir.path(),
            "2023",
            "2301234.json",
            json!({"id": "2301234", "piEmail": "a@b.edu", "title": "X", "abstractText": "Y"}),
        );
        let paths = DataPaths::new(dir.path().to_path_buf());
        let loader = AwardLoader::new(&paths);
        assert!(loader
            .load_awards("2023", &["DFT".to_string()])
            .expect("load")
            .is_empty());
        let all = loader.load_awards("2023", &[]).expect("load");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "2301234");
    }

    #[test]
    fn keyword_match_is_case_insensitive_across_title_and_abstract() {
        let raw = object(json!({"title": "Catalysis", "abstractText": "using dft methods"}));
        let award = normalize_award(&raw, "1");
        assert!(matches_keywords(&award, &["DFT".to_string()]));
        assert!(matches_keywords(&award, &["nope".to_string(), "CATALYSIS".to_string()]));
        assert!(!matches_keywords(&award, &["graphene".to_string()]));
    }

    #[test]
    fn lists_only_four_digit_year_dirs() {
        let dir = tempfile::tempdir().expect("temp dir");
        for name in ["2024", "2022", "misc", "20231"] {
            fs::create_dir_all(dir.path().join("awards").join(name)).expect("mkdir");
        }
        fs::write(dir.path().join("awards/1999"), "file, not dir").expect("write");
        let paths = DataPaths::new(dir.path().to_path_buf());
        assert_eq!(
            AwardLoader::new(&paths).list_years().expect("years"),
            vec!["2022", "2024"]
        );
    }

    #[test]
    fn unprocessed_excludes_every_status_collection_and_is_stable() {
        let dir = tempfile::tempdir().expect("temp dir");
        for id in ["1", "2", "3", "4", "5"] {
            write_award(
                dir.path(),
                "2024",
                &format!("{id}.json"),
                json!({"id": id, "piEmail": "a@b.edu"}),
            );
        }
        fs::write(dir.path().join("awards/2024/broken.json"), "{not json").expect("write");
        let paths = DataPaths::new(dir.path().to_path_buf());
        let store = FsStore::new(paths.clone());
        store.write(Collection::Drafts, &sample_record("1")).expect("write");
        store.write(Collection::Approved, &sample_record("2")).expect("write");
        store.write(Collection::Sent, &sample_record("3")).expect("write");
        store.write(Collection::Skipped, &sample_record("4")).expect("write");

        let loader = AwardLoader::new(&paths);
        let first = loader
            .get_unprocessed_awards(&store, "2024", &[])
            .expect("unprocessed");
        let second = loader
            .get_unprocessed_awards(&store, "2024", &[])
            .expect("unprocessed");
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, "5");
        assert_eq!(first, second);
    }

    #[test]
    fn unprocessed_drops_awards_without_contact() {
        let dir = tempfile::tempdir().expect("temp dir");
        write_award(dir.path(), "2024", "1.json", json!({"id": "1", "piEmail": ""}));
        write_award(dir.path(), "2024", "2.json", json!({"id": "2", "piEmail": "nobody"}));
        write_award(dir.path(), "2024", "3.json", json!({"id": "3", "piEmail": "c@uni.edu"}));
        let paths = DataPaths::new(dir.path().to_path_buf());
        let store = FsStore::new(paths.clone());

        let loader = AwardLoader::new(&paths);
        assert_eq!(loader.load_awards("2024", &[]).expect("load").len(), 3);
        let ids: Vec<String> = loader
            .get_unprocessed_awards(&store, "2024", &[])
            .expect("unprocessed")
            .into_iter()
            .map(|award| award.id)
            .collect();
        assert_eq!(ids, vec!["3"]);
    }

    #[test]
    fn rejects_malformed_year() {
        let dir = tempfile::tempdir().expect("temp dir");
        let paths = DataPaths::new(dir.path().to_path_buf());
        let err = AwardLoader::new(&paths)
            .load_awards("../x", &[])
            .expect_err("bad year");
        assert!(err.is_configuration());
    }

    #[test]
    fn parses_keyword_lists() {
        assert_eq!(
            parse_keywords(Some(" DFT, ,catalysis ,")),
            vec!["DFT", "catalysis"]
        );
        assert!(parse_keywords(None).is_empty());
    }
}
