//! Shared test infrastructure for integration tests.
#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Environment variables the binary reads; cleared so the host cannot leak in.
const OUTREACH_ENV: &[&str] = &[
    "OUTREACH_DATA_DIR",
    "OUTREACH_LM_COMMAND",
    "OPENAI_API_KEY",
    "OUTREACH_LM_BASE_URL",
    "OUTREACH_LM_MODEL",
    "OUTREACH_LM_TEMPERATURE",
    "RESEND_API_KEY",
    "OUTREACH_FROM_EMAIL",
    "OUTREACH_FROM_NAME",
    "RUST_LOG",
];

/// A throwaway data root.
pub struct DataRoot {
    dir: TempDir,
}

impl Default for DataRoot {
    fn default() -> Self {
        Self::new()
    }
}

impl DataRoot {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn collection_dir(&self, collection: &str) -> PathBuf {
        self.path().join(collection)
    }

    pub fn write_json(&self, relative: &str, value: &Value) {
        let path = self.path().join(relative);
        fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
        fs::write(&path, serde_json::to_vec_pretty(value).expect("serialize")).expect("write");
    }

    pub fn write_award(&self, year: &str, id: &str, title: &str, email: &str) {
        self.write_json(
            &format!("awards/{year}/{id}.json"),
            &json!({
                "id": id,
                "title": title,
                "abstractText": format!("Abstract for {title}."),
                "pdPIName": "Ada Lovelace",
                "piEmail": email,
                "awardeeName": "Example University",
                "estimatedTotalAmt": "250000",
            }),
        );
    }

    pub fn write_record(&self, collection: &str, id: &str) {
        self.write_json(
            &format!("{collection}/{id}.json"),
            &json!({
                "award_id": id,
                "pi_name": "Ada Lovelace",
                "pi_email": format!("pi-{id}@example.edu"),
                "institution": "Example University",
                "award_title": "Quantum Widgets",
                "award_amount": "250000",
                "subject": format!("Subject for {id}"),
                "body": "Hello Dr. Lovelace,\n\nWe read about your award.",
                "variant_selection": {
                    "template_id": "t1",
                    "description_id": "d1",
                    "cta_id": "c1"
                },
                "generated_at": "2026-01-02T03:04:05Z",
                "sent_at": null,
                "resend_id": null
            }),
        );
    }

    pub fn write_variants(&self) {
        self.write_json(
            "config/style_variants.json",
            &json!({
                "templates": [
                    {"id": "t1", "content": "Short and warm."},
                    {"id": "t-off", "content": "Never used.", "enabled": false}
                ],
                "ouro_descriptions": [
                    {"id": "d1", "content": "Ouro publishes research assets."}
                ],
                "calls_to_action": [
                    {"id": "c1", "content": "Invite them to a short call."}
                ]
            }),
        );
    }

    /// A command-line model that ignores its prompt and prints a fixed email.
    pub fn fake_lm_command(&self) -> String {
        let script = self.path().join("fake-lm.sh");
        fs::write(
            &script,
            "#!/bin/sh\ncat > /dev/null\nprintf '%s\\n' '{\"subject\": \"Your research\", \"body\": \"Hello there.\"}'\n",
        )
        .expect("write fake lm");
        format!("sh {}", script.display())
    }

    /// Ids in a collection, sorted.
    pub fn ids(&self, collection: &str) -> Vec<String> {
        let Ok(entries) = fs::read_dir(self.collection_dir(collection)) else {
            return Vec::new();
        };
        let mut ids: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                entry
                    .path()
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(str::to_string)
            })
            .collect();
        ids.sort();
        ids
    }

    pub fn read_record(&self, collection: &str, id: &str) -> Value {
        let path = self.collection_dir(collection).join(format!("{id}.json"));
        serde_json::from_slice(&fs::read(path).expect("read record")).expect("parse record")
    }

    /// `outreach --data-dir <root>` with a clean environment.
    pub fn outreach(&self) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_outreach"));
        for key in OUTREACH_ENV {
            command.env_remove(key);
        }
        command.arg("--data-dir").arg(self.path());
        command
    }
}

pub fn run(command: &mut Command) -> Output {
    command.output().expect("run outreach")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
