//! Style variant configuration and random selection.
use crate::error::{OutreachError, Result};
use crate::record::VariantSelection;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn enabled_default() -> bool {
    true
}

/// One selectable style item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(alias = "text", alias = "description", alias = "instructions")]
    pub content: String,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
}

/// The three independently selected style facets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleConfig {
    pub templates: Vec<VariantItem>,
    pub ouro_descriptions: Vec<VariantItem>,
    pub calls_to_action: Vec<VariantItem>,
}

/// The items chosen for one draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedVariant {
    pub template: VariantItem,
    pub description: VariantItem,
    pub call_to_action: VariantItem,
}

impl SelectedVariant {
    pub fn selection(&self) -> VariantSelection {
        VariantSelection {
            template_id: self.template.id.clone(),
            description_id: self.description.id.clone(),
            cta_id: self.call_to_action.id.clone(),
        }
    }
}

impl StyleConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => OutreachError::Configuration(format!(
                "style variants not found at {}",
                path.display()
            )),
            _ => OutreachError::io(path, err),
        })?;
        serde_json::from_slice(&bytes).map_err(|err| OutreachError::json(path, err))
    }

    fn facets(&self) -> [(&'static str, &[VariantItem]); 3] {
        [
            ("templates", self.templates.as_slice()),
            ("ouro_descriptions", self.ouro_descriptions.as_slice()),
            ("calls_to_action", self.calls_to_action.as_slice()),
        ]
    }

    /// Fail unless every facet has at least one enabled item.
    pub fn ensure_selectable(&self) -> Result<()> {
        for (name, items) in self.facets() {
            if !items.iter().any(|item| item.enabled) {
                return Err(OutreachError::Configuration(format!(
                    "no enabled {name} in style variants"
                )));
            }
        }
        Ok(())
    }

    /// Pick one enabled item per facet, uniformly and independently.
    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SelectedVariant> {
        Ok(SelectedVariant {
            template: pick("templates", &self.templates, rng)?,
            description: pick("ouro_descriptions", &self.ouro_descriptions, rng)?,
            call_to_action: pick("calls_to_action", &self.calls_to_action, rng)?,
        })
    }
}

fn pick<R: Rng + ?Sized>(facet: &str, items: &[VariantItem], rng: &mut R) -> Result<VariantItem> {
    let enabled: Vec<&VariantItem> = items.iter().filter(|item| item.enabled).collect();
    enabled
        .choose(rng)
        .map(|item| (*item).clone())
        .ok_or_else(|| OutreachError::Configuration(format!("no enabled {facet} in style variants")))
}
