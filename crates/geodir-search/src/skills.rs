//! Free-text skill lists split into thematics and competences.
//!
//! Directory sheets keep skills in one cell, e.g.
//! `"Thématiques : Mobilité, Urbanisme ; Compétences : SIG - AutoCAD"`.
//! Items are separated by `: ; , |`, bullets, line breaks or a dash/slash
//! surrounded by spaces. A "thématique(s)" label routes the following items
//! to thematics until another label appears.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::normalize::normalize;

static SEPARATORS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?:\s+[-–—/]\s+)|[:;,\n|\u{2022}]+").ok());

/// Normalized labels that end a thematic run.
const LABELS: &[&str] = &[
    "competence",
    "competences",
    "langue",
    "langues",
    "certification",
    "certifications",
    "outil",
    "outils",
    "expertise",
    "expertises",
    "domaine",
    "domaines",
    "theme",
    "themes",
];

/// Skills of one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillSet {
    pub thematics: Vec<String>,
    pub competences: Vec<String>,
}

impl SkillSet {
    /// Split a skills cell. Duplicates are dropped, first occurrence wins.
    pub fn parse(raw: &str) -> Self {
        let mut skills = Self::default();
        let mut in_thematics = false;
        let mut seen_thematics = HashSet::new();
        let mut seen_competences = HashSet::new();

        for item in split_items(raw) {
            let key = normalize(item);
            if key.starts_with("thematique") {
                in_thematics = true;
                continue;
            }
            if LABELS.contains(&key.as_str()) {
                in_thematics = false;
                continue;
            }

            if in_thematics {
                if seen_thematics.insert(item) {
                    skills.thematics.push(item.to_string());
                }
            } else if seen_competences.insert(item) {
                skills.competences.push(item.to_string());
            }
        }
        skills
    }

    pub fn is_empty(&self) -> bool {
        self.thematics.is_empty() && self.competences.is_empty()
    }
}

fn split_items(raw: &str) -> Vec<&str> {
    let items: Vec<&str> = match SEPARATORS.as_ref() {
        Some(re) => re.split(raw).collect(),
        None => vec![raw],
    };
    items
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
