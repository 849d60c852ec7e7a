//! Turning spreadsheet rows into validated records.
//!
//! Rows arrive as JSON objects keyed by column header, the shape produced by
//! a CSV or GViz export once parsed. Column names vary between sheets, so
//! every field is looked up through a list of accepted headers. Rows
//! without a usable coordinate, category or name never reach the store.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use geodir_layout::{CoordError, LatLon};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::record::{Record, RecordFields, SearchFields};
use crate::skills::SkillSet;
use crate::store::RecordStore;

/// A parsed spreadsheet row.
pub type Row = Map<String, Value>;

const LATITUDE: &[&str] = &["latitude", "Lat", "lat"];
const LONGITUDE: &[&str] = &["longitude", "Lon", "lon", "lng"];

/// Which sheet layout the rows follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordSchema {
    /// Staff directory: one row per person
    #[default]
    People,
    /// Contract references: one row per mission
    References,
}

impl FromStr for RecordSchema {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "people" | "annuaire" => Ok(Self::People),
            "references" | "refs" => Ok(Self::References),
            other => Err(Error::InvalidInput(format!("unknown record schema: {}", other))),
        }
    }
}

impl RecordSchema {
    /// Fields searched for this layout. Reference contacts are shown on
    /// cards but not searched.
    pub fn search_fields(&self) -> SearchFields {
        match self {
            Self::People => SearchFields::All,
            Self::References => SearchFields::WithoutContact,
        }
    }
}

impl fmt::Display for RecordSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::People => f.write_str("people"),
            Self::References => f.write_str("references"),
        }
    }
}

/// Why a row was left out.
#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    /// Latitude or longitude missing or not a number
    MissingCoordinate,
    /// Coordinate outside the valid range
    InvalidCoordinate(CoordError),
    /// No organization to categorize by
    MissingCategory,
    /// People row without first or last name
    MissingName,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCoordinate => f.write_str("missing coordinate"),
            Self::InvalidCoordinate(e) => write!(f, "{}", e),
            Self::MissingCategory => f.write_str("missing category"),
            Self::MissingName => f.write_str("missing name"),
        }
    }
}

/// A row that did not become a record.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    /// Zero-based position in the input
    pub row: usize,
    pub reason: RejectReason,
}

/// Outcome of an ingestion pass.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub records: Vec<Record>,
    pub rejected: Vec<RejectedRow>,
}

impl IngestReport {
    /// Consume the report into a store.
    pub fn into_store(self) -> RecordStore {
        RecordStore::new(self.records)
    }
}

/// Parse a numeric cell.
///
/// Numbers pass through. Strings have whitespace and euro signs removed and
/// accept a comma as decimal separator ("1 000,50 €" is 1000.5). Empty and
/// non-finite values yield `None`.
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_number_str(s),
        _ => None,
    }
}

fn parse_number_str(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '€')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned
        .replacen(',', ".", 1)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Text of the first present column among `names`.
fn pick(row: &Row, names: &[&str]) -> String {
    names
        .iter()
        .find_map(|name| row.get(*name))
        .map(cell_text)
        .unwrap_or_default()
}

fn pick_value<'a>(row: &'a Row, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| row.get(*name))
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn join_non_empty<'a>(parts: impl IntoIterator<Item = &'a str>, sep: &str) -> String {
    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

fn coordinate(row: &Row) -> std::result::Result<LatLon, RejectReason> {
    let lat = pick_value(row, LATITUDE).and_then(parse_number);
    let lon = pick_value(row, LONGITUDE).and_then(parse_number);
    match (lat, lon) {
        (Some(lat), Some(lon)) => LatLon::try_new(lat, lon).map_err(RejectReason::InvalidCoordinate),
        _ => Err(RejectReason::MissingCoordinate),
    }
}

fn people_fields(row: &Row) -> std::result::Result<RecordFields, RejectReason> {
    let first = pick(row, &["Prénom", "Prenom", "PRENOM"]);
    let last = pick(row, &["Nom", "NOM"]);
    if first.is_empty() && last.is_empty() {
        return Err(RejectReason::MissingName);
    }

    let contact = [
        pick(row, &["Adresse mail", "Email", "Mail", "Courriel"]),
        pick(row, &["Numéro de téléphone", "Téléphone", "Tel", "Tél."]),
    ]
    .into_iter()
    .filter(|c| !c.is_empty())
    .collect();

    let notes = pick(row, &["Compétences clés", "Compétences", "Competences"]);

    Ok(RecordFields {
        name: join_non_empty([first.as_str(), last.as_str()], " "),
        organization: pick(row, &["Entité", "Entreprise", "ENTITE"]),
        role: pick(row, &["Poste occupé", "Poste", "Fonction"]),
        skills: SkillSet::parse(&notes),
        notes,
        contact,
        locality: pick(row, &["Zone géographique", "Localité", "Localite"]),
        amount: None,
    })
}

fn reference_fields(row: &Row) -> RecordFields {
    let territory = pick(row, &["Territoire"]);
    let year = pick(row, &["Année", "Annee"]);
    let referent_title = pick(row, &["Titre référent"]);
    let referent_name = pick(row, &["Nom référent"]);

    let contact = [pick(row, &["Mail"]), pick(row, &["Tél", "Tel"])]
        .into_iter()
        .filter(|c| !c.is_empty())
        .collect();

    RecordFields {
        name: pick(row, &["Intitulé mission"]),
        organization: pick(row, &["Entité"]),
        role: pick(row, &["Cheffe de projet", "Chef de projet"]),
        notes: join_non_empty(
            [
                territory.as_str(),
                year.as_str(),
                referent_title.as_str(),
                referent_name.as_str(),
            ],
            " ",
        ),
        contact,
        locality: territory.clone(),
        amount: pick_value(row, &["Montant"]).and_then(parse_number),
        skills: SkillSet::default(),
    }
}

/// Convert one row, or say why it cannot be used.
pub fn ingest_row(row: &Row, schema: RecordSchema) -> std::result::Result<Record, RejectReason> {
    let fields = match schema {
        RecordSchema::People => people_fields(row)?,
        RecordSchema::References => reference_fields(row),
    };
    if fields.organization.trim().is_empty() {
        return Err(RejectReason::MissingCategory);
    }
    let coord = coordinate(row)?;
    Ok(Record::with_search_fields(fields, coord, schema.search_fields()))
}

/// Convert rows in order, keeping the valid ones.
pub fn ingest_rows<I>(rows: I, schema: RecordSchema) -> IngestReport
where
    I: IntoIterator<Item = Row>,
{
    let mut report = IngestReport::default();

    for (i, row) in rows.into_iter().enumerate() {
        match ingest_row(&row, schema) {
            Ok(record) => report.records.push(record),
            Err(reason) => {
                tracing::debug!("Skipping {} row {}: {}", schema, i, reason);
                report.rejected.push(RejectedRow { row: i, reason });
            }
        }
    }

    tracing::info!(
        "Ingested {} {} records ({} rows skipped)",
        report.records.len(),
        schema,
        report.rejected.len()
    );
    report
}

/// Ingest a JSON array of row objects.
pub fn ingest_json(text: &str, schema: RecordSchema) -> Result<IngestReport> {
    let document: Value = serde_json::from_str(text)?;
    let Value::Array(items) = document else {
        return Err(Error::InvalidInput("expected a JSON array of rows".to_string()));
    };

    let mut rows = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(row) => rows.push(row),
            _ => return Err(Error::InvalidInput(format!("row {} is not an object", i))),
        }
    }
    Ok(ingest_rows(rows, schema))
}

/// Read and ingest a JSON rows file.
pub fn load_file<P: AsRef<Path>>(path: P, schema: RecordSchema) -> Result<IngestReport> {
    let text = std::fs::read_to_string(path)?;
    ingest_json(&text, schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{matches, FilterState};
    use crate::record::Category;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("test rows must be objects"),
        }
    }

    #[test]
    fn parse_number_formats() {
        assert_eq!(parse_number(&json!(48.85)), Some(48.85));
        assert_eq!(parse_number(&json!("48,85661")), Some(48.85661));
        assert_eq!(parse_number(&json!(" 2.35 ")), Some(2.35));
        assert_eq!(parse_number(&json!("1 000,50 €")), Some(1000.5));
        assert_eq!(parse_number(&json!("12 500€")), Some(12500.0));
        assert_eq!(parse_number(&json!("")), None);
        assert_eq!(parse_number(&json!("n/a")), None);
        assert_eq!(parse_number(&json!("NaN")), None);
        assert_eq!(parse_number(&json!(null)), None);
    }

    #[test]
    fn people_row_with_aliases() {
        let r = row(json!({
            "Prénom": "Jean",
            "NOM": "Dupont",
            "Entreprise": "Epicure ing",
            "Poste": "Ingénieur",
            "Email": "jean@example.fr",
            "Tél.": "06 12 34 56 78",
            "Compétences clés": "VRD; Assainissement",
            "Localité": "Nantes",
            "lat": "47,2184",
            "lng": -1.5536
        }));

        let record = ingest_row(&r, RecordSchema::People).unwrap();
        assert_eq!(record.name(), "Jean Dupont");
        assert_eq!(record.category().as_str(), "Epicure ing");
        assert_eq!(record.fields().contact, vec!["jean@example.fr", "06 12 34 56 78"]);
        assert_eq!(record.fields().locality, "Nantes");
        assert_eq!(record.coord(), LatLon::new(47.2184, -1.5536));
        assert_eq!(record.fields().skills.competences, vec!["VRD", "Assainissement"]);
        assert!(record.haystack().contains("jean@example.fr"));
    }

    #[test]
    fn people_rejections() {
        let no_name = row(json!({"Entité": "Majalis", "lat": 45.0, "lon": 5.0}));
        assert_eq!(
            ingest_row(&no_name, RecordSchema::People),
            Err(RejectReason::MissingName)
        );

        let no_coord = row(json!({"Nom": "Martin", "Entité": "Majalis", "lat": "", "lon": 5.0}));
        assert_eq!(
            ingest_row(&no_coord, RecordSchema::People),
            Err(RejectReason::MissingCoordinate)
        );

        let no_category = row(json!({"Nom": "Martin", "lat": 45.0, "lon": 5.0}));
        assert_eq!(
            ingest_row(&no_category, RecordSchema::People),
            Err(RejectReason::MissingCategory)
        );

        let out_of_range = row(json!({"Nom": "Martin", "Entité": "Majalis", "lat": 145.0, "lon": 5.0}));
        assert_eq!(
            ingest_row(&out_of_range, RecordSchema::People),
            Err(RejectReason::InvalidCoordinate(CoordError::InvalidLatitude(145.0)))
        );
    }

    #[test]
    fn reference_row() {
        let r = row(json!({
            "Entité": "OCADIA",
            "Intitulé mission": "Schéma directeur cyclable",
            "Territoire": "Métropole de Lyon",
            "Année": 2023,
            "Cheffe de projet": "C. Bernard",
            "Titre référent": "DGS",
            "Nom référent": "M. Petit",
            "Mail": "contact@example.fr",
            "Tél": "",
            "Montant": "45 000 €",
            "lat": "45,764",
            "lon": "4,8357"
        }));

        let record = ingest_row(&r, RecordSchema::References).unwrap();
        assert_eq!(record.name(), "Schéma directeur cyclable");
        assert_eq!(record.fields().role, "C. Bernard");
        assert_eq!(record.fields().notes, "Métropole de Lyon 2023 DGS M. Petit");
        assert_eq!(record.fields().contact, vec!["contact@example.fr"]);
        assert_eq!(record.fields().amount, Some(45000.0));
        assert!(record.haystack().contains("metropole de lyon"));
        assert!(record.fields().skills.is_empty());
    }

    #[test]
    fn reference_contacts_are_not_searched() {
        let r = row(json!({
            "Entité": "OCADIA",
            "Intitulé mission": "Plan vélo",
            "Territoire": "Nantes",
            "Mail": "contact@acme.fr",
            "Tél": "0612",
            "lat": 47.2184,
            "lon": -1.5536
        }));

        let record = ingest_row(&r, RecordSchema::References).unwrap();
        assert_eq!(record.haystack(), "plan velo ocadia nantes");

        let mut state = FilterState::new(vec![Category::from("OCADIA")]);
        state.set_query("acme");
        assert!(!matches(&record, &state));
        state.set_query("0612");
        assert!(!matches(&record, &state));
        state.set_query("velo nantes");
        assert!(matches(&record, &state));
    }

    #[test]
    fn ingest_rows_keeps_order_and_reports_rejections() {
        let rows = vec![
            row(json!({"Nom": "A", "Entité": "X", "lat": 45.0, "lon": 5.0})),
            row(json!({"Nom": "B", "Entité": "X"})),
            row(json!({"Nom": "C", "Entité": "Y", "lat": 46.0, "lon": 6.0})),
        ];
        let report = ingest_rows(rows, RecordSchema::People);

        let names: Vec<_> = report.records.iter().map(Record::name).collect();
        assert_eq!(names, vec!["A", "C"]);
        assert_eq!(
            report.rejected,
            vec![RejectedRow {
                row: 1,
                reason: RejectReason::MissingCoordinate
            }]
        );
        assert_eq!(report.into_store().categories().len(), 2);
    }

    #[test]
    fn ingest_json_document() {
        let text = r#"[{"Nom": "A", "Entité": "X", "lat": 45.0, "lon": 5.0}]"#;
        let report = ingest_json(text, RecordSchema::People).unwrap();
        assert_eq!(report.records.len(), 1);

        assert!(matches!(
            ingest_json("{}", RecordSchema::People),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            ingest_json("[1, 2]", RecordSchema::People),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            ingest_json("[", RecordSchema::People),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn schema_from_str() {
        assert_eq!("people".parse::<RecordSchema>().unwrap(), RecordSchema::People);
        assert_eq!(" References ".parse::<RecordSchema>().unwrap(), RecordSchema::References);
        assert!("veille".parse::<RecordSchema>().is_err());
    }
}
