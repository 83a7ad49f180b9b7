/*!
Gazetteer assembly: turning externally fetched tabular sources into the three normalized name
sets used for dictionary matching. This module performs pure data transformation; fetching the
sources (parliament roster API dumps, GeoNames extracts) is a collaborator's job, and any failure
to read a source is fatal for construction rather than degrading into a partial gazetteer.
*/
use crate::span::Label;
use ahash::AHashSet;
use serde::Deserialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{self, Display};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

/// German articles, conjunctions and prepositions that show up inside full names ("Van der
/// Bellen") but must not become standalone person entries.
const STOP_PARTS: &[&str] = &[
    "der", "die", "das", "den", "dem", "des", "ein", "eine", "einer", "einem", "eines", "und",
    "oder", "vom", "von", "zur", "zum", "im", "in", "am", "an",
];

/// GeoNames feature classes retained for the location set: populated places and administrative
/// areas.
const PLACE_FEATURE_CLASSES: &[&str] = &["P", "A"];

/// Chambers, parties, ministries and EU bodies. The organization set is this list and nothing
/// synthesized.
const CURATED_ORGANIZATIONS: &[&str] = &[
    "Nationalrat",
    "Bundesrat",
    "Bundesversammlung",
    "Österreichisches Parlament",
    "Parlament",
    "Österreichische Volkspartei",
    "ÖVP",
    "Sozialdemokratische Partei Österreichs",
    "SPÖ",
    "Freiheitliche Partei Österreichs",
    "FPÖ",
    "Die Grünen",
    "GRÜNE",
    "NEOS",
    "Kommunistische Partei Österreichs",
    "KPÖ",
    "Bundesregierung",
    "Bundeskanzleramt",
    "Bundespräsident",
    "Bundesministerium für Inneres",
    "Bundesministerium für Finanzen",
    "Bundesministerium für Justiz",
    "Bundesministerium für Bildung",
    "Bundesministerium für Landesverteidigung",
    "Österreichischer Gewerkschaftsbund",
    "Wirtschaftskammer Österreich",
    "Arbeiterkammer",
    "Europäische Union",
    "Europäische Kommission",
    "Europäischer Rat",
    "Europäisches Parlament",
];

/// Three deduplicated name sets, disjoint by construction but not enforced. Built once per
/// process and read-only afterwards; concurrent matching calls share it by reference.
#[derive(Debug, Clone)]
pub struct Gazetteer {
    persons: AHashSet<String>,
    locations: AHashSet<String>,
    organizations: AHashSet<String>,
}

impl Gazetteer {
    pub fn persons(&self) -> &AHashSet<String> {
        &self.persons
    }

    pub fn locations(&self) -> &AHashSet<String> {
        &self.locations
    }

    pub fn organizations(&self) -> &AHashSet<String> {
        &self.organizations
    }

    /// Every entry paired with its label, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, Label)> {
        let persons = self.persons.iter().map(|s| (s.as_str(), Label::Person));
        let locations = self.locations.iter().map(|s| (s.as_str(), Label::Location));
        let organizations = self
            .organizations
            .iter()
            .map(|s| (s.as_str(), Label::Organization));
        persons.chain(locations).chain(organizations)
    }

    pub fn len(&self) -> usize {
        self.persons.len() + self.locations.len() + self.organizations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A roster table as delivered by the parliament filter API: a header describing the columns and
/// rows of loosely typed cells. Column meaning is resolved once from the header by field name and
/// label, never by position.
#[derive(Debug, Clone, Deserialize)]
pub struct RosterTable {
    #[serde(default)]
    pub header: Vec<RosterColumn>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RosterColumn {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub feld_name: Option<String>,
}

/// Column indices resolved from a roster header.
#[derive(Debug, Clone, Copy, Default)]
struct RosterIndex {
    name: Option<usize>,
    attributes: Option<usize>,
    first_name: Option<usize>,
    last_name: Option<usize>,
}

impl RosterIndex {
    fn resolve(header: &[RosterColumn]) -> Self {
        let mut index = RosterIndex::default();
        for (i, column) in header.iter().enumerate() {
            let feld = column.feld_name.as_deref();
            let label = column.label.as_deref();
            if feld == Some("PERSON_NAME") || label == Some("Name") {
                index.name.get_or_insert(i);
            } else if feld == Some("ATTR_JSON") || label == Some("Attribute") {
                index.attributes.get_or_insert(i);
            } else if label == Some("vorname") {
                index.first_name.get_or_insert(i);
            } else if label == Some("nachname") {
                index.last_name.get_or_insert(i);
            }
        }
        index
    }
}

/// Accumulates source records into a [`Gazetteer`]. The organization set is pre-seeded with the
/// curated list; person name parts are derived once at [`GazetteerBuilder::build`] time.
#[derive(Debug, Clone)]
pub struct GazetteerBuilder {
    persons: AHashSet<String>,
    locations: AHashSet<String>,
    organizations: AHashSet<String>,
}

impl Default for GazetteerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GazetteerBuilder {
    pub fn new() -> Self {
        GazetteerBuilder {
            persons: AHashSet::new(),
            locations: AHashSet::new(),
            organizations: CURATED_ORGANIZATIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn add_person(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() {
            self.persons.insert(name.to_string());
        }
    }

    fn add_location(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() {
            self.locations.insert(name.to_string());
        }
    }

    /// Folds a parsed roster table into the person set. Each row contributes the full name, the
    /// citation and pre-honorific variants from the attribute cell, the bare first and last
    /// names, and the "first last" combination.
    pub fn person_roster(&mut self, table: &RosterTable) -> &mut Self {
        let index = RosterIndex::resolve(&table.header);
        for row in &table.rows {
            self.add_roster_row(index, row);
        }
        self
    }

    /// Reads a roster table from JSON.
    pub fn person_roster_reader<R: Read>(&mut self, reader: R) -> Result<&mut Self, GazetteerError> {
        let table: RosterTable = serde_json::from_reader(reader)?;
        Ok(self.person_roster(&table))
    }

    pub fn person_roster_path<P: AsRef<Path>>(
        &mut self,
        path: P,
    ) -> Result<&mut Self, GazetteerError> {
        let file = File::open(path)?;
        self.person_roster_reader(BufReader::new(file))
    }

    fn add_roster_row(&mut self, index: RosterIndex, row: &[Value]) {
        let cell = |i: Option<usize>| {
            i.and_then(|i| row.get(i))
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };

        if let Some(name) = cell(index.name) {
            self.add_person(name);
        }
        if let Some(attributes) = index.attributes.and_then(|i| row.get(i)) {
            for key in ["zit", "name_nvg"] {
                if let Some(value) = attributes.get(key).and_then(Value::as_str) {
                    self.add_person(value);
                }
            }
        }
        let first = cell(index.first_name);
        let last = cell(index.last_name);
        if let Some(first) = first {
            self.add_person(first);
        }
        if let Some(last) = last {
            self.add_person(last);
        }
        if let (Some(first), Some(last)) = (first, last) {
            self.add_person(&format!("{} {}", first, last));
        }
    }

    /// Reads GeoNames-format place records: tab-separated lines with at least 15 fields, of
    /// which name (1), ascii name (2) and feature class (6) are used. Only populated places and
    /// administrative areas are kept; the ascii name is added when it differs from the primary.
    pub fn places<R: BufRead>(&mut self, reader: R) -> Result<&mut Self, GazetteerError> {
        for line in reader.lines() {
            let line = line?;
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 15 {
                continue;
            }
            if !PLACE_FEATURE_CLASSES.contains(&fields[6]) {
                continue;
            }
            let name = fields[1].trim();
            self.add_location(name);
            let ascii = fields[2].trim();
            if ascii != name {
                self.add_location(ascii);
            }
        }
        Ok(self)
    }

    pub fn places_path<P: AsRef<Path>>(&mut self, path: P) -> Result<&mut Self, GazetteerError> {
        let file = File::open(path)?;
        self.places(BufReader::new(file))
    }

    /// Reads GeoNames country-info records and keeps the country name and capital columns.
    pub fn countries<R: BufRead>(&mut self, reader: R) -> Result<&mut Self, GazetteerError> {
        for line in reader.lines() {
            let line = line?;
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 6 {
                continue;
            }
            self.add_location(fields[4]);
            self.add_location(fields[5]);
        }
        Ok(self)
    }

    pub fn countries_path<P: AsRef<Path>>(&mut self, path: P) -> Result<&mut Self, GazetteerError> {
        let file = File::open(path)?;
        self.countries(BufReader::new(file))
    }

    /// Finishes the gazetteer, expanding every full person name into its usable parts so that
    /// single-name mentions ("Nehammer") are covered as well. This trades precision for recall;
    /// the conflict resolver later prefers the longer full-name matches.
    pub fn build(mut self) -> Gazetteer {
        let mut parts: AHashSet<String> = AHashSet::new();
        for full in &self.persons {
            collect_name_parts(full, &mut parts);
        }
        self.persons.extend(parts);
        Gazetteer {
            persons: self.persons,
            locations: self.locations,
            organizations: self.organizations,
        }
    }
}

/// Splits a full name on commas and whitespace and keeps the parts that look like usable name
/// tokens: at least three characters, uppercase initial, not a German stop part.
fn collect_name_parts(full: &str, out: &mut AHashSet<String>) {
    for part in full.replace(',', " ").split_whitespace() {
        if part.chars().count() < 3 {
            continue;
        }
        if STOP_PARTS.contains(&part.to_lowercase().as_str()) {
            continue;
        }
        let Some(first) = part.chars().next() else {
            continue;
        };
        if !(first.is_alphabetic() && first.is_uppercase()) {
            continue;
        }
        out.insert(part.to_string());
    }
}

/// Failure to assemble a gazetteer from its sources. There is no partial fallback: callers retry
/// or substitute cached data externally.
#[derive(Debug)]
pub enum GazetteerError {
    Io(io::Error),
    Json(serde_json::Error),
}

impl Display for GazetteerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GazetteerError::Io(e) => write!(f, "could not read gazetteer source: {}", e),
            GazetteerError::Json(e) => write!(f, "could not parse roster table: {}", e),
        }
    }
}

impl Error for GazetteerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GazetteerError::Io(e) => Some(e),
            GazetteerError::Json(e) => Some(e),
        }
    }
}

impl From<io::Error> for GazetteerError {
    fn from(e: io::Error) -> Self {
        GazetteerError::Io(e)
    }
}

impl From<serde_json::Error> for GazetteerError {
    fn from(e: serde_json::Error) -> Self {
        GazetteerError::Json(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(json: &str) -> RosterTable {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn roster_columns_resolved_by_header_not_position() {
        let table = roster(
            r#"{
                "header": [
                    {"label": "irrelevant"},
                    {"label": "nachname"},
                    {"label": "vorname"},
                    {"feld_name": "PERSON_NAME", "label": "Name"}
                ],
                "rows": [[17, "Nehammer", "Karl", "Nehammer, Karl"]]
            }"#,
        );
        let mut builder = GazetteerBuilder::new();
        builder.person_roster(&table);
        let gazetteer = builder.build();
        assert!(gazetteer.persons().contains("Nehammer, Karl"));
        assert!(gazetteer.persons().contains("Karl"));
        assert!(gazetteer.persons().contains("Nehammer"));
        assert!(gazetteer.persons().contains("Karl Nehammer"));
    }

    #[test]
    fn roster_attribute_cell_contributes_citation_variants() {
        let table = roster(
            r#"{
                "header": [{"feld_name": "ATTR_JSON", "label": "Attribute"}],
                "rows": [
                    [{"zit": "Alexander Van der Bellen", "name_nvg": "Van der Bellen"}],
                    ["not an object"]
                ]
            }"#,
        );
        let mut builder = GazetteerBuilder::new();
        builder.person_roster(&table);
        let gazetteer = builder.build();
        assert!(gazetteer.persons().contains("Alexander Van der Bellen"));
        assert!(gazetteer.persons().contains("Van der Bellen"));
        // Derived parts: "der" is a stop part, "Van" and "Bellen" are kept.
        assert!(gazetteer.persons().contains("Van"));
        assert!(gazetteer.persons().contains("Bellen"));
        assert!(!gazetteer.persons().contains("der"));
    }

    #[test]
    fn name_parts_filter_short_lowercase_and_stop_tokens() {
        let mut parts = AHashSet::new();
        collect_name_parts("Dr. Wolfgang von und zu Schüssel", &mut parts);
        assert!(parts.contains("Wolfgang"));
        assert!(parts.contains("Schüssel"));
        assert!(parts.contains("Dr."));
        assert!(!parts.contains("von"));
        assert!(!parts.contains("und"));
        assert!(!parts.contains("zu"));
    }

    #[test]
    fn places_keep_populated_and_administrative_features_only() {
        let data = "\
2761369\tWien\tVienna\tVienne\t48.2\t16.37\tP\tPPLC\tAT\t\t9\t\t\t\t1900000\n\
2761367\tWien\tVienna\t\t48.2\t16.37\tA\tADM1\tAT\t\t9\t\t\t\t1900000\n\
2761333\tDonau\tDanube\t\t48.0\t16.0\tH\tSTM\tAT\t\t\t\t\t\t0\n\
# comment line\n\
short\tline\n";
        let mut builder = GazetteerBuilder::new();
        builder.places(data.as_bytes()).unwrap();
        let gazetteer = builder.build();
        assert!(gazetteer.locations().contains("Wien"));
        assert!(gazetteer.locations().contains("Vienna"));
        assert!(!gazetteer.locations().contains("Donau"));
    }

    #[test]
    fn countries_keep_name_and_capital() {
        let data = "\
#ISO\tISO3\tISO-Numeric\tfips\tCountry\tCapital\tArea\tPopulation\n\
AT\tAUT\t040\tAU\tÖsterreich\tWien\t83871\t8900000\n";
        let mut builder = GazetteerBuilder::new();
        builder.countries(data.as_bytes()).unwrap();
        let gazetteer = builder.build();
        assert!(gazetteer.locations().contains("Österreich"));
        assert!(gazetteer.locations().contains("Wien"));
    }

    #[test]
    fn curated_organizations_are_seeded() {
        let gazetteer = GazetteerBuilder::new().build();
        assert!(gazetteer.organizations().contains("ÖVP"));
        assert!(gazetteer.organizations().contains("Europäische Kommission"));
        assert!(gazetteer.persons().is_empty());
    }

    #[test]
    fn entries_cover_all_three_sets() {
        let table = roster(
            r#"{"header": [{"label": "Name"}], "rows": [["Werner Kogler"]]}"#,
        );
        let mut builder = GazetteerBuilder::new();
        builder.person_roster(&table);
        let gazetteer = builder.build();
        let persons = gazetteer
            .entries()
            .filter(|(_, label)| *label == Label::Person)
            .count();
        assert_eq!(persons, gazetteer.persons().len());
        assert_eq!(
            gazetteer.len(),
            gazetteer.persons().len()
                + gazetteer.locations().len()
                + gazetteer.organizations().len()
        );
    }
}
