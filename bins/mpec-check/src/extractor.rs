/// Result Extractor - projects a results document onto its objective values
///
/// The tool writes YAML with a top-level `Solution` sequence. Each element may
/// carry an `Objective` mapping of objective name to `{Value: <number>, ...}`.
/// Reference files share the same schema.
///
/// **Projection Rules:**
/// - Missing `Solution` key: zero solutions
/// - Solution without `Objective`: empty map
/// - `Objective: No values` (the tool's placeholder for empty sections): empty map
/// - Missing file or parse failure: error, never an empty result

use crate::error::CheckError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// One objective as recorded in a results document
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ObjectiveEntry {
    #[serde(rename = "Value")]
    pub value: f64,
    #[serde(flatten)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl ObjectiveEntry {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            metadata: BTreeMap::new(),
        }
    }
}

/// Objective name → entry, for one solution
pub type ObjectiveMap = BTreeMap<String, ObjectiveEntry>;

#[derive(Debug, Default, Deserialize)]
struct ResultDocument {
    #[serde(rename = "Solution", default)]
    solution: Option<Vec<SolutionRecord>>,
}

#[derive(Debug, Deserialize)]
struct SolutionRecord {
    #[serde(rename = "Objective", default)]
    objective: Option<ObjectiveSection>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ObjectiveSection {
    Entries(ObjectiveMap),
    Placeholder(String),
}

impl ResultDocument {
    fn into_objectives(self) -> Vec<ObjectiveMap> {
        self.solution
            .unwrap_or_default()
            .into_iter()
            .map(|record| match record.objective {
                Some(ObjectiveSection::Entries(entries)) => entries,
                Some(ObjectiveSection::Placeholder(_)) | None => ObjectiveMap::new(),
            })
            .collect()
    }
}

/// Whether results documents can be parsed in this build
pub fn yaml_available() -> bool {
    cfg!(feature = "yaml")
}

#[cfg(feature = "yaml")]
fn parse_document(text: &str) -> Result<ResultDocument, String> {
    serde_yaml::from_str(text).map_err(|e| e.to_string())
}

#[cfg(not(feature = "yaml"))]
fn parse_document(_text: &str) -> Result<ResultDocument, String> {
    Err("YAML is not available".to_string())
}

/// Parse document text into one objective map per solution, in document order
pub fn parse_objectives(text: &str) -> Result<Vec<ObjectiveMap>, String> {
    parse_document(text).map(ResultDocument::into_objectives)
}

/// Load a results or reference document from disk
pub fn load_objectives(path: &Path) -> Result<Vec<ObjectiveMap>, CheckError> {
    let text = fs::read_to_string(path).map_err(|e| CheckError::DocumentMissingOrUnparseable {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    parse_objectives(&text).map_err(|detail| CheckError::DocumentMissingOrUnparseable {
        path: path.to_path_buf(),
        detail,
    })
}
