// 3rd party imports
use serde::{Deserialize, Serialize};

/// Wrapped string value as used throughout UniProt's JSON
///
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Value {
    pub value: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Name {
    pub full_name: Value,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProteinDescription {
    #[serde(default)]
    pub recommended_name: Option<Name>,
    #[serde(default)]
    pub submission_names: Vec<Name>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct RecordSequence {
    pub value: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub comment_type: String,
    #[serde(default)]
    pub texts: Vec<Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Keyword {
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Property {
    pub key: String,
    pub value: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct CrossReference {
    pub database: String,
    pub id: String,
    #[serde(default)]
    pub properties: Vec<Property>,
}

/// Position of a feature, unknown positions have no value
///
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Position {
    #[serde(default)]
    pub value: Option<usize>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Location {
    pub start: Position,
    pub end: Position,
}

/// Sequence feature, e.g. signal peptide or cleavage site
///
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Feature {
    #[serde(rename = "type")]
    pub feature_type: String,
    pub location: Location,
    #[serde(default)]
    pub description: String,
}

impl Feature {
    /// 1-based start, `None` if unknown
    ///
    pub fn start(&self) -> Option<usize> {
        self.location.start.value
    }

    /// 1-based inclusive end, `None` if unknown
    ///
    pub fn end(&self) -> Option<usize> {
        self.location.end.value
    }
}

/// Protein record as delivered by the UniProtKB REST API in JSON format.
/// Only the fields needed for the annotation are deserialized.
///
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProteinRecord {
    pub primary_accession: String,
    #[serde(default)]
    pub protein_description: Option<ProteinDescription>,
    #[serde(default)]
    pub sequence: Option<RecordSequence>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub keywords: Vec<Keyword>,
    #[serde(default, rename = "uniProtKBCrossReferences")]
    pub cross_references: Vec<CrossReference>,
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl ProteinRecord {
    /// Creates a minimal record
    ///
    /// # Arguments
    /// * `accession` - Primary accession
    /// * `name` - Recommended protein name
    /// * `sequence` - Protein sequence
    ///
    pub fn new(accession: &str, name: &str, sequence: &str) -> Self {
        Self {
            primary_accession: accession.to_string(),
            protein_description: Some(ProteinDescription {
                recommended_name: Some(Name {
                    full_name: Value {
                        value: name.to_string(),
                    },
                }),
                submission_names: Vec::new(),
            }),
            sequence: Some(RecordSequence {
                value: sequence.to_string(),
            }),
            ..Default::default()
        }
    }

    /// Adds a feature
    ///
    /// # Arguments
    /// * `feature_type` - Feature type, e.g. `Signal`
    /// * `start` - 1-based start
    /// * `end` - 1-based inclusive end
    /// * `description` - Description, e.g. `Cleavage; by thrombin`
    ///
    pub fn with_feature(mut self, feature_type: &str, start: usize, end: usize, description: &str) -> Self {
        self.features.push(Feature {
            feature_type: feature_type.to_string(),
            location: Location {
                start: Position { value: Some(start) },
                end: Position { value: Some(end) },
            },
            description: description.to_string(),
        });
        self
    }

    /// Recommended name, else the first submitted name
    ///
    pub fn name(&self) -> Option<&str> {
        let description = self.protein_description.as_ref()?;
        description
            .recommended_name
            .as_ref()
            .or_else(|| description.submission_names.first())
            .map(|name| name.full_name.value.as_str())
    }

    pub fn sequence(&self) -> Option<&str> {
        self.sequence.as_ref().map(|sequence| sequence.value.as_str())
    }

    /// Texts of the function comments
    ///
    pub fn function_texts(&self) -> Vec<&str> {
        self.comments
            .iter()
            .filter(|comment| comment.comment_type == "FUNCTION")
            .flat_map(|comment| comment.texts.iter().map(|text| text.value.as_str()))
            .collect()
    }

    pub fn keyword_names(&self) -> Vec<&str> {
        self.keywords
            .iter()
            .map(|keyword| keyword.name.as_str())
            .collect()
    }

    /// GO identifiers with their term, e.g. (`GO:0005737`, `C:cytoplasm`)
    ///
    pub fn go_terms(&self) -> Vec<(&str, &str)> {
        self.cross_references
            .iter()
            .filter(|reference| reference.database == "GO")
            .map(|reference| {
                let term = reference
                    .properties
                    .iter()
                    .find(|property| property.key == "GoTerm")
                    .map(|property| property.value.as_str())
                    .unwrap_or_default();
                (reference.id.as_str(), term)
            })
            .collect()
    }

    /// Features of the given type
    ///
    /// # Arguments
    /// * `feature_type` - Feature type, e.g. `Signal`
    ///
    pub fn features_of_type<'a>(&'a self, feature_type: &'a str) -> impl Iterator<Item = &'a Feature> {
        self.features
            .iter()
            .filter(move |feature| feature.feature_type == feature_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD_JSON: &str = r#"{
        "primaryAccession": "P12345",
        "proteinDescription": {
            "submissionNames": [{"fullName": {"value": "Uncharacterized protein"}}]
        },
        "sequence": {"value": "MKTAYIAKQR", "length": 10},
        "comments": [
            {"commentType": "FUNCTION", "texts": [{"value": "Does things."}]},
            {"commentType": "SUBCELLULAR LOCATION", "subcellularLocations": []}
        ],
        "keywords": [{"id": "KW-0732", "name": "Signal"}],
        "uniProtKBCrossReferences": [
            {"database": "GO", "id": "GO:0005737", "properties": [{"key": "GoTerm", "value": "C:cytoplasm"}]},
            {"database": "PDB", "id": "1ABC"}
        ],
        "features": [
            {"type": "Signal", "location": {"start": {"value": 1, "modifier": "EXACT"}, "end": {"value": 3, "modifier": "EXACT"}}, "description": ""},
            {"type": "Chain", "location": {"start": {"value": 4}, "end": {"value": null, "modifier": "UNKNOWN"}}}
        ]
    }"#;

    #[test]
    fn test_deserialize() {
        let record: ProteinRecord = serde_json::from_str(RECORD_JSON).unwrap();
        assert_eq!(record.primary_accession, "P12345");
        assert_eq!(record.name(), Some("Uncharacterized protein"));
        assert_eq!(record.sequence(), Some("MKTAYIAKQR"));
        assert_eq!(record.function_texts(), vec!["Does things."]);
        assert_eq!(record.keyword_names(), vec!["Signal"]);
        assert_eq!(record.go_terms(), vec![("GO:0005737", "C:cytoplasm")]);
        let chain = record.features_of_type("Chain").next().unwrap();
        assert_eq!(chain.start(), Some(4));
        assert_eq!(chain.end(), None);
    }
}
