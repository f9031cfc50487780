//! Input items and output records

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Named file content travelling with an item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinaryData {
    pub data: Vec<u8>,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

impl BinaryData {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            file_name: None,
            mime_type: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// One input unit
#[derive(Debug, Clone, Default)]
pub struct Item {
    pub json: Value,
    pub binary: IndexMap<String, BinaryData>,
}

impl Item {
    pub fn new(json: Value) -> Self {
        Self {
            json,
            binary: IndexMap::new(),
        }
    }

    pub fn with_binary(mut self, property: impl Into<String>, data: BinaryData) -> Self {
        self.binary.insert(property.into(), data);
        self
    }
}

/// One output record: JSON plus an optional named attachment
#[derive(Debug, Clone, PartialEq)]
pub struct OutputItem {
    pub json: Value,
    pub binary: Option<(String, BinaryData)>,
}

impl OutputItem {
    pub fn json(json: Value) -> Self {
        Self { json, binary: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert("error".to_string(), Value::String(message.into()));
        Self::json(Value::Object(map))
    }

    pub fn with_binary(mut self, property: impl Into<String>, data: BinaryData) -> Self {
        self.binary = Some((property.into(), data));
        self
    }

    pub fn is_error(&self) -> bool {
        self.binary.is_none() && self.json.as_object().is_some_and(|m| m.len() == 1 && m.contains_key("error"))
    }
}

/// Serializable summary of an output record, used for printing
#[derive(Debug, Serialize, Deserialize)]
pub struct OutputSummary {
    pub json: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary: Option<BinarySummary>,
    /// Set when the record stands in for a failed item
    #[serde(skip)]
    pub failed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BinarySummary {
    pub property: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl OutputItem {
    pub fn summary(&self, written_to: Option<String>) -> OutputSummary {
        OutputSummary {
            json: self.json.clone(),
            binary: self.binary.as_ref().map(|(property, data)| BinarySummary {
                property: property.clone(),
                file_name: data.file_name.clone(),
                mime_type: data.mime_type.clone(),
                size: data.data.len(),
                path: written_to,
            }),
            failed: self.is_error(),
        }
    }
}
