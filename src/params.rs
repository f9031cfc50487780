//! Operation parameters
//!
//! The host hands over a loosely-typed bag of named values. Handlers pull
//! what they need through the typed accessors here, so malformed input is
//! rejected before a request is built.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::error::ApiError;

/// Parameter values for one item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    values: IndexMap<String, Value>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        match value {
            Value::Object(map) => Ok(Self {
                values: map.into_iter().collect(),
            }),
            Value::Null => Ok(Self::default()),
            other => Err(ApiError::parameter("parameters", format!("expected an object, got {}", other))),
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value.into());
        self
    }

    /// Decode a parameter; absent or null yields `None`
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ApiError> {
        match self.values.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| ApiError::parameter(name, e)),
        }
    }

    /// String parameter, with numbers and booleans taken as their text
    pub fn string_or(&self, name: &str, default: &str) -> Result<String, ApiError> {
        match self.values.get(name) {
            None | Some(Value::Null) => Ok(default.to_string()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(Value::Bool(b)) => Ok(b.to_string()),
            Some(other) => Err(ApiError::parameter(name, format!("expected a string, got {}", other))),
        }
    }

    /// Optional string parameter; empty strings count as absent
    pub fn optional_string(&self, name: &str) -> Result<Option<String>, ApiError> {
        let value = self.string_or(name, "")?;
        Ok(if value.is_empty() { None } else { Some(value) })
    }

    /// Non-empty string parameter
    pub fn required_string(&self, name: &str) -> Result<String, ApiError> {
        self.optional_string(name)?
            .ok_or_else(|| ApiError::MissingParameter(name.to_string()))
    }

    pub fn bool_or(&self, name: &str, default: bool) -> Result<bool, ApiError> {
        match self.values.get(name) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::String(s)) => match s.to_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(ApiError::parameter(name, format!("expected a boolean, got \"{}\"", s))),
            },
            Some(other) => Err(ApiError::parameter(name, format!("expected a boolean, got {}", other))),
        }
    }

    pub fn u64_or(&self, name: &str, default: u64) -> Result<u64, ApiError> {
        match self.values.get(name) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::String(s)) => s
                .trim()
                .parse()
                .map_err(|_| ApiError::parameter(name, format!("expected a positive number, got \"{}\"", s))),
            Some(value) => value
                .as_u64()
                .ok_or_else(|| ApiError::parameter(name, format!("expected a positive number, got {}", value))),
        }
    }

    /// List parameter; absent yields an empty list
    pub fn list<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>, ApiError> {
        Ok(self.get(name)?.unwrap_or_default())
    }

    /// Collection parameter; absent yields the default
    pub fn object<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T, ApiError> {
        Ok(self.get(name)?.unwrap_or_default())
    }

    /// Layer `overrides` on top of these values
    pub fn merged(&self, overrides: &Parameters) -> Parameters {
        let mut values = self.values.clone();
        for (name, value) in &overrides.values {
            values.insert(name.clone(), value.clone());
        }
        Parameters { values }
    }
}

/// Shared parameters plus optional per-item overrides
#[derive(Debug, Clone, Default)]
pub struct ParameterSet {
    pub shared: Parameters,
    pub per_item: Vec<Parameters>,
}

impl ParameterSet {
    pub fn new(shared: Parameters) -> Self {
        Self {
            shared,
            per_item: Vec::new(),
        }
    }

    /// Effective parameters for the item at `index`
    pub fn for_item(&self, index: usize) -> Parameters {
        match self.per_item.get(index) {
            Some(overrides) => self.shared.merged(overrides),
            None => self.shared.clone(),
        }
    }
}

/// Where a document's file comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileSource {
    Url,
    #[default]
    Binary,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Signer {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Participant {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureField {
    pub signer_email: String,
    #[serde(default = "first_page")]
    pub page_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Number>,
}

fn first_page() -> u32 {
    1
}

/// Optional placement settings for a single signature field
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureFieldOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_in_all_pages: Option<bool>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureFieldUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_in_all_pages: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Outer `None` leaves the folder alone; `null` or `""` moves the
    /// document out of its folder
    #[serde(default, deserialize_with = "present")]
    pub folder_id: Option<Option<String>>,
}

/// Distinguish an explicit `null` from an absent key
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_folder_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContactDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContactUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

/// Workflow state a document's signature process can be forced into
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignatureStatus {
    SellosPdf,
    #[default]
    RecolectandoFirmantes,
    EsperandoFirmas,
    GenerandoPdf,
    TodosFirmaron,
}
