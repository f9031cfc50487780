//! Resource/operation dispatch table
//!
//! Each (resource, operation) pair maps to one handler with a uniform
//! signature. Handlers decode their parameters, build requests through the
//! [`Context`], and shape the response into output records.

use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

use crate::credentials::ResolvedCredentials;
use crate::error::ApiError;
use crate::item::{BinaryData, Item, OutputItem};
use crate::params::Parameters;
use crate::transport::{HttpResponse, HttpTransport, Method, RequestSpec};

pub mod contact;
pub mod create_and_send;
pub mod document;
pub mod folder;
pub mod signature;
pub mod signature_field;
pub mod signer;

/// API resources exposed by the connector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Document,
    Signer,
    SignatureField,
    Signature,
    Folder,
    Contact,
}

impl Resource {
    pub const ALL: [Resource; 6] = [
        Resource::Document,
        Resource::Signer,
        Resource::SignatureField,
        Resource::Signature,
        Resource::Folder,
        Resource::Contact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Document => "document",
            Resource::Signer => "signer",
            Resource::SignatureField => "signatureField",
            Resource::Signature => "signature",
            Resource::Folder => "folder",
            Resource::Contact => "contact",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Resource {
    type Err = eyre::Error;

    fn from_str(s: &str) -> eyre::Result<Self> {
        Resource::ALL
            .iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s) || r.as_str().eq_ignore_ascii_case(&s.replace(['-', '_'], "")))
            .copied()
            .ok_or_else(|| {
                eyre::eyre!(
                    "Unknown resource: {}. Supported: {}",
                    s,
                    Resource::ALL.iter().map(|r| r.as_str()).collect::<Vec<_>>().join(", ")
                )
            })
    }
}

/// Everything a handler may touch while processing one item
pub struct Context<'a> {
    pub credentials: &'a ResolvedCredentials,
    pub transport: &'a dyn HttpTransport,
    pub item: &'a Item,
}

impl<'a> Context<'a> {
    pub fn new(credentials: &'a ResolvedCredentials, transport: &'a dyn HttpTransport, item: &'a Item) -> Self {
        Self {
            credentials,
            transport,
            item,
        }
    }

    /// Authenticated request against an API path
    pub fn request(&self, method: Method, path: &str) -> RequestSpec {
        let (name, value) = self.credentials.auth_header();
        RequestSpec::new(method, self.credentials.url(path)).header(name, value)
    }

    /// Send a request; non-2xx statuses become [`ApiError::Response`]
    pub fn send(&self, request: &RequestSpec) -> Result<HttpResponse, ApiError> {
        let response = self.transport.send(request)?;
        if response.is_success() {
            return Ok(response);
        }

        log::debug!("{} {} failed with status {}", request.method, request.url, response.status);
        let body = response.json().and_then(Result::ok);
        Err(ApiError::Response {
            status: response.status,
            body,
        })
    }

    /// Send a request and read the body as JSON (`Null` for an empty body)
    pub fn send_json(&self, request: RequestSpec) -> Result<Value, ApiError> {
        let response = self.send(&request)?;
        match response.json() {
            None => Ok(Value::Null),
            Some(Ok(value)) => Ok(value),
            Some(Err(_)) => Ok(Value::String(String::from_utf8_lossy(&response.body).into_owned())),
        }
    }

    /// Named attachment on the current item
    pub fn binary(&self, property: &str) -> Result<&'a BinaryData, ApiError> {
        self.item
            .binary
            .get(property)
            .ok_or_else(|| ApiError::Binary(format!("No binary data property '{}' exists on item", property)))
    }
}

pub type Handler = fn(&Parameters, &Context<'_>) -> Result<Vec<OutputItem>, ApiError>;

/// One row of the dispatch table
pub struct OperationDef {
    pub resource: Resource,
    pub operation: &'static str,
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
    pub handler: Handler,
}

impl fmt::Debug for OperationDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationDef")
            .field("resource", &self.resource)
            .field("operation", &self.operation)
            .field("method", &self.method)
            .field("path", &self.path)
            .finish()
    }
}

macro_rules! op {
    ($resource:ident, $operation:literal, $method:literal, $path:literal, $description:literal, $handler:path) => {
        OperationDef {
            resource: Resource::$resource,
            operation: $operation,
            method: $method,
            path: $path,
            description: $description,
            handler: $handler,
        }
    };
}

pub static OPERATIONS: &[OperationDef] = &[
    // document
    op!(Document, "create", "POST", "/v2/documents", "Create a document from a URL or binary file", document::create),
    op!(Document, "get", "GET", "/v2/documents/{id}", "Get a document", document::get),
    op!(Document, "getAll", "GET", "/v2/documents", "Get many documents", document::get_all),
    op!(Document, "send", "POST", "/v2/documents/{id}/send", "Send a document to signers", document::send),
    op!(Document, "download", "GET", "/v2/documents/{id}/download", "Download the signed PDF", document::download),
    op!(Document, "void", "POST", "/v2/documents/{id}/void", "Void a document", document::void),
    op!(Document, "delete", "DELETE", "/v2/documents/{id}", "Delete a document", document::delete),
    op!(Document, "update", "PATCH", "/v2/documents/{id}", "Update document name, description or folder", document::update),
    op!(Document, "getStats", "GET", "/v2/documents/stats", "Get document statistics", document::get_stats),
    op!(Document, "invite", "POST", "/v2/documents/{id}/invite", "Invite one participant", document::invite),
    op!(Document, "inviteBulk", "POST", "/v2/documents/{id}/invite-bulk", "Invite several participants", document::invite_bulk),
    op!(
        Document,
        "updateSignatureValidations",
        "PATCH",
        "/api/documents/{id}/signature-validations",
        "Configure required signature validations",
        document::update_signature_validations
    ),
    op!(
        Document,
        "updateSignatureState",
        "PATCH",
        "/api/documents/{id}/signature-state",
        "Force the signature workflow state",
        document::update_signature_state
    ),
    op!(
        Document,
        "createAndSend",
        "GET then POST",
        "/v2/documents/",
        "Upload a file and send it to participants in one step",
        create_and_send::create_and_send
    ),
    // signer
    op!(Signer, "add", "POST", "/api/documents/{id}/add-signer", "Add a signer to a document", signer::add),
    // signatureField
    op!(SignatureField, "add", "POST", "/api/documents/{id}/add-signature-field", "Add a signature field", signature_field::add),
    op!(
        SignatureField,
        "addMultiple",
        "POST",
        "/api/documents/{id}/add-signature-fields",
        "Add several signature fields",
        signature_field::add_multiple
    ),
    op!(
        SignatureField,
        "update",
        "PUT",
        "/api/documents/{id}/update-signature-field",
        "Move or resize a signature field",
        signature_field::update
    ),
    op!(
        SignatureField,
        "delete",
        "DELETE",
        "/api/documents/{id}/delete-signature-field",
        "Delete a signature field",
        signature_field::delete
    ),
    // signature
    op!(Signature, "delete", "DELETE", "/api/documents/{docId}/signature/{sigId}", "Delete a signature", signature::delete),
    // folder
    op!(Folder, "create", "POST", "/v2/folders", "Create a folder", folder::create),
    op!(Folder, "get", "GET", "/v2/folders/{id}", "Get a folder", folder::get),
    op!(Folder, "getAll", "GET", "/v2/folders", "List all folders", folder::get_all),
    op!(Folder, "update", "PATCH", "/v2/folders/{id}", "Rename or move a folder", folder::update),
    op!(Folder, "delete", "DELETE", "/v2/folders/{id}", "Delete a folder", folder::delete),
    op!(Folder, "getDocuments", "GET", "/v2/folders/{id}/documents", "Get documents in a folder", folder::get_documents),
    // contact
    op!(Contact, "create", "POST", "/v2/contacts", "Create a contact", contact::create),
    op!(Contact, "get", "GET", "/v2/contacts/{id}", "Get a contact", contact::get),
    op!(Contact, "getAll", "GET", "/v2/contacts", "List contacts", contact::get_all),
    op!(Contact, "update", "PATCH", "/v2/contacts/{id}", "Update a contact", contact::update),
    op!(Contact, "delete", "DELETE", "/v2/contacts/{id}", "Delete a contact", contact::delete),
    op!(Contact, "getDocuments", "GET", "/v2/contacts/{id}/documents", "Get documents for a contact", contact::get_documents),
];

static INDEX: Lazy<HashMap<(Resource, String), &'static OperationDef>> = Lazy::new(|| {
    OPERATIONS
        .iter()
        .map(|def| ((def.resource, def.operation.to_string()), def))
        .collect()
});

/// Find the handler for a (resource, operation) pair
pub fn lookup(resource: Resource, operation: &str) -> Result<&'static OperationDef, ApiError> {
    INDEX
        .get(&(resource, operation.to_string()))
        .copied()
        .ok_or_else(|| ApiError::UnknownOperation {
            resource: resource.to_string(),
            operation: operation.to_string(),
        })
}

/// Operations offered for one resource, in table order
pub fn operations_for(resource: Resource) -> impl Iterator<Item = &'static OperationDef> {
    OPERATIONS.iter().filter(move |def| def.resource == resource)
}

/// Wrap a response as a single record
pub fn single(value: Value) -> Vec<OutputItem> {
    vec![record(value)]
}

/// One record per element for array responses, otherwise one record
pub fn fan_out(value: Value) -> Vec<OutputItem> {
    match value {
        Value::Array(items) => items.into_iter().map(record).collect(),
        other => single(other),
    }
}

fn record(value: Value) -> OutputItem {
    match value {
        Value::Null => OutputItem::json(Value::Object(Map::new())),
        Value::String(text) => {
            let mut map = Map::new();
            map.insert("data".to_string(), Value::String(text));
            OutputItem::json(Value::Object(map))
        }
        other => OutputItem::json(other),
    }
}

/// Acknowledgement for deletes that return no body
pub fn deleted(id_key: &str, id: &str) -> Value {
    let mut map = Map::new();
    map.insert("success".to_string(), Value::Bool(true));
    map.insert(id_key.to_string(), Value::String(id.to_string()));
    Value::Object(map)
}

/// Serialize a collection and drop null and empty-string members
pub fn compact<T: serde::Serialize>(value: &T) -> Result<Map<String, Value>, ApiError> {
    match serde_json::to_value(value).map_err(|e| ApiError::Decode(e.to_string()))? {
        Value::Object(map) => Ok(map
            .into_iter()
            .filter(|(_, v)| !v.is_null() && v.as_str() != Some(""))
            .collect()),
        _ => Ok(Map::new()),
    }
}

/// Extract a file name from a `Content-Disposition` header
pub fn filename_from_disposition(header: &str) -> Option<String> {
    lazy_regex::regex_captures!(r#"filename="?([^";\n]+)"?"#, header)
        .map(|(_, name)| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::credentials::{Credentials, Endpoint};
    use crate::transport::testing::RecordingTransport;

    pub fn credentials() -> ResolvedCredentials {
        Credentials::new("allsign_live_sk_test123", Endpoint::Literal("https://api.allsign.io".to_string())).resolve()
    }

    pub fn run(
        resource: Resource,
        operation: &str,
        params: serde_json::Value,
        transport: &RecordingTransport,
    ) -> Result<Vec<OutputItem>, ApiError> {
        run_with_item(resource, operation, params, transport, &Item::default())
    }

    pub fn run_with_item(
        resource: Resource,
        operation: &str,
        params: serde_json::Value,
        transport: &RecordingTransport,
        item: &Item,
    ) -> Result<Vec<OutputItem>, ApiError> {
        let creds = credentials();
        let ctx = Context::new(&creds, transport, item);
        let params = Parameters::from_value(params)?;
        (lookup(resource, operation)?.handler)(&params, &ctx)
    }
}
