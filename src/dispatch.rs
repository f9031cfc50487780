//! Item-by-item execution of one operation
//!
//! Items are processed strictly in order; each item's requests finish before
//! the next item starts. A failing item either aborts the run or, with
//! continue-on-fail, becomes an `{error}` record.

use crate::credentials::ResolvedCredentials;
use crate::error::{ApiError, OperationError};
use crate::item::{Item, OutputItem};
use crate::operations::{self, Context, OperationDef, Resource};
use crate::params::ParameterSet;
use crate::transport::HttpTransport;

pub struct Dispatcher<'a> {
    credentials: ResolvedCredentials,
    transport: &'a dyn HttpTransport,
    continue_on_fail: bool,
}

impl<'a> Dispatcher<'a> {
    pub fn new(credentials: ResolvedCredentials, transport: &'a dyn HttpTransport) -> Self {
        Self {
            credentials,
            transport,
            continue_on_fail: false,
        }
    }

    pub fn continue_on_fail(mut self, enabled: bool) -> Self {
        self.continue_on_fail = enabled;
        self
    }

    /// Run `operation` on `resource` for every item
    pub fn execute(
        &self,
        resource: Resource,
        operation: &str,
        params: &ParameterSet,
        items: &[Item],
    ) -> Result<Vec<OutputItem>, OperationError> {
        let def = operations::lookup(resource, operation).map_err(|e| OperationError::from_api(&e, 0))?;
        log::info!("Running {}/{} on {} item(s)", resource, def.operation, items.len());

        let mut output = Vec::new();
        for (index, item) in items.iter().enumerate() {
            match self.execute_item(def, params, item, index) {
                Ok(records) => output.extend(records),
                Err(err) if self.continue_on_fail => {
                    let message = err.best_message();
                    log::warn!("Item {} failed, continuing: {}", index, message);
                    output.push(OutputItem::error(message));
                }
                Err(err) => {
                    let failure = OperationError::from_api(&err, index);
                    log::error!("Item {} failed: {} ({})", index, failure.message, failure.description);
                    return Err(failure);
                }
            }
        }

        Ok(output)
    }

    fn execute_item(
        &self,
        def: &OperationDef,
        params: &ParameterSet,
        item: &Item,
        index: usize,
    ) -> Result<Vec<OutputItem>, ApiError> {
        let ctx = Context::new(&self.credentials, self.transport, item);
        let records = (def.handler)(&params.for_item(index), &ctx)?;
        log::debug!("Item {} produced {} record(s)", index, records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{Credentials, Endpoint};
    use crate::params::Parameters;
    use crate::transport::Method;
    use crate::transport::testing::RecordingTransport;
    use serde_json::{Value, json};

    fn dispatcher(transport: &RecordingTransport) -> Dispatcher<'_> {
        let creds = Credentials::new("allsign_live_sk_test123", Endpoint::default()).resolve();
        Dispatcher::new(creds, transport)
    }

    fn shared(value: Value) -> ParameterSet {
        ParameterSet::new(Parameters::from_value(value).unwrap())
    }

    fn items(n: usize) -> Vec<Item> {
        (0..n).map(|_| Item::default()).collect()
    }

    #[test]
    fn test_items_processed_in_order() {
        let transport = RecordingTransport::new();
        transport.push_json(200, json!({"id": "doc-a"}));
        transport.push_json(200, json!({"id": "doc-b"}));

        let mut params = shared(json!({}));
        params.per_item.push(Parameters::new().with("documentId", "doc-a"));
        params.per_item.push(Parameters::new().with("documentId", "doc-b"));

        let output = dispatcher(&transport)
            .execute(Resource::Document, "get", &params, &items(2))
            .unwrap();

        assert_eq!(transport.request(0).url, "https://api.allsign.io/v2/documents/doc-a");
        assert_eq!(transport.request(1).url, "https://api.allsign.io/v2/documents/doc-b");
        assert_eq!(output[0].json["id"], "doc-a");
        assert_eq!(output[1].json["id"], "doc-b");
    }

    #[test]
    fn test_fan_out_per_item() {
        let transport = RecordingTransport::new();
        transport.push_json(200, json!([{"id": 1}, {"id": 2}]));
        transport.push_json(200, json!({"documents": []}));

        let output = dispatcher(&transport)
            .execute(Resource::Document, "getAll", &shared(json!({"limit": 2})), &items(2))
            .unwrap();

        assert_eq!(output.len(), 3);
        assert_eq!(output[2].json, json!({"documents": []}));
    }

    #[test]
    fn test_abort_uses_body_message() {
        let transport = RecordingTransport::new();
        transport.push_json(200, json!({"id": "ok"}));
        transport.push_json(404, json!({"message": "Document not found", "error": "NotFound"}));

        let err = dispatcher(&transport)
            .execute(Resource::Document, "get", &shared(json!({"documentId": "doc-1"})), &items(3))
            .unwrap_err();

        assert_eq!(err.to_string(), "AllSign API Error: Document not found");
        assert_eq!(err.description, "HTTP Status Code: 404");
        assert_eq!(err.item_index, 1);
        assert_eq!(transport.count(), 2);
    }

    #[test]
    fn test_abort_falls_back_to_error_field() {
        let transport = RecordingTransport::new();
        transport.push_json(401, json!({"error": "Invalid API key"}));

        let err = dispatcher(&transport)
            .execute(Resource::Document, "getStats", &shared(json!({})), &items(1))
            .unwrap_err();

        assert_eq!(err.to_string(), "AllSign API Error: Invalid API key");
    }

    #[test]
    fn test_abort_on_transport_failure() {
        let transport = RecordingTransport::new();
        transport.push_network_error("Connection refused");

        let err = dispatcher(&transport)
            .execute(Resource::Folder, "getAll", &shared(json!({})), &items(1))
            .unwrap_err();

        assert_eq!(err.to_string(), "AllSign API Error: Connection refused");
        assert_eq!(err.description, "HTTP Status Code: N/A");
        assert_eq!(err.status, None);
    }

    #[test]
    fn test_continue_on_fail_emits_error_record() {
        let transport = RecordingTransport::new();
        transport.push_network_error("Connection refused");
        transport.push_json(200, json!({"id": "doc-2"}));

        let output = dispatcher(&transport)
            .continue_on_fail(true)
            .execute(Resource::Document, "get", &shared(json!({"documentId": "doc-x"})), &items(2))
            .unwrap();

        assert_eq!(output.len(), 2);
        assert_eq!(output[0].json, json!({"error": "Connection refused"}));
        assert!(output[0].is_error());
        assert_eq!(output[1].json["id"], "doc-2");
    }

    #[test]
    fn test_continue_on_fail_parameter_error() {
        let transport = RecordingTransport::new();

        let output = dispatcher(&transport)
            .continue_on_fail(true)
            .execute(Resource::Contact, "get", &shared(json!({})), &items(1))
            .unwrap();

        assert_eq!(output[0].json, json!({"error": "Missing required parameter 'contactId'"}));
        assert_eq!(transport.count(), 0);
    }

    #[test]
    fn test_unknown_operation_aborts_before_requests() {
        let transport = RecordingTransport::new();

        let err = dispatcher(&transport)
            .continue_on_fail(true)
            .execute(Resource::Folder, "archive", &shared(json!({})), &items(1))
            .unwrap_err();

        assert_eq!(err.to_string(), "AllSign API Error: Unknown operation 'archive' for resource 'folder'");
        assert_eq!(transport.count(), 0);
    }

    #[test]
    fn test_no_items_no_requests() {
        let transport = RecordingTransport::new();
        let output = dispatcher(&transport)
            .execute(Resource::Document, "getStats", &shared(json!({})), &[])
            .unwrap();
        assert!(output.is_empty());
        assert_eq!(transport.count(), 0);
    }

    #[test]
    fn test_create_via_url_scenario() {
        let transport = RecordingTransport::new();
        transport.push_json(200, json!({"document_id": "doc-123"}));

        let params = shared(json!({
            "documentName": "Test Contract",
            "fileSource": "url",
            "fileUrl": "https://example.com/doc.pdf",
            "templateId": "tpl-1"
        }));
        let output = dispatcher(&transport)
            .execute(Resource::Document, "create", &params, &items(1))
            .unwrap();

        let request = transport.request(0);
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url, "https://api.allsign.io/v2/documents");
        assert_eq!(
            request.body.unwrap(),
            json!({"name": "Test Contract", "file_url": "https://example.com/doc.pdf", "template_id": "tpl-1"})
        );
        assert_eq!(output, vec![OutputItem::json(json!({"document_id": "doc-123"}))]);
    }
}
