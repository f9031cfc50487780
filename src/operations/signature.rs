//! Signature resource

use super::{Context, deleted, single};
use crate::error::ApiError;
use crate::item::OutputItem;
use crate::params::Parameters;
use crate::transport::Method;

pub fn delete(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let document_id = params.required_string("documentId")?;
    let signature_id = params.required_string("signatureId")?;

    let response = ctx.send_json(ctx.request(
        Method::Delete,
        &format!("/api/documents/{}/signature/{}", document_id, signature_id),
    ))?;
    if response.is_null() {
        return Ok(single(deleted("signatureId", &signature_id)));
    }
    Ok(single(response))
}

#[cfg(test)]
mod tests {
    use super::super::Resource;
    use super::super::test_support::*;
    use crate::transport::Method;
    use crate::transport::testing::RecordingTransport;
    use serde_json::json;

    #[test]
    fn test_delete_signature_path() {
        let transport = RecordingTransport::new();
        transport.push_json(200, json!({"deleted": true}));

        let records = run(
            Resource::Signature,
            "delete",
            json!({"documentId": "doc-1", "signatureId": "sig-2"}),
            &transport,
        )
        .unwrap();

        let request = transport.request(0);
        assert_eq!(request.method, Method::Delete);
        assert_eq!(request.url, "https://api.allsign.io/api/documents/doc-1/signature/sig-2");
        assert!(request.body.is_none());
        assert_eq!(records[0].json, json!({"deleted": true}));
    }

    #[test]
    fn test_delete_signature_empty_body() {
        let transport = RecordingTransport::new();
        transport.push_empty(204);

        let records = run(
            Resource::Signature,
            "delete",
            json!({"documentId": "doc-1", "signatureId": "sig-2"}),
            &transport,
        )
        .unwrap();

        assert_eq!(records[0].json, json!({"success": true, "signatureId": "sig-2"}));
    }
}
