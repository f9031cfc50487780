//! Signer resource

use serde_json::json;

use super::{Context, single};
use crate::error::ApiError;
use crate::item::OutputItem;
use crate::params::Parameters;
use crate::transport::Method;

pub fn add(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let id = params.required_string("documentId")?;
    let body = json!({
        "signerEmail": params.required_string("signerEmail")?,
        "invitedByEmail": params.string_or("invitedByEmail", "")?,
    });

    let response = ctx.send_json(
        ctx.request(Method::Post, &format!("/api/documents/{}/add-signer", id))
            .json(body),
    )?;
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
    fn test_add_signer() {
        let transport = RecordingTransport::new();
        transport.push_json(200, json!({"signerId": "s-1"}));

        let records = run(
            Resource::Signer,
            "add",
            json!({"documentId": "doc-1", "signerEmail": "ana@test.com", "invitedByEmail": "owner@test.com"}),
            &transport,
        )
        .unwrap();

        let request = transport.request(0);
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url, "https://api.allsign.io/api/documents/doc-1/add-signer");
        assert_eq!(
            request.body.unwrap(),
            json!({"signerEmail": "ana@test.com", "invitedByEmail": "owner@test.com"})
        );
        assert_eq!(records[0].json["signerId"], "s-1");
    }

    #[test]
    fn test_add_signer_requires_email() {
        let transport = RecordingTransport::new();
        let err = run(Resource::Signer, "add", json!({"documentId": "doc-1"}), &transport).unwrap_err();
        assert_eq!(err.to_string(), "Missing required parameter 'signerEmail'");
        assert_eq!(transport.count(), 0);
    }
}
