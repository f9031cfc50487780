//! Contact resource

use serde_json::{Map, Value};

use super::{Context, compact, deleted, fan_out, single};
use crate::error::ApiError;
use crate::item::OutputItem;
use crate::params::{ContactDetails, ContactUpdate, Parameters};
use crate::transport::Method;

const DEFAULT_LIMIT: u64 = 50;

pub fn create(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let details: ContactDetails = params.object("contactAdditionalFields")?;

    let mut body = Map::new();
    body.insert("email".into(), Value::String(params.required_string("contactEmail")?));
    body.insert("name".into(), Value::String(params.string_or("contactName", "")?));
    body.extend(compact(&details)?);

    let response = ctx.send_json(ctx.request(Method::Post, "/v2/contacts").json(Value::Object(body)))?;
    Ok(single(response))
}

pub fn get(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let id = params.required_string("contactId")?;
    let response = ctx.send_json(ctx.request(Method::Get, &format!("/v2/contacts/{}", id)))?;
    Ok(single(response))
}

pub fn get_all(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let limit = params.u64_or("contactLimit", DEFAULT_LIMIT)?;
    let response = ctx.send_json(ctx.request(Method::Get, "/v2/contacts").query("limit", limit))?;
    Ok(fan_out(response))
}

pub fn update(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let id = params.required_string("contactId")?;
    let changes: ContactUpdate = params.object("contactUpdateFields")?;

    let response = ctx.send_json(
        ctx.request(Method::Patch, &format!("/v2/contacts/{}", id))
            .json(Value::Object(compact(&changes)?)),
    )?;
    Ok(single(response))
}

pub fn delete(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let id = params.required_string("contactId")?;
    ctx.send_json(ctx.request(Method::Delete, &format!("/v2/contacts/{}", id)))?;
    Ok(single(deleted("contactId", &id)))
}

pub fn get_documents(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let id = params.required_string("contactId")?;
    let limit = params.u64_or("contactLimit", DEFAULT_LIMIT)?;

    let response = ctx.send_json(
        ctx.request(Method::Get, &format!("/v2/contacts/{}/documents", id))
            .query("limit", limit),
    )?;
    Ok(fan_out(response))
}

#[cfg(test)]
mod tests {
    use super::super::Resource;
    use super::super::test_support::*;
    use crate::transport::Method;
    use crate::transport::testing::RecordingTransport;
    use serde_json::json;

    #[test]
    fn test_create_merges_details() {
        let transport = RecordingTransport::new();
        transport.push_json(201, json!({"id": "c-1"}));

        let records = run(
            Resource::Contact,
            "create",
            json!({
                "contactEmail": "ana@test.com",
                "contactName": "Ana",
                "contactAdditionalFields": {"company": "Acme", "phone": ""}
            }),
            &transport,
        )
        .unwrap();

        let request = transport.request(0);
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url, "https://api.allsign.io/v2/contacts");
        assert_eq!(
            request.body.unwrap(),
            json!({"email": "ana@test.com", "name": "Ana", "company": "Acme"})
        );
        assert_eq!(records[0].json["id"], "c-1");
    }

    #[test]
    fn test_get_all_default_limit() {
        let transport = RecordingTransport::new();
        transport.push_json(200, json!([{"id": "c-1"}, {"id": "c-2"}, {"id": "c-3"}]));

        let records = run(Resource::Contact, "getAll", json!({}), &transport).unwrap();

        assert_eq!(transport.request(0).query, vec![("limit".to_string(), "50".to_string())]);
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].json["id"], "c-3");
    }

    #[test]
    fn test_update_and_get() {
        let transport = RecordingTransport::new();
        run(
            Resource::Contact,
            "update",
            json!({"contactId": "c-1", "contactUpdateFields": {"phone": "+52 55 0000", "email": ""}}),
            &transport,
        )
        .unwrap();
        run(Resource::Contact, "get", json!({"contactId": "c-1"}), &transport).unwrap();

        assert_eq!(transport.request(0).method, Method::Patch);
        assert_eq!(transport.request(0).body.unwrap(), json!({"phone": "+52 55 0000"}));
        assert_eq!(transport.request(1).url, "https://api.allsign.io/v2/contacts/c-1");
    }

    #[test]
    fn test_delete_acknowledgement() {
        let transport = RecordingTransport::new();
        let records = run(Resource::Contact, "delete", json!({"contactId": "c-1"}), &transport).unwrap();
        assert_eq!(records[0].json, json!({"success": true, "contactId": "c-1"}));
    }

    #[test]
    fn test_get_documents_uses_contact_limit() {
        let transport = RecordingTransport::new();
        run(
            Resource::Contact,
            "getDocuments",
            json!({"contactId": "c-1", "contactLimit": "20"}),
            &transport,
        )
        .unwrap();

        let request = transport.request(0);
        assert_eq!(request.url, "https://api.allsign.io/v2/contacts/c-1/documents");
        assert_eq!(request.query, vec![("limit".to_string(), "20".to_string())]);
    }
}
