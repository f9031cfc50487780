//! Signature field resource

use serde_json::{Map, Value, json};

use super::{Context, compact, single};
use crate::error::ApiError;
use crate::item::OutputItem;
use crate::params::{Parameters, SignatureField, SignatureFieldOptions, SignatureFieldUpdate};
use crate::transport::Method;

pub fn add(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let id = params.required_string("documentId")?;
    let options: SignatureFieldOptions = params.object("sfAdditionalFields")?;

    let mut body = Map::new();
    body.insert("signerEmail".into(), Value::String(params.required_string("sfSignerEmail")?));
    body.insert("pageNumber".into(), json!(params.u64_or("sfPageNumber", 1)?));
    body.extend(compact(&options)?);

    let response = ctx.send_json(
        ctx.request(Method::Post, &format!("/api/documents/{}/add-signature-field", id))
            .json(Value::Object(body)),
    )?;
    Ok(single(response))
}

pub fn add_multiple(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let id = params.required_string("documentId")?;
    let fields: Vec<SignatureField> = params.list("sfFields")?;

    let response = ctx.send_json(
        ctx.request(Method::Post, &format!("/api/documents/{}/add-signature-fields", id))
            .json(json!({ "fields": fields })),
    )?;
    Ok(single(response))
}

pub fn update(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let id = params.required_string("documentId")?;
    let changes: SignatureFieldUpdate = params.object("sfUpdateFields")?;

    let mut body = Map::new();
    body.insert("fieldId".into(), Value::String(params.required_string("sfFieldId")?));
    body.insert("signerEmail".into(), Value::String(params.string_or("sfUpdateSignerEmail", "")?));
    body.extend(compact(&changes)?);

    let response = ctx.send_json(
        ctx.request(Method::Put, &format!("/api/documents/{}/update-signature-field", id))
            .json(Value::Object(body)),
    )?;
    Ok(single(response))
}

pub fn delete(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let id = params.required_string("documentId")?;
    let body = json!({
        "fieldId": params.required_string("sfDeleteFieldId")?,
        "signerEmail": params.string_or("sfDeleteSignerEmail", "")?,
        "deleteLinkedFields": params.bool_or("deleteLinkedFields", false)?,
    });

    let response = ctx.send_json(
        ctx.request(Method::Delete, &format!("/api/documents/{}/delete-signature-field", id))
            .json(body),
    )?;
    Ok(single(response))
}
