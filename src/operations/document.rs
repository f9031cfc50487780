//! Document resource

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value, json};

use super::{Context, deleted, fan_out, filename_from_disposition, single};
use crate::error::ApiError;
use crate::item::{BinaryData, OutputItem};
use crate::params::{DocumentUpdate, FileSource, Parameters, Participant, SignatureStatus, Signer};
use crate::transport::Method;

const DEFAULT_LIMIT: u64 = 50;

pub fn create(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let name = params.string_or("documentName", "")?;
    let source: FileSource = params.object("fileSource")?;
    let template_id = params.optional_string("templateId")?;

    let mut body = Map::new();
    body.insert("name".into(), Value::String(name));

    match source {
        FileSource::Url => {
            body.insert("file_url".into(), Value::String(params.string_or("fileUrl", "")?));
        }
        FileSource::Binary => {
            let property = params.string_or("binaryProperty", "data")?;
            let binary = ctx.binary(&property)?;
            body.insert("file_data".into(), Value::String(STANDARD.encode(&binary.data)));
            body.insert(
                "file_name".into(),
                Value::String(
                    binary
                        .file_name
                        .clone()
                        .filter(|n| !n.is_empty())
                        .unwrap_or_else(|| "document.pdf".to_string()),
                ),
            );
        }
    }

    if let Some(template_id) = template_id {
        body.insert("template_id".into(), Value::String(template_id));
    }

    let response = ctx.send_json(ctx.request(Method::Post, "/v2/documents").json(Value::Object(body)))?;
    Ok(single(response))
}

pub fn get(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let id = params.required_string("documentId")?;
    let response = ctx.send_json(ctx.request(Method::Get, &format!("/v2/documents/{}", id)))?;
    Ok(single(response))
}

pub fn get_all(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let limit = params.u64_or("limit", DEFAULT_LIMIT)?;
    let response = ctx.send_json(ctx.request(Method::Get, "/v2/documents").query("limit", limit))?;
    Ok(fan_out(response))
}

pub fn send(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let id = params.required_string("documentId")?;
    let signers: Vec<Signer> = params.list("signers")?;
    let message = params.optional_string("message")?;

    let mut body = json!({ "signers": signers });
    if let Some(message) = message {
        body["message"] = Value::String(message);
    }

    let response = ctx.send_json(ctx.request(Method::Post, &format!("/v2/documents/{}/send", id)).json(body))?;
    Ok(single(response))
}

pub fn download(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let id = params.required_string("documentId")?;
    let property = params.string_or("binaryPropertyOutput", "data")?;

    let request = ctx.request(Method::Get, &format!("/v2/documents/{}/download", id)).binary();
    let response = ctx.send(&request)?;

    let file_name = response
        .header("content-disposition")
        .and_then(filename_from_disposition)
        .unwrap_or_else(|| format!("document-{}.pdf", id));
    let mime_type = response
        .header("content-type")
        .filter(|t| !t.is_empty())
        .unwrap_or("application/pdf")
        .to_string();

    log::info!("Downloaded document {} as {} ({} bytes)", id, file_name, response.body.len());

    let binary = BinaryData::new(response.body)
        .with_file_name(file_name.clone())
        .with_mime_type(mime_type);

    Ok(vec![
        OutputItem::json(json!({ "documentId": id, "fileName": file_name })).with_binary(property, binary),
    ])
}

pub fn void(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let id = params.required_string("documentId")?;
    let reason = params.optional_string("reason")?;

    let mut body = Map::new();
    if let Some(reason) = reason {
        body.insert("reason".into(), Value::String(reason));
    }

    let response = ctx.send_json(
        ctx.request(Method::Post, &format!("/v2/documents/{}/void", id))
            .json(Value::Object(body)),
    )?;
    Ok(single(response))
}

pub fn delete(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let id = params.required_string("documentId")?;
    let response = ctx.send_json(ctx.request(Method::Delete, &format!("/v2/documents/{}", id)))?;
    if response.is_null() {
        return Ok(single(deleted("documentId", &id)));
    }
    Ok(single(response))
}

pub fn update(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let id = params.required_string("documentId")?;
    let fields: DocumentUpdate = params.object("updateFields")?;

    let mut body = Map::new();
    if let Some(name) = fields.name.filter(|n| !n.is_empty()) {
        body.insert("name".into(), Value::String(name));
    }
    if let Some(description) = fields.description.filter(|d| !d.is_empty()) {
        body.insert("description".into(), Value::String(description));
    }
    match fields.folder_id {
        Some(Some(folder_id)) if !folder_id.is_empty() => {
            body.insert("folderId".into(), Value::String(folder_id));
        }
        Some(_) => {
            body.insert("folderId".into(), Value::Null);
        }
        None => {}
    }

    let response = ctx.send_json(
        ctx.request(Method::Patch, &format!("/v2/documents/{}", id))
            .json(Value::Object(body)),
    )?;
    Ok(single(response))
}

pub fn get_stats(_params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let response = ctx.send_json(ctx.request(Method::Get, "/v2/documents/stats"))?;
    Ok(single(response))
}

pub fn invite(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let id = params.required_string("documentId")?;
    let email = params.required_string("inviteEmail")?;

    let mut body = json!({ "email": email });
    if let Some(name) = params.optional_string("inviteName")? {
        body["name"] = Value::String(name);
    }
    if let Some(message) = params.optional_string("inviteMessage")? {
        body["message"] = Value::String(message);
    }

    let response = ctx.send_json(ctx.request(Method::Post, &format!("/v2/documents/{}/invite", id)).json(body))?;
    Ok(single(response))
}

pub fn invite_bulk(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let id = params.required_string("documentId")?;
    let participants: Vec<Participant> = params.list("inviteParticipants")?;

    let mut body = json!({ "participants": participants });
    if let Some(message) = params.optional_string("inviteBulkMessage")? {
        body["message"] = Value::String(message);
    }

    let response = ctx.send_json(
        ctx.request(Method::Post, &format!("/v2/documents/{}/invite-bulk", id))
            .json(body),
    )?;
    Ok(single(response))
}

pub fn update_signature_validations(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let id = params.required_string("documentId")?;

    let body = json!({
        "signatureValidations": {
            "autografa": params.bool_or("autografa", true)?,
            "FEA": params.bool_or("fea", false)?,
            "nom151": params.bool_or("nom151", false)?,
            "eIDAS": params.bool_or("eidas", false)?,
            "firmaBiometrica": params.bool_or("firmaBiometrica", false)?,
            "aiVerification": params.bool_or("aiVerification", false)?,
            "confirmNameToFinish": params.bool_or("confirmNameToFinish", false)?,
        }
    });

    let response = ctx.send_json(
        ctx.request(Method::Patch, &format!("/api/documents/{}/signature-validations", id))
            .json(body),
    )?;
    Ok(single(response))
}

pub fn update_signature_state(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let id = params.required_string("documentId")?;
    let status: SignatureStatus = params.object("signatureStatus")?;

    let response = ctx.send_json(
        ctx.request(Method::Patch, &format!("/api/documents/{}/signature-state", id))
            .json(json!({ "status": status })),
    )?;
    Ok(single(response))
}
