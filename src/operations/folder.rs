//! Folder resource

use serde_json::{Map, Value};

use super::{Context, compact, deleted, fan_out, single};
use crate::error::ApiError;
use crate::item::OutputItem;
use crate::params::{FolderUpdate, Parameters};
use crate::transport::Method;

const DEFAULT_DOCS_LIMIT: u64 = 50;

pub fn create(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let mut body = Map::new();
    body.insert("name".into(), Value::String(params.required_string("folderName")?));
    if let Some(parent) = params.optional_string("parentFolderId")? {
        body.insert("parentFolderId".into(), Value::String(parent));
    }

    let response = ctx.send_json(ctx.request(Method::Post, "/v2/folders").json(Value::Object(body)))?;
    Ok(single(response))
}

pub fn get(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let id = params.required_string("folderId")?;
    let response = ctx.send_json(ctx.request(Method::Get, &format!("/v2/folders/{}", id)))?;
    Ok(single(response))
}

pub fn get_all(_params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let response = ctx.send_json(ctx.request(Method::Get, "/v2/folders"))?;
    Ok(fan_out(response))
}

pub fn update(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let id = params.required_string("folderId")?;
    let changes: FolderUpdate = params.object("folderUpdateFields")?;

    let response = ctx.send_json(
        ctx.request(Method::Patch, &format!("/v2/folders/{}", id))
            .json(Value::Object(compact(&changes)?)),
    )?;
    Ok(single(response))
}

pub fn delete(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let id = params.required_string("folderId")?;
    ctx.send_json(ctx.request(Method::Delete, &format!("/v2/folders/{}", id)))?;
    Ok(single(deleted("folderId", &id)))
}

pub fn get_documents(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let id = params.required_string("folderId")?;
    let limit = params.u64_or("folderDocsLimit", DEFAULT_DOCS_LIMIT)?;

    let response = ctx.send_json(
        ctx.request(Method::Get, &format!("/v2/folders/{}/documents", id))
            .query("limit", limit),
    )?;
    Ok(fan_out(response))
}
