//! One-step upload and send
//!
//! Fetches or reads the source file, then posts the document together with
//! its participants and signature validations in a single request.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde_json::json;

use super::{Context, filename_from_disposition, single};
use crate::error::ApiError;
use crate::item::OutputItem;
use crate::params::{FileSource, Parameters, Signer};
use crate::transport::{Method, RequestSpec};

/// Validation flags sent with the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureValidation {
    pub autografa: bool,
    #[serde(rename = "FEA")]
    pub fea: bool,
    pub nom151: bool,
    pub biometric_signature: bool,
    pub confirm_name_to_finish: bool,
    /// Only ever sent as `true`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_verification: Option<bool>,
}

impl SignatureValidation {
    fn from_params(params: &Parameters) -> Result<Self, ApiError> {
        let identity = params.bool_or("identityVerification", false)?;
        let id_scan = params.bool_or("idScan", false)?;
        let selfie = params.bool_or("biometricSelfie", false)?;
        let selfie_ai = params.bool_or("selfieAiDetection", false)?;

        Ok(Self {
            autografa: params.bool_or("autografa", true)?,
            fea: params.bool_or("fea", false)?,
            nom151: params.bool_or("nom151", false)?,
            biometric_signature: params.bool_or("biometricSignature", false)?,
            confirm_name_to_finish: params.bool_or("confirmNameToFinish", false)?,
            ai_verification: ai_verification(identity, id_scan, selfie, selfie_ai),
        })
    }
}

fn ai_verification(identity: bool, id_scan: bool, selfie: bool, selfie_ai: bool) -> Option<bool> {
    (identity && (id_scan || (selfie && selfie_ai))).then_some(true)
}

/// Delivery settings derived from the participant list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryConfig {
    pub send_invitations: bool,
    pub send_by_email: bool,
    pub start_at_step: u8,
}

impl DeliveryConfig {
    fn for_participants(count: usize) -> Self {
        let invite = count > 0;
        Self {
            send_invitations: invite,
            send_by_email: invite,
            start_at_step: if invite { 3 } else { 1 },
        }
    }
}

/// Source file ready for upload
struct SourceFile {
    data: Vec<u8>,
    name: Option<String>,
}

pub fn create_and_send(params: &Parameters, ctx: &Context<'_>) -> Result<Vec<OutputItem>, ApiError> {
    let document_name = params.string_or("documentName", "")?;
    let source: FileSource = params.object("fileSource")?;
    let participants: Vec<Signer> = params.list("participants")?;
    let validation = SignatureValidation::from_params(params)?;

    let file = match source {
        FileSource::Url => fetch_source(&params.required_string("fileUrl")?, ctx)?,
        FileSource::Binary => {
            let binary = ctx.binary(&params.string_or("binaryProperty", "data")?)?;
            SourceFile {
                data: binary.data.clone(),
                name: binary.file_name.clone(),
            }
        }
    };

    let name = upload_name(file.name.as_deref(), &document_name);
    log::info!(
        "Creating document {} with {} participant(s) ({} bytes)",
        name,
        participants.len(),
        file.data.len()
    );

    let body = json!({
        "document": {
            "base64Content": STANDARD.encode(&file.data),
            "name": name,
        },
        "participants": participants,
        "signatureValidation": validation,
        "config": DeliveryConfig::for_participants(participants.len()),
    });

    let response = ctx.send_json(ctx.request(Method::Post, "/v2/documents/").json(body))?;
    Ok(single(response))
}

/// Download the source file; the URL is third-party so no credentials go along
fn fetch_source(url: &str, ctx: &Context<'_>) -> Result<SourceFile, ApiError> {
    let response = ctx.send(&RequestSpec::new(Method::Get, url).binary())?;
    let name = response
        .header("content-disposition")
        .and_then(filename_from_disposition)
        .or_else(|| last_path_segment(url));
    Ok(SourceFile {
        data: response.body,
        name,
    })
}

fn last_path_segment(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let path = path.split_once("://").map_or(path, |(_, rest)| rest);
    let (_, path) = path.split_once('/')?;
    path.rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// Keep a resolved `.pdf` name, otherwise name the upload after the document
fn upload_name(resolved: Option<&str>, document_name: &str) -> String {
    match resolved {
        Some(name) if name.to_ascii_lowercase().ends_with(".pdf") => name.to_string(),
        _ if document_name.is_empty() => "document.pdf".to_string(),
        _ => format!("{}.pdf", document_name),
    }
}
