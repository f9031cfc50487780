//! Template lookup and credential test
//!
//! Both are lookups a host makes outside item processing, so neither goes
//! through the dispatch table.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::credentials::ResolvedCredentials;
use crate::error::ApiError;
use crate::item::Item;
use crate::operations::Context;
use crate::transport::{HttpTransport, Method};

pub const NO_TEMPLATES: &str = "No Templates Found";
pub const TEMPLATES_UNAVAILABLE: &str = "Could not load templates";

/// A selectable template: display name plus the id to pass as `templateId`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateOption {
    pub name: String,
    pub value: String,
}

impl TemplateOption {
    fn placeholder(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: String::new(),
        }
    }
}

/// Fetch the account's templates; failures collapse to a single placeholder
pub fn load_templates(credentials: &ResolvedCredentials, transport: &dyn HttpTransport) -> Vec<TemplateOption> {
    let item = Item::default();
    let ctx = Context::new(credentials, transport, &item);

    match ctx.send_json(ctx.request(Method::Get, "/v2/templates")) {
        Ok(Value::Array(templates)) => templates.iter().map(template_option).collect(),
        Ok(_) => vec![TemplateOption::placeholder(NO_TEMPLATES)],
        Err(err) => {
            log::warn!("Template lookup failed: {}", err.best_message());
            vec![TemplateOption::placeholder(TEMPLATES_UNAVAILABLE)]
        }
    }
}

fn template_option(template: &Value) -> TemplateOption {
    let text = |key: &str| match template.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    TemplateOption {
        name: text("name"),
        value: text("id"),
    }
}

/// Authenticated probe used to validate stored credentials
pub fn test_credentials(credentials: &ResolvedCredentials, transport: &dyn HttpTransport) -> Result<Value, ApiError> {
    let item = Item::default();
    let ctx = Context::new(credentials, transport, &item);
    ctx.send_json(ctx.request(Method::Get, "/v2/test/security"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::test_support::credentials;
    use crate::transport::testing::RecordingTransport;
    use serde_json::json;

    #[test]
    fn test_templates_mapped_to_options() {
        let transport = RecordingTransport::new();
        transport.push_json(200, json!([{"id": "tpl-1", "name": "NDA"}, {"id": 42, "name": "Lease"}]));

        let options = load_templates(&credentials(), &transport);

        assert_eq!(transport.request(0).url, "https://api.allsign.io/v2/templates");
        assert_eq!(
            transport.request(0).header_value("authorization"),
            Some("Bearer allsign_live_sk_test123")
        );
        assert_eq!(
            options,
            vec![
                TemplateOption {
                    name: "NDA".into(),
                    value: "tpl-1".into()
                },
                TemplateOption {
                    name: "Lease".into(),
                    value: "42".into()
                },
            ]
        );
    }

    #[test]
    fn test_non_array_response() {
        let transport = RecordingTransport::new();
        transport.push_json(200, json!({"templates": []}));
        let options = load_templates(&credentials(), &transport);
        assert_eq!(options, vec![TemplateOption::placeholder(NO_TEMPLATES)]);
    }

    #[test]
    fn test_failure_yields_placeholder() {
        let transport = RecordingTransport::new();
        transport.push_json(500, json!({"message": "boom"}));
        let options = load_templates(&credentials(), &transport);
        assert_eq!(options, vec![TemplateOption::placeholder(TEMPLATES_UNAVAILABLE)]);
    }

    #[test]
    fn test_credential_probe() {
        let transport = RecordingTransport::new();
        transport.push_json(200, json!({"ok": true}));
        assert_eq!(test_credentials(&credentials(), &transport).unwrap(), json!({"ok": true}));
        assert_eq!(transport.request(0).url, "https://api.allsign.io/v2/test/security");

        transport.push_json(401, json!({"error": "Invalid API key"}));
        let err = test_credentials(&credentials(), &transport).unwrap_err();
        assert_eq!(err.best_message(), "Invalid API key");
    }
}
