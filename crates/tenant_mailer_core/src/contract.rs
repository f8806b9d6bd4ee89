use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{TemplateCatalog, TemplateDefinition};

pub const TEMPLATE_ID_FIELD: &str = "template_id";
pub const TENANT_NAME_FIELD: &str = "tenant_name";
pub const RECIPIENT_FIELD: &str = "emailaddress";

pub const MISSING_ROUTING_FIELDS_MESSAGE: &str = "Missing template_id or tenant_name";
pub const INVALID_TEMPLATE_ID_MESSAGE: &str = "Invalid template_id";
pub const EMAIL_SENT_MESSAGE: &str = "Email sent successfully!";

/// Decoded request payload. Keys keep their arrival order so archives
/// reproduce the caller's document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct MailRequest {
    fields: IndexMap<String, String>,
}

impl MailRequest {
    pub fn new(fields: IndexMap<String, String>) -> Self {
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> &IndexMap<String, String> {
        &self.fields
    }

    fn non_empty(&self, field: &str) -> Option<&str> {
        self.get(field).filter(|value| !value.is_empty())
    }
}

impl<K, V> FromIterator<(K, V)> for MailRequest
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// A request that passed every client-input check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest<'a> {
    pub tenant_name: &'a str,
    pub template: &'a TemplateDefinition,
    pub recipient: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(format!("Missing field: {field}"))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Checks routing fields, resolves the template and verifies required fields
/// in declared order. Stops at the first violation.
pub fn validate_request<'a>(
    request: &'a MailRequest,
    catalog: &'a TemplateCatalog,
) -> Result<ValidatedRequest<'a>, ValidationError> {
    let (Some(template_id), Some(tenant_name)) = (
        request.non_empty(TEMPLATE_ID_FIELD),
        request.non_empty(TENANT_NAME_FIELD),
    ) else {
        return Err(ValidationError::new(MISSING_ROUTING_FIELDS_MESSAGE));
    };

    let template = catalog
        .resolve(template_id)
        .ok_or_else(|| ValidationError::new(INVALID_TEMPLATE_ID_MESSAGE))?;

    if let Some(missing) = template
        .required_fields
        .iter()
        .find(|field| !request.contains(field))
    {
        return Err(ValidationError::missing_field(missing));
    }

    let recipient = request
        .get(RECIPIENT_FIELD)
        .ok_or_else(|| ValidationError::missing_field(RECIPIENT_FIELD))?;

    Ok(ValidatedRequest {
        tenant_name,
        template,
        recipient,
    })
}
