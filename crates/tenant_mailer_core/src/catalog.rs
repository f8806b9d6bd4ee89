use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::contract::RECIPIENT_FIELD;

pub const DEFAULT_OTP_TEMPLATE_ID: &str = "O152016.html";
pub const DEFAULT_WELCOME_TEMPLATE_ID: &str = "W5123151.html";

/// The message types the mailer knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    Otp,
    Welcome,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 2] = [TemplateKind::Otp, TemplateKind::Welcome];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Otp => "otp",
            Self::Welcome => "welcome",
        }
    }

    /// Fields a request must carry, in the order they are checked.
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Otp => &["VisitorName", "OTP", "CompanyName", RECIPIENT_FIELD],
            Self::Welcome => &[
                "VisitorName",
                "visitorid",
                "temppasswd",
                "CompanyName",
                RECIPIENT_FIELD,
            ],
        }
    }

    /// Placeholder names in substitution order.
    pub fn placeholders(self) -> &'static [&'static str] {
        match self {
            Self::Otp => &["VisitorName", "OTP", "CompanyName"],
            Self::Welcome => &["VisitorName", "visitorid", "temppasswd", "CompanyName"],
        }
    }

    pub fn definition(self, template_id: impl Into<String>) -> TemplateDefinition {
        TemplateDefinition {
            template_id: template_id.into(),
            required_fields: self
                .required_fields()
                .iter()
                .map(|field| field.to_string())
                .collect(),
            placeholders: self
                .placeholders()
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TemplateDefinition {
    pub template_id: String,
    pub required_fields: Vec<String>,
    pub placeholders: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("template catalog must contain at least one definition")]
    Empty,
    #[error("template definition has an empty template_id")]
    EmptyTemplateId,
    #[error("template_id '{0}' is defined more than once")]
    DuplicateTemplateId(String),
    #[error("template '{template_id}' must require the 'emailaddress' field")]
    MissingRecipientField { template_id: String },
    #[error("invalid template catalog JSON: {0}")]
    InvalidJson(String),
}

/// Lookup table from template identifier to its field rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateCatalog {
    definitions: Vec<TemplateDefinition>,
}

impl TemplateCatalog {
    pub fn new(definitions: Vec<TemplateDefinition>) -> Result<Self, CatalogError> {
        if definitions.is_empty() {
            return Err(CatalogError::Empty);
        }

        validate_definitions(&definitions)?;

        Ok(Self { definitions })
    }

    /// Builds the two-entry table with caller-chosen identifiers.
    pub fn with_ids(
        otp_template_id: &str,
        welcome_template_id: &str,
    ) -> Result<Self, CatalogError> {
        Self::new(vec![
            TemplateKind::Otp.definition(otp_template_id),
            TemplateKind::Welcome.definition(welcome_template_id),
        ])
    }

    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let definitions: Vec<TemplateDefinition> = serde_json::from_str(text)
            .map_err(|error| CatalogError::InvalidJson(error.to_string()))?;
        Self::new(definitions)
    }

    pub fn resolve(&self, template_id: &str) -> Option<&TemplateDefinition> {
        self.definitions
            .iter()
            .find(|definition| definition.template_id == template_id)
    }

    pub fn definitions(&self) -> &[TemplateDefinition] {
        &self.definitions
    }
}

fn validate_definitions(definitions: &[TemplateDefinition]) -> Result<(), CatalogError> {
    let mut seen = HashSet::with_capacity(definitions.len());
    for definition in definitions {
        if definition.template_id.trim().is_empty() {
            return Err(CatalogError::EmptyTemplateId);
        }
        if !seen.insert(definition.template_id.as_str()) {
            return Err(CatalogError::DuplicateTemplateId(
                definition.template_id.clone(),
            ));
        }
        if !definition
            .required_fields
            .iter()
            .any(|field| field == RECIPIENT_FIELD)
        {
            return Err(CatalogError::MissingRecipientField {
                template_id: definition.template_id.clone(),
            });
        }
    }
    Ok(())
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self {
            definitions: vec![
                TemplateKind::Otp.definition(DEFAULT_OTP_TEMPLATE_ID),
                TemplateKind::Welcome.definition(DEFAULT_WELCOME_TEMPLATE_ID),
            ],
        }
    }
}
