//! Environment-driven settings, read once per cold start.

use thiserror::Error;

use crate::runtime::catalog::{
    CatalogError, TemplateCatalog, DEFAULT_OTP_TEMPLATE_ID, DEFAULT_WELCOME_TEMPLATE_ID,
};
use crate::runtime::render::RenderOptions;

pub const BUCKET_ENV: &str = "MAILER_BUCKET";
pub const SENDER_ADDRESS_ENV: &str = "MAILER_SENDER_ADDRESS";
pub const SUBJECT_ENV: &str = "MAILER_SUBJECT";
pub const TEMPLATE_PREFIX_ENV: &str = "MAILER_TEMPLATE_PREFIX";
pub const TENANT_ROOT_ENV: &str = "MAILER_TENANT_ROOT";
pub const OTP_TEMPLATE_ID_ENV: &str = "MAILER_OTP_TEMPLATE_ID";
pub const WELCOME_TEMPLATE_ID_ENV: &str = "MAILER_WELCOME_TEMPLATE_ID";
pub const TEMPLATE_CATALOG_ENV: &str = "MAILER_TEMPLATE_CATALOG";
pub const ESCAPE_VALUES_ENV: &str = "MAILER_ESCAPE_VALUES";

pub const DEFAULT_SUBJECT: &str = "Your Message";
pub const DEFAULT_TEMPLATE_PREFIX: &str = "templates/";
pub const DEFAULT_TENANT_ROOT: &str = "tenants";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be configured")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{name} does not describe a usable template catalog: {source}")]
    Catalog {
        name: &'static str,
        #[source]
        source: CatalogError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailerConfig {
    pub bucket: String,
    pub sender_address: String,
    pub subject: String,
    /// Shared template source, always ending in `/`.
    pub template_prefix: String,
    pub tenant_root: String,
    pub catalog: TemplateCatalog,
    pub escape_values: bool,
}

impl MailerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let bucket = read(BUCKET_ENV).ok_or(ConfigError::Missing(BUCKET_ENV))?;
        let sender_address =
            read(SENDER_ADDRESS_ENV).ok_or(ConfigError::Missing(SENDER_ADDRESS_ENV))?;
        let subject = read(SUBJECT_ENV).unwrap_or_else(|| DEFAULT_SUBJECT.to_string());
        let template_prefix = normalize_prefix(
            read(TEMPLATE_PREFIX_ENV).unwrap_or_else(|| DEFAULT_TEMPLATE_PREFIX.to_string()),
        );
        let tenant_root = read(TENANT_ROOT_ENV)
            .map(|value| value.trim_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_TENANT_ROOT.to_string());

        let catalog = match read(TEMPLATE_CATALOG_ENV) {
            Some(text) => {
                TemplateCatalog::from_json(&text).map_err(|source| ConfigError::Catalog {
                    name: TEMPLATE_CATALOG_ENV,
                    source,
                })?
            }
            None => {
                let otp_id = read(OTP_TEMPLATE_ID_ENV)
                    .unwrap_or_else(|| DEFAULT_OTP_TEMPLATE_ID.to_string());
                let welcome_id = read(WELCOME_TEMPLATE_ID_ENV)
                    .unwrap_or_else(|| DEFAULT_WELCOME_TEMPLATE_ID.to_string());
                TemplateCatalog::with_ids(&otp_id, &welcome_id).map_err(|source| {
                    ConfigError::Catalog {
                        name: WELCOME_TEMPLATE_ID_ENV,
                        source,
                    }
                })?
            }
        };

        let escape_values = match read(ESCAPE_VALUES_ENV) {
            Some(value) => parse_bool(ESCAPE_VALUES_ENV, &value)?,
            None => false,
        };

        Ok(Self {
            bucket,
            sender_address,
            subject,
            template_prefix,
            tenant_root,
            catalog,
            escape_values,
        })
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            escape_values: self.escape_values,
        }
    }
}

fn normalize_prefix(value: String) -> String {
    let trimmed = value.trim_start_matches('/');
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
