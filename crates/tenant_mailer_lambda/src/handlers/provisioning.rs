//! Lazy tenant folder creation.
//!
//! The existence check and the writes that follow are not atomic. Two first
//! requests for the same tenant may both provision it; every write targets a
//! fixed key, so the second pass only rewrites identical objects.

use tracing::{error, info};

use crate::adapters::object_store::ObjectStore;
use crate::config::MailerConfig;
use crate::error::HandlerError;
use crate::runtime::storage_keys::{
    seeded_template_key, tenant_folder_prefix, tenant_prefix, TenantFolder,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningOutcome {
    AlreadyExists,
    Created { templates_copied: usize },
}

pub fn tenant_exists(
    tenant_name: &str,
    config: &MailerConfig,
    store: &dyn ObjectStore,
) -> Result<bool, HandlerError> {
    let prefix = tenant_prefix(&config.tenant_root, tenant_name);
    let keys = store.list_keys(&prefix).map_err(|message| {
        error!(
            tenant = tenant_name,
            prefix = %prefix,
            error = %message,
            "tenant existence check failed"
        );
        HandlerError::Storage(message)
    })?;
    Ok(!keys.is_empty())
}

/// Creates the tenant folders and seeds its templates unless any object
/// already lives under the tenant prefix. A partially provisioned tenant counts
/// as existing.
pub fn ensure_tenant(
    tenant_name: &str,
    config: &MailerConfig,
    store: &dyn ObjectStore,
) -> Result<ProvisioningOutcome, HandlerError> {
    if tenant_exists(tenant_name, config, store)? {
        info!(
            tenant = tenant_name,
            "tenant already exists, skipping folder creation and template copy"
        );
        return Ok(ProvisioningOutcome::AlreadyExists);
    }

    create_tenant_folders(tenant_name, config, store)?;
    let templates_copied = copy_default_templates(tenant_name, config, store)?;

    info!(tenant = tenant_name, templates_copied, "tenant provisioned");
    Ok(ProvisioningOutcome::Created { templates_copied })
}

fn create_tenant_folders(
    tenant_name: &str,
    config: &MailerConfig,
    store: &dyn ObjectStore,
) -> Result<(), HandlerError> {
    let mut markers = vec![tenant_prefix(&config.tenant_root, tenant_name)];
    markers.extend(
        TenantFolder::ALL
            .iter()
            .map(|folder| tenant_folder_prefix(&config.tenant_root, tenant_name, *folder)),
    );

    for marker in markers {
        store.put_object(&marker, &[], None).map_err(|message| {
            error!(
                tenant = tenant_name,
                key = %marker,
                error = %message,
                "failed to create tenant folder"
            );
            HandlerError::Storage(message)
        })?;
    }
    Ok(())
}

fn copy_default_templates(
    tenant_name: &str,
    config: &MailerConfig,
    store: &dyn ObjectStore,
) -> Result<usize, HandlerError> {
    let source_keys = store.list_keys(&config.template_prefix).map_err(|message| {
        error!(
            tenant = tenant_name,
            prefix = %config.template_prefix,
            error = %message,
            "failed to list shared templates"
        );
        HandlerError::Storage(message)
    })?;

    let mut copied = 0;
    for source_key in source_keys {
        let Some(destination_key) = seeded_template_key(
            &config.template_prefix,
            &source_key,
            &config.tenant_root,
            tenant_name,
        ) else {
            continue;
        };

        store
            .copy_object(&source_key, &destination_key)
            .map_err(|message| {
                error!(
                    tenant = tenant_name,
                    source = %source_key,
                    destination = %destination_key,
                    error = %message,
                    "failed to copy template"
                );
                HandlerError::Storage(message)
            })?;
        copied += 1;
    }
    Ok(copied)
}
