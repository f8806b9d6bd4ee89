#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantFolder {
    CompletedQueue,
    DefaultTemplates,
    ErrorQueue,
}

impl TenantFolder {
    pub const ALL: [TenantFolder; 3] = [
        TenantFolder::CompletedQueue,
        TenantFolder::DefaultTemplates,
        TenantFolder::ErrorQueue,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CompletedQueue => "completed_queue",
            Self::DefaultTemplates => "default_templates",
            Self::ErrorQueue => "error_queue",
        }
    }
}

/// Outcome of the send step; selects which archive folder receives the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

impl DeliveryStatus {
    pub fn archive_folder(self) -> TenantFolder {
        match self {
            Self::Sent => TenantFolder::CompletedQueue,
            Self::Failed => TenantFolder::ErrorQueue,
        }
    }
}

/// `{root}/{tenant}/`, the marker whose listing decides tenant existence.
pub fn tenant_prefix(tenant_root: &str, tenant_name: &str) -> String {
    let trimmed = tenant_root.trim_matches('/');
    if trimmed.is_empty() {
        format!("{tenant_name}/")
    } else {
        format!("{trimmed}/{tenant_name}/")
    }
}

pub fn tenant_folder_prefix(tenant_root: &str, tenant_name: &str, folder: TenantFolder) -> String {
    format!("{}{}/", tenant_prefix(tenant_root, tenant_name), folder.as_str())
}

pub fn template_object_key(tenant_root: &str, tenant_name: &str, template_id: &str) -> String {
    format!(
        "{}{template_id}",
        tenant_folder_prefix(tenant_root, tenant_name, TenantFolder::DefaultTemplates)
    )
}

/// Archive records are keyed by recipient, so a later send to the same
/// address replaces the earlier record.
pub fn archive_object_key(
    tenant_root: &str,
    tenant_name: &str,
    status: DeliveryStatus,
    recipient: &str,
) -> String {
    format!(
        "{}{recipient}.html",
        tenant_folder_prefix(tenant_root, tenant_name, status.archive_folder())
    )
}

/// Maps a key under the shared template prefix onto the tenant's
/// `default_templates/` folder. Returns `None` for keys outside the prefix.
pub fn seeded_template_key(
    source_prefix: &str,
    source_key: &str,
    tenant_root: &str,
    tenant_name: &str,
) -> Option<String> {
    let relative = source_key.strip_prefix(source_prefix)?;
    Some(format!(
        "{}{relative}",
        tenant_folder_prefix(tenant_root, tenant_name, TenantFolder::DefaultTemplates)
    ))
}
