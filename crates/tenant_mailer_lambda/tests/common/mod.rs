#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use tenant_mailer_lambda::adapters::email::{EmailMessage, EmailSender};
use tenant_mailer_lambda::adapters::object_store::ObjectStore;
use tenant_mailer_lambda::config::MailerConfig;
use tenant_mailer_lambda::runtime::catalog::TemplateCatalog;

pub const OTP_TEMPLATE: &str = "Hello {{VisitorName}}, your OTP is {{OTP}} from {{CompanyName}}";
pub const WELCOME_TEMPLATE: &str = "<p>Welcome {{VisitorName}} to {{CompanyName}}. \
Visitor id: {{visitorid}}. Temporary password: {{temppasswd}}.</p>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Get(String),
    Put {
        key: String,
        content_type: Option<String>,
    },
    List(String),
    Copy {
        source: String,
        destination: String,
    },
}

/// In-memory bucket that records every call and can fail reads or writes
/// under chosen prefixes.
#[derive(Default)]
pub struct MemoryBucket {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    calls: Mutex<Vec<StoreCall>>,
    failing_put_prefixes: Mutex<Vec<String>>,
    failing_read_prefixes: Mutex<Vec<String>>,
}

impl MemoryBucket {
    pub fn with_shared_templates() -> Self {
        let bucket = Self::default();
        bucket.seed("templates/", b"");
        bucket.seed("templates/O152016.html", OTP_TEMPLATE.as_bytes());
        bucket.seed("templates/W5123151.html", WELCOME_TEMPLATE.as_bytes());
        bucket
    }

    pub fn seed(&self, key: &str, body: &[u8]) {
        self.objects
            .lock()
            .expect("poisoned mutex")
            .insert(key.to_string(), body.to_vec());
    }

    pub fn fail_puts_under(&self, prefix: &str) {
        self.failing_put_prefixes
            .lock()
            .expect("poisoned mutex")
            .push(prefix.to_string());
    }

    /// Fails `get_object` and `list_keys` for keys or prefixes under `prefix`.
    pub fn fail_reads_under(&self, prefix: &str) {
        self.failing_read_prefixes
            .lock()
            .expect("poisoned mutex")
            .push(prefix.to_string());
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .expect("poisoned mutex")
            .keys()
            .cloned()
            .collect()
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .expect("poisoned mutex")
            .get(key)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().expect("poisoned mutex").clone()
    }

    pub fn write_calls(&self) -> Vec<StoreCall> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, StoreCall::Put { .. } | StoreCall::Copy { .. }))
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().expect("poisoned mutex").clear();
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().expect("poisoned mutex").push(call);
    }

    fn fails(prefixes: &Mutex<Vec<String>>, key: &str) -> bool {
        prefixes
            .lock()
            .expect("poisoned mutex")
            .iter()
            .any(|prefix| key.starts_with(prefix.as_str()))
    }
}

impl ObjectStore for MemoryBucket {
    fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>, String> {
        self.record(StoreCall::Get(key.to_string()));
        if Self::fails(&self.failing_read_prefixes, key) {
            return Err(format!("AccessDenied: get {key}"));
        }
        Ok(self.objects.lock().expect("poisoned mutex").get(key).cloned())
    }

    fn put_object(&self, key: &str, body: &[u8], content_type: Option<&str>) -> Result<(), String> {
        self.record(StoreCall::Put {
            key: key.to_string(),
            content_type: content_type.map(str::to_string),
        });
        if Self::fails(&self.failing_put_prefixes, key) {
            return Err(format!("AccessDenied: put {key}"));
        }
        self.seed(key, body);
        Ok(())
    }

    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, String> {
        self.record(StoreCall::List(prefix.to_string()));
        if Self::fails(&self.failing_read_prefixes, prefix) {
            return Err(format!("AccessDenied: list {prefix}"));
        }
        Ok(self
            .keys()
            .into_iter()
            .filter(|key| key.starts_with(prefix))
            .collect())
    }

    fn copy_object(&self, source_key: &str, destination_key: &str) -> Result<(), String> {
        self.record(StoreCall::Copy {
            source: source_key.to_string(),
            destination: destination_key.to_string(),
        });
        let body = self
            .objects
            .lock()
            .expect("poisoned mutex")
            .get(source_key)
            .cloned()
            .ok_or_else(|| format!("NoSuchKey: {source_key}"))?;
        self.seed(destination_key, &body);
        Ok(())
    }
}

/// Email sender that returns a fixed outcome and keeps every message.
pub struct ScriptedSender {
    failure: Option<String>,
    sent: Mutex<Vec<EmailMessage>>,
}

impl ScriptedSender {
    pub fn accepting() -> Self {
        Self {
            failure: None,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().expect("poisoned mutex").clone()
    }
}

impl EmailSender for ScriptedSender {
    fn send_email(&self, message: &EmailMessage) -> Result<String, String> {
        let mut sent = self.sent.lock().expect("poisoned mutex");
        sent.push(message.clone());
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(format!("message-{}", sent.len())),
        }
    }
}

pub fn test_config() -> MailerConfig {
    MailerConfig {
        bucket: "mail-bucket".to_string(),
        sender_address: "noreply@example.com".to_string(),
        subject: "Your Message".to_string(),
        template_prefix: "templates/".to_string(),
        tenant_root: "tenants".to_string(),
        catalog: TemplateCatalog::default(),
        escape_values: false,
    }
}
