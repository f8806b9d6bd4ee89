use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, info_span, warn};

use crate::adapters::email::{EmailMessage, EmailSender};
use crate::adapters::object_store::{ObjectStore, HTML_CONTENT_TYPE};
use crate::config::MailerConfig;
use crate::error::HandlerError;
use crate::handlers::provisioning::{ensure_tenant, ProvisioningOutcome};
use crate::runtime::contract::{
    validate_request, MailRequest, ValidatedRequest, EMAIL_SENT_MESSAGE, RECIPIENT_FIELD,
    TENANT_NAME_FIELD,
};
use crate::runtime::render::{archive_document, render_template};
use crate::runtime::storage_keys::{archive_object_key, template_object_key, DeliveryStatus};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

/// What a successful request produced, kept for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub provisioning: ProvisioningOutcome,
    pub message_id: String,
    pub archive_key: String,
}

/// Runs one mail request end to end and always answers with a response;
/// failures are logged here once and mapped to 400 or 500.
///
/// Once the payload decodes, every log line of the request carries its
/// `tenant` and `recipient` through the `mail_request` span.
pub fn handle_mail_event(
    event: Value,
    config: &MailerConfig,
    store: &dyn ObjectStore,
    sender: &dyn EmailSender,
) -> ApiResponse {
    let request = match normalize_event(event).and_then(decode_request) {
        Ok(request) => request,
        Err(error) => return failure_response(error),
    };

    let span = info_span!(
        "mail_request",
        tenant = request.get(TENANT_NAME_FIELD).unwrap_or_default(),
        recipient = request.get(RECIPIENT_FIELD).unwrap_or_default(),
    );
    let _entered = span.enter();

    match deliver_request(&request, config, store, sender) {
        Ok(receipt) => {
            info!(
                message_id = %receipt.message_id,
                archive_key = %receipt.archive_key,
                "mail request completed"
            );
            json_response(200, json!({ "message": EMAIL_SENT_MESSAGE }))
        }
        Err(error) => failure_response(error),
    }
}

pub fn process_mail_event(
    event: Value,
    config: &MailerConfig,
    store: &dyn ObjectStore,
    sender: &dyn EmailSender,
) -> Result<DeliveryReceipt, HandlerError> {
    let payload = normalize_event(event)?;
    let request = decode_request(payload)?;
    deliver_request(&request, config, store, sender)
}

fn deliver_request(
    request: &MailRequest,
    config: &MailerConfig,
    store: &dyn ObjectStore,
    sender: &dyn EmailSender,
) -> Result<DeliveryReceipt, HandlerError> {
    let validated = validate_request(request, &config.catalog)?;

    let provisioning = ensure_tenant(validated.tenant_name, config, store)?;
    let rendered = render_email(&validated, request, config, store)?;
    deliver_and_archive(&validated, request, rendered, provisioning, config, store, sender)
}

/// Unwraps API-Gateway style events whose `body` carries the payload.
pub fn normalize_event(event: Value) -> Result<Value, HandlerError> {
    let Some(object) = event.as_object() else {
        return Err(HandlerError::MalformedRequest(
            "Request payload must be a JSON object".to_string(),
        ));
    };

    let Some(body) = object.get("body") else {
        return Ok(event);
    };

    match body {
        Value::Object(_) => Ok(body.clone()),
        Value::String(text) => serde_json::from_str(text).map_err(|error| {
            HandlerError::MalformedRequest(format!("Malformed JSON body: {error}"))
        }),
        _ => Err(HandlerError::MalformedRequest(
            "Request body must be a JSON object".to_string(),
        )),
    }
}

pub fn decode_request(payload: Value) -> Result<MailRequest, HandlerError> {
    serde_json::from_value(payload).map_err(|error| {
        HandlerError::MalformedRequest(format!(
            "Request must be a JSON object of string values: {error}"
        ))
    })
}

fn render_email(
    validated: &ValidatedRequest<'_>,
    request: &MailRequest,
    config: &MailerConfig,
    store: &dyn ObjectStore,
) -> Result<String, HandlerError> {
    let key = template_object_key(
        &config.tenant_root,
        validated.tenant_name,
        &validated.template.template_id,
    );
    let bytes = store
        .get_object(&key)
        .map_err(HandlerError::Storage)?
        .ok_or_else(|| HandlerError::TemplateNotFound { key: key.clone() })?;
    let template = String::from_utf8(bytes)
        .map_err(|source| HandlerError::TemplateEncoding {
            key: key.clone(),
            source,
        })?;

    Ok(render_template(
        &template,
        validated.template,
        request,
        config.render_options(),
    ))
}

fn deliver_and_archive(
    validated: &ValidatedRequest<'_>,
    request: &MailRequest,
    rendered: String,
    provisioning: ProvisioningOutcome,
    config: &MailerConfig,
    store: &dyn ObjectStore,
    sender: &dyn EmailSender,
) -> Result<DeliveryReceipt, HandlerError> {
    let message = EmailMessage {
        sender: config.sender_address.clone(),
        recipient: validated.recipient.to_string(),
        subject: config.subject.clone(),
        html_body: rendered,
    };

    match sender.send_email(&message) {
        Ok(message_id) => {
            info!(
                tenant = validated.tenant_name,
                recipient = validated.recipient,
                message_id = %message_id,
                "email sent"
            );
            let archive_key = archive(
                validated,
                request,
                &message.html_body,
                DeliveryStatus::Sent,
                config,
                store,
            )?;
            Ok(DeliveryReceipt {
                provisioning,
                message_id,
                archive_key,
            })
        }
        Err(send_error) => {
            let error_queue_key = archive_object_key(
                &config.tenant_root,
                validated.tenant_name,
                DeliveryStatus::Failed,
                validated.recipient,
            );
            error!(
                tenant = validated.tenant_name,
                recipient = validated.recipient,
                error = %send_error,
                error_queue = %error_queue_key,
                "error sending email; rendered message archived to error queue"
            );
            archive(
                validated,
                request,
                &message.html_body,
                DeliveryStatus::Failed,
                config,
                store,
            )?;
            Err(HandlerError::Delivery {
                message: send_error,
            })
        }
    }
}

fn archive(
    validated: &ValidatedRequest<'_>,
    request: &MailRequest,
    rendered: &str,
    status: DeliveryStatus,
    config: &MailerConfig,
    store: &dyn ObjectStore,
) -> Result<String, HandlerError> {
    let key = archive_object_key(
        &config.tenant_root,
        validated.tenant_name,
        status,
        validated.recipient,
    );
    let document = archive_document(rendered, request).map_err(|error| HandlerError::Archive {
        key: key.clone(),
        message: format!("failed to serialize archive parameters: {error}"),
    })?;

    store
        .put_object(&key, document.as_bytes(), Some(HTML_CONTENT_TYPE))
        .map_err(|message| {
            error!(
                tenant = validated.tenant_name,
                template_id = %validated.template.template_id,
                key = %key,
                error = %message,
                "error saving archive record"
            );
            HandlerError::Archive {
                key: key.clone(),
                message,
            }
        })?;
    Ok(key)
}

fn failure_response(error: HandlerError) -> ApiResponse {
    if error.is_client_error() {
        warn!(error = %error, "mail request rejected");
    } else {
        error!(error = %error, "mail request failed");
    }
    json_response(error.status_code(), json!({ "error": error.to_string() }))
}

fn json_response(status_code: u16, payload: Value) -> ApiResponse {
    ApiResponse {
        status_code,
        headers: json!({"Content-Type": "application/json"}),
        body: payload.to_string(),
    }
}
