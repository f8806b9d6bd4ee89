use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_ses::types::{Body, Content, Destination, Message};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tenant_mailer_lambda::adapters::email::{EmailMessage, EmailSender};
use tenant_mailer_lambda::adapters::object_store::ObjectStore;
use tenant_mailer_lambda::config::MailerConfig;
use tenant_mailer_lambda::handlers::request::{handle_mail_event, ApiResponse};
use tenant_mailer_lambda::observability::init_tracing;

struct S3ObjectStore {
    bucket: String,
    s3_client: aws_sdk_s3::Client,
}

impl ObjectStore for S3ObjectStore {
    fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>, String> {
        let bucket = self.bucket.clone();
        let object_key = key.to_string();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = match client.get_object().bucket(bucket).key(object_key).send().await {
                    Ok(output) => output,
                    Err(error) => {
                        if error
                            .as_service_error()
                            .map(GetObjectError::is_no_such_key)
                            .unwrap_or(false)
                        {
                            return Ok(None);
                        }
                        return Err(format!("failed to read object from s3: {error}"));
                    }
                };
                output
                    .body
                    .collect()
                    .await
                    .map(|data| Some(data.into_bytes().to_vec()))
                    .map_err(|error| format!("failed to read object body from s3: {error}"))
            })
        })
    }

    fn put_object(
        &self,
        key: &str,
        body: &[u8],
        content_type: Option<&str>,
    ) -> Result<(), String> {
        let bucket = self.bucket.clone();
        let object_key = key.to_string();
        let body_bytes = body.to_vec();
        let content_type = content_type.map(str::to_string);
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_object()
                    .bucket(bucket)
                    .key(object_key)
                    .body(ByteStream::from(body_bytes))
                    .set_content_type(content_type)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to write object to s3: {error}"))
            })
        })
    }

    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, String> {
        let bucket = self.bucket.clone();
        let key_prefix = prefix.to_string();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let mut keys = Vec::new();
                let mut continuation_token: Option<String> = None;
                loop {
                    let output = client
                        .list_objects_v2()
                        .bucket(&bucket)
                        .prefix(&key_prefix)
                        .set_continuation_token(continuation_token.take())
                        .send()
                        .await
                        .map_err(|error| format!("failed to list objects in s3: {error}"))?;

                    keys.extend(
                        output
                            .contents()
                            .iter()
                            .filter_map(|object| object.key().map(str::to_string)),
                    );

                    match output.next_continuation_token() {
                        Some(token) => continuation_token = Some(token.to_string()),
                        None => break,
                    }
                }
                Ok(keys)
            })
        })
    }

    fn copy_object(&self, source_key: &str, destination_key: &str) -> Result<(), String> {
        let bucket = self.bucket.clone();
        let copy_source = format!("{}/{}", bucket, urlencoding::encode(source_key));
        let object_key = destination_key.to_string();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .copy_object()
                    .bucket(bucket)
                    .copy_source(copy_source)
                    .key(object_key)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to copy object in s3: {error}"))
            })
        })
    }
}

struct SesEmailSender {
    ses_client: aws_sdk_ses::Client,
}

impl EmailSender for SesEmailSender {
    fn send_email(&self, message: &EmailMessage) -> Result<String, String> {
        let subject = Content::builder()
            .data(&message.subject)
            .build()
            .map_err(|error| format!("invalid email subject: {error}"))?;
        let html = Content::builder()
            .data(&message.html_body)
            .build()
            .map_err(|error| format!("invalid email body: {error}"))?;
        let ses_message = Message::builder()
            .subject(subject)
            .body(Body::builder().html(html).build())
            .build();
        let destination = Destination::builder()
            .to_addresses(&message.recipient)
            .build();
        let source = message.sender.clone();
        let client = self.ses_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .send_email()
                    .source(source)
                    .destination(destination)
                    .message(ses_message)
                    .send()
                    .await
                    .map(|output| output.message_id().to_string())
                    .map_err(|error| {
                        let service_message = error
                            .as_service_error()
                            .and_then(|service_error| service_error.meta().message())
                            .map(str::to_string);
                        service_message.unwrap_or_else(|| format!("failed to send email: {error}"))
                    })
            })
        })
    }
}

struct RuntimeDependencies {
    config: MailerConfig,
    store: S3ObjectStore,
    sender: SesEmailSender,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<ApiResponse, Error> {
    Ok(handle_mail_event(
        event.payload,
        &deps.config,
        &deps.store,
        &deps.sender,
    ))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config = MailerConfig::from_env().map_err(|error| Error::from(error.to_string()))?;
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let deps = RuntimeDependencies {
        store: S3ObjectStore {
            bucket: config.bucket.clone(),
            s3_client: aws_sdk_s3::Client::new(&aws_config),
        },
        sender: SesEmailSender {
            ses_client: aws_sdk_ses::Client::new(&aws_config),
        },
        config,
    };
    tracing::info!(bucket = %deps.config.bucket, "mailer runtime initialized");

    let deps = &deps;
    lambda_runtime::run(service_fn(move |event| handle_request(event, deps))).await
}
