pub const HTML_CONTENT_TYPE: &str = "text/html";

/// Object-store operations the mailer consumes. Errors are the store's own
/// messages and are surfaced to callers verbatim.
pub trait ObjectStore {
    /// Returns `Ok(None)` when no object exists at `key`.
    fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>, String>;

    fn put_object(&self, key: &str, body: &[u8], content_type: Option<&str>)
        -> Result<(), String>;

    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, String>;

    fn copy_object(&self, source_key: &str, destination_key: &str) -> Result<(), String>;
}
