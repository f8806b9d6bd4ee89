#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
}

pub trait EmailSender {
    /// Sends one message and returns the provider's message id.
    fn send_email(&self, message: &EmailMessage) -> Result<String, String>;
}
