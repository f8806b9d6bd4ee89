pub mod provisioning;
pub mod request;
