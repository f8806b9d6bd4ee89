pub use tenant_mailer_core::{catalog, contract, render, storage_keys};
