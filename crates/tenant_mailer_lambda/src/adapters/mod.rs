pub mod email;
pub mod object_store;
