pub mod clipboard;
pub mod local_store;
pub mod notify;
pub mod secure_host;
pub mod token_storage;
