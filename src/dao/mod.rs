/// Entry and contest persistence backends and the selector facade.
pub mod arena_store;
/// Database model definitions.
pub mod models;
/// RFC 3339 timestamp encoding shared by all backends.
pub mod rfc3339;
/// Storage abstraction layer for database operations.
pub mod storage;
