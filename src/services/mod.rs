/// Search, filter and ordering over the catalog.
pub mod catalog;
/// OpenAPI documentation generation.
pub mod documentation;
/// Game access layer: CRUD and counters.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Background connection and health supervision of the storage backend.
pub mod storage_supervisor;
