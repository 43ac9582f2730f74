/// OpenAPI documentation generation.
pub mod documentation;
/// Game registry operations and action intake.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events streaming service.
pub mod sse_service;
