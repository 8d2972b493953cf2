/// Read-side projections of contests.
pub mod contest_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Entry submission, listing and voting.
pub mod entry_service;
/// Automated feedback on contest performances.
pub mod feedback;
/// Health check service.
pub mod health_service;
/// Greedy pairing of unpaired entries.
pub mod matchmaking;
/// Simulation-mode sign in and sign out.
pub mod session_service;
/// Server-Sent Events forwarding.
pub mod sse_service;
/// Remote storage health supervisor toggling degraded mode.
pub mod storage_supervisor;
