use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Battle Arena Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::entries::list_entries,
        crate::routes::entries::submit_entry,
        crate::routes::entries::vote,
        crate::routes::contests::list_contests,
        crate::routes::contests::get_contest,
        crate::routes::contests::request_feedback,
        crate::routes::matchmaking::run,
        crate::routes::session::sign_in,
        crate::routes::session::sign_out,
        crate::routes::sse::session_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::entry::CreateEntryRequest,
            crate::dto::entry::EntrySummary,
            crate::dto::entry::EntriesResponse,
            crate::dto::entry::VoteResponse,
            crate::dto::contest::ContestSummary,
            crate::dto::contest::ContestsResponse,
            crate::dto::contest::ContestDetail,
            crate::dto::contest::FeedbackRequest,
            crate::dto::contest::FeedbackResponse,
            crate::dto::matchmaking::MatchmakingReport,
            crate::dto::session::SignInRequest,
            crate::dto::session::SessionResponse,
            crate::dto::sse::Handshake,
            crate::dto::sse::SessionNotice,
            crate::dao::models::Category,
            crate::dao::models::Style,
            crate::dao::models::SkillLevel,
            crate::dao::models::ContestStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "entries", description = "Submission, listing and voting"),
        (name = "contests", description = "Contest listing, detail and feedback"),
        (name = "matchmaking", description = "Pairing of unpaired entries"),
        (name = "session", description = "Simulation-mode sessions"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
/// OpenAPI document of the HTTP API.
pub struct ApiDoc;
