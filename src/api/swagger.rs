use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "User Management Service API",
        version = "1.0.0",
        description = "CRUD, pagination, search and CSV export over user records.\n\n**Authentication:** none; every endpoint is public.\n\n**Uploads:** create/update accept `multipart/form-data` with an optional `profile` image part, or a JSON body without an image.\n\nAll user routes are also mounted under `/api/users`."
    ),
    paths(
        crate::api::users::create_user,
        crate::api::users::list_users,
        crate::api::users::get_user,
        crate::api::users::update_user,
        crate::api::users::delete_user,
        crate::api::users::search_users,
        crate::api::users::export_users,

        crate::api::health::health_check,
        crate::api::metrics::get_metrics,
    ),
    components(
        schemas(
            crate::models::UserForm,
            crate::models::UserResponse,
            crate::models::Gender,
            crate::models::Status,
            crate::models::Pagination,

            crate::api::health::HealthResponse,
            crate::api::metrics::MetricsResponse,
        )
    ),
    tags(
        (name = "Users", description = "User records: create, list, fetch, update, delete, search and export."),
        (name = "Health", description = "Health check and request metrics."),
    )
)]
pub struct ApiDoc;
