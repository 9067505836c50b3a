use actix_web::{http::header, web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::{
    api::user_payload::read_user_payload,
    config::AppConfig,
    database::UserRepository,
    models::{PageRequest, UserForm, UserResponse},
    services::{user_service, ProfileStorage},
    utils::error::AppError,
};

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// 1-based page number (default 1)
    pub page: Option<String>,
    /// Page size (default 5, capped server-side)
    pub limit: Option<String>,
}

/// Mounts the user routes. Literal segments go before `/{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::post().to(create_user))
        .route("", web::get().to(list_users))
        .route("/export", web::get().to(export_users))
        .route("/search/{key}", web::get().to(search_users))
        .route("/{id}", web::get().to(get_user))
        .route("/{id}", web::put().to(update_user))
        .route("/{id}", web::delete().to(delete_user));
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body(content = UserForm, content_type = "multipart/form-data",
        description = "User fields plus an optional `profile` image part. JSON bodies are also accepted."),
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation failed or email already in use"),
        (status = 413, description = "Upload too large")
    )
)]
pub async fn create_user(
    req: HttpRequest,
    payload: web::Payload,
    repo: web::Data<dyn UserRepository>,
    storage: web::Data<ProfileStorage>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    log::info!("👤 POST /users - Creating user");

    let body = read_user_payload(&req, payload, config.max_upload_bytes).await?;
    let user = user_service::create_user(repo.get_ref(), &storage, body.form, body.profile).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "data": UserResponse::from(user)
    })))
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "One page of users with pagination info", body = [UserResponse])
    )
)]
pub async fn list_users(
    query: web::Query<ListUsersQuery>,
    repo: web::Data<dyn UserRepository>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let page = PageRequest::from_query(
        query.page.as_deref(),
        query.limit.as_deref(),
        config.default_page_limit,
        config.max_page_limit,
    );

    log::info!("📋 GET /users - page {} limit {}", page.page, page.limit);

    let (users, pagination) = user_service::list_users(repo.get_ref(), page).await?;
    let data: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": data,
        "pagination": pagination
    })))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ObjectId (24 hex chars)")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    path: web::Path<String>,
    repo: web::Data<dyn UserRepository>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    log::info!("🔍 GET /users/{}", id);

    let user = user_service::get_user(repo.get_ref(), &id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": UserResponse::from(user)
    })))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ObjectId (24 hex chars)")),
    request_body(content = UserForm, content_type = "multipart/form-data",
        description = "Any subset of user fields plus an optional `profile` image part"),
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Validation failed or malformed id"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    req: HttpRequest,
    path: web::Path<String>,
    payload: web::Payload,
    repo: web::Data<dyn UserRepository>,
    storage: web::Data<ProfileStorage>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    log::info!("🔧 PUT /users/{} - Updating user", id);

    let body = read_user_payload(&req, payload, config.max_upload_bytes).await?;
    let user =
        user_service::update_user(repo.get_ref(), &storage, &id, body.form, body.profile).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": UserResponse::from(user)
    })))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ObjectId (24 hex chars)")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    path: web::Path<String>,
    repo: web::Data<dyn UserRepository>,
    storage: web::Data<ProfileStorage>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    log::info!("🗑️  DELETE /users/{}", id);

    user_service::delete_user(repo.get_ref(), &storage, &id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": {}
    })))
}

#[utoipa::path(
    get,
    path = "/users/search/{key}",
    tag = "Users",
    params(("key" = String, Path, description = "Substring matched against first name, last name and email")),
    responses(
        (status = 200, description = "All matching users, unpaginated", body = [UserResponse])
    )
)]
pub async fn search_users(
    path: web::Path<String>,
    repo: web::Data<dyn UserRepository>,
) -> Result<HttpResponse, AppError> {
    let key = path.into_inner();
    log::info!("🔎 GET /users/search/{}", key);

    let users = user_service::search_users(repo.get_ref(), &key).await?;
    log::info!("✅ Search '{}' matched {} users", key, users.len());

    let data: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": data
    })))
}

#[utoipa::path(
    get,
    path = "/users/export",
    tag = "Users",
    responses(
        (status = 200, description = "CSV attachment users.csv", content_type = "text/csv", body = String)
    )
)]
pub async fn export_users(repo: web::Data<dyn UserRepository>) -> Result<HttpResponse, AppError> {
    log::info!("📤 GET /users/export");

    let csv = user_service::export_users(repo.get_ref()).await?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((header::CONTENT_DISPOSITION, "attachment; filename=\"users.csv\""))
        .body(csv))
}
