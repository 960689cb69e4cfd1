use crate::application::user_service::UserService;
use crate::data::user_repository::UserRepository;
use crate::domain::error::{DomainError, ErrorBody, FieldError};
use crate::presentation::dto::{
    CreateUserRequest, Link, UpdateUserRequest, UserLinks, UserResponse,
};
use crate::presentation::middleware::request_id;
use actix_web::{HttpRequest, HttpResponse, Scope, web};
use tracing::info;
use utoipa::OpenApi;
use uuid::Uuid;

#[derive(OpenApi)]
#[openapi(
    info(title = "User API", description = "Create, read, update and delete users"),
    paths(list_users, create_user, get_user, update_user, delete_user),
    components(schemas(
        CreateUserRequest,
        UpdateUserRequest,
        UserResponse,
        UserLinks,
        Link,
        ErrorBody,
        FieldError
    )),
    tags((name = "users", description = "User management"))
)]
pub struct ApiDoc;

/// Serves the generated OpenAPI document.
pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

pub fn scope<R: UserRepository + 'static>() -> Scope {
    web::scope("/v1/users")
        .app_data(json_config())
        .app_data(path_config())
        .service(
            web::resource("")
                .route(web::get().to(list_users::<R>))
                .route(web::post().to(create_user::<R>)),
        )
        .service(
            web::resource("/{id}")
                .route(web::get().to(get_user::<R>))
                .route(web::put().to(update_user::<R>))
                .route(web::delete().to(delete_user::<R>)),
        )
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        DomainError::Validation(vec![FieldError::new("body", err.to_string())]).into()
    })
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        DomainError::Validation(vec![FieldError::new("id", err.to_string())]).into()
    })
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 409, description = "Email already in use", body = ErrorBody)
    )
)]
async fn create_user<R: UserRepository + 'static>(
    req: HttpRequest,
    service: web::Data<UserService<R>>,
    payload: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, DomainError> {
    let user = service.create_user(payload.into_inner().into()).await?;

    info!(request_id = %request_id(&req), user_id = %user.id, "user created");

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "No such user", body = ErrorBody)
    )
)]
async fn get_user<R: UserRepository + 'static>(
    service: web::Data<UserService<R>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let user = service.get_user(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    responses((status = 200, description = "All users", body = [UserResponse]))
)]
async fn list_users<R: UserRepository + 'static>(
    req: HttpRequest,
    service: web::Data<UserService<R>>,
) -> Result<HttpResponse, DomainError> {
    let users: Vec<UserResponse> = service
        .list_users()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    info!(request_id = %request_id(&req), count = users.len(), "users retrieved");

    Ok(HttpResponse::Ok().json(users))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User after the update", body = UserResponse),
        (status = 400, description = "Invalid input or age out of range", body = ErrorBody),
        (status = 404, description = "No such user", body = ErrorBody),
        (status = 409, description = "Email already in use", body = ErrorBody)
    )
)]
async fn update_user<R: UserRepository + 'static>(
    req: HttpRequest,
    service: web::Data<UserService<R>>,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, DomainError> {
    let user_id = path.into_inner();
    let user = service
        .update_user(user_id, payload.into_inner().into())
        .await?;

    info!(request_id = %request_id(&req), user_id = %user_id, "user update handled");

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "No such user", body = ErrorBody)
    )
)]
async fn delete_user<R: UserRepository + 'static>(
    req: HttpRequest,
    service: web::Data<UserService<R>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let user_id = path.into_inner();
    service.delete_user(user_id).await?;

    info!(request_id = %request_id(&req), user_id = %user_id, "user deleted");

    Ok(HttpResponse::NoContent().finish())
}
