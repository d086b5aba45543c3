use std::{collections::HashMap, convert::Infallible, net::SocketAddr, path::Path, sync::Arc};

use axum::{
    async_trait,
    extract::{FromRequestParts, Path as UrlPath, Query, State},
    http::{header, request::Parts, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
    routing::{get, MethodRouter},
    Form, Json, Router,
};
use serde::Deserialize;
use server_api::{
    handle_page_post, manager_list, mark_processed, render_page,
    session::{decode_session, SessionConfig, SESSION_COOKIE},
    ApiContext, PostOutcome,
};
use shared::{
    domain::{LeadId, RequestContext},
    error::{ApiError, ErrorCode},
    protocol::{LoginView, Page, PageView, LOGIN_TEMPLATE},
};
use storage::Storage;
use tower_http::{limit::RequestBodyLimitLayer, services::ServeDir};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, prepare_database_url};

const MAX_BODY_BYTES: usize = 64 * 1024;
const MANAGER_PATH: &str = "/manager/";
const LOGIN_PATH: &str = "/login/";

struct AppState {
    api: ApiContext,
    session: SessionConfig,
}

type HttpError = (StatusCode, Json<ApiError>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();

    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext { storage },
        session: SessionConfig {
            secret: settings.session_secret.clone(),
            ttl_seconds: settings.session_ttl_seconds,
        },
    };
    if settings.debug {
        info!(media_root = %settings.media_root.display(), "serving media files");
    }
    let media_root = settings.debug.then_some(settings.media_root.as_path());
    let app = build_router(Arc::new(state), media_root);

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, media_root: Option<&Path>) -> Router {
    let mut router = Page::ALL
        .into_iter()
        .fold(Router::new(), |router, page| {
            router.route(page.path(), page_route(page))
        })
        .route("/healthz", get(healthz))
        .route(MANAGER_PATH, get(http_manager_list))
        .route(
            "/manager/:lead_id/processed",
            get(http_mark_processed).post(http_mark_processed),
        )
        .route(LOGIN_PATH, get(login))
        .route("/logout/", get(logout));

    if let Some(root) = media_root {
        router = router.nest_service("/media", ServeDir::new(root));
    }

    router
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

/// Who is asking: the signed-in user named by the session token, or an
/// anonymous visitor when there is no usable token.
struct Visitor(RequestContext);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Visitor {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve_visitor(state, &parts.headers).await))
    }
}

async fn resolve_visitor(state: &AppState, headers: &HeaderMap) -> RequestContext {
    let Some(token) = session_token(headers) else {
        return RequestContext::anonymous();
    };
    let Some(user_id) = decode_session(&state.session, token) else {
        return RequestContext::anonymous();
    };
    match state.api.storage.load_actor(user_id).await {
        Ok(Some(actor)) => RequestContext::for_actor(actor),
        Ok(None) => RequestContext::anonymous(),
        Err(error) => {
            warn!(user_id = user_id.0, %error, "failed to load session user");
            RequestContext::anonymous()
        }
    }
}

/// Bearer token first, then the session cookie.
fn session_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value)
}

fn page_route(page: Page) -> MethodRouter<Arc<AppState>> {
    get(move |state: State<Arc<AppState>>, visitor: Visitor| show_page(state, visitor, page)).post(
        move |state: State<Arc<AppState>>,
              visitor: Visitor,
              form: Form<HashMap<String, String>>| submit_page(state, visitor, page, form),
    )
}

async fn show_page(
    State(state): State<Arc<AppState>>,
    Visitor(request): Visitor,
    page: Page,
) -> Result<Response, HttpError> {
    let view = render_page(&state.api, &request, page)
        .await
        .map_err(http_error)?;
    Ok(Json(view).into_response())
}

async fn submit_page(
    State(state): State<Arc<AppState>>,
    Visitor(request): Visitor,
    page: Page,
    Form(input): Form<HashMap<String, String>>,
) -> Result<Response, HttpError> {
    match handle_page_post(&state.api, &request, page, &input)
        .await
        .map_err(http_error)?
    {
        PostOutcome::Redirect(to) => Ok(Redirect::to(to).into_response()),
        PostOutcome::Render(view) => Ok(Json(view).into_response()),
    }
}

async fn healthz(State(state): State<Arc<AppState>>) -> Result<&'static str, HttpError> {
    state.api.storage.health_check().await.map_err(|e| {
        error!(error = %e, "health check failed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::internal(format!("{e:#}"))),
        )
    })?;
    Ok("ok")
}

async fn http_manager_list(
    State(state): State<Arc<AppState>>,
    Visitor(request): Visitor,
    uri: Uri,
) -> Result<Response, HttpError> {
    match manager_list(&state.api, &request).await {
        Ok(view) => Ok(Json(view).into_response()),
        Err(err) => manager_denied(err, &uri),
    }
}

async fn http_mark_processed(
    State(state): State<Arc<AppState>>,
    Visitor(request): Visitor,
    UrlPath(lead_id): UrlPath<i64>,
    uri: Uri,
) -> Result<Response, HttpError> {
    match mark_processed(&state.api, &request, LeadId(lead_id)).await {
        Ok(_) => Ok(Redirect::to(MANAGER_PATH).into_response()),
        Err(err) => manager_denied(err, &uri),
    }
}

/// Sends visitors without the manager role to the login page instead of
/// failing hard.
fn manager_denied(err: ApiError, uri: &Uri) -> Result<Response, HttpError> {
    match err.code {
        ErrorCode::Unauthorized | ErrorCode::Forbidden => {
            Ok(Redirect::to(&login_redirect(uri.path())).into_response())
        }
        _ => Err(http_error(err)),
    }
}

fn login_redirect(next: &str) -> String {
    let next: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
    format!("{LOGIN_PATH}?next={next}")
}

#[derive(Debug, Deserialize)]
struct LoginQuery {
    next: Option<String>,
}

async fn login(Query(query): Query<LoginQuery>) -> Json<PageView<LoginView>> {
    Json(PageView {
        template: LOGIN_TEMPLATE,
        context: LoginView {
            next: query.next.unwrap_or_else(|| Page::Index.path().to_string()),
        },
    })
}

async fn logout() -> impl IntoResponse {
    (
        [(
            header::SET_COOKIE,
            format!("{SESSION_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax"),
        )],
        Redirect::to(Page::Index.path()),
    )
}

fn http_error(err: ApiError) -> HttpError {
    let status = match err.code {
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Configuration | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(err))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
