use std::collections::HashMap;

use shared::{
    domain::{Actor, LeadId, LeadKind, RequestContext},
    error::{ApiError, ErrorCode},
    forms::{likely_intended, validate_submission, FormErrors},
    protocol::{FormState, ManagerView, Page, PageContext, PageView, MANAGER_TEMPLATE},
};
use storage::{MarkOutcome, SingletonError, Storage};
use tracing::{error, info};

pub mod session;

/// How many team members the pages show.
pub const TEAM_PREVIEW_LIMIT: u32 = 3;
/// How many classes and gallery images are picked at random per request.
pub const RANDOM_SAMPLE_LIMIT: u32 = 6;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

/// Result of running a form post through the validators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Matched { kind: LeadKind, lead_id: LeadId },
    NoMatch(FormErrors),
}

/// What a page should answer to a POST.
#[derive(Debug)]
pub enum PostOutcome {
    /// A lead was stored; send the visitor to this path.
    Redirect(&'static str),
    /// Nothing was stored; show the page again with the rejected form.
    Render(PageView<PageContext>),
}

/// Assembles the read model every public page renders from. Nothing is
/// cached: each call reflects the current database state.
pub async fn build_page_context(
    ctx: &ApiContext,
    request: &RequestContext,
) -> Result<PageContext, ApiError> {
    let storage = &ctx.storage;
    Ok(PageContext {
        user_auth: request.is_authenticated(),
        user_manager: request.is_manager(),
        slider: storage.list_visible_slides().await.map_err(storage_error)?,
        team: storage
            .list_team(TEAM_PREVIEW_LIMIT)
            .await
            .map_err(storage_error)?,
        testimonial: storage
            .list_visible_testimonials()
            .await
            .map_err(storage_error)?,
        classes: storage
            .sample_classes(RANDOM_SAMPLE_LIMIT)
            .await
            .map_err(storage_error)?,
        gallery: storage
            .sample_gallery(RANDOM_SAMPLE_LIMIT)
            .await
            .map_err(storage_error)?,
        about: storage.about().await.map_err(storage_error)?,
        facilities: storage.facilities().await.map_err(storage_error)?,
        call: storage.call().await.map_err(storage_error)?,
        contacts: storage.contacts().await.map_err(storage_error)?,
        schedule: storage.schedule().await.map_err(storage_error)?,
        headlines: storage.headlines().await.map_err(storage_error)?,
        make_appointment: FormState::blank(LeadKind::Appointment),
        subscription: FormState::blank(LeadKind::Subscription),
        contact_us: FormState::blank(LeadKind::ContactUs),
    })
}

pub async fn render_page(
    ctx: &ApiContext,
    request: &RequestContext,
    page: Page,
) -> Result<PageView<PageContext>, ApiError> {
    Ok(PageView {
        template: page.template(),
        context: build_page_context(ctx, request).await?,
    })
}

/// Validates a form post and stores the first form it satisfies.
pub async fn submit_lead(
    ctx: &ApiContext,
    input: &HashMap<String, String>,
) -> Result<SubmissionOutcome, ApiError> {
    let lead = match validate_submission(input) {
        Ok(lead) => lead,
        Err(errors) => return Ok(SubmissionOutcome::NoMatch(errors)),
    };
    let kind = lead.kind();
    let lead_id = ctx
        .storage
        .insert_lead(&lead)
        .await
        .map_err(storage_error)?;
    info!(?kind, lead_id = lead_id.0, "stored lead submission");
    Ok(SubmissionOutcome::Matched { kind, lead_id })
}

/// POST handling shared by every public page.
pub async fn handle_page_post(
    ctx: &ApiContext,
    request: &RequestContext,
    page: Page,
    input: &HashMap<String, String>,
) -> Result<PostOutcome, ApiError> {
    match submit_lead(ctx, input).await? {
        SubmissionOutcome::Matched { .. } => Ok(PostOutcome::Redirect(Page::Index.path())),
        SubmissionOutcome::NoMatch(errors) => {
            let mut view = render_page(ctx, request, page).await?;
            if let Some(kind) = likely_intended(input) {
                *view.context.form_mut(kind) =
                    FormState::rejected(kind, input, errors.for_kind(kind));
            }
            Ok(PostOutcome::Render(view))
        }
    }
}

/// Fails with `Unauthorized` for anonymous requests and `Forbidden` for
/// signed-in users outside the manager group.
pub fn ensure_manager(request: &RequestContext) -> Result<&Actor, ApiError> {
    let Some(actor) = request.actor.as_ref() else {
        return Err(ApiError::new(ErrorCode::Unauthorized, "sign in required"));
    };
    if !shared::domain::is_manager(actor) {
        return Err(ApiError::new(
            ErrorCode::Forbidden,
            "manager role required",
        ));
    }
    Ok(actor)
}

pub async fn manager_list(
    ctx: &ApiContext,
    request: &RequestContext,
) -> Result<PageView<ManagerView>, ApiError> {
    ensure_manager(request)?;
    let page = build_page_context(ctx, request).await?;
    let storage = &ctx.storage;
    Ok(PageView {
        template: MANAGER_TEMPLATE,
        context: ManagerView {
            page,
            subscriptions: storage
                .list_unprocessed_subscriptions()
                .await
                .map_err(internal)?,
            contact_requests: storage
                .list_unprocessed_contact_requests()
                .await
                .map_err(internal)?,
            appointments: storage
                .list_unprocessed_appointments()
                .await
                .map_err(internal)?,
        },
    })
}

/// Closes out the lead `lead_id`. Unknown and already processed ids are
/// accepted and leave the data unchanged.
pub async fn mark_processed(
    ctx: &ApiContext,
    request: &RequestContext,
    lead_id: LeadId,
) -> Result<MarkOutcome, ApiError> {
    let actor = ensure_manager(request)?;
    let outcome = ctx
        .storage
        .mark_lead_processed(lead_id)
        .await
        .map_err(internal)?;
    info!(
        lead_id = lead_id.0,
        user_id = actor.user_id.0,
        ?outcome,
        "manager marked lead"
    );
    Ok(outcome)
}

fn storage_error(err: anyhow::Error) -> ApiError {
    match err.downcast_ref::<SingletonError>() {
        Some(singleton) => {
            error!(%singleton, "site content is misconfigured");
            ApiError::configuration(singleton.to_string())
        }
        None => internal(err),
    }
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::internal(format!("{err:#}"))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
