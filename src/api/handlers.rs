//! Request handlers for the workflow routes.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use mockable::Clock;
use serde::Deserialize;
use serde_json::{Value, json};

use super::error::ApiError;
use super::extract::{ApiJson, ApiPath};
use super::views::{ApplicationView, AuditEntryView, RulesView, StatusCountView};
use super::WorkflowApi;
use crate::workflow::{
    domain::{ApplicationId, CustomerId, Role, UserId, WorkflowAction},
    ports::{ApplicationRepository, AuditLog, UserDirectory},
    services::{ApplyActionRequest, SubmitApplicationRequest},
};

type ApiState<R, D, C> = State<Arc<WorkflowApi<R, D, C>>>;
type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitBody {
    user_id: UserId,
    customer_id: CustomerId,
    amount: u64,
    purpose: String,
    #[serde(default)]
    term_months: Option<u16>,
    #[serde(default)]
    rate_bps: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActorBody {
    user_id: UserId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActionBody {
    user_id: UserId,
    action: WorkflowAction,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    expected_version: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForceReleaseBody {
    user_id: UserId,
    #[serde(default)]
    comment: Option<String>,
}

pub(crate) async fn submit<R, D, C>(
    State(api): ApiState<R, D, C>,
    ApiJson(body): ApiJson<SubmitBody>,
) -> Result<(StatusCode, Json<ApplicationView>), ApiError>
where
    R: ApplicationRepository + AuditLog + 'static,
    D: UserDirectory + 'static,
    C: Clock + Send + Sync + 'static,
{
    let mut request =
        SubmitApplicationRequest::new(body.user_id, body.customer_id, body.amount, body.purpose);
    if let Some(term_months) = body.term_months {
        request = request.with_term_months(term_months);
    }
    if let Some(rate_bps) = body.rate_bps {
        request = request.with_rate_bps(rate_bps);
    }
    let application = api.workflow.submit_application(request).await?;
    Ok((StatusCode::CREATED, Json(ApplicationView::from(&application))))
}

pub(crate) async fn get_application<R, D, C>(
    State(api): ApiState<R, D, C>,
    ApiPath(id): ApiPath<ApplicationId>,
) -> ApiResult<ApplicationView>
where
    R: ApplicationRepository + AuditLog + 'static,
    D: UserDirectory + 'static,
    C: Clock + Send + Sync + 'static,
{
    let application = api.queries.get(id).await?;
    Ok(Json(ApplicationView::from(&application)))
}

pub(crate) async fn take<R, D, C>(
    State(api): ApiState<R, D, C>,
    ApiPath(id): ApiPath<ApplicationId>,
    ApiJson(body): ApiJson<ActorBody>,
) -> ApiResult<ApplicationView>
where
    R: ApplicationRepository + AuditLog + 'static,
    D: UserDirectory + 'static,
    C: Clock + Send + Sync + 'static,
{
    let application = api.workflow.take(id, body.user_id).await?;
    Ok(Json(ApplicationView::from(&application)))
}

pub(crate) async fn apply<R, D, C>(
    State(api): ApiState<R, D, C>,
    ApiPath(id): ApiPath<ApplicationId>,
    ApiJson(body): ApiJson<ActionBody>,
) -> ApiResult<ApplicationView>
where
    R: ApplicationRepository + AuditLog + 'static,
    D: UserDirectory + 'static,
    C: Clock + Send + Sync + 'static,
{
    let mut request = ApplyActionRequest::new(id, body.user_id, body.action);
    if let Some(comment) = body.comment {
        request = request.with_comment(comment);
    }
    if let Some(version) = body.expected_version {
        request = request.with_expected_version(version);
    }
    let application = api.workflow.apply(request).await?;
    Ok(Json(ApplicationView::from(&application)))
}

pub(crate) async fn release<R, D, C>(
    State(api): ApiState<R, D, C>,
    ApiPath(id): ApiPath<ApplicationId>,
    ApiJson(body): ApiJson<ActorBody>,
) -> ApiResult<ApplicationView>
where
    R: ApplicationRepository + AuditLog + 'static,
    D: UserDirectory + 'static,
    C: Clock + Send + Sync + 'static,
{
    let application = api.workflow.release(id, body.user_id).await?;
    Ok(Json(ApplicationView::from(&application)))
}

pub(crate) async fn force_release<R, D, C>(
    State(api): ApiState<R, D, C>,
    ApiPath(id): ApiPath<ApplicationId>,
    ApiJson(body): ApiJson<ForceReleaseBody>,
) -> ApiResult<ApplicationView>
where
    R: ApplicationRepository + AuditLog + 'static,
    D: UserDirectory + 'static,
    C: Clock + Send + Sync + 'static,
{
    let application = api
        .workflow
        .force_release(id, body.user_id, body.comment)
        .await?;
    Ok(Json(ApplicationView::from(&application)))
}

pub(crate) async fn history<R, D, C>(
    State(api): ApiState<R, D, C>,
    ApiPath(id): ApiPath<ApplicationId>,
) -> ApiResult<Vec<AuditEntryView>>
where
    R: ApplicationRepository + AuditLog + 'static,
    D: UserDirectory + 'static,
    C: Clock + Send + Sync + 'static,
{
    let entries = api.queries.history(id).await?;
    Ok(Json(entries.iter().map(AuditEntryView::from).collect()))
}

pub(crate) async fn queue<R, D, C>(
    State(api): ApiState<R, D, C>,
    ApiPath(role): ApiPath<String>,
) -> ApiResult<Vec<ApplicationView>>
where
    R: ApplicationRepository + AuditLog + 'static,
    D: UserDirectory + 'static,
    C: Clock + Send + Sync + 'static,
{
    let parsed =
        Role::try_from(role.as_str()).map_err(|err| ApiError::BadRequest(err.to_string()))?;
    let applications = api.queries.available_to_take(parsed).await?;
    Ok(Json(applications.iter().map(ApplicationView::from).collect()))
}

pub(crate) async fn my_tasks<R, D, C>(
    State(api): ApiState<R, D, C>,
    ApiPath(user_id): ApiPath<UserId>,
) -> ApiResult<Vec<ApplicationView>>
where
    R: ApplicationRepository + AuditLog + 'static,
    D: UserDirectory + 'static,
    C: Clock + Send + Sync + 'static,
{
    let applications = api.queries.my_tasks(user_id).await?;
    Ok(Json(applications.iter().map(ApplicationView::from).collect()))
}

pub(crate) async fn status_counts<R, D, C>(
    State(api): ApiState<R, D, C>,
) -> ApiResult<Vec<StatusCountView>>
where
    R: ApplicationRepository + AuditLog + 'static,
    D: UserDirectory + 'static,
    C: Clock + Send + Sync + 'static,
{
    let counts = api.queries.status_counts().await?;
    Ok(Json(
        counts
            .into_iter()
            .map(|(status, count)| StatusCountView {
                status,
                label: status.label(),
                count,
            })
            .collect(),
    ))
}

pub(crate) fn rules() -> std::future::Ready<Json<RulesView>> {
    std::future::ready(Json(RulesView::current()))
}

pub(crate) fn health() -> std::future::Ready<Json<Value>> {
    std::future::ready(Json(json!({ "status": "ok" })))
}
