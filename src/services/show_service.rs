//! Shows are individual broadcasts, optionally attached to an emission
//! (series). Shows hard-delete; the database cascades segments and
//! presenter links.

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::shows::{CreateShowRequest, ShowList, ShowWithSegments, UpdateShowRequest},
    entity::{
        emissions::Column as EmissionCol,
        presenters::Column as PresenterCol,
        segments::Column as SegmentCol,
        show_presenters::{ActiveModel as ShowPresenterActive, Column as ShowPresenterCol},
        shows::{ActiveModel as ShowActive, Column as ShowCol, Model as ShowModel},
        Emissions, Presenters, Segments, ShowPresenters, Shows,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Segment, Show},
    response::{ApiResponse, Meta},
    routes::params::ShowListQuery,
    state::AppState,
};

pub async fn create_show(
    state: &AppState,
    actor: &AuthUser,
    payload: CreateShowRequest,
) -> AppResult<ApiResponse<Show>> {
    if let Some(emission_id) = payload.emission_id {
        let emission = Emissions::find_by_id(emission_id)
            .filter(EmissionCol::IsDeleted.eq(false))
            .one(&state.orm)
            .await?;
        if emission.is_none() {
            return Err(AppError::NotFound);
        }
    }

    let now = Utc::now();
    let show = ShowActive {
        id: Set(Uuid::new_v4()),
        emission_id: Set(payload.emission_id),
        title: Set(payload.title),
        status: Set(payload.status.unwrap_or_else(|| "preparation".to_string())),
        airs_at: Set(payload.airs_at.map(Into::into)),
        created_by: Set(Some(actor.user_id)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(actor.user_id),
        "show_create",
        Some("shows"),
        Some(show.id),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Show created",
        show_from_entity(show),
        Some(Meta::empty()),
    ))
}

pub async fn list_shows(
    state: &AppState,
    query: ShowListQuery,
) -> AppResult<ApiResponse<ShowList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(emission_id) = query.emission_id {
        condition = condition.add(ShowCol::EmissionId.eq(emission_id));
    }
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(ShowCol::Status.eq(status.clone()));
    }

    let finder = Shows::find()
        .filter(condition)
        .order_by_desc(ShowCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(show_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Shows", ShowList { items }, Some(meta)))
}

pub async fn get_show(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ShowWithSegments>> {
    let show = Shows::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let segments = Segments::find()
        .filter(SegmentCol::ShowId.eq(id))
        .order_by_asc(SegmentCol::Position)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(segment_from_entity)
        .collect();

    let data = ShowWithSegments {
        show: show_from_entity(show),
        segments,
    };
    Ok(ApiResponse::success("Show", data, Some(Meta::empty())))
}

/// Field-by-field merge; unsupplied fields stay as they are. Concurrent
/// updates are last-writer-wins.
pub async fn update_show(
    state: &AppState,
    actor: &AuthUser,
    id: Uuid,
    payload: UpdateShowRequest,
) -> AppResult<ApiResponse<Show>> {
    let existing = Shows::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(emission_id) = payload.emission_id {
        let emission = Emissions::find_by_id(emission_id)
            .filter(EmissionCol::IsDeleted.eq(false))
            .one(&state.orm)
            .await?;
        if emission.is_none() {
            return Err(AppError::NotFound);
        }
    }

    let mut active: ShowActive = existing.into();
    if let Some(emission_id) = payload.emission_id {
        active.emission_id = Set(Some(emission_id));
    }
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    if let Some(airs_at) = payload.airs_at {
        active.airs_at = Set(Some(airs_at.into()));
    }
    active.updated_at = Set(Utc::now().into());
    let show = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(actor.user_id),
        "show_update",
        Some("shows"),
        Some(show.id),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Show updated",
        show_from_entity(show),
        Some(Meta::empty()),
    ))
}

/// Hard delete. Segments and presenter links go with it via FK cascade.
pub async fn delete_show(
    state: &AppState,
    actor: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Shows::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(actor.user_id),
        "show_delete",
        Some("shows"),
        Some(id),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Show deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Link a presenter to a show. Idempotent; soft-deleted presenters read as
/// missing.
pub async fn add_presenter(
    state: &AppState,
    actor: &AuthUser,
    show_id: Uuid,
    presenter_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let show = Shows::find_by_id(show_id).one(&state.orm).await?;
    if show.is_none() {
        return Err(AppError::NotFound);
    }
    let presenter = Presenters::find_by_id(presenter_id)
        .filter(PresenterCol::IsDeleted.eq(false))
        .one(&state.orm)
        .await?;
    if presenter.is_none() {
        return Err(AppError::NotFound);
    }

    let link = ShowPresenters::find()
        .filter(ShowPresenterCol::ShowId.eq(show_id))
        .filter(ShowPresenterCol::PresenterId.eq(presenter_id))
        .one(&state.orm)
        .await?;
    if link.is_none() {
        ShowPresenterActive {
            show_id: Set(show_id),
            presenter_id: Set(presenter_id),
        }
        .insert(&state.orm)
        .await?;
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(actor.user_id),
        "show_presenter_add",
        Some("show_presenters"),
        Some(show_id),
        Some(serde_json::json!({ "presenter_id": presenter_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Presenter added",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn remove_presenter(
    state: &AppState,
    actor: &AuthUser,
    show_id: Uuid,
    presenter_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = ShowPresenters::delete_many()
        .filter(ShowPresenterCol::ShowId.eq(show_id))
        .filter(ShowPresenterCol::PresenterId.eq(presenter_id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(actor.user_id),
        "show_presenter_remove",
        Some("show_presenters"),
        Some(show_id),
        Some(serde_json::json!({ "presenter_id": presenter_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Presenter removed",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn show_from_entity(model: ShowModel) -> Show {
    Show {
        id: model.id,
        emission_id: model.emission_id,
        title: model.title,
        status: model.status,
        airs_at: model.airs_at.map(|dt| dt.with_timezone(&Utc)),
        created_by: model.created_by,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn segment_from_entity(model: crate::entity::segments::Model) -> Segment {
    Segment {
        id: model.id,
        show_id: model.show_id,
        title: model.title,
        notes: model.notes,
        duration_seconds: model.duration_seconds,
        position: model.position,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
