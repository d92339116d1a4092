//! Segment ordering within a show.
//!
//! Positions are scoped per show and kept dense: after any create, move, or
//! delete, a show's segments sit at exactly 1..n in order. Each operation
//! runs inside one transaction; concurrent reorders of the same show are
//! last-writer-wins.

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::segments::{CreateSegmentRequest, RepositionSegmentRequest, SegmentList, UpdateSegmentRequest},
    entity::{
        guests::Column as GuestCol,
        segment_guests::{ActiveModel as SegmentGuestActive, Column as SegmentGuestCol},
        segments::{ActiveModel as SegmentActive, Column as SegmentCol, Model as SegmentModel},
        Guests, SegmentGuests, Segments, Shows,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Segment,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_show_segments(
    state: &AppState,
    show_id: Uuid,
) -> AppResult<ApiResponse<SegmentList>> {
    let show = Shows::find_by_id(show_id).one(&state.orm).await?;
    if show.is_none() {
        return Err(AppError::NotFound);
    }

    let items = Segments::find()
        .filter(SegmentCol::ShowId.eq(show_id))
        .order_by_asc(SegmentCol::Position)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(segment_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Segments",
        SegmentList { items },
        Some(Meta::empty()),
    ))
}

/// Append a segment at the end of its show. Any client-supplied position is
/// ignored; the new position is the show's current max plus one.
pub async fn create_segment(
    state: &AppState,
    actor: &AuthUser,
    payload: CreateSegmentRequest,
) -> AppResult<ApiResponse<Segment>> {
    let txn = state.orm.begin().await?;

    let show = Shows::find_by_id(payload.show_id).one(&txn).await?;
    if show.is_none() {
        return Err(AppError::NotFound);
    }

    let last = Segments::find()
        .filter(SegmentCol::ShowId.eq(payload.show_id))
        .order_by_desc(SegmentCol::Position)
        .one(&txn)
        .await?;
    let position = last.map(|s| s.position + 1).unwrap_or(1);

    let now = Utc::now();
    let segment = SegmentActive {
        id: Set(Uuid::new_v4()),
        show_id: Set(payload.show_id),
        title: Set(payload.title),
        notes: Set(payload.notes),
        duration_seconds: Set(payload.duration_seconds),
        position: Set(position),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(actor.user_id),
        "segment_create",
        Some("segments"),
        Some(segment.id),
        Some(serde_json::json!({ "show_id": segment.show_id, "position": segment.position })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Segment created",
        segment_from_entity(segment),
        Some(Meta::empty()),
    ))
}

pub async fn update_segment(
    state: &AppState,
    actor: &AuthUser,
    id: Uuid,
    payload: UpdateSegmentRequest,
) -> AppResult<ApiResponse<Segment>> {
    let existing = Segments::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: SegmentActive = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(notes) = payload.notes {
        active.notes = Set(Some(notes));
    }
    if let Some(duration) = payload.duration_seconds {
        active.duration_seconds = Set(Some(duration));
    }
    active.updated_at = Set(Utc::now().into());
    let segment = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(actor.user_id),
        "segment_update",
        Some("segments"),
        Some(segment.id),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Segment updated",
        segment_from_entity(segment),
        Some(Meta::empty()),
    ))
}

/// Move a segment to `position` within its show, clamped to [1, n], and
/// rewrite the show's positions to stay dense.
pub async fn reposition_segment(
    state: &AppState,
    actor: &AuthUser,
    id: Uuid,
    payload: RepositionSegmentRequest,
) -> AppResult<ApiResponse<Segment>> {
    let txn = state.orm.begin().await?;

    let segment = Segments::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let show_id = segment.show_id;

    let siblings = Segments::find()
        .filter(SegmentCol::ShowId.eq(show_id))
        .order_by_asc(SegmentCol::Position)
        .all(&txn)
        .await?;

    let target = payload.position.clamp(1, siblings.len() as i32);
    if target == segment.position {
        txn.commit().await?;
        return Ok(ApiResponse::success(
            "Segment position unchanged",
            segment_from_entity(segment),
            Some(Meta::empty()),
        ));
    }

    let mut ordered: Vec<SegmentModel> = siblings;
    let current_idx = ordered
        .iter()
        .position(|s| s.id == id)
        .ok_or(AppError::NotFound)?;
    let moved = ordered.remove(current_idx);
    ordered.insert((target - 1) as usize, moved);

    renumber(&txn, ordered).await?;
    txn.commit().await?;

    let updated = Segments::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(actor.user_id),
        "segment_reposition",
        Some("segments"),
        Some(id),
        Some(serde_json::json!({ "show_id": show_id, "position": updated.position })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Segment repositioned",
        segment_from_entity(updated),
        Some(Meta::empty()),
    ))
}

/// Hard delete, then close the gap so the survivors sit at 1..n again.
pub async fn delete_segment(
    state: &AppState,
    actor: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;

    let segment = Segments::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let show_id = segment.show_id;

    Segments::delete_by_id(id).exec(&txn).await?;

    let remaining = Segments::find()
        .filter(SegmentCol::ShowId.eq(show_id))
        .order_by_asc(SegmentCol::Position)
        .all(&txn)
        .await?;
    renumber(&txn, remaining).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(actor.user_id),
        "segment_delete",
        Some("segments"),
        Some(id),
        Some(serde_json::json!({ "show_id": show_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Segment deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Attach a guest to a segment. Idempotent; soft-deleted guests read as
/// missing.
pub async fn attach_guest(
    state: &AppState,
    actor: &AuthUser,
    segment_id: Uuid,
    guest_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let segment = Segments::find_by_id(segment_id).one(&state.orm).await?;
    if segment.is_none() {
        return Err(AppError::NotFound);
    }
    let guest = Guests::find_by_id(guest_id)
        .filter(GuestCol::IsDeleted.eq(false))
        .one(&state.orm)
        .await?;
    if guest.is_none() {
        return Err(AppError::NotFound);
    }

    let link = SegmentGuests::find()
        .filter(SegmentGuestCol::SegmentId.eq(segment_id))
        .filter(SegmentGuestCol::GuestId.eq(guest_id))
        .one(&state.orm)
        .await?;
    if link.is_none() {
        SegmentGuestActive {
            segment_id: Set(segment_id),
            guest_id: Set(guest_id),
        }
        .insert(&state.orm)
        .await?;
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(actor.user_id),
        "segment_guest_attach",
        Some("segment_guests"),
        Some(segment_id),
        Some(serde_json::json!({ "guest_id": guest_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Guest attached",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn detach_guest(
    state: &AppState,
    actor: &AuthUser,
    segment_id: Uuid,
    guest_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = SegmentGuests::delete_many()
        .filter(SegmentGuestCol::SegmentId.eq(segment_id))
        .filter(SegmentGuestCol::GuestId.eq(guest_id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(actor.user_id),
        "segment_guest_detach",
        Some("segment_guests"),
        Some(segment_id),
        Some(serde_json::json!({ "guest_id": guest_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Guest detached",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Write positions 1..n over `ordered`, skipping rows already in place.
async fn renumber<C: ConnectionTrait>(conn: &C, ordered: Vec<SegmentModel>) -> AppResult<()> {
    for (index, model) in ordered.into_iter().enumerate() {
        let wanted = (index + 1) as i32;
        if model.position == wanted {
            continue;
        }
        let mut active: SegmentActive = model.into();
        active.position = Set(wanted);
        active.updated_at = Set(Utc::now().into());
        active.update(conn).await?;
    }
    Ok(())
}

fn segment_from_entity(model: SegmentModel) -> Segment {
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
