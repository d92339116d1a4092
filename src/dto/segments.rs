use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Segment;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSegmentRequest {
    pub show_id: Uuid,
    pub title: String,
    pub notes: Option<String>,
    pub duration_seconds: Option<i32>,
    /// Accepted for API compatibility but ignored: new segments always
    /// append at the end of the show.
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RepositionSegmentRequest {
    pub position: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSegmentRequest {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub duration_seconds: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SegmentList {
    pub items: Vec<Segment>,
}
