use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Segment, Show};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateShowRequest {
    pub emission_id: Option<Uuid>,
    pub title: String,
    pub status: Option<String>,
    pub airs_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateShowRequest {
    pub emission_id: Option<Uuid>,
    pub title: Option<String>,
    pub status: Option<String>,
    pub airs_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShowWithSegments {
    pub show: Show,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShowList {
    pub items: Vec<Show>,
}
