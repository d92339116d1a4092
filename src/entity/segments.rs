use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "segments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub show_id: Uuid,
    pub title: String,
    pub notes: Option<String>,
    pub duration_seconds: Option<i32>,
    pub position: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shows::Entity",
        from = "Column::ShowId",
        to = "super::shows::Column::Id"
    )]
    Shows,
    #[sea_orm(has_many = "super::segment_guests::Entity")]
    SegmentGuests,
}

impl Related<super::shows::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shows.def()
    }
}

impl Related<super::segment_guests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SegmentGuests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
