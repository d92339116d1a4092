use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "shows")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub emission_id: Option<Uuid>,
    pub title: String,
    pub status: String,
    pub airs_at: Option<DateTimeWithTimeZone>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::emissions::Entity",
        from = "Column::EmissionId",
        to = "super::emissions::Column::Id"
    )]
    Emissions,
    #[sea_orm(has_many = "super::segments::Entity")]
    Segments,
    #[sea_orm(has_many = "super::show_presenters::Entity")]
    ShowPresenters,
}

impl Related<super::emissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Emissions.def()
    }
}

impl Related<super::segments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Segments.def()
    }
}

impl Related<super::show_presenters::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShowPresenters.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
