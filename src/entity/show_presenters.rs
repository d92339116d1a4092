use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "show_presenters")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub show_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub presenter_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shows::Entity",
        from = "Column::ShowId",
        to = "super::shows::Column::Id"
    )]
    Shows,
    #[sea_orm(
        belongs_to = "super::presenters::Entity",
        from = "Column::PresenterId",
        to = "super::presenters::Column::Id"
    )]
    Presenters,
}

impl Related<super::shows::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shows.def()
    }
}

impl Related<super::presenters::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Presenters.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
