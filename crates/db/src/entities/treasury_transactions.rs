//! `SeaORM` Entity for treasury_transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "treasury_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub treasury_id: Uuid,
    pub branch_id: Uuid,
    pub transaction_type: String,
    pub category: String,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub balance_after: Decimal,
    pub reference_type: String,
    pub reference_id: Option<Uuid>,
    pub description: Option<String>,
    pub transaction_date: Date,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::treasury::Entity",
        from = "Column::TreasuryId",
        to = "super::treasury::Column::Id"
    )]
    Treasury,
}

impl Related<super::treasury::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Treasury.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
