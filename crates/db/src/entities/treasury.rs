//! `SeaORM` Entity for treasury table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "treasury")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub branch_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub current_balance: Decimal,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::treasury_transactions::Entity")]
    TreasuryTransactions,
}

impl Related<super::treasury_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TreasuryTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
