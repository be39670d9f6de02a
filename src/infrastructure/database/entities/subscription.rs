//! Subscription entity

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Subscription row. Months are stored as the first day of the month.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    /// Store-generated subscription ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Subscribed service (e.g., "Yandex Plus")
    pub service_name: String,

    /// Monthly price in smallest currency unit
    pub price: i64,

    /// Subscriber
    pub user_id: Uuid,

    /// First billed month
    pub start_month: NaiveDate,

    /// Last billed month (inclusive); NULL while open-ended
    pub end_month: Option<NaiveDate>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
