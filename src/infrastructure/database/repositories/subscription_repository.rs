//! SeaORM implementation of SubscriptionRepository

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::debug;
use uuid::Uuid;

use crate::domain::subscription::{
    CostQuery, Subscription, SubscriptionDraft, SubscriptionRepository, LIST_PAGE_SIZE,
};
use crate::domain::{DomainError, DomainResult, Month};
use crate::infrastructure::database::entities::subscription;

pub struct SeaOrmSubscriptionRepository {
    db: DatabaseConnection,
}

impl SeaOrmSubscriptionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: subscription::Model) -> Subscription {
    Subscription {
        id: m.id,
        service_name: m.service_name,
        price: m.price,
        user_id: m.user_id,
        start_month: Month::from_date(m.start_month),
        end_month: m.end_month.map(Month::from_date),
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Storage(format!("Database error: {}", e))
}

// ── SubscriptionRepository impl ─────────────────────────────────

#[async_trait]
impl SubscriptionRepository for SeaOrmSubscriptionRepository {
    async fn create(&self, draft: SubscriptionDraft) -> DomainResult<Uuid> {
        let id = Uuid::new_v4();
        debug!("Saving subscription: {}", id);

        let model = subscription::ActiveModel {
            id: Set(id),
            service_name: Set(draft.service_name().to_string()),
            price: Set(draft.price()),
            user_id: Set(draft.user_id()),
            start_month: Set(draft.start_month().first_day()),
            end_month: Set(draft.end_month().map(|m| m.first_day())),
        };
        model.insert(&self.db).await.map_err(db_err)?;
        Ok(id)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Subscription> {
        subscription::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .ok_or_else(|| DomainError::subscription_not_found(id))
    }

    async fn update(&self, id: Uuid, draft: SubscriptionDraft) -> DomainResult<()> {
        debug!("Updating subscription: {}", id);

        // One conditional statement: the affected-row count is the existence check.
        let result = subscription::Entity::update_many()
            .col_expr(
                subscription::Column::ServiceName,
                Expr::value(draft.service_name().to_string()),
            )
            .col_expr(subscription::Column::Price, Expr::value(draft.price()))
            .col_expr(subscription::Column::UserId, Expr::value(draft.user_id()))
            .col_expr(
                subscription::Column::StartMonth,
                Expr::value(draft.start_month().first_day()),
            )
            .col_expr(
                subscription::Column::EndMonth,
                Expr::value(draft.end_month().map(|m| m.first_day())),
            )
            .filter(subscription::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::subscription_not_found(id));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        debug!("Deleting subscription: {}", id);

        let result = subscription::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::subscription_not_found(id));
        }
        Ok(())
    }

    async fn list_before(&self, cutoff: Month) -> DomainResult<Vec<Subscription>> {
        let models = subscription::Entity::find()
            .filter(subscription::Column::StartMonth.lt(cutoff.first_day()))
            .order_by_desc(subscription::Column::StartMonth)
            .limit(LIST_PAGE_SIZE)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_overlapping(&self, query: &CostQuery) -> DomainResult<Vec<Subscription>> {
        let models = subscription::Entity::find()
            .filter(subscription::Column::UserId.eq(query.user_id))
            .filter(subscription::Column::ServiceName.eq(query.service_name.as_str()))
            .filter(subscription::Column::StartMonth.lte(query.range.end().first_day()))
            .filter(
                Condition::any()
                    .add(subscription::Column::EndMonth.is_null())
                    .add(subscription::Column::EndMonth.gte(query.range.start().first_day())),
            )
            .order_by_asc(subscription::Column::StartMonth)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }
}
