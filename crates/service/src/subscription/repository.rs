use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, Statement};
use uuid::Uuid;

use models::subscription;

use super::domain::ValidSubscription;
use super::filter::{translate, FilterSpec, PredicateResult};
use crate::errors::ServiceError;

const LIST_PREFIX: &str = "SELECT id, service_name, price, user_id, start_date FROM subscriptions ";
const SUM_PREFIX: &str = "SELECT COALESCE(SUM(price), 0) AS total FROM subscriptions ";
const COUNT_PREFIX: &str = "SELECT COUNT(*) AS total FROM subscriptions ";

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn list(&self, filter: FilterSpec) -> Result<Vec<subscription::Model>, ServiceError>;
    /// Sum of `price` over the rows matching `filter`; 0 when none match.
    async fn sum_price(&self, filter: FilterSpec) -> Result<f64, ServiceError>;
    async fn count(&self, filter: FilterSpec) -> Result<i64, ServiceError>;
    async fn get(&self, id: Uuid) -> Result<Option<subscription::Model>, ServiceError>;
    async fn create(&self, input: ValidSubscription) -> Result<subscription::Model, ServiceError>;
    /// Fails with [`ServiceError::NotFound`] when `id` does not exist.
    async fn update(
        &self,
        id: Uuid,
        input: ValidSubscription,
    ) -> Result<subscription::Model, ServiceError>;
    /// Returns false when nothing was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError>;
}

fn statement(prefix: &str, predicate: PredicateResult) -> Statement {
    let sql = predicate.apply_to(prefix);
    Statement::from_sql_and_values(DbBackend::Postgres, sql, predicate.params)
}

/// SeaORM-backed repository implementation.
pub struct SeaOrmSubscriptionRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmSubscriptionRepository {
    async fn scalar_total<T: sea_orm::TryGetable>(
        &self,
        prefix: &str,
        filter: FilterSpec,
    ) -> Result<T, ServiceError> {
        let row = self
            .db
            .query_one(statement(prefix, translate(filter)))
            .await?
            .ok_or_else(|| ServiceError::Db("aggregate query returned no row".into()))?;
        Ok(row.try_get::<T>("", "total")?)
    }
}

#[async_trait]
impl SubscriptionRepository for SeaOrmSubscriptionRepository {
    async fn list(&self, filter: FilterSpec) -> Result<Vec<subscription::Model>, ServiceError> {
        let rows = subscription::Entity::find()
            .from_raw_sql(statement(LIST_PREFIX, translate(filter)))
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn sum_price(&self, filter: FilterSpec) -> Result<f64, ServiceError> {
        self.scalar_total::<f64>(SUM_PREFIX, filter).await
    }

    async fn count(&self, filter: FilterSpec) -> Result<i64, ServiceError> {
        self.scalar_total::<i64>(COUNT_PREFIX, filter).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<subscription::Model>, ServiceError> {
        Ok(subscription::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn create(&self, input: ValidSubscription) -> Result<subscription::Model, ServiceError> {
        let created = subscription::create(
            &self.db,
            &input.service_name,
            &input.user_id,
            input.price,
            input.start_date,
        )
        .await?;
        Ok(created)
    }

    async fn update(
        &self,
        id: Uuid,
        input: ValidSubscription,
    ) -> Result<subscription::Model, ServiceError> {
        let updated = subscription::update(
            &self.db,
            id,
            &input.service_name,
            &input.user_id,
            input.price,
            input.start_date,
        )
        .await?;
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        let res = subscription::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }
}

/// Simple in-memory mock repository for tests and doc examples.
/// Applies the same filter semantics as the SQL path.
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockSubscriptionRepository {
        rows: Mutex<Vec<subscription::Model>>,
    }

    impl MockSubscriptionRepository {
        pub fn with_rows(rows: Vec<subscription::Model>) -> Self {
            Self { rows: Mutex::new(rows) }
        }

        fn matching(&self, filter: &FilterSpec) -> Vec<subscription::Model> {
            let rows = self.rows.lock().unwrap();
            rows.iter().filter(|row| matches(filter, row)).cloned().collect()
        }
    }

    pub fn matches(filter: &FilterSpec, row: &subscription::Model) -> bool {
        filter.start_date_from.map_or(true, |d| row.start_date > d)
            && filter.start_date_to.map_or(true, |d| row.start_date < d)
            && filter.user_id.as_ref().map_or(true, |u| &row.user_id == u)
            && filter.service_name.as_ref().map_or(true, |s| &row.service_name == s)
    }

    #[async_trait]
    impl SubscriptionRepository for MockSubscriptionRepository {
        async fn list(&self, filter: FilterSpec) -> Result<Vec<subscription::Model>, ServiceError> {
            Ok(self.matching(&filter))
        }

        async fn sum_price(&self, filter: FilterSpec) -> Result<f64, ServiceError> {
            Ok(self.matching(&filter).iter().map(|r| r.price).sum())
        }

        async fn count(&self, filter: FilterSpec) -> Result<i64, ServiceError> {
            Ok(self.matching(&filter).len() as i64)
        }

        async fn get(&self, id: Uuid) -> Result<Option<subscription::Model>, ServiceError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().find(|r| r.id == id).cloned())
        }

        async fn create(
            &self,
            input: ValidSubscription,
        ) -> Result<subscription::Model, ServiceError> {
            let row = subscription::Model {
                id: Uuid::new_v4(),
                service_name: input.service_name,
                user_id: input.user_id,
                price: input.price,
                start_date: input.start_date,
            };
            self.rows.lock().unwrap().push(row.clone());
            Ok(row)
        }

        async fn update(
        &self,
        id: Uuid,
        input: ValidSubscription,
    ) -> Result<subscription::Model, ServiceError> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| ServiceError::not_found("subscription"))?;
            row.service_name = input.service_name;
            row.user_id = input.user_id;
            row.price = input.price;
            row.start_date = input.start_date;
            Ok(row.clone())
        }

        async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| r.id != id);
            Ok(rows.len() < before)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{db_tests_enabled, get_db};
    use chrono::NaiveDate;

    fn input(service: &str, user: &str, price: f64, start: NaiveDate) -> ValidSubscription {
        ValidSubscription {
            service_name: service.into(),
            user_id: user.into(),
            price,
            start_date: start,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn statement_carries_clause_and_values() {
        let filter = FilterSpec {
            service_name: Some("netflix".into()),
            ..Default::default()
        };
        let stmt = statement(LIST_PREFIX, translate(filter));
        assert_eq!(
            stmt.sql,
            "SELECT id, service_name, price, user_id, start_date FROM subscriptions WHERE service_name=$1"
        );
        assert_eq!(stmt.values.map(|v| v.0.len()), Some(1));
    }

    #[test]
    fn mock_matching_uses_strict_bounds() {
        let row = subscription::Model {
            id: Uuid::new_v4(),
            service_name: "svc".into(),
            user_id: "u1".into(),
            price: 1.0,
            start_date: date(2024, 1, 1),
        };
        assert!(mock::matches(&FilterSpec::default(), &row));
        let on_bound = FilterSpec { start_date_from: Some(date(2024, 1, 1)), ..Default::default() };
        assert!(!mock::matches(&on_bound, &row));
        let before = FilterSpec {
            start_date_to: Some(date(2024, 1, 2)),
            user_id: Some("u1".into()),
            ..Default::default()
        };
        assert!(mock::matches(&before, &row));
    }

    #[tokio::test]
    async fn seaorm_filtered_queries() -> Result<(), anyhow::Error> {
        if !db_tests_enabled() {
            return Ok(());
        }
        let db = get_db().await?;
        let repo = SeaOrmSubscriptionRepository { db };

        let user = format!("repo_user_{}", Uuid::new_v4());
        let a = repo.create(input("netflix", &user, 10.0, date(2023, 3, 1))).await?;
        let b = repo.create(input("spotify", &user, 5.5, date(2023, 6, 1))).await?;
        let c = repo.create(input("netflix", &user, 12.0, date(2024, 1, 1))).await?;

        let by_user = FilterSpec { user_id: Some(user.clone()), ..Default::default() };
        assert_eq!(repo.list(by_user.clone()).await?.len(), 3);
        assert_eq!(repo.count(by_user.clone()).await?, 3);
        assert_eq!(repo.sum_price(by_user.clone()).await?, 27.5);

        let in_2023 = FilterSpec {
            start_date_from: Some(date(2023, 1, 1)),
            start_date_to: Some(date(2023, 12, 31)),
            user_id: Some(user.clone()),
            ..Default::default()
        };
        let rows = repo.list(in_2023.clone()).await?;
        assert_eq!(rows.len(), 2);
        assert_eq!(repo.sum_price(in_2023).await?, 15.5);

        // upper bound followed by an equality condition
        let netflix_before_2024 = FilterSpec {
            start_date_to: Some(date(2024, 1, 1)),
            user_id: Some(user.clone()),
            service_name: Some("netflix".into()),
            ..Default::default()
        };
        let rows = repo.list(netflix_before_2024).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, a.id);

        let nobody = FilterSpec {
            user_id: Some(format!("nobody_{}", Uuid::new_v4())),
            ..Default::default()
        };
        assert_eq!(repo.sum_price(nobody.clone()).await?, 0.0);
        assert_eq!(repo.count(nobody).await?, 0);

        let updated = repo.update(b.id, input("spotify", &user, 6.0, date(2023, 6, 1))).await?;
        assert_eq!(updated.price, 6.0);

        for id in [a.id, b.id, c.id] {
            assert!(repo.delete(id).await?);
        }
        assert!(!repo.delete(a.id).await?);
        assert!(repo.get(a.id).await?.is_none());
        Ok(())
    }
}
