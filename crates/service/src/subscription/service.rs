use std::sync::Arc;

use tracing::{error, info, Span};
use uuid::Uuid;

use models::subscription;

use super::domain::SubscriptionInput;
use super::filter::FilterSpec;
use super::repository::SubscriptionRepository;
use crate::errors::ServiceError;

/// Application service for subscriptions.
/// Validates input, delegates persistence to the repository and reports
/// mutations on the span it was constructed with.
pub struct SubscriptionService<R: SubscriptionRepository + ?Sized> {
    repo: Arc<R>,
    span: Span,
}

impl<R: SubscriptionRepository + ?Sized> SubscriptionService<R> {
    pub fn new(repo: Arc<R>, span: Span) -> Self { Self { repo, span } }

    pub async fn list(
        &self,
        filter: FilterSpec,
    ) -> Result<Vec<subscription::Model>, ServiceError> {
        self.repo.list(filter).await
    }

    /// Sum of prices of the matching subscriptions.
    pub async fn total_price(&self, filter: FilterSpec) -> Result<f64, ServiceError> {
        self.repo.sum_price(filter).await
    }

    pub async fn count(&self, filter: FilterSpec) -> Result<i64, ServiceError> {
        self.repo.count(filter).await
    }

    pub async fn get(&self, id: Uuid) -> Result<subscription::Model, ServiceError> {
        self.repo
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("subscription"))
    }

    /// Create a subscription.
    ///
    /// # Examples
    /// ```
    /// use service::subscription::{
    ///     domain::SubscriptionInput, repository::mock::MockSubscriptionRepository, SubscriptionService,
    /// };
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockSubscriptionRepository::default());
    /// let svc = SubscriptionService::new(repo, tracing::Span::none());
    /// let input = SubscriptionInput {
    ///     service_name: "Netflix".into(),
    ///     user_id: "u1".into(),
    ///     price: 9.99,
    ///     start_date: "2025-07-01".into(),
    /// };
    /// let row = tokio_test::block_on(svc.create(input)).unwrap();
    /// assert_eq!(row.service_name, "Netflix");
    /// ```
    pub async fn create(
        &self,
        input: SubscriptionInput,
    ) -> Result<subscription::Model, ServiceError> {
        let valid = input.validate()?;
        let service_name = valid.service_name.clone();
        match self.repo.create(valid).await {
            Ok(row) => {
                info!(
                    parent: &self.span,
                    id = %row.id,
                    user_id = %row.user_id,
                    service_name = %row.service_name,
                    "subscription_created"
                );
                Ok(row)
            }
            Err(e) => {
                error!(
                    parent: &self.span,
                    service_name = %service_name,
                    error = %e,
                    "subscription_create_failed"
                );
                Err(e)
            }
        }
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: SubscriptionInput,
    ) -> Result<subscription::Model, ServiceError> {
        let valid = input.validate()?;
        match self.repo.update(id, valid).await {
            Ok(row) => {
                info!(parent: &self.span, id = %row.id, "subscription_updated");
                Ok(row)
            }
            Err(e) => {
                error!(parent: &self.span, id = %id, error = %e, "subscription_update_failed");
                Err(e)
            }
        }
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        match self.repo.delete(id).await {
            Ok(true) => {
                info!(parent: &self.span, id = %id, "subscription_deleted");
                Ok(())
            }
            Ok(false) => Err(ServiceError::not_found("subscription")),
            Err(e) => {
                error!(parent: &self.span, id = %id, error = %e, "subscription_delete_failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::repository::mock::MockSubscriptionRepository;
    use chrono::NaiveDate;

    fn svc() -> SubscriptionService<MockSubscriptionRepository> {
        let repo = Arc::new(MockSubscriptionRepository::default());
        SubscriptionService::new(repo, tracing::info_span!("test"))
    }

    fn input(service: &str, user: &str, price: f64, start: &str) -> SubscriptionInput {
        SubscriptionInput {
            service_name: service.into(),
            user_id: user.into(),
            price,
            start_date: start.into(),
        }
    }

    #[tokio::test]
    async fn crud_roundtrip_through_service() {
        let svc = svc();
        let row = svc.create(input("Netflix", "u1", 9.99, "2025-07-01")).await.unwrap();
        assert_eq!(svc.get(row.id).await.unwrap(), row);

        let updated = svc.update(row.id, input("Netflix", "u1", 12.5, "2025-08-01")).await.unwrap();
        assert_eq!(updated.price, 12.5);
        assert_eq!(updated.start_date, NaiveDate::from_ymd_opt(2025, 8, 1).unwrap());

        svc.delete(row.id).await.unwrap();
        assert!(matches!(svc.get(row.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.delete(row.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_repository() {
        let svc = svc();
        let err = svc.create(input("", "u1", 1.0, "2025-07-01")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        let err = svc.create(input("Netflix", "u1", 1.0, "07/01/2025")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(svc.count(FilterSpec::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_of_missing_row_is_not_found() {
        let err = svc()
            .update(Uuid::new_v4(), input("Netflix", "u1", 1.0, "2025-07-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn aggregates_respect_filter() {
        let svc = svc();
        svc.create(input("Netflix", "u1", 10.0, "2023-03-01")).await.unwrap();
        svc.create(input("Spotify", "u1", 5.0, "2023-06-01")).await.unwrap();
        svc.create(input("Netflix", "u2", 7.0, "2024-02-01")).await.unwrap();

        assert_eq!(svc.total_price(FilterSpec::default()).await.unwrap(), 22.0);
        assert_eq!(svc.count(FilterSpec::default()).await.unwrap(), 3);

        let netflix = FilterSpec { service_name: Some("Netflix".into()), ..Default::default() };
        assert_eq!(svc.total_price(netflix.clone()).await.unwrap(), 17.0);
        assert_eq!(svc.list(netflix).await.unwrap().len(), 2);

        let u1_2023 = FilterSpec {
            start_date_from: NaiveDate::from_ymd_opt(2023, 1, 1),
            start_date_to: NaiveDate::from_ymd_opt(2024, 1, 1),
            user_id: Some("u1".into()),
            ..Default::default()
        };
        assert_eq!(svc.total_price(u1_2023).await.unwrap(), 15.0);
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn create_event_carries_fields_under_service_span() {
        let out = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(out.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let repo = Arc::new(MockSubscriptionRepository::default());
        let svc = SubscriptionService::new(repo, tracing::info_span!("subscriptions"));
        svc.create(input("Netflix", "u1", 9.99, "2025-07-01")).await.unwrap();

        let logged = String::from_utf8(out.0.lock().unwrap().clone()).unwrap();
        let line = logged
            .lines()
            .find(|l| l.contains("subscription_created"))
            .unwrap_or_else(|| panic!("no create event in {logged:?}"));
        assert!(line.contains("subscriptions"), "{line}");
        assert!(line.contains("service_name=Netflix"), "{line}");
        assert!(line.contains("user_id=u1"), "{line}");
    }
}
