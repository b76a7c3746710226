use crate::db::connect;
use crate::subscription;
use crate::errors::ModelError;
use sea_orm::{DatabaseConnection, EntityTrait, QueryFilter, ColumnTrait};
use anyhow::Result;
use chrono::NaiveDate;
use migration::MigratorTrait;
use uuid::Uuid;

use super::db_tests_enabled;

/// Setup test database with migrations
async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = connect().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_subscription_crud() -> Result<()> {
    if !db_tests_enabled() {
        return Ok(());
    }

    let db = setup_test_db().await?;
    let user_id = format!("crud_user_{}", Uuid::new_v4());

    // Create
    let created = subscription::create(&db, "Yandex Plus", &user_id, 400.0, date(2025, 7, 1)).await?;
    assert_eq!(created.service_name, "Yandex Plus");
    assert_eq!(created.user_id, user_id);

    // Read
    let found = subscription::Entity::find_by_id(created.id).one(&db).await?;
    assert_eq!(found.as_ref(), Some(&created));

    let by_user = subscription::Entity::find()
        .filter(subscription::Column::UserId.eq(user_id.clone()))
        .all(&db)
        .await?;
    assert_eq!(by_user.len(), 1);

    // Update
    let updated = subscription::update(&db, created.id, "Kinopoisk", &user_id, 299.0, date(2025, 8, 1)).await?;
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.service_name, "Kinopoisk");
    assert_eq!(updated.price, 299.0);
    assert_eq!(updated.start_date, date(2025, 8, 1));

    // Delete
    let res = subscription::Entity::delete_by_id(created.id).exec(&db).await?;
    assert_eq!(res.rows_affected, 1);
    assert!(subscription::Entity::find_by_id(created.id).one(&db).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_update_missing_row_is_not_found() -> Result<()> {
    if !db_tests_enabled() {
        return Ok(());
    }

    let db = setup_test_db().await?;
    let err = subscription::update(&db, Uuid::new_v4(), "svc", "user", 1.0, date(2025, 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::NotFound("subscription")));
    Ok(())
}

#[tokio::test]
async fn test_create_rejects_invalid_input_before_touching_db() -> Result<()> {
    if !db_tests_enabled() {
        return Ok(());
    }

    let db = setup_test_db().await?;
    let err = subscription::create(&db, "", "user", 1.0, date(2025, 1, 1)).await.unwrap_err();
    assert!(matches!(err, ModelError::Validation(_)));
    let err = subscription::create(&db, "svc", "user", -5.0, date(2025, 1, 1)).await.unwrap_err();
    assert!(matches!(err, ModelError::Validation(_)));
    Ok(())
}
