use chrono::NaiveDate;
use sea_orm::{entity::prelude::*, ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors;

pub const MAX_TEXT_LEN: usize = 255;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscriptions")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub service_name: String,
    pub user_id: String,
    pub price: f64,
    pub start_date: NaiveDate,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { panic!("no relations defined here") }
}

impl ActiveModelBehavior for ActiveModel {}

fn validate_text(field: &str, value: &str) -> Result<(), errors::ModelError> {
    if value.trim().is_empty() {
        return Err(errors::ModelError::Validation(format!("{field} required")));
    }
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(errors::ModelError::Validation(format!("{field} longer than {MAX_TEXT_LEN} characters")));
    }
    Ok(())
}

pub fn validate_service_name(name: &str) -> Result<(), errors::ModelError> {
    validate_text("serviceName", name)
}

pub fn validate_user_id(user_id: &str) -> Result<(), errors::ModelError> {
    validate_text("userId", user_id)
}

pub fn validate_price(price: f64) -> Result<(), errors::ModelError> {
    if !price.is_finite() || price < 0.0 {
        return Err(errors::ModelError::Validation("price must be a non-negative number".into()));
    }
    Ok(())
}

pub async fn create(
    db: &DatabaseConnection,
    service_name: &str,
    user_id: &str,
    price: f64,
    start_date: NaiveDate,
) -> Result<Model, errors::ModelError> {
    validate_service_name(service_name)?;
    validate_user_id(user_id)?;
    validate_price(price)?;

    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        service_name: Set(service_name.to_string()),
        user_id: Set(user_id.to_string()),
        price: Set(price),
        start_date: Set(start_date),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Overwrite every mutable column of an existing row.
pub async fn update(
    db: &DatabaseConnection,
    id: Uuid,
    service_name: &str,
    user_id: &str,
    price: f64,
    start_date: NaiveDate,
) -> Result<Model, errors::ModelError> {
    validate_service_name(service_name)?;
    validate_user_id(user_id)?;
    validate_price(price)?;

    let mut found: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(errors::ModelError::NotFound("subscription"))?
        .into();
    found.service_name = Set(service_name.to_string());
    found.user_id = Set(user_id.to_string());
    found.price = Set(price);
    found.start_date = Set(start_date);
    found.update(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
