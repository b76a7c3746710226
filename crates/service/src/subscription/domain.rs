use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// Calendar dates on the wire are ISO `YYYY-MM-DD`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| {
            ServiceError::Validation(format!(
                "{field} must be a date in YYYY-MM-DD format, got {raw:?}"
            ))
        })
}

/// Create/update request body.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionInput {
    pub service_name: String,
    pub user_id: String,
    pub price: f64,
    pub start_date: String,
}

/// A [`SubscriptionInput`] that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidSubscription {
    pub service_name: String,
    pub user_id: String,
    pub price: f64,
    pub start_date: NaiveDate,
}

impl SubscriptionInput {
    pub fn validate(&self) -> Result<ValidSubscription, ServiceError> {
        models::subscription::validate_service_name(&self.service_name)?;
        models::subscription::validate_user_id(&self.user_id)?;
        models::subscription::validate_price(self.price)?;
        let start_date = parse_date("startDate", &self.start_date)?;
        Ok(ValidSubscription {
            service_name: self.service_name.clone(),
            user_id: self.user_id.clone(),
            price: self.price,
            start_date,
        })
    }
}
