//! Subscription module: domain types, filter translation, repository and service.

pub mod domain;
pub mod filter;
pub mod repository;
pub mod service;

pub use filter::{translate, FilterSpec, PredicateResult};
pub use service::SubscriptionService;
