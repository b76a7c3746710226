//! Service layer for subscription records.
//! - Translates query filters into parameterized SQL predicates.
//! - Separates business rules from data access behind a repository trait.
//! - Reuses validation and entity definitions in the `models` crate.

pub mod errors;
pub mod subscription;
#[cfg(test)]
pub mod test_support;
