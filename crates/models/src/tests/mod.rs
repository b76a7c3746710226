/// CRUD operations against a live database
pub mod crud_tests;

/// Database-backed tests need a reachable Postgres; they are skipped when
/// `SKIP_DB_TESTS` is set or `DATABASE_URL` is missing.
pub(crate) fn db_tests_enabled() -> bool {
    std::env::var("SKIP_DB_TESTS").is_err() && std::env::var("DATABASE_URL").is_ok()
}
