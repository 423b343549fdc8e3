//! Log database migrations - embedded SQL files
//!
//! Each migration is a (name, sql) pair compiled in with include_str! and
//! applied in order.

/// All log migrations, embedded at compile time.
///
/// When adding a migration, create NNN_description.sql and append it here.
pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    (
        "001_initial_schema.sql",
        include_str!("001_initial_schema.sql"),
    ),
];
