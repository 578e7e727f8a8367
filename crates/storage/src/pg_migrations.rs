//! PostgreSQL schema migrations for school-assist storage.

use anyhow::Result;
use sqlx::PgPool;

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS schools (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        current_session_id TEXT,
        current_term_id TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        school_id TEXT REFERENCES schools (id) ON DELETE CASCADE,
        role TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_permissions (
        user_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
        permission TEXT NOT NULL,
        PRIMARY KEY (user_id, permission)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS school_classes (
        id TEXT PRIMARY KEY,
        school_id TEXT NOT NULL REFERENCES schools (id) ON DELETE CASCADE,
        name TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_school_classes_school ON school_classes (school_id)",
    r#"
    CREATE TABLE IF NOT EXISTS class_arms (
        id TEXT PRIMARY KEY,
        school_class_id TEXT NOT NULL REFERENCES school_classes (id) ON DELETE CASCADE,
        name TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_class_arms_class ON class_arms (school_class_id)",
    r#"
    CREATE TABLE IF NOT EXISTS students (
        id TEXT PRIMARY KEY,
        school_id TEXT NOT NULL REFERENCES schools (id) ON DELETE CASCADE,
        first_name TEXT NOT NULL,
        middle_name TEXT,
        last_name TEXT NOT NULL,
        gender TEXT NOT NULL,
        date_of_birth DATE NOT NULL,
        current_session_id TEXT NOT NULL,
        current_term_id TEXT NOT NULL,
        school_class_id TEXT NOT NULL,
        class_arm_id TEXT NOT NULL,
        admission_date DATE NOT NULL,
        status TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_students_school ON students (school_id, created_at DESC)",
    r#"
    CREATE TABLE IF NOT EXISTS ai_chat_logs (
        id TEXT PRIMARY KEY,
        school_id TEXT NOT NULL REFERENCES schools (id) ON DELETE CASCADE,
        user_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
        user_message TEXT NOT NULL,
        assistant_reply TEXT NOT NULL,
        intent TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ai_chat_logs_school_created_at_index ON ai_chat_logs (school_id, created_at)",
    "CREATE INDEX IF NOT EXISTS ai_chat_logs_user_created_at_index ON ai_chat_logs (user_id, created_at)",
    r#"
    CREATE TABLE IF NOT EXISTS audit_logs (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        action TEXT NOT NULL,
        description TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_audit_logs_user ON audit_logs (user_id, created_at DESC)",
    r#"
    CREATE TABLE IF NOT EXISTS pending_intents (
        user_id TEXT NOT NULL,
        kind TEXT NOT NULL,
        status TEXT NOT NULL,
        draft JSONB NOT NULL DEFAULT '{}',
        missing JSONB NOT NULL DEFAULT '[]',
        updated_at TIMESTAMPTZ NOT NULL,
        expires_at TIMESTAMPTZ NOT NULL,
        PRIMARY KEY (user_id, kind)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_pending_intents_expires ON pending_intents (expires_at)",
];

/// Run all PostgreSQL migrations. Every statement is idempotent.
pub async fn run_pg_migrations(pool: &PgPool) -> Result<()> {
    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::debug!(count = STATEMENTS.len(), "PostgreSQL migrations applied");
    Ok(())
}
