use chrono::{Duration, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::types::Json;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

use crate::fs_manager::PortablePathManager;
use crate::models::{
    EvaluationLog, EventDraft, Flashcard, InteractionLog, StoredEvent, StoredFlashcard,
    StoredPlan, StoredSummary, StudyPlan,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    date TEXT NOT NULL,
    time TEXT,
    duration_minutes INTEGER NOT NULL DEFAULT 60,
    description TEXT NOT NULL DEFAULT '',
    remote_event_id TEXT,
    created_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS flashcards (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    question TEXT NOT NULL,
    answer TEXT NOT NULL,
    category TEXT NOT NULL DEFAULT 'general',
    created_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS summaries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    content TEXT NOT NULL,
    original_words INTEGER NOT NULL DEFAULT 0,
    summary_words INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS study_plans (
    id TEXT PRIMARY KEY,
    plan JSON NOT NULL,
    status TEXT NOT NULL DEFAULT 'active',
    created_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS evaluation_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    kind TEXT NOT NULL,
    metric TEXT NOT NULL,
    score REAL NOT NULL,
    details TEXT NOT NULL DEFAULT '{}',
    created_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS interaction_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at INTEGER NOT NULL,
    input TEXT NOT NULL,
    intent TEXT NOT NULL,
    success INTEGER NOT NULL,
    action TEXT NOT NULL
);
"#;

/// Opens (or creates) the SQLite database and applies the schema.
///
/// `db_url` overrides the default on-disk location; tests pass a temp-file
/// URL here.
pub async fn init_db(db_url: Option<&str>) -> Result<SqlitePool, sqlx::Error> {
    let url = match db_url {
        Some(url) => url.to_string(),
        None => {
            let db_path = PortablePathManager::db_dir().join("scholarmate.sqlite");
            format!("sqlite://{}", db_path.to_string_lossy())
        }
    };

    info!("Initializing database at: {}", url);

    let options = SqliteConnectOptions::from_str(&url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::raw_sql(SCHEMA).execute(&pool).await?;

    info!("Database initialized and schema applied.");

    Ok(pool)
}

// --- Events CRUD ---

pub async fn save_event(
    pool: &SqlitePool,
    draft: &EventDraft,
    remote_event_id: Option<&str>,
) -> Result<StoredEvent, sqlx::Error> {
    let created_at = Utc::now().timestamp();
    let time = draft.time.map(|t| t.format("%H:%M").to_string());

    sqlx::query_as::<_, StoredEvent>(
        r#"
        INSERT INTO events (title, date, time, duration_minutes, description, remote_event_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id, title, date, time, duration_minutes, description, remote_event_id, created_at
        "#,
    )
    .bind(&draft.title)
    .bind(draft.date.to_string())
    .bind(time)
    .bind(draft.duration_minutes)
    .bind(&draft.description)
    .bind(remote_event_id)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub async fn get_event(pool: &SqlitePool, id: i64) -> Result<Option<StoredEvent>, sqlx::Error> {
    sqlx::query_as::<_, StoredEvent>(
        r#"
        SELECT id, title, date, time, duration_minutes, description, remote_event_id, created_at
        FROM events
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Events within `[from, from + days]`, ordered by date then time.
pub async fn upcoming_events(
    pool: &SqlitePool,
    from: NaiveDate,
    days: i64,
) -> Result<Vec<StoredEvent>, sqlx::Error> {
    let until = from + Duration::days(days);

    sqlx::query_as::<_, StoredEvent>(
        r#"
        SELECT id, title, date, time, duration_minutes, description, remote_event_id, created_at
        FROM events
        WHERE date >= ? AND date <= ?
        ORDER BY date, time
        "#,
    )
    .bind(from.to_string())
    .bind(until.to_string())
    .fetch_all(pool)
    .await
}

pub async fn events_for_date(
    pool: &SqlitePool,
    date: NaiveDate,
) -> Result<Vec<StoredEvent>, sqlx::Error> {
    sqlx::query_as::<_, StoredEvent>(
        r#"
        SELECT id, title, date, time, duration_minutes, description, remote_event_id, created_at
        FROM events
        WHERE date = ?
        ORDER BY time
        "#,
    )
    .bind(date.to_string())
    .fetch_all(pool)
    .await
}

/// Returns true when a row was actually removed.
pub async fn delete_event(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM events WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

// --- Flashcards CRUD ---

pub async fn save_flashcard(
    pool: &SqlitePool,
    card: &Flashcard,
) -> Result<StoredFlashcard, sqlx::Error> {
    let created_at = Utc::now().timestamp();

    sqlx::query_as::<_, StoredFlashcard>(
        r#"
        INSERT INTO flashcards (question, answer, category, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING id, question, answer, category, created_at
        "#,
    )
    .bind(&card.question)
    .bind(&card.answer)
    .bind(&card.category)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub async fn recent_flashcards(
    pool: &SqlitePool,
    limit: i64,
) -> Result<Vec<StoredFlashcard>, sqlx::Error> {
    sqlx::query_as::<_, StoredFlashcard>(
        r#"
        SELECT id, question, answer, category, created_at
        FROM flashcards
        ORDER BY created_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

// --- Summaries CRUD ---

pub async fn save_summary(
    pool: &SqlitePool,
    content: &str,
    original_words: i64,
    summary_words: i64,
) -> Result<StoredSummary, sqlx::Error> {
    let created_at = Utc::now().timestamp();

    sqlx::query_as::<_, StoredSummary>(
        r#"
        INSERT INTO summaries (content, original_words, summary_words, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING id, content, original_words, summary_words, created_at
        "#,
    )
    .bind(content)
    .bind(original_words)
    .bind(summary_words)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub async fn recent_summaries(
    pool: &SqlitePool,
    limit: i64,
) -> Result<Vec<StoredSummary>, sqlx::Error> {
    sqlx::query_as::<_, StoredSummary>(
        r#"
        SELECT id, content, original_words, summary_words, created_at
        FROM summaries
        ORDER BY created_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

// --- Study plans CRUD ---

pub async fn save_plan(pool: &SqlitePool, plan: &StudyPlan) -> Result<StoredPlan, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let created_at = Utc::now().timestamp();
    let plan_json = Json(plan.clone());

    sqlx::query_as::<_, StoredPlan>(
        r#"
        INSERT INTO study_plans (id, plan, status, created_at)
        VALUES (?, ?, 'active', ?)
        RETURNING id, plan, status, created_at
        "#,
    )
    .bind(&id)
    .bind(plan_json)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

/// The most recent active study plan, if any.
pub async fn current_plan(pool: &SqlitePool) -> Result<Option<StoredPlan>, sqlx::Error> {
    sqlx::query_as::<_, StoredPlan>(
        r#"
        SELECT id, plan, status, created_at
        FROM study_plans
        WHERE status = 'active'
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await
}

// --- Evaluation logs ---

pub async fn log_evaluation(
    pool: &SqlitePool,
    kind: &str,
    metric: &str,
    score: f64,
    details: &serde_json::Value,
) -> Result<EvaluationLog, sqlx::Error> {
    let created_at = Utc::now().timestamp();

    sqlx::query_as::<_, EvaluationLog>(
        r#"
        INSERT INTO evaluation_logs (kind, metric, score, details, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, kind, metric, score, details, created_at
        "#,
    )
    .bind(kind)
    .bind(metric)
    .bind(score)
    .bind(details.to_string())
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub async fn evaluation_logs(
    pool: &SqlitePool,
    limit: i64,
) -> Result<Vec<EvaluationLog>, sqlx::Error> {
    sqlx::query_as::<_, EvaluationLog>(
        r#"
        SELECT id, kind, metric, score, details, created_at
        FROM evaluation_logs
        ORDER BY created_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Average score per metric across all evaluation logs.
pub async fn average_metric_scores(
    pool: &SqlitePool,
) -> Result<Vec<(String, f64)>, sqlx::Error> {
    sqlx::query_as::<_, (String, f64)>(
        r#"
        SELECT metric, AVG(score)
        FROM evaluation_logs
        GROUP BY metric
        "#,
    )
    .fetch_all(pool)
    .await
}

// --- Interaction logs ---

pub async fn log_interaction(
    pool: &SqlitePool,
    input: &str,
    intent: &str,
    success: bool,
    action: &str,
) -> Result<(), sqlx::Error> {
    let created_at = Utc::now().timestamp();

    sqlx::query(
        r#"
        INSERT INTO interaction_logs (created_at, input, intent, success, action)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(created_at)
    .bind(truncate(input, 200))
    .bind(intent)
    .bind(success)
    .bind(truncate(action, 200))
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn recent_interactions(
    pool: &SqlitePool,
    limit: i64,
) -> Result<Vec<InteractionLog>, sqlx::Error> {
    sqlx::query_as::<_, InteractionLog>(
        r#"
        SELECT id, created_at, input, intent, success, action
        FROM interaction_logs
        ORDER BY created_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Truncates on a char boundary; stored log fields are capped at 200 chars.
fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
