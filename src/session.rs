//! # Session Store Module
//!
//! Per-user persisted session records. The store is a key-value abstraction
//! keyed by Telegram user id, injected into the handlers as a trait object.
//! Reads and writes are not serialized per user: two near-simultaneous
//! events from the same user race on read-modify-write and the last write
//! wins, which is accepted for this domain.

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPool;
use sqlx::Row;
use tokio::sync::Mutex;
use tracing::debug;

use crate::dialogue::ContextTag;

/// One record per user: the stored credential and the pending context tag.
/// Created lazily on the first event from a user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub api_key: Option<String>,
    pub pending_context: Option<ContextTag>,
}

/// Key-value session persistence, one record per Telegram user id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the session for a user, or a fresh default if none is stored.
    async fn get(&self, user_id: i64) -> Result<Session>;

    /// Persist the session for a user, replacing any previous record.
    async fn put(&self, user_id: i64, session: &Session) -> Result<()>;
}

/// Initialize the session schema. Safe to run on every startup.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS sessions (
            telegram_id BIGINT PRIMARY KEY,
            api_key TEXT,
            pending_context TEXT,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create sessions table")?;
    Ok(())
}

/// Postgres-backed session store
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn get(&self, user_id: i64) -> Result<Session> {
        let row = sqlx::query("SELECT api_key, pending_context FROM sessions WHERE telegram_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to load session")?;

        match row {
            Some(row) => {
                let api_key: Option<String> = row.try_get("api_key")?;
                let pending: Option<String> = row.try_get("pending_context")?;
                Ok(Session {
                    api_key,
                    // Unknown stored tags read back as "no pending context"
                    pending_context: pending.as_deref().and_then(ContextTag::parse),
                })
            }
            None => {
                debug!(user_id, "No stored session, starting fresh");
                Ok(Session::default())
            }
        }
    }

    async fn put(&self, user_id: i64, session: &Session) -> Result<()> {
        sqlx::query(
            "INSERT INTO sessions (telegram_id, api_key, pending_context)
             VALUES ($1, $2, $3)
             ON CONFLICT (telegram_id) DO UPDATE
             SET api_key = EXCLUDED.api_key,
                 pending_context = EXCLUDED.pending_context,
                 updated_at = now()",
        )
        .bind(user_id)
        .bind(&session.api_key)
        .bind(session.pending_context.map(|tag| tag.as_str()))
        .execute(&self.pool)
        .await
        .context("Failed to store session")?;
        Ok(())
    }
}

/// In-memory session store, used by tests
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<i64, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, user_id: i64) -> Result<Session> {
        let sessions = self.sessions.lock().await;
        Ok(sessions.get(&user_id).cloned().unwrap_or_default())
    }

    async fn put(&self, user_id: i64, session: &Session) -> Result<()> {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(user_id, session.clone());
        Ok(())
    }
}
