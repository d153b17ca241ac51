//! Append-only audit trail.
//!
//! Every security-relevant action gets one row in `audit_log`. There are
//! deliberately no update or delete functions in this module; history is
//! immutable once written. Payloads carry request metadata only, never
//! note text or anything derived from it.

use chrono::Utc;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::db::DatabaseError;
use crate::models::RequestContext;

pub const ACTION_PROCESS_ATTEMPT: &str = "note.process.attempt";
pub const ACTION_PROCESS_COMPLETED: &str = "note.process.completed";
pub const ACTION_PROCESS_FAILED: &str = "note.process.failed";
pub const ACTION_ORIGINAL_VIEWED: &str = "note.original.viewed";

/// One audit trail entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub actor_id: Option<String>,
    pub action: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub payload: serde_json::Value,
    pub created_at: String,
}

impl AuditEvent {
    /// Build an event stamped with the current time, attributing it to the
    /// caller described by `ctx`.
    pub fn now(ctx: &RequestContext, action: &str, payload: serde_json::Value) -> Self {
        Self {
            actor_id: ctx.actor_id.clone(),
            action: action.to_string(),
            ip_address: ctx.ip.clone(),
            user_agent: ctx.user_agent.clone(),
            payload,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Append one event. Returns the rowid of the inserted entry.
pub fn append_event(conn: &Connection, event: &AuditEvent) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO audit_log (actor_id, action, ip_address, user_agent, payload, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            event.actor_id,
            event.action,
            event.ip_address,
            event.user_agent,
            serde_json::to_string(&event.payload)?,
            event.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Events attributed to one actor, newest first.
pub fn events_by_actor(
    conn: &Connection,
    actor_id: &str,
    limit: Option<usize>,
) -> Result<Vec<AuditEvent>, DatabaseError> {
    query_events(
        conn,
        "SELECT actor_id, action, ip_address, user_agent, payload, created_at
         FROM audit_log WHERE actor_id = ?1
         ORDER BY created_at DESC, id DESC LIMIT ?2",
        actor_id,
        limit,
    )
}

/// Events of one action kind, newest first.
pub fn events_by_action(
    conn: &Connection,
    action: &str,
    limit: Option<usize>,
) -> Result<Vec<AuditEvent>, DatabaseError> {
    query_events(
        conn,
        "SELECT actor_id, action, ip_address, user_agent, payload, created_at
         FROM audit_log WHERE action = ?1
         ORDER BY created_at DESC, id DESC LIMIT ?2",
        action,
        limit,
    )
}

/// Total number of audit entries.
pub fn count_events(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM audit_log", [], |row| row.get(0))?;
    Ok(count)
}

fn query_events(
    conn: &Connection,
    sql: &str,
    key: &str,
    limit: Option<usize>,
) -> Result<Vec<AuditEvent>, DatabaseError> {
    let limit = limit
        .unwrap_or(config::AUDIT_QUERY_DEFAULT)
        .min(config::AUDIT_QUERY_MAX);

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![key, limit as i64], |row| {
            Ok((
                row.get::<_, Option<String>>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut events = Vec::with_capacity(rows.len());
    for (actor_id, action, ip_address, user_agent, payload, created_at) in rows {
        events.push(AuditEvent {
            actor_id,
            action,
            ip_address,
            user_agent,
            payload: serde_json::from_str(&payload)?,
            created_at,
        });
    }
    Ok(events)
}
