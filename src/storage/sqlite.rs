use chrono::{DateTime, Datelike, Duration, Utc};
use rusqlite::{params, Connection, ErrorCode};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{AnalysisReport, ReportSummary};

/// Rows fetched per lock acquisition when scanning the table.
const READ_PAGE_SIZE: i64 = 64;

/// Append-only record of analysis reports, most recent first on read.
///
/// Each append is a single INSERT under the connection lock, so concurrent
/// appends never interleave. Scans read in pages and release the lock
/// between pages, so a writer waits at most for one page.
pub struct HistoryStore {
    conn: Mutex<Connection>,
    page_size: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    pub total_analyses: usize,
    pub analyses_today: usize,
    pub analyses_this_week: usize,
    pub analyses_this_month: usize,
}

impl HistoryStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
            page_size: READ_PAGE_SIZE,
        };
        store.init_db()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
            page_size: READ_PAGE_SIZE,
        };
        store.init_db()?;
        Ok(store)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn init_db(&self) -> Result<()> {
        self.conn().execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS reports (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                request_id TEXT UNIQUE NOT NULL,
                created_at TEXT NOT NULL,
                outcome TEXT NOT NULL,
                report_json TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_reports_created_at ON reports(created_at);
            "#,
        )?;

        Ok(())
    }

    pub fn append(&self, report: &AnalysisReport) -> Result<()> {
        let report_json = serde_json::to_string(report)?;
        let outcome = serde_json::to_string(&report.outcome())?;

        let result = self.conn().execute(
            r#"
            INSERT INTO reports (request_id, created_at, outcome, report_json)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                report.request_id().to_string(),
                report.created_at().to_rfc3339(),
                outcome,
                report_json,
            ],
        );

        match result {
            Ok(_) => {
                tracing::debug!("Recorded analysis {}", report.request_id());
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(Error::DuplicateReport(report.request_id()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn get(&self, request_id: Uuid) -> Result<AnalysisReport> {
        let result = self.conn().query_row(
            "SELECT report_json FROM reports WHERE request_id = ?1",
            params![request_id.to_string()],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(Error::NotFound(request_id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// All reports, most recent first.
    pub fn list(&self) -> Result<Vec<AnalysisReport>> {
        self.scan("report_json")?
            .iter()
            .map(|json| serde_json::from_str(json).map_err(Into::into))
            .collect()
    }

    pub fn summaries(&self) -> Result<Vec<ReportSummary>> {
        Ok(self.list()?.iter().map(AnalysisReport::summary).collect())
    }

    pub fn latest_id(&self) -> Result<Option<Uuid>> {
        let result = self.conn().query_row(
            "SELECT request_id FROM reports ORDER BY seq DESC LIMIT 1",
            [],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(id) => Uuid::parse_str(&id)
                .map(Some)
                .map_err(|e| Error::ParseError(format!("Stored request id '{}': {}", id, e))),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM reports", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Reads one text column of every row, newest first, one page per lock.
    ///
    /// Rows appended after the scan starts are not included.
    fn scan(&self, column: &str) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT seq, {} FROM reports WHERE seq < ?1 ORDER BY seq DESC LIMIT ?2",
            column
        );
        let mut values = Vec::new();
        let mut cursor = i64::MAX;

        loop {
            let page = {
                let conn = self.conn();
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params![cursor, self.page_size], |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
                })?;
                let page = rows.collect::<std::result::Result<Vec<_>, _>>()?;
                page
            };

            let last_page = (page.len() as i64) < self.page_size;
            if let Some((seq, _)) = page.last() {
                cursor = *seq;
            }
            values.extend(page.into_iter().map(|(_, value)| value));
            if last_page {
                return Ok(values);
            }
        }
    }

    pub fn stats(&self, now: DateTime<Utc>) -> Result<UsageStats> {
        let timestamps = self.scan("created_at")?;

        let created: Vec<DateTime<Utc>> = timestamps
            .iter()
            .filter_map(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .collect();

        let week_ago = now - Duration::days(7);
        Ok(UsageStats {
            total_analyses: timestamps.len(),
            analyses_today: created.iter().filter(|dt| dt.date_naive() == now.date_naive()).count(),
            analyses_this_week: created.iter().filter(|dt| **dt >= week_ago).count(),
            analyses_this_month: created
                .iter()
                .filter(|dt| dt.year() == now.year() && dt.month() == now.month())
                .count(),
        })
    }
}
