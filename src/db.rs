use crate::domains::contact::{DraftStore, Submission};
use crate::error::Result;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

pub const DB_FILE: &str = "portal.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS drafts(
            key TEXT PRIMARY KEY,
            payload TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS submissions(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT,
            subject TEXT NOT NULL,
            message TEXT NOT NULL,
            submitted_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_submissions_email ON submissions(email)",
        [],
    )?;

    Ok(conn)
}

impl DraftStore for Connection {
    fn load_draft(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .query_row("SELECT payload FROM drafts WHERE key = ?", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?)
    }

    fn save_draft(&mut self, key: &str, payload: &str) -> Result<()> {
        self.execute(
            "INSERT INTO drafts(key, payload, updated_at) VALUES(?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET payload = excluded.payload, updated_at = excluded.updated_at",
            (key, payload, chrono::Utc::now().to_rfc3339()),
        )?;
        Ok(())
    }

    fn clear_draft(&mut self, key: &str) -> Result<()> {
        self.execute("DELETE FROM drafts WHERE key = ?", [key])?;
        Ok(())
    }

    fn append_submission(&mut self, s: &Submission) -> Result<()> {
        let phone = (!s.form.phone.is_empty()).then_some(s.form.phone.as_str());
        self.execute(
            "INSERT INTO submissions(first_name, last_name, email, phone, subject, message, submitted_at)
             VALUES(?, ?, ?, ?, ?, ?, ?)",
            (
                &s.form.first_name,
                &s.form.last_name,
                &s.form.email,
                phone,
                &s.form.subject,
                &s.form.message,
                s.submitted_at.to_rfc3339(),
            ),
        )?;
        Ok(())
    }

    fn submission_count(&self) -> Result<usize> {
        let n: i64 = self.query_row("SELECT COUNT(*) FROM submissions", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::contact::{autosave, load_draft, ContactForm, DRAFT_KEY};

    #[test]
    fn drafts_survive_reopen_and_clear() {
        let ws = std::env::temp_dir().join(format!("portald-db-{}", uuid::Uuid::new_v4()));
        let form = ContactForm {
            first_name: "Ada".into(),
            message: "Hello there, world".into(),
            ..Default::default()
        };
        {
            let mut conn = open_db(&ws).unwrap();
            assert!(autosave(&mut conn, &form).unwrap());
            assert!(autosave(&mut conn, &form).unwrap());
        }
        let mut conn = open_db(&ws).unwrap();
        assert_eq!(load_draft(&conn).unwrap(), Some(form.clone()));

        conn.append_submission(&Submission { form, submitted_at: chrono::Utc::now() })
            .unwrap();
        conn.clear_draft(DRAFT_KEY).unwrap();
        assert!(load_draft(&conn).unwrap().is_none());
        assert_eq!(conn.submission_count().unwrap(), 1);
        let _ = std::fs::remove_dir_all(&ws);
    }
}
