//! Contact storage over SQLite
//!
//! All reconciliation reads and writes go through a [`ContactTx`] so that
//! one request's read-decide-write sequence forms a single transaction.
//! Dropping the handle without committing rolls everything back.

use chrono::Utc;
use idr_common::db::models::{Contact, LinkPrecedence};
use idr_common::Result;
use sqlx::{Sqlite, SqlitePool, Transaction};

const CONTACT_COLUMNS: &str =
    "id, email, phone_number, linked_id, link_precedence, created_at, updated_at";

/// Raw row shape shared by every contact query.
type ContactRow = (
    i64,            // id
    Option<String>, // email
    Option<String>, // phone_number
    Option<i64>,    // linked_id
    String,         // link_precedence
    i64,            // created_at
    i64,            // updated_at
);

fn row_to_contact(row: ContactRow) -> Result<Contact> {
    Ok(Contact {
        id: row.0,
        email: row.1,
        phone_number: row.2,
        linked_id: row.3,
        link_precedence: LinkPrecedence::parse(&row.4)?,
        created_at: row.5,
        updated_at: row.6,
    })
}

/// Storage facade over the contacts table.
#[derive(Clone)]
pub struct ContactStore {
    pool: SqlitePool,
}

impl ContactStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a reconciliation transaction.
    pub async fn begin(&self) -> Result<ContactTx> {
        Ok(ContactTx {
            tx: self.pool.begin().await?,
        })
    }
}

/// A single reconciliation transaction over the contacts table. The
/// transaction owns its pooled connection; dropping it without committing
/// rolls every operation back.
pub struct ContactTx {
    tx: Transaction<'static, Sqlite>,
}

impl ContactTx {
    /// All contacts sharing either submitted channel value, ascending by
    /// creation time then id. A null input channel never matches.
    pub async fn find_by_channels(
        &mut self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Vec<Contact>> {
        let sql = format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts \
             WHERE (?1 IS NOT NULL AND email = ?1) \
                OR (?2 IS NOT NULL AND phone_number = ?2) \
             ORDER BY created_at ASC, id ASC"
        );
        let rows: Vec<ContactRow> = sqlx::query_as(&sql)
            .bind(email)
            .bind(phone)
            .fetch_all(&mut *self.tx)
            .await?;
        rows.into_iter().map(row_to_contact).collect()
    }

    /// All contacts whose id is in `ids` or whose linked_id is in `ids`,
    /// ascending by creation time then id. With flat links, calling this
    /// with one primary id returns that primary's whole cluster.
    pub async fn find_by_ids_or_linked_to(&mut self, ids: &[i64]) -> Result<Vec<Contact>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts \
             WHERE id IN ({placeholders}) OR linked_id IN ({placeholders}) \
             ORDER BY created_at ASC, id ASC"
        );
        let mut query = sqlx::query_as::<_, ContactRow>(&sql);
        for id in ids {
            query = query.bind(id);
        }
        for id in ids {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&mut *self.tx).await?;
        rows.into_iter().map(row_to_contact).collect()
    }

    /// Insert a new contact and return it with its assigned id and
    /// creation timestamp.
    pub async fn create(
        &mut self,
        email: Option<&str>,
        phone: Option<&str>,
        linked_id: Option<i64>,
        precedence: LinkPrecedence,
    ) -> Result<Contact> {
        let now = Utc::now().timestamp_millis();
        let result = sqlx::query(
            "INSERT INTO contacts \
             (email, phone_number, linked_id, link_precedence, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(email)
        .bind(phone)
        .bind(linked_id)
        .bind(precedence.as_str())
        .bind(now)
        .bind(now)
        .execute(&mut *self.tx)
        .await?;

        Ok(Contact {
            id: result.last_insert_rowid(),
            email: email.map(str::to_string),
            phone_number: phone.map(str::to_string),
            linked_id,
            link_precedence: precedence,
            created_at: now,
            updated_at: now,
        })
    }

    /// Re-link one existing contact (demotion, promotion, or flatness
    /// repair). Channel values and creation time are never touched.
    pub async fn update_link(
        &mut self,
        id: i64,
        linked_id: Option<i64>,
        precedence: LinkPrecedence,
    ) -> Result<()> {
        let now = Utc::now().timestamp_millis();
        sqlx::query(
            "UPDATE contacts SET link_precedence = ?, linked_id = ?, updated_at = ? WHERE id = ?",
        )
        .bind(precedence.as_str())
        .bind(linked_id)
        .bind(now)
        .bind(id)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    /// Re-point every contact linked to `from` at `to`. Returns the number
    /// of re-pointed rows.
    pub async fn relink_children(&mut self, from: i64, to: i64) -> Result<u64> {
        let now = Utc::now().timestamp_millis();
        let result =
            sqlx::query("UPDATE contacts SET linked_id = ?, updated_at = ? WHERE linked_id = ?")
                .bind(to)
                .bind(now)
                .bind(from)
                .execute(&mut *self.tx)
                .await?;
        Ok(result.rows_affected())
    }

    /// Commit the transaction, making all of its writes visible at once.
    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
