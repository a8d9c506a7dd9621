use rusqlite::Connection;

use vanlog_core::{DailyRecord, RecordId};

use crate::error::StorageError;

/// Keyed durable persistence for daily records.
///
/// A successful `put` means the enclosing transaction has committed and the
/// record is on disk, not merely queued. Readers get the stored set
/// unordered and re-sort as needed.
pub trait LocalStore {
    fn put(&mut self, record: &DailyRecord) -> Result<(), StorageError>;

    /// Upsert a batch inside one transaction. Used by the legacy migration,
    /// which must land all records or none before the old blob is deleted.
    fn put_all(&mut self, records: &[DailyRecord]) -> Result<(), StorageError>;

    fn get(&self, id: RecordId) -> Result<Option<DailyRecord>, StorageError>;

    fn get_all(&self) -> Result<Vec<DailyRecord>, StorageError>;

    fn len(&self) -> Result<u64, StorageError>;
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let conn =
            Connection::open(path).map_err(|e| StorageError::Unavailable(e.to_string()))?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StorageError::Unavailable(e.to_string()))?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn encode(record: &DailyRecord) -> Result<Vec<u8>, StorageError> {
    rmp_serde::to_vec(record).map_err(|e| StorageError::Serialization(e.to_string()))
}

fn decode(bytes: &[u8]) -> Result<DailyRecord, StorageError> {
    rmp_serde::from_slice(bytes).map_err(|e| StorageError::Serialization(e.to_string()))
}

const UPSERT_SQL: &str = "INSERT INTO records (id, record) VALUES (?1, ?2)
     ON CONFLICT(id) DO UPDATE SET record = excluded.record";

impl LocalStore for SqliteStore {
    fn put(&mut self, record: &DailyRecord) -> Result<(), StorageError> {
        let bytes = encode(record)?;
        let tx = self.conn.transaction()?;
        tx.execute(UPSERT_SQL, rusqlite::params![record.id.to_string(), bytes])?;
        // Durability point: only a committed transaction counts as saved.
        tx.commit()?;
        Ok(())
    }

    fn put_all(&mut self, records: &[DailyRecord]) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        for record in records {
            let bytes = encode(record)?;
            tx.execute(UPSERT_SQL, rusqlite::params![record.id.to_string(), bytes])?;
        }
        tx.commit()?;
        Ok(())
    }

    fn get(&self, id: RecordId) -> Result<Option<DailyRecord>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT record FROM records WHERE id = ?1")?;
        let mut rows = stmt.query_map(rusqlite::params![id.to_string()], |row| {
            row.get::<_, Vec<u8>>(0)
        })?;

        match rows.next() {
            Some(Ok(bytes)) => Ok(Some(decode(&bytes)?)),
            Some(Err(e)) => Err(StorageError::Sqlite(e)),
            None => Ok(None),
        }
    }

    fn get_all(&self) -> Result<Vec<DailyRecord>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT record FROM records")?;
        let rows = stmt.query_map([], |row| row.get::<_, Vec<u8>>(0))?;

        let mut result = Vec::new();
        for row in rows {
            result.push(decode(&row?)?);
        }
        Ok(result)
    }

    fn len(&self) -> Result<u64, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
