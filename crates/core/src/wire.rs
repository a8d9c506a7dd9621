//! Wire contract for the hosted record table.
//!
//! One row per [`DailyRecord`], with exactly the column set the backend
//! expects. Numeric values are coerced before they leave the device, and
//! the backend's defaults are applied to blank text fields.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::attachment::Attachment;
use crate::coerce::coerce_decimal;
use crate::ids::RecordId;
use crate::record::{DailyRecord, RecordPatch, RecordStatus, SyncState};

pub const DEFAULT_TEAM: &str = "Equipe Indefinida";
pub const DEFAULT_START_TIME: &str = "00:00";

/// One row of the `daily_records` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordRow {
    pub id: RecordId,
    pub user_id: Option<String>,
    pub created_by_email: Option<String>,
    pub date: NaiveDate,
    pub team: String,
    pub van_plate: String,
    pub start_time: String,
    pub km_start: f64,
    pub km_end: f64,
    pub km_total: f64,
    pub articles_loaded: f64,
    pub articles_delivered: f64,
    pub articles_not_delivered: f64,
    pub reason_not_delivered: String,
    pub fueling: bool,
    pub fuel_amount: f64,
    pub toll_amount: f64,
    pub attachments: Vec<String>,
    pub notes: String,
    pub status: RecordStatus,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
}

impl RecordRow {
    /// Build the upsert payload for a record on behalf of the session user.
    /// Attachments are sent as their stored strings; entries still inline
    /// at this point simply have not been uploaded yet.
    pub fn from_record(record: &DailyRecord, user_id: &str, user_email: Option<&str>) -> Self {
        Self {
            id: record.id,
            user_id: Some(user_id.to_string()),
            created_by_email: user_email
                .map(str::to_string)
                .or_else(|| record.created_by_email.clone()),
            date: record.date,
            team: default_if_blank(&record.team, DEFAULT_TEAM),
            van_plate: record.van_plate.clone(),
            start_time: default_if_blank(&record.start_time, DEFAULT_START_TIME),
            km_start: record.km_start,
            km_end: record.km_end,
            km_total: record.km_total,
            articles_loaded: record.articles_loaded,
            articles_delivered: record.articles_delivered,
            articles_not_delivered: record.articles_not_delivered,
            reason_not_delivered: record.reason_not_delivered.clone(),
            fueling: record.fueling,
            fuel_amount: record.fuel_amount,
            toll_amount: record.toll_amount,
            attachments: record
                .attachments
                .iter()
                .map(|a| a.as_str().to_string())
                .collect(),
            notes: record.notes.clone(),
            status: record.status,
            archived: record.archived,
            created_at: record.created_at,
        }
    }

    /// Turn a fetched row back into a record. Rows coming off the hosted
    /// table are authoritative, so the result is marked synced.
    pub fn into_record(self) -> DailyRecord {
        DailyRecord {
            id: self.id,
            user_id: self.user_id,
            created_by_email: self.created_by_email,
            date: self.date,
            team: self.team,
            van_plate: self.van_plate,
            start_time: self.start_time,
            km_start: self.km_start,
            km_end: self.km_end,
            km_total: self.km_total,
            articles_loaded: self.articles_loaded,
            articles_delivered: self.articles_delivered,
            articles_not_delivered: self.articles_not_delivered,
            reason_not_delivered: self.reason_not_delivered,
            fueling: self.fueling,
            fuel_amount: self.fuel_amount,
            toll_amount: self.toll_amount,
            attachments: self
                .attachments
                .into_iter()
                .map(Attachment::from_string)
                .collect(),
            notes: self.notes,
            status: self.status,
            archived: self.archived,
            created_at: self.created_at,
            sync_state: SyncState::Synced,
        }
    }
}

fn default_if_blank(value: &str, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// Field-level payload for a partial row update. Only the keys present in
/// the patch are sent; numeric keys are coerced. The record id and the
/// local sync marker never leave the device.
pub fn row_patch(patch: &RecordPatch) -> Map<String, Value> {
    let mut map = Map::new();
    if let Some(date) = patch.date {
        map.insert("date".into(), Value::String(date.to_string()));
    }
    if let Some(team) = &patch.team {
        map.insert("team".into(), Value::String(team.clone()));
    }
    if let Some(van_plate) = &patch.van_plate {
        map.insert("van_plate".into(), Value::String(van_plate.clone()));
    }
    if let Some(start_time) = &patch.start_time {
        map.insert("start_time".into(), Value::String(start_time.clone()));
    }
    let numerics = [
        ("km_start", &patch.km_start),
        ("km_end", &patch.km_end),
        ("km_total", &patch.km_total),
        ("articles_loaded", &patch.articles_loaded),
        ("articles_delivered", &patch.articles_delivered),
        ("articles_not_delivered", &patch.articles_not_delivered),
        ("fuel_amount", &patch.fuel_amount),
        ("toll_amount", &patch.toll_amount),
    ];
    for (key, input) in numerics {
        if let Some(input) = input {
            let coerced = coerce_decimal(input);
            let number = serde_json::Number::from_f64(coerced)
                .unwrap_or_else(|| serde_json::Number::from(0));
            map.insert(key.into(), Value::Number(number));
        }
    }
    if let Some(reason) = &patch.reason_not_delivered {
        map.insert("reason_not_delivered".into(), Value::String(reason.clone()));
    }
    if let Some(fueling) = patch.fueling {
        map.insert("fueling".into(), Value::Bool(fueling));
    }
    if let Some(attachments) = &patch.attachments {
        let urls: Vec<Value> = attachments
            .iter()
            .map(|a| Value::String(a.as_str().to_string()))
            .collect();
        map.insert("attachments".into(), Value::Array(urls));
    }
    if let Some(notes) = &patch.notes {
        map.insert("notes".into(), Value::String(notes.clone()));
    }
    if let Some(status) = patch.status {
        // serde encodes the unit variant as a bare string
        if let Ok(value) = serde_json::to_value(status) {
            map.insert("status".into(), value);
        }
    }
    if let Some(archived) = patch.archived {
        map.insert("archived".into(), Value::Bool(archived));
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordDraft;

    fn record() -> DailyRecord {
        let mut draft = RecordDraft::for_date(NaiveDate::from_ymd_opt(2024, 5, 12).unwrap());
        draft.km_start = "10,5".into();
        draft.km_end = "60,5".into();
        DailyRecord::from_draft(draft)
    }

    #[test]
    fn blank_fields_get_backend_defaults() {
        let row = RecordRow::from_record(&record(), "user-1", Some("a@b.c"));
        assert_eq!(row.team, DEFAULT_TEAM);
        assert_eq!(row.start_time, DEFAULT_START_TIME);
        assert_eq!(row.van_plate, "");
        assert_eq!(row.user_id.as_deref(), Some("user-1"));
        assert_eq!(row.created_by_email.as_deref(), Some("a@b.c"));
    }

    #[test]
    fn fetched_rows_are_marked_synced() {
        let row = RecordRow::from_record(&record(), "user-1", None);
        let back = row.into_record();
        assert!(back.sync_state.is_synced());
        assert_eq!(back.km_total, 50.0);
    }

    #[test]
    fn row_has_the_exact_column_set() {
        let row = RecordRow::from_record(&record(), "user-1", None);
        let value = serde_json::to_value(&row).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        let expected = [
            "id", "user_id", "created_by_email", "date", "team", "van_plate",
            "start_time", "km_start", "km_end", "km_total", "articles_loaded",
            "articles_delivered", "articles_not_delivered", "reason_not_delivered",
            "fueling", "fuel_amount", "toll_amount", "attachments", "notes",
            "status", "archived", "created_at",
        ];
        for key in expected {
            assert!(keys.contains(&key), "missing column {key}");
        }
        assert_eq!(keys.len(), expected.len());
    }

    #[test]
    fn patch_payload_coerces_numeric_keys() {
        let patch = RecordPatch {
            km_end: Some("75,5".into()),
            notes: Some("rerouted".into()),
            ..RecordPatch::default()
        };
        let map = row_patch(&patch);
        assert_eq!(map.get("km_end").unwrap().as_f64(), Some(75.5));
        assert_eq!(map.get("notes").unwrap().as_str(), Some("rerouted"));
        assert!(!map.contains_key("km_start"));
        assert!(!map.contains_key("id"));
    }
}
