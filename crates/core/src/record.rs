use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::attachment::Attachment;
use crate::coerce::{coerce_decimal, NumericInput};
use crate::ids::RecordId;

/// Lifecycle status of a daily record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[default]
    Draft,
    Finalized,
}

/// Whether the local copy matches the authoritative remote copy.
///
/// Older local data predates the marker entirely; it deserializes as
/// `Unknown` and the sweep treats it the same as `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    Synced,
    Pending,
    #[default]
    Unknown,
}

impl SyncState {
    pub fn is_synced(&self) -> bool {
        matches!(self, Self::Synced)
    }

    pub fn needs_sync(&self) -> bool {
        !self.is_synced()
    }
}

/// The sole domain entity: one team's trip data for one day.
///
/// All numeric fields have already been through [`coerce_decimal`] by the
/// time a value of this type exists; they are plain `f64` here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRecord {
    pub id: RecordId,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub created_by_email: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub van_plate: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub km_start: f64,
    #[serde(default)]
    pub km_end: f64,
    #[serde(default)]
    pub km_total: f64,
    #[serde(default)]
    pub articles_loaded: f64,
    #[serde(default)]
    pub articles_delivered: f64,
    #[serde(default)]
    pub articles_not_delivered: f64,
    #[serde(default)]
    pub reason_not_delivered: String,
    #[serde(default)]
    pub fueling: bool,
    #[serde(default)]
    pub fuel_amount: f64,
    #[serde(default)]
    pub toll_amount: f64,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub status: RecordStatus,
    #[serde(default)]
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub sync_state: SyncState,
}

impl DailyRecord {
    /// Build a fresh record from a submitted draft. Assigns the id and
    /// creation timestamp, coerces every numeric field, derives `km_total`,
    /// and marks the record pending until a remote write succeeds.
    pub fn from_draft(draft: RecordDraft) -> Self {
        let mut record = Self {
            id: RecordId::new(),
            user_id: None,
            created_by_email: draft.created_by_email,
            date: draft.date,
            team: draft.team,
            van_plate: draft.van_plate,
            start_time: draft.start_time,
            km_start: coerce_decimal(&draft.km_start),
            km_end: coerce_decimal(&draft.km_end),
            km_total: 0.0,
            articles_loaded: coerce_decimal(&draft.articles_loaded),
            articles_delivered: coerce_decimal(&draft.articles_delivered),
            articles_not_delivered: coerce_decimal(&draft.articles_not_delivered),
            reason_not_delivered: draft.reason_not_delivered,
            fueling: draft.fueling,
            fuel_amount: coerce_decimal(&draft.fuel_amount),
            toll_amount: coerce_decimal(&draft.toll_amount),
            attachments: draft.attachments,
            notes: draft.notes,
            status: draft.status,
            archived: false,
            created_at: Utc::now(),
            sync_state: SyncState::Pending,
        };
        record.derive_km_total();
        record
    }

    /// Recompute `km_total` from the odometer endpoints. When the endpoints
    /// would produce a negative total the stored value is left untouched.
    pub fn derive_km_total(&mut self) {
        if self.km_end >= self.km_start {
            self.km_total = self.km_end - self.km_start;
        }
    }

    pub fn with_sync_state(mut self, state: SyncState) -> Self {
        self.sync_state = state;
        self
    }
}

/// User-submitted form data for a new record. Everything the facade assigns
/// itself (id, timestamp, archived flag, sync marker) is absent here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDraft {
    pub date: NaiveDate,
    #[serde(default)]
    pub created_by_email: Option<String>,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub van_plate: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub km_start: NumericInput,
    #[serde(default)]
    pub km_end: NumericInput,
    #[serde(default)]
    pub articles_loaded: NumericInput,
    #[serde(default)]
    pub articles_delivered: NumericInput,
    #[serde(default)]
    pub articles_not_delivered: NumericInput,
    #[serde(default)]
    pub reason_not_delivered: String,
    #[serde(default)]
    pub fueling: bool,
    #[serde(default)]
    pub fuel_amount: NumericInput,
    #[serde(default)]
    pub toll_amount: NumericInput,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub status: RecordStatus,
}

impl RecordDraft {
    /// A draft with only the date set, for call sites that fill fields in.
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date,
            created_by_email: None,
            team: String::new(),
            van_plate: String::new(),
            start_time: String::new(),
            km_start: NumericInput::Empty,
            km_end: NumericInput::Empty,
            articles_loaded: NumericInput::Empty,
            articles_delivered: NumericInput::Empty,
            articles_not_delivered: NumericInput::Empty,
            reason_not_delivered: String::new(),
            fueling: false,
            fuel_amount: NumericInput::Empty,
            toll_amount: NumericInput::Empty,
            attachments: Vec::new(),
            notes: String::new(),
            status: RecordStatus::Draft,
        }
    }
}

/// Partial edit of an existing record. Only the fields present are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordPatch {
    pub date: Option<NaiveDate>,
    pub team: Option<String>,
    pub van_plate: Option<String>,
    pub start_time: Option<String>,
    pub km_start: Option<NumericInput>,
    pub km_end: Option<NumericInput>,
    pub km_total: Option<NumericInput>,
    pub articles_loaded: Option<NumericInput>,
    pub articles_delivered: Option<NumericInput>,
    pub articles_not_delivered: Option<NumericInput>,
    pub reason_not_delivered: Option<String>,
    pub fueling: Option<bool>,
    pub fuel_amount: Option<NumericInput>,
    pub toll_amount: Option<NumericInput>,
    pub attachments: Option<Vec<Attachment>>,
    pub notes: Option<String>,
    pub status: Option<RecordStatus>,
    pub archived: Option<bool>,
}

impl RecordPatch {
    /// Merge this patch over an existing record, producing a new value.
    /// The result is always marked pending; `km_total` is re-derived when
    /// the endpoints allow it.
    pub fn apply(&self, record: &DailyRecord) -> DailyRecord {
        let mut next = record.clone();
        if let Some(date) = self.date {
            next.date = date;
        }
        if let Some(team) = &self.team {
            next.team = team.clone();
        }
        if let Some(van_plate) = &self.van_plate {
            next.van_plate = van_plate.clone();
        }
        if let Some(start_time) = &self.start_time {
            next.start_time = start_time.clone();
        }
        if let Some(v) = &self.km_start {
            next.km_start = coerce_decimal(v);
        }
        if let Some(v) = &self.km_end {
            next.km_end = coerce_decimal(v);
        }
        if let Some(v) = &self.km_total {
            next.km_total = coerce_decimal(v);
        }
        if let Some(v) = &self.articles_loaded {
            next.articles_loaded = coerce_decimal(v);
        }
        if let Some(v) = &self.articles_delivered {
            next.articles_delivered = coerce_decimal(v);
        }
        if let Some(v) = &self.articles_not_delivered {
            next.articles_not_delivered = coerce_decimal(v);
        }
        if let Some(reason) = &self.reason_not_delivered {
            next.reason_not_delivered = reason.clone();
        }
        if let Some(fueling) = self.fueling {
            next.fueling = fueling;
        }
        if let Some(v) = &self.fuel_amount {
            next.fuel_amount = coerce_decimal(v);
        }
        if let Some(v) = &self.toll_amount {
            next.toll_amount = coerce_decimal(v);
        }
        if let Some(attachments) = &self.attachments {
            next.attachments = attachments.clone();
        }
        if let Some(notes) = &self.notes {
            next.notes = notes.clone();
        }
        if let Some(status) = self.status {
            next.status = status;
        }
        if let Some(archived) = self.archived {
            next.archived = archived;
        }
        next.derive_km_total();
        next.sync_state = SyncState::Pending;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> RecordDraft {
        RecordDraft::for_date(NaiveDate::from_ymd_opt(2024, 5, 12).unwrap())
    }

    #[test]
    fn from_draft_assigns_lifecycle_fields() {
        let record = DailyRecord::from_draft(draft());
        assert!(!record.archived);
        assert_eq!(record.sync_state, SyncState::Pending);
        assert_eq!(record.status, RecordStatus::Draft);
    }

    #[test]
    fn km_total_is_derived_from_endpoints() {
        let mut d = draft();
        d.km_start = "100,5".into();
        d.km_end = "150".into();
        let record = DailyRecord::from_draft(d);
        assert_eq!(record.km_total, 49.5);
    }

    #[test]
    fn km_total_never_goes_negative() {
        let mut d = draft();
        d.km_start = 200.0.into();
        d.km_end = 150.0.into();
        let record = DailyRecord::from_draft(d);
        // Derivation is skipped; the initial total stands.
        assert_eq!(record.km_total, 0.0);

        let patched = RecordPatch {
            km_total: Some(80.0.into()),
            ..RecordPatch::default()
        }
        .apply(&record);
        assert_eq!(patched.km_total, 80.0);
    }

    #[test]
    fn patch_resets_sync_marker() {
        let mut record = DailyRecord::from_draft(draft());
        record.sync_state = SyncState::Synced;

        let patched = RecordPatch {
            notes: Some("left gate code with neighbor".into()),
            ..RecordPatch::default()
        }
        .apply(&record);

        assert_eq!(patched.notes, "left gate code with neighbor");
        assert_eq!(patched.sync_state, SyncState::Pending);
        // Untouched fields carry over.
        assert_eq!(patched.date, record.date);
        assert_eq!(patched.id, record.id);
    }

    #[test]
    fn missing_sync_marker_deserializes_as_unknown() {
        let record = DailyRecord::from_draft(draft());
        let mut value = serde_json::to_value(&record).unwrap();
        value.as_object_mut().unwrap().remove("sync_state");

        let reread: DailyRecord = serde_json::from_value(value).unwrap();
        assert_eq!(reread.sync_state, SyncState::Unknown);
        assert!(reread.sync_state.needs_sync());
    }
}
