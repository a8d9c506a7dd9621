use vanlog_core::{RecordPatch, SyncState};
use vanlog_harness::{MemoryRemote, TestDevice};
use vanlog_storage::LocalStore;

// ============================================================================
// Facade: create
// ============================================================================

#[test]
fn create_with_session_syncs_immediately() -> Result<(), Box<dyn std::error::Error>> {
    let remote = MemoryRemote::with_session("user-1", Some("driver@fleet.test"));
    let mut device = TestDevice::new(remote.clone())?;

    let mut draft = TestDevice::draft("2024-05-12");
    draft.team = "Equipe 1".into();
    draft.km_start = "100".into();
    draft.km_end = "180,5".into();

    let record = device.service.create(draft)?;
    assert!(record.sync_state.is_synced());
    assert!(!record.archived);

    // The remote row carries the session identity and coerced numbers.
    let row = remote.row(record.id).unwrap();
    assert_eq!(row.user_id.as_deref(), Some("user-1"));
    assert_eq!(row.created_by_email.as_deref(), Some("driver@fleet.test"));
    assert_eq!(row.km_total, 80.5);

    // And the local copy is durable and marked synced.
    let stored = device.service.store().get(record.id)?.unwrap();
    assert!(stored.sync_state.is_synced());
    Ok(())
}

#[test]
fn create_without_session_saves_locally_only() -> Result<(), Box<dyn std::error::Error>> {
    let remote = MemoryRemote::new();
    let mut device = TestDevice::new(remote.clone())?;

    let record = device.service.create(TestDevice::draft("2024-05-12"))?;
    assert_eq!(record.sync_state, SyncState::Pending);
    assert!(remote.rows().is_empty());
    assert!(device.service.store().get(record.id)?.is_some());
    Ok(())
}

#[test]
fn create_survives_remote_failure() -> Result<(), Box<dyn std::error::Error>> {
    let remote = MemoryRemote::with_session("user-1", None);
    remote.set_fail_upserts(true);
    let mut device = TestDevice::new(remote.clone())?;

    let record = device.service.create(TestDevice::draft("2024-05-12"))?;
    // Remote write failed, but the save itself succeeded: local copy exists
    // and stays pending for the next sweep.
    assert_eq!(record.sync_state, SyncState::Pending);
    assert!(device.service.store().get(record.id)?.is_some());
    assert!(remote.rows().is_empty());
    Ok(())
}

// ============================================================================
// Facade: update
// ============================================================================

#[test]
fn update_merges_and_flips_marker_on_remote_success() -> Result<(), Box<dyn std::error::Error>> {
    let remote = MemoryRemote::with_session("user-1", None);
    let mut device = TestDevice::new(remote.clone())?;

    let mut draft = TestDevice::draft("2024-05-12");
    draft.km_start = "100".into();
    draft.km_end = "150".into();
    let record = device.service.create(draft)?;

    let patch = RecordPatch {
        km_end: Some("200,5".into()),
        notes: Some("extended route".into()),
        ..RecordPatch::default()
    };
    let updated = device.service.update(record.id, patch)?.unwrap();

    assert_eq!(updated.km_end, 200.5);
    assert_eq!(updated.km_total, 100.5);
    assert_eq!(updated.notes, "extended route");
    assert!(updated.sync_state.is_synced());

    // Field-level patch reached the remote row with coercion applied.
    let row = remote.row(record.id).unwrap();
    assert_eq!(row.km_end, 200.5);
    assert_eq!(row.notes, "extended route");
    Ok(())
}

#[test]
fn update_without_session_stays_pending() -> Result<(), Box<dyn std::error::Error>> {
    let remote = MemoryRemote::new();
    let mut device = TestDevice::new(remote.clone())?;
    let record = device.service.create(TestDevice::draft("2024-05-12"))?;

    let patch = RecordPatch {
        notes: Some("offline edit".into()),
        ..RecordPatch::default()
    };
    let updated = device.service.update(record.id, patch)?.unwrap();

    assert_eq!(updated.sync_state, SyncState::Pending);
    let stored = device.service.store().get(record.id)?.unwrap();
    assert_eq!(stored.notes, "offline edit");
    assert!(remote.rows().is_empty());
    Ok(())
}

#[test]
fn update_of_unknown_id_returns_none() -> Result<(), Box<dyn std::error::Error>> {
    let remote = MemoryRemote::with_session("user-1", None);
    let mut device = TestDevice::new(remote)?;

    let patch = RecordPatch {
        notes: Some("nothing to merge".into()),
        ..RecordPatch::default()
    };
    let updated = device.service.update(vanlog_core::RecordId::new(), patch)?;
    assert!(updated.is_none());
    Ok(())
}

#[test]
fn archiving_keeps_the_record_listed() -> Result<(), Box<dyn std::error::Error>> {
    let remote = MemoryRemote::with_session("user-1", None);
    let mut device = TestDevice::new(remote)?;
    let record = device.service.create(TestDevice::draft("2024-05-12"))?;

    let patch = RecordPatch {
        archived: Some(true),
        ..RecordPatch::default()
    };
    device.service.update(record.id, patch)?;

    let set = device.service.get_all()?;
    assert_eq!(set.records.len(), 1);
    assert!(set.records[0].archived);
    // Excluded from aggregates, still editable and listed.
    let summary = vanlog_core::metrics::summarize(&set.records);
    assert_eq!(summary.record_count, 0);
    Ok(())
}

// ============================================================================
// Facade: get_by_id
// ============================================================================

#[test]
fn get_by_id_prefers_the_remote_copy() -> Result<(), Box<dyn std::error::Error>> {
    let remote = MemoryRemote::with_session("user-1", None);
    let mut device = TestDevice::new(remote.clone())?;
    let record = device.service.create(TestDevice::draft("2024-05-12"))?;

    // Another device edits the same record server-side.
    let mut row = remote.row(record.id).unwrap();
    row.notes = "edited elsewhere".into();
    remote.insert_row(row);

    let fetched = device.service.get_by_id(record.id)?.unwrap();
    assert_eq!(fetched.notes, "edited elsewhere");
    assert!(fetched.sync_state.is_synced());

    // The fetch refreshed the local cache too.
    let stored = device.service.store().get(record.id)?.unwrap();
    assert_eq!(stored.notes, "edited elsewhere");
    Ok(())
}

#[test]
fn get_by_id_falls_back_to_local_when_offline() -> Result<(), Box<dyn std::error::Error>> {
    let remote = MemoryRemote::new();
    let mut device = TestDevice::new(remote.clone())?;
    let record = device.service.create(TestDevice::draft("2024-05-12"))?;

    remote.set_fail_fetches(true);
    let fetched = device.service.get_by_id(record.id)?.unwrap();
    assert_eq!(fetched.id, record.id);
    assert_eq!(fetched.sync_state, SyncState::Pending);
    Ok(())
}

#[test]
fn get_by_id_missing_everywhere_is_none() -> Result<(), Box<dyn std::error::Error>> {
    let remote = MemoryRemote::with_session("user-1", None);
    let mut device = TestDevice::new(remote)?;
    assert!(device.service.get_by_id(vanlog_core::RecordId::new())?.is_none());
    Ok(())
}

// ============================================================================
// Facade: upload_image
// ============================================================================

#[test]
fn upload_image_returns_a_public_url() -> Result<(), Box<dyn std::error::Error>> {
    let remote = MemoryRemote::with_session("user-1", None);
    let device = TestDevice::new(remote.clone())?;

    let url = device.service.upload_image(b"jpeg bytes").unwrap();
    assert!(url.starts_with("https://"));
    assert_eq!(remote.blob_count(), 1);
    Ok(())
}

#[test]
fn upload_image_failure_is_none_not_an_error() -> Result<(), Box<dyn std::error::Error>> {
    let remote = MemoryRemote::with_session("user-1", None);
    remote.set_fail_uploads(true);
    let device = TestDevice::new(remote)?;

    assert!(device.service.upload_image(b"jpeg bytes").is_none());
    Ok(())
}
