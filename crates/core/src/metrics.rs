//! Aggregate metrics and list filtering over merged record sets.
//!
//! Archived records stay in storage and keep showing up in lists, but they
//! are excluded from every aggregate here.

use chrono::NaiveDate;

use crate::record::DailyRecord;

/// Search criteria for record lists.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub team: Option<String>,
    pub van_plate: Option<String>,
}

impl RecordFilter {
    pub fn matches(&self, record: &DailyRecord) -> bool {
        if let Some(start) = self.start_date {
            if record.date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if record.date > end {
                return false;
            }
        }
        if let Some(team) = &self.team {
            if &record.team != team {
                return false;
            }
        }
        if let Some(plate) = &self.van_plate {
            if &record.van_plate != plate {
                return false;
            }
        }
        true
    }

    /// Produce a filtered copy of the list, preserving order.
    pub fn apply(&self, records: &[DailyRecord]) -> Vec<DailyRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Dashboard totals over the active (non-archived) records.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricsSummary {
    pub record_count: usize,
    pub total_delivered: f64,
    pub total_failed: f64,
    pub total_km: f64,
    pub total_cost: f64,
}

pub fn summarize(records: &[DailyRecord]) -> MetricsSummary {
    let mut summary = MetricsSummary::default();
    for record in records.iter().filter(|r| !r.archived) {
        summary.record_count += 1;
        summary.total_delivered += record.articles_delivered;
        summary.total_failed += record.articles_not_delivered;
        summary.total_km += record.km_total;
        summary.total_cost += record.fuel_amount + record.toll_amount;
    }
    summary
}

/// Totals for a single team's records.
pub fn summarize_team(records: &[DailyRecord], team: &str) -> MetricsSummary {
    let filter = RecordFilter {
        team: Some(team.to_string()),
        ..RecordFilter::default()
    };
    summarize(&filter.apply(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordDraft;

    fn record(date: &str, team: &str, delivered: f64, km: f64) -> DailyRecord {
        let mut draft = RecordDraft::for_date(date.parse().unwrap());
        draft.team = team.to_string();
        draft.articles_delivered = delivered.into();
        draft.km_end = km.into();
        DailyRecord::from_draft(draft)
    }

    #[test]
    fn archived_records_are_excluded_from_totals() {
        let mut archived = record("2024-05-10", "Equipe 1", 40.0, 90.0);
        archived.archived = true;
        let active = record("2024-05-11", "Equipe 1", 25.0, 110.0);

        let summary = summarize(&[archived, active]);
        assert_eq!(summary.record_count, 1);
        assert_eq!(summary.total_delivered, 25.0);
        assert_eq!(summary.total_km, 110.0);
    }

    #[test]
    fn cost_sums_fuel_and_tolls() {
        let mut r = record("2024-05-10", "Equipe 1", 10.0, 50.0);
        r.fuel_amount = 62.3;
        r.toll_amount = 4.2;
        let summary = summarize(&[r]);
        assert!((summary.total_cost - 66.5).abs() < 1e-9);
    }

    #[test]
    fn team_totals_only_count_that_team() {
        let a = record("2024-05-10", "Equipe 1", 10.0, 50.0);
        let b = record("2024-05-10", "Equipe 2", 99.0, 70.0);
        let summary = summarize_team(&[a, b], "Equipe 2");
        assert_eq!(summary.record_count, 1);
        assert_eq!(summary.total_delivered, 99.0);
    }

    #[test]
    fn date_range_filter() {
        let old = record("2024-04-01", "Equipe 1", 1.0, 10.0);
        let recent = record("2024-05-10", "Equipe 1", 2.0, 10.0);
        let filter = RecordFilter {
            start_date: Some("2024-05-01".parse().unwrap()),
            ..RecordFilter::default()
        };
        let kept = filter.apply(&[old, recent.clone()]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, recent.id);
    }
}
