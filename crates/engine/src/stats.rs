//! Aggregates derived from a job list.
//!
//! Earnings are realized income: only jobs marked paid count. Monthly
//! buckets use the deadline month since jobs carry no payment date.
use core::fmt;
use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::{JobRecord, Money};

/// Calendar month used as a breakdown key. Orders chronologically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    #[must_use]
    pub const fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Paid amounts per deadline month, in chronological order.
pub type MonthlyBreakdown = BTreeMap<YearMonth, Money>;

/// Counts and totals shown by the statistics view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct JobSummary {
    pub total_jobs: usize,
    pub paid_jobs: usize,
    pub unpaid_jobs: usize,
    pub total_earnings: Money,
    pub potential_earnings: Money,
}

/// Sum of payments over paid jobs.
#[must_use]
pub fn total_earnings(records: &[JobRecord]) -> Money {
    records
        .iter()
        .filter(|job| job.paid)
        .map(|job| job.payment)
        .sum()
}

/// Sum of payments over jobs still waiting to be paid.
#[must_use]
pub fn potential_earnings(records: &[JobRecord]) -> Money {
    records
        .iter()
        .filter(|job| !job.paid)
        .map(|job| job.payment)
        .sum()
}

/// Paid payments grouped by the month of their deadline. Months without a
/// paid job are absent.
#[must_use]
pub fn monthly_breakdown(records: &[JobRecord]) -> MonthlyBreakdown {
    records
        .iter()
        .filter(|job| job.paid)
        .fold(BTreeMap::new(), |mut acc, job| {
            *acc.entry(YearMonth::of(job.deadline)).or_insert(Money::ZERO) += job.payment;
            acc
        })
}

#[must_use]
pub fn summary(records: &[JobRecord]) -> JobSummary {
    let paid_jobs = records.iter().filter(|job| job.paid).count();
    JobSummary {
        total_jobs: records.len(),
        paid_jobs,
        unpaid_jobs: records.len() - paid_jobs,
        total_earnings: total_earnings(records),
        potential_earnings: potential_earnings(records),
    }
}

/// Jobs due between `today` and `today + days` (both inclusive), sorted by
/// deadline, paired with their position in `records`.
#[must_use]
pub fn upcoming_deadlines(
    records: &[JobRecord],
    today: NaiveDate,
    days: u32,
) -> Vec<(usize, &JobRecord)> {
    let mut upcoming: Vec<_> = records
        .iter()
        .enumerate()
        .filter(|(_, job)| due_within(job, today, days))
        .collect();
    upcoming.sort_by_key(|(index, job)| (job.deadline, *index));
    upcoming
}

pub(crate) fn due_within(job: &JobRecord, today: NaiveDate, days: u32) -> bool {
    let limit = today
        .checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX);
    today <= job.deadline && job.deadline <= limit
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(project: &str, deadline: &str, cents: i64, paid: bool) -> JobRecord {
        JobRecord::new(
            "Acme",
            project,
            crate::parse_deadline(deadline).unwrap(),
            Money::new(cents),
        )
        .unwrap()
        .with_paid(paid)
    }

    fn sample() -> Vec<JobRecord> {
        vec![
            job("Logo", "2024-03-15", 50_000, true),
            job("Site", "2024-01-02", 120_050, true),
            job("Flyer", "2024-03-01", 7_500, true),
            job("Ads", "2024-02-20", 30_000, false),
            job("Deck", "2023-12-31", 1, true),
        ]
    }

    #[test]
    fn total_counts_only_paid_jobs() {
        assert_eq!(total_earnings(&sample()), Money::new(50_000 + 120_050 + 7_500 + 1));
        assert_eq!(potential_earnings(&sample()), Money::new(30_000));
        assert_eq!(total_earnings(&[]), Money::ZERO);
    }

    #[test]
    fn total_is_zero_when_nothing_is_paid() {
        let unpaid: Vec<_> = sample().into_iter().map(|j| j.with_paid(false)).collect();
        assert_eq!(total_earnings(&unpaid), Money::ZERO);
        assert!(monthly_breakdown(&unpaid).is_empty());
    }

    #[test]
    fn total_ignores_order() {
        let mut records = sample();
        let expected = total_earnings(&records);
        records.reverse();
        assert_eq!(total_earnings(&records), expected);
        records.rotate_left(2);
        assert_eq!(total_earnings(&records), expected);
    }

    #[test]
    fn breakdown_is_chronological_and_skips_empty_months() {
        let breakdown = monthly_breakdown(&sample());
        let buckets: Vec<_> = breakdown.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        assert_eq!(
            buckets,
            vec![
                ("2023-12".to_string(), Money::new(1)),
                ("2024-01".to_string(), Money::new(120_050)),
                ("2024-03".to_string(), Money::new(57_500)),
            ]
        );
    }

    #[test]
    fn breakdown_sums_to_total() {
        let records = sample();
        let breakdown = monthly_breakdown(&records);
        assert_eq!(breakdown.values().copied().sum::<Money>(), total_earnings(&records));

        for (month, amount) in &breakdown {
            let in_month: Vec<_> = records
                .iter()
                .filter(|j| YearMonth::of(j.deadline) == *month)
                .cloned()
                .collect();
            assert_eq!(total_earnings(&in_month), *amount);
        }
    }

    #[test]
    fn summary_counts_jobs() {
        let summary = summary(&sample());
        assert_eq!(summary.total_jobs, 5);
        assert_eq!(summary.paid_jobs, 4);
        assert_eq!(summary.unpaid_jobs, 1);
        assert_eq!(summary.potential_earnings, Money::new(30_000));
        assert_eq!(super::summary(&[]), JobSummary::default());
    }

    #[test]
    fn upcoming_is_inclusive_and_sorted() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 25).unwrap();
        let records = sample();
        let upcoming = upcoming_deadlines(&records, today, 19);
        let projects: Vec<_> = upcoming.iter().map(|(_, j)| j.project.as_str()).collect();
        assert_eq!(projects, vec!["Flyer", "Logo"]);
        assert_eq!(upcoming[0].0, 2);

        assert!(upcoming_deadlines(&records, today, 0).is_empty());
        let on_the_day = upcoming_deadlines(&records, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 0);
        assert_eq!(on_the_day.len(), 1);
    }
}
