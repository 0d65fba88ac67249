//! The module contains the `JobRecord` type, one tracked freelance job, and
//! the raw input types that are validated into it.
//!
//! A record is only ever built through validation: [`NewJob::validate`] and
//! [`JobEdit::apply`] return either a complete record or
//! [`EngineError::Validation`].
use core::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::{EngineError, Money, ResultEngine};

/// Date format used for deadlines, both in the data file and in user input.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One freelance job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct JobRecord {
    pub client: String,
    pub project: String,
    pub deadline: NaiveDate,
    pub payment: Money,
    pub paid: bool,
    pub notes: Option<String>,
}

impl JobRecord {
    /// Builds an unpaid job, checking every invariant.
    pub fn new(
        client: &str,
        project: &str,
        deadline: NaiveDate,
        payment: Money,
    ) -> ResultEngine<Self> {
        let record = Self {
            client: client.trim().to_string(),
            project: project.trim().to_string(),
            deadline,
            payment,
            paid: false,
            notes: None,
        };
        record.validate()?;
        Ok(record)
    }

    /// Sets the notes, mapping blank text to `None`.
    #[must_use]
    pub fn with_notes(mut self, notes: Option<&str>) -> Self {
        self.notes = normalize_notes(notes);
        self
    }

    /// Sets the paid flag.
    #[must_use]
    pub fn with_paid(mut self, paid: bool) -> Self {
        self.paid = paid;
        self
    }

    /// Checks the record invariants: non-empty client and project, payment
    /// within `0..=Money::MAX_PAYMENT`, notes not blank.
    pub fn validate(&self) -> ResultEngine<()> {
        if self.client.trim().is_empty() {
            return Err(EngineError::Validation(
                "client name must not be empty".to_string(),
            ));
        }
        if self.project.trim().is_empty() {
            return Err(EngineError::Validation(
                "project name must not be empty".to_string(),
            ));
        }
        check_payment(self.payment)?;
        if let Some(notes) = &self.notes
            && notes.trim().is_empty()
        {
            return Err(EngineError::Validation(
                "notes must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for JobRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.paid { "paid" } else { "unpaid" };
        write!(
            f,
            "{} for {} due {} ({}, {})",
            self.project,
            self.client,
            self.deadline.format(DATE_FORMAT),
            self.payment,
            status
        )
    }
}

/// Raw user input for a new job, as typed at a prompt or on the command line.
#[derive(Clone, Debug, Default)]
pub struct NewJob {
    pub client: String,
    pub project: String,
    pub deadline: String,
    pub payment: String,
    pub notes: Option<String>,
}

impl NewJob {
    /// Parses and validates the input into an unpaid [`JobRecord`].
    pub fn validate(&self) -> ResultEngine<JobRecord> {
        let deadline = parse_deadline(&self.deadline)?;
        let payment = parse_payment(&self.payment)?;
        Ok(JobRecord::new(&self.client, &self.project, deadline, payment)?
            .with_notes(self.notes.as_deref()))
    }
}

/// Partial update of a job. `None` keeps the current value.
///
/// `notes: Some("")` clears the notes.
#[derive(Clone, Debug, Default)]
pub struct JobEdit {
    pub client: Option<String>,
    pub project: Option<String>,
    pub deadline: Option<String>,
    pub payment: Option<String>,
    pub paid: Option<bool>,
    pub notes: Option<String>,
}

impl JobEdit {
    /// Returns `true` when no field would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.client.is_none()
            && self.project.is_none()
            && self.deadline.is_none()
            && self.payment.is_none()
            && self.paid.is_none()
            && self.notes.is_none()
    }

    /// Returns a copy of `current` with the edit applied. The original is
    /// left untouched, so a failed edit never leaves a half-updated job.
    pub fn apply(&self, current: &JobRecord) -> ResultEngine<JobRecord> {
        if self.is_empty() {
            return Err(EngineError::Validation("nothing to update".to_string()));
        }

        let mut updated = current.clone();
        if let Some(client) = &self.client {
            updated.client = client.trim().to_string();
        }
        if let Some(project) = &self.project {
            updated.project = project.trim().to_string();
        }
        if let Some(deadline) = &self.deadline {
            updated.deadline = parse_deadline(deadline)?;
        }
        if let Some(payment) = &self.payment {
            updated.payment = parse_payment(payment)?;
        }
        if let Some(paid) = self.paid {
            updated.paid = paid;
        }
        if let Some(notes) = &self.notes {
            updated.notes = normalize_notes(Some(notes));
        }

        updated.validate()?;
        Ok(updated)
    }
}

/// Parses a `YYYY-MM-DD` deadline.
pub fn parse_deadline(raw: &str) -> ResultEngine<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
        EngineError::Validation(format!("invalid deadline \"{raw}\", expected YYYY-MM-DD"))
    })
}

/// Parses a payment and rejects negative or oversized values.
pub fn parse_payment(raw: &str) -> ResultEngine<Money> {
    let payment: Money = raw.parse()?;
    check_payment(payment)?;
    Ok(payment)
}

fn check_payment(payment: Money) -> ResultEngine<()> {
    if payment.is_negative() {
        return Err(EngineError::Validation(format!(
            "payment must be >= 0, got {payment}"
        )));
    }
    if payment > Money::MAX_PAYMENT {
        return Err(EngineError::Validation(format!(
            "payment must be at most {}, got {payment}",
            Money::MAX_PAYMENT
        )));
    }
    Ok(())
}

/// Parses a paid flag: `true`/`false` or `1`/`0`, case-insensitive.
pub fn parse_paid(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn normalize_notes(notes: Option<&str>) -> Option<String> {
    notes
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn acme() -> NewJob {
        NewJob {
            client: "Acme".to_string(),
            project: "Logo".to_string(),
            deadline: "2024-03-15".to_string(),
            payment: "500.00".to_string(),
            notes: None,
        }
    }

    #[test]
    fn new_job_validates_into_unpaid_record() {
        let record = acme().validate().unwrap();
        assert_eq!(record.client, "Acme");
        assert_eq!(record.project, "Logo");
        assert_eq!(record.deadline, date(2024, 3, 15));
        assert_eq!(record.payment, Money::new(50_000));
        assert!(!record.paid);
        assert_eq!(record.notes, None);
    }

    #[test]
    fn new_job_trims_text_and_drops_blank_notes() {
        let record = NewJob {
            client: "  Acme ".to_string(),
            notes: Some("   ".to_string()),
            ..acme()
        }
        .validate()
        .unwrap();
        assert_eq!(record.client, "Acme");
        assert_eq!(record.notes, None);
    }

    #[test]
    fn new_job_rejects_negative_payment() {
        let err = NewJob {
            payment: "-1".to_string(),
            ..acme()
        }
        .validate()
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::Validation("payment must be >= 0, got -1.00".to_string())
        );
    }

    #[test]
    fn payment_above_the_cap_is_rejected() {
        assert_eq!(
            parse_payment("10000000000.00").unwrap(),
            Money::MAX_PAYMENT
        );
        assert_eq!(
            parse_payment("10000000000.01").unwrap_err(),
            EngineError::Validation(
                "payment must be at most 10000000000.00, got 10000000000.01".to_string()
            )
        );

        let mut record = acme().validate().unwrap();
        record.payment = Money::new(i64::MAX);
        assert!(matches!(record.validate(), Err(EngineError::Validation(_))));
    }

    #[test]
    fn new_job_rejects_bad_dates() {
        for raw in ["2024-02-30", "15/03/2024", "", "2024-13-01"] {
            let err = NewJob {
                deadline: raw.to_string(),
                ..acme()
            }
            .validate()
            .unwrap_err();
            assert!(matches!(err, EngineError::Validation(_)), "{raw}: {err}");
        }
    }

    #[test]
    fn new_job_rejects_empty_names() {
        let err = NewJob {
            project: " ".to_string(),
            ..acme()
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn edit_applies_only_given_fields() {
        let record = acme().validate().unwrap();
        let edit = JobEdit {
            payment: Some("750".to_string()),
            paid: Some(true),
            notes: Some("rush".to_string()),
            ..JobEdit::default()
        };
        let updated = edit.apply(&record).unwrap();
        assert_eq!(updated.client, "Acme");
        assert_eq!(updated.deadline, record.deadline);
        assert_eq!(updated.payment, Money::new(75_000));
        assert!(updated.paid);
        assert_eq!(updated.notes.as_deref(), Some("rush"));
    }

    #[test]
    fn edit_with_blank_notes_clears_them() {
        let record = acme().validate().unwrap().with_notes(Some("draft"));
        let edit = JobEdit {
            notes: Some(String::new()),
            ..JobEdit::default()
        };
        assert_eq!(edit.apply(&record).unwrap().notes, None);
    }

    #[test]
    fn empty_or_invalid_edit_is_rejected() {
        let record = acme().validate().unwrap();
        assert!(JobEdit::default().apply(&record).is_err());

        let edit = JobEdit {
            deadline: Some("tomorrow".to_string()),
            ..JobEdit::default()
        };
        assert!(matches!(
            edit.apply(&record),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn paid_flag_accepts_both_conventions() {
        assert_eq!(parse_paid("true"), Some(true));
        assert_eq!(parse_paid("FALSE"), Some(false));
        assert_eq!(parse_paid(" 1 "), Some(true));
        assert_eq!(parse_paid("0"), Some(false));
        assert_eq!(parse_paid("yes"), None);
    }
}
