//! Flat-file persistence for job records.
//!
//! The data file is a CSV with a header row:
//!
//! ```text
//! client,project,deadline,payment,paid,notes
//! Acme,Logo,2024-03-15,500.00,false,
//! ```
//!
//! Columns are matched by header name. `notes` is optional so that files
//! written without it still load. Every mutation rewrites the whole file
//! through a temporary sibling that is renamed over the target, so a reader
//! never sees half a file.
use std::{
    fs::{self, File},
    io::{self, BufWriter},
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::{
    EngineError, JobEdit, JobRecord, ResultEngine,
    job::{DATE_FORMAT, parse_paid},
};

const REQUIRED_COLUMNS: [&str; 5] = ["client", "project", "deadline", "payment", "paid"];

/// One CSV row exactly as stored, before any validation.
#[derive(Debug, Serialize, Deserialize)]
struct Row {
    client: String,
    project: String,
    deadline: String,
    payment: String,
    paid: String,
    #[serde(default)]
    notes: Option<String>,
}

impl From<&JobRecord> for Row {
    fn from(job: &JobRecord) -> Self {
        Self {
            client: job.client.clone(),
            project: job.project.clone(),
            deadline: job.deadline.format(DATE_FORMAT).to_string(),
            payment: job.payment.to_string(),
            paid: job.paid.to_string(),
            notes: job.notes.clone(),
        }
    }
}

impl Row {
    fn into_record(self, line: u64) -> ResultEngine<JobRecord> {
        let corrupt = |reason: String| EngineError::corrupt(line, reason);

        let deadline = NaiveDate::parse_from_str(&self.deadline, DATE_FORMAT)
            .map_err(|_| corrupt(format!("invalid deadline \"{}\"", self.deadline)))?;
        let payment = self
            .payment
            .parse()
            .map_err(|_| corrupt(format!("invalid payment \"{}\"", self.payment)))?;
        let paid = parse_paid(&self.paid)
            .ok_or_else(|| corrupt(format!("invalid paid flag \"{}\"", self.paid)))?;

        let record = JobRecord {
            client: self.client,
            project: self.project,
            deadline,
            payment,
            paid,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
        };
        record.validate().map_err(|err| match err {
            EngineError::Validation(reason) => corrupt(reason),
            other => other,
        })?;
        Ok(record)
    }
}

/// Which jobs a listing should show.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JobFilter {
    /// Only jobs not yet paid.
    pub unpaid_only: bool,
    /// Only jobs whose deadline falls between today and today + N days.
    pub due_within_days: Option<u32>,
}

impl JobFilter {
    /// Returns `true` if `job` passes the filter on the given day.
    #[must_use]
    pub fn matches(&self, job: &JobRecord, today: NaiveDate) -> bool {
        if self.unpaid_only && job.paid {
            return false;
        }
        match self.due_within_days {
            Some(days) => crate::stats::due_within(job, today, days),
            None => true,
        }
    }
}

/// Owner of the job list and of the file backing it.
#[derive(Debug)]
pub struct JobStore {
    path: PathBuf,
    jobs: Vec<JobRecord>,
}

impl JobStore {
    /// Opens the store at `path`, loading any existing jobs.
    pub fn open(path: impl Into<PathBuf>) -> ResultEngine<Self> {
        let path = path.into();
        let jobs = load(&path)?;
        tracing::debug!("loaded {} jobs from {}", jobs.len(), path.display());
        Ok(Self { path, jobs })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-reads the backing file, replacing the in-memory list.
    pub fn load(&mut self) -> ResultEngine<&[JobRecord]> {
        self.jobs = load(&self.path)?;
        Ok(&self.jobs)
    }

    /// Read-only view of every job, in storage order.
    #[must_use]
    pub fn all(&self) -> &[JobRecord] {
        &self.jobs
    }

    /// Owned copy of every job.
    #[must_use]
    pub fn snapshot(&self) -> Vec<JobRecord> {
        self.jobs.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn get(&self, index: usize) -> ResultEngine<&JobRecord> {
        self.jobs.get(index).ok_or(EngineError::IndexOutOfRange {
            index,
            len: self.jobs.len(),
        })
    }

    /// Position of the first job whose project matches `name`, ignoring case
    /// and surrounding whitespace.
    #[must_use]
    pub fn find_by_project(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.jobs
            .iter()
            .position(|job| job.project.eq_ignore_ascii_case(name))
    }

    /// Like [`find_by_project`](Self::find_by_project) but fails with
    /// [`EngineError::JobNotFound`].
    pub fn require_project(&self, name: &str) -> ResultEngine<usize> {
        self.find_by_project(name)
            .ok_or_else(|| EngineError::JobNotFound(name.trim().to_string()))
    }

    /// Jobs passing `filter`, paired with their position.
    #[must_use]
    pub fn filter(&self, filter: JobFilter, today: NaiveDate) -> Vec<(usize, &JobRecord)> {
        self.jobs
            .iter()
            .enumerate()
            .filter(|(_, job)| filter.matches(job, today))
            .collect()
    }

    /// Adds a job at the end and persists the list.
    pub fn append(&mut self, record: JobRecord) -> ResultEngine<usize> {
        record.validate()?;
        self.jobs.push(record);
        if let Err(err) = self.persist() {
            self.jobs.pop();
            return Err(err);
        }
        let index = self.jobs.len() - 1;
        tracing::info!("added job #{index}: {}", self.jobs[index]);
        Ok(index)
    }

    /// Sets the paid flag of the job at `index` and persists the list.
    pub fn set_paid(&mut self, index: usize, paid: bool) -> ResultEngine<()> {
        let previous = self.get(index)?.paid;
        self.jobs[index].paid = paid;
        if let Err(err) = self.persist() {
            self.jobs[index].paid = previous;
            return Err(err);
        }
        tracing::info!("job #{index} marked {}", if paid { "paid" } else { "unpaid" });
        Ok(())
    }

    /// Applies `edit` to the job at `index` and persists the list.
    pub fn edit(&mut self, index: usize, edit: &JobEdit) -> ResultEngine<&JobRecord> {
        let updated = edit.apply(self.get(index)?)?;
        let previous = std::mem::replace(&mut self.jobs[index], updated);
        if let Err(err) = self.persist() {
            self.jobs[index] = previous;
            return Err(err);
        }
        tracing::info!("job #{index} updated: {}", self.jobs[index]);
        Ok(&self.jobs[index])
    }

    fn persist(&self) -> ResultEngine<()> {
        save(&self.path, &self.jobs)
    }
}

/// Reads every job from `path`. A missing or empty file yields no jobs.
pub fn load(path: &Path) -> ResultEngine<Vec<JobRecord>> {
    let content = match fs::read(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("{} not found, starting empty", path.display());
            return Ok(Vec::new());
        }
        Err(err) => return Err(EngineError::unavailable(path, err)),
    };
    if content.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    parse(content.as_slice())
}

fn parse(input: impl io::Read) -> ResultEngine<Vec<JobRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(input);

    let headers = reader.headers().map_err(csv_corrupt)?.clone();
    check_headers(&headers)?;

    let mut jobs = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_corrupt)?;
        let line = record.position().map_or(0, csv::Position::line);
        let row: Row = record
            .deserialize(Some(&headers))
            .map_err(|err| EngineError::corrupt(line, err.to_string()))?;
        jobs.push(row.into_record(line)?);
    }
    Ok(jobs)
}

fn check_headers(headers: &StringRecord) -> ResultEngine<()> {
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(EngineError::corrupt(
                1,
                format!("missing required column \"{column}\""),
            ));
        }
    }
    Ok(())
}

fn csv_corrupt(err: csv::Error) -> EngineError {
    let line = err.position().map_or(0, csv::Position::line);
    EngineError::corrupt(line, err.to_string())
}

/// Writes every job to `path`, replacing the file atomically.
pub fn save(path: &Path, jobs: &[JobRecord]) -> ResultEngine<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|err| EngineError::unavailable(parent, err))?;
    }

    let tmp_path = tmp_path(path);
    if let Err(err) = write_rows(&tmp_path, jobs) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }
    fs::rename(&tmp_path, path).map_err(|err| {
        let _ = fs::remove_file(&tmp_path);
        EngineError::unavailable(path, err)
    })?;

    tracing::debug!("saved {} jobs to {}", jobs.len(), path.display());
    Ok(())
}

fn write_rows(tmp_path: &Path, jobs: &[JobRecord]) -> ResultEngine<()> {
    let unavailable = |err: io::Error| EngineError::unavailable(tmp_path, err);

    let file = File::create(tmp_path).map_err(unavailable)?;
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file));

    writer
        .write_record(REQUIRED_COLUMNS.iter().chain(["notes"].iter()))
        .map_err(|err| unavailable(err.into()))?;
    for job in jobs {
        writer
            .serialize(Row::from(job))
            .map_err(|err| unavailable(err.into()))?;
    }

    let buffered = writer
        .into_inner()
        .map_err(|err| unavailable(err.into_error()))?;
    let file = buffered
        .into_inner()
        .map_err(|err| unavailable(err.into_error()))?;
    file.sync_all().map_err(unavailable)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Money;

    fn parse_str(input: &str) -> ResultEngine<Vec<JobRecord>> {
        parse(input.as_bytes())
    }

    #[test]
    fn parses_rows_with_any_column_order() {
        let jobs = parse_str(
            "paid,payment,deadline,project,client\n\
             1,120.5,2024-01-31,Site,Globex\n\
             false,80,2024-02-01,Banner,Acme\n",
        )
        .unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].client, "Globex");
        assert_eq!(jobs[0].payment, Money::new(12_050));
        assert!(jobs[0].paid);
        assert_eq!(jobs[1].notes, None);
        assert!(!jobs[1].paid);
    }

    #[test]
    fn missing_column_is_corrupt() {
        let err = parse_str("client,project,deadline,payment\nAcme,Logo,2024-03-15,500\n")
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::corrupt(1, "missing required column \"paid\"")
        );
    }

    #[test]
    fn bad_cells_are_corrupt_with_their_line() {
        let cases = [
            "Acme,Logo,2024-03-32,500,false",
            "Acme,Logo,2024-03-15,five,false",
            "Acme,Logo,2024-03-15,-5,false",
            "Acme,Logo,2024-03-15,500,maybe",
            "Acme,,2024-03-15,500,false",
        ];
        for row in cases {
            let input = format!(
                "client,project,deadline,payment,paid\nOk,Fine,2024-01-01,1,true\n{row}\n"
            );
            match parse_str(&input) {
                Err(EngineError::StorageCorrupt { line, .. }) => assert_eq!(line, 3, "{row}"),
                other => panic!("{row}: expected corrupt, got {other:?}"),
            }
        }
    }

    #[test]
    fn short_row_is_corrupt() {
        let err = parse_str("client,project,deadline,payment,paid\nAcme,Logo,2024-03-15\n")
            .unwrap_err();
        assert!(matches!(err, EngineError::StorageCorrupt { .. }), "{err}");
    }

    #[test]
    fn tmp_path_is_a_sibling() {
        assert_eq!(
            tmp_path(Path::new("/data/jobs.csv")),
            PathBuf::from("/data/jobs.csv.tmp")
        );
    }

    #[test]
    fn filter_combines_unpaid_and_due_window() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let job = |deadline: &str, paid: bool| {
            JobRecord::new("Acme", "Logo", crate::parse_deadline(deadline).unwrap(), Money::new(100))
                .unwrap()
                .with_paid(paid)
        };

        let filter = JobFilter {
            unpaid_only: true,
            due_within_days: Some(7),
        };
        assert!(filter.matches(&job("2024-03-10", false), today));
        assert!(filter.matches(&job("2024-03-17", false), today));
        assert!(!filter.matches(&job("2024-03-18", false), today));
        assert!(!filter.matches(&job("2024-03-09", false), today));
        assert!(!filter.matches(&job("2024-03-12", true), today));
        assert!(JobFilter::default().matches(&job("2020-01-01", true), today));
    }
}
