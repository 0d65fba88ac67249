//! Record keeping for freelance jobs.
//!
//! [`JobStore`] owns the job list and the CSV file behind it; the functions
//! in [`stats`] derive earnings figures from any slice of [`JobRecord`]s.
//!
//! ```rust,no_run
//! use engine::{JobStore, NewJob, stats};
//!
//! # fn main() -> Result<(), engine::EngineError> {
//! let mut store = JobStore::open("freelance_jobs.csv")?;
//! let index = store.append(
//!     NewJob {
//!         client: "Acme".into(),
//!         project: "Logo".into(),
//!         deadline: "2024-03-15".into(),
//!         payment: "500.00".into(),
//!         notes: None,
//!     }
//!     .validate()?,
//! )?;
//! store.set_paid(index, true)?;
//! println!("earned {}", stats::total_earnings(store.all()));
//! # Ok(())
//! # }
//! ```
pub use error::EngineError;
pub use job::{DATE_FORMAT, JobEdit, JobRecord, NewJob, parse_deadline, parse_paid, parse_payment};
pub use money::Money;
pub use stats::{JobSummary, MonthlyBreakdown, YearMonth};
pub use store::{JobFilter, JobStore};

mod error;
mod job;
mod money;
pub mod stats;
pub mod store;

pub type ResultEngine<T> = Result<T, EngineError>;
