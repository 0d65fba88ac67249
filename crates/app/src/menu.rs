//! Interactive numbered menu.
//!
//! Input and output are generic so the loop runs the same against a terminal
//! and against scripted input.
use std::io::{BufRead, Write};

use chrono::NaiveDate;
use engine::{EngineError, JobEdit, JobFilter, JobStore, NewJob, parse_paid, stats};

use crate::{chart, error::Result, output, settings::Settings};

const ITEMS: [&str; 11] = [
    "Add a new job",
    "List all jobs",
    "List unpaid jobs",
    "List upcoming deadlines",
    "Mark job as paid",
    "Mark job as unpaid",
    "View statistics",
    "Edit a job",
    "View monthly earnings",
    "View monthly earnings chart",
    "Exit",
];

/// What the loop should do after an action.
enum Flow {
    Continue,
    Exit,
}

pub struct Menu<'a, R, W> {
    store: &'a mut JobStore,
    settings: &'a Settings,
    today: NaiveDate,
    input: &'a mut R,
    out: &'a mut W,
    interactive_chart: bool,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(
        store: &'a mut JobStore,
        settings: &'a Settings,
        today: NaiveDate,
        input: &'a mut R,
        out: &'a mut W,
    ) -> Self {
        Self {
            store,
            settings,
            today,
            input,
            out,
            interactive_chart: false,
        }
    }

    /// Open the full-screen chart instead of printing ASCII bars.
    pub fn interactive_chart(mut self, enabled: bool) -> Self {
        self.interactive_chart = enabled;
        self
    }

    /// Loops until "Exit" is chosen or input ends.
    ///
    /// Rejected input is reported and the loop continues. A failed write of
    /// the data file is reported too: the store keeps its last saved state.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.print_menu()?;
            let Some(choice) = self.prompt(&format!("Enter your choice (1-{}): ", ITEMS.len()))?
            else {
                break;
            };

            match self.dispatch(choice.trim()) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break,
                Err(crate::error::AppError::Engine(err)) => self.report(&err)?,
                Err(err) => return Err(err),
            }
        }
        writeln!(self.out, "Exiting Freelance Job Tracker. Goodbye!")?;
        Ok(())
    }

    fn print_menu(&mut self) -> Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "Freelance Job Tracker Menu:")?;
        for (number, item) in ITEMS.iter().enumerate() {
            writeln!(self.out, "{}. {item}", number + 1)?;
        }
        Ok(())
    }

    fn report(&mut self, err: &EngineError) -> Result<()> {
        if err.is_storage() {
            tracing::error!("{err}");
        } else {
            tracing::debug!("rejected: {err}");
        }
        writeln!(self.out, "Error: {err}")?;
        Ok(())
    }

    fn dispatch(&mut self, choice: &str) -> Result<Flow> {
        let symbol = self.settings.currency_symbol.clone();
        match choice {
            "1" => return self.add_job(),
            "2" => {
                writeln!(self.out, "\nAll Jobs:")?;
                self.list(JobFilter::default())?;
            }
            "3" => {
                writeln!(self.out, "\nUnpaid Jobs:")?;
                self.list(JobFilter {
                    unpaid_only: true,
                    ..JobFilter::default()
                })?;
            }
            "4" => {
                let days = self.settings.upcoming_days;
                writeln!(self.out, "\nUpcoming Deadlines (next {days} days):")?;
                let jobs = stats::upcoming_deadlines(self.store.all(), self.today, days);
                output::write_jobs(&mut *self.out, &jobs, &symbol)?;
            }
            "5" => return self.mark(true),
            "6" => return self.mark(false),
            "7" => {
                writeln!(self.out)?;
                let days = self.settings.upcoming_days;
                let summary = stats::summary(self.store.all());
                let upcoming = stats::upcoming_deadlines(self.store.all(), self.today, days);
                output::write_summary(&mut *self.out, &summary, &upcoming, days, &symbol)?;
            }
            "8" => return self.edit_job(),
            "9" => {
                writeln!(self.out, "\nMonthly Earnings:")?;
                let breakdown = stats::monthly_breakdown(self.store.all());
                output::write_breakdown(&mut *self.out, &breakdown, &symbol)?;
            }
            "10" => {
                let breakdown = stats::monthly_breakdown(self.store.all());
                if self.interactive_chart && !breakdown.is_empty() {
                    chart::show(&breakdown, &symbol)?;
                } else {
                    chart::write_plain(&mut *self.out, &breakdown, self.settings.chart_width, &symbol)?;
                }
            }
            "11" => return Ok(Flow::Exit),
            _ => writeln!(
                self.out,
                "Invalid choice. Please enter a number between 1 and {}.",
                ITEMS.len()
            )?,
        }
        Ok(Flow::Continue)
    }

    fn list(&mut self, filter: JobFilter) -> Result<()> {
        let jobs = self.store.filter(filter, self.today);
        output::write_jobs(&mut *self.out, &jobs, &self.settings.currency_symbol)
    }

    fn add_job(&mut self) -> Result<Flow> {
        writeln!(self.out, "\nAdd New Job")?;
        let Some(client) = self.prompt("Client name: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(project) = self.prompt("Project name: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(payment) = self.prompt(&format!("Payment: {}", self.settings.currency_symbol))?
        else {
            return Ok(Flow::Exit);
        };
        let Some(deadline) = self.prompt("Deadline (YYYY-MM-DD): ")? else {
            return Ok(Flow::Exit);
        };
        let Some(notes) = self.prompt("Notes (optional): ")? else {
            return Ok(Flow::Exit);
        };

        let record = NewJob {
            client,
            project,
            deadline,
            payment,
            notes: Some(notes),
        }
        .validate()?;
        let index = self.store.append(record)?;
        let job = self.store.get(index)?;
        writeln!(
            self.out,
            "Job '{}' for client '{}' added as #{index}.",
            job.project, job.client
        )?;
        Ok(Flow::Continue)
    }

    fn mark(&mut self, paid: bool) -> Result<Flow> {
        let status = if paid { "paid" } else { "unpaid" };
        let Some(raw) = self.prompt(&format!("Enter job number or project name to mark as {status}: "))?
        else {
            return Ok(Flow::Exit);
        };
        let index = self.resolve(&raw)?;
        self.store.set_paid(index, paid)?;
        writeln!(
            self.out,
            "Job '{}' marked as {status}.",
            self.store.get(index)?.project
        )?;
        Ok(Flow::Continue)
    }

    fn edit_job(&mut self) -> Result<Flow> {
        let Some(raw) = self.prompt("Enter job number or project name to edit: ")? else {
            return Ok(Flow::Exit);
        };
        let index = self.resolve(&raw)?;

        writeln!(self.out, "\nLeave blank to keep current value")?;
        let mut answers: [Option<String>; 6] = Default::default();
        let labels = [
            "New client name: ".to_string(),
            "New project name: ".to_string(),
            format!("New payment: {}", self.settings.currency_symbol),
            "New deadline (YYYY-MM-DD): ".to_string(),
            "Paid? (yes/no): ".to_string(),
            "New notes: ".to_string(),
        ];
        for (slot, label) in answers.iter_mut().zip(&labels) {
            let Some(answer) = self.prompt(label)? else {
                return Ok(Flow::Exit);
            };
            *slot = Some(answer.trim().to_string()).filter(|a| !a.is_empty());
        }
        let [client, project, payment, deadline, paid, notes] = answers;

        let paid = match paid.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None => None,
            Some("yes" | "y") => Some(true),
            Some("no" | "n") => Some(false),
            Some(other) => Some(parse_paid(other).ok_or_else(|| {
                EngineError::Validation(format!("expected yes or no, got \"{other}\""))
            })?),
        };

        let edit = JobEdit {
            client,
            project,
            deadline,
            payment,
            paid,
            notes,
        };
        if edit.is_empty() {
            writeln!(self.out, "No changes made.")?;
            return Ok(Flow::Continue);
        }

        let job = self.store.edit(index, &edit)?;
        writeln!(self.out, "Job '{}' updated successfully.", job.project)?;
        Ok(Flow::Continue)
    }

    /// A number selects by position, anything else by project name.
    fn resolve(&self, raw: &str) -> Result<usize> {
        let raw = raw.trim();
        let index = match raw.parse::<usize>() {
            Ok(index) => self.store.get(index).map(|_| index)?,
            Err(_) => self.store.require_project(raw)?,
        };
        Ok(index)
    }

    /// Prints `label` and reads one line. `None` at end of input.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.out, "{label}")?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.out)?;
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}
