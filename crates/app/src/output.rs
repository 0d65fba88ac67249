//! Text and JSON rendering of jobs and statistics.
use std::io::Write;

use engine::{DATE_FORMAT, JobRecord, JobSummary, Money, MonthlyBreakdown};
use serde::Serialize;

use crate::error::Result;

const HEADERS: [&str; 7] = ["#", "Client", "Project", "Deadline", "Payment", "Status", "Notes"];

/// Writes `jobs` as an aligned table, or a placeholder line when empty.
pub fn write_jobs(out: &mut impl Write, jobs: &[(usize, &JobRecord)], symbol: &str) -> Result<()> {
    if jobs.is_empty() {
        writeln!(out, "No jobs found matching the criteria.")?;
        return Ok(());
    }

    let rows: Vec<[String; 7]> = jobs
        .iter()
        .map(|(index, job)| {
            [
                index.to_string(),
                job.client.clone(),
                job.project.clone(),
                job.deadline.format(DATE_FORMAT).to_string(),
                job.payment.format(symbol),
                if job.paid { "paid" } else { "unpaid" }.to_string(),
                job.notes.clone().unwrap_or_default(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header = HEADERS.map(str::to_string);
    for row in std::iter::once(&header).chain(&rows) {
        let line = row
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(column, (cell, width))| {
                // Index and payment read better right-aligned.
                if column == 0 || column == 4 {
                    format!("{cell:>width$}")
                } else {
                    format!("{cell:<width$}")
                }
            })
            .collect::<Vec<_>>()
            .join("  ");
        writeln!(out, "{}", line.trim_end())?;
    }
    Ok(())
}

pub fn write_summary(
    out: &mut impl Write,
    summary: &JobSummary,
    upcoming: &[(usize, &JobRecord)],
    days: u32,
    symbol: &str,
) -> Result<()> {
    writeln!(out, "Freelance Job Statistics:")?;
    writeln!(out, "Total Jobs: {}", summary.total_jobs)?;
    writeln!(out, "Paid Jobs: {}", summary.paid_jobs)?;
    writeln!(out, "Unpaid Jobs: {}", summary.unpaid_jobs)?;
    writeln!(out, "Total Earnings: {}", summary.total_earnings.format(symbol))?;
    writeln!(
        out,
        "Potential Earnings: {}",
        summary.potential_earnings.format(symbol)
    )?;

    if !upcoming.is_empty() {
        writeln!(out)?;
        writeln!(out, "Upcoming Deadlines (next {days} days):")?;
        for (index, job) in upcoming {
            writeln!(
                out,
                "#{index} {} for {} due {} ({})",
                job.project,
                job.client,
                job.deadline.format(DATE_FORMAT),
                job.payment.format(symbol)
            )?;
        }
    }
    Ok(())
}

pub fn write_total(out: &mut impl Write, total: Money, symbol: &str) -> Result<()> {
    writeln!(out, "Total Earnings: {}", total.format(symbol))?;
    Ok(())
}

pub fn write_breakdown(out: &mut impl Write, breakdown: &MonthlyBreakdown, symbol: &str) -> Result<()> {
    if breakdown.is_empty() {
        writeln!(out, "No paid jobs yet.")?;
        return Ok(());
    }
    for (month, amount) in breakdown {
        writeln!(out, "{month}  {:>12}", amount.format(symbol))?;
    }
    Ok(())
}

#[derive(Serialize)]
struct JobView<'a> {
    index: usize,
    #[serde(flatten)]
    job: &'a JobRecord,
}

#[derive(Serialize)]
struct MonthView {
    month: String,
    amount: Money,
}

#[derive(Serialize)]
struct SummaryView<'a> {
    #[serde(flatten)]
    summary: &'a JobSummary,
    upcoming: Vec<JobView<'a>>,
}

pub fn write_jobs_json(out: &mut impl Write, jobs: &[(usize, &JobRecord)]) -> Result<()> {
    let views: Vec<_> = jobs
        .iter()
        .map(|(index, job)| JobView { index: *index, job })
        .collect();
    serde_json::to_writer_pretty(&mut *out, &views)?;
    writeln!(out)?;
    Ok(())
}

pub fn write_summary_json(
    out: &mut impl Write,
    summary: &JobSummary,
    upcoming: &[(usize, &JobRecord)],
) -> Result<()> {
    let view = SummaryView {
        summary,
        upcoming: upcoming
            .iter()
            .map(|(index, job)| JobView { index: *index, job })
            .collect(),
    };
    serde_json::to_writer_pretty(&mut *out, &view)?;
    writeln!(out)?;
    Ok(())
}

/// Months are written as `YYYY-MM` strings since JSON object keys cannot be
/// structs.
pub fn write_breakdown_json(out: &mut impl Write, breakdown: &MonthlyBreakdown) -> Result<()> {
    let views: Vec<_> = breakdown
        .iter()
        .map(|(month, amount)| MonthView {
            month: month.to_string(),
            amount: *amount,
        })
        .collect();
    serde_json::to_writer_pretty(&mut *out, &views)?;
    writeln!(out)?;
    Ok(())
}
