use std::io::{BufRead, Write};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use engine::{JobEdit, JobFilter, JobStore, NewJob, ResultEngine, stats};

use crate::{chart, error::Result, menu::Menu, output, settings::Settings};

#[derive(Parser, Debug)]
#[command(name = "jobtracker")]
#[command(about = "Track freelance jobs, payments and monthly earnings")]
pub struct Cli {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override the jobs CSV file.
    #[arg(long, global = true, env = "JOBTRACKER_DATA_FILE")]
    pub data_file: Option<String>,
    /// Override the log level (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new job.
    Add(AddArgs),
    /// List jobs.
    List(ListArgs),
    /// List jobs due in the next days.
    Upcoming {
        /// Window in days (defaults to `upcoming_days` from the settings).
        #[arg(long)]
        days: Option<u32>,
    },
    /// Mark a job as paid.
    MarkPaid(Target),
    /// Mark a job as not paid.
    MarkUnpaid(Target),
    /// Change some fields of a job.
    Edit(EditArgs),
    /// Show counts, earnings and upcoming deadlines.
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Show total earnings.
    Total,
    /// Show earnings per deadline month.
    Monthly {
        #[arg(long)]
        json: bool,
    },
    /// Draw a bar chart of monthly earnings.
    Chart {
        /// Print ASCII bars instead of opening the full-screen view.
        #[arg(long)]
        plain: bool,
    },
    /// Interactive menu (the default).
    Menu,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(long)]
    client: String,
    #[arg(long)]
    project: String,
    /// Deadline as YYYY-MM-DD.
    #[arg(long)]
    deadline: String,
    /// Amount, e.g. 500 or 500.00.
    #[arg(long, allow_hyphen_values = true)]
    payment: String,
    #[arg(long)]
    notes: Option<String>,
    /// Record the job as already paid.
    #[arg(long)]
    paid: bool,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only jobs not yet paid.
    #[arg(long)]
    unpaid: bool,
    /// Only jobs due within this many days.
    #[arg(long)]
    due_within: Option<u32>,
    #[arg(long)]
    json: bool,
}

/// A job chosen by position or by project name.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct Target {
    /// Position shown by `list`.
    index: Option<usize>,
    /// Project name (case-insensitive).
    #[arg(long)]
    project: Option<String>,
}

impl Target {
    fn resolve(&self, store: &JobStore) -> ResultEngine<usize> {
        match (&self.index, &self.project) {
            (_, Some(project)) => store.require_project(project),
            (Some(index), None) => store.get(*index).map(|_| *index),
            (None, None) => Err(engine::EngineError::Validation(
                "a job index or --project is required".to_string(),
            )),
        }
    }
}

#[derive(Args, Debug)]
pub struct EditArgs {
    #[command(flatten)]
    target: Target,
    #[arg(long)]
    client: Option<String>,
    /// New project name.
    #[arg(long)]
    new_project: Option<String>,
    #[arg(long)]
    deadline: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    payment: Option<String>,
    /// true/false or 1/0.
    #[arg(long, value_parser = parse_paid_arg)]
    paid: Option<bool>,
    /// New notes; an empty string clears them.
    #[arg(long)]
    notes: Option<String>,
}

fn parse_paid_arg(raw: &str) -> std::result::Result<bool, String> {
    engine::parse_paid(raw).ok_or_else(|| format!("expected true/false or 1/0, got \"{raw}\""))
}

/// Runs one subcommand against `store`, writing results to `out`. Only the
/// interactive menu reads from `input`.
pub fn execute(
    command: Command,
    store: &mut JobStore,
    settings: &Settings,
    today: NaiveDate,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    let symbol = settings.currency_symbol.as_str();
    match command {
        Command::Add(args) => {
            let record = NewJob {
                client: args.client,
                project: args.project,
                deadline: args.deadline,
                payment: args.payment,
                notes: args.notes,
            }
            .validate()?
            .with_paid(args.paid);
            let index = store.append(record)?;
            writeln!(out, "Added job #{index}: {}", store.get(index)?)?;
        }
        Command::List(args) => {
            let filter = JobFilter {
                unpaid_only: args.unpaid,
                due_within_days: args.due_within,
            };
            let jobs = store.filter(filter, today);
            if args.json {
                output::write_jobs_json(out, &jobs)?;
            } else {
                output::write_jobs(out, &jobs, symbol)?;
            }
        }
        Command::Upcoming { days } => {
            let days = days.unwrap_or(settings.upcoming_days);
            let jobs = stats::upcoming_deadlines(store.all(), today, days);
            output::write_jobs(out, &jobs, symbol)?;
        }
        Command::MarkPaid(target) => {
            let index = target.resolve(store)?;
            store.set_paid(index, true)?;
            writeln!(out, "Job #{index} '{}' marked as paid.", store.get(index)?.project)?;
        }
        Command::MarkUnpaid(target) => {
            let index = target.resolve(store)?;
            store.set_paid(index, false)?;
            writeln!(out, "Job #{index} '{}' marked as unpaid.", store.get(index)?.project)?;
        }
        Command::Edit(args) => {
            let index = args.target.resolve(store)?;
            let edit = JobEdit {
                client: args.client,
                project: args.new_project,
                deadline: args.deadline,
                payment: args.payment,
                paid: args.paid,
                notes: args.notes,
            };
            let job = store.edit(index, &edit)?;
            writeln!(out, "Job #{index} updated: {job}")?;
        }
        Command::Stats { json } => {
            let summary = stats::summary(store.all());
            let upcoming = stats::upcoming_deadlines(store.all(), today, settings.upcoming_days);
            if json {
                output::write_summary_json(out, &summary, &upcoming)?;
            } else {
                output::write_summary(out, &summary, &upcoming, settings.upcoming_days, symbol)?;
            }
        }
        Command::Total => {
            output::write_total(out, stats::total_earnings(store.all()), symbol)?;
        }
        Command::Monthly { json } => {
            let breakdown = stats::monthly_breakdown(store.all());
            if json {
                output::write_breakdown_json(out, &breakdown)?;
            } else {
                output::write_breakdown(out, &breakdown, symbol)?;
            }
        }
        Command::Chart { plain } => {
            let breakdown = stats::monthly_breakdown(store.all());
            if plain || !crate::stdout_is_terminal() {
                chart::write_plain(out, &breakdown, settings.chart_width, symbol)?;
            } else {
                chart::show(&breakdown, symbol)?;
            }
        }
        Command::Menu => {
            Menu::new(store, settings, today, input, out)
                .interactive_chart(crate::stdout_is_terminal())
                .run()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use engine::{EngineError, Money};

    use super::*;
    use crate::error::AppError;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn run(store: &mut JobStore, args: &[&str]) -> Result<String> {
        let cli = Cli::try_parse_from(std::iter::once("jobtracker").chain(args.iter().copied()))
            .unwrap();
        let mut out = Vec::new();
        execute(
            cli.command.unwrap(),
            store,
            &Settings::default(),
            today(),
            &mut std::io::empty(),
            &mut out,
        )?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn store() -> (JobStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::open(dir.path().join("jobs.csv")).unwrap();
        (store, dir)
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn add_pay_and_report() {
        let (mut store, _dir) = store();
        let text = run(
            &mut store,
            &[
                "add", "--client", "Acme", "--project", "Logo", "--deadline", "2024-03-15",
                "--payment", "500.00",
            ],
        )
        .unwrap();
        assert_eq!(text, "Added job #0: Logo for Acme due 2024-03-15 (500.00, unpaid)\n");
        assert_eq!(run(&mut store, &["total"]).unwrap(), "Total Earnings: $0.00\n");

        let text = run(&mut store, &["mark-paid", "0"]).unwrap();
        assert_eq!(text, "Job #0 'Logo' marked as paid.\n");
        assert_eq!(run(&mut store, &["total"]).unwrap(), "Total Earnings: $500.00\n");
        assert_eq!(
            run(&mut store, &["monthly"]).unwrap(),
            "2024-03       $500.00\n"
        );
    }

    #[test]
    fn negative_payment_is_rejected_with_usage_exit_code() {
        let (mut store, _dir) = store();
        let err = run(
            &mut store,
            &[
                "add", "--client", "Acme", "--project", "Logo", "--deadline", "2024-03-15",
                "--payment", "-5",
            ],
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Engine(EngineError::Validation(_))));
        assert_eq!(err.exit_code(), std::process::ExitCode::from(2));
        assert!(store.is_empty());
    }

    #[test]
    fn mark_by_project_and_unknown_index() {
        let (mut store, _dir) = store();
        run(
            &mut store,
            &[
                "add", "--client", "Acme", "--project", "Logo", "--deadline", "2024-03-15",
                "--payment", "500", "--paid",
            ],
        )
        .unwrap();

        run(&mut store, &["mark-unpaid", "--project", "logo"]).unwrap();
        assert!(!store.all()[0].paid);

        let err = run(&mut store, &["mark-paid", "4"]).unwrap_err();
        assert!(matches!(
            err,
            AppError::Engine(EngineError::IndexOutOfRange { index: 4, len: 1 })
        ));
    }

    #[test]
    fn target_requires_exactly_one_selector() {
        assert!(Cli::try_parse_from(["jobtracker", "mark-paid"]).is_err());
        assert!(Cli::try_parse_from(["jobtracker", "mark-paid", "1", "--project", "x"]).is_err());
    }

    #[test]
    fn edit_updates_selected_fields() {
        let (mut store, _dir) = store();
        run(
            &mut store,
            &[
                "add", "--client", "Acme", "--project", "Logo", "--deadline", "2024-03-15",
                "--payment", "500",
            ],
        )
        .unwrap();
        run(
            &mut store,
            &["edit", "0", "--payment", "650", "--paid", "1", "--notes", "final"],
        )
        .unwrap();

        let job = &store.all()[0];
        assert_eq!(job.payment, Money::new(65_000));
        assert!(job.paid);
        assert_eq!(job.notes.as_deref(), Some("final"));
    }

    #[test]
    fn upcoming_uses_window() {
        let (mut store, _dir) = store();
        for (project, deadline) in [("Soon", "2024-03-12"), ("Later", "2024-04-30")] {
            run(
                &mut store,
                &[
                    "add", "--client", "Acme", "--project", project, "--deadline", deadline,
                    "--payment", "10",
                ],
            )
            .unwrap();
        }
        let text = run(&mut store, &["upcoming"]).unwrap();
        assert!(text.contains("Soon"));
        assert!(!text.contains("Later"));

        let text = run(&mut store, &["upcoming", "--days", "60"]).unwrap();
        assert!(text.contains("Later"));
    }

    #[test]
    fn chart_plain_prints_bars() {
        let (mut store, _dir) = store();
        run(
            &mut store,
            &[
                "add", "--client", "Acme", "--project", "Logo", "--deadline", "2024-03-15",
                "--payment", "500", "--paid",
            ],
        )
        .unwrap();
        let text = run(&mut store, &["chart", "--plain"]).unwrap();
        assert!(text.contains("2024-03 ████████████████████████████████████████ $500.00"));
    }
}
