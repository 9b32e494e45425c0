//! Load command - run the shapefile tree into PostGIS.

use crate::cli::output::{display_relative, print_table};
use gisload::{ClassifyTable, Dispatcher, LoadConfig, LoadPlan, Scanner};
use std::path::PathBuf;
use std::process::ExitCode;

/// Arguments for the load command.
#[derive(Debug)]
pub struct LoadArgs {
    pub path: Option<PathBuf>,
    pub dry_run: bool,
    pub srid: Option<u32>,
    pub db_user: Option<String>,
    pub db_name: Option<String>,
    pub include_unrecognized: Option<String>,
}

/// Execute the load command. Returns the process exit code: success only
/// when every attempted load succeeded.
pub fn run(args: LoadArgs, mut config: LoadConfig) -> anyhow::Result<ExitCode> {
    if let Some(path) = args.path {
        config.root = path;
    }
    if let Some(srid) = args.srid {
        config.srid = srid;
    }
    if let Some(user) = args.db_user {
        config.database.user = user;
    }
    if let Some(dbname) = args.db_name {
        config.database.dbname = dbname;
    }
    if let Some(schema) = args.include_unrecognized {
        config.fallback_schema = Some(schema);
    }
    crate::cli::check_root(&config.root)?;

    let outcome = Scanner::new(&config.pattern)?.scan(&config.root)?;
    for issue in &outcome.issues {
        eprintln!("warning: could not read {}: {}", issue.path, issue.message);
    }

    let rules = ClassifyTable::from_rules(config.rules.clone());
    let plan = LoadPlan::build(&outcome, &rules, config.srid);

    if plan.is_empty() {
        println!(
            "No shapefiles matching '{}' under {}",
            config.pattern,
            config.root.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    if args.dry_run {
        for job in &plan.jobs {
            match job.schema_or(config.fallback_schema.as_deref()) {
                Some(schema) => println!("{}", job.render_pipeline(schema, &config)),
                None => println!("# skip (unrecognized): {}", job.source.display()),
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    let report = Dispatcher::new(&config).run(&plan)?;

    let rows = report
        .outcomes
        .iter()
        .map(|job| {
            vec![
                display_relative(&job.source, &config.root),
                job.target.clone().unwrap_or_else(|| "-".to_string()),
                job.outcome.label().to_string(),
            ]
        })
        .collect();
    print_table(&["File", "Target", "Result"], rows);

    println!(
        "{} loaded, {} failed, {} skipped",
        report.loaded(),
        report.failed(),
        report.skipped()
    );

    Ok(if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
