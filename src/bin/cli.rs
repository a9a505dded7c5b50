#![cfg(not(tarpaulin_include))]

use footprint::app::{Dashboard, Selection};
use footprint::config::DashboardConfig;
use footprint::downloader::{to_csv, to_json};
use footprint::labels::{DIET_CODES, diet_label};
use footprint::observation::{Metric, Scenario};
use footprint::query::AggregateTable;
use lazy_static::lazy_static;
use regex::Regex;
use std::env;
use std::io::{self, Write};
use std::process;
use std::time::Instant;

lazy_static! {
    static ref COMMAND_REGEX: Regex = Regex::new(r"^([a-z]+)(?:\s+(.*))?$").unwrap();
}

const SESSION: &str = "cli";

fn print_table(result: &AggregateTable) {
    println!(
        "{} | size: {} | color: {} | search: {}",
        result.scenario,
        result.size_metric.display(),
        result.color_metric.display(),
        result.keyword.as_deref().unwrap_or("-")
    );
    if result.is_empty() {
        println!("  (no matching rows)");
        return;
    }
    println!(
        "  {:<20} {:<10} {:<8} {:>12} {:>12} {:>4}",
        "diet", "age", "sex", "size", "color", "n"
    );
    for row in &result.rows {
        println!(
            "  {:<20} {:<10} {:<8} {:>12.4} {:>12.4} {:>4}",
            row.label(),
            row.age_group,
            row.sex,
            row.value(result.size_metric),
            row.value(result.color_metric),
            row.count
        );
    }
    match result.color_range() {
        Some((lo, hi)) => println!("  color range [{:.4}, {:.4}]", lo, hi),
        None => println!("  color range undefined"),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  scenario <name>: Per capita | Per 1000 kcal");
    println!("  size <metric>: Metric that sizes the cells");
    println!("  color <metric>: Metric that colors the cells");
    println!("  search [keyword]: Filter diet/age/sex, empty to clear");
    println!("  show: Print the current table");
    println!("  metrics: List metric names and diet codes");
    println!("  json: Print the treemap description");
    println!("  export <file>: Write the current table as CSV");
    println!("  q: Quit");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let config = DashboardConfig::from_args(&args);

    let start = Instant::now();
    let dashboard = match Dashboard::startup(&config) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    println!(
        "Loaded {} rows in {:.2}s",
        dashboard.table().len(),
        start.elapsed().as_secs_f64()
    );

    let mut selection = Selection::from_config(&config);
    let mut status = String::from("ok");
    let mut changed = true;

    loop {
        if changed {
            if let Some(result) = dashboard.refresh(SESSION, &selection) {
                print_table(&result);
            }
            changed = false;
        }

        print!("({}) > ", status);
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(caps) = COMMAND_REGEX.captures(line) else {
            status = String::from("invalid command");
            continue;
        };
        let command = caps.get(1).map_or("", |m| m.as_str());
        let arg = caps.get(2).map_or("", |m| m.as_str()).trim();

        status = String::from("ok");
        match command {
            "q" | "quit" => break,
            "help" => print_help(),
            "scenario" => match Scenario::from_label(arg) {
                Some(s) => {
                    selection.scenario = s;
                    changed = true;
                }
                None => status = format!("unknown scenario '{}'", arg),
            },
            "size" | "color" => match Metric::from_column(arg) {
                Some(m) => {
                    if command == "size" {
                        selection.size_metric = m;
                    } else {
                        selection.color_metric = m;
                    }
                    changed = true;
                }
                None => status = format!("unknown metric '{}'", arg),
            },
            "search" => {
                selection.keyword = (!arg.is_empty()).then(|| arg.to_string());
                changed = true;
            }
            "show" => changed = true,
            "metrics" => {
                for m in Metric::ALL {
                    println!("  {:<14} {}", m.column(), m.display());
                }
                println!();
                for code in DIET_CODES {
                    println!("  {:<14} {}", code, diet_label(code).unwrap_or(""));
                }
            }
            "json" => match dashboard.chart(SESSION) {
                Some(chart) => println!("{}", to_json(&chart)?),
                None => status = String::from("no result yet"),
            },
            "export" => {
                if arg.is_empty() {
                    status = String::from("export needs a file name");
                } else if let Some(result) = dashboard.refresh(SESSION, &selection) {
                    match std::fs::write(arg, to_csv(&result)) {
                        Ok(()) => println!("Wrote {} rows to {}", result.len(), arg),
                        Err(e) => status = format!("export failed: {}", e),
                    }
                }
            }
            _ => status = String::from("invalid command"),
        }
    }

    dashboard.end_session(SESSION);
    Ok(())
}
