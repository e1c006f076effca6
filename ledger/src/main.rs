use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;

use fee_ledger::backend::domain::commands::challans::GenerateClassChallansCommand;
use fee_ledger::backend::domain::commands::collections::CollectionQuery;
use fee_ledger::backend::domain::models::{money::format_currency, BillingPeriod};
use fee_ledger::{create_router, initialize_backend};

const USAGE: &str = "usage: fee-ledger <data-dir> <command>

commands:
  bill <class> <YYYY-MM> <academic-year>   issue challans to every active student of a class
  overdue <YYYY-MM-DD>                     mark pending challans due before the date as overdue
  report [YYYY-MM]                         print class and school collection totals
  siblings                                 list sibling groups by guardian
  export <out.csv>                         write the challan register as CSV
  serve <addr>                             run the REST API, e.g. 127.0.0.1:3000";

fn parse_period(value: &str) -> Result<BillingPeriod> {
    value.parse::<BillingPeriod>().map_err(|e| anyhow!(e))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (data_dir, command, rest) = match args.as_slice() {
        [data_dir, command, rest @ ..] => (PathBuf::from(data_dir), command.as_str(), rest),
        _ => bail!("{}", USAGE),
    };

    let state = initialize_backend(&data_dir)?;

    match (command, rest) {
        ("bill", [class_name, period, academic_year]) => {
            let result = state.challan_service.generate_for_class(GenerateClassChallansCommand {
                class_name: class_name.clone(),
                period: parse_period(period)?,
                academic_year: academic_year.clone(),
                issue_date: Local::now().date_naive(),
                due_date: None,
            })?;
            for challan in &result.issued {
                println!(
                    "{}  {}  {}",
                    challan.challan_no,
                    challan.student_id,
                    format_currency(&state.config.currency_symbol, challan.net_amount)
                );
            }
            for skipped in &result.skipped {
                println!("skipped {}: {}", skipped.student_id, skipped.reason);
            }
            println!("{}", result.success_message);
        }
        ("overdue", [as_of]) => {
            let as_of = NaiveDate::parse_from_str(as_of, "%Y-%m-%d")
                .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", as_of))?;
            let result = state.challan_service.mark_overdue(as_of)?;
            println!("{} challans marked overdue", result.transitioned_ids.len());
        }
        ("report", period) => {
            let period = match period {
                [] => None,
                [period] => Some(parse_period(period)?),
                _ => bail!("{}", USAGE),
            };
            let overview = state.collection_service.overview(CollectionQuery { period })?;
            let symbol = &state.config.currency_symbol;
            println!(
                "{:<16} {:>8} {:>16} {:>16} {:>16} {:>10} {:>5}",
                "class", "students", "collectable", "collected", "pending", "defaulters", "%"
            );
            for class in &overview.classes {
                println!(
                    "{:<16} {:>8} {:>16} {:>16} {:>16} {:>10} {:>5}",
                    class.class_name,
                    class.total_students,
                    format_currency(symbol, class.total_collectable),
                    format_currency(symbol, class.total_collected),
                    format_currency(symbol, class.total_pending),
                    class.defaulters_count,
                    class.collection_percentage()
                );
            }
            let school = &overview.school;
            println!(
                "{:<16} {:>8} {:>16} {:>16} {:>16} {:>10} {:>5}",
                "School",
                school.total_students,
                format_currency(symbol, school.total_collectable),
                format_currency(symbol, school.total_collected),
                format_currency(symbol, school.total_pending),
                school.defaulters_count,
                school.collection_percentage()
            );
        }
        ("siblings", []) => {
            for (guardian, members) in state.sibling_service.detect()? {
                let names: Vec<String> = members.iter().map(|s| format!("{} ({})", s.name, s.id)).collect();
                println!("{}: {}", guardian, names.join(", "));
            }
        }
        ("export", [out]) => {
            let csv = state.export_service.challans_csv(&state.challan_service.list_challans()?)?;
            state.export_service.write_to_path(PathBuf::from(out).as_path(), &csv)?;
        }
        ("serve", [addr]) => {
            let addr: SocketAddr = addr
                .parse()
                .with_context(|| format!("Invalid listen address '{}'", addr))?;
            let app = create_router(state);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            info!("Listening on {}", addr);
            axum::serve(listener, app).await?;
        }
        _ => bail!("{}", USAGE),
    }

    Ok(())
}
