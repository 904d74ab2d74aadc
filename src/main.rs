use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use settle::config::{RateArgs, build_rates, load_roster};
use settle::core::{DerivedRecord, RawIncome, SettlementOrder, derive_with, reallocate_with};

#[derive(Parser, Debug)]
#[command(
    name = "settle",
    about = "Settlement fee and tax calculator for outsourced worker payouts"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the settlement order over a JSON HTTP API
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
        #[arg(long, help = "JSON array of workers; defaults to the demo roster")]
        roster: Option<PathBuf>,
        #[arg(long, default_value = "2025-11")]
        month: String,
        #[arg(long, default_value = "UI design service")]
        task: String,
        #[command(flatten)]
        rates: RateArgs,
    },
    /// Derive fees and taxes for one set of raw amounts
    Derive {
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        labor: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        business: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        sole: f64,
        #[command(flatten)]
        rates: RateArgs,
    },
    /// Split an edited amount-due total back over the three categories
    Reallocate {
        #[arg(long, allow_negative_numbers = true)]
        total: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        labor: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        business: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        sole: f64,
        #[arg(
            long,
            allow_negative_numbers = true,
            help = "Business income at load time, used when business and sole are both zero"
        )]
        fallback_business: Option<f64>,
        #[arg(
            long,
            allow_negative_numbers = true,
            help = "Sole proprietor income at load time"
        )]
        fallback_sole: Option<f64>,
        #[command(flatten)]
        rates: RateArgs,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("settle=info")),
        )
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Serve {
            port,
            roster,
            month,
            task,
            rates,
        } => {
            let rates = build_rates(&rates)?;
            let roster = load_roster(roster.as_deref(), rates)?;
            tracing::info!(workers = roster.len(), %month, "starting settlement server");
            settle::api::run_http_server(port, SettlementOrder::new(month, task, roster)).await?;
        }
        Command::Derive {
            labor,
            business,
            sole,
            rates,
        } => {
            let rates = build_rates(&rates)?;
            print_record(&derive_with(RawIncome::new(labor, business, sole), &rates));
        }
        Command::Reallocate {
            total,
            labor,
            business,
            sole,
            fallback_business,
            fallback_sole,
            rates,
        } => {
            let rates = build_rates(&rates)?;
            let current = RawIncome::new(labor, business, sole);
            let fallback = RawIncome::new(
                labor,
                fallback_business.unwrap_or(business),
                fallback_sole.unwrap_or(sole),
            );
            let raw = reallocate_with(total, current, fallback, &rates);
            print_record(&derive_with(raw, &rates));
        }
    }
    Ok(())
}

fn print_record(record: &DerivedRecord) {
    println!("labor remuneration     {:>14.2}", record.labor_remuneration);
    println!("business income        {:>14.2}", record.business_income);
    println!("sole proprietor income {:>14.2}", record.sole_proprietor_income);
    println!("total amount due       {:>14.2}", record.total_amount_due);
    println!("service fee            {:>14.2}", record.service_fee);
    println!("personal income tax    {:>14.2}", record.personal_income_tax);
    println!("vat                    {:>14.2}", record.vat);
    println!("net amount             {:>14.2}", record.net_amount);
    println!("total order amount     {:>14.2}", record.total_order_amount);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reallocate_accepts_negative_fallback_amounts() {
        let cli = Cli::try_parse_from([
            "settle",
            "reallocate",
            "--total",
            "5000",
            "--labor",
            "1500",
            "--fallback-business",
            "-1",
            "--fallback-sole",
            "5",
        ])
        .expect("negative fallback must parse");

        match cli.command {
            Command::Reallocate {
                fallback_business,
                fallback_sole,
                ..
            } => {
                assert_eq!(fallback_business, Some(-1.0));
                assert_eq!(fallback_sole, Some(5.0));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn derive_rejects_out_of_range_rate_flag() {
        let cli = Cli::try_parse_from(["settle", "derive", "--labor", "100", "--vat-rate", "150"])
            .expect("flags parse");
        let Command::Derive { rates, .. } = cli.command else {
            panic!("expected derive");
        };
        assert!(build_rates(&rates).is_err());
    }
}
