use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;

use crate::core::{
    LABOR_CAP, LABOR_TAX_RATE, Rates, Roster, SERVICE_FEE_RATE, VAT_RATE, Worker, demo_workers,
};
use crate::error::ConfigError;

/// Rate flags shared by every subcommand. Percentages on the command line,
/// fractions inside `Rates`.
#[derive(Args, Debug, Clone)]
pub struct RateArgs {
    #[arg(
        long,
        default_value_t = SERVICE_FEE_RATE * 100.0,
        help = "Platform service fee in percent of the amount due"
    )]
    pub service_fee_rate: f64,
    #[arg(
        long,
        default_value_t = LABOR_TAX_RATE * 100.0,
        help = "Personal income tax in percent of labor remuneration"
    )]
    pub labor_tax_rate: f64,
    #[arg(
        long,
        default_value_t = VAT_RATE * 100.0,
        help = "VAT in percent of business plus sole proprietor income"
    )]
    pub vat_rate: f64,
    #[arg(
        long,
        default_value_t = LABOR_CAP,
        help = "Labor ceiling used when a grand total is split back out"
    )]
    pub labor_cap: f64,
}

impl Default for RateArgs {
    fn default() -> Self {
        Self {
            service_fee_rate: SERVICE_FEE_RATE * 100.0,
            labor_tax_rate: LABOR_TAX_RATE * 100.0,
            vat_rate: VAT_RATE * 100.0,
            labor_cap: LABOR_CAP,
        }
    }
}

pub fn build_rates(args: &RateArgs) -> Result<Rates, ConfigError> {
    for (flag, rate) in [
        ("--service-fee-rate", args.service_fee_rate),
        ("--labor-tax-rate", args.labor_tax_rate),
        ("--vat-rate", args.vat_rate),
    ] {
        if !(0.0..=100.0).contains(&rate) {
            return Err(ConfigError::InvalidRate { flag });
        }
    }

    let rates = Rates {
        service_fee_rate: args.service_fee_rate / 100.0,
        labor_tax_rate: args.labor_tax_rate / 100.0,
        vat_rate: args.vat_rate / 100.0,
        labor_cap: args.labor_cap,
    };
    rates.validate()?;
    Ok(rates)
}

pub fn load_roster(path: Option<&Path>, rates: Rates) -> Result<Roster, ConfigError> {
    let Some(path) = path else {
        return Ok(Roster::new(rates, demo_workers()));
    };

    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: PathBuf::from(path),
        source,
    })?;
    let workers: Vec<Worker> =
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: PathBuf::from(path),
            source,
        })?;
    tracing::info!(path = %path.display(), workers = workers.len(), "loaded roster");
    Ok(Roster::new(rates, workers))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn default_flags_reproduce_default_rates() {
        let rates = build_rates(&RateArgs::default()).expect("valid rates");
        let defaults = Rates::default();
        assert_approx(rates.service_fee_rate, defaults.service_fee_rate);
        assert_approx(rates.labor_tax_rate, defaults.labor_tax_rate);
        assert_approx(rates.vat_rate, defaults.vat_rate);
        assert_eq!(rates.labor_cap, defaults.labor_cap);
    }

    #[test]
    fn build_rates_rejects_out_of_range_percentages() {
        let args = RateArgs {
            vat_rate: 120.0,
            ..RateArgs::default()
        };
        let err = build_rates(&args).expect_err("must reject");
        assert!(err.to_string().contains("--vat-rate"));

        let args = RateArgs {
            service_fee_rate: -1.0,
            ..RateArgs::default()
        };
        assert!(build_rates(&args).is_err());
    }

    #[test]
    fn build_rates_rejects_bad_cap() {
        for cap in [-1.0, f64::INFINITY, f64::NAN] {
            let args = RateArgs {
                labor_cap: cap,
                ..RateArgs::default()
            };
            assert!(matches!(build_rates(&args), Err(ConfigError::InvalidCap)));
        }
    }

    #[test]
    fn load_roster_without_path_uses_demo_workers() {
        let roster = load_roster(None, Rates::default()).expect("demo roster");
        assert_eq!(roster.len(), demo_workers().len());
    }

    #[test]
    fn load_roster_reads_json_file() {
        let path = std::env::temp_dir().join(format!("settle-roster-{}.json", std::process::id()));
        let json = serde_json::to_string(&demo_workers()).expect("serializable");
        fs::write(&path, json).expect("writable temp file");

        let roster = load_roster(Some(path.as_path()), Rates::default()).expect("valid file");
        let _ = fs::remove_file(&path);

        assert_eq!(roster.len(), 2);
        assert_eq!(roster.entries()[1].profile.name, "Chen Li");
    }

    #[test]
    fn load_roster_reports_malformed_json() {
        let path = std::env::temp_dir().join(format!("settle-bad-roster-{}.json", std::process::id()));
        fs::write(&path, r#"[{ "name": "A", "laborRemuneration": "lots" }"#)
            .expect("writable temp file");

        let err = load_roster(Some(path.as_path()), Rates::default()).expect_err("must fail");
        let _ = fs::remove_file(&path);

        assert!(matches!(err, ConfigError::Json { .. }));
        assert!(err.to_string().contains("invalid roster file"));
    }

    #[test]
    fn load_roster_reports_missing_file() {
        let path = Path::new("/nonexistent/settle-roster.json");
        let err = load_roster(Some(path), Rates::default()).expect_err("must fail");
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
