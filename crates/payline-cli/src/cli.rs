use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use payline_types::Currency;

#[derive(Parser)]
#[command(
    name = "payline",
    about = "Payline: split payments into exact cent shares and audit them",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Config file (defaults to ./payline.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Split one payment into a reconciled ledger
    Allocate(AllocateArgs),
    /// Run an automated allocation test batch and print its audit report
    Batch(BatchArgs),
    /// Re-verify every record hash and the Merkle root of a saved report
    Verify(VerifyArgs),
    /// Print a Merkle inclusion proof for one record of a saved report
    Prove(ProveArgs),
    /// Allocate a payment and pay the ledger out through a wallet
    Transfer(TransferArgs),
}

/// Payment amount, currency and split rules shared by `allocate` and `transfer`.
#[derive(Args, Debug)]
pub struct PaymentArgs {
    pub amount: f64,
    #[arg(long, default_value = "usdc")]
    pub currency: Currency,
    /// Accounting units per foreign unit
    #[arg(long, default_value_t = 1.0)]
    pub fx: f64,
    /// Split rules as JSON: [{"address": "0x..", "percent": 50}, ...]
    #[arg(long, conflicts_with = "rules_file")]
    pub rules: Option<String>,
    /// File holding split rules as JSON
    #[arg(long)]
    pub rules_file: Option<PathBuf>,
}

#[derive(Args)]
pub struct AllocateArgs {
    #[command(flatten)]
    pub payment: PaymentArgs,
    /// Also hash the run into an audit record
    #[arg(long)]
    pub audit: bool,
}

#[derive(Args)]
pub struct BatchArgs {
    /// Number of runs (overrides the config file)
    #[arg(short = 'n', long)]
    pub count: Option<usize>,
    #[arg(long)]
    pub random_fx: bool,
    #[arg(long)]
    pub random_splits: bool,
    #[arg(long)]
    pub seed: Option<u64>,
    /// Fixed split rules as JSON, used when splits are not randomized
    #[arg(long)]
    pub rules: Option<String>,
    /// Save the report as JSON
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct VerifyArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct ProveArgs {
    pub file: PathBuf,
    /// 0-based record position
    pub index: usize,
}

#[derive(Args)]
pub struct TransferArgs {
    #[command(flatten)]
    pub payment: PaymentArgs,
    /// Use the in-memory wallet
    #[arg(long)]
    pub demo: bool,
    /// Demo only: make the wallet refuse transfers to this recipient
    #[arg(long)]
    pub reject: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_allocate() {
        let cli = Cli::try_parse_from(["payline", "allocate", "100"]).unwrap();
        if let Command::Allocate(args) = cli.command {
            assert_eq!(args.payment.amount, 100.0);
            assert_eq!(args.payment.currency, Currency::Accounting);
            assert_eq!(args.payment.fx, 1.0);
            assert!(args.payment.rules.is_none());
            assert!(!args.audit);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_allocate_foreign_with_rules() {
        let cli = Cli::try_parse_from([
            "payline", "allocate", "50", "--currency", "USD", "--fx", "1.02",
            "--rules", r#"[{"address":"0xA","percent":100}]"#, "--audit",
        ])
        .unwrap();
        if let Command::Allocate(args) = cli.command {
            assert_eq!(args.payment.currency, Currency::Foreign);
            assert_eq!(args.payment.fx, 1.02);
            assert!(args.payment.rules.is_some());
            assert!(args.audit);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn rules_and_rules_file_conflict() {
        let result = Cli::try_parse_from([
            "payline", "allocate", "1", "--rules", "[]", "--rules-file", "r.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_currency_rejected() {
        assert!(Cli::try_parse_from(["payline", "allocate", "1", "--currency", "eur"]).is_err());
    }

    #[test]
    fn parse_batch() {
        let cli = Cli::try_parse_from([
            "payline", "batch", "-n", "25", "--random-fx", "--random-splits",
            "--seed", "7", "-o", "audit.json",
        ])
        .unwrap();
        if let Command::Batch(args) = cli.command {
            assert_eq!(args.count, Some(25));
            assert!(args.random_fx && args.random_splits);
            assert_eq!(args.seed, Some(7));
            assert_eq!(args.output, Some(PathBuf::from("audit.json")));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_verify() {
        let cli = Cli::try_parse_from(["payline", "verify", "audit.json"]).unwrap();
        assert!(matches!(cli.command, Command::Verify(_)));
    }

    #[test]
    fn parse_prove() {
        let cli = Cli::try_parse_from(["payline", "prove", "audit.json", "2"]).unwrap();
        if let Command::Prove(args) = cli.command {
            assert_eq!(args.index, 2);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_transfer_demo() {
        let cli = Cli::try_parse_from([
            "payline", "transfer", "10", "--demo", "--reject", "0xB", "--reject", "0xC",
        ])
        .unwrap();
        if let Command::Transfer(args) = cli.command {
            assert!(args.demo);
            assert_eq!(args.reject, vec!["0xB", "0xC"]);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_globals() {
        let cli = Cli::try_parse_from([
            "payline", "--verbose", "--format", "json", "--config", "p.toml", "verify", "a.json",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.config, Some(PathBuf::from("p.toml")));
    }
}
