use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use payline_audit::{AuditBatch, AuditRecorder, BatchReport, BatchRunner};
use payline_chain::{InMemoryWallet, TransferOutcome, TransferSession};
use payline_ledger::{parse_rules, AllocationRequest, Ledger, SplitAllocator};
use payline_types::SplitRule;
use serde_json::json;

use crate::cli::*;
use crate::config::PaylineConfig;

/// Sending account of the demo wallet.
const DEMO_SENDER: &str = "0x000000000000000000000000000000000000dEaD";

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        command,
        format,
        config,
        ..
    } = cli;
    let config = PaylineConfig::load(config.as_deref())?;
    match command {
        Command::Allocate(args) => cmd_allocate(args, &config, format),
        Command::Batch(args) => cmd_batch(args, &config, format),
        Command::Verify(args) => cmd_verify(args, format),
        Command::Prove(args) => cmd_prove(args, format),
        Command::Transfer(args) => cmd_transfer(args, &config, format).await,
    }
}

fn cmd_allocate(args: AllocateArgs, config: &PaylineConfig, format: OutputFormat) -> anyhow::Result<()> {
    let request = payment_request(&args.payment, &config.batch.fallback_rules)?;
    let ledger = SplitAllocator::allocate(&request)?;
    let record = if args.audit {
        Some(AuditRecorder::record(1, &request, &ledger)?)
    } else {
        None
    };

    match format {
        OutputFormat::Json => {
            let out = match &record {
                Some(record) => serde_json::to_string_pretty(record)?,
                None => serde_json::to_string_pretty(&ledger)?,
            };
            println!("{out}");
        }
        OutputFormat::Text => {
            print_ledger(&ledger);
            if let Some(record) = &record {
                println!("  Audit hash: {}", record.hash.to_string().cyan());
            }
        }
    }
    Ok(())
}

fn cmd_batch(args: BatchArgs, config: &PaylineConfig, format: OutputFormat) -> anyhow::Result<()> {
    let mut batch_config = config.batch.clone();
    if let Some(count) = args.count {
        batch_config.test_count = count;
    }
    batch_config.randomize_exchange_rate |= args.random_fx;
    batch_config.randomize_splits |= args.random_splits;
    if args.seed.is_some() {
        batch_config.seed = args.seed;
    }
    if let Some(json) = &args.rules {
        batch_config.fallback_rules = parse_rules(json)?;
    }

    let runner = BatchRunner::new(batch_config);
    if format == OutputFormat::Text {
        let c = runner.config();
        println!(
            "Running {} tests (random fx: {}, random splits: {})",
            c.test_count.to_string().bold(),
            c.randomize_exchange_rate,
            c.randomize_splits
        );
    }
    let batch = runner.run()?;
    let report = batch.report();
    let json = report.to_json_pretty()?;
    if let Some(path) = &args.output {
        fs::write(path, &json).with_context(|| format!("writing {}", path.display()))?;
    }

    match format {
        OutputFormat::Json => println!("{json}"),
        OutputFormat::Text => {
            for record in &batch.records {
                let correction = match record.rounding_correction {
                    0 => "exact".green(),
                    c => format!("correction {c:+}").yellow(),
                };
                println!(
                    "  {:>4}  {:>10.2} {} @ {:.4}  {:>8} cents  {}  {}",
                    format!("#{}", record.test_number).bold(),
                    record.amount,
                    record.currency,
                    record.fx,
                    record.total_cents,
                    correction,
                    record.hash.short_hex().dimmed(),
                );
            }
            print_batch_summary(&batch);
            if let Some(path) = &args.output {
                println!("  Saved: {}", path.display().to_string().bold());
            }
        }
    }
    Ok(())
}

fn cmd_verify(args: VerifyArgs, format: OutputFormat) -> anyhow::Result<()> {
    let report = load_report(&args.file)?;
    let counters_match = report.counters_match();
    let verification = report.into_batch().verify();

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "countersMatch": counters_match,
                "verification": verification,
            }))?
        ),
        OutputFormat::Text => {
            println!("Checked {} records", verification.records_checked.to_string().bold());
            print_check("Record hashes", &verification.tampered);
            print_check("Sequence", &verification.out_of_sequence);
            print_check("Balances", &verification.unbalanced);
            print_flag("Merkle root", verification.root_matches);
            print_flag("Summary counters", counters_match);
        }
    }

    if !(verification.is_valid() && counters_match) {
        bail!("{} failed verification", args.file.display());
    }
    if format == OutputFormat::Text {
        println!("{} Audit batch verified", "✓".green().bold());
    }
    Ok(())
}

fn cmd_prove(args: ProveArgs, format: OutputFormat) -> anyhow::Result<()> {
    let batch = load_report(&args.file)?.into_batch();
    let proof = batch.proof(args.index)?;
    let anchored = batch.merkle_root == Some(proof.root);
    let valid = proof.verify() && anchored;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&proof)?),
        OutputFormat::Text => {
            println!("Record {} of {}", args.index.to_string().bold(), batch.len());
            println!("  Leaf: {}", proof.leaf.to_string().cyan());
            for (sibling, side) in &proof.path {
                println!("  {:<5} {}", format!("{side:?}").dimmed(), sibling);
            }
            println!("  Root: {}", proof.root.to_string().yellow());
        }
    }

    if !valid {
        bail!("proof for record {} does not reach the published root", args.index);
    }
    if format == OutputFormat::Text {
        println!("{} Inclusion proof valid", "✓".green().bold());
    }
    Ok(())
}

async fn cmd_transfer(args: TransferArgs, config: &PaylineConfig, format: OutputFormat) -> anyhow::Result<()> {
    if !args.demo {
        bail!("no wallet client is configured for live transfers; rerun with --demo to use the in-memory wallet");
    }
    let request = payment_request(&args.payment, &config.batch.fallback_rules)?;
    let ledger = SplitAllocator::allocate(&request)?;

    let wallet = InMemoryWallet::with_account(DEMO_SENDER);
    for recipient in &args.reject {
        wallet.reject_recipient(recipient.clone());
    }
    let session = TransferSession::connect(wallet, config.chain.clone()).await?;
    let outcomes = session.execute(&ledger).await;

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "from": session.from(),
                "ledger": ledger,
                "transfers": outcomes,
            }))?
        ),
        OutputFormat::Text => {
            print_ledger(&ledger);
            println!("Transfers from {}", session.from().bold());
            for outcome in &outcomes {
                print_outcome(outcome);
            }
        }
    }
    Ok(())
}

fn payment_request(payment: &PaymentArgs, fallback: &[SplitRule]) -> anyhow::Result<AllocationRequest> {
    let rules = split_rules(payment.rules.as_deref(), payment.rules_file.as_deref(), fallback)?;
    Ok(AllocationRequest::new(payment.amount, payment.currency, payment.fx, rules))
}

/// Inline JSON wins over a rules file; with neither, the configured fallback rules apply.
fn split_rules(
    inline: Option<&str>,
    file: Option<&Path>,
    fallback: &[SplitRule],
) -> anyhow::Result<Vec<SplitRule>> {
    if let Some(json) = inline {
        return Ok(parse_rules(json)?);
    }
    if let Some(path) = file {
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading split rules from {}", path.display()))?;
        return Ok(parse_rules(&json)?);
    }
    Ok(fallback.to_vec())
}

fn load_report(path: &Path) -> anyhow::Result<BatchReport> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(BatchReport::from_json(&json)?)
}

fn print_ledger(ledger: &Ledger) {
    println!(
        "Total: {} USDC ({} cents)",
        ledger.total_display().bold(),
        ledger.total_cents
    );
    for entry in &ledger.entries {
        let amount = if entry.cents < 0 {
            entry.display_amount.red()
        } else {
            entry.display_amount.green()
        };
        println!("  {:<44} {:>8}%  {:>12}", entry.address, entry.percent, amount);
    }
    if ledger.has_rounding_correction() {
        let target = ledger.entries.first().map_or("-", |e| e.address.as_str());
        println!(
            "  {} {:+} cent(s) applied to {}",
            "Rounding correction:".yellow(),
            ledger.rounding_correction,
            target
        );
    }
}

fn print_batch_summary(batch: &AuditBatch) {
    println!("Tests: {}", batch.len().to_string().bold());
    println!("Rounding issues: {}", batch.rounding_issues().to_string().yellow());
    match &batch.merkle_root {
        Some(root) => println!("Merkle root: {}", root.to_string().cyan()),
        None => println!("Merkle root: {}", "(empty batch)".dimmed()),
    }
}

fn print_check(label: &str, failures: &[u64]) {
    if failures.is_empty() {
        println!("  {label}: {}", "ok".green());
    } else {
        println!("  {label}: {} {:?}", "failed".red().bold(), failures);
    }
}

fn print_flag(label: &str, ok: bool) {
    if ok {
        println!("  {label}: {}", "ok".green());
    } else {
        println!("  {label}: {}", "mismatch".red().bold());
    }
}

fn print_outcome(outcome: &TransferOutcome) {
    let status = if outcome.verified {
        "✓ verified".green()
    } else {
        "! unverified".yellow()
    };
    println!(
        "  {:<44} {:>14} units  {}  {}",
        outcome.recipient,
        outcome.amount_base_units,
        status,
        outcome.transaction_hash.as_deref().unwrap_or("-").dimmed()
    );
    if let Some(warning) = &outcome.warning {
        println!("    {}", warning.yellow());
    }
}

#[cfg(test)]
mod tests {
    use payline_audit::BatchConfig;

    use super::*;

    fn fallback() -> Vec<SplitRule> {
        BatchConfig::default().fallback_rules
    }

    #[test]
    fn inline_rules_take_precedence() {
        let rules = split_rules(Some(r#"[{"address":"0xA","percent":100}]"#), None, &fallback()).unwrap();
        assert_eq!(rules, vec![SplitRule::new("0xA", 100.0)]);
    }

    #[test]
    fn rules_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        fs::write(&path, r#"[{"address":"0xA","percent":70},{"address":"0xB","percent":30}]"#).unwrap();
        let rules = split_rules(None, Some(&path), &fallback()).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1].percent, 30.0);
    }

    #[test]
    fn fallback_rules_when_none_given() {
        assert_eq!(split_rules(None, None, &fallback()).unwrap(), fallback());
    }

    #[test]
    fn malformed_rules_are_an_error() {
        assert!(split_rules(Some("{not json"), None, &fallback()).is_err());
    }

    #[test]
    fn saved_batch_verifies_and_proves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.json");
        let args = BatchArgs {
            count: Some(5),
            random_fx: true,
            random_splits: true,
            seed: Some(1),
            rules: None,
            output: Some(path.clone()),
        };
        cmd_batch(args, &PaylineConfig::default(), OutputFormat::Json).unwrap();

        cmd_verify(VerifyArgs { file: path.clone() }, OutputFormat::Text).unwrap();
        for index in 0..5 {
            cmd_prove(ProveArgs { file: path.clone(), index }, OutputFormat::Text).unwrap();
        }
        assert!(cmd_prove(ProveArgs { file: path, index: 5 }, OutputFormat::Text).is_err());
    }

    #[test]
    fn edited_batch_fails_verification() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.json");
        let args = BatchArgs {
            count: Some(3),
            random_fx: false,
            random_splits: false,
            seed: Some(1),
            rules: None,
            output: Some(path.clone()),
        };
        cmd_batch(args, &PaylineConfig::default(), OutputFormat::Json).unwrap();

        let json = fs::read_to_string(&path).unwrap();
        fs::write(&path, json.replacen("\"testNumber\": 2", "\"testNumber\": 7", 1)).unwrap();
        assert!(cmd_verify(VerifyArgs { file: path }, OutputFormat::Text).is_err());
    }

    #[tokio::test]
    async fn transfer_requires_demo_wallet() {
        let args = TransferArgs {
            payment: PaymentArgs {
                amount: 10.0,
                currency: payline_types::Currency::Accounting,
                fx: 1.0,
                rules: None,
                rules_file: None,
            },
            demo: false,
            reject: vec![],
        };
        assert!(cmd_transfer(args, &PaylineConfig::default(), OutputFormat::Text).await.is_err());
    }

    #[tokio::test]
    async fn demo_transfer_completes_with_rejections() {
        let args = TransferArgs {
            payment: PaymentArgs {
                amount: 10.0,
                currency: payline_types::Currency::Accounting,
                fx: 1.0,
                rules: None,
                rules_file: None,
            },
            demo: true,
            reject: vec!["0xRECIPIENT_B".into()],
        };
        cmd_transfer(args, &PaylineConfig::default(), OutputFormat::Json).await.unwrap();
    }
}
