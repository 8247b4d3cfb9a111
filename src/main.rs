//! SOFI CLI - suspicious activity scoring for a mock digital bank
//!
//! Scores a single proposed payment, or replays a short banking session that
//! exercises payments, withdrawals and the review of flagged transactions.

use std::process::ExitCode;

use clap::{Arg, ArgMatches, Command};
use tracing_subscriber::EnvFilter;

use sofi::{
    config::SofiConfig,
    errors::SofiError,
    fraud_detection::TransactionCandidate,
    random::{RandomSource, RngSource},
    reference::ReferenceData,
    transaction::{PaymentRequest, Resolution, WithdrawalDestination},
    utils,
    verification::BusinessDetails,
    SofiBank, Transaction,
};

fn main() -> ExitCode {
    // Logs go to stderr so JSON output on stdout stays clean (RUST_LOG=debug for rule detail)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let matches = Command::new("sofi")
        .version("0.1.0")
        .author("SOFI Team")
        .about("Suspicious activity scoring for a mock digital bank")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("JSON configuration file"),
        )
        .arg(
            Arg::new("reference")
                .short('r')
                .long("reference")
                .value_name("FILE")
                .help("JSON reference data (known payees, keywords, pools)"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("N")
                .value_parser(clap::value_parser!(u64))
                .help("Seed the random source for a replayable run"),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Require registration id and merchant code for known payees")
                .action(clap::ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("score")
                .about("Score one proposed payment and print the verdict as JSON")
                .arg(Arg::new("payee").required(true).help("Payee name"))
                .arg(
                    Arg::new("amount")
                        .required(true)
                        .allow_negative_numbers(true)
                        .value_parser(clap::value_parser!(f64))
                        .help("Payment amount"),
                )
                .arg(
                    Arg::new("registration")
                        .long("registration")
                        .requires("merchant")
                        .help("Business registration id"),
                )
                .arg(
                    Arg::new("merchant")
                        .long("merchant")
                        .requires("registration")
                        .help("Paybill/till number"),
                ),
        )
        .subcommand(Command::new("demo").about("Run a scripted banking session with fraud review"))
        .subcommand(Command::new("reference").about("Print the reference data in use"))
        .get_matches();

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, severity = ?e.severity(), "command failed");
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(matches: &ArgMatches) -> Result<(), SofiError> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => SofiConfig::from_file(path)?,
        None => SofiConfig::default(),
    };
    if matches.get_flag("strict") {
        config.strict_payee_match = true;
    }
    config
        .validate()
        .map_err(|message| SofiError::ConfigError { message })?;

    let reference = match matches.get_one::<String>("reference") {
        Some(path) => ReferenceData::from_file(path)?,
        None => ReferenceData::default(),
    };

    let rng: Box<dyn RandomSource + Send> = match matches.get_one::<u64>("seed") {
        Some(seed) => Box::new(RngSource::seeded(*seed)),
        None => Box::new(RngSource::from_entropy()),
    };

    let mut bank = SofiBank::with_random_source(config, reference, rng);

    match matches.subcommand() {
        Some(("score", sub_matches)) => score_command(&mut bank, sub_matches),
        Some(("demo", _)) => {
            println!("🏦 SOFI Demo - Suspicious Activity Review");
            println!("{}", "=".repeat(50));
            run_demo(&mut bank)
        }
        Some(("reference", _)) => {
            let json = serde_json::to_string_pretty(bank.scorer().reference())?;
            println!("{}", json);
            Ok(())
        }
        _ => {
            println!("🏦 SOFI - Suspicious activity scoring for a mock digital bank");
            println!("Use --help to see available commands");
            println!();
            println!("Quick Demo:");
            println!("  sofi --seed 7 demo             # Replayable banking session");
            println!("  sofi score \"CryptoVault\" 100   # Score one payment");
            Ok(())
        }
    }
}

fn score_command(bank: &mut SofiBank, sub_matches: &ArgMatches) -> Result<(), SofiError> {
    let payee = sub_matches
        .get_one::<String>("payee")
        .ok_or_else(|| SofiError::invalid_input("payee", "is required"))?;
    let amount = sub_matches
        .get_one::<f64>("amount")
        .copied()
        .ok_or_else(|| SofiError::invalid_input("amount", "is required"))?;

    let mut candidate = TransactionCandidate::new(payee, amount);
    if let Some(details) = BusinessDetails::from_parts(
        sub_matches.get_one::<String>("registration").map(String::as_str),
        sub_matches.get_one::<String>("merchant").map(String::as_str),
    )? {
        candidate = candidate.with_business(details);
    }

    let verdict = bank.score(&candidate)?;
    println!("{}", serde_json::to_string_pretty(&verdict)?);
    Ok(())
}

fn run_demo(bank: &mut SofiBank) -> Result<(), SofiError> {
    println!("Account: {}", utils::mask_account_number("4000 1234 5678 1234"));
    println!("Opening balance: {}", utils::format_currency(bank.balance(), "USD"));

    println!("\n1. Sending payments...");
    let payments = vec![
        PaymentRequest::new("Green Energy Corp", 1250.00, "Monthly Utilities")
            .with_business(BusinessDetails::new("REG-12345", "555111")),
        PaymentRequest::new("Prime Real Estate", 2200.00, "Rent Payment"),
        PaymentRequest::new("The Corner Cafe", 75.50, "Business Lunch"),
        PaymentRequest::new("QuickCash Services", 3500.00, "Urgent withdrawal"),
        PaymentRequest::new("CoinVortex Exchange", 780.00, "Crypto purchase"),
        PaymentRequest::new("Innovate Solutions Ltd.", 5000.00, "Project Deposit"),
    ];

    for request in payments {
        match bank.pay(request) {
            Ok(tx) => {
                print_transaction(&tx);
                if !tx.is_suspicious {
                    bank.settle(tx.id)?;
                }
            }
            Err(e) => println!("   ❌ Payment failed: {}", e.to_user_message()),
        }
    }

    println!("\n2. Withdrawing cash...");
    match bank.withdraw(4200.00, WithdrawalDestination::MobileWallet) {
        Ok(tx) => {
            print_transaction(&tx);
            if !tx.is_suspicious {
                bank.settle(tx.id)?;
            }
        }
        Err(e) => println!("   ❌ Withdrawal failed: {}", e.to_user_message()),
    }

    println!("\n3. Reviewing flagged transactions...");
    let flagged: Vec<(uuid::Uuid, String)> = bank
        .pending_review()
        .iter()
        .map(|tx| (tx.id, tx.payee.clone()))
        .collect();

    for (id, payee) in flagged {
        // Withdrawals to our own wallet are genuine; everything else gets reported
        let resolution = if payee == WithdrawalDestination::MobileWallet.payee() {
            Resolution::Safe
        } else {
            Resolution::Fraud
        };
        let tx = bank.resolve(id, resolution)?;
        println!("   {:?}: {} -> {:?}", resolution, tx.payee, tx.status);
    }

    println!("\n4. Review statistics:");
    let mut stats: Vec<(String, f64)> = bank.get_statistics().into_iter().collect();
    stats.sort_by(|a, b| a.0.cmp(&b.0));
    for (key, value) in stats {
        match key.as_str() {
            "flag_rate_percent" => println!("      Flag Rate: {:.1}%", value),
            _ => println!("      {}: {:.0}", key.replace('_', " "), value),
        }
    }

    println!("\nClosing balance: {}", utils::format_currency(bank.balance(), "USD"));
    println!("✅ Demo completed");
    Ok(())
}

fn print_transaction(tx: &Transaction) {
    if tx.is_suspicious {
        println!(
            "   🚫 {} {} - score {} - flagged from {} on {}",
            tx.payee,
            utils::format_currency(tx.amount, "USD"),
            tx.fraud_score,
            tx.location.as_deref().unwrap_or("Unknown Location"),
            tx.device.as_deref().unwrap_or("N/A"),
        );
    } else {
        println!(
            "   ✅ {} {} - score {}",
            tx.payee,
            utils::format_currency(tx.amount, "USD"),
            tx.fraud_score
        );
    }
}
