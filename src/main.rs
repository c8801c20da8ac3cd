use clap::{Arg, Command};
use log::LevelFilter;
use spamlens::{build_classifier, Config, EmailInput, KnowledgeBase};
use std::process;

fn main() {
    let matches = Command::new("spamlens")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Explainable Bayesian spam classifier")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("/etc/spamlens.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("generate-kb")
                .long("generate-kb")
                .value_name("FILE")
                .help("Write the built-in knowledge base as an editable YAML artifact")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Validate the configuration and knowledge base, then exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("subject")
                .long("subject")
                .value_name("TEXT")
                .help("Subject of a single email to classify")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("body")
                .long("body")
                .value_name("TEXT")
                .help("Body of a single email to classify")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("sender")
                .long("sender")
                .value_name("ADDRESS")
                .help("Sender address of a single email to classify")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("email")
                .long("email")
                .value_name("FILE")
                .help("Classify one email from a JSON file {subject, body, sender}")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("batch")
                .long("batch")
                .value_name("FILE")
                .help("Classify a JSON array of emails and print one verdict each")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(path) = matches.get_one::<String>("generate-config") {
        if let Err(e) = Config::default().to_file(path) {
            eprintln!("Failed to generate config: {e}");
            process::exit(1);
        }
        println!("Default configuration written to {path}");
        return;
    }

    if let Some(path) = matches.get_one::<String>("generate-kb") {
        if let Err(e) = KnowledgeBase::default().to_file(path) {
            eprintln!("Failed to generate knowledge base: {e}");
            process::exit(1);
        }
        println!("Canonical knowledge base written to {path}");
        return;
    }

    let config_path = matches.get_one::<String>("config").unwrap();
    let config = match Config::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration from {config_path}: {e}");
            process::exit(1);
        }
    };

    let classifier = match build_classifier(&config) {
        Ok(classifier) => classifier,
        Err(e) => {
            eprintln!("Failed to build classifier: {e}");
            process::exit(1);
        }
    };

    if matches.get_flag("test-config") {
        // build_classifier already validated the config and the table.
        println!(
            "Configuration OK: threshold {}, {} evidence variables",
            classifier.threshold(),
            classifier.knowledge_base().cpts.len()
        );
        return;
    }

    if let Some(path) = matches.get_one::<String>("batch") {
        if let Err(e) = run_batch(&classifier, path) {
            eprintln!("Batch classification failed: {e}");
            process::exit(1);
        }
        return;
    }

    if let Some(path) = matches.get_one::<String>("email") {
        if let Err(e) = run_email_file(&classifier, path) {
            eprintln!("Classification failed: {e}");
            process::exit(1);
        }
        return;
    }

    let subject = matches.get_one::<String>("subject").cloned();
    let body = matches.get_one::<String>("body").cloned();
    let sender = matches.get_one::<String>("sender").cloned();
    if subject.is_none() && body.is_none() && sender.is_none() {
        eprintln!(
            "Nothing to do: pass --subject/--body/--sender, --email, or --batch (see --help)"
        );
        process::exit(1);
    }

    let input = EmailInput {
        subject,
        body,
        sender,
    };
    if let Err(e) = classify_and_print(&classifier, &input) {
        eprintln!("Classification failed: {e}");
        process::exit(1);
    }
}

fn classify_and_print(
    classifier: &spamlens::SpamClassifier,
    input: &EmailInput,
) -> anyhow::Result<()> {
    let verdict = classifier.classify(input)?;
    println!("{}", serde_json::to_string_pretty(&verdict)?);
    Ok(())
}

fn run_email_file(classifier: &spamlens::SpamClassifier, path: &str) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(path)?;
    let input: EmailInput = serde_json::from_str(&content)?;
    classify_and_print(classifier, &input)
}

fn run_batch(classifier: &spamlens::SpamClassifier, path: &str) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(path)?;
    let inputs: Vec<EmailInput> = serde_json::from_str(&content)?;
    log::info!("classifying {} emails", inputs.len());
    let verdicts = classifier.classify_batch(&inputs)?;
    println!("{}", serde_json::to_string_pretty(&verdicts)?);
    Ok(())
}
