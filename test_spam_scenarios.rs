use spamlens::{Config, EmailInput, KnowledgeBase, SpamClassifier};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("Walking the three reference scenarios against the canonical table...\n");

    let config = Config::default();
    let classifier = SpamClassifier::new(KnowledgeBase::default(), &config)?;

    let scenarios = [
        (
            "A: aggressive promo blast",
            EmailInput {
                subject: Some("URGENT: claim your FREE prize now!!!".to_string()),
                body: Some("click http://bit.ly/xyz to claim".to_string()),
                sender: Some("promo@mailblast.com".to_string()),
            },
        ),
        (
            "B: known contact, plain content",
            EmailInput {
                subject: Some("Lecture notes for next week".to_string()),
                body: Some("Hi, attached are the notes.".to_string()),
                sender: Some("profesor@universidad.edu".to_string()),
            },
        ),
        ("C: completely empty email", EmailInput::default()),
    ];

    for (name, input) in &scenarios {
        let verdict = classifier.classify(input)?;
        println!("Scenario {name}");
        println!(
            "  p(spam) = {:.6}  ->  {}",
            verdict.probability,
            if verdict.is_spam { "SPAM" } else { "ham" }
        );
        println!("  top evidence:");
        for record in verdict.explanation.iter().take(3) {
            println!(
                "    {:<24} state={} log10(LR)={:+.3}",
                record.variable, record.state, record.log10_lr
            );
        }
        println!();
    }

    println!("Full verdict for scenario A as the web layer would persist it:");
    let verdict = classifier.classify(&scenarios[0].1)?;
    println!("{}", serde_json::to_string_pretty(&verdict)?);

    Ok(())
}
