//! Interactive chat session command
//!
//! The chat loop owns the transcript and drives the two core entry points:
//! `resolve` for each user message, and `compute_tax` when a resolution asks
//! for the calculator flow. Numeric validation happens here, before any
//! `TaxQuery` is built; the engine itself never validates.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use karsathi_core::{
    compute_tax, parse_amount, resolve, ProviderGateway, Regime, Resolution, TaxQuery, Transcript,
};

const GREETING: &str = "\
👋 Hello! I'm your Income Tax Assistant. I can help you with:

• Tax calculations and slabs
• Deduction suggestions
• ITR filing guidance
• Tax regime comparison
• Common tax terms

Quick topics: \"calculate my tax\", \"explain tax slabs\", \
\"what deductions can I claim\", \"how to file ITR\"

Type \"exit\" to leave. What would you like to know today?";

/// Run the interactive chat loop until EOF or "exit".
pub async fn cmd_chat(gateway: &ProviderGateway) -> Result<()> {
    let mut transcript = Transcript::new();

    println!("{}\n", GREETING);
    if gateway.available().is_empty() {
        println!(
            "💡 No AI provider configured. Run `karsathi keys set openai` \
             for answers beyond the built-in topics.\n"
        );
    }

    let stdin = io::stdin();
    loop {
        print!("you> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        transcript.push_user(message);
        match resolve(message, gateway).await {
            Resolution::Text(text) => {
                println!("\n{}\n", text.trim_end());
                transcript.push_assistant(&text);
            }
            Resolution::Calculator { ack } => {
                println!("\n{}\n", ack);
                transcript.push_assistant(&ack);
                match run_calculator(&stdin) {
                    Ok(summary) => {
                        println!("\n{}\n", summary);
                        transcript.push_assistant(&summary);
                    }
                    Err(e) => println!("\n⚠️  {}\n", e),
                }
            }
        }
    }

    Ok(())
}

/// Prompt for calculator inputs and return the rendered breakdown.
fn run_calculator(stdin: &io::Stdin) -> Result<String> {
    let income = parse_amount(&prompt(stdin, "Annual income (₹): ")?)?;
    let regime: Regime = prompt(stdin, "Tax regime [new/old]: ")?.parse()?;
    let deductions = match regime {
        Regime::Old => parse_amount(&prompt(stdin, "Total deductions (₹): ")?)?,
        Regime::New => 0.0,
    };

    let query = TaxQuery {
        annual_income: income,
        regime,
        deductions,
    };
    Ok(compute_tax(&query).summary(&query))
}

fn prompt(stdin: &io::Stdin, label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
