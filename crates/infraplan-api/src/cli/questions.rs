//! `infraplan questions`: print the active question bank.

use anyhow::Result;
use console::style;

use infraplan_core::questions::QuestionBank;

pub fn list_questions(bank: &QuestionBank, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(bank.questions())?);
        return Ok(());
    }

    println!();
    println!(
        "  {} ({} questions)",
        style("Question bank").bold(),
        bank.len()
    );

    let mut current_section: Option<&str> = None;
    for (i, question) in bank.questions().iter().enumerate() {
        if current_section != Some(question.section.as_str()) {
            println!();
            println!("  {}", style(&question.section).cyan().bold());
            current_section = Some(&question.section);
        }
        println!("  {:>3}. {}", i + 1, question.text);
    }
    println!();
    Ok(())
}
