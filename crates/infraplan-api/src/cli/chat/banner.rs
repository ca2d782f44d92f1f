//! Welcome banner and closing footers for interactive sessions.

use console::style;

/// Print the welcome banner at the start of a requirements interview.
pub fn print_welcome_banner(provider: &str, model: &str, question_count: usize) {
    println!();
    println!(
        "  {} {}",
        style("#").cyan().bold(),
        style("Infrastructure requirements assistant").cyan().bold()
    );
    println!(
        "  {}",
        style("Answer each question; a summary table is produced at the end.").dim()
    );
    println!();
    println!("  {}  {} ({})", style("Model:").bold(), style(model).dim(), provider);
    println!(
        "  {}  {}",
        style("Questions:").bold(),
        style(question_count).dim()
    );
    println!();
    println!("  {}", style("Ctrl+D or Ctrl+C to abort").dim());
    println!("  {}", style("---").dim());
    println!();
}

/// Print the footer after the model declared the interview done.
pub fn print_completed_footer() {
    println!();
    println!(
        "  {} {}",
        style("*").green().bold(),
        style("Requirements captured.").green()
    );
    println!();
}

/// Print the footer after the user left before completion.
pub fn print_aborted_footer(progress: u8) {
    println!();
    println!(
        "  {} Conversation aborted by user at {progress}%.",
        style("i").blue().bold()
    );
    println!();
}
