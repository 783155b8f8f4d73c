use colored::*;
use console::Term;

/// Line-based yes/no gate on the controlling terminal. Anything but
/// `y`/`yes` declines.
pub fn confirm(question: &str) -> anyhow::Result<bool> {
    let term = Term::stderr();
    term.write_str(&format!("{} {} ", question.bold(), "[y/N]".bright_black()))?;
    let answer: String = term.read_line()?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
