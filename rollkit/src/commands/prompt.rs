//! Line-based prompts on stdin.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Result};
use owo_colors::OwoColorize;
use rollkit_core::release::parse_version;
use rollkit_core::VersionIncrement;
use semver::Version;

fn read_line(question: &str) -> Result<String> {
    print!("{} {} ", "?".green().bold(), question.bold());
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        bail!("stdin closed while waiting for an answer");
    }
    Ok(line.trim().to_string())
}

/// Asks for the release version: one of the increments, or a custom one.
pub fn select_version(current: &Version, pre: Option<&str>) -> Result<Version> {
    let mut choices = Vec::new();
    for increment in VersionIncrement::available(pre) {
        choices.push((increment.to_string(), increment.apply(current, pre)?));
    }

    println!("Current version: {}", current.to_string().bold());
    for (i, (name, version)) in choices.iter().enumerate() {
        println!("  {}) {} ({})", i + 1, name, version.to_string().cyan());
    }
    println!("  {}) custom", choices.len() + 1);

    let answer = read_line("Select release type:")?;
    let index: usize = answer
        .parse()
        .map_err(|_| anyhow::anyhow!("Not a choice: {}", answer))?;

    match index {
        n if (1..=choices.len()).contains(&n) => Ok(choices[n - 1].1.clone()),
        n if n == choices.len() + 1 => Ok(parse_version(&read_line("Input custom version:")?)?),
        _ => bail!("Not a choice: {}", answer),
    }
}

pub fn confirm(question: &str) -> Result<bool> {
    let answer = read_line(&format!("{} (y/N)", question))?;
    Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
}
