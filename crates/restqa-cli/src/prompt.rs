//! Interactive questions for `restqa init`.

use restqa_types::{CiFlavor, InitAnswers};
use std::io::{self, BufRead, Write};

pub const DEFAULT_NAME: &str = "app";
pub const DEFAULT_DESCRIPTION: &str = "Configuration generated by restqa init";
pub const DEFAULT_URL: &str = "https://api.restqa.io";
pub const DEFAULT_ENV: &str = "local";

/// Fill every unanswered question.
///
/// With `assume_yes` the defaults are taken silently and no CI is configured.
pub fn complete_answers<R: BufRead, W: Write>(
    mut answers: InitAnswers,
    assume_yes: bool,
    input: &mut R,
    output: &mut W,
) -> io::Result<InitAnswers> {
    let questions: [(&mut Option<String>, &str, &str); 4] = [
        (&mut answers.name, "Project name:", DEFAULT_NAME),
        (&mut answers.description, "Description:", DEFAULT_DESCRIPTION),
        (&mut answers.url, "Url of the project api:", DEFAULT_URL),
        (&mut answers.env, "Environment name of this url:", DEFAULT_ENV),
    ];

    for (slot, question, default) in questions {
        if slot.is_some() {
            continue;
        }
        *slot = Some(if assume_yes {
            default.to_string()
        } else {
            ask(input, output, question, default)?
        });
    }

    // A blank `--ci` is an explicit "no CI" and is not asked again.
    if answers.ci.as_deref().is_some_and(|c| c.trim().is_empty()) {
        answers.ci = None;
    } else if answers.ci.is_none() && !assume_yes {
        answers.ci = ask_ci(input, output)?;
    }
    Ok(answers)
}

fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
    default: &str,
) -> io::Result<String> {
    write!(output, "{question} ({default}) ")?;
    output.flush()?;

    let line = read_trimmed(input)?;
    Ok(if line.is_empty() {
        default.to_string()
    } else {
        line
    })
}

fn ask_ci<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<Option<String>> {
    writeln!(
        output,
        "Do you need a continuous integration configuration ?"
    )?;
    for (i, flavor) in CiFlavor::ALL.iter().enumerate() {
        writeln!(output, "  {}) {}", i + 1, flavor.display_name())?;
    }
    writeln!(
        output,
        "  0) I want to configure the continuous integration by myself"
    )?;
    write!(output, "Choice (0) ")?;
    output.flush()?;

    let line = read_trimmed(input)?;
    if line.is_empty() || line == "0" {
        return Ok(None);
    }
    // A number picks from the list; anything else is taken as a tag.
    let picked = line
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| CiFlavor::ALL.get(i))
        .map(|f| f.tag().to_string());
    Ok(Some(picked.unwrap_or(line)))
}

/// EOF reads as an empty answer.
fn read_trimmed<R: BufRead>(input: &mut R) -> io::Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}
