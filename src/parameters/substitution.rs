//! Numeric literal substitution in simulator input files
//!
//! Simulator configuration files assign parameters with lines such as
//! `gnabar_hh = 0.12`. [`substitute`] rewrites the numeric literal of every
//! assignment to a given parameter name and leaves all other bytes untouched.
//! [`substitute_file`] applies the same routine to a file in place.
//!
//! The rewrite is a fixed point: substituting the same value twice gives the
//! same text as substituting it once.
//!
//! Concurrent substitution into the same file from several callers is not
//! synchronised; callers running simulations in parallel must not share a
//! configuration file path.

use crate::error::Result;
use regex::{Captures, Regex};
use std::fs;
use std::path::Path;

/// Build the pattern matching `name = <numeric literal>` assignments
///
/// Capture groups: 1 is the leading anchor, 2 the name, 3 the `=` with its
/// surrounding whitespace and 4 the numeric literal.
pub fn assignment_pattern(name: &str) -> Result<Regex> {
    let pattern = format!(
        r"(\A|\b)({})(\s*=\s*)((([+-]?\d+[.]?\d*)|([+-]?\d*[.]?\d+))([eE][+-]?\d+)*)($|\b)",
        regex::escape(name)
    );
    Ok(Regex::new(&pattern)?)
}

/// Rewrite the numeric literal assigned to `name` in `text` to `value`
///
/// The substitution is applied line by line; line terminators are preserved.
///
/// # Examples
///
/// ```
/// use uqparam_rs::parameters::substitution::substitute;
///
/// let text = "soma.L = 20\nsoma.gnabar_hh  =  0.12 // sodium\n";
/// let out = substitute(text, "gnabar_hh", "0.15").unwrap();
/// assert_eq!(out, "soma.L = 20\nsoma.gnabar_hh  =  0.15 // sodium\n");
/// ```
pub fn substitute(text: &str, name: &str, value: &str) -> Result<String> {
    let pattern = assignment_pattern(name)?;
    Ok(substitute_with(&pattern, text, value).0)
}

/// Rewrite `name` assignments in the file at `path`
///
/// The file is read, rewritten in memory and written back only if something
/// changed. A file without matching assignments is not an error.
///
/// # Returns
///
/// The number of lines that contained a matching assignment
pub fn substitute_file<P: AsRef<Path>>(path: P, name: &str, value: &str) -> Result<usize> {
    let path = path.as_ref();
    let pattern = assignment_pattern(name)?;

    let text = fs::read_to_string(path)?;
    let (rewritten, matched) = substitute_with(&pattern, &text, value);

    if rewritten != text {
        fs::write(path, rewritten)?;
    }

    if matched == 0 {
        tracing::debug!(
            parameter = name,
            file = %path.display(),
            "parameter does not occur in file"
        );
    } else {
        tracing::debug!(
            parameter = name,
            file = %path.display(),
            value,
            lines = matched,
            "substituted parameter value"
        );
    }

    Ok(matched)
}

fn substitute_with(pattern: &Regex, text: &str, value: &str) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut matched = 0;

    for line in text.split_inclusive('\n') {
        let (content, terminator) = split_terminator(line);

        if pattern.is_match(content) {
            matched += 1;
            let replaced = pattern.replace_all(content, |caps: &Captures| {
                format!("{}{}{}{}", &caps[1], &caps[2], &caps[3], value)
            });
            out.push_str(&replaced);
        } else {
            out.push_str(content);
        }
        out.push_str(terminator);
    }

    (out, matched)
}

fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(content) = line.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = line.strip_suffix('\n') {
        (content, "\n")
    } else {
        (line, "")
    }
}
