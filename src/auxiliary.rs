// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Simple, auxiliary functions used through the `lammps_rs` library.

/******************************/
/*          COMMENTS          */
/******************************/

/// Split a line of a LAMMPS file into its content and its comment.
/// The comment is everything following the first `#` character, trimmed.
/// Empty comments are returned as `None`.
pub(crate) fn split_comment(line: &str) -> (&str, Option<String>) {
    match line.split_once('#') {
        Some((content, comment)) => {
            let comment = comment.trim();
            if comment.is_empty() {
                (content, None)
            } else {
                (content, Some(comment.to_owned()))
            }
        }
        None => (line, None),
    }
}

/// Format an optional comment as a suffix of a line.
pub(crate) fn comment_suffix(comment: &Option<String>) -> String {
    match comment {
        Some(x) => format!(" # {}", x),
        None => String::new(),
    }
}

/******************************/
/*     NUMBER FORMATTING      */
/******************************/

/// Format a floating point number in scientific notation
/// with a sign and at least two digits in the exponent (e.g., `1.234560e+01`).
/// The result is right-aligned to `width` characters.
pub(crate) fn format_sci(value: f64, precision: usize, width: usize) -> String {
    let raw = format!("{:.*e}", precision, value);

    let formatted = match raw.split_once('e') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exp) => format!(
                "{}e{}{:02}",
                mantissa,
                if exp < 0 { '-' } else { '+' },
                exp.abs()
            ),
            Err(_) => raw,
        },
        // nan and inf
        None => raw,
    };

    format!("{:>width$}", formatted, width = width)
}

/******************************/
/*         UNIT TESTS         */
/******************************/
