//! # Error Suggestions
//!
//! Hint-bearing errors for the command-line tool. Each helper says what went
//! wrong and how to fix it; [`explain`] turns library errors into the same
//! form.

use crate::error::Error;
use crate::gate::Operation;
use std::path::Path;

/// The roots file named by `-c/--config` (or the environment) is missing.
pub fn config_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Roots file not found: {path}\n\n\
         hint: Create a fs-merger.yaml file listing your roots\n\
         hint: Use -c/--config to specify a different path\n\
         hint: Set FS_MERGER_CONFIG environment variable",
        path = path.display()
    )
}

/// Neither a roots file nor `--root` arguments were given.
pub fn no_roots() -> anyhow::Error {
    anyhow::anyhow!(
        "No roots to merge\n\n\
         hint: Pass one or more --root DIR[=PREFIX] arguments\n\
         hint: Or create a fs-merger.yaml file with a 'roots:' list"
    )
}

/// A `--glob` or `--ignore` pattern failed to compile.
pub fn invalid_glob(pattern: &str, error: &glob::PatternError) -> anyhow::Error {
    anyhow::anyhow!(
        "Invalid glob pattern: {pattern}\n\
         error: {error}\n\n\
         hint: '*' also matches '/', so 'src/*' selects everything below src\n\
         hint: Use [abc] for character classes, [!abc] to negate"
    )
}

/// An operation name outside the allow-list was requested.
pub fn unknown_operation(operation: &str) -> anyhow::Error {
    let names: Vec<&str> = Operation::ALL.iter().map(|op| op.name()).collect();
    let did_you_mean = find_similar(operation, &names)
        .map(|s| format!("\nhint: Did you mean '{s}'?"))
        .unwrap_or_default();

    anyhow::anyhow!(
        "Operation {operation} is not allowed{did_you_mean}\n\n\
         Allowed operations are: {ops}",
        ops = names.join(", ")
    )
}

/// Attach hints to a library error raised while handling `path`.
pub fn explain(error: Error, path: &str) -> anyhow::Error {
    match error {
        Error::NotFound { .. } => anyhow::anyhow!(
            "No root contains '{path}'\n\n\
             hint: Run 'fs-merger entries' to see every merged path\n\
             hint: Use --at N to look inside a single root"
        ),
        Error::InvalidArgument { message } if Path::new(path).is_absolute() => anyhow::anyhow!(
            "{message}\n\n\
             hint: Paths are relative to the merged view, try '{}'",
            path.trim_start_matches('/')
        ),
        Error::PermissionDenied { operation, .. } => unknown_operation(&operation),
        other => anyhow::Error::new(other),
    }
}

/// Closest candidate within an edit distance of two.
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|&candidate| (candidate, edit_distance(input, candidate)))
        .filter(|&(_, distance)| distance <= 2 && distance < input.len())
        .min_by_key(|&(_, distance)| distance)
        .map(|(candidate, _)| candidate)
}

/// Levenshtein distance, keeping a single row.
fn edit_distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b_chars.len()).collect();

    for (i, a_char) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let substitution = diagonal + usize::from(a_char != *b_char);
            diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(diagonal + 1);
        }
    }

    row[b_chars.len()]
}
