//! File naming for job logs and step artifacts.
//!
//! Covers both directions: turning job and step names into filesystem-safe
//! names, and recovering job names from the files a CI provider ships in
//! its log archives.

use deunicode::deunicode;

/// Windows reserved device names that cannot be used as filenames.
const WINDOWS_RESERVED: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Characters that are invalid in filenames on common filesystems.
const INVALID_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Default fallback name when sanitization produces an empty result.
const FALLBACK_NAME: &str = "step";

/// Maximum filename length for most filesystems.
const MAX_FILENAME_LENGTH: usize = 255;

/// Longest name component kept before the extension is added.
pub const MAX_COMPONENT_LENGTH: usize = 80;

/// Extension of per-step log artifacts.
pub const STEP_LOG_EXTENSION: &str = "log";

/// Sanitizes a string for use in filenames.
///
/// Applies the following transformations in order:
/// 1. Unicode → ASCII transliteration
/// 2. Whitespace → hyphens
/// 3. Invalid filesystem characters removed
/// 4. Multiple hyphens collapsed to single
/// 5. Leading/trailing dots, spaces, hyphens trimmed
/// 6. Windows reserved names prefixed with `_`
/// 7. Empty results → "step" fallback
pub fn sanitize(input: &str) -> String {
    let ascii = deunicode(input);

    let mut result = String::with_capacity(ascii.len());
    let mut last_was_hyphen = false;

    for c in ascii.chars() {
        if c.is_whitespace() || c == '-' {
            if !last_was_hyphen {
                result.push('-');
                last_was_hyphen = true;
            }
        } else if INVALID_CHARS.contains(&c) {
            continue;
        } else if c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '@' {
            result.push(c);
            last_was_hyphen = false;
        }
        // Brackets, quotes and anything else that survived deunicode are dropped
    }

    let trimmed = trim_edges(&result);
    let final_name = handle_reserved_name(&trimmed);

    if final_name.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        final_name
    }
}

/// Sanitizes a name and truncates it to `max_len` characters.
pub fn sanitize_component(input: &str, max_len: usize) -> String {
    let sanitized = sanitize(input);
    let truncated = truncate_to_length(&sanitized, max_len.max(1));
    let trimmed = trim_edges(&truncated);
    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed
    }
}

/// Name of the artifact holding one step's log, e.g. `03_Run-tests.log`.
///
/// The position prefix keeps artifacts in record order and unique even when
/// two steps share a name.
pub fn step_log_filename(position: usize, step_name: &str) -> Result<String, FilenameError> {
    let filename = format!(
        "{:02}_{}.{}",
        position,
        sanitize_component(step_name, MAX_COMPONENT_LENGTH),
        STEP_LOG_EXTENSION
    );
    validate_length(&filename)?;
    Ok(filename)
}

/// Validates that a final filename doesn't exceed filesystem limits.
pub fn validate_length(filename: &str) -> Result<(), FilenameError> {
    if filename.len() > MAX_FILENAME_LENGTH {
        Err(FilenameError::TooLong {
            length: filename.len(),
            max: MAX_FILENAME_LENGTH,
        })
    } else {
        Ok(())
    }
}

/// Recovers the job name from a provider log file name.
///
/// Log archives name files `<n>_<job>.txt`; the numeric prefix and the
/// extension are removed. Names without a prefix are returned as-is.
pub fn job_name_from_log_file(filename: &str) -> String {
    let stem = filename.strip_suffix(".txt").unwrap_or(filename);
    match stem.split_once('_') {
        Some((prefix, rest))
            if !prefix.is_empty() && !rest.is_empty() && prefix.chars().all(|c| c.is_ascii_digit()) =>
        {
            rest.to_string()
        }
        _ => stem.to_string(),
    }
}

/// Normalizes a job or log name for fuzzy comparison.
///
/// Runs of non-word characters become a single `_` and the result is
/// lowercased, so `Build (linux)` and `build_linux_` compare equal.
pub fn normalize_job_key(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.chars() {
        if c.is_alphanumeric() || c == '_' {
            result.extend(c.to_lowercase());
            in_separator = false;
        } else if !in_separator {
            result.push('_');
            in_separator = true;
        }
    }
    result
}

/// Picks the log name that belongs to `job_name`.
///
/// Exact normalized match wins; otherwise the first candidate where either
/// normalized name contains the other.
pub fn match_job_log<'a, I>(job_name: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let wanted = normalize_job_key(job_name);
    let candidates: Vec<(&str, String)> = candidates
        .into_iter()
        .map(|c| (c, normalize_job_key(c)))
        .collect();

    candidates
        .iter()
        .find(|(_, key)| *key == wanted)
        .or_else(|| {
            candidates
                .iter()
                .find(|(_, key)| key.contains(&wanted) || wanted.contains(key.as_str()))
        })
        .map(|(name, _)| *name)
}

/// Trims leading and trailing dots, spaces, and hyphens.
fn trim_edges(s: &str) -> String {
    s.trim_matches(|c| c == '.' || c == ' ' || c == '-')
        .to_string()
}

/// Truncates a string to the specified length.
fn truncate_to_length(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        s.chars().take(max_len).collect()
    }
}

/// Checks if a name is a Windows reserved name and prefixes it if so.
///
/// Handles both exact matches (CON) and names with extensions (CON.txt).
fn handle_reserved_name(name: &str) -> String {
    let base_name = match name.find('.') {
        Some(pos) => &name[..pos],
        None => name,
    };

    let upper = base_name.to_uppercase();
    if WINDOWS_RESERVED.contains(&upper.as_str()) {
        return format!("_{}", name);
    }
    name.to_string()
}

/// Errors that can occur during filename operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilenameError {
    /// Filename exceeds 255 character filesystem limit.
    #[error("Filename too long: {length} characters (max {max})")]
    TooLong { length: usize, max: usize },
}
