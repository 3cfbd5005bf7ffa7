use regex::Regex;
use semver::Version;
use std::borrow::Cow;

/// Normalizes a job directory so that "", ".", "./api" and "api/" compare
/// equal to their rooted forms ("/" and "/api"). Uses Cow to avoid
/// allocation when the directory is already normalized.
pub fn normalize_directory(directory: &str) -> Cow<'_, str> {
    let is_normalized = directory.starts_with('/')
        && (directory == "/" || !directory.ends_with('/'))
        && !directory.contains('\\')
        && !directory.contains("./")
        && !directory.contains("//");

    if is_normalized {
        return Cow::Borrowed(directory);
    }

    let replaced = directory.replace('\\', "/");

    let segments = replaced
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect::<Vec<&str>>();

    Cow::Owned(format!("/{}", segments.join("/")))
}

/// Parses "v1.2", "1.2" or "1" by padding missing components with zeros.
pub fn parse_version(version: &str) -> Option<Version> {
    let trimmed = version.trim().trim_start_matches('v');

    if let Ok(parsed) = Version::parse(trimmed) {
        return Some(parsed);
    }

    let (core, rest) = match trimmed.find(['-', '+']) {
        Some(idx) => trimmed.split_at(idx),
        None => (trimmed, ""),
    };

    let mut parts = core.split('.').collect::<Vec<&str>>();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }

    while parts.len() < 3 {
        parts.push("0");
    }

    Version::parse(&format!("{}{rest}", parts.join("."))).ok()
}

/// Case-insensitive dependency name comparison. Several ecosystems treat
/// package names case-insensitively, so every comparison goes through here.
pub fn names_match(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Lowercased form used as the key for dependency-name sets.
pub fn name_key(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// Matches a dependency name against a pattern where `*` matches any run
/// of characters. Matching is case-insensitive.
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    if !pattern.contains('*') {
        return names_match(pattern, name);
    }

    let escaped = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<String>>()
        .join(".*");

    match Regex::new(&format!("(?i)^{escaped}$")) {
        Ok(re) => re.is_match(name),
        Err(e) => {
            log::warn!("invalid dependency pattern '{pattern}': {e}");
            false
        }
    }
}
