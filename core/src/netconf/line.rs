//! Raw-text-preserving view of one guest config.
//!
//! A config is a list of `key: value` lines; lines after the first
//! `[section]` header belong to snapshots and are never considered. Field
//! lookups and rewrites both stop at that boundary, and a rewrite replaces
//! exactly one line, reusing the original separator bytes.

/// Read-only field access over the live (pre-snapshot) section.
pub(crate) struct ConfigDoc<'a> {
    live: Vec<&'a str>,
}

impl<'a> ConfigDoc<'a> {
    pub fn parse(text: &'a str) -> Self {
        let live: Vec<&str> = text
            .split('\n')
            .take_while(|line| !line.trim_start().starts_with('['))
            .collect();
        Self { live }
    }

    /// Value of the first `key: ...` line.
    pub fn field(&self, key: &str) -> Option<&'a str> {
        self.live
            .iter()
            .find_map(|line| split_field(line, key).map(|(_, value)| value))
    }
}

/// Rewrites the value of the first `key: ...` line in the live section,
/// leaving every other line byte-identical. `None` when the field is
/// absent.
pub(crate) fn rewrite_field(
    text: &str,
    key: &str,
    rewrite: impl FnOnce(&str) -> String,
) -> Option<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut rewrite = Some(rewrite);
    let mut in_snapshot = false;

    for line in text.split('\n') {
        if line.trim_start().starts_with('[') {
            in_snapshot = true;
        }
        if !in_snapshot
            && let Some((sep, value)) = split_field(line, key)
            && let Some(rewrite) = rewrite.take()
        {
            lines.push(format!("{key}:{sep}{}", rewrite(value)));
            continue;
        }
        lines.push(line.to_string());
    }

    match rewrite {
        Some(_) => None,
        None => Some(lines.join("\n")),
    }
}

/// Splits `net0: name=eth0,...` into (`" "`, `"name=eth0,..."`) when the
/// line carries `key`. The separator is the raw whitespace after the colon.
fn split_field<'a>(line: &'a str, key: &str) -> Option<(&'a str, &'a str)> {
    let rest = line.strip_prefix(key)?.strip_prefix(':')?;
    let value = rest.trim_start();
    Some((&rest[..rest.len() - value.len()], value))
}

/// Key of a `key=value` token; the whole token when it carries no `=`.
pub(crate) fn token_key(token: &str) -> &str {
    token.split_once('=').map_or(token, |(key, _)| key)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
