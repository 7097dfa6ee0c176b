//! Debian control-file stanzas, as found in the dpkg status database.

use indexmap::IndexMap;

/// One blank-line separated paragraph of `Field: value` lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stanza {
    fields: IndexMap<String, String>,
}

impl Stanza {
    /// Value of `field`, compared case-insensitively.
    ///
    /// Continuation lines are joined to the value with `'\n'`.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(field))
            .map(|(_, value)| value.as_str())
    }

    /// Field names in file order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Split control-file text into stanzas.
///
/// Lines that are neither `Field: value` nor continuations are ignored, as
/// are `#` comments.
pub fn parse_stanzas(content: &str) -> Vec<Stanza> {
    let mut stanzas = Vec::new();
    let mut current = Stanza::default();
    let mut last_field: Option<String> = None;

    for line in content.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                stanzas.push(std::mem::take(&mut current));
            }
            last_field = None;
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        if line.starts_with([' ', '\t']) {
            if let Some(value) = last_field.as_ref().and_then(|f| current.fields.get_mut(f)) {
                value.push('\n');
                value.push_str(line.trim());
            }
            continue;
        }

        match line.split_once(':') {
            Some((name, value)) => {
                let name = name.trim().to_string();
                current.fields.insert(name.clone(), value.trim().to_string());
                last_field = Some(name);
            }
            None => tracing::debug!(line, "ignoring malformed control line"),
        }
    }

    if !current.is_empty() {
        stanzas.push(current);
    }
    stanzas
}
