//! # Scan Target Model
//!
//! Turns the user supplied root domain and the subdomain wordlist into the flat,
//! ordered list of names the engine resolves.
//!
//! * The root domain always comes first.
//! * Subdomains follow in wordlist order, each expanded to `label.root`.
//! * Every wordlist entry yields exactly one name, repeats included.
//! * An entry that does not form a valid name is a setup error.

use std::fmt;

use tracing::debug;

use crate::error::ConfigError;

const MAX_NAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// A normalized DNS name: lowercase, no trailing dot, validated label syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(String);

impl Name {
    pub fn new(raw: &str) -> Result<Self, ConfigError> {
        let normalized: String = normalize(raw);
        validate(&normalized)?;
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds `label.self`.
    pub fn child(&self, label: &str) -> Result<Self, ConfigError> {
        Name::new(&format!("{label}.{}", self.0))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Every name of one run, root first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSet {
    names: Vec<Name>,
}

impl TargetSet {
    /// Builds the set from a root domain and raw wordlist entries.
    ///
    /// Wordlist entries may be bare labels (`www`, `dev.api`) or full names
    /// under the root (`www.example.com`, or the root itself). Blank entries
    /// and `#` comments are not entries. Repeated entries are kept, one name
    /// each, so the report always has one node per entry.
    pub fn build<I, S>(root: &str, labels: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let root: Name = parse_root(root)?;
        let mut names: Vec<Name> = vec![root.clone()];

        for entry in labels {
            let name: Name = match parse_label(entry.as_ref(), &root) {
                Label::Skip => continue,
                Label::Root => root.clone(),
                Label::Child(label) => root.child(&label)?,
            };
            names.push(name);
        }

        debug!("Built {} names under {root}", names.len());
        Ok(Self { names })
    }

    pub fn root(&self) -> &Name {
        &self.names[0]
    }

    /// All names in enumeration order (root at index 0).
    pub fn names(&self) -> &[Name] {
        &self.names
    }

    pub fn subdomains(&self) -> &[Name] {
        &self.names[1..]
    }

    /// Never zero, the root is always present.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.names.len()
    }
}

fn parse_root(root: &str) -> Result<Name, ConfigError> {
    if normalize(root).is_empty() {
        return Err(ConfigError::EmptyTarget);
    }
    Name::new(root)
}

enum Label {
    Skip,
    Root,
    Child(String),
}

/// Reduces a wordlist entry to the label part, relative to `root`.
fn parse_label(entry: &str, root: &Name) -> Label {
    let entry: &str = entry.trim();
    if entry.is_empty() || entry.starts_with('#') {
        return Label::Skip;
    }

    let label: String = normalize(entry);
    if label == root.as_str() {
        return Label::Root;
    }

    let suffix: String = format!(".{}", root.as_str());
    match label.strip_suffix(&suffix) {
        Some(stripped) => Label::Child(stripped.to_string()),
        None => Label::Child(label),
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().trim_end_matches('.').to_ascii_lowercase()
}

fn validate(name: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &'static str| ConfigError::InvalidName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(invalid("name exceeds 253 characters"));
    }

    for label in name.split('.') {
        if label.is_empty() {
            return Err(invalid("empty label"));
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(invalid("label exceeds 63 characters"));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(invalid("label cannot start or end with '-'"));
        }
        if !label
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(invalid("label contains invalid characters"));
        }
    }

    Ok(())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    fn as_strings(set: &TargetSet) -> Vec<&str> {
        set.names().iter().map(Name::as_str).collect()
    }

    #[test]
    fn test_name_normalization() {
        assert_eq!(Name::new("Example.COM.").unwrap().as_str(), "example.com");
        assert_eq!(Name::new("  _dmarc.example.com ").unwrap().as_str(), "_dmarc.example.com");

        // --- Error Cases ---
        assert!(Name::new("").is_err());
        assert!(Name::new("exa mple.com").is_err());
        assert!(Name::new("-bad.example.com").is_err());
        assert!(Name::new("a..b").is_err());
        assert!(Name::new(&format!("{}.com", "a".repeat(64))).is_err());
    }

    #[test]
    fn test_root_first_then_wordlist_order() {
        let set = TargetSet::build("example.com", ["www", "mail", "dev.api"]).unwrap();
        assert_eq!(
            as_strings(&set),
            vec!["example.com", "www.example.com", "mail.example.com", "dev.api.example.com"]
        );
        assert_eq!(set.root().as_str(), "example.com");
        assert_eq!(set.subdomains().len(), 3);
    }

    #[test]
    fn test_wordlist_cleanup() {
        let labels = [
            "# common names",
            "",
            "  WWW  ",
            "www",
            "www.example.com",
            "example.com",
            "mail.",
        ];
        let set = TargetSet::build("example.com", labels).unwrap();
        assert_eq!(
            as_strings(&set),
            vec![
                "example.com",
                "www.example.com",
                "www.example.com",
                "www.example.com",
                "example.com",
                "mail.example.com"
            ]
        );
    }

    #[test]
    fn test_one_name_per_wordlist_entry() {
        let set = TargetSet::build("example.com", ["www", "www"]).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.subdomains()[0], set.subdomains()[1]);
    }

    #[test]
    fn test_invalid_wordlist_entry_is_fatal() {
        let err = TargetSet::build("example.com", ["www", "bad label"]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidName { ref name, .. } if name == "bad label.example.com"
        ));
    }

    #[test]
    fn test_invalid_root_is_fatal() {
        assert_eq!(
            TargetSet::build("   ", ["www"]),
            Err(ConfigError::EmptyTarget)
        );
        assert!(matches!(
            TargetSet::build("not a domain", Vec::<String>::new()),
            Err(ConfigError::InvalidName { .. })
        ));
    }
}
