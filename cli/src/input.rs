use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Context;

/// Reads the subdomain wordlist.
pub fn read_wordlist(path: &Path) -> anyhow::Result<Vec<String>> {
    let file = File::open(path)
        .with_context(|| format!("Couldn't read subdomains file {}", path.display()))?;
    parse_wordlist(BufReader::new(file))
        .with_context(|| format!("Couldn't read line of {}", path.display()))
}

/// One label per line; blank lines and `#` comments are skipped.
pub fn parse_wordlist<R: BufRead>(reader: R) -> std::io::Result<Vec<String>> {
    let mut labels: Vec<String> = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let label = line.trim();
        if label.is_empty() || label.starts_with('#') {
            continue;
        }
        labels.push(label.to_string());
    }
    Ok(labels)
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
    use std::io::Cursor;

    #[test]
    fn skips_comments_and_blank_lines() {
        let raw = "# top names\nwww\n\n  mail \r\n#dev\napi\n";
        let labels = parse_wordlist(Cursor::new(raw)).unwrap();
        assert_eq!(labels, vec!["www", "mail", "api"]);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_wordlist(Path::new("/nonexistent/dns.txt")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dns.txt"));
    }
}
