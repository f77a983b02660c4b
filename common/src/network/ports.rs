//! # Port Specification
//!
//! Parses and holds the set of TCP ports probed on every resolved address.
//!
//! Accepted formats, freely combined with commas:
//! * **Single**: `80`
//! * **Range**: `8000-8010` (inclusive)
//! * **List**: `22,80,443,8000-8010`

use std::str::FromStr;

use crate::error::ConfigError;

/// An immutable, sorted, deduplicated set of ports in `1..=65535`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSpec {
    ports: Vec<u16>,
}

impl PortSpec {
    pub fn new<I>(ports: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = u16>,
    {
        let mut ports: Vec<u16> = ports.into_iter().collect();
        if let Some(zero) = ports.iter().find(|p| **p == 0) {
            return Err(ConfigError::InvalidPort(zero.to_string()));
        }
        if ports.is_empty() {
            return Err(ConfigError::EmptyPortList);
        }

        ports.sort_unstable();
        ports.dedup();
        Ok(Self { ports })
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.ports
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.ports.iter().copied()
    }

    /// Never zero, an empty list is rejected at construction.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.ports.len()
    }
}

impl FromStr for PortSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut ports: Vec<u16> = Vec::new();

        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            match part.split_once('-') {
                Some((start, end)) => ports.extend(parse_range(start, end, part)?),
                None => ports.push(parse_port(part)?),
            }
        }

        PortSpec::new(ports)
    }
}

fn parse_port(s: &str) -> Result<u16, ConfigError> {
    match s.trim().parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ConfigError::InvalidPort(s.trim().to_string())),
    }
}

fn parse_range(start: &str, end: &str, original: &str) -> Result<Vec<u16>, ConfigError> {
    let range_err = |_| ConfigError::InvalidPortRange(original.to_string());
    let start: u16 = parse_port(start).map_err(range_err)?;
    let end: u16 = parse_port(end).map_err(range_err)?;

    if start > end {
        return Err(ConfigError::InvalidPortRange(original.to_string()));
    }
    Ok((start..=end).collect())
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

    #[test]
    fn test_from_str_full_parsing() {
        let spec: PortSpec = "443, 80,8000-8003,80".parse().unwrap();
        assert_eq!(spec.as_slice(), &[80, 443, 8000, 8001, 8002, 8003]);

        let single: PortSpec = "22".parse().unwrap();
        assert_eq!(single.as_slice(), &[22]);

        let full: PortSpec = "1-65535".parse().unwrap();
        assert_eq!(full.len(), 65535);
    }

    #[test]
    fn test_from_str_errors() {
        assert_eq!("0".parse::<PortSpec>(), Err(ConfigError::InvalidPort("0".into())));
        assert_eq!("65536".parse::<PortSpec>(), Err(ConfigError::InvalidPort("65536".into())));
        assert_eq!("http".parse::<PortSpec>(), Err(ConfigError::InvalidPort("http".into())));
        assert_eq!(
            "90-80".parse::<PortSpec>(),
            Err(ConfigError::InvalidPortRange("90-80".into()))
        );
        assert_eq!(
            "1-x".parse::<PortSpec>(),
            Err(ConfigError::InvalidPortRange("1-x".into()))
        );
        assert_eq!(" , ".parse::<PortSpec>(), Err(ConfigError::EmptyPortList));
    }

    #[test]
    fn test_new_rejects_port_zero() {
        assert!(PortSpec::new([0, 80]).is_err());
        assert_eq!(PortSpec::new([443, 80]).unwrap().as_slice(), &[80, 443]);
    }
}
