use crate::terminal::colors;
use colored::*;
use std::net::{IpAddr, Ipv6Addr};
use subrecon_common::report::AddressEntry;

pub fn ipv6_to_type_str(ipv6_addr: &Ipv6Addr) -> &'static str {
    if is_global_unicast(ipv6_addr) {
        return "GUA";
    }
    if ipv6_addr.is_unique_local() {
        return "ULA";
    }
    if ipv6_addr.is_unicast_link_local() {
        return "LLA";
    }
    "IPv6"
}

// 2000::/3
fn is_global_unicast(ipv6_addr: &Ipv6Addr) -> bool {
    let first_byte = ipv6_addr.octets()[0];
    (0x20..=0x3F).contains(&first_byte)
}

/// One tree line per address: `IPv4....: 1.2.3.4 ⇢ 80, 443`.
pub fn addresses_to_detail(addresses: &[AddressEntry]) -> Vec<(String, ColoredString)> {
    addresses
        .iter()
        .map(|entry| {
            let (key, ip) = match entry.ip {
                IpAddr::V4(ipv4_addr) => {
                    ("IPv4".to_string(), ipv4_addr.to_string().color(colors::IPV4_ADDR))
                }
                IpAddr::V6(ipv6_addr) => (
                    ipv6_to_type_str(&ipv6_addr).to_string(),
                    ipv6_addr.to_string().color(colors::IPV6_ADDR),
                ),
            };
            let value: ColoredString = match &entry.ports {
                Some(ports) if !ports.is_empty() => {
                    let joined = ports
                        .iter()
                        .map(u16::to_string)
                        .collect::<Vec<String>>()
                        .join(", ");
                    format!("{} {} {}", ip, "⇢".color(colors::SEPARATOR), joined.color(colors::PORT))
                        .normal()
                }
                _ => ip,
            };
            (key, value)
        })
        .collect()
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
    use std::net::Ipv4Addr;

    #[test]
    fn ipv6_types() {
        assert_eq!(ipv6_to_type_str(&"2001:db8::1".parse().unwrap()), "GUA");
        assert_eq!(ipv6_to_type_str(&"fd00::1".parse().unwrap()), "ULA");
        assert_eq!(ipv6_to_type_str(&"fe80::1".parse().unwrap()), "LLA");
        assert_eq!(ipv6_to_type_str(&Ipv6Addr::LOCALHOST), "IPv6");
    }

    #[test]
    fn ports_are_listed_next_to_address() {
        colored::control::set_override(false);
        let entries = vec![
            AddressEntry {
                ip: IpAddr::V4(Ipv4Addr::new(1, 2, 3, 4)),
                ports: Some(vec![80, 443]),
            },
            AddressEntry {
                ip: IpAddr::V4(Ipv4Addr::new(5, 6, 7, 8)),
                ports: Some(vec![]),
            },
        ];

        let details = addresses_to_detail(&entries);
        assert_eq!(details[0].0, "IPv4");
        assert_eq!(details[0].1.to_string(), "1.2.3.4 ⇢ 80, 443");
        assert_eq!(details[1].1.to_string(), "5.6.7.8");
    }
}
