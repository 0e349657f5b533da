// ABOUTME: Extracts listening TCP ports from `ss -tln` or `netstat -tln` output.
// ABOUTME: Both tools print the local address in the fourth column.

use std::collections::BTreeSet;

/// Ports with a listening socket, parsed from `ss -tln` or `netstat -tln`.
///
/// Header and malformed lines are skipped.
pub fn listening_ports(listing: &str) -> BTreeSet<u16> {
    listing
        .lines()
        .filter_map(|line| line.split_whitespace().nth(3))
        .filter_map(|local| local.rsplit_once(':'))
        .filter_map(|(_, port)| port.parse().ok())
        .collect()
}
