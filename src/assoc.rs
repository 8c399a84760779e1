//! Derived views over hosts and subnets
//!
//! Pure functions associating monitored hosts with the subnets that
//! contain them. A monitored point-to-point radio link shows up in
//! HamnetDB as a small subnet with exactly two monitored endpoints;
//! subnets with any other number of monitored hosts are not links.

use ipnetwork::IpNetwork;

use crate::client::models::{Host, Subnet, SubnetAssociations};

/// True when `outer` strictly contains `inner`.
fn strictly_contains(outer: &IpNetwork, inner: &IpNetwork) -> bool {
    outer.prefix() < inner.prefix() && outer.contains(inner.network())
}

/// True when `inner` is contained in or equal to `outer`.
fn covers(outer: &IpNetwork, inner: &IpNetwork) -> bool {
    *outer == *inner || strictly_contains(outer, inner)
}

/// Drop every subnet that strictly contains another listed subnet,
/// keeping only the most specific ones. Exclusion is judged against the
/// full input set.
pub fn most_specific(subnets: &[Subnet]) -> Vec<Subnet> {
    subnets
        .iter()
        .filter(|s| {
            !subnets
                .iter()
                .any(|other| strictly_contains(&s.cidr, &other.cidr))
        })
        .cloned()
        .collect()
}

/// Associate each subnet with the hosts whose address it contains.
/// Subnets with no matching host are omitted entirely.
pub fn associate_hosts(subnets: &[Subnet], hosts: &[Host]) -> SubnetAssociations {
    let mut map = SubnetAssociations::new();
    for subnet in subnets {
        let members: Vec<Host> = hosts
            .iter()
            .filter(|h| subnet.contains(h.ip))
            .cloned()
            .collect();
        if !members.is_empty() {
            map.insert(subnet.clone(), members);
        }
    }
    map
}

/// Keep only subnets with exactly two associated hosts.
pub fn retain_unique_pairs(associations: SubnetAssociations) -> SubnetAssociations {
    associations
        .into_iter()
        .filter(|(_, hosts)| hosts.len() == 2)
        .collect()
}

/// Unique host pairs over the full subnet set, without parent exclusion.
pub fn unique_pairs_global(hosts: &[Host], subnets: &[Subnet]) -> SubnetAssociations {
    retain_unique_pairs(associate_hosts(subnets, hosts))
}

/// Unique host pairs over the most-specific subnets only.
pub fn unique_pairs(hosts: &[Host], subnets: &[Subnet]) -> SubnetAssociations {
    retain_unique_pairs(associate_hosts(&most_specific(subnets), hosts))
}

/// Restrict an association map to subnets contained in or equal to
/// `filter`.
pub fn restrict_to(associations: &SubnetAssociations, filter: IpNetwork) -> SubnetAssociations {
    associations
        .iter()
        .filter(|(subnet, _)| covers(&filter, &subnet.cidr))
        .map(|(subnet, hosts)| (subnet.clone(), hosts.clone()))
        .collect()
}
