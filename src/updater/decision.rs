use std::net::Ipv4Addr;

/// Decide whether the zone records should be rewritten this run.
///
/// With no stored address there is nothing to compare against, so a first
/// run only updates when forced or given an explicit address.
pub fn should_update(
    current_ip: Ipv4Addr,
    last_ip: Option<Ipv4Addr>,
    force: bool,
    explicit_ip: Option<Ipv4Addr>,
) -> bool {
    if force || explicit_ip.is_some() {
        return true;
    }

    match last_ip {
        Some(last) => last != current_ip,
        None => false,
    }
}
