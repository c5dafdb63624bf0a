use std::collections::hash_map;
use std::net::IpAddr;

use banwatch_util::FastHashMap;
use banwatch_util::time::UnixTime;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::subnet::Subnet;

/// Active ban of a whole subnet, held until the expiry timestamp.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanEntry {
    pub subnet: Subnet,
    pub banned_until: UnixTime,
}

/// Source of banned-subnet snapshots.
///
/// The snapshot is ordered by subnet so that consumers observe a stable
/// row order between rebuilds of an unchanged ban set.
pub trait BanRegistry: Send + Sync {
    fn banned(&self) -> Vec<BanEntry>;
}

/// In-memory ban registry.
#[derive(Default)]
pub struct MemBanRegistry {
    bans: Mutex<FastHashMap<Subnet, UnixTime>>,
}

impl MemBanRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bans a subnet until the given time.
    ///
    /// An existing ban is only ever extended: a repeated ban with an
    /// earlier expiry keeps the stored one. Returns whether the stored
    /// ban set changed.
    pub fn ban(&self, subnet: Subnet, until: UnixTime) -> bool {
        let changed = {
            let mut bans = self.bans.lock();
            match bans.entry(subnet) {
                hash_map::Entry::Occupied(mut occupied) => {
                    if until > *occupied.get() {
                        occupied.insert(until);
                        true
                    } else {
                        false
                    }
                }
                hash_map::Entry::Vacant(vacant) => {
                    vacant.insert(until);
                    true
                }
            }
        };
        if changed {
            tracing::debug!(%subnet, %until, "subnet banned");
            self.update_gauge();
        }
        changed
    }

    /// Returns whether the subnet had an entry to remove.
    pub fn unban(&self, subnet: &Subnet) -> bool {
        let removed = self.bans.lock().remove(subnet).is_some();
        if removed {
            tracing::debug!(%subnet, "subnet unbanned");
            self.update_gauge();
        }
        removed
    }

    pub fn is_banned(&self, addr: IpAddr, now: UnixTime) -> bool {
        let bans = self.bans.lock();
        bans.iter()
            .any(|(subnet, until)| *until > now && subnet.contains(addr))
    }

    /// Drops entries whose expiry is at or before `now`. Returns the
    /// number of removed entries.
    pub fn sweep_expired(&self, now: UnixTime) -> usize {
        let removed = {
            let mut bans = self.bans.lock();
            let before = bans.len();
            bans.retain(|_subnet, until| *until > now);
            before - bans.len()
        };
        if removed > 0 {
            tracing::debug!(removed, "swept expired bans");
            self.update_gauge();
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.bans.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bans.lock().is_empty()
    }

    fn update_gauge(&self) {
        let len = self.bans.lock().len();
        metrics::gauge!("banwatch_registry_bans").set(len as f64);
    }
}

impl BanRegistry for MemBanRegistry {
    fn banned(&self) -> Vec<BanEntry> {
        let mut entries = self
            .bans
            .lock()
            .iter()
            .map(|(subnet, until)| BanEntry {
                subnet: *subnet,
                banned_until: *until,
            })
            .collect::<Vec<_>>();
        entries.sort_unstable_by(|left, right| left.subnet.cmp(&right.subnet));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subnet(s: &str) -> Subnet {
        s.parse().unwrap()
    }

    #[test]
    fn ban_keeps_later_expiry() {
        let registry = MemBanRegistry::new();
        assert!(registry.ban(subnet("10.0.0.0/8"), UnixTime::from_secs(200)));

        // shorter re-ban is a no-op
        assert!(!registry.ban(subnet("10.0.0.0/8"), UnixTime::from_secs(100)));
        // equal expiry too
        assert!(!registry.ban(subnet("10.0.0.0/8"), UnixTime::from_secs(200)));
        // extension wins
        assert!(registry.ban(subnet("10.0.0.0/8"), UnixTime::from_secs(300)));

        let banned = registry.banned();
        assert_eq!(banned.len(), 1);
        assert_eq!(banned[0].banned_until, UnixTime::from_secs(300));
    }

    #[test]
    fn unban_reports_presence() {
        let registry = MemBanRegistry::new();
        registry.ban(subnet("10.0.0.0/8"), UnixTime::from_secs(100));

        assert!(registry.unban(&subnet("10.0.0.0/8")));
        assert!(!registry.unban(&subnet("10.0.0.0/8")));
        assert!(registry.is_empty());
    }

    #[test]
    fn is_banned_checks_range_and_expiry() {
        let registry = MemBanRegistry::new();
        registry.ban(subnet("10.0.0.0/8"), UnixTime::from_secs(100));

        let addr = "10.1.2.3".parse().unwrap();
        assert!(registry.is_banned(addr, UnixTime::from_secs(99)));
        // ban ends exactly at its expiry
        assert!(!registry.is_banned(addr, UnixTime::from_secs(100)));
        assert!(!registry.is_banned("11.0.0.1".parse().unwrap(), UnixTime::ZERO));
    }

    #[test]
    fn sweep_drops_only_expired() {
        let registry = MemBanRegistry::new();
        registry.ban(subnet("10.0.0.0/8"), UnixTime::from_secs(100));
        registry.ban(subnet("192.168.1.1/32"), UnixTime::from_secs(300));

        assert_eq!(registry.sweep_expired(UnixTime::from_secs(100)), 1);
        assert_eq!(registry.sweep_expired(UnixTime::from_secs(100)), 0);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.banned()[0].subnet, subnet("192.168.1.1/32"));
    }

    #[test]
    fn snapshot_is_subnet_ordered() {
        let registry = MemBanRegistry::new();
        registry.ban(subnet("192.168.1.1/32"), UnixTime::from_secs(1800000000));
        registry.ban(subnet("10.0.0.0/8"), UnixTime::from_secs(1700000000));

        let banned = registry.banned();
        let subnets: Vec<_> = banned.iter().map(|e| e.subnet.to_string()).collect();
        assert_eq!(subnets, ["10.0.0.0/8", "192.168.1.1/32"]);
    }
}
