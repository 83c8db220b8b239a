use crate::config::{OwnershipTable, PolicyFlags};
use crate::stats::ArpStats;
use arp_rs_packets::MacAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Physical link attachment slot. At most two are live at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Port {
    Emac0,
    Emac1,
}

/// Per-attachment state: the port's hardware address, its policy bits, and
/// its counters.
///
/// Owned by the link-layer subsystem for the lifetime of the link; dispatch
/// borrows it for the duration of one call. Policy is mutated only through
/// the config surface.
#[derive(Clone, Debug)]
pub struct Attachment {
    pub port: Port,
    pub hw_addr: MacAddr,
    pub policy: PolicyFlags,
    pub stats: ArpStats,
}

impl Attachment {
    pub fn new(port: Port, hw_addr: MacAddr) -> Attachment {
        Attachment {
            port,
            hw_addr,
            policy: PolicyFlags::default(),
            stats: ArpStats::new(),
        }
    }
}

/// Process-wide configuration shared by both attachments.
///
/// Writers replace the ownership table in a single assignment under the
/// lock; dispatch reads one consistent copy per frame and never sees a
/// partial update. The standby flag marks that ARP responsibility has been
/// ceded to a peer unit.
#[derive(Debug, Default)]
pub struct ServiceState {
    ownership: Mutex<OwnershipTable>,
    standby: AtomicBool,
}

impl ServiceState {
    pub fn new() -> ServiceState {
        ServiceState::default()
    }

    /// One consistent copy of the ownership table.
    pub fn ownership(&self) -> OwnershipTable {
        *self.ownership.lock().unwrap()
    }

    /// Whole-table replacement; the only write path.
    pub fn set_ownership(&self, table: OwnershipTable) {
        *self.ownership.lock().unwrap() = table;
    }

    pub fn standby(&self) -> bool {
        self.standby.load(Ordering::Relaxed)
    }

    pub fn set_standby(&self, standby: bool) {
        self.standby.store(standby, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn new_attachment_starts_quiet() {
        let attachment = Attachment::new(Port::Emac0, MacAddr::new([1, 2, 3, 4, 5, 6]));
        assert!(!attachment.policy.reply_enabled);
        assert_eq!(attachment.stats, ArpStats::default());
    }

    #[test]
    fn ownership_replacement_is_whole_table() {
        let service = ServiceState::new();
        let mut table = OwnershipTable::new();
        table.set_address(Ipv4Addr::new(10, 0, 0, 1)).unwrap();
        service.set_ownership(table);

        let seen = service.ownership();
        assert_eq!(seen.owned().collect::<Vec<_>>(), [Ipv4Addr::new(10, 0, 0, 1)]);

        service.set_ownership(OwnershipTable::new());
        assert_eq!(service.ownership().owned().count(), 0);
    }

    #[test]
    fn standby_toggles() {
        let service = ServiceState::new();
        assert!(!service.standby());
        service.set_standby(true);
        assert!(service.standby());
    }
}
