use failure::Fail;
use std::net::Ipv4Addr;

/// Capacity of the multi-address ownership list.
pub const ADDR_SLOTS: usize = 8;

/// Service-config bit 0: answer ARP requests locally.
pub const SERVICE_CFG_REPLIES: u16 = 0x0001;

/// Forwarding-config bit 0: hand ARP frames to the host application.
pub const FORWARD_CFG_ENABLED: u16 = 0x0001;
/// Forwarding-config bit 1: forward only replies; requests are dropped.
pub const FORWARD_CFG_REPLIES_ONLY: u16 = 0x0002;

#[derive(Clone, Copy, Debug, Fail, PartialEq, Eq)]
pub enum ConfigError {
    #[fail(display = "config payload has the wrong length")]
    BadLength,
    #[fail(display = "address list contains the all-zero address")]
    ZeroAddress,
}

/// Per-attachment policy bits, mutated only through the config surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PolicyFlags {
    /// Answer ARP requests on this attachment.
    pub reply_enabled: bool,
    /// Hand ARP frames to the host application when not answering locally.
    pub forward_enabled: bool,
    /// Restrict forwarding to replies; requests are dropped instead.
    pub forward_replies_only: bool,
}

impl PolicyFlags {
    /// Applies a raw ARP service-config payload: exactly two bytes,
    /// little-endian.
    pub fn apply_service_config(&mut self, payload: &[u8]) -> Result<(), ConfigError> {
        if payload.len() != 2 {
            return Err(ConfigError::BadLength);
        }
        let value = u16::from_le_bytes([payload[0], payload[1]]);
        self.reply_enabled = value & SERVICE_CFG_REPLIES != 0;
        Ok(())
    }

    pub fn query_service_config(&self) -> [u8; 2] {
        let mut value = 0;
        if self.reply_enabled {
            value |= SERVICE_CFG_REPLIES;
        }
        value.to_le_bytes()
    }

    /// Applies a raw special-packet forwarding config payload: exactly two
    /// bytes, little-endian.
    pub fn apply_forwarding_config(&mut self, payload: &[u8]) -> Result<(), ConfigError> {
        if payload.len() != 2 {
            return Err(ConfigError::BadLength);
        }
        let value = u16::from_le_bytes([payload[0], payload[1]]);
        self.forward_enabled = value & FORWARD_CFG_ENABLED != 0;
        self.forward_replies_only = value & FORWARD_CFG_REPLIES_ONLY != 0;
        Ok(())
    }

    pub fn query_forwarding_config(&self) -> [u8; 2] {
        let mut value = 0;
        if self.forward_enabled {
            value |= FORWARD_CFG_ENABLED;
        }
        if self.forward_replies_only {
            value |= FORWARD_CFG_REPLIES_ONLY;
        }
        value.to_le_bytes()
    }
}

/// The set of IP addresses this host answers for: either one designated
/// address, or an ordered list of up to ADDR_SLOTS addresses.
///
/// A None slot marks the first unused entry and every entry after it;
/// writing the list always clears the remainder, so the table never has
/// gaps and never stores the all-zero address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OwnershipTable {
    designated: Option<Ipv4Addr>,
    list: [Option<Ipv4Addr>; ADDR_SLOTS],
}

impl OwnershipTable {
    pub fn new() -> OwnershipTable {
        OwnershipTable::default()
    }

    /// Designates the single address this host answers for. While set, it
    /// takes precedence over the list.
    pub fn set_address(&mut self, addr: Ipv4Addr) -> Result<(), ConfigError> {
        if addr.is_unspecified() {
            return Err(ConfigError::ZeroAddress);
        }
        self.designated = Some(addr);
        Ok(())
    }

    pub fn clear_address(&mut self) {
        self.designated = None;
    }

    /// Replaces the address list from a raw config payload: a run of 4-byte
    /// addresses, each carried as two little-endian 16-bit words.
    pub fn set_address_list(&mut self, payload: &[u8]) -> Result<(), ConfigError> {
        // Length must be a multiple of 4 and fit the table.
        if payload.len() & 0x0003 != 0 || payload.len() > 4 * ADDR_SLOTS {
            return Err(ConfigError::BadLength);
        }

        let words: Vec<u16> = payload
            .chunks(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();

        // None of the passed addresses may be zero.
        for i in (0..words.len()).step_by(2) {
            let addr = u32::from(words[i]) | u32::from(words[i + 1]) << 16;
            if addr == 0 {
                return Err(ConfigError::ZeroAddress);
            }
        }

        // Update the table with the parameters.
        let mut filled = 0;
        for i in (0..words.len()).step_by(2) {
            let addr = u32::from(words[i]) | u32::from(words[i + 1]) << 16;
            self.list[filled] = Some(Ipv4Addr::from(addr.to_le_bytes()));
            filled += 1;
        }

        // Complete the table with empty slots.
        for slot in self.list.iter_mut().skip(filled) {
            *slot = None;
        }

        Ok(())
    }

    /// Serializes the used slots in order, stopping at the first unused one.
    pub fn query_address_list(&self) -> Vec<u8> {
        let mut payload = Vec::new();
        for slot in &self.list {
            match slot {
                Some(addr) => payload.extend_from_slice(&addr.octets()),
                None => break,
            }
        }
        payload
    }

    /// The set of owned addresses, in table order. A one-element set while
    /// a designated address is present.
    pub fn owned(&self) -> impl Iterator<Item = Ipv4Addr> + '_ {
        let list = match self.designated {
            Some(_) => &self.list[..0],
            None => &self.list[..],
        };
        self.designated.into_iter().chain(
            list.iter()
                .take_while(|slot| slot.is_some())
                .filter_map(|slot| *slot),
        )
    }

    /// First owned address equal to either the sender or the target
    /// protocol address.
    pub fn match_addresses(&self, sender: Ipv4Addr, target: Ipv4Addr) -> Option<Ipv4Addr> {
        self.owned().find(|&own| own == sender || own == target)
    }
}
