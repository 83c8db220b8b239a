use arp_rs_packets::{ArpFrame, ArpHardwareType, ARP_FIXED_HEADER_LEN, IPV4_ETHER_TYPE};

/// Hardware address length this engine speaks.
pub const ETHER_ADDR_LEN: usize = 6;
/// Protocol address length this engine speaks.
pub const IPV4_ADDR_LEN: usize = 4;

/// Payload length of a complete IPv4-over-Ethernet ARP packet.
pub const ARP_IPV4_PAYLOAD_LEN: usize =
    ARP_FIXED_HEADER_LEN + 2 * ETHER_ADDR_LEN + 2 * IPV4_ADDR_LEN;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// The buffer is shorter than the fixed header, or than the four
    /// address fields the header claims.
    Truncated,
    /// A hardware type or hardware address length this engine does not
    /// speak.
    UnsupportedHardware,
    /// A protocol type or protocol address length other than IPv4 with
    /// 4-byte addresses.
    UnsupportedProtocol,
}

/// Shape check for an inbound ARP payload, first failure wins. Pure: the
/// caller owns every counter and disposal side effect.
///
/// Address fields must never be interpreted before this passes; afterwards
/// all four are present and sized 6/4.
pub fn validate(arp: &ArpFrame) -> Result<(), RejectReason> {
    let declared = arp.payload_len();
    let (hln, pln) = match (arp.hardware_addr_len(), arp.protocol_addr_len()) {
        (Some(h), Some(p)) if declared >= ARP_FIXED_HEADER_LEN => (h as usize, p as usize),
        _ => return Err(RejectReason::Truncated),
    };

    if arp.hardware_type() != Some(ArpHardwareType::Ethernet as u16) || hln != ETHER_ADDR_LEN {
        return Err(RejectReason::UnsupportedHardware);
    }

    if declared < ARP_FIXED_HEADER_LEN + 2 * hln + 2 * pln {
        return Err(RejectReason::Truncated);
    }

    if arp.protocol_type() != Some(IPV4_ETHER_TYPE) || pln != IPV4_ADDR_LEN {
        return Err(RejectReason::UnsupportedProtocol);
    }

    Ok(())
}
