use crate::{EthernetFrame, MacAddr, ARP_ETHER_TYPE};
use std::convert::TryInto;
use std::net::Ipv4Addr;

pub enum ArpOp {
    Request = 1,
    Reply = 2,
}

pub enum ArpHardwareType {
    Ethernet = 1,
}

/// Length of the fixed portion of the ARP header: hardware type, protocol
/// type, both address-length octets, and the operation.
pub const ARP_FIXED_HEADER_LEN: usize = 8;

const HARDWARE_TYPE_RANGE: (usize, usize) = (0, 2);
const PROTOCOL_TYPE_RANGE: (usize, usize) = (2, 4);
const HARDWARE_ADDR_LEN_OFFSET: usize = 4;
const PROTOCOL_ADDR_LEN_OFFSET: usize = 5;
const OPCODE_RANGE: (usize, usize) = (6, 8);

///
/// EthernetFrame decorator with getters/setters for the packet structure
/// described in RFC 826 https://tools.ietf.org/html/rfc826
///
/// Decoration performs no shape checks. Read accessors are bounds-checked
/// against the actual buffer and return None when the field is not all
/// there, so untrusted frames can be examined field by field before any
/// address is trusted. Setters expect the field to be present and are meant
/// for frames built by `new` or already proven well-formed.
///
#[derive(Clone, Debug)]
pub struct ArpFrame {
    frame: EthernetFrame,
}

impl ArpFrame {
    /// Wraps a frame without inspecting the payload.
    pub fn decorate(frame: EthernetFrame) -> ArpFrame {
        ArpFrame { frame }
    }

    ///
    /// Constructs a new, empty packet with a payload big enough for all ARP
    /// fields, given some hardware/protocol address lengths. The carrying
    /// frame gets the ARP ether type.
    ///
    pub fn new(hardware_addr_len: u8, protocol_addr_len: u8) -> ArpFrame {
        let payload_len = ARP_FIXED_HEADER_LEN
            + 2 * hardware_addr_len as usize
            + 2 * protocol_addr_len as usize;

        let mut frame = EthernetFrame::empty();
        frame.set_payload(&vec![0; payload_len]);
        frame.set_ether_type(ARP_ETHER_TYPE);

        let mut arp_frame = ArpFrame::decorate(frame);
        arp_frame.set_hardware_addr_len(hardware_addr_len);
        arp_frame.set_protocol_addr_len(protocol_addr_len);
        arp_frame
    }

    pub fn payload_len(&self) -> usize {
        self.frame.payload_len()
    }

    pub fn hardware_type(&self) -> Option<u16> {
        self.read_u16(HARDWARE_TYPE_RANGE)
    }

    pub fn protocol_type(&self) -> Option<u16> {
        self.read_u16(PROTOCOL_TYPE_RANGE)
    }

    pub fn hardware_addr_len(&self) -> Option<u8> {
        self.read_u8(HARDWARE_ADDR_LEN_OFFSET)
    }

    pub fn protocol_addr_len(&self) -> Option<u8> {
        self.read_u8(PROTOCOL_ADDR_LEN_OFFSET)
    }

    pub fn operation(&self) -> Option<u16> {
        self.read_u16(OPCODE_RANGE)
    }

    pub fn is_request(&self) -> bool {
        self.operation() == Some(ArpOp::Request as u16)
    }

    pub fn is_reply(&self) -> bool {
        self.operation() == Some(ArpOp::Reply as u16)
    }

    /// Sender hardware address. None unless the frame declares 6-byte
    /// hardware addresses and actually carries the field.
    pub fn sender_mac_addr(&self) -> Option<MacAddr> {
        let (start, end) = self.sender_hardware_addr_range()?;
        self.read_mac(start, end)
    }

    /// Sender protocol address. None unless the frame declares 4-byte
    /// protocol addresses and actually carries the field.
    pub fn sender_ipv4_addr(&self) -> Option<Ipv4Addr> {
        let (start, end) = self.sender_protocol_addr_range()?;
        self.read_ipv4(start, end)
    }

    pub fn target_mac_addr(&self) -> Option<MacAddr> {
        let (start, end) = self.target_hardware_addr_range()?;
        self.read_mac(start, end)
    }

    pub fn target_ipv4_addr(&self) -> Option<Ipv4Addr> {
        let (start, end) = self.target_protocol_addr_range()?;
        self.read_ipv4(start, end)
    }

    pub fn set_hardware_type(&mut self, htype: u16) {
        let (start, end) = HARDWARE_TYPE_RANGE;
        self.set_arp_data(&htype.to_be_bytes(), start, end);
    }

    pub fn set_protocol_type(&mut self, ptype: u16) {
        let (start, end) = PROTOCOL_TYPE_RANGE;
        self.set_arp_data(&ptype.to_be_bytes(), start, end);
    }

    pub fn set_hardware_addr_len(&mut self, len: u8) {
        self.set_arp_data(&[len], HARDWARE_ADDR_LEN_OFFSET, HARDWARE_ADDR_LEN_OFFSET + 1);
    }

    pub fn set_protocol_addr_len(&mut self, len: u8) {
        self.set_arp_data(&[len], PROTOCOL_ADDR_LEN_OFFSET, PROTOCOL_ADDR_LEN_OFFSET + 1);
    }

    pub fn set_operation(&mut self, op: u16) {
        let (start, end) = OPCODE_RANGE;
        self.set_arp_data(&op.to_be_bytes(), start, end);
    }

    pub fn set_sender_hardware_addr(&mut self, addr: MacAddr) {
        let (start, end) = self
            .sender_hardware_addr_range()
            .expect("sender hardware address field not present");
        self.set_arp_data(&addr.bytes, start, end);
    }

    pub fn set_sender_protocol_addr(&mut self, addr: Ipv4Addr) {
        let (start, end) = self
            .sender_protocol_addr_range()
            .expect("sender protocol address field not present");
        self.set_arp_data(&addr.octets(), start, end);
    }

    pub fn set_target_hardware_addr(&mut self, addr: MacAddr) {
        let (start, end) = self
            .target_hardware_addr_range()
            .expect("target hardware address field not present");
        self.set_arp_data(&addr.bytes, start, end);
    }

    pub fn set_target_protocol_addr(&mut self, addr: Ipv4Addr) {
        let (start, end) = self
            .target_protocol_addr_range()
            .expect("target protocol address field not present");
        self.set_arp_data(&addr.octets(), start, end);
    }

    /// Move ownership of the frame back to the caller.
    pub fn frame(self) -> EthernetFrame {
        self.frame
    }

    /// Read-only view of the carrying Ethernet frame.
    pub fn ethernet(&self) -> &EthernetFrame {
        &self.frame
    }

    // Returns the payload bytes between start and end when they exist.
    fn arp_data(&self, start: usize, end: usize) -> Option<&[u8]> {
        let frame_offset_start = self.frame.payload_offset + start;
        let frame_offset_end = self.frame.payload_offset + end;
        self.frame.data.get(frame_offset_start..frame_offset_end)
    }

    fn set_arp_data(&mut self, bytes: &[u8], start: usize, end: usize) {
        let frame_offset_start = self.frame.payload_offset + start;
        let frame_offset_end = self.frame.payload_offset + end;
        self.frame.data[frame_offset_start..frame_offset_end].copy_from_slice(bytes);
    }

    fn read_u8(&self, offset: usize) -> Option<u8> {
        Some(self.arp_data(offset, offset + 1)?[0])
    }

    fn read_u16(&self, (start, end): (usize, usize)) -> Option<u16> {
        Some(u16::from_be_bytes(
            self.arp_data(start, end)?.try_into().unwrap(),
        ))
    }

    fn read_mac(&self, start: usize, end: usize) -> Option<MacAddr> {
        let bytes: [u8; 6] = self.arp_data(start, end)?.try_into().ok()?;
        Some(MacAddr::new(bytes))
    }

    fn read_ipv4(&self, start: usize, end: usize) -> Option<Ipv4Addr> {
        let bytes: [u8; 4] = self.arp_data(start, end)?.try_into().ok()?;
        Some(Ipv4Addr::from(bytes))
    }

    fn sender_hardware_addr_range(&self) -> Option<(usize, usize)> {
        let hlen = self.hardware_addr_len()? as usize;

        let start = ARP_FIXED_HEADER_LEN;
        let end = start + hlen;
        Some((start, end))
    }

    fn sender_protocol_addr_range(&self) -> Option<(usize, usize)> {
        let hlen = self.hardware_addr_len()? as usize;
        let plen = self.protocol_addr_len()? as usize;

        let start = ARP_FIXED_HEADER_LEN + hlen;
        let end = start + plen;
        Some((start, end))
    }

    fn target_hardware_addr_range(&self) -> Option<(usize, usize)> {
        let hlen = self.hardware_addr_len()? as usize;
        let plen = self.protocol_addr_len()? as usize;

        let start = ARP_FIXED_HEADER_LEN + hlen + plen;
        let end = start + hlen;
        Some((start, end))
    }

    fn target_protocol_addr_range(&self) -> Option<(usize, usize)> {
        let hlen = self.hardware_addr_len()? as usize;
        let plen = self.protocol_addr_len()? as usize;

        let start = ARP_FIXED_HEADER_LEN + 2 * hlen + plen;
        let end = start + plen;
        Some((start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_empty_arp_frame() {
        let arp_frame = ArpFrame::new(6, 4);
        assert_eq!(arp_frame.hardware_type(), Some(0));
        assert_eq!(arp_frame.protocol_type(), Some(0));
        assert_eq!(arp_frame.hardware_addr_len(), Some(6));
        assert_eq!(arp_frame.protocol_addr_len(), Some(4));
        assert_eq!(arp_frame.operation(), Some(0));
        assert_eq!(arp_frame.sender_mac_addr(), Some(MacAddr::new([0; 6])));
        assert_eq!(
            arp_frame.sender_ipv4_addr(),
            Some(Ipv4Addr::new(0, 0, 0, 0))
        );
        assert_eq!(arp_frame.target_mac_addr(), Some(MacAddr::new([0; 6])));
        assert_eq!(
            arp_frame.target_ipv4_addr(),
            Some(Ipv4Addr::new(0, 0, 0, 0))
        );
        assert_eq!(arp_frame.ethernet().ether_type(), ARP_ETHER_TYPE);
    }

    #[test]
    fn arp_frame_from_ethernet() {
        let arp_payload: Vec<u8> = vec![
            0x00, 0x01, 0x08, 0x00, 6, 4, 0x00, 0x01, 1, 2, 3, 4, 5, 6, 10, 0, 0, 1, 10, 9, 8, 7,
            6, 5, 0xff, 0xff, 0xff, 0xff,
        ];
        let mut ethernet_frame = EthernetFrame::empty();
        ethernet_frame.set_payload(&arp_payload);
        ethernet_frame.set_ether_type(ARP_ETHER_TYPE);

        let arp_frame = ArpFrame::decorate(ethernet_frame);
        assert_eq!(arp_frame.hardware_type(), Some(1));
        assert_eq!(arp_frame.protocol_type(), Some(0x0800));
        assert_eq!(arp_frame.hardware_addr_len(), Some(6));
        assert_eq!(arp_frame.protocol_addr_len(), Some(4));
        assert!(arp_frame.is_request());
        assert_eq!(
            arp_frame.sender_mac_addr(),
            Some(MacAddr::new([1, 2, 3, 4, 5, 6]))
        );
        assert_eq!(
            arp_frame.sender_ipv4_addr(),
            Some(Ipv4Addr::new(10, 0, 0, 1))
        );
        assert_eq!(
            arp_frame.target_mac_addr(),
            Some(MacAddr::new([10, 9, 8, 7, 6, 5]))
        );
        assert_eq!(
            arp_frame.target_ipv4_addr(),
            Some(Ipv4Addr::new(255, 255, 255, 255))
        );
    }

    #[test]
    fn short_frame_reads_none() {
        let mut ethernet_frame = EthernetFrame::empty();
        ethernet_frame.set_payload(&[0x00, 0x01, 0x08, 0x00, 6]);
        let arp_frame = ArpFrame::decorate(ethernet_frame);
        assert_eq!(arp_frame.hardware_type(), Some(1));
        assert_eq!(arp_frame.protocol_addr_len(), None);
        assert_eq!(arp_frame.operation(), None);
        assert_eq!(arp_frame.sender_mac_addr(), None);
        assert!(!arp_frame.is_request());
        assert!(!arp_frame.is_reply());
    }

    #[test]
    fn declared_lengths_bound_address_reads() {
        // The header claims 16-byte hardware addresses but the buffer only
        // carries the fixed header, so no address field is readable.
        let mut arp_frame = ArpFrame::new(6, 4);
        arp_frame.set_hardware_addr_len(16);
        assert_eq!(arp_frame.sender_mac_addr(), None);
        assert_eq!(arp_frame.target_ipv4_addr(), None);
    }

    #[test]
    fn set_and_read_back() {
        let mut arp_frame = ArpFrame::new(6, 4);
        arp_frame.set_hardware_type(ArpHardwareType::Ethernet as u16);
        arp_frame.set_protocol_type(0x0800);
        arp_frame.set_operation(ArpOp::Reply as u16);
        arp_frame.set_sender_hardware_addr(MacAddr::new([1, 2, 3, 4, 5, 6]));
        arp_frame.set_sender_protocol_addr(Ipv4Addr::new(192, 168, 0, 1));
        arp_frame.set_target_hardware_addr(MacAddr::new([6, 5, 4, 3, 2, 1]));
        arp_frame.set_target_protocol_addr(Ipv4Addr::new(192, 168, 0, 2));

        assert!(arp_frame.is_reply());
        assert_eq!(
            arp_frame.sender_mac_addr(),
            Some(MacAddr::new([1, 2, 3, 4, 5, 6]))
        );
        assert_eq!(
            arp_frame.sender_ipv4_addr(),
            Some(Ipv4Addr::new(192, 168, 0, 1))
        );
        assert_eq!(
            arp_frame.target_mac_addr(),
            Some(MacAddr::new([6, 5, 4, 3, 2, 1]))
        );
        assert_eq!(
            arp_frame.target_ipv4_addr(),
            Some(Ipv4Addr::new(192, 168, 0, 2))
        );
    }
}
