use crate::attachment::Attachment;
use crate::dispatch::ReplyPlan;
use crate::link::FrameTransmitter;
use crate::validate::ARP_IPV4_PAYLOAD_LEN;
use arp_rs_packets::{ArpFrame, ArpOp, EthernetFrame, MacAddr, IPV4_ETHER_TYPE};

/// Rewrites an eligible request in place and hands the buffer to the
/// transmitter, addressed back at the requester. Trusts that dispatch
/// already proved the frame eligible; no re-validation here.
pub fn answer<T: FrameTransmitter>(
    arp: ArpFrame,
    attachment: &mut Attachment,
    plan: ReplyPlan,
    transmitter: &mut T,
) {
    let frame = build_reply(arp, attachment.hw_addr, plan);
    attachment.stats.tx += 1;
    transmitter.transmit(frame);
}

/// The in-place field swap: the request becomes its own reply. The target
/// takes the requester's addresses, the sender becomes us, and the Ethernet
/// header is reversed to carry the frame straight back.
pub fn build_reply(mut arp: ArpFrame, hw_addr: MacAddr, plan: ReplyPlan) -> EthernetFrame {
    arp.set_target_hardware_addr(plan.requester_hw);
    arp.set_sender_hardware_addr(hw_addr);
    arp.set_target_protocol_addr(plan.requester_ip);
    arp.set_sender_protocol_addr(plan.from);
    arp.set_operation(ArpOp::Reply as u16);
    arp.set_protocol_type(IPV4_ETHER_TYPE);

    let mut frame = arp.frame();
    frame.set_dest_mac(plan.requester_hw);
    frame.set_src_mac(hw_addr);
    // Padding from the inbound frame is not retransmitted.
    frame.truncate_payload(ARP_IPV4_PAYLOAD_LEN);
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use arp_rs_packets::ArpHardwareType;
    use std::net::Ipv4Addr;

    const OUR_MAC: MacAddr = MacAddr {
        bytes: [0x02, 0x00, 0x00, 0x00, 0x00, 0x01],
    };

    fn eligible_request() -> (ArpFrame, ReplyPlan) {
        let requester_hw = MacAddr::new([1, 2, 3, 4, 5, 6]);
        let requester_ip = Ipv4Addr::new(10, 0, 0, 9);
        let owned = Ipv4Addr::new(10, 0, 0, 1);

        let mut arp = ArpFrame::new(6, 4);
        arp.set_hardware_type(ArpHardwareType::Ethernet as u16);
        arp.set_protocol_type(IPV4_ETHER_TYPE);
        arp.set_operation(ArpOp::Request as u16);
        arp.set_sender_hardware_addr(requester_hw);
        arp.set_sender_protocol_addr(requester_ip);
        arp.set_target_protocol_addr(owned);

        let plan = ReplyPlan {
            from: owned,
            requester_hw,
            requester_ip,
        };
        (arp, plan)
    }

    #[test]
    fn reply_swaps_addresses() {
        let (arp, plan) = eligible_request();
        let frame = build_reply(arp, OUR_MAC, plan);

        let reply = ArpFrame::decorate(frame);
        assert!(reply.is_reply());
        assert_eq!(reply.protocol_type(), Some(IPV4_ETHER_TYPE));
        assert_eq!(reply.sender_mac_addr(), Some(OUR_MAC));
        assert_eq!(reply.sender_ipv4_addr(), Some(plan.from));
        assert_eq!(reply.target_mac_addr(), Some(plan.requester_hw));
        assert_eq!(reply.target_ipv4_addr(), Some(plan.requester_ip));
    }

    #[test]
    fn reply_reverses_ethernet_header() {
        let (arp, plan) = eligible_request();
        let frame = build_reply(arp, OUR_MAC, plan);
        assert_eq!(frame.dest_mac(), plan.requester_hw);
        assert_eq!(frame.src_mac(), OUR_MAC);
    }

    #[test]
    fn reply_length_is_recomputed() {
        let (arp, plan) = eligible_request();
        let mut padded = arp.frame();
        let mut payload = padded.payload().to_vec();
        payload.resize(46, 0);
        padded.set_payload(&payload);

        let frame = build_reply(ArpFrame::decorate(padded), OUR_MAC, plan);
        assert_eq!(frame.payload_len(), ARP_IPV4_PAYLOAD_LEN);
    }

    // Rebuilding a request from the reply by swapping the fields back
    // reproduces the original request's address fields.
    #[test]
    fn round_trip_restores_request_fields() {
        let (arp, plan) = eligible_request();
        let original = ArpFrame::decorate(arp.ethernet().clone());

        let reply = ArpFrame::decorate(build_reply(arp, OUR_MAC, plan));
        let mut restored = ArpFrame::new(6, 4);
        restored.set_hardware_type(ArpHardwareType::Ethernet as u16);
        restored.set_protocol_type(IPV4_ETHER_TYPE);
        restored.set_operation(ArpOp::Request as u16);
        restored.set_sender_hardware_addr(reply.target_mac_addr().unwrap());
        restored.set_sender_protocol_addr(reply.target_ipv4_addr().unwrap());
        restored.set_target_protocol_addr(reply.sender_ipv4_addr().unwrap());

        assert_eq!(restored.sender_mac_addr(), original.sender_mac_addr());
        assert_eq!(restored.sender_ipv4_addr(), original.sender_ipv4_addr());
        assert_eq!(restored.target_ipv4_addr(), original.target_ipv4_addr());
    }
}
