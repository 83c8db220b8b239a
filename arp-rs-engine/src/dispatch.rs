use crate::attachment::{Attachment, ServiceState};
use crate::config::{OwnershipTable, PolicyFlags};
use crate::link::{FrameTransmitter, FrameTrash, HostForward, Tagged, VcHandle, VcTable};
use crate::reply;
use crate::validate::{self, RejectReason};
use arp_rs_packets::{ArpFrame, EthernetFrame, MacAddr, IPV4_ETHER_TYPE};
use std::net::Ipv4Addr;

/// Terminal classification for one inbound frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Answer locally.
    Reply(ReplyPlan),
    /// Hand the unmodified frame to the host application.
    Forward,
    /// Discard and account for it.
    Drop(DropReason),
    /// Discard without touching any further counter. Standby only.
    DropSilent,
}

/// Everything the reply builder needs from the decision pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplyPlan {
    /// Owned address the reply answers from.
    pub from: Ipv4Addr,
    /// Hardware address of the original requester.
    pub requester_hw: MacAddr,
    /// Protocol address of the original requester.
    pub requester_ip: Ipv4Addr,
}

/// Why a frame was discarded. Each reason maps to a fixed set of counter
/// increments in `Dispatcher::dispatch`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropReason {
    /// Failed shape validation.
    StructurallyInvalid,
    /// Not IPv4-over-Ethernet ARP.
    UnsupportedProtocol,
    /// A reply reached the local-answer path; counted, never answered.
    ReplyUnanswered,
    /// An operation other than request or reply on the local-answer path.
    UnsupportedOperation,
    /// Neither sender nor target names an address we own.
    AddressNotOwned,
    /// Our own looped-back request, or a forged broadcast sender.
    SelfOrBroadcastSender,
    /// A recognized request whose target is not the owned address that
    /// matched. Request accounting still applies.
    TargetMismatch,
    /// The forwarding policy lets nothing through for this frame.
    PolicyDisallowed,
}

/// The decision core. Reads the frame and configuration; never touches
/// counters or buffers, so every path can be exercised as a plain function
/// of its inputs.
pub fn decide<V: VcTable>(
    arp: &ArpFrame,
    attachment: &Attachment,
    ownership: &OwnershipTable,
    standby: bool,
    vc: Option<VcHandle>,
    vc_table: &V,
) -> Verdict {
    if !attachment.policy.reply_enabled {
        return forwarding_verdict(arp, &attachment.policy);
    }

    // Responsibility ceded to the peer unit: discard outside accounting.
    if standby {
        return Verdict::DropSilent;
    }

    if let Err(reason) = validate::validate(arp) {
        return Verdict::Drop(match reason {
            RejectReason::UnsupportedProtocol => DropReason::UnsupportedProtocol,
            _ => DropReason::StructurallyInvalid,
        });
    }

    if !arp.is_request() {
        return Verdict::Drop(if arp.is_reply() {
            DropReason::ReplyUnanswered
        } else {
            DropReason::UnsupportedOperation
        });
    }

    // A structurally valid request from here on. The address reads double
    // as a second look at the protocol/length fields.
    let fields = (
        arp.protocol_type(),
        arp.sender_ipv4_addr(),
        arp.target_ipv4_addr(),
        arp.sender_mac_addr(),
    );
    let (sender, target, sender_hw) = match fields {
        (Some(IPV4_ETHER_TYPE), Some(s), Some(t), Some(hw)) => (s, t, hw),
        _ => return Verdict::Drop(DropReason::UnsupportedProtocol),
    };

    // On a circuit whose peer we already know, skip ownership matching and
    // answer as addressed.
    let vc_known = vc.is_some() && vc_table.find_vc_by_ip(sender);
    let matched = if vc_known {
        target
    } else {
        match ownership.match_addresses(sender, target) {
            Some(owned) => owned,
            None => return Verdict::Drop(DropReason::AddressNotOwned),
        }
    };

    // Our own transmitted request looped back.
    if sender_hw == attachment.hw_addr {
        return Verdict::Drop(DropReason::SelfOrBroadcastSender);
    }

    if sender_hw == MacAddr::BROADCAST {
        return Verdict::Drop(DropReason::SelfOrBroadcastSender);
    }

    // An owned address appears in the frame, but the request is not
    // actually addressed to us.
    if target != matched {
        return Verdict::Drop(DropReason::TargetMismatch);
    }

    Verdict::Reply(ReplyPlan {
        from: matched,
        requester_hw: sender_hw,
        requester_ip: sender,
    })
}

// Local replies are disabled: the frame either goes up to the host or is
// dropped, by operation and the forwarding bits alone.
fn forwarding_verdict(arp: &ArpFrame, policy: &PolicyFlags) -> Verdict {
    if !policy.forward_enabled {
        return Verdict::Drop(DropReason::PolicyDisallowed);
    }
    if arp.is_reply() || (arp.is_request() && !policy.forward_replies_only) {
        return Verdict::Forward;
    }
    Verdict::Drop(DropReason::PolicyDisallowed)
}

/// Owns the terminal collaborators and drives one frame from delivery to
/// disposal. Every inbound buffer leaves through exactly one of the three
/// sinks.
pub struct Dispatcher<T, H, D, V> {
    transmitter: T,
    host: H,
    trash: D,
    vc_table: V,
}

impl<T, H, D, V> Dispatcher<T, H, D, V>
where
    T: FrameTransmitter,
    H: HostForward,
    D: FrameTrash,
    V: VcTable,
{
    pub fn new(transmitter: T, host: H, trash: D, vc_table: V) -> Dispatcher<T, H, D, V> {
        Dispatcher {
            transmitter,
            host,
            trash,
            vc_table,
        }
    }

    /// Runs one frame to completion: validate, decide, apply counter
    /// effects, and hand the buffer to its terminal collaborator.
    pub fn dispatch(
        &mut self,
        delivery: Tagged<EthernetFrame>,
        attachment: &mut Attachment,
        service: &ServiceState,
    ) -> Verdict {
        attachment.stats.rx += 1;

        let ownership = service.ownership();
        let arp = ArpFrame::decorate(delivery.packet);
        let verdict = decide(
            &arp,
            attachment,
            &ownership,
            service.standby(),
            delivery.vc,
            &self.vc_table,
        );

        match verdict {
            Verdict::Reply(plan) => {
                attachment.stats.requests_rx += 1;
                reply::answer(arp, attachment, plan, &mut self.transmitter);
            }
            Verdict::Forward => self.host.forward(arp.frame()),
            Verdict::Drop(reason) => {
                match reason {
                    DropReason::ReplyUnanswered => attachment.stats.replies_rx += 1,
                    DropReason::TargetMismatch => attachment.stats.requests_rx += 1,
                    _ => {}
                }
                attachment.stats.dropped += 1;
                self.trash.trash(arp.frame());
            }
            Verdict::DropSilent => self.trash.trash(arp.frame()),
        }

        verdict
    }

    pub fn transmitter(&self) -> &T {
        &self.transmitter
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn trash(&self) -> &D {
        &self.trash
    }
}
