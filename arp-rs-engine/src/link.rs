use crate::attachment::Port;
use arp_rs_packets::{EthernetFrame, Packet};
use std::net::Ipv4Addr;

/// Opaque tag for the virtual circuit a frame arrived on, for non-broadcast
/// media such as ATM. Meaningful only to the link layer that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VcHandle(pub u32);

/// A packet as delivered by the link layer: the buffer, the port it arrived
/// on, and the originating virtual circuit when the medium has one.
#[derive(Clone, Debug)]
pub struct Tagged<P: Packet> {
    pub packet: P,
    pub port: Port,
    pub vc: Option<VcHandle>,
}

impl<P: Packet> Tagged<P> {
    pub fn broadcast_medium(packet: P, port: Port) -> Tagged<P> {
        Tagged {
            packet,
            port,
            vc: None,
        }
    }
}

/// Hands a rewritten reply to the link-layer transmit queue. The buffer is
/// already addressed at the requester and its byte length recomputed.
pub trait FrameTransmitter {
    fn transmit(&mut self, frame: EthernetFrame);
}

/// Hands an unmodified frame up to the special-packet delivery path.
pub trait HostForward {
    fn forward(&mut self, frame: EthernetFrame);
}

/// Releases a buffer back to the pool. No further data is read from it.
pub trait FrameTrash {
    fn trash(&mut self, frame: EthernetFrame);
}

/// Address-resolution table for virtual-circuit media. Queried, never
/// maintained, by dispatch.
pub trait VcTable {
    fn find_vc_by_ip(&self, ip: Ipv4Addr) -> bool;
}

/// A table that knows no circuits; the fit for broadcast-only builds.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCircuits;

impl VcTable for NoCircuits {
    fn find_vc_by_ip(&self, _ip: Ipv4Addr) -> bool {
        false
    }
}

/// In-memory sink collecting frames, for tests and demos.
#[derive(Debug, Default)]
pub struct FrameQueue {
    pub frames: Vec<EthernetFrame>,
}

impl FrameTransmitter for FrameQueue {
    fn transmit(&mut self, frame: EthernetFrame) {
        self.frames.push(frame);
    }
}

impl HostForward for FrameQueue {
    fn forward(&mut self, frame: EthernetFrame) {
        self.frames.push(frame);
    }
}

impl FrameTrash for FrameQueue {
    fn trash(&mut self, frame: EthernetFrame) {
        self.frames.push(frame);
    }
}

/// Trash that releases buffers by dropping them and keeps a count.
#[derive(Debug, Default)]
pub struct CountingTrash {
    pub trashed: usize,
}

impl FrameTrash for CountingTrash {
    fn trash(&mut self, frame: EthernetFrame) {
        drop(frame);
        self.trashed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_queue_collects_in_order() {
        let mut queue = FrameQueue::default();
        let mut first = EthernetFrame::empty();
        first.set_ether_type(0x0806);
        queue.transmit(first);
        queue.trash(EthernetFrame::empty());
        assert_eq!(queue.frames.len(), 2);
        assert_eq!(queue.frames[0].ether_type(), 0x0806);
    }

    #[test]
    fn counting_trash_counts() {
        let mut trash = CountingTrash::default();
        trash.trash(EthernetFrame::empty());
        trash.trash(EthernetFrame::empty());
        assert_eq!(trash.trashed, 2);
    }

    #[test]
    fn no_circuits_never_resolves() {
        assert!(!NoCircuits.find_vc_by_ip(Ipv4Addr::new(10, 0, 0, 1)));
    }
}
