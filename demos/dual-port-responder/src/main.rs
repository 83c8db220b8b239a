use arp_rs_engine::attachment::{Attachment, Port, ServiceState};
use arp_rs_engine::config::{OwnershipTable, FORWARD_CFG_ENABLED, SERVICE_CFG_REPLIES};
use arp_rs_engine::dispatch::Dispatcher;
use arp_rs_engine::link::{CountingTrash, FrameQueue, NoCircuits, Tagged};
use arp_rs_engine::trace::LogSink;
use arp_rs_packets::{ArpFrame, ArpHardwareType, ArpOp, EthernetFrame, MacAddr, IPV4_ETHER_TYPE};
use clap::{App, Arg};
use crossbeam::channel;
use std::net::Ipv4Addr;
use std::thread;

const EMAC0_MAC: MacAddr = MacAddr {
    bytes: [0x02, 0x00, 0x00, 0x00, 0x00, 0x01],
};
const EMAC1_MAC: MacAddr = MacAddr {
    bytes: [0x02, 0x00, 0x00, 0x00, 0x00, 0x02],
};

fn main() {
    // Collect arguments from user
    let matches = App::new("Dual Port Responder")
        .version("0.1")
        .author("Arp-rs Contributors")
        .about("Answer synthetic ARP traffic on two ports with the arp-rs library")
        .arg(
            Arg::with_name("address")
                .short("a")
                .long("address")
                .value_name("IPV4")
                .help("IPv4 address to answer for; repeat for a proxy list")
                .required(true)
                .multiple(true)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("count")
                .short("c")
                .long("count")
                .value_name("N")
                .help("Synthetic frames to generate per port")
                .default_value("10")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("forward_port1")
                .short("f")
                .long("forward-port1")
                .help("Port 1 forwards ARP frames to the host instead of answering"),
        )
        .get_matches();

    let addresses: Vec<Ipv4Addr> = matches
        .values_of("address")
        .unwrap()
        .map(|value| value.parse().expect("address must be a dotted IPv4 quad"))
        .collect();
    let count: usize = matches
        .value_of("count")
        .unwrap()
        .parse()
        .expect("count must be a number");

    let service = ServiceState::new();
    let mut table = OwnershipTable::new();
    if let [single] = addresses.as_slice() {
        table.set_address(*single).expect("address must be non-zero");
    } else {
        let mut payload = Vec::new();
        for address in &addresses {
            payload.extend_from_slice(&address.octets());
        }
        table
            .set_address_list(&payload)
            .expect("address list must fit the table");
    }
    service.set_ownership(table);

    let mut emac0 = Attachment::new(Port::Emac0, EMAC0_MAC);
    emac0
        .policy
        .apply_service_config(&SERVICE_CFG_REPLIES.to_le_bytes())
        .unwrap();

    let mut emac1 = Attachment::new(Port::Emac1, EMAC1_MAC);
    if matches.is_present("forward_port1") {
        emac1
            .policy
            .apply_forwarding_config(&FORWARD_CFG_ENABLED.to_le_bytes())
            .unwrap();
    } else {
        emac1
            .policy
            .apply_service_config(&SERVICE_CFG_REPLIES.to_le_bytes())
            .unwrap();
    }

    let mut dispatcher = Dispatcher::new(
        LogSink::new(FrameQueue::default(), std::io::stdout()),
        LogSink::new(FrameQueue::default(), std::io::stdout()),
        CountingTrash::default(),
        NoCircuits,
    );

    // One feed per port, standing in for the link-layer receive queues.
    let primary = addresses[0];
    let (sender0, feed0) = channel::unbounded();
    let (sender1, feed1) = channel::unbounded();
    let producer0 = thread::spawn(move || synthetic_traffic(Port::Emac0, primary, EMAC0_MAC, count, sender0));
    let producer1 = thread::spawn(move || synthetic_traffic(Port::Emac1, primary, EMAC1_MAC, count, sender1));

    for delivery in feed0.iter() {
        dispatcher.dispatch(delivery, &mut emac0, &service);
    }
    for delivery in feed1.iter() {
        dispatcher.dispatch(delivery, &mut emac1, &service);
    }
    producer0.join().unwrap();
    producer1.join().unwrap();

    println!("replies sent: {}", dispatcher.transmitter().inner().frames.len());
    println!("forwarded to host: {}", dispatcher.host().inner().frames.len());
    println!("trashed: {}", dispatcher.trash().trashed);
    println!("port 0 counters: {:?}", emac0.stats.snapshot(true));
    println!("port 1 counters: {:?}", emac1.stats.snapshot(true));

    println!("The world has been resolved");
}

/// Feeds a port a mix of answerable requests, requests for strangers, our
/// own looped-back request, a forged broadcast sender, and a stray reply.
fn synthetic_traffic(
    port: Port,
    ours: Ipv4Addr,
    our_mac: MacAddr,
    count: usize,
    feed: channel::Sender<Tagged<EthernetFrame>>,
) {
    for i in 0..count {
        let neighbor_mac = MacAddr::new([0xaa, 0xbb, 0xcc, 0x00, 0x00, i as u8]);
        let neighbor_ip = Ipv4Addr::new(10, 0, 0, 100 + (i % 100) as u8);

        let mut arp = ArpFrame::new(6, 4);
        arp.set_hardware_type(ArpHardwareType::Ethernet as u16);
        arp.set_protocol_type(IPV4_ETHER_TYPE);
        arp.set_operation(ArpOp::Request as u16);
        arp.set_sender_hardware_addr(neighbor_mac);
        arp.set_sender_protocol_addr(neighbor_ip);
        arp.set_target_hardware_addr(MacAddr::new([0; 6]));
        arp.set_target_protocol_addr(ours);

        match i % 5 {
            0 => {}
            1 => arp.set_target_protocol_addr(Ipv4Addr::new(172, 16, 0, 1)),
            2 => arp.set_sender_hardware_addr(our_mac),
            3 => arp.set_sender_hardware_addr(MacAddr::BROADCAST),
            _ => arp.set_operation(ArpOp::Reply as u16),
        }

        feed.send(Tagged::broadcast_medium(arp.frame(), port)).unwrap();
    }
}
