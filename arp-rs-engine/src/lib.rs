/// Per-attachment counter blocks. Counters only ever move forward during
/// dispatch; the whole block is read (and optionally zeroed) in one go by
/// the administrative surface.
pub mod stats;

/// Process-wide configuration: the ownership table naming the addresses this
/// host answers for, per-attachment policy bits, and the raw config-payload
/// entry points the administrative surface calls.
pub mod config;

/// Link attachments. Each physical port owns a hardware address, its policy
/// bits, and its counters; the shared service state carries the ownership
/// table and the standby flag.
pub mod attachment;

/// The seams to the surrounding system. Frames arrive tagged with their
/// port (and virtual circuit, on non-broadcast media) and leave through
/// exactly one of the transmit, forward, or trash collaborators.
pub mod link;

/// Shape validation for inbound ARP payloads. Pure checks, no counters.
pub mod validate;

/// The decision engine: classifies one inbound frame as answer, forward,
/// or drop, and drives the buffer to its terminal collaborator.
pub mod dispatch;

/// Reply construction: rewrites an eligible request in place and addresses
/// it back at the requester.
pub mod reply;

/// Debug logging adapters for the terminal collaborators.
pub mod trace;
