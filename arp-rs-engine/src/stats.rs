/// Counter block for one attachment.
///
/// Counters are monotonic and reset only all together, through an explicit
/// reset-on-read snapshot. Each attachment owns an independent block, so
/// dual-port operation needs no cross-port synchronization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArpStats {
    /// Frames handed to dispatch, counted before any gate.
    pub rx: u64,
    /// Replies transmitted.
    pub tx: u64,
    /// Structurally valid requests recognized on the local-answer path.
    pub requests_rx: u64,
    /// Replies received on the local-answer path; never answered.
    pub replies_rx: u64,
    /// Frames discarded with accounting.
    pub dropped: u64,
}

impl ArpStats {
    pub fn new() -> ArpStats {
        ArpStats::default()
    }

    /// Returns the current counter values. With `reset`, the whole block is
    /// zeroed after the read; counters are never reset individually.
    pub fn snapshot(&mut self, reset: bool) -> ArpStats {
        let values = *self;
        if reset {
            *self = ArpStats::default();
        }
        values
    }
}
