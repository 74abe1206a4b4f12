//! Bus topic layout: `party/<house_id>/<node_id>/<suffix>`.
//!
//! Built once at startup from config — topic strings never allocate after
//! construction.

/// Longest topic we ever build (`party/` + 16 + 16 + suffix).
pub type Topic = heapless::String<64>;

/// Topic factory bound to one node identity.
pub struct Topics {
    base: heapless::String<48>,
}

impl Topics {
    pub fn new(house_id: &str, node_id: &str) -> Self {
        let mut base = heapless::String::new();
        base.push_str("party/").ok();
        base.push_str(house_id).ok();
        base.push('/').ok();
        base.push_str(node_id).ok();
        Self { base }
    }

    fn join(&self, suffix: &str) -> Topic {
        let mut t = Topic::new();
        t.push_str(&self.base).ok();
        t.push_str(suffix).ok();
        t
    }

    /// Smoothed audio features, ~10 Hz.
    pub fn audio_features(&self) -> Topic {
        self.join("/audio/features")
    }

    /// Occupancy status.
    pub fn occupancy(&self) -> Topic {
        self.join("/occupancy/state")
    }

    /// Inbound legacy ring command (subscribe).
    pub fn ring_cmd(&self) -> Topic {
        self.join("/ring/cmd")
    }

    /// Full ring state snapshot, 5 Hz.
    pub fn ring_state(&self) -> Topic {
        self.join("/ring/state")
    }

    /// Liveness heartbeat, 0.2 Hz.
    pub fn heartbeat(&self) -> Topic {
        self.join("/sys/heartbeat")
    }

    /// Coalesced encoder position/delta.
    pub fn encoder(&self) -> Topic {
        self.join("/input/encoder")
    }

    /// Debounced button edges.
    pub fn button(&self) -> Topic {
        self.join("/input/button")
    }
}
