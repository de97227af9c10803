use aidtrail_types::PartyId;

/// Engine configuration.
///
/// The administrator is an explicit capability value held here, not an
/// ambient global; it can only be moved by the current holder through
/// `AidEngine::transfer_admin`.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Contribution total that completes and issues a unit.
    pub unit_threshold: u64,
    /// Smallest contribution `accept` will take.
    pub min_contribution: u64,
    /// Upper bound on units one `accept` call may touch.
    pub max_units_per_call: usize,
    /// Initial administrator capability holder.
    pub admin: PartyId,
}

impl EngineConfig {
    pub const DEFAULT_UNIT_THRESHOLD: u64 = 500;
    pub const DEFAULT_MIN_CONTRIBUTION: u64 = 20;
    pub const DEFAULT_MAX_UNITS_PER_CALL: usize = 5;

    pub fn new(admin: PartyId) -> Self {
        Self {
            unit_threshold: Self::DEFAULT_UNIT_THRESHOLD,
            min_contribution: Self::DEFAULT_MIN_CONTRIBUTION,
            max_units_per_call: Self::DEFAULT_MAX_UNITS_PER_CALL,
            admin,
        }
    }
}
