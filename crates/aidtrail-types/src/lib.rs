//! AidTrail Types - shared vocabulary for the aid tracking pipeline.
//!
//! Every identity in the system is addressed by a [`PartyId`]; every batch of
//! aggregated donations is an [`AidUnit`] keyed by a [`UnitId`]. These types
//! carry no behavior beyond construction and rendering - validation and state
//! transitions live in the registry and core crates.

#![deny(unsafe_code)]

use serde::{Deserialize, Serialize};

/// Address-like identity value, 20 bytes, rendered as hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartyId(pub [u8; 20]);

impl PartyId {
    /// The all-zero identity; rejected as input everywhere.
    pub const ZERO: PartyId = PartyId([0u8; 20]);

    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Deterministically derive an identity from a seed string.
    pub fn from_seed(seed: &str) -> Self {
        let digest = blake3::hash(seed.as_bytes());
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest.as_bytes()[..20]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl std::fmt::Display for PartyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl std::fmt::Debug for PartyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PartyId({self})")
    }
}

/// Monotonic aid unit identifier, assigned at creation and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u64);

impl UnitId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registry role tag. `None` models the registry default for identities with
/// no record written; it is never a valid registration input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    None,
    Transporter,
    GroundHandler,
    Recipient,
}

impl Role {
    /// Identifier prefix recorded for this role. Downstream prefix checks
    /// compare against these strings literally.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Transporter => "TRN-",
            Self::GroundHandler => "GND-",
            Self::Recipient => "RCP-",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Transporter => "transporter",
            Self::GroundHandler => "ground_handler",
            Self::Recipient => "recipient",
        }
    }
}

/// Delivery progression for an issued unit.
///
/// `Pending` is the explicit not-yet-initialized sentinel: an issued unit
/// stays `Pending` until `initialize` stamps it `Issued` or the bound
/// transporter moves it straight to `InTransit`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    #[default]
    Pending,
    Issued,
    InTransit,
    Delivered,
    Claimed,
}

impl DeliveryStatus {
    pub fn name(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Issued => "issued",
            Self::InTransit => "in_transit",
            Self::Delivered => "delivered",
            Self::Claimed => "claimed",
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One recorded slice of a donation inside a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub donor: PartyId,
    pub amount: u64,
}

/// An accounting record for one threshold's worth of aggregated donations.
///
/// Units are created by the donation engine, bound to responsible parties by
/// assignment, and then driven through [`DeliveryStatus`] by those parties.
/// Completed units are never destroyed; they remain as permanent history.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AidUnit {
    pub id: UnitId,
    pub contributions: Vec<Contribution>,
    pub total: u64,
    pub issued: bool,
    pub assigned: bool,
    pub transporter: Option<PartyId>,
    pub ground_handler: Option<PartyId>,
    pub recipient: Option<PartyId>,
    pub location: Option<String>,
    pub status: DeliveryStatus,
}

impl AidUnit {
    pub fn new(id: UnitId) -> Self {
        Self {
            id,
            contributions: Vec::new(),
            total: 0,
            issued: false,
            assigned: false,
            transporter: None,
            ground_handler: None,
            recipient: None,
            location: None,
            status: DeliveryStatus::Pending,
        }
    }

    /// Donors in first-contribution order, de-duplicated.
    pub fn donors(&self) -> Vec<PartyId> {
        let mut donors: Vec<PartyId> = Vec::new();
        for contribution in &self.contributions {
            if !donors.contains(&contribution.donor) {
                donors.push(contribution.donor);
            }
        }
        donors
    }

    pub fn space_left(&self, threshold: u64) -> u64 {
        threshold.saturating_sub(self.total)
    }
}

/// Notification emitted for external observers and indexers.
///
/// Each variant carries enough data to reconstruct unit history without
/// re-querying state. Notifications are not consumed internally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Notification {
    Donation {
        donor: PartyId,
        amount: u64,
        unit_id: UnitId,
    },
    UnitIssued {
        unit_id: UnitId,
        donors: Vec<PartyId>,
    },
    UnitAssigned {
        unit_id: UnitId,
        transporter: PartyId,
        ground_handler: PartyId,
        recipient: PartyId,
    },
    StatusChanged {
        unit_id: UnitId,
        actor: PartyId,
        new_status: DeliveryStatus,
    },
    StatusInitialized {
        unit_id: UnitId,
    },
    AdminTransferred {
        previous: PartyId,
        next: PartyId,
    },
}
