//! AidTrail core - donation batching, assignment validation, and delivery
//! state enforcement.
//!
//! This crate turns incoming contributions into fixed-size, individually
//! auditable aid units, binds each issued unit to three registry-verified
//! identities, and drives it through a strict one-directional delivery
//! progression gated to those identities. Every state mutation goes through
//! [`AidEngine`] as a single serialized step and lands in a hash-chained
//! audit trail.

#![deny(unsafe_code)]

pub mod assignment;
pub mod audit;
pub mod config;
pub mod delivery;
pub mod donation;
pub mod engine;
pub mod error;

pub use audit::{AuditEntry, AuditTrail};
pub use config::EngineConfig;
pub use donation::{DonationEngine, DonationReceipt, DonationStatistics};
pub use engine::AidEngine;
pub use error::AidError;

pub use aidtrail_registry::{derive_identifier, IdentityRecord, IdentityRegistry, RegistryError};
pub use aidtrail_types::{
    AidUnit, Contribution, DeliveryStatus, Notification, PartyId, Role, UnitId,
};
