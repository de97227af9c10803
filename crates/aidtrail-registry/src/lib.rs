//! AidTrail Registry - identity records for the aid pipeline.
//!
//! The registry is the single source of truth for who may transport, handle,
//! and receive aid units. Records are immutable once written: there is no
//! update or removal path, so a verified identity cannot be silently
//! repurposed. Enumeration goes through append-only per-role rosters;
//! identity checks always go through the keyed map.

#![deny(unsafe_code)]

use aidtrail_types::{PartyId, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Derive the identifier string recorded for an identity.
///
/// Pure function of the prefix and the identity bytes; prefix checks
/// downstream compare against the result with literal `starts_with`.
pub fn derive_identifier(prefix: &str, id: &PartyId) -> String {
    format!("{prefix}{}", hex::encode(id.as_bytes()))
}

/// A registered identity. Immutable once written.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub id: PartyId,
    pub identifier: String,
    pub role: Role,
    pub location: String,
    pub registered_at: DateTime<Utc>,
}

/// Registry-level errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid registration input: {0}")]
    InvalidInput(String),

    #[error("identity {0} already has a record")]
    AlreadyRegistered(PartyId),

    #[error("derived identifier '{0}' collides with an existing record")]
    IdentifierCollision(String),
}

/// Keyed identity records plus per-role enumeration rosters.
#[derive(Debug, Default, Clone)]
pub struct IdentityRegistry {
    records: HashMap<PartyId, IdentityRecord>,
    identifiers: HashSet<String>,
    transporters: Vec<PartyId>,
    ground_handlers: Vec<PartyId>,
    recipients: Vec<PartyId>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a new identity record.
    ///
    /// Fails if the identity already has a record or the derived identifier
    /// collides with one already written. The caller is responsible for
    /// administrator gating; the registry itself only enforces record
    /// integrity.
    pub fn register(
        &mut self,
        id: PartyId,
        role: Role,
        location: impl Into<String>,
    ) -> Result<IdentityRecord, RegistryError> {
        if id.is_zero() {
            return Err(RegistryError::InvalidInput(
                "identity must be non-zero".to_string(),
            ));
        }
        if role == Role::None {
            return Err(RegistryError::InvalidInput(
                "role tag 'none' cannot be registered".to_string(),
            ));
        }
        let location = location.into();
        if location.is_empty() {
            return Err(RegistryError::InvalidInput(
                "location must be non-empty".to_string(),
            ));
        }
        if self.records.contains_key(&id) {
            return Err(RegistryError::AlreadyRegistered(id));
        }

        let identifier = derive_identifier(role.prefix(), &id);
        if self.identifiers.contains(&identifier) {
            return Err(RegistryError::IdentifierCollision(identifier));
        }

        let record = IdentityRecord {
            id,
            identifier: identifier.clone(),
            role,
            location,
            registered_at: Utc::now(),
        };

        self.identifiers.insert(identifier);
        self.roster_mut(role).push(id);
        self.records.insert(id, record.clone());

        tracing::debug!(identity = %id, role = role.name(), "identity registered");
        Ok(record)
    }

    pub fn record(&self, id: &PartyId) -> Option<&IdentityRecord> {
        self.records.get(id)
    }

    /// Recorded role, or `Role::None` when no record exists.
    pub fn role_of(&self, id: &PartyId) -> Role {
        self.records.get(id).map(|r| r.role).unwrap_or_default()
    }

    pub fn location_of(&self, id: &PartyId) -> Option<&str> {
        self.records.get(id).map(|r| r.location.as_str())
    }

    /// True iff the recorded identifier for `id` begins with
    /// `expected_prefix`. Unregistered identities never validate.
    pub fn validate_prefix(&self, id: &PartyId, expected_prefix: &str) -> bool {
        self.records
            .get(id)
            .map(|r| r.identifier.starts_with(expected_prefix))
            .unwrap_or(false)
    }

    /// Insertion-ordered roster for a role. Enumeration and reporting only.
    pub fn list_by_role(&self, role: Role) -> &[PartyId] {
        match role {
            Role::Transporter => &self.transporters,
            Role::GroundHandler => &self.ground_handlers,
            Role::Recipient => &self.recipients,
            Role::None => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn roster_mut(&mut self, role: Role) -> &mut Vec<PartyId> {
        match role {
            Role::Transporter => &mut self.transporters,
            Role::GroundHandler => &mut self.ground_handlers,
            Role::Recipient => &mut self.recipients,
            // register() rejects Role::None before reaching the roster.
            Role::None => unreachable!("no roster for the none role"),
        }
    }
}
