use crate::audit::AuditTrail;
use crate::config::EngineConfig;
use crate::donation::{DonationEngine, DonationReceipt, DonationStatistics};
use crate::error::AidError;
use crate::{assignment, delivery};
use aidtrail_registry::{IdentityRecord, IdentityRegistry};
use aidtrail_types::{AidUnit, DeliveryStatus, Notification, PartyId, Role, UnitId};

/// Single entrypoint over the aid pipeline.
///
/// Owns the identity registry, the donation engine, the audit trail, and the
/// administrator capability. Every operation executes as one serialized step
/// against `&mut self`: a call either fully commits (and appends its
/// notifications to the audit trail) or returns an error having changed
/// nothing. Callers are identified explicitly by `PartyId` parameters.
pub struct AidEngine {
    config: EngineConfig,
    admin: PartyId,
    registry: IdentityRegistry,
    donations: DonationEngine,
    audit: AuditTrail,
}

impl AidEngine {
    pub fn new(config: EngineConfig) -> Result<Self, AidError> {
        if config.admin.is_zero() {
            return Err(AidError::InvalidInput(
                "administrator must be non-zero".to_string(),
            ));
        }
        if config.unit_threshold == 0 {
            return Err(AidError::InvalidInput(
                "unit threshold must be positive".to_string(),
            ));
        }
        if config.min_contribution == 0 || config.min_contribution > config.unit_threshold {
            return Err(AidError::InvalidInput(
                "minimum contribution must be positive and within the threshold".to_string(),
            ));
        }
        if config.max_units_per_call == 0 {
            return Err(AidError::InvalidInput(
                "per-call unit cap must be positive".to_string(),
            ));
        }

        Ok(Self {
            admin: config.admin,
            donations: DonationEngine::new(&config),
            registry: IdentityRegistry::new(),
            audit: AuditTrail::new(),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current administrator capability holder.
    pub fn admin(&self) -> PartyId {
        self.admin
    }

    /// Move the administrator capability. Only the current holder may call.
    pub fn transfer_admin(&mut self, caller: PartyId, new_admin: PartyId) -> Result<(), AidError> {
        self.ensure_admin(caller)?;
        if new_admin.is_zero() {
            return Err(AidError::InvalidInput(
                "new administrator must be non-zero".to_string(),
            ));
        }

        let previous = self.admin;
        self.admin = new_admin;
        self.audit.append(Notification::AdminTransferred {
            previous,
            next: new_admin,
        });
        tracing::info!(previous = %previous, next = %new_admin, "administrator capability transferred");
        Ok(())
    }

    /// Register a verified identity. Administrator only.
    pub fn register_identity(
        &mut self,
        caller: PartyId,
        id: PartyId,
        role: Role,
        location: impl Into<String>,
    ) -> Result<IdentityRecord, AidError> {
        self.ensure_admin(caller)?;
        Ok(self.registry.register(id, role, location)?)
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    /// Accept a donor contribution, filling and issuing units as it lands.
    pub fn accept(&mut self, donor: PartyId, amount: u64) -> Result<DonationReceipt, AidError> {
        let (receipt, notifications) = self.donations.accept(donor, amount)?;
        for notification in notifications {
            self.audit.append(notification);
        }
        Ok(receipt)
    }

    /// Bind transporter, ground-handler, and recipient to an issued unit.
    /// Administrator only; all three bindings and the location land together
    /// or not at all.
    pub fn assign(
        &mut self,
        caller: PartyId,
        unit_id: UnitId,
        transporter: PartyId,
        ground_handler: PartyId,
        recipient: PartyId,
        location: &str,
    ) -> Result<(), AidError> {
        self.ensure_admin(caller)?;
        let registry = &self.registry;
        let unit = self
            .donations
            .unit_mut(unit_id)
            .ok_or_else(|| AidError::NotFound(format!("unit {unit_id} does not exist")))?;

        let notification = assignment::assign(
            registry,
            unit,
            transporter,
            ground_handler,
            recipient,
            location,
        )?;
        self.audit.append(notification);
        Ok(())
    }

    /// Explicitly stamp an issued unit's starting status. Any caller.
    pub fn initialize(&mut self, unit_id: UnitId) -> Result<(), AidError> {
        self.transition(unit_id, delivery::initialize)
    }

    pub fn mark_in_transit(&mut self, caller: PartyId, unit_id: UnitId) -> Result<(), AidError> {
        self.transition(unit_id, |unit| delivery::mark_in_transit(unit, caller))
    }

    pub fn mark_delivered(&mut self, caller: PartyId, unit_id: UnitId) -> Result<(), AidError> {
        self.transition(unit_id, |unit| delivery::mark_delivered(unit, caller))
    }

    pub fn claim(&mut self, caller: PartyId, unit_id: UnitId) -> Result<(), AidError> {
        self.transition(unit_id, |unit| delivery::claim(unit, caller))
    }

    /// Current delivery status; `None` for unrecognized ids.
    pub fn status_of(&self, unit_id: UnitId) -> Option<DeliveryStatus> {
        self.donations.unit(unit_id).map(|unit| unit.status)
    }

    /// Batch read; entries are independent, unrecognized ids yield `None`.
    pub fn status_batch(&self, unit_ids: &[UnitId]) -> Vec<Option<DeliveryStatus>> {
        unit_ids.iter().map(|id| self.status_of(*id)).collect()
    }

    pub fn unit(&self, unit_id: UnitId) -> Option<&AidUnit> {
        self.donations.unit(unit_id)
    }

    pub fn units(&self) -> &[AidUnit] {
        self.donations.units()
    }

    pub fn donor_balance(&self, donor: &PartyId) -> u64 {
        self.donations.donor_balance(donor)
    }

    pub fn statistics(&self) -> DonationStatistics {
        self.donations.statistics()
    }

    pub fn audit(&self) -> &AuditTrail {
        &self.audit
    }

    fn transition(
        &mut self,
        unit_id: UnitId,
        apply: impl FnOnce(&mut AidUnit) -> Result<Notification, AidError>,
    ) -> Result<(), AidError> {
        let unit = self
            .donations
            .unit_mut(unit_id)
            .ok_or_else(|| AidError::NotFound(format!("unit {unit_id} does not exist")))?;
        let notification = apply(unit)?;
        self.audit.append(notification);
        Ok(())
    }

    fn ensure_admin(&self, caller: PartyId) -> Result<(), AidError> {
        if caller != self.admin {
            return Err(AidError::AccessDenied(format!(
                "caller {caller} does not hold the administrator capability"
            )));
        }
        Ok(())
    }
}
