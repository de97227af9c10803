use crate::error::AidError;
use aidtrail_registry::IdentityRegistry;
use aidtrail_types::{AidUnit, Notification, PartyId, Role};

/// Bind transporter, ground-handler, and recipient to an issued unit.
///
/// Preconditions run in a fixed order and the first failure aborts the whole
/// call: the unit must be issued and unassigned, then each identity must hold
/// the expected role, carry the matching identifier prefix, and be recorded
/// at exactly the provided location. Only after every check passes are the
/// three bindings and the location written, in one step - there is no
/// partial-assignment state.
pub fn assign(
    registry: &IdentityRegistry,
    unit: &mut AidUnit,
    transporter: PartyId,
    ground_handler: PartyId,
    recipient: PartyId,
    location: &str,
) -> Result<Notification, AidError> {
    if transporter.is_zero() || ground_handler.is_zero() || recipient.is_zero() {
        return Err(AidError::InvalidInput(
            "bound identities must be non-zero".to_string(),
        ));
    }
    if location.is_empty() {
        return Err(AidError::InvalidInput(
            "assignment location must be non-empty".to_string(),
        ));
    }

    if !unit.issued {
        return Err(AidError::invalid_state(
            "issued unit",
            format!("unit {} not yet issued", unit.id),
        ));
    }
    if unit.assigned {
        return Err(AidError::invalid_state(
            "unassigned unit",
            format!("unit {} already assigned", unit.id),
        ));
    }

    check_party(registry, transporter, Role::Transporter, location)?;
    check_party(registry, ground_handler, Role::GroundHandler, location)?;
    check_party(registry, recipient, Role::Recipient, location)?;

    unit.transporter = Some(transporter);
    unit.ground_handler = Some(ground_handler);
    unit.recipient = Some(recipient);
    unit.location = Some(location.to_string());
    unit.assigned = true;

    tracing::info!(unit = %unit.id, location, "responsible parties bound to unit");
    Ok(Notification::UnitAssigned {
        unit_id: unit.id,
        transporter,
        ground_handler,
        recipient,
    })
}

fn check_party(
    registry: &IdentityRegistry,
    id: PartyId,
    expected: Role,
    location: &str,
) -> Result<(), AidError> {
    let record = registry.record(&id).ok_or_else(|| {
        AidError::NotFound(format!(
            "{} identity {id} has no registry record",
            expected.name()
        ))
    })?;

    if record.role != expected {
        return Err(AidError::ValidationFailed(format!(
            "identity {id} holds role {}, expected {}",
            record.role.name(),
            expected.name()
        )));
    }
    if !registry.validate_prefix(&id, expected.prefix()) {
        return Err(AidError::ValidationFailed(format!(
            "identifier for {id} does not begin with '{}'",
            expected.prefix()
        )));
    }
    if record.location != location {
        return Err(AidError::ValidationFailed(format!(
            "{} is recorded at '{}', not at assignment location '{location}'",
            expected.name(),
            record.location
        )));
    }

    Ok(())
}
