//! Strict one-directional delivery progression.
//!
//! Each transition names the status it expects and the bound identity that
//! may take it; a failed gate leaves the unit untouched and reports the
//! specific violated condition. An issued unit that was never explicitly
//! initialized still gates like `Issued` - `Pending` exists to make the
//! starting state observable, not to block the transporter.

use crate::error::AidError;
use aidtrail_types::{AidUnit, DeliveryStatus, Notification, PartyId, Role};

/// Explicitly stamp an issued unit with its starting status.
///
/// Callable by anyone; exists so the start of delivery is observable and
/// auditable. Fails once the unit has left `Pending`.
pub fn initialize(unit: &mut AidUnit) -> Result<Notification, AidError> {
    if !unit.issued {
        return Err(AidError::invalid_state(
            "issued unit",
            format!("unit {} not yet issued", unit.id),
        ));
    }
    if unit.status != DeliveryStatus::Pending {
        return Err(AidError::wrong_status(DeliveryStatus::Pending, unit.status));
    }

    unit.status = DeliveryStatus::Issued;
    tracing::info!(unit = %unit.id, "delivery status initialized");
    Ok(Notification::StatusInitialized { unit_id: unit.id })
}

/// Bound transporter takes custody.
pub fn mark_in_transit(unit: &mut AidUnit, caller: PartyId) -> Result<Notification, AidError> {
    advance(
        unit,
        caller,
        Role::Transporter,
        DeliveryStatus::Issued,
        DeliveryStatus::InTransit,
    )
}

/// Bound ground-handler confirms arrival.
pub fn mark_delivered(unit: &mut AidUnit, caller: PartyId) -> Result<Notification, AidError> {
    advance(
        unit,
        caller,
        Role::GroundHandler,
        DeliveryStatus::InTransit,
        DeliveryStatus::Delivered,
    )
}

/// Bound recipient confirms receipt.
pub fn claim(unit: &mut AidUnit, caller: PartyId) -> Result<Notification, AidError> {
    advance(
        unit,
        caller,
        Role::Recipient,
        DeliveryStatus::Delivered,
        DeliveryStatus::Claimed,
    )
}

/// `Pending` on an issued unit gates like `Issued`.
fn gate_status(status: DeliveryStatus) -> DeliveryStatus {
    match status {
        DeliveryStatus::Pending => DeliveryStatus::Issued,
        other => other,
    }
}

fn advance(
    unit: &mut AidUnit,
    caller: PartyId,
    gate: Role,
    expected: DeliveryStatus,
    next: DeliveryStatus,
) -> Result<Notification, AidError> {
    if !unit.issued {
        return Err(AidError::invalid_state(
            "issued unit",
            format!("unit {} not yet issued", unit.id),
        ));
    }
    if !unit.assigned {
        return Err(AidError::invalid_state(
            "assigned unit",
            format!("unit {} has no bound parties", unit.id),
        ));
    }
    if gate_status(unit.status) != expected {
        return Err(AidError::wrong_status(expected, unit.status));
    }

    let bound = match gate {
        Role::Transporter => unit.transporter,
        Role::GroundHandler => unit.ground_handler,
        Role::Recipient => unit.recipient,
        Role::None => None,
    };
    let required = bound.ok_or_else(|| {
        AidError::invalid_state(
            "assigned unit",
            format!("unit {} missing its {} binding", unit.id, gate.name()),
        )
    })?;
    if caller != required {
        return Err(AidError::AccessDenied(format!(
            "caller {caller} is not the bound {} for unit {}",
            gate.name(),
            unit.id
        )));
    }

    unit.status = next;
    tracing::info!(unit = %unit.id, status = next.name(), actor = %caller, "delivery status advanced");
    Ok(Notification::StatusChanged {
        unit_id: unit.id,
        actor: caller,
        new_status: next,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aidtrail_types::UnitId;
    use proptest::prelude::*;

    fn transporter() -> PartyId {
        PartyId::from_seed("carrier-1")
    }

    fn handler() -> PartyId {
        PartyId::from_seed("handler-1")
    }

    fn recipient() -> PartyId {
        PartyId::from_seed("family-1")
    }

    fn bound_unit() -> AidUnit {
        let mut unit = AidUnit::new(UnitId::new(0));
        unit.total = 500;
        unit.issued = true;
        unit.assigned = true;
        unit.transporter = Some(transporter());
        unit.ground_handler = Some(handler());
        unit.recipient = Some(recipient());
        unit.location = Some("goma".to_string());
        unit
    }

    #[test]
    fn full_progression_with_bound_callers() {
        let mut unit = bound_unit();

        initialize(&mut unit).unwrap();
        assert_eq!(unit.status, DeliveryStatus::Issued);

        mark_in_transit(&mut unit, transporter()).unwrap();
        assert_eq!(unit.status, DeliveryStatus::InTransit);

        mark_delivered(&mut unit, handler()).unwrap();
        assert_eq!(unit.status, DeliveryStatus::Delivered);

        let note = claim(&mut unit, recipient()).unwrap();
        assert_eq!(unit.status, DeliveryStatus::Claimed);
        assert!(matches!(
            note,
            Notification::StatusChanged {
                new_status: DeliveryStatus::Claimed,
                ..
            }
        ));
    }

    #[test]
    fn transporter_may_start_without_explicit_initialize() {
        let mut unit = bound_unit();
        assert_eq!(unit.status, DeliveryStatus::Pending);

        mark_in_transit(&mut unit, transporter()).unwrap();
        assert_eq!(unit.status, DeliveryStatus::InTransit);

        // Too late to initialize once the unit has moved.
        let err = initialize(&mut unit).unwrap_err();
        assert!(matches!(err, AidError::InvalidState { .. }));
    }

    #[test]
    fn initialize_is_one_shot() {
        let mut unit = bound_unit();
        initialize(&mut unit).unwrap();

        let err = initialize(&mut unit).unwrap_err();
        assert!(matches!(err, AidError::InvalidState { .. }));
        assert_eq!(unit.status, DeliveryStatus::Issued);
    }

    #[test]
    fn wrong_caller_is_rejected_without_state_change() {
        let mut unit = bound_unit();

        let err = mark_in_transit(&mut unit, handler()).unwrap_err();
        assert!(matches!(err, AidError::AccessDenied(_)));
        assert_eq!(unit.status, DeliveryStatus::Pending);

        mark_in_transit(&mut unit, transporter()).unwrap();
        let err = mark_delivered(&mut unit, recipient()).unwrap_err();
        assert!(matches!(err, AidError::AccessDenied(_)));
        assert_eq!(unit.status, DeliveryStatus::InTransit);

        mark_delivered(&mut unit, handler()).unwrap();
        let err = claim(&mut unit, transporter()).unwrap_err();
        assert!(matches!(err, AidError::AccessDenied(_)));
        assert_eq!(unit.status, DeliveryStatus::Delivered);
    }

    #[test]
    fn skipping_a_state_is_rejected() {
        let mut unit = bound_unit();

        let err = mark_delivered(&mut unit, handler()).unwrap_err();
        assert!(matches!(err, AidError::InvalidState { .. }));

        let err = claim(&mut unit, recipient()).unwrap_err();
        assert!(matches!(err, AidError::InvalidState { .. }));
        assert_eq!(unit.status, DeliveryStatus::Pending);
    }

    #[test]
    fn claim_cannot_repeat() {
        let mut unit = bound_unit();
        mark_in_transit(&mut unit, transporter()).unwrap();
        mark_delivered(&mut unit, handler()).unwrap();
        claim(&mut unit, recipient()).unwrap();

        let err = claim(&mut unit, recipient()).unwrap_err();
        assert!(matches!(err, AidError::InvalidState { .. }));
        assert_eq!(unit.status, DeliveryStatus::Claimed);
    }

    #[test]
    fn unissued_and_unassigned_units_cannot_move() {
        let mut unissued = AidUnit::new(UnitId::new(1));
        let err = mark_in_transit(&mut unissued, transporter()).unwrap_err();
        assert!(matches!(err, AidError::InvalidState { .. }));

        let mut unassigned = AidUnit::new(UnitId::new(2));
        unassigned.total = 500;
        unassigned.issued = true;
        let err = mark_in_transit(&mut unassigned, transporter()).unwrap_err();
        assert!(matches!(err, AidError::InvalidState { .. }));
        let err = initialize(&mut unissued).unwrap_err();
        assert!(matches!(err, AidError::InvalidState { .. }));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Initialize,
        InTransit(bool),
        Delivered(bool),
        Claim(bool),
    }

    fn op_strategy() -> impl Strategy<Value = Vec<Op>> {
        proptest::collection::vec(
            prop_oneof![
                Just(Op::Initialize),
                any::<bool>().prop_map(Op::InTransit),
                any::<bool>().prop_map(Op::Delivered),
                any::<bool>().prop_map(Op::Claim),
            ],
            0..16,
        )
    }

    fn rank(status: DeliveryStatus) -> u8 {
        match gate_status(status) {
            DeliveryStatus::Pending | DeliveryStatus::Issued => 0,
            DeliveryStatus::InTransit => 1,
            DeliveryStatus::Delivered => 2,
            DeliveryStatus::Claimed => 3,
        }
    }

    proptest! {
        #[test]
        fn delivery_is_linear_under_any_op_sequence(ops in op_strategy()) {
            let mut unit = bound_unit();
            let intruder = PartyId::from_seed("intruder");

            for op in ops {
                let before = unit.status;
                let result = match op {
                    Op::Initialize => initialize(&mut unit),
                    Op::InTransit(legit) => {
                        mark_in_transit(&mut unit, if legit { transporter() } else { intruder })
                    }
                    Op::Delivered(legit) => {
                        mark_delivered(&mut unit, if legit { handler() } else { intruder })
                    }
                    Op::Claim(legit) => {
                        claim(&mut unit, if legit { recipient() } else { intruder })
                    }
                };

                match result {
                    Ok(_) => {
                        // Forward only, one step at a time, never repeated.
                        prop_assert!(rank(unit.status) <= rank(before) + 1);
                        prop_assert!(
                            rank(unit.status) > rank(before)
                                || (before == DeliveryStatus::Pending
                                    && unit.status == DeliveryStatus::Issued)
                        );
                    }
                    Err(_) => prop_assert_eq!(unit.status, before),
                }
            }
        }
    }
}
