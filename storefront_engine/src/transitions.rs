//! The status transition engine.
//!
//! Pure logic: given the current status, the requested status and who is asking, decide whether the change is
//! legal. The store applies these rules inside its status-change transaction so a concurrent writer cannot
//! slip an event past a stale check.

use thiserror::Error;

use crate::db_types::OrderStatusType;

/// The actor requesting a status change. Customers and operators play by different rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Initiator {
    /// The purchaser. May only cancel, and only while the order is still `Pending`.
    Customer,
    /// A storefront operator. May move an order between any non-terminal states, in any direction, so that
    /// data-entry mistakes can be corrected. Terminal states are locked for operators too.
    Operator,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("This order cannot be cancelled as it is already being processed.")]
    AlreadyProcessed,
    #[error("Order is already {0} and its status can no longer change")]
    TerminalState(OrderStatusType),
    #[error("Order is already {0}")]
    NoOp(OrderStatusType),
    #[error("A customer cannot set an order to {0}")]
    NotPermitted(OrderStatusType),
}

/// Checks whether `current → requested` is a legal transition for the given initiator.
///
/// | Initiator | Rule                                                                  |
/// |-----------|-----------------------------------------------------------------------|
/// | Customer  | `Pending → Cancelled` only                                            |
/// | Operator  | any change between non-terminal states; terminal states are locked    |
///
/// Re-asserting the current status is rejected as a no-op rather than silently appending a duplicate
/// history entry.
pub fn validate_transition(
    current: OrderStatusType,
    requested: OrderStatusType,
    initiator: Initiator,
) -> Result<(), TransitionError> {
    match initiator {
        Initiator::Customer => {
            if requested != OrderStatusType::Cancelled {
                return Err(TransitionError::NotPermitted(requested));
            }
            if current == OrderStatusType::Pending {
                Ok(())
            } else {
                Err(TransitionError::AlreadyProcessed)
            }
        },
        Initiator::Operator => {
            if current.is_terminal() {
                return Err(TransitionError::TerminalState(current));
            }
            if current == requested {
                return Err(TransitionError::NoOp(current));
            }
            Ok(())
        },
    }
}

pub fn is_transition_allowed(current: OrderStatusType, requested: OrderStatusType, initiator: Initiator) -> bool {
    validate_transition(current, requested, initiator).is_ok()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::db_types::OrderStatusType::*;

    #[test]
    fn operator_walks_the_happy_path() {
        let path = [Pending, Processing, Shipped, OutForDelivery, Delivered];
        for pair in path.windows(2) {
            assert!(is_transition_allowed(pair[0], pair[1], Initiator::Operator), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn operator_may_move_laterally_and_backwards() {
        assert!(is_transition_allowed(Shipped, Processing, Initiator::Operator));
        assert!(is_transition_allowed(Pending, Delivered, Initiator::Operator));
        assert!(is_transition_allowed(OutForDelivery, Cancelled, Initiator::Operator));
    }

    #[test]
    fn terminal_states_are_locked() {
        for terminal in [Delivered, Cancelled] {
            for target in [Pending, Processing, Shipped, OutForDelivery, Delivered, Cancelled] {
                assert_eq!(
                    validate_transition(terminal, target, Initiator::Operator),
                    Err(TransitionError::TerminalState(terminal))
                );
            }
        }
    }

    #[test]
    fn operator_noop_is_rejected() {
        assert_eq!(validate_transition(Shipped, Shipped, Initiator::Operator), Err(TransitionError::NoOp(Shipped)));
    }

    #[test]
    fn customer_can_only_cancel_pending_orders() {
        assert!(is_transition_allowed(Pending, Cancelled, Initiator::Customer));
        for current in [Processing, Shipped, OutForDelivery, Delivered, Cancelled] {
            assert_eq!(
                validate_transition(current, Cancelled, Initiator::Customer),
                Err(TransitionError::AlreadyProcessed)
            );
        }
    }

    #[test]
    fn customer_cannot_set_other_statuses() {
        assert_eq!(
            validate_transition(Pending, Shipped, Initiator::Customer),
            Err(TransitionError::NotPermitted(Shipped))
        );
    }
}
