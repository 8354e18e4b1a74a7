//! Order lifecycle and payment state.
//!
//! One tagged enum per concern, stored as text through `as_str`/`parse`.
//! The legacy "paid" boolean is derived from [`PaymentState::Approved`]
//! rather than tracked alongside it.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderState {
    Cart,
    PendingPayment,
    Paid,
    Shipped,
    Delivered,
    Failed,
}

impl OrderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cart => "cart",
            Self::PendingPayment => "pending_payment",
            Self::Paid => "paid",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "cart" => Some(Self::Cart),
            "pending_payment" => Some(Self::PendingPayment),
            "paid" => Some(Self::Paid),
            "shipped" => Some(Self::Shipped),
            "delivered" => Some(Self::Delivered),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// States a payment approval may move to `paid` from. Once fulfillment
    /// has begun, a replayed success callback must leave the lifecycle
    /// alone.
    pub fn approval_marks_paid(&self) -> bool {
        matches!(self, Self::Cart | Self::PendingPayment)
    }

    /// Staff-driven fulfillment allow-list. `delivered` and `failed` are
    /// terminal; everything not listed is rejected with no state change.
    pub fn can_transition_to(&self, next: OrderState) -> bool {
        match self {
            Self::Paid => matches!(next, Self::Shipped | Self::Failed),
            Self::Shipped => matches!(next, Self::Delivered | Self::Failed),
            Self::Cart | Self::PendingPayment | Self::Delivered | Self::Failed => false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentState {
    Pending,
    Approved,
    Rejected,
}

impl PaymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentMethod {
    Webpay,
    MercadoPago,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Webpay => "webpay",
            Self::MercadoPago => "mercadopago",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "webpay" => Some(Self::Webpay),
            "mercadopago" => Some(Self::MercadoPago),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_transitions() {
        assert!(OrderState::Paid.can_transition_to(OrderState::Shipped));
        assert!(OrderState::Paid.can_transition_to(OrderState::Failed));
        assert!(OrderState::Shipped.can_transition_to(OrderState::Delivered));
        assert!(OrderState::Shipped.can_transition_to(OrderState::Failed));
    }

    #[test]
    fn test_paid_cannot_skip_to_delivered() {
        assert!(!OrderState::Paid.can_transition_to(OrderState::Delivered));
    }

    #[test]
    fn test_terminal_states() {
        for next in [
            OrderState::Cart,
            OrderState::PendingPayment,
            OrderState::Paid,
            OrderState::Shipped,
            OrderState::Delivered,
            OrderState::Failed,
        ] {
            assert!(!OrderState::Delivered.can_transition_to(next));
            assert!(!OrderState::Failed.can_transition_to(next));
        }
    }

    #[test]
    fn test_pre_payment_states_never_fulfill() {
        assert!(!OrderState::Cart.can_transition_to(OrderState::Shipped));
        assert!(!OrderState::PendingPayment.can_transition_to(OrderState::Shipped));
    }

    #[test]
    fn test_approval_only_pays_pre_fulfillment_states() {
        assert!(OrderState::Cart.approval_marks_paid());
        assert!(OrderState::PendingPayment.approval_marks_paid());
        // A replayed success callback must not pull a shipped or delivered
        // order back to paid.
        assert!(!OrderState::Paid.approval_marks_paid());
        assert!(!OrderState::Shipped.approval_marks_paid());
        assert!(!OrderState::Delivered.approval_marks_paid());
        assert!(!OrderState::Failed.approval_marks_paid());
    }

    #[test]
    fn test_state_round_trip() {
        for s in [
            OrderState::Cart,
            OrderState::PendingPayment,
            OrderState::Paid,
            OrderState::Shipped,
            OrderState::Delivered,
            OrderState::Failed,
        ] {
            assert_eq!(OrderState::parse(s.as_str()), Some(s));
        }
        assert_eq!(OrderState::parse("bogus"), None);
    }
}
