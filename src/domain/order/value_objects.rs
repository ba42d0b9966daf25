use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Order Value Objects
// ============================================================================

/// Order lifecycle states. `Released` is terminal: once an order reaches it,
/// no further status assignment is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    PendingPayment,
    Paid,
    Processing,
    Cancelled,
    Released,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Released)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    DebitCard,
}

impl PaymentMethod {
    /// Cash is the only method that needs no card details.
    pub fn requires_details(&self) -> bool {
        !matches!(self, PaymentMethod::Cash)
    }
}

/// Card details supplied alongside non-cash payment methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub card_number: String,
    pub card_holder_name: String,
    pub expiry_year: i32,
    pub expiry_month: u32,
}

/// One game line item on an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderGame {
    pub game_id: Uuid,
    pub title: String,
    pub unit_price_cents: i64,
    pub quantity: i32,
}

impl OrderGame {
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity as i64
    }
}
