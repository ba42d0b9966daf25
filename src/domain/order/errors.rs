use super::value_objects::PaymentMethod;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order has been released and can no longer change status")]
    OrderReleased,

    #[error("Payment method {0:?} requires payment details")]
    PaymentDetailsRequired(PaymentMethod),

    #[error("Card number must be 13-19 characters, got {0}")]
    InvalidCardNumber(usize),

    #[error("Expiry month must be 1-12, got {0}")]
    InvalidExpiryMonth(u32),

    #[error("Card expired: {year}-{month:02} ends before today")]
    CardExpired { year: i32, month: u32 },

    #[error("Order must contain at least one game")]
    EmptyGames,

    #[error("Game quantity must be positive, got {0}")]
    InvalidQuantity(i32),

    #[error("Order has no persisted identity yet")]
    IdentityNotAssigned,

    #[error("Order identity is already assigned")]
    IdentityAlreadyAssigned,

    #[error("Order creation events were already emitted")]
    AlreadyMarkedCreated,
}
