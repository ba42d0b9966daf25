use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::events::{
    DomainEvent, EventLog, OrderCreated, OrderStatusChanged, PaymentMethodSet,
};

use super::errors::OrderError;
use super::value_objects::{OrderGame, OrderStatus, PaymentDetails, PaymentMethod};

// ============================================================================
// Order Aggregate
// ============================================================================
//
// Owns the order state machine and payment invariants, and records domain
// events into its composed EventLog as state mutates. The aggregate is
// constructed without an identity; the repository assigns one at first
// persistence, after which mark_created emits the creation events that
// reference it.
//
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    id: Option<Uuid>,
    pub customer_email: String,
    status: OrderStatus,
    payment_method: PaymentMethod,
    payment_details: Option<PaymentDetails>,
    games: Vec<OrderGame>,
    pub created_at: DateTime<Utc>,
    created_events_emitted: bool,
    #[serde(skip)]
    events: EventLog,
}

impl Order {
    pub fn new(
        customer_email: impl Into<String>,
        payment_method: PaymentMethod,
        payment_details: Option<PaymentDetails>,
        games: Vec<OrderGame>,
    ) -> Result<Self, OrderError> {
        Self::validate_games(&games)?;
        Self::validate_payment(payment_method, payment_details.as_ref())?;

        Ok(Self {
            id: None,
            customer_email: customer_email.into(),
            status: OrderStatus::PendingPayment,
            payment_method,
            payment_details,
            games,
            created_at: Utc::now(),
            created_events_emitted: false,
            events: EventLog::new(),
        })
    }

    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn games(&self) -> &[OrderGame] {
        &self.games
    }

    pub fn total_cents(&self) -> i64 {
        self.games.iter().map(OrderGame::line_total_cents).sum()
    }

    pub fn pending_events(&self) -> &[DomainEvent] {
        self.events.pending()
    }

    pub fn drain_events(&mut self) -> Vec<DomainEvent> {
        self.events.drain()
    }

    /// Record the identity the repository assigned at first persistence.
    pub fn assign_id(&mut self, id: Uuid) -> Result<(), OrderError> {
        if self.id.is_some() {
            return Err(OrderError::IdentityAlreadyAssigned);
        }
        self.id = Some(id);
        Ok(())
    }

    /// Emit the creation events. Called exactly once, after first
    /// persistence, because both events reference the assigned identity.
    pub fn mark_created(&mut self) -> Result<(), OrderError> {
        let id = self.id.ok_or(OrderError::IdentityNotAssigned)?;
        if self.created_events_emitted {
            return Err(OrderError::AlreadyMarkedCreated);
        }
        self.created_events_emitted = true;

        self.events.record(DomainEvent::OrderCreated(OrderCreated {
            order_id: id,
            customer_email: self.customer_email.clone(),
            total_cents: self.total_cents(),
            occurred_at: Utc::now(),
        }));
        self.events
            .record(DomainEvent::PaymentMethodSet(PaymentMethodSet {
                order_id: id,
                payment_method: self.payment_method,
                customer_email: self.customer_email.clone(),
                occurred_at: Utc::now(),
            }));
        Ok(())
    }

    /// Assign a new status. The sole transition mechanism: Released is
    /// terminal, and any real change on a persisted order raises
    /// OrderStatusChanged.
    pub fn set_status(&mut self, new_status: OrderStatus) -> Result<(), OrderError> {
        if self.status.is_terminal() {
            return Err(OrderError::OrderReleased);
        }

        let old_status = self.status;
        self.status = new_status;

        if old_status != new_status {
            if let Some(id) = self.id {
                self.events
                    .record(DomainEvent::OrderStatusChanged(OrderStatusChanged {
                        order_id: id,
                        old_status,
                        new_status,
                        customer_email: self.customer_email.clone(),
                        occurred_at: Utc::now(),
                    }));
            }
        }
        Ok(())
    }

    /// Change payment method (and details) on an existing order, enforcing
    /// the same rules as construction.
    pub fn set_payment_method(
        &mut self,
        method: PaymentMethod,
        details: Option<PaymentDetails>,
    ) -> Result<(), OrderError> {
        Self::validate_payment(method, details.as_ref())?;
        self.payment_method = method;
        self.payment_details = details;
        Ok(())
    }

    fn validate_games(games: &[OrderGame]) -> Result<(), OrderError> {
        if games.is_empty() {
            return Err(OrderError::EmptyGames);
        }
        for game in games {
            if game.quantity <= 0 {
                return Err(OrderError::InvalidQuantity(game.quantity));
            }
        }
        Ok(())
    }

    fn validate_payment(
        method: PaymentMethod,
        details: Option<&PaymentDetails>,
    ) -> Result<(), OrderError> {
        let details = match details {
            Some(d) => d,
            None => {
                if method.requires_details() {
                    return Err(OrderError::PaymentDetailsRequired(method));
                }
                return Ok(());
            }
        };

        let len = details.card_number.chars().count();
        if !(13..=19).contains(&len) {
            return Err(OrderError::InvalidCardNumber(len));
        }

        if !(1..=12).contains(&details.expiry_month) {
            return Err(OrderError::InvalidExpiryMonth(details.expiry_month));
        }

        // Card is valid through the last calendar day of its expiry month.
        let last_day = last_day_of_month(details.expiry_year, details.expiry_month)
            .ok_or(OrderError::InvalidExpiryMonth(details.expiry_month))?;
        if last_day < Utc::now().date_naive() {
            return Err(OrderError::CardExpired {
                year: details.expiry_year,
                month: details.expiry_month,
            });
        }

        Ok(())
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1).map(|first| first - Duration::days(1))
}
