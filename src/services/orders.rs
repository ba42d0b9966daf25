use std::sync::Arc;

use uuid::Uuid;

use crate::context::CorrelationContext;
use crate::dispatch::EventDispatcher;
use crate::domain::order::{Order, OrderGame, OrderStatus, PaymentDetails, PaymentMethod};
use crate::repository::{Repository, RepositoryError};

use super::ServiceError;

// ============================================================================
// Order Service
// ============================================================================

pub struct OrderService<R: Repository<Order>> {
    repository: Arc<R>,
    dispatcher: Arc<EventDispatcher>,
}

impl<R: Repository<Order>> OrderService<R> {
    pub fn new(repository: Arc<R>, dispatcher: Arc<EventDispatcher>) -> Self {
        Self {
            repository,
            dispatcher,
        }
    }

    /// Create and persist a new order, then dispatch its creation events.
    #[tracing::instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn create_order(
        &self,
        customer_email: String,
        payment_method: PaymentMethod,
        payment_details: Option<PaymentDetails>,
        games: Vec<OrderGame>,
        ctx: &CorrelationContext,
    ) -> Result<Order, ServiceError> {
        let mut order = Order::new(customer_email, payment_method, payment_details, games)?;

        // Persist first; the assigned identity is what the creation events
        // reference.
        let id = self.repository.add(order.clone()).await?;
        order.assign_id(id)?;
        order.mark_created()?;

        let events = order.drain_events();
        self.repository.update(id, order.clone()).await?;

        tracing::info!(order_id = %id, total_cents = order.total_cents(), "Order created");
        self.dispatcher.process(events, ctx).await?;

        Ok(order)
    }

    /// Assign a new status to an existing order and dispatch the resulting
    /// event, if the transition produced one.
    #[tracing::instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn update_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
        ctx: &CorrelationContext,
    ) -> Result<Order, ServiceError> {
        let mut order = self
            .repository
            .get_by_id(order_id)
            .await?
            .ok_or(RepositoryError::NotFound(order_id))?;

        order.set_status(new_status)?;

        let events = order.drain_events();
        self.repository.update(order_id, order.clone()).await?;

        tracing::info!(order_id = %order_id, status = ?new_status, "Order status updated");
        self.dispatcher.process(events, ctx).await?;

        Ok(order)
    }

    pub async fn get_order(&self, order_id: Uuid) -> Result<Option<Order>, ServiceError> {
        Ok(self.repository.get_by_id(order_id).await?)
    }

    pub async fn list_orders(
        &self,
        skip: usize,
        take: usize,
    ) -> Result<Vec<Order>, ServiceError> {
        Ok(self.repository.list(skip, take).await?)
    }

    pub async fn count_orders(&self) -> Result<u64, ServiceError> {
        Ok(self.repository.count().await?)
    }

    pub async fn delete_order(&self, order_id: Uuid) -> Result<(), ServiceError> {
        self.repository.delete(order_id).await?;
        tracing::info!(order_id = %order_id, "Order deleted");
        Ok(())
    }
}
