use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

// ============================================================================
// Persistence Boundary
// ============================================================================
//
// The core consumes this contract and never sees a concrete database. The
// repository assigns identities at add; services feed the assigned id back
// into the aggregate before emitting creation events. The in-memory
// implementation backs the binary and the tests.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity {0} not found")]
    NotFound(Uuid),

    #[error("Storage failure: {0}")]
    Storage(String),
}

#[async_trait]
pub trait Repository<T>: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<T>, RepositoryError>;

    /// Persist a new entity, returning the assigned identity.
    async fn add(&self, entity: T) -> Result<Uuid, RepositoryError>;

    async fn update(&self, id: Uuid, entity: T) -> Result<(), RepositoryError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// Page through entities in insertion order.
    async fn list(&self, skip: usize, take: usize) -> Result<Vec<T>, RepositoryError>;

    async fn count(&self) -> Result<u64, RepositoryError>;
}

struct Store<T> {
    items: HashMap<Uuid, T>,
    insertion_order: Vec<Uuid>,
}

pub struct InMemoryRepository<T> {
    store: RwLock<Store<T>>,
}

impl<T> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Store {
                items: HashMap::new(),
                insertion_order: Vec::new(),
            }),
        }
    }
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> Repository<T> for InMemoryRepository<T> {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<T>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store.items.get(&id).cloned())
    }

    async fn add(&self, entity: T) -> Result<Uuid, RepositoryError> {
        let mut store = self.store.write().await;
        let id = Uuid::new_v4();
        store.items.insert(id, entity);
        store.insertion_order.push(id);
        Ok(id)
    }

    async fn update(&self, id: Uuid, entity: T) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        match store.items.get_mut(&id) {
            Some(slot) => {
                *slot = entity;
                Ok(())
            }
            None => Err(RepositoryError::NotFound(id)),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        if store.items.remove(&id).is_none() {
            return Err(RepositoryError::NotFound(id));
        }
        store.insertion_order.retain(|existing| *existing != id);
        Ok(())
    }

    async fn list(&self, skip: usize, take: usize) -> Result<Vec<T>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store
            .insertion_order
            .iter()
            .skip(skip)
            .take(take)
            .filter_map(|id| store.items.get(id).cloned())
            .collect())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let store = self.store.read().await;
        Ok(store.items.len() as u64)
    }
}
