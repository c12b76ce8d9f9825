//! Order store.
//!
//! The single source of truth shared by all call handlers. Keyed by the
//! server-generated order identifier; per-key last-writer-wins with no
//! version check (a concurrent replace on the same id can overwrite).

use dashmap::DashMap;

use crate::proto::{OrderItem, OrderResponse, OrderStatus, PaymentInfo};

/// An order record. Owned exclusively by the store; handlers read and
/// replace whole entries, never hold private copies across calls.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub items: Vec<OrderItem>,
    pub shipping_address: String,
    pub payment: Option<PaymentInfo>,
    pub status: OrderStatus,
    /// Fixed at creation time; never recomputed on status changes.
    pub total_amount: f64,
    /// Epoch milliseconds.
    pub created_at: i64,
}

impl Order {
    /// Project the record into the wire response shape.
    pub fn to_response(&self, message: impl Into<String>) -> OrderResponse {
        OrderResponse {
            order_id: self.id.clone(),
            status: self.status as i32,
            total_amount: self.total_amount,
            created_at: self.created_at,
            message: message.into(),
        }
    }
}

/// Interface for order persistence, injected into the service.
///
/// Implementations must be safe for concurrent reads and writes from
/// arbitrarily many simultaneous calls; a reader observing a key sees
/// either nothing or a fully-constructed record.
pub trait OrderStore: Send + Sync {
    /// Insert an order under its identifier.
    fn put(&self, order: Order);

    /// Retrieve a copy of the order, if present.
    fn get(&self, id: &str) -> Option<Order>;

    /// Whether the identifier is known.
    fn contains(&self, id: &str) -> bool;

    /// Replace an existing entry. Returns false if the id is absent.
    fn replace(&self, id: &str, order: Order) -> bool;
}

/// In-memory store on a sharded concurrent map.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    orders: DashMap<String, Order>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored orders.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

impl OrderStore for MemoryOrderStore {
    fn put(&self, order: Order) {
        self.orders.insert(order.id.clone(), order);
    }

    fn get(&self, id: &str) -> Option<Order> {
        self.orders.get(id).map(|entry| entry.value().clone())
    }

    fn contains(&self, id: &str) -> bool {
        self.orders.contains_key(id)
    }

    fn replace(&self, id: &str, order: Order) -> bool {
        match self.orders.get_mut(id) {
            Some(mut entry) => {
                *entry = order;
                true
            }
            None => false,
        }
    }
}
