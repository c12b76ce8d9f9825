//! Order service.
//!
//! Implements the five call handlers against the shared order store, the
//! validation functions, the status transition table, and the update
//! scheduler. Streaming handlers own their per-call state; the store is
//! the only resource shared across calls.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tonic::{Request, Response, Status, Streaming};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::proto::order_service_server::OrderService;
use crate::proto::{
    BatchOrderResponse, CreateOrderRequest, GetOrderRequest, OrderProcessRequest,
    OrderProcessResponse, OrderResponse, OrderStatus, OrderStatusUpdate, TrackOrderRequest,
};
use crate::scheduler::UpdateScheduler;
use crate::status;
use crate::store::{Order, OrderStore};
use crate::validation;

/// Simulated tracking stages, in delivery order. Each entry is one
/// scheduled status update with its location label.
const TRACKING_STAGES: [(OrderStatus, &str); 4] = [
    (OrderStatus::Confirmed, "Order confirmed at warehouse"),
    (OrderStatus::Processing, "Processing at distribution center"),
    (OrderStatus::Shipped, "Shipped from Seoul"),
    (OrderStatus::Delivered, "Delivered to customer"),
];

/// Order service backed by an injected store and update scheduler.
pub struct OrderCoreService {
    store: Arc<dyn OrderStore>,
    scheduler: Arc<UpdateScheduler>,
    tracking_tick: Duration,
}

impl OrderCoreService {
    pub fn new(
        store: Arc<dyn OrderStore>,
        scheduler: Arc<UpdateScheduler>,
        tracking_tick: Duration,
    ) -> Self {
        Self {
            store,
            scheduler,
            tracking_tick,
        }
    }
}

#[tonic::async_trait]
impl OrderService for OrderCoreService {
    async fn create_order(
        &self,
        request: Request<CreateOrderRequest>,
    ) -> Result<Response<OrderResponse>, Status> {
        let request = request.into_inner();
        validation::validate_create_order(&request)?;

        let order = new_order(request);
        let response = order.to_response("Order created successfully");
        info!(order_id = %order.id, total = order.total_amount, "order created");
        self.store.put(order);

        Ok(Response::new(response))
    }

    async fn get_order(
        &self,
        request: Request<GetOrderRequest>,
    ) -> Result<Response<OrderResponse>, Status> {
        let GetOrderRequest { order_id } = request.into_inner();

        match self.store.get(&order_id) {
            Some(order) => Ok(Response::new(order.to_response(""))),
            None => Err(Status::not_found(format!("order not found: {order_id}"))),
        }
    }

    type TrackOrderStream = ReceiverStream<Result<OrderStatusUpdate, Status>>;

    async fn track_order(
        &self,
        request: Request<TrackOrderRequest>,
    ) -> Result<Response<Self::TrackOrderStream>, Status> {
        let TrackOrderRequest { order_id } = request.into_inner();

        if !self.store.contains(&order_id) {
            return Err(Status::not_found(format!("order not found: {order_id}")));
        }

        let (tx, rx) = mpsc::channel(TRACKING_STAGES.len());
        for (index, (stage, location)) in TRACKING_STAGES.iter().enumerate() {
            let update = OrderStatusUpdate {
                order_id: order_id.clone(),
                status: *stage as i32,
                location: (*location).to_string(),
                timestamp: 0,
                description: format!("Order status updated to {}", stage.as_str_name()),
            };
            let tx = tx.clone();
            let delay = self.tracking_tick * (index as u32 + 1);
            self.scheduler
                .schedule_after(delay, async move {
                    let mut update = update;
                    update.timestamp = Utc::now().timestamp_millis();
                    // A closed channel means the subscriber went away.
                    if tx.send(Ok(update)).await.is_err() {
                        debug!("tracking subscriber gone, dropping update");
                    }
                })
                .map_err(|e| {
                    error!(error = %e, "failed to schedule tracking update");
                    Status::internal("tracking unavailable")
                })?;
        }

        info!(order_id = %order_id, updates = TRACKING_STAGES.len(), "tracking started");
        Ok(Response::new(ReceiverStream::new(rx)))
    }

    async fn batch_create_orders(
        &self,
        request: Request<Streaming<CreateOrderRequest>>,
    ) -> Result<Response<BatchOrderResponse>, Status> {
        let requests = request.into_inner();
        let response = ingest_batch(self.store.as_ref(), requests).await?;
        Ok(Response::new(response))
    }

    type ProcessOrdersStream = ReceiverStream<Result<OrderProcessResponse, Status>>;

    async fn process_orders(
        &self,
        request: Request<Streaming<OrderProcessRequest>>,
    ) -> Result<Response<Self::ProcessOrdersStream>, Status> {
        let inbound = request.into_inner();
        let (tx, rx) = mpsc::channel(16);
        let store = self.store.clone();

        tokio::spawn(async move {
            run_process_stream(store, inbound, tx).await;
        });

        Ok(Response::new(ReceiverStream::new(rx)))
    }
}

/// Build a PENDING order from a validated request.
fn new_order(request: CreateOrderRequest) -> Order {
    let total_amount = validation::calculate_total_amount(&request.items);
    Order {
        id: Uuid::new_v4().to_string(),
        customer_id: request.customer_id,
        items: request.items,
        shipping_address: request.shipping_address,
        payment: request.payment_info,
        status: OrderStatus::Pending,
        total_amount,
        created_at: Utc::now().timestamp_millis(),
    }
}

/// Per-call accumulator for batch ingestion. Owned by the handler task;
/// mutations never go through captured ambient state.
#[derive(Debug, Default)]
struct BatchState {
    total: i32,
    succeeded: i32,
    failed: i32,
    order_ids: Vec<String>,
}

impl BatchState {
    fn record_success(&mut self, order_id: String) {
        self.total += 1;
        self.succeeded += 1;
        self.order_ids.push(order_id);
    }

    fn record_failure(&mut self) {
        self.total += 1;
        self.failed += 1;
    }

    fn into_response(self) -> BatchOrderResponse {
        BatchOrderResponse {
            total_orders: self.total,
            successful_orders: self.succeeded,
            failed_orders: self.failed,
            order_ids: self.order_ids,
        }
    }
}

/// Drain the inbound request stream, creating orders item by item.
///
/// A failing item is counted and skipped; it never aborts the batch. A
/// transport error ends the call without a summary response.
async fn ingest_batch<S>(store: &dyn OrderStore, mut requests: S) -> Result<BatchOrderResponse, Status>
where
    S: Stream<Item = Result<CreateOrderRequest, Status>> + Unpin,
{
    let mut state = BatchState::default();

    while let Some(message) = requests.next().await {
        let request = match message {
            Ok(request) => request,
            Err(status) => {
                error!(error = %status, "batch stream aborted by transport");
                return Err(status);
            }
        };

        match validation::validate_create_order(&request) {
            Ok(()) => {
                let order = new_order(request);
                info!(order_id = %order.id, "batch order created");
                state.record_success(order.id.clone());
                store.put(order);
            }
            Err(e) => {
                warn!(error = %e, "batch order rejected");
                state.record_failure();
            }
        }
    }

    info!(
        total = state.total,
        succeeded = state.succeeded,
        failed = state.failed,
        "batch completed"
    );
    Ok(state.into_response())
}

/// Apply processing requests one at a time, emitting a response per
/// request in arrival order.
async fn run_process_stream<S>(
    store: Arc<dyn OrderStore>,
    mut requests: S,
    responses: mpsc::Sender<Result<OrderProcessResponse, Status>>,
) where
    S: Stream<Item = Result<OrderProcessRequest, Status>> + Unpin,
{
    while let Some(message) = requests.next().await {
        match message {
            Ok(request) => {
                let response = apply_process_request(store.as_ref(), request);
                if responses.send(Ok(response)).await.is_err() {
                    debug!("process subscriber gone, ending stream");
                    return;
                }
            }
            Err(status) => {
                error!(error = %status, "process stream aborted by transport");
                return;
            }
        }
    }

    info!("process stream completed");
}

/// Look up and transition a single order. Unknown orders produce a
/// failure response and leave the store untouched.
fn apply_process_request(store: &dyn OrderStore, request: OrderProcessRequest) -> OrderProcessResponse {
    let OrderProcessRequest {
        order_id, action, ..
    } = request;

    let Some(mut order) = store.get(&order_id) else {
        return OrderProcessResponse {
            order_id,
            success: false,
            message: "Order not found".to_string(),
            new_status: OrderStatus::Pending as i32,
        };
    };

    let new_status = status::status_for_action(action);
    info!(
        order_id = %order_id,
        from = order.status.as_str_name(),
        to = new_status.as_str_name(),
        "order processed"
    );
    order.status = new_status;
    store.replace(&order_id, order);

    OrderProcessResponse {
        order_id,
        success: true,
        message: format!("Order processed: {}", status::action_label(action)),
        new_status: new_status as i32,
    }
}
