//! orderhub-client: Example driver
//!
//! Walks the order service through all four call shapes with a bearer
//! token attached to every call: create one order, fetch it, track it to
//! delivery, batch-create a handful more, then process them over the
//! bidirectional stream.

use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::Channel;
use tonic::Request;
use tracing::info;

use orderhub::proto::order_service_client::OrderServiceClient;
use orderhub::proto::{
    CreateOrderRequest, GetOrderRequest, OrderItem, OrderProcessRequest, PaymentInfo,
    ProcessAction, TrackOrderRequest,
};

const SAMPLE_TOKEN: &str = "Bearer sample-token-12345678901234567890";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    orderhub::utils::bootstrap::init_tracing();

    let address = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://127.0.0.1:50051".to_string());
    let channel = Channel::from_shared(address)?.connect().await?;

    let token: MetadataValue<Ascii> = SAMPLE_TOKEN.parse()?;
    let mut client = OrderServiceClient::with_interceptor(channel, move |mut req: Request<()>| {
        req.metadata_mut().insert("authorization", token.clone());
        Ok(req)
    });

    // Unary: create and fetch.
    let created = client
        .create_order(sample_order("customer-001"))
        .await?
        .into_inner();
    info!(order_id = %created.order_id, total = created.total_amount, "order created");

    let fetched = client
        .get_order(GetOrderRequest {
            order_id: created.order_id.clone(),
        })
        .await?
        .into_inner();
    info!(order_id = %fetched.order_id, status = fetched.status().as_str_name(), "order fetched");

    // Server streaming: follow the order to delivery.
    let mut updates = client
        .track_order(TrackOrderRequest {
            order_id: created.order_id.clone(),
        })
        .await?
        .into_inner();
    while let Some(update) = updates.message().await? {
        info!(
            status = update.status().as_str_name(),
            location = %update.location,
            "status update"
        );
    }
    info!("order tracking completed");

    // Client streaming: batch ingestion.
    let requests: Vec<CreateOrderRequest> = (1..=5)
        .map(|i| sample_order(&format!("customer-{i:03}")))
        .collect();
    let batch = client
        .batch_create_orders(tokio_stream::iter(requests))
        .await?
        .into_inner();
    info!(
        total = batch.total_orders,
        succeeded = batch.successful_orders,
        failed = batch.failed_orders,
        "batch completed"
    );

    // Bidirectional streaming: process the batch.
    let actions = [
        ProcessAction::Confirm,
        ProcessAction::Ship,
        ProcessAction::Deliver,
    ];
    let process_requests: Vec<OrderProcessRequest> = batch
        .order_ids
        .iter()
        .enumerate()
        .map(|(i, order_id)| OrderProcessRequest {
            order_id: order_id.clone(),
            action: actions[i % actions.len()] as i32,
            notes: format!("Processing order {}", i + 1),
        })
        .collect();
    let mut responses = client
        .process_orders(tokio_stream::iter(process_requests))
        .await?
        .into_inner();
    while let Some(response) = responses.message().await? {
        info!(
            order_id = %response.order_id,
            success = response.success,
            status = response.new_status().as_str_name(),
            "process result"
        );
    }
    info!("order processing completed");

    Ok(())
}

fn sample_order(customer_id: &str) -> CreateOrderRequest {
    CreateOrderRequest {
        customer_id: customer_id.to_string(),
        items: vec![
            OrderItem {
                product_id: "prod-001".to_string(),
                product_name: "Laptop".to_string(),
                quantity: 1,
                unit_price: 1299.99,
            },
            OrderItem {
                product_id: "prod-002".to_string(),
                product_name: "Mouse".to_string(),
                quantity: 2,
                unit_price: 29.99,
            },
        ],
        shipping_address: "123 Main St, Seoul".to_string(),
        payment_info: Some(PaymentInfo {
            payment_method: "Credit Card".to_string(),
            card_number: "****-****-****-1234".to_string(),
            cvv: "***".to_string(),
        }),
    }
}
