//! End-to-end tests over a real tonic transport.
//!
//! Each test boots the full server, middleware stack included, on an
//! ephemeral localhost port and drives it with the generated client.

use std::sync::Arc;
use std::time::Duration;

use tokio_stream::wrappers::TcpListenerStream;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::service::interceptor::InterceptedService;
use tonic::service::Interceptor;
use tonic::transport::{Channel, Server};
use tonic::{Code, Request, Status};

use orderhub::interceptors::{grpc_logging_layer, AuthInterceptor};
use orderhub::proto::order_service_client::OrderServiceClient;
use orderhub::proto::order_service_server::OrderServiceServer;
use orderhub::proto::{
    CreateOrderRequest, GetOrderRequest, OrderItem, OrderProcessRequest, OrderStatus,
    ProcessAction, TrackOrderRequest,
};
use orderhub::scheduler::UpdateScheduler;
use orderhub::services::OrderCoreService;
use orderhub::store::MemoryOrderStore;

/// 7-char prefix plus 23 characters, comfortably over the length floor.
const TEST_TOKEN: &str = "Bearer test-token-abcdefghijkl";

#[derive(Clone)]
struct BearerToken(MetadataValue<Ascii>);

impl Interceptor for BearerToken {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        request.metadata_mut().insert("authorization", self.0.clone());
        Ok(request)
    }
}

async fn start_server(tracking_tick: Duration) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let store = Arc::new(MemoryOrderStore::new());
    let scheduler = Arc::new(UpdateScheduler::new());
    let service = OrderCoreService::new(store, scheduler, tracking_tick);

    let middleware = tower::ServiceBuilder::new()
        .layer(grpc_logging_layer())
        .layer(tonic::service::interceptor::interceptor(
            AuthInterceptor::new(),
        ))
        .into_inner();

    tokio::spawn(async move {
        Server::builder()
            .layer(middleware)
            .add_service(OrderServiceServer::new(service))
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    format!("http://{addr}")
}

async fn connect(address: &str) -> Channel {
    Channel::from_shared(address.to_string())
        .unwrap()
        .connect()
        .await
        .unwrap()
}

async fn authed_client(
    address: &str,
) -> OrderServiceClient<InterceptedService<Channel, BearerToken>> {
    let channel = connect(address).await;
    let token: MetadataValue<Ascii> = TEST_TOKEN.parse().unwrap();
    OrderServiceClient::with_interceptor(channel, BearerToken(token))
}

fn create_request(customer_id: &str) -> CreateOrderRequest {
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
        payment_info: None,
    }
}

#[tokio::test]
async fn test_create_then_get() {
    let address = start_server(Duration::from_millis(10)).await;
    let mut client = authed_client(&address).await;

    let created = client
        .create_order(create_request("customer-001"))
        .await
        .unwrap()
        .into_inner();

    assert!((created.total_amount - 1359.97).abs() < f64::EPSILON);
    assert_eq!(created.status(), OrderStatus::Pending);
    assert_eq!(created.message, "Order created successfully");

    let fetched = client
        .get_order(GetOrderRequest {
            order_id: created.order_id.clone(),
        })
        .await
        .unwrap()
        .into_inner();
    let refetched = client
        .get_order(GetOrderRequest {
            order_id: created.order_id.clone(),
        })
        .await
        .unwrap()
        .into_inner();

    assert_eq!(fetched.order_id, created.order_id);
    assert_eq!(fetched.total_amount, created.total_amount);
    assert_eq!(fetched.created_at, created.created_at);
    assert_eq!(fetched, refetched);
}

#[tokio::test]
async fn test_create_invalid_is_invalid_argument() {
    let address = start_server(Duration::from_millis(10)).await;
    let mut client = authed_client(&address).await;

    let mut request = create_request("customer-001");
    request.items.clear();

    let status = client.create_order(request).await.unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(status.message(), "Order must contain at least one item");
}

#[tokio::test]
async fn test_get_unknown_is_not_found() {
    let address = start_server(Duration::from_millis(10)).await;
    let mut client = authed_client(&address).await;

    let status = client
        .get_order(GetOrderRequest {
            order_id: "no-such-order".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(status.code(), Code::NotFound);
}

#[tokio::test]
async fn test_track_order_streams_to_delivery() {
    let address = start_server(Duration::from_millis(10)).await;
    let mut client = authed_client(&address).await;

    let created = client
        .create_order(create_request("customer-001"))
        .await
        .unwrap()
        .into_inner();

    let mut updates = client
        .track_order(TrackOrderRequest {
            order_id: created.order_id.clone(),
        })
        .await
        .unwrap()
        .into_inner();

    let mut statuses = Vec::new();
    while let Some(update) = updates.message().await.unwrap() {
        assert_eq!(update.order_id, created.order_id);
        statuses.push(update.status());
    }

    assert_eq!(
        statuses,
        vec![
            OrderStatus::Confirmed,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ]
    );
}

#[tokio::test]
async fn test_track_unknown_is_not_found() {
    let address = start_server(Duration::from_millis(10)).await;
    let mut client = authed_client(&address).await;

    let result = client
        .track_order(TrackOrderRequest {
            order_id: "no-such-order".to_string(),
        })
        .await;

    assert_eq!(result.unwrap_err().code(), Code::NotFound);
}

#[tokio::test]
async fn test_batch_create_counts_per_item_outcomes() {
    let address = start_server(Duration::from_millis(10)).await;
    let mut client = authed_client(&address).await;

    let mut no_address = create_request("customer-002");
    no_address.shipping_address.clear();
    let mut no_items = create_request("customer-004");
    no_items.items.clear();

    let requests = vec![
        create_request("customer-001"),
        no_address,
        create_request("customer-003"),
        no_items,
        create_request("customer-005"),
    ];

    let batch = client
        .batch_create_orders(tokio_stream::iter(requests))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(batch.total_orders, 5);
    assert_eq!(batch.successful_orders, 3);
    assert_eq!(batch.failed_orders, 2);
    assert_eq!(batch.order_ids.len(), 3);

    // Every accepted order is individually retrievable.
    for order_id in &batch.order_ids {
        let fetched = client
            .get_order(GetOrderRequest {
                order_id: order_id.clone(),
            })
            .await
            .unwrap()
            .into_inner();
        assert_eq!(fetched.status(), OrderStatus::Pending);
    }
}

#[tokio::test]
async fn test_process_orders_bidirectional() {
    let address = start_server(Duration::from_millis(10)).await;
    let mut client = authed_client(&address).await;

    let created = client
        .create_order(create_request("customer-001"))
        .await
        .unwrap()
        .into_inner();

    let requests = vec![
        OrderProcessRequest {
            order_id: created.order_id.clone(),
            action: ProcessAction::Ship as i32,
            notes: "expedite".to_string(),
        },
        OrderProcessRequest {
            order_id: "no-such-order".to_string(),
            action: ProcessAction::Confirm as i32,
            notes: String::new(),
        },
    ];

    let mut responses = client
        .process_orders(tokio_stream::iter(requests))
        .await
        .unwrap()
        .into_inner();

    let first = responses.message().await.unwrap().unwrap();
    assert_eq!(first.order_id, created.order_id);
    assert!(first.success);
    assert_eq!(first.new_status(), OrderStatus::Shipped);

    let second = responses.message().await.unwrap().unwrap();
    assert!(!second.success);
    assert_eq!(second.message, "Order not found");

    assert!(responses.message().await.unwrap().is_none());

    // The status change is visible on a subsequent lookup.
    let fetched = client
        .get_order(GetOrderRequest {
            order_id: created.order_id.clone(),
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(fetched.status(), OrderStatus::Shipped);

    // The unknown id still does not exist.
    let missing = client
        .get_order(GetOrderRequest {
            order_id: "no-such-order".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(missing.code(), Code::NotFound);
}

#[tokio::test]
async fn test_missing_token_is_unauthenticated() {
    let address = start_server(Duration::from_millis(10)).await;
    let channel = connect(&address).await;
    let mut client = OrderServiceClient::new(channel);

    let status = client
        .create_order(create_request("customer-001"))
        .await
        .unwrap_err();

    assert_eq!(status.code(), Code::Unauthenticated);
    assert_eq!(status.message(), "missing authorization token");
}

#[tokio::test]
async fn test_short_token_is_unauthenticated() {
    let address = start_server(Duration::from_millis(10)).await;
    let channel = connect(&address).await;
    let token: MetadataValue<Ascii> = "Bearer short".parse().unwrap();
    let mut client = OrderServiceClient::with_interceptor(channel, BearerToken(token));

    let status = client
        .create_order(create_request("customer-001"))
        .await
        .unwrap_err();

    assert_eq!(status.code(), Code::Unauthenticated);
    assert_eq!(status.message(), "invalid authorization token");
}
