//! Build-time gRPC code generation.
//!
//! `protoc` is not available in this build environment, so rather than
//! parsing the `.proto` file with the protobuf compiler we construct the
//! equivalent `FileDescriptorSet` in Rust and hand it to tonic-build's
//! pure-Rust `compile_fds` path. The descriptor below mirrors
//! `proto/orderhub/orderhub.proto` field-for-field; keep the two in sync.

use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, FileDescriptorSet, MethodDescriptorProto, ServiceDescriptorProto,
};

fn field(name: &str, number: i32, ty: Type, label: Label) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(label as i32),
        r#type: Some(ty as i32),
        ..Default::default()
    }
}

/// A message or enum typed field. `ty` must be `Type::Message` or `Type::Enum`.
fn typed_field(
    name: &str,
    number: i32,
    ty: Type,
    label: Label,
    type_name: &str,
) -> FieldDescriptorProto {
    FieldDescriptorProto {
        type_name: Some(type_name.to_string()),
        ..field(name, number, ty, label)
    }
}

fn message(name: &str, fields: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_string()),
        field: fields,
        ..Default::default()
    }
}

fn enum_value(name: &str, number: i32) -> EnumValueDescriptorProto {
    EnumValueDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        ..Default::default()
    }
}

fn enum_type(name: &str, values: Vec<EnumValueDescriptorProto>) -> EnumDescriptorProto {
    EnumDescriptorProto {
        name: Some(name.to_string()),
        value: values,
        ..Default::default()
    }
}

fn method(
    name: &str,
    input: &str,
    output: &str,
    client_streaming: bool,
    server_streaming: bool,
) -> MethodDescriptorProto {
    MethodDescriptorProto {
        name: Some(name.to_string()),
        input_type: Some(input.to_string()),
        output_type: Some(output.to_string()),
        client_streaming: Some(client_streaming),
        server_streaming: Some(server_streaming),
        ..Default::default()
    }
}

fn file_descriptor_set() -> FileDescriptorSet {
    use Label::{Optional, Repeated};

    let order_item = message(
        "OrderItem",
        vec![
            field("product_id", 1, Type::String, Optional),
            field("product_name", 2, Type::String, Optional),
            field("quantity", 3, Type::Int32, Optional),
            field("unit_price", 4, Type::Double, Optional),
        ],
    );

    let payment_info = message(
        "PaymentInfo",
        vec![
            field("payment_method", 1, Type::String, Optional),
            field("card_number", 2, Type::String, Optional),
            field("cvv", 3, Type::String, Optional),
        ],
    );

    let create_order_request = message(
        "CreateOrderRequest",
        vec![
            field("customer_id", 1, Type::String, Optional),
            typed_field("items", 2, Type::Message, Repeated, ".orderhub.OrderItem"),
            field("shipping_address", 3, Type::String, Optional),
            typed_field(
                "payment_info",
                4,
                Type::Message,
                Optional,
                ".orderhub.PaymentInfo",
            ),
        ],
    );

    let order_response = message(
        "OrderResponse",
        vec![
            field("order_id", 1, Type::String, Optional),
            typed_field("status", 2, Type::Enum, Optional, ".orderhub.OrderStatus"),
            field("total_amount", 3, Type::Double, Optional),
            field("created_at", 4, Type::Int64, Optional),
            field("message", 5, Type::String, Optional),
        ],
    );

    let get_order_request = message(
        "GetOrderRequest",
        vec![field("order_id", 1, Type::String, Optional)],
    );

    let track_order_request = message(
        "TrackOrderRequest",
        vec![field("order_id", 1, Type::String, Optional)],
    );

    let order_status_update = message(
        "OrderStatusUpdate",
        vec![
            field("order_id", 1, Type::String, Optional),
            typed_field("status", 2, Type::Enum, Optional, ".orderhub.OrderStatus"),
            field("location", 3, Type::String, Optional),
            field("timestamp", 4, Type::Int64, Optional),
            field("description", 5, Type::String, Optional),
        ],
    );

    let batch_order_response = message(
        "BatchOrderResponse",
        vec![
            field("total_orders", 1, Type::Int32, Optional),
            field("successful_orders", 2, Type::Int32, Optional),
            field("failed_orders", 3, Type::Int32, Optional),
            field("order_ids", 4, Type::String, Repeated),
        ],
    );

    let order_process_request = message(
        "OrderProcessRequest",
        vec![
            field("order_id", 1, Type::String, Optional),
            typed_field("action", 2, Type::Enum, Optional, ".orderhub.ProcessAction"),
            field("notes", 3, Type::String, Optional),
        ],
    );

    let order_process_response = message(
        "OrderProcessResponse",
        vec![
            field("order_id", 1, Type::String, Optional),
            field("success", 2, Type::Bool, Optional),
            field("message", 3, Type::String, Optional),
            typed_field(
                "new_status",
                4,
                Type::Enum,
                Optional,
                ".orderhub.OrderStatus",
            ),
        ],
    );

    let order_status = enum_type(
        "OrderStatus",
        vec![
            enum_value("PENDING", 0),
            enum_value("CONFIRMED", 1),
            enum_value("PROCESSING", 2),
            enum_value("SHIPPED", 3),
            enum_value("DELIVERED", 4),
            enum_value("CANCELLED", 5),
            enum_value("REFUNDED", 6),
        ],
    );

    let process_action = enum_type(
        "ProcessAction",
        vec![
            enum_value("CONFIRM", 0),
            enum_value("SHIP", 1),
            enum_value("DELIVER", 2),
            enum_value("CANCEL", 3),
            enum_value("REFUND", 4),
        ],
    );

    let service = ServiceDescriptorProto {
        name: Some("OrderService".to_string()),
        method: vec![
            method(
                "CreateOrder",
                ".orderhub.CreateOrderRequest",
                ".orderhub.OrderResponse",
                false,
                false,
            ),
            method(
                "GetOrder",
                ".orderhub.GetOrderRequest",
                ".orderhub.OrderResponse",
                false,
                false,
            ),
            method(
                "TrackOrder",
                ".orderhub.TrackOrderRequest",
                ".orderhub.OrderStatusUpdate",
                false,
                true,
            ),
            method(
                "BatchCreateOrders",
                ".orderhub.CreateOrderRequest",
                ".orderhub.BatchOrderResponse",
                true,
                false,
            ),
            method(
                "ProcessOrders",
                ".orderhub.OrderProcessRequest",
                ".orderhub.OrderProcessResponse",
                true,
                true,
            ),
        ],
        ..Default::default()
    };

    let file = FileDescriptorProto {
        name: Some("orderhub/orderhub.proto".to_string()),
        package: Some("orderhub".to_string()),
        message_type: vec![
            order_item,
            payment_info,
            create_order_request,
            order_response,
            get_order_request,
            track_order_request,
            order_status_update,
            batch_order_response,
            order_process_request,
            order_process_response,
        ],
        enum_type: vec![order_status, process_action],
        service: vec![service],
        syntax: Some("proto3".to_string()),
        ..Default::default()
    };

    FileDescriptorSet { file: vec![file] }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Only rerun if proto files change
    println!("cargo:rerun-if-changed=proto/orderhub/orderhub.proto");
    println!("cargo:rerun-if-changed=build.rs");

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_fds(file_descriptor_set())?;
    Ok(())
}
