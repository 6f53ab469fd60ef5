//! Order lifecycle as the admin sees it: trigger notifications, status
//! transitions, the event stream and the dashboard numbers.
//!
//! These tests need no running services.

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use futures::StreamExt;
use reqwest::StatusCode;
use rust_decimal::Decimal;

use forno_admin::error::AppError;
use forno_admin::realtime::{OrderEvent, OrderEventHub, OrderOperation};
use forno_core::{DashboardStats, Order, OrderId, OrderStatus};
use forno_integration_tests::money;

/// Payload exactly as `json_build_object` renders it for an orders row.
fn trigger_payload(operation: &str, id: OrderId, status: OrderStatus, total: &str) -> String {
    format!(
        r#"{{"operation" : "{operation}", "order_id" : "{id}", "status" : "{status}", "total" : {total}}}"#
    )
}

fn order(total: &str, status: OrderStatus) -> Order {
    let now = Utc::now();
    Order {
        id: OrderId::generate(),
        customer_name: "Ana Souza".to_string(),
        customer_phone: "11987654321".to_string(),
        customer_address: "Rua Direita, 250".to_string(),
        payment_method: "Pix".to_string(),
        items: Vec::new(),
        subtotal: money(total),
        delivery_fee: Decimal::ZERO,
        total: money(total),
        status,
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn test_trigger_payloads_parse_for_every_operation() {
    let id = OrderId::generate();

    for (operation, expected) in [
        ("INSERT", OrderOperation::Insert),
        ("UPDATE", OrderOperation::Update),
        ("DELETE", OrderOperation::Delete),
    ] {
        let payload = trigger_payload(operation, id, OrderStatus::Pending, "71.00");
        let event = OrderEvent::from_payload(&payload).unwrap();
        assert_eq!(event.operation, expected);
        assert_eq!(event.order_id, id);
        assert_eq!(event.total, money("71.00"));
    }
}

#[test]
fn test_lifecycle_moves_one_step_at_a_time() {
    let mut status = OrderStatus::Pending;
    let mut visited = vec![status];

    while let Some(next) = status.next() {
        assert!(status.can_transition_to(next));
        // No skipping ahead and no going back
        for other in OrderStatus::ALL {
            if other != next {
                assert!(!status.can_transition_to(other), "{status} -> {other}");
            }
        }
        status = next;
        visited.push(status);
    }

    assert_eq!(visited, OrderStatus::ALL);
    assert!(status.is_terminal());
}

#[test]
fn test_rejected_transitions_map_to_conflict() {
    let err = AppError::InvalidTransition {
        from: OrderStatus::Pending,
        to: OrderStatus::Delivered,
    };
    assert_eq!(err.status(), StatusCode::CONFLICT);
    assert_eq!(
        AppError::NotFound("order".to_string()).status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_dashboard_stream_sees_lifecycle_in_order() {
    let hub = OrderEventHub::new();
    let mut dashboard = Box::pin(hub.stream());
    let id = OrderId::generate();

    let mut status = OrderStatus::Pending;
    let mut operation = "INSERT";
    loop {
        let payload = trigger_payload(operation, id, status, "58.00");
        hub.publish(OrderEvent::from_payload(&payload).unwrap());
        operation = "UPDATE";
        match status.next() {
            Some(next) => status = next,
            None => break,
        }
    }

    let seen: Vec<OrderEvent> = dashboard
        .by_ref()
        .take(OrderStatus::ALL.len())
        .collect()
        .await;
    let statuses: Vec<OrderStatus> = seen.iter().map(|e| e.status).collect();
    assert_eq!(statuses, OrderStatus::ALL);
    assert!(seen.iter().all(|e| e.order_id == id));
    assert_eq!(seen.first().map(|e| e.operation), Some(OrderOperation::Insert));
}

#[test]
fn test_dashboard_numbers_for_a_day() {
    let orders = [
        order("71.00", OrderStatus::Delivered),
        order("21.50", OrderStatus::Preparing),
        order("90.26", OrderStatus::Preparing),
        order("45.00", OrderStatus::Pending),
    ];

    let stats = DashboardStats::from_orders(&orders);
    assert_eq!(stats.order_count, 4);
    assert_eq!(stats.revenue, money("227.76"));
    assert_eq!(stats.preparing_count, 2);
    assert_eq!(stats.average_ticket, money("56.94"));
}
