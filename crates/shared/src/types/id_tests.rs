use super::*;
use std::collections::HashSet;
use std::str::FromStr;
use uuid::Uuid;

#[test]
fn test_typed_id_from_uuid() {
    let uuid = Uuid::new_v4();
    let id = PartId::from_uuid(uuid);
    assert_eq!(id.into_inner(), uuid);
}

#[test]
fn test_new_ids_are_unique() {
    let ids: HashSet<QuotationId> = (0..100).map(|_| QuotationId::new()).collect();
    assert_eq!(ids.len(), 100);
}

#[test]
fn test_new_ids_are_time_ordered() {
    let first = WorkOrderId::new();
    let second = WorkOrderId::new();
    assert!(first.into_inner() < second.into_inner());
}

#[test]
fn test_typed_id_display() {
    let uuid = Uuid::new_v4();
    let id = BranchId::from_uuid(uuid);
    assert_eq!(format!("{id}"), uuid.to_string());
}

#[test]
fn test_typed_id_from_str() {
    let uuid = Uuid::new_v4();
    let id = InvoiceId::from_str(&uuid.to_string()).unwrap();
    assert_eq!(id.into_inner(), uuid);
}

#[test]
fn test_typed_id_from_str_error() {
    assert!(UserId::from_str("invalid").is_err());
}

#[test]
fn test_typed_id_serializes_transparently() {
    let uuid = Uuid::new_v4();
    let json = serde_json::to_string(&PaymentId::from_uuid(uuid)).unwrap();
    assert_eq!(json, format!("\"{uuid}\""));
}
