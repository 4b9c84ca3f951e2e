//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `PartId` where a `BranchId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(UserId, "Unique identifier for a staff user.");
typed_id!(BranchId, "Unique identifier for a workshop branch.");
typed_id!(PartId, "Unique identifier for a catalogue part.");
typed_id!(QuotationId, "Unique identifier for a quotation.");
typed_id!(WorkOrderId, "Unique identifier for a work order.");
typed_id!(InvoiceId, "Unique identifier for an invoice.");
typed_id!(PaymentId, "Unique identifier for a payment against an invoice.");
typed_id!(LineItemId, "Unique identifier for a document line item.");
typed_id!(StockMovementId, "Unique identifier for a stock movement.");
typed_id!(TreasuryId, "Unique identifier for a branch treasury.");
typed_id!(
    TreasuryTransactionId,
    "Unique identifier for a treasury transaction."
);
typed_id!(ExpenseId, "Unique identifier for an expense.");
typed_id!(PurchaseOrderId, "Unique identifier for a purchase order.");
typed_id!(CustomerId, "Unique identifier for a customer.");
typed_id!(VehicleId, "Unique identifier for a customer's vehicle.");
typed_id!(SupplierId, "Unique identifier for a parts supplier.");

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
