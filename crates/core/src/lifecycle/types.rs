//! Document statuses and the events that move them.
//!
//! Each status and event has a stored lowercase name. Transition rules live
//! in [`crate::lifecycle::machine`].

use serde::{Deserialize, Serialize};

/// Generates `as_str`, `parse`, `ALL`, and `Display` for a name-mapped enum.
macro_rules! named_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Every value, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Returns the stored name.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            /// Parses a stored name.
            #[must_use]
            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

pub(crate) use named_enum;

/// Quotation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotationStatus {
    /// Being prepared; items may change.
    Draft,
    /// Sent to the customer; items may still change.
    Pending,
    /// Customer accepted.
    Approved,
    /// Customer declined.
    Rejected,
    /// Turned into a work order.
    Converted,
    /// Validity date passed without a decision.
    Expired,
}

named_enum!(QuotationStatus {
    Draft => "draft",
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
    Converted => "converted",
    Expired => "expired",
});

impl QuotationStatus {
    /// Returns true if items and percentages may change.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::Pending)
    }

    /// Returns true if no event leaves this status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Converted | Self::Expired)
    }
}

/// Quotation events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotationEvent {
    /// Send to the customer.
    Submit,
    /// Customer accepts.
    Approve,
    /// Customer declines.
    Reject,
    /// Validity lapses.
    Expire,
    /// Turn into a work order.
    Convert,
}

named_enum!(QuotationEvent {
    Submit => "submit",
    Approve => "approve",
    Reject => "reject",
    Expire => "expire",
    Convert => "convert",
});

/// Work order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    /// Accepted, not started.
    Pending,
    /// A technician is working on the vehicle.
    InProgress,
    /// Paused, e.g. waiting for parts.
    OnHold,
    /// Work finished.
    Completed,
    /// Vehicle handed back.
    Delivered,
    /// Abandoned.
    Cancelled,
}

named_enum!(WorkOrderStatus {
    Pending => "pending",
    InProgress => "in_progress",
    OnHold => "on_hold",
    Completed => "completed",
    Delivered => "delivered",
    Cancelled => "cancelled",
});

impl WorkOrderStatus {
    /// Returns true if items and percentages may change.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        matches!(self, Self::Pending | Self::InProgress | Self::OnHold)
    }

    /// Returns true if an invoice may be raised.
    #[must_use]
    pub const fn is_invoiceable(&self) -> bool {
        matches!(self, Self::Completed | Self::Delivered)
    }

    /// Returns true if parts may be issued from stock.
    #[must_use]
    pub const fn accepts_parts(&self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }

    /// Returns true if no event leaves this status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

/// Work order events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderEvent {
    /// Begin work.
    Start,
    /// Pause work.
    Hold,
    /// Resume paused work.
    Resume,
    /// Finish work.
    Complete,
    /// Hand the vehicle back.
    Deliver,
    /// Abandon the order.
    Cancel,
}

named_enum!(WorkOrderEvent {
    Start => "start",
    Hold => "hold",
    Resume => "resume",
    Complete => "complete",
    Deliver => "deliver",
    Cancel => "cancel",
});

/// Invoice status, derived from payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Nothing paid yet.
    Issued,
    /// Some but not all paid.
    Partial,
    /// Fully paid.
    Paid,
}

named_enum!(InvoiceStatus {
    Issued => "issued",
    Partial => "partial",
    Paid => "paid",
});

impl InvoiceStatus {
    /// Returns true if no event leaves this status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid)
    }
}

/// Invoice events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceEvent {
    /// A payment that leaves a balance.
    PartialPayment,
    /// A payment that clears the balance.
    SettlingPayment,
}

named_enum!(InvoiceEvent {
    PartialPayment => "partial_payment",
    SettlingPayment => "settling_payment",
});

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash at the desk.
    Cash,
    /// Card terminal.
    Card,
    /// Bank transfer.
    BankTransfer,
    /// Cheque.
    Cheque,
}

named_enum!(PaymentMethod {
    Cash => "cash",
    Card => "card",
    BankTransfer => "bank_transfer",
    Cheque => "cheque",
});

/// Work order urgency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Regular queue.
    #[default]
    Normal,
    /// Ahead of the queue.
    High,
    /// Drop everything.
    Urgent,
}

named_enum!(Priority {
    Low => "low",
    Normal => "normal",
    High => "high",
    Urgent => "urgent",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for s in QuotationStatus::ALL {
            assert_eq!(QuotationStatus::parse(s.as_str()), Some(*s));
        }
        for s in WorkOrderStatus::ALL {
            assert_eq!(WorkOrderStatus::parse(s.as_str()), Some(*s));
        }
        for s in InvoiceStatus::ALL {
            assert_eq!(InvoiceStatus::parse(s.as_str()), Some(*s));
        }
        for m in PaymentMethod::ALL {
            assert_eq!(PaymentMethod::parse(m.as_str()), Some(*m));
        }
        assert_eq!(WorkOrderStatus::parse("done"), None);
    }

    #[test]
    fn test_serde_matches_stored_names() {
        let json = serde_json::to_string(&WorkOrderStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let json = serde_json::to_string(&PaymentMethod::BankTransfer).unwrap();
        assert_eq!(json, "\"bank_transfer\"");
    }

    #[test]
    fn test_editable_statuses() {
        assert!(QuotationStatus::Draft.is_editable());
        assert!(QuotationStatus::Pending.is_editable());
        assert!(!QuotationStatus::Approved.is_editable());
        assert!(!QuotationStatus::Converted.is_editable());

        assert!(WorkOrderStatus::InProgress.is_editable());
        assert!(!WorkOrderStatus::Completed.is_editable());
    }

    #[test]
    fn test_invoiceable_statuses() {
        assert!(WorkOrderStatus::Completed.is_invoiceable());
        assert!(WorkOrderStatus::Delivered.is_invoiceable());
        assert!(!WorkOrderStatus::InProgress.is_invoiceable());
        assert!(!WorkOrderStatus::Cancelled.is_invoiceable());
    }
}
