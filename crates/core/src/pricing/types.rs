//! Pricing domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use hivedrive_shared::types::money::round_currency;
use hivedrive_shared::types::{LineItemId, PartId};

/// Tax percent applied when a document leaves it unset.
pub const DEFAULT_TAX_PERCENT: Decimal = Decimal::from_parts(14, 0, 0, false, 0);

/// What a line item charges for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// A catalogue part.
    Part,
    /// Technician time.
    Labor,
    /// A packaged service.
    Service,
    /// Anything else.
    Other,
}

impl ItemType {
    /// Returns the stored name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Part => "part",
            Self::Labor => "labor",
            Self::Service => "service",
            Self::Other => "other",
        }
    }

    /// Parses a stored name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "part" => Some(Self::Part),
            "labor" => Some(Self::Labor),
            "service" => Some(Self::Service),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A line item as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemInput {
    /// What the line charges for.
    pub item_type: ItemType,
    /// Catalogue part, for `part` lines.
    #[serde(default)]
    pub part_id: Option<PartId>,
    /// Description shown on the document.
    pub description: String,
    /// English description, when the primary one is Arabic.
    #[serde(default)]
    pub description_en: Option<String>,
    /// Quantity; fractional for labour hours.
    pub quantity: Decimal,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Line discount in percent.
    #[serde(default)]
    pub discount_percent: Decimal,
}

/// A priced line item owned by one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Item ID.
    pub id: LineItemId,
    /// What the line charges for.
    pub item_type: ItemType,
    /// Catalogue part, for `part` lines.
    pub part_id: Option<PartId>,
    /// Description shown on the document.
    pub description: String,
    /// English description.
    pub description_en: Option<String>,
    /// Quantity.
    pub quantity: Decimal,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Line discount in percent.
    pub discount_percent: Decimal,
    /// Line total at currency precision.
    pub total: Decimal,
    /// Position within the document.
    pub sort_order: i32,
}

/// Document-level discount and tax rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Percentages {
    /// Discount in percent of the subtotal.
    pub discount_percent: Decimal,
    /// Tax in percent of the discounted subtotal.
    pub tax_percent: Decimal,
}

impl Percentages {
    /// Creates percentages, applying defaults for unset values.
    #[must_use]
    pub fn new(discount_percent: Option<Decimal>, tax_percent: Option<Decimal>) -> Self {
        Self::with_default_tax(discount_percent, tax_percent, DEFAULT_TAX_PERCENT)
    }

    /// Like [`Percentages::new`] with a configured default tax.
    #[must_use]
    pub fn with_default_tax(
        discount_percent: Option<Decimal>,
        tax_percent: Option<Decimal>,
        default_tax: Decimal,
    ) -> Self {
        Self {
            discount_percent: discount_percent.unwrap_or(Decimal::ZERO),
            tax_percent: tax_percent.unwrap_or(default_tax),
        }
    }
}

impl Default for Percentages {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// The four amounts derived from a document's items and percentages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of line totals.
    pub subtotal: Decimal,
    /// Document discount.
    pub discount_amount: Decimal,
    /// Tax on the discounted subtotal.
    pub tax_amount: Decimal,
    /// Amount due.
    pub total: Decimal,
}

impl Totals {
    /// All-zero totals.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            subtotal: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }

    /// Subtotal after the document discount.
    #[must_use]
    pub fn taxable(&self) -> Decimal {
        self.subtotal - self.discount_amount
    }

    /// The persisted representation: every field at currency precision.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            subtotal: round_currency(self.subtotal),
            discount_amount: round_currency(self.discount_amount),
            tax_amount: round_currency(self.tax_amount),
            total: round_currency(self.total),
        }
    }
}
