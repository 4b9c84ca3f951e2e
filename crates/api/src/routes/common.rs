//! Request bodies shared by the document routes.

use rust_decimal::Decimal;
use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use hivedrive_core::lifecycle::UpdateDocumentInput;
use hivedrive_core::pricing::{ItemType, LineItemInput};
use hivedrive_shared::types::{PageRequest, PartId};

use crate::amount;

/// One line of a quotation or work order.
#[derive(Debug, Deserialize, Validate)]
pub struct LineItemRequest {
    /// `part`, `labor`, `service`, or `other`.
    pub item_type: ItemType,
    /// Catalogue part, for part lines.
    pub part_id: Option<PartId>,
    /// Arabic description.
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    /// English description.
    #[validate(length(max = 500))]
    pub description_en: Option<String>,
    /// Quantity.
    #[serde(deserialize_with = "amount::deserialize")]
    pub quantity: Decimal,
    /// Price per unit.
    #[serde(deserialize_with = "amount::deserialize")]
    pub unit_price: Decimal,
    /// Line discount percent.
    #[serde(default, deserialize_with = "amount::deserialize_option")]
    pub discount_percent: Option<Decimal>,
}

impl From<LineItemRequest> for LineItemInput {
    fn from(line: LineItemRequest) -> Self {
        Self {
            item_type: line.item_type,
            part_id: line.part_id,
            description: line.description,
            description_en: line.description_en,
            quantity: line.quantity,
            unit_price: line.unit_price,
            discount_percent: line.discount_percent.unwrap_or(Decimal::ZERO),
        }
    }
}

pub(crate) fn line_inputs(lines: Vec<LineItemRequest>) -> Vec<LineItemInput> {
    lines.into_iter().map(LineItemInput::from).collect()
}

/// Body for editing a quotation or work order. Absent fields are kept.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateDocumentRequest {
    /// Replacement items.
    #[validate(nested)]
    pub items: Option<Vec<LineItemRequest>>,
    /// Document discount percent.
    #[serde(default, deserialize_with = "amount::deserialize_option")]
    pub discount_percent: Option<Decimal>,
    /// Tax percent.
    #[serde(default, deserialize_with = "amount::deserialize_option")]
    pub tax_percent: Option<Decimal>,
    /// Free-text notes.
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl From<UpdateDocumentRequest> for UpdateDocumentInput {
    fn from(request: UpdateDocumentRequest) -> Self {
        Self {
            items: request.items.map(line_inputs),
            discount_percent: request.discount_percent,
            tax_percent: request.tax_percent,
            notes: request.notes,
        }
    }
}

/// Body for firing a status event.
#[derive(Debug, Deserialize)]
pub struct TransitionRequest<E> {
    /// Event name, e.g. `approve`.
    pub event: E,
}

impl<E> Validate for TransitionRequest<E> {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

/// Paging parameters as they appear in a query string.
pub(crate) fn page(page: Option<u32>, per_page: Option<u32>) -> PageRequest {
    let default = PageRequest::default();
    PageRequest::new(
        page.unwrap_or(default.page),
        per_page.unwrap_or(default.per_page),
    )
}
