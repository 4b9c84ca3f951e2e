//! Registry error types.

use thiserror::Error;

use hivedrive_shared::AppError;
use hivedrive_shared::types::{CustomerId, SupplierId, VehicleId};

/// Errors raised by registry records and references to them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A required text field is blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Model year outside the accepted range.
    #[error("Vehicle year {0} is out of range")]
    InvalidYear(i32),

    /// The customer does not exist.
    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    /// The vehicle does not exist.
    #[error("Vehicle not found: {0}")]
    VehicleNotFound(VehicleId),

    /// The supplier does not exist.
    #[error("Supplier not found: {0}")]
    SupplierNotFound(SupplierId),

    /// The vehicle belongs to another customer.
    #[error("Vehicle {vehicle_id} does not belong to customer {customer_id}")]
    VehicleNotOwned {
        /// Vehicle referenced.
        vehicle_id: VehicleId,
        /// Customer referenced.
        customer_id: CustomerId,
    },
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::CustomerNotFound(id) => Self::not_found("Customer", id),
            RegistryError::VehicleNotFound(id) => Self::not_found("Vehicle", id),
            RegistryError::SupplierNotFound(id) => Self::not_found("Supplier", id),
            other => Self::Validation(other.to_string()),
        }
    }
}
