//! Customers, their vehicles, and parts suppliers.
//!
//! Documents refer to these records by ID; stores check the references
//! exist inside the same unit of work that creates the document.
//!
//! # Modules
//!
//! - `types` - Records, inputs, and list queries
//! - `error` - Registry errors
//! - `service` - Validation and reference checks

pub mod error;
pub mod service;
pub mod types;

pub use error::RegistryError;
pub use service::RegistryService;
pub use types::{
    CreateCustomerInput, CreateSupplierInput, CreateVehicleInput, Customer, CustomerFilter,
    CustomerQuery, CustomerType, RegistrySort, Supplier, SupplierQuery, Vehicle, VehicleFilter,
    VehicleQuery,
};
