//! Registry domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hivedrive_shared::types::{BranchId, CustomerId, QuerySpec, SupplierId, UserId, VehicleId};

use crate::lifecycle::types::named_enum;

/// Kind of customer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerType {
    /// A private person.
    #[default]
    Individual,
    /// A business or fleet.
    Company,
}

named_enum!(CustomerType {
    Individual => "individual",
    Company => "company",
});

/// A workshop customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer ID.
    pub id: CustomerId,
    /// Full or company name.
    pub name: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Person or company.
    pub customer_type: CustomerType,
    /// Branch that registered the customer.
    pub branch_id: BranchId,
    /// Registering user.
    pub created_by: UserId,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// A vehicle owned by one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Vehicle ID.
    pub id: VehicleId,
    /// Owner.
    pub customer_id: CustomerId,
    /// Licence plate, unique.
    pub plate_number: String,
    /// Chassis (VIN) number.
    pub chassis_number: Option<String>,
    /// Make.
    pub brand: Option<String>,
    /// Model.
    pub model: Option<String>,
    /// Model year.
    pub year: Option<i32>,
    /// Paint colour.
    pub color: Option<String>,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// A parts supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    /// Supplier ID.
    pub id: SupplierId,
    /// Trading name.
    pub name: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// Input for registering a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCustomerInput {
    /// Name.
    pub name: String,
    /// Phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// Email.
    #[serde(default)]
    pub email: Option<String>,
    /// Person or company.
    #[serde(default)]
    pub customer_type: CustomerType,
}

/// Input for registering a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateVehicleInput {
    /// Owner; must exist.
    pub customer_id: CustomerId,
    /// Licence plate.
    pub plate_number: String,
    /// Chassis number.
    #[serde(default)]
    pub chassis_number: Option<String>,
    /// Make.
    #[serde(default)]
    pub brand: Option<String>,
    /// Model.
    #[serde(default)]
    pub model: Option<String>,
    /// Model year.
    #[serde(default)]
    pub year: Option<i32>,
    /// Colour.
    #[serde(default)]
    pub color: Option<String>,
}

/// Input for registering a supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSupplierInput {
    /// Name.
    pub name: String,
    /// Phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// Email.
    #[serde(default)]
    pub email: Option<String>,
    /// Address.
    #[serde(default)]
    pub address: Option<String>,
}

/// Equality filters for customers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerFilter {
    /// Person or company.
    pub customer_type: Option<CustomerType>,
}

/// Equality filters for vehicles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleFilter {
    /// Owner.
    pub customer_id: Option<CustomerId>,
}

/// Sort fields shared by the registries. `Name` sorts vehicles by plate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrySort {
    /// By name.
    #[default]
    Name,
    /// By registration time.
    CreatedAt,
}

/// Customer list query. Search matches name, phone, and email.
pub type CustomerQuery = QuerySpec<CustomerFilter, RegistrySort>;

/// Vehicle list query. Search matches plate and chassis number.
pub type VehicleQuery = QuerySpec<VehicleFilter, RegistrySort>;

/// Supplier list query. Search matches name and phone.
pub type SupplierQuery = QuerySpec<(), RegistrySort>;
