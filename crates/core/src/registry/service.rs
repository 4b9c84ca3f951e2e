//! Registry validation and document reference checks.

use chrono::{DateTime, Datelike, Utc};
use uuid::Uuid;

use hivedrive_shared::types::{BranchId, CustomerId, SupplierId, UserId, VehicleId};

use crate::registry::error::RegistryError;
use crate::registry::types::{
    CreateCustomerInput, CreateSupplierInput, CreateVehicleInput, Customer, Supplier, Vehicle,
};

/// Oldest model year accepted for a vehicle.
pub const MIN_VEHICLE_YEAR: i32 = 1900;

/// Stateless registry rules.
pub struct RegistryService;

impl RegistryService {
    /// Validates and builds a customer.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` for a blank name.
    pub fn new_customer(
        input: &CreateCustomerInput,
        branch_id: BranchId,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<Customer, RegistryError> {
        Ok(Customer {
            id: CustomerId::new(),
            name: required(&input.name, "name")?,
            phone: optional(input.phone.as_deref()),
            email: optional(input.email.as_deref()),
            customer_type: input.customer_type,
            branch_id,
            created_by,
            created_at: now,
        })
    }

    /// Validates and builds a vehicle. The caller checks the owner exists.
    ///
    /// Plates are stored trimmed and upper-cased so uniqueness ignores case.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` for a blank plate and `InvalidYear` for a
    /// model year before 1900 or after next year.
    pub fn new_vehicle(
        input: &CreateVehicleInput,
        now: DateTime<Utc>,
    ) -> Result<Vehicle, RegistryError> {
        let latest = now.year().saturating_add(1);
        if let Some(year) = input.year.filter(|y| !(MIN_VEHICLE_YEAR..=latest).contains(y)) {
            return Err(RegistryError::InvalidYear(year));
        }

        Ok(Vehicle {
            id: VehicleId::new(),
            customer_id: input.customer_id,
            plate_number: required(&input.plate_number, "plate_number")?.to_uppercase(),
            chassis_number: optional(input.chassis_number.as_deref()),
            brand: optional(input.brand.as_deref()),
            model: optional(input.model.as_deref()),
            year: input.year,
            color: optional(input.color.as_deref()),
            created_at: now,
        })
    }

    /// Validates and builds a supplier.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` for a blank name.
    pub fn new_supplier(
        input: &CreateSupplierInput,
        now: DateTime<Utc>,
    ) -> Result<Supplier, RegistryError> {
        Ok(Supplier {
            id: SupplierId::new(),
            name: required(&input.name, "name")?,
            phone: optional(input.phone.as_deref()),
            email: optional(input.email.as_deref()),
            address: optional(input.address.as_deref()),
            created_at: now,
        })
    }

    /// Checks the customer and vehicle a document names.
    ///
    /// `customer` and `vehicle` are the records loaded for the IDs, if any.
    ///
    /// # Errors
    ///
    /// Returns `CustomerNotFound`, `VehicleNotFound`, or `VehicleNotOwned`
    /// when the vehicle belongs to someone else.
    pub fn check_parties(
        customer_id: Uuid,
        vehicle_id: Uuid,
        customer: Option<&Customer>,
        vehicle: Option<&Vehicle>,
    ) -> Result<(), RegistryError> {
        let customer_id = CustomerId::from_uuid(customer_id);
        let vehicle_id = VehicleId::from_uuid(vehicle_id);
        customer.ok_or(RegistryError::CustomerNotFound(customer_id))?;
        let vehicle = vehicle.ok_or(RegistryError::VehicleNotFound(vehicle_id))?;
        if vehicle.customer_id != customer_id {
            return Err(RegistryError::VehicleNotOwned {
                vehicle_id,
                customer_id,
            });
        }
        Ok(())
    }

    /// Checks the supplier a purchase order names.
    ///
    /// # Errors
    ///
    /// Returns `SupplierNotFound` when `supplier` is `None`.
    pub fn check_supplier(
        supplier_id: Uuid,
        supplier: Option<&Supplier>,
    ) -> Result<(), RegistryError> {
        supplier
            .map(|_| ())
            .ok_or(RegistryError::SupplierNotFound(SupplierId::from_uuid(supplier_id)))
    }
}

fn required(value: &str, field: &'static str) -> Result<String, RegistryError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RegistryError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::types::CustomerType;

    fn customer() -> Customer {
        RegistryService::new_customer(
            &CreateCustomerInput {
                name: " Omar Hassan ".to_string(),
                phone: Some("0100 000 0000".to_string()),
                email: Some(" ".to_string()),
                customer_type: CustomerType::Individual,
            },
            BranchId::new(),
            UserId::new(),
            Utc::now(),
        )
        .unwrap()
    }

    fn vehicle_input(customer_id: CustomerId) -> CreateVehicleInput {
        CreateVehicleInput {
            customer_id,
            plate_number: " abc 123 ".to_string(),
            chassis_number: None,
            brand: Some("Toyota".to_string()),
            model: Some("Corolla".to_string()),
            year: Some(2019),
            color: None,
        }
    }

    #[test]
    fn test_new_customer_trims_fields() {
        let customer = customer();
        assert_eq!(customer.name, "Omar Hassan");
        assert_eq!(customer.email, None);
        assert_eq!(customer.phone.as_deref(), Some("0100 000 0000"));
    }

    #[test]
    fn test_blank_names_rejected() {
        let input = CreateSupplierInput {
            name: "  ".to_string(),
            phone: None,
            email: None,
            address: None,
        };
        assert_eq!(
            RegistryService::new_supplier(&input, Utc::now()),
            Err(RegistryError::MissingField("name"))
        );
    }

    #[test]
    fn test_plate_is_normalized() {
        let vehicle =
            RegistryService::new_vehicle(&vehicle_input(CustomerId::new()), Utc::now()).unwrap();
        assert_eq!(vehicle.plate_number, "ABC 123");
    }

    #[test]
    fn test_vehicle_year_range() {
        let mut input = vehicle_input(CustomerId::new());
        input.year = Some(1850);
        assert_eq!(
            RegistryService::new_vehicle(&input, Utc::now()),
            Err(RegistryError::InvalidYear(1850))
        );
    }

    #[test]
    fn test_parties_must_exist_and_match() {
        let owner = customer();
        let vehicle = RegistryService::new_vehicle(&vehicle_input(owner.id), Utc::now()).unwrap();
        let (customer_id, vehicle_id) = (owner.id.into_inner(), vehicle.id.into_inner());

        assert!(
            RegistryService::check_parties(customer_id, vehicle_id, Some(&owner), Some(&vehicle))
                .is_ok()
        );
        assert_eq!(
            RegistryService::check_parties(customer_id, vehicle_id, None, Some(&vehicle)),
            Err(RegistryError::CustomerNotFound(owner.id))
        );
        assert_eq!(
            RegistryService::check_parties(customer_id, vehicle_id, Some(&owner), None),
            Err(RegistryError::VehicleNotFound(vehicle.id))
        );

        let stranger = customer();
        assert!(matches!(
            RegistryService::check_parties(
                stranger.id.into_inner(),
                vehicle_id,
                Some(&stranger),
                Some(&vehicle)
            ),
            Err(RegistryError::VehicleNotOwned { .. })
        ));
    }

    #[test]
    fn test_missing_supplier() {
        let id = Uuid::now_v7();
        assert_eq!(
            RegistryService::check_supplier(id, None),
            Err(RegistryError::SupplierNotFound(SupplierId::from_uuid(id)))
        );
    }
}
