//! Customer, vehicle, and supplier registries.
//!
//! Document rows written before this migration keep their bare IDs; the
//! reference checks run in the stores when a document is created.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(CUSTOMERS_SQL).await?;
        db.execute_unprepared(VEHICLES_SQL).await?;
        db.execute_unprepared(SUPPLIERS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const CUSTOMERS_SQL: &str = r"
CREATE TABLE customers (
    id              UUID PRIMARY KEY,
    name            VARCHAR(255) NOT NULL,
    phone           VARCHAR(32),
    email           VARCHAR(255),
    customer_type   VARCHAR(16) NOT NULL DEFAULT 'individual',
    branch_id       UUID NOT NULL,
    created_by      UUID NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_customers_name ON customers(name);
CREATE INDEX idx_customers_phone ON customers(phone);
";

const VEHICLES_SQL: &str = r"
CREATE TABLE vehicles (
    id              UUID PRIMARY KEY,
    customer_id     UUID NOT NULL REFERENCES customers(id),
    plate_number    VARCHAR(32) NOT NULL UNIQUE,
    chassis_number  VARCHAR(64),
    brand           VARCHAR(64),
    model           VARCHAR(64),
    year            INTEGER,
    color           VARCHAR(32),
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_vehicles_customer ON vehicles(customer_id);
";

const SUPPLIERS_SQL: &str = r"
CREATE TABLE suppliers (
    id              UUID PRIMARY KEY,
    name            VARCHAR(255) NOT NULL,
    phone           VARCHAR(32),
    email           VARCHAR(255),
    address         TEXT,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_suppliers_name ON suppliers(name);
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS suppliers;
DROP TABLE IF EXISTS vehicles;
DROP TABLE IF EXISTS customers;
";
