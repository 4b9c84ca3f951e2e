//! Initial database migration.
//!
//! Creates the catalogue, stock, document, treasury, purchasing, and
//! numbering tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: CATALOGUE & STOCK
        // ============================================================
        db.execute_unprepared(PARTS_SQL).await?;
        db.execute_unprepared(INVENTORY_SQL).await?;
        db.execute_unprepared(STOCK_MOVEMENTS_SQL).await?;

        // ============================================================
        // PART 2: DOCUMENTS
        // ============================================================
        db.execute_unprepared(QUOTATIONS_SQL).await?;
        db.execute_unprepared(WORK_ORDERS_SQL).await?;
        db.execute_unprepared(INVOICES_SQL).await?;

        // ============================================================
        // PART 3: TREASURY
        // ============================================================
        db.execute_unprepared(TREASURY_SQL).await?;
        db.execute_unprepared(EXPENSES_SQL).await?;

        // ============================================================
        // PART 4: PURCHASING & NUMBERING
        // ============================================================
        db.execute_unprepared(PURCHASE_ORDERS_SQL).await?;
        db.execute_unprepared(DOCUMENT_SEQUENCES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const PARTS_SQL: &str = r"
CREATE TABLE parts (
    id              UUID PRIMARY KEY,
    sku             VARCHAR(64) NOT NULL UNIQUE,
    name            VARCHAR(255) NOT NULL,
    name_en         VARCHAR(255),
    cost_price      NUMERIC(14,2) NOT NULL DEFAULT 0 CHECK (cost_price >= 0),
    sell_price      NUMERIC(14,2) NOT NULL DEFAULT 0 CHECK (sell_price >= 0),
    min_quantity    INTEGER NOT NULL DEFAULT 0 CHECK (min_quantity >= 0),
    supplier_id     UUID,
    is_active       BOOLEAN NOT NULL DEFAULT TRUE,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_parts_supplier ON parts(supplier_id);
";

const INVENTORY_SQL: &str = r"
CREATE TABLE inventory (
    part_id             UUID NOT NULL REFERENCES parts(id),
    branch_id           UUID NOT NULL,
    quantity            INTEGER NOT NULL DEFAULT 0 CHECK (quantity >= 0),
    reserved_quantity   INTEGER NOT NULL DEFAULT 0 CHECK (reserved_quantity >= 0),
    updated_at          TIMESTAMPTZ,
    PRIMARY KEY (part_id, branch_id)
);

CREATE INDEX idx_inventory_branch ON inventory(branch_id);
";

const STOCK_MOVEMENTS_SQL: &str = r"
CREATE TABLE stock_movements (
    id              UUID PRIMARY KEY,
    part_id         UUID NOT NULL REFERENCES parts(id),
    branch_id       UUID NOT NULL,
    movement_type   VARCHAR(32) NOT NULL CHECK (movement_type IN (
        'purchase_in', 'return_in', 'adjustment_in', 'initial',
        'work_order_out', 'sale_out', 'adjustment_out'
    )),
    quantity        INTEGER NOT NULL CHECK (quantity > 0),
    unit_cost       NUMERIC(14,2) NOT NULL DEFAULT 0,
    reference_type  VARCHAR(32) NOT NULL,
    reference_id    UUID,
    notes           TEXT,
    created_by      UUID NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_stock_movements_part_branch
    ON stock_movements(part_id, branch_id, created_at DESC);
CREATE INDEX idx_stock_movements_reference ON stock_movements(reference_id);
";

const QUOTATIONS_SQL: &str = r"
CREATE TABLE quotations (
    id                  UUID PRIMARY KEY,
    quotation_number    VARCHAR(32) NOT NULL UNIQUE,
    customer_id         UUID NOT NULL,
    vehicle_id          UUID NOT NULL,
    branch_id           UUID NOT NULL,
    status              VARCHAR(16) NOT NULL DEFAULT 'draft' CHECK (status IN (
        'draft', 'pending', 'approved', 'rejected', 'converted', 'expired'
    )),
    subtotal            NUMERIC(14,2) NOT NULL DEFAULT 0,
    discount_percent    NUMERIC(5,2) NOT NULL DEFAULT 0 CHECK (discount_percent BETWEEN 0 AND 100),
    discount_amount     NUMERIC(14,2) NOT NULL DEFAULT 0,
    tax_percent         NUMERIC(5,2) NOT NULL DEFAULT 14 CHECK (tax_percent BETWEEN 0 AND 100),
    tax_amount          NUMERIC(14,2) NOT NULL DEFAULT 0,
    total               NUMERIC(14,2) NOT NULL DEFAULT 0,
    notes               TEXT,
    valid_until         DATE,
    created_by          UUID NOT NULL,
    approved_by         UUID,
    approved_at         TIMESTAMPTZ,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_quotations_status ON quotations(branch_id, status);
CREATE INDEX idx_quotations_customer ON quotations(customer_id);

CREATE TABLE quotation_items (
    id                  UUID PRIMARY KEY,
    quotation_id        UUID NOT NULL REFERENCES quotations(id) ON DELETE CASCADE,
    item_type           VARCHAR(16) NOT NULL
                        CHECK (item_type IN ('part', 'labor', 'service', 'other')),
    part_id             UUID REFERENCES parts(id),
    description         TEXT NOT NULL,
    description_en      TEXT,
    quantity            NUMERIC(12,3) NOT NULL CHECK (quantity > 0),
    unit_price          NUMERIC(14,2) NOT NULL CHECK (unit_price >= 0),
    discount_percent    NUMERIC(5,2) NOT NULL DEFAULT 0 CHECK (discount_percent BETWEEN 0 AND 100),
    total               NUMERIC(14,2) NOT NULL,
    sort_order          INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX idx_quotation_items_parent ON quotation_items(quotation_id, sort_order);
";

const WORK_ORDERS_SQL: &str = r"
CREATE TABLE work_orders (
    id                  UUID PRIMARY KEY,
    order_number        VARCHAR(32) NOT NULL UNIQUE,
    quotation_id        UUID UNIQUE REFERENCES quotations(id),
    customer_id         UUID NOT NULL,
    vehicle_id          UUID NOT NULL,
    branch_id           UUID NOT NULL,
    status              VARCHAR(16) NOT NULL DEFAULT 'pending' CHECK (status IN (
        'pending', 'in_progress', 'on_hold', 'completed', 'delivered', 'cancelled'
    )),
    priority            VARCHAR(16) NOT NULL DEFAULT 'normal' CHECK (priority IN (
        'low', 'normal', 'high', 'urgent'
    )),
    subtotal            NUMERIC(14,2) NOT NULL DEFAULT 0,
    discount_percent    NUMERIC(5,2) NOT NULL DEFAULT 0 CHECK (discount_percent BETWEEN 0 AND 100),
    discount_amount     NUMERIC(14,2) NOT NULL DEFAULT 0,
    tax_percent         NUMERIC(5,2) NOT NULL DEFAULT 14 CHECK (tax_percent BETWEEN 0 AND 100),
    tax_amount          NUMERIC(14,2) NOT NULL DEFAULT 0,
    total               NUMERIC(14,2) NOT NULL DEFAULT 0,
    complaint           TEXT,
    mileage_in          INTEGER,
    expected_completion DATE,
    actual_completion   TIMESTAMPTZ,
    delivered_at        TIMESTAMPTZ,
    delivered_by        UUID,
    created_by          UUID NOT NULL,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_work_orders_status ON work_orders(branch_id, status);
CREATE INDEX idx_work_orders_vehicle ON work_orders(vehicle_id);

CREATE TABLE work_order_items (
    id                  UUID PRIMARY KEY,
    work_order_id       UUID NOT NULL REFERENCES work_orders(id) ON DELETE CASCADE,
    item_type           VARCHAR(16) NOT NULL
                        CHECK (item_type IN ('part', 'labor', 'service', 'other')),
    part_id             UUID REFERENCES parts(id),
    description         TEXT NOT NULL,
    description_en      TEXT,
    quantity            NUMERIC(12,3) NOT NULL CHECK (quantity > 0),
    unit_price          NUMERIC(14,2) NOT NULL CHECK (unit_price >= 0),
    discount_percent    NUMERIC(5,2) NOT NULL DEFAULT 0 CHECK (discount_percent BETWEEN 0 AND 100),
    total               NUMERIC(14,2) NOT NULL,
    sort_order          INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX idx_work_order_items_parent ON work_order_items(work_order_id, sort_order);
";

const INVOICES_SQL: &str = r"
CREATE TABLE invoices (
    id                  UUID PRIMARY KEY,
    invoice_number      VARCHAR(32) NOT NULL UNIQUE,
    work_order_id       UUID NOT NULL UNIQUE REFERENCES work_orders(id),
    customer_id         UUID NOT NULL,
    branch_id           UUID NOT NULL,
    status              VARCHAR(16) NOT NULL DEFAULT 'issued' CHECK (status IN (
        'issued', 'partial', 'paid'
    )),
    subtotal            NUMERIC(14,2) NOT NULL,
    discount_percent    NUMERIC(5,2) NOT NULL,
    discount_amount     NUMERIC(14,2) NOT NULL,
    tax_percent         NUMERIC(5,2) NOT NULL,
    tax_amount          NUMERIC(14,2) NOT NULL,
    total               NUMERIC(14,2) NOT NULL,
    paid_amount         NUMERIC(14,2) NOT NULL DEFAULT 0,
    remaining_amount    NUMERIC(14,2) NOT NULL,
    created_by          UUID NOT NULL,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_invoices_status ON invoices(branch_id, status);

CREATE TABLE payments (
    id                  UUID PRIMARY KEY,
    invoice_id          UUID NOT NULL REFERENCES invoices(id),
    amount              NUMERIC(14,2) NOT NULL CHECK (amount > 0),
    payment_method      VARCHAR(16) NOT NULL CHECK (payment_method IN (
        'cash', 'card', 'bank_transfer', 'cheque'
    )),
    reference_number    VARCHAR(64),
    notes               TEXT,
    received_by         UUID NOT NULL,
    paid_at             TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_payments_invoice ON payments(invoice_id, paid_at);
";

const TREASURY_SQL: &str = r"
CREATE TABLE treasury (
    id                  UUID PRIMARY KEY,
    branch_id           UUID NOT NULL UNIQUE,
    current_balance     NUMERIC(14,2) NOT NULL DEFAULT 0,
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE treasury_transactions (
    id                  UUID PRIMARY KEY,
    treasury_id         UUID NOT NULL REFERENCES treasury(id),
    branch_id           UUID NOT NULL,
    transaction_type    VARCHAR(16) NOT NULL CHECK (transaction_type IN ('income', 'expense')),
    category            VARCHAR(64) NOT NULL,
    amount              NUMERIC(14,2) NOT NULL CHECK (amount > 0),
    balance_after       NUMERIC(14,2) NOT NULL,
    reference_type      VARCHAR(32) NOT NULL,
    reference_id        UUID,
    description         TEXT,
    transaction_date    DATE NOT NULL,
    created_by          UUID NOT NULL,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_treasury_transactions_day ON treasury_transactions(branch_id, transaction_date);
";

const EXPENSES_SQL: &str = r"
CREATE TABLE expenses (
    id                  UUID PRIMARY KEY,
    expense_number      VARCHAR(32) NOT NULL UNIQUE,
    branch_id           UUID NOT NULL,
    category            VARCHAR(64) NOT NULL,
    amount              NUMERIC(14,2) NOT NULL CHECK (amount > 0),
    description         TEXT,
    expense_date        DATE NOT NULL,
    paid_by             UUID NOT NULL,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_expenses_branch_date ON expenses(branch_id, expense_date);
";

const PURCHASE_ORDERS_SQL: &str = r"
CREATE TABLE purchase_orders (
    id                  UUID PRIMARY KEY,
    order_number        VARCHAR(32) NOT NULL UNIQUE,
    supplier_id         UUID NOT NULL,
    branch_id           UUID NOT NULL,
    status              VARCHAR(16) NOT NULL DEFAULT 'pending' CHECK (status IN (
        'pending', 'approved', 'ordered', 'received', 'cancelled'
    )),
    total               NUMERIC(14,2) NOT NULL DEFAULT 0,
    notes               TEXT,
    expected_date       DATE,
    received_at         TIMESTAMPTZ,
    approved_by         UUID,
    created_by          UUID NOT NULL,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE purchase_order_items (
    id                  UUID PRIMARY KEY,
    purchase_order_id   UUID NOT NULL REFERENCES purchase_orders(id) ON DELETE CASCADE,
    part_id             UUID NOT NULL REFERENCES parts(id),
    quantity            INTEGER NOT NULL CHECK (quantity > 0),
    unit_price          NUMERIC(14,2) NOT NULL CHECK (unit_price >= 0),
    total               NUMERIC(14,2) NOT NULL,
    sort_order          INTEGER NOT NULL DEFAULT 0
);
";

const DOCUMENT_SEQUENCES_SQL: &str = r"
CREATE TABLE document_sequences (
    prefix      VARCHAR(8) NOT NULL,
    seq_date    DATE NOT NULL,
    last_value  INTEGER NOT NULL,
    PRIMARY KEY (prefix, seq_date)
);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS document_sequences;
DROP TABLE IF EXISTS purchase_order_items;
DROP TABLE IF EXISTS purchase_orders;
DROP TABLE IF EXISTS expenses;
DROP TABLE IF EXISTS treasury_transactions;
DROP TABLE IF EXISTS treasury;
DROP TABLE IF EXISTS payments;
DROP TABLE IF EXISTS invoices;
DROP TABLE IF EXISTS work_order_items;
DROP TABLE IF EXISTS work_orders;
DROP TABLE IF EXISTS quotation_items;
DROP TABLE IF EXISTS quotations;
DROP TABLE IF EXISTS stock_movements;
DROP TABLE IF EXISTS inventory;
DROP TABLE IF EXISTS parts;
";
