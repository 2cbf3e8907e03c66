//! Document repositories
//!
//! One adapter backs all four transaction-document aggregates and both
//! payment ledgers. Aggregate writes (header plus lines, and the settled
//! bill plus its auto payment) run inside a single transaction: either the
//! whole aggregate lands or none of it does. Cross-aggregate sequences are
//! intentionally NOT wrapped here; the lifecycle layer owns those semantics.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use core_kernel::{
    AnalyticalAccountId, BudgetId, Currency, InvoiceId, Money, PartyId, PaymentId, PortError,
    ProductId, PurchaseOrderId, SalesOrderId, VendorBillId,
};
use domain_documents::ports::{
    BillPaymentPort, InvoicePaymentPort, InvoicePort, PurchaseOrderPort, SalesOrderPort,
    VendorBillPort,
};
use domain_documents::{
    BillPayment, CustomerInvoice, DocumentLine, DocumentStatus, InvoicePayment, PaymentMode,
    PaymentStatus, PurchaseOrder, SalesOrder, VendorBill,
};

use crate::error::{corrupt, storage_err};

/// PostgreSQL adapter for the document domain ports
#[derive(Debug, Clone)]
pub struct PgDocumentRepository {
    pool: PgPool,
}

impl PgDocumentRepository {
    /// Creates a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct LineRow {
    id: Uuid,
    product_id: Uuid,
    quantity: Decimal,
    unit_price: Decimal,
    subtotal: Decimal,
    analytical_account_id: Option<Uuid>,
    budget_id: Option<Uuid>,
}

fn line_from_row(row: LineRow, currency: Currency) -> DocumentLine {
    DocumentLine {
        id: row.id,
        product_id: ProductId::from(row.product_id),
        quantity: row.quantity,
        unit_price: Money::new(row.unit_price, currency),
        subtotal: Money::new(row.subtotal, currency),
        analytical_account_id: row.analytical_account_id.map(AnalyticalAccountId::from),
        budget_id: row.budget_id.map(BudgetId::from),
    }
}

fn parse_currency(value: &str) -> Result<Currency, PortError> {
    value.parse().map_err(|_| corrupt("currency", value))
}

fn parse_status(value: &str) -> Result<DocumentStatus, PortError> {
    value.parse().map_err(|_| corrupt("document status", value))
}

#[derive(sqlx::FromRow)]
struct PurchaseOrderRow {
    id: Uuid,
    order_number: String,
    vendor_id: Uuid,
    order_date: NaiveDate,
    expected_delivery_date: Option<NaiveDate>,
    currency: String,
    total_amount: Decimal,
    status: String,
    analytical_account_id: Option<Uuid>,
    notes: Option<String>,
    is_archived: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn purchase_order_from_row(
    row: PurchaseOrderRow,
    lines: Vec<LineRow>,
) -> Result<PurchaseOrder, PortError> {
    let currency = parse_currency(&row.currency)?;
    let status = parse_status(&row.status)?;

    let mut order = PurchaseOrder::new(PartyId::from(row.vendor_id), row.order_date, currency);
    order.id = PurchaseOrderId::from(row.id);
    order.order_number = row.order_number;
    order.expected_delivery_date = row.expected_delivery_date;
    order.total_amount = Money::new(row.total_amount, currency);
    order.status = status;
    order.analytical_account_id = row.analytical_account_id.map(AnalyticalAccountId::from);
    order.notes = row.notes;
    order.lines = lines
        .into_iter()
        .map(|l| line_from_row(l, currency))
        .collect();
    order.is_archived = row.is_archived;
    order.created_at = row.created_at;
    order.updated_at = row.updated_at;
    order.take_events();

    Ok(order)
}

#[derive(sqlx::FromRow)]
struct SalesOrderRow {
    id: Uuid,
    order_number: String,
    customer_id: Uuid,
    order_date: NaiveDate,
    currency: String,
    total_amount: Decimal,
    status: String,
    analytical_account_id: Option<Uuid>,
    is_archived: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn sales_order_from_row(row: SalesOrderRow, lines: Vec<LineRow>) -> Result<SalesOrder, PortError> {
    let currency = parse_currency(&row.currency)?;
    let status = parse_status(&row.status)?;

    let mut order = SalesOrder::new(PartyId::from(row.customer_id), row.order_date, currency);
    order.id = SalesOrderId::from(row.id);
    order.order_number = row.order_number;
    order.total_amount = Money::new(row.total_amount, currency);
    order.status = status;
    order.analytical_account_id = row.analytical_account_id.map(AnalyticalAccountId::from);
    order.lines = lines
        .into_iter()
        .map(|l| line_from_row(l, currency))
        .collect();
    order.is_archived = row.is_archived;
    order.created_at = row.created_at;
    order.updated_at = row.updated_at;
    order.take_events();

    Ok(order)
}

#[derive(sqlx::FromRow)]
struct VendorBillRow {
    id: Uuid,
    bill_number: String,
    vendor_id: Uuid,
    purchase_order_id: Option<Uuid>,
    bill_date: NaiveDate,
    due_date: Option<NaiveDate>,
    currency: String,
    total_amount: Decimal,
    paid_amount: Decimal,
    status: String,
    analytical_account_id: Option<Uuid>,
    is_archived: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn vendor_bill_from_row(row: VendorBillRow, lines: Vec<LineRow>) -> Result<VendorBill, PortError> {
    let currency = parse_currency(&row.currency)?;
    let status = parse_status(&row.status)?;

    let mut bill = VendorBill::new(PartyId::from(row.vendor_id), row.bill_date, currency);
    bill.id = VendorBillId::from(row.id);
    bill.bill_number = row.bill_number;
    bill.purchase_order_id = row.purchase_order_id.map(PurchaseOrderId::from);
    bill.due_date = row.due_date;
    bill.total_amount = Money::new(row.total_amount, currency);
    bill.paid_amount = Money::new(row.paid_amount, currency);
    bill.status = status;
    bill.analytical_account_id = row.analytical_account_id.map(AnalyticalAccountId::from);
    bill.lines = lines
        .into_iter()
        .map(|l| line_from_row(l, currency))
        .collect();
    bill.is_archived = row.is_archived;
    bill.created_at = row.created_at;
    bill.updated_at = row.updated_at;
    bill.take_events();

    Ok(bill)
}

#[derive(sqlx::FromRow)]
struct InvoiceRow {
    id: Uuid,
    invoice_number: String,
    customer_id: Uuid,
    sales_order_id: Option<Uuid>,
    invoice_date: NaiveDate,
    due_date: NaiveDate,
    currency: String,
    total_amount: Decimal,
    paid_amount: Decimal,
    status: String,
    analytical_account_id: Option<Uuid>,
    is_archived: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn invoice_from_row(row: InvoiceRow, lines: Vec<LineRow>) -> Result<CustomerInvoice, PortError> {
    let currency = parse_currency(&row.currency)?;
    let status = parse_status(&row.status)?;

    let mut invoice =
        CustomerInvoice::new(PartyId::from(row.customer_id), row.invoice_date, currency);
    invoice.id = InvoiceId::from(row.id);
    invoice.invoice_number = row.invoice_number;
    invoice.sales_order_id = row.sales_order_id.map(SalesOrderId::from);
    invoice.due_date = row.due_date;
    invoice.total_amount = Money::new(row.total_amount, currency);
    invoice.paid_amount = Money::new(row.paid_amount, currency);
    invoice.status = status;
    invoice.analytical_account_id = row.analytical_account_id.map(AnalyticalAccountId::from);
    invoice.lines = lines
        .into_iter()
        .map(|l| line_from_row(l, currency))
        .collect();
    invoice.is_archived = row.is_archived;
    invoice.created_at = row.created_at;
    invoice.updated_at = row.updated_at;
    invoice.take_events();

    Ok(invoice)
}

// ============================================================================
// Line persistence helpers
// ============================================================================

async fn insert_lines(
    tx: &mut Transaction<'_, Postgres>,
    table: &str,
    fk_column: &str,
    document_id: Uuid,
    lines: &[DocumentLine],
) -> Result<(), sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO {table} (
            id, {fk_column}, product_id, quantity, unit_price, subtotal,
            analytical_account_id, budget_id
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#
    );

    for line in lines {
        sqlx::query(&sql)
            .bind(line.id)
            .bind(document_id)
            .bind(*line.product_id.as_uuid())
            .bind(line.quantity)
            .bind(line.unit_price.amount())
            .bind(line.subtotal.amount())
            .bind(line.analytical_account_id.map(|a| *a.as_uuid()))
            .bind(line.budget_id.map(|b| *b.as_uuid()))
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}

async fn replace_lines(
    tx: &mut Transaction<'_, Postgres>,
    table: &str,
    fk_column: &str,
    document_id: Uuid,
    lines: &[DocumentLine],
) -> Result<(), sqlx::Error> {
    sqlx::query(&format!("DELETE FROM {table} WHERE {fk_column} = $1"))
        .bind(document_id)
        .execute(&mut **tx)
        .await?;
    insert_lines(tx, table, fk_column, document_id, lines).await
}

async fn fetch_lines(
    pool: &PgPool,
    table: &str,
    fk_column: &str,
    document_id: Uuid,
) -> Result<Vec<LineRow>, PortError> {
    sqlx::query_as::<_, LineRow>(&format!(
        r#"
        SELECT id, product_id, quantity, unit_price, subtotal,
               analytical_account_id, budget_id
        FROM {table}
        WHERE {fk_column} = $1
        "#
    ))
    .bind(document_id)
    .fetch_all(pool)
    .await
    .map_err(storage_err)
}

// ============================================================================
// Purchase orders
// ============================================================================

const SELECT_PURCHASE_ORDER: &str = r#"
    SELECT id, order_number, vendor_id, order_date, expected_delivery_date,
           currency, total_amount, status, analytical_account_id, notes,
           is_archived, created_at, updated_at
    FROM purchase_orders
"#;

#[async_trait]
impl PurchaseOrderPort for PgDocumentRepository {
    async fn get(&self, id: PurchaseOrderId) -> Result<PurchaseOrder, PortError> {
        let row =
            sqlx::query_as::<_, PurchaseOrderRow>(&format!("{} WHERE id = $1", SELECT_PURCHASE_ORDER))
                .bind(*id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(storage_err)?
                .ok_or_else(|| PortError::not_found("PurchaseOrder", id))?;

        let lines = fetch_lines(&self.pool, "purchase_order_lines", "purchase_order_id", row.id)
            .await?;
        purchase_order_from_row(row, lines)
    }

    async fn list(&self) -> Result<Vec<PurchaseOrder>, PortError> {
        let rows = sqlx::query_as::<_, PurchaseOrderRow>(&format!(
            "{} ORDER BY created_at DESC",
            SELECT_PURCHASE_ORDER
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let lines =
                fetch_lines(&self.pool, "purchase_order_lines", "purchase_order_id", row.id)
                    .await?;
            orders.push(purchase_order_from_row(row, lines)?);
        }
        Ok(orders)
    }

    async fn insert(&self, order: PurchaseOrder) -> Result<(), PortError> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        sqlx::query(
            r#"
            INSERT INTO purchase_orders (
                id, order_number, vendor_id, order_date, expected_delivery_date,
                currency, total_amount, status, analytical_account_id, notes,
                is_archived, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(*order.id.as_uuid())
        .bind(&order.order_number)
        .bind(*order.vendor_id.as_uuid())
        .bind(order.order_date)
        .bind(order.expected_delivery_date)
        .bind(order.currency.code())
        .bind(order.total_amount.amount())
        .bind(order.status.as_str())
        .bind(order.analytical_account_id.map(|a| *a.as_uuid()))
        .bind(&order.notes)
        .bind(order.is_archived)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;

        insert_lines(
            &mut tx,
            "purchase_order_lines",
            "purchase_order_id",
            *order.id.as_uuid(),
            &order.lines,
        )
        .await
        .map_err(storage_err)?;

        tx.commit().await.map_err(storage_err)?;
        Ok(())
    }

    async fn save(&self, order: &PurchaseOrder) -> Result<(), PortError> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        let result = sqlx::query(
            r#"
            UPDATE purchase_orders SET
                vendor_id = $2, total_amount = $3, status = $4,
                analytical_account_id = $5, notes = $6, is_archived = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(*order.id.as_uuid())
        .bind(*order.vendor_id.as_uuid())
        .bind(order.total_amount.amount())
        .bind(order.status.as_str())
        .bind(order.analytical_account_id.map(|a| *a.as_uuid()))
        .bind(&order.notes)
        .bind(order.is_archived)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("PurchaseOrder", order.id));
        }

        replace_lines(
            &mut tx,
            "purchase_order_lines",
            "purchase_order_id",
            *order.id.as_uuid(),
            &order.lines,
        )
        .await
        .map_err(storage_err)?;

        tx.commit().await.map_err(storage_err)?;
        Ok(())
    }
}

// ============================================================================
// Sales orders
// ============================================================================

const SELECT_SALES_ORDER: &str = r#"
    SELECT id, order_number, customer_id, order_date, currency, total_amount,
           status, analytical_account_id, is_archived, created_at, updated_at
    FROM sales_orders
"#;

#[async_trait]
impl SalesOrderPort for PgDocumentRepository {
    async fn get(&self, id: SalesOrderId) -> Result<SalesOrder, PortError> {
        let row =
            sqlx::query_as::<_, SalesOrderRow>(&format!("{} WHERE id = $1", SELECT_SALES_ORDER))
                .bind(*id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(storage_err)?
                .ok_or_else(|| PortError::not_found("SalesOrder", id))?;

        let lines =
            fetch_lines(&self.pool, "sales_order_lines", "sales_order_id", row.id).await?;
        sales_order_from_row(row, lines)
    }

    async fn list(&self) -> Result<Vec<SalesOrder>, PortError> {
        let rows = sqlx::query_as::<_, SalesOrderRow>(&format!(
            "{} ORDER BY created_at DESC",
            SELECT_SALES_ORDER
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let lines =
                fetch_lines(&self.pool, "sales_order_lines", "sales_order_id", row.id).await?;
            orders.push(sales_order_from_row(row, lines)?);
        }
        Ok(orders)
    }

    async fn insert(&self, order: SalesOrder) -> Result<(), PortError> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        sqlx::query(
            r#"
            INSERT INTO sales_orders (
                id, order_number, customer_id, order_date, currency, total_amount,
                status, analytical_account_id, is_archived, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(*order.id.as_uuid())
        .bind(&order.order_number)
        .bind(*order.customer_id.as_uuid())
        .bind(order.order_date)
        .bind(order.currency.code())
        .bind(order.total_amount.amount())
        .bind(order.status.as_str())
        .bind(order.analytical_account_id.map(|a| *a.as_uuid()))
        .bind(order.is_archived)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;

        insert_lines(
            &mut tx,
            "sales_order_lines",
            "sales_order_id",
            *order.id.as_uuid(),
            &order.lines,
        )
        .await
        .map_err(storage_err)?;

        tx.commit().await.map_err(storage_err)?;
        Ok(())
    }

    async fn save(&self, order: &SalesOrder) -> Result<(), PortError> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        let result = sqlx::query(
            r#"
            UPDATE sales_orders SET
                customer_id = $2, total_amount = $3, status = $4,
                analytical_account_id = $5, is_archived = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(*order.id.as_uuid())
        .bind(*order.customer_id.as_uuid())
        .bind(order.total_amount.amount())
        .bind(order.status.as_str())
        .bind(order.analytical_account_id.map(|a| *a.as_uuid()))
        .bind(order.is_archived)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("SalesOrder", order.id));
        }

        replace_lines(
            &mut tx,
            "sales_order_lines",
            "sales_order_id",
            *order.id.as_uuid(),
            &order.lines,
        )
        .await
        .map_err(storage_err)?;

        tx.commit().await.map_err(storage_err)?;
        Ok(())
    }
}

// ============================================================================
// Vendor bills
// ============================================================================

const SELECT_VENDOR_BILL: &str = r#"
    SELECT id, bill_number, vendor_id, purchase_order_id, bill_date, due_date,
           currency, total_amount, paid_amount, status, analytical_account_id,
           is_archived, created_at, updated_at
    FROM vendor_bills
"#;

async fn insert_bill_tx(
    tx: &mut Transaction<'_, Postgres>,
    bill: &VendorBill,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO vendor_bills (
            id, bill_number, vendor_id, purchase_order_id, bill_date, due_date,
            currency, total_amount, paid_amount, status, analytical_account_id,
            is_archived, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
    )
    .bind(*bill.id.as_uuid())
    .bind(&bill.bill_number)
    .bind(*bill.vendor_id.as_uuid())
    .bind(bill.purchase_order_id.map(|o| *o.as_uuid()))
    .bind(bill.bill_date)
    .bind(bill.due_date)
    .bind(bill.currency.code())
    .bind(bill.total_amount.amount())
    .bind(bill.paid_amount.amount())
    .bind(bill.status.as_str())
    .bind(bill.analytical_account_id.map(|a| *a.as_uuid()))
    .bind(bill.is_archived)
    .bind(bill.created_at)
    .bind(bill.updated_at)
    .execute(&mut **tx)
    .await?;

    insert_lines(
        tx,
        "vendor_bill_lines",
        "vendor_bill_id",
        *bill.id.as_uuid(),
        &bill.lines,
    )
    .await
}

async fn insert_bill_payment_tx(
    tx: &mut Transaction<'_, Postgres>,
    payment: &BillPayment,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO bill_payments (
            id, payment_number, vendor_bill_id, payment_date, currency, amount,
            mode, status, reference, notes, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(*payment.id.as_uuid())
    .bind(&payment.payment_number)
    .bind(*payment.bill_id.as_uuid())
    .bind(payment.payment_date)
    .bind(payment.amount.currency().code())
    .bind(payment.amount.amount())
    .bind(payment.mode.as_str())
    .bind(payment.status.as_str())
    .bind(&payment.reference)
    .bind(&payment.notes)
    .bind(payment.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[async_trait]
impl VendorBillPort for PgDocumentRepository {
    async fn get(&self, id: VendorBillId) -> Result<VendorBill, PortError> {
        let row =
            sqlx::query_as::<_, VendorBillRow>(&format!("{} WHERE id = $1", SELECT_VENDOR_BILL))
                .bind(*id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(storage_err)?
                .ok_or_else(|| PortError::not_found("VendorBill", id))?;

        let lines =
            fetch_lines(&self.pool, "vendor_bill_lines", "vendor_bill_id", row.id).await?;
        vendor_bill_from_row(row, lines)
    }

    async fn list(&self) -> Result<Vec<VendorBill>, PortError> {
        let rows = sqlx::query_as::<_, VendorBillRow>(&format!(
            "{} ORDER BY created_at DESC",
            SELECT_VENDOR_BILL
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        let mut bills = Vec::with_capacity(rows.len());
        for row in rows {
            let lines =
                fetch_lines(&self.pool, "vendor_bill_lines", "vendor_bill_id", row.id).await?;
            bills.push(vendor_bill_from_row(row, lines)?);
        }
        Ok(bills)
    }

    async fn insert(&self, bill: VendorBill) -> Result<(), PortError> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;
        insert_bill_tx(&mut tx, &bill).await.map_err(storage_err)?;
        tx.commit().await.map_err(storage_err)?;
        Ok(())
    }

    async fn insert_settled(
        &self,
        bill: VendorBill,
        payment: BillPayment,
    ) -> Result<(), PortError> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;
        insert_bill_tx(&mut tx, &bill).await.map_err(storage_err)?;
        insert_bill_payment_tx(&mut tx, &payment)
            .await
            .map_err(storage_err)?;
        tx.commit().await.map_err(storage_err)?;
        Ok(())
    }

    async fn save(&self, bill: &VendorBill) -> Result<(), PortError> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        let result = sqlx::query(
            r#"
            UPDATE vendor_bills SET
                total_amount = $2, paid_amount = $3, status = $4,
                analytical_account_id = $5, is_archived = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(*bill.id.as_uuid())
        .bind(bill.total_amount.amount())
        .bind(bill.paid_amount.amount())
        .bind(bill.status.as_str())
        .bind(bill.analytical_account_id.map(|a| *a.as_uuid()))
        .bind(bill.is_archived)
        .bind(bill.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("VendorBill", bill.id));
        }

        replace_lines(
            &mut tx,
            "vendor_bill_lines",
            "vendor_bill_id",
            *bill.id.as_uuid(),
            &bill.lines,
        )
        .await
        .map_err(storage_err)?;

        tx.commit().await.map_err(storage_err)?;
        Ok(())
    }
}

// ============================================================================
// Customer invoices
// ============================================================================

const SELECT_INVOICE: &str = r#"
    SELECT id, invoice_number, customer_id, sales_order_id, invoice_date, due_date,
           currency, total_amount, paid_amount, status, analytical_account_id,
           is_archived, created_at, updated_at
    FROM customer_invoices
"#;

#[async_trait]
impl InvoicePort for PgDocumentRepository {
    async fn get(&self, id: InvoiceId) -> Result<CustomerInvoice, PortError> {
        let row = sqlx::query_as::<_, InvoiceRow>(&format!("{} WHERE id = $1", SELECT_INVOICE))
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?
            .ok_or_else(|| PortError::not_found("CustomerInvoice", id))?;

        let lines =
            fetch_lines(&self.pool, "customer_invoice_lines", "customer_invoice_id", row.id)
                .await?;
        invoice_from_row(row, lines)
    }

    async fn list(&self) -> Result<Vec<CustomerInvoice>, PortError> {
        let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
            "{} ORDER BY created_at DESC",
            SELECT_INVOICE
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        let mut invoices = Vec::with_capacity(rows.len());
        for row in rows {
            let lines = fetch_lines(
                &self.pool,
                "customer_invoice_lines",
                "customer_invoice_id",
                row.id,
            )
            .await?;
            invoices.push(invoice_from_row(row, lines)?);
        }
        Ok(invoices)
    }

    async fn insert(&self, invoice: CustomerInvoice) -> Result<(), PortError> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        sqlx::query(
            r#"
            INSERT INTO customer_invoices (
                id, invoice_number, customer_id, sales_order_id, invoice_date, due_date,
                currency, total_amount, paid_amount, status, analytical_account_id,
                is_archived, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(*invoice.id.as_uuid())
        .bind(&invoice.invoice_number)
        .bind(*invoice.customer_id.as_uuid())
        .bind(invoice.sales_order_id.map(|o| *o.as_uuid()))
        .bind(invoice.invoice_date)
        .bind(invoice.due_date)
        .bind(invoice.currency.code())
        .bind(invoice.total_amount.amount())
        .bind(invoice.paid_amount.amount())
        .bind(invoice.status.as_str())
        .bind(invoice.analytical_account_id.map(|a| *a.as_uuid()))
        .bind(invoice.is_archived)
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;

        insert_lines(
            &mut tx,
            "customer_invoice_lines",
            "customer_invoice_id",
            *invoice.id.as_uuid(),
            &invoice.lines,
        )
        .await
        .map_err(storage_err)?;

        tx.commit().await.map_err(storage_err)?;
        Ok(())
    }

    async fn save(&self, invoice: &CustomerInvoice) -> Result<(), PortError> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        let result = sqlx::query(
            r#"
            UPDATE customer_invoices SET
                total_amount = $2, paid_amount = $3, status = $4,
                analytical_account_id = $5, is_archived = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(*invoice.id.as_uuid())
        .bind(invoice.total_amount.amount())
        .bind(invoice.paid_amount.amount())
        .bind(invoice.status.as_str())
        .bind(invoice.analytical_account_id.map(|a| *a.as_uuid()))
        .bind(invoice.is_archived)
        .bind(invoice.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("CustomerInvoice", invoice.id));
        }

        replace_lines(
            &mut tx,
            "customer_invoice_lines",
            "customer_invoice_id",
            *invoice.id.as_uuid(),
            &invoice.lines,
        )
        .await
        .map_err(storage_err)?;

        tx.commit().await.map_err(storage_err)?;
        Ok(())
    }
}

// ============================================================================
// Payment ledgers
// ============================================================================

#[derive(sqlx::FromRow)]
struct BillPaymentRow {
    id: Uuid,
    payment_number: String,
    vendor_bill_id: Uuid,
    payment_date: NaiveDate,
    currency: String,
    amount: Decimal,
    mode: String,
    status: String,
    reference: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

fn bill_payment_from_row(row: BillPaymentRow) -> Result<BillPayment, PortError> {
    let currency = parse_currency(&row.currency)?;
    let mode: PaymentMode = row.mode.parse().map_err(|_| corrupt("payment mode", &row.mode))?;
    let status: PaymentStatus = row
        .status
        .parse()
        .map_err(|_| corrupt("payment status", &row.status))?;

    let mut payment = BillPayment::completed(
        VendorBillId::from(row.vendor_bill_id),
        Money::new(row.amount, currency),
        mode,
    );
    payment.id = PaymentId::from(row.id);
    payment.payment_number = row.payment_number;
    payment.payment_date = row.payment_date;
    payment.status = status;
    payment.reference = row.reference;
    payment.notes = row.notes;
    payment.created_at = row.created_at;
    Ok(payment)
}

#[derive(sqlx::FromRow)]
struct InvoicePaymentRow {
    id: Uuid,
    payment_number: String,
    customer_invoice_id: Uuid,
    payment_date: NaiveDate,
    currency: String,
    amount: Decimal,
    mode: String,
    status: String,
    reference: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

fn invoice_payment_from_row(row: InvoicePaymentRow) -> Result<InvoicePayment, PortError> {
    let currency = parse_currency(&row.currency)?;
    let mode: PaymentMode = row.mode.parse().map_err(|_| corrupt("payment mode", &row.mode))?;
    let status: PaymentStatus = row
        .status
        .parse()
        .map_err(|_| corrupt("payment status", &row.status))?;

    let mut payment = InvoicePayment::completed(
        InvoiceId::from(row.customer_invoice_id),
        Money::new(row.amount, currency),
        mode,
    );
    payment.id = PaymentId::from(row.id);
    payment.payment_number = row.payment_number;
    payment.payment_date = row.payment_date;
    payment.status = status;
    payment.reference = row.reference;
    payment.notes = row.notes;
    payment.created_at = row.created_at;
    Ok(payment)
}

#[async_trait]
impl BillPaymentPort for PgDocumentRepository {
    async fn insert(&self, payment: BillPayment) -> Result<(), PortError> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;
        insert_bill_payment_tx(&mut tx, &payment)
            .await
            .map_err(storage_err)?;
        tx.commit().await.map_err(storage_err)?;
        Ok(())
    }

    async fn completed_total_for(&self, bill_id: VendorBillId) -> Result<Decimal, PortError> {
        let total: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM bill_payments
            WHERE vendor_bill_id = $1 AND status = 'completed'
            "#,
        )
        .bind(*bill_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(total)
    }

    async fn list_for(&self, bill_id: VendorBillId) -> Result<Vec<BillPayment>, PortError> {
        let rows = sqlx::query_as::<_, BillPaymentRow>(
            r#"
            SELECT id, payment_number, vendor_bill_id, payment_date, currency, amount,
                   mode, status, reference, notes, created_at
            FROM bill_payments
            WHERE vendor_bill_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(*bill_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        rows.into_iter().map(bill_payment_from_row).collect()
    }
}

#[async_trait]
impl InvoicePaymentPort for PgDocumentRepository {
    async fn insert(&self, payment: InvoicePayment) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO invoice_payments (
                id, payment_number, customer_invoice_id, payment_date, currency, amount,
                mode, status, reference, notes, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(*payment.id.as_uuid())
        .bind(&payment.payment_number)
        .bind(*payment.invoice_id.as_uuid())
        .bind(payment.payment_date)
        .bind(payment.amount.currency().code())
        .bind(payment.amount.amount())
        .bind(payment.mode.as_str())
        .bind(payment.status.as_str())
        .bind(&payment.reference)
        .bind(&payment.notes)
        .bind(payment.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }

    async fn completed_total_for(&self, invoice_id: InvoiceId) -> Result<Decimal, PortError> {
        let total: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM invoice_payments
            WHERE customer_invoice_id = $1 AND status = 'completed'
            "#,
        )
        .bind(*invoice_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(total)
    }

    async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<InvoicePayment>, PortError> {
        let row = sqlx::query_as::<_, InvoicePaymentRow>(
            r#"
            SELECT id, payment_number, customer_invoice_id, payment_date, currency, amount,
                   mode, status, reference, notes, created_at
            FROM invoice_payments
            WHERE reference = $1 AND status = 'completed'
            LIMIT 1
            "#,
        )
        .bind(reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        row.map(invoice_payment_from_row).transpose()
    }

    async fn list_for(&self, invoice_id: InvoiceId) -> Result<Vec<InvoicePayment>, PortError> {
        let rows = sqlx::query_as::<_, InvoicePaymentRow>(
            r#"
            SELECT id, payment_number, customer_invoice_id, payment_date, currency, amount,
                   mode, status, reference, notes, created_at
            FROM invoice_payments
            WHERE customer_invoice_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(*invoice_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        rows.into_iter().map(invoice_payment_from_row).collect()
    }
}
