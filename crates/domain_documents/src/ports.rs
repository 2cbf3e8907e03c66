//! Document domain ports
//!
//! One repository interface per aggregate, plus payment-ledger read models.
//! [`VendorBillPort::insert_settled`] exists so the storage adapter can
//! write the auto-created bill, its lines, and the auto payment inside a
//! single transaction.

use async_trait::async_trait;
use rust_decimal::Decimal;

use core_kernel::{InvoiceId, PortError, PurchaseOrderId, SalesOrderId, VendorBillId};

use crate::customer_invoice::CustomerInvoice;
use crate::payment::{BillPayment, InvoicePayment};
use crate::purchase_order::PurchaseOrder;
use crate::sales_order::SalesOrder;
use crate::vendor_bill::VendorBill;

/// Repository interface for purchase orders
#[async_trait]
pub trait PurchaseOrderPort: Send + Sync {
    async fn get(&self, id: PurchaseOrderId) -> Result<PurchaseOrder, PortError>;
    async fn list(&self) -> Result<Vec<PurchaseOrder>, PortError>;
    async fn insert(&self, order: PurchaseOrder) -> Result<(), PortError>;
    async fn save(&self, order: &PurchaseOrder) -> Result<(), PortError>;
}

/// Repository interface for sales orders
#[async_trait]
pub trait SalesOrderPort: Send + Sync {
    async fn get(&self, id: SalesOrderId) -> Result<SalesOrder, PortError>;
    async fn list(&self) -> Result<Vec<SalesOrder>, PortError>;
    async fn insert(&self, order: SalesOrder) -> Result<(), PortError>;
    async fn save(&self, order: &SalesOrder) -> Result<(), PortError>;
}

/// Repository interface for vendor bills
#[async_trait]
pub trait VendorBillPort: Send + Sync {
    async fn get(&self, id: VendorBillId) -> Result<VendorBill, PortError>;
    async fn list(&self) -> Result<Vec<VendorBill>, PortError>;
    async fn insert(&self, bill: VendorBill) -> Result<(), PortError>;

    /// Inserts a settled bill together with its auto payment, atomically
    async fn insert_settled(
        &self,
        bill: VendorBill,
        payment: BillPayment,
    ) -> Result<(), PortError>;

    async fn save(&self, bill: &VendorBill) -> Result<(), PortError>;
}

/// Repository interface for customer invoices
#[async_trait]
pub trait InvoicePort: Send + Sync {
    async fn get(&self, id: InvoiceId) -> Result<CustomerInvoice, PortError>;
    async fn list(&self) -> Result<Vec<CustomerInvoice>, PortError>;
    async fn insert(&self, invoice: CustomerInvoice) -> Result<(), PortError>;
    async fn save(&self, invoice: &CustomerInvoice) -> Result<(), PortError>;
}

/// Payment ledger for vendor bills
#[async_trait]
pub trait BillPaymentPort: Send + Sync {
    async fn insert(&self, payment: BillPayment) -> Result<(), PortError>;

    /// Sum of completed payment amounts for the bill
    async fn completed_total_for(&self, bill_id: VendorBillId) -> Result<Decimal, PortError>;

    async fn list_for(&self, bill_id: VendorBillId) -> Result<Vec<BillPayment>, PortError>;
}

/// Payment ledger for customer invoices
#[async_trait]
pub trait InvoicePaymentPort: Send + Sync {
    async fn insert(&self, payment: InvoicePayment) -> Result<(), PortError>;

    /// Sum of completed payment amounts for the invoice
    async fn completed_total_for(&self, invoice_id: InvoiceId) -> Result<Decimal, PortError>;

    /// Finds a payment by its external reference (gateway payment id)
    async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<InvoicePayment>, PortError>;

    async fn list_for(&self, invoice_id: InvoiceId) -> Result<Vec<InvoicePayment>, PortError>;
}

/// In-memory adapters for testing without a database
///
/// [`mock::MockDocuments`] backs every document port from shared state and
/// also implements the budget domain's [`AccrualSourcePort`] by filtering
/// stored documents exactly the way the SQL adapter filters rows: line
/// account, accruing status, document date inside the window.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    use tokio::sync::RwLock;

    use core_kernel::{AnalyticalAccountId, DateRange};
    use domain_budget::ports::AccrualSourcePort;

    use crate::payment::PaymentStatus;

    /// Shared in-memory document store
    #[derive(Debug, Default)]
    pub struct MockDocuments {
        orders: RwLock<HashMap<PurchaseOrderId, PurchaseOrder>>,
        sales_orders: RwLock<HashMap<SalesOrderId, SalesOrder>>,
        bills: RwLock<HashMap<VendorBillId, VendorBill>>,
        invoices: RwLock<HashMap<InvoiceId, CustomerInvoice>>,
        bill_payments: RwLock<Vec<BillPayment>>,
        invoice_payments: RwLock<Vec<InvoicePayment>>,
    }

    impl MockDocuments {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        /// All stored bill payments, insertion order
        pub async fn bill_payments(&self) -> Vec<BillPayment> {
            self.bill_payments.read().await.clone()
        }

        /// All stored invoice payments, insertion order
        pub async fn invoice_payments(&self) -> Vec<InvoicePayment> {
            self.invoice_payments.read().await.clone()
        }
    }

    #[async_trait]
    impl PurchaseOrderPort for MockDocuments {
        async fn get(&self, id: PurchaseOrderId) -> Result<PurchaseOrder, PortError> {
            self.orders
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("PurchaseOrder", id))
        }

        async fn list(&self) -> Result<Vec<PurchaseOrder>, PortError> {
            Ok(self.orders.read().await.values().cloned().collect())
        }

        async fn insert(&self, order: PurchaseOrder) -> Result<(), PortError> {
            self.orders.write().await.insert(order.id, order);
            Ok(())
        }

        async fn save(&self, order: &PurchaseOrder) -> Result<(), PortError> {
            let mut orders = self.orders.write().await;
            if !orders.contains_key(&order.id) {
                return Err(PortError::not_found("PurchaseOrder", order.id));
            }
            orders.insert(order.id, order.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl SalesOrderPort for MockDocuments {
        async fn get(&self, id: SalesOrderId) -> Result<SalesOrder, PortError> {
            self.sales_orders
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("SalesOrder", id))
        }

        async fn list(&self) -> Result<Vec<SalesOrder>, PortError> {
            Ok(self.sales_orders.read().await.values().cloned().collect())
        }

        async fn insert(&self, order: SalesOrder) -> Result<(), PortError> {
            self.sales_orders.write().await.insert(order.id, order);
            Ok(())
        }

        async fn save(&self, order: &SalesOrder) -> Result<(), PortError> {
            let mut orders = self.sales_orders.write().await;
            if !orders.contains_key(&order.id) {
                return Err(PortError::not_found("SalesOrder", order.id));
            }
            orders.insert(order.id, order.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl VendorBillPort for MockDocuments {
        async fn get(&self, id: VendorBillId) -> Result<VendorBill, PortError> {
            self.bills
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("VendorBill", id))
        }

        async fn list(&self) -> Result<Vec<VendorBill>, PortError> {
            Ok(self.bills.read().await.values().cloned().collect())
        }

        async fn insert(&self, bill: VendorBill) -> Result<(), PortError> {
            self.bills.write().await.insert(bill.id, bill);
            Ok(())
        }

        async fn insert_settled(
            &self,
            bill: VendorBill,
            payment: BillPayment,
        ) -> Result<(), PortError> {
            // Both writes or neither, mirroring the SQL transaction.
            let mut bills = self.bills.write().await;
            let mut payments = self.bill_payments.write().await;
            bills.insert(bill.id, bill);
            payments.push(payment);
            Ok(())
        }

        async fn save(&self, bill: &VendorBill) -> Result<(), PortError> {
            let mut bills = self.bills.write().await;
            if !bills.contains_key(&bill.id) {
                return Err(PortError::not_found("VendorBill", bill.id));
            }
            bills.insert(bill.id, bill.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl InvoicePort for MockDocuments {
        async fn get(&self, id: InvoiceId) -> Result<CustomerInvoice, PortError> {
            self.invoices
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("CustomerInvoice", id))
        }

        async fn list(&self) -> Result<Vec<CustomerInvoice>, PortError> {
            Ok(self.invoices.read().await.values().cloned().collect())
        }

        async fn insert(&self, invoice: CustomerInvoice) -> Result<(), PortError> {
            self.invoices.write().await.insert(invoice.id, invoice);
            Ok(())
        }

        async fn save(&self, invoice: &CustomerInvoice) -> Result<(), PortError> {
            let mut invoices = self.invoices.write().await;
            if !invoices.contains_key(&invoice.id) {
                return Err(PortError::not_found("CustomerInvoice", invoice.id));
            }
            invoices.insert(invoice.id, invoice.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl BillPaymentPort for MockDocuments {
        async fn insert(&self, payment: BillPayment) -> Result<(), PortError> {
            self.bill_payments.write().await.push(payment);
            Ok(())
        }

        async fn completed_total_for(
            &self,
            bill_id: VendorBillId,
        ) -> Result<Decimal, PortError> {
            Ok(self
                .bill_payments
                .read()
                .await
                .iter()
                .filter(|p| p.bill_id == bill_id && p.status == PaymentStatus::Completed)
                .map(|p| p.amount.amount())
                .sum())
        }

        async fn list_for(&self, bill_id: VendorBillId) -> Result<Vec<BillPayment>, PortError> {
            Ok(self
                .bill_payments
                .read()
                .await
                .iter()
                .filter(|p| p.bill_id == bill_id)
                .cloned()
                .collect())
        }
    }

    #[async_trait]
    impl InvoicePaymentPort for MockDocuments {
        async fn insert(&self, payment: InvoicePayment) -> Result<(), PortError> {
            self.invoice_payments.write().await.push(payment);
            Ok(())
        }

        async fn completed_total_for(
            &self,
            invoice_id: InvoiceId,
        ) -> Result<Decimal, PortError> {
            Ok(self
                .invoice_payments
                .read()
                .await
                .iter()
                .filter(|p| p.invoice_id == invoice_id && p.status == PaymentStatus::Completed)
                .map(|p| p.amount.amount())
                .sum())
        }

        async fn find_by_reference(
            &self,
            reference: &str,
        ) -> Result<Option<InvoicePayment>, PortError> {
            Ok(self
                .invoice_payments
                .read()
                .await
                .iter()
                .find(|p| {
                    p.reference.as_deref() == Some(reference)
                        && p.status == PaymentStatus::Completed
                })
                .cloned())
        }

        async fn list_for(
            &self,
            invoice_id: InvoiceId,
        ) -> Result<Vec<InvoicePayment>, PortError> {
            Ok(self
                .invoice_payments
                .read()
                .await
                .iter()
                .filter(|p| p.invoice_id == invoice_id)
                .cloned()
                .collect())
        }
    }

    #[async_trait]
    impl AccrualSourcePort for MockDocuments {
        async fn expense_total(
            &self,
            account_id: AnalyticalAccountId,
            period: DateRange,
        ) -> Result<Decimal, PortError> {
            Ok(self
                .bills
                .read()
                .await
                .values()
                .filter(|bill| bill.status.accrues() && period.contains(bill.bill_date))
                .flat_map(|bill| bill.lines.iter())
                .filter(|line| line.analytical_account_id == Some(account_id))
                .map(|line| line.subtotal.amount())
                .sum())
        }

        async fn income_total(
            &self,
            account_id: AnalyticalAccountId,
            period: DateRange,
        ) -> Result<Decimal, PortError> {
            Ok(self
                .invoices
                .read()
                .await
                .values()
                .filter(|invoice| {
                    invoice.status.accrues() && period.contains(invoice.invoice_date)
                })
                .flat_map(|invoice| invoice.lines.iter())
                .filter(|line| line.analytical_account_id == Some(account_id))
                .map(|line| line.subtotal.amount())
                .sum())
        }
    }
}
