//! PostgreSQL-backed stores for receivables-service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::models::{
    DeliveryException, ExceptionType, Invoice, Payment, PaymentMethod, ResolutionClaim,
    ResolutionType,
};
use crate::services::metrics::STORE_OP_DURATION;
use crate::services::store::{ExceptionStore, InvoiceStore, PaymentStore};

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct PaymentRow {
    payment_id: Uuid,
    order_id: Uuid,
    amount: Decimal,
    method: String,
    collector_id: Uuid,
    collector_name: String,
    recorded_at: DateTime<Utc>,
    reconciled: bool,
    reconciled_at: Option<DateTime<Utc>>,
    reconciliation_notes: Option<String>,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Payment {
            payment_id: row.payment_id,
            order_id: row.order_id,
            amount: row.amount,
            // rows only ever hold values we wrote; fall back leniently
            method: PaymentMethod::from_str(&row.method).unwrap_or(PaymentMethod::Other),
            collector_id: row.collector_id,
            collector_name: row.collector_name,
            recorded_at: row.recorded_at,
            reconciled: row.reconciled,
            reconciled_at: row.reconciled_at,
            reconciliation_notes: row.reconciliation_notes,
        }
    }
}

#[derive(Debug, FromRow)]
struct InvoiceRow {
    invoice_id: Uuid,
    store_id: Uuid,
    store_name: String,
    total_amount: Decimal,
    paid_amount: Decimal,
    issued_at: DateTime<Utc>,
    due_at: DateTime<Utc>,
}

impl From<InvoiceRow> for Invoice {
    fn from(row: InvoiceRow) -> Self {
        Invoice {
            invoice_id: row.invoice_id,
            store_id: row.store_id,
            store_name: row.store_name,
            total_amount: row.total_amount,
            paid_amount: row.paid_amount,
            issued_at: row.issued_at,
            due_at: row.due_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ExceptionRow {
    exception_id: Uuid,
    order_id: Uuid,
    exception_type: String,
    description: String,
    reported_at: DateTime<Utc>,
    reported_by: String,
    resolved_at: Option<DateTime<Utc>>,
    resolution_type: Option<String>,
    resolution_notes: Option<String>,
    follow_up_required: bool,
}

impl From<ExceptionRow> for DeliveryException {
    fn from(row: ExceptionRow) -> Self {
        DeliveryException {
            exception_id: row.exception_id,
            order_id: row.order_id,
            exception_type: ExceptionType::from_str(&row.exception_type)
                .unwrap_or(ExceptionType::Other),
            description: row.description,
            reported_at: row.reported_at,
            reported_by: row.reported_by,
            resolved_at: row.resolved_at,
            resolution_type: row
                .resolution_type
                .as_deref()
                .and_then(ResolutionType::from_str),
            resolution_notes: row.resolution_notes,
            follow_up_required: row.follow_up_required,
        }
    }
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "receivables-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["health_check"])
            .start_timer();

        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;

        timer.observe_duration();
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl PaymentStore for Database {
    #[instrument(skip(self, payment), fields(payment_id = %payment.payment_id))]
    async fn insert_payment(&self, payment: Payment) -> Result<(), AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["insert_payment"])
            .start_timer();

        sqlx::query(
            r#"
            INSERT INTO payments (payment_id, order_id, amount, method, collector_id, collector_name, recorded_at, reconciled, reconciled_at, reconciliation_notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(payment.payment_id)
        .bind(payment.order_id)
        .bind(payment.amount)
        .bind(payment.method.as_str())
        .bind(payment.collector_id)
        .bind(&payment.collector_name)
        .bind(payment.recorded_at)
        .bind(payment.reconciled)
        .bind(payment.reconciled_at)
        .bind(&payment.reconciliation_notes)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to insert payment: {}", e)))?;

        timer.observe_duration();
        Ok(())
    }

    #[instrument(skip(self), fields(payment_id = %payment_id))]
    async fn get_payment(&self, payment_id: Uuid) -> Result<Option<Payment>, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["get_payment"])
            .start_timer();

        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT payment_id, order_id, amount, method, collector_id, collector_name, recorded_at, reconciled, reconciled_at, reconciliation_notes
            FROM payments
            WHERE payment_id = $1
            "#,
        )
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get payment: {}", e)))?;

        timer.observe_duration();
        Ok(row.map(Payment::from))
    }

    #[instrument(skip(self))]
    async fn list_unreconciled(
        &self,
        collector_id: Option<Uuid>,
    ) -> Result<Vec<Payment>, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["list_unreconciled"])
            .start_timer();

        let rows = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT payment_id, order_id, amount, method, collector_id, collector_name, recorded_at, reconciled, reconciled_at, reconciliation_notes
            FROM payments
            WHERE reconciled = FALSE AND ($1::uuid IS NULL OR collector_id = $1)
            ORDER BY recorded_at ASC, payment_id ASC
            "#,
        )
        .bind(collector_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list unreconciled payments: {}", e))
        })?;

        timer.observe_duration();
        Ok(rows.into_iter().map(Payment::from).collect())
    }

    #[instrument(skip(self), fields(order_id = %order_id))]
    async fn list_for_order(&self, order_id: Uuid) -> Result<Vec<Payment>, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["list_for_order"])
            .start_timer();

        let rows = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT payment_id, order_id, amount, method, collector_id, collector_name, recorded_at, reconciled, reconciled_at, reconciliation_notes
            FROM payments
            WHERE order_id = $1
            ORDER BY recorded_at ASC, payment_id ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list order payments: {}", e))
        })?;

        timer.observe_duration();
        Ok(rows.into_iter().map(Payment::from).collect())
    }

    #[instrument(skip(self, notes), fields(payment_id = %payment_id))]
    async fn claim_reconciled(
        &self,
        payment_id: Uuid,
        reconciled_at: DateTime<Utc>,
        notes: &str,
    ) -> Result<Payment, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["claim_reconciled"])
            .start_timer();

        // Conditional update: the WHERE clause makes concurrent claims race
        // to a single winner inside the database.
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            UPDATE payments
            SET reconciled = TRUE, reconciled_at = $2, reconciliation_notes = $3
            WHERE payment_id = $1 AND reconciled = FALSE
            RETURNING payment_id, order_id, amount, method, collector_id, collector_name, recorded_at, reconciled, reconciled_at, reconciliation_notes
            "#,
        )
        .bind(payment_id)
        .bind(reconciled_at)
        .bind(notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to claim payment: {}", e))
        })?;

        timer.observe_duration();

        match row {
            Some(row) => Ok(Payment::from(row)),
            None => match self.get_payment(payment_id).await? {
                Some(_) => Err(AppError::AlreadyReconciled { payment_id }),
                None => Err(AppError::not_found(format!("payment {payment_id}"))),
            },
        }
    }
}

#[async_trait]
impl InvoiceStore for Database {
    #[instrument(skip(self, invoice), fields(invoice_id = %invoice.invoice_id))]
    async fn upsert_invoice(&self, invoice: Invoice) -> Result<(), AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["upsert_invoice"])
            .start_timer();

        sqlx::query(
            r#"
            INSERT INTO invoices (invoice_id, store_id, store_name, total_amount, paid_amount, issued_at, due_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (invoice_id) DO UPDATE
            SET store_name = EXCLUDED.store_name,
                total_amount = EXCLUDED.total_amount,
                paid_amount = EXCLUDED.paid_amount,
                due_at = EXCLUDED.due_at
            "#,
        )
        .bind(invoice.invoice_id)
        .bind(invoice.store_id)
        .bind(&invoice.store_name)
        .bind(invoice.total_amount)
        .bind(invoice.paid_amount)
        .bind(invoice.issued_at)
        .bind(invoice.due_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to upsert invoice: {}", e)))?;

        timer.observe_duration();
        Ok(())
    }

    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    async fn get_invoice(&self, invoice_id: Uuid) -> Result<Option<Invoice>, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["get_invoice"])
            .start_timer();

        let row = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT invoice_id, store_id, store_name, total_amount, paid_amount, issued_at, due_at
            FROM invoices
            WHERE invoice_id = $1
            "#,
        )
        .bind(invoice_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get invoice: {}", e)))?;

        timer.observe_duration();
        Ok(row.map(Invoice::from))
    }

    #[instrument(skip(self))]
    async fn list_invoices(&self) -> Result<Vec<Invoice>, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["list_invoices"])
            .start_timer();

        let rows = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT invoice_id, store_id, store_name, total_amount, paid_amount, issued_at, due_at
            FROM invoices
            ORDER BY issued_at ASC, invoice_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list invoices: {}", e)))?;

        timer.observe_duration();
        Ok(rows.into_iter().map(Invoice::from).collect())
    }
}

#[async_trait]
impl ExceptionStore for Database {
    #[instrument(skip(self, exception), fields(exception_id = %exception.exception_id))]
    async fn insert_exception(&self, exception: DeliveryException) -> Result<(), AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["insert_exception"])
            .start_timer();

        sqlx::query(
            r#"
            INSERT INTO delivery_exceptions (exception_id, order_id, exception_type, description, reported_at, reported_by, resolved_at, resolution_type, resolution_notes, follow_up_required)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(exception.exception_id)
        .bind(exception.order_id)
        .bind(exception.exception_type.as_str())
        .bind(&exception.description)
        .bind(exception.reported_at)
        .bind(&exception.reported_by)
        .bind(exception.resolved_at)
        .bind(exception.resolution_type.map(|r| r.as_str()))
        .bind(&exception.resolution_notes)
        .bind(exception.follow_up_required)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to insert exception: {}", e))
        })?;

        timer.observe_duration();
        Ok(())
    }

    #[instrument(skip(self), fields(exception_id = %exception_id))]
    async fn get_exception(
        &self,
        exception_id: Uuid,
    ) -> Result<Option<DeliveryException>, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["get_exception"])
            .start_timer();

        let row = sqlx::query_as::<_, ExceptionRow>(
            r#"
            SELECT exception_id, order_id, exception_type, description, reported_at, reported_by, resolved_at, resolution_type, resolution_notes, follow_up_required
            FROM delivery_exceptions
            WHERE exception_id = $1
            "#,
        )
        .bind(exception_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get exception: {}", e)))?;

        timer.observe_duration();
        Ok(row.map(DeliveryException::from))
    }

    #[instrument(skip(self))]
    async fn list_open(&self) -> Result<Vec<DeliveryException>, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["list_open_exceptions"])
            .start_timer();

        let rows = sqlx::query_as::<_, ExceptionRow>(
            r#"
            SELECT exception_id, order_id, exception_type, description, reported_at, reported_by, resolved_at, resolution_type, resolution_notes, follow_up_required
            FROM delivery_exceptions
            WHERE resolved_at IS NULL
            ORDER BY reported_at ASC, exception_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list open exceptions: {}", e))
        })?;

        timer.observe_duration();
        Ok(rows.into_iter().map(DeliveryException::from).collect())
    }

    #[instrument(skip(self, claim), fields(exception_id = %exception_id))]
    async fn claim_resolved(
        &self,
        exception_id: Uuid,
        claim: ResolutionClaim,
    ) -> Result<DeliveryException, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["claim_resolved"])
            .start_timer();

        let row = sqlx::query_as::<_, ExceptionRow>(
            r#"
            UPDATE delivery_exceptions
            SET resolved_at = $2, resolution_type = $3, resolution_notes = $4, follow_up_required = $5
            WHERE exception_id = $1 AND resolved_at IS NULL
            RETURNING exception_id, order_id, exception_type, description, reported_at, reported_by, resolved_at, resolution_type, resolution_notes, follow_up_required
            "#,
        )
        .bind(exception_id)
        .bind(claim.resolved_at)
        .bind(claim.resolution_type.as_str())
        .bind(&claim.resolution_notes)
        .bind(claim.follow_up_required)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to claim exception: {}", e))
        })?;

        timer.observe_duration();

        match row {
            Some(row) => Ok(DeliveryException::from(row)),
            None => match self.get_exception(exception_id).await? {
                Some(_) => Err(AppError::AlreadyResolved { exception_id }),
                None => Err(AppError::not_found(format!("exception {exception_id}"))),
            },
        }
    }
}
