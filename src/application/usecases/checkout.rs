use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::usecases::commission_engine::{CommissionEngine, CommissionError};
use crate::domain::{
    entities::payments::InsertPaymentEntity,
    repositories::{
        clicks::ClickRepository, commissions::CommissionRepository, payments::PaymentRepository,
        products::ProductRepository, users::UserRepository,
    },
    value_objects::{
        checkout::{
            CaptureFlip, CaptureResultModel, CreateOrderModel, CreatedOrderModel,
            LegacyCaptureModel, PaymentModel,
        },
        enums::{payment_kinds::PaymentKind, payment_statuses::PaymentStatus},
        money,
    },
};

/// External payment processor seam. The concrete client lives in
/// infrastructure; usecase tests mock this.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        reference_id: &str,
    ) -> AnyResult<GatewayOrder>;

    async fn capture_order(&self, order_id: &str) -> AnyResult<GatewayCapture>;
}

#[derive(Debug, Clone)]
pub struct GatewayOrder {
    pub order_id: String,
    pub approve_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GatewayCapture {
    pub capture_ref: Option<String>,
    pub payer_ref: Option<String>,
    /// Amount actually captured by the processor; the authoritative split is
    /// recomputed from this, not from the requested amount.
    pub amount_minor: Option<i64>,
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("order not found")]
    OrderNotFound,
    #[error("product not found")]
    ProductNotFound,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("payment gateway error")]
    Gateway(anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CheckoutError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            CheckoutError::OrderNotFound | CheckoutError::ProductNotFound => StatusCode::NOT_FOUND,
            CheckoutError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CheckoutError::Gateway(_) => StatusCode::BAD_GATEWAY,
            CheckoutError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CommissionError> for CheckoutError {
    fn from(err: CommissionError) -> Self {
        match err {
            CommissionError::Internal(inner) => CheckoutError::Internal(inner),
        }
    }
}

pub type CheckoutResult<T> = std::result::Result<T, CheckoutError>;

pub struct CheckoutUseCase<Pay, Prod, Clk, Com, Usr, G>
where
    Pay: PaymentRepository + Send + Sync,
    Prod: ProductRepository + Send + Sync,
    Clk: ClickRepository + Send + Sync,
    Com: CommissionRepository + Send + Sync,
    Usr: UserRepository + Send + Sync,
    G: PaymentGateway + Send + Sync,
{
    payment_repo: Arc<Pay>,
    product_repo: Arc<Prod>,
    click_repo: Arc<Clk>,
    commission_engine: Arc<CommissionEngine<Com, Usr>>,
    gateway: Arc<G>,
    currency: String,
}

impl<Pay, Prod, Clk, Com, Usr, G> CheckoutUseCase<Pay, Prod, Clk, Com, Usr, G>
where
    Pay: PaymentRepository + Send + Sync,
    Prod: ProductRepository + Send + Sync,
    Clk: ClickRepository + Send + Sync,
    Com: CommissionRepository + Send + Sync,
    Usr: UserRepository + Send + Sync,
    G: PaymentGateway + Send + Sync,
{
    pub fn new(
        payment_repo: Arc<Pay>,
        product_repo: Arc<Prod>,
        click_repo: Arc<Clk>,
        commission_engine: Arc<CommissionEngine<Com, Usr>>,
        gateway: Arc<G>,
        currency: String,
    ) -> Self {
        Self {
            payment_repo,
            product_repo,
            click_repo,
            commission_engine,
            gateway,
            currency,
        }
    }

    /// Creates a gateway order for the product's server-side price and
    /// persists the pending payment keyed by the gateway order id. The split
    /// returned here is display/audit only.
    pub async fn create_order(&self, model: CreateOrderModel) -> CheckoutResult<CreatedOrderModel> {
        info!(
            product_id = model.product_id,
            affiliate_id = ?model.affiliate_id,
            "checkout: create order requested"
        );

        let product = self
            .product_repo
            .find_by_id(model.product_id)
            .await
            .map_err(|err| {
                error!(
                    product_id = model.product_id,
                    db_error = ?err,
                    "checkout: failed to load product"
                );
                CheckoutError::Internal(err)
            })?
            .ok_or(CheckoutError::ProductNotFound)?;

        let order = self
            .gateway
            .create_order(
                product.price_minor,
                &self.currency,
                &product.id.to_string(),
            )
            .await
            .map_err(|err| {
                error!(
                    product_id = product.id,
                    error = ?err,
                    "checkout: gateway order creation failed"
                );
                CheckoutError::Gateway(err)
            })?;

        let now = Utc::now();
        self.payment_repo
            .create_pending(InsertPaymentEntity {
                order_id: order.order_id.clone(),
                user_id: model.affiliate_id,
                product_id: Some(product.id),
                kind: PaymentKind::Sale.to_string(),
                amount_minor: product.price_minor,
                currency: self.currency.clone(),
                status: PaymentStatus::Pending.to_string(),
                payer_ref: None,
                capture_ref: None,
                error: None,
                captured_at: None,
                created_at: now,
                updated_at: now,
            })
            .await
            .map_err(|err| {
                error!(
                    order_id = %order.order_id,
                    db_error = ?err,
                    "checkout: failed to persist pending payment"
                );
                CheckoutError::Internal(err)
            })?;

        info!(
            order_id = %order.order_id,
            amount_minor = product.price_minor,
            "checkout: pending order created"
        );

        Ok(CreatedOrderModel {
            order_id: order.order_id,
            approve_url: order.approve_url,
            split: self.commission_engine.split(product.price_minor),
        })
    }

    /// Captures an order with the gateway and credits commissions exactly
    /// once. Replays return the stored result without further side effects.
    pub async fn capture_order(
        &self,
        order_id: &str,
        explicit_affiliate: Option<Uuid>,
        click_cookie: Option<Uuid>,
    ) -> CheckoutResult<CaptureResultModel> {
        info!(order_id, "checkout: capture requested");

        let payment = self
            .payment_repo
            .find_by_order_id(order_id)
            .await
            .map_err(|err| {
                error!(order_id, db_error = ?err, "checkout: failed to load payment");
                CheckoutError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(order_id, "checkout: capture for unknown order");
                CheckoutError::OrderNotFound
            })?;

        // Webhook replays and duplicate client calls land here; no gateway
        // round-trip, no commission effects.
        if PaymentStatus::from_str(&payment.status) == Some(PaymentStatus::Completed) {
            info!(order_id, "checkout: order already captured, returning stored result");
            let commission = self.commission_engine.find_for_payment(payment.id).await?;
            return Ok(CaptureResultModel {
                success: true,
                already_processed: true,
                payment: PaymentModel::from(payment),
                commission,
            });
        }

        let attributed = self
            .resolve_attribution(explicit_affiliate, payment.user_id, click_cookie)
            .await?;

        let capture = match self.gateway.capture_order(order_id).await {
            Ok(capture) => capture,
            Err(err) => {
                error!(order_id, error = ?err, "checkout: gateway capture failed");
                if let Err(mark_err) = self
                    .payment_repo
                    .mark_failed(order_id, &err.to_string())
                    .await
                {
                    error!(
                        order_id,
                        db_error = ?mark_err,
                        "checkout: failed to mark payment failed"
                    );
                }
                return Err(CheckoutError::Gateway(err));
            }
        };

        let captured_amount = capture.amount_minor.unwrap_or(payment.amount_minor);
        let flip = self
            .payment_repo
            .complete_if_not_completed(order_id, captured_amount, capture.capture_ref, attributed)
            .await
            .map_err(|err| {
                error!(order_id, db_error = ?err, "checkout: capture flip failed");
                CheckoutError::Internal(err)
            })?;

        self.finish_capture(order_id, flip).await
    }

    /// Legacy path: the processor interaction already happened elsewhere and
    /// we only receive its identifiers. Funnels through the same pending-row
    /// upsert, the same idempotency flip, and the same commission engine as
    /// the gateway path.
    pub async fn capture_external(
        &self,
        model: LegacyCaptureModel,
        click_cookie: Option<Uuid>,
    ) -> CheckoutResult<CaptureResultModel> {
        if model.order_id.trim().is_empty()
            || model.payer_id.trim().is_empty()
            || model.payment_id.trim().is_empty()
        {
            return Err(CheckoutError::InvalidInput(
                "missing payment details".to_string(),
            ));
        }

        let amount_minor = money::parse_decimal_minor(&model.amount)
            .map_err(|err| CheckoutError::InvalidInput(err.to_string()))?;
        if amount_minor <= 0 {
            return Err(CheckoutError::InvalidInput(
                "amount must be positive".to_string(),
            ));
        }

        info!(
            order_id = %model.order_id,
            amount_minor,
            "checkout: external capture received"
        );

        let attributed = self
            .resolve_attribution(model.user_id, None, click_cookie)
            .await?;

        let now = Utc::now();
        self.payment_repo
            .create_pending_if_absent(InsertPaymentEntity {
                order_id: model.order_id.clone(),
                user_id: attributed,
                product_id: Some(model.product_id),
                kind: PaymentKind::Sale.to_string(),
                amount_minor,
                currency: self.currency.clone(),
                status: PaymentStatus::Pending.to_string(),
                payer_ref: Some(model.payer_id.clone()),
                capture_ref: None,
                error: None,
                captured_at: None,
                created_at: now,
                updated_at: now,
            })
            .await
            .map_err(|err| {
                error!(
                    order_id = %model.order_id,
                    db_error = ?err,
                    "checkout: failed to upsert pending payment for external capture"
                );
                CheckoutError::Internal(err)
            })?;

        let flip = self
            .payment_repo
            .complete_if_not_completed(
                &model.order_id,
                amount_minor,
                Some(model.payment_id.clone()),
                attributed,
            )
            .await
            .map_err(|err| {
                error!(
                    order_id = %model.order_id,
                    db_error = ?err,
                    "checkout: external capture flip failed"
                );
                CheckoutError::Internal(err)
            })?;

        self.finish_capture(&model.order_id, flip).await
    }

    /// Explicit affiliate id wins, then the attribution already stored on the
    /// payment, then the click cookie. No source means an unattributed sale.
    async fn resolve_attribution(
        &self,
        explicit: Option<Uuid>,
        stored: Option<Uuid>,
        click_cookie: Option<Uuid>,
    ) -> CheckoutResult<Option<Uuid>> {
        if explicit.is_some() {
            return Ok(explicit);
        }
        if stored.is_some() {
            return Ok(stored);
        }

        let click_id = match click_cookie {
            Some(click_id) => click_id,
            None => return Ok(None),
        };

        let attribution = self
            .click_repo
            .find_attribution(click_id)
            .await
            .map_err(|err| {
                error!(%click_id, db_error = ?err, "checkout: failed to resolve click attribution");
                CheckoutError::Internal(err)
            })?;

        if let Some(attribution) = attribution.as_ref() {
            info!(
                %click_id,
                affiliate_id = %attribution.affiliate_id,
                "checkout: attribution resolved from click cookie"
            );
        }

        Ok(attribution.map(|a| a.affiliate_id))
    }

    async fn finish_capture(
        &self,
        order_id: &str,
        flip: CaptureFlip,
    ) -> CheckoutResult<CaptureResultModel> {
        match flip {
            CaptureFlip::Completed(payment) => {
                let commission = self.commission_engine.accrue(&payment).await?;
                info!(
                    order_id,
                    payment_id = payment.id,
                    commission_credited = commission.is_some(),
                    "checkout: capture completed"
                );
                Ok(CaptureResultModel {
                    success: true,
                    already_processed: false,
                    payment: PaymentModel::from(payment),
                    commission,
                })
            }
            CaptureFlip::AlreadyCompleted(payment) => {
                info!(
                    order_id,
                    payment_id = payment.id,
                    "checkout: capture already processed, no re-credit"
                );
                let commission = self.commission_engine.find_for_payment(payment.id).await?;
                Ok(CaptureResultModel {
                    success: true,
                    already_processed: true,
                    payment: PaymentModel::from(payment),
                    commission,
                })
            }
            CaptureFlip::NotFound => Err(CheckoutError::OrderNotFound),
        }
    }
}
