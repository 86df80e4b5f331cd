use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    application::models::{
        billing::{CheckoutRequest, CheckoutResponse, PlansResponse},
        chat::Ack,
    },
    constants::{CANCEL_SUBSCRIPTION_PATH, CHECKOUT_PATH, PLANS_PATH},
    error::AppError,
    session::interface::ApiSession,
    transport::http_client::{decode_response, RequestBody},
};

/// Subscription plans and checkout.
#[async_trait]
pub trait BillingService: Send + Sync {
    /// Public, sent without credentials.
    async fn plans(&self) -> Result<PlansResponse, AppError>;

    async fn create_checkout(&self, tier: &str) -> Result<CheckoutResponse, AppError>;

    async fn cancel_subscription(&self) -> Result<Ack, AppError>;
}

pub struct BillingServiceImpl<T: ApiSession> {
    session: Arc<T>,
}

impl<T: ApiSession> BillingServiceImpl<T> {
    pub fn new(session: Arc<T>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> Arc<T> {
        self.session.clone()
    }
}

#[async_trait]
impl<T: ApiSession + 'static> BillingService for BillingServiceImpl<T> {
    async fn plans(&self) -> Result<PlansResponse, AppError> {
        let response = self
            .session
            .public_request(Method::GET, PLANS_PATH, &RequestBody::Empty)
            .await?;
        let plans: PlansResponse = decode_response(response).await?;

        debug!("Fetched {} plans", plans.plans.len());
        Ok(plans)
    }

    async fn create_checkout(&self, tier: &str) -> Result<CheckoutResponse, AppError> {
        info!("Creating checkout for tier {}", tier);

        let body = RequestBody::json(&CheckoutRequest { plan_tier: tier })?;
        let response = self
            .session
            .authorized_request(Method::POST, CHECKOUT_PATH, &body)
            .await?;
        decode_response(response).await
    }

    async fn cancel_subscription(&self) -> Result<Ack, AppError> {
        info!("Cancelling subscription");

        let response = self
            .session
            .authorized_request(Method::POST, CANCEL_SUBSCRIPTION_PATH, &RequestBody::Empty)
            .await?;
        let ack = decode_response::<Option<Ack>>(response)
            .await?
            .unwrap_or_default();
        Ok(ack)
    }
}
