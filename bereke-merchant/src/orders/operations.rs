use rust_decimal::Decimal;
use tracing::{info, instrument};

use super::{
    CancelOrderRequest, DepositOrderRequest, GatewayResponse, Operation, OrderStatusRequest,
    OrderStatusResponse, RefundOrderRequest, RegisterOrderRequest, RegisterOrderResponse,
    ReversalOrderRequest,
};
use crate::{client::MerchantClient, error::Result, transport::Transport};

impl<T: Transport> MerchantClient<T> {
    /// Registers a one-phase order (`register.do`).
    ///
    /// The returned `form_url` is where the customer pays. A gateway-side
    /// failure is reported through `response.error_code`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnsupportedCurrency`](crate::GatewayError::UnsupportedCurrency)
    /// or [`GatewayError::InvalidInput`](crate::GatewayError::InvalidInput) before any I/O,
    /// and any dispatch error.
    #[instrument(skip(self, request), fields(order_number = %request.order_number, currency = request.currency))]
    pub async fn register_order(
        &self,
        request: &RegisterOrderRequest,
    ) -> Result<RegisterOrderResponse> {
        let response: RegisterOrderResponse = self.call(Operation::Register, request).await?;
        info!(error_code = response.response.error_code, "order registered");
        Ok(response)
    }

    /// Registers a two-phase order (`registerPreAuth.do`); the amount is
    /// only held until [`MerchantClient::deposit_order`].
    ///
    /// # Errors
    ///
    /// Same as [`MerchantClient::register_order`].
    #[instrument(skip(self, request), fields(order_number = %request.order_number, currency = request.currency))]
    pub async fn auth_order(&self, request: &RegisterOrderRequest) -> Result<RegisterOrderResponse> {
        let response: RegisterOrderResponse = self.call(Operation::PreAuth, request).await?;
        info!(error_code = response.response.error_code, "order pre-authorized");
        Ok(response)
    }

    /// Captures a pre-authorized order (`deposit.do`).
    ///
    /// # Errors
    ///
    /// Returns a conversion error before any I/O, and any dispatch error.
    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    pub async fn deposit_order(&self, request: &DepositOrderRequest) -> Result<GatewayResponse> {
        let response: GatewayResponse = self.call(Operation::Deposit, request).await?;
        info!(error_code = response.error_code, "deposit completed");
        Ok(response)
    }

    /// Refunds a completed order, fully or partially (`refund.do`).
    ///
    /// # Errors
    ///
    /// Returns a conversion error before any I/O, and any dispatch error.
    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    pub async fn refund_order(&self, request: &RefundOrderRequest) -> Result<GatewayResponse> {
        let response: GatewayResponse = self.call(Operation::Refund, request).await?;
        info!(error_code = response.error_code, "refund completed");
        Ok(response)
    }

    /// Reverses an authorization (`reverse.do`).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`](crate::GatewayError::InvalidInput)
    /// if an amount is given without a currency, and any dispatch error.
    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    pub async fn reversal_order(&self, request: &ReversalOrderRequest) -> Result<GatewayResponse> {
        let response: GatewayResponse = self.call(Operation::Reversal, request).await?;
        info!(error_code = response.error_code, "reversal completed");
        Ok(response)
    }

    /// Cancels an unpaid order (`decline.do`).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`](crate::GatewayError::InvalidInput)
    /// if neither order id nor order number is set, and any dispatch error.
    #[instrument(skip(self, request), fields(order_id = %request.order_id, order_number = %request.order_number))]
    pub async fn cancel_order(&self, request: &CancelOrderRequest) -> Result<GatewayResponse> {
        let response: GatewayResponse = self.call(Operation::Cancel, request).await?;
        info!(error_code = response.error_code, "order cancelled");
        Ok(response)
    }

    /// Queries the extended order status (`getOrderStatusExtended.do`).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`](crate::GatewayError::InvalidInput)
    /// if neither order id nor order number is set, and any dispatch error.
    #[instrument(skip(self, request), fields(order_id = %request.order_id, order_number = %request.order_number))]
    pub async fn get_order_status(
        &self,
        request: &OrderStatusRequest,
    ) -> Result<OrderStatusResponse> {
        let response: OrderStatusResponse = self.call(Operation::Status, request).await?;
        info!(
            error_code = response.response.error_code,
            order_status = ?response.order_status,
            "order status received"
        );
        Ok(response)
    }

    /// Registers an order from its essentials.
    ///
    /// # Errors
    ///
    /// Same as [`MerchantClient::register_order`].
    pub async fn register_order_by_number(
        &self,
        order_number: &str,
        amount: Decimal,
        currency: u16,
        return_url: &str,
        fail_url: &str,
    ) -> Result<RegisterOrderResponse> {
        let request = RegisterOrderRequest {
            return_url: return_url.to_owned(),
            fail_url: fail_url.to_owned(),
            ..RegisterOrderRequest::new(order_number, amount, currency)
        };
        self.register_order(&request).await
    }

    /// Refunds `amount` of the order `order_id`.
    ///
    /// # Errors
    ///
    /// Same as [`MerchantClient::refund_order`].
    pub async fn refund_order_by_id(
        &self,
        amount: Decimal,
        currency: u16,
        order_id: &str,
    ) -> Result<GatewayResponse> {
        self.refund_order(&RefundOrderRequest::new(order_id, amount, currency)).await
    }

    /// Reverses `amount` of the authorization of `order_id`.
    ///
    /// # Errors
    ///
    /// Same as [`MerchantClient::reversal_order`].
    pub async fn reversal_order_by_id(
        &self,
        amount: Decimal,
        currency: u16,
        order_id: &str,
    ) -> Result<GatewayResponse> {
        let request = ReversalOrderRequest {
            order_id: order_id.to_owned(),
            amount: Some(amount),
            currency: Some(currency),
            ..ReversalOrderRequest::default()
        };
        self.reversal_order(&request).await
    }

    /// Cancels the order `order_id`.
    ///
    /// # Errors
    ///
    /// Same as [`MerchantClient::cancel_order`].
    pub async fn cancel_order_by_id(&self, order_id: &str) -> Result<GatewayResponse> {
        let request = CancelOrderRequest { order_id: order_id.to_owned(), ..Default::default() };
        self.cancel_order(&request).await
    }

    /// Queries the status of `order_id`.
    ///
    /// # Errors
    ///
    /// Same as [`MerchantClient::get_order_status`].
    pub async fn get_order_status_by_id(&self, order_id: &str) -> Result<OrderStatusResponse> {
        self.get_order_status(&OrderStatusRequest::by_id(order_id)).await
    }
}
