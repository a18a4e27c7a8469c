use super::api_types::{OandaOrderRequest, OandaOrderRequestWrapper, OandaPriceDetails};
use super::client::OandaClient;
use crate::domain::ports::BrokerService;
use crate::domain::trading::types::{BrokerOrderId, JPY_PIP, MarketOrder, Quote, pip_size};
use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::info;

/// OANDA broker: quotes, NAV and FOK market orders
pub struct OandaBroker {
    client: OandaClient,
}

impl OandaBroker {
    pub fn new(client: OandaClient) -> Self {
        Self { client }
    }
}

/// Decimal places OANDA accepts for trigger prices on this instrument
fn price_precision(instrument: &str) -> u32 {
    if pip_size(instrument) == JPY_PIP { 3 } else { 5 }
}

fn trigger(instrument: &str, price: Option<Decimal>) -> Option<OandaPriceDetails> {
    price.filter(|p| *p > Decimal::ZERO).map(|p| OandaPriceDetails {
        price: format!("{:.*}", price_precision(instrument) as usize, p),
    })
}

pub fn build_order_request(order: &MarketOrder) -> OandaOrderRequestWrapper {
    OandaOrderRequestWrapper {
        order: OandaOrderRequest {
            units: order.signed_units().round().normalize().to_string(),
            instrument: order.instrument.clone(),
            time_in_force: "FOK".to_string(),
            order_type: "MARKET".to_string(),
            position_fill: "DEFAULT".to_string(),
            stop_loss_on_fill: trigger(&order.instrument, order.stop_loss),
            take_profit_on_fill: trigger(&order.instrument, order.take_profit),
        },
    }
}

#[async_trait]
impl BrokerService for OandaBroker {
    async fn current_price(&self, instrument: &str) -> Result<Quote> {
        let resp = self.client.pricing(&[instrument.to_string()]).await?;
        resp.prices
            .iter()
            .find(|p| p.instrument == instrument)
            .and_then(|p| p.best_quote())
            .with_context(|| format!("No bid/ask returned for {}", instrument))
    }

    async fn account_equity(&self) -> Result<Decimal> {
        let summary = self.client.account_summary().await?;
        summary
            .account
            .nav
            .parse::<Decimal>()
            .with_context(|| format!("Invalid NAV in account summary: {}", summary.account.nav))
    }

    async fn submit_market_order(&self, order: &MarketOrder) -> Result<BrokerOrderId> {
        let request = build_order_request(order);
        let resp = self.client.create_order(&request).await?;

        if let Some(cancel) = resp.order_cancel_transaction {
            anyhow::bail!(
                "order {} cancelled: {}",
                resp.order_create_transaction.id,
                cancel.reason.unwrap_or_else(|| "unknown reason".to_string())
            );
        }

        info!(
            "OANDA: order {} created for {} units {}",
            resp.order_create_transaction.id, order.instrument, request.order.units
        );
        Ok(BrokerOrderId(resp.order_create_transaction.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trading::types::Direction;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sell_units_are_negative() {
        let order = MarketOrder::plain("EUR_USD", Direction::Sell, dec!(2500));
        let request = build_order_request(&order);
        assert_eq!(request.order.units, "-2500");
        assert_eq!(request.order.time_in_force, "FOK");
        assert!(request.order.stop_loss_on_fill.is_none());
    }

    #[test]
    fn test_trigger_prices_formatted_per_instrument() {
        let order = MarketOrder::plain("EUR_USD", Direction::Buy, dec!(1000))
            .with_bracket(Some(dec!(1.098)), Some(dec!(1.104)));
        let request = build_order_request(&order);
        assert_eq!(request.order.stop_loss_on_fill.unwrap().price, "1.09800");
        assert_eq!(request.order.take_profit_on_fill.unwrap().price, "1.10400");

        let order = MarketOrder::plain("USD_JPY", Direction::Sell, dec!(1000))
            .with_bracket(Some(dec!(150.1)), Some(dec!(0)));
        let request = build_order_request(&order);
        assert_eq!(request.order.stop_loss_on_fill.unwrap().price, "150.100");
        assert!(request.order.take_profit_on_fill.is_none());
    }
}
