use std::time::Duration;

use chrono::Utc;
use rand::Rng;

use crate::error::{AppError, AppResult};

/// Stand-in for a real payment gateway. The contract preserved here:
/// a configurable success rate (0.9 by default), synthetic `DUMMY-<millis>`
/// transaction ids, and completion signaled asynchronously after a delay.
#[derive(Debug, Clone)]
pub struct PaymentGateway {
    pub success_rate: f64,
    pub delay: Duration,
}

impl Default for PaymentGateway {
    fn default() -> Self {
        Self {
            success_rate: 0.9,
            delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaymentReceipt {
    pub transaction_id: String,
    pub payment_method: String,
}

impl PaymentGateway {
    /// Run the simulated charge. Declines fail with `PaymentDeclined` and
    /// leave nothing behind; the caller decides what to persist on success.
    pub async fn charge(&self, amount: i64) -> AppResult<PaymentReceipt> {
        tokio::time::sleep(self.delay).await;
        tracing::debug!(amount, "processing charge through DummyPaymentAPI");

        if rand::rng().random_bool(self.success_rate) {
            Ok(PaymentReceipt {
                transaction_id: format!("DUMMY-{}", Utc::now().timestamp_millis()),
                payment_method: "DummyPaymentAPI".to_string(),
            })
        } else {
            Err(AppError::PaymentDeclined)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant_gateway(success_rate: f64) -> PaymentGateway {
        PaymentGateway {
            success_rate,
            delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn receipt_carries_synthetic_transaction_id() {
        let gateway = instant_gateway(1.0);
        let receipt = gateway.charge(25_000).await.expect("charge");
        assert!(receipt.transaction_id.starts_with("DUMMY-"));
        assert_eq!(receipt.payment_method, "DummyPaymentAPI");
        let millis: i64 = receipt.transaction_id["DUMMY-".len()..]
            .parse()
            .expect("numeric suffix");
        assert!(millis > 0);
    }

    #[tokio::test]
    async fn zero_rate_always_declines() {
        let gateway = instant_gateway(0.0);
        let err = gateway.charge(10_000).await.unwrap_err();
        assert!(matches!(err, AppError::PaymentDeclined));
    }

    // Binomial(1000, 0.9) has a standard deviation of ~9.5; the 850..=950
    // window is wide enough to make flakes vanishingly unlikely.
    #[tokio::test]
    async fn default_rate_succeeds_about_ninety_percent_of_the_time() {
        let gateway = PaymentGateway {
            delay: Duration::ZERO,
            ..Default::default()
        };
        let mut successes = 0u32;
        for _ in 0..1000 {
            if gateway.charge(10_000).await.is_ok() {
                successes += 1;
            }
        }
        assert!(
            (850..=950).contains(&successes),
            "expected ~900 successes out of 1000, got {successes}"
        );
    }
}
