//! Purchase completion service.

use std::time::Instant;

use domain::{
    DiscountPercent, LoyaltyAccount, PaymentMeans, Purchase, StampOutcome, ValidatedPurchase,
};
use purchase_store::{PurchaseRepository, RepositoryError};
use tokio::sync::MutexGuard;

use crate::cancel::CancelSignal;
use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, Result};
use crate::ledger::LoyaltyHandle;
use crate::services::{CardChargeGateway, DiscountLookupError, GatewayError, StoreDiscountProvider};
use crate::steps::CheckoutStage;

/// Completes purchases: validate, discount, pay, persist, accrue.
///
/// Payment happens strictly before persistence, and loyalty accrual strictly
/// after it. A purchase that fails before payment leaves no trace; one that
/// fails after payment is reported as [`CheckoutError::PersistenceFailed`].
pub struct PurchaseCompletionService<C, D, R>
where
    C: CardChargeGateway,
    D: StoreDiscountProvider,
    R: PurchaseRepository,
{
    card_gateway: C,
    discounts: D,
    repository: R,
    config: CheckoutConfig,
}

impl<C, D, R> PurchaseCompletionService<C, D, R>
where
    C: CardChargeGateway,
    D: StoreDiscountProvider,
    R: PurchaseRepository,
{
    /// Creates a new service with default configuration.
    pub fn new(card_gateway: C, discounts: D, repository: R) -> Self {
        Self::with_config(card_gateway, discounts, repository, CheckoutConfig::default())
    }

    /// Creates a new service with the given configuration.
    pub fn with_config(card_gateway: C, discounts: D, repository: R, config: CheckoutConfig) -> Self {
        Self {
            card_gateway,
            discounts,
            repository,
            config,
        }
    }

    /// Returns the purchase repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    /// Completes a purchase.
    ///
    /// `loyalty` is the customer's loyalty account, if they presented one.
    /// It is required for [`PaymentMeans::LoyaltyCurrency`] and stamped after
    /// every successfully persisted purchase. `cancel` is honoured until
    /// payment is dispatched and ignored afterwards.
    ///
    /// Returns the finalized purchase as stored.
    #[tracing::instrument(
        skip_all,
        fields(
            store_id = %purchase.store_id,
            payment_means = %purchase.payment_means,
            purchase_id = tracing::field::Empty,
        )
    )]
    pub async fn complete(
        &self,
        purchase: &Purchase,
        loyalty: Option<&LoyaltyHandle>,
        cancel: &CancelSignal,
    ) -> Result<ValidatedPurchase> {
        metrics::counter!("checkout_completions_total").increment(1);
        let start = Instant::now();

        let result = self.run(purchase, loyalty, cancel).await;

        match &result {
            Ok(completed) => {
                metrics::counter!("checkout_completed").increment(1);
                tracing::info!(
                    amount_due = %completed.amount_due(),
                    discount = %completed.discount(),
                    "purchase completed"
                );
            }
            Err(e) => {
                metrics::counter!("checkout_failed", "stage" => e.stage().as_str()).increment(1);
                if e.is_post_charge() {
                    metrics::counter!("checkout_persistence_failed").increment(1);
                    tracing::error!(error = %e, "payment taken but purchase not stored; reconcile");
                } else {
                    tracing::warn!(stage = %e.stage(), error = %e, "purchase not completed");
                }
            }
        }

        metrics::histogram!("checkout_duration_seconds").record(start.elapsed().as_secs_f64());
        result
    }

    async fn run(
        &self,
        purchase: &Purchase,
        loyalty: Option<&LoyaltyHandle>,
        cancel: &CancelSignal,
    ) -> Result<ValidatedPurchase> {
        // 1. Validate and fix identity, time and total
        let mut validated = purchase.validate_and_enrich(self.config.currency)?;
        tracing::Span::current().record("purchase_id", tracing::field::display(validated.id()));
        tracing::info!(
            step = %CheckoutStage::Validate,
            total = %validated.total(),
            products = validated.product_count(),
            "purchase validated"
        );

        // 2. Store discount
        ensure_not_cancelled(cancel, CheckoutStage::Discount)?;
        let discount = self.lookup_discount(&validated, cancel).await?;
        validated.apply_discount(discount);
        tracing::info!(
            step = %CheckoutStage::Discount,
            discount = %discount,
            amount_due = %validated.amount_due(),
            "discount applied"
        );

        // 3. Payment. Cancellation is not observed past this point.
        ensure_not_cancelled(cancel, CheckoutStage::Charge)?;
        let redeemed_account = match validated.payment_means() {
            PaymentMeans::Card => {
                self.charge_card(&validated).await?;
                None
            }
            PaymentMeans::Cash => {
                tracing::info!(step = %CheckoutStage::Charge, "cash payment, settled at the till");
                None
            }
            PaymentMeans::LoyaltyCurrency => {
                let handle = loyalty.ok_or(CheckoutError::LoyaltyAccountRequired)?;
                Some(redeem_credits(handle, &validated).await?)
            }
        };

        // 4. Persist
        self.persist(&validated).await?;

        // 5. Accrue. A loyalty-paid purchase keeps its account locked from
        // redemption through the stamp.
        let account = match (redeemed_account, loyalty) {
            (Some(account), _) => Some(account),
            (None, Some(handle)) => Some(handle.lock().await),
            (None, None) => None,
        };
        if let Some(mut account) = account {
            match account.add_stamp() {
                StampOutcome::FreeDrinkEarned { credits } => {
                    metrics::counter!("loyalty_free_drinks_earned").increment(1);
                    tracing::info!(
                        step = %CheckoutStage::Accrue,
                        account_id = %account.id(),
                        credits,
                        "free drink earned"
                    );
                }
                StampOutcome::Stamped { remaining } => {
                    tracing::info!(
                        step = %CheckoutStage::Accrue,
                        account_id = %account.id(),
                        remaining,
                        "loyalty card stamped"
                    );
                }
            }
        }

        Ok(validated)
    }

    async fn lookup_discount(
        &self,
        purchase: &ValidatedPurchase,
        cancel: &CancelSignal,
    ) -> Result<DiscountPercent> {
        let timeout = self.config.collaborator_timeout;
        let lookup = tokio::time::timeout(timeout, self.discounts.discount_for(purchase.store_id()));

        let outcome = tokio::select! {
            outcome = lookup => outcome,
            () = cancel.cancelled() => {
                return Err(CheckoutError::Cancelled {
                    stage: CheckoutStage::Discount,
                });
            }
        };

        match outcome {
            Ok(Ok(discount)) => Ok(discount),
            Ok(Err(DiscountLookupError::NoDiscount)) => Ok(DiscountPercent::NONE),
            Ok(Err(e)) => Err(CheckoutError::DiscountLookupFailed(e)),
            Err(_) => Err(CheckoutError::DiscountLookupFailed(
                DiscountLookupError::Timeout(timeout),
            )),
        }
    }

    async fn charge_card(&self, purchase: &ValidatedPurchase) -> Result<()> {
        let card_token = purchase
            .card_token()
            .filter(|token| !token.is_empty())
            .ok_or(CheckoutError::MissingCardToken)?;

        let timeout = self.config.collaborator_timeout;
        let receipt = tokio::time::timeout(
            timeout,
            self.card_gateway.charge(purchase.amount_due(), card_token),
        )
        .await
        .map_err(|_| CheckoutError::ChargeFailed(GatewayError::Timeout(timeout)))?
        .map_err(CheckoutError::ChargeFailed)?;

        tracing::info!(
            step = %CheckoutStage::Charge,
            charge_id = %receipt.charge_id,
            amount = %receipt.amount,
            "card charged"
        );
        Ok(())
    }

    async fn persist(&self, purchase: &ValidatedPurchase) -> Result<()> {
        let timeout = self.config.collaborator_timeout;
        let outcome = tokio::time::timeout(timeout, self.repository.store(purchase))
            .await
            .unwrap_or_else(|_| {
                Err(RepositoryError::Unavailable(format!(
                    "store timed out after {timeout:?}"
                )))
            })
            .map_err(|source| CheckoutError::PersistenceFailed {
                purchase_id: purchase.id(),
                source,
            })?;

        tracing::info!(step = %CheckoutStage::Persist, outcome = ?outcome, "purchase stored");
        Ok(())
    }
}

fn ensure_not_cancelled(cancel: &CancelSignal, stage: CheckoutStage) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(CheckoutError::Cancelled { stage });
    }
    Ok(())
}

async fn redeem_credits<'a>(
    handle: &'a LoyaltyHandle,
    purchase: &ValidatedPurchase,
) -> Result<MutexGuard<'a, LoyaltyAccount>> {
    let mut account = handle.lock().await;
    account
        .pay(purchase.products())
        .map_err(CheckoutError::LoyaltyChargeFailed)?;

    tracing::info!(
        step = %CheckoutStage::Charge,
        account_id = %account.id(),
        redeemed = purchase.product_count(),
        left = account.free_drinks_available(),
        "loyalty credits redeemed"
    );
    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{LoyaltyAccountId, StoreId};
    use domain::{LoyaltyError, Money, Product};
    use purchase_store::InMemoryPurchaseRepository;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    use crate::services::{InMemoryCardGateway, InMemoryDiscountProvider};

    type TestService =
        PurchaseCompletionService<InMemoryCardGateway, InMemoryDiscountProvider, InMemoryPurchaseRepository>;

    fn setup() -> (
        TestService,
        InMemoryCardGateway,
        InMemoryDiscountProvider,
        InMemoryPurchaseRepository,
    ) {
        let gateway = InMemoryCardGateway::new();
        let discounts = InMemoryDiscountProvider::new();
        let repository = InMemoryPurchaseRepository::new();
        let service = PurchaseCompletionService::new(
            gateway.clone(),
            discounts.clone(),
            repository.clone(),
        );
        (service, gateway, discounts, repository)
    }

    fn coffee() -> Product {
        Product::new("DRIP", "Drip coffee", Money::from_cents(250))
    }

    fn account(credits: u32, remaining: u32) -> LoyaltyHandle {
        Arc::new(Mutex::new(
            LoyaltyAccount::restore(LoyaltyAccountId::new(), credits, remaining).unwrap(),
        ))
    }

    #[tokio::test]
    async fn test_card_purchase_is_charged_and_stored() {
        let (service, gateway, _, repository) = setup();
        let purchase = Purchase::card(StoreId::new(), vec![coffee(), coffee()], "tok_visa");

        let completed = service
            .complete(&purchase, None, &CancelSignal::never())
            .await
            .unwrap();

        assert_eq!(completed.amount_due(), Money::from_cents(500));
        assert_eq!(gateway.charged_amounts(), vec![Money::from_cents(500)]);
        assert!(repository.get(completed.id()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_cash_purchase_is_stored_without_charge() {
        let (service, gateway, _, repository) = setup();
        let purchase = Purchase::cash(StoreId::new(), vec![coffee()]);

        service
            .complete(&purchase, None, &CancelSignal::never())
            .await
            .unwrap();

        assert_eq!(gateway.charge_count(), 0);
        assert_eq!(repository.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_card_without_token_is_rejected_before_charging() {
        let (service, gateway, _, repository) = setup();
        let purchase = Purchase::card(StoreId::new(), vec![coffee()], "");

        let result = service
            .complete(&purchase, None, &CancelSignal::never())
            .await;

        assert!(matches!(result, Err(CheckoutError::MissingCardToken)));
        assert_eq!(gateway.charge_count(), 0);
        assert_eq!(repository.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_loyalty_payment_requires_account() {
        let (service, _, _, repository) = setup();
        let purchase = Purchase::loyalty(StoreId::new(), vec![coffee()]);

        let result = service
            .complete(&purchase, None, &CancelSignal::never())
            .await;

        assert!(matches!(result, Err(CheckoutError::LoyaltyAccountRequired)));
        assert_eq!(repository.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_loyalty_payment_redeems_then_stamps() {
        let (service, gateway, _, _) = setup();
        let handle = account(3, 4);
        let purchase = Purchase::loyalty(StoreId::new(), vec![coffee(), coffee()]);

        service
            .complete(&purchase, Some(&handle), &CancelSignal::never())
            .await
            .unwrap();

        let account = handle.lock().await;
        assert_eq!(account.free_drinks_available(), 1);
        assert_eq!(account.remaining_until_free_drink(), 3);
        assert_eq!(gateway.charge_count(), 0);
    }

    #[tokio::test]
    async fn test_insufficient_credits_leave_account_untouched() {
        let (service, _, _, repository) = setup();
        let handle = account(1, 6);
        let purchase = Purchase::loyalty(StoreId::new(), vec![coffee(), coffee()]);

        let result = service
            .complete(&purchase, Some(&handle), &CancelSignal::never())
            .await;

        assert!(matches!(
            result,
            Err(CheckoutError::LoyaltyChargeFailed(
                LoyaltyError::InsufficientBalance {
                    available: 1,
                    required: 2
                }
            ))
        ));
        let account = handle.lock().await;
        assert_eq!(account.free_drinks_available(), 1);
        assert_eq!(account.remaining_until_free_drink(), 6);
        assert_eq!(repository.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_no_discount_is_not_a_failure() {
        let (service, gateway, discounts, _) = setup();
        let purchase = Purchase::card(StoreId::new(), vec![coffee()], "tok_visa");

        let completed = service
            .complete(&purchase, None, &CancelSignal::never())
            .await
            .unwrap();

        assert_eq!(discounts.lookup_count(), 1);
        assert_eq!(completed.discount(), DiscountPercent::NONE);
        assert_eq!(gateway.charged_amounts(), vec![Money::from_cents(250)]);
    }

    #[tokio::test]
    async fn test_cancelled_signal_stops_before_discount() {
        let (service, gateway, discounts, _) = setup();
        let (canceller, signal) = CancelSignal::pair();
        canceller.cancel();
        let purchase = Purchase::card(StoreId::new(), vec![coffee()], "tok_visa");

        let result = service.complete(&purchase, None, &signal).await;

        assert!(matches!(
            result,
            Err(CheckoutError::Cancelled {
                stage: CheckoutStage::Discount
            })
        ));
        assert_eq!(discounts.lookup_count(), 0);
        assert_eq!(gateway.charge_count(), 0);
    }
}
