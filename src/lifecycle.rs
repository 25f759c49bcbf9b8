//! Bet-payout lifecycle
//!
//! Sequences one wager end to end: order creation, hosted checkout,
//! verification, game session, score persistence, payout. Each step is
//! gated on the previous one succeeding; a failure leaves the session at
//! its last reached state and records the error on the user profile, so a
//! captured payment is never silently rolled back.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::GameConfig;
use crate::errors::{LifecycleError, PaymentError, StoreError};
use crate::payment::checkout::{CheckoutGateway, CheckoutOutcome};
use crate::payment::provider::PayoutDestination;
use crate::payment::service::OrderService;
use crate::store::{game_key, payout_key, user_key, DocumentStore};

/// Rupees to paise. The lifecycle is the only layer that converts.
const MINOR_UNITS_PER_RUPEE: u64 = 100;

/// Session states, in lifecycle order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Created,
    Active,
    Completed,
    PayoutRequested,
    PayoutCompleted,
    PayoutFailed,
}

impl SessionStatus {
    fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Created => "created",
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::PayoutRequested => "payout_requested",
            SessionStatus::PayoutCompleted => "payout_completed",
            SessionStatus::PayoutFailed => "payout_failed",
        }
    }
}

/// One paid game run. Created at bet placement, never deleted.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub id: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Entry fee in rupees
    pub bet_amount: u64,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    pub score: u64,
    pub order_id: String,
    pub payment_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_timestamp: Option<DateTime<Utc>>,
}

/// Per-user aggregate document; fields only ever grow or overwrite
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default)]
    pub total_games_played: u64,
    /// Lifetime winnings in rupees
    #[serde(default)]
    pub total_earnings: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_game_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_bet_amount: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_payment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_payout_amount: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_payout_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_payment_error: Option<PaymentErrorRecord>,
}

impl UserProfile {
    fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            total_games_played: 0,
            total_earnings: 0,
            last_game_id: None,
            last_bet_amount: None,
            last_payment_id: None,
            last_payout_amount: None,
            last_payout_date: None,
            last_payment_error: None,
        }
    }
}

/// Last payment failure seen for a user
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentErrorRecord {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

/// Payout request document, one candidate per completed session
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutRequest {
    pub id: String,
    pub user_id: String,
    /// Rupees, recomputed server-side from the persisted score
    pub amount: u64,
    pub status: PayoutStatus,
    pub game_id: String,
    pub payment_details: PayoutDestination,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// How a bet placement resolved
#[derive(Clone, Debug)]
pub enum BetOutcome {
    /// Payment captured and verified; a session is live
    Placed(GameSession),
    /// User closed the checkout; nothing was charged or recorded
    Cancelled,
}

pub struct Lifecycle {
    orders: Arc<OrderService>,
    gateway: Arc<dyn CheckoutGateway>,
    store: Arc<DocumentStore>,
    currency: String,
    game: GameConfig,
    /// Sessions with a payout attempt currently in flight
    payouts_in_flight: DashMap<String, ()>,
}

impl Lifecycle {
    pub fn new(
        orders: Arc<OrderService>,
        gateway: Arc<dyn CheckoutGateway>,
        store: Arc<DocumentStore>,
        currency: impl Into<String>,
        game: GameConfig,
    ) -> Self {
        Self {
            orders,
            gateway,
            store,
            currency: currency.into(),
            game,
            payouts_in_flight: DashMap::new(),
        }
    }

    /// Payout is a pure function of the final score
    pub fn earnings_for(&self, score: u64) -> u64 {
        score / self.game.points_per_unit
    }

    /// Steps 1-3: charge the entry fee and open a session on verified
    /// capture. Cancellation is a clean exit back to the bet screen.
    pub async fn place_bet(
        &self,
        user_id: &str,
        phone: Option<String>,
    ) -> Result<BetOutcome, LifecycleError> {
        let amount_minor = self.game.entry_fee * MINOR_UNITS_PER_RUPEE;

        let order = match self
            .orders
            .create_order(amount_minor, &self.currency, user_id)
            .await
        {
            Ok(order) => order,
            Err(e) => {
                self.note_payment_error(user_id, &e);
                return Err(e.into());
            }
        };

        let outcome = match self.gateway.open(&order).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.note_payment_error(user_id, &e);
                return Err(e.into());
            }
        };

        let (order_id, payment_id, sig) = match outcome {
            CheckoutOutcome::Cancelled => {
                info!(user_id = %user_id, order_id = %order.order_id, "Checkout cancelled by user");
                return Ok(BetOutcome::Cancelled);
            }
            CheckoutOutcome::Failed { reason } => {
                let e = PaymentError::Provider(reason);
                self.note_payment_error(user_id, &e);
                return Err(e.into());
            }
            CheckoutOutcome::Confirmed {
                order_id,
                payment_id,
                signature,
            } => (order_id, payment_id, signature),
        };

        let verified = match self.orders.verify_payment(&order_id, &payment_id, &sig).await {
            Ok(verified) => verified,
            Err(e) => {
                self.note_payment_error(user_id, &e);
                return Err(e.into());
            }
        };

        let now = Utc::now();
        let session = GameSession {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            phone_number: phone,
            bet_amount: self.game.entry_fee,
            start_time: now,
            end_time: None,
            status: SessionStatus::Active,
            score: 0,
            order_id,
            payment_status: verified.status.to_string(),
            payment_timestamp: Some(now),
        };
        self.store.put(&game_key(&session.id), &session)?;

        self.update_profile(user_id, |profile| {
            profile.total_games_played += 1;
            profile.last_game_id = Some(session.id.clone());
            profile.last_bet_amount = Some(session.bet_amount);
            profile.last_payment_id = Some(payment_id.clone());
        })?;

        info!(
            session_id = %session.id,
            user_id = %user_id,
            bet = session.bet_amount,
            "Game session opened"
        );
        Ok(BetOutcome::Placed(session))
    }

    /// Step 4: persist the final score and close the session
    pub async fn complete_game(
        &self,
        session_id: &str,
        final_score: u64,
    ) -> Result<GameSession, LifecycleError> {
        let mut session = self.load_session(session_id)?;
        if session.status != SessionStatus::Active {
            return Err(LifecycleError::InvalidState {
                id: session_id.to_string(),
                status: session.status.as_str().to_string(),
                expected: "active".to_string(),
            });
        }

        session.score = final_score;
        session.status = SessionStatus::Completed;
        session.end_time = Some(Utc::now());
        self.store.put(&game_key(session_id), &session)?;

        info!(session_id = %session_id, score = final_score, "Game completed");
        Ok(session)
    }

    /// Step 5: settle the payout for a completed session. Idempotent per
    /// session: an already-settled session never pays twice, and at most
    /// one attempt runs at a time. A failed attempt leaves the session
    /// retryable.
    pub async fn request_payout(
        &self,
        session_id: &str,
        destination: PayoutDestination,
    ) -> Result<PayoutRequest, LifecycleError> {
        let session = self.load_session(session_id)?;
        match session.status {
            SessionStatus::PayoutCompleted => {
                return Err(LifecycleError::PayoutAlreadyCompleted(
                    session_id.to_string(),
                ));
            }
            SessionStatus::Completed
            | SessionStatus::PayoutRequested
            | SessionStatus::PayoutFailed => {}
            other => {
                return Err(LifecycleError::InvalidState {
                    id: session_id.to_string(),
                    status: other.as_str().to_string(),
                    expected: "completed".to_string(),
                });
            }
        }

        if self
            .payouts_in_flight
            .insert(session_id.to_string(), ())
            .is_some()
        {
            return Err(LifecycleError::PayoutInFlight(session_id.to_string()));
        }
        let result = self.settle_payout(session, destination).await;
        self.payouts_in_flight.remove(session_id);
        result
    }

    async fn settle_payout(
        &self,
        mut session: GameSession,
        destination: PayoutDestination,
    ) -> Result<PayoutRequest, LifecycleError> {
        // Never trust a client-supplied figure: earnings come from the
        // persisted score.
        let earnings = self.earnings_for(session.score);
        let now = Utc::now();

        session.status = SessionStatus::PayoutRequested;
        self.store.put(&game_key(&session.id), &session)?;

        let mut payout = PayoutRequest {
            id: Uuid::new_v4().to_string(),
            user_id: session.user_id.clone(),
            amount: earnings,
            status: PayoutStatus::Pending,
            game_id: session.id.clone(),
            payment_details: destination.clone(),
            created_at: now,
            processed_at: None,
            approved_by: None,
            remarks: None,
        };
        self.store.put(&payout_key(&payout.id), &payout)?;

        if earnings == 0 {
            // Nothing to transfer; the session still settles.
            session.status = SessionStatus::PayoutCompleted;
            self.store.put(&game_key(&session.id), &session)?;
            payout.status = PayoutStatus::Completed;
            payout.processed_at = Some(Utc::now());
            self.store.put(&payout_key(&payout.id), &payout)?;
            info!(session_id = %session.id, "Zero-earnings payout settled");
            return Ok(payout);
        }

        match self
            .orders
            .issue_payout(
                &session.user_id,
                earnings * MINOR_UNITS_PER_RUPEE,
                &destination,
            )
            .await
        {
            Ok(receipt) => {
                session.status = SessionStatus::PayoutCompleted;
                self.store.put(&game_key(&session.id), &session)?;

                payout.status = PayoutStatus::Completed;
                payout.processed_at = Some(Utc::now());
                self.store.put(&payout_key(&payout.id), &payout)?;

                self.update_profile(&session.user_id, |profile| {
                    profile.total_earnings += earnings;
                    profile.last_payout_amount = Some(earnings);
                    profile.last_payout_date = Some(Utc::now());
                })?;

                info!(
                    session_id = %session.id,
                    payout_id = %receipt.payout_id,
                    amount = earnings,
                    "Payout completed"
                );
                Ok(payout)
            }
            Err(e) => {
                error!(session_id = %session.id, error = %e, "Payout failed");
                session.status = SessionStatus::PayoutFailed;
                self.store.put(&game_key(&session.id), &session)?;

                // Keep the request pending so a retry can pick it up.
                payout.remarks = Some(e.to_string());
                self.store.put(&payout_key(&payout.id), &payout)?;

                self.note_payment_error(&session.user_id, &e);
                Err(e.into())
            }
        }
    }

    pub fn session(&self, session_id: &str) -> Result<GameSession, LifecycleError> {
        self.load_session(session_id)
    }

    pub fn profile(&self, user_id: &str) -> Result<Option<UserProfile>, LifecycleError> {
        Ok(self.store.get(&user_key(user_id))?)
    }

    fn load_session(&self, session_id: &str) -> Result<GameSession, LifecycleError> {
        self.store
            .get::<GameSession>(&game_key(session_id))?
            .ok_or_else(|| LifecycleError::SessionNotFound(session_id.to_string()))
    }

    fn update_profile(
        &self,
        user_id: &str,
        update: impl FnOnce(&mut UserProfile),
    ) -> Result<UserProfile, StoreError> {
        let key = user_key(user_id);
        let mut profile = self
            .store
            .get::<UserProfile>(&key)?
            .unwrap_or_else(|| UserProfile::new(user_id));
        update(&mut profile);
        self.store.put(&key, &profile)?;
        Ok(profile)
    }

    /// Best-effort error breadcrumb on the profile; never masks the
    /// original failure.
    fn note_payment_error(&self, user_id: &str, e: &PaymentError) {
        let patch = json!({
            "lastPaymentError": {
                "timestamp": Utc::now(),
                "message": e.to_string(),
            }
        });
        if let Err(store_err) = self.store.merge(&user_key(user_id), patch) {
            warn!(user_id = %user_id, error = %store_err, "Failed to record payment error");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::checkout::ScriptedGateway;
    use crate::payment::provider::InMemoryProvider;

    fn lifecycle() -> (tempfile::TempDir, Lifecycle) {
        let provider = Arc::new(InMemoryProvider::new());
        let orders = Arc::new(OrderService::new(provider.clone(), "secret"));
        let gateway = Arc::new(ScriptedGateway::new(provider, "secret"));
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(DocumentStore::open(dir.path()).expect("open store"));
        let lifecycle = Lifecycle::new(orders, gateway, store, "INR", GameConfig::default());
        (dir, lifecycle)
    }

    #[test]
    fn test_earnings_schedule() {
        let (_dir, lifecycle) = lifecycle();
        assert_eq!(lifecycle.earnings_for(0), 0);
        assert_eq!(lifecycle.earnings_for(9), 0);
        assert_eq!(lifecycle.earnings_for(10), 1);
        assert_eq!(lifecycle.earnings_for(455), 45);
    }

    #[tokio::test]
    async fn test_complete_game_requires_active_session() {
        let (_dir, lifecycle) = lifecycle();
        let outcome = lifecycle.place_bet("user-1", None).await.unwrap();
        let BetOutcome::Placed(session) = outcome else {
            panic!("expected a placed bet");
        };

        let completed = lifecycle.complete_game(&session.id, 120).await.unwrap();
        assert_eq!(completed.status, SessionStatus::Completed);
        assert_eq!(completed.score, 120);
        assert!(completed.end_time.is_some());

        // A completed session is immutable; completing again is rejected.
        let result = lifecycle.complete_game(&session.id, 999).await;
        assert!(matches!(result, Err(LifecycleError::InvalidState { .. })));
        assert_eq!(lifecycle.session(&session.id).unwrap().score, 120);
    }

    #[tokio::test]
    async fn test_payout_requires_completed_session() {
        let (_dir, lifecycle) = lifecycle();
        let BetOutcome::Placed(session) = lifecycle.place_bet("user-1", None).await.unwrap()
        else {
            panic!("expected a placed bet");
        };

        let destination = PayoutDestination {
            upi_id: "player@upi".to_string(),
            account_holder_name: "Player".to_string(),
            phone: "9999999999".to_string(),
        };
        let result = lifecycle.request_payout(&session.id, destination).await;
        assert!(matches!(result, Err(LifecycleError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn test_zero_score_payout_settles_without_credit() {
        let (_dir, lifecycle) = lifecycle();
        let BetOutcome::Placed(session) = lifecycle.place_bet("user-1", None).await.unwrap()
        else {
            panic!("expected a placed bet");
        };
        lifecycle.complete_game(&session.id, 9).await.unwrap();

        let destination = PayoutDestination {
            upi_id: "player@upi".to_string(),
            account_holder_name: "Player".to_string(),
            phone: "9999999999".to_string(),
        };
        let payout = lifecycle
            .request_payout(&session.id, destination)
            .await
            .unwrap();
        assert_eq!(payout.amount, 0);
        assert_eq!(payout.status, PayoutStatus::Completed);
        assert_eq!(
            lifecycle.session(&session.id).unwrap().status,
            SessionStatus::PayoutCompleted
        );
        let profile = lifecycle.profile("user-1").unwrap().unwrap();
        assert_eq!(profile.total_earnings, 0);
    }

    #[tokio::test]
    async fn test_missing_session_is_reported() {
        let (_dir, lifecycle) = lifecycle();
        let result = lifecycle.complete_game("nope", 10).await;
        assert!(matches!(result, Err(LifecycleError::SessionNotFound(_))));
    }
}
