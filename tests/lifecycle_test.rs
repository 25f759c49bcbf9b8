//! End-to-end bet -> play -> payout scenarios over a real document store

use std::sync::Arc;

use arcadia::config::GameConfig;
use arcadia::errors::{LifecycleError, PaymentError};
use arcadia::lifecycle::{BetOutcome, Lifecycle, PayoutStatus, SessionStatus};
use arcadia::payment::checkout::{ScriptStep, ScriptedGateway};
use arcadia::payment::provider::{InMemoryProvider, PayoutDestination};
use arcadia::payment::service::OrderService;
use arcadia::sim::{GameEngine, ObstacleSpawner};
use arcadia::store::DocumentStore;

struct Fixture {
    _dir: tempfile::TempDir,
    provider: Arc<InMemoryProvider>,
    gateway: Arc<ScriptedGateway>,
    lifecycle: Lifecycle,
}

fn fixture() -> Fixture {
    let provider = Arc::new(InMemoryProvider::new());
    let orders = Arc::new(OrderService::new(provider.clone(), "secret"));
    let gateway = Arc::new(ScriptedGateway::new(provider.clone(), "secret"));
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(DocumentStore::open(dir.path()).expect("open store"));
    let lifecycle = Lifecycle::new(
        orders,
        gateway.clone(),
        store,
        "INR",
        GameConfig::default(),
    );
    Fixture {
        _dir: dir,
        provider,
        gateway,
        lifecycle,
    }
}

fn destination() -> PayoutDestination {
    PayoutDestination {
        upi_id: "player@upi".to_string(),
        account_holder_name: "Player One".to_string(),
        phone: "9876543210".to_string(),
    }
}

/// Drive the engine for a fixed number of frames on a frozen clock, so the
/// spawner never fires and the run survives to the target score.
fn run_to_score(frames: u64) -> u64 {
    let mut engine = GameEngine::new(5.0, ObstacleSpawner::with_seed(11));
    engine.start(0);
    for _ in 0..frames {
        engine.advance(0);
    }
    let snapshot = engine.snapshot();
    assert!(!snapshot.game_over);
    snapshot.score
}

#[tokio::test]
async fn test_full_bet_play_payout_flow() {
    let f = fixture();

    let outcome = f.lifecycle.place_bet("user-1", Some("9876543210".into())).await.unwrap();
    let BetOutcome::Placed(session) = outcome else {
        panic!("expected a placed bet");
    };

    // Entry fee converted to minor units exactly once, at order creation.
    assert_eq!(session.bet_amount, 50);
    let order = f.provider.order(&session.order_id).expect("order exists");
    assert_eq!(order.amount, 5000);
    assert_eq!(order.currency, "INR");

    assert_eq!(session.status, SessionStatus::Active);
    assert_eq!(session.payment_status, "captured");

    let profile = f.lifecycle.profile("user-1").unwrap().unwrap();
    assert_eq!(profile.total_games_played, 1);
    assert_eq!(profile.last_bet_amount, Some(50));
    assert_eq!(profile.last_game_id.as_deref(), Some(session.id.as_str()));

    // Survive to 450 points and settle the run.
    let score = run_to_score(450);
    assert_eq!(score, 450);
    let completed = f.lifecycle.complete_game(&session.id, score).await.unwrap();
    assert_eq!(completed.status, SessionStatus::Completed);
    assert_eq!(completed.score, 450);

    // Earnings are recomputed from the persisted score: floor(450/10).
    let payout = f
        .lifecycle
        .request_payout(&session.id, destination())
        .await
        .unwrap();
    assert_eq!(payout.amount, 45);
    assert_eq!(payout.status, PayoutStatus::Completed);
    assert!(payout.processed_at.is_some());
    assert_eq!(payout.payment_details, destination());

    let settled = f.lifecycle.session(&session.id).unwrap();
    assert_eq!(settled.status, SessionStatus::PayoutCompleted);

    let profile = f.lifecycle.profile("user-1").unwrap().unwrap();
    assert_eq!(profile.total_earnings, 45);
    assert_eq!(profile.last_payout_amount, Some(45));
    assert!(profile.last_payout_date.is_some());
}

#[tokio::test]
async fn test_cancelled_checkout_leaves_no_trace() {
    let f = fixture();
    f.gateway.push_step(ScriptStep::Cancel);

    let outcome = f.lifecycle.place_bet("user-1", None).await.unwrap();
    assert!(matches!(outcome, BetOutcome::Cancelled));

    // No session, no charge, no profile writes at all.
    assert!(f.lifecycle.profile("user-1").unwrap().is_none());
}

#[tokio::test]
async fn test_payout_replay_does_not_double_credit() {
    let f = fixture();
    let BetOutcome::Placed(session) = f.lifecycle.place_bet("user-1", None).await.unwrap()
    else {
        panic!("expected a placed bet");
    };
    f.lifecycle.complete_game(&session.id, 200).await.unwrap();

    let payout = f
        .lifecycle
        .request_payout(&session.id, destination())
        .await
        .unwrap();
    assert_eq!(payout.amount, 20);

    let replay = f.lifecycle.request_payout(&session.id, destination()).await;
    assert!(matches!(
        replay,
        Err(LifecycleError::PayoutAlreadyCompleted(_))
    ));

    let profile = f.lifecycle.profile("user-1").unwrap().unwrap();
    assert_eq!(profile.total_earnings, 20);
}

#[tokio::test]
async fn test_failed_payout_is_retryable_without_recharge() {
    let f = fixture();
    let BetOutcome::Placed(session) = f.lifecycle.place_bet("user-1", None).await.unwrap()
    else {
        panic!("expected a placed bet");
    };
    f.lifecycle.complete_game(&session.id, 300).await.unwrap();

    f.provider.set_fail_payouts(true);
    let failed = f.lifecycle.request_payout(&session.id, destination()).await;
    assert!(matches!(
        failed,
        Err(LifecycleError::Payment(PaymentError::Provider(_)))
    ));
    assert_eq!(
        f.lifecycle.session(&session.id).unwrap().status,
        SessionStatus::PayoutFailed
    );
    let profile = f.lifecycle.profile("user-1").unwrap().unwrap();
    assert_eq!(profile.total_earnings, 0);
    assert!(profile.last_payment_error.is_some());

    // Retrying the payout settles it; the entry fee is never re-charged.
    f.provider.set_fail_payouts(false);
    let payout = f
        .lifecycle
        .request_payout(&session.id, destination())
        .await
        .unwrap();
    assert_eq!(payout.amount, 30);

    let profile = f.lifecycle.profile("user-1").unwrap().unwrap();
    assert_eq!(profile.total_earnings, 30);
    assert_eq!(profile.total_games_played, 1);
}

#[tokio::test]
async fn test_tampered_signature_blocks_session_creation() {
    let f = fixture();
    f.gateway.push_step(ScriptStep::TamperSignature);

    let result = f.lifecycle.place_bet("user-1", None).await;
    assert!(matches!(
        result,
        Err(LifecycleError::Payment(PaymentError::SignatureMismatch))
    ));

    // No session reached Active; only the error breadcrumb was written.
    let profile = f.lifecycle.profile("user-1").unwrap().unwrap();
    assert_eq!(profile.total_games_played, 0);
    assert!(profile.last_game_id.is_none());
    assert!(profile.last_payment_error.is_some());
}

#[tokio::test]
async fn test_uncaptured_payment_blocks_session_creation() {
    let f = fixture();
    f.gateway.push_step(ScriptStep::PayWithoutCapture);

    let result = f.lifecycle.place_bet("user-1", None).await;
    assert!(matches!(
        result,
        Err(LifecycleError::Payment(PaymentError::NotCaptured { .. }))
    ));

    let profile = f.lifecycle.profile("user-1").unwrap().unwrap();
    assert_eq!(profile.total_games_played, 0);
}

#[tokio::test]
async fn test_provider_failure_at_checkout_records_error() {
    let f = fixture();
    f.gateway
        .push_step(ScriptStep::Fail("Card declined".to_string()));

    let result = f.lifecycle.place_bet("user-1", None).await;
    assert!(matches!(
        result,
        Err(LifecycleError::Payment(PaymentError::Provider(_)))
    ));

    let profile = f.lifecycle.profile("user-1").unwrap().unwrap();
    let error = profile.last_payment_error.expect("error recorded");
    assert!(error.message.contains("Card declined"));
}
