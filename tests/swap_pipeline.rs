//! Swap Pipeline Integration Tests
//!
//! Drives decoded bundles through the executor and the orchestrator against
//! scripted network and aggregator doubles:
//! 1. Ordering and halting across 1, 2 and 3 transaction bundles
//! 2. Blockhash freshness and signing
//! 3. Confirmation timeouts and cancellation
//! 4. Orchestrator from quote to report
//!
//! All tests are deterministic (no real network calls).

use std::time::Duration;

use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};

use jup_swap::adapters::jupiter::{Quote, QuoteRequest, SwapResponse};
use jup_swap::application::{
    CancelToken, ExecutionConfig, PipelineError, SwapExecutor, SwapOrchestrator,
};
use jup_swap::domain::{
    decode_bundle, DecodedTransaction, ReportStatus, Route, SigningError, Stage, StepError,
    SwapTransactions, TxOutcome, TxRole,
};
use jup_swap::ports::mocks::{
    encode_payload, unsigned_payload, unsigned_transaction, unsigned_v0_transaction,
    ConfirmBehavior, MockNetwork, NetworkCall, StaticAggregator,
};
use jup_swap::ports::NetworkError;

// ============================================================================
// Test Fixtures
// ============================================================================

fn decoded(signers: &[&Pubkey]) -> DecodedTransaction {
    DecodedTransaction::from_base64(&unsigned_payload(signers)).unwrap()
}

fn full_bundle(payer: &Pubkey) -> SwapTransactions<DecodedTransaction> {
    SwapTransactions::swap_only(decoded(&[payer]))
        .with_setup(decoded(&[payer]))
        .with_cleanup(decoded(&[payer]))
}

fn executor(network: &MockNetwork, timeout: Duration) -> SwapExecutor<MockNetwork> {
    SwapExecutor::new(network.clone(), ExecutionConfig::new(timeout))
}

fn route() -> Route {
    serde_json::from_value(serde_json::json!({
        "inAmount": 100_000_000,
        "outAmount": 15_230_000,
        "outAmountWithSlippage": 15_153_850,
        "priceImpactPct": 0.0004,
        "marketInfos": [{
            "id": "2QXXiH1ZvkV9bNUzKbUFXkz6dCPX3x2wnd8NrVPyYyZD",
            "label": "Orca",
            "inputMint": "So11111111111111111111111111111111111111112",
            "outputMint": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
            "notEnoughLiquidity": false,
            "inAmount": 100_000_000,
            "outAmount": 15_230_000,
            "priceImpactPct": 0.0004,
            "lpFee": { "amount": 300, "mint": "So11111111111111111111111111111111111111112", "pct": 0.003 },
            "platformFee": { "amount": 0, "mint": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", "pct": 0 }
        }]
    }))
    .unwrap()
}

/// Call kinds in order, for checking interleaving
fn call_kinds(network: &MockNetwork) -> Vec<&'static str> {
    network
        .get_calls()
        .iter()
        .map(|call| match call {
            NetworkCall::LatestBlockhash { .. } => "blockhash",
            NetworkCall::Submit { .. } => "submit",
            NetworkCall::AwaitConfirmation { .. } => "confirm",
        })
        .collect()
}

// ============================================================================
// Ordering and Halting
// ============================================================================

#[tokio::test]
async fn test_scenario_single_swap_confirms() {
    let wallet = Keypair::new();
    let network = MockNetwork::new();

    let report = executor(&network, Duration::from_secs(1))
        .execute(SwapTransactions::swap_only(decoded(&[&wallet.pubkey()])), &wallet, &CancelToken::new())
        .await;

    assert_eq!(report.status(), ReportStatus::Completed);
    assert_eq!(report.entries().len(), 1);
    assert_eq!(report.entries()[0].role, TxRole::Swap);
    assert!(report.entries()[0].outcome.is_confirmed());
    assert_eq!(network.submitted().len(), 1);
}

#[tokio::test]
async fn test_roles_run_in_order_for_every_bundle_size() {
    let wallet = Keypair::new();
    let payer = wallet.pubkey();

    let bundles = vec![
        (SwapTransactions::swap_only(decoded(&[&payer])), vec![TxRole::Swap]),
        (
            SwapTransactions::swap_only(decoded(&[&payer])).with_cleanup(decoded(&[&payer])),
            vec![TxRole::Swap, TxRole::Cleanup],
        ),
        (full_bundle(&payer), vec![TxRole::Setup, TxRole::Swap, TxRole::Cleanup]),
    ];

    for (bundle, expected_roles) in bundles {
        let network = MockNetwork::new();
        let report = executor(&network, Duration::from_secs(1))
            .execute(bundle, &wallet, &CancelToken::new())
            .await;

        let roles: Vec<TxRole> = report.entries().iter().map(|e| e.role).collect();
        assert_eq!(roles, expected_roles);
        assert!(report.is_complete());

        // Each transaction confirms before the next one fetches a blockhash
        let expected_calls: Vec<&str> = expected_roles
            .iter()
            .flat_map(|_| ["blockhash", "submit", "confirm"])
            .collect();
        assert_eq!(call_kinds(&network), expected_calls);

        let indexes: Vec<usize> = report.entries().iter().map(|e| e.index).collect();
        assert_eq!(indexes, (0..expected_roles.len()).collect::<Vec<_>>());
    }
}

#[tokio::test]
async fn test_scenario_swap_rejected_after_setup() {
    let wallet = Keypair::new();
    let payer = wallet.pubkey();
    let network = MockNetwork::new()
        .reject_submission_at(1, NetworkError::Rejected("custom program error: 0x1771".into()));

    let bundle = SwapTransactions::swap_only(decoded(&[&payer])).with_setup(decoded(&[&payer]));
    let report = executor(&network, Duration::from_secs(1))
        .execute(bundle, &wallet, &CancelToken::new())
        .await;

    assert_eq!(report.entries().len(), 2);
    assert!(report.outcome(TxRole::Setup).unwrap().is_confirmed());
    assert!(matches!(
        report.outcome(TxRole::Swap),
        Some(TxOutcome::Failed { stage: Stage::Submit, error: StepError::Submission(msg) })
            if msg.contains("0x1771")
    ));
    assert!(report.outcome(TxRole::Cleanup).is_none());
    assert_eq!(report.status(), ReportStatus::PartiallyCompleted);
}

#[tokio::test]
async fn test_later_roles_not_attempted_after_failure() {
    let wallet = Keypair::new();
    let network = MockNetwork::new()
        .fail_blockhash_at(1, NetworkError::RpcError("503 Service Unavailable".into()));

    let report = executor(&network, Duration::from_secs(1))
        .execute(full_bundle(&wallet.pubkey()), &wallet, &CancelToken::new())
        .await;

    let outcomes: Vec<&TxOutcome> = report.entries().iter().map(|e| &e.outcome).collect();
    assert!(outcomes[0].is_confirmed());
    assert!(matches!(
        outcomes[1],
        TxOutcome::Failed { stage: Stage::Blockhash, error: StepError::Fetch(_) }
    ));
    assert_eq!(outcomes[2], &TxOutcome::NotAttempted);

    // Nothing after the failing blockhash fetch touched the network
    assert_eq!(call_kinds(&network), vec!["blockhash", "submit", "confirm", "blockhash"]);

    let halt = report.clone().into_result().unwrap_err();
    assert_eq!(halt.index, 1);
    assert_eq!(halt.role, TxRole::Swap);
    assert_eq!(halt.stage, Stage::Blockhash);
    assert_eq!(halt.committed.len(), 1);
    assert_eq!(halt.not_attempted, vec![TxRole::Cleanup]);
    assert_eq!(report.unconfirmed_roles(), vec![TxRole::Swap, TxRole::Cleanup]);
}

#[tokio::test]
async fn test_first_failure_is_failed_before_commit() {
    let wallet = Keypair::new();
    let network = MockNetwork::new()
        .reject_submission_at(0, NetworkError::Rejected("insufficient funds for rent".into()));

    let report = executor(&network, Duration::from_secs(1))
        .execute(full_bundle(&wallet.pubkey()), &wallet, &CancelToken::new())
        .await;

    assert_eq!(report.status(), ReportStatus::FailedBeforeCommit);
    assert!(report.confirmed().is_empty());
    let halt = report.into_result().unwrap_err();
    assert!(!halt.is_partial());
    assert_eq!(halt.not_attempted, vec![TxRole::Swap, TxRole::Cleanup]);
}

// ============================================================================
// Blockhash Freshness and Signing
// ============================================================================

#[tokio::test]
async fn test_fresh_blockhash_per_transaction() {
    let wallet = Keypair::new();
    let network = MockNetwork::new();

    let report = executor(&network, Duration::from_secs(1))
        .execute(full_bundle(&wallet.pubkey()), &wallet, &CancelToken::new())
        .await;
    assert!(report.is_complete());

    let issued = network.issued_blockhashes();
    assert_eq!(issued.len(), 3);
    assert_ne!(issued[0], issued[1]);
    assert_ne!(issued[1], issued[2]);

    let submitted_with: Vec<_> = network
        .get_calls()
        .into_iter()
        .filter_map(|call| match call {
            NetworkCall::Submit { blockhash, .. } => Some(blockhash),
            _ => None,
        })
        .collect();
    assert_eq!(submitted_with, issued);
}

#[tokio::test]
async fn test_scenario_caller_not_required_signer() {
    let wallet = Keypair::new();
    let stranger = Pubkey::new_unique();
    let network = MockNetwork::new();

    let report = executor(&network, Duration::from_secs(1))
        .execute(SwapTransactions::swap_only(decoded(&[&stranger])), &wallet, &CancelToken::new())
        .await;

    assert_eq!(
        report.outcome(TxRole::Swap),
        Some(&TxOutcome::Failed {
            stage: Stage::Sign,
            error: StepError::Signing(SigningError::MissingSigner(stranger)),
        })
    );
    assert!(network.submitted().is_empty());
}

#[tokio::test]
async fn test_multi_key_wallet_signs_every_required_slot() {
    let payer = Keypair::new();
    let co_signer = Keypair::new();
    let network = MockNetwork::new();
    let tx = decoded(&[&payer.pubkey(), &co_signer.pubkey()]);
    assert_eq!(tx.required_signers().len(), 2);

    let keys = vec![Keypair::new(), co_signer, payer];
    let report = executor(&network, Duration::from_secs(1))
        .execute(SwapTransactions::swap_only(tx), &keys, &CancelToken::new())
        .await;

    // MockNetwork verifies every signature before accepting
    assert!(report.is_complete());
}

#[tokio::test]
async fn test_v0_transactions_execute() {
    let wallet = Keypair::new();
    let network = MockNetwork::new();
    let payload = encode_payload(&unsigned_v0_transaction(&wallet.pubkey()));
    let tx = DecodedTransaction::from_base64(&payload).unwrap();

    let report = executor(&network, Duration::from_secs(1))
        .execute(SwapTransactions::swap_only(tx), &wallet, &CancelToken::new())
        .await;
    assert!(report.is_complete());
}

#[test]
fn test_decoded_message_matches_original_bytes() {
    let payer = Pubkey::new_unique();
    let original = unsigned_transaction(&[&payer]);
    let decoded = DecodedTransaction::from_base64(&encode_payload(&original)).unwrap();

    assert_eq!(decoded.message_bytes(), original.message.serialize());
}

#[test]
fn test_bundle_decode_fails_before_any_network_use() {
    let payer = Pubkey::new_unique();
    let payloads = SwapTransactions::swap_only("AAAA".to_string())
        .with_setup(unsigned_payload(&[&payer]));

    let (role, _err) = decode_bundle(payloads).unwrap_err();
    assert_eq!(role, TxRole::Swap);
}

// ============================================================================
// Confirmation Timeouts and Cancellation
// ============================================================================

#[tokio::test]
async fn test_scenario_confirmation_timeout_is_distinct() {
    let wallet = Keypair::new();
    let network = MockNetwork::new().confirmation_at(0, ConfirmBehavior::Hang);
    let timeout = Duration::from_millis(100);

    let report = executor(&network, timeout)
        .execute(SwapTransactions::swap_only(decoded(&[&wallet.pubkey()])), &wallet, &CancelToken::new())
        .await;

    let submitted = network.submitted()[0];
    match report.outcome(TxRole::Swap) {
        Some(TxOutcome::Failed { stage: Stage::Confirm, error }) => {
            assert_eq!(
                error,
                &StepError::ConfirmationTimeout { signature: submitted, timeout }
            );
            assert!(error.is_ambiguous());
        }
        other => panic!("expected confirmation timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_cancel_during_confirmation_is_ambiguous() {
    let wallet = Keypair::new();
    let network = MockNetwork::new().confirmation_at(1, ConfirmBehavior::Hang);
    let cancel = CancelToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let report = executor(&network, Duration::from_secs(30))
        .execute(full_bundle(&wallet.pubkey()), &wallet, &cancel)
        .await;

    assert!(report.outcome(TxRole::Setup).unwrap().is_confirmed());
    let swap_sig = network.submitted()[1];
    assert_eq!(
        report.outcome(TxRole::Swap),
        Some(&TxOutcome::Failed {
            stage: Stage::Confirm,
            error: StepError::CancelledAwaitingConfirmation { signature: swap_sig },
        })
    );
    assert_eq!(report.outcome(TxRole::Cleanup), Some(&TxOutcome::NotAttempted));
    assert_eq!(network.submitted().len(), 2);
}

#[tokio::test]
async fn test_cancel_before_execution_sends_nothing() {
    let wallet = Keypair::new();
    let network = MockNetwork::new();
    let cancel = CancelToken::new();
    cancel.cancel();

    let report = executor(&network, Duration::from_secs(1))
        .execute(full_bundle(&wallet.pubkey()), &wallet, &cancel)
        .await;

    assert_eq!(
        report.outcome(TxRole::Setup),
        Some(&TxOutcome::Failed { stage: Stage::Blockhash, error: StepError::Cancelled })
    );
    assert_eq!(report.status(), ReportStatus::FailedBeforeCommit);
    assert!(network.get_calls().is_empty());
}

// ============================================================================
// Orchestrator
// ============================================================================

#[tokio::test]
async fn test_orchestrator_quote_to_report() {
    let wallet = Keypair::new();
    let payer = wallet.pubkey();
    let aggregator = StaticAggregator::new()
        .with_quote(Quote { routes: vec![route()], time_taken: 0.05 })
        .with_swap_response(SwapResponse {
            setup_transaction: Some(unsigned_payload(&[&payer])),
            swap_transaction: unsigned_payload(&[&payer]),
            cleanup_transaction: Some(String::new()),
        });
    let network = MockNetwork::new();
    let orchestrator = SwapOrchestrator::new(aggregator.clone(), executor(&network, Duration::from_secs(1)));

    let request = QuoteRequest::new(
        "So11111111111111111111111111111111111111112".into(),
        "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".into(),
        100_000_000,
        0.5,
    );
    let attempt = orchestrator
        .swap(&request, payer, &wallet, &CancelToken::new())
        .await
        .unwrap();

    // Empty cleanup payload is dropped, not decoded
    let roles: Vec<TxRole> = attempt.report.entries().iter().map(|e| e.role).collect();
    assert_eq!(roles, vec![TxRole::Setup, TxRole::Swap]);
    assert_eq!(attempt.route.hop_count(), 1);

    let signatures = attempt.into_result().unwrap();
    assert_eq!(signatures, network.submitted());
    assert_eq!(
        aggregator.get_calls(),
        vec![
            format!("quote {} -> {}", request.input_mint, request.output_mint),
            format!("swap {}", payer),
        ]
    );
}

#[tokio::test]
async fn test_orchestrator_fetch_error_before_network() {
    let wallet = Keypair::new();
    let network = MockNetwork::new();
    let orchestrator = SwapOrchestrator::new(StaticAggregator::new(), executor(&network, Duration::from_secs(1)));

    let request = QuoteRequest::new("A".into(), "B".into(), 1, 0.5);
    let err = orchestrator
        .swap(&request, wallet.pubkey(), &wallet, &CancelToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Fetch(_)));
    assert!(network.get_calls().is_empty());
}
