/*!
 * Cost estimation and credit pre-flight tests
 */

use pdflingo::app_config::Config;
use pdflingo::errors::EstimationError;
use pdflingo::estimator::{check_credit, estimate, CreditStatus};
use pdflingo::providers::mock::MockProvider;

#[test]
fn test_estimate_scales_linearly_with_word_count() {
    let pricing = Config::default().pricing;
    let small = estimate(10_000, "claude-sonnet-4-5-20250929", &pricing).unwrap();
    let large = estimate(100_000, "claude-sonnet-4-5-20250929", &pricing).unwrap();

    assert!((large.total_cost / small.total_cost - 10.0).abs() < 0.01);
    assert_eq!(large.input_tokens, small.input_tokens * 10);
}

#[test]
fn test_estimate_output_cost_dominates_for_default_model() {
    // Output tokens price higher than input for every configured model
    let pricing = Config::default().pricing;
    let est = estimate(50_000, "claude-sonnet-4-5-20250929", &pricing).unwrap();
    assert!(est.output_cost > est.input_cost);
    assert!((est.total_cost - (est.input_cost + est.output_cost)).abs() < 1e-9);
}

#[test]
fn test_estimate_differs_by_model() {
    let pricing = Config::default().pricing;
    let sonnet = estimate(50_000, "claude-sonnet-4-5-20250929", &pricing).unwrap();
    let haiku = estimate(50_000, "claude-haiku-4-5-20251001", &pricing).unwrap();

    assert_eq!(sonnet.input_tokens, haiku.input_tokens);
    assert!(sonnet.total_cost > haiku.total_cost);
}

#[test]
fn test_estimate_with_unknown_model_should_fail() {
    let pricing = Config::default().pricing;
    let err = estimate(100, "gpt-nonexistent", &pricing).unwrap_err();
    assert!(matches!(err, EstimationError::UnknownModel(_)));
}

#[test]
fn test_check_credit_with_ample_balance_is_sufficient() {
    let pricing = Config::default().pricing;
    let est = estimate(10_000, "claude-sonnet-4-5-20250929", &pricing).unwrap();
    let provider = MockProvider::working().with_credit(100.0);

    let status = tokio_test::block_on(check_credit(&provider, &est)).unwrap();
    assert!(matches!(status, CreditStatus::Sufficient { .. }));
}

#[tokio::test]
async fn test_check_credit_with_low_balance_is_insufficient() {
    let pricing = Config::default().pricing;
    let est = estimate(1_000_000, "claude-opus-4-6", &pricing).unwrap();
    let provider = MockProvider::working().with_credit(1.0);

    let status = check_credit(&provider, &est).await.unwrap();
    let CreditStatus::Insufficient {
        required,
        available,
    } = status
    else {
        panic!("expected insufficient credit");
    };
    assert_eq!(available, 1.0);
    assert!(required > available);
}

#[tokio::test]
async fn test_check_credit_with_unreachable_endpoint_should_fail() {
    let pricing = Config::default().pricing;
    let est = estimate(100, "claude-sonnet-4-5-20250929", &pricing).unwrap();
    let provider = MockProvider::failing();

    let err = check_credit(&provider, &est).await.unwrap_err();
    assert!(matches!(err, EstimationError::ServiceUnavailable(_)));
}
