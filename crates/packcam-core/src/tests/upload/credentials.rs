use crate::{
    Operator, UploadCredentials,
    tests::support::{STANDARD_TOKEN, TRIAL_TOKEN},
};

/// WHAT: The token follows the operator's tier
/// WHY: Trial footage must land in the trial account
#[test]
fn given_operator_tier_when_token_selected_then_matching_token() {
    // Given: Both tokens
    let credentials = UploadCredentials::new(STANDARD_TOKEN, TRIAL_TOKEN);

    // When / Then: Each tier gets its own token
    assert_eq!(
        credentials.token_for(&Operator::new("jdoe", false)),
        STANDARD_TOKEN
    );
    assert_eq!(
        credentials.token_for(&Operator::new("trial-user", true)),
        TRIAL_TOKEN
    );
}

/// WHAT: Debug output hides both tokens
/// WHY: Credentials are logged as part of pipeline spans
#[test]
fn given_credentials_when_debug_formatted_then_tokens_redacted() {
    // Given: Both tokens
    let credentials = UploadCredentials::new(STANDARD_TOKEN, TRIAL_TOKEN);

    // When: Formatting
    let rendered = format!("{credentials:?}");

    // Then: Neither token appears
    assert!(!rendered.contains(STANDARD_TOKEN));
    assert!(!rendered.contains(TRIAL_TOKEN));
    assert!(rendered.contains("<redacted>"));
}
