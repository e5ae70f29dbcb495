use marktest::discovery::FilteringErrorKind;
use marktest::{MarktestError, MethodFilteringError, Result};

#[test]
fn test_method_filtering_messages() {
    let err = MethodFilteringError::NotPublic {
        method: "check".to_string(),
    };
    assert_eq!(err.to_string(), "Method check is marked as a test but it's not public.");

    let err = MethodFilteringError::IncorrectParameters {
        method: "check".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Method check is marked as a test but it has an incorrect number of parameters."
    );

    let err = MethodFilteringError::NoTypeHint {
        method: "check".to_string(),
    };
    assert_eq!(err.to_string(), "Method check is marked as a test but has no type hint.");
    assert_eq!(err.kind(), FilteringErrorKind::NoTypeHint);
}

#[test]
fn test_filtering_error_conversion() {
    let err: MarktestError = MethodFilteringError::IncorrectTypeHint {
        method: "check".to_string(),
        type_hint: "String".to_string(),
    }
    .into();
    assert!(matches!(err, MarktestError::MethodFiltering(_)));
    assert!(err.to_string().contains("has incorrect type hint String."));
}

#[test]
fn test_error_conversion_from_anyhow() {
    let anyhow_err = anyhow::anyhow!("test anyhow error");
    let err: MarktestError = anyhow_err.into();
    assert!(err.to_string().contains("test anyhow error"));
}

#[test]
fn test_result_type() {
    fn returns_error() -> Result<()> {
        Err(MarktestError::Config("bad level".to_string()))
    }

    match returns_error() {
        Err(MarktestError::Config(msg)) => assert_eq!(msg, "bad level"),
        _ => panic!("Expected Config error"),
    }
}
