use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_display_matches_variant_name() {
    assert_eq!(DiagnosticCode::W2000.to_string(), "W2000");
    assert_eq!(format!("{}", DiagnosticCode::E0002), "E0002");
}

#[test]
fn test_default_severity() {
    assert_eq!(DiagnosticCode::E0001.default_severity(), Severity::Error);
    assert_eq!(DiagnosticCode::W3000.default_severity(), Severity::Warning);
}

#[test]
fn test_exportability_range() {
    assert!(DiagnosticCode::W1007.is_exportability());
    assert!(!DiagnosticCode::W2000.is_exportability());
}
