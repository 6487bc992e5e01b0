use super::*;

#[test]
fn test_error_code_display() {
    assert_eq!(ErrorCode::E1001.to_string(), "E1001");
    assert_eq!(ErrorCode::E4005.as_str(), "E4005");
}

#[test]
fn test_error_code_families() {
    assert!(ErrorCode::E2001.is_bind_error());
    assert!(ErrorCode::E5001.is_bind_error());
    assert!(!ErrorCode::E3002.is_bind_error());
    assert!(ErrorCode::E3003.is_frame_error());
}

#[test]
fn test_error_code_descriptions_are_lowercase() {
    for code in [ErrorCode::E1002, ErrorCode::E6003, ErrorCode::E9001] {
        let desc = code.description();
        assert!(!desc.is_empty());
        assert_eq!(desc, desc.to_lowercase());
    }
}
