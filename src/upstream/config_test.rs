use super::*;

#[test]
fn model_id_defaults_when_unset() {
    assert_eq!(parse_model_id("TEXT_MODEL", None, DEFAULT_TEXT_MODEL).unwrap(), DEFAULT_TEXT_MODEL);
}

#[test]
fn model_id_accepts_owner_name_and_version() {
    let raw = Some(" acme/painter:0123abcd ".to_string());
    assert_eq!(parse_model_id("TEXT_MODEL", raw, DEFAULT_TEXT_MODEL).unwrap(), "acme/painter:0123abcd");
}

#[test]
fn model_id_rejects_malformed() {
    for bad in ["painter", "/painter", "acme/", "a/b/c"] {
        let err = parse_model_id("REFERENCE_MODEL", Some(bad.to_string()), DEFAULT_REFERENCE_MODEL).unwrap_err();
        assert!(err.to_string().contains("REFERENCE_MODEL"), "expected error for {bad:?}");
    }
}

#[test]
fn default_config_has_no_credential() {
    let cfg = UpstreamConfig::default();
    assert!(cfg.api_token.is_none());
    assert_eq!(cfg.base_url, DEFAULT_REPLICATE_BASE_URL);
    assert_eq!(
        cfg.timeouts,
        UpstreamTimeouts {
            request_secs: DEFAULT_UPSTREAM_REQUEST_TIMEOUT_SECS,
            connect_secs: DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS,
        }
    );
    assert!(!cfg.file_output);
}
