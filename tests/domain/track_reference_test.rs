use dfpwm_relay::domain::{TrackReference, TrackReferenceError};

#[test]
fn given_https_url_when_resolving_then_url_is_kept_verbatim() {
    let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42";
    let track = TrackReference::resolve(url).unwrap();
    assert_eq!(track.as_str(), url);
}

#[test]
fn given_http_url_with_surrounding_whitespace_when_resolving_then_url_is_trimmed() {
    let track = TrackReference::resolve("  http://example.com/audio.ogg \n").unwrap();
    assert_eq!(track.as_str(), "http://example.com/audio.ogg");
}

#[test]
fn given_uppercase_scheme_when_resolving_then_url_is_accepted() {
    let track = TrackReference::resolve("HTTPS://Example.com/a").unwrap();
    assert_eq!(track.as_str(), "HTTPS://Example.com/a");
}

#[test]
fn given_eleven_character_token_when_resolving_then_watch_url_is_built() {
    let track = TrackReference::resolve("dQw4w9WgXcQ").unwrap();
    assert_eq!(track.as_str(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
}

#[test]
fn given_token_with_dash_and_underscore_when_resolving_then_watch_url_is_built() {
    let track = TrackReference::resolve("a-b_c-d_e-f").unwrap();
    assert_eq!(track.as_str(), "https://www.youtube.com/watch?v=a-b_c-d_e-f");
}

#[test]
fn given_equivalent_inputs_when_resolving_then_references_are_equal() {
    let a = TrackReference::resolve("dQw4w9WgXcQ").unwrap();
    let b = TrackReference::resolve(" dQw4w9WgXcQ ").unwrap();
    assert_eq!(a, b);
}

#[test]
fn given_resolved_url_when_resolving_again_then_result_is_unchanged() {
    let once = TrackReference::resolve("dQw4w9WgXcQ").unwrap();
    let twice = TrackReference::resolve(once.as_str()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn given_invalid_inputs_when_resolving_then_invalid_reference_is_returned() {
    let cases = [
        "",
        "   ",
        "dQw4w9WgXc",
        "dQw4w9WgXcQQ",
        "dQw4w9WgX!Q",
        "ftp://example.com/file",
        "https://",
        "example.com/watch",
        "https://exa mple.com",
    ];

    for case in cases {
        let result = TrackReference::resolve(case);
        assert!(
            matches!(result, Err(TrackReferenceError::InvalidReference(_))),
            "expected {:?} to be rejected, got {:?}",
            case,
            result
        );
    }
}
