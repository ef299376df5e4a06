use dfpwm_relay::domain::{CacheKey, TrackReference};

fn key_for(input: &str) -> CacheKey {
    CacheKey::for_track(&TrackReference::resolve(input).unwrap())
}

#[test]
fn given_same_track_when_deriving_key_then_key_is_deterministic() {
    assert_eq!(key_for("dQw4w9WgXcQ"), key_for("dQw4w9WgXcQ"));
}

#[test]
fn given_token_and_its_watch_url_when_deriving_keys_then_keys_match() {
    assert_eq!(
        key_for("dQw4w9WgXcQ"),
        key_for("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
    );
}

#[test]
fn given_distinct_tracks_when_deriving_keys_then_keys_differ() {
    assert_ne!(key_for("dQw4w9WgXcQ"), key_for("9bZkp7q19f0"));
}

#[test]
fn given_track_when_deriving_key_then_key_is_sha256_hex_with_extension() {
    // sha256("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
    let key = key_for("dQw4w9WgXcQ");
    let (digest, extension) = key.as_str().split_once('.').unwrap();

    assert_eq!(extension, "dfpwm");
    assert_eq!(digest.len(), 64);
    assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn given_prefix_when_locating_key_then_prefix_is_joined_once() {
    let key = key_for("dQw4w9WgXcQ");
    assert_eq!(
        key.with_prefix("audio-cache/"),
        format!("audio-cache/{}", key)
    );
    assert_eq!(key.with_prefix(""), key.as_str());
}
