//! Unit tests for session settings resolution.

use super::*;
use mockable::MockEnv;
use rstest::{fixture, rstest};
use std::collections::HashMap;
use std::io::Write;
use tempfile::NamedTempFile;

fn key_file(len: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(&vec![b'z'; len]).expect("write key bytes");
    file
}

fn env_with(vars: HashMap<&'static str, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |name| vars.get(name).cloned());
    env
}

struct ReleaseEnv {
    vars: HashMap<&'static str, String>,
    _key: NamedTempFile,
}

impl ReleaseEnv {
    fn set(mut self, name: &'static str, value: &str) -> Self {
        self.vars.insert(name, value.to_owned());
        self
    }

    fn unset(mut self, name: &'static str) -> Self {
        self.vars.remove(name);
        self
    }

    fn resolve(&self) -> Result<SessionSettings, SessionConfigError> {
        session_settings_from_env(&env_with(self.vars.clone()), BuildMode::Release)
    }
}

#[fixture]
fn release_env() -> ReleaseEnv {
    let key = key_file(MIN_KEY_BYTES);
    let vars = HashMap::from([
        (KEY_FILE_ENV, key.path().to_string_lossy().into_owned()),
        (COOKIE_SECURE_ENV, "1".to_owned()),
        (SAMESITE_ENV, "Strict".to_owned()),
        (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
    ]);
    ReleaseEnv { vars, _key: key }
}

#[rstest]
fn complete_release_configuration_is_accepted(release_env: ReleaseEnv) {
    let settings = release_env.resolve().expect("valid release settings");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Strict);
    assert_eq!(settings.fingerprint().len(), 16);
}

#[rstest]
#[case(COOKIE_SECURE_ENV)]
#[case(SAMESITE_ENV)]
#[case(ALLOW_EPHEMERAL_ENV)]
fn release_requires_every_toggle(release_env: ReleaseEnv, #[case] name: &'static str) {
    let err = release_env.unset(name).resolve().err().expect("missing toggle rejected");
    assert!(matches!(err, SessionConfigError::MissingEnv { name: missing } if missing == name));
}

#[rstest]
#[case(COOKIE_SECURE_ENV, "maybe")]
#[case(SAMESITE_ENV, "sideways")]
#[case(ALLOW_EPHEMERAL_ENV, "")]
fn release_rejects_unrecognised_values(
    release_env: ReleaseEnv,
    #[case] name: &'static str,
    #[case] value: &str,
) {
    let err = release_env.set(name, value).resolve().err().expect("invalid value rejected");
    assert!(matches!(err, SessionConfigError::InvalidEnv { name: bad, .. } if bad == name));
}

#[rstest]
fn release_rejects_same_site_none_without_secure(release_env: ReleaseEnv) {
    let err = release_env
        .set(SAMESITE_ENV, "None")
        .set(COOKIE_SECURE_ENV, "0")
        .resolve()
        .err()
        .expect("insecure SameSite=None rejected");
    assert!(matches!(err, SessionConfigError::InsecureSameSiteNone));
}

#[rstest]
fn release_rejects_ephemeral_keys(release_env: ReleaseEnv) {
    let err = release_env
        .set(ALLOW_EPHEMERAL_ENV, "yes")
        .resolve()
        .err()
        .expect("ephemeral rejected");
    assert!(matches!(err, SessionConfigError::EphemeralNotAllowed));
}

#[rstest]
fn release_rejects_short_keys(release_env: ReleaseEnv) {
    let short = key_file(MIN_KEY_BYTES - 1);
    let err = release_env
        .set(KEY_FILE_ENV, &short.path().to_string_lossy())
        .resolve()
        .err()
        .expect("short key rejected");
    assert!(matches!(
        err,
        SessionConfigError::KeyTooShort { length, .. } if length == MIN_KEY_BYTES - 1
    ));
}

#[rstest]
fn release_rejects_missing_key_file(release_env: ReleaseEnv) {
    let err = release_env
        .set(KEY_FILE_ENV, "/nonexistent/portal-session-key")
        .resolve()
        .err()
        .expect("missing key rejected");
    assert!(matches!(err, SessionConfigError::KeyRead { .. }));
}

#[rstest]
fn debug_falls_back_to_development_defaults() {
    let env = env_with(HashMap::from([
        (KEY_FILE_ENV, "/nonexistent/portal-session-key".to_owned()),
        (SAMESITE_ENV, "bogus".to_owned()),
    ]));
    let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug tolerates gaps");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
fn debug_replaces_underived_short_keys() {
    let tiny = key_file(8);
    let env = env_with(HashMap::from([(
        KEY_FILE_ENV,
        tiny.path().to_string_lossy().into_owned(),
    )]));
    let first = session_settings_from_env(&env, BuildMode::Debug).expect("debug key");
    let second = session_settings_from_env(&env, BuildMode::Debug).expect("debug key");
    assert_ne!(first.fingerprint(), second.fingerprint());
}

#[rstest]
fn debug_derives_from_an_adequate_key_file() {
    let key = key_file(MIN_KEY_BYTES);
    let env = env_with(HashMap::from([(
        KEY_FILE_ENV,
        key.path().to_string_lossy().into_owned(),
    )]));
    let first = session_settings_from_env(&env, BuildMode::Debug).expect("debug key");
    let second = session_settings_from_env(&env, BuildMode::Debug).expect("debug key");
    assert_eq!(first.fingerprint(), second.fingerprint());
}

#[rstest]
#[case("ON", Some(true))]
#[case("off", Some(false))]
#[case("y", None)]
fn flags_accept_common_spellings(#[case] raw: &str, #[case] expected: Option<bool>) {
    assert_eq!(parse_flag(raw), expected);
}
