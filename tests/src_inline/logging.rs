use tracing::Level;

use super::*;

#[test]
fn test_level_for_verbosity() {
    assert_eq!(level_for_verbosity(0), "warn");
    assert_eq!(level_for_verbosity(1), "info");
    assert_eq!(level_for_verbosity(2), "debug");
    assert_eq!(level_for_verbosity(7), "debug");
}

#[test]
fn test_dispatch_level_follows_verbosity() {
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }
    let quiet = build_dispatch(0, false, false);
    let (warn_on, info_on) = tracing::dispatcher::with_default(&quiet, || {
        (tracing::enabled!(Level::WARN), tracing::enabled!(Level::INFO))
    });
    assert!(warn_on);
    assert!(!info_on);

    let loud = build_dispatch(2, true, true);
    let debug_on = tracing::dispatcher::with_default(&loud, || tracing::enabled!(Level::DEBUG));
    assert!(debug_on);
}
