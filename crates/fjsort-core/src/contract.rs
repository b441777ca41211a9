//! Contract violations: logic bugs in the reduction tree or misuse of a
//! future cell. These never travel as values; they panic on the spot.

/// Report a broken invariant and panic.
///
/// The message is prefixed with `contract violation:` so tests and logs can
/// tell these apart from ordinary task panics.
#[cold]
#[track_caller]
pub fn violated(what: &str) -> ! {
    #[cfg(feature = "tracing")]
    tracing::error!(violation = what, "contract violation");
    panic!("contract violation: {what}");
}
