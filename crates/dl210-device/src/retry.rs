use tracing::warn;

/// Run `op` until it succeeds, fails with an error `should_retry` rejects,
/// or `max_attempts` attempts have been made.
///
/// `op` receives the 1-based attempt number. At least one attempt is always
/// made. When attempts run out the last error is returned.
pub fn retry_bounded<T, E, F, P>(max_attempts: usize, mut op: F, should_retry: P) -> Result<T, E>
where
    F: FnMut(usize) -> Result<T, E>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts && should_retry(&err) => {
                warn!(attempt, max_attempts, error = %err, "retrying");
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
