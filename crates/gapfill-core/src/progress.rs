//! Human-readable progress messages for scans and downloads.
//!
//! The only side channel towards a front end: callers pass an optional
//! callback and receive short status lines such as `Downloading x (2/5)`.

/// Progress callback. Must be shareable because cycles run on the blocking pool.
pub type ProgressFn<'a> = &'a (dyn Fn(&str) + Send + Sync);

/// Forward `msg` to the callback, if any.
pub fn report(progress: Option<ProgressFn<'_>>, msg: &str) {
    if let Some(cb) = progress {
        cb(msg);
    }
}
