/// Runs store work inline on the UI thread. Kept as a seam so the desktop
/// shell can move heavy calls off-thread without touching callers.
pub fn run_blocking<F, T>(f: F) -> T
where
    F: FnOnce() -> T,
{
    f()
}
