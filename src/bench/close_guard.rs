use crate::commitlog::Log;

/// Closes the log when dropped, so every exit path out of a run releases it.
pub(super) struct CloseGuard<'a, L: Log + ?Sized> {
    logger: &'a slog::Logger,
    log: &'a L,
}

impl<'a, L: Log + ?Sized> CloseGuard<'a, L> {
    pub(super) fn new(logger: &'a slog::Logger, log: &'a L) -> Self {
        CloseGuard { logger, log }
    }
}

impl<L: Log + ?Sized> Drop for CloseGuard<'_, L> {
    fn drop(&mut self) {
        if let Err(e) = self.log.close() {
            slog::warn!(self.logger, "Failed to close log after benchmark: {}", e);
        }
    }
}
