use parking_lot::{Condvar, Mutex};

/// Holds workers back until the run either starts or is abandoned.
pub(super) struct StartGate {
    // None until decided; then whether workers should run.
    decision: Mutex<Option<bool>>,
    decided: Condvar,
}

/// The coordinator's side of a [`StartGate`]. Dropping it without calling `release()` abandons
/// the run, so workers never wait on a coordinator that has given up.
pub(super) struct GateKeeper<'a> {
    gate: &'a StartGate,
}

impl StartGate {
    pub(super) fn new() -> Self {
        StartGate {
            decision: Mutex::new(None),
            decided: Condvar::new(),
        }
    }

    pub(super) fn keeper(&self) -> GateKeeper<'_> {
        GateKeeper { gate: self }
    }

    /// Blocks until the gate is decided. Returns false if the run was abandoned.
    pub(super) fn wait(&self) -> bool {
        let mut decision = self.decision.lock();
        loop {
            if let Some(run) = *decision {
                return run;
            }
            self.decided.wait(&mut decision);
        }
    }

    fn decide(&self, run: bool) {
        let mut decision = self.decision.lock();
        // First decision wins.
        if decision.is_none() {
            *decision = Some(run);
            self.decided.notify_all();
        }
    }
}

impl GateKeeper<'_> {
    pub(super) fn release(self) {
        self.gate.decide(true);
    }
}

impl Drop for GateKeeper<'_> {
    fn drop(&mut self) {
        self.gate.decide(false);
    }
}
