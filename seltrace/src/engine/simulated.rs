//! Simulated instrumentation engine
//!
//! A deterministic stand-in for a real binary-instrumentation engine. The
//! "target program" is whatever drives it: each [`SimulatedEngine::execute`]
//! is one executed instruction, each [`SimulatedEngine::call`] one call to a
//! target function.
//!
//! Like a real engine, it runs the discovery hooks the first time it sees an
//! instruction address and caches the returned probes for that site until the
//! site is invalidated. Later executions reuse the cached probes without
//! asking again.

use super::{
    Access, AccessHook, CallHook, CodeSite, DiscoveryHook, ExitHook, Instrumentation,
    MemoryOperand, Probe,
};
use crate::domain::Address;
use log::{debug, warn};
use std::collections::HashMap;

#[derive(Default)]
pub struct SimulatedEngine {
    discovery: Vec<DiscoveryHook>,
    access: Vec<AccessHook>,
    calls: HashMap<&'static str, Vec<CallHook>>,
    exit: Vec<ExitHook>,
    sites: HashMap<Address, Vec<Probe>>,
    exited: bool,
}

impl SimulatedEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The target calls function `symbol` with integer arguments `args`
    ///
    /// Returns whether any hook intercepted the call. Calls to functions
    /// nobody intercepts run uninstrumented.
    pub fn call(&mut self, symbol: &str, args: &[u64]) -> bool {
        if self.exited {
            warn!("call to {symbol} after exit ignored");
            return false;
        }
        match self.calls.get(symbol) {
            Some(hooks) => {
                for hook in hooks {
                    hook(args);
                }
                true
            }
            None => false,
        }
    }

    /// The target executes the instruction at `instruction`, whose memory
    /// operands resolve to the given effective addresses
    ///
    /// Returns the number of probes that fired.
    pub fn execute(&mut self, instruction: Address, operands: &[(MemoryOperand, Address)]) -> usize {
        if self.exited {
            warn!("instruction {instruction} executed after exit ignored");
            return 0;
        }

        if !self.sites.contains_key(&instruction) {
            let site = CodeSite {
                instruction,
                operands: operands.iter().map(|(kind, _)| *kind).collect(),
            };
            let probes: Vec<Probe> = self.discovery.iter().flat_map(|hook| hook(&site)).collect();
            debug!("discovered {instruction}: {} probe(s)", probes.len());
            self.sites.insert(instruction, probes);
        }

        let mut fired = 0;
        for probe in &self.sites[&instruction] {
            let Some((_, address)) = operands.get(probe.operand) else {
                continue;
            };
            let access = Access { instruction, address: *address, direction: probe.direction };
            for hook in &self.access {
                hook(access);
            }
            fired += 1;
        }
        fired
    }

    /// Drop cached probes for a site, so its next execution is rediscovered
    pub fn invalidate(&mut self, instruction: Address) -> bool {
        self.sites.remove(&instruction).is_some()
    }

    /// Drop every cached site
    pub fn flush_code_cache(&mut self) {
        self.sites.clear();
    }

    /// The target terminates normally with `code`
    ///
    /// Exit hooks run exactly once; returns whether they ran on this call.
    pub fn exit(&mut self, code: i32) -> bool {
        if self.exited {
            return false;
        }
        self.exited = true;
        for hook in self.exit.drain(..) {
            hook(code);
        }
        true
    }

    #[must_use]
    pub fn has_exited(&self) -> bool {
        self.exited
    }

    #[must_use]
    pub fn discovered_sites(&self) -> usize {
        self.sites.len()
    }

    /// Probes installed for a discovered site
    #[must_use]
    pub fn probes_at(&self, instruction: Address) -> Option<&[Probe]> {
        self.sites.get(&instruction).map(Vec::as_slice)
    }
}

impl Instrumentation for SimulatedEngine {
    fn on_code_discovered(&mut self, hook: DiscoveryHook) {
        self.discovery.push(hook);
    }

    fn on_access(&mut self, hook: AccessHook) {
        self.access.push(hook);
    }

    fn intercept_call(&mut self, symbol: &'static str, hook: CallHook) {
        self.calls.entry(symbol).or_default().push(hook);
    }

    fn on_exit(&mut self, hook: ExitHook) {
        self.exit.push(hook);
    }
}
