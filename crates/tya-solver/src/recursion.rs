//! Unified recursion guard for cycle detection, depth limiting,
//! and iteration bounding in recursive type computations.
//!
//! `RecursionGuard` combines three safety mechanisms:
//! 1. Cycle detection via a visiting set (`FxHashSet<K>`)
//! 2. Depth limiting to prevent stack overflow
//! 3. Iteration bounding to prevent infinite loops
//!
//! [`RecursionProfile`] provides named presets so call sites say what kind of
//! computation they guard instead of repeating magic numbers.

use rustc_hash::FxHashSet;
use std::hash::Hash;

/// Named recursion limit presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionProfile {
    /// Type evaluation: conditional types, mapped types, indexed access,
    /// template literals.
    ///
    /// depth = 1000, iterations = 100,000
    TypeEvaluation,

    /// Generic alias expansion (`Alias<Args>` instantiation chains).
    ///
    /// depth = 1000, iterations = 100,000
    AliasExpansion,
}

impl RecursionProfile {
    /// The `(max_depth, max_iterations)` pair for this profile.
    pub const fn limits(self) -> (u32, u64) {
        match self {
            RecursionProfile::TypeEvaluation => (1000, 100_000),
            RecursionProfile::AliasExpansion => (1000, 100_000),
        }
    }
}

/// Outcome of [`RecursionGuard::enter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterOutcome {
    /// The key was not being visited; the caller owns it until `leave`.
    Entered,
    /// The key is already on the visiting stack (a cycle).
    Cycle,
    /// The depth or iteration limit was hit. The guard is poisoned: every
    /// later `enter` also reports `LimitExceeded`.
    LimitExceeded,
}

/// Recursion guard over keys of type `K`.
pub struct RecursionGuard<K> {
    visiting: FxHashSet<K>,
    depth: u32,
    max_depth: u32,
    iterations: u64,
    max_iterations: u64,
    exceeded: bool,
}

impl<K: Eq + Hash + Copy> RecursionGuard<K> {
    /// Create a guard from a named profile.
    pub fn with_profile(profile: RecursionProfile) -> Self {
        let (max_depth, max_iterations) = profile.limits();
        RecursionGuard {
            visiting: FxHashSet::default(),
            depth: 0,
            max_depth,
            max_iterations,
            iterations: 0,
            exceeded: false,
        }
    }

    /// Override the depth limit (the iteration bound is kept).
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Try to enter a key. On `Entered` the caller must `leave` the same key
    /// when its computation finishes.
    pub fn enter(&mut self, key: K) -> EnterOutcome {
        if self.exceeded {
            return EnterOutcome::LimitExceeded;
        }

        self.iterations = self.iterations.saturating_add(1);
        if self.iterations > self.max_iterations {
            self.exceeded = true;
            return EnterOutcome::LimitExceeded;
        }

        if self.depth >= self.max_depth {
            self.exceeded = true;
            return EnterOutcome::LimitExceeded;
        }

        if !self.visiting.insert(key) {
            return EnterOutcome::Cycle;
        }

        self.depth += 1;
        EnterOutcome::Entered
    }

    /// Leave a previously entered key.
    pub fn leave(&mut self, key: K) {
        let was_present = self.visiting.remove(&key);
        debug_assert!(was_present, "leave() without matching enter()");
        self.depth = self.depth.saturating_sub(1);
    }

    /// Current nesting depth.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Configured depth limit.
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Whether a limit was hit at any point.
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }
}
