//! Generic structural validation shared by every object kind.
//!
//! # Data Flow
//! ```text
//! value implementing Validate
//!     → validate() walks fields through a Context
//!     → rules.rs (reusable field checks)
//!     → ValidationResult (all violations, never just the first)
//! ```
//!
//! # Design Decisions
//! - Validation is a pure function of the value
//! - Nested values report dotted field paths (`httpServer.port`)
//! - Callers decide how to surface the aggregate error

pub mod rules;

use std::fmt;

/// A single failed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path of the offending field.
    pub field: String,
    /// Human-readable reason.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Outcome of validating a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    violations: Vec<Violation>,
}

impl ValidationResult {
    /// True when no rule was violated.
    pub fn valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    /// All violations joined into a single description.
    pub fn error(&self) -> String {
        self.violations
            .iter()
            .map(Violation::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Types that can be checked by the validation engine.
pub trait Validate {
    fn validate(&self, ctx: &mut Context);
}

/// Accumulates violations while a value is walked.
#[derive(Debug, Default)]
pub struct Context {
    path: Vec<String>,
    violations: Vec<Violation>,
}

impl Context {
    /// Record the outcome of a rule applied to `field`.
    pub fn check(&mut self, field: &str, outcome: Result<(), String>) {
        if let Err(message) = outcome {
            self.violations.push(Violation {
                field: self.qualify(field),
                message,
            });
        }
    }

    /// Validate a nested value under `field`.
    pub fn nested<T: Validate + ?Sized>(&mut self, field: &str, value: &T) {
        self.path.push(field.to_string());
        value.validate(self);
        self.path.pop();
    }

    fn qualify(&self, field: &str) -> String {
        let mut parts: Vec<&str> = self.path.iter().map(String::as_str).collect();
        if !field.is_empty() {
            parts.push(field);
        }
        parts.join(".")
    }
}

/// Run every rule of `value` and collect the result.
pub fn validate<T: Validate + ?Sized>(value: &T) -> ValidationResult {
    let mut ctx = Context::default();
    value.validate(&mut ctx);
    ValidationResult {
        violations: ctx.violations,
    }
}
