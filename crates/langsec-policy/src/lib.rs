//! # langsec-policy
//!
//! The rule engine: a fixed, ordered list of validators executed against the
//! resolved form of a query. Each validator asks one question of the
//! `(schema, resolved query)` pair and reports typed diagnostics; the
//! [`QueryEngine`] composes the pre-parse gate, the parser adapter, the
//! resolver, and the validator list into the single
//! `(schema, query) -> Result` function the façade exposes.
//!
//! Validator order is fixed for diagnostic quality — "table denied" is
//! reported before "column denied on that table" — and has no effect on the
//! pass/fail outcome. Fail-fast and collect-all modes agree on pass/fail by
//! construction: every validator always evaluates its full input, fail-fast
//! merely stops after the first validator that found anything.

pub mod engine;
pub mod rules;

pub use engine::{FailureMode, QueryEngine};
