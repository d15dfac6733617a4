//! Property tests for accdev.
//!
//! Properties use randomized input generation to protect the invariants
//! the deploy engine and the definition tooling rely on.
//!
//! Run with: `cargo test --test properties`

#[path = "properties/deploy_engine.rs"]
mod deploy_engine;

#[path = "properties/definitions.rs"]
mod definitions;
