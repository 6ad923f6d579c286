//! # Lifecycle Module
//!
//! Ownership and ordering protocols shared by every manager:
//! - `singleton`: at most one live instance per slot, explicit reset
//! - `managed`: values only their owning singleton instance may mutate
//! - `stage`: strict, once-only, in-order phase execution

mod managed;
mod singleton;
mod stage;

pub use managed::*;
pub use singleton::*;
pub use stage::*;
