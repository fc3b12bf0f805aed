//! Order ledger and state machine
//!
//! - **ledger**: delta-based cart mutation, finalize-with-admission, and
//!   staff status transitions
//! - **transitions**: state-machine legality plus role gating
//! - **retry**: the bounded stale-reference retry combinator
//!
//! # Mutation Flow
//!
//! ```text
//! request ──▶ OrderLedger
//!     ├─ 1. begin write transaction (serialized)
//!     ├─ 2. replay dedup (request_id)
//!     ├─ 3. resolve session + cart order (create lazily on first add)
//!     ├─ 4. apply the delta / transition
//!     ├─ 5. persist snapshot and indices
//!     ├─ 6. commit
//!     └─ 7. publish feed event, hand off tickets
//! ```

pub mod ledger;
pub mod retry;
pub mod transitions;

pub use ledger::{CartRef, OrderLedger};
pub use retry::with_fresh_order;
