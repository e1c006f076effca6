//! Fee ledger engine: challan generation, payment lifecycle, publishing to
//! student views and collection reporting.

pub mod backend;

pub use backend::{build_state, create_router, initialize_backend, AppState};
