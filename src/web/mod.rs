pub mod responses;
pub mod router;
pub mod state;

pub use state::AppState;
