pub mod controller;
pub mod response;
mod state;

pub use state::AppState;
