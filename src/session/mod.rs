pub mod reducer;
pub mod runtime;
pub mod state;
