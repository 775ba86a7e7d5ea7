// simulation_engine/mod.rs
pub mod emergency;
pub mod events;
pub mod simulation;
pub mod state;
pub mod vehicles;
