pub mod gating;
pub mod heartbeat;
pub mod routes;
