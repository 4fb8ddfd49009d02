pub mod agents;
pub mod auth;
pub mod backend;
pub mod brochures;
pub mod capture;
pub mod config;
pub mod error;
pub mod inquiries;
pub mod maintenance;
pub mod studio;
pub mod telemetry;
