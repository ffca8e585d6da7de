//! Docker Compose project input
//!
//! This module reads compose files and reduces each service to the
//! descriptor the converter maps onto Kubernetes resources.

pub mod config;
pub mod descriptor;
pub mod parser;

pub use config::{ComposeConfig, ServiceConfig};
pub use descriptor::ServiceDescriptor;
pub use parser::ComposeParser;
