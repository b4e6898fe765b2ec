//! Domain agents
//!
//! - [`agent::Agent`]: the shared capability set (analyze, steps, diagram)
//! - [`domain_agents`]: the four concrete experts and [`DomainAgent`] dispatch
//! - [`registry::AgentRegistry`]: fixed domain-to-agent mapping

pub mod agent;
pub mod domain_agents;
pub mod registry;

pub use agent::{Agent, AgentCore, AgentError};
pub use domain_agents::{BusinessAgent, CodeAgent, DomainAgent, ScienceAgent, TechnologyAgent};
pub use registry::AgentRegistry;
