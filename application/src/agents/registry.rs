//! Agent registry: the fixed mapping from domain to agent.
//!
//! Built once at startup and read-only afterwards, so it is shared behind an
//! `Arc` without locking.

use super::domain_agents::DomainAgent;
use crate::ports::text_generator::TextGenerator;
use ideaforge_domain::Domain;
use std::sync::Arc;

pub struct AgentRegistry {
    agents: [DomainAgent; 4],
}

impl AgentRegistry {
    /// One agent per domain, all backed by `generator`
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            agents: Domain::ALL.map(|d| DomainAgent::for_domain(d, Arc::clone(&generator))),
        }
    }

    pub fn get(&self, domain: Domain) -> &DomainAgent {
        &self.agents[domain.index()]
    }
}
