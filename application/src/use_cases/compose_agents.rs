//! Compose Agents use case
//!
//! Fans one idea out to the agents of every selected domain. Agents run
//! concurrently and never see each other's output. A failing or slow agent
//! is recorded and excluded without aborting its siblings.

use crate::agents::{Agent, AgentError, AgentRegistry};
use crate::ports::progress::{NoProgress, Phase, ProgressNotifier};
use crate::use_cases::shared::{cancelled, deadline_reached};
use ideaforge_domain::{AgentResult, Domain, DomainError, ExcludedDomain, Idea, Turn};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::{self, JoinSet};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Operation cancelled")]
    Cancelled,
}

/// What happened to one agent
#[derive(Debug, Clone, PartialEq)]
pub enum AgentOutcome {
    Completed(AgentResult),
    Failed(AgentError),
    TimedOut,
}

impl AgentOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AgentOutcome::Completed(_))
    }
}

/// Outcome of every selected domain, keyed by domain
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    outcomes: BTreeMap<Domain, AgentOutcome>,
}

impl Composition {
    pub fn outcomes(&self) -> &BTreeMap<Domain, AgentOutcome> {
        &self.outcomes
    }

    pub fn get(&self, domain: Domain) -> Option<&AgentOutcome> {
        self.outcomes.get(&domain)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Split into successful results and exclusions
    pub fn into_parts(self) -> (BTreeMap<Domain, AgentResult>, Vec<ExcludedDomain>) {
        let mut results = BTreeMap::new();
        let mut excluded = Vec::new();
        for (domain, outcome) in self.outcomes {
            match outcome {
                AgentOutcome::Completed(result) => {
                    results.insert(domain, result);
                }
                AgentOutcome::Failed(AgentError::InvocationFailed { cause, .. }) => {
                    excluded.push(ExcludedDomain::failed(domain, cause.to_string()));
                }
                AgentOutcome::Failed(AgentError::TaskAborted { reason, .. }) => {
                    excluded.push(ExcludedDomain::failed(domain, reason));
                }
                AgentOutcome::Failed(AgentError::TimedOut { .. }) | AgentOutcome::TimedOut => {
                    excluded.push(ExcludedDomain::timed_out(domain));
                }
            }
        }
        (results, excluded)
    }
}

/// Use case for composing domain agents
pub struct ComposeAgentsUseCase {
    registry: Arc<AgentRegistry>,
    agent_timeout: Duration,
    request_timeout: Option<Duration>,
    cancellation_token: Option<CancellationToken>,
}

impl ComposeAgentsUseCase {
    pub fn new(registry: Arc<AgentRegistry>) -> Self {
        Self {
            registry,
            agent_timeout: Duration::from_secs(60),
            request_timeout: None,
            cancellation_token: None,
        }
    }

    pub fn with_agent_timeout(mut self, timeout: Duration) -> Self {
        self.agent_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Execute with default (no-op) progress
    pub async fn execute(
        &self,
        idea: &Idea,
        domains: &[Domain],
        context: &[Turn],
    ) -> Result<Composition, ComposeError> {
        self.execute_with_progress(idea, domains, context, &NoProgress)
            .await
    }

    /// Invoke one agent per distinct domain in `domains`.
    ///
    /// Every distinct domain appears exactly once in the returned
    /// [`Composition`]. When the request timeout expires, agents still
    /// running are aborted and recorded as timed out; results that already
    /// arrived are kept.
    pub async fn execute_with_progress(
        &self,
        idea: &Idea,
        domains: &[Domain],
        context: &[Turn],
        progress: &dyn ProgressNotifier,
    ) -> Result<Composition, ComposeError> {
        let selected: BTreeSet<Domain> = domains.iter().copied().collect();
        if selected.is_empty() {
            return Err(DomainError::NoDomainSelected.into());
        }

        info!(idea = %idea.id(), agents = selected.len(), "Composing agents");
        progress.on_phase_start(Phase::Compose, selected.len());

        let idea = Arc::new(idea.clone());
        let context: Arc<Vec<Turn>> = Arc::new(context.to_vec());
        let deadline = self.request_timeout.map(|t| Instant::now() + t);

        let mut join_set = JoinSet::new();
        let mut task_domains = HashMap::new();

        for &domain in &selected {
            let registry = Arc::clone(&self.registry);
            let idea = Arc::clone(&idea);
            let context = Arc::clone(&context);
            let agent_timeout = self.agent_timeout;

            let handle = join_set.spawn(async move {
                let started = std::time::Instant::now();
                let agent = registry.get(domain);
                let outcome =
                    match tokio::time::timeout(agent_timeout, agent.analyze(&idea, &context)).await
                    {
                        Ok(Ok(result)) => AgentOutcome::Completed(result),
                        Ok(Err(e)) => AgentOutcome::Failed(e),
                        Err(_) => AgentOutcome::TimedOut,
                    };
                debug!(%domain, elapsed_ms = started.elapsed().as_millis() as u64, "Agent finished");
                (domain, outcome)
            });
            task_domains.insert(handle.id(), domain);
        }

        let mut outcomes: BTreeMap<Domain, AgentOutcome> = BTreeMap::new();

        loop {
            let joined = tokio::select! {
                biased;
                _ = cancelled(&self.cancellation_token) => {
                    join_set.abort_all();
                    return Err(ComposeError::Cancelled);
                }
                _ = deadline_reached(deadline) => {
                    // Tasks woken at the deadline instant get one turn to deliver
                    tokio::task::yield_now().await;
                    while let Some(joined) = join_set.try_join_next_with_id() {
                        if let Some((domain, outcome)) = settle(joined, &task_domains) {
                            record(domain, outcome, &mut outcomes, progress);
                        }
                    }
                    join_set.abort_all();
                    for &domain in &selected {
                        if !outcomes.contains_key(&domain) {
                            warn!(%domain, "Request deadline reached; agent still pending");
                            progress.on_agent_complete(domain, false);
                            outcomes.insert(domain, AgentOutcome::TimedOut);
                        }
                    }
                    break;
                }
                joined = join_set.join_next_with_id() => joined,
            };

            let Some(joined) = joined else {
                break;
            };
            if let Some((domain, outcome)) = settle(joined, &task_domains) {
                record(domain, outcome, &mut outcomes, progress);
            }
        }

        progress.on_phase_complete(Phase::Compose);
        Ok(Composition { outcomes })
    }
}

type Joined = Result<(task::Id, (Domain, AgentOutcome)), task::JoinError>;

/// Map a joined task to its domain's outcome; a panicked or aborted task
/// counts as a failure of that domain.
fn settle(joined: Joined, task_domains: &HashMap<task::Id, Domain>) -> Option<(Domain, AgentOutcome)> {
    match joined {
        Ok((_, pair)) => Some(pair),
        Err(e) => {
            let Some(&domain) = task_domains.get(&e.id()) else {
                warn!("Task join error for unknown task: {}", e);
                return None;
            };
            warn!(%domain, "Agent task join error: {}", e);
            let reason = e.to_string();
            Some((domain, AgentOutcome::Failed(AgentError::TaskAborted { domain, reason })))
        }
    }
}

fn record(
    domain: Domain,
    outcome: AgentOutcome,
    outcomes: &mut BTreeMap<Domain, AgentOutcome>,
    progress: &dyn ProgressNotifier,
) {
    match &outcome {
        AgentOutcome::Completed(_) => info!(%domain, "Agent responded"),
        AgentOutcome::Failed(e) => warn!(%domain, "Agent failed: {}", e),
        AgentOutcome::TimedOut => warn!(%domain, "Agent timed out"),
    }
    progress.on_agent_complete(domain, outcome.is_success());
    outcomes.insert(domain, outcome);
}
