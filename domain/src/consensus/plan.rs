//! Merged implementation plan
//!
//! Each agent's steps form a sub-sequence. Sub-sequences are interleaved by
//! topological sort over two kinds of edges: the implicit order within each
//! agent and the declared `depends_on` references, which may cross agents.
//! Among ready steps the one from the highest-precedence domain (then the
//! lowest local position) goes first, so the plan is deterministic and falls
//! back to domain order when no dependency links exist.

use crate::analysis::result::AgentResult;
use crate::consensus::result::MergedStep;
use crate::core::domain::Domain;
use crate::core::error::DomainError;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

struct Node<'a> {
    domain: Domain,
    source_index: usize,
    description: &'a str,
    declared: Option<usize>,
}

/// Interleave the steps of `results`, which must already be in precedence
/// order.
///
/// Returns the merged plan plus warnings for dependency references that
/// point at steps outside the plan. A dependency cycle fails with
/// [`DomainError::InconsistentStepOrdering`].
pub fn interleave_steps(
    results: &[&AgentResult],
) -> Result<(Vec<MergedStep>, Vec<String>), DomainError> {
    let mut nodes: Vec<Node<'_>> = Vec::new();
    let mut lookup: HashMap<(Domain, usize), usize> = HashMap::new();

    for result in results {
        for step in &result.steps {
            let id = nodes.len();
            lookup.entry((result.domain, step.index)).or_insert(id);
            nodes.push(Node {
                domain: result.domain,
                source_index: step.index,
                description: &step.description,
                declared: None,
            });
        }
    }

    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut in_degree: Vec<usize> = vec![0; nodes.len()];
    let mut warnings = Vec::new();

    let mut id = 0;
    for result in results {
        for (position, step) in result.steps.iter().enumerate() {
            if position > 0 {
                successors[id - 1].push(id);
                in_degree[id] += 1;
            }
            if let Some(reference) = step.depends_on {
                let target_domain = reference.target_domain(result.domain);
                match lookup.get(&(target_domain, reference.index)) {
                    Some(&target) => {
                        successors[target].push(id);
                        in_degree[id] += 1;
                        nodes[id].declared = Some(target);
                    }
                    None => warnings.push(format!(
                        "{} step {} depends on {} step {}, which is not in the plan; dependency ignored",
                        result.domain, step.index, target_domain, reference.index
                    )),
                }
            }
            id += 1;
        }
    }

    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, d)| **d == 0)
        .map(|(i, _)| Reverse(i))
        .collect();
    let mut order: Vec<usize> = Vec::with_capacity(nodes.len());

    while let Some(Reverse(current)) = ready.pop() {
        order.push(current);
        for &next in &successors[current] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.push(Reverse(next));
            }
        }
    }

    if order.len() < nodes.len() {
        let stuck = in_degree
            .iter()
            .position(|d| *d > 0)
            .map(|i| format!("{} step {}", nodes[i].domain, nodes[i].source_index))
            .unwrap_or_default();
        return Err(DomainError::InconsistentStepOrdering(stuck));
    }

    let mut sequence_of = vec![0usize; nodes.len()];
    for (position, node_id) in order.iter().enumerate() {
        sequence_of[*node_id] = position + 1;
    }

    let steps = order
        .iter()
        .map(|&node_id| {
            let node = &nodes[node_id];
            MergedStep {
                sequence: sequence_of[node_id],
                domain: node.domain,
                source_index: node.source_index,
                description: node.description.to_string(),
                after: node.declared.map(|target| sequence_of[target]),
            }
        })
        .collect();

    Ok((steps, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::result::{ImplementationStep, StepRef};

    fn labels(steps: &[MergedStep]) -> Vec<String> {
        steps
            .iter()
            .map(|s| format!("{}{}", s.domain, s.source_index))
            .collect()
    }

    fn steps(domain: Domain, items: Vec<ImplementationStep>) -> AgentResult {
        AgentResult::new(domain).with_steps(items)
    }

    #[test]
    fn test_no_links_falls_back_to_domain_order() {
        let code = steps(
            Domain::Code,
            vec![ImplementationStep::new(1, "a"), ImplementationStep::new(2, "b")],
        );
        let business = steps(Domain::Business, vec![ImplementationStep::new(1, "c")]);

        let (plan, warnings) = interleave_steps(&[&code, &business]).unwrap();
        assert_eq!(labels(&plan), vec!["code1", "code2", "business1"]);
        assert_eq!(
            plan.iter().map(|s| s.sequence).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_cross_domain_dependency_interleaves() {
        let code = steps(
            Domain::Code,
            vec![
                ImplementationStep::new(1, "set up repo"),
                ImplementationStep::new(2, "build pricing api")
                    .depends_on(StepRef::in_domain(Domain::Business, 1)),
                ImplementationStep::new(3, "ship"),
            ],
        );
        let business = steps(
            Domain::Business,
            vec![
                ImplementationStep::new(1, "define pricing tiers"),
                ImplementationStep::new(2, "launch"),
            ],
        );

        let (plan, _) = interleave_steps(&[&code, &business]).unwrap();
        assert_eq!(
            labels(&plan),
            vec!["code1", "business1", "code2", "code3", "business2"]
        );
        assert_eq!(plan[2].after, Some(2));
        assert_eq!(plan[0].after, None);
    }

    #[test]
    fn test_local_dependency_records_after() {
        let science = steps(
            Domain::Science,
            vec![
                ImplementationStep::new(1, "hypothesis"),
                ImplementationStep::new(2, "collect"),
                ImplementationStep::new(3, "analyze").depends_on(StepRef::local(1)),
            ],
        );
        let (plan, _) = interleave_steps(&[&science]).unwrap();
        assert_eq!(labels(&plan), vec!["science1", "science2", "science3"]);
        assert_eq!(plan[2].after, Some(1));
    }

    #[test]
    fn test_reference_to_missing_step_warns() {
        let code = steps(
            Domain::Code,
            vec![ImplementationStep::new(1, "a").depends_on(StepRef::in_domain(Domain::Science, 4))],
        );
        let (plan, warnings) = interleave_steps(&[&code]).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].after, None);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("science step 4"));
    }

    #[test]
    fn test_cross_agent_cycle_is_rejected() {
        let code = steps(
            Domain::Code,
            vec![ImplementationStep::new(1, "a").depends_on(StepRef::in_domain(Domain::Business, 1))],
        );
        let business = steps(
            Domain::Business,
            vec![ImplementationStep::new(1, "b").depends_on(StepRef::in_domain(Domain::Code, 1))],
        );

        let err = interleave_steps(&[&code, &business]).unwrap_err();
        assert!(matches!(err, DomainError::InconsistentStepOrdering(_)));
    }

    #[test]
    fn test_forward_local_reference_is_a_cycle() {
        let code = steps(
            Domain::Code,
            vec![
                ImplementationStep::new(1, "a").depends_on(StepRef::local(2)),
                ImplementationStep::new(2, "b"),
            ],
        );
        assert_eq!(
            interleave_steps(&[&code]).unwrap_err(),
            DomainError::InconsistentStepOrdering("code step 1".to_string())
        );
    }

    #[test]
    fn test_empty_input() {
        let (plan, warnings) = interleave_steps(&[]).unwrap();
        assert!(plan.is_empty());
        assert!(warnings.is_empty());
    }
}
