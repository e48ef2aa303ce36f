use std::collections::{HashMap, VecDeque};

use chrono::NaiveDate;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::debug;

use crate::config::{BackwardPassMode, CpmOptions};
use crate::model::{add_days, RelationshipType, Schedule};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SolveError {
    #[error("{message}: {}", .activity_ids.join(", "))]
    Validation {
        message: String,
        activity_ids: Vec<String>,
    },
    #[error("Relationship '{predecessor}' -> '{successor}' references an unknown activity")]
    UnknownActivity {
        predecessor: String,
        successor: String,
    },
    #[error("Circular dependency detected: {}", .chain.join(" -> "))]
    CycleDetected { chain: Vec<String> },
}

// ---------------------------------------------------------------------------
// Internal CPM result
// ---------------------------------------------------------------------------

/// Day offsets from the schedule anchor, indexed like `schedule.activities`.
pub(crate) struct CpmResult {
    pub early_starts: Vec<i64>,
    pub early_finishes: Vec<i64>,
    pub late_starts: Vec<i64>,
    pub late_finishes: Vec<i64>,
    pub total_floats: Vec<i64>,
    pub project_finish: i64,
}

type Network = DiGraph<usize, (RelationshipType, i64)>;

// ---------------------------------------------------------------------------
// Graph construction and cycle reporting
// ---------------------------------------------------------------------------

fn build_network(schedule: &Schedule) -> Result<Network, SolveError> {
    let n = schedule.activities.len();
    let mut id_to_idx: HashMap<&str, usize> = HashMap::with_capacity(n);
    for (i, a) in schedule.activities.iter().enumerate() {
        id_to_idx.insert(a.external_id.as_str(), i);
    }

    let mut graph: Network = DiGraph::with_capacity(n, schedule.relationships.len());
    // node index == activity index
    let nodes: Vec<NodeIndex> = (0..n).map(|i| graph.add_node(i)).collect();

    for rel in &schedule.relationships {
        let (Some(&pred), Some(&succ)) = (
            id_to_idx.get(rel.predecessor_id.as_str()),
            id_to_idx.get(rel.successor_id.as_str()),
        ) else {
            return Err(SolveError::UnknownActivity {
                predecessor: rel.predecessor_id.clone(),
                successor: rel.successor_id.clone(),
            });
        };
        graph.add_edge(nodes[pred], nodes[succ], (rel.relationship_type, rel.lag));
    }
    Ok(graph)
}

/// Shortest cycle through `start`, as `[start, .., start]`, if one exists.
fn cycle_through(graph: &Network, start: NodeIndex) -> Option<Vec<NodeIndex>> {
    let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut queue = VecDeque::from([start]);

    while let Some(node) = queue.pop_front() {
        for next in graph.neighbors(node) {
            if next == start {
                let mut path = vec![node];
                let mut cur = node;
                while cur != start {
                    match parent.get(&cur) {
                        Some(&p) => {
                            path.push(p);
                            cur = p;
                        }
                        None => break,
                    }
                }
                path.reverse();
                path.push(start);
                return Some(path);
            }
            if let std::collections::hash_map::Entry::Vacant(e) = parent.entry(next) {
                e.insert(node);
                queue.push_back(next);
            }
        }
    }
    None
}

fn find_cycle(graph: &Network, hint: NodeIndex) -> Vec<NodeIndex> {
    if let Some(path) = cycle_through(graph, hint) {
        return path;
    }
    tarjan_scc(graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
        .find_map(|scc| cycle_through(graph, scc[0]))
        .unwrap_or_else(|| vec![hint])
}

/// Check the relationship graph for cycles without running the passes.
pub fn detect_cycle(schedule: &Schedule) -> Result<(), SolveError> {
    let graph = build_network(schedule)?;
    topological_order(schedule, &graph).map(|_| ())
}

fn topological_order(schedule: &Schedule, graph: &Network) -> Result<Vec<NodeIndex>, SolveError> {
    toposort(graph, None).map_err(|cycle| {
        let chain = find_cycle(graph, cycle.node_id())
            .into_iter()
            .map(|node| schedule.activities[node.index()].external_id.clone())
            .collect();
        SolveError::CycleDetected { chain }
    })
}

// ---------------------------------------------------------------------------
// Core CPM implementation
// ---------------------------------------------------------------------------

/// Run the forward and backward passes.
///
/// The forward pass takes each activity's own start date as its earliest
/// start; predecessors do not push it later. The backward pass follows
/// `options.backward_pass`.
pub(crate) fn cpm(schedule: &Schedule, options: &CpmOptions) -> Result<CpmResult, SolveError> {
    // -----------------------------------------------------------------------
    // 1. Inputs present
    // -----------------------------------------------------------------------
    if schedule.activities.is_empty() {
        return Err(SolveError::Validation {
            message: "Schedule has no activities".to_string(),
            activity_ids: Vec::new(),
        });
    }

    let missing: Vec<String> = schedule
        .activities
        .iter()
        .filter(|a| a.start_date.is_none() || a.effective_duration().is_none())
        .map(|a| a.external_id.clone())
        .collect();
    if !missing.is_empty() {
        return Err(SolveError::Validation {
            message: "Activities missing start date or duration".to_string(),
            activity_ids: missing,
        });
    }

    // -----------------------------------------------------------------------
    // 2. Graph + cycle check
    // -----------------------------------------------------------------------
    let graph = build_network(schedule)?;
    let topo_order = topological_order(schedule, &graph)?;

    let anchor = schedule.start_date;
    let n = schedule.activities.len();
    let durations: Vec<i64> = schedule
        .activities
        .iter()
        .map(|a| a.effective_duration().unwrap_or(0) as i64)
        .collect();

    // -----------------------------------------------------------------------
    // 3. Forward pass
    // -----------------------------------------------------------------------
    let early_starts: Vec<i64> = schedule
        .activities
        .iter()
        .map(|a| a.start_date.map(|d| (d - anchor).num_days()).unwrap_or(0))
        .collect();
    let early_finishes: Vec<i64> = (0..n).map(|i| early_starts[i] + durations[i]).collect();

    let project_finish = early_finishes.iter().copied().max().unwrap_or(0);

    // -----------------------------------------------------------------------
    // 4. Backward pass
    // -----------------------------------------------------------------------
    let mut late_finishes: Vec<i64> = vec![project_finish; n];
    let mut late_starts: Vec<i64> = (0..n).map(|i| project_finish - durations[i]).collect();

    if options.backward_pass == BackwardPassMode::Relationships {
        // Successors come first in reverse topological order, so their late
        // dates are final when a predecessor is visited.
        for node in topo_order.iter().rev() {
            let i = node.index();
            for edge in graph.edges(*node) {
                let j = edge.target().index();
                let (rel_type, lag) = *edge.weight();
                let candidate = match rel_type {
                    RelationshipType::FinishToStart => late_starts[j] - lag,
                    RelationshipType::StartToStart => late_starts[j] - lag + durations[i],
                    RelationshipType::FinishToFinish => late_finishes[j] - lag,
                    RelationshipType::StartToFinish => late_finishes[j] - lag + durations[i],
                };
                if candidate < late_finishes[i] {
                    late_finishes[i] = candidate;
                }
            }
            late_starts[i] = late_finishes[i] - durations[i];
        }
    }

    // -----------------------------------------------------------------------
    // 5. Float
    // -----------------------------------------------------------------------
    let total_floats: Vec<i64> = (0..n)
        .map(|i| (late_starts[i] - early_starts[i]).max(0))
        .collect();

    Ok(CpmResult {
        early_starts,
        early_finishes,
        late_starts,
        late_finishes,
        total_floats,
        project_finish,
    })
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

fn offset(anchor: NaiveDate, days: i64) -> Option<NaiveDate> {
    add_days(anchor, days)
}

fn out_of_range(ids: Vec<String>) -> SolveError {
    SolveError::Validation {
        message: "Computed dates fall outside the supported calendar".to_string(),
        activity_ids: ids,
    }
}

/// Recompute every derived timing field and return the updated schedule.
///
/// Pure and idempotent: solving an already solved schedule yields the same
/// result.
pub fn solve(schedule: &Schedule, options: &CpmOptions) -> Result<Schedule, SolveError> {
    let result = cpm(schedule, options)?;
    let anchor = schedule.start_date;
    let mut solved = schedule.clone();

    let mut out_of_calendar = Vec::new();
    for (i, a) in solved.activities.iter_mut().enumerate() {
        a.normalize();
        let dates = (
            offset(anchor, result.early_starts[i]),
            offset(anchor, result.early_finishes[i]),
            offset(anchor, result.late_starts[i]),
            offset(anchor, result.late_finishes[i]),
        );
        let (Some(es), Some(ef), Some(ls), Some(lf)) = dates else {
            out_of_calendar.push(a.external_id.clone());
            continue;
        };
        a.earliest_start = Some(es);
        a.earliest_finish = Some(ef);
        a.latest_start = Some(ls);
        a.latest_finish = Some(lf);
        a.total_float = result.total_floats[i].clamp(0, u32::MAX as i64) as u32;
        a.is_critical = a.total_float == 0;
    }
    if !out_of_calendar.is_empty() {
        return Err(out_of_range(out_of_calendar));
    }

    solved.project_finish =
        Some(offset(anchor, result.project_finish).ok_or_else(|| out_of_range(Vec::new()))?);
    solved.critical_path = solved
        .critical_activities()
        .map(|a| a.external_id.clone())
        .collect();

    debug!(
        project = %solved.project_id,
        activities = solved.activities.len(),
        critical = solved.critical_path.len(),
        "CPM pass complete"
    );
    Ok(solved)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
