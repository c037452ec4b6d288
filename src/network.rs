//! The dependency graph of cells and the engine that keeps it up to date.
//!
//! A [`Network`] owns every slot: the externally supplied sources and the outputs of its cells.
//! Edges run from an input slot to the cell that reads it. Edges are only committed after a walk
//! over the ancestors of the new cell proves they cannot close a cycle, so the graph is acyclic at
//! all times.
//!
//! Nothing is computed until [`Network::configure`] runs, which evaluates every cell once in
//! topological order. After that, [`Network::set`] pushes a change through the graph before it
//! returns. Dependents are queued on a worklist ordered by topological rank, so a cell is
//! evaluated at most once per change and only after every changed ancestor has settled.
use crate::{
    cell::Cell,
    error::{AnalysisError, Result},
    quantity::Quantity,
};
use petgraph::{
    algo::toposort,
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
    Direction,
};
use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashSet},
    fmt,
    sync::atomic::{AtomicU32, Ordering},
};
use tracing::{debug, trace, warn};

static NEXT_NETWORK_ID: AtomicU32 = AtomicU32::new(0);

/// An opaque handle to a slot in a network, either a source or the output of a cell.
///
/// A handle remembers the network that issued it and is rejected by every other network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ref {
    network: u32,
    idx: NodeIndex,
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.idx.index())
    }
}

/// What happened in the network as the result of one change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    /// Cells that were evaluated, in evaluation order.
    pub recomputed: Vec<Ref>,
    /// Slots whose value changed, including the source that was set.
    pub changed: Vec<Ref>,
    /// Cells whose formula failed; their outputs were left as they were.
    pub failed: Vec<Ref>,
}

impl Update {
    /// Did nothing happen?
    pub fn is_empty(&self) -> bool {
        self.recomputed.is_empty() && self.changed.is_empty() && self.failed.is_empty()
    }

    /// Append the record of a later change.
    pub fn merge(&mut self, later: Update) {
        self.recomputed.extend(later.recomputed);
        self.changed.extend(later.changed);
        self.failed.extend(later.failed);
    }
}

struct Slot {
    name: String,
    value: Quantity,
    cell: Option<Cell>,
    failure: Option<AnalysisError>,
}

enum Outcome {
    Unchanged,
    Changed,
    Failed,
}

/// A set of cells and the edges between them.
pub struct Network {
    id: u32,
    // Edge weights are the input position on the consuming cell.
    graph: DiGraph<Slot, usize>,
    // Topological rank of every slot, valid once configured.
    rank: Vec<usize>,
    configured: bool,
}

impl Network {
    /// Create an empty network.
    pub fn new() -> Self {
        Network {
            id: NEXT_NETWORK_ID.fetch_add(1, Ordering::Relaxed),
            graph: DiGraph::new(),
            rank: vec![],
            configured: false,
        }
    }

    /// Add an externally supplied value. The initial value fixes the shape and kind every later
    /// value must conform to.
    pub fn source<S: Into<String>>(&mut self, name: S, initial: Quantity) -> Ref {
        let idx = self.graph.add_node(Slot {
            name: name.into(),
            value: initial,
            cell: None,
            failure: None,
        });

        if self.configured {
            self.rank.push(self.rank.len());
        }

        self.handle(idx)
    }

    /// Add a cell, returning the handle of its output.
    pub fn add(&mut self, cell: Cell) -> Result<Ref> {
        for input in &cell.inputs {
            self.check(input.source)?;
        }

        let idx = self.graph.add_node(Slot {
            name: cell.name.clone(),
            value: cell.missing.clone(),
            cell: None,
            failure: None,
        });

        self.check_cycle(idx, &cell)?;
        self.attach(idx, cell, false)?;

        Ok(self.handle(idx))
    }

    /// Make a cell the producer of an existing source that no cell produces yet.
    ///
    /// This allows wiring a cell to read a slot whose producer is added later. Every edge is
    /// checked, so wiring that would make a cell depend on its own output is rejected.
    pub fn add_into(&mut self, target: Ref, cell: Cell) -> Result<()> {
        let idx = self.check(target)?;
        for input in &cell.inputs {
            self.check(input.source)?;
        }

        let slot = &self.graph[idx];
        if slot.cell.is_some() {
            return Err(AnalysisError::AlreadyProduced(target));
        }

        if !slot.value.conforms_to(&cell.missing) {
            return Err(AnalysisError::mismatch(
                cell.missing.describe(),
                slot.value.describe(),
            ));
        }

        self.check_cycle(idx, &cell)?;

        // Readers already saw the value supplied from outside.
        let previous = std::mem::replace(&mut self.graph[idx].value, cell.missing.clone());
        let readers_stale = previous != cell.missing;
        self.attach(idx, cell, readers_stale)
    }

    /// Arrange the cells in dependency order, evaluate each one once, and start propagating
    /// changes. Calling this again does nothing.
    pub fn configure(&mut self) -> Result<()> {
        if self.configured {
            return Ok(());
        }

        let order = self.rerank()?;
        let mut update = Update::default();
        for idx in order {
            if self.graph[idx].cell.is_some() {
                self.evaluate_into(idx, &mut update);
            }
        }

        debug!(
            cells = update.recomputed.len(),
            failed = update.failed.len(),
            "network configured"
        );

        self.configured = true;
        Ok(())
    }

    /// Supply a new value for a source and propagate it.
    ///
    /// Setting a value equal to the current one does nothing. Before [`configure`] the value is
    /// stored but not propagated.
    ///
    /// [`configure`]: Network::configure
    pub fn set(&mut self, target: Ref, value: Quantity) -> Result<Update> {
        let idx = self.check(target)?;

        let slot = &self.graph[idx];
        if slot.cell.is_some() {
            return Err(AnalysisError::NotASource(target));
        }

        if !value.conforms_to(&slot.value) {
            return Err(AnalysisError::mismatch(
                slot.value.describe(),
                value.describe(),
            ));
        }

        if value == slot.value {
            return Ok(Update::default());
        }

        self.graph[idx].value = value;
        let mut update = Update {
            changed: vec![target],
            ..Update::default()
        };

        if self.configured {
            let seeds = self.enabled_dependents(idx);
            self.cascade(seeds, &mut update);
        }

        Ok(update)
    }

    /// Turn change notifications from one input of a cell on or off.
    ///
    /// A disabled input is still read when the cell computes. Turning an input back on evaluates
    /// the cell, since its source may have changed in the meantime.
    pub fn set_input_enabled(
        &mut self,
        cell: Ref,
        position: usize,
        enabled: bool,
    ) -> Result<Update> {
        let idx = self.check(cell)?;

        match self.graph[idx].cell.as_mut() {
            Some(c) => c.input_mut(position)?.enabled = enabled,
            None => return Err(AnalysisError::NotASource(cell)),
        }

        let mut update = Update::default();
        if enabled && self.configured {
            self.cascade(vec![idx], &mut update);
        }

        Ok(update)
    }

    /// Every slot in the network, in the order they were added.
    pub fn refs(&self) -> impl Iterator<Item = Ref> + '_ {
        self.graph.node_indices().map(move |idx| self.handle(idx))
    }

    /// The current value of a slot.
    pub fn value(&self, r: Ref) -> Result<&Quantity> {
        let idx = self.check(r)?;
        Ok(&self.graph[idx].value)
    }

    /// The name of a slot.
    pub fn name(&self, r: Ref) -> Result<&str> {
        let idx = self.check(r)?;
        Ok(&self.graph[idx].name)
    }

    /// The error from the most recent evaluation of a cell, if it failed.
    ///
    /// A failed cell keeps its previous output, so this is the only way to tell a stale value from
    /// a fresh one.
    pub fn failure(&self, r: Ref) -> Result<Option<&AnalysisError>> {
        let idx = self.check(r)?;
        Ok(self.graph[idx].failure.as_ref())
    }

    /// The inputs of the cell producing a slot, empty for a source.
    pub fn inputs_of(&self, r: Ref) -> Result<Vec<Ref>> {
        let idx = self.check(r)?;
        Ok(self.graph[idx]
            .cell
            .as_ref()
            .map(|c| c.inputs.iter().map(|i| i.source).collect())
            .unwrap_or_default())
    }

    /// Find the handle of the first slot with a name.
    pub fn lookup(&self, name: &str) -> Option<Ref> {
        self.graph
            .node_indices()
            .find(|&idx| self.graph[idx].name == name)
            .map(|idx| self.handle(idx))
    }

    /// Has [`configure`](Network::configure) run?
    #[inline]
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// The number of cells.
    pub fn cell_count(&self) -> usize {
        self.graph
            .node_weights()
            .filter(|slot| slot.cell.is_some())
            .count()
    }

    /// The number of slots, sources and cells together.
    #[inline]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Is the network empty?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    fn handle(&self, idx: NodeIndex) -> Ref {
        Ref {
            network: self.id,
            idx,
        }
    }

    fn check(&self, r: Ref) -> Result<NodeIndex> {
        if r.network == self.id && r.idx.index() < self.graph.node_count() {
            Ok(r.idx)
        } else {
            Err(AnalysisError::UnknownReference(r))
        }
    }

    // Walk from each input toward its ancestors. Reaching the slot the cell will produce means the
    // new edges would close a cycle.
    fn check_cycle(&self, target: NodeIndex, cell: &Cell) -> Result<()> {
        let mut visited = HashSet::new();

        for input in &cell.inputs {
            let start = input.source.idx;
            if start == target {
                return Err(AnalysisError::SelfReference {
                    cell: cell.name.clone(),
                });
            }

            let mut stack = vec![start];
            while let Some(node) = stack.pop() {
                if !visited.insert(node) {
                    continue;
                }

                for parent in self.graph.neighbors_directed(node, Direction::Incoming) {
                    if parent == target {
                        return Err(AnalysisError::CycleDetected {
                            ancestor: input.source,
                            child: self.handle(node),
                            cell: cell.name.clone(),
                        });
                    }
                    stack.push(parent);
                }
            }
        }

        Ok(())
    }

    // Readers of the slot are queued with the new cell when they hold results computed from a value
    // the cell has just replaced.
    fn attach(&mut self, idx: NodeIndex, cell: Cell, readers_stale: bool) -> Result<()> {
        for (position, input) in cell.inputs.iter().enumerate() {
            self.graph.add_edge(input.source.idx, idx, position);
        }

        debug!(cell = %cell.name, inputs = cell.inputs.len(), "cell added");
        self.graph[idx].cell = Some(cell);

        if self.configured {
            self.rerank()?;
            let mut seeds = vec![idx];
            if readers_stale {
                seeds.extend(self.enabled_dependents(idx));
            }

            let mut update = Update::default();
            self.cascade(seeds, &mut update);
        }

        Ok(())
    }

    fn rerank(&mut self) -> Result<Vec<NodeIndex>> {
        let order = toposort(&self.graph, None).map_err(|_| AnalysisError::Unorderable)?;

        self.rank = vec![0; self.graph.node_count()];
        for (rank, idx) in order.iter().enumerate() {
            self.rank[idx.index()] = rank;
        }

        Ok(order)
    }

    fn enabled_dependents(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .filter(|edge| {
                self.graph[edge.target()]
                    .cell
                    .as_ref()
                    .map(|c| c.inputs[*edge.weight()].enabled)
                    .unwrap_or(false)
            })
            .map(|edge| edge.target())
            .collect()
    }

    fn cascade(&mut self, seeds: Vec<NodeIndex>, update: &mut Update) {
        let mut queued: HashSet<NodeIndex> = HashSet::new();
        let mut worklist = BinaryHeap::new();

        for idx in seeds {
            if queued.insert(idx) {
                worklist.push(Reverse((self.rank[idx.index()], idx)));
            }
        }

        while let Some(Reverse((_, idx))) = worklist.pop() {
            if let Outcome::Changed = self.evaluate_into(idx, update) {
                for dependent in self.enabled_dependents(idx) {
                    if queued.insert(dependent) {
                        worklist.push(Reverse((self.rank[dependent.index()], dependent)));
                    }
                }
            }
        }
    }

    fn evaluate_into(&mut self, idx: NodeIndex, update: &mut Update) -> Outcome {
        let outcome = self.evaluate(idx);

        let r = self.handle(idx);
        update.recomputed.push(r);
        match outcome {
            Outcome::Changed => update.changed.push(r),
            Outcome::Failed => update.failed.push(r),
            Outcome::Unchanged => {}
        }

        outcome
    }

    fn evaluate(&mut self, idx: NodeIndex) -> Outcome {
        let result = {
            let cell = match &self.graph[idx].cell {
                Some(cell) => cell,
                None => return Outcome::Unchanged,
            };

            let values: Vec<&Quantity> = cell
                .inputs
                .iter()
                .map(|input| &self.graph[input.source.idx].value)
                .collect();

            cell.evaluate(&values)
        };

        let slot = &mut self.graph[idx];
        match result {
            Ok(value) => {
                slot.failure = None;
                if value == slot.value {
                    trace!(cell = %slot.name, "recomputed, unchanged");
                    Outcome::Unchanged
                } else {
                    trace!(cell = %slot.name, "recomputed");
                    slot.value = value;
                    Outcome::Changed
                }
            }
            Err(err) => {
                warn!(cell = %slot.name, error = %err, "compute failed, keeping previous output");
                slot.failure = Some(err);
                Outcome::Failed
            }
        }
    }
}

impl Default for Network {
    fn default() -> Self {
        Network::new()
    }
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Network")
            .field("slots", &self.graph.node_count())
            .field("edges", &self.graph.edge_count())
            .field("configured", &self.configured)
            .finish()
    }
}
