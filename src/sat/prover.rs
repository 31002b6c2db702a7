//! A proof-logging CDCL solver.
//!
//! Conflict-driven clause learning with two watched literals and 1UIP
//! learning. Every learned clause records the antecedents it was resolved
//! from, so an unsatisfiable run yields a [`ResolutionTrace`] ending in
//! the empty clause. The prover keeps every original clause it was given;
//! [`SatProver::reduce`] re-runs the search over a subset chosen by a
//! [`ReductionStrategy`], keeping the smaller refutation when one exists
//! and rolling back when the subset turns out satisfiable.
//!
//! Original clause indices are stable across re-solves: clause `i` is the
//! `i`th clause added. Learned clauses take indices past the originals.

use std::time::{Duration, Instant};

use rustc_hash::{FxHashMap, FxHashSet};

use super::trace::{ResolutionTrace, TraceClause};
use super::{ReductionStrategy, SatProver, SatSolver};

/// CDCL solver with resolution logging.
pub struct CdclProver {
    num_vars: u32,
    originals: Vec<Vec<i32>>,
    active: Vec<bool>,
    model: Vec<bool>,
    trace: Option<ResolutionTrace>,
    timeout: Option<Duration>,
}

impl CdclProver {
    /// A fresh prover with no variables or clauses.
    pub fn new() -> Self {
        Self {
            num_vars: 0,
            originals: Vec::new(),
            active: Vec::new(),
            model: Vec::new(),
            trace: None,
            timeout: None,
        }
    }

    /// Sets the wall-clock budget honored by [`SatSolver::solve_limited`].
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }
}

impl Default for CdclProver {
    fn default() -> Self {
        Self::new()
    }
}

impl SatSolver for CdclProver {
    fn add_variables(&mut self, n: u32) {
        self.num_vars += n;
    }

    fn add_clause(&mut self, literals: &[i32]) -> bool {
        self.originals.push(literals.to_vec());
        self.active.push(true);
        !literals.is_empty()
    }

    fn solve(&mut self) -> bool {
        match search(self.num_vars as usize, &self.originals, &self.active, None) {
            Outcome::Sat(model) => {
                self.model = model;
                true
            }
            Outcome::Unsat(trace) => {
                self.trace = Some(trace);
                false
            }
            Outcome::Unknown => unreachable!("no deadline was set"),
        }
    }

    fn solve_limited(&mut self) -> Option<bool> {
        let deadline = self.timeout.map(|t| Instant::now() + t);
        match search(self.num_vars as usize, &self.originals, &self.active, deadline) {
            Outcome::Sat(model) => {
                self.model = model;
                Some(true)
            }
            Outcome::Unsat(trace) => {
                self.trace = Some(trace);
                Some(false)
            }
            Outcome::Unknown => None,
        }
    }

    fn value_of(&self, var: u32) -> bool {
        self.model.get(var as usize).copied().unwrap_or(false)
    }

    fn num_variables(&self) -> u32 {
        self.num_vars
    }

    fn num_clauses(&self) -> u32 {
        self.originals.len() as u32
    }
}

impl SatProver for CdclProver {
    fn proof(&self) -> &ResolutionTrace {
        self.trace
            .as_ref()
            .expect("proof() requires an unsatisfiable solve")
    }

    fn reduce(&mut self, strategy: &mut dyn ReductionStrategy) {
        if self.trace.is_none() {
            return;
        }
        loop {
            let remove = strategy.next_reduction(self.trace.as_ref().expect("trace present"));
            if remove.is_empty() {
                break;
            }
            let saved = self.active.clone();
            for &idx in &remove {
                if idx < self.active.len() {
                    self.active[idx] = false;
                }
            }
            match search(self.num_vars as usize, &self.originals, &self.active, None) {
                Outcome::Unsat(trace) => self.trace = Some(trace),
                Outcome::Sat(_) => self.active = saved,
                Outcome::Unknown => unreachable!("no deadline was set"),
            }
        }
    }
}

enum Outcome {
    Sat(Vec<bool>),
    Unsat(ResolutionTrace),
    /// The deadline expired before the search concluded.
    Unknown,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Val {
    True,
    False,
    Unassigned,
}

struct Search {
    num_vars: usize,
    clauses: FxHashMap<usize, Vec<i32>>,
    watches: FxHashMap<i32, Vec<usize>>,
    assign: Vec<i8>,
    level: Vec<u32>,
    reason: Vec<Option<usize>>,
    trail: Vec<i32>,
    trail_lim: Vec<usize>,
    qhead: usize,
    next_id: usize,
    trace: Vec<TraceClause>,
}

/// Runs one CDCL search over the active subset of `originals`.
fn search(
    num_vars: usize,
    originals: &[Vec<i32>],
    active: &[bool],
    deadline: Option<Instant>,
) -> Outcome {
    let mut s = Search {
        num_vars,
        clauses: FxHashMap::default(),
        watches: FxHashMap::default(),
        assign: vec![0; num_vars + 1],
        level: vec![0; num_vars + 1],
        reason: vec![None; num_vars + 1],
        trail: Vec::new(),
        trail_lim: Vec::new(),
        qhead: 0,
        next_id: originals.len(),
        trace: Vec::new(),
    };

    let mut units: Vec<(i32, usize)> = Vec::new();
    for (id, lits) in originals.iter().enumerate() {
        if !active[id] {
            continue;
        }
        s.trace.push(TraceClause {
            index: id,
            learned: false,
            literals: lits.clone(),
            antecedents: Vec::new(),
        });
        s.clauses.insert(id, lits.clone());
        match lits.len() {
            0 => {
                // an empty original clause is its own refutation
                let trace = std::mem::take(&mut s.trace);
                return Outcome::Unsat(ResolutionTrace::new(trace, id));
            }
            1 => units.push((lits[0], id)),
            _ => {
                s.watches.entry(lits[0]).or_default().push(id);
                s.watches.entry(lits[1]).or_default().push(id);
            }
        }
    }

    for (lit, id) in units {
        match s.value(lit) {
            Val::True => {}
            Val::Unassigned => s.enqueue(lit, Some(id)),
            Val::False => {
                let conflict = s.finalize(id);
                let trace = std::mem::take(&mut s.trace);
                return Outcome::Unsat(ResolutionTrace::new(trace, conflict));
            }
        }
    }

    let mut conflicts: u64 = 0;
    loop {
        if let Some(conflict) = s.propagate() {
            conflicts += 1;
            if conflicts % 1024 == 0 {
                if let Some(deadline) = deadline {
                    if Instant::now() >= deadline {
                        return Outcome::Unknown;
                    }
                }
            }
            if s.decision_level() == 0 {
                let conflict = s.finalize(conflict);
                let trace = std::mem::take(&mut s.trace);
                return Outcome::Unsat(ResolutionTrace::new(trace, conflict));
            }
            let (learned, backjump, antecedents) = s.analyze(conflict);
            let id = s.next_id;
            s.next_id += 1;
            s.trace.push(TraceClause {
                index: id,
                learned: true,
                literals: learned.clone(),
                antecedents,
            });
            s.backtrack(backjump);
            s.attach_learned(id, learned);
        } else {
            match (1..=num_vars).find(|&v| s.assign[v] == 0) {
                None => {
                    let model = (0..=num_vars).map(|v| s.assign[v] > 0).collect();
                    return Outcome::Sat(model);
                }
                Some(var) => {
                    s.trail_lim.push(s.trail.len());
                    s.enqueue(-(var as i32), None);
                }
            }
        }
    }
}

impl Search {
    fn value(&self, lit: i32) -> Val {
        let v = self.assign[lit.unsigned_abs() as usize];
        if v == 0 {
            Val::Unassigned
        } else if (v > 0) == (lit > 0) {
            Val::True
        } else {
            Val::False
        }
    }

    fn decision_level(&self) -> usize {
        self.trail_lim.len()
    }

    fn enqueue(&mut self, lit: i32, reason: Option<usize>) {
        let var = lit.unsigned_abs() as usize;
        debug_assert_eq!(self.assign[var], 0);
        self.assign[var] = if lit > 0 { 1 } else { -1 };
        self.level[var] = self.decision_level() as u32;
        self.reason[var] = reason;
        self.trail.push(lit);
    }

    fn backtrack(&mut self, to_level: u32) {
        while self.decision_level() > to_level as usize {
            let lim = self.trail_lim.pop().expect("level implies a limit");
            while self.trail.len() > lim {
                let lit = self.trail.pop().expect("trail is non-empty");
                let var = lit.unsigned_abs() as usize;
                self.assign[var] = 0;
                self.reason[var] = None;
            }
        }
        self.qhead = self.trail.len();
    }

    fn attach_learned(&mut self, id: usize, mut lits: Vec<i32>) {
        if lits.len() >= 2 {
            // the second watch must sit at the backjump level
            let deepest = (1..lits.len())
                .max_by_key(|&i| self.level[lits[i].unsigned_abs() as usize])
                .expect("clause has at least two literals");
            lits.swap(1, deepest);
            self.watches.entry(lits[0]).or_default().push(id);
            self.watches.entry(lits[1]).or_default().push(id);
        }
        let asserting = lits[0];
        self.clauses.insert(id, lits);
        self.enqueue(asserting, Some(id));
    }

    fn propagate(&mut self) -> Option<usize> {
        while self.qhead < self.trail.len() {
            let lit = self.trail[self.qhead];
            self.qhead += 1;
            let neg = -lit;
            let watchers = self.watches.remove(&neg).unwrap_or_default();
            let mut kept = Vec::with_capacity(watchers.len());
            let mut conflict = None;
            let mut i = 0;
            while i < watchers.len() {
                let cid = watchers[i];
                i += 1;
                let mut lits = self.clauses.get(&cid).expect("watched clause").clone();
                if lits[0] == neg {
                    lits.swap(0, 1);
                }
                if self.value(lits[0]) == Val::True {
                    self.clauses.insert(cid, lits);
                    kept.push(cid);
                    continue;
                }
                if let Some(pos) = (2..lits.len()).find(|&k| self.value(lits[k]) != Val::False) {
                    lits.swap(1, pos);
                    self.watches.entry(lits[1]).or_default().push(cid);
                    self.clauses.insert(cid, lits);
                    continue;
                }
                // no replacement watch: asserting or conflicting
                let first = lits[0];
                self.clauses.insert(cid, lits);
                kept.push(cid);
                match self.value(first) {
                    Val::False => {
                        kept.extend_from_slice(&watchers[i..]);
                        conflict = Some(cid);
                        break;
                    }
                    _ => self.enqueue(first, Some(cid)),
                }
            }
            self.watches.insert(neg, kept);
            if conflict.is_some() {
                self.qhead = self.trail.len();
                return conflict;
            }
        }
        None
    }

    /// First-UIP conflict analysis. Returns the learned clause (asserting
    /// literal first), the backjump level, and the antecedent chain.
    fn analyze(&mut self, mut conflict: usize) -> (Vec<i32>, u32, Vec<usize>) {
        let current = self.decision_level() as u32;
        let mut learned: Vec<i32> = vec![0];
        let mut seen = vec![false; self.num_vars + 1];
        let mut counter = 0usize;
        let mut resolved: Option<i32> = None;
        let mut index = self.trail.len();
        let mut antecedents = Vec::new();

        loop {
            antecedents.push(conflict);
            let lits = self.clauses.get(&conflict).expect("antecedent clause").clone();
            for &q in &lits {
                if Some(q) == resolved {
                    continue;
                }
                let var = q.unsigned_abs() as usize;
                if !seen[var] && self.level[var] > 0 {
                    seen[var] = true;
                    if self.level[var] == current {
                        counter += 1;
                    } else {
                        learned.push(q);
                    }
                }
            }
            let p = loop {
                index -= 1;
                let t = self.trail[index];
                if seen[t.unsigned_abs() as usize] {
                    break t;
                }
            };
            seen[p.unsigned_abs() as usize] = false;
            counter -= 1;
            if counter == 0 {
                learned[0] = -p;
                break;
            }
            resolved = Some(p);
            conflict = self.reason[p.unsigned_abs() as usize].expect("propagation has a reason");
        }

        let backjump = learned[1..]
            .iter()
            .map(|&l| self.level[l.unsigned_abs() as usize])
            .max()
            .unwrap_or(0);
        (learned, backjump, antecedents)
    }

    /// Resolves a level-0 conflict down to the empty clause, recording the
    /// antecedent chain, and returns the empty clause's index.
    fn finalize(&mut self, conflict: usize) -> usize {
        let mut antecedents = vec![conflict];
        let mut seen: FxHashSet<usize> = FxHashSet::default();
        let mut queue: Vec<i32> = self.clauses.get(&conflict).expect("conflict clause").clone();
        while let Some(lit) = queue.pop() {
            let var = lit.unsigned_abs() as usize;
            if !seen.insert(var) {
                continue;
            }
            let reason = self.reason[var].expect("level-0 assignment has a reason");
            antecedents.push(reason);
            for &q in self.clauses.get(&reason).expect("reason clause") {
                if q.unsigned_abs() as usize != var {
                    queue.push(q);
                }
            }
        }
        let id = self.next_id;
        self.next_id += 1;
        self.trace.push(TraceClause {
            index: id,
            learned: true,
            literals: Vec::new(),
            antecedents,
        });
        id
    }
}
