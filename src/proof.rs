/*
 * Kodkod -- Copyright (c) 2005-present, Emina Torlak
 * Rust port -- Copyright (c) 2024
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in
 * all copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
 * THE SOFTWARE.
 */

//! Proofs of unsatisfiability and high-level core extraction.
//!
//! A resolution proof wraps the prover that refuted the problem together
//! with the translation log. The high-level core is computed by walking
//! the log for literals whose variables appear in the refutation, pruning
//! to nodes structurally reachable from the formula, and keeping the
//! top-level conjuncts whose subtrees were touched. [`Proof::minimize`]
//! shrinks the core by re-running resolution under a reduction strategy.

use rustc_hash::FxHashSet;

use crate::ast::visitor::{Node, NodeId};
use crate::ast::Formula;
use crate::fol2bool::{TranslationLog, TranslationRecord};
use crate::sat::{ReductionStrategy, SatProver};
use crate::ucore::strategy_utils::{core_vars, root_literals_and_vars, subtree_ids};

/// A proof that a formula has no instance within its bounds.
pub struct Proof {
    log: TranslationLog,
    kind: ProofKind,
}

enum ProofKind {
    /// Refuted by the SAT prover; the prover retains the resolution trace.
    Resolution(Box<dyn SatProver>),
    /// The root circuit reduced to FALSE before any solving.
    Trivial,
}

impl Proof {
    /// A proof backed by a resolution trace. The prover must have
    /// completed an unsatisfiable solve of the CNF this log describes.
    pub fn resolution(prover: Box<dyn SatProver>, log: TranslationLog) -> Self {
        Self {
            log,
            kind: ProofKind::Resolution(prover),
        }
    }

    /// A proof for a translation whose root circuit was constant FALSE.
    pub fn trivial(log: TranslationLog) -> Self {
        Self {
            log,
            kind: ProofKind::Trivial,
        }
    }

    /// The translation log behind this proof.
    pub fn log(&self) -> &TranslationLog {
        &self.log
    }

    /// The log records that participate in the refutation: their node is
    /// structurally reachable from the formula and their literal's
    /// variable appears in the low-level core.
    pub fn core_records(&self) -> Vec<&TranslationRecord> {
        match &self.kind {
            ProofKind::Trivial => Vec::new(),
            ProofKind::Resolution(prover) => {
                let vars = core_vars(prover.proof());
                let connected = self.connected_core(&vars);
                self.log
                    .replay()
                    .filter(|r| {
                        vars.contains(&r.literal.unsigned_abs())
                            && connected.contains(&r.node.id())
                    })
                    .collect()
            }
        }
    }

    /// The high-level core: the top-level conjuncts of the original
    /// formula that participate in the refutation. Solving their
    /// conjunction under the original bounds is unsatisfiable.
    pub fn high_level_core(&self) -> Vec<Formula> {
        match &self.kind {
            ProofKind::Trivial => self.trivial_core(),
            ProofKind::Resolution(prover) => {
                let trace = prover.proof();
                let vars = core_vars(trace);
                let connected = self.connected_core(&vars);
                let roots_info = root_literals_and_vars(&self.log);

                self.log
                    .roots()
                    .iter()
                    .zip(roots_info)
                    .filter(|(root, (literal, _))| {
                        // still asserted in the (possibly reduced) trace
                        let asserted =
                            literal.is_some_and(|lit| trace.find_unit(lit).is_some());
                        asserted
                            && subtree_ids(root).iter().any(|id| connected.contains(id))
                    })
                    .map(|(root, _)| root.clone())
                    .collect()
            }
        }
    }

    /// Minimizes the core. For resolution proofs, re-runs resolution under
    /// `strategy`; a failed reduction never discards the last refutation.
    /// Trivial proofs are left as-is: their core is the constant-false
    /// conjunct set.
    pub fn minimize(&mut self, strategy: &mut dyn ReductionStrategy) {
        if let ProofKind::Resolution(prover) = &mut self.kind {
            prover.reduce(strategy);
        }
    }

    /// Nodes that contributed a core literal and are reachable from the
    /// formula roots through the AST child relation.
    fn connected_core(&self, vars: &FxHashSet<u32>) -> FxHashSet<NodeId> {
        let mut touched: FxHashSet<NodeId> = FxHashSet::default();
        for record in self.log.replay() {
            if vars.contains(&record.literal.unsigned_abs()) {
                touched.insert(record.node.id());
            }
        }
        let mut reachable: FxHashSet<NodeId> = FxHashSet::default();
        let mut stack: Vec<Node> = self
            .log
            .roots()
            .iter()
            .map(|r| Node::Formula(r.clone()))
            .collect();
        while let Some(node) = stack.pop() {
            if reachable.insert(node.id()) {
                stack.extend(node.children());
            }
        }
        touched.retain(|id| reachable.contains(id));
        touched
    }

    /// Core of a trivially false translation: the conjunct that collapsed
    /// to FALSE when one did, otherwise every conjunct that did not
    /// collapse to TRUE.
    fn trivial_core(&self) -> Vec<Formula> {
        if let Some(root) = self
            .log
            .roots()
            .iter()
            .find(|r| r.constant_value() == Some(false))
        {
            return vec![root.clone()];
        }
        let false_ids: FxHashSet<NodeId> = self
            .log
            .false_formulas()
            .iter()
            .map(|f| Node::Formula(f.clone()).id())
            .collect();
        let direct: Vec<Formula> = self
            .log
            .roots()
            .iter()
            .filter(|r| {
                subtree_ids(r)
                    .iter()
                    .any(|id| false_ids.contains(id))
            })
            .cloned()
            .collect();
        if !direct.is_empty() {
            return direct;
        }
        // the conjunction collapsed without any single conjunct being
        // false by itself
        let true_ids: FxHashSet<NodeId> = self
            .log
            .true_formulas()
            .iter()
            .map(|f| Node::Formula(f.clone()).id())
            .collect();
        self.log
            .roots()
            .iter()
            .filter(|r| !true_ids.contains(&Node::Formula((*r).clone()).id()))
            .cloned()
            .collect()
    }
}
