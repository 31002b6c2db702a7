//! Boolean factory: gate construction, simplification, and hash-consing.
//!
//! The factory owns every gate it creates, in a label-indexed table, and
//! deduplicates construction through per-shape cache keys. Simplifications
//! are applied before consing, dispatched on the operator categories of the
//! two operands: AND/OR junctions (J), ITE gates (I), negation views (N),
//! and variables (V). Structural equality between junction chains uses a
//! flattening walk bounded by `2^comparison_depth` elements, which keeps
//! gate comparison O(1) amortized.
//!
//! Interior mutability (`Cell`/`RefCell`) lets gates be created through
//! `&self`, so matrices and translators can share one factory reference.

use std::cell::{Cell, RefCell};

use rustc_hash::FxHashMap;

use super::int::{Int, IntEncoding};
use super::{BoolValue, BooleanAccumulator, GateOp, TRUE_LABEL};

/// Factory configuration.
#[derive(Debug, Clone)]
pub struct Options {
    /// Deduplicate structurally equal gates (default: true).
    pub sharing: bool,
    /// Depth of the bounded flattening used when comparing AND/OR chains
    /// for equality; the flattening budget is `2^comparison_depth` inputs.
    /// Must be at least 1 (default: 3).
    pub comparison_depth: usize,
    /// Encoding used for integer circuits (default: two's complement).
    pub int_encoding: IntEncoding,
    /// Bit width of two's-complement integer circuits (default: 8).
    pub bitwidth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            sharing: true,
            comparison_depth: 3,
            int_encoding: IntEncoding::TwosComplement,
            bitwidth: 8,
        }
    }
}

/// Stored shape of a gate.
#[derive(Debug, Clone)]
enum Gate {
    /// AND/OR gate with two or more inputs, sorted ascending by label.
    Nary { op: GateOp, inputs: Vec<i32> },
    /// If-then-else gate.
    Ite {
        cond: i32,
        then_val: i32,
        else_val: i32,
    },
}

/// A read-only view of a gate's shape, for CNF emission and debugging.
#[derive(Debug, Clone)]
pub enum GateView {
    /// AND gate and its inputs.
    And(Vec<BoolValue>),
    /// OR gate and its inputs.
    Or(Vec<BoolValue>),
    /// ITE gate: condition, then-branch, else-branch.
    Ite(BoolValue, BoolValue, BoolValue),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    /// Exact inputs of an AND/OR gate.
    Gate(GateOp, Vec<i32>),
    /// Bounded-flattened input set of an AND/OR gate.
    Flat(GateOp, Vec<i32>),
    Ite(i32, i32, i32),
}

/// Operator category of a non-constant value, in dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Cat {
    And,
    Or,
    Ite,
    Not,
    Var,
}

/// Hash-consing circuit factory.
pub struct BooleanFactory {
    num_vars: u32,
    next_label: Cell<i32>,
    cmp_max: usize,
    options: Options,
    gates: RefCell<Vec<Gate>>,
    cache: RefCell<FxHashMap<CacheKey, i32>>,
}

impl BooleanFactory {
    /// Creates a factory over `num_vars` variables labeled `1..=num_vars`.
    ///
    /// # Panics
    /// Panics if `options.comparison_depth` is 0 or the variable count
    /// leaves no room for gate labels.
    pub fn new(num_vars: u32, options: Options) -> Self {
        assert!(
            options.comparison_depth >= 1,
            "comparison_depth must be >= 1"
        );
        assert!(
            num_vars < (i32::MAX - 1) as u32,
            "too many variables for the label space"
        );
        Self {
            num_vars,
            next_label: Cell::new(num_vars as i32 + 1),
            cmp_max: 1usize << options.comparison_depth.min(16),
            options,
            gates: RefCell::new(Vec::new()),
            cache: RefCell::new(FxHashMap::default()),
        }
    }

    /// Number of variables in this factory.
    pub fn num_variables(&self) -> u32 {
        self.num_vars
    }

    /// The largest label allocated so far (variables included).
    pub fn max_label(&self) -> i32 {
        self.next_label.get() - 1
    }

    /// The factory options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Bit width for two's-complement integer circuits.
    pub fn bitwidth(&self) -> usize {
        self.options.bitwidth
    }

    /// The configured integer encoding.
    pub fn int_encoding(&self) -> IntEncoding {
        self.options.int_encoding
    }

    /// The variable with the given label.
    ///
    /// # Panics
    /// Panics if `label` is not in `1..=num_variables()`.
    pub fn variable(&self, label: i32) -> BoolValue {
        assert!(
            label >= 1 && label <= self.num_vars as i32,
            "variable label must be in 1..={}",
            self.num_vars
        );
        BoolValue::new(label)
    }

    /// The constant with the given truth value.
    pub fn constant(&self, value: bool) -> BoolValue {
        BoolValue::constant(value)
    }

    /// Negation of `value`.
    pub fn not(&self, value: BoolValue) -> BoolValue {
        self.check_owned(value);
        value.negate()
    }

    /// Conjunction of `a` and `b`.
    pub fn and(&self, a: BoolValue, b: BoolValue) -> BoolValue {
        self.assemble(GateOp::And, a, b)
    }

    /// Disjunction of `a` and `b`.
    pub fn or(&self, a: BoolValue, b: BoolValue) -> BoolValue {
        self.assemble(GateOp::Or, a, b)
    }

    /// Implication `a => b`.
    pub fn implies(&self, a: BoolValue, b: BoolValue) -> BoolValue {
        self.or(a.negate(), b)
    }

    /// Biconditional `a <=> b`.
    pub fn iff(&self, a: BoolValue, b: BoolValue) -> BoolValue {
        let forward = self.or(a.negate(), b);
        let backward = self.or(a, b.negate());
        self.and(forward, backward)
    }

    /// Exclusive or.
    pub fn xor(&self, a: BoolValue, b: BoolValue) -> BoolValue {
        self.iff(a, b).negate()
    }

    /// Full-adder sum bit `a ^ b ^ cin`.
    pub fn sum(&self, a: BoolValue, b: BoolValue, cin: BoolValue) -> BoolValue {
        let ab = self.xor(a, b);
        self.xor(ab, cin)
    }

    /// Full-adder carry bit `(a & b) | (cin & (a ^ b))`.
    pub fn carry(&self, a: BoolValue, b: BoolValue, cin: BoolValue) -> BoolValue {
        let ab = self.and(a, b);
        let ab_xor = self.xor(a, b);
        let cin_xor = self.and(cin, ab_xor);
        self.or(ab, cin_xor)
    }

    /// The constant integer `value` in the configured encoding.
    pub fn integer(&self, value: i32) -> Int {
        Int::constant(self, value)
    }

    /// If-then-else over boolean values.
    pub fn ite(&self, i: BoolValue, t: BoolValue, e: BoolValue) -> BoolValue {
        self.check_owned(i);
        self.check_owned(t);
        self.check_owned(e);
        if i.is_true() || t == e {
            return t;
        }
        if i.is_false() {
            return e;
        }
        if t.is_true() || i == t {
            return self.or(i, e);
        }
        if t.is_false() || i.negate() == t {
            return self.and(i.negate(), e);
        }
        if e.is_true() || i.negate() == e {
            return self.or(i.negate(), t);
        }
        if e.is_false() || i == e {
            return self.and(i, t);
        }

        let key = CacheKey::Ite(i.label(), t.label(), e.label());
        if self.options.sharing {
            if let Some(&label) = self.cache.borrow().get(&key) {
                return BoolValue::new(label);
            }
        }
        let label = self.push_gate(Gate::Ite {
            cond: i.label(),
            then_val: t.label(),
            else_val: e.label(),
        });
        if self.options.sharing {
            self.cache.borrow_mut().insert(key, label);
        }
        BoolValue::new(label)
    }

    /// Collapses an accumulator into a value: the identity for an empty
    /// accumulation, the single input when there is one, and a shared
    /// AND/OR gate otherwise.
    pub fn accumulate(&self, acc: BooleanAccumulator) -> BoolValue {
        let op = acc.op();
        if acc.is_short_circuited() {
            return op.short_circuit();
        }
        match acc.size() {
            0 => op.identity(),
            1 => BoolValue::new(acc.labels().next().expect("accumulator has one input")),
            2 => {
                let mut it = acc.labels();
                let a = BoolValue::new(it.next().expect("first input"));
                let b = BoolValue::new(it.next().expect("second input"));
                self.assemble(op, a, b)
            }
            _ => {
                let inputs: Vec<i32> = acc.labels().collect();
                let key = CacheKey::Gate(op, inputs.clone());
                if self.options.sharing {
                    if let Some(&label) = self.cache.borrow().get(&key) {
                        return BoolValue::new(label);
                    }
                }
                let label = self.push_gate(Gate::Nary { op, inputs });
                if self.options.sharing {
                    self.cache.borrow_mut().insert(key, label);
                }
                BoolValue::new(label)
            }
        }
    }

    /// The shape of the gate with the given (positive) label, if it is a
    /// gate rather than a variable or constant.
    pub fn gate(&self, label: i32) -> Option<GateView> {
        if label <= self.num_vars as i32 || label >= self.next_label.get() {
            return None;
        }
        let gates = self.gates.borrow();
        Some(match &gates[(label - self.num_vars as i32 - 1) as usize] {
            Gate::Nary { op, inputs } => {
                let vals = inputs.iter().map(|&l| BoolValue::new(l)).collect();
                match op {
                    GateOp::And => GateView::And(vals),
                    GateOp::Or => GateView::Or(vals),
                }
            }
            Gate::Ite {
                cond,
                then_val,
                else_val,
            } => GateView::Ite(
                BoolValue::new(*cond),
                BoolValue::new(*then_val),
                BoolValue::new(*else_val),
            ),
        })
    }

    fn check_owned(&self, v: BoolValue) {
        debug_assert!(
            v.is_constant() || (v.label() != 0 && v.label().abs() < self.next_label.get()),
            "value {} does not belong to this factory",
            v.label()
        );
    }

    fn push_gate(&self, gate: Gate) -> i32 {
        let label = self.next_label.get();
        assert!(label < TRUE_LABEL - 1, "gate label space exhausted");
        self.next_label.set(label + 1);
        self.gates.borrow_mut().push(gate);
        label
    }

    fn category(&self, v: BoolValue) -> Cat {
        debug_assert!(!v.is_constant());
        let label = v.label();
        if label < 0 {
            Cat::Not
        } else if label <= self.num_vars as i32 {
            Cat::Var
        } else {
            let gates = self.gates.borrow();
            match &gates[(label - self.num_vars as i32 - 1) as usize] {
                Gate::Nary {
                    op: GateOp::And, ..
                } => Cat::And,
                Gate::Nary { op: GateOp::Or, .. } => Cat::Or,
                Gate::Ite { .. } => Cat::Ite,
            }
        }
    }

    fn ite_inputs(&self, v: BoolValue) -> (BoolValue, BoolValue, BoolValue) {
        let gates = self.gates.borrow();
        match &gates[(v.label() - self.num_vars as i32 - 1) as usize] {
            Gate::Ite {
                cond,
                then_val,
                else_val,
            } => (
                BoolValue::new(*cond),
                BoolValue::new(*then_val),
                BoolValue::new(*else_val),
            ),
            _ => unreachable!("ITE category implies an ITE gate"),
        }
    }

    /// Flattens `lit` into `out` by expanding positive gates of the given
    /// operator, as long as the result stays within `max` elements.
    fn flatten_into(&self, lit: i32, op: GateOp, max: usize, out: &mut Vec<i32>) {
        if lit > self.num_vars as i32 && lit != TRUE_LABEL {
            let expandable = {
                let gates = self.gates.borrow();
                match &gates[(lit - self.num_vars as i32 - 1) as usize] {
                    Gate::Nary { op: gop, inputs } if *gop == op => {
                        if out.len() + inputs.len() <= max {
                            Some(inputs.clone())
                        } else {
                            None
                        }
                    }
                    _ => None,
                }
            };
            if let Some(inputs) = expandable {
                for input in inputs {
                    self.flatten_into(input, op, max, out);
                }
                return;
            }
        }
        out.push(lit);
    }

    fn flat_set(&self, lits: &[i32], op: GateOp) -> Vec<i32> {
        let mut out = Vec::new();
        for &lit in lits {
            self.flatten_into(lit, op, self.cmp_max, &mut out);
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    /// True if `target` occurs in the bounded flattening of `lit` under
    /// `op`.
    fn contains(&self, lit: i32, op: GateOp, target: i32) -> bool {
        let mut out = Vec::new();
        self.flatten_into(lit, op, self.cmp_max, &mut out);
        out.contains(&target)
    }

    /// Composes `a op b`, applying the simplification table before consing.
    fn assemble(&self, op: GateOp, a: BoolValue, b: BoolValue) -> BoolValue {
        self.check_owned(a);
        self.check_owned(b);
        if a == op.identity() {
            return b;
        }
        if b == op.identity() {
            return a;
        }
        if a == op.short_circuit() || b == op.short_circuit() {
            return op.short_circuit();
        }
        if a == b {
            return a;
        }
        if a == b.negate() {
            return op.short_circuit();
        }

        let (l, h) = if self.category(a) <= self.category(b) {
            (a, b)
        } else {
            (b, a)
        };
        match (self.category(l), self.category(h)) {
            (Cat::And, Cat::And) | (Cat::Or, Cat::Or) => self.asm_joj(op, l, h),
            (Cat::And, Cat::Or) => self.asm_aoo(op, l, h),
            (Cat::And | Cat::Or, Cat::Ite) => self.asm_joi(op, l, h),
            (Cat::And | Cat::Or, Cat::Not) => self.asm_jon(op, l, h),
            (Cat::And | Cat::Or, Cat::Var) => self.asm_jox(op, l, h),
            (Cat::Ite, Cat::Ite) => self.asm_ioi(op, l, h),
            (Cat::Ite, Cat::Not) => self.asm_ion(op, l, h),
            (Cat::Ite, Cat::Var) => self.asm_iox(op, l, h),
            (Cat::Not, Cat::Not) => self.asm_non(op, l, h),
            (Cat::Not, Cat::Var) => self.asm_nov(op, l, h),
            (Cat::Var, Cat::Var) => self.cache_binary(op, l, h),
            _ => unreachable!("operands are sorted by category"),
        }
    }

    /// AND/OR junction composed with anything: absorption and
    /// contradiction against the junction's flattened inputs.
    fn asm_jox(&self, op: GateOp, f0: BoolValue, f1: BoolValue) -> BoolValue {
        let f0_op = match self.category(f0) {
            Cat::And => GateOp::And,
            Cat::Or => GateOp::Or,
            _ => unreachable!("JoX takes a junction first"),
        };
        if self.contains(f0.label(), f0_op, f1.label()) {
            // (a op0 b) op a
            if op == f0_op {
                f0
            } else {
                f1
            }
        } else if op == f0_op && self.contains(f0.label(), op, -f1.label()) {
            op.short_circuit()
        } else {
            self.cache_binary(op, f0, f1)
        }
    }

    /// AND gate composed with OR gate: chain absorption, then JoX on the
    /// later-created gate.
    fn asm_aoo(&self, op: GateOp, f0: BoolValue, f1: BoolValue) -> BoolValue {
        let s0 = self.flat_set(&[f0.label()], GateOp::And);
        let s1 = self.flat_set(&[f1.label()], GateOp::Or);
        if s1.iter().any(|lit| s0.binary_search(lit).is_ok()) {
            return if op == GateOp::And { f0 } else { f1 };
        }
        if f0.label() < f1.label() {
            self.asm_jox(op, f1, f0)
        } else {
            self.asm_jox(op, f0, f1)
        }
    }

    /// Same-operator junctions: subsumption between flattened chains.
    fn asm_joj(&self, op: GateOp, f0: BoolValue, f1: BoolValue) -> BoolValue {
        let fop = match self.category(f0) {
            Cat::And => GateOp::And,
            _ => GateOp::Or,
        };
        let s0 = self.flat_set(&[f0.label()], fop);
        let s1 = self.flat_set(&[f1.label()], fop);
        let s0_in_s1 = s0.iter().all(|lit| s1.binary_search(lit).is_ok());
        let s1_in_s0 = s1.iter().all(|lit| s0.binary_search(lit).is_ok());
        if s0.len() < s1.len() && s0_in_s1 {
            if op == fop {
                f1
            } else {
                f0
            }
        } else if s0.len() >= s1.len() && s1_in_s0 {
            if op == fop {
                f0
            } else {
                f1
            }
        } else if f0.label() < f1.label() {
            self.asm_jox(op, f1, f0)
        } else {
            self.asm_jox(op, f0, f1)
        }
    }

    /// Junction composed with ITE: dispatch to the later-created side.
    fn asm_joi(&self, op: GateOp, f0: BoolValue, f1: BoolValue) -> BoolValue {
        if f0.label() < f1.label() {
            self.asm_iox(op, f1, f0)
        } else {
            self.asm_jox(op, f0, f1)
        }
    }

    /// Junction composed with a negation view.
    fn asm_jon(&self, op: GateOp, f0: BoolValue, f1: BoolValue) -> BoolValue {
        if f0.label() == -f1.label() {
            op.short_circuit()
        } else if f0.label() < f1.label().abs() {
            self.asm_nox(op, f1, f0)
        } else {
            self.asm_jox(op, f0, f1)
        }
    }

    /// ITE composed with anything: condition absorption.
    fn asm_iox(&self, op: GateOp, f0: BoolValue, f1: BoolValue) -> BoolValue {
        let (cond, then_val, else_val) = self.ite_inputs(f0);
        if cond == f1 {
            // (a ? b : c) & a = a & b;  (a ? b : c) | a = a | c
            let branch = match op {
                GateOp::And => then_val,
                GateOp::Or => else_val,
            };
            self.assemble(op, branch, f1)
        } else if cond.label() == -f1.label() {
            // (a ? b : c) & !a = !a & c;  (a ? b : c) | !a = !a | b
            let branch = match op {
                GateOp::And => else_val,
                GateOp::Or => then_val,
            };
            self.assemble(op, branch, f1)
        } else {
            self.cache_binary(op, f0, f1)
        }
    }

    /// ITE composed with ITE: complementary conditions over equal branches.
    fn asm_ioi(&self, op: GateOp, f0: BoolValue, f1: BoolValue) -> BoolValue {
        let (c0, t0, e0) = self.ite_inputs(f0);
        let (c1, t1, e1) = self.ite_inputs(f1);
        if c0.label() == -c1.label() && t0 == t1 && e0 == e1 {
            self.assemble(op, t0, e0)
        } else if f0.label() < f1.label() {
            self.asm_iox(op, f1, f0)
        } else {
            self.asm_iox(op, f0, f1)
        }
    }

    /// ITE composed with a negation view.
    fn asm_ion(&self, op: GateOp, f0: BoolValue, f1: BoolValue) -> BoolValue {
        if f0.label() == -f1.label() {
            op.short_circuit()
        } else if f0.label() < f1.label().abs() {
            self.asm_nox(op, f1, f0)
        } else {
            self.asm_iox(op, f0, f1)
        }
    }

    /// Negation view composed with anything: contradiction and absorption
    /// through the negated junction.
    fn asm_nox(&self, op: GateOp, f0: BoolValue, f1: BoolValue) -> BoolValue {
        // !(a | b) & a = F   and   !(a | b) & !a = !(a | b)
        let under = -f0.label();
        if self.contains(under, op.complement(), f1.label()) {
            op.short_circuit()
        } else if self.contains(under, op.complement(), -f1.label()) {
            f0
        } else {
            self.cache_binary(op, f0, f1)
        }
    }

    /// Two negation views.
    fn asm_non(&self, op: GateOp, f0: BoolValue, f1: BoolValue) -> BoolValue {
        if f0.label() < f1.label() {
            self.asm_nox(op, f0, f1)
        } else {
            self.asm_nox(op, f1, f0)
        }
    }

    /// Negation view composed with a variable.
    fn asm_nov(&self, op: GateOp, f0: BoolValue, f1: BoolValue) -> BoolValue {
        if f0.label() == -f1.label() {
            op.short_circuit()
        } else {
            self.asm_nox(op, f0, f1)
        }
    }

    /// Conses a binary gate whose operands resisted every reduction. Two
    /// gates with the same operator and input multiset share a label, and
    /// a bounded-flattening key folds differently-shaped but value-equal
    /// chains onto one gate.
    fn cache_binary(&self, op: GateOp, f0: BoolValue, f1: BoolValue) -> BoolValue {
        let (l, h) = if f0.label() < f1.label() {
            (f0.label(), f1.label())
        } else {
            (f1.label(), f0.label())
        };
        let exact = CacheKey::Gate(op, vec![l, h]);
        let flat = {
            let set = self.flat_set(&[l, h], op);
            if set.len() > 2 {
                Some(CacheKey::Flat(op, set))
            } else {
                None
            }
        };
        if self.options.sharing {
            let cache = self.cache.borrow();
            if let Some(&label) = cache.get(&exact) {
                return BoolValue::new(label);
            }
            if let Some(flat_key) = &flat {
                if let Some(&label) = cache.get(flat_key) {
                    return BoolValue::new(label);
                }
            }
        }
        let label = self.push_gate(Gate::Nary {
            op,
            inputs: vec![l, h],
        });
        if self.options.sharing {
            let mut cache = self.cache.borrow_mut();
            cache.insert(exact, label);
            if let Some(flat_key) = flat {
                cache.entry(flat_key).or_insert(label);
            }
        }
        BoolValue::new(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bool::{FALSE, TRUE};

    fn factory() -> BooleanFactory {
        BooleanFactory::new(10, Options::default())
    }

    #[test]
    fn constant_reductions() {
        let f = factory();
        let x = f.variable(1);
        assert_eq!(f.and(x, TRUE), x);
        assert_eq!(f.and(x, FALSE), FALSE);
        assert_eq!(f.or(x, FALSE), x);
        assert_eq!(f.or(x, TRUE), TRUE);
    }

    #[test]
    fn idempotence_and_contradiction() {
        let f = factory();
        let x = f.variable(1);
        assert_eq!(f.and(x, x), x);
        assert_eq!(f.or(x, x), x);
        assert_eq!(f.and(x, f.not(x)), FALSE);
        assert_eq!(f.or(x, f.not(x)), TRUE);
    }

    #[test]
    fn hash_consing_shares_gates() {
        let f = factory();
        let x = f.variable(1);
        let y = f.variable(2);
        let g1 = f.and(x, y);
        let g2 = f.and(y, x);
        assert_eq!(g1, g2);
        let o1 = f.or(x, y);
        assert_ne!(g1, o1);
        assert_eq!(o1, f.or(y, x));
    }

    #[test]
    fn labels_exceed_inputs() {
        let f = factory();
        let x = f.variable(1);
        let y = f.variable(2);
        let g = f.and(x, y);
        assert!(g.label() > 10);
        let h = f.or(g, f.variable(3));
        assert!(h.label() > g.label());
    }

    #[test]
    fn absorption() {
        let f = factory();
        let a = f.variable(1);
        let b = f.variable(2);
        let ab = f.and(a, b);
        // (a & b) & a = a & b
        assert_eq!(f.and(ab, a), ab);
        // (a & b) | a = a
        assert_eq!(f.or(ab, a), a);
        let aob = f.or(a, b);
        // (a | b) | a = a | b
        assert_eq!(f.or(aob, a), aob);
        // (a | b) & a = a
        assert_eq!(f.and(aob, a), a);
    }

    #[test]
    fn junction_contradiction() {
        let f = factory();
        let a = f.variable(1);
        let b = f.variable(2);
        let ab = f.and(a, b);
        // (a & b) & !a = F
        assert_eq!(f.and(ab, f.not(a)), FALSE);
        let aob = f.or(a, b);
        // (a | b) | !a = T
        assert_eq!(f.or(aob, f.not(a)), TRUE);
    }

    #[test]
    fn negated_junction_reductions() {
        let f = factory();
        let a = f.variable(1);
        let b = f.variable(2);
        let aob = f.or(a, b);
        // !(a | b) & a = F
        assert_eq!(f.and(f.not(aob), a), FALSE);
        // !(a | b) & !a = !(a | b)
        assert_eq!(f.and(f.not(aob), f.not(a)), f.not(aob));
        let ab = f.and(a, b);
        // !(a & b) | a = T
        assert_eq!(f.or(f.not(ab), a), TRUE);
    }

    #[test]
    fn chain_subsumption() {
        let f = factory();
        let a = f.variable(1);
        let b = f.variable(2);
        let c = f.variable(3);
        let ab = f.and(a, b);
        let abc = f.and(ab, c);
        // (a & b & c) & (a & b) = a & b & c
        assert_eq!(f.and(abc, ab), abc);
        // (a & b & c) | (a & b) = a & b
        assert_eq!(f.or(abc, ab), ab);
    }

    #[test]
    fn and_or_absorption() {
        let f = factory();
        let a = f.variable(1);
        let b = f.variable(2);
        let c = f.variable(3);
        let conj = f.and(a, b);
        let disj = f.or(f.or(a, b), c);
        // (a & b) & (a | b | c) = a & b
        assert_eq!(f.and(conj, disj), conj);
        // (a & b) | (a | b | c) = a | b | c
        assert_eq!(f.or(conj, disj), disj);
    }

    #[test]
    fn associativity_shares_structure() {
        let f = factory();
        let a = f.variable(1);
        let b = f.variable(2);
        let c = f.variable(3);
        let left = f.and(f.and(a, b), c);
        let right = f.and(a, f.and(b, c));
        assert_eq!(left, right);
    }

    #[test]
    fn simplification_idempotence() {
        let f = factory();
        let x = f.variable(1);
        let y = f.variable(2);
        let xy = f.and(x, y);
        assert_eq!(f.and(x, xy), xy);
    }

    #[test]
    fn ite_reductions() {
        let f = factory();
        let i = f.variable(1);
        let t = f.variable(2);
        let e = f.variable(3);
        assert_eq!(f.ite(TRUE, t, e), t);
        assert_eq!(f.ite(FALSE, t, e), e);
        assert_eq!(f.ite(i, t, t), t);
        assert_eq!(f.ite(i, TRUE, e), f.or(i, e));
        assert_eq!(f.ite(i, FALSE, e), f.and(f.not(i), e));
        assert_eq!(f.ite(i, t, TRUE), f.or(f.not(i), t));
        assert_eq!(f.ite(i, t, FALSE), f.and(i, t));
    }

    #[test]
    fn ite_consing() {
        let f = factory();
        let i = f.variable(1);
        let t = f.variable(2);
        let e = f.variable(3);
        let g1 = f.ite(i, t, e);
        let g2 = f.ite(i, t, e);
        assert_eq!(g1, g2);
    }

    #[test]
    fn ite_condition_absorption() {
        let f = factory();
        let a = f.variable(1);
        let b = f.variable(2);
        let c = f.variable(3);
        let ite = f.ite(a, b, c);
        // (a ? b : c) & a = a & b
        assert_eq!(f.and(ite, a), f.and(a, b));
        // (a ? b : c) | a = a | c
        assert_eq!(f.or(ite, a), f.or(a, c));
        // (a ? b : c) & !a = !a & c
        assert_eq!(f.and(ite, f.not(a)), f.and(f.not(a), c));
    }

    #[test]
    fn accumulator_collapse() {
        let f = factory();
        let mut acc = BooleanAccumulator::new(GateOp::And);
        acc.add(f.variable(1));
        acc.add(f.variable(2));
        acc.add(f.variable(3));
        let g = f.accumulate(acc);
        assert!(g.label() > 10);
        match f.gate(g.label()) {
            Some(GateView::And(inputs)) => assert_eq!(inputs.len(), 3),
            other => panic!("expected AND gate, got {other:?}"),
        }

        let mut empty = BooleanAccumulator::new(GateOp::Or);
        empty.add(FALSE);
        assert_eq!(f.accumulate(empty), FALSE);
    }

    #[test]
    fn iff_and_implies() {
        let f = factory();
        let a = f.variable(1);
        assert_eq!(f.implies(a, a), TRUE);
        assert_eq!(f.iff(a, a), TRUE);
        assert_eq!(f.iff(a, f.not(a)), FALSE);
        assert_eq!(f.implies(FALSE, a), TRUE);
    }

    #[test]
    fn gate_view_exposes_sorted_inputs() {
        let f = factory();
        let g = f.and(f.variable(2), f.variable(1));
        match f.gate(g.label()) {
            Some(GateView::And(inputs)) => {
                assert_eq!(
                    inputs.iter().map(|v| v.label()).collect::<Vec<_>>(),
                    vec![1, 2]
                );
            }
            other => panic!("expected AND gate, got {other:?}"),
        }
        assert!(f.gate(1).is_none());
    }
}
