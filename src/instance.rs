//! Problem-instance types: Universe, Tuple, TupleFactory, TupleSet, Bounds,
//! and Instance.
//!
//! A [`Universe`] is an ordered set of distinct atoms. A [`Tuple`] of arity
//! k over a universe of n atoms has a unique linear index in `[0, n^k)`, and
//! a [`TupleSet`] stores such indices in an [`IntSet`]. [`Bounds`] constrain
//! each relation's extension between a lower and an upper tuple set, and an
//! [`Instance`] maps each relation to the concrete extension found by the
//! solver.

use std::fmt::{self, Debug};
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::ast::Relation;
use crate::error::{RelicError, Result};
use crate::util::ints::IntSet;

/// An ordered set of unique atoms.
///
/// Atoms are identified by name; their position in the construction order is
/// their index. Two universes are equal iff they are the same object.
#[derive(Clone)]
pub struct Universe {
    inner: Rc<UniverseInner>,
}

struct UniverseInner {
    atoms: Vec<String>,
    indices: FxHashMap<String, usize>,
}

impl Universe {
    /// Creates a universe from the given atom names.
    ///
    /// # Errors
    /// Returns an error if `atoms` is empty or contains a duplicate.
    pub fn new(atoms: &[&str]) -> Result<Self> {
        Self::from_atoms(atoms.iter().map(|s| s.to_string()).collect())
    }

    /// Creates a universe from owned atom names.
    ///
    /// # Errors
    /// Returns an error if `atoms` is empty or contains a duplicate.
    pub fn from_atoms(atoms: Vec<String>) -> Result<Self> {
        if atoms.is_empty() {
            return Err(RelicError::InvalidArgument(
                "cannot create an empty universe".to_string(),
            ));
        }
        let mut indices = FxHashMap::default();
        for (i, atom) in atoms.iter().enumerate() {
            if indices.insert(atom.clone(), i).is_some() {
                return Err(RelicError::InvalidArgument(format!(
                    "{atom:?} appears multiple times"
                )));
            }
        }
        Ok(Self {
            inner: Rc::new(UniverseInner { atoms, indices }),
        })
    }

    /// Number of atoms.
    pub fn size(&self) -> usize {
        self.inner.atoms.len()
    }

    /// The atom at `index`, if in range.
    pub fn atom(&self, index: usize) -> Option<&str> {
        self.inner.atoms.get(index).map(|s| s.as_str())
    }

    /// The index of `atom`, if it belongs to this universe.
    pub fn index_of(&self, atom: &str) -> Option<usize> {
        self.inner.indices.get(atom).copied()
    }

    /// True if `atom` belongs to this universe.
    pub fn contains(&self, atom: &str) -> bool {
        self.inner.indices.contains_key(atom)
    }

    /// Returns a factory for building tuples and tuple sets over this
    /// universe.
    pub fn factory(&self) -> TupleFactory {
        TupleFactory {
            universe: self.clone(),
        }
    }
}

impl PartialEq for Universe {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Universe {}

impl Debug for Universe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Universe({:?})", self.inner.atoms)
    }
}

/// Number of distinct tuples of the given arity over a universe of `size`
/// atoms, or an error if it overflows.
fn tuple_capacity(size: usize, arity: usize) -> Result<usize> {
    let mut capacity = 1usize;
    for _ in 0..arity {
        capacity = capacity
            .checked_mul(size)
            .ok_or_else(|| RelicError::CapacityExceeded(format!("{size}^{arity} tuples")))?;
    }
    Ok(capacity)
}

/// A sequence of atoms of fixed arity, identified by its linear index.
#[derive(Clone)]
pub struct Tuple {
    universe: Universe,
    arity: usize,
    index: usize,
}

impl Tuple {
    /// Reconstructs a tuple from its linear index. The index is the base-n
    /// encoding of the atom indices, most significant position first.
    pub fn from_index(universe: Universe, arity: usize, index: usize) -> Self {
        debug_assert!(arity >= 1);
        Tuple {
            universe,
            arity,
            index,
        }
    }

    /// The universe this tuple draws its atoms from.
    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    /// Number of atoms in this tuple.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// The linear index of this tuple in `[0, n^arity)`.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The universe index of the atom at position `i`.
    pub fn atom_index(&self, i: usize) -> usize {
        assert!(i < self.arity, "position {i} out of bounds");
        let n = self.universe.size();
        let mut remaining = self.index;
        for _ in i + 1..self.arity {
            remaining /= n;
        }
        remaining % n
    }

    /// The atom at position `i`.
    pub fn atom(&self, i: usize) -> &str {
        self.universe
            .atom(self.atom_index(i))
            .expect("tuple index within universe capacity")
    }

    /// Iterates the atoms of this tuple in order.
    pub fn atoms(&self) -> impl Iterator<Item = &str> + '_ {
        (0..self.arity).map(move |i| self.atom(i))
    }
}

impl PartialEq for Tuple {
    fn eq(&self, other: &Self) -> bool {
        self.universe == other.universe && self.arity == other.arity && self.index == other.index
    }
}

impl Eq for Tuple {}

impl Debug for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for i in 0..self.arity {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", self.atom(i))?;
        }
        write!(f, "]")
    }
}

/// Builds tuples and tuple sets over a particular universe.
#[derive(Clone)]
pub struct TupleFactory {
    universe: Universe,
}

impl TupleFactory {
    /// The universe this factory builds over.
    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    /// Builds the tuple consisting of the named atoms.
    ///
    /// # Errors
    /// Returns an error if `atoms` is empty or names an atom outside the
    /// universe.
    pub fn tuple(&self, atoms: &[&str]) -> Result<Tuple> {
        if atoms.is_empty() {
            return Err(RelicError::InvalidArgument(
                "tuple arity must be at least 1".to_string(),
            ));
        }
        let n = self.universe.size();
        let mut index = 0usize;
        for atom in atoms {
            let i = self.universe.index_of(atom).ok_or_else(|| {
                RelicError::InvalidArgument(format!("{atom:?} is not in the universe"))
            })?;
            index = index * n + i;
        }
        Ok(Tuple {
            universe: self.universe.clone(),
            arity: atoms.len(),
            index,
        })
    }

    /// Reconstructs the tuple of the given arity with the given linear index.
    ///
    /// # Errors
    /// Returns an error if `index` is out of range for the arity.
    pub fn tuple_from_index(&self, arity: usize, index: usize) -> Result<Tuple> {
        let capacity = tuple_capacity(self.universe.size(), arity)?;
        if index >= capacity {
            return Err(RelicError::InvalidArgument(format!(
                "tuple index {index} out of range for arity {arity}"
            )));
        }
        Ok(Tuple::from_index(self.universe.clone(), arity, index))
    }

    /// Builds a tuple set from explicit tuples of atom names, all of the
    /// same arity.
    ///
    /// # Errors
    /// Returns an error on foreign atoms or mixed arities.
    pub fn tuple_set(&self, tuples: &[&[&str]]) -> Result<TupleSet> {
        let arity = tuples
            .first()
            .map(|t| t.len())
            .ok_or_else(|| RelicError::InvalidArgument("empty tuple set literal".to_string()))?;
        let mut set = TupleSet::empty(self.universe.clone(), arity)?;
        for atoms in tuples {
            set.add(self.tuple(atoms)?)?;
        }
        Ok(set)
    }

    /// The set of all `n^arity` tuples of the given arity.
    pub fn all(&self, arity: usize) -> TupleSet {
        assert!(arity >= 1, "arity must be at least 1");
        let capacity =
            tuple_capacity(self.universe.size(), arity).expect("universe capacity overflow");
        TupleSet {
            universe: self.universe.clone(),
            arity,
            indices: IntSet::range(0, capacity - 1),
        }
    }

    /// The empty set of tuples of the given arity.
    pub fn none(&self, arity: usize) -> TupleSet {
        assert!(arity >= 1, "arity must be at least 1");
        TupleSet {
            universe: self.universe.clone(),
            arity,
            indices: IntSet::empty(),
        }
    }

    /// The product `a × b` of two tuple sets over this universe.
    ///
    /// # Errors
    /// Returns an error if either set is from a different universe.
    pub fn area(&self, a: &TupleSet, b: &TupleSet) -> Result<TupleSet> {
        if a.universe != self.universe || b.universe != self.universe {
            return Err(RelicError::InvalidArgument(
                "tuple sets from a different universe".to_string(),
            ));
        }
        let arity = a.arity + b.arity;
        let shift = tuple_capacity(self.universe.size(), b.arity)?;
        let mut set = TupleSet::empty(self.universe.clone(), arity)?;
        for i in a.indices.iter() {
            for j in b.indices.iter() {
                set.indices.insert(i * shift + j);
            }
        }
        Ok(set)
    }
}

/// A set of same-arity tuples over one universe, stored as linear indices.
#[derive(Clone, PartialEq, Eq)]
pub struct TupleSet {
    universe: Universe,
    arity: usize,
    indices: IntSet,
}

impl TupleSet {
    /// Creates an empty tuple set of the given arity.
    ///
    /// # Errors
    /// Returns an error if `arity` is 0 or the index space overflows.
    pub fn empty(universe: Universe, arity: usize) -> Result<Self> {
        if arity == 0 {
            return Err(RelicError::InvalidArgument(
                "tuple set arity must be at least 1".to_string(),
            ));
        }
        let capacity = tuple_capacity(universe.size(), arity)?;
        Ok(Self {
            universe,
            arity,
            indices: IntSet::best(capacity),
        })
    }

    /// The universe this tuple set draws from.
    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    /// Arity shared by every tuple in the set.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Number of tuples.
    pub fn size(&self) -> usize {
        self.indices.len()
    }

    /// True if the set holds no tuples.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Adds a tuple to this set.
    ///
    /// # Errors
    /// Returns an error on a universe or arity mismatch.
    pub fn add(&mut self, tuple: Tuple) -> Result<()> {
        if tuple.universe() != &self.universe {
            return Err(RelicError::InvalidArgument(
                "tuple from a different universe".to_string(),
            ));
        }
        if tuple.arity() != self.arity {
            return Err(RelicError::InvalidArgument(format!(
                "expected arity {}, got {}",
                self.arity,
                tuple.arity()
            )));
        }
        self.indices.insert(tuple.index());
        Ok(())
    }

    /// Adds every tuple of `other` to this set.
    ///
    /// # Errors
    /// Returns an error on a universe or arity mismatch.
    pub fn add_all(&mut self, other: &TupleSet) -> Result<()> {
        if other.universe != self.universe || other.arity != self.arity {
            return Err(RelicError::InvalidArgument(
                "tuple sets differ in universe or arity".to_string(),
            ));
        }
        self.indices.insert_all(&other.indices);
        Ok(())
    }

    /// True if the tuple with the given linear index is in the set.
    pub fn contains_index(&self, index: usize) -> bool {
        self.indices.contains(index)
    }

    /// True if `tuple` is in the set.
    pub fn contains(&self, tuple: &Tuple) -> bool {
        tuple.universe() == &self.universe
            && tuple.arity() == self.arity
            && self.indices.contains(tuple.index())
    }

    /// True if every tuple of `other` is in this set.
    pub fn contains_all(&self, other: &TupleSet) -> bool {
        self.universe == other.universe
            && self.arity == other.arity
            && self.indices.contains_all(&other.indices)
    }

    /// The underlying linear-index set.
    pub fn index_view(&self) -> &IntSet {
        &self.indices
    }

    /// Iterates the tuples in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = Tuple> + '_ {
        self.indices
            .iter()
            .map(move |i| Tuple::from_index(self.universe.clone(), self.arity, i))
    }
}

impl Debug for TupleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Per-relation lower and upper tuple bounds over one universe.
///
/// Mutable while a problem is being set up; the solver clones the bounds it
/// is given, so later mutation cannot affect a running solve.
#[derive(Clone, Debug)]
pub struct Bounds {
    universe: Universe,
    entries: IndexMap<Relation, (TupleSet, TupleSet)>,
}

impl Bounds {
    /// Creates empty bounds over the given universe.
    pub fn new(universe: Universe) -> Self {
        Self {
            universe,
            entries: IndexMap::new(),
        }
    }

    /// The universe of these bounds.
    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    /// Bounds `relation` between `lower` and `upper`.
    ///
    /// # Errors
    /// Returns an error if the sets disagree with the relation's arity or
    /// this universe, or if `lower` is not contained in `upper`.
    pub fn bound(&mut self, relation: &Relation, lower: TupleSet, upper: TupleSet) -> Result<()> {
        if lower.universe() != &self.universe || upper.universe() != &self.universe {
            return Err(RelicError::InvalidArgument(format!(
                "bound for {} drawn from a different universe",
                relation.name()
            )));
        }
        if lower.arity() != relation.arity() || upper.arity() != relation.arity() {
            return Err(RelicError::InvalidArgument(format!(
                "bound arity does not match {}/{}",
                relation.name(),
                relation.arity()
            )));
        }
        if !upper.contains_all(&lower) {
            return Err(RelicError::InvalidArgument(format!(
                "lower bound of {} is not contained in its upper bound",
                relation.name()
            )));
        }
        self.entries.insert(relation.clone(), (lower, upper));
        Ok(())
    }

    /// Bounds `relation` to exactly the given tuple set.
    ///
    /// # Errors
    /// Same conditions as [`Bounds::bound`].
    pub fn bound_exactly(&mut self, relation: &Relation, tuples: TupleSet) -> Result<()> {
        self.bound(relation, tuples.clone(), tuples)
    }

    /// The lower bound of `relation`, if bounded.
    pub fn lower_bound(&self, relation: &Relation) -> Option<&TupleSet> {
        self.entries.get(relation).map(|(l, _)| l)
    }

    /// The upper bound of `relation`, if bounded.
    pub fn upper_bound(&self, relation: &Relation) -> Option<&TupleSet> {
        self.entries.get(relation).map(|(_, u)| u)
    }

    /// True if `relation` is exactly bound (lower = upper).
    pub fn is_exact(&self, relation: &Relation) -> bool {
        self.entries
            .get(relation)
            .is_some_and(|(l, u)| l.size() == u.size())
    }

    /// Iterates the bounded relations in insertion order.
    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.entries.keys()
    }
}

/// A concrete extension for each bounded relation, decoded from a SAT model.
#[derive(Clone, Debug)]
pub struct Instance {
    universe: Universe,
    tuples: IndexMap<Relation, TupleSet>,
}

impl Instance {
    /// Creates an empty instance over the given universe.
    pub fn new(universe: Universe) -> Self {
        Self {
            universe,
            tuples: IndexMap::new(),
        }
    }

    /// The universe of this instance.
    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    /// Assigns `tuples` as the extension of `relation`.
    ///
    /// # Errors
    /// Returns an error on a universe or arity mismatch.
    pub fn add(&mut self, relation: Relation, tuples: TupleSet) -> Result<()> {
        if tuples.universe() != &self.universe {
            return Err(RelicError::InvalidArgument(
                "instance tuples from a different universe".to_string(),
            ));
        }
        if tuples.arity() != relation.arity() {
            return Err(RelicError::InvalidArgument(format!(
                "instance arity does not match {}/{}",
                relation.name(),
                relation.arity()
            )));
        }
        self.tuples.insert(relation, tuples);
        Ok(())
    }

    /// The extension of `relation`, if assigned.
    pub fn tuples(&self, relation: &Relation) -> Option<&TupleSet> {
        self.tuples.get(relation)
    }

    /// Iterates the (relation, extension) pairs in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&Relation, &TupleSet)> {
        self.tuples.iter()
    }
}
