//! Content-addressed variable storage (§9 design note): each decision variable
//! is identified by a tuple key and held in a `HashMap`, mirroring the
//! `self.assignments` dict of the original source and the `HashMap`-of-vars
//! pattern already used for GenEd option variables in the teacher codebase.

use cp_sat::builder::BoolVar;
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Default)]
pub struct VarStore<K: Eq + Hash> {
    vars: HashMap<K, BoolVar>,
}

impl<K: Eq + Hash + Clone> VarStore<K> {
    pub fn new() -> Self {
        VarStore {
            vars: HashMap::new(),
        }
    }

    pub fn insert(&mut self, key: K, var: BoolVar) {
        self.vars.insert(key, var);
    }

    pub fn get(&self, key: &K) -> Option<&BoolVar> {
        self.vars.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &BoolVar)> {
        self.vars.iter()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
