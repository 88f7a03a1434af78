use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_TREES_PER_SEARCH;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Threads {
    Single,
    #[default]
    Auto,
    Multi(usize),
}

impl Threads {
    pub fn number_of_threads(&self) -> usize {
        match self {
            Threads::Single => 1,
            Threads::Multi(num) => *num,
            Threads::Auto => std::thread::available_parallelism().map_or(1, |n| n.get()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixParams {
    /// Sources sharing one multi-tree search
    pub trees_per_search: usize,
    pub threads: Threads,
}

impl Default for MatrixParams {
    fn default() -> Self {
        MatrixParams {
            trees_per_search: DEFAULT_TREES_PER_SEARCH,
            threads: Threads::default(),
        }
    }
}

impl MatrixParams {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn trees_per_search(mut self, trees_per_search: usize) -> Self {
        self.trees_per_search = trees_per_search;
        self
    }

    pub fn threads(mut self, threads: Threads) -> Self {
        self.threads = threads;
        self
    }
}
