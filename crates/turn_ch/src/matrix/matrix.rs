use std::fmt;

use crate::{constants::INFINITE_WEIGHT, weighting::Weight};

#[derive(Clone, PartialEq)]
pub struct Matrix {
    sources: usize,
    targets: usize,
    weights: Vec<Weight>,
}

impl Matrix {
    pub fn new(sources: usize, targets: usize) -> Self {
        Matrix {
            sources,
            targets,
            weights: vec![INFINITE_WEIGHT; sources * targets],
        }
    }

    pub fn sources(&self) -> usize {
        self.sources
    }

    pub fn targets(&self) -> usize {
        self.targets
    }

    pub fn update_entry(&mut self, source_index: usize, target_index: usize, weight: Weight) {
        self.weights[source_index * self.targets + target_index] = weight;
    }

    /// Infinite when the target is unreachable from the source
    pub fn weight(&self, source_index: usize, target_index: usize) -> Weight {
        self.weights[source_index * self.targets + target_index]
    }

    pub fn row(&self, source_index: usize) -> &[Weight] {
        let start = source_index * self.targets;
        &self.weights[start..start + self.targets]
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for source_index in 0..self.sources {
            writeln!(f, "{:?}", self.row(source_index))?;
        }
        Ok(())
    }
}
