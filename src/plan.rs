//! Category dependency graph and installation plan resolution.
//!
//! The graph is built once per invocation from the declaration and passed
//! explicitly to the commands. [`CategoryGraph::resolve`] turns a request into
//! a [`Plan`]: every category appears after all of its dependencies and at
//! most once, with ties broken by declaration order.

use std::collections::HashMap;

use crate::config::categories::Category;
use crate::error::{ConfigError, ResolveError};

/// Immutable category graph, indexed by name.
#[derive(Debug, Clone)]
pub struct CategoryGraph {
    categories: Vec<Category>,
    index: HashMap<String, usize>,
}

/// DFS mark for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Done,
}

impl CategoryGraph {
    /// Build the graph from categories in declaration order.
    ///
    /// Dependency names are not checked here; unknown names are reported by
    /// [`resolve`](Self::resolve) when they are reached.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateCategory`] if two categories share a name.
    pub fn new(categories: Vec<Category>) -> Result<Self, ConfigError> {
        let mut index = HashMap::with_capacity(categories.len());
        for (i, category) in categories.iter().enumerate() {
            if index.insert(category.name.clone(), i).is_some() {
                return Err(ConfigError::DuplicateCategory(category.name.clone()));
            }
        }
        Ok(Self { categories, index })
    }

    /// All categories in declaration order.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Look up a category by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Category> {
        self.index.get(name).and_then(|&i| self.categories.get(i))
    }

    /// Resolve `requested` (empty means every category) into an ordered plan.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnknownCategory`] if a requested name or a
    /// reachable dependency is not declared, and
    /// [`ResolveError::CycleDetected`] if a reachable dependency chain loops.
    pub fn resolve<S: AsRef<str>>(&self, requested: &[S]) -> Result<Plan<'_>, ResolveError> {
        let mut roots: Vec<usize> = if requested.is_empty() {
            (0..self.categories.len()).collect()
        } else {
            requested
                .iter()
                .map(|name| {
                    let name = name.as_ref();
                    self.index
                        .get(name)
                        .copied()
                        .ok_or_else(|| ResolveError::UnknownCategory {
                            name: name.to_string(),
                            required_by: None,
                        })
                })
                .collect::<Result<_, _>>()?
        };
        roots.sort_unstable();
        roots.dedup();

        let mut marks = vec![Mark::Unvisited; self.categories.len()];
        let mut stack = Vec::new();
        let mut order = Vec::with_capacity(self.categories.len());
        for root in roots {
            self.visit(root, &mut marks, &mut stack, &mut order)?;
        }

        Ok(Plan {
            categories: order
                .into_iter()
                .filter_map(|i| self.categories.get(i))
                .collect(),
        })
    }

    /// Depth-first visit: dependencies first, then `idx` itself.
    ///
    /// `stack` holds the chain of categories currently being visited so that a
    /// cycle can be reported as a path.
    fn visit(
        &self,
        idx: usize,
        marks: &mut [Mark],
        stack: &mut Vec<usize>,
        order: &mut Vec<usize>,
    ) -> Result<(), ResolveError> {
        match marks.get(idx).copied() {
            Some(Mark::Done) | None => return Ok(()),
            Some(Mark::Visiting) => return Err(self.cycle_error(idx, stack)),
            Some(Mark::Unvisited) => {}
        }

        let Some(category) = self.categories.get(idx) else {
            return Ok(());
        };

        if let Some(mark) = marks.get_mut(idx) {
            *mark = Mark::Visiting;
        }
        stack.push(idx);

        for dep in &category.depends {
            let dep_idx =
                self.index
                    .get(dep)
                    .copied()
                    .ok_or_else(|| ResolveError::UnknownCategory {
                        name: dep.clone(),
                        required_by: Some(category.name.clone()),
                    })?;
            self.visit(dep_idx, marks, stack, order)?;
        }

        stack.pop();
        if let Some(mark) = marks.get_mut(idx) {
            *mark = Mark::Done;
        }
        order.push(idx);
        Ok(())
    }

    fn cycle_error(&self, idx: usize, stack: &[usize]) -> ResolveError {
        let start = stack.iter().position(|&i| i == idx).unwrap_or(0);
        let name = |i: usize| {
            self.categories
                .get(i)
                .map_or_else(String::new, |c| c.name.clone())
        };
        let mut cycle: Vec<String> = stack.iter().skip(start).map(|&i| name(i)).collect();
        cycle.push(name(idx));
        ResolveError::CycleDetected { cycle }
    }
}

/// An ordered, deduplicated list of categories to install in one run.
#[derive(Debug, Clone)]
pub struct Plan<'g> {
    categories: Vec<&'g Category>,
}

impl<'g> Plan<'g> {
    /// Categories in installation order.
    #[must_use]
    pub fn categories(&self) -> &[&'g Category] {
        &self.categories
    }

    /// Category names in installation order.
    #[must_use]
    pub fn names(&self) -> Vec<&'g str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of categories in the plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether the plan is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
