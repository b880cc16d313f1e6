//! Priority resolution from "must run before" relations
//!
//! Rules with a declared priority keep it. Every other rule gets a value
//! just below everything it must follow and just above everything it must
//! precede, defaulting to 0. When no rule can be computed from fully
//! resolved neighbours, the lexically first stalled rule that has at least
//! one resolved neighbour is computed from those alone (or, failing that,
//! the lexically first stalled rule), and the strict passes resume.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use crate::error::PriorityError;

/// One rule in the relation graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct PriorityNode {
    priority: Option<i32>,
    /// Rules this one must run before (they get lower values)
    before: BTreeSet<String>,
    /// Rules this one must run after (they get higher values)
    after: BTreeSet<String>,
}

/// Relation graph between rules.
///
/// ```
/// use fixkit_fixer::PriorityResolver;
///
/// let mut resolver = PriorityResolver::new();
/// resolver.add_rule("indent", Some(50));
/// resolver.add_rule("align", None);
/// resolver.add_relation("indent", "align").unwrap();
/// let priorities = resolver.resolve().unwrap();
/// assert_eq!(priorities["align"], 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PriorityResolver {
    nodes: BTreeMap<String, PriorityNode>,
}

impl PriorityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from rules with optional known priorities and
    /// `(before, after)` pairs
    pub fn from_relations<'a>(
        rules: impl IntoIterator<Item = (&'a str, Option<i32>)>,
        relations: &[(&str, &str)],
    ) -> Result<Self, PriorityError> {
        let mut resolver = Self::new();
        for (name, priority) in rules {
            resolver.add_rule(name, priority);
        }
        for (before, after) in relations {
            resolver.add_relation(before, after)?;
        }
        Ok(resolver)
    }

    /// Add a rule; adding it again only updates a missing priority
    pub fn add_rule(&mut self, name: &str, priority: Option<i32>) {
        let node = self.nodes.entry(name.to_string()).or_default();
        if node.priority.is_none() {
            node.priority = priority;
        }
    }

    /// Declare that `before` must run before `after`
    pub fn add_relation(&mut self, before: &str, after: &str) -> Result<(), PriorityError> {
        for name in [before, after] {
            if !self.nodes.contains_key(name) {
                return Err(PriorityError::UnknownRule(name.to_string()));
            }
        }
        if let Some(node) = self.nodes.get_mut(before) {
            node.before.insert(after.to_string());
        }
        if let Some(node) = self.nodes.get_mut(after) {
            node.after.insert(before.to_string());
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Priority of every rule.
    ///
    /// Cycles are reported as [`PriorityError::Unresolvable`] naming the
    /// rules on the cycle; an acyclic graph whose declared priorities leave
    /// no room for a rule is reported as [`PriorityError::Contradiction`].
    pub fn resolve(&self) -> Result<BTreeMap<String, i32>, PriorityError> {
        if let Some(cycle) = self.find_cycle() {
            return Err(PriorityError::Unresolvable { rules: cycle });
        }

        let mut resolved: BTreeMap<&str, i32> = self
            .nodes
            .iter()
            .filter_map(|(name, node)| node.priority.map(|p| (name.as_str(), p)))
            .collect();

        while resolved.len() < self.nodes.len() {
            if self.strict_pass(&mut resolved) {
                continue;
            }
            self.relaxed_step(&mut resolved);
        }

        self.verify(&resolved)?;

        Ok(resolved
            .into_iter()
            .map(|(name, priority)| (name.to_string(), priority))
            .collect())
    }

    /// Rules with their priorities, first to run first; equal priorities
    /// are ordered by name
    pub fn ordered(&self) -> Result<Vec<(String, i32)>, PriorityError> {
        let mut ordered: Vec<(String, i32)> = self.resolve()?.into_iter().collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(ordered)
    }

    /// One pass over unresolved rules whose neighbours are all resolved
    fn strict_pass<'a>(&'a self, resolved: &mut BTreeMap<&'a str, i32>) -> bool {
        let mut progress = false;
        for (name, node) in &self.nodes {
            if resolved.contains_key(name.as_str()) {
                continue;
            }
            if let Some(priority) = compute(node, resolved, true) {
                trace!(rule = name.as_str(), priority, "resolved priority");
                resolved.insert(name.as_str(), priority);
                progress = true;
            }
        }
        progress
    }

    fn relaxed_step<'a>(&'a self, resolved: &mut BTreeMap<&'a str, i32>) {
        let mut stalled = self
            .nodes
            .iter()
            .filter(|(name, _)| !resolved.contains_key(name.as_str()));

        let with_neighbour = self.nodes.iter().find(|(name, node)| {
            !resolved.contains_key(name.as_str())
                && node
                    .before
                    .iter()
                    .chain(&node.after)
                    .any(|n| resolved.contains_key(n.as_str()))
        });

        let candidate = with_neighbour.or_else(|| stalled.next());
        if let Some((name, node)) = candidate {
            let priority = compute(node, resolved, false).unwrap_or(0);
            debug!(rule = name.as_str(), priority, "resolved priority from partial relations");
            resolved.insert(name.as_str(), priority);
        }
    }

    fn verify(&self, resolved: &BTreeMap<&str, i32>) -> Result<(), PriorityError> {
        for (name, node) in &self.nodes {
            for after in &node.before {
                let before_priority = resolved[name.as_str()];
                let after_priority = resolved[after.as_str()];
                if before_priority <= after_priority {
                    return Err(PriorityError::Contradiction {
                        before: name.clone(),
                        after: after.clone(),
                        before_priority,
                        after_priority,
                    });
                }
            }
        }
        Ok(())
    }

    /// Rules on the first cycle found, walking rules by name
    fn find_cycle(&self) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit<'a>(
            nodes: &'a BTreeMap<String, PriorityNode>,
            name: &'a str,
            marks: &mut BTreeMap<&'a str, Mark>,
            path: &mut Vec<&'a str>,
        ) -> Option<Vec<String>> {
            match marks.get(name) {
                Some(Mark::Done) => return None,
                Some(Mark::Visiting) => {
                    let start = path.iter().position(|n| *n == name).unwrap_or(0);
                    return Some(path[start..].iter().map(|n| n.to_string()).collect());
                }
                None => {}
            }
            marks.insert(name, Mark::Visiting);
            path.push(name);
            for next in &nodes[name].before {
                if let Some(cycle) = visit(nodes, next, marks, path) {
                    return Some(cycle);
                }
            }
            path.pop();
            marks.insert(name, Mark::Done);
            None
        }

        let mut marks = BTreeMap::new();
        let mut path = Vec::new();
        self.nodes
            .keys()
            .find_map(|name| visit(&self.nodes, name, &mut marks, &mut path))
    }
}

/// Value for `node` from its resolved neighbours; with `strict`, `None`
/// unless every neighbour is resolved
fn compute(node: &PriorityNode, resolved: &BTreeMap<&str, i32>, strict: bool) -> Option<i32> {
    let mut priority = 0;
    for predecessor in &node.after {
        match resolved.get(predecessor.as_str()) {
            Some(&p) => priority = priority.min(p - 1),
            None if strict => return None,
            None => {}
        }
    }
    for successor in &node.before {
        match resolved.get(successor.as_str()) {
            Some(&p) => priority = priority.max(p + 1),
            None if strict => return None,
            None => {}
        }
    }
    Some(priority)
}
