//! Table aliases for joins added while building a search.

use std::collections::HashSet;

use rand::Rng;

/// Produces candidate aliases for search-path joins.
///
/// `attempt` counts every candidate requested during one query build,
/// starting at zero. Candidates that collide with an alias already in the
/// query are discarded by the caller, which then asks again.
pub trait AliasGenerator: Send + Sync {
    fn candidate(&self, attempt: usize) -> String;
}

/// `_s0`, `_s1`, ... scoped to one query build.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialAliases;

impl AliasGenerator for SequentialAliases {
    fn candidate(&self, attempt: usize) -> String {
        format!("_s{}", attempt)
    }
}

/// Eight random lowercase letters.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomAliases;

impl AliasGenerator for RandomAliases {
    fn candidate(&self, _attempt: usize) -> String {
        let mut rng = rand::rng();
        (0..8)
            .map(|_| char::from(rng.random_range(b'a'..=b'z')))
            .collect()
    }
}

/// Hands out aliases unique within one query.
pub(crate) struct AliasScope<'a> {
    generator: &'a dyn AliasGenerator,
    taken: HashSet<String>,
    attempt: usize,
}

impl<'a> AliasScope<'a> {
    pub(crate) fn new(generator: &'a dyn AliasGenerator, taken: HashSet<String>) -> Self {
        Self {
            generator,
            taken,
            attempt: 0,
        }
    }

    pub(crate) fn next_alias(&mut self) -> String {
        loop {
            let candidate = self.generator.candidate(self.attempt);
            self.attempt += 1;
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}
