use std::path::{Path, PathBuf};

use dashmap::DashMap;

/// Count-based ignores: each registered write tolerates exactly one
/// observed change on its path.
#[derive(Debug, Default)]
pub struct CountedIgnores {
    remaining: DashMap<PathBuf, u32>,
}

impl CountedIgnores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `times` to the path's tolerance.
    pub fn register(&self, path: PathBuf, times: u32) {
        if times == 0 {
            return;
        }
        *self.remaining.entry(path).or_insert(0) += times;
    }

    /// Use up one tolerance on `path`. Returns true if the change is suppressed.
    pub fn consume(&self, path: &Path) -> bool {
        let consumed = match self.remaining.get_mut(path) {
            Some(mut count) => {
                *count = count.saturating_sub(1);
                true
            }
            None => false,
        };

        // Another producer may have re-registered in between; only drop zeros.
        if consumed {
            self.remaining.remove_if(path, |_, count| *count == 0);
        }
        consumed
    }

    pub fn remaining(&self, path: &Path) -> u32 {
        self.remaining.get(path).map_or(0, |count| *count)
    }

    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn clear(&self) {
        self.remaining.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_accumulates() {
        let ignores = CountedIgnores::new();
        let path = PathBuf::from("/game/Screens/GameScreen.glsj");
        ignores.register(path.clone(), 1);
        ignores.register(path.clone(), 2);
        assert_eq!(ignores.remaining(&path), 3);
    }

    #[test]
    fn test_zero_times_is_noop() {
        let ignores = CountedIgnores::new();
        ignores.register(PathBuf::from("/game/a.cs"), 0);
        assert!(ignores.is_empty());
    }

    #[test]
    fn test_consume_removes_at_zero() {
        let ignores = CountedIgnores::new();
        let path = PathBuf::from("/game/a.cs");
        ignores.register(path.clone(), 1);
        assert!(ignores.consume(&path));
        assert!(ignores.is_empty());
        assert!(!ignores.consume(&path));
    }
}
