use std::collections::HashMap;

/// Values supplied for command placeholders, keyed by placeholder name
///
/// On the command line a value for `{branch}` arrives as `--set-branch=...`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet {
    values: HashMap<String, String>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Look up a value; suitable as the lookup for template resolution
    pub fn get(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for OptionSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = OptionSet::new();
        for (name, value) in iter {
            options.insert(name, value);
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_set_lookup() {
        let options: OptionSet = [("branch", "main")].into_iter().collect();
        assert_eq!(options.get("branch"), Some("main".to_string()));
        assert_eq!(options.get("remote"), None);
        assert_eq!(options.len(), 1);
    }

    #[test]
    fn test_option_set_default_is_empty() {
        assert!(OptionSet::default().is_empty());
    }
}
