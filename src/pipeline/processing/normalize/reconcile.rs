use serde::{Deserialize, Serialize};

use crate::constants::{ALT_TITLES, ALT_TITLE_KEYS, RENAME_RULES};
use crate::types::{Record, Value};

/// A single synonym rule: the value under `from` moves to `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameRule {
    pub from: String,
    pub to: String,
}

/// Declarative key tables driving [`FieldReconciler`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileRules {
    /// Keys moved into the alternate-title bundle
    pub alt_title_keys: Vec<String>,
    /// Key the bundle is attached under
    #[serde(default = "default_bundle_key")]
    pub alt_title_bundle: String,
    /// Applied top to bottom; later rules see the output of earlier ones
    pub renames: Vec<RenameRule>,
}

fn default_bundle_key() -> String {
    ALT_TITLES.to_string()
}

impl Default for ReconcileRules {
    fn default() -> Self {
        Self {
            alt_title_keys: ALT_TITLE_KEYS.iter().map(|k| k.to_string()).collect(),
            alt_title_bundle: default_bundle_key(),
            renames: RENAME_RULES
                .iter()
                .map(|(from, to)| RenameRule {
                    from: from.to_string(),
                    to: to.to_string(),
                })
                .collect(),
        }
    }
}

/// Collapses a raw record's synonym keys into canonical keys.
#[derive(Debug, Clone, Default)]
pub struct FieldReconciler {
    rules: ReconcileRules,
}

impl FieldReconciler {
    pub fn new(rules: ReconcileRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ReconcileRules {
        &self.rules
    }

    /// Pulls alternate-title keys out of `record` and renames synonym keys.
    ///
    /// The bundle key is only added when at least one alternate title was found.
    pub fn reconcile(&self, mut record: Record) -> Record {
        let mut bundle = Record::new();
        for key in &self.rules.alt_title_keys {
            if let Some(value) = record.remove(key) {
                bundle.insert(key.as_str(), value);
            }
        }
        if !bundle.is_empty() {
            record.insert(self.rules.alt_title_bundle.as_str(), Value::Map(bundle));
        }

        for rule in &self.rules.renames {
            record.rename_key(&rule.from, &rule.to);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::from(*v)))
            .collect()
    }

    #[test]
    fn test_director_renamed_and_hangul_bundled() {
        let reconciler = FieldReconciler::default();
        let out = reconciler.reconcile(record(&[
            ("title", "The Host"),
            ("Directed by", "Bong Joon-ho"),
            ("Hangul", "괴물"),
        ]));

        assert_eq!(out.value("Director"), &Value::from("Bong Joon-ho"));
        assert!(!out.contains_key("Directed by"));
        assert!(!out.contains_key("Hangul"));
        match out.value(ALT_TITLES) {
            Value::Map(bundle) => assert_eq!(bundle.value("Hangul"), &Value::from("괴물")),
            other => panic!("expected alt-title bundle, got {:?}", other),
        }
    }

    #[test]
    fn test_no_alt_titles_means_no_bundle() {
        let out = FieldReconciler::default().reconcile(record(&[("Director", "X")]));
        assert!(!out.contains_key(ALT_TITLES));
    }

    #[test]
    fn test_release_chain_resolves() {
        let out = FieldReconciler::default().reconcile(record(&[("Released", "1999")]));
        assert_eq!(out.value("Release date"), &Value::from("1999"));
        assert!(!out.contains_key("Released"));
        assert!(!out.contains_key("Release Date"));
    }

    #[test]
    fn test_later_rule_overwrites() {
        let out = FieldReconciler::default().reconcile(record(&[
            ("Screenplay by", "A"),
            ("Written by", "B"),
        ]));
        assert_eq!(out.value("Writer(s)"), &Value::from("B"));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let reconciler = FieldReconciler::default();
        let once = reconciler.reconcile(record(&[
            ("Directed by", "X"),
            ("Hangul", "Y"),
            ("Length", "90 minutes"),
        ]));
        let twice = reconciler.reconcile(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_rules_load_from_toml() {
        let rules: ReconcileRules = toml::from_str(
            r#"
            alt_title_keys = ["Klingon"]
            renames = [{ from = "Helmed by", to = "Director" }]
            "#,
        )
        .unwrap();
        let out = FieldReconciler::new(rules).reconcile(record(&[
            ("Helmed by", "K"),
            ("Klingon", "tlhIngan"),
            ("Hangul", "kept"),
        ]));
        assert_eq!(out.value("Director"), &Value::from("K"));
        assert!(out.contains_key("Hangul"));
        assert!(out.contains_key(ALT_TITLES));
    }
}
