//! Replays recorded interactions from a cassette.

use std::collections::HashMap;

use super::format::{Cassette, Interaction};

/// Serves interactions from a loaded cassette, sequentially per method.
pub struct CassetteReplayer {
    queues: HashMap<String, Vec<Interaction>>,
    cursors: HashMap<String, usize>,
}

impl CassetteReplayer {
    /// Create a new replayer from a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<String, Vec<Interaction>> = HashMap::new();
        for interaction in &cassette.interactions {
            queues.entry(interaction.method.clone()).or_default().push(interaction.clone());
        }
        let cursors = queues.keys().map(|k| (k.clone(), 0)).collect();
        Self { queues, cursors }
    }

    /// Return the next interaction recorded for `method`.
    ///
    /// A recorded input that differs from `input` is logged but still
    /// served: replay follows call order, not arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette has no (more) interactions for
    /// `method`, naming what was requested and what remains.
    pub fn next_interaction(
        &mut self,
        method: &str,
        input: &serde_json::Value,
    ) -> Result<&Interaction, String> {
        let Some(queue) = self.queues.get(method) else {
            let mut available: Vec<&str> = self.queues.keys().map(String::as_str).collect();
            available.sort_unstable();
            return Err(format!(
                "Cassette exhausted: no interactions recorded for method={method:?}. \
                 Available methods: [{}]",
                available.join(", ")
            ));
        };

        let cursor = self.cursors.entry(method.to_string()).or_insert(0);
        if *cursor >= queue.len() {
            return Err(format!(
                "Cassette exhausted: all {count} interactions for method={method:?} \
                 have been consumed. Last interaction was seq={last_seq}.",
                count = queue.len(),
                last_seq = queue.last().map_or(0, |i| i.seq),
            ));
        }

        let interaction = &queue[*cursor];
        *cursor += 1;
        if &interaction.input != input {
            tracing::warn!(
                method,
                seq = interaction.seq,
                recorded = %interaction.input,
                requested = %input,
                "replayed input differs from recording"
            );
        }
        Ok(interaction)
    }

    /// Returns how many interactions have not been served yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queues
            .iter()
            .map(|(method, queue)| queue.len() - self.cursors.get(method).copied().unwrap_or(0))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn make_cassette(interactions: Vec<Interaction>) -> Cassette {
        Cassette { name: "test".into(), recorded_at: Utc::now(), interactions }
    }

    fn interaction(seq: u64, method: &str, path: &str, output: serde_json::Value) -> Interaction {
        Interaction { seq, method: method.into(), input: json!({"path": path}), output }
    }

    #[test]
    fn methods_are_served_independently_in_order() {
        let cassette = make_cassette(vec![
            interaction(0, "entry_type", "/t/a.md", json!({"ok": null})),
            interaction(1, "symlink", "/t/a.md", json!({"ok": null})),
            interaction(2, "entry_type", "/t/b.md", json!({"ok": "file"})),
        ]);
        let mut replayer = CassetteReplayer::new(&cassette);

        let first = replayer.next_interaction("entry_type", &json!({"path": "/t/a.md"})).unwrap();
        assert_eq!(first.seq, 0);
        let second = replayer.next_interaction("entry_type", &json!({"path": "/t/b.md"})).unwrap();
        assert_eq!(second.output, json!({"ok": "file"}));
        assert_eq!(replayer.remaining(), 1);

        let link = replayer.next_interaction("symlink", &json!({"path": "/t/a.md"})).unwrap();
        assert_eq!(link.seq, 1);
        assert_eq!(replayer.remaining(), 0);
    }

    #[test]
    fn exhausted_method_is_an_error() {
        let cassette =
            make_cassette(vec![interaction(0, "read_link", "/t/a.md", json!({"ok": "/s/a.md"}))]);
        let mut replayer = CassetteReplayer::new(&cassette);
        let input = json!({"path": "/t/a.md"});
        replayer.next_interaction("read_link", &input).unwrap();

        let err = replayer.next_interaction("read_link", &input).unwrap_err();
        assert!(err.contains("have been consumed"));
    }

    #[test]
    fn unknown_method_lists_available() {
        let cassette =
            make_cassette(vec![interaction(0, "list_dir", "/s", json!({"ok": []}))]);
        let mut replayer = CassetteReplayer::new(&cassette);

        let err = replayer.next_interaction("symlink", &json!({})).unwrap_err();
        assert!(err.contains("no interactions recorded"));
        assert!(err.contains("list_dir"));
    }
}
