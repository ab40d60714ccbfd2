use crate::node::NodeId;
use crate::selection::DomPosition;
use crate::tree::Dom;

/// What happens to one child during normalization
#[derive(Debug, Clone, Copy)]
enum Fate {
    Keep,
    /// Content (possibly empty) is appended to `target`, starting at `prefix`
    MergeInto { target: NodeId, prefix: usize },
    /// Empty text with no neighbour to merge into
    Drop,
}

impl Dom {
    /// Merge adjacent text nodes and remove empty ones under `root`.
    ///
    /// Positions in `tracked` are rewritten so they keep pointing at the same
    /// logical place in the merged text.
    pub fn normalize(&mut self, root: NodeId, tracked: &mut [DomPosition]) {
        let mut stack = vec![root];
        while let Some(container) = stack.pop() {
            if self.is_text(container) {
                continue;
            }
            self.normalize_children(container, tracked);
            stack.extend(
                self.children(container)
                    .iter()
                    .copied()
                    .filter(|&child| !self.is_text(child)),
            );
        }
    }

    fn normalize_children(&mut self, container: NodeId, tracked: &mut [DomPosition]) {
        let children = self.children(container).to_vec();
        let fates = self.plan_merges(&children);
        if fates.iter().all(|fate| matches!(fate, Fate::Keep)) {
            return;
        }

        // Surviving children before each old index, for container offsets
        let mut kept_before = Vec::with_capacity(children.len() + 1);
        let mut kept = 0;
        for fate in &fates {
            kept_before.push(kept);
            if matches!(fate, Fate::Keep) {
                kept += 1;
            }
        }
        kept_before.push(kept);

        for position in tracked.iter_mut() {
            if position.node == container {
                let k = position.offset.min(children.len());
                *position = match fates.get(k) {
                    Some(Fate::MergeInto { target, prefix }) => DomPosition::new(*target, *prefix),
                    _ => DomPosition::new(container, kept_before[k]),
                };
            } else if let Some(index) = children.iter().position(|&c| c == position.node) {
                match fates[index] {
                    Fate::Keep => {}
                    Fate::MergeInto { target, prefix } => {
                        *position = DomPosition::new(target, prefix + position.offset);
                    }
                    Fate::Drop => {
                        *position = DomPosition::new(container, kept_before[index]);
                    }
                }
            }
        }

        for (index, fate) in fates.iter().enumerate() {
            match fate {
                Fate::Keep => {}
                Fate::MergeInto { target, .. } => {
                    let appended = self.text(children[index]).unwrap_or_default().to_string();
                    if !appended.is_empty() {
                        let merged = format!("{}{}", self.text(*target).unwrap_or_default(), appended);
                        self.set_text(*target, merged);
                    }
                    self.detach(children[index]);
                }
                Fate::Drop => self.detach(children[index]),
            }
        }
    }

    fn plan_merges(&self, children: &[NodeId]) -> Vec<Fate> {
        let mut fates = vec![Fate::Keep; children.len()];
        let mut index = 0;
        while index < children.len() {
            if !self.is_text(children[index]) {
                index += 1;
                continue;
            }
            let run_start = index;
            while index < children.len() && self.is_text(children[index]) {
                index += 1;
            }
            let run = run_start..index;

            let survivor = run
                .clone()
                .find(|&i| self.node_length(children[i]) > 0);
            let Some(survivor) = survivor else {
                for i in run {
                    fates[i] = Fate::Drop;
                }
                continue;
            };

            let target = children[survivor];
            let mut length = 0;
            for i in run {
                if i == survivor {
                    length += self.node_length(target);
                } else if i < survivor {
                    fates[i] = Fate::MergeInto { target, prefix: 0 };
                } else {
                    fates[i] = Fate::MergeInto {
                        target,
                        prefix: length,
                    };
                    length += self.node_length(children[i]);
                }
            }
        }
        fates
    }
}
