//! Grammar statements.
//!
//! ```text
//! SEGMENT(/SEGMENT)* [-> TARGET]
//!
//! /group/users/user -> User
//! /group/:id/meta -> Meta
//! ```
//!
//! Every segment but the last is a folder; a `:` prefix makes it dynamic. The
//! last segment is the record, optionally decoded into `TARGET`.

use crate::error::{GrammarError, MalformedGrammar};
use crate::naming;
use crate::node::{class_name, parent_methods, NodeId, NodeKind, PathTree};
use std::path::Path;

pub const DYNAMIC_MARKER: char = ':';
pub const TARGET_ARROW: &str = "->";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub name: String,
    pub dynamic: bool,
}

/// One parsed grammar statement, not yet attached to a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub source: String,
    pub segments: Vec<Segment>,
    pub target: Option<syn::Path>,
}

pub fn parse_statement(source: &str) -> Result<Statement, MalformedGrammar> {
    let malformed = |reason| MalformedGrammar::new(source, reason);

    let (path, target) = match source.split_once(TARGET_ARROW) {
        Some((path, target)) => (path, Some(parse_target(target.trim()).map_err(malformed)?)),
        None => (source, None),
    };

    let raw: Vec<&str> = path
        .trim()
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let mut segments = Vec::with_capacity(raw.len());
    for section in raw {
        let (name, dynamic) = match section.strip_prefix(DYNAMIC_MARKER) {
            Some(name) => (name, true),
            None => (section, false),
        };
        if name.is_empty() {
            return Err(malformed(GrammarError::EmptyDynamic));
        }
        naming::check_segment(name).map_err(malformed)?;
        segments.push(Segment {
            name: name.to_string(),
            dynamic,
        });
    }

    match segments.len() {
        0 => return Err(malformed(GrammarError::NoSegments)),
        1 => return Err(malformed(GrammarError::MissingFolder(segments[0].name.clone()))),
        _ => {}
    }

    // Records are always addressed by id; a marker on the leaf carries no meaning.
    if let Some(leaf) = segments.last_mut() {
        if leaf.dynamic {
            log::debug!("Ignoring dynamic marker on record `{}`", leaf.name);
            leaf.dynamic = false;
        }
    }

    Ok(Statement {
        source: source.to_string(),
        segments,
        target,
    })
}

fn parse_target(text: &str) -> Result<syn::Path, GrammarError> {
    if text.is_empty() {
        return Err(GrammarError::EmptyTarget);
    }
    syn::parse_str::<syn::Path>(text).map_err(|_| GrammarError::InvalidTarget(text.to_string()))
}

impl PathTree {
    /// Merge a statement into the tree and return its record node.
    ///
    /// Existing nodes are reused for shared prefixes. The statement is checked
    /// completely before any node is created, so a rejected statement leaves
    /// the tree unchanged.
    pub fn attach(&mut self, statement: &Statement) -> Result<NodeId, MalformedGrammar> {
        let malformed = |reason| MalformedGrammar::new(&statement.source, reason);

        let Some(last) = statement.segments.len().checked_sub(1) else {
            return Err(malformed(GrammarError::NoSegments));
        };

        let mut current = self.root();
        let mut pending: Vec<(String, NodeKind)> = Vec::new();

        for (i, segment) in statement.segments.iter().enumerate() {
            let kind = if i == last {
                NodeKind::File {
                    target: statement.target.clone(),
                }
            } else {
                NodeKind::Folder {
                    dynamic: segment.dynamic,
                }
            };

            if pending.is_empty() {
                if let Some(existing) = self.child(current, &segment.name) {
                    let node = self.node(existing);
                    if *node.kind() != kind {
                        return Err(malformed(GrammarError::Conflict {
                            path: self.full_path(existing),
                            existing: node.kind().to_string(),
                        }));
                    }
                    current = existing;
                    continue;
                }
            }

            let class = class_name(&segment.name, kind.is_folder());
            if let Some(owner) = self.find_class(&class) {
                return Err(malformed(GrammarError::ClassCollision {
                    class,
                    path: self.full_path(owner),
                }));
            }
            let planned = pending
                .iter()
                .any(|(name, kind)| class_name(name, kind.is_folder()) == class);
            if planned {
                return Err(malformed(GrammarError::ClassCollision {
                    class,
                    path: statement.source.trim().to_string(),
                }));
            }
            // Only the first new node joins an existing collection; the
            // rest hang off nodes created by this statement.
            if pending.is_empty() {
                if let Some(err) = self.method_collision(current, &segment.name, &kind) {
                    return Err(malformed(err));
                }
            }
            pending.push((segment.name.clone(), kind));
        }

        for (name, kind) in pending {
            current = self.push(name, kind, current);
        }
        Ok(current)
    }

    /// First method `name` would add to `parent` that an existing child of
    /// `parent` already generates.
    fn method_collision(
        &self,
        parent: NodeId,
        name: &str,
        kind: &NodeKind,
    ) -> Option<GrammarError> {
        let methods = parent_methods(name, kind);
        self.children(parent).into_iter().find_map(|sibling| {
            self.node(sibling)
                .parent_methods()
                .into_iter()
                .find(|method| methods.contains(method))
                .map(|method| GrammarError::MethodCollision {
                    method,
                    path: self.full_path(sibling),
                })
        })
    }
}

/// Parse `source` and attach it to `tree`.
pub fn parse_into(tree: &mut PathTree, source: &str) -> Result<NodeId, MalformedGrammar> {
    let statement = parse_statement(source)?;
    tree.attach(&statement)
}

/// Split grammar text into statements: one per line, blank lines and `#`
/// comments skipped.
pub fn parse_grammar_str(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub fn parse_grammar_file(path: &Path) -> std::io::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_grammar_str(&content))
}
