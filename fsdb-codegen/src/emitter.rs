//! Rendering of output units.
//!
//! A unit is a header followed by one declaration per node, walking from the
//! record up towards the root. The walk stops at the first node already in the
//! [`EmitContext`]: ancestors are always emitted together with their
//! descendants, so everything above it was rendered by an earlier unit.

use crate::naming::{affixed_ident, method_ident, target_accessor};
use crate::node::{NodeId, NodeKind, PathTree};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use std::collections::HashSet;

/// Full paths of the nodes whose declarations have been rendered in this run.
#[derive(Debug, Clone, Default)]
pub struct EmitContext {
    emitted: HashSet<String>,
}

impl EmitContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, full_path: &str) -> bool {
        self.emitted.contains(full_path)
    }

    pub fn len(&self) -> usize {
        self.emitted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emitted.is_empty()
    }

    fn mark(&mut self, full_path: String) {
        self.emitted.insert(full_path);
    }
}

/// Which runtime facilities a unit imports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderFlags {
    /// The chain contains a record: document encoding and timestamps.
    pub files: bool,
    /// The chain contains a dynamic folder: directory listing.
    pub dynamic: bool,
}

impl HeaderFlags {
    pub fn for_chain(tree: &PathTree, terminal: NodeId) -> Self {
        tree.ancestors(terminal)
            .fold(HeaderFlags::default(), |flags, id| {
                let node = tree.node(id);
                HeaderFlags {
                    files: flags.files || !node.is_folder(),
                    dynamic: flags.dynamic || node.is_dynamic(),
                }
            })
    }
}

/// Render the unit for `terminal`, recording every declared node in `ctx`.
pub fn emit_unit(tree: &PathTree, terminal: NodeId, ctx: &mut EmitContext) -> TokenStream {
    let mut tokens = render_header(HeaderFlags::for_chain(tree, terminal));

    for id in tree.ancestors(terminal) {
        let full_path = tree.full_path(id);
        if ctx.contains(&full_path) {
            break;
        }
        let node = tree.node(id);
        log::debug!("Declaring {} for {full_path}", node.class_name());
        let declaration = match node.kind() {
            NodeKind::Folder { dynamic } => render_folder(tree, id, *dynamic),
            NodeKind::File { target } => render_file(tree, id, target.as_ref()),
        };
        tokens.extend(declaration);
        ctx.mark(full_path);
    }

    tokens
}

pub fn render_header(flags: HeaderFlags) -> TokenStream {
    let mut tokens = quote! {
        #[allow(unused_imports)]
        use super::*;
        #[allow(unused_imports)]
        use ::std::path::{Path, PathBuf};
    };

    if flags.files {
        tokens.extend(quote! {
            #[allow(unused_imports)]
            use ::fsdb::chrono::{DateTime, Utc};
            #[allow(unused_imports)]
            use ::fsdb::document;
            #[allow(unused_imports)]
            use ::fsdb::serde::{de::DeserializeOwned, Serialize};
        });
    }
    if flags.files || flags.dynamic {
        tokens.extend(quote! {
            #[allow(unused_imports)]
            use ::fsdb::listing;
        });
    }

    tokens
}

fn class_ident(tree: &PathTree, id: NodeId) -> proc_macro2::Ident {
    format_ident!("{}", tree.node(id).class_name())
}

/// Collection type for a folder, plus its accessor on the parent collection
/// (or a constructor for the root).
pub fn render_folder(tree: &PathTree, id: NodeId, dynamic: bool) -> TokenStream {
    let node = tree.node(id);
    let class = class_ident(tree, id);
    let doc = format!(" Collection stored at `{}`.", tree.full_path(id));

    let mut tokens = quote! {
        #[doc = #doc]
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct #class {
            pub(super) location: PathBuf,
        }

        impl #class {
            /// Directory backing this collection.
            pub fn location(&self) -> &Path {
                &self.location
            }
        }
    };

    let accessors = match node.parent() {
        Some(parent) if dynamic => {
            let parent_class = class_ident(tree, parent);
            let accessor = method_ident(node.name());
            let list = affixed_ident("list", node.name(), "s");
            quote! {
                impl #parent_class {
                    /// The subdirectory named `key`. The key is joined as
                    /// given: separators and `..` are not rejected.
                    pub fn #accessor(&self, key: &str) -> #class {
                        #class {
                            location: self.location.join(key),
                        }
                    }

                    /// Keys of the existing subdirectories. Unreadable
                    /// locations are logged and yield an empty list.
                    pub fn #list(&self) -> Vec<String> {
                        listing::list_folders(&self.location)
                    }
                }
            }
        }
        Some(parent) => {
            let parent_class = class_ident(tree, parent);
            let accessor = method_ident(node.name());
            let param = node.param();
            quote! {
                impl #parent_class {
                    pub fn #accessor(&self) -> #class {
                        #class {
                            location: self.location.join(#param),
                        }
                    }
                }
            }
        }
        None => quote! {
            impl #class {
                pub fn new(root_location: impl Into<PathBuf>) -> Self {
                    Self {
                        location: root_location.into(),
                    }
                }
            }
        },
    };
    tokens.extend(accessors);

    tokens
}

/// Record type for a leaf document, plus the read/write/traversal operations
/// on its parent collection.
pub fn render_file(tree: &PathTree, id: NodeId, target: Option<&syn::Path>) -> TokenStream {
    let node = tree.node(id);
    let class = class_ident(tree, id);
    let doc = format!(" Record stored in `{}`.", tree.full_path(id));

    let typed_decode = target.map(|target| {
        let to_target = target_accessor(target);
        quote! {
            pub fn #to_target(&self) -> ::fsdb::Result<#target> {
                document::decode(&self.content)
            }
        }
    });

    let mut tokens = quote! {
        #[doc = #doc]
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct #class {
            pub(super) path: PathBuf,
            pub id: String,
            pub content: Vec<u8>,
            pub modified_at: DateTime<Utc>,
        }

        impl From<::fsdb::Document> for #class {
            fn from(doc: ::fsdb::Document) -> Self {
                Self {
                    path: doc.path,
                    id: doc.id,
                    content: doc.content,
                    modified_at: doc.modified_at,
                }
            }
        }

        impl #class {
            #typed_decode

            pub fn decode<T: DeserializeOwned>(&self) -> ::fsdb::Result<T> {
                document::decode(&self.content)
            }

            /// Replace the content with `value`. Call [`Self::save`] to persist it.
            pub fn encode<T: Serialize + ?Sized>(&mut self, value: &T) -> ::fsdb::Result<()> {
                self.content = document::encode(value)?;
                Ok(())
            }

            pub fn location(&self) -> &Path {
                &self.path
            }

            /// Write the content back, creating missing directories.
            pub fn save(&self) -> ::fsdb::Result<()> {
                document::write(&self.path, &self.content)
            }
        }
    };

    let Some(parent) = node.parent() else {
        return tokens;
    };
    let parent_class = class_ident(tree, parent);
    let name = node.name();

    let typed_loader = target.map(|target| {
        let get = affixed_ident("get", name, "");
        quote! {
            pub fn #get(&self, id: &str) -> ::fsdb::Result<#target> {
                document::load(&self.location, id)
            }
        }
    });

    let get_record = affixed_ident("get", name, "_record");
    let save = affixed_ident("save", name, "");
    let save_binary = affixed_ident("save", name, "_binary");
    let iterate = affixed_ident("iterate", name, "s");
    let list = affixed_ident("list", name, "s");

    tokens.extend(quote! {
        impl #parent_class {
            #typed_loader

            pub fn #get_record(&self, id: &str) -> ::fsdb::Result<#class> {
                document::read(&self.location, id).map(#class::from)
            }

            pub fn #save_binary(&self, id: &str, content: &[u8]) -> ::fsdb::Result<()> {
                document::write_in(&self.location, id, content)
            }

            pub fn #save<T: Serialize + ?Sized>(&self, id: &str, value: &T) -> ::fsdb::Result<()> {
                let content = document::encode(value)?;
                self.#save_binary(id, &content)
            }

            /// Feed every record to `handler`, stopping at the first handler
            /// or storage failure.
            pub fn #iterate<F, E>(&self, mut handler: F) -> ::std::result::Result<(), E>
            where
                F: FnMut(#class) -> ::std::result::Result<(), E>,
                E: From<::fsdb::FsdbError>,
            {
                for doc in listing::documents(&self.location)? {
                    handler(#class::from(doc?))?;
                }
                Ok(())
            }

            /// Ids of the stored records. Unreadable locations are logged and
            /// yield an empty list.
            pub fn #list(&self) -> Vec<String> {
                listing::list_documents(&self.location)
            }
        }
    });

    tokens
}
