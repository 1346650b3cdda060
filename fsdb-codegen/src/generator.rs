use crate::config::GeneratorConfig;
use crate::emitter::{emit_unit, EmitContext};
use crate::error::{CodegenError, GrammarError, MalformedGrammar, Result};
use crate::grammar;
use crate::naming;
use crate::node::{NodeId, PathTree};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Collects grammar statements into one path tree and renders them.
#[derive(Debug, Clone)]
pub struct Generator {
    package: String,
    tree: PathTree,
    terminals: Vec<NodeId>,
}

impl Generator {
    pub fn new(package: &str, root: &str) -> Result<Self> {
        if syn::parse_str::<syn::Ident>(package).is_err() {
            return Err(CodegenError::InvalidName {
                what: "package",
                name: package.to_string(),
            });
        }
        naming::check_segment(root).map_err(|_: GrammarError| CodegenError::InvalidName {
            what: "root",
            name: root.to_string(),
        })?;

        Ok(Self {
            package: package.to_string(),
            tree: PathTree::new(root),
            terminals: Vec::new(),
        })
    }

    /// A generator for `config`'s package and root; statements are not added.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        Self::new(&config.package, &config.root)
    }

    pub fn tree(&self) -> &PathTree {
        &self.tree
    }

    pub fn terminals(&self) -> &[NodeId] {
        &self.terminals
    }

    /// Parse and attach one statement. A rejected statement is not recorded
    /// and leaves the tree as it was.
    pub fn add_statement(&mut self, source: &str) -> std::result::Result<NodeId, MalformedGrammar> {
        let terminal = grammar::parse_into(&mut self.tree, source)?;
        self.terminals.push(terminal);
        Ok(terminal)
    }

    /// Render one unit per accepted statement, in statement order.
    ///
    /// Each call starts from an empty [`EmitContext`], so repeated runs produce
    /// identical output.
    pub fn generate(&self) -> Result<Generation> {
        let mut ctx = EmitContext::new();
        let mut taken = HashSet::new();
        let mut units = Vec::with_capacity(self.terminals.len());

        for &terminal in &self.terminals {
            let module = unique_module(unit_module_name(&self.tree, terminal), &mut taken);
            let tokens = emit_unit(&self.tree, terminal, &mut ctx);
            let source = render_source(&module, &self.package, tokens.clone())?;
            units.push(OutputUnit {
                file_name: format!("{module}.rs"),
                module,
                record_path: self.tree.full_path(terminal),
                tokens,
                source,
            });
        }

        Ok(Generation {
            package: self.package.clone(),
            units,
        })
    }
}

/// `fsdb_<target>` for typed records, `fsdb_<name>_record` otherwise.
pub fn unit_module_name(tree: &PathTree, terminal: NodeId) -> String {
    let node = tree.node(terminal);
    match node.target() {
        Some(target) => format!("fsdb_{}", naming::target_stem(target)),
        None => format!("fsdb_{}_record", node.method_name()),
    }
}

fn unique_module(base: String, taken: &mut HashSet<String>) -> String {
    let mut candidate = base.clone();
    let mut n = 1;
    while taken.contains(&candidate) {
        n += 1;
        candidate = format!("{base}_{n}");
    }
    taken.insert(candidate.clone());
    candidate
}

fn render_source(unit: &str, package: &str, tokens: TokenStream) -> Result<String> {
    let file: syn::File = syn::parse2(tokens).map_err(|source| CodegenError::Render {
        unit: unit.to_string(),
        source,
    })?;
    Ok(format!(
        "// Code generated by fsdb-codegen for `{package}`. DO NOT EDIT.\n\n{}",
        prettyplease::unparse(&file)
    ))
}

/// One rendered output file.
#[derive(Debug, Clone)]
pub struct OutputUnit {
    /// Rust module name, e.g. `fsdb_user`.
    pub module: String,
    pub file_name: String,
    /// Full path of the record this unit was generated for.
    pub record_path: String,
    pub source: String,
    tokens: TokenStream,
}

/// The rendered units of one run.
#[derive(Debug, Clone)]
pub struct Generation {
    package: String,
    units: Vec<OutputUnit>,
}

impl Generation {
    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn units(&self) -> &[OutputUnit] {
        &self.units
    }

    /// `mod.rs` declaring every unit and re-exporting its types.
    pub fn index_source(&self) -> Result<String> {
        let mut tokens = quote! {
            #[allow(unused_imports)]
            use super::*;
        };
        for unit in &self.units {
            let module = format_ident!("{}", unit.module);
            tokens.extend(quote! {
                pub mod #module;
                pub use #module::*;
            });
        }
        render_source("mod", &self.package, tokens)
    }

    /// All units as inline modules of a single file, for `include!` from a
    /// build script.
    pub fn bundle(&self) -> Result<String> {
        let mut tokens = quote! {
            #[allow(unused_imports)]
            use super::*;
        };
        for unit in &self.units {
            let module = format_ident!("{}", unit.module);
            let body = &unit.tokens;
            tokens.extend(quote! {
                pub mod #module {
                    #body
                }
                pub use #module::*;
            });
        }
        render_source("bundle", &self.package, tokens)
    }

    /// Write every unit and the `mod.rs` index into `dir`, creating it first.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let mut written = Vec::with_capacity(self.units.len() + 1);
        for unit in &self.units {
            let path = dir.join(&unit.file_name);
            std::fs::write(&path, &unit.source)?;
            log::info!("Wrote {} for {}", path.display(), unit.record_path);
            written.push(path);
        }

        let index = dir.join("mod.rs");
        std::fs::write(&index, self.index_source()?)?;
        log::info!("Wrote {}", index.display());
        written.push(index);

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const STATEMENTS: &[&str] = &[
        "/group/users/user -> User",
        "/group/:id/meta -> Meta",
        "/group/:id/blobs/blob",
    ];

    fn generator(statements: &[&str]) -> Generator {
        let mut generator = Generator::new("store", "data").unwrap();
        for statement in statements {
            generator.add_statement(statement).unwrap();
        }
        generator
    }

    fn count(code: &str, needle: &str) -> usize {
        code.matches(needle).count()
    }

    #[test]
    fn test_invalid_names_rejected() {
        assert!(matches!(
            Generator::new("not a module", "data"),
            Err(CodegenError::InvalidName { what: "package", .. })
        ));
        assert!(matches!(
            Generator::new("store", "9lives"),
            Err(CodegenError::InvalidName { what: "root", .. })
        ));
    }

    #[test]
    fn test_one_unit_per_statement() {
        let generation = generator(STATEMENTS).generate().unwrap();
        let modules: Vec<_> = generation.units().iter().map(|u| u.module.as_str()).collect();
        assert_eq!(modules, vec!["fsdb_user", "fsdb_meta", "fsdb_blob_record"]);
        assert_eq!(generation.package(), "store");
        assert_eq!(generation.units()[0].file_name, "fsdb_user.rs");
        assert_eq!(generation.units()[1].record_path, "data/group/id/meta");
    }

    #[test]
    fn test_units_are_valid_rust() {
        let generation = generator(STATEMENTS).generate().unwrap();
        for unit in generation.units() {
            assert!(
                syn::parse_file(&unit.source).is_ok(),
                "{} is not valid Rust:\n{}",
                unit.module,
                unit.source
            );
            assert!(unit.source.starts_with("// Code generated by fsdb-codegen for `store`."));
        }
        assert!(syn::parse_file(&generation.bundle().unwrap()).is_ok());
        assert!(syn::parse_file(&generation.index_source().unwrap()).is_ok());
    }

    #[test]
    fn test_each_declaration_appears_once_across_units() {
        let generation = generator(STATEMENTS).generate().unwrap();
        let sources: Vec<&str> = generation.units().iter().map(|u| u.source.as_str()).collect();

        for class in [
            "DataCollection",
            "GroupCollection",
            "UsersCollection",
            "UserRecord",
            "IdCollection",
            "MetaRecord",
            "BlobsCollection",
            "BlobRecord",
        ] {
            let needle = format!("pub struct {class} ");
            let total: usize = sources.iter().map(|s| count(s, &needle)).sum();
            assert_eq!(total, 1, "{class} declared {total} times");
        }

        // The shared prefix lands in the first unit.
        assert_eq!(count(sources[0], "pub struct GroupCollection "), 1);
        assert_eq!(count(sources[0], "pub struct DataCollection "), 1);
        // The dynamic folder is shared by the second and third units.
        assert_eq!(count(sources[1], "pub struct IdCollection "), 1);
        assert_eq!(count(sources[2], "pub struct IdCollection "), 0);
        assert_eq!(count(sources[2], "pub struct BlobsCollection "), 1);
    }

    #[test]
    fn test_header_flags_per_unit() {
        let generation = generator(STATEMENTS).generate().unwrap();
        let units = generation.units();
        assert!(units[0].source.contains("use ::fsdb::chrono::{DateTime, Utc};"));
        assert!(units[1].source.contains("use ::fsdb::listing;"));
    }

    #[test]
    fn test_independent_runs_are_identical() {
        let first = generator(STATEMENTS).generate().unwrap();
        let second = generator(STATEMENTS).generate().unwrap();
        let again = generator(STATEMENTS);
        let third = again.generate().unwrap();
        let fourth = again.generate().unwrap();

        for (((a, b), c), d) in first
            .units()
            .iter()
            .zip(second.units())
            .zip(third.units())
            .zip(fourth.units())
        {
            assert_eq!(a.source, b.source);
            assert_eq!(a.source, c.source);
            assert_eq!(a.source, d.source);
        }
        assert_eq!(first.bundle().unwrap(), second.bundle().unwrap());
    }

    #[test]
    fn test_repeated_module_names_get_suffix() {
        let generation = generator(&[
            "/a/user -> User",
            "/b/person -> User",
            "/c/thing -> User",
        ])
        .generate()
        .unwrap();
        let modules: Vec<_> = generation.units().iter().map(|u| u.module.as_str()).collect();
        assert_eq!(modules, vec!["fsdb_user", "fsdb_user_2", "fsdb_user_3"]);
    }

    #[test]
    fn test_sibling_method_collision_is_not_rendered() {
        let mut generator = generator(&["/group/:Item/x"]);
        let err = generator.add_statement("/group/item").unwrap_err();
        assert!(matches!(err.reason, GrammarError::MethodCollision { .. }));

        let bundle = generator.generate().unwrap().bundle().unwrap();
        assert_eq!(count(&bundle, "pub fn list_items("), 1);
        assert!(syn::parse_file(&bundle).is_ok());
    }

    #[test]
    fn test_rejected_statement_is_not_rendered() {
        let mut generator = generator(&["/group/:id/meta -> Meta"]);
        assert!(generator.add_statement("/group/id/other").is_err());
        generator.add_statement("/group/users/user -> User").unwrap();

        let generation = generator.generate().unwrap();
        assert_eq!(generation.units().len(), 2);
        assert_eq!(generator.terminals().len(), 2);
    }

    #[test]
    fn test_index_declares_units() {
        let generation = generator(STATEMENTS).generate().unwrap();
        let index = generation.index_source().unwrap();
        assert!(index.contains("use super::*;"));
        assert!(index.contains("pub mod fsdb_user;"));
        assert!(index.contains("pub use fsdb_user::*;"));
        assert!(index.contains("pub mod fsdb_blob_record;"));
    }

    #[test]
    fn test_bundle_inlines_units() {
        let generation = generator(STATEMENTS).generate().unwrap();
        let bundle = generation.bundle().unwrap();
        assert!(bundle.contains("pub mod fsdb_meta {"));
        assert!(bundle.contains("pub use fsdb_meta::*;"));
        assert_eq!(count(&bundle, "pub struct GroupCollection "), 1);
    }

    #[test]
    fn test_write_to_creates_directory() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("nested").join("store");
        let generation = generator(STATEMENTS).generate().unwrap();

        let written = generation.write_to(&out).unwrap();
        assert_eq!(written.len(), 4);
        assert_eq!(
            std::fs::read_to_string(out.join("fsdb_meta.rs")).unwrap(),
            generation.units()[1].source
        );
        assert!(out.join("mod.rs").is_file());
    }

    #[test]
    fn test_write_to_unusable_directory_fails() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, "").unwrap();

        let generation = generator(STATEMENTS).generate().unwrap();
        let err = generation.write_to(&blocker.join("out")).unwrap_err();
        assert!(matches!(err, CodegenError::Io(_)));
    }
}
