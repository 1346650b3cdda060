use thiserror::Error;

/// A grammar statement that cannot be compiled. Reported per statement; other
/// statements of the same run are unaffected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Malformed grammar {statement:?}: {reason}")]
pub struct MalformedGrammar {
    pub statement: String,
    pub reason: GrammarError,
}

impl MalformedGrammar {
    pub fn new(statement: &str, reason: GrammarError) -> Self {
        Self {
            statement: statement.to_string(),
            reason,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("no path segments")]
    NoSegments,

    #[error("record `{0}` has no enclosing folder")]
    MissingFolder(String),

    #[error("empty target type after `->`")]
    EmptyTarget,

    #[error("target `{0}` is not a Rust type path")]
    InvalidTarget(String),

    #[error("dynamic marker without a name")]
    EmptyDynamic,

    #[error("segment `{0}` does not form a valid identifier")]
    InvalidSegment(String),

    #[error("segment `{0}` collides with a generated method")]
    ReservedSegment(String),

    #[error("`{path}` is already declared as {existing}")]
    Conflict { path: String, existing: String },

    #[error("`{class}` is already generated for `{path}`")]
    ClassCollision { class: String, path: String },

    #[error("method `{method}` is already generated for sibling `{path}`")]
    MethodCollision { method: String, path: String },
}

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error(transparent)]
    Grammar(#[from] MalformedGrammar),

    #[error("Invalid {what} name: {name:?}")]
    InvalidName { what: &'static str, name: String },

    #[error("Generated code for `{unit}` is not valid Rust: {source}")]
    Render { unit: String, source: syn::Error },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, CodegenError>;
