//! Job key derivation.
//!
//! A job key is `{namespace}:v{version}[:g{generation}]:{args}`. Arguments are
//! encoded with a type tag, strings carry a length prefix, so two different
//! argument tuples never render to the same text. Keys are plain strings and
//! stay stable across process restarts.

use std::fmt;

use sha2::{Digest, Sha256};

/// Longest key a store is handed. Longer keys get their argument part hashed.
pub const MAX_KEY_LEN: usize = 250;

/// A single positional job argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyArg {
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Boolean flag.
    Bool(bool),
    /// Free text.
    Str(String),
}

impl KeyArg {
    fn write_canonical(&self, out: &mut String) {
        match self {
            Self::Int(n) => {
                out.push('i');
                out.push_str(&n.to_string());
            },
            Self::UInt(n) => {
                out.push('u');
                out.push_str(&n.to_string());
            },
            Self::Bool(b) => out.push_str(if *b { "b1" } else { "b0" }),
            Self::Str(s) => {
                out.push('s');
                out.push_str(&s.len().to_string());
                out.push(':');
                out.push_str(s);
            },
        }
    }
}

impl From<i32> for KeyArg {
    fn from(n: i32) -> Self {
        Self::Int(n.into())
    }
}

impl From<i64> for KeyArg {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<u32> for KeyArg {
    fn from(n: u32) -> Self {
        Self::UInt(n.into())
    }
}

impl From<u64> for KeyArg {
    fn from(n: u64) -> Self {
        Self::UInt(n)
    }
}

impl From<bool> for KeyArg {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for KeyArg {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for KeyArg {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

/// Converts a job's argument type into key atoms.
///
/// Implemented for the scalar atom types and for tuples of up to four of
/// them. Domain id types implement it next to their definition.
pub trait KeyArgs {
    /// Returns the positional atoms, in order.
    fn key_args(&self) -> Vec<KeyArg>;
}

impl KeyArgs for () {
    fn key_args(&self) -> Vec<KeyArg> {
        Vec::new()
    }
}

macro_rules! scalar_key_args {
    ($($ty:ty),*) => {
        $(
            impl KeyArgs for $ty {
                fn key_args(&self) -> Vec<KeyArg> {
                    vec![KeyArg::from(self.clone())]
                }
            }
        )*
    };
}

scalar_key_args!(i32, i64, u32, u64, bool, String);

impl KeyArgs for &str {
    fn key_args(&self) -> Vec<KeyArg> {
        vec![KeyArg::from(*self)]
    }
}

macro_rules! tuple_key_args {
    ($($name:ident),+) => {
        impl<$($name),+> KeyArgs for ($($name,)+)
        where
            $($name: Clone + Into<KeyArg>),+
        {
            #[allow(non_snake_case)]
            fn key_args(&self) -> Vec<KeyArg> {
                let ($($name,)+) = self.clone();
                vec![$($name.into()),+]
            }
        }
    };
}

tuple_key_args!(A);
tuple_key_args!(A, B);
tuple_key_args!(A, B, C);
tuple_key_args!(A, B, C, D);

/// Renders arguments in their canonical form.
///
/// # Examples
///
/// ```
/// use freshet_core::{KeyArg, key::canonical_args};
///
/// let args = [KeyArg::from(42i64), KeyArg::from("intro")];
/// assert_eq!(canonical_args(&args), "i42/s5:intro");
/// ```
pub fn canonical_args(args: &[KeyArg]) -> String {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push('/');
        }
        arg.write_canonical(&mut out);
    }
    out
}

/// Deterministic cache key for a job invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobKey {
    namespace: String,
    version: u32,
    generation: Option<u64>,
    args: Vec<KeyArg>,
}

impl JobKey {
    /// Creates a key for the given namespace, version and arguments.
    ///
    /// # Examples
    ///
    /// ```
    /// use freshet_core::{JobKey, KeyArgs};
    ///
    /// let key = JobKey::new("wiki.document_tags", 1, (7u64,).key_args());
    /// assert_eq!(key.to_string(), "wiki.document_tags:v1:u7");
    /// ```
    pub fn new(namespace: impl Into<String>, version: u32, args: Vec<KeyArg>) -> Self {
        Self {
            namespace: namespace.into(),
            version,
            generation: None,
            args,
        }
    }

    /// Returns a copy of this key scoped to a generation.
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = Some(generation);
        self
    }

    /// Key under which the generation number for `scope` is stored.
    pub fn generation_key(namespace: &str, version: u32, scope: &[KeyArg]) -> String {
        format!(
            "{}:v{}:generation:{}",
            namespace,
            version,
            canonical_args(scope)
        )
    }

    /// Returns the namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the version.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Returns the generation, if the key is generational.
    pub fn generation(&self) -> Option<u64> {
        self.generation
    }

    /// Returns the argument atoms.
    pub fn args(&self) -> &[KeyArg] {
        &self.args
    }

    fn prefix(&self) -> String {
        match self.generation {
            Some(generation) => format!("{}:v{}:g{}", self.namespace, self.version, generation),
            None => format!("{}:v{}", self.namespace, self.version),
        }
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.prefix();
        let args = canonical_args(&self.args);

        if prefix.len() + 1 + args.len() <= MAX_KEY_LEN {
            write!(f, "{}:{}", prefix, args)
        } else {
            let digest = Sha256::digest(args.as_bytes());
            write!(f, "{}:h{}", prefix, hex::encode(digest))
        }
    }
}
