use crate::error::RowSqlError;
use crate::types::Value;

/// Parameters for one query call.
///
/// A set is either positional (substituted into `?` markers left to right) or
/// named (substituted into `:name` markers). Carrying both at once is rejected
/// at encode time rather than silently preferring one style:
/// ```rust
/// use rowsql::{Params, Value};
///
/// let by_position = Params::positional([Value::Int(1), Value::Text("a".into())]);
/// let by_name = Params::named([("id", Value::Int(1))]);
/// # let _ = (by_position, by_name);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Params {
    positional: Vec<Value>,
    named: Vec<(String, Value)>,
}

/// Borrowed view produced by [`Params::classify`].
pub(crate) enum ParamStyle<'a> {
    None,
    Positional(&'a [Value]),
    Named(&'a [(String, Value)]),
}

impl Params {
    /// An empty parameter set.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            positional: values.into_iter().map(Into::into).collect(),
            named: Vec::new(),
        }
    }

    pub fn named<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            positional: Vec::new(),
            named: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Append a positional value (builder style).
    #[must_use]
    pub fn with(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Append a named value (builder style).
    #[must_use]
    pub fn with_named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    /// Resolve which substitution style applies, rejecting mixed sets.
    pub(crate) fn classify(&self) -> Result<ParamStyle<'_>, RowSqlError> {
        match (self.positional.is_empty(), self.named.is_empty()) {
            (true, true) => Ok(ParamStyle::None),
            (false, true) => Ok(ParamStyle::Positional(&self.positional)),
            (true, false) => Ok(ParamStyle::Named(&self.named)),
            (false, false) => Err(RowSqlError::Parameter(
                "positional and named parameters cannot be mixed in one call".to_string(),
            )),
        }
    }
}

impl From<Vec<Value>> for Params {
    fn from(values: Vec<Value>) -> Self {
        Params {
            positional: values,
            named: Vec::new(),
        }
    }
}
