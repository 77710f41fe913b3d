use crate::query::value::TrustedFragment;

/// Logical field populated from a traversal or sub-query expression instead
/// of a stored column, e.g. `->eats->fruit.*`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectionAlias {
    pub alias: String,
    pub expression: TrustedFragment,
}

impl ProjectionAlias {
    pub fn new(alias: impl Into<String>, expression: impl Into<TrustedFragment>) -> Self {
        Self {
            alias: alias.into(),
            expression: expression.into(),
        }
    }
}
