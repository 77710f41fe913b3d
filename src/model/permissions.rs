use crate::query::value::TrustedFragment;

/// Table or field permission policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Permissions {
    /// Every action is allowed.
    Full,
    /// Every action is denied.
    None,
    /// One rule per action; unspecified actions default to [`Rule::Full`].
    PerAction(ActionRules),
}

/// Rules for each statement kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionRules {
    pub select: Option<Rule>,
    pub create: Option<Rule>,
    pub update: Option<Rule>,
    pub delete: Option<Rule>,
}

impl ActionRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, rule: impl Into<Rule>) -> Self {
        self.select = Some(rule.into());
        self
    }

    pub fn create(mut self, rule: impl Into<Rule>) -> Self {
        self.create = Some(rule.into());
        self
    }

    pub fn update(mut self, rule: impl Into<Rule>) -> Self {
        self.update = Some(rule.into());
        self
    }

    pub fn delete(mut self, rule: impl Into<Rule>) -> Self {
        self.delete = Some(rule.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rule {
    Full,
    None,
    /// Boolean expression rendered as `WHERE <expr>`.
    Where(TrustedFragment),
}

impl From<&str> for Rule {
    fn from(value: &str) -> Self {
        Rule::Where(TrustedFragment::new(value))
    }
}

impl From<TrustedFragment> for Rule {
    fn from(value: TrustedFragment) -> Self {
        Rule::Where(value)
    }
}

impl Permissions {
    /// Renders the clause without a leading space, e.g. `PERMISSIONS FULL`.
    pub fn to_clause(&self) -> String {
        match self {
            Permissions::Full => "PERMISSIONS FULL".to_string(),
            Permissions::None => "PERMISSIONS NONE".to_string(),
            Permissions::PerAction(rules) => {
                let actions = [
                    ("select", &rules.select),
                    ("create", &rules.create),
                    ("update", &rules.update),
                    ("delete", &rules.delete),
                ];
                let parts: Vec<String> = actions
                    .iter()
                    .map(|(action, rule)| {
                        let rendered = match rule {
                            None | Some(Rule::Full) => "FULL".to_string(),
                            Some(Rule::None) => "NONE".to_string(),
                            Some(Rule::Where(expr)) => format!("WHERE {expr}"),
                        };
                        format!("FOR {action} {rendered}")
                    })
                    .collect();
                format!("PERMISSIONS {}", parts.join(" "))
            }
        }
    }
}
