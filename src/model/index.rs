/// Secondary index over one or more fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexDescriptor {
    pub fields: Vec<String>,
    pub name: Option<String>,
    pub unique: bool,
}

impl IndexDescriptor {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            name: None,
            unique: false,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Explicit name, or `<table>_<field>_<field>...` when none was given.
    pub fn resolved_name(&self, table: &str) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => {
                let mut name = table.to_string();
                for field in &self.fields {
                    name.push('_');
                    name.push_str(field);
                }
                name
            }
        }
    }
}
