use crate::error::ConfigurationError;
use crate::session::SessionDefinition;
use std::collections::HashMap;

/// Registry of session definitions keyed by code, in declaration order.
#[derive(Debug, Clone)]
pub struct Catalog {
    definitions: Vec<SessionDefinition>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new<I>(definitions: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = SessionDefinition>,
    {
        let mut catalog = Self {
            definitions: Vec::new(),
            index: HashMap::new(),
        };
        for definition in definitions {
            catalog.insert(definition)?;
        }
        Ok(catalog)
    }

    fn insert(&mut self, mut definition: SessionDefinition) -> Result<(), ConfigurationError> {
        validate_definition(&definition)?;
        definition.normalize_weekdays();
        if self.index.contains_key(&definition.code) {
            return Err(ConfigurationError::DuplicateSessionCode(definition.code));
        }
        self.index
            .insert(definition.code.clone(), self.definitions.len());
        self.definitions.push(definition);
        Ok(())
    }

    pub fn lookup(&self, code: &str) -> Result<&SessionDefinition, ConfigurationError> {
        self.get(code)
            .ok_or_else(|| ConfigurationError::UnknownSessionCode {
                code: code.to_string(),
                week: None,
            })
    }

    pub fn get(&self, code: &str) -> Option<&SessionDefinition> {
        self.index.get(code).map(|&idx| &self.definitions[idx])
    }

    pub fn contains(&self, code: &str) -> bool {
        self.index.contains_key(code)
    }

    /// Position of `code` in declaration order; used to break scheduling ties.
    pub fn declaration_index(&self, code: &str) -> Option<usize> {
        self.index.get(code).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SessionDefinition> {
        self.definitions.iter()
    }

    pub fn definitions(&self) -> &[SessionDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn validate_definition(definition: &SessionDefinition) -> Result<(), ConfigurationError> {
    let invalid = |reason: &str| ConfigurationError::InvalidSession {
        code: definition.code.clone(),
        reason: reason.to_string(),
    };

    if definition.code.trim().is_empty() {
        return Err(invalid("code must not be blank"));
    }
    if definition.code.contains(',') {
        return Err(invalid("code must not contain ','"));
    }
    if definition.display_name.trim().is_empty() {
        return Err(invalid("display name must not be blank"));
    }
    if definition.weekdays.is_empty() {
        return Err(invalid("at least one weekday is required"));
    }
    if definition.duration_minutes == 0 {
        return Err(invalid("duration must be positive"));
    }
    Ok(())
}
