//! Element Attributes
//!
//! Ordered attribute list. Insertion order is kept so serialized markup keeps
//! the attribute order of the template author.

/// Single attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Attribute collection of one element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    items: Vec<Attribute>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get attribute value (names are compared ASCII case-insensitively)
    pub fn get(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    /// Check if an attribute exists
    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Set attribute, replacing the value in place when it already exists.
    /// Returns the previous value.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Option<String> {
        let value = value.into();
        match self.items.iter_mut().find(|a| a.name.eq_ignore_ascii_case(name)) {
            Some(existing) => Some(std::mem::replace(&mut existing.value, value)),
            None => {
                self.items.push(Attribute::new(name, value));
                None
            }
        }
    }

    /// Remove attribute by name
    pub fn remove(&mut self, name: &str) -> Option<Attribute> {
        let index = self
            .items
            .iter()
            .position(|a| a.name.eq_ignore_ascii_case(name))?;
        Some(self.items.remove(index))
    }

    /// Iterate attributes in document order
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.items.iter()
    }
}

impl FromIterator<Attribute> for Attributes {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        let mut attrs = Attributes::new();
        for attr in iter {
            attrs.set(&attr.name, attr.value);
        }
        attrs
    }
}
