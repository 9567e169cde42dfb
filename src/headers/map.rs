use super::iter::{GetAll, Iter};

/// HTTP Headers Multimap.
///
/// Fields keep their insertion order and the name as it was received, lookup is ASCII case
/// insensitive. A field may hold multiple values.
#[derive(Clone, Default)]
pub struct Headers {
    fields: Vec<Field>,
}

#[derive(Clone, Debug)]
pub(crate) struct Field {
    name: Box<str>,
    values: Vec<String>,
}

impl Field {
    #[inline]
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub(crate) fn values(&self) -> &[String] {
        &self.values
    }
}

impl Headers {
    /// Create new empty [`Headers`].
    ///
    /// This function does not allocate.
    #[inline]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Create new empty [`Headers`] with at least the specified capacity of distinct names.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { fields: Vec::with_capacity(capacity) }
    }

    /// Returns the number of distinct field names.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if headers has no element.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[inline]
    pub(crate) fn fields(&self) -> &[Field] {
        &self.fields
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|field| field.name.eq_ignore_ascii_case(name))
    }
}

// ===== Lookup =====

impl Headers {
    /// Returns `true` if the map contains a header value for given header name.
    #[inline]
    pub fn contains_key(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Returns the first header value of given header name.
    pub fn get(&self, name: &str) -> Option<&str> {
        let idx = self.position(name)?;
        self.fields[idx].values.first().map(String::as_str)
    }

    /// Returns every header value of given header name, in the order they were added.
    pub fn get_all(&self, name: &str) -> GetAll<'_> {
        GetAll::new(self.position(name).map(|idx| &self.fields[idx].values[..]))
    }

    /// Returns an iterator over every name and value pair.
    ///
    /// A name with multiple values is yielded once for each value.
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self)
    }
}

// ===== Mutation =====

impl Headers {
    /// Insert header value, replacing every existing value of the same name.
    ///
    /// Returns the first replaced value, if any. A replaced field keeps its position and
    /// original name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => {
                let old = std::mem::replace(&mut self.fields[idx].values, vec![value]);
                old.into_iter().next()
            }
            None => {
                self.fields.push(Field {
                    name: name.into_boxed_str(),
                    values: vec![value],
                });
                None
            }
        }
    }

    /// Append header value, keeping existing values of the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => self.fields[idx].values.push(value),
            None => self.fields.push(Field {
                name: name.into_boxed_str(),
                values: vec![value],
            }),
        }
    }

    /// Remove every value of given header name, returns the first removed value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let idx = self.position(name)?;
        self.fields.remove(idx).values.into_iter().next()
    }

    /// Clear the map, keeping the allocated memory.
    #[inline]
    pub fn clear(&mut self) {
        self.fields.clear();
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a str, &'a str);

    type IntoIter = Iter<'a>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl std::fmt::Debug for Headers {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
