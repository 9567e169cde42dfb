use super::map::{Field, Headers};

/// Iterator over every name and value pair of [`Headers`].
#[derive(Debug)]
pub struct Iter<'a> {
    iter: std::slice::Iter<'a, Field>,
    current: Option<(&'a str, std::slice::Iter<'a, String>)>,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(map: &'a Headers) -> Self {
        let mut iter = map.fields().iter();
        Self {
            current: iter.next().map(|e| (e.name(), e.values().iter())),
            iter,
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((name, values)) = &mut self.current
                && let Some(value) = values.next()
            {
                return Some((*name, value.as_str()));
            }

            let field = self.iter.next()?;
            self.current = Some((field.name(), field.values().iter()));
        }
    }
}

/// Iterator over values of a single header name, see [`Headers::get_all`].
#[derive(Debug)]
pub struct GetAll<'a> {
    iter: std::slice::Iter<'a, String>,
}

impl<'a> GetAll<'a> {
    pub(crate) fn new(values: Option<&'a [String]>) -> Self {
        Self {
            iter: values.unwrap_or_default().iter(),
        }
    }
}

impl<'a> Iterator for GetAll<'a> {
    type Item = &'a str;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(String::as_str)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl ExactSizeIterator for GetAll<'_> {}
