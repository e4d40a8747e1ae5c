use std::fmt;

/// A qualified name: a namespace URI (possibly empty) paired with a local
/// name. Equality is structural; an empty namespace and empty local name
/// together denote "unset".
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    pub namespace_uri: String,
    pub local_name: String,
}

impl QName {
    pub fn new(namespace_uri: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace_uri: namespace_uri.into(),
            local_name: local_name.into(),
        }
    }

    pub fn unqualified(local_name: impl Into<String>) -> Self {
        Self {
            namespace_uri: String::new(),
            local_name: local_name.into(),
        }
    }

    pub fn is_unset(&self) -> bool {
        self.namespace_uri.is_empty() && self.local_name.is_empty()
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace_uri.is_empty() {
            write!(f, "{}", self.local_name)
        } else {
            write!(f, "{{{}}}{}", self.namespace_uri, self.local_name)
        }
    }
}

pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_is_empty_empty() {
        assert!(QName::default().is_unset());
        assert!(!QName::unqualified("foo").is_unset());
    }

    #[test]
    fn display_qualifies_with_braces() {
        assert_eq!(QName::new("urn:ns", "Foo").to_string(), "{urn:ns}Foo");
        assert_eq!(QName::unqualified("Foo").to_string(), "Foo");
    }
}
