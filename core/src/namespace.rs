//! Namespaces group methods under a shared path prefix.

use std::collections::BTreeMap;

use crate::error::{ApiError, Result};
use crate::method::{Method, MethodSpec};

/// A named collection of methods sharing a path prefix.
#[derive(Debug, Clone)]
pub struct Namespace {
    name: String,
    prefix: String,
    methods: BTreeMap<String, Method>,
}

impl Namespace {
    /// Creates a namespace whose path prefix equals its name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::with_prefix(name.clone(), name)
    }

    pub fn with_prefix(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            methods: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Registers `spec` under `name`. The stored path is `prefix/spec.path`,
    /// computed once here.
    pub fn register_method(&mut self, name: impl Into<String>, spec: MethodSpec) -> Result<&Method> {
        let name = name.into();
        if self.methods.contains_key(&name) {
            return Err(ApiError::DuplicateMethod {
                namespace: self.name.clone(),
                method: name,
            });
        }
        let method = Method::with_prefix(spec, &self.prefix);
        Ok(self.methods.entry(name).or_insert(method))
    }

    /// Builder form of [`Namespace::register_method`].
    pub fn method(mut self, name: impl Into<String>, spec: MethodSpec) -> Result<Self> {
        self.register_method(name, spec)?;
        Ok(self)
    }

    pub fn lookup_method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    pub fn methods(&self) -> impl Iterator<Item = (&str, &Method)> {
        self.methods.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// An entry of the resource registry: either a namespace or a single method
/// bound directly at the client root.
#[derive(Debug, Clone)]
pub enum Resource {
    Namespace(Namespace),
    Method { name: String, method: Method },
}

impl Resource {
    pub fn method(name: impl Into<String>, spec: MethodSpec) -> Self {
        Self::Method {
            name: name.into(),
            method: Method::new(spec),
        }
    }

    /// Key under which the resource is bound on the client.
    pub fn name(&self) -> &str {
        match self {
            Self::Namespace(ns) => ns.name(),
            Self::Method { name, .. } => name,
        }
    }

    pub fn as_namespace(&self) -> Option<&Namespace> {
        match self {
            Self::Namespace(ns) => Some(ns),
            Self::Method { .. } => None,
        }
    }
}

impl From<Namespace> for Resource {
    fn from(ns: Namespace) -> Self {
        Self::Namespace(ns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    #[test]
    fn register_returns_prefixed_method() {
        let mut ns = Namespace::new("auth");
        let m = ns.register_method("check", MethodSpec::get("check")).unwrap();
        assert_eq!(m.path(), "auth/check");
        assert_eq!(m.verb(), HttpMethod::Get);
    }

    #[test]
    fn custom_prefix_differs_from_name() {
        let ns = Namespace::with_prefix("users", "v2/users")
            .method("get", MethodSpec::get(":id"))
            .unwrap();
        assert_eq!(ns.name(), "users");
        assert_eq!(ns.prefix(), "v2/users");
        assert_eq!(Namespace::new("auth").prefix(), "auth");
        assert_eq!(ns.lookup_method("get").unwrap().path(), "v2/users/:id");
    }

    #[test]
    fn lookup_of_unknown_method_is_none() {
        let ns = Namespace::new("auth");
        assert!(ns.lookup_method("check").is_none());
    }

    #[test]
    fn duplicate_method_name_is_rejected() {
        let mut ns = Namespace::new("account");
        ns.register_method("retrieve", MethodSpec::get("")).unwrap();
        let err = ns.register_method("retrieve", MethodSpec::get("me")).unwrap_err();
        assert!(matches!(err, ApiError::DuplicateMethod { .. }));
        assert_eq!(ns.lookup_method("retrieve").unwrap().path(), "account/");
    }

    #[test]
    fn resource_names() {
        let ns: Resource = Namespace::new("auth").into();
        assert_eq!(ns.name(), "auth");
        let root = Resource::method("check", MethodSpec::get("check"));
        assert_eq!(root.name(), "check");
        assert!(root.as_namespace().is_none());
    }
}
