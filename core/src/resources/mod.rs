//! The built-in resource registry.
//!
//! Each submodule declares one resource (its namespace or root method) and
//! a typed accessor on `ApiClient` that forwards to the generic dispatcher.
//! `registry()` is what `ApiClientBuilder` installs when no custom list is
//! supplied.

mod account;
mod auth;
mod check;

pub use account::AccountResource;
pub use auth::AuthResource;

use crate::error::Result;
use crate::namespace::Resource;

/// Account, auth and health-check, in binding order.
pub fn registry() -> Result<Vec<Resource>> {
    Ok(vec![
        account::namespace()?.into(),
        auth::namespace()?.into(),
        check::resource(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_names_are_unique() {
        let resources = registry().unwrap();
        let mut names: Vec<_> = resources.iter().map(Resource::name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names, vec!["account", "auth", "check"]);
    }
}
