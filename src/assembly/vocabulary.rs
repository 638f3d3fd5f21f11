//! Registration method vocabulary.
//!
//! The extractor only recognizes method calls named in a
//! [`RegistrationVocabulary`]. The table is data passed in by the caller
//! (usually from `assemblygen.toml`), so projects wrapping the container with
//! their own registration helpers can teach the generator their names.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A method name recognized as a registration call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationMethod {
    /// Method name as written at the call site (e.g. `register_named`)
    pub method: String,
    /// The registration joins the multi-binding collection of its service type
    #[serde(default)]
    pub into_collection: bool,
    /// The trailing argument is the registration's name tag
    #[serde(default)]
    pub named: bool,
}

impl RegistrationMethod {
    pub fn new(method: impl Into<String>, into_collection: bool, named: bool) -> Self {
        RegistrationMethod {
            method: method.into(),
            into_collection,
            named,
        }
    }
}

/// Lookup table of registration methods keyed by method name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationVocabulary {
    methods: HashMap<String, RegistrationMethod>,
}

impl RegistrationVocabulary {
    pub fn new(methods: impl IntoIterator<Item = RegistrationMethod>) -> Self {
        RegistrationVocabulary {
            methods: methods
                .into_iter()
                .map(|m| (m.method.clone(), m))
                .collect(),
        }
    }

    pub fn get(&self, method: &str) -> Option<&RegistrationMethod> {
        self.methods.get(method)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl Default for RegistrationVocabulary {
    fn default() -> Self {
        RegistrationVocabulary::new(default_registration_methods())
    }
}

/// The registration API of the container contract
pub fn default_registration_methods() -> Vec<RegistrationMethod> {
    vec![
        RegistrationMethod::new("register", false, false),
        RegistrationMethod::new("autoregister", false, false),
        RegistrationMethod::new("register_into_collection", true, false),
        RegistrationMethod::new("autoregister_into_collection", true, false),
        RegistrationMethod::new("register_named", false, true),
        RegistrationMethod::new("autoregister_named", false, true),
    ]
}
