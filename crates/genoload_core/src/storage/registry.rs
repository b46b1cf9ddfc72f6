//! In-process storage method registry.

use crate::storage::methods::{ExperimentStorage, GenotypeCallStorage, GenotypeStorage, StockStorage};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Method registration/selection errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageRegistryError {
    InvalidMethodId(String),
    DuplicateMethodId(String),
    UnknownMethod {
        requested: String,
        available: Vec<String>,
    },
}

impl Display for StorageRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMethodId(value) => write!(f, "storage method id is invalid: {value}"),
            Self::DuplicateMethodId(value) => {
                write!(f, "storage method already registered: {value}")
            }
            Self::UnknownMethod {
                requested,
                available,
            } => write!(
                f,
                "unknown storage method `{requested}`; expected one of {}",
                available.join("|")
            ),
        }
    }
}

impl Error for StorageRegistryError {}

/// Storage method registry keyed by method id.
#[derive(Default)]
pub struct StorageRegistry {
    methods: BTreeMap<String, Arc<dyn GenotypeStorage>>,
}

impl StorageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the `genotype_call`, `nd_experiment` and `stock`
    /// methods.
    pub fn with_builtin_methods() -> Self {
        let builtins: [Arc<dyn GenotypeStorage>; 3] = [
            Arc::new(GenotypeCallStorage),
            Arc::new(ExperimentStorage),
            Arc::new(StockStorage),
        ];
        let methods = builtins
            .into_iter()
            .map(|method| (method.method_id().to_string(), method))
            .collect();
        Self { methods }
    }

    /// Registers one storage method.
    pub fn register(
        &mut self,
        method: Arc<dyn GenotypeStorage>,
    ) -> Result<(), StorageRegistryError> {
        let method_id = method.method_id().trim().to_string();
        if !is_valid_method_id(&method_id) {
            return Err(StorageRegistryError::InvalidMethodId(method_id));
        }
        if self.methods.contains_key(method_id.as_str()) {
            return Err(StorageRegistryError::DuplicateMethodId(method_id));
        }

        self.methods.insert(method_id, method);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Returns sorted method ids.
    pub fn method_ids(&self) -> Vec<String> {
        self.methods.keys().cloned().collect()
    }

    /// Returns the method registered under `method_id`.
    pub fn resolve(
        &self,
        method_id: &str,
    ) -> Result<Arc<dyn GenotypeStorage>, StorageRegistryError> {
        let normalized = method_id.trim();
        self.methods
            .get(normalized)
            .cloned()
            .ok_or_else(|| StorageRegistryError::UnknownMethod {
                requested: normalized.to_string(),
                available: self.method_ids(),
            })
    }
}

fn is_valid_method_id(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::{is_valid_method_id, StorageRegistry, StorageRegistryError};
    use crate::model::genotype::GenotypeCall;
    use crate::repo::chado_repo::{GenotypeStore, RepoResult};
    use crate::storage::methods::GenotypeStorage;
    use std::sync::Arc;

    struct NamedStorage(&'static str);

    impl GenotypeStorage for NamedStorage {
        fn method_id(&self) -> &str {
            self.0
        }

        fn store(&self, _store: &dyn GenotypeStore, _call: &GenotypeCall) -> RepoResult<()> {
            Ok(())
        }
    }

    #[test]
    fn builtin_registry_exposes_three_methods() {
        let registry = StorageRegistry::with_builtin_methods();
        assert_eq!(
            registry.method_ids(),
            vec!["genotype_call", "nd_experiment", "stock"]
        );
        assert!(registry.resolve("nd_experiment").unwrap().uses_geolocation());
        assert!(!registry.resolve(" stock ").unwrap().uses_geolocation());
    }

    #[test]
    fn builtin_ids_are_valid_and_block_reregistration() {
        let mut registry = StorageRegistry::with_builtin_methods();
        for method_id in registry.method_ids() {
            assert!(is_valid_method_id(&method_id), "{method_id}");
        }
        assert!(matches!(
            registry.register(Arc::new(NamedStorage("genotype_call"))),
            Err(StorageRegistryError::DuplicateMethodId(_))
        ));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn unknown_method_lists_available_ids() {
        let registry = StorageRegistry::with_builtin_methods();
        let err = registry
            .resolve("genotype_matrix")
            .err()
            .expect("unregistered id must fail");
        assert!(matches!(
            &err,
            StorageRegistryError::UnknownMethod { requested, available }
                if requested == "genotype_matrix" && available.len() == 3
        ));
        assert!(err.to_string().contains("genotype_call|nd_experiment|stock"));
    }

    #[test]
    fn new_method_registers_without_other_changes() {
        let mut registry = StorageRegistry::with_builtin_methods();
        registry
            .register(Arc::new(NamedStorage("genotype_matrix")))
            .expect("new method should register");
        assert_eq!(registry.len(), 4);
        assert_eq!(
            registry.resolve("genotype_matrix").unwrap().method_id(),
            "genotype_matrix"
        );
    }

    #[test]
    fn rejects_invalid_or_duplicate_method_id() {
        let mut registry = StorageRegistry::new();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.register(Arc::new(NamedStorage("Genotype Call"))),
            Err(StorageRegistryError::InvalidMethodId(_))
        ));
        assert!(matches!(
            registry.register(Arc::new(NamedStorage("   "))),
            Err(StorageRegistryError::InvalidMethodId(_))
        ));

        registry
            .register(Arc::new(NamedStorage("stock")))
            .expect("first registration should succeed");
        assert!(matches!(
            registry.register(Arc::new(NamedStorage("stock"))),
            Err(StorageRegistryError::DuplicateMethodId(_))
        ));
    }
}
