//! Built-in genotype storage methods.

use crate::model::genotype::{GenotypeCall, GenotypeCallRow};
use crate::repo::chado_repo::{ExperimentLink, GenotypeStore, RepoResult};

/// Method id of the direct genotype-call layout.
pub const GENOTYPE_CALL_METHOD: &str = "genotype_call";
/// Method id of the experiment-based layout.
pub const ND_EXPERIMENT_METHOD: &str = "nd_experiment";
/// Method id of the stock-based layout.
pub const STOCK_METHOD: &str = "stock";

/// Writes one assembled genotype call.
pub trait GenotypeStorage {
    /// Stable registry id.
    fn method_id(&self) -> &str;

    /// Whether calls for this method carry the configured geolocation.
    fn uses_geolocation(&self) -> bool {
        false
    }

    fn store(&self, store: &dyn GenotypeStore, call: &GenotypeCall) -> RepoResult<()>;
}

/// One `genotype_call` row per (marker, sample) observation.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenotypeCallStorage;

impl GenotypeStorage for GenotypeCallStorage {
    fn method_id(&self) -> &str {
        GENOTYPE_CALL_METHOD
    }

    fn store(&self, store: &dyn GenotypeStore, call: &GenotypeCall) -> RepoResult<()> {
        let genotype_id = store.select_or_insert_genotype(&call.genotype_record())?;
        store.insert_genotype_call(&GenotypeCallRow {
            variant_id: call.variant_id,
            marker_id: call.marker_id,
            genotype_id,
            project_id: call.project_id,
            stock_id: call.stock_id,
        })?;
        Ok(())
    }
}

/// One experiment per call, linking genotype, stock and project.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExperimentStorage;

impl GenotypeStorage for ExperimentStorage {
    fn method_id(&self) -> &str {
        ND_EXPERIMENT_METHOD
    }

    fn uses_geolocation(&self) -> bool {
        true
    }

    fn store(&self, store: &dyn GenotypeStore, call: &GenotypeCall) -> RepoResult<()> {
        let genotype_id = store.select_or_insert_genotype(&call.genotype_record())?;
        let experiment_id = store.insert_experiment(call.nd_geolocation, call.experiment_type_id)?;
        for link in [
            ExperimentLink::Genotype(genotype_id),
            ExperimentLink::Stock(call.stock_id),
            ExperimentLink::Project(call.project_id),
        ] {
            store.link_experiment(experiment_id, link)?;
        }
        Ok(())
    }
}

/// Genotype attached directly to the sample's stock.
#[derive(Debug, Default, Clone, Copy)]
pub struct StockStorage;

impl GenotypeStorage for StockStorage {
    fn method_id(&self) -> &str {
        STOCK_METHOD
    }

    fn store(&self, store: &dyn GenotypeStore, call: &GenotypeCall) -> RepoResult<()> {
        let genotype_id = store.select_or_insert_genotype(&call.genotype_record())?;
        store.select_or_insert_stock_genotype(call.stock_id, genotype_id)?;
        Ok(())
    }
}
