//! Ordered submission of variant batches

use tracing::{info, warn};

use crate::api::{CatalogApi, FetchError};
use crate::models::NewVariant;

/// Outcome of a variant batch.
///
/// `submitted` pairs were accepted by the API before `failure` (if any)
/// stopped the batch. Accepted pairs are not rolled back.
#[derive(Debug)]
pub struct VariantBatchReport {
    pub total: usize,
    pub submitted: usize,
    pub failure: Option<(usize, FetchError)>,
}

impl VariantBatchReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Number of pairs that were never sent
    pub fn skipped(&self) -> usize {
        match self.failure {
            Some((index, _)) => self.total - index - 1,
            None => 0,
        }
    }
}

/// Send each variant in order, issuing request n+1 only after request n
/// succeeded. The first failure ends the batch.
pub async fn submit_variants(api: &dyn CatalogApi, variants: &[NewVariant]) -> VariantBatchReport {
    let mut report = VariantBatchReport {
        total: variants.len(),
        submitted: 0,
        failure: None,
    };

    for (index, variant) in variants.iter().enumerate() {
        match api.add_variant(variant).await {
            Ok(()) => {
                report.submitted += 1;
            }
            Err(e) => {
                warn!(
                    "Variant {}/{} (size {}) for product {} failed after {} accepted: {}",
                    index + 1,
                    variants.len(),
                    variant.size,
                    variant.product_id,
                    report.submitted,
                    e
                );
                report.failure = Some((index, e));
                return report;
            }
        }
    }

    info!("Submitted {} variants", report.submitted);
    report
}
