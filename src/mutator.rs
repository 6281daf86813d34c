//! Configuration mutators.
//!
//! Every step that rewrites a loaded bundle implements [`Mutator`]. Steps run
//! through [`apply`] so that failures carry the name of the step that raised
//! them.

use anyhow::Context;

use crate::bundle::Bundle;

/// A transformation of the in-memory bundle configuration.
pub trait Mutator {
    /// Short identifier used in logs and error context
    fn name(&self) -> &str;

    fn apply(&self, bundle: &mut Bundle) -> anyhow::Result<()>;
}

/// Run a single mutator against the bundle.
///
/// Any error aborts the current pass; tasks already rewritten by the mutator
/// are not rolled back.
pub fn apply(bundle: &mut Bundle, mutator: &dyn Mutator) -> anyhow::Result<()> {
    log::debug!("Applying mutator {}", mutator.name());
    mutator
        .apply(bundle)
        .with_context(|| format!("Mutator {} failed", mutator.name()))
}

/// Run mutators in order, stopping at the first failure.
pub fn apply_all(bundle: &mut Bundle, mutators: &[&dyn Mutator]) -> anyhow::Result<()> {
    for mutator in mutators {
        apply(bundle, *mutator)?;
    }
    Ok(())
}
