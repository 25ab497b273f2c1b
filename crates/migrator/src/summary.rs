use std::fmt;

use serde::Serialize;

/// Per-entity outcome counters for one migration pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntitySummary {
    pub read: u64,
    pub success: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl fmt::Display for EntitySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "read {}, migrated {}, skipped {}, failed {}",
            self.read, self.success, self.skipped, self.failed
        )
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MigrationSummary {
    pub collections: EntitySummary,
    pub providers: EntitySummary,
    pub async_operations: EntitySummary,
    pub rules: EntitySummary,
    pub executions: EntitySummary,
}

impl MigrationSummary {
    pub fn totals(&self) -> EntitySummary {
        let mut totals = EntitySummary::default();
        for entity in [
            &self.collections,
            &self.providers,
            &self.async_operations,
            &self.rules,
            &self.executions,
        ] {
            totals.read += entity.read;
            totals.success += entity.success;
            totals.skipped += entity.skipped;
            totals.failed += entity.failed;
        }
        totals
    }
}

impl fmt::Display for MigrationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Catalog migration summary")?;
        writeln!(f, "  collections:      {}", self.collections)?;
        writeln!(f, "  providers:        {}", self.providers)?;
        writeln!(f, "  async operations: {}", self.async_operations)?;
        writeln!(f, "  rules:            {}", self.rules)?;
        writeln!(f, "  executions:       {}", self.executions)?;
        write!(f, "  total:            {}", self.totals())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_sum_across_entities() {
        let summary = MigrationSummary {
            collections: EntitySummary {
                read: 2,
                success: 1,
                skipped: 1,
                failed: 0,
            },
            rules: EntitySummary {
                read: 3,
                success: 1,
                skipped: 0,
                failed: 2,
            },
            ..Default::default()
        };
        let totals = summary.totals();
        assert_eq!(totals.read, 5);
        assert_eq!(totals.success, 2);
        assert_eq!(totals.skipped, 1);
        assert_eq!(totals.failed, 2);
    }
}
