use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::config::{LoanProgram, RateTable, ValidationRules};
use crate::errors::Result;

#[derive(Debug, Clone)]
pub struct ConfigStore {
    program: Arc<RwLock<Arc<LoanProgram>>>,
}

impl ConfigStore {
    /// create a store from a bound-checked program
    pub fn new(program: LoanProgram) -> Result<Self> {
        program.rates.validate()?;
        program.rules.validate()?;
        Ok(Self {
            program: Arc::new(RwLock::new(Arc::new(program))),
        })
    }

    /// consistent view of both tables for one calculation
    pub fn snapshot(&self) -> Arc<LoanProgram> {
        Arc::clone(&self.program.read())
    }

    pub fn rate_table(&self) -> RateTable {
        self.snapshot().rates.clone()
    }

    pub fn validation_rules(&self) -> ValidationRules {
        self.snapshot().rules.clone()
    }

    /// replace the whole rate table; rejected tables leave the current one in place
    pub fn replace_rate_table(&self, rates: RateTable) -> Result<()> {
        rates.validate()?;
        let mut guard = self.program.write();
        let next = LoanProgram {
            rates,
            rules: guard.rules.clone(),
        };
        *guard = Arc::new(next);
        info!(
            base_rate = %guard.rates.base_interest_rate,
            min_rate = %guard.rates.min_interest_rate,
            "rate table replaced"
        );
        Ok(())
    }

    /// replace the whole rule set; rejected rules leave the current set in place
    pub fn replace_validation_rules(&self, rules: ValidationRules) -> Result<()> {
        rules.validate()?;
        let mut guard = self.program.write();
        let next = LoanProgram {
            rates: guard.rates.clone(),
            rules,
        };
        *guard = Arc::new(next);
        info!(min_fico = guard.rules.min_fico, "validation rules replaced");
        Ok(())
    }

    /// replace both tables in one step
    pub fn replace_program(&self, program: LoanProgram) -> Result<()> {
        program.rates.validate()?;
        program.rules.validate()?;
        *self.program.write() = Arc::new(program);
        info!("loan program replaced");
        Ok(())
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self {
            program: Arc::new(RwLock::new(Arc::new(LoanProgram::default()))),
        }
    }
}
