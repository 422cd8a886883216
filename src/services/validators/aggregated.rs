use super::Validator;
use crate::adapters::archive::LogArchive;
use crate::domain::validation::{ValidationFailure, ValidationResult};
use crate::infra::error::TseResult;

/// Runs validators in insertion order and keeps every finding.
#[derive(Default)]
pub struct AggregatedValidator {
    validators: Vec<Box<dyn Validator>>,
}

impl AggregatedValidator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, validator: impl Validator + 'static) -> Self {
        self.add(Box::new(validator));
        self
    }

    pub fn add(&mut self, validator: Box<dyn Validator>) {
        self.validators.push(validator);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Names in run order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.validators.iter().map(|v| v.name())
    }

    pub fn validate_all(&self, archive: &dyn LogArchive) -> TseResult<ValidationResult> {
        let mut result = ValidationResult::new();
        for validator in &self.validators {
            let failures = validator.validate(archive)?;
            log::info!("{}: {} finding(s)", validator.name(), failures.len());
            result.record(validator.name(), failures);
        }
        Ok(result)
    }
}

impl Validator for AggregatedValidator {
    fn name(&self) -> &str {
        "AggregatedValidator"
    }

    fn validate(&self, archive: &dyn LogArchive) -> TseResult<Vec<ValidationFailure>> {
        Ok(self.validate_all(archive)?.into_failures())
    }
}
