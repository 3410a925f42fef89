use std::fmt;

use serde::Serialize;

use super::domain::ObservationRecord;
use super::workflow::DraftPage;

/// A constraint a record must satisfy before it may be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Violation {
    MissingBreak,
    NoPositiveSwellSize,
    InvalidWindBearing,
    MissingComments,
}

impl Violation {
    pub fn message(self) -> &'static str {
        match self {
            Violation::MissingBreak => "Break must not be empty",
            Violation::NoPositiveSwellSize => {
                "Surfline or Seabreeze swell size must be greater than zero"
            }
            Violation::InvalidWindBearing => "Wind Bearing must be one of the 16 compass directions",
            Violation::MissingComments => "Enter at least one comment (Swell/Wind/Tide)",
        }
    }

    /// The page of the creation workflow on which the violated field is entered.
    pub fn page(self) -> DraftPage {
        match self {
            Violation::MissingBreak => DraftPage::Session,
            Violation::NoPositiveSwellSize => DraftPage::Swell,
            Violation::InvalidWindBearing => DraftPage::Wind,
            Violation::MissingComments => DraftPage::Tide,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of validating a record. Violations are data, never errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn contains(&self, violation: Violation) -> bool {
        self.violations.contains(&violation)
    }

    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }

    fn check(&mut self, holds: bool, violation: Violation) {
        if !holds {
            self.violations.push(violation);
        }
    }
}

/// Checks every persistence invariant and reports all failures at once.
pub fn validate_for_submission(record: &ObservationRecord) -> ValidationReport {
    let mut report = ValidationReport::default();
    report.check(!record.break_name.trim().is_empty(), Violation::MissingBreak);
    report.check(record.swell.has_positive_size(), Violation::NoPositiveSwellSize);
    report.check(record.wind.bearing.is_some(), Violation::InvalidWindBearing);
    report.check(record.has_any_comment(), Violation::MissingComments);
    report
}

/// Checks only the fields entered on `page`, gating forward navigation.
pub fn validate_page(record: &ObservationRecord, page: DraftPage) -> ValidationReport {
    let mut report = validate_for_submission(record);
    report
        .violations
        .retain(|violation| violation.page() == page && *violation != Violation::MissingComments);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observations::domain::CompassBearing;

    fn valid_record() -> ObservationRecord {
        let mut record = ObservationRecord {
            break_name: "Strickland".to_string(),
            ..ObservationRecord::default()
        };
        record.swell.primary_size_m = Some(1.2);
        record.wind.bearing = Some(CompassBearing::NE);
        record.swell.comments = "long period groundswell".to_string();
        record
    }

    #[test]
    fn valid_record_has_no_violations() {
        assert!(validate_for_submission(&valid_record()).is_valid());
    }

    #[test]
    fn blank_break_is_always_flagged() {
        let mut record = valid_record();
        record.break_name = "   ".to_string();
        let report = validate_for_submission(&record);
        assert!(report.contains(Violation::MissingBreak));
    }

    #[test]
    fn zero_swell_sizes_are_flagged() {
        let mut record = valid_record();
        record.swell.primary_size_m = Some(0.0);
        record.swell.secondary_size_m = Some(0.0);
        let report = validate_for_submission(&record);
        assert!(report.contains(Violation::NoPositiveSwellSize));
    }

    #[test]
    fn missing_comments_alone_yield_exactly_one_violation() {
        let mut record = valid_record();
        record.swell.comments.clear();
        let report = validate_for_submission(&record);
        assert_eq!(report.violations, vec![Violation::MissingComments]);
    }

    #[test]
    fn empty_record_reports_every_violation() {
        let report = validate_for_submission(&ObservationRecord::default());
        assert_eq!(report.violations.len(), 4);
        assert_eq!(report.messages().len(), 4);
        assert_eq!(report.messages()[0], "Break must not be empty");
        assert_eq!(
            Violation::MissingComments.to_string(),
            Violation::MissingComments.message()
        );
    }

    #[test]
    fn page_validation_only_checks_that_page() {
        let record = ObservationRecord::default();
        assert_eq!(
            validate_page(&record, DraftPage::Session).violations,
            vec![Violation::MissingBreak]
        );
        assert_eq!(
            validate_page(&record, DraftPage::Swell).violations,
            vec![Violation::NoPositiveSwellSize]
        );
        assert_eq!(
            validate_page(&record, DraftPage::Wind).violations,
            vec![Violation::InvalidWindBearing]
        );
        assert!(validate_page(&record, DraftPage::Tide).is_valid());
    }
}
