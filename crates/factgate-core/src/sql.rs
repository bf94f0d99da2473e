//! SQL rendering of assertions.
//!
//! Produces the warehouse query equivalent to an assertion, in the
//! "zero rows returned = pass" convention. The queries are for diagnosis;
//! this crate never executes them.

use crate::predicates::{PredicateSpec, UpperBound};
use crate::suite::Assertion;

/// Render `assertion` as a query over `location`.
pub fn compile_sql(assertion: &Assertion, location: &str) -> String {
    match &assertion.predicate {
        PredicateSpec::DateBounds(bounds) => {
            let upper = match bounds.upper_bound {
                UpperBound::CurrentDate => "current_date()".to_string(),
                UpperBound::Fixed(date) => format!("date('{}')", date.format("%Y-%m-%d")),
            };
            format!(
                "select *\nfrom {location}\nwhere date({column}) > {upper}\n   or date({column}) < date('{lower}')",
                location = location,
                column = bounds.column,
                upper = upper,
                lower = bounds.lower_bound.format("%Y-%m-%d"),
            )
        }
        PredicateSpec::NotNull(spec) => format!(
            "select *\nfrom {}\nwhere {} is null",
            location, spec.column
        ),
        PredicateSpec::Unique(spec) => format!(
            "select {column}, count(*) as n_records\nfrom {location}\nwhere {column} is not null\ngroup by {column}\nhaving count(*) > 1",
            column = spec.column,
            location = location,
        ),
    }
}
