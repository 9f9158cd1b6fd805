//! Predicate validators with aggregated failure reporting.
//!
//! Validators are `(predicate, error-text)` pairs evaluated in order.
//! Evaluation never short-circuits: every failing predicate contributes
//! to a single bulleted report, so the user sees all problems with an
//! input at once.

/// One `(predicate, error-text)` pair over values of type `T`.
pub struct Validator<T: ?Sized> {
    check: Box<dyn Fn(&T) -> bool + Send + Sync>,
    message: String,
}

impl<T: ?Sized> Validator<T> {
    /// Creates a validator from a predicate and the error text reported
    /// when the predicate returns `false`.
    pub fn new(
        message: impl Into<String>,
        check: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            check: Box::new(check),
            message: message.into(),
        }
    }

    /// Runs the predicate.
    #[must_use]
    pub fn passes(&self, value: &T) -> bool {
        (self.check)(value)
    }

    /// The error text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl<T: ?Sized> std::fmt::Debug for Validator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Runs every validator against `value` and collects the error texts of
/// all that failed, in declaration order.
pub fn failures<'a, T: ?Sized>(validators: &'a [Validator<T>], value: &T) -> Vec<&'a str> {
    validators
        .iter()
        .filter(|v| !v.passes(value))
        .map(Validator::message)
        .collect()
}

/// Formats failure messages as the bulleted list shown to the user.
#[must_use]
pub fn report(failures: &[&str]) -> String {
    failures
        .iter()
        .map(|f| format!("- {f}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_failures_are_collected_in_order() {
        let validators = vec![
            Validator::<str>::new("must not be empty", |s| !s.is_empty()),
            Validator::<str>::new("must be short", |s| s.len() <= 3),
            Validator::<str>::new("must be lowercase", |s| {
                s.chars().all(char::is_lowercase)
            }),
        ];

        let collected = failures(&validators, "LONGINPUT");
        assert_eq!(collected, vec!["must be short", "must be lowercase"]);
    }

    #[test]
    fn passing_value_collects_nothing() {
        let validators = vec![Validator::<str>::new("must not be empty", |s| !s.is_empty())];
        assert!(failures(&validators, "ok").is_empty());
    }

    #[test]
    fn report_renders_a_bulleted_list() {
        assert_eq!(report(&["a", "b"]), "- a\n- b");
    }
}
