/*!
 * Status reporting for export operations
 */

/// Receives human-readable progress messages while an export runs
///
/// Called synchronously from the walk; the export does not advance until
/// `report` returns.
pub trait StatusReporter {
    /// Called with one status line
    fn report(&self, message: &str);
}

// Implement StatusReporter for closures
impl<F> StatusReporter for F
where
    F: Fn(&str),
{
    fn report(&self, message: &str) {
        self(message)
    }
}
