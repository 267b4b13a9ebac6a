//! Toggling debug mode with a sequence of navigations.

#[derive(Clone, Debug, Default, PartialEq)]
/// Keeps the state of debug mode.
///
/// Debug mode is toggled by loading the units of a cheat code in order. What debug
/// mode enables is up to the host.
pub struct DebugController {
    code: Vec<String>,
    recent: Vec<String>,
    on: bool,
}

impl DebugController {
    pub fn new() -> Self {
        DebugController::default()
    }

    /// Set the sequence of units which toggles debug mode. An empty code disables
    /// the toggle.
    pub fn set_cheat(&mut self, code: &[&str]) {
        self.code = code.iter().map(|unit| unit.to_string()).collect();
        self.recent.clear();
    }

    pub fn get_cheat(&self) -> &[String] {
        &self.code
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Toggle debug mode, returning the new state.
    pub fn toggle(&mut self) -> bool {
        self.on = !self.on;
        self.on
    }

    /// Note that a unit was loaded. Returns whether this completed the cheat code,
    /// in which case debug mode was toggled.
    pub(crate) fn observe(&mut self, unit: &str) -> bool {
        if self.code.is_empty() {
            return false;
        }

        self.recent.push(unit.to_string());

        if self.recent.len() > self.code.len() {
            let excess = self.recent.len() - self.code.len();
            self.recent.drain(..excess);
        }

        if self.recent == self.code {
            self.toggle();
            true
        } else {
            false
        }
    }
}
