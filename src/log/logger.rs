use crate::{
    error::Origin,
    log::{Event, LogMessage, MessageKind, Warning},
};

#[derive(Clone, Debug, Default)]
/// Record of what a session did and which problems it worked around.
///
/// Every message is also forwarded to the `log` facade, at `debug` level for events
/// and `warn` level for warnings, so a host can route them to its own logger.
pub struct Logger {
    /// Navigations and bookkeeping.
    pub events: Vec<LogMessage>,
    /// Non-fatal errors and incompatibilities.
    pub warnings: Vec<LogMessage>,
    sequence: u64,
}

impl Logger {
    pub(crate) fn add_event(&mut self, event: Event, origin: &Origin) {
        ::log::debug!("{} {}", origin, event);

        let message = LogMessage::with_kind(MessageKind::Event(event), origin, self.next());
        self.events.push(message);
    }

    pub(crate) fn add_warning(&mut self, warning: Warning, origin: &Origin) {
        ::log::warn!("{} {}", origin, warning);

        let message = LogMessage::with_kind(MessageKind::Warning(warning), origin, self.next());
        self.warnings.push(message);
    }

    fn next(&mut self) -> u64 {
        let sequence = self.sequence;
        self.sequence += 1;
        sequence
    }
}

impl Logger {
    /// Create an iterator over the log items.
    ///
    /// The iterator visits the messages in the order they were logged.
    pub fn iter(&self) -> LoggerIter {
        LoggerIter {
            events: self.events.iter().peekable(),
            warnings: self.warnings.iter().peekable(),
        }
    }

    /// Remove all messages.
    pub fn clear(&mut self) {
        self.events.clear();
        self.warnings.clear();
    }
}

pub struct LoggerIter<'a> {
    events: std::iter::Peekable<std::slice::Iter<'a, LogMessage>>,
    warnings: std::iter::Peekable<std::slice::Iter<'a, LogMessage>>,
}

impl<'a> Iterator for LoggerIter<'a> {
    type Item = &'a LogMessage;

    fn next(&mut self) -> Option<Self::Item> {
        match (self.events.peek(), self.warnings.peek()) {
            (Some(event), Some(warning)) => {
                if event.sequence < warning.sequence {
                    self.events.next()
                } else {
                    self.warnings.next()
                }
            }
            _ => self.events.next().or(self.warnings.next()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterating_through_log_yields_events_in_order() {
        let mut logger = Logger::default();

        logger.add_event(Event::Replaced, &Origin::unit("A"));
        logger.add_event(Event::Embedded { nobreak: false }, &Origin::unit("B"));
        logger.add_event(Event::Autosaved, &Origin::default());

        let logged_messages = logger.events.clone();
        let iter_messages = logger.iter().cloned().collect::<Vec<_>>();

        assert_eq!(iter_messages, logged_messages);
    }

    #[test]
    fn iterating_through_log_interleaves_events_and_warnings_by_sequence() {
        let mut logger = Logger::default();

        logger.add_warning(Warning::RandomPolicyWithoutRandom, &Origin::default());
        logger.add_event(Event::Replaced, &Origin::unit("A"));
        logger.add_event(Event::Autosaved, &Origin::default());
        logger.add_warning(
            Warning::HiddenActionTaken {
                label: "sneak".to_string(),
            },
            &Origin::unit("A"),
        );

        let events = logger.events.clone();
        let warnings = logger.warnings.clone();

        let mut iter = logger.iter().cloned();

        assert_eq!(iter.next().unwrap(), warnings[0]);
        assert_eq!(iter.next().unwrap(), events[0]);
        assert_eq!(iter.next().unwrap(), events[1]);
        assert_eq!(iter.next().unwrap(), warnings[1]);
        assert!(iter.next().is_none());
    }

    #[test]
    fn clearing_the_log_removes_all_messages() {
        let mut logger = Logger::default();

        logger.add_event(Event::Replaced, &Origin::default());
        logger.add_warning(Warning::RandomPolicyWithoutRandom, &Origin::default());
        logger.clear();

        assert!(logger.iter().next().is_none());
    }
}
