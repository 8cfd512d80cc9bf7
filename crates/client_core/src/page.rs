use std::sync::Mutex;

/// The document hosting the actions: where navigation and alerts land.
pub trait Page: Send + Sync {
    fn navigate_to(&self, location: &str);
    fn reload(&self);
    fn alert(&self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    Navigated(String),
    Reloaded,
    Alerted(String),
}

/// Records every page effect in order.
#[derive(Default)]
pub struct RecordingPage {
    events: Mutex<Vec<PageEvent>>,
}

impl RecordingPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PageEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                PageEvent::Alerted(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: PageEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl Page for RecordingPage {
    fn navigate_to(&self, location: &str) {
        self.push(PageEvent::Navigated(location.to_string()));
    }

    fn reload(&self) {
        self.push(PageEvent::Reloaded);
    }

    fn alert(&self, message: &str) {
        self.push(PageEvent::Alerted(message.to_string()));
    }
}
