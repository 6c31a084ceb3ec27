use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub content: String,
    pub message_type: MessageType,
    pub created_at: Instant,
    pub auto_clear_duration: Option<Duration>,
}

impl StatusMessage {
    pub fn new(content: String, message_type: MessageType) -> Self {
        Self {
            content,
            message_type,
            created_at: Instant::now(),
            auto_clear_duration: Self::default_duration_for_type(message_type),
        }
    }

    pub fn with_duration(content: String, message_type: MessageType, duration: Duration) -> Self {
        Self {
            content,
            message_type,
            created_at: Instant::now(),
            auto_clear_duration: Some(duration),
        }
    }

    pub fn permanent(content: String, message_type: MessageType) -> Self {
        Self {
            content,
            message_type,
            created_at: Instant::now(),
            auto_clear_duration: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.auto_clear_duration
            .map(|duration| self.created_at.elapsed() > duration)
            .unwrap_or(false)
    }

    fn default_duration_for_type(message_type: MessageType) -> Option<Duration> {
        match message_type {
            MessageType::Info => Some(Duration::from_secs(3)),
            MessageType::Success => Some(Duration::from_secs(3)),
            MessageType::Warning => Some(Duration::from_secs(5)),
            MessageType::Error => Some(Duration::from_secs(7)),
        }
    }
}

/// Transient message plus the `key=value` context shown on the left of the
/// status bar (provider, entity kind, filter).
#[derive(Debug, Clone, Default)]
pub struct StatusManager {
    current_message: Option<StatusMessage>,
    provider: Option<String>,
    kind: Option<String>,
    filter: Option<String>,
}

impl StatusManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_info(&mut self, message: String) {
        self.current_message = Some(StatusMessage::new(message, MessageType::Info));
    }

    pub fn set_success(&mut self, message: String) {
        self.current_message = Some(StatusMessage::new(message, MessageType::Success));
    }

    pub fn set_warning(&mut self, message: String) {
        self.current_message = Some(StatusMessage::new(message, MessageType::Warning));
    }

    pub fn set_error(&mut self, message: String) {
        self.current_message = Some(StatusMessage::new(message, MessageType::Error));
    }

    pub fn set_permanent(&mut self, message: String, message_type: MessageType) {
        self.current_message = Some(StatusMessage::permanent(message, message_type));
    }

    pub fn set_provider(&mut self, provider: Option<String>) {
        self.provider = provider;
    }

    pub fn set_kind(&mut self, kind: Option<String>) {
        self.kind = kind;
    }

    pub fn set_filter(&mut self, filter: &str) {
        self.filter = if filter.is_empty() {
            None
        } else {
            Some(filter.to_string())
        };
    }

    pub fn clear(&mut self) {
        self.current_message = None;
    }

    pub fn update(&mut self) {
        if self
            .current_message
            .as_ref()
            .is_some_and(StatusMessage::is_expired)
        {
            self.current_message = None;
        }
    }

    pub fn current_message(&self) -> Option<&StatusMessage> {
        self.current_message.as_ref()
    }

    pub fn has_message(&self) -> bool {
        self.current_message.is_some()
    }

    /// `provider=aws | type=Resources | filter: "inst"`, or `Loading...`.
    pub fn context_line(&self) -> String {
        let mut parts = Vec::new();
        if let Some(provider) = &self.provider {
            parts.push(format!("provider={}", provider));
        }
        if let Some(kind) = &self.kind {
            parts.push(format!("type={}", kind));
        }
        if let Some(filter) = &self.filter {
            parts.push(format!("filter: \"{}\"", filter));
        }
        if parts.is_empty() {
            return String::from("Loading...");
        }
        parts.join(" | ")
    }
}
