use crate::app::Mode;
use crate::status_manager::StatusManager;

#[derive(Debug, Clone)]
pub struct UIState {
    pub mode: Mode,
    pub status_manager: StatusManager,
    pub show_help: bool,
    /// Text typed into the filter line or the instance-name prompt.
    pub input_buffer: String,
    pub should_quit: bool,
}

impl UIState {
    pub fn new() -> Self {
        Self {
            mode: Mode::Normal,
            status_manager: StatusManager::new(),
            show_help: false,
            input_buffer: String::new(),
            should_quit: false,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        self.mode = if self.show_help {
            Mode::Help
        } else {
            Mode::Normal
        };
    }

    pub fn is_help_shown(&self) -> bool {
        self.show_help
    }

    pub fn hide_help(&mut self) {
        self.show_help = false;
        if matches!(self.mode, Mode::Help) {
            self.mode = Mode::Normal;
        }
    }

    pub fn enter_filter_mode(&mut self, current: &str) {
        self.mode = Mode::Filter;
        self.input_buffer = current.to_string();
    }

    pub fn enter_instance_prompt(&mut self, initial: &str) {
        self.mode = Mode::InstancePrompt;
        self.input_buffer = initial.to_string();
    }

    pub fn enter_normal_mode(&mut self) {
        self.mode = Mode::Normal;
        self.input_buffer.clear();
    }

    pub fn input_buffer(&self) -> &str {
        &self.input_buffer
    }

    pub fn push_input(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    pub fn pop_input(&mut self) {
        self.input_buffer.pop();
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn set_info_message(&mut self, message: String) {
        self.status_manager.set_info(message);
    }

    pub fn set_success_message(&mut self, message: String) {
        self.status_manager.set_success(message);
    }

    pub fn set_warning_message(&mut self, message: String) {
        self.status_manager.set_warning(message);
    }

    pub fn set_error_message(&mut self, message: String) {
        self.status_manager.set_error(message);
    }

    pub fn status_message(&self) -> &str {
        self.status_manager
            .current_message()
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }

    pub fn update_status(&mut self) {
        self.status_manager.update();
    }
}

impl Default for UIState {
    fn default() -> Self {
        Self::new()
    }
}
