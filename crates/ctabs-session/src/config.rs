#![forbid(unsafe_code)]

//! Terminal preferences and their factory defaults.
//!
//! [`SessionDefaults`] carries the values a fresh install starts with. The
//! shell-related fields feed [`SessionDefaults::shell_parameter`], which
//! builds the parameter for a new default terminal tab.

use crate::registry::ShellParameter;

/// Default terminal text size in pixels.
pub const DEFAULT_FONT_SIZE: u32 = 30;
/// Shell started when no executable is configured.
pub const DEFAULT_LOGIN_SHELL: &str = "bash";
/// Typeface name used until the user picks one.
pub const DEFAULT_FONT: &str = "SourceCodePro";

/// User-facing terminal preferences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDefaults {
    pub font_size: u32,
    pub enable_bell: bool,
    pub enable_vibrate: bool,
    pub enable_execve_wrapper: bool,
    pub enable_auto_completion: bool,
    pub enable_full_screen: bool,
    pub enable_auto_hide_toolbar: bool,
    pub enable_switch_next_tab: bool,
    pub enable_extra_keys: bool,
    pub enable_explicit_extra_keys_weight: bool,
    pub enable_back_button_as_escape: bool,
    pub enable_special_volume_keys: bool,
    pub enable_word_based_ime: bool,
    pub login_shell: String,
    /// Typed into every new shell; empty means none.
    pub initial_command: String,
    pub default_font: String,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            enable_bell: false,
            enable_vibrate: false,
            enable_execve_wrapper: true,
            enable_auto_completion: false,
            enable_full_screen: false,
            enable_auto_hide_toolbar: false,
            enable_switch_next_tab: false,
            enable_extra_keys: true,
            enable_explicit_extra_keys_weight: false,
            enable_back_button_as_escape: false,
            enable_special_volume_keys: false,
            enable_word_based_ime: false,
            login_shell: DEFAULT_LOGIN_SHELL.to_owned(),
            initial_command: String::new(),
            default_font: DEFAULT_FONT.to_owned(),
        }
    }
}

impl SessionDefaults {
    /// Parameter for a new terminal tab running the login shell.
    ///
    /// A blank login shell falls back to [`DEFAULT_LOGIN_SHELL`].
    #[must_use]
    pub fn shell_parameter(&self) -> ShellParameter {
        let shell = match self.login_shell.trim() {
            "" => DEFAULT_LOGIN_SHELL,
            shell => shell,
        };
        let parameter = ShellParameter::new().with_executable(shell);
        if self.initial_command.trim().is_empty() {
            parameter
        } else {
            parameter.with_initial_command(self.initial_command.clone())
        }
    }
}
