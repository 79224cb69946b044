//! Text-entry forms: the auth screens and the editing overlays

use super::content::ItemKind;

/// What a form submits to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormKind {
    Login,
    Register,
    ForgotPassword,
    ResetPassword { token: String },
    CreatePlaylist,
    EditPlaylist { playlist_id: String },
    Comment {
        kind: ItemKind,
        item_id: String,
        /// Comment being edited, `None` when posting a new one
        editing: Option<String>,
    },
    UploadSong { playlist_id: String },
}

impl FormKind {
    pub fn title(&self) -> &'static str {
        match self {
            FormKind::Login => "Log in",
            FormKind::Register => "Create account",
            FormKind::ForgotPassword => "Forgot password",
            FormKind::ResetPassword { .. } => "Reset password",
            FormKind::CreatePlaylist => "New playlist",
            FormKind::EditPlaylist { .. } => "Edit playlist",
            FormKind::Comment { editing: None, .. } => "Add comment",
            FormKind::Comment { editing: Some(_), .. } => "Edit comment",
            FormKind::UploadSong { .. } => "Upload song",
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            FormKind::Login
                | FormKind::Register
                | FormKind::ForgotPassword
                | FormKind::ResetPassword { .. }
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
    /// Rendered as bullets
    pub secret: bool,
    /// Toggled with space instead of typed into
    pub checkbox: bool,
}

impl FormField {
    fn text(label: &'static str) -> Self {
        Self { label, value: String::new(), secret: false, checkbox: false }
    }

    fn secret(label: &'static str) -> Self {
        Self { label, value: String::new(), secret: true, checkbox: false }
    }

    fn checkbox(label: &'static str, checked: bool) -> Self {
        Self {
            label,
            value: if checked { "yes".to_string() } else { String::new() },
            secret: false,
            checkbox: true,
        }
    }

    pub fn is_checked(&self) -> bool {
        !self.value.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Form {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub focused: usize,
    /// Inline error shown under the fields
    pub error: Option<String>,
    /// Inline success notice (e.g. "check your email")
    pub message: Option<String>,
    pub submitting: bool,
}

impl Form {
    pub fn new(kind: FormKind) -> Self {
        let fields = match &kind {
            FormKind::Login => vec![FormField::text("Email"), FormField::secret("Password")],
            FormKind::Register => vec![
                FormField::text("Name"),
                FormField::text("Email"),
                FormField::secret("Password"),
                FormField::secret("Confirm password"),
            ],
            FormKind::ForgotPassword => vec![FormField::text("Email")],
            FormKind::ResetPassword { .. } => vec![
                FormField::secret("New password"),
                FormField::secret("Confirm password"),
            ],
            FormKind::CreatePlaylist | FormKind::EditPlaylist { .. } => vec![
                FormField::text("Name"),
                FormField::text("Description"),
                FormField::checkbox("Public", true),
            ],
            FormKind::Comment { .. } => vec![FormField::text("Comment")],
            FormKind::UploadSong { .. } => vec![
                FormField::text("Audio file"),
                FormField::text("Image file"),
                FormField::text("Name"),
                FormField::text("Artist"),
                FormField::text("Genre"),
                FormField::text("Description"),
            ],
        };
        Self {
            kind,
            fields,
            focused: 0,
            error: None,
            message: None,
            submitting: false,
        }
    }

    /// Playlist edit form pre-filled with the current values
    pub fn edit_playlist(playlist_id: String, name: &str, description: &str, is_public: bool) -> Self {
        let mut form = Self::new(FormKind::EditPlaylist { playlist_id });
        form.fields[0].value = name.to_string();
        form.fields[1].value = description.to_string();
        form.fields[2] = FormField::checkbox("Public", is_public);
        form
    }

    pub fn edit_comment(kind: ItemKind, item_id: String, comment_id: String, content: &str) -> Self {
        let mut form = Self::new(FormKind::Comment {
            kind,
            item_id,
            editing: Some(comment_id),
        });
        form.fields[0].value = content.to_string();
        form
    }

    /// Value of the field labelled `label`, empty if the form has no such field
    pub fn value(&self, label: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.value.as_str())
            .unwrap_or("")
    }

    pub fn is_checked(&self, label: &str) -> bool {
        self.fields.iter().any(|f| f.label == label && f.is_checked())
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focused = (self.focused + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focused = (self.focused + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focused) {
            if field.checkbox {
                if c == ' ' {
                    field.value = if field.is_checked() { String::new() } else { "yes".to_string() };
                }
            } else {
                field.value.push(c);
            }
        }
        self.error = None;
    }

    pub fn pop_char(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focused)
            && !field.checkbox
        {
            field.value.pop();
        }
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
        self.message = None;
        self.submitting = false;
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
        self.error = None;
        self.submitting = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_goes_to_the_focused_field() {
        let mut form = Form::new(FormKind::Login);
        for c in "a@b.co".chars() {
            form.push_char(c);
        }
        form.focus_next();
        form.push_char('x');
        form.pop_char();
        form.push_char('y');
        assert_eq!(form.value("Email"), "a@b.co");
        assert_eq!(form.value("Password"), "y");
    }

    #[test]
    fn focus_wraps_both_ways() {
        let mut form = Form::new(FormKind::Register);
        form.focus_prev();
        assert_eq!(form.focused, 3);
        form.focus_next();
        assert_eq!(form.focused, 0);
    }

    #[test]
    fn checkbox_toggles_on_space_only() {
        let mut form = Form::new(FormKind::CreatePlaylist);
        form.focused = 2;
        assert!(form.is_checked("Public"));
        form.push_char('x');
        assert!(form.is_checked("Public"));
        form.push_char(' ');
        assert!(!form.is_checked("Public"));
        form.pop_char();
        assert!(!form.is_checked("Public"));
    }

    #[test]
    fn typing_clears_a_previous_error() {
        let mut form = Form::new(FormKind::ForgotPassword);
        form.set_error("Email is required");
        form.push_char('a');
        assert!(form.error.is_none());
    }
}
