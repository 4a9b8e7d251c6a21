use inksac::prelude::*;

#[derive(Debug, Clone, Copy)]
pub struct SyntaxHighlighter {
    color_support: ColorSupport,
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxHighlighter {
    pub fn new() -> Self {
        let support = check_color_support().unwrap_or(ColorSupport::NoColor);
        Self {
            color_support: support,
        }
    }

    /// A highlighter that leaves all text alone.
    pub fn plain() -> Self {
        Self {
            color_support: ColorSupport::NoColor,
        }
    }

    fn enabled(&self) -> bool {
        !matches!(self.color_support, ColorSupport::NoColor)
    }

    /// Colours the command name, a `:table` override and `-flags`. Whitespace
    /// is preserved so the cursor stays where the editor expects it.
    pub fn highlight_command(&self, input: &str) -> String {
        if !self.enabled() || input.trim().is_empty() {
            return input.to_string();
        }

        let command_style = Style::builder().foreground(Color::Cyan).bold().build();
        let table_style = Style::builder().foreground(Color::Magenta).build();
        let flag_style = Style::builder().foreground(Color::Yellow).build();

        let mut highlighted = String::with_capacity(input.len() * 2);
        let mut first = true;
        let mut rest = input;
        while !rest.is_empty() {
            let ws_end = rest
                .find(|c: char| !c.is_whitespace())
                .unwrap_or(rest.len());
            highlighted.push_str(&rest[..ws_end]);
            rest = &rest[ws_end..];
            if rest.is_empty() {
                break;
            }

            let word_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let word = &rest[..word_end];
            let styled = if first {
                word.style(command_style).to_string()
            } else if word.starts_with(':') {
                word.style(table_style).to_string()
            } else if word.starts_with('-') {
                word.style(flag_style).to_string()
            } else {
                word.to_string()
            };
            highlighted.push_str(&styled);
            first = false;
            rest = &rest[word_end..];
        }
        highlighted
    }

    pub fn highlight_error(&self, error: &str) -> String {
        if !self.enabled() {
            return error.to_string();
        }

        let error_style = Style::builder().foreground(Color::Red).bold().build();
        error.style(error_style).to_string()
    }

    pub fn highlight_hint(&self, hint: &str) -> String {
        if !self.enabled() {
            return hint.to_string();
        }

        let hint_style = Style::builder()
            .foreground(Color::RGB(128, 128, 128))
            .build();
        hint.style(hint_style).to_string()
    }
}
