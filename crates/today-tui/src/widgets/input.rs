#![forbid(unsafe_code)]

//! Single-line text input.
//!
//! Grapheme-cluster aware editing with placeholder text and password
//! masking. The cursor renders as a reverse-video cell when the field is
//! focused; long values scroll horizontally so the cursor stays in view.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use super::Widget;
use crate::geometry::Rect;
use crate::render::{Style, Surface};

/// A single-line text input.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    /// Text value.
    value: String,
    /// Cursor position (grapheme index).
    cursor: usize,
    /// Placeholder shown while the value is empty.
    placeholder: String,
    /// Mask character for password mode.
    mask: Option<char>,
    /// Whether the field currently has focus.
    focused: bool,
    /// Base style.
    style: Style,
    /// Placeholder style.
    placeholder_style: Style,
}

impl TextInput {
    /// Create a new empty input.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the placeholder text (builder).
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Enable password masking (builder).
    #[must_use]
    pub fn with_mask(mut self, mask: char) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Set the base style (builder).
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Set the placeholder style (builder).
    #[must_use]
    pub fn with_placeholder_style(mut self, style: Style) -> Self {
        self.placeholder_style = style;
        self
    }

    /// Current value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether the value is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Clear the value and reset the cursor.
    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Set or remove focus.
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Whether the field has focus.
    #[must_use]
    pub fn focused(&self) -> bool {
        self.focused
    }

    /// Cursor position as a grapheme index.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Apply a key event. Returns `true` if the value or cursor changed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                let changed = !self.value.is_empty() || self.cursor != 0;
                self.clear();
                changed
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.insert(ch);
                true
            }
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_cursor(self.cursor.saturating_sub(1)),
            KeyCode::Right => self.move_cursor(self.cursor + 1),
            KeyCode::Home => self.move_cursor(0),
            KeyCode::End => self.move_cursor(self.grapheme_count()),
            _ => false,
        }
    }

    fn grapheme_count(&self) -> usize {
        self.value.graphemes(true).count()
    }

    /// Byte offset of the grapheme at `index` (or the end of the value).
    fn byte_offset(&self, index: usize) -> usize {
        self.value
            .grapheme_indices(true)
            .nth(index)
            .map_or(self.value.len(), |(offset, _)| offset)
    }

    fn insert(&mut self, ch: char) {
        if ch.is_control() {
            return;
        }
        let at = self.byte_offset(self.cursor);
        self.value.insert(at, ch);
        self.cursor += 1;
    }

    fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let start = self.byte_offset(self.cursor - 1);
        let end = self.byte_offset(self.cursor);
        self.value.replace_range(start..end, "");
        self.cursor -= 1;
        true
    }

    fn delete(&mut self) -> bool {
        if self.cursor >= self.grapheme_count() {
            return false;
        }
        let start = self.byte_offset(self.cursor);
        let end = self.byte_offset(self.cursor + 1);
        self.value.replace_range(start..end, "");
        true
    }

    fn move_cursor(&mut self, to: usize) -> bool {
        let clamped = to.min(self.grapheme_count());
        let moved = clamped != self.cursor;
        self.cursor = clamped;
        moved
    }

    /// The string shown in the field: masked value or the raw value.
    fn display_value(&self) -> String {
        match self.mask {
            Some(mask) => mask.to_string().repeat(self.grapheme_count()),
            None => self.value.clone(),
        }
    }
}

impl Widget for TextInput {
    fn render(&self, area: Rect, surface: &mut Surface) {
        if area.is_empty() {
            return;
        }
        let width = usize::from(area.width);

        // Field background.
        surface.fill(area.x, area.y, area.width, ' ', self.style);

        if self.value.is_empty() && !self.focused {
            surface.text(area.x, area.y, &self.placeholder, self.placeholder_style);
            return;
        }

        // Keep the cursor inside the window: scroll left so the cursor is at
        // most on the last column. Display graphemes here are width 1
        // (masked) or whatever the value holds; a simple grapheme window is
        // enough for short form fields.
        let shown = self.display_value();
        let graphemes: Vec<&str> = shown.graphemes(true).collect();
        let window_start = (self.cursor + 1).saturating_sub(width);
        let mut col = area.x;
        for grapheme in graphemes.iter().skip(window_start) {
            let w = grapheme.width() as u16;
            if col + w > area.right() {
                break;
            }
            surface.text(col, area.y, grapheme, self.style);
            col += w.max(1);
        }

        if self.focused {
            let cursor_col = area.x
                + graphemes
                    .iter()
                    .skip(window_start)
                    .take(self.cursor - window_start)
                    .map(|g| g.width().max(1) as u16)
                    .sum::<u16>();
            if cursor_col < area.right() {
                let ch = surface
                    .get(cursor_col, area.y)
                    .map_or(' ', |cell| cell.ch);
                surface.set(cursor_col, area.y, ch, self.style.reverse());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(input: &mut TextInput, text: &str) {
        for ch in text.chars() {
            input.handle_key(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn typing_appends_at_cursor() {
        let mut input = TextInput::new();
        type_str(&mut input, "hello");
        assert_eq!(input.value(), "hello");
        assert_eq!(input.cursor(), 5);
    }

    #[test]
    fn insertion_in_the_middle() {
        let mut input = TextInput::new();
        type_str(&mut input, "hllo");
        input.handle_key(key(KeyCode::Home));
        input.handle_key(key(KeyCode::Right));
        input.handle_key(key(KeyCode::Char('e')));
        assert_eq!(input.value(), "hello");
    }

    #[test]
    fn backspace_removes_before_cursor() {
        let mut input = TextInput::new();
        type_str(&mut input, "abc");
        assert!(input.handle_key(key(KeyCode::Backspace)));
        assert_eq!(input.value(), "ab");
        input.handle_key(key(KeyCode::Home));
        assert!(!input.handle_key(key(KeyCode::Backspace)), "nothing before cursor");
    }

    #[test]
    fn delete_removes_at_cursor() {
        let mut input = TextInput::new();
        type_str(&mut input, "abc");
        input.handle_key(key(KeyCode::Home));
        assert!(input.handle_key(key(KeyCode::Delete)));
        assert_eq!(input.value(), "bc");
    }

    #[test]
    fn ctrl_u_clears() {
        let mut input = TextInput::new();
        type_str(&mut input, "secret");
        let clear = KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL);
        assert!(input.handle_key(clear));
        assert!(input.is_empty());
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn cursor_clamps_at_ends() {
        let mut input = TextInput::new();
        type_str(&mut input, "ab");
        assert!(!input.handle_key(key(KeyCode::Right)), "already at end");
        input.handle_key(key(KeyCode::Home));
        assert!(!input.handle_key(key(KeyCode::Left)), "already at start");
    }

    #[test]
    fn multibyte_graphemes_edit_cleanly() {
        let mut input = TextInput::new();
        type_str(&mut input, "héllo");
        assert_eq!(input.cursor(), 5);
        input.handle_key(key(KeyCode::Backspace));
        input.handle_key(key(KeyCode::Backspace));
        input.handle_key(key(KeyCode::Backspace));
        input.handle_key(key(KeyCode::Backspace));
        assert_eq!(input.value(), "h");
    }

    #[test]
    fn control_chars_are_ignored() {
        let mut input = TextInput::new();
        input.handle_key(key(KeyCode::Char('\u{1}')));
        assert!(input.is_empty());
    }

    #[test]
    fn mask_hides_value_in_render() {
        let mut input = TextInput::new().with_mask('*');
        type_str(&mut input, "pw");
        let mut surface = Surface::new(10, 1);
        input.render(Rect::from_size(10, 1), &mut surface);
        assert_eq!(surface.get(0, 0).map(|c| c.ch), Some('*'));
        assert_eq!(surface.get(1, 0).map(|c| c.ch), Some('*'));
        assert_eq!(surface.get(2, 0).map(|c| c.ch), Some(' '));
    }

    #[test]
    fn placeholder_shows_when_empty_and_unfocused() {
        let input = TextInput::new().with_placeholder("email");
        let mut surface = Surface::new(10, 1);
        input.render(Rect::from_size(10, 1), &mut surface);
        assert_eq!(surface.get(0, 0).map(|c| c.ch), Some('e'));
    }

    #[test]
    fn focused_field_renders_a_cursor() {
        let mut input = TextInput::new();
        input.set_focused(true);
        type_str(&mut input, "ab");
        let mut surface = Surface::new(10, 1);
        input.render(Rect::from_size(10, 1), &mut surface);
        let cursor_cell = surface.get(2, 0).expect("in bounds");
        assert!(cursor_cell.style.reverse, "cursor cell should be reversed");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        /// A random edit script: characters to type plus interleaved motions.
        fn edit_strategy() -> impl Strategy<Value = Vec<KeyCode>> {
            prop::collection::vec(
                prop_oneof![
                    prop::char::range('a', 'z').prop_map(KeyCode::Char),
                    Just(KeyCode::Backspace),
                    Just(KeyCode::Delete),
                    Just(KeyCode::Left),
                    Just(KeyCode::Right),
                    Just(KeyCode::Home),
                    Just(KeyCode::End),
                ],
                0..200,
            )
        }

        proptest! {
            #[test]
            fn random_edits_keep_cursor_in_bounds(script in edit_strategy()) {
                let mut input = TextInput::new();
                for code in script {
                    input.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
                    prop_assert!(input.cursor() <= input.value().chars().count());
                }
            }

            #[test]
            fn random_edits_render_without_panicking(script in edit_strategy()) {
                let mut input = TextInput::new();
                input.set_focused(true);
                for code in script {
                    input.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
                }
                let mut surface = Surface::new(8, 1);
                input.render(Rect::from_size(8, 1), &mut surface);
            }
        }
    }

    #[test]
    fn long_values_scroll_to_keep_cursor_visible() {
        let mut input = TextInput::new();
        input.set_focused(true);
        type_str(&mut input, "abcdefghij");
        let mut surface = Surface::new(4, 1);
        input.render(Rect::from_size(4, 1), &mut surface);
        // Window ends at the cursor: last 3 chars plus the cursor cell.
        assert_eq!(surface.get(0, 0).map(|c| c.ch), Some('h'));
        assert_eq!(surface.get(1, 0).map(|c| c.ch), Some('i'));
        assert_eq!(surface.get(2, 0).map(|c| c.ch), Some('j'));
        assert!(surface.get(3, 0).expect("in bounds").style.reverse);
    }
}
