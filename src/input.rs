/// Single-line text field used by the sign-in forms, the search bar and the
/// add-task dialog. The cursor counts chars, not bytes.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    value: String,
    cursor: usize,
    pub masked: bool,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn masked() -> Self {
        TextInput {
            masked: true,
            ..Self::default()
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_index();
        self.value.insert(at, c);
        self.cursor += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index();
        self.value.remove(at);
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor < self.value.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn move_to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_to_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Text as it should be drawn; masked fields show one bullet per char
    pub fn display(&self) -> String {
        if self.masked {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(s: &str) -> TextInput {
        let mut input = TextInput::new();
        s.chars().for_each(|c| input.insert_char(c));
        input
    }

    #[test]
    fn test_insert_and_delete() {
        let mut input = typed("milk");
        assert_eq!(input.value(), "milk");
        assert_eq!(input.cursor(), 4);

        input.delete_char();
        assert_eq!(input.value(), "mil");

        input.move_to_start();
        input.delete_char();
        assert_eq!(input.value(), "mil");
    }

    #[test]
    fn test_insert_in_the_middle() {
        let mut input = typed("wlk");
        input.move_to_start();
        input.move_cursor_right();
        input.insert_char('a');
        assert_eq!(input.value(), "walk");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn test_multibyte_chars() {
        let mut input = typed("café");
        input.move_cursor_left();
        input.insert_char('x');
        assert_eq!(input.value(), "cafxé");
        input.move_to_end();
        input.delete_char();
        assert_eq!(input.value(), "cafx");
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut input = typed("ab");
        input.move_cursor_right();
        assert_eq!(input.cursor(), 2);
        input.move_to_start();
        input.move_cursor_left();
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn test_masked_display_and_clear() {
        let mut input = TextInput::masked();
        "pw1".chars().for_each(|c| input.insert_char(c));
        assert_eq!(input.display(), "•••");
        assert_eq!(input.value(), "pw1");

        input.clear();
        assert!(input.is_empty());
        assert_eq!(input.cursor(), 0);
    }
}
