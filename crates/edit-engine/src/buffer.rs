//! Editable text buffer with change notifications.
//!
//! [`Buffer`] wraps a [`Rope`] and adds everything a view needs on top of raw storage:
//! offset ↔ (row, column) conversion, line/word/grapheme boundary queries, search, a change
//! counter, and an ordered list of change callbacks.
//!
//! Every effective mutation notifies subscribers synchronously, in registration order, with a
//! `(position, delta)` pair:
//!
//! - an insertion of `n` codepoints at `p` reports `(p, +n)`;
//! - an erasure of `n` codepoints starting at `p` reports `(p + n, -n)`, i.e. the *end* of the
//!   removed span.
//!
//! Out-of-range positions are clamped; none of the queries fail.

use std::fmt;

use unicode_segmentation::UnicodeSegmentation;

use crate::config::{BufferConfig, ConfigError};
use crate::region::Region;
use crate::rope::Rope;
use crate::search::{self, SearchError, SearchOptions};

/// Callback invoked after every effective mutation with `(position, delta)`.
pub type ChangeCallback = Box<dyn FnMut(usize, isize)>;

/// Handle returned by [`Buffer::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Separator,
    Space,
}

/// A rope-backed text buffer.
pub struct Buffer {
    rope: Rope,
    word_separators: String,
    change_count: u64,
    callbacks: Vec<(SubscriptionId, ChangeCallback)>,
    next_subscription: u64,
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buffer {
    /// Create an empty buffer with the default configuration.
    pub fn new() -> Self {
        Self::from_parts(Rope::default(), BufferConfig::default().word_separators)
    }

    /// Create an empty buffer tuned by `config`.
    pub fn with_config(config: BufferConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_parts(
            Rope::with_config(&config),
            config.word_separators,
        ))
    }

    /// Create a buffer holding `text` with the default configuration.
    ///
    /// No notification is fired: there are no subscribers yet.
    pub fn from_text(text: &str) -> Self {
        let mut buffer = Self::new();
        buffer.rope.insert(0, text);
        buffer
    }

    fn from_parts(rope: Rope, word_separators: String) -> Self {
        Self {
            rope,
            word_separators,
            change_count: 0,
            callbacks: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Length in codepoints.
    pub fn size(&self) -> usize {
        self.rope.len()
    }

    /// `true` if the buffer holds no text.
    pub fn is_empty(&self) -> bool {
        self.rope.is_empty()
    }

    /// Read-only access to the underlying rope.
    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Number of effective mutations since creation.
    pub fn change_count(&self) -> u64 {
        self.change_count
    }

    /// Text covered by `region`, clipped to the buffer.
    pub fn substr(&self, region: Region) -> String {
        self.rope.slice(region.begin(), region.end())
    }

    /// Codepoint at `point`, or `None` past the end.
    pub fn char_at(&self, point: usize) -> Option<char> {
        self.rope.char_at(point)
    }

    /// Insert `value` at `point` (clamped). Returns the number of codepoints inserted.
    ///
    /// An empty `value` is a no-op and notifies nobody.
    pub fn insert(&mut self, point: usize, value: &str) -> usize {
        let point = point.min(self.size());
        let count = self.rope.insert(point, value);
        if count > 0 {
            self.change_count += 1;
            self.notify(point, count as isize);
        }
        count
    }

    /// Erase up to `length` codepoints starting at `point`. Returns the number actually removed.
    ///
    /// The span is clipped to the buffer; an empty span is a no-op and notifies nobody.
    pub fn erase(&mut self, point: usize, length: usize) -> usize {
        let point = point.min(self.size());
        let removed = self.rope.erase(point, length);
        if removed > 0 {
            self.change_count += 1;
            self.notify(point + removed, -(removed as isize));
        }
        removed
    }

    /// Register a change callback. Callbacks run in registration order.
    pub fn subscribe(&mut self, callback: impl FnMut(usize, isize) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback. Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(registered, _)| *registered != id);
        self.callbacks.len() != before
    }

    /// Number of registered callbacks.
    pub fn subscriber_count(&self) -> usize {
        self.callbacks.len()
    }

    fn notify(&mut self, position: usize, delta: isize) {
        for (_, callback) in &mut self.callbacks {
            callback(position, delta);
        }
    }

    /// Number of lines; an empty buffer has one line and `N` newlines make `N + 1` lines.
    pub fn line_count(&self) -> usize {
        self.rope.chars().filter(|&ch| ch == '\n').count() + 1
    }

    /// Convert an offset into a zero-based `(row, column)` pair. `point` is clamped.
    pub fn row_col(&self, point: usize) -> (usize, usize) {
        let point = point.min(self.size());
        let mut row = 0;
        let mut line_start = 0;
        for (i, ch) in self.rope.chars().take(point).enumerate() {
            if ch == '\n' {
                row += 1;
                line_start = i + 1;
            }
        }
        (row, point - line_start)
    }

    /// Convert a `(row, column)` pair into an offset.
    ///
    /// Inside the buffer the result is clamped to [`size`](Self::size); a column past the end of
    /// its line runs on into the following lines. For a row beyond the last line the result is
    /// `size + col`.
    pub fn text_point(&self, row: usize, col: usize) -> usize {
        let size = self.size();
        if row == 0 {
            return col.min(size);
        }
        let line_start = self
            .rope
            .chars()
            .enumerate()
            .filter(|&(_, ch)| ch == '\n')
            .nth(row - 1)
            .map(|(i, _)| i + 1);
        match line_start {
            Some(start) => start.saturating_add(col).min(size),
            None => size.saturating_add(col),
        }
    }

    /// The line containing `offset`, without its terminator.
    pub fn line(&self, offset: usize) -> Region {
        let size = self.size();
        if offset >= size {
            return Region::point(size);
        }
        let mut begin = offset;
        while begin > 0 && self.char_at(begin - 1) != Some('\n') {
            begin -= 1;
        }
        let mut end = offset;
        while end < size && self.char_at(end) != Some('\n') {
            end += 1;
        }
        Region::new(begin, end)
    }

    /// Span from the start of `region`'s first line to the end of its last line.
    pub fn lines(&self, region: Region) -> Region {
        Region::new(
            self.line(region.begin()).begin(),
            self.line(region.end()).end(),
        )
    }

    /// The line containing `offset`, including its terminator if it has one.
    pub fn full_line(&self, offset: usize) -> Region {
        let line = self.line(offset);
        if line.end() < self.size() {
            Region::new(line.begin(), line.end() + 1)
        } else {
            line
        }
    }

    /// Span from the start of `region`'s first line to the terminator of its last line.
    pub fn full_lines(&self, region: Region) -> Region {
        Region::new(
            self.full_line(region.begin()).begin(),
            self.full_line(region.end()).end(),
        )
    }

    fn classify(&self, ch: char) -> CharClass {
        if ch.is_whitespace() {
            CharClass::Space
        } else if self.word_separators.contains(ch) {
            CharClass::Separator
        } else {
            CharClass::Word
        }
    }

    /// The word touching `offset`.
    ///
    /// Word characters take priority over separator runs; the character at `offset` wins over
    /// the one before it. When `offset` touches neither, an empty region at `offset` is returned.
    /// Words never span lines.
    pub fn word(&self, offset: usize) -> Region {
        let offset = offset.min(self.size());
        let line = self.line(offset);
        let class_of = |p: usize| self.char_at(p).map(|ch| self.classify(ch));
        let at = (offset < line.end()).then(|| class_of(offset)).flatten();
        let before = (offset > line.begin())
            .then(|| class_of(offset - 1))
            .flatten();

        let (anchor, class) = if at == Some(CharClass::Word) {
            (offset, CharClass::Word)
        } else if before == Some(CharClass::Word) {
            (offset - 1, CharClass::Word)
        } else if at == Some(CharClass::Separator) {
            (offset, CharClass::Separator)
        } else if before == Some(CharClass::Separator) {
            (offset - 1, CharClass::Separator)
        } else {
            return Region::point(offset);
        };

        let mut begin = anchor;
        while begin > line.begin() && class_of(begin - 1) == Some(class) {
            begin -= 1;
        }
        let mut end = anchor + 1;
        while end < line.end() && class_of(end) == Some(class) {
            end += 1;
        }
        Region::new(begin, end)
    }

    /// Span from the start of the word at `region`'s begin to the end of the word at its end.
    pub fn words(&self, region: Region) -> Region {
        Region::new(
            self.word(region.begin()).begin(),
            self.word(region.end()).end(),
        )
    }

    /// Absolute offsets of every grapheme cluster start in the lines around `point`, plus the
    /// window end.
    fn grapheme_starts(&self, point: usize) -> Vec<usize> {
        let begin = self.line(point).begin();
        // One codepoint past the terminator keeps a trailing "\r\n" pair inside the window.
        let end = (self.full_line(point).end() + 1).min(self.size());
        let text = self.rope.slice(begin, end);

        let mut starts = Vec::new();
        let mut chars = 0;
        let mut last_byte = 0;
        for (byte, _) in text.grapheme_indices(true) {
            chars += text[last_byte..byte].chars().count();
            last_byte = byte;
            starts.push(begin + chars);
        }
        starts.push(end);
        starts
    }

    /// The first grapheme cluster boundary after `offset`.
    pub fn next_grapheme_boundary(&self, offset: usize) -> usize {
        let size = self.size();
        if offset >= size {
            return size;
        }
        self.grapheme_starts(offset)
            .into_iter()
            .find(|&start| start > offset)
            .unwrap_or(size)
    }

    /// The last grapheme cluster boundary before `offset`.
    pub fn prev_grapheme_boundary(&self, offset: usize) -> usize {
        let offset = offset.min(self.size());
        if offset == 0 {
            return 0;
        }
        self.grapheme_starts(offset - 1)
            .into_iter()
            .take_while(|&start| start < offset)
            .last()
            .unwrap_or(offset - 1)
    }

    /// Every occurrence of `query`, as forward regions in buffer order.
    pub fn find_all(&self, query: &str, options: SearchOptions) -> Result<Vec<Region>, SearchError> {
        search::find_all(&self.to_string(), query, options)
    }

    /// The first occurrence of `query` at or after `from`.
    pub fn find_next(
        &self,
        query: &str,
        options: SearchOptions,
        from: usize,
    ) -> Result<Option<Region>, SearchError> {
        search::find_next(&self.to_string(), query, options, from)
    }

    /// The last occurrence of `query` ending at or before `before`.
    pub fn find_prev(
        &self,
        query: &str,
        options: SearchOptions,
        before: usize,
    ) -> Result<Option<Region>, SearchError> {
        search::find_prev(&self.to_string(), query, options, before)
    }
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.rope, f)
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("size", &self.size())
            .field("change_count", &self.change_count)
            .field("subscribers", &self.callbacks.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_insert_notifies_in_order() {
        let mut buffer = Buffer::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second"] {
            let log = Rc::clone(&log);
            buffer.subscribe(move |pos, delta| log.borrow_mut().push((tag, pos, delta)));
        }

        assert_eq!(buffer.insert(0, "héllo"), 5);
        assert_eq!(
            *log.borrow(),
            vec![("first", 0, 5), ("second", 0, 5)]
        );
    }

    #[test]
    fn test_erase_notifies_end_of_span() {
        let mut buffer = Buffer::from_text("hello world");
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        buffer.subscribe(move |pos, delta| sink.borrow_mut().push((pos, delta)));

        assert_eq!(buffer.erase(2, 3), 3);
        assert_eq!(buffer.to_string(), "he world");
        assert_eq!(*log.borrow(), vec![(5, -3)]);
    }

    #[test]
    fn test_noops_do_not_notify_or_count() {
        let mut buffer = Buffer::from_text("abc");
        let calls = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&calls);
        buffer.subscribe(move |_, _| *sink.borrow_mut() += 1);

        assert_eq!(buffer.insert(1, ""), 0);
        assert_eq!(buffer.erase(1, 0), 0);
        assert_eq!(buffer.erase(10, 5), 0);
        assert_eq!(*calls.borrow(), 0);
        assert_eq!(buffer.change_count(), 0);
    }

    #[test]
    fn test_erase_clips_span() {
        let mut buffer = Buffer::from_text("abcdef");
        assert_eq!(buffer.erase(4, 100), 2);
        assert_eq!(buffer.to_string(), "abcd");
        assert_eq!(buffer.change_count(), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let mut buffer = Buffer::new();
        let id = buffer.subscribe(|_, _| {});
        assert_eq!(buffer.subscriber_count(), 1);
        assert!(buffer.unsubscribe(id));
        assert!(!buffer.unsubscribe(id));
        assert_eq!(buffer.subscriber_count(), 0);
    }

    #[test]
    fn test_with_config_validates() {
        let config = BufferConfig::new().with_merge_threshold(1);
        assert_eq!(
            Buffer::with_config(config).unwrap_err(),
            ConfigError::MergeThresholdTooSmall(1)
        );
        let buffer = Buffer::with_config(BufferConfig::new().with_merge_threshold(8)).unwrap();
        assert_eq!(buffer.rope().merge_threshold(), 8);
    }

    #[test]
    fn test_row_col_and_text_point() {
        let buffer = Buffer::from_text("Hello World!\nTest123123\nAbrakadabra\nabc");
        assert_eq!(buffer.row_col(0), (0, 0));
        assert_eq!(buffer.row_col(13), (1, 0));
        assert_eq!(buffer.row_col(buffer.size()), (3, 3));
        assert_eq!(buffer.row_col(buffer.size() + 10), (3, 3));
        assert_eq!(buffer.text_point(1, 4), 17);
        assert_eq!(buffer.text_point(3, 3), buffer.size());
        assert_eq!(buffer.text_point(3, 30), buffer.size());
        assert_eq!(buffer.text_point(9, 2), buffer.size() + 2);
        assert_eq!(buffer.line_count(), 4);
    }

    #[test]
    fn test_word_uses_configured_separators() {
        let mut buffer =
            Buffer::with_config(BufferConfig::new().with_word_separators("_")).unwrap();
        buffer.insert(0, "snake_case.name");
        assert_eq!(buffer.word(2), Region::new(0, 5));
        assert_eq!(buffer.word(7), Region::new(6, 15));
    }

    #[test]
    fn test_debug_summarises() {
        let buffer = Buffer::from_text("abc");
        let debug = format!("{buffer:?}");
        assert!(debug.contains("size: 3"));
    }
}
