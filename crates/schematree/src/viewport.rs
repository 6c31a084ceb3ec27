use std::ops::Range;

/// Cursor and scroll offset over a sequence of `count` visible rows.
///
/// Every movement moves the cursor first and then scrolls only as far as
/// needed to keep it inside `[offset, offset + height)`. A height of zero
/// means the whole sequence is on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewportCursor {
    cursor: usize,
    offset: usize,
    height: usize,
}

impl ViewportCursor {
    pub fn new(height: usize) -> Self {
        Self {
            cursor: 0,
            offset: 0,
            height,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn set_height(&mut self, height: usize) {
        self.height = height;
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
        self.offset = 0;
    }

    /// Row indices currently on screen.
    pub fn window(&self, count: usize) -> Range<usize> {
        if self.height == 0 {
            return 0..count;
        }
        let start = self.offset.min(count);
        start..(start + self.height).min(count)
    }

    pub fn move_down(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        if self.cursor < count - 1 {
            self.cursor += 1;
        }
        self.follow_cursor();
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
        self.follow_cursor();
    }

    pub fn move_page_down(&mut self, count: usize) {
        if count == 0 || self.height == 0 {
            self.move_down(count);
            return;
        }
        self.cursor = (self.cursor + self.height).min(count - 1);
        if self.cursor >= self.offset + self.height {
            self.offset = self.cursor + 1 - self.height;
        }
    }

    pub fn move_page_up(&mut self, count: usize) {
        if count == 0 || self.height == 0 {
            self.move_up();
            return;
        }
        self.cursor = self.cursor.saturating_sub(self.height);
        if self.cursor < self.offset {
            self.offset = self.cursor;
        }
    }

    /// Moves the cursor to a specific row, scrolling minimally.
    pub fn jump_to(&mut self, row: usize, count: usize) {
        if count == 0 {
            self.reset();
            return;
        }
        self.cursor = row.min(count - 1);
        self.follow_cursor();
    }

    /// Brings cursor and offset back into range after the row count or the
    /// height changed.
    pub fn clamp(&mut self, count: usize) {
        if count == 0 {
            self.reset();
            return;
        }
        self.cursor = self.cursor.min(count - 1);
        let max_start = count.saturating_sub(self.height);
        self.offset = self.offset.min(max_start);
        self.follow_cursor();
    }

    fn follow_cursor(&mut self) {
        if self.height == 0 {
            self.offset = 0;
            return;
        }
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + self.height {
            self.offset = self.cursor + 1 - self.height;
        }
    }
}
