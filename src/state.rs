use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// How screen lines are assigned to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `n` pre-allocated lines addressed by slot index `0..n`.
    Fixed(usize),
    /// Lines are allocated on first use, in insertion order.
    Dynamic,
}

/// Identifies one logical status line.
pub trait LineKey: Eq + Hash + Clone + Debug {
    /// The fixed slot this key names, if any.
    fn slot(&self) -> Option<usize>;
}

macro_rules! integer_line_key {
    ($($ty:ty),*) => {
        $(
            impl LineKey for $ty {
                fn slot(&self) -> Option<usize> {
                    usize::try_from(*self).ok()
                }
            }
        )*
    };
}

integer_line_key!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl LineKey for String {
    fn slot(&self) -> Option<usize> {
        None
    }
}

impl LineKey for &str {
    fn slot(&self) -> Option<usize> {
        None
    }
}

impl LineKey for char {
    fn slot(&self) -> Option<usize> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    /// Untruncated text; truncation only happens when rendering.
    pub content: String,
    /// Offset within the block, stable for the session.
    pub screen_line: usize,
}

/// What the renderer has to do after a store update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Unchanged,
    Patch { screen_line: usize, column: usize },
    Redraw,
}

/// Per-session mapping from keys to status lines, plus the dirty flag.
#[derive(Debug)]
pub struct Store<K> {
    layout: Layout,
    lines: Vec<StatusLine>,
    slots: HashMap<K, usize>,
    dirty: bool,
}

impl<K: LineKey> Store<K> {
    pub fn new(layout: Layout) -> Self {
        let lines = match layout {
            Layout::Fixed(count) => (0..count)
                .map(|screen_line| StatusLine {
                    content: String::new(),
                    screen_line,
                })
                .collect(),
            Layout::Dynamic => Vec::new(),
        };
        Self {
            layout,
            lines,
            slots: HashMap::new(),
            dirty: false,
        }
    }

    pub fn lines(&self) -> &[StatusLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn screen_line(&self, key: &K) -> Option<usize> {
        match self.layout {
            Layout::Fixed(count) => key.slot().filter(|slot| *slot < count),
            Layout::Dynamic => self.slots.get(key).copied(),
        }
    }

    /// Stores `content` under `key` and reports how the block must be rendered.
    /// Nothing is mutated when the key is rejected.
    pub fn update(&mut self, key: K, content: String) -> Result<Change> {
        let screen_line = match self.layout {
            Layout::Fixed(count) => Some(self.screen_line(&key).ok_or_else(|| {
                Error::LineOutOfRange {
                    key: format!("{key:?}"),
                    lines: count,
                }
            })?),
            Layout::Dynamic => self.slots.get(&key).copied(),
        };

        let Some(screen_line) = screen_line else {
            let screen_line = self.lines.len();
            self.slots.insert(key, screen_line);
            self.lines.push(StatusLine {
                content,
                screen_line,
            });
            self.dirty = true;
            return Ok(Change::Redraw);
        };

        let line = &mut self.lines[screen_line];
        if line.content == content {
            return Ok(Change::Unchanged);
        }
        let column = common_prefix_len(&line.content, &content);
        line.content = content;

        if self.dirty {
            Ok(Change::Redraw)
        } else {
            Ok(Change::Patch {
                screen_line,
                column,
            })
        }
    }
}

/// Number of leading `char`s `a` and `b` have in common.
pub fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .take_while(|(left, right)| left == right)
        .count()
}
