//! Fenced code block tracking for line-based preprocessing.

/// Tracks whether the current line is inside a fenced code block.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    fence_char: Option<char>,
    fence_len: usize,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn in_fence(&self) -> bool {
        self.fence_char.is_some()
    }

    /// Feed one line. Returns `true` if the line opens or closes a fence.
    pub(crate) fn update(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();
        match self.fence_char {
            Some(ch) if is_closing_fence(trimmed, ch, self.fence_len) => {
                self.fence_char = None;
                self.fence_len = 0;
                true
            }
            Some(_) => false,
            None => match opening_fence(trimmed) {
                Some((ch, len)) => {
                    self.fence_char = Some(ch);
                    self.fence_len = len;
                    true
                }
                None => false,
            },
        }
    }
}

fn opening_fence(trimmed: &str) -> Option<(char, usize)> {
    let first = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
    let len = trimmed.chars().take_while(|&c| c == first).count();
    (len >= 3).then_some((first, len))
}

/// Same character, at least as long as the opener, nothing after it.
fn is_closing_fence(trimmed: &str, ch: char, min_len: usize) -> bool {
    let len = trimmed.chars().take_while(|&c| c == ch).count();
    len >= min_len && trimmed[len * ch.len_utf8()..].trim().is_empty()
}
