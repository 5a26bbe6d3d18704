use api_types::tag;

pub const MAX_OPTIONS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOption {
    Existing(String),
    Create(String),
}

impl TagOption {
    pub fn tag(&self) -> &str {
        match self {
            Self::Existing(tag) | Self::Create(tag) => tag,
        }
    }
}

/// Free-text tag picker backed by the server's tag vocabulary.
///
/// The selected tags live with the owner (form values or filters) and are
/// passed in, so one picker type serves both the sidebar and the place form.
#[derive(Debug, Default)]
pub struct TagInput {
    pub buffer: String,
    vocabulary: Vec<String>,
    pub open: bool,
    pub highlighted: Option<usize>,
}

impl TagInput {
    pub fn set_vocabulary(&mut self, vocabulary: Vec<String>) {
        self.vocabulary = tag::normalize_all(vocabulary);
        self.highlighted = None;
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn options(&self, selected: &[String]) -> Vec<TagOption> {
        let query = tag::normalize(&self.buffer);
        let needle = query.as_deref().unwrap_or("");

        let mut options: Vec<TagOption> = self
            .vocabulary
            .iter()
            .filter(|tag| !selected.contains(tag) && tag.contains(needle))
            .take(MAX_OPTIONS)
            .cloned()
            .map(TagOption::Existing)
            .collect();

        if let Some(query) = query {
            let known = self.vocabulary.iter().any(|tag| tag.contains(&query));
            if !known && !selected.contains(&query) {
                options.push(TagOption::Create(query));
            }
        }
        options
    }

    /// Handles a typed character; `,` commits instead of being inserted.
    /// Returns true when `selected` changed.
    pub fn input(&mut self, ch: char, selected: &mut Vec<String>) -> bool {
        if ch == ',' {
            return self.commit(selected);
        }
        self.buffer.push(ch);
        self.open = true;
        self.highlighted = None;
        false
    }

    /// Removes one character, or the last selected tag when the buffer is
    /// already empty.
    pub fn backspace(&mut self, selected: &mut Vec<String>) -> bool {
        if self.buffer.pop().is_some() {
            self.highlighted = None;
            return false;
        }
        selected.pop().is_some()
    }

    /// Commits the highlighted option, or the buffer when nothing is
    /// highlighted. Empty and already selected tags are ignored.
    pub fn commit(&mut self, selected: &mut Vec<String>) -> bool {
        let picked = self
            .highlighted
            .and_then(|index| self.options(selected).into_iter().nth(index))
            .map(|option| option.tag().to_string())
            .or_else(|| tag::normalize(&self.buffer));

        self.buffer.clear();
        self.highlighted = None;

        match picked {
            Some(tag) if !selected.contains(&tag) => {
                selected.push(tag);
                self.open = false;
                true
            }
            _ => false,
        }
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.highlighted = None;
    }

    pub fn highlight_next(&mut self, selected: &[String]) {
        let count = self.options(selected).len();
        if count == 0 {
            self.highlighted = None;
            return;
        }
        self.open = true;
        self.highlighted = Some(match self.highlighted {
            Some(index) => (index + 1).min(count - 1),
            None => 0,
        });
    }

    pub fn highlight_prev(&mut self) {
        self.highlighted = match self.highlighted {
            Some(0) | None => None,
            Some(index) => Some(index - 1),
        };
    }
}
