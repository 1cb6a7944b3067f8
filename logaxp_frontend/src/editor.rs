//! Rich-text content for the creation form.
//!
//! A [`Document`] is a list of blocks, each holding inline runs. Every edit
//! returns a new document; the previous value is never touched, which keeps
//! the toolbar and the text widgets from fighting over shared state.
//!
//! Character positions are counted in `char`s over a block's text, matching
//! egui's cursor indices. Images occupy no text positions.

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockKind {
    #[default]
    Paragraph,
    /// Level 1 to 6.
    Heading(u8),
    BulletItem,
    NumberedItem,
    Quote,
}

impl BlockKind {
    fn tag(self) -> &'static str {
        match self {
            BlockKind::Paragraph => "p",
            BlockKind::Heading(level) => match level.clamp(1, 6) {
                1 => "h1",
                2 => "h2",
                3 => "h3",
                4 => "h4",
                5 => "h5",
                _ => "h6",
            },
            BlockKind::BulletItem | BlockKind::NumberedItem => "li",
            BlockKind::Quote => "blockquote",
        }
    }

    fn list_tag(self) -> Option<&'static str> {
        match self {
            BlockKind::BulletItem => Some("ul"),
            BlockKind::NumberedItem => Some("ol"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    fn class(self) -> Option<&'static str> {
        match self {
            Alignment::Left => None,
            Alignment::Center => Some("text-center"),
            Alignment::Right => Some("text-right"),
        }
    }

    /// Reads the alignment back out of a `class` attribute value.
    pub fn from_class(class: &str) -> Self {
        let mut align = Alignment::Left;
        for name in class.split_whitespace() {
            match name {
                "text-center" => align = Alignment::Center,
                "text-right" => align = Alignment::Right,
                _ => {}
            }
        }
        align
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Bold,
    Italic,
    Underline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Marks {
    pub fn has(self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
        }
    }

    fn with(mut self, mark: Mark, on: bool) -> Self {
        match mark {
            Mark::Bold => self.bold = on,
            Mark::Italic => self.italic = on,
            Mark::Underline => self.underline = on,
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text {
        text: String,
        marks: Marks,
        link: Option<String>,
    },
    Image {
        src: String,
        alt: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    pub kind: BlockKind,
    pub align: Alignment,
    pub inlines: Vec<Inline>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Style {
    marks: Marks,
    link: Option<String>,
}

/// One text position or one image; the unit edits work on.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Char(char, Style),
    Image { src: String, alt: String },
}

impl Block {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Text content without images.
    pub fn text(&self) -> String {
        self.inlines
            .iter()
            .filter_map(|inline| match inline {
                Inline::Text { text, .. } => Some(text.as_str()),
                Inline::Image { .. } => None,
            })
            .collect()
    }

    pub fn char_len(&self) -> usize {
        self.pieces()
            .iter()
            .filter(|piece| matches!(piece, Piece::Char(..)))
            .count()
    }

    pub fn images(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inlines.iter().filter_map(|inline| match inline {
            Inline::Image { src, alt } => Some((src.as_str(), alt.as_str())),
            Inline::Text { .. } => None,
        })
    }

    /// Whether every character in `range` carries `mark`. Empty ranges never
    /// do.
    pub fn range_has(&self, range: Range<usize>, mark: Mark) -> bool {
        let styles: Vec<Style> = self
            .pieces()
            .into_iter()
            .filter_map(|piece| match piece {
                Piece::Char(_, style) => Some(style),
                Piece::Image { .. } => None,
            })
            .skip(range.start)
            .take(range.len())
            .collect();
        !styles.is_empty() && styles.iter().all(|style| style.marks.has(mark))
    }

    fn pieces(&self) -> Vec<Piece> {
        let mut pieces = Vec::new();
        for inline in &self.inlines {
            match inline {
                Inline::Text { text, marks, link } => {
                    let style = Style {
                        marks: *marks,
                        link: link.clone(),
                    };
                    pieces.extend(text.chars().map(|c| Piece::Char(c, style.clone())));
                }
                Inline::Image { src, alt } => pieces.push(Piece::Image {
                    src: src.clone(),
                    alt: alt.clone(),
                }),
            }
        }
        pieces
    }

    fn with_pieces(&self, pieces: Vec<Piece>) -> Self {
        let mut inlines: Vec<Inline> = Vec::new();
        for piece in pieces {
            match piece {
                Piece::Char(c, style) => {
                    if let Some(Inline::Text { text, marks, link }) = inlines.last_mut() {
                        if *marks == style.marks && *link == style.link {
                            text.push(c);
                            continue;
                        }
                    }
                    inlines.push(Inline::Text {
                        text: c.to_string(),
                        marks: style.marks,
                        link: style.link,
                    });
                }
                Piece::Image { src, alt } => inlines.push(Inline::Image { src, alt }),
            }
        }
        Self {
            kind: self.kind,
            align: self.align,
            inlines,
        }
    }

    /// Applies `f` to the style of every character inside `range`.
    fn restyle(&self, range: Range<usize>, f: impl Fn(&mut Style)) -> Self {
        let mut index = 0;
        let pieces = self
            .pieces()
            .into_iter()
            .map(|piece| match piece {
                Piece::Char(c, mut style) => {
                    if range.contains(&index) {
                        f(&mut style);
                    }
                    index += 1;
                    Piece::Char(c, style)
                }
                image => image,
            })
            .collect();
        self.with_pieces(pieces)
    }

    /// Inserts `new` at char position `at`, styled by `style`.
    fn insert_pieces(&self, at: usize, new: Vec<Piece>) -> Self {
        let mut out = Vec::new();
        let mut pending = Some(new);
        let mut index = 0;
        for piece in self.pieces() {
            if index == at {
                if let Some(new) = pending.take() {
                    out.extend(new);
                }
            }
            if matches!(piece, Piece::Char(..)) {
                index += 1;
            }
            out.push(piece);
        }
        if let Some(new) = pending {
            out.extend(new);
        }
        self.with_pieces(out)
    }

    fn html(&self, out: &mut String) {
        let tag = self.kind.tag();
        out.push('<');
        out.push_str(tag);
        if let Some(class) = self.align.class() {
            out.push_str(" class=\"");
            out.push_str(class);
            out.push('"');
        }
        out.push('>');
        if self.inlines.is_empty() {
            out.push_str("<br>");
        }

        let mut i = 0;
        while i < self.inlines.len() {
            match &self.inlines[i] {
                Inline::Image { src, alt } => {
                    out.push_str("<img src=\"");
                    escape_attribute(src, out);
                    out.push('"');
                    if !alt.is_empty() {
                        out.push_str(" alt=\"");
                        escape_attribute(alt, out);
                        out.push('"');
                    }
                    out.push('>');
                    i += 1;
                }
                Inline::Text { link: None, .. } => {
                    marked_text(&self.inlines[i], out);
                    i += 1;
                }
                Inline::Text {
                    link: Some(href), ..
                } => {
                    // One anchor for the whole stretch sharing this link.
                    out.push_str("<a href=\"");
                    escape_attribute(href, out);
                    out.push_str("\" target=\"_blank\" rel=\"noopener noreferrer\">");
                    while let Some(inline @ Inline::Text { link: Some(next), .. }) =
                        self.inlines.get(i)
                    {
                        if next != href {
                            break;
                        }
                        marked_text(inline, out);
                        i += 1;
                    }
                    out.push_str("</a>");
                }
            }
        }
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
}

fn marked_text(inline: &Inline, out: &mut String) {
    let Inline::Text { text, marks, .. } = inline else {
        return;
    };
    let tags = [
        (marks.bold, "strong"),
        (marks.italic, "em"),
        (marks.underline, "u"),
    ];
    for (on, tag) in tags {
        if on {
            out.push('<');
            out.push_str(tag);
            out.push('>');
        }
    }
    escape_text(text, out);
    for (on, tag) in tags.iter().rev() {
        if *on {
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            blocks: vec![Block::default()],
        }
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// Plain text of every block, one line each.
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// No visible text and no images.
    pub fn is_blank(&self) -> bool {
        self.blocks
            .iter()
            .all(|block| block.text().trim().is_empty() && block.images().next().is_none())
    }

    fn map_block(&self, index: usize, f: impl FnOnce(&Block) -> Block) -> Self {
        let mut blocks = self.blocks.clone();
        if let Some(slot) = blocks.get_mut(index) {
            *slot = f(&self.blocks[index]);
        }
        Self { blocks }
    }

    /// Replaces a block's text, keeping the styling of the characters that
    /// survive. Typed characters take the style of the one before them.
    pub fn replace_text(&self, index: usize, text: &str) -> Self {
        self.map_block(index, |block| {
            let old: Vec<char> = block.text().chars().collect();
            let new: Vec<char> = text.chars().collect();
            let prefix = old
                .iter()
                .zip(&new)
                .take_while(|(a, b)| a == b)
                .count();
            let max_suffix = old.len().min(new.len()) - prefix;
            let suffix = old
                .iter()
                .rev()
                .zip(new.iter().rev())
                .take(max_suffix)
                .take_while(|(a, b)| a == b)
                .count();
            let removed = prefix..old.len() - suffix;

            let pieces = block.pieces();
            let styles: Vec<&Style> = pieces
                .iter()
                .filter_map(|piece| match piece {
                    Piece::Char(_, style) => Some(style),
                    Piece::Image { .. } => None,
                })
                .collect();
            let inherited = prefix
                .checked_sub(1)
                .and_then(|before| styles.get(before))
                .or_else(|| styles.get(prefix))
                .map(|style| (*style).clone())
                .unwrap_or_default();
            let inserted: Vec<Piece> = new[prefix..new.len() - suffix]
                .iter()
                .map(|c| Piece::Char(*c, inherited.clone()))
                .collect();

            let mut out = Vec::new();
            let mut pending = Some(inserted);
            let mut index = 0;
            for piece in pieces.iter().cloned() {
                match piece {
                    Piece::Char(..) => {
                        if index >= prefix {
                            if let Some(inserted) = pending.take() {
                                out.extend(inserted);
                            }
                        }
                        if !removed.contains(&index) {
                            out.push(piece);
                        }
                        index += 1;
                    }
                    image => out.push(image),
                }
            }
            if let Some(inserted) = pending {
                out.extend(inserted);
            }
            block.with_pieces(out)
        })
    }

    fn toggle_mark(&self, index: usize, range: Range<usize>, mark: Mark) -> Self {
        if range.is_empty() {
            return self.clone();
        }
        self.map_block(index, |block| {
            let on = !block.range_has(range.clone(), mark);
            block.restyle(range, |style| style.marks = style.marks.with(mark, on))
        })
    }

    pub fn toggle_bold(&self, index: usize, range: Range<usize>) -> Self {
        self.toggle_mark(index, range, Mark::Bold)
    }

    pub fn toggle_italic(&self, index: usize, range: Range<usize>) -> Self {
        self.toggle_mark(index, range, Mark::Italic)
    }

    pub fn toggle_underline(&self, index: usize, range: Range<usize>) -> Self {
        self.toggle_mark(index, range, Mark::Underline)
    }

    pub fn set_block_type(&self, index: usize, kind: BlockKind) -> Self {
        self.map_block(index, |block| Block {
            kind,
            ..block.clone()
        })
    }

    pub fn set_alignment(&self, index: usize, align: Alignment) -> Self {
        self.map_block(index, |block| Block {
            align,
            ..block.clone()
        })
    }

    /// Links the selected text. With nothing selected the address itself is
    /// inserted as the link text.
    pub fn insert_link(&self, index: usize, range: Range<usize>, href: &str) -> Self {
        let href = href.trim();
        if href.is_empty() {
            return self.clone();
        }
        self.map_block(index, |block| {
            if range.is_empty() {
                let style = Style {
                    marks: Marks::default(),
                    link: Some(href.to_string()),
                };
                let linked = href.chars().map(|c| Piece::Char(c, style.clone())).collect();
                block.insert_pieces(range.start, linked)
            } else {
                block.restyle(range, |style| style.link = Some(href.to_string()))
            }
        })
    }

    pub fn insert_image(&self, index: usize, at: usize, src: &str, alt: &str) -> Self {
        if src.trim().is_empty() {
            return self.clone();
        }
        self.map_block(index, |block| {
            block.insert_pieces(
                at,
                vec![Piece::Image {
                    src: src.trim().to_string(),
                    alt: alt.to_string(),
                }],
            )
        })
    }

    /// Splits a block at char position `at`. The tail keeps list and quote
    /// kinds; a heading's tail becomes a paragraph.
    pub fn split_block(&self, index: usize, at: usize) -> Self {
        let Some(block) = self.blocks.get(index) else {
            return self.clone();
        };
        let mut head = Vec::new();
        let mut tail = Vec::new();
        let mut chars = 0;
        for piece in block.pieces() {
            if chars < at {
                if matches!(piece, Piece::Char(..)) {
                    chars += 1;
                }
                head.push(piece);
            } else {
                tail.push(piece);
            }
        }
        let tail_kind = match block.kind {
            BlockKind::Heading(_) => BlockKind::Paragraph,
            kind => kind,
        };
        let mut blocks = self.blocks.clone();
        blocks[index] = block.with_pieces(head);
        blocks.insert(
            index + 1,
            Block {
                kind: tail_kind,
                ..block.with_pieces(tail)
            },
        );
        Self { blocks }
    }

    pub fn push_block(&self, kind: BlockKind) -> Self {
        let mut blocks = self.blocks.clone();
        blocks.push(Block::new(kind));
        Self { blocks }
    }

    /// Removes a block; the last remaining block is emptied instead.
    pub fn remove_block(&self, index: usize) -> Self {
        if index >= self.blocks.len() {
            return self.clone();
        }
        let mut blocks = self.blocks.clone();
        blocks.remove(index);
        if blocks.is_empty() {
            blocks.push(Block::default());
        }
        Self { blocks }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        let mut open_list: Option<&'static str> = None;
        for block in &self.blocks {
            let list = block.kind.list_tag();
            if open_list != list {
                if let Some(tag) = open_list {
                    out.push_str("</");
                    out.push_str(tag);
                    out.push('>');
                }
                if let Some(tag) = list {
                    out.push('<');
                    out.push_str(tag);
                    out.push('>');
                }
                open_list = list;
            }
            block.html(&mut out);
        }
        if let Some(tag) = open_list {
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        out
    }
}
