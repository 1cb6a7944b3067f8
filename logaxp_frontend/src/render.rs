use html2text::render::text_renderer::TrivialDecorator;
use html5ever::tendril::StrTendril;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use lazy_static::lazy_static;
use regex::Regex;

use crate::editor::Alignment;
use crate::models::Post;
use crate::sanitize::sanitize_post_html;

const EXCERPT_CHARS: usize = 100;
const TEXT_WIDTH: usize = 100;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref LINK_FOOTNOTE: Regex = Regex::new(r"(?m)^\[\d+\]: .*$").unwrap();
}

const FALLBACK_BANNERS: &[&str] = &[
    "https://images.unsplash.com/photo-1460925895917-afdab827c52f?w=400&h=200&fit=crop",
    "https://images.unsplash.com/photo-1504639725590-34d0984388bd?w=400&h=200&fit=crop",
    "https://images.unsplash.com/photo-1581091226825-a6a2a5aee158?w=400&h=200&fit=crop",
    "https://images.unsplash.com/photo-1519389950473-47ba0277781c?w=400&h=200&fit=crop",
    "https://images.unsplash.com/photo-1486312338219-ce68d2c6f44d?w=400&h=200&fit=crop",
    "https://images.unsplash.com/photo-1551288049-bebda4e38f71?w=400&h=200&fit=crop",
    "https://images.unsplash.com/photo-1517077304055-6e89abbf09b0?w=400&h=200&fit=crop",
    "https://images.unsplash.com/photo-1573164713714-d95e436ab8d6?w=400&h=200&fit=crop",
    "https://images.unsplash.com/photo-1563986768609-322da13575f3?w=400&h=200&fit=crop",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanStyle {
    pub strong: bool,
    pub emphasis: bool,
    pub underline: bool,
    pub code: bool,
}

/// Inline run of a rendered body block. Text is literal; nothing in it is
/// interpreted again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text {
        text: String,
        style: SpanStyle,
        link: Option<String>,
    },
    Image {
        src: String,
        alt: String,
    },
    LineBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMarker {
    Bullet,
    Number(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyBlockKind {
    Paragraph,
    Heading(u8),
    ListItem { marker: ListMarker, depth: usize },
    Preformatted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyBlock {
    pub kind: BodyBlockKind,
    pub quote_depth: usize,
    pub align: Alignment,
    pub spans: Vec<Span>,
}

impl BodyBlock {
    fn new(kind: BodyBlockKind, quote_depth: usize, align: Alignment) -> Self {
        Self {
            kind,
            quote_depth,
            align,
            spans: Vec::new(),
        }
    }

    fn ends_in_space(&self) -> bool {
        match self.spans.last() {
            None | Some(Span::LineBreak) => true,
            Some(Span::Text { text, .. }) => text.ends_with(' '),
            Some(Span::Image { .. }) => false,
        }
    }

    fn trim_end(&mut self) {
        while let Some(last) = self.spans.last_mut() {
            match last {
                Span::Text { text, .. } => {
                    let kept = text.trim_end_matches(' ').len();
                    text.truncate(kept);
                    if !text.is_empty() {
                        return;
                    }
                }
                Span::LineBreak => {}
                Span::Image { .. } => return,
            }
            self.spans.pop();
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ListFrame {
    ordered: bool,
    next: usize,
}

/// Token sink that folds sanitized post HTML into display blocks.
#[derive(Debug)]
struct BodyBuilder {
    blocks: Vec<BodyBlock>,
    current: Option<BodyBlock>,
    /// Whether `current` was opened by a block tag, so an empty `<p></p>`
    /// still takes up a line.
    explicit: bool,
    kind: BodyBlockKind,
    align: Alignment,
    lists: Vec<ListFrame>,
    quote_depth: usize,
    preformatted: usize,
    strong: usize,
    emphasis: usize,
    underline: usize,
    code: usize,
    links: Vec<Option<String>>,
}

impl Default for BodyBuilder {
    fn default() -> Self {
        Self {
            blocks: Vec::new(),
            current: None,
            explicit: false,
            kind: BodyBlockKind::Paragraph,
            align: Alignment::Left,
            lists: Vec::new(),
            quote_depth: 0,
            preformatted: 0,
            strong: 0,
            emphasis: 0,
            underline: 0,
            code: 0,
            links: Vec::new(),
        }
    }
}

fn attribute(tag: &Tag, name: &str) -> Option<String> {
    tag.attrs
        .iter()
        .find(|attr| &*attr.name.local == name)
        .map(|attr| attr.value.to_string())
}

impl BodyBuilder {
    fn style(&self) -> SpanStyle {
        SpanStyle {
            strong: self.strong > 0,
            emphasis: self.emphasis > 0,
            underline: self.underline > 0,
            code: self.code > 0 || self.preformatted > 0,
        }
    }

    fn link(&self) -> Option<String> {
        self.links.iter().rev().flatten().next().cloned()
    }

    fn flush(&mut self) {
        if let Some(mut block) = self.current.take() {
            block.trim_end();
            if !block.spans.is_empty() || self.explicit {
                self.blocks.push(block);
            }
        }
        self.explicit = false;
    }

    fn start_block(&mut self, kind: BodyBlockKind, align: Alignment) {
        self.flush();
        self.kind = kind;
        self.align = align;
        self.current = Some(BodyBlock::new(kind, self.quote_depth, align));
        self.explicit = true;
    }

    fn end_block(&mut self) {
        self.flush();
        self.kind = BodyBlockKind::Paragraph;
        self.align = Alignment::Left;
    }

    fn block(&mut self) -> &mut BodyBlock {
        let (kind, quote_depth, align) = (self.kind, self.quote_depth, self.align);
        self.current
            .get_or_insert_with(|| BodyBlock::new(kind, quote_depth, align))
    }

    fn push_span(&mut self, span: Span) {
        self.block().spans.push(span);
    }

    fn text(&mut self, raw: &str) {
        if self.preformatted > 0 {
            let starts_block = self.current.as_ref().map_or(true, |b| b.spans.is_empty());
            let raw = if starts_block {
                raw.strip_prefix('\n').unwrap_or(raw)
            } else {
                raw
            };
            if !raw.is_empty() {
                self.push_text(raw.to_string());
            }
            return;
        }
        if self.current.is_none() && raw.trim().is_empty() {
            return;
        }
        let mut collapsed = String::with_capacity(raw.len());
        let mut space = self.current.as_ref().map_or(true, BodyBlock::ends_in_space);
        for ch in raw.chars() {
            if ch.is_whitespace() {
                if !space {
                    collapsed.push(' ');
                    space = true;
                }
            } else {
                collapsed.push(ch);
                space = false;
            }
        }
        if !collapsed.is_empty() {
            self.push_text(collapsed);
        }
    }

    fn push_text(&mut self, text: String) {
        let (style, link) = (self.style(), self.link());
        let block = self.block();
        if let Some(Span::Text {
            text: last,
            style: last_style,
            link: last_link,
        }) = block.spans.last_mut()
        {
            if *last_style == style && *last_link == link {
                last.push_str(&text);
                return;
            }
        }
        block.spans.push(Span::Text { text, style, link });
    }

    fn open(&mut self, tag: &Tag) {
        let align = attribute(tag, "class")
            .map(|class| Alignment::from_class(&class))
            .unwrap_or_default();
        match &*tag.name {
            "p" => self.start_block(BodyBlockKind::Paragraph, align),
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = tag.name.as_bytes()[1] - b'0';
                self.start_block(BodyBlockKind::Heading(level), align);
            }
            "pre" => {
                self.preformatted += 1;
                self.start_block(BodyBlockKind::Preformatted, align);
            }
            "ul" | "ol" => {
                self.flush();
                self.lists.push(ListFrame {
                    ordered: &*tag.name == "ol",
                    next: 1,
                });
            }
            "li" => {
                let depth = self.lists.len().max(1);
                let marker = match self.lists.last_mut() {
                    Some(frame) if frame.ordered => {
                        frame.next += 1;
                        ListMarker::Number(frame.next - 1)
                    }
                    _ => ListMarker::Bullet,
                };
                self.start_block(BodyBlockKind::ListItem { marker, depth }, align);
            }
            "blockquote" => {
                self.flush();
                self.quote_depth += 1;
                self.align = align;
            }
            "strong" => self.strong += 1,
            "em" => self.emphasis += 1,
            "u" => self.underline += 1,
            "code" => self.code += 1,
            "a" => self.links.push(attribute(tag, "href")),
            "br" => {
                if self.preformatted > 0 {
                    self.push_text("\n".to_string());
                } else {
                    self.push_span(Span::LineBreak);
                }
            }
            "img" => {
                let alt = attribute(tag, "alt").unwrap_or_default();
                match attribute(tag, "src").filter(|src| !src.trim().is_empty()) {
                    Some(src) => self.push_span(Span::Image { src, alt }),
                    None if !alt.is_empty() => self.text(&alt),
                    None => {}
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &str) {
        match name {
            "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "li" => self.end_block(),
            "pre" => {
                self.preformatted = self.preformatted.saturating_sub(1);
                self.end_block();
            }
            "ul" | "ol" => {
                self.flush();
                self.lists.pop();
            }
            "blockquote" => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.align = Alignment::Left;
            }
            "strong" => self.strong = self.strong.saturating_sub(1),
            "em" => self.emphasis = self.emphasis.saturating_sub(1),
            "u" => self.underline = self.underline.saturating_sub(1),
            "code" => self.code = self.code.saturating_sub(1),
            "a" => {
                self.links.pop();
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<BodyBlock> {
        self.flush();
        self.blocks
    }
}

impl TokenSink for BodyBuilder {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::TagToken(tag) => match tag.kind {
                TagKind::StartTag => self.open(&tag),
                TagKind::EndTag => self.close(&tag.name),
            },
            Token::CharacterTokens(text) => self.text(&text),
            _ => {}
        }
        TokenSinkResult::Continue
    }
}

/// Sanitizes post HTML and lays it out as blocks of literal text, links and
/// images for the detail view.
pub fn post_body(content: &str) -> Vec<BodyBlock> {
    let safe = sanitize_post_html(content);
    let mut input = BufferQueue::new();
    input.push_back(StrTendril::from_slice(&safe));
    let mut tokenizer = Tokenizer::new(BodyBuilder::default(), TokenizerOpts::default());
    let _ = tokenizer.feed(&mut input);
    tokenizer.end();
    tokenizer.sink.finish()
}

/// Text content only, whitespace collapsed.
pub fn plain_text(content: &str) -> String {
    let safe = sanitize_post_html(content);
    let text = html2text::from_read_with_decorator(
        safe.as_bytes(),
        TEXT_WIDTH,
        TrivialDecorator::new(),
    );
    let text = LINK_FOOTNOTE.replace_all(&text, "");
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Card blurb: the description when there is one, else the opening of the
/// body text.
pub fn excerpt(post: &Post) -> String {
    if let Some(description) = post.description.as_deref() {
        if !description.trim().is_empty() {
            return description.trim().to_string();
        }
    }
    let text = plain_text(&post.content);
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(EXCERPT_CHARS).collect();
    format!("{head}...")
}

/// The post's own social image unless it is a placeholder, else a fallback
/// picked by grid position.
pub fn banner_url(post: &Post, index: usize) -> &str {
    match post.social_image.as_deref() {
        Some(url) if !url.trim().is_empty() && !url.contains("default-thumbnail") => url,
        _ => FALLBACK_BANNERS[index % FALLBACK_BANNERS.len()],
    }
}

pub fn format_date(post: &Post) -> String {
    post.created_time()
        .or_else(|| {
            post.published_at
                .as_deref()
                .and_then(crate::models::parse_timestamp)
        })
        .map(|ts| ts.format("%b %-d, %Y").to_string())
        .unwrap_or_default()
}
