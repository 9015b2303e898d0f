use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};

/// Markup categories whose text decides a term's tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Title,
    H1,
    H2,
    H3,
    Bold,
}

impl Tag {
    pub const ALL: [Tag; 5] = [Tag::Title, Tag::H1, Tag::H2, Tag::H3, Tag::Bold];

    fn selector(self) -> &'static Selector {
        match self {
            Tag::Title => &*SEL_TITLE,
            Tag::H1 => &*SEL_H1,
            Tag::H2 => &*SEL_H2,
            Tag::H3 => &*SEL_H3,
            Tag::Bold => &*SEL_BOLD,
        }
    }
}

lazy_static! {
    static ref SEL_TITLE: Selector = Selector::parse("title").expect("valid selector");
    static ref SEL_H1: Selector = Selector::parse("h1").expect("valid selector");
    static ref SEL_H2: Selector = Selector::parse("h2").expect("valid selector");
    static ref SEL_H3: Selector = Selector::parse("h3").expect("valid selector");
    static ref SEL_BOLD: Selector = Selector::parse("b, strong").expect("valid selector");
}

/// A parsed HTML page. Parse once, then pull full text and per-tag text out of it.
pub struct Page {
    doc: Html,
}

impl Page {
    pub fn parse(html: &str) -> Self {
        Self { doc: Html::parse_document(html) }
    }

    /// Visible text of the document, joined by single spaces.
    pub fn text(&self) -> String {
        join_text(self.doc.root_element())
    }

    /// Text of each element matching `tag`, one entry per occurrence.
    pub fn texts_by_tag(&self, tag: Tag) -> Vec<String> {
        self.doc.select(tag.selector()).map(join_text).collect()
    }
}

/// Elements whose text content is never rendered.
const HIDDEN: [&str; 4] = ["script", "style", "noscript", "template"];

fn join_text(el: ElementRef<'_>) -> String {
    el.descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node
                .ancestors()
                .filter_map(|a| a.value().as_element())
                .any(|e| HIDDEN.contains(&e.name()));
            (!hidden).then(|| &**text)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn extract_text(html: &str) -> String {
    Page::parse(html).text()
}

pub fn extract_by_tag(html: &str, tag: Tag) -> Vec<String> {
    Page::parse(html).texts_by_tag(tag)
}
