//! XWiki link and image syntax inside text runs
//!
//! `[[title|reference]]` and `![[alt|reference]]` are not Markdown, so the
//! tokenizer leaves them in text nodes. [`split_wiki_syntax`] cuts a text run
//! into plain text and wiki constructs:
//!     - the earliest unescaped opener wins, `![[` over the `[[` it contains
//!     - a construct ends at the first unescaped `]]`, an opener without one is text
//!     - the first unescaped `|` separates the title from the reference

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Link {
        title: Option<String>,
        reference: String,
    },
    Image {
        alt: Option<String>,
        reference: String,
    },
}

pub fn split_wiki_syntax(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut search_from = 0;

    while let Some((start, is_image)) = find_opener(text, search_from) {
        let inner_start = start + if is_image { 3 } else { 2 };
        if is_escaped(text, start) {
            search_from = inner_start;
            continue;
        }
        let Some(inner_end) = find_closer(text, inner_start) else {
            break;
        };

        if plain_start < start {
            segments.push(Segment::Text(text[plain_start..start].to_string()));
        }
        let (title, reference) = split_title(&text[inner_start..inner_end]);
        segments.push(if is_image {
            Segment::Image {
                alt: title,
                reference,
            }
        } else {
            Segment::Link { title, reference }
        });

        plain_start = inner_end + 2;
        search_from = plain_start;
    }

    if plain_start < text.len() {
        segments.push(Segment::Text(text[plain_start..].to_string()));
    }
    segments
}

/// Position of the next `![[` or `[[` at or after `from`.
fn find_opener(text: &str, from: usize) -> Option<(usize, bool)> {
    let rest = &text[from..];
    let link = rest.find("[[");
    let image = rest.find("![[");
    match (image, link) {
        (Some(image), Some(link)) if image < link => Some((from + image, true)),
        (_, Some(link)) => Some((from + link, false)),
        (Some(image), None) => Some((from + image, true)),
        (None, None) => None,
    }
}

/// Odd number of backslashes right before `at`.
fn is_escaped(text: &str, at: usize) -> bool {
    text[..at]
        .bytes()
        .rev()
        .take_while(|&b| b == b'\\')
        .count()
        % 2
        == 1
}

/// Position of the first unescaped `]]` at or after `from`.
fn find_closer(text: &str, from: usize) -> Option<usize> {
    let mut escaping = false;
    let mut closing = false;
    for (i, c) in text[from..].char_indices() {
        if escaping {
            escaping = false;
            closing = false;
            continue;
        }
        match c {
            '\\' => {
                escaping = true;
                closing = false;
            }
            ']' if closing => return Some(from + i - 1),
            ']' => closing = true,
            _ => closing = false,
        }
    }
    None
}

fn split_title(inner: &str) -> (Option<String>, String) {
    let mut escaping = false;
    for (i, c) in inner.char_indices() {
        if escaping {
            escaping = false;
        } else if c == '\\' {
            escaping = true;
        } else if c == '|' {
            return (Some(inner[..i].to_string()), inner[i + 1..].to_string());
        }
    }
    (None, inner.to_string())
}
