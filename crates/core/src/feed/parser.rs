//! Streaming parser for NZBHydra search feeds.

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use super::{FeedError, ResultRecord};

/// Item child elements we extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Size,
    PubDate,
    Link,
    Category,
}

impl Field {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Field::Title),
            b"size" => Some(Field::Size),
            b"pubDate" => Some(Field::PubDate),
            b"link" => Some(Field::Link),
            b"category" => Some(Field::Category),
            _ => None,
        }
    }
}

/// Collects the raw text of one item before conversion.
#[derive(Debug, Default)]
struct ItemBuilder {
    /// Element depth of the `<item>` start tag.
    depth: usize,
    title: Option<String>,
    size: Option<String>,
    attr_size: Option<String>,
    pub_date: Option<String>,
    link: Option<String>,
    enclosure: Option<String>,
    category: Option<String>,
}

impl ItemBuilder {
    fn new(depth: usize) -> Self {
        Self {
            depth,
            ..Default::default()
        }
    }

    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Title => &mut self.title,
            Field::Size => &mut self.size,
            Field::PubDate => &mut self.pub_date,
            Field::Link => &mut self.link,
            Field::Category => &mut self.category,
        }
    }

    /// Start collecting `field`; repeated elements keep the first value.
    fn begin(&mut self, field: Field) -> Option<Field> {
        let slot = self.slot(field);
        if slot.is_some() {
            return None;
        }
        *slot = Some(String::new());
        Some(field)
    }

    fn push_text(&mut self, field: Field, text: &str) {
        self.slot(field)
            .get_or_insert_with(String::new)
            .push_str(text);
    }

    /// Handle a direct child element that carries its data in attributes.
    fn read_attributes(&mut self, element: &BytesStart<'_>) {
        match element.local_name().as_ref() {
            b"enclosure" => {
                if self.enclosure.is_none() {
                    self.enclosure = attribute(element, b"url");
                }
            }
            // <newznab:attr name="size" value="123"/>
            b"attr" => {
                if attribute(element, b"name").as_deref() == Some("size") {
                    self.attr_size = attribute(element, b"value");
                }
            }
            _ => {}
        }
    }

    fn build(self) -> ResultRecord {
        let size = self
            .size
            .as_deref()
            .or(self.attr_size.as_deref())
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(0);

        ResultRecord {
            title: non_blank(self.title),
            size,
            pub_date: self
                .pub_date
                .as_deref()
                .and_then(parse_pub_date)
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            link: non_blank(self.link),
            enclosure: non_blank(self.enclosure),
            category: non_blank(self.category),
        }
    }
}

fn non_blank(value: Option<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => String::new(),
    }
}

/// Read one attribute by local name; malformed attributes count as absent.
fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .and_then(|a| a.unescape_value().ok())
        .map(|v| v.into_owned())
}

/// Parse an RSS publish date (RFC 2822), accepting RFC 3339 as well.
fn parse_pub_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse a search feed into result records.
///
/// Every `<item>` element is collected, whatever it is nested in. Missing or
/// unparseable item fields fall back to the defaults documented on
/// [`ResultRecord`]. A blank document yields no records; markup that is not
/// well-formed fails the whole document.
pub fn parse_feed(xml: &str) -> Result<Vec<ResultRecord>, FeedError> {
    if xml.trim().is_empty() {
        debug!("Empty feed document");
        return Ok(Vec::new());
    }

    let mut reader = Reader::from_str(xml);

    let mut records = Vec::new();
    let mut depth: usize = 0;
    let mut seen_root = false;
    let mut item: Option<ItemBuilder> = None;
    let mut field: Option<Field> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            FeedError::Malformed(format!(
                "at position {}: {}",
                reader.error_position(),
                e
            ))
        })?;

        match event {
            Event::Start(ref e) => {
                if depth == 0 && seen_root {
                    return Err(FeedError::Malformed(
                        "more than one root element".to_string(),
                    ));
                }
                depth += 1;
                seen_root = true;

                match item {
                    Some(ref mut builder) if depth == builder.depth + 1 => {
                        field = Field::from_local_name(e.local_name().as_ref())
                            .and_then(|f| builder.begin(f));
                        builder.read_attributes(e);
                    }
                    Some(_) => {}
                    None if e.local_name().as_ref() == b"item" => {
                        item = Some(ItemBuilder::new(depth));
                    }
                    None => {}
                }
            }
            Event::Empty(ref e) => {
                if depth == 0 {
                    if seen_root {
                        return Err(FeedError::Malformed(
                            "more than one root element".to_string(),
                        ));
                    }
                    seen_root = true;
                }

                match item {
                    Some(ref mut builder) if depth == builder.depth => {
                        builder.read_attributes(e);
                    }
                    Some(_) => {}
                    None if e.local_name().as_ref() == b"item" => {
                        records.push(ResultRecord::default());
                    }
                    None => {}
                }
            }
            Event::End(_) => {
                if let Some(builder) = item.take() {
                    if depth == builder.depth {
                        records.push(builder.build());
                    } else {
                        if depth == builder.depth + 1 {
                            field = None;
                        }
                        item = Some(builder);
                    }
                }
                depth = depth.checked_sub(1).ok_or_else(|| {
                    FeedError::Malformed("closing tag without opening tag".to_string())
                })?;
            }
            Event::Text(ref t) => {
                let text = t
                    .unescape()
                    .map_err(|e| FeedError::Malformed(e.to_string()))?;
                if depth == 0 {
                    if !text.trim().is_empty() {
                        return Err(FeedError::Malformed(
                            "text outside of the root element".to_string(),
                        ));
                    }
                } else if let (Some(builder), Some(f)) = (item.as_mut(), field) {
                    if depth == builder.depth + 1 {
                        builder.push_text(f, &text);
                    }
                }
            }
            Event::CData(ref c) => {
                if let (Some(builder), Some(f)) = (item.as_mut(), field) {
                    if depth == builder.depth + 1 {
                        builder.push_text(f, &String::from_utf8_lossy(c));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(FeedError::Malformed(format!(
            "document ended with {} unclosed element(s)",
            depth
        )));
    }
    if !seen_root {
        return Err(FeedError::Malformed("no root element".to_string()));
    }

    debug!(count = records.len(), "Parsed feed items");
    Ok(records)
}
