//! Legacy colour-code markup (`&a`, `&l`, `&#00ffaa`) and the JSON chat
//! components it turns into.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new("(https?://)?([a-zA-Z0-9\\-]+\\.)+[a-zA-Z]{2,}(/[a-zA-Z0-9.\\-_#?+=&%/]*)?")
        .unwrap()
});

/// The character the client uses to mark a formatting code.
pub const SECTION_SIGN: char = '§';

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ColorCode {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
    Obfuscated,
    Bold,
    Strikethrough,
    Underline,
    Italic,
    Reset,
}

impl ColorCode {
    pub fn parse(code: char) -> Option<ColorCode> {
        Some(match code.to_ascii_lowercase() {
            '0' => ColorCode::Black,
            '1' => ColorCode::DarkBlue,
            '2' => ColorCode::DarkGreen,
            '3' => ColorCode::DarkAqua,
            '4' => ColorCode::DarkRed,
            '5' => ColorCode::DarkPurple,
            '6' => ColorCode::Gold,
            '7' => ColorCode::Gray,
            '8' => ColorCode::DarkGray,
            '9' => ColorCode::Blue,
            'a' => ColorCode::Green,
            'b' => ColorCode::Aqua,
            'c' => ColorCode::Red,
            'd' => ColorCode::LightPurple,
            'e' => ColorCode::Yellow,
            'f' => ColorCode::White,
            'k' => ColorCode::Obfuscated,
            'l' => ColorCode::Bold,
            'm' => ColorCode::Strikethrough,
            'n' => ColorCode::Underline,
            'o' => ColorCode::Italic,
            'r' => ColorCode::Reset,
            _ => return None,
        })
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum TextColor {
    Hex(String),
    ColorCode(ColorCode),
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
enum ClickEventType {
    OpenUrl,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ClickEvent {
    action: ClickEventType,
    value: String,
}

/// This is only used for `TextComponent` serialize
#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(field: &bool) -> bool {
    !*field
}

pub struct TextComponentBuilder {
    component: TextComponent,
}

impl TextComponentBuilder {
    pub fn new(text: String) -> Self {
        let component = TextComponent {
            text,
            ..Default::default()
        };
        Self { component }
    }

    pub fn color_code(mut self, color: ColorCode) -> Self {
        self.component.color = Some(TextColor::ColorCode(color));
        self
    }

    pub fn extra(mut self, extra: Vec<TextComponent>) -> Self {
        self.component.extra = extra;
        self
    }

    pub fn finish(self) -> TextComponent {
        self.component
    }
}

#[derive(Serialize, Default, Debug, Clone, PartialEq)]
pub struct TextComponent {
    pub text: String,
    #[serde(skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub underlined: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub strikethrough: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub obfuscated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<TextColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "clickEvent")]
    pub click_event: Option<ClickEvent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<TextComponent>,
}

/// Splits legacy markup into styled runs. Both `&` and `§` start a code.
#[derive(Default)]
struct LegacyParser {
    components: Vec<TextComponent>,
    current: TextComponent,
}

impl LegacyParser {
    fn parse(mut self, message: &str) -> Vec<TextComponent> {
        let chars: Vec<char> = message.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if c == '&' || c == SECTION_SIGN {
                if let Some(hex) = hex_color_at(&chars, i + 1) {
                    self.flush();
                    self.current.color = Some(TextColor::Hex(hex));
                    i += 8;
                    continue;
                }
                if let Some(code) = chars.get(i + 1).copied().and_then(ColorCode::parse) {
                    self.apply(code);
                    i += 2;
                    continue;
                }
            }
            self.current.text.push(c);
            i += 1;
        }
        self.flush();
        self.components
    }

    fn apply(&mut self, code: ColorCode) {
        match code {
            ColorCode::Bold => self.style(|c| c.bold = true),
            ColorCode::Italic => self.style(|c| c.italic = true),
            ColorCode::Underline => self.style(|c| c.underlined = true),
            ColorCode::Strikethrough => self.style(|c| c.strikethrough = true),
            ColorCode::Obfuscated => self.style(|c| c.obfuscated = true),
            color => {
                // A colour (or reset) drops every active format
                self.flush();
                self.current.color = Some(TextColor::ColorCode(color));
            }
        }
    }

    fn style(&mut self, f: impl FnOnce(&mut TextComponent)) {
        if !self.current.text.is_empty() {
            self.components.push(self.current.clone());
            self.current.text.clear();
        }
        f(&mut self.current);
    }

    fn flush(&mut self) {
        let done = std::mem::take(&mut self.current);
        if !done.text.is_empty() {
            self.components.push(done);
        }
    }
}

/// Matches `#rrggbb` starting at `start`.
fn hex_color_at(chars: &[char], start: usize) -> Option<String> {
    let digits = chars.get(start..start + 7)?;
    if digits[0] != '#' || !digits[1..].iter().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(digits.iter().collect())
}

fn link_urls(components: Vec<TextComponent>) -> Vec<TextComponent> {
    let mut linked = Vec::with_capacity(components.len());
    for component in components {
        let text = &component.text;
        let mut last = 0;
        for found in URL_REGEX.find_iter(text) {
            if last != found.start() {
                let mut before = component.clone();
                before.text = text[last..found.start()].to_string();
                linked.push(before);
            }
            let url = found.as_str();
            let target = if url.starts_with("http") {
                url.to_string()
            } else {
                format!("https://{}", url)
            };
            let mut link = component.clone();
            link.text = url.to_string();
            link.click_event = Some(ClickEvent {
                action: ClickEventType::OpenUrl,
                value: target,
            });
            linked.push(link);
            last = found.end();
        }
        if last == 0 {
            linked.push(component);
        } else if last < text.len() {
            let mut after = component.clone();
            after.text = text[last..].to_string();
            linked.push(after);
        }
    }
    linked
}

impl TextComponent {
    /// Parses legacy markup into a flat list of styled components. URLs get
    /// an open-url click event.
    pub fn from_legacy_text(message: &str) -> Vec<TextComponent> {
        link_urls(LegacyParser::default().parse(message))
    }

    /// Like [`TextComponent::from_legacy_text`], wrapped in a single
    /// unstyled parent.
    pub fn legacy(message: &str) -> TextComponent {
        TextComponent {
            extra: TextComponent::from_legacy_text(message),
            ..Default::default()
        }
    }

    /// The visible text of this component and all of its children.
    pub fn to_plain_text(&self) -> String {
        let mut out = self.text.clone();
        for child in &self.extra {
            out.push_str(&child.to_plain_text());
        }
        out
    }

    /// The chat JSON the client expects.
    pub fn encode_json(&self) -> String {
        serde_json::to_string(self).unwrap()
    }
}

impl<S> From<S> for TextComponent
where
    S: Into<String>,
{
    fn from(value: S) -> Self {
        TextComponent {
            text: value.into(),
            ..Default::default()
        }
    }
}
