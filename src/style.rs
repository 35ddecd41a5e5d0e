//! Keyword enums shared by text layers and rich-text spans.
//!
//! Template JSON stores these as CSS-like keywords (`"center"`, `"italic"`,
//! `"line-through"`). Parsing is case-insensitive and never fails: an unknown
//! keyword maps to the enum's default, so a template written by a newer
//! editor still renders.

/// Declare a keyword enum with lenient string conversion.
///
/// The first keyword of each variant is its canonical spelling (used when
/// serializing); the rest are accepted aliases.
macro_rules! keyword_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => [$canonical:literal $(, $alias:literal)*]
            ),+ $(,)?
        }
        default = $default:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl $name {
            /// Parse a keyword, falling back to the default for unknown input.
            pub fn parse(s: &str) -> Self {
                let key = s.trim();
                $(
                    if key.eq_ignore_ascii_case($canonical) $(|| key.eq_ignore_ascii_case($alias))* {
                        return $name::$variant;
                    }
                )+
                $name::$default
            }

            /// Canonical keyword for this value.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $canonical,)+
                }
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name::parse(&s)
            }
        }

        impl From<$name> for String {
            fn from(v: $name) -> String {
                v.as_str().to_string()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use keyword_enum;

keyword_enum! {
    /// Horizontal text alignment relative to the layer's anchor x.
    ///
    /// `Justify` is accepted but laid out as `Left`; full justification is
    /// not implemented.
    pub enum TextAlign {
        Left => ["left", "start"],
        Center => ["center", "centre", "middle"],
        Right => ["right", "end"],
        Justify => ["justify"],
    }
    default = Left;
}

impl TextAlign {
    /// Alignment used for measurement and drawing (`Justify` → `Left`).
    pub fn effective(self) -> Self {
        match self {
            TextAlign::Justify => TextAlign::Left,
            other => other,
        }
    }
}

keyword_enum! {
    /// Font slant.
    pub enum FontStyle {
        Normal => ["normal"],
        Italic => ["italic"],
        Oblique => ["oblique"],
    }
    default = Normal;
}

impl FontStyle {
    pub fn is_slanted(self) -> bool {
        !matches!(self, FontStyle::Normal)
    }
}

keyword_enum! {
    /// Line decoration drawn as a filled rectangle.
    pub enum TextDecoration {
        None => ["none"],
        Underline => ["underline"],
        LineThrough => ["line-through", "linethrough", "strikethrough", "line_through"],
        Overline => ["overline"],
    }
    default = None;
}

/// Parse a CSS font weight (`"normal"`, `"bold"`, `"600"`) to a numeric weight.
///
/// Unknown keywords resolve to 400.
pub fn parse_font_weight(s: &str) -> u16 {
    let key = s.trim().to_ascii_lowercase();
    match key.as_str() {
        "thin" | "hairline" => 100,
        "extralight" | "extra-light" | "ultralight" => 200,
        "light" | "lighter" => 300,
        "normal" | "regular" | "" => 400,
        "medium" => 500,
        "semibold" | "semi-bold" | "demibold" => 600,
        "bold" | "bolder" => 700,
        "extrabold" | "extra-bold" | "ultrabold" => 800,
        "black" | "heavy" => 900,
        other => other
            .parse::<u16>()
            .map(|w| w.clamp(1, 1000))
            .unwrap_or(400),
    }
}
