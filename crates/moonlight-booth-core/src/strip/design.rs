use std::borrow::Cow;

/// Slot arrangement of a strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripLayout {
    /// Four square slots, two rows by two columns.
    Grid2x2,
    /// Four full-width slots stacked top to bottom.
    VerticalStack,
}

/// An opaque sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Builds a color from a `0xRRGGBB` literal.
    pub const fn hex(value: u32) -> Self {
        Self(
            ((value >> 16) & 0xff) as u8,
            ((value >> 8) & 0xff) as u8,
            (value & 0xff) as u8,
        )
    }
}

/// A named visual template for the strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameDesign {
    /// Stable identifier.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Slot arrangement.
    pub layout: StripLayout,
    /// Canvas fill.
    pub background: Rgb,
    /// Fill of each slot's outer frame.
    pub border: Rgb,
    /// Text and corner glyph color.
    pub accent: Rgb,
    /// Header title.
    pub title: Cow<'static, str>,
    /// Optional line under the title.
    pub tagline: Option<Cow<'static, str>>,
}

impl FrameDesign {
    /// Replaces the header text, keeping colors and layout.
    pub fn with_text(
        mut self,
        title: impl Into<Cow<'static, str>>,
        tagline: Option<impl Into<Cow<'static, str>>>,
    ) -> Self {
        self.title = title.into();
        self.tagline = tagline.map(Into::into);
        self
    }
}

const TITLE: Cow<'static, str> = Cow::Borrowed("HAPPY HAPPY HAPPY");
const WHITE: Rgb = Rgb::hex(0xffffff);

const fn design(
    id: &'static str,
    name: &'static str,
    layout: StripLayout,
    background: u32,
    accent: u32,
) -> FrameDesign {
    FrameDesign {
        id,
        name,
        layout,
        background: Rgb::hex(background),
        border: WHITE,
        accent: Rgb::hex(accent),
        title: TITLE,
        tagline: None,
    }
}

/// The design catalog: four grid designs followed by four vertical strips.
pub static FRAME_DESIGNS: [FrameDesign; 8] = [
    design("black", "Black", StripLayout::Grid2x2, 0x1a1a1a, 0xf472b6),
    design("pink", "Pink", StripLayout::Grid2x2, 0xfce7f3, 0xbe185d),
    design("teal", "Teal", StripLayout::Grid2x2, 0xccfbf1, 0x0d9488),
    design("orange", "Orange", StripLayout::Grid2x2, 0xffedd5, 0xea580c),
    design("yellow", "Yellow", StripLayout::VerticalStack, 0xfef9c3, 0xca8a04),
    design("purple", "Purple", StripLayout::VerticalStack, 0xf3e8ff, 0x7c3aed),
    design("blue", "Light Blue", StripLayout::VerticalStack, 0xe0f2fe, 0x0284c7),
    design("red", "Red", StripLayout::VerticalStack, 0xfee2e2, 0xdc2626),
];

/// Looks a design up by id (case-insensitive). `classic` names the default
/// grid design.
pub fn find_design(id: &str) -> Option<&'static FrameDesign> {
    let id = id.trim();
    if id.eq_ignore_ascii_case("classic") {
        return FRAME_DESIGNS.first();
    }
    FRAME_DESIGNS
        .iter()
        .find(|d| d.id.eq_ignore_ascii_case(id) || d.name.eq_ignore_ascii_case(id))
}
