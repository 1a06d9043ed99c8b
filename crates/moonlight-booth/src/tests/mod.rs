mod strip_font;
mod support;
