//! Headline wrapping with an emphasized run.
//!
//! # Algorithm
//!
//! 1. Locate the first occurrence of the highlight phrase in the headline.
//!    A non-empty phrase that does not occur is a layout error.
//! 2. Split the headline into whitespace-delimited words. A word is styled
//!    as highlighted when its byte span overlaps the phrase.
//! 3. Break lines greedily, measuring every candidate line with the bold
//!    face against a conservative usable width. A word that alone exceeds
//!    the usable width gets its own line.
//! 4. Group consecutive words of the same style into segments, measure each
//!    with its own face, and center the line inside the text box.
//!
//! Measurement goes through [`FontMetrics`] so that this module stays free
//! of any font rasterizer.

use newsframe_common::error::{NewsframeError, NewsframeResult};
use newsframe_model::style::{Color, Palette};
use serde::{Deserialize, Serialize};

/// Glyph measurements for one face at one pixel size.
pub trait FontMetrics {
    /// Distance from the baseline to the top of the tallest glyph (positive).
    fn ascent(&self) -> f32;

    /// Distance from the baseline to the lowest descender (zero or negative).
    fn descent(&self) -> f32;

    /// Horizontal advance of one character, kerning ignored.
    fn advance(&self, ch: char) -> f32;

    /// Width of a run of characters.
    fn run_width(&self, text: &str) -> f32 {
        text.chars().map(|ch| self.advance(ch)).sum()
    }
}

impl<T: FontMetrics + ?Sized> FontMetrics for &T {
    fn ascent(&self) -> f32 {
        (**self).ascent()
    }

    fn descent(&self) -> f32 {
        (**self).descent()
    }

    fn advance(&self, ch: char) -> f32 {
        (**self).advance(ch)
    }

    fn run_width(&self, text: &str) -> f32 {
        (**self).run_width(text)
    }
}

/// Layout tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Fraction of the text box available to a line.
    pub usable_width_factor: f32,

    /// Extra headroom multiplied on top of `usable_width_factor`.
    pub safety_factor: f32,

    /// Vertical gap between lines in pixels.
    pub line_spacing: f32,

    pub palette: Palette,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            usable_width_factor: 0.75,
            safety_factor: 0.95,
            line_spacing: 8.0,
            palette: Palette::default(),
        }
    }
}

/// A maximal run of same-style words on one line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub bold: bool,
    pub color: Color,

    /// Offset from the start of the line.
    pub x: f32,

    /// Width measured with the segment's own face.
    pub width: f32,
}

/// One wrapped line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub segments: Vec<Segment>,

    /// Measured width of all segments plus the spaces between them.
    pub width: f32,

    /// Left offset that centers the line inside the text box.
    pub x_offset: f32,

    /// Top of the line box relative to the top of the layout.
    pub top: f32,

    /// Shared baseline of every segment on the line.
    pub baseline_y: f32,
}

impl Line {
    /// The line's text with single spaces between segments.
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|segment| segment.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.segments
            .iter()
            .flat_map(|segment| segment.text.split(' '))
            .filter(|word| !word.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// The positioned result of laying out one headline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLayout {
    pub lines: Vec<Line>,

    /// Width the lines are centered in.
    pub box_width: f32,

    /// Width candidate lines were measured against.
    pub usable_width: f32,

    pub line_height: f32,
    pub line_spacing: f32,

    pub regular_ascent: f32,
    pub bold_ascent: f32,

    /// Vertical offset added to bold glyph origins so both faces share the
    /// regular face's baseline.
    pub bold_baseline_shift: f32,
}

impl TextLayout {
    /// Height from the top of the first line to the bottom of the last.
    pub fn total_height(&self) -> f32 {
        let n = self.lines.len() as f32;
        if n == 0.0 {
            return 0.0;
        }
        n * self.line_height + (n - 1.0) * self.line_spacing
    }

    /// All words, in order, separated by single spaces.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .filter(|line| !line.is_empty())
            .map(Line::text)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Baseline at which a segment's glyphs are drawn.
    ///
    /// Glyph origins are placed at `top + face ascent`; bold runs get the
    /// correction applied once here, so every segment of a line lands on
    /// `line.baseline_y`.
    pub fn segment_baseline(&self, line: &Line, segment: &Segment) -> f32 {
        if segment.bold {
            line.top + self.bold_ascent + self.bold_baseline_shift
        } else {
            line.top + self.regular_ascent
        }
    }
}

/// A word and whether it overlaps the highlight.
#[derive(Debug, Clone, Copy)]
struct Word<'a> {
    text: &'a str,
    highlighted: bool,
}

/// Wraps headlines with a regular and a bold face.
pub struct TextLayoutEngine<'a> {
    regular: &'a dyn FontMetrics,
    bold: &'a dyn FontMetrics,
    config: LayoutConfig,
}

impl<'a> TextLayoutEngine<'a> {
    pub fn new(regular: &'a dyn FontMetrics, bold: &'a dyn FontMetrics) -> Self {
        Self {
            regular,
            bold,
            config: LayoutConfig::default(),
        }
    }

    pub fn with_config(mut self, config: LayoutConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out `headline` inside a box `max_width` pixels wide.
    pub fn layout(
        &self,
        headline: &str,
        highlight: &str,
        max_width: f32,
    ) -> NewsframeResult<TextLayout> {
        let span = highlight_span(headline, highlight)?;
        let words = tokenize(headline, span);

        let usable_width =
            max_width * self.config.usable_width_factor * self.config.safety_factor;
        let regular_ascent = self.regular.ascent();
        let bold_ascent = self.bold.ascent();
        let line_height = regular_ascent.max(bold_ascent)
            - self.regular.descent().min(self.bold.descent());

        let mut layout = TextLayout {
            lines: Vec::new(),
            box_width: max_width,
            usable_width,
            line_height,
            line_spacing: self.config.line_spacing,
            regular_ascent,
            bold_ascent,
            bold_baseline_shift: regular_ascent - bold_ascent,
        };

        let rows = self.break_lines(&words, usable_width);
        if rows.is_empty() {
            layout.lines.push(Line {
                segments: Vec::new(),
                width: 0.0,
                x_offset: (max_width / 2.0).max(0.0),
                top: 0.0,
                baseline_y: regular_ascent,
            });
            return Ok(layout);
        }

        for (index, row) in rows.iter().enumerate() {
            let top = index as f32 * (line_height + self.config.line_spacing);
            layout.lines.push(self.build_line(row, max_width, top, regular_ascent));
        }

        tracing::trace!(
            lines = layout.lines.len(),
            usable_width,
            "Headline laid out"
        );
        Ok(layout)
    }

    fn break_lines<'w>(&self, words: &[Word<'w>], usable_width: f32) -> Vec<Vec<Word<'w>>> {
        let space = self.bold.advance(' ');
        let mut rows = Vec::new();
        let mut current: Vec<Word<'w>> = Vec::new();
        let mut current_width = 0.0;

        for word in words {
            let word_width = self.bold.run_width(word.text);
            if current.is_empty() {
                current.push(*word);
                current_width = word_width;
                continue;
            }

            let candidate = current_width + space + word_width;
            if candidate <= usable_width {
                current.push(*word);
                current_width = candidate;
            } else {
                rows.push(std::mem::take(&mut current));
                current.push(*word);
                current_width = word_width;
            }
        }
        if !current.is_empty() {
            rows.push(current);
        }
        rows
    }

    fn build_line(&self, row: &[Word<'_>], box_width: f32, top: f32, ascent: f32) -> Line {
        let space = self.regular.advance(' ');
        let palette = self.config.palette;
        let mut segments: Vec<Segment> = Vec::new();

        for word in row {
            match segments.last_mut() {
                Some(last) if last.bold == word.highlighted => {
                    last.text.push(' ');
                    last.text.push_str(word.text);
                }
                _ => segments.push(Segment {
                    text: word.text.to_string(),
                    bold: word.highlighted,
                    color: if word.highlighted {
                        palette.highlight
                    } else {
                        palette.text
                    },
                    x: 0.0,
                    width: 0.0,
                }),
            }
        }

        let mut cursor = 0.0;
        for (index, segment) in segments.iter_mut().enumerate() {
            if index > 0 {
                cursor += space;
            }
            let face = if segment.bold { self.bold } else { self.regular };
            segment.x = cursor;
            segment.width = face.run_width(&segment.text);
            cursor += segment.width;
        }

        Line {
            segments,
            width: cursor,
            x_offset: ((box_width - cursor) / 2.0).max(0.0),
            top,
            baseline_y: top + ascent,
        }
    }
}

/// Byte span of the first occurrence of `highlight`.
fn highlight_span(headline: &str, highlight: &str) -> NewsframeResult<Option<(usize, usize)>> {
    if highlight.is_empty() {
        return Ok(None);
    }
    match headline.find(highlight) {
        Some(start) => Ok(Some((start, start + highlight.len()))),
        None => Err(NewsframeError::layout(format!(
            "highlight {highlight:?} does not occur in headline"
        ))),
    }
}

fn tokenize(headline: &str, span: Option<(usize, usize)>) -> Vec<Word<'_>> {
    let overlaps = |start: usize, end: usize| {
        span.map_or(false, |(hs, he)| start < he && end > hs)
    };

    let mut words = Vec::new();
    let mut start = None;
    for (index, ch) in headline.char_indices() {
        if ch.is_whitespace() {
            if let Some(begin) = start.take() {
                words.push(Word {
                    text: &headline[begin..index],
                    highlighted: overlaps(begin, index),
                });
            }
        } else if start.is_none() {
            start = Some(index);
        }
    }
    if let Some(begin) = start {
        words.push(Word {
            text: &headline[begin..],
            highlighted: overlaps(begin, headline.len()),
        });
    }
    words
}

/// Lay out with default tuning.
pub fn layout(
    headline: &str,
    highlight: &str,
    max_width: f32,
    regular: &dyn FontMetrics,
    bold: &dyn FontMetrics,
) -> NewsframeResult<TextLayout> {
    TextLayoutEngine::new(regular, bold).layout(headline, highlight, max_width)
}
