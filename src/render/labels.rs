use hyphenation::{Language, Load, Standard};
use textwrap::{Options, WordSplitter};
use unicode_width::UnicodeWidthStr;

const TEXT_WIDTH_FRACTION: f32 = 0.78;
const FONT_STEP: f32 = 0.5;
const ELLIPSIS: char = '…';

/// Sizing and wrapping rules for bubble labels.
#[derive(Clone, Debug)]
pub struct LabelRules {
    /// Font size as a fraction of the radius before clamping.
    pub font_scale: f32,
    /// Smallest size a label starts at.
    pub min_font: f32,
    pub max_font: f32,
    /// Hard floor when shrinking an overflowing label.
    pub floor_font: f32,
    /// Average glyph advance as a fraction of the font size.
    pub glyph_width: f32,
    pub line_height: f32,
    /// How many lines a bubble of the given radius may show.
    pub max_lines_for: fn(f32) -> usize,
}

fn two_lines_above_22(radius: f32) -> usize {
    if radius >= 22.0 { 2 } else { 1 }
}

impl Default for LabelRules {
    fn default() -> Self {
        Self {
            font_scale: 0.38,
            min_font: 11.0,
            max_font: 28.0,
            floor_font: 8.0,
            glyph_width: 0.56,
            line_height: 1.2,
            max_lines_for: two_lines_above_22,
        }
    }
}

impl LabelRules {
    pub fn base_font(&self, radius: f32) -> f32 {
        (radius * self.font_scale).clamp(self.min_font, self.max_font.max(self.min_font))
    }

    pub fn text_width(&self, text: &str, font_size: f32) -> f32 {
        UnicodeWidthStr::width(text) as f32 * font_size * self.glyph_width
    }

    fn columns(&self, available: f32, font_size: f32) -> usize {
        ((available / (font_size * self.glyph_width)).floor() as usize).max(1)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LabelLayout {
    pub lines: Vec<String>,
    pub font_size: f32,
    pub truncated: bool,
}

/// Fits labels into circles. Holds the hyphenation dictionary, so build it once per view.
pub struct LabelFitter {
    splitter: WordSplitter,
}

impl Default for LabelFitter {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelFitter {
    pub fn new() -> Self {
        let splitter = match Standard::from_embedded(Language::EnglishUS) {
            Ok(dictionary) => WordSplitter::Hyphenation(dictionary),
            Err(error) => {
                tracing::warn!(
                    %error,
                    "hyphenation dictionary unavailable, splitting on hyphens only"
                );
                WordSplitter::HyphenSplitter
            }
        };
        Self { splitter }
    }

    pub fn without_dictionary() -> Self {
        Self {
            splitter: WordSplitter::HyphenSplitter,
        }
    }

    fn wrap(&self, text: &str, columns: usize) -> Vec<String> {
        let options = Options::new(columns).word_splitter(self.splitter.clone());
        textwrap::wrap(text, options)
            .into_iter()
            .map(|line| line.into_owned())
            .collect()
    }

    pub fn fit(&self, label: &str, radius: f32, rules: &LabelRules) -> LabelLayout {
        let label = label.trim();
        let base = rules.base_font(radius);
        if label.is_empty() {
            return LabelLayout {
                lines: Vec::new(),
                font_size: base,
                truncated: false,
            };
        }

        let available = (radius * 2.0 * TEXT_WIDTH_FRACTION).max(1.0);
        let max_lines = (rules.max_lines_for)(radius).max(1);
        let floor = rules.floor_font.min(base);

        let mut font = base;
        loop {
            if rules.text_width(label, font) <= available {
                return LabelLayout {
                    lines: vec![label.to_owned()],
                    font_size: font,
                    truncated: false,
                };
            }

            if max_lines > 1 {
                let lines = self.wrap(label, rules.columns(available, font));
                let height = lines.len() as f32 * font * rules.line_height;
                if lines.len() <= max_lines && height <= available {
                    return LabelLayout {
                        lines,
                        font_size: font,
                        truncated: false,
                    };
                }
            }

            if font <= floor {
                break;
            }
            font = (font - FONT_STEP).max(floor);
        }

        let columns = rules.columns(available, floor);
        if max_lines == 1 {
            let mut words = label.split_whitespace();
            let first = words.next().unwrap_or(label);
            let more = words.next().is_some();
            return LabelLayout {
                lines: vec![ellipsize(first, columns, more)],
                font_size: floor,
                truncated: true,
            };
        }

        let mut lines = self.wrap(label, columns);
        let overflow = lines.len() > max_lines;
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            *last = ellipsize(last, columns, overflow);
        }
        LabelLayout {
            lines,
            font_size: floor,
            truncated: true,
        }
    }
}

/// Cuts `text` to `columns`, ending in an ellipsis when anything was dropped.
pub fn ellipsize(text: &str, columns: usize, force: bool) -> String {
    let width = UnicodeWidthStr::width(text);
    if width <= columns && !force {
        return text.to_owned();
    }
    if width < columns && force {
        return format!("{text}{ELLIPSIS}");
    }

    let budget = columns.saturating_sub(1);
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let ch_width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + ch_width > budget {
            break;
        }
        out.push(ch);
        used += ch_width;
    }
    out.push(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> LabelRules {
        LabelRules::default()
    }

    #[test]
    fn short_label_fits_on_one_line() {
        let layout = LabelFitter::without_dictionary().fit("Joy", 30.0, &rules());
        assert_eq!(layout.lines, vec!["Joy".to_owned()]);
        assert!(!layout.truncated);
        assert!(layout.font_size >= rules().min_font);
    }

    #[test]
    fn font_grows_with_radius_and_respects_minimum() {
        let rules = rules();
        assert_eq!(rules.base_font(5.0), rules.min_font);
        assert!(rules.base_font(40.0) > rules.base_font(32.0));
        assert_eq!(rules.base_font(500.0), rules.max_font);
    }

    #[test]
    fn overflowing_label_shrinks_before_wrapping() {
        let rules = rules();
        let layout = LabelFitter::without_dictionary().fit("Lonely", 20.0, &rules);
        assert_eq!(layout.lines, vec!["Lonely".to_owned()]);
        assert!(!layout.truncated);
        assert!(layout.font_size < rules.base_font(20.0));
        assert!(layout.font_size >= rules.floor_font);
    }

    #[test]
    fn small_bubble_shows_single_truncated_token() {
        let layout = LabelFitter::without_dictionary().fit(
            "Overwhelmed by everything",
            12.0,
            &rules(),
        );
        assert_eq!(layout.lines.len(), 1);
        assert!(layout.truncated);
        assert!(layout.lines[0].ends_with(ELLIPSIS));
        assert_eq!(layout.font_size, rules().floor_font);
    }

    #[test]
    fn large_bubble_wraps_on_whitespace() {
        let layout = LabelFitter::without_dictionary().fit("Inner Critic", 28.0, &rules());
        assert_eq!(layout.lines, vec!["Inner".to_owned(), "Critic".to_owned()]);
        assert!(!layout.truncated);
    }

    #[test]
    fn wrapping_never_exceeds_two_lines() {
        let layout = LabelFitter::new().fit(
            "Disappointment mixed with unexpected relief and gratitude",
            30.0,
            &rules(),
        );
        assert!(layout.lines.len() <= 2);
        assert!(layout.truncated);
        assert!(layout.lines.last().is_some_and(|line| line.ends_with(ELLIPSIS)));
    }

    #[test]
    fn long_word_breaks_at_a_syllable() {
        let layout = LabelFitter::new().fit("Disappointment", 30.0, &rules());
        assert_eq!(layout.lines.len(), 2, "{:?}", layout.lines);
        assert!(!layout.truncated);

        let head = layout.lines[0].strip_suffix('-').expect("hyphen ends first line");
        assert!(["Dis", "Disap", "Disappoint"].contains(&head), "{head}");
        assert_eq!(format!("{head}{}", layout.lines[1]), "Disappointment");
    }

    #[test]
    fn long_word_without_dictionary_is_cut_without_hyphen() {
        let hyphenated = LabelFitter::new().fit("Disappointment", 30.0, &rules());
        let cut = LabelFitter::without_dictionary().fit("Disappointment", 30.0, &rules());
        assert_ne!(cut.lines, hyphenated.lines);
        assert!(cut.lines.iter().all(|line| !line.ends_with('-')));
        assert_eq!(cut.lines.concat(), "Disappointment");
    }

    #[test]
    fn ellipsize_respects_column_budget() {
        assert_eq!(ellipsize("abc", 5, false), "abc");
        assert_eq!(ellipsize("abc", 5, true), "abc…");
        assert_eq!(ellipsize("abcdef", 4, false), "abc…");
        assert_eq!(ellipsize("abcdef", 1, false), "…");
    }
}
