use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use bubble_reflect::Category;
use eframe::egui::{Color32, Painter, Rect, Stroke, StrokeKind};

const EMOTION_PALETTE: [Color32; 6] = [
    Color32::from_rgb(224, 122, 95),
    Color32::from_rgb(242, 204, 143),
    Color32::from_rgb(214, 40, 40),
    Color32::from_rgb(247, 127, 0),
    Color32::from_rgb(239, 71, 111),
    Color32::from_rgb(255, 209, 102),
];

const PART_PALETTE: [Color32; 5] = [
    Color32::from_rgb(61, 64, 91),
    Color32::from_rgb(109, 89, 122),
    Color32::from_rgb(95, 15, 64),
    Color32::from_rgb(72, 99, 156),
    Color32::from_rgb(94, 84, 142),
];

const NEED_PALETTE: [Color32; 5] = [
    Color32::from_rgb(129, 178, 154),
    Color32::from_rgb(17, 138, 178),
    Color32::from_rgb(6, 214, 160),
    Color32::from_rgb(42, 157, 143),
    Color32::from_rgb(144, 190, 109),
];

const OTHER_PALETTE: [Color32; 4] = [
    Color32::from_rgb(154, 140, 152),
    Color32::from_rgb(120, 144, 156),
    Color32::from_rgb(173, 181, 189),
    Color32::from_rgb(108, 117, 125),
];

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect) {
    painter.rect_filled(rect, 6.0, Color32::from_rgb(19, 23, 29));
    painter.rect_stroke(
        rect,
        6.0,
        Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 120)),
        StrokeKind::Inside,
    );
}

fn parse_hex(token: &str) -> Option<Color32> {
    let hex = token.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let value = u32::from_str_radix(hex, 16).ok()?;
    Some(Color32::from_rgb(
        ((value >> 16) & 0xff) as u8,
        ((value >> 8) & 0xff) as u8,
        (value & 0xff) as u8,
    ))
}

fn palette_for(category: &Category) -> &'static [Color32] {
    match category {
        Category::Emotion => &EMOTION_PALETTE,
        Category::Part => &PART_PALETTE,
        Category::Need => &NEED_PALETTE,
        Category::Other(_) => &OTHER_PALETTE,
    }
}

/// `#rrggbb` tokens are used as is; anything else picks a stable entry from the category palette.
pub(super) fn color_from_token(token: &str, category: &Category) -> Color32 {
    let token = token.trim();
    if let Some(color) = parse_hex(token) {
        return color;
    }

    let palette = palette_for(category);
    let key = if token.is_empty() { category.label() } else { token };
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    palette[(hasher.finish() % palette.len() as u64) as usize]
}

/// Dark or light label color, whichever reads better on `fill`.
pub(super) fn text_color(fill: Color32) -> Color32 {
    let luminance =
        0.2126 * fill.r() as f32 + 0.7152 * fill.g() as f32 + 0.0722 * fill.b() as f32;
    if luminance > 150.0 {
        Color32::from_rgb(24, 26, 32)
    } else {
        Color32::from_rgb(245, 245, 245)
    }
}
