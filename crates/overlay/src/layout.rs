//! Reticle geometry shared by the three drawing modes

use dpi::DpiScaler;
use zoom::{Point, Rect, Size};

use crate::settings::ReticleSettings;

/// The four strips inverted to draw an XOR frame of `thick` pixels around
/// `rect`.
///
/// Left and right run the full inflated height, top and bottom fill the gap
/// between them so no pixel is inverted twice.
pub fn xor_strips(rect: &Rect, thick: i32) -> [Rect; 4] {
    let outer = rect.inflate(thick, thick);
    let inner_width = (outer.width - 2 * thick).max(0);

    [
        Rect::new(outer.x, outer.y, thick, outer.height),
        Rect::new(outer.right() - thick, outer.y, thick, outer.height),
        Rect::new(outer.x + thick, outer.y, inner_width, thick),
        Rect::new(outer.x + thick, outer.bottom() - thick, inner_width, thick),
    ]
}

/// Edge thickness in device pixels at one monitor's DPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeThickness {
    pub border: i32,
    pub main: i32,
}

impl EdgeThickness {
    pub fn scaled(settings: &ReticleSettings, dpi: DpiScaler) -> Self {
        Self {
            border: dpi.scale(settings.border_thickness),
            main: dpi.scale(settings.main_thickness),
        }
    }

    /// Border, main band, border.
    pub fn total(&self) -> i32 {
        2 * self.border + self.main
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Left,
    Top,
    Right,
    Bottom,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Left, Edge::Top, Edge::Right, Edge::Bottom];

    pub fn is_vertical(self) -> bool {
        matches!(self, Edge::Left | Edge::Right)
    }
}

/// Screen rectangles of the four edge windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgePlacements {
    pub left: Rect,
    pub top: Rect,
    pub right: Rect,
    pub bottom: Rect,
}

impl EdgePlacements {
    pub fn get(&self, edge: Edge) -> Rect {
        match edge {
            Edge::Left => self.left,
            Edge::Top => self.top,
            Edge::Right => self.right,
            Edge::Bottom => self.bottom,
        }
    }
}

/// Frame `rect` with windows `thick` pixels wide.
///
/// Left and right cover only the rect's height; top and bottom run across
/// both corners, so every corner square belongs to exactly one window.
pub fn edge_placements(rect: &Rect, thick: i32) -> EdgePlacements {
    let span = rect.width + 2 * thick;

    EdgePlacements {
        left: Rect::new(rect.x - thick, rect.y, thick, rect.height),
        top: Rect::new(rect.x - thick, rect.y - thick, span, thick),
        right: Rect::new(rect.right(), rect.y, thick, rect.height),
        bottom: Rect::new(rect.x - thick, rect.bottom(), span, thick),
    }
}

/// What to fill inside one edge window's client area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgePaint {
    /// Filled with the border colour.
    pub background: Rect,
    /// Filled with the main colour, in order.
    pub bands: Vec<Rect>,
}

/// Client-area fills for `edge` sized `client`.
///
/// The main band sits between two border stripes. On the top and bottom
/// edges two short patches carry the left and right main bands across the
/// inner border stripe so the corners join up.
pub fn edge_paint(edge: Edge, client: Size, thickness: EdgeThickness) -> EdgePaint {
    let EdgeThickness { border, main } = thickness;
    let background = Rect::new(0, 0, client.width, client.height);

    let left = border;
    let right = client.width - border;

    if edge.is_vertical() {
        return EdgePaint {
            background,
            bands: vec![Rect::from_ltrb(left, 0, right, client.height)],
        };
    }

    let top = border;
    let bottom = client.height - border;
    let band = Rect::from_ltrb(left, top, right, bottom);

    // Inner border stripe: below the band for the top edge, above it for
    // the bottom edge.
    let (patch_top, patch_bottom) = match edge {
        Edge::Top => (bottom, bottom + border),
        _ => (top - border, top),
    };

    EdgePaint {
        background,
        bands: vec![
            band,
            Rect::from_ltrb(left, patch_top, left + main, patch_bottom),
            Rect::from_ltrb(right - main, patch_top, right, patch_bottom),
        ],
    }
}

/// Sprite rectangle in host client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpriteRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl SpriteRect {
    fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Geometry of the eight composited sprites.
///
/// Border sprites sit in the back layer, main sprites in the front layer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpriteLayout {
    pub left_border: SpriteRect,
    pub left: SpriteRect,
    pub top_border: SpriteRect,
    pub top: SpriteRect,
    pub right_border: SpriteRect,
    pub right: SpriteRect,
    pub bottom_border: SpriteRect,
    pub bottom: SpriteRect,
}

impl SpriteLayout {
    pub fn borders(&self) -> [SpriteRect; 4] {
        [
            self.left_border,
            self.top_border,
            self.right_border,
            self.bottom_border,
        ]
    }

    pub fn mains(&self) -> [SpriteRect; 4] {
        [self.left, self.top, self.right, self.bottom]
    }
}

/// Lay out the sprites around a `size` area centred on `center`.
///
/// `border` and `main` are already in device pixels.
pub fn sprite_layout(center: Point, size: Size, border: f32, main: f32) -> SpriteLayout {
    let inner = border + main;
    let full = border + main + border;

    let cx = center.x as f32;
    let cy = center.y as f32;
    let left_half = (size.width / 2) as f32;
    let right_half = (size.width - size.width / 2) as f32;
    let top_half = (size.height / 2) as f32;
    let bottom_half = (size.height - size.height / 2) as f32;
    let width = size.width as f32;
    let height = size.height as f32;

    let outer_left = cx - left_half - full;
    let outer_top = cy - top_half - full;
    let inner_left = cx - left_half - inner;
    let inner_top = cy - top_half - inner;

    let vert_border = full + height + full;
    let vert_main = inner + height + inner;
    let horz_border = full + width + full;
    let horz_main = inner + width + inner;

    SpriteLayout {
        left_border: SpriteRect::new(outer_left, outer_top, full, vert_border),
        left: SpriteRect::new(inner_left, inner_top, main, vert_main),
        right_border: SpriteRect::new(cx + right_half, outer_top, full, vert_border),
        right: SpriteRect::new(cx + right_half + border, inner_top, main, vert_main),
        top_border: SpriteRect::new(outer_left, outer_top, horz_border, full),
        top: SpriteRect::new(inner_left, inner_top, horz_main, main),
        bottom_border: SpriteRect::new(outer_left, cy + bottom_half, horz_border, full),
        bottom: SpriteRect::new(inner_left, cy + bottom_half + border, horz_main, main),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn covered(rects: &[Rect], x: i32, y: i32) -> usize {
        rects.iter().filter(|r| r.contains(x, y)).count()
    }

    #[test]
    fn xor_strips_cover_the_ring_once() {
        let rect = Rect::new(100, 50, 20, 10);
        let strips = xor_strips(&rect, 2);
        let outer = rect.inflate(2, 2);

        for x in outer.x..outer.right() {
            for y in outer.y..outer.bottom() {
                let expected = usize::from(!rect.contains(x, y));
                assert_eq!(covered(&strips, x, y), expected, "({x},{y})");
            }
        }
    }

    #[test]
    fn xor_strips_follow_the_inflated_rect() {
        let strips = xor_strips(&Rect::from_ltrb(10, 10, 30, 20), 1);
        assert_eq!(strips[0], Rect::new(9, 9, 1, 12));
        assert_eq!(strips[1], Rect::new(30, 9, 1, 12));
        assert_eq!(strips[2], Rect::new(10, 9, 20, 1));
        assert_eq!(strips[3], Rect::new(10, 20, 20, 1));
    }

    #[test]
    fn thickness_scales_per_dpi() {
        let settings = ReticleSettings::default();
        let at_96 = EdgeThickness::scaled(&settings, DpiScaler::default());
        assert_eq!((at_96.border, at_96.main, at_96.total()), (1, 2, 4));

        let at_144 = EdgeThickness::scaled(&settings, DpiScaler::new(144));
        assert_eq!((at_144.border, at_144.main, at_144.total()), (1, 3, 5));

        let at_192 = EdgeThickness::scaled(&settings, DpiScaler::new(192));
        assert_eq!((at_192.border, at_192.main, at_192.total()), (2, 4, 8));
    }

    #[test]
    fn placements_frame_the_rect() {
        let rect = Rect::new(100, 200, 120, 80);
        let p = edge_placements(&rect, 4);

        assert_eq!(p.left, Rect::new(96, 200, 4, 80));
        assert_eq!(p.top, Rect::new(96, 196, 128, 4));
        assert_eq!(p.right, Rect::new(220, 200, 4, 80));
        assert_eq!(p.bottom, Rect::new(96, 280, 128, 4));

        assert_eq!(p.left.right(), rect.x);
        assert_eq!(p.right.x, rect.right());
        assert_eq!(p.top.bottom(), rect.y);
        assert_eq!(p.bottom.y, rect.bottom());
    }

    #[test]
    fn placements_tile_the_ring_without_gaps() {
        let rect = Rect::new(-40, 10, 31, 17);
        let thick = 5;
        let p = edge_placements(&rect, thick);
        let windows = [p.left, p.top, p.right, p.bottom];
        let outer = rect.inflate(thick, thick);

        for x in outer.x..outer.right() {
            for y in outer.y..outer.bottom() {
                let expected = usize::from(!rect.contains(x, y));
                assert_eq!(covered(&windows, x, y), expected, "({x},{y})");
            }
        }

        // Corners belong to the horizontal windows and extend exactly `thick`.
        assert_eq!(rect.x - p.top.x, thick);
        assert_eq!(p.bottom.right() - rect.right(), thick);
    }

    #[test]
    fn vertical_edges_paint_one_band() {
        let t = EdgeThickness { border: 1, main: 2 };
        let paint = edge_paint(Edge::Left, Size::new(4, 80), t);
        assert_eq!(paint.background, Rect::new(0, 0, 4, 80));
        assert_eq!(paint.bands, vec![Rect::new(1, 0, 2, 80)]);
    }

    #[test]
    fn horizontal_edges_join_the_corners() {
        let t = EdgeThickness { border: 1, main: 2 };

        let top = edge_paint(Edge::Top, Size::new(128, 4), t);
        assert_eq!(
            top.bands,
            vec![
                Rect::new(1, 1, 126, 2),
                Rect::new(1, 3, 2, 1),
                Rect::new(125, 3, 2, 1),
            ]
        );

        let bottom = edge_paint(Edge::Bottom, Size::new(128, 4), t);
        assert_eq!(
            bottom.bands,
            vec![
                Rect::new(1, 1, 126, 2),
                Rect::new(1, 0, 2, 1),
                Rect::new(125, 0, 2, 1),
            ]
        );
    }

    #[test]
    fn patches_line_up_with_vertical_bands() {
        // Top window spans from the left window's outer edge, so its patch
        // starts where the left window's main band starts.
        let t = EdgeThickness { border: 2, main: 3 };
        let rect = Rect::new(0, 0, 50, 30);
        let p = edge_placements(&rect, t.total());

        let left_band = edge_paint(Edge::Left, p.left.size(), t).bands[0];
        let top_patch = edge_paint(Edge::Top, p.top.size(), t).bands[1];
        assert_eq!(p.left.x + left_band.x, p.top.x + top_patch.x);
        assert_eq!(left_band.width, top_patch.width);

        let right_band = edge_paint(Edge::Right, p.right.size(), t).bands[0];
        let top_right_patch = edge_paint(Edge::Top, p.top.size(), t).bands[2];
        assert_eq!(p.right.x + right_band.x, p.top.x + top_right_patch.x);
    }

    #[test]
    fn sprites_surround_the_area() {
        let layout = sprite_layout(Point::new(100, 100), Size::new(21, 11), 1.0, 2.0);

        // Area spans x 90..111, y 95..106.
        assert_eq!(layout.left_border, SpriteRect::new(86.0, 91.0, 4.0, 19.0));
        assert_eq!(layout.left, SpriteRect::new(87.0, 92.0, 2.0, 17.0));
        assert_eq!(layout.right_border, SpriteRect::new(111.0, 91.0, 4.0, 19.0));
        assert_eq!(layout.right, SpriteRect::new(112.0, 92.0, 2.0, 17.0));
        assert_eq!(layout.top_border, SpriteRect::new(86.0, 91.0, 29.0, 4.0));
        assert_eq!(layout.top, SpriteRect::new(87.0, 92.0, 27.0, 2.0));
        assert_eq!(layout.bottom_border, SpriteRect::new(86.0, 106.0, 29.0, 4.0));
        assert_eq!(layout.bottom, SpriteRect::new(87.0, 107.0, 27.0, 2.0));
    }

    #[test]
    fn main_sprites_sit_inside_their_borders() {
        let layout = sprite_layout(Point::new(0, 0), Size::new(120, 80), 1.0, 3.0);
        for (border, main) in layout.borders().iter().zip(layout.mains()) {
            assert!(main.x >= border.x && main.y >= border.y);
            assert!(main.x + main.width <= border.x + border.width);
            assert!(main.y + main.height <= border.y + border.height);
        }
    }
}
