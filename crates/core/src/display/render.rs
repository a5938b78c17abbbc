use super::{
    font::{self, FontSize, GLYPH_HEIGHT, GLYPH_WIDTH},
    Display, Rgb565, Rotation,
};

impl Display {
    /// Writes one logical pixel; off-screen coordinates are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgb565) {
        if !self.in_bounds(x, y) {
            return;
        }
        let (fx, fy) = self.to_physical(x, y);
        self.canvas.set(fx, fy, color);
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgb565) {
        let Some((x1, y1, x2, y2)) = self.clip_rect(x, y, w, h) else {
            return;
        };
        if self.rotation == Rotation::Deg0 {
            for py in y1..y2 {
                self.canvas.fill_span(x1, py, (x2 - x1) as usize, color);
            }
        } else {
            self.fill_clipped_transformed(x1, y1, x2, y2, color);
        }
    }

    /// Rectangle outline built from two horizontal and two vertical edges.
    pub fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgb565) {
        self.hline(x, y, w, color);
        self.hline(x, y + h - 1, w, color);
        self.vline(x, y, h, color);
        self.vline(x + w - 1, y, h, color);
    }

    pub fn hline(&mut self, x: i32, y: i32, w: i32, color: Rgb565) {
        let Some((x1, y1, x2, y2)) = self.clip_rect(x, y, w, 1) else {
            return;
        };
        if self.rotation == Rotation::Deg0 {
            self.canvas.fill_span(x1, y1, (x2 - x1) as usize, color);
        } else {
            self.fill_clipped_transformed(x1, y1, x2, y2, color);
        }
    }

    pub fn vline(&mut self, x: i32, y: i32, h: i32, color: Rgb565) {
        let Some((x1, y1, x2, y2)) = self.clip_rect(x, y, 1, h) else {
            return;
        };
        if self.rotation == Rotation::Deg0 {
            for py in y1..y2 {
                self.canvas.set(x1, py, color);
            }
        } else {
            self.fill_clipped_transformed(x1, y1, x2, y2, color);
        }
    }

    /// Integer Bresenham line, both endpoints included.
    ///
    /// The walk ends early once it is off screen and heading further away,
    /// so far-off endpoints cost no more than the visible part.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb565) {
        let width = self.logical_width as i64;
        let height = self.logical_height as i64;
        let walk = line_points(x0, y0, x1, y1);
        let (sx, sy) = walk.direction();
        for (x, y) in walk {
            if moving_away(i64::from(x), sx, width) || moving_away(i64::from(y), sy, height) {
                break;
            }
            self.set_pixel(x, y, color);
        }
    }

    pub fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, color: Rgb565) {
        if r < 0 {
            return;
        }
        let (cx, cy, r) = (i64::from(cx), i64::from(cy), i64::from(r));
        let x_range = (cx - r).max(0)..=(cx + r).min(self.logical_width as i64 - 1);
        let y_range = (cy - r).max(0)..=(cy + r).min(self.logical_height as i64 - 1);

        for y in y_range {
            let dy = y - cy;
            for x in x_range.clone() {
                let dx = x - cx;
                if dx * dx + dy * dy <= r * r {
                    self.plot(x, y, color);
                }
            }
        }
    }

    /// Midpoint circle outline, plotting the eight symmetric octants.
    pub fn draw_circle(&mut self, cx: i32, cy: i32, r: i32, color: Rgb565) {
        let (cx, cy) = (i64::from(cx), i64::from(cy));
        let mut x = i64::from(r);
        let mut y = 0i64;
        let mut err = 0i64;

        while x >= y {
            for (dx, dy) in [
                (x, y),
                (y, x),
                (-y, x),
                (-x, y),
                (-x, -y),
                (-y, -x),
                (y, -x),
                (x, -y),
            ] {
                self.plot(cx + dx, cy + dy, color);
            }

            y += 1;
            err += 1 + 2 * y;
            if 2 * (err - x) + 1 > 0 {
                x -= 1;
                err += 1 - 2 * x;
            }
        }
    }

    /// Draws one bitmap glyph and returns the horizontal advance.
    pub fn draw_char(&mut self, x: i32, y: i32, ch: char, color: Rgb565, size: FontSize) -> i32 {
        let glyph = font::glyph(ch);
        let scale = size.scale();

        for (col, bits) in (0..GLYPH_WIDTH).zip(glyph.iter()) {
            for row in 0..GLYPH_HEIGHT {
                if bits & (1 << row) == 0 {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        self.set_pixel(x + col * scale + sx, y + row * scale + sy, color);
                    }
                }
            }
        }

        size.advance()
    }

    /// Draws text, starting a new line at each `\n`. Returns the horizontal
    /// distance covered by the last line.
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, color: Rgb565, size: FontSize) -> i32 {
        let mut cursor_x = x;
        let mut cursor_y = y;
        for ch in text.chars() {
            if ch == '\n' {
                cursor_x = x;
                cursor_y += size.line_height();
            } else {
                cursor_x += self.draw_char(cursor_x, cursor_y, ch, color, size);
            }
        }
        cursor_x - x
    }

    /// Draws text horizontally centred on the logical width.
    pub fn draw_text_centered(&mut self, y: i32, text: &str, color: Rgb565, size: FontSize) {
        let x = (self.logical_width as i32 - text_width(text, size)) / 2;
        self.draw_text(x, y, text, color, size);
    }

    pub fn draw_number(&mut self, x: i32, y: i32, number: i64, color: Rgb565, size: FontSize) -> i32 {
        self.draw_text(x, y, &number.to_string(), color, size)
    }

    /// `set_pixel` for coordinates computed in wide arithmetic.
    fn plot(&mut self, x: i64, y: i64, color: Rgb565) {
        if let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) {
            self.set_pixel(x, y, color);
        }
    }

    /// Clips a logical rectangle to `[x1, x2) x [y1, y2)`, or `None` when
    /// nothing is left.
    fn clip_rect(&self, x: i32, y: i32, w: i32, h: i32) -> Option<(i32, i32, i32, i32)> {
        let x1 = x.max(0);
        let y1 = y.max(0);
        let x2 = x.saturating_add(w).min(self.logical_width as i32);
        let y2 = y.saturating_add(h).min(self.logical_height as i32);
        (x1 < x2 && y1 < y2).then_some((x1, y1, x2, y2))
    }

    /// Per-pixel transformed fill of an already clipped rectangle.
    fn fill_clipped_transformed(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Rgb565) {
        for py in y1..y2 {
            for px in x1..x2 {
                let (fx, fy) = self.to_physical(px, py);
                self.canvas.set(fx, fy, color);
            }
        }
    }
}

/// Width in pixels of `text` in the bitmap font, without the trailing gap.
/// Newlines contribute nothing.
pub fn text_width(text: &str, size: FontSize) -> i32 {
    let glyphs = text.chars().filter(|&ch| ch != '\n').count() as i32;
    if glyphs == 0 {
        0
    } else {
        glyphs * size.advance() - size.scale()
    }
}

/// True when `pos` lies outside `0..extent` and a walk stepping by `step`
/// can never bring it back. A zero step never moves.
fn moving_away(pos: i64, step: i64, extent: i64) -> bool {
    (pos < 0 && step <= 0) || (pos >= extent && step >= 0)
}

/// Points visited by an integer Bresenham walk from `(x0, y0)` to `(x1, y1)`.
pub fn line_points(x0: i32, y0: i32, x1: i32, y1: i32) -> LinePoints {
    let (x0, y0, x1, y1) = (i64::from(x0), i64::from(y0), i64::from(x1), i64::from(y1));
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    LinePoints {
        x: x0,
        y: y0,
        x1,
        y1,
        dx,
        dy,
        sx: (x1 - x0).signum(),
        sy: (y1 - y0).signum(),
        err: dx - dy,
        done: false,
    }
}

/// Lazy Bresenham walk returned by [`line_points`]. Every yielded point lies
/// between the endpoints, so it always fits an `i32`.
#[derive(Debug, Clone)]
pub struct LinePoints {
    x: i64,
    y: i64,
    x1: i64,
    y1: i64,
    dx: i64,
    dy: i64,
    sx: i64,
    sy: i64,
    err: i64,
    done: bool,
}

impl LinePoints {
    /// Per-axis step: -1, 0 or 1.
    pub fn direction(&self) -> (i64, i64) {
        (self.sx, self.sy)
    }
}

impl Iterator for LinePoints {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let point = (self.x as i32, self.y as i32);
        if self.x == self.x1 && self.y == self.y1 {
            self.done = true;
            return Some(point);
        }
        let e2 = 2 * self.err;
        if e2 > -self.dy {
            self.err -= self.dy;
            self.x += self.sx;
        }
        if e2 < self.dx {
            self.err += self.dx;
            self.y += self.sy;
        }
        Some(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::tests::test_display;

    fn lit(display: &Display) -> Vec<(i32, i32)> {
        let mut points = Vec::new();
        for y in 0..display.height() as i32 {
            for x in 0..display.width() as i32 {
                if display.pixel(x, y) != Some(Rgb565::BLACK) {
                    points.push((x, y));
                }
            }
        }
        points
    }

    fn walk(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<(i32, i32)> {
        line_points(x0, y0, x1, y1).collect()
    }

    #[test]
    fn bresenham_visits_both_endpoints() {
        let points = walk(0, 0, 5, 2);
        assert_eq!(points.len(), 6);
        assert_eq!(points.first(), Some(&(0, 0)));
        assert_eq!(points.last(), Some(&(5, 2)));
        let xs: Vec<i32> = points.iter().map(|p| p.0).collect();
        assert_eq!(xs, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn steep_and_reversed_lines() {
        assert_eq!(walk(0, 0, 1, 4).len(), 5);
        assert_eq!(walk(3, 3, 0, 0), vec![(3, 3), (2, 2), (1, 1), (0, 0)]);
        assert_eq!(walk(2, 2, 2, 2), vec![(2, 2)]);
        assert_eq!(walk(4, 0, 4, 3), vec![(4, 0), (4, 1), (4, 2), (4, 3)]);
    }

    #[test]
    fn walk_between_extreme_endpoints_does_not_overflow() {
        let mut points = line_points(i32::MIN, i32::MIN, i32::MAX, i32::MAX);
        assert_eq!(points.direction(), (1, 1));
        assert_eq!(points.next(), Some((i32::MIN, i32::MIN)));
        assert_eq!(points.next(), Some((i32::MIN + 1, i32::MIN + 1)));
    }

    #[test]
    fn line_to_a_far_endpoint_stops_at_the_edge() {
        let (mut display, _) = test_display(16, 4);
        display.draw_line(0, 0, i32::MAX, 0, Rgb565::WHITE);
        assert_eq!(lit(&display), (0..16).map(|x| (x, 0)).collect::<Vec<_>>());

        let (mut display, _) = test_display(16, 4);
        display.draw_line(3, 2, i32::MIN, i32::MAX, Rgb565::WHITE);
        assert_eq!(lit(&display), vec![(3, 2), (2, 3)]);

        // entirely off screen in both directions
        let (mut display, _) = test_display(16, 4);
        display.draw_line(-1, 0, i32::MIN, i32::MAX, Rgb565::WHITE);
        display.draw_line(20, 0, 20, i32::MAX, Rgb565::WHITE);
        assert!(lit(&display).is_empty());
    }

    #[test]
    fn fast_path_matches_transformed_path() {
        let (mut fast, _) = test_display(16, 12);
        let (mut slow, _) = test_display(16, 12);

        let rects = [(2, 3, 5, 4), (-3, -2, 6, 5), (10, 8, 20, 20), (0, 0, 16, 12)];
        for (i, &(x, y, w, h)) in rects.iter().enumerate() {
            let color = Rgb565(i as u16 + 1);
            fast.fill_rect(x, y, w, h, color);
            fast.hline(x, y + 1, w, color);
            fast.vline(x + 1, y, h, color);

            if let Some((x1, y1, x2, y2)) = slow.clip_rect(x, y, w, h) {
                slow.fill_clipped_transformed(x1, y1, x2, y2, color);
            }
            if let Some((x1, y1, x2, y2)) = slow.clip_rect(x, y + 1, w, 1) {
                slow.fill_clipped_transformed(x1, y1, x2, y2, color);
            }
            if let Some((x1, y1, x2, y2)) = slow.clip_rect(x + 1, y, 1, h) {
                slow.fill_clipped_transformed(x1, y1, x2, y2, color);
            }
        }

        assert_eq!(fast.canvas(), slow.canvas());
    }

    #[test]
    fn rotated_fill_lands_on_the_expected_physical_pixels() {
        let (mut display, _) = test_display(4, 6);
        display.set_rotation(Rotation::Deg90);
        display.fill_rect(0, 0, 2, 1, Rgb565::WHITE);

        // logical (0,0) and (1,0) map to physical (0,5) and (0,4)
        assert_eq!(display.canvas().get(0, 5), Some(Rgb565::WHITE));
        assert_eq!(display.canvas().get(0, 4), Some(Rgb565::WHITE));
        let count = display
            .canvas()
            .pixels()
            .iter()
            .filter(|&&p| p == Rgb565::WHITE.raw())
            .count();
        assert_eq!(count, 2);
    }

    #[test]
    fn full_screen_fill_is_identical_in_every_rotation() {
        for rotation in Rotation::ALL {
            let (mut display, _) = test_display(7, 9);
            display.set_rotation(rotation);
            display.fill_rect(-5, -5, 100, 100, Rgb565::GREEN);
            assert!(display
                .canvas()
                .pixels()
                .iter()
                .all(|&p| p == Rgb565::GREEN.raw()));
        }
    }

    #[test]
    fn rect_outline_draws_only_edges() {
        let (mut display, _) = test_display(6, 6);
        display.draw_rect(1, 1, 4, 3, Rgb565::RED);
        let points = lit(&display);
        assert_eq!(points.len(), 10);
        assert!(!points.contains(&(2, 2)));
        assert!(points.contains(&(4, 3)));
    }

    #[test]
    fn filled_circle_uses_radius_test() {
        let (mut display, _) = test_display(9, 9);
        display.fill_circle(4, 4, 1, Rgb565::WHITE);
        let mut points = lit(&display);
        points.sort();
        assert_eq!(points, vec![(3, 4), (4, 3), (4, 4), (4, 5), (5, 4)]);
    }

    #[test]
    fn huge_filled_circle_covers_the_screen() {
        let (mut display, _) = test_display(222, 480);
        display.fill_circle(100, 100, 46_341, Rgb565::WHITE);
        assert!(display
            .canvas()
            .pixels()
            .iter()
            .all(|&p| p == Rgb565::WHITE.raw()));

        let (mut display, _) = test_display(8, 8);
        display.fill_circle(i32::MAX, i32::MIN, i32::MAX, Rgb565::WHITE);
        display.fill_circle(4, 4, -3, Rgb565::WHITE);
        assert!(lit(&display).is_empty());
    }

    #[test]
    fn large_circle_outline_clips_without_overflow() {
        let (mut display, _) = test_display(16, 16);
        display.draw_circle(8, 8, 46_341, Rgb565::WHITE);
        assert!(lit(&display).is_empty());
        display.draw_circle(i32::MAX, 8, 4, Rgb565::WHITE);
        display.draw_circle(8, 8, 3, Rgb565::WHITE);
        assert!(lit(&display).contains(&(11, 8)));
    }

    #[test]
    fn circle_outline_is_symmetric() {
        let (mut display, _) = test_display(21, 21);
        display.draw_circle(10, 10, 6, Rgb565::WHITE);
        let points = lit(&display);
        assert!(points.contains(&(16, 10)));
        assert!(points.contains(&(4, 10)));
        assert!(points.contains(&(10, 16)));
        assert!(points.contains(&(10, 4)));
        for &(x, y) in &points {
            assert!(points.contains(&(20 - x, y)));
            assert!(points.contains(&(y, x)));
        }
        assert!(!points.contains(&(10, 10)));
    }

    #[test]
    fn text_width_drops_trailing_gap() {
        assert_eq!(text_width("", FontSize::Small), 0);
        assert_eq!(text_width("A", FontSize::Small), 5);
        assert_eq!(text_width("AB", FontSize::Medium), 22);
        assert_eq!(text_width("A\nB", FontSize::Small), 11);
    }

    #[test]
    fn glyph_is_scaled() {
        let (mut small, _) = test_display(24, 24);
        let (mut large, _) = test_display(24, 24);
        small.draw_char(0, 0, '|', Rgb565::WHITE, FontSize::Small);
        large.draw_char(0, 0, '|', Rgb565::WHITE, FontSize::Large);
        assert_eq!(lit(&small).len(), 7);
        assert_eq!(lit(&large).len(), 7 * 9);
    }

    #[test]
    fn newline_resets_x_and_advances_by_line_height() {
        let (mut display, _) = test_display(40, 40);
        let advance = display.draw_text(2, 0, "|\n|", Rgb565::WHITE, FontSize::Small);
        assert_eq!(advance, 6);
        // '|' occupies column 2 of its cell, rows 0..7
        assert_eq!(display.pixel(4, 0), Some(Rgb565::WHITE));
        assert_eq!(display.pixel(4, 8), Some(Rgb565::WHITE));
        assert_eq!(display.pixel(4, 7), Some(Rgb565::BLACK));
    }

    #[test]
    fn centered_text_is_centered_on_logical_width() {
        let (mut display, _) = test_display(10, 20);
        display.set_rotation(Rotation::Deg90);
        display.draw_text_centered(0, "|", Rgb565::WHITE, FontSize::Small);
        // logical width 20, glyph width 5 => x = 7, '|' column at 7 + 2
        assert_eq!(display.pixel(9, 0), Some(Rgb565::WHITE));
    }

    #[test]
    fn out_of_range_chars_render_as_question_mark() {
        let (mut unknown, _) = test_display(8, 8);
        let (mut question, _) = test_display(8, 8);
        unknown.draw_char(0, 0, '\u{80}', Rgb565::WHITE, FontSize::Small);
        question.draw_char(0, 0, '?', Rgb565::WHITE, FontSize::Small);
        assert_eq!(unknown.canvas(), question.canvas());
    }

    #[test]
    fn numbers_render_as_text() {
        let (mut display, _) = test_display(40, 10);
        assert_eq!(display.draw_number(0, 0, -42, Rgb565::WHITE, FontSize::Small), 18);
    }
}
